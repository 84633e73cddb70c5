//! One-shot register (tone) classification. Dispatched at most once per
//! speaker, once their confirmed source text reaches 30 words
//! (`transcript::SegmentationOutcome::dispatch_tone`). Runs concurrently
//! with the pipeline and never blocks it; a failure just leaves
//! `Tone::Unset`.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use transcript::Tone;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("tone classifier request failed: {0}")]
    Request(String),
    #[error("tone classifier returned an unrecognized label: {0}")]
    UnknownLabel(String),
}

/// A one-shot register classifier. Implementations must not block the
/// caller's pipeline loop — callers spawn `classify` as a task.
pub trait ToneDetector: Send + Sync {
    fn classify<'a>(
        &'a self,
        source_text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Tone, Error>> + Send + 'a>>;
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    label: String,
}

fn parse_label(label: &str) -> Result<Tone, Error> {
    match label {
        "casual" => Ok(Tone::Casual),
        "casual_polite" => Ok(Tone::CasualPolite),
        "formal" => Ok(Tone::Formal),
        "narrative" => Ok(Tone::Narrative),
        "generic" => Ok(Tone::Generic),
        other => Err(Error::UnknownLabel(other.to_string())),
    }
}

/// An HTTP classifier backed by an external LLM/classification service.
pub struct HttpToneDetector {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpToneDetector {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

impl ToneDetector for HttpToneDetector {
    fn classify<'a>(
        &'a self,
        source_text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Tone, Error>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&ClassifyRequest { text: source_text })
                .send()
                .await
                .map_err(|e| Error::Request(e.to_string()))?;

            if !response.status().is_success() {
                return Err(Error::Request(format!(
                    "tone classifier returned {}",
                    response.status()
                )));
            }

            let parsed: ClassifyResponse = response
                .json()
                .await
                .map_err(|e| Error::Request(format!("malformed tone response: {e}")))?;

            parse_label(&parsed.label)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_labels() {
        assert_eq!(parse_label("formal").unwrap(), Tone::Formal);
        assert_eq!(parse_label("casual_polite").unwrap(), Tone::CasualPolite);
    }

    #[test]
    fn rejects_unknown_label() {
        assert!(parse_label("sarcastic").is_err());
    }
}
