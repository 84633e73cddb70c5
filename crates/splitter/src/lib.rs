//! Semantic sentence segmentation for long unpunctuated ASR runs.
//! Dispatched when a speaker's unsealed tail exceeds 15 tokens without
//! terminal punctuation. A one-shot, asynchronous helper — never invoked
//! while one is already in flight for the same speaker.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("sentence splitter request failed: {0}")]
    Request(String),
}

/// A proposed word index, within the unsegmented tail, where a sentence
/// boundary belongs. Staleness is the caller's concern
/// (`transcript::SpeakerState::apply_splitter_boundary`); this trait only
/// proposes boundaries against the text it was given.
pub trait SentenceSplitter: Send + Sync {
    fn propose_boundaries<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<usize>, Error>> + Send + 'a>>;
}

#[derive(Serialize)]
struct SplitRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct SplitResponse {
    /// Word indices into `text.split_whitespace()`, each exclusive of the
    /// boundary word (i.e. "seal through this word count").
    boundaries: Vec<usize>,
}

/// An HTTP-backed semantic segmenter (an LLM or dedicated sentence
/// boundary detection model).
pub struct HttpSentenceSplitter {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpSentenceSplitter {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

impl SentenceSplitter for HttpSentenceSplitter {
    fn propose_boundaries<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<usize>, Error>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&SplitRequest { text })
                .send()
                .await
                .map_err(|e| Error::Request(e.to_string()))?;

            if !response.status().is_success() {
                return Err(Error::Request(format!(
                    "sentence splitter returned {}",
                    response.status()
                )));
            }

            let parsed: SplitResponse = response
                .json()
                .await
                .map_err(|e| Error::Request(format!("malformed splitter response: {e}")))?;

            let word_count = text.split_whitespace().count();
            let mut boundaries: Vec<usize> = parsed
                .boundaries
                .into_iter()
                .filter(|&b| b > 0 && b <= word_count)
                .collect();
            boundaries.sort_unstable();
            boundaries.dedup();
            Ok(boundaries)
        })
    }
}

/// Picks the earliest proposed boundary; it is applied exactly as a
/// punctuation-triggered seal would be.
pub fn earliest_boundary(boundaries: &[usize]) -> Option<usize> {
    boundaries.iter().copied().min()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earliest_boundary_picks_minimum() {
        assert_eq!(earliest_boundary(&[9, 3, 17]), Some(3));
        assert_eq!(earliest_boundary(&[]), None);
    }
}
