use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::prompt::{supports_formality_param, system_prompt};
use crate::request::TranslationRequest;
use crate::Translator;

#[derive(Serialize)]
struct QualityRequest<'a> {
    text: &'a str,
    target_lang: &'a str,
    instructions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    formality: Option<&'static str>,
}

#[derive(Deserialize)]
struct QualityResponse {
    translation: String,
}

/// A stateless HTTP/2 quality-optimized MT client. One request per
/// translation, idempotent — safe to retry on transient failure.
pub struct QualityBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl QualityBackend {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .http2_prior_knowledge()
            .build()
            .map_err(|e| Error::Fatal(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    async fn call_once(&self, request: &TranslationRequest) -> Result<String, Error> {
        let formality = supports_formality_param(&request.target_lang).then_some(
            match request.tone {
                transcript::Tone::Formal => "more",
                transcript::Tone::Casual => "less",
                _ => "default",
            },
        );

        let body = QualityRequest {
            text: &request.text,
            target_lang: &request.target_lang,
            instructions: system_prompt(request.tone, &request.target_lang, &request.prev_pair),
            formality,
        };

        let response = self
            .client
            .post(format!("{}/translate", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Transient(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Fatal(format!("quality backend auth failed: {status}")));
        }
        if status.is_server_error() {
            return Err(Error::Transient(format!("quality backend {status}")));
        }
        if !status.is_success() {
            return Err(Error::Transient(format!("quality backend {status}")));
        }

        let parsed: QualityResponse = response
            .json()
            .await
            .map_err(|e| Error::Transient(format!("malformed quality response: {e}")))?;
        Ok(parsed.translation)
    }
}

impl Translator for QualityBackend {
    fn translate<'a>(
        &'a self,
        request: TranslationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, Error>> + Send + 'a>> {
        Box::pin(async move { self.call_once(&request).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transcript::{ContextPair, Tone};

    fn req(target_lang: &str, tone: Tone) -> TranslationRequest {
        TranslationRequest {
            speaker_id: "spk".into(),
            text: "Hello world.".into(),
            prev_pair: ContextPair::default(),
            tone,
            target_lang: target_lang.into(),
            kind: crate::TranslationKind::Confirmed,
        }
    }

    #[test]
    fn formality_only_set_for_supported_languages() {
        let supported = req("de", Tone::Formal);
        assert!(supports_formality_param(&supported.target_lang));

        let unsupported = req("en", Tone::Formal);
        assert!(!supports_formality_param(&unsupported.target_lang));
    }
}
