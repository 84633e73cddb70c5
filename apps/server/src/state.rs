use std::sync::Arc;

use splitter::{HttpSentenceSplitter, SentenceSplitter};
use tone::{HttpToneDetector, ToneDetector};
use translator::quality::QualityBackend;
use translator::speed::SpeedConfig;

use crate::env::Env;

const SPEED_BACKEND_URL: &str = "wss://api.translator-speed.example.com/translate";

/// Split a `"Header-Name: value"` env var into the `(name, value)` pair
/// the vendor-B and speed-backend transports expect.
pub fn parse_auth_header(raw: &str) -> anyhow::Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("auth header env var must be \"Name: value\", got {raw:?}"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

/// Shared, stateless backends every session in the process reuses.
/// The per-session persistent speed-backend connection is deliberately
/// not here — it is shared across a session's speakers, never across
/// sessions.
#[derive(Clone)]
pub struct AppState {
    pub env: &'static Env,
    pub quality_translator: Arc<QualityBackend>,
    pub tone_detector: Arc<dyn ToneDetector>,
    pub splitter: Arc<dyn SentenceSplitter>,
}

impl AppState {
    pub fn new(env: &'static Env) -> anyhow::Result<Self> {
        let quality_translator = Arc::new(QualityBackend::new(
            "https://api.translator-quality.example.com",
            env.translator_quality_api_key.clone(),
        )?);
        let tone_detector = Arc::new(HttpToneDetector::new(
            "https://api.translator-quality.example.com/tone",
            env.translator_quality_api_key.clone(),
        ));
        let splitter = Arc::new(HttpSentenceSplitter::new(
            "https://api.translator-quality.example.com/split",
            env.translator_quality_api_key.clone(),
        ));

        Ok(Self {
            env,
            quality_translator,
            tone_detector,
            splitter,
        })
    }

    /// A fresh speed-backend config for one session. The connection
    /// itself is per-session (`translator::speed::SpeedBackend::spawn`
    /// owns it), so only the dial parameters are shared state here.
    pub fn speed_config(&self) -> anyhow::Result<SpeedConfig> {
        Ok(SpeedConfig {
            url: SPEED_BACKEND_URL.parse()?,
            auth_header: parse_auth_header(&self.env.translator_speed_auth_header)?,
        })
    }
}
