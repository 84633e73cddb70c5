//! Query-string session parameters. Parsed once at connect time and
//! rejected with `400` before the WebSocket upgrade completes.

use serde::Deserialize;
use session::{SessionConfig, TranslatorMode, DEFAULT_PARTIAL_INTERVAL};
use transcript::Aggressiveness;

fn default_aggressiveness() -> u8 {
    1
}

fn default_partial_interval() -> u64 {
    DEFAULT_PARTIAL_INTERVAL
}

fn default_translator_mode() -> String {
    "quality".to_string()
}

#[derive(Debug, Deserialize)]
pub struct SessionParams {
    pub source_lang: Option<String>,
    pub target_lang: String,
    #[serde(default = "default_aggressiveness")]
    pub aggressiveness: u8,
    #[serde(default = "default_partial_interval")]
    pub partial_interval: u64,
    #[serde(default = "default_translator_mode")]
    pub translator_mode: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("aggressiveness must be 1 (high) or 2 (low), got {0}")]
    Aggressiveness(u8),
    #[error("partial_interval must be a positive integer, got {0}")]
    PartialInterval(u64),
    #[error("translator_mode must be \"quality\" or \"speed\", got {0:?}")]
    TranslatorMode(String),
    #[error("target_lang is required")]
    MissingTargetLang,
}

impl SessionParams {
    pub fn into_session_config(self, session_id: String) -> Result<SessionConfig, ParamsError> {
        if self.target_lang.trim().is_empty() {
            return Err(ParamsError::MissingTargetLang);
        }

        let aggressiveness = match self.aggressiveness {
            1 => Aggressiveness::High,
            2 => Aggressiveness::Low,
            other => return Err(ParamsError::Aggressiveness(other)),
        };

        if self.partial_interval == 0 {
            return Err(ParamsError::PartialInterval(self.partial_interval));
        }

        let translator_mode = match self.translator_mode.as_str() {
            "quality" => TranslatorMode::Quality,
            "speed" => TranslatorMode::Speed,
            _ => return Err(ParamsError::TranslatorMode(self.translator_mode)),
        };

        Ok(SessionConfig {
            session_id,
            source_lang: self.source_lang,
            target_lang: self.target_lang,
            aggressiveness,
            partial_interval: self.partial_interval,
            translator_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SessionParams {
        SessionParams {
            source_lang: Some("en".into()),
            target_lang: "es".into(),
            aggressiveness: 1,
            partial_interval: 6,
            translator_mode: "quality".into(),
        }
    }

    #[test]
    fn accepts_valid_params() {
        let config = params().into_session_config("s1".into()).unwrap();
        assert_eq!(config.aggressiveness, Aggressiveness::High);
        assert_eq!(config.translator_mode, TranslatorMode::Quality);
    }

    #[test]
    fn rejects_bad_aggressiveness() {
        let mut p = params();
        p.aggressiveness = 3;
        assert!(matches!(
            p.into_session_config("s1".into()),
            Err(ParamsError::Aggressiveness(3))
        ));
    }

    #[test]
    fn rejects_zero_partial_interval() {
        let mut p = params();
        p.partial_interval = 0;
        assert!(matches!(
            p.into_session_config("s1".into()),
            Err(ParamsError::PartialInterval(0))
        ));
    }

    #[test]
    fn rejects_unknown_translator_mode() {
        let mut p = params();
        p.translator_mode = "fast".into();
        assert!(matches!(
            p.into_session_config("s1".into()),
            Err(ParamsError::TranslatorMode(_))
        ));
    }

    #[test]
    fn rejects_empty_target_lang() {
        let mut p = params();
        p.target_lang = "".into();
        assert!(matches!(
            p.into_session_config("s1".into()),
            Err(ParamsError::MissingTargetLang)
        ));
    }
}
