use transcript::Aggressiveness;

/// Default word-count interval between partial translation dispatches,
/// when the client doesn't override it. Treated as per-session
/// configuration, never a build-time constant (see DESIGN.md open
/// question).
pub const DEFAULT_PARTIAL_INTERVAL: u64 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslatorMode {
    Quality,
    Speed,
}

impl Default for TranslatorMode {
    fn default() -> Self {
        TranslatorMode::Quality
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub session_id: String,
    pub source_lang: Option<String>,
    pub target_lang: String,
    pub aggressiveness: Aggressiveness,
    pub partial_interval: u64,
    pub translator_mode: TranslatorMode,
}
