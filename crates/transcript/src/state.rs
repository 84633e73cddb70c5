use std::collections::BTreeMap;

use tokio::time::Instant;

use crate::word::Word;

/// How many sentence-terminating marks must appear in the unsealed tail
/// before it seals. User-facing knob; `high` reacts to a single period,
/// `low` waits for two (steadier captions, more latency).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggressiveness {
    High,
    Low,
}

impl Aggressiveness {
    pub fn confirm_punct_count(self) -> usize {
        match self {
            Aggressiveness::High => 1,
            Aggressiveness::Low => 2,
        }
    }
}

/// Register label fed into the translator prompt. Set at most once per
/// speaker by the tone detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Unset,
    Casual,
    CasualPolite,
    Formal,
    Narrative,
    Generic,
}

/// The most recently sealed sentence and its translation, handed to the
/// translator as one-shot context for the next request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextPair {
    pub source: String,
    pub translation: String,
}

/// Per-speaker segmentation and translation-sequencing state. Created
/// lazily on a speaker's first event; owned exclusively by the orchestrator
/// loop that drives it (see `session::Session`).
pub struct SpeakerState {
    pub speaker_id: String,
    pub aggressiveness: Aggressiveness,
    pub(crate) partial_interval: u64,

    pub(crate) full_text: Vec<Word>,
    pub confirmed_word_count: usize,
    pub confirmed_source_text: String,
    pub(crate) last_remaining_text: Option<String>,

    pub update_count: u64,
    pub last_partial_source: Option<String>,
    pub partial_seq: u64,
    pub latest_partial_seq: u64,
    pub partial_stale: bool,

    pub confirmed_translation: String,
    pub last_confirmed_pair: ContextPair,

    pub(crate) confirmed_seal_seq: u64,
    pub(crate) next_confirmed_delivery_seq: u64,
    pub(crate) pending_confirmed_deliveries: BTreeMap<u64, (ContextPair, String)>,

    pub(crate) last_activity: Instant,

    pub tone: Tone,
    pub tone_triggered: bool,
    pub(crate) splitter_in_flight: bool,
}

impl SpeakerState {
    pub fn new(
        speaker_id: impl Into<String>,
        aggressiveness: Aggressiveness,
        partial_interval: u64,
        now: Instant,
    ) -> Self {
        Self {
            speaker_id: speaker_id.into(),
            aggressiveness,
            partial_interval: partial_interval.max(1),
            full_text: Vec::new(),
            confirmed_word_count: 0,
            confirmed_source_text: String::new(),
            last_remaining_text: None,
            update_count: 0,
            last_partial_source: None,
            partial_seq: 0,
            latest_partial_seq: 0,
            partial_stale: false,
            confirmed_translation: String::new(),
            last_confirmed_pair: ContextPair::default(),
            confirmed_seal_seq: 0,
            next_confirmed_delivery_seq: 0,
            pending_confirmed_deliveries: BTreeMap::new(),
            last_activity: now,
            tone: Tone::Unset,
            tone_triggered: false,
            splitter_in_flight: false,
        }
    }

    pub fn remaining_word_count(&self) -> usize {
        self.full_text.len() - self.confirmed_word_count
    }

    pub fn splitter_in_flight(&self) -> bool {
        self.splitter_in_flight
    }

    /// The current unsealed tail, joined as the splitter and partial
    /// translator both expect it.
    pub fn remaining_text(&self) -> String {
        crate::word::join_words(&self.full_text[self.confirmed_word_count..])
    }
}
