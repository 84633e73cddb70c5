/// A single ASR-emitted token, tagged with whether the vendor considers it
/// settled. Non-final words may still be rewritten by a later `Update` for
/// the same speaker.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AsrWord {
    pub text: String,
    pub is_final: bool,
}

/// What kind of event this is: a normal incremental transcript update, or
/// an end-of-stream marker (vendor disconnect, or the vendor's own
/// utterance-end signal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Update,
    Eos,
}

/// The uniform shape both vendor adapters normalize into. `words` is the
/// vendor's current view of the speaker's unsealed tail — the pipeline
/// diffs this against what it already sealed, it is not a delta.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AsrEvent {
    pub speaker_id: String,
    pub words: Vec<AsrWord>,
    pub kind: EventKind,
}

impl AsrEvent {
    pub fn update(speaker_id: impl Into<String>, words: Vec<AsrWord>) -> Self {
        Self {
            speaker_id: speaker_id.into(),
            words,
            kind: EventKind::Update,
        }
    }

    pub fn eos(speaker_id: impl Into<String>) -> Self {
        Self {
            speaker_id: speaker_id.into(),
            words: Vec::new(),
            kind: EventKind::Eos,
        }
    }

    pub fn into_transcript_words(self) -> Vec<transcript::Word> {
        self.words
            .into_iter()
            .map(|w| transcript::Word::new(w.text))
            .collect()
    }
}

/// Vendor-B has no diarization; every event is attributed to this speaker.
pub const DEFAULT_SPEAKER_ID: &str = "default";
