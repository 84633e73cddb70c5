use transcript::{ContextPair, Tone};

/// Distinguishes the two dispatch kinds. Only `Partial` carries a
/// sequence number — confirmed translations are always surfaced, so
/// there is nothing to compare it against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationKind {
    Confirmed,
    Partial { seq: u64 },
}

/// One translation request, fully self-contained: the translator needs
/// nothing from `SpeakerState` beyond what's copied in here.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub speaker_id: String,
    pub text: String,
    pub prev_pair: ContextPair,
    pub tone: Tone,
    pub target_lang: String,
    pub kind: TranslationKind,
}
