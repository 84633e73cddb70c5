use transcript::ContextPair;

/// Everything a translation call completing can report back. Carries its
/// own `speaker_id` because, by the time it lands on the result channel,
/// the orchestrator has moved on to other speakers.
pub enum TranslationOutcome {
    Confirmed {
        speaker_id: String,
        /// The seal-order sequence number this translation was
        /// dispatched for; used to deliver `ConfirmedTranslation`
        /// messages in seal order even when requests complete out of
        /// order.
        seal_seq: u64,
        result: Result<String, translator::Error>,
        pair_source: String,
        /// 0 on the first attempt, 1 on the one permitted retry:
        /// confirmed translations retry once on a transient failure
        /// before falling back to an inline marker.
        attempt: u8,
    },
    Partial {
        speaker_id: String,
        seq: u64,
        result: Result<String, translator::Error>,
    },
}

/// A message posted back onto the orchestrator's single receive loop by
/// a spawned translation / tone / splitter task. Nothing outside the
/// loop ever touches `SpeakerState` directly — this is the only path
/// back in.
pub enum PipelineEvent {
    Translation(TranslationOutcome),
    Tone {
        speaker_id: String,
        result: Result<transcript::Tone, tone::Error>,
    },
    Splitter {
        speaker_id: String,
        at_confirmed_word_count: usize,
        result: Result<Vec<usize>, splitter::Error>,
    },
}

/// Helper shared by both translation dispatch sites: builds the
/// `ContextPair` a completed confirmed translation should be recorded
/// against.
pub fn context_pair(source: String, translation: String) -> ContextPair {
    ContextPair { source, translation }
}
