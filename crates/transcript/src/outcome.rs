/// A sentence that just sealed: its sealed text and the `confirmed_word_count`
/// snapshot immediately after sealing (used by splitter staleness checks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedSentence {
    pub text: String,
    pub confirmed_word_count_after: usize,
    /// Monotonic per-speaker sequence assigned at seal time. Confirmed
    /// translations complete out of request order (retries, backend
    /// latency); the orchestrator uses this to hold a finished
    /// translation back until every earlier-sealed sentence has been
    /// delivered.
    pub seal_seq: u64,
}

/// A partial translation request the caller must dispatch concurrently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialDispatch {
    pub text: String,
    pub seq: u64,
}

/// Everything a single `apply_event` call decided. `sealed` is usually 0 or 1
/// entries, but a single ASR update can contain more than one full sentence
/// (aggressive punctuation), in which case every sentence seals in order.
#[derive(Debug, Clone, Default)]
pub struct SegmentationOutcome {
    pub partial_transcript: Option<String>,
    pub sealed: Vec<SealedSentence>,
    pub dispatch_partial_translation: Option<PartialDispatch>,
    pub dispatch_splitter: bool,
    pub dispatch_tone: bool,
}

impl SegmentationOutcome {
    pub fn is_empty(&self) -> bool {
        self.partial_transcript.is_none()
            && self.sealed.is_empty()
            && self.dispatch_partial_translation.is_none()
            && !self.dispatch_splitter
            && !self.dispatch_tone
    }
}
