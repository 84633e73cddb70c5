/// Outbound message kinds. Every variant carries `speaker`; `error`
/// does not, since it is session-scoped rather than speaker-scoped.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ConfirmedTranscript { speaker: String, text: String },
    PartialTranscript { speaker: String, text: String },
    ConfirmedTranslation { speaker: String, text: String },
    PartialTranslation { speaker: String, text: String },
    Error { kind: ErrorKind, detail: String },
}

/// Client-visible error taxonomy. `client_disconnect` is never
/// serialized — it only ever triggers session teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AsrTransient,
    AsrFatal,
    TranslationTransient,
    TranslationFatal,
    ToneFailure,
    SplitterFailure,
}
