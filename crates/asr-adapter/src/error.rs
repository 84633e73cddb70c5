/// Internal failure modes for an ASR adapter. The orchestrator maps these
/// onto the two client-visible kinds: auth/config failures are fatal,
/// everything else is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("vendor connection failed: {0}")]
    Connect(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("vendor authentication or configuration rejected the session: {0}")]
    Auth(String),

    #[error("vendor sent a malformed message: {0}")]
    Protocol(String),

    #[error("client audio channel closed")]
    ClientClosed,
}

impl Error {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Auth(_))
    }
}
