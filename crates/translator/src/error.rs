/// Internal translator failure modes. The orchestrator maps these onto
/// transient and fatal kinds at the client boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("translation request timed out")]
    Timeout,
    #[error("transient translation failure: {0}")]
    Transient(String),
    #[error("translation backend rejected the request (auth or quota): {0}")]
    Fatal(String),
    #[error("translation request was cancelled")]
    Cancelled,
}

impl Error {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Fatal(_))
    }
}
