//! Translation backends for sealed and partial speaker text.
//!
//! Two interchangeable implementations share the [`Translator`] trait:
//! [`quality::QualityBackend`] (one HTTP/2 request per call, used for
//! confirmed translations in `quality` mode) and
//! [`speed::SpeedBackend`] (a single persistent connection shared by every
//! speaker in a session, used for all partials and for confirmed
//! translations in `speed` mode).

mod error;
mod prompt;
pub mod quality;
mod request;
pub mod speed;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub use error::Error;
pub use prompt::{FORMALITY_AWARE_LANGS, register_instruction, supports_formality_param, system_prompt};
pub use request::{TranslationKind, TranslationRequest};

/// Soft deadline for a translator call; expiry is treated as a transient
/// translation error.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Either translation backend. `translate` is fire-and-forget from the
/// pipeline's perspective — callers spawn it as a task and post the
/// result back through the orchestrator's result channel.
pub trait Translator: Send + Sync {
    fn translate<'a>(
        &'a self,
        request: TranslationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, Error>> + Send + 'a>>;
}

/// Wraps any translator call with the soft 5s deadline, turning an
/// elapsed timeout into `Error::Timeout` rather than leaving the caller to
/// wait indefinitely on a stalled backend.
pub async fn with_deadline<F>(fut: F) -> Result<String, Error>
where
    F: Future<Output = Result<String, Error>>,
{
    match tokio::time::timeout(REQUEST_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout),
    }
}
