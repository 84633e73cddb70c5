//! Normalizes two ASR vendor transports into one [`AsrEvent`] stream.
//!
//! Vendor-A is a callback SDK (see [`vendor_a`]); vendor-B is a raw
//! streaming socket with no diarization (see [`vendor_b`]). Both publish
//! into the same bounded, drop-oldest queue so the orchestrator never
//! cares which vendor produced an event.

mod error;
mod event;
mod queue;
pub mod vendor_a;
pub mod vendor_b;

pub use error::Error;
pub use event::{AsrEvent, AsrWord, DEFAULT_SPEAKER_ID, EventKind};
pub use queue::{CHANNEL_CAPACITY, EventReceiver, EventSender, channel};
pub use vendor_a::BROADCAST_EOS_SPEAKER;
