//! Per-speaker segmentation state machine.
//!
//! This crate is pure and synchronous: it owns no sockets, spawns no tasks,
//! and never sleeps. A single [`SpeakerState`] tracks one speaker's word
//! window and decides, on every ASR update, what must seal, what must be
//! retranslated, and what may be skipped as a duplicate. Callers (the
//! session orchestrator) drive it and act on the returned
//! [`SegmentationOutcome`].

mod outcome;
mod segmentation;
mod state;
mod word;

pub use outcome::{PartialDispatch, SealedSentence, SegmentationOutcome};
pub use state::{Aggressiveness, ContextPair, SpeakerState, Tone};
pub use word::Word;
