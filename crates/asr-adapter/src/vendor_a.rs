//! Vendor-A: a callback-based SDK. The real SDK hands transcripts to
//! per-event callbacks registered at session start; we model that
//! boundary as an unbounded channel the SDK's callback thread feeds and a
//! task here that normalizes each payload into an [`AsrEvent`] and
//! publishes it to the bounded queue the orchestrator reads from.

use tokio::sync::mpsc;

use crate::event::{AsrEvent, AsrWord};
use crate::queue::{self, EventReceiver};

/// What the vendor SDK's callbacks actually deliver, before normalization.
/// `speaker_id` is present because vendor-A diarizes; `is_final` mirrors
/// the vendor's own per-word confidence flag.
#[derive(Debug, Clone)]
pub enum VendorAPayload {
    SessionEstablished,
    Transcript {
        speaker_id: String,
        words: Vec<(String, bool)>,
    },
    Disconnected,
    KeepAlive,
}

/// The sending half a vendor SDK callback registration would hold. Each
/// callback (`on_transcript`, `on_open`, `on_close`, …) calls `send` with
/// the payload shape above.
pub type VendorACallbackSender = mpsc::UnboundedSender<VendorAPayload>;

/// Spawns the normalization task and returns the receiver the orchestrator
/// drives. `callbacks` is fed by the vendor SDK's own callback threads.
pub fn spawn(mut callbacks: mpsc::UnboundedReceiver<VendorAPayload>) -> EventReceiver {
    let (tx, rx) = queue::channel();

    tokio::spawn(async move {
        let mut established = false;

        while let Some(payload) = callbacks.recv().await {
            match payload {
                VendorAPayload::SessionEstablished => {
                    established = true;
                }
                VendorAPayload::KeepAlive => {
                    // swallowed: not forwarded to the pipeline
                }
                VendorAPayload::Transcript { speaker_id, words } => {
                    if !established {
                        // the first update event is only forwarded once the
                        // vendor confirms the session is live
                        continue;
                    }
                    let words = words
                        .into_iter()
                        .map(|(text, is_final)| AsrWord { text, is_final })
                        .collect();
                    tx.push(AsrEvent::update(speaker_id, words)).await;
                }
                VendorAPayload::Disconnected => {
                    // synthetic eos lets every known speaker flush; the
                    // orchestrator fans this out per-speaker on its side,
                    // so a single sentinel with an empty speaker id is
                    // enough here.
                    tx.push(AsrEvent::eos(BROADCAST_EOS_SPEAKER)).await;
                    break;
                }
            }
        }

        tx.close();
    });

    rx
}

/// Sentinel speaker id carried by the synthetic end-of-stream event the
/// orchestrator expands to every live speaker in the session.
pub const BROADCAST_EOS_SPEAKER: &str = "*";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    #[tokio::test]
    async fn gates_first_update_until_session_established() {
        let (cb_tx, cb_rx) = mpsc::unbounded_channel();
        let mut events = spawn(cb_rx);

        cb_tx
            .send(VendorAPayload::Transcript {
                speaker_id: "a".into(),
                words: vec![("too".into(), false), ("early".into(), false)],
            })
            .unwrap();
        cb_tx.send(VendorAPayload::SessionEstablished).unwrap();
        cb_tx
            .send(VendorAPayload::Transcript {
                speaker_id: "a".into(),
                words: vec![("hello".into(), true)],
            })
            .unwrap();
        drop(cb_tx);

        let first = events.recv().await.unwrap();
        assert_eq!(first.words[0].text, "hello");
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn keepalive_is_swallowed() {
        let (cb_tx, cb_rx) = mpsc::unbounded_channel();
        let mut events = spawn(cb_rx);

        cb_tx.send(VendorAPayload::SessionEstablished).unwrap();
        cb_tx.send(VendorAPayload::KeepAlive).unwrap();
        cb_tx
            .send(VendorAPayload::Transcript {
                speaker_id: "a".into(),
                words: vec![("hi".into(), true)],
            })
            .unwrap();
        drop(cb_tx);

        let event = events.recv().await.unwrap();
        assert_eq!(event.words.len(), 1);
    }

    #[tokio::test]
    async fn disconnect_emits_synthetic_eos() {
        let (cb_tx, cb_rx) = mpsc::unbounded_channel();
        let mut events = spawn(cb_rx);

        cb_tx.send(VendorAPayload::SessionEstablished).unwrap();
        cb_tx.send(VendorAPayload::Disconnected).unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(event.kind, EventKind::Eos);
        assert_eq!(event.speaker_id, BROADCAST_EOS_SPEAKER);
    }
}
