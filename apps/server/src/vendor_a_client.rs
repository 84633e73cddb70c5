//! Wires the real vendor-A session-token-authenticated realtime socket
//! into [`asr_adapter::vendor_a::spawn`]'s callback-shaped channel.
//!
//! `asr_adapter::vendor_a` models vendor-A as an SDK that hands
//! transcripts to callbacks; this module is the thing that would
//! register those callbacks against the vendor's actual wire protocol,
//! the way `asr_adapter::vendor_b::connect` does for the raw-socket
//! vendor. Kept outside `asr_adapter` because it is a transport detail
//! of this deployment, not part of the adapter's normalization contract.

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;

use asr_adapter::vendor_a::VendorAPayload;
use asr_adapter::{EventReceiver, Error};

#[derive(Clone)]
pub struct VendorAConfig {
    pub url: url::Url,
    pub session_token: String,
    /// Vendor-A requires the source language up front; `None` only when
    /// a caller mistakenly omits it (the route handler always supplies
    /// it from `SessionParams`, where it is vendor-A's only required
    /// field not defaulted).
    pub source_lang: Option<String>,
}

/// The client-audio-forwarding half, held by the route handler.
pub struct VendorAHandle {
    audio_tx: mpsc::Sender<Bytes>,
}

impl VendorAHandle {
    pub async fn send_audio(&self, frame: Bytes) -> Result<(), Error> {
        self.audio_tx
            .send(frame)
            .await
            .map_err(|_| Error::ClientClosed)
    }
}

/// Wire shape of a vendor-A callback payload. Diarized, unlike
/// vendor-B: every transcript frame carries its own `speaker_id`.
#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type")]
enum VendorAMessage {
    SessionEstablished,
    Transcript {
        speaker_id: String,
        words: Vec<VendorAWord>,
    },
    KeepAlive,
    #[serde(other)]
    Other,
}

#[derive(Debug, serde::Deserialize)]
struct VendorAWord {
    word: String,
    is_final: bool,
}

const CHANNEL_CAPACITY: usize = 64;

/// Connects to vendor-A's realtime endpoint and spawns the audio-forward
/// and message-normalization tasks. The session token travels as a query
/// parameter.
pub async fn connect(config: VendorAConfig) -> Result<(VendorAHandle, EventReceiver), Error> {
    let mut url = config.url;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("token", &config.session_token);
        if let Some(lang) = &config.source_lang {
            pairs.append_pair("language", lang);
        }
    }

    let request = url
        .as_str()
        .into_client_request()
        .map_err(|e| Error::Connect(Box::new(e)))?;

    let (stream, response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| Error::Connect(Box::new(e)))?;

    if response.status().as_u16() == 401 || response.status().as_u16() == 403 {
        return Err(Error::Auth(format!(
            "vendor-a rejected the session token: {}",
            response.status()
        )));
    }

    let (mut ws_sender, mut ws_receiver) = stream.split();
    let (audio_tx, mut audio_rx) = mpsc::channel::<Bytes>(CHANNEL_CAPACITY);
    let (payload_tx, payload_rx) = mpsc::unbounded_channel::<VendorAPayload>();

    tokio::spawn(async move {
        while let Some(frame) = audio_rx.recv().await {
            if ws_sender.send(WsMessage::Binary(frame.to_vec().into())).await.is_err() {
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    tokio::spawn(async move {
        loop {
            match ws_receiver.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    match serde_json::from_str::<VendorAMessage>(&text) {
                        Ok(VendorAMessage::SessionEstablished) => {
                            let _ = payload_tx.send(VendorAPayload::SessionEstablished);
                        }
                        Ok(VendorAMessage::KeepAlive) => {
                            let _ = payload_tx.send(VendorAPayload::KeepAlive);
                        }
                        Ok(VendorAMessage::Transcript { speaker_id, words }) => {
                            let words = words.into_iter().map(|w| (w.word, w.is_final)).collect();
                            let _ = payload_tx.send(VendorAPayload::Transcript { speaker_id, words });
                        }
                        Ok(VendorAMessage::Other) => {}
                        Err(e) => {
                            tracing::warn!(error = %e, "vendor_a_malformed_message");
                        }
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    let _ = payload_tx.send(VendorAPayload::Disconnected);
                    break;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "vendor_a_read_error");
                    let _ = payload_tx.send(VendorAPayload::Disconnected);
                    break;
                }
            }
        }
    });

    let event_rx = asr_adapter::vendor_a::spawn(payload_rx);
    Ok((VendorAHandle { audio_tx }, event_rx))
}
