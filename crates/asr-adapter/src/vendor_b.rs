//! Vendor-B: a raw streaming socket. We proxy client audio frames
//! unchanged to the vendor and parse its JSON text frames into
//! [`AsrEvent`]s. This vendor has no diarization, so every event is
//! attributed to [`crate::event::DEFAULT_SPEAKER_ID`].

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;

use crate::error::Error;
use crate::event::{AsrEvent, AsrWord, DEFAULT_SPEAKER_ID};
use crate::queue::{self, EventReceiver};

/// Upstream connection parameters for the vendor-B socket.
#[derive(Clone)]
pub struct VendorBConfig {
    pub url: url::Url,
    pub auth_header: Option<(String, String)>,
}

/// Wire shape of a vendor-B message: a `Results` frame carrying the
/// current transcript alternative, plus control frames the proxy must
/// not forward as transcript content.
#[derive(Debug, serde::Deserialize)]
#[serde(tag = "type")]
enum VendorBMessage {
    Results {
        is_final: bool,
        channel: VendorBChannel,
    },
    #[serde(rename = "KeepAlive")]
    KeepAlive,
    #[serde(other)]
    Other,
}

#[derive(Debug, serde::Deserialize)]
struct VendorBChannel {
    alternatives: Vec<VendorBAlternative>,
}

#[derive(Debug, serde::Deserialize)]
struct VendorBAlternative {
    words: Vec<VendorBWord>,
}

#[derive(Debug, serde::Deserialize)]
struct VendorBWord {
    word: String,
}

/// The client-audio-forwarding half, held by the session route handler.
pub struct VendorBHandle {
    audio_tx: mpsc::Sender<Bytes>,
}

impl VendorBHandle {
    /// Forwards one client audio frame unchanged. Never blocks the caller
    /// indefinitely: backpressure is bounded by the forwarding channel.
    pub async fn send_audio(&self, frame: Bytes) -> Result<(), Error> {
        self.audio_tx
            .send(frame)
            .await
            .map_err(|_| Error::ClientClosed)
    }
}

/// Connects to the vendor-B socket and spawns the forward/normalize
/// tasks. Returns immediately after the WebSocket handshake completes —
/// for this vendor there is no separate "session established" frame, so
/// the handshake itself is the readiness signal gating the first update.
pub async fn connect(config: VendorBConfig) -> Result<(VendorBHandle, EventReceiver), Error> {
    let mut request = config
        .url
        .as_str()
        .into_client_request()
        .map_err(|e| Error::Connect(Box::new(e)))?;

    if let Some((name, value)) = &config.auth_header {
        use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};

        let header_name = name
            .parse::<HeaderName>()
            .map_err(|e| Error::Auth(format!("invalid auth header name {name}: {e}")))?;
        let header_value = value
            .parse::<HeaderValue>()
            .map_err(|_| Error::Auth(format!("invalid auth header value for {name}")))?;
        request.headers_mut().insert(header_name, header_value);
    }

    let (stream, response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| Error::Connect(Box::new(e)))?;

    if response.status().as_u16() == 401 || response.status().as_u16() == 403 {
        return Err(Error::Auth(format!(
            "vendor-b rejected the session: {}",
            response.status()
        )));
    }

    let (mut ws_sender, mut ws_receiver) = stream.split();
    let (audio_tx, mut audio_rx) = mpsc::channel::<Bytes>(CHANNEL_CAPACITY);
    let (event_tx, event_rx) = queue::channel();

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
                    match serde_json::from_str::<VendorBMessage>(&text) {
                        Ok(VendorBMessage::KeepAlive) | Ok(VendorBMessage::Other) => continue,
                        Ok(VendorBMessage::Results { is_final, channel }) => {
                            let Some(alt) = channel.alternatives.into_iter().next() else {
                                continue;
                            };
                            let words = alt
                                .words
                                .into_iter()
                                .map(|w| AsrWord {
                                    text: w.word,
                                    is_final,
                                })
                                .collect();
                            event_tx
                                .push(AsrEvent::update(DEFAULT_SPEAKER_ID, words))
                                .await;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "vendor_b_malformed_message");
                        }
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    event_tx.push(AsrEvent::eos(DEFAULT_SPEAKER_ID)).await;
                    break;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "vendor_b_read_error");
                    event_tx.push(AsrEvent::eos(DEFAULT_SPEAKER_ID)).await;
                    break;
                }
            }
        }
        event_tx.close();
    });

    Ok((VendorBHandle { audio_tx }, event_rx))
}

const CHANNEL_CAPACITY: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_results_message() {
        let raw = r#"{"type":"Results","is_final":true,"channel":{"alternatives":[{"words":[{"word":"hi"},{"word":"there."}]}]}}"#;
        let msg: VendorBMessage = serde_json::from_str(raw).unwrap();
        match msg {
            VendorBMessage::Results { is_final, channel } => {
                assert!(is_final);
                assert_eq!(channel.alternatives[0].words.len(), 2);
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn parses_keepalive() {
        let raw = r#"{"type":"KeepAlive"}"#;
        let msg: VendorBMessage = serde_json::from_str(raw).unwrap();
        assert!(matches!(msg, VendorBMessage::KeepAlive));
    }

    #[test]
    fn unknown_type_is_other() {
        let raw = r#"{"type":"Metadata"}"#;
        let msg: VendorBMessage = serde_json::from_str(raw).unwrap();
        assert!(matches!(msg, VendorBMessage::Other));
    }
}
