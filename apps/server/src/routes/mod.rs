mod vendor_a;
mod vendor_b;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message as WsMessage, WebSocket};
use axum::routing::get;
use axum::Router;
use backon::{ExponentialBuilder, Retryable};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use session::{ClientMessage, ErrorKind, Session, SessionConfig, TranslatorMode};
use splitter::SentenceSplitter;
use tone::ToneDetector;
use translator::speed::{SpeedBackend, SpeedConfig};
use translator::Translator;

use crate::state::AppState;

/// Dials an ASR vendor connection, retrying a transient failure up to
/// two more times (three attempts total) with exponential backoff before
/// giving up. An auth/config rejection (`asr_adapter::Error::is_fatal`)
/// is never retried — §7 treats it as immediately fatal.
async fn connect_asr_with_retry<F, Fut, T>(connect: F) -> Result<T, asr_adapter::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, asr_adapter::Error>>,
{
    let backoff = ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(100))
        .with_factor(4.0)
        .with_max_delay(Duration::from_secs(2))
        .with_max_times(2);

    connect
        .retry(backoff)
        .notify(|err: &asr_adapter::Error, dur: Duration| {
            tracing::warn!(error = %err, retry_in = ?dur, "asr_connect_retrying");
        })
        .when(|e: &asr_adapter::Error| !e.is_fatal())
        .await
}

/// Sends a single `error` message over an already-upgraded client socket
/// and closes it. Used when the ASR vendor connection never comes up:
/// since there is no session to flush, this is the only message the
/// client ever sees for that attempt.
async fn send_asr_error_and_close(mut socket: WebSocket, err: &asr_adapter::Error) {
    let kind = if err.is_fatal() {
        ErrorKind::AsrFatal
    } else {
        ErrorKind::AsrTransient
    };
    let message = ClientMessage::Error {
        kind,
        detail: err.to_string(),
    };
    if let Ok(json) = serde_json::to_string(&message) {
        let _ = socket.send(WsMessage::Text(json.into())).await;
    }
    let _ = socket.close().await;
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stt/vendor-a", get(vendor_a::handler))
        .route("/stt/vendor-b", get(vendor_b::handler))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Builds the per-session translator pair: the speed backend is always
/// the partial translator and is shared across every speaker in the
/// session; the confirmed translator follows `translator_mode`.
pub fn build_translators(
    state: &AppState,
    config: &SessionConfig,
    speed_config: SpeedConfig,
) -> (Arc<dyn Translator>, Arc<dyn Translator>) {
    let speed: Arc<dyn Translator> = Arc::new(SpeedBackend::spawn(speed_config));

    let confirmed: Arc<dyn Translator> = match config.translator_mode {
        TranslatorMode::Quality => state.quality_translator.clone(),
        TranslatorMode::Speed => speed.clone(),
    };

    (confirmed, speed)
}

/// Drives one client WebSocket end to end: spawns the [`Session`]
/// orchestrator, forwards inbound audio frames to the ASR vendor handle,
/// and relays the session's outbound messages back to the client.
/// Shared by both vendor routes — only how `asr_events`/`send_audio` are
/// obtained differs between them.
pub async fn run_session<F, Fut>(
    socket: WebSocket,
    config: SessionConfig,
    asr_events: asr_adapter::EventReceiver,
    confirmed_translator: Arc<dyn Translator>,
    partial_translator: Arc<dyn Translator>,
    tone_detector: Arc<dyn ToneDetector>,
    splitter: Arc<dyn SentenceSplitter>,
    mut send_audio: F,
) where
    F: FnMut(Bytes) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = Result<(), asr_adapter::Error>> + Send,
{
    let session_id = config.session_id.clone();
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = tokio::sync::mpsc::channel::<ClientMessage>(256);
    let shutdown = CancellationToken::new();

    let session = Session::new(
        config,
        asr_events,
        outbound_tx,
        confirmed_translator,
        partial_translator,
        tone_detector,
        splitter,
        shutdown.clone(),
    );
    let session_handle = tokio::spawn(session.run());

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(message) => {
                        let Ok(json) = serde_json::to_string(&message) else { continue };
                        if ws_sender.send(WsMessage::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            inbound = ws_receiver.next() => {
                match inbound {
                    Some(Ok(WsMessage::Binary(frame))) => {
                        if send_audio(frame).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        tracing::debug!(session_id = %session_id, error = %e, "client_ws_read_error");
                        break;
                    }
                }
            }
        }
    }

    shutdown.cancel();
    let _ = session_handle.await;
}

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}
