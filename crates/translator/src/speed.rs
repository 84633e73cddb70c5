//! A single persistent, bidirectional connection to an LLM-backed
//! translator, shared by every speaker in a session. Requests are
//! out-of-band (no server-side conversation history); the backend
//! assigns its own request id and we correlate completions back to the
//! caller that issued them.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::MaybeTlsStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;

use crate::Translator;
use crate::error::Error;
use crate::prompt::system_prompt;
use crate::request::TranslationRequest;

const INACTIVITY_PING_INTERVAL: Duration = Duration::from_secs(20);

pub struct SpeedConfig {
    pub url: url::Url,
    pub auth_header: (String, String),
}

#[derive(Serialize)]
struct OutboundRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
    target_lang: &'a str,
    instructions: String,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InboundMessage {
    Accepted {
        request_id: String,
    },
    Result {
        request_id: String,
        translation: String,
    },
    Error {
        request_id: String,
        message: String,
        #[serde(default)]
        fatal: bool,
    },
    #[serde(other)]
    Other,
}

enum Cmd {
    Translate(TranslationRequest, oneshot::Sender<Result<String, Error>>),
}

/// Handle to the persistent connection's supervisor task. Cheap to
/// clone; every speaker pipeline in the session shares one instance.
#[derive(Clone)]
pub struct SpeedBackend {
    cmd_tx: mpsc::UnboundedSender<Cmd>,
}

impl SpeedBackend {
    /// Spawns the supervisor task and returns immediately; the first
    /// connection attempt happens in the background, matching the
    /// "open at session start" requirement without blocking session
    /// setup on it.
    pub fn spawn(config: SpeedConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        tokio::spawn(supervisor(config, cmd_rx));
        Self { cmd_tx }
    }
}

impl Translator for SpeedBackend {
    fn translate<'a>(
        &'a self,
        request: TranslationRequest,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<String, Error>> + Send + 'a>>
    {
        Box::pin(async move {
            let (reply_tx, reply_rx) = oneshot::channel();
            self.cmd_tx
                .send(Cmd::Translate(request, reply_tx))
                .map_err(|_| Error::Fatal("speed backend connection supervisor is gone".into()))?;
            reply_rx
                .await
                .unwrap_or(Err(Error::Cancelled))
        })
    }
}

type WsStream = tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect_once(config: &SpeedConfig) -> Result<WsStream, Error> {
    let mut request = config
        .url
        .as_str()
        .into_client_request()
        .map_err(|e| Error::Fatal(format!("invalid speed backend url: {e}")))?;

    {
        use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
        let name = config
            .auth_header
            .0
            .parse::<HeaderName>()
            .map_err(|e| Error::Fatal(format!("invalid auth header name: {e}")))?;
        let value = config
            .auth_header
            .1
            .parse::<HeaderValue>()
            .map_err(|e| Error::Fatal(format!("invalid auth header value: {e}")))?;
        request.headers_mut().insert(name, value);
    }

    let (stream, _response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| Error::Transient(format!("speed backend connect failed: {e}")))?;
    Ok(stream)
}

/// Runs forever: connects (with exponential backoff on failure), drives
/// the connection until it drops, fails every in-flight request, then
/// reconnects. Only exits when every `SpeedBackend` handle is dropped.
async fn supervisor(config: SpeedConfig, mut cmd_rx: mpsc::UnboundedReceiver<Cmd>) {
    loop {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(100))
            .with_factor(4.0)
            .with_max_delay(Duration::from_secs(10))
            .without_max_times();

        let stream = match (|| connect_once(&config))
            .retry(backoff)
            .notify(|err: &Error, dur: Duration| {
                tracing::warn!(error = %err, retry_in = ?dur, "speed_backend_reconnecting");
            })
            .await
        {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!(error = %e, "speed_backend_connect_exhausted");
                continue;
            }
        };

        tracing::info!("speed_backend_connected");
        match drive_connection(stream, &mut cmd_rx).await {
            DriveOutcome::Shutdown => return,
            DriveOutcome::Reconnect => continue,
        }
    }
}

enum DriveOutcome {
    Shutdown,
    Reconnect,
}

async fn drive_connection(
    stream: WsStream,
    cmd_rx: &mut mpsc::UnboundedReceiver<Cmd>,
) -> DriveOutcome {
    let (mut sink, mut source) = stream.split();
    let mut awaiting_ack: VecDeque<oneshot::Sender<Result<String, Error>>> = VecDeque::new();
    let mut by_id: HashMap<String, oneshot::Sender<Result<String, Error>>> = HashMap::new();
    let mut ping = tokio::time::interval(INACTIVITY_PING_INTERVAL);
    ping.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let outcome = loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    None => break DriveOutcome::Shutdown,
                    Some(Cmd::Translate(request, reply)) => {
                        let payload = OutboundRequest {
                            kind: "translate",
                            text: &request.text,
                            target_lang: &request.target_lang,
                            instructions: system_prompt(request.tone, &request.target_lang, &request.prev_pair),
                        };
                        let Ok(json) = serde_json::to_string(&payload) else {
                            let _ = reply.send(Err(Error::Transient("failed to encode request".into())));
                            continue;
                        };
                        if sink.send(WsMessage::Text(json.into())).await.is_err() {
                            let _ = reply.send(Err(Error::Transient("send failed".into())));
                            break DriveOutcome::Reconnect;
                        }
                        awaiting_ack.push_back(reply);
                    }
                }
            }
            frame = source.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        match serde_json::from_str::<InboundMessage>(&text) {
                            Ok(InboundMessage::Accepted { request_id }) => {
                                if let Some(reply) = awaiting_ack.pop_front() {
                                    by_id.insert(request_id, reply);
                                }
                            }
                            Ok(InboundMessage::Result { request_id, translation }) => {
                                if let Some(reply) = by_id.remove(&request_id) {
                                    let _ = reply.send(Ok(translation));
                                }
                            }
                            Ok(InboundMessage::Error { request_id, message, fatal }) => {
                                if let Some(reply) = by_id.remove(&request_id) {
                                    let err = if fatal { Error::Fatal(message) } else { Error::Transient(message) };
                                    let _ = reply.send(Err(err));
                                }
                            }
                            Ok(InboundMessage::Other) => {}
                            Err(e) => tracing::warn!(error = %e, "speed_backend_malformed_message"),
                        }
                    }
                    Some(Ok(WsMessage::Pong(_))) => {}
                    Some(Ok(WsMessage::Close(_))) | None => break DriveOutcome::Reconnect,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "speed_backend_read_error");
                        break DriveOutcome::Reconnect;
                    }
                }
            }
            _ = ping.tick() => {
                if sink.send(WsMessage::Ping(Vec::new().into())).await.is_err() {
                    break DriveOutcome::Reconnect;
                }
            }
        }
    };

    for reply in awaiting_ack.into_iter() {
        let _ = reply.send(Err(Error::Transient("connection lost before ack".into())));
    }
    for (_, reply) in by_id.into_iter() {
        let _ = reply.send(Err(Error::Transient("connection lost in flight".into())));
    }

    outcome
}
