use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::params::SessionParams;
use crate::routes::{build_translators, connect_asr_with_retry, new_session_id, run_session, send_asr_error_and_close};
use crate::state::AppState;
use crate::vendor_a_client::{self, VendorAConfig};

const VENDOR_A_URL: &str = "wss://api.asr-vendor-a.example.com/listen";

pub async fn handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    ws: WebSocketUpgrade,
) -> Response {
    let params: SessionParams = match serde_qs::from_str(query.as_deref().unwrap_or("")) {
        Ok(p) => p,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let session_id = new_session_id();
    let config = match params.into_session_config(session_id.clone()) {
        Ok(c) => c,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let speed_config = match state.speed_config() {
        Ok(c) => c,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };

    let vendor_config = VendorAConfig {
        url: VENDOR_A_URL.parse().expect("vendor-a url is a constant"),
        session_token: state.env.asr_vendor_a_token.clone(),
        source_lang: config.source_lang.clone(),
    };

    let (confirmed, partial) = build_translators(&state, &config, speed_config);
    let tone = state.tone_detector.clone();
    let splitter = state.splitter.clone();

    ws.on_upgrade(move |socket| async move {
        let connected =
            connect_asr_with_retry(|| vendor_a_client::connect(vendor_config.clone())).await;

        let (handle, events) = match connected {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "vendor_a_connect_failed");
                send_asr_error_and_close(socket, &e).await;
                return;
            }
        };
        let handle = Arc::new(handle);

        run_session(
            socket,
            config,
            events,
            confirmed,
            partial,
            tone,
            splitter,
            move |frame: Bytes| {
                let handle = handle.clone();
                async move { handle.send_audio(frame).await }
            },
        )
        .await;
    })
    .into_response()
}
