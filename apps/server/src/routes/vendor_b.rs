use std::sync::Arc;

use asr_adapter::vendor_b::{self, VendorBConfig};
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::params::SessionParams;
use crate::routes::{
    build_translators, connect_asr_with_retry, new_session_id, run_session, send_asr_error_and_close,
};
use crate::state::{parse_auth_header, AppState};

const VENDOR_B_URL: &str = "wss://api.asr-vendor-b.example.com/stream";

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

    let auth_header = match parse_auth_header(&state.env.asr_vendor_b_auth_header) {
        Ok(h) => h,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };

    let vendor_config = VendorBConfig {
        url: VENDOR_B_URL.parse().expect("vendor-b url is a constant"),
        auth_header: Some(auth_header),
    };

    let (confirmed, partial) = build_translators(&state, &config, speed_config);
    let tone = state.tone_detector.clone();
    let splitter = state.splitter.clone();

    ws.on_upgrade(move |socket| async move {
        let connected = connect_asr_with_retry(|| vendor_b::connect(vendor_config.clone())).await;

        let (handle, events) = match connected {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "vendor_b_connect_failed");
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
