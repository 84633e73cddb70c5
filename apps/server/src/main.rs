mod env;
mod params;
mod routes;
mod state;
mod vendor_a_client;

use std::net::SocketAddr;

use axum::extract::MatchedPath;
use axum::http::Request;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use env::env;
use state::AppState;

/// Live caption/translation streaming server.
#[derive(Parser)]
struct Args {
    /// Override the listening port from `PORT`.
    #[arg(long)]
    port: Option<u16>,
    /// Override the tracing filter (`RUST_LOG`-style directive).
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let env = env();

    tracing_subscriber::registry()
        .with(
            args.log_level
                .clone()
                .map(tracing_subscriber::EnvFilter::new)
                .or_else(|| tracing_subscriber::EnvFilter::try_from_default_env().ok())
                .unwrap_or_else(|| {
                    tracing_subscriber::EnvFilter::new(if env.debug { "debug" } else { "info" })
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState::new(env)?;
    let port = args.port.unwrap_or(env.port);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async move {
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(addr = %addr, "server_listening");

            axum::serve(listener, app(state))
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            Ok::<(), anyhow::Error>(())
        })
}

fn app(state: AppState) -> axum::Router {
    routes::router(state).layer(
        TraceLayer::new_for_http().make_span_with(|request: &Request<axum::body::Body>| {
            let path = request.uri().path();
            if path == "/health" {
                return tracing::Span::none();
            }
            let matched_path = request
                .extensions()
                .get::<MatchedPath>()
                .map(MatchedPath::as_str)
                .unwrap_or(path);
            tracing::info_span!("http_request", method = %request.method(), http.route = %matched_path)
        }),
    )
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("shutdown_signal_received");
}
