use anyhow::Result;
use axum::{Router, routing::get};
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use huddle_server::{Hub, ws_handler};

#[derive(Parser)]
#[command(name = "huddle-server", about = "Rendezvous relay for huddle rooms")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let hub = Hub::new();

    let app = Router::new()
        .route("/", get(|| async { "huddle signaling server" }))
        .route("/ws", get(ws_handler))
        .with_state(hub);

    info!("signaling server listening on http://{}", args.listen);
    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
