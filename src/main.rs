use anyhow::Context;
use clap::Parser;
use tracing::info;

use driftway::{app, cli::Cli, config::Config, registry::PeerRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(port) = cli.port {
        config.port = port;
    }

    let registry = PeerRegistry::new();
    let router = app(registry);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("driftway relay listening on {addr}");

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
