//! `roadside-serve`: serve the web build from `SERVE_ROOT` on `HOST:PORT`.

use anyhow::{Context, Result};
use server::ServeConfig;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServeConfig::from_env()?;
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("binding {}:{}", config.host, config.port))?;
    log::info!(
        "Serving {} on http://{}",
        config.root.display(),
        listener.local_addr()?
    );

    axum::serve(listener, server::router(config.root)).await?;
    Ok(())
}
