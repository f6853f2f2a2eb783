use anyhow::Context;
use clap::Parser;

use tracing_subscriber::fmt;
use tracing::{info, Level};

use server::catalog::Catalog;
use server::config::ServerConfig;
use server::registry::Registry;
use server::server_listener::ServerListener;
use server::web::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    fmt()
        .compact()
        .with_max_level(if config.verbose { Level::DEBUG } else { Level::INFO })
        .with_thread_ids(true)
        .init();

    // file catalog is computed once, clients get the same list for the life of the process
    let catalog = Catalog::load(&config.media_dir)
        .with_context(|| format!("unable to list media directory {:?}", &config.media_dir))?;

    // Setup registry map, shared with every connection task and http handler
    let registry = Registry::new();
    let state = AppState::new(registry, catalog);

    let (addr, server) = ServerListener::spawn_accept(&config.bind, state).await
        .with_context(|| format!("unable to bind {}", &config.bind))?;

    info!("Operator page at http://{}/", addr);

    tokio::select! {
        _ = server => info!("Server task finished"),
        _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
    }

    Ok(())
}
