use clap::Parser;
use tokio_util::sync::CancellationToken;

use tracing_subscriber::fmt;
use tracing::{info, error, Level};

use client::ClientBuilder;
use client::config::ClientConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::parse();

    fmt()
        .compact() // use abbreviated log format
        .with_max_level(if config.verbose { Level::DEBUG } else { Level::INFO })
        .with_thread_ids(true) // display thread id where event happens
        .init(); // set as default subscriber

    info!("Client {} starting, server {:?}", &config.name, &config.server);

    // ctrl-c is the only thing that stops the reconnect loop
    let shutdown = CancellationToken::new();
    let interrupt = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupted by user");
                interrupt.cancel();
            },
            Err(e) => error!("Unable to listen for ctrl-c: {}", e),
        }
    });

    let mut client = ClientBuilder::new(config).shutdown(shutdown).build()?;
    let stats = client.run().await;

    info!(runs = stats.runs, restarts = stats.restarts, failures = stats.failures, "Client stopped");
    Ok(())
}
