use std::path::PathBuf;
use tokio::net::TcpListener;

use memorial_api::config::{load_config, load_default};
use memorial_api::{HttpServer, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    memorial_api::observability::logging::init();

    tracing::info!("memorial-api v0.1.0 starting");

    // Optional config file path as the single argument; defaults
    // otherwise. JWT_SECRET_KEY is honored either way.
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => load_config(&path)?,
        None => load_default()?,
    };

    tracing::info!(
        bind_address = %config.server.bind_address,
        access_ttl_secs = config.auth.access_ttl_secs,
        rate_limiting = config.rate_limit.enabled,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
