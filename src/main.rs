use envconfig::Envconfig;
use probe_server::server::{shutdown_channel, wait_for_signal};
use probe_server::{from_fn, CheckRegistry, Config, DebugServer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_LEVEL_VAR: &str = "LOGLVL";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_LEVEL_VAR).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting probe server");

    let config = match Config::init_from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    let registry = CheckRegistry::new();
    registry.add_checker(from_fn("simple", || Ok(()))).await;

    let mut server = DebugServer::from_config(&config, registry)?;
    info!(
        port = config.port,
        shutdown_timeout = ?server.shutdown_timeout(),
        "Health server configured"
    );

    // Bridge the process interrupt into the shutdown channel
    let (shutdown_trigger, shutdown_signal) = shutdown_channel();
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Initiating graceful shutdown");
        shutdown_trigger.trigger();
    });

    if let Err(e) = server.run_until(shutdown_signal).await {
        error!(error = %e, state = %server.state(), "Health server failed");
        return Err(e.into());
    }

    info!("Probe server shut down gracefully");
    Ok(())
}
