// chatgate - Chat API gateway
//
// A single HTTP entry point in front of the Anthropic Messages API:
// - Proxy server (axum): `/api/chat` gets CORS, a method gate, and a
//   per-client daily quota before the body is forwarded upstream
// - Quota: counters live in a pluggable store (in-memory or Redis)
// - Assets: every other path is served from a static directory

mod assets;
mod cli;
mod config;
mod logging;
mod proxy;
mod quota;
mod startup;

use anyhow::Result;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI commands first (config --show, --reset, --path)
    // If a command was handled, exit early
    if cli::handle_cli() {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = Config::from_env()?;

    // Flushes file logs on drop, keep it until main returns
    let _log_guard = logging::init(&config.logging);

    startup::print_startup(&config);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let mut proxy_handle = tokio::spawn(proxy::start_proxy(config, shutdown_rx));

    tokio::select! {
        // Server exited on its own (bind failure, quota store unreachable)
        result = &mut proxy_handle => {
            return result?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
        }
    }

    tracing::info!("Shutting down...");

    // If the send fails, the server has already stopped
    let _ = shutdown_tx.send(());
    proxy_handle.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
