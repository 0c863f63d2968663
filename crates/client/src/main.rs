//! Rock-paper-scissors client binary.
//!
//! # Architecture
//!
//! This binary is the composition root that assembles:
//! 1. Runtime (wallet session and rounds) via RuntimeBuilder
//! 2. Frontend (UI) - CLI, GUI, etc.
//!
//! # Examples
//!
//! ```bash
//! # Against a local node with an unlocked account
//! RPS_RPC_URL=http://127.0.0.1:8545 RPS_CONTRACT_ADDRESS=0x... cargo run -p rps-client
//! ```

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    #[cfg(feature = "frontend-cli")]
    {
        run_cli().await?;
    }

    #[cfg(not(feature = "frontend-cli"))]
    {
        compile_error!("At least one frontend feature must be enabled (frontend-cli, ...)");
    }

    Ok(())
}

/// Run the CLI frontend.
#[cfg(feature = "frontend-cli")]
async fn run_cli() -> Result<()> {
    use client_bootstrap::{ClientConfig, RuntimeBuilder};
    use client_frontend_cli::{CliConfig, CliFrontend, FrontendConfig, logging};
    use rps_client::Client;

    // 1. Load configuration from environment
    let client_config = ClientConfig::from_env();
    let frontend_config = FrontendConfig::from_env();
    let cli_config = CliConfig::from_env();

    // 2. Setup logging; the guard flushes the log file on exit
    let _log_guard = logging::setup_logging(client_config.session_id.as_deref())?;

    tracing::info!("Starting rock-paper-scissors client");
    tracing::info!(
        provider = client_config.evm.is_some(),
        countdown = client_config.runtime.game_config.countdown_seconds,
        wager = %client_config.runtime.default_wager,
        "Configuration loaded"
    );

    // 3. Build Runtime (independent layer)
    let setup = RuntimeBuilder::new(client_config).build().await?;
    tracing::info!("Runtime built successfully");

    // 4. Build Frontend (independent layer)
    let frontend = CliFrontend::new(frontend_config, cli_config).with_network(setup.network);

    // 5. Build and run
    let client = Client::builder()
        .runtime(setup.runtime)
        .frontend(frontend)
        .build()?;

    tracing::info!("Client assembled, starting...");
    client.run().await?;

    tracing::info!("Client shutdown complete");
    Ok(())
}
