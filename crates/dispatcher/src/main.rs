use std::sync::Arc;

use contract_client::EvmLedger;
use dispatcher::config::DispatcherConfig;
use dispatcher::dispatch::HttpWorkerClient;
use dispatcher::{api, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = DispatcherConfig::from_env()?;

    let ledger = EvmLedger::new(
        &config.rpc_url,
        config.registry_address,
        config.escrow_address,
        config.token_address,
        &config.private_key,
    )?;
    tracing::info!(payer = %ledger.payer_address(), "dispatcher wallet loaded");

    let state = Arc::new(AppState {
        ledger: Arc::new(ledger),
        worker: Arc::new(HttpWorkerClient::new()),
    });

    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;
    tracing::info!(addr = %config.http_addr, "dispatcher listening");
    axum::serve(listener, app).await?;

    Ok(())
}
