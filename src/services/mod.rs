// All service modules
pub mod contact_service;
pub mod game_rooms;
pub mod wallet_watcher;

// Re-export for convenience
pub use contact_service::{ContactLog, ContactService, TracingContactLog};

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{config::Config, wallet::{RpcWalletProvider, WalletAdapter}};

/// Start all background services. Each returned task ends once `shutdown`
/// flips to `true`.
pub fn start_background_services(
    config: &Config,
    adapter: Arc<WalletAdapter>,
    rpc: Option<Arc<RpcWalletProvider>>,
    shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    tracing::info!("Starting background services...");
    let mut tasks = Vec::new();

    if config.enable_wallet_watcher {
        match rpc {
            Some(rpc) => {
                tasks.push(tokio::spawn(wallet_watcher::run_wallet_watcher(
                    adapter, rpc, shutdown,
                )));
            }
            None => tracing::warn!("Wallet watcher enabled but no RPC provider is configured"),
        }
    } else {
        tracing::debug!("Wallet watcher disabled via ENABLE_WALLET_WATCHER");
    }

    tracing::info!("All background services started successfully");
    tasks
}
