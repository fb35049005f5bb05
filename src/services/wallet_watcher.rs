use std::sync::Arc;
use tokio::sync::{broadcast::error::RecvError, watch};

use crate::wallet::{NoticeVariant, RpcWalletProvider, WalletAdapter};

/// Polls the configured node for account and chain changes and keeps a
/// wallet session against it until `shutdown` flips.
pub async fn run_wallet_watcher(
    adapter: Arc<WalletAdapter>,
    rpc: Arc<RpcWalletProvider>,
    shutdown: watch::Receiver<bool>,
) {
    let poller = rpc.start_watcher();
    watch_session(adapter, shutdown).await;
    poller.abort();
}

/// Restores an already-authorised account when possible, otherwise requests
/// access, then logs every notice. The event listener is detached on
/// shutdown.
pub async fn watch_session(adapter: Arc<WalletAdapter>, mut shutdown: watch::Receiver<bool>) {
    let mut notices = adapter.subscribe_notices();

    let restored = match adapter.restore().await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("Wallet restore failed: {}", e);
            None
        }
    };
    if restored.is_none() {
        if let Err(e) = adapter.connect().await {
            tracing::warn!("Wallet watcher could not connect: {}", e);
        }
    }

    let listener = match adapter.attach() {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Wallet watcher could not subscribe to provider events: {}", e);
            return;
        }
    };
    tracing::info!("Wallet watcher started (listener active: {})", listener.is_active());

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            received = notices.recv() => match received {
                Ok(notice) => {
                    let session = adapter.session().await;
                    match notice.variant {
                        NoticeVariant::Default => tracing::info!(
                            "{}: {} (address={:?}, native={:?}, snr={:?})",
                            notice.title,
                            notice.description,
                            session.address,
                            session.native_balance,
                            session.token_balance
                        ),
                        NoticeVariant::Destructive => {
                            tracing::warn!("{}: {}", notice.title, notice.description)
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("Wallet watcher skipped {} notices", skipped);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    listener.detach().await;
    tracing::info!("Wallet watcher stopped");
}
