use ethers::{
    providers::{Http, Middleware, Provider, ProviderError as EthersProviderError, RpcError},
    types::{Address, U256},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::constants::{EIP1193_USER_REJECTED, PROVIDER_EVENT_BUFFER};

use super::provider::{ProviderError, ProviderEvent, WalletProvider};

ethers::contract::abigen!(
    Erc20,
    r#"[
        function balanceOf(address) view returns (uint256)
        function decimals() view returns (uint8)
    ]"#
);

/// Wallet provider backed by a JSON-RPC node.
///
/// The node stands in for the injected browser wallet: account access goes
/// through `eth_requestAccounts` and change notifications are derived by
/// polling `eth_accounts` / `eth_chainId` (see [`RpcWalletProvider::start_watcher`]).
pub struct RpcWalletProvider {
    client: Arc<Provider<Http>>,
    events: broadcast::Sender<ProviderEvent>,
    poll_interval: Duration,
}

impl RpcWalletProvider {
    pub fn new(rpc_url: &str, poll_interval: Duration) -> Result<Self, ProviderError> {
        let client = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| ProviderError::Rpc(format!("Invalid EVM RPC URL: {}", e)))?;
        let (events, _) = broadcast::channel(PROVIDER_EVENT_BUFFER);
        Ok(Self {
            client: Arc::new(client),
            events,
            poll_interval,
        })
    }

    /// Spawns the poller that turns account and chain changes into events.
    ///
    /// The first successful poll only records a baseline. Failed polls are
    /// logged and retried on the next tick.
    pub fn start_watcher(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.poll_interval);
            let mut last_accounts: Option<Vec<Address>> = None;
            let mut last_chain: Option<U256> = None;

            loop {
                ticker.tick().await;

                match self.client.get_accounts().await {
                    Ok(accounts) => {
                        if let Some(event) = account_change(last_accounts.as_deref(), &accounts) {
                            self.publish(event);
                        }
                        last_accounts = Some(accounts);
                    }
                    Err(e) => tracing::warn!("eth_accounts poll failed: {}", e),
                }

                match self.client.get_chainid().await {
                    Ok(chain_id) => {
                        if let Some(event) = chain_change(last_chain, chain_id) {
                            self.publish(event);
                        }
                        last_chain = Some(chain_id);
                    }
                    Err(e) => tracing::warn!("eth_chainId poll failed: {}", e),
                }
            }
        })
    }

    fn publish(&self, event: ProviderEvent) {
        tracing::debug!("Wallet provider event: {:?}", event);
        let _ = self.events.send(event);
    }

    fn token(&self, token: Address) -> Erc20<Provider<Http>> {
        Erc20::new(token, self.client.clone())
    }
}

#[async_trait::async_trait]
impl WalletProvider for RpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.client
            .request::<_, Vec<Address>>("eth_requestAccounts", ())
            .await
            .map_err(map_rpc_error)
    }

    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.client.get_accounts().await.map_err(map_rpc_error)
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, ProviderError> {
        self.client
            .get_balance(owner, None)
            .await
            .map_err(map_rpc_error)
    }

    async fn token_balance_of(
        &self,
        token: Address,
        owner: Address,
    ) -> Result<U256, ProviderError> {
        self.token(token)
            .balance_of(owner)
            .call()
            .await
            .map_err(|e| ProviderError::Contract(e.to_string()))
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, ProviderError> {
        self.token(token)
            .decimals()
            .call()
            .await
            .map_err(|e| ProviderError::Contract(e.to_string()))
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

// Internal helper that parses or transforms values for `map_rpc_error`.
fn map_rpc_error(err: EthersProviderError) -> ProviderError {
    let code = err.as_error_response().map(|response| response.code);
    classify_rpc_error(code, err.to_string())
}

fn classify_rpc_error(code: Option<i64>, message: String) -> ProviderError {
    match code {
        Some(EIP1193_USER_REJECTED) => ProviderError::UserRejected,
        _ => ProviderError::Rpc(message),
    }
}

fn account_change(previous: Option<&[Address]>, current: &[Address]) -> Option<ProviderEvent> {
    match previous {
        Some(previous) if previous != current => {
            Some(ProviderEvent::AccountsChanged(current.to_vec()))
        }
        _ => None,
    }
}

fn chain_change(previous: Option<U256>, current: U256) -> Option<ProviderEvent> {
    match previous {
        Some(previous) if previous != current => Some(ProviderEvent::ChainChanged(current)),
        _ => None,
    }
}
