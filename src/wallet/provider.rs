use ethers::types::{Address, U256};
use thiserror::Error;
use tokio::sync::broadcast;

/// Notification pushed by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// `accountsChanged`; an empty list means the user revoked access.
    AccountsChanged(Vec<Address>),
    /// `chainChanged` with the new chain id.
    ChainChanged(U256),
}

#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("User rejected the request")]
    UserRejected,

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Contract call failed: {0}")]
    Contract(String),
}

/// Wallet capability handed to the adapter.
///
/// Mirrors the EIP-1193 surface a browser wallet injects: an account access
/// request, read-only balance queries and an event stream for
/// `accountsChanged` / `chainChanged`.
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
    /// `eth_requestAccounts`; may prompt the user.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// `eth_accounts`; already-authorised accounts, never prompts.
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError>;

    async fn native_balance(&self, owner: Address) -> Result<U256, ProviderError>;

    /// ERC-20 `balanceOf(owner)`.
    async fn token_balance_of(&self, token: Address, owner: Address)
        -> Result<U256, ProviderError>;

    /// ERC-20 `decimals()`.
    async fn token_decimals(&self, token: Address) -> Result<u8, ProviderError>;

    /// New subscription to provider events. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}
