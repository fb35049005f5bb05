// Wallet connection over an injected provider
pub mod adapter;
pub mod provider;
pub mod rpc_provider;
pub mod units;

#[cfg(test)]
pub(crate) mod testing;

pub use adapter::{NoticeVariant, WalletAdapter, WalletError, WalletSession};
pub use provider::WalletProvider;
pub use rpc_provider::RpcWalletProvider;
