use ethers::types::Address;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::constants::{SNR_TOKEN_ADDRESS, WALLET_POLL_INTERVAL_SECS};
use crate::utils::is_env_flag_enabled;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Blockchain
    pub ethereum_rpc_url: Option<String>,

    // Contract Addresses
    pub snr_token_address: String,

    // Wallet watcher
    pub wallet_poll_interval_secs: u64,
    pub enable_wallet_watcher: bool,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            ethereum_rpc_url: env::var("ETHEREUM_RPC_URL")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),

            snr_token_address: env::var("SNR_TOKEN_ADDRESS")
                .unwrap_or_else(|_| SNR_TOKEN_ADDRESS.to_string()),

            wallet_poll_interval_secs: env::var("WALLET_POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| WALLET_POLL_INTERVAL_SECS.to_string())
                .parse()?,
            enable_wallet_watcher: is_env_flag_enabled("ENABLE_WALLET_WATCHER"),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if Address::from_str(self.snr_token_address.trim()).is_err() {
            anyhow::bail!("SNR_TOKEN_ADDRESS is not a valid EVM address");
        }
        if self.wallet_poll_interval_secs == 0 {
            anyhow::bail!("WALLET_POLL_INTERVAL_SECS must be > 0");
        }
        if self.enable_wallet_watcher && self.ethereum_rpc_url.is_none() {
            tracing::warn!("ENABLE_WALLET_WATCHER is set but ETHEREUM_RPC_URL is missing");
        }
        if self.ethereum_rpc_url.is_none() {
            tracing::warn!("ETHEREUM_RPC_URL not set; wallet endpoints will report provider unavailable");
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; falling back to permissive CORS");
        }
        Ok(())
    }

    /// Parsed SNR token address. Call after `validate`.
    pub fn token_address(&self) -> anyhow::Result<Address> {
        Ok(Address::from_str(self.snr_token_address.trim())?)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        ethereum_rpc_url: None,
        snr_token_address: SNR_TOKEN_ADDRESS.to_string(),
        wallet_poll_interval_secs: WALLET_POLL_INTERVAL_SECS,
        enable_wallet_watcher: false,
        cors_allowed_origins: "*".to_string(),
    }
}
