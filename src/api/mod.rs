// src/api/mod.rs
pub mod contact;
pub mod health;
pub mod rooms;
pub mod wallet;

use std::sync::Arc;

use crate::config::Config;
use crate::services::ContactLog;
use crate::wallet::WalletAdapter;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub contact_log: Arc<dyn ContactLog>,
    pub wallet: Arc<WalletAdapter>,
}
