use ethers::types::{Address, U256};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, Notify};

use super::provider::{ProviderError, ProviderEvent, WalletProvider};

pub(crate) fn account(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

pub(crate) fn ether(whole: u64) -> U256 {
    U256::from(whole) * U256::exp10(18)
}

/// In-memory provider for adapter and handler tests.
pub(crate) struct FakeProvider {
    accounts: Vec<Address>,
    reject: bool,
    native: Mutex<U256>,
    fail_native: AtomicBool,
    native_gate: Mutex<Option<Arc<Notify>>>,
    native_reads: AtomicUsize,
    token_balance: Option<U256>,
    requests: AtomicUsize,
    events: broadcast::Sender<ProviderEvent>,
}

impl FakeProvider {
    pub(crate) fn with_accounts(accounts: Vec<Address>) -> Self {
        let (events, _) = broadcast::channel(8);
        Self {
            accounts,
            reject: false,
            // 1.5 ether
            native: Mutex::new(ether(3) / 2),
            fail_native: AtomicBool::new(false),
            native_gate: Mutex::new(None),
            native_reads: AtomicUsize::new(0),
            token_balance: Some(ether(250)),
            requests: AtomicUsize::new(0),
            events,
        }
    }

    pub(crate) fn rejecting(mut self) -> Self {
        self.reject = true;
        self
    }

    pub(crate) fn without_token(mut self) -> Self {
        self.token_balance = None;
        self
    }

    pub(crate) fn set_native(&self, value: U256) {
        *self.native.lock().unwrap() = value;
    }

    pub(crate) fn fail_native(&self, fail: bool) {
        self.fail_native.store(fail, Ordering::SeqCst);
    }

    /// Makes native balance reads wait until the returned gate is notified.
    pub(crate) fn hold_native_reads(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.native_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub(crate) fn native_read_count(&self) -> usize {
        self.native_reads.load(Ordering::SeqCst)
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    pub(crate) fn emit(&self, event: ProviderEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait::async_trait]
impl WalletProvider for FakeProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            return Err(ProviderError::UserRejected);
        }
        Ok(self.accounts.clone())
    }

    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        Ok(self.accounts.clone())
    }

    async fn native_balance(&self, _owner: Address) -> Result<U256, ProviderError> {
        self.native_reads.fetch_add(1, Ordering::SeqCst);
        let gate = self.native_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_native.load(Ordering::SeqCst) {
            return Err(ProviderError::Rpc("eth_getBalance unavailable".to_string()));
        }
        Ok(*self.native.lock().unwrap())
    }

    async fn token_balance_of(
        &self,
        _token: Address,
        _owner: Address,
    ) -> Result<U256, ProviderError> {
        self.token_balance
            .ok_or_else(|| ProviderError::Contract("execution reverted".to_string()))
    }

    async fn token_decimals(&self, _token: Address) -> Result<u8, ProviderError> {
        Ok(18)
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}
