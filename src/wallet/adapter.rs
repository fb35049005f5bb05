use ethers::types::Address;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use crate::constants::{NATIVE_DECIMALS, NOTICE_BUFFER, SHORT_ADDRESS_CHARS};

use super::provider::{ProviderError, ProviderEvent, WalletProvider};
use super::units::{display_address, format_units, shorten_address};

/// Connection state of the user's wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WalletSession {
    pub address: Option<String>,
    pub native_balance: Option<String>,
    pub token_balance: Option<String>,
    pub connected: bool,
}

impl WalletSession {
    fn connected_to(address: String) -> Self {
        Self {
            address: Some(address),
            native_balance: None,
            token_balance: None,
            connected: true,
        }
    }
}

/// One read of the native and SNR balances, human-scaled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balances {
    pub native: String,
    pub token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// User-facing message produced by the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    fn info(title: &str, description: String) -> Self {
        Self {
            title: title.to_string(),
            description,
            variant: NoticeVariant::Default,
        }
    }

    fn destructive(title: &str, description: String) -> Self {
        Self {
            title: title.to_string(),
            description,
            variant: NoticeVariant::Destructive,
        }
    }
}

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("No wallet provider detected; install a wallet extension before connecting")]
    ProviderUnavailable,

    #[error("Wallet access request was rejected")]
    UserRejected,

    #[error("Wallet returned no accounts")]
    NoAccounts,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Provider(ProviderError),
}

impl From<ProviderError> for WalletError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::UserRejected => WalletError::UserRejected,
            other => WalletError::Provider(other),
        }
    }
}

/// Wallet connection and balance synchronisation over an injected provider.
pub struct WalletAdapter {
    provider: Option<Arc<dyn WalletProvider>>,
    token: Address,
    session: RwLock<WalletSession>,
    notices: broadcast::Sender<Notice>,
}

impl WalletAdapter {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, token: Address) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_BUFFER);
        Self {
            provider,
            token,
            session: RwLock::new(WalletSession::default()),
            notices,
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn session(&self) -> WalletSession {
        self.session.read().await.clone()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Requests account access and opens a session on the first account.
    ///
    /// # Returns
    /// * `Ok(WalletSession)` with the session after the initial balance refresh.
    /// * `Err(WalletError::ProviderUnavailable)` when no provider was injected.
    /// * `Err(WalletError::UserRejected)` when the user declined the request.
    /// * `Err(WalletError::NoAccounts)` when the provider returned no accounts,
    ///   or the session was cleared before the initial refresh finished.
    ///
    /// # Notes
    /// * A failed balance refresh does not fail the connect; the session keeps
    ///   its address with empty balances.
    pub async fn connect(&self) -> Result<WalletSession, WalletError> {
        let provider = match self.provider() {
            Ok(provider) => provider.clone(),
            Err(err) => return Err(self.fail("Wallet not found", err)),
        };

        let accounts = match provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(err) => return Err(self.fail("Connection failed", err.into())),
        };
        let Some(first) = accounts.first().copied() else {
            return Err(self.fail("Connection failed", WalletError::NoAccounts));
        };

        let session = self.open_session(first).await;
        let shown = display_address(&first);
        let Some(current) = session.address.clone().filter(|_| session.connected) else {
            return Err(self.fail("Connection failed", WalletError::NoAccounts));
        };
        if current != shown {
            tracing::info!("Wallet account switched to {} while connecting", current);
        }
        tracing::info!("Wallet connected: {}", current);
        self.notify(Notice::info(
            "Wallet connected",
            format!(
                "Connected to wallet {}",
                shorten_address(&current, SHORT_ADDRESS_CHARS)
            ),
        ));
        Ok(session)
    }

    /// Re-opens a session for an account the provider already authorised,
    /// without prompting.
    pub async fn restore(&self) -> Result<Option<WalletSession>, WalletError> {
        let provider = self.provider()?.clone();
        let accounts = provider.accounts().await?;
        match accounts.first() {
            Some(first) => {
                tracing::info!("Restoring wallet session for {}", display_address(first));
                Ok(Some(self.open_session(*first).await))
            }
            None => Ok(None),
        }
    }

    /// Clears the local session. Providers offer no revocation call.
    pub async fn disconnect(&self) {
        {
            let mut session = self.session.write().await;
            *session = WalletSession::default();
        }
        tracing::info!("Wallet disconnected");
        self.notify(Notice::info(
            "Wallet disconnected",
            "Disconnected from your wallet".to_string(),
        ));
    }

    /// Reads balances for `address` and stores them if the session still
    /// belongs to that address.
    pub async fn refresh_balances(&self, address: &str) -> Result<Balances, WalletError> {
        let owner = parse_address(address)?;
        let balances = self.read_balances(owner).await?;

        let shown = display_address(&owner);
        let mut session = self.session.write().await;
        if session.address.as_deref() == Some(shown.as_str()) {
            session.native_balance = Some(balances.native.clone());
            session.token_balance = Some(balances.token.clone());
        } else {
            tracing::debug!("Dropping stale balance refresh for {}", shown);
        }
        Ok(balances)
    }

    /// Reads balances for `address` without touching the session.
    pub async fn fetch_balances(&self, address: &str) -> Result<Balances, WalletError> {
        let owner = parse_address(address)?;
        self.read_balances(owner).await
    }

    /// Applies a provider notification to the session.
    pub async fn handle_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.first() {
                None => self.disconnect().await,
                Some(first) => {
                    tracing::info!("Wallet account changed to {}", display_address(first));
                    self.open_session(*first).await;
                }
            },
            ProviderEvent::ChainChanged(chain_id) => {
                let current = self.session.read().await.address.clone();
                let Some(address) = current else {
                    return;
                };
                tracing::info!("Wallet network changed to chain {}", chain_id);
                if let Err(e) = self.refresh_balances(&address).await {
                    tracing::warn!("Balance refresh after chain change failed: {}", e);
                }
            }
        }
    }

    /// Subscribes to provider events for as long as the returned listener lives.
    pub fn attach(self: &Arc<Self>) -> Result<SessionListener, WalletError> {
        let mut events = self.provider()?.subscribe();
        let adapter = Arc::clone(self);

        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => adapter.handle_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Missed {} wallet events; resyncing accounts", skipped);
                        if let Err(e) = adapter.resync().await {
                            tracing::warn!("Wallet resync failed: {}", e);
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            tracing::debug!("Wallet event listener stopped");
        });

        Ok(SessionListener {
            handle: Some(handle),
        })
    }

    async fn resync(&self) -> Result<(), WalletError> {
        let accounts = self.provider()?.accounts().await?;
        self.handle_event(ProviderEvent::AccountsChanged(accounts)).await;
        Ok(())
    }

    async fn open_session(&self, account: Address) -> WalletSession {
        let shown = display_address(&account);
        {
            let mut session = self.session.write().await;
            if session.address.as_deref() != Some(shown.as_str()) {
                *session = WalletSession::connected_to(shown.clone());
            }
        }
        if let Err(e) = self.refresh_balances(&shown).await {
            tracing::warn!("Error fetching balances for {}: {}", shown, e);
        }
        self.session().await
    }

    async fn read_balances(&self, owner: Address) -> Result<Balances, WalletError> {
        let provider = self.provider()?;
        let native = provider.native_balance(owner).await?;

        let token = match self.read_token_balance(&**provider, owner).await {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("SNR balance read failed for {:?}: {}", owner, e);
                "0".to_string()
            }
        };

        Ok(Balances {
            native: format_units(native, NATIVE_DECIMALS)?,
            token,
        })
    }

    async fn read_token_balance(
        &self,
        provider: &dyn WalletProvider,
        owner: Address,
    ) -> Result<String, ProviderError> {
        let raw = provider.token_balance_of(self.token, owner).await?;
        let decimals = provider.token_decimals(self.token).await?;
        format_units(raw, decimals)
    }

    fn provider(&self) -> Result<&Arc<dyn WalletProvider>, WalletError> {
        self.provider.as_ref().ok_or(WalletError::ProviderUnavailable)
    }

    fn fail(&self, title: &str, err: WalletError) -> WalletError {
        self.notify(Notice::destructive(title, err.to_string()));
        err
    }

    fn notify(&self, notice: Notice) {
        match notice.variant {
            NoticeVariant::Default => tracing::debug!("Notice: {}", notice.title),
            NoticeVariant::Destructive => {
                tracing::warn!("Notice: {} - {}", notice.title, notice.description)
            }
        }
        let _ = self.notices.send(notice);
    }
}

fn parse_address(value: &str) -> Result<Address, WalletError> {
    Address::from_str(value.trim()).map_err(|_| WalletError::InvalidAddress(value.to_string()))
}

/// Keeps the adapter subscribed to provider events.
///
/// Dropping the listener stops the event task, which releases the provider
/// subscription. `detach` does the same and waits for the task to finish.
pub struct SessionListener {
    handle: Option<JoinHandle<()>>,
}

impl SessionListener {
    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub async fn detach(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for SessionListener {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SNR_TOKEN_ADDRESS;
    use crate::wallet::testing::{account, ether, FakeProvider};
    use ethers::types::U256;
    use std::time::Duration;

    fn token() -> Address {
        SNR_TOKEN_ADDRESS.parse().unwrap()
    }

    fn adapter_with(fake: &Arc<FakeProvider>) -> Arc<WalletAdapter> {
        let provider: Arc<dyn WalletProvider> = fake.clone();
        Arc::new(WalletAdapter::new(Some(provider), token()))
    }

    async fn wait_for<F>(adapter: &WalletAdapter, check: F) -> WalletSession
    where
        F: Fn(&WalletSession) -> bool,
    {
        for _ in 0..100 {
            let session = adapter.session().await;
            if check(&session) {
                return session;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        adapter.session().await
    }

    #[tokio::test]
    async fn connect_without_provider_yields_unavailable_notice() {
        let adapter = WalletAdapter::new(None, token());
        let mut notices = adapter.subscribe_notices();

        let result = adapter.connect().await;

        assert!(matches!(result, Err(WalletError::ProviderUnavailable)));
        let notice = notices.try_recv().unwrap();
        assert_eq!(notice.title, "Wallet not found");
        assert_eq!(notice.variant, NoticeVariant::Destructive);
        assert_eq!(adapter.session().await, WalletSession::default());
    }

    #[tokio::test]
    async fn connect_records_first_account_and_balances() {
        let fake = Arc::new(FakeProvider::with_accounts(vec![account(1), account(2)]));
        let adapter = adapter_with(&fake);
        let mut notices = adapter.subscribe_notices();

        let session = adapter.connect().await.unwrap();

        assert!(session.connected);
        assert_eq!(session.address, Some(display_address(&account(1))));
        assert_eq!(session.native_balance.as_deref(), Some("1.5"));
        assert_eq!(session.token_balance.as_deref(), Some("250.0"));
        assert_eq!(notices.try_recv().unwrap().title, "Wallet connected");
    }

    #[tokio::test]
    async fn rejected_request_leaves_no_session() {
        let fake = Arc::new(FakeProvider::with_accounts(vec![account(1)]).rejecting());
        let adapter = adapter_with(&fake);

        let result = adapter.connect().await;

        assert!(matches!(result, Err(WalletError::UserRejected)));
        assert!(!adapter.session().await.connected);
    }

    #[tokio::test]
    async fn empty_account_list_is_no_accounts() {
        let fake = Arc::new(FakeProvider::with_accounts(vec![]));
        let adapter = adapter_with(&fake);

        assert!(matches!(adapter.connect().await, Err(WalletError::NoAccounts)));
        assert_eq!(adapter.session().await, WalletSession::default());
    }

    #[tokio::test]
    async fn token_read_failure_degrades_to_zero() {
        let fake = Arc::new(FakeProvider::with_accounts(vec![account(1)]).without_token());
        let adapter = adapter_with(&fake);

        let session = adapter.connect().await.unwrap();

        assert_eq!(session.native_balance.as_deref(), Some("1.5"));
        assert_eq!(session.token_balance.as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn native_read_failure_keeps_address() {
        let fake = Arc::new(FakeProvider::with_accounts(vec![account(1)]));
        fake.fail_native(true);
        let adapter = adapter_with(&fake);

        let session = adapter.connect().await.unwrap();

        assert!(session.connected);
        assert!(session.native_balance.is_none());
        assert!(matches!(
            adapter.fetch_balances(&display_address(&account(1))).await,
            Err(WalletError::Provider(_))
        ));
    }

    #[tokio::test]
    async fn empty_accounts_changed_clears_session() {
        let fake = Arc::new(FakeProvider::with_accounts(vec![account(1)]));
        let adapter = adapter_with(&fake);
        adapter.connect().await.unwrap();

        adapter
            .handle_event(ProviderEvent::AccountsChanged(vec![]))
            .await;

        assert_eq!(adapter.session().await, WalletSession::default());
    }

    #[tokio::test]
    async fn chain_change_refreshes_balances() {
        let fake = Arc::new(FakeProvider::with_accounts(vec![account(1)]));
        let adapter = adapter_with(&fake);
        adapter.connect().await.unwrap();

        fake.set_native(ether(2));
        adapter
            .handle_event(ProviderEvent::ChainChanged(U256::from(11155111_u64)))
            .await;

        assert_eq!(
            adapter.session().await.native_balance.as_deref(),
            Some("2.0")
        );
    }

    #[tokio::test]
    async fn stale_refresh_does_not_reopen_session() {
        let fake = Arc::new(FakeProvider::with_accounts(vec![account(1)]));
        let adapter = adapter_with(&fake);
        adapter.connect().await.unwrap();
        adapter.disconnect().await;

        let balances = adapter
            .refresh_balances(&display_address(&account(1)))
            .await
            .unwrap();

        assert_eq!(balances.native, "1.5");
        assert_eq!(adapter.session().await, WalletSession::default());
    }

    #[tokio::test]
    async fn restore_uses_authorised_accounts_without_prompt() {
        let fake = Arc::new(FakeProvider::with_accounts(vec![account(3)]));
        let adapter = adapter_with(&fake);

        let restored = adapter.restore().await.unwrap();

        assert_eq!(
            restored.and_then(|s| s.address),
            Some(display_address(&account(3)))
        );
        assert_eq!(fake.request_count(), 0);
    }

    #[tokio::test]
    async fn attached_listener_follows_account_changes_until_detached() {
        let fake = Arc::new(FakeProvider::with_accounts(vec![account(1)]));
        let adapter = adapter_with(&fake);
        adapter.connect().await.unwrap();

        let listener = adapter.attach().unwrap();
        assert!(listener.is_active());
        assert_eq!(fake.subscriber_count(), 1);

        fake.emit(ProviderEvent::AccountsChanged(vec![account(2)]));
        let expected = display_address(&account(2));
        let session = wait_for(&adapter, |s| s.address.as_deref() == Some(expected.as_str())).await;
        assert_eq!(session.address, Some(expected));

        listener.detach().await;
        assert_eq!(fake.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn accounts_cleared_during_connect_is_a_failed_connect() {
        let fake = Arc::new(FakeProvider::with_accounts(vec![account(1)]));
        let gate = fake.hold_native_reads();
        let adapter = adapter_with(&fake);
        let mut notices = adapter.subscribe_notices();

        let connecting = tokio::spawn({
            let adapter = adapter.clone();
            async move { adapter.connect().await }
        });
        for _ in 0..100 {
            if fake.native_read_count() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(fake.native_read_count(), 1);

        adapter
            .handle_event(ProviderEvent::AccountsChanged(vec![]))
            .await;
        gate.notify_one();

        let result = connecting.await.unwrap();
        assert!(matches!(result, Err(WalletError::NoAccounts)));
        assert_eq!(adapter.session().await, WalletSession::default());

        let titles: Vec<String> = std::iter::from_fn(|| notices.try_recv().ok())
            .map(|notice| notice.title)
            .collect();
        assert!(!titles.iter().any(|title| title == "Wallet connected"));
        assert_eq!(titles.last().map(String::as_str), Some("Connection failed"));
    }

    #[tokio::test]
    async fn dropping_listener_releases_subscription() {
        let fake = Arc::new(FakeProvider::with_accounts(vec![account(1)]));
        let adapter = adapter_with(&fake);

        let listener = adapter.attach().unwrap();
        assert_eq!(fake.subscriber_count(), 1);
        drop(listener);

        for _ in 0..100 {
            if fake.subscriber_count() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(fake.subscriber_count(), 0);

        fake.emit(ProviderEvent::AccountsChanged(vec![account(2)]));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(adapter.session().await, WalletSession::default());
    }

    #[tokio::test]
    async fn attach_without_provider_fails() {
        let adapter = Arc::new(WalletAdapter::new(None, token()));
        assert!(matches!(
            adapter.attach(),
            Err(WalletError::ProviderUnavailable)
        ));
    }
}
