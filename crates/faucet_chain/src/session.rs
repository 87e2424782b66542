use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::{ConnectionError, SubmitError};
use crate::types::{EntryFunctionPayload, PendingTransaction};
use crate::wallet::{ReadyState, WalletProvider};

/// Connection state of the page's wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSession {
    pub connected: bool,
    pub account_address: Option<String>,
    pub active_wallet_name: Option<String>,
}

impl WalletSession {
    /// `0x03c2...782c` style abbreviation of the account address.
    pub fn short_address(&self) -> Option<String> {
        let address = self.account_address.as_deref()?;
        let chars: Vec<char> = address.chars().collect();
        if chars.len() <= 10 {
            return Some(address.to_string());
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        Some(format!("{head}...{tail}"))
    }
}

/// A wallet as listed in the connect chooser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletOption {
    pub name: String,
    pub ready_state: ReadyState,
}

/// The connected wallet together with the account it exposed.
struct ActiveWallet {
    wallet: Arc<dyn WalletProvider>,
    address: String,
}

/// Owns the single wallet session of an application context and publishes
/// every change to subscribers.
///
/// `active` and the published state change together under the `active`
/// lock.
pub struct SessionManager {
    wallets: Vec<Arc<dyn WalletProvider>>,
    active: Mutex<Option<ActiveWallet>>,
    state: watch::Sender<WalletSession>,
}

impl SessionManager {
    pub fn new(wallets: Vec<Arc<dyn WalletProvider>>) -> Self {
        let (state, _) = watch::channel(WalletSession::default());
        Self {
            wallets,
            active: Mutex::new(None),
            state,
        }
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> WalletSession {
        self.state.borrow().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().connected
    }

    /// Receiver notified on every connect and disconnect.
    pub fn subscribe(&self) -> watch::Receiver<WalletSession> {
        self.state.subscribe()
    }

    /// Every known wallet with its current availability.
    pub async fn wallets(&self) -> Vec<WalletOption> {
        let mut options = Vec::with_capacity(self.wallets.len());
        for wallet in &self.wallets {
            options.push(WalletOption {
                name: wallet.name().to_string(),
                ready_state: wallet.ready_state().await,
            });
        }
        options
    }

    fn find(&self, name: &str) -> Option<Arc<dyn WalletProvider>> {
        self.wallets
            .iter()
            .find(|w| w.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Connect to the named wallet, replacing any active session.
    ///
    /// On failure the session is left unconnected and the wallet's error is
    /// returned untouched.
    pub async fn connect(&self, wallet_name: &str) -> Result<WalletSession, ConnectionError> {
        let wallet = self
            .find(wallet_name)
            .ok_or_else(|| ConnectionError::UnknownWallet(wallet_name.to_string()))?;

        if !wallet.ready_state().await.is_installed() {
            return Err(ConnectionError::Unavailable(wallet.name().to_string()));
        }

        if self.is_connected() {
            self.disconnect().await;
        }

        let account = match wallet.connect().await {
            Ok(account) => account,
            Err(e) => {
                warn!(wallet = %wallet.name(), "wallet connect failed: {e}");
                return Err(e);
            }
        };

        let session = WalletSession {
            connected: true,
            account_address: Some(account.address.clone()),
            active_wallet_name: Some(wallet.name().to_string()),
        };
        {
            let mut active = self.active.lock();
            *active = Some(ActiveWallet {
                wallet,
                address: account.address,
            });
            self.state.send_replace(session.clone());
        }
        info!(address = ?session.account_address, "session connected");
        Ok(session)
    }

    /// Clear the session. Never fails; wallet-side errors are only logged.
    ///
    /// Subscribers see the cleared session before the wallet is told.
    pub async fn disconnect(&self) {
        let previous = {
            let mut active = self.active.lock();
            self.state.send_replace(WalletSession::default());
            active.take()
        };
        if let Some(previous) = previous {
            if let Err(e) = previous.wallet.disconnect().await {
                warn!(wallet = %previous.wallet.name(), "wallet disconnect failed: {e}");
            }
        }
        info!("session disconnected");
    }

    /// Route a payload to the active wallet for signing and broadcast.
    pub async fn sign_and_submit(
        &self,
        payload: &EntryFunctionPayload,
    ) -> Result<PendingTransaction, SubmitError> {
        let active = self
            .active
            .lock()
            .as_ref()
            .map(|a| (a.wallet.clone(), a.address.clone()));
        let Some((wallet, sender)) = active else {
            return Err(ConnectionError::NotConnected.into());
        };
        wallet.sign_and_submit_transaction(&sender, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockWallet;

    fn manager(wallets: Vec<Arc<MockWallet>>) -> SessionManager {
        SessionManager::new(
            wallets
                .into_iter()
                .map(|w| w as Arc<dyn WalletProvider>)
                .collect(),
        )
    }

    #[test]
    fn short_address_abbreviates() {
        let session = WalletSession {
            connected: true,
            account_address: Some(
                "0x03c27315fb69ba6e4b960f1507d1cefcc9a4247869f26a8d59d6b7869d23782c".into(),
            ),
            active_wallet_name: Some("Petra".into()),
        };
        assert_eq!(session.short_address().as_deref(), Some("0x03c2...782c"));
        assert!(WalletSession::default().short_address().is_none());
    }

    #[tokio::test]
    async fn connect_sets_session_and_notifies() {
        let wallet = Arc::new(MockWallet::new("Petra", "0xabc"));
        let sessions = manager(vec![wallet.clone()]);
        let mut rx = sessions.subscribe();

        let session = sessions.connect("petra").await.unwrap();
        assert!(session.connected);
        assert_eq!(session.account_address.as_deref(), Some("0xabc"));
        assert_eq!(session.active_wallet_name.as_deref(), Some("Petra"));

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), session);
    }

    #[tokio::test]
    async fn connect_unknown_wallet_fails() {
        let sessions = manager(vec![Arc::new(MockWallet::new("Petra", "0xabc"))]);
        let err = sessions.connect("Pontem").await.unwrap_err();
        assert_eq!(err, ConnectionError::UnknownWallet("Pontem".into()));
        assert!(!sessions.is_connected());
    }

    #[tokio::test]
    async fn connect_uninstalled_wallet_fails() {
        let wallet = Arc::new(MockWallet::new("Martian", "0xabc").ready(ReadyState::NotDetected));
        let sessions = manager(vec![wallet.clone()]);

        let err = sessions.connect("Martian").await.unwrap_err();
        assert_eq!(err, ConnectionError::Unavailable("Martian".into()));
        assert_eq!(wallet.connect_calls(), 0);
    }

    #[tokio::test]
    async fn rejected_connect_leaves_session_unconnected() {
        let wallet = Arc::new(MockWallet::new("Petra", "0xabc").reject_connect("User rejected"));
        let sessions = manager(vec![wallet]);

        let err = sessions.connect("Petra").await.unwrap_err();
        assert_eq!(err.to_string(), "User rejected");
        assert_eq!(sessions.current(), WalletSession::default());
    }

    #[tokio::test]
    async fn disconnect_clears_session_even_when_wallet_errors() {
        let wallet = Arc::new(MockWallet::new("Petra", "0xabc").fail_disconnect());
        let sessions = manager(vec![wallet.clone()]);
        sessions.connect("Petra").await.unwrap();

        sessions.disconnect().await;
        let session = sessions.current();
        assert!(!session.connected);
        assert!(session.account_address.is_none());
        assert!(session.active_wallet_name.is_none());
        assert_eq!(wallet.disconnect_calls(), 1);
    }

    #[tokio::test]
    async fn switching_wallets_disconnects_previous() {
        let petra = Arc::new(MockWallet::new("Petra", "0xaaa"));
        let martian = Arc::new(MockWallet::new("Martian", "0xbbb"));
        let sessions = manager(vec![petra.clone(), martian.clone()]);

        sessions.connect("Petra").await.unwrap();
        let session = sessions.connect("Martian").await.unwrap();

        assert_eq!(petra.disconnect_calls(), 1);
        assert_eq!(session.account_address.as_deref(), Some("0xbbb"));

        let payload = EntryFunctionPayload::new("0x1::m::f".into(), vec![], vec![]);
        sessions.sign_and_submit(&payload).await.unwrap();
        assert!(petra.submitted().is_empty());
        assert_eq!(martian.submitted()[0].0, "0xbbb");
    }

    #[tokio::test]
    async fn rejected_switch_leaves_no_session() {
        let petra = Arc::new(MockWallet::new("Petra", "0xaaa"));
        let martian = Arc::new(MockWallet::new("Martian", "0xbbb").reject_connect("User rejected"));
        let sessions = manager(vec![petra.clone(), martian.clone()]);

        sessions.connect("Petra").await.unwrap();
        let err = sessions.connect("Martian").await.unwrap_err();

        assert_eq!(err, ConnectionError::Rejected("User rejected".into()));
        assert_eq!(petra.disconnect_calls(), 1);
        assert_eq!(martian.connect_calls(), 1);
        assert_eq!(sessions.current(), WalletSession::default());
        assert!(!sessions.is_connected());
    }

    #[tokio::test]
    async fn session_clears_before_wallet_finishes_disconnecting() {
        let (wallet, gate) = MockWallet::new("Petra", "0xabc").gated_disconnect();
        let wallet = Arc::new(wallet);
        let sessions = Arc::new(manager(vec![wallet.clone()]));
        sessions.connect("Petra").await.unwrap();
        let mut rx = sessions.subscribe();

        let disconnecting = tokio::spawn({
            let sessions = sessions.clone();
            async move { sessions.disconnect().await }
        });
        rx.wait_for(|s| !s.connected).await.unwrap();

        assert!(!sessions.is_connected());
        assert_eq!(sessions.current(), WalletSession::default());
        let payload = EntryFunctionPayload::new("0x1::m::f".into(), vec![], vec![]);
        let err = sessions.sign_and_submit(&payload).await.unwrap_err();
        assert_eq!(err, SubmitError::Connection(ConnectionError::NotConnected));
        assert!(!disconnecting.is_finished());

        gate.notify_one();
        disconnecting.await.unwrap();
        assert_eq!(wallet.disconnect_calls(), 1);
        assert!(wallet.submitted().is_empty());
    }

    #[tokio::test]
    async fn wallets_lists_ready_states() {
        let sessions = manager(vec![
            Arc::new(MockWallet::new("Petra", "0xaaa")),
            Arc::new(MockWallet::new("Martian", "0xbbb").ready(ReadyState::Loadable)),
        ]);
        let options = sessions.wallets().await;
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].ready_state, ReadyState::Installed);
        assert_eq!(options[1].ready_state, ReadyState::Loadable);
    }

    #[tokio::test]
    async fn sign_without_session_is_not_connected() {
        let wallet = Arc::new(MockWallet::new("Petra", "0xabc"));
        let sessions = manager(vec![wallet.clone()]);
        let payload = EntryFunctionPayload::new("0x1::m::f".into(), vec![], vec![]);

        let err = sessions.sign_and_submit(&payload).await.unwrap_err();
        assert_eq!(err, SubmitError::Connection(ConnectionError::NotConnected));
        assert!(wallet.submitted().is_empty());
    }

    #[tokio::test]
    async fn sign_routes_to_active_wallet_with_sender() {
        let wallet = Arc::new(MockWallet::new("Petra", "0xabc").with_hash("0xfeed"));
        let sessions = manager(vec![wallet.clone()]);
        sessions.connect("Petra").await.unwrap();
        let payload = EntryFunctionPayload::new("0x1::m::f".into(), vec![], vec![]);

        let pending = sessions.sign_and_submit(&payload).await.unwrap();
        assert_eq!(pending.hash, "0xfeed");
        let submitted = wallet.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].0, "0xabc");
    }
}
