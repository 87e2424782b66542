use std::sync::Arc;

use faucet_core::{FaucetConfig, NotificationStore};
use parking_lot::Mutex;
use tracing::warn;

use crate::catalog::CatalogLoader;
use crate::claim::CoinClaim;
use crate::error::CatalogError;
use crate::ledger::{LedgerClient, RestLedgerClient};
use crate::rpc_config::RpcConfig;
use crate::session::SessionManager;
use crate::wallet::{BridgeWallet, WalletProvider};

/// Top-level application context: one wallet session, one notification
/// store and a claim button per catalog coin.
pub struct Faucet {
    config: Arc<FaucetConfig>,
    ledger: Arc<dyn LedgerClient>,
    session: Arc<SessionManager>,
    notifications: Arc<Mutex<NotificationStore>>,
    claims: Vec<Arc<CoinClaim>>,
}

impl Faucet {
    pub fn new(
        config: FaucetConfig,
        ledger: Arc<dyn LedgerClient>,
        wallets: Vec<Arc<dyn WalletProvider>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            ledger,
            session: Arc::new(SessionManager::new(wallets)),
            notifications: Arc::new(Mutex::new(NotificationStore::new())),
            claims: Vec::new(),
        }
    }

    /// Wire the REST ledger client and one bridge wallet per configured
    /// endpoint.
    pub fn from_config(config: FaucetConfig) -> Self {
        let ledger: Arc<dyn LedgerClient> =
            Arc::new(RestLedgerClient::new(RpcConfig::from_faucet_config(&config)));
        let wallets = config
            .wallets
            .iter()
            .map(|w| {
                Arc::new(BridgeWallet::new(w.name.clone(), w.url.clone(), ledger.clone()))
                    as Arc<dyn WalletProvider>
            })
            .collect();
        Self::new(config, ledger, wallets)
    }

    pub fn config(&self) -> &FaucetConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn notifications(&self) -> &Arc<Mutex<NotificationStore>> {
        &self.notifications
    }

    pub fn claims(&self) -> &[Arc<CoinClaim>] {
        &self.claims
    }

    /// Load the coin catalog and build the claim buttons. On failure the
    /// list is left empty and the error is returned for the caller to show.
    pub async fn mount(&mut self) -> Result<usize, CatalogError> {
        let loader = CatalogLoader::from_config(self.ledger.clone(), &self.config);
        let coins = match loader.load_catalog(&self.config.publisher_address).await {
            Ok(coins) => coins,
            Err(e) => {
                warn!("coin catalog unavailable: {e}");
                self.claims.clear();
                return Err(e);
            }
        };

        self.claims = coins
            .into_iter()
            .map(|coin| {
                Arc::new(CoinClaim::new(
                    coin,
                    self.config.clone(),
                    self.session.clone(),
                    self.ledger.clone(),
                    self.notifications.clone(),
                ))
            })
            .collect();
        Ok(self.claims.len())
    }
}
