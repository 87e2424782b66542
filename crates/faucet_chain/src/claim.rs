//! Per-coin claim workflow: build the mint request, have the wallet sign and
//! broadcast it, wait for the ledger, tell the user.

use std::sync::Arc;

use faucet_core::{AppNotification, FaucetConfig, NotificationStore, NotificationType};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::ClaimError;
use crate::ledger::LedgerClient;
use crate::rpc_config::WaitOptions;
use crate::session::SessionManager;
use crate::types::{CoinInfo, EntryFunctionPayload, TransactionOutcome};

pub const SUCCESS_TITLE: &str = "Transaction submitted.";
pub const ERROR_TITLE: &str = "An error occurred.";
pub const EXPLORER_LINK_LABEL: &str = "View on explorer";

/// `amount * 10^decimals` as a base-10 integer string, or `None` when the
/// result does not fit the on-chain `u64` argument.
pub fn scale_amount(amount: u64, decimals: u8) -> Option<String> {
    10u64
        .checked_pow(u32::from(decimals))
        .and_then(|factor| amount.checked_mul(factor))
        .map(|scaled| scaled.to_string())
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// The mint call for one claim attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub target_function: String,
    pub type_argument: String,
    pub amount: String,
}

impl ClaimRequest {
    pub fn for_coin(coin: &CoinInfo, config: &FaucetConfig) -> Result<Self, ClaimError> {
        let amount = scale_amount(config.claim_amount, coin.decimals).ok_or(
            ClaimError::AmountOverflow {
                amount: config.claim_amount,
                decimals: coin.decimals,
            },
        )?;

        Ok(Self {
            target_function: config.mint_function_id(),
            type_argument: config.coin_type(&coin.symbol),
            amount,
        })
    }

    pub fn to_payload(&self) -> EntryFunctionPayload {
        EntryFunctionPayload::new(
            self.target_function.clone(),
            vec![self.type_argument.clone()],
            vec![Value::String(self.amount.clone())],
        )
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimState {
    #[default]
    Idle,
    Submitting,
    AwaitingConfirmation {
        hash: String,
    },
    Confirmed {
        hash: String,
    },
    Failed {
        reason: String,
    },
}

impl ClaimState {
    /// Drives the button's loading indicator.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            ClaimState::Submitting | ClaimState::AwaitingConfirmation { .. }
        )
    }

    pub fn outcome(&self) -> Option<TransactionOutcome> {
        match self {
            ClaimState::Idle => None,
            ClaimState::Submitting | ClaimState::AwaitingConfirmation { .. } => {
                Some(TransactionOutcome::Pending)
            }
            ClaimState::Confirmed { hash } => Some(TransactionOutcome::Confirmed(hash.clone())),
            ClaimState::Failed { reason } => Some(TransactionOutcome::Failed(reason.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Claim button for a single coin.
pub struct CoinClaim {
    coin: CoinInfo,
    config: Arc<FaucetConfig>,
    session: Arc<SessionManager>,
    ledger: Arc<dyn LedgerClient>,
    notifications: Arc<Mutex<NotificationStore>>,
    state: watch::Sender<ClaimState>,
}

impl CoinClaim {
    pub fn new(
        coin: CoinInfo,
        config: Arc<FaucetConfig>,
        session: Arc<SessionManager>,
        ledger: Arc<dyn LedgerClient>,
        notifications: Arc<Mutex<NotificationStore>>,
    ) -> Self {
        let (state, _) = watch::channel(ClaimState::Idle);
        Self {
            coin,
            config,
            session,
            ledger,
            notifications,
            state,
        }
    }

    pub fn state(&self) -> ClaimState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ClaimState> {
        self.state.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_pending()
    }

    /// Clickable: a wallet is connected and no claim of this coin is in flight.
    pub fn is_enabled(&self) -> bool {
        self.session.is_connected() && !self.is_pending()
    }

    pub fn label(&self) -> String {
        format!("Claim {} {}", self.config.claim_amount, self.coin.symbol)
    }

    pub fn logo_path(&self) -> String {
        format!("/{}.png", self.coin.symbol.to_lowercase())
    }

    /// Run one claim to completion and return the transaction hash.
    ///
    /// Every failure after the claim has started is also pushed to the
    /// notification store with the underlying error's message.
    pub async fn claim(&self) -> Result<String, ClaimError> {
        if !self.session.is_connected() {
            debug!(symbol = %self.coin.symbol, "claim ignored: no wallet connected");
            return Err(ClaimError::NotConnected);
        }

        let started = self.state.send_if_modified(|state| {
            if state.is_pending() {
                false
            } else {
                *state = ClaimState::Submitting;
                true
            }
        });
        if !started {
            return Err(ClaimError::AlreadyPending(self.coin.symbol.clone()));
        }

        match self.run().await {
            Ok(hash) => {
                info!(symbol = %self.coin.symbol, %hash, "claim confirmed");
                self.state
                    .send_replace(ClaimState::Confirmed { hash: hash.clone() });
                self.notify_success(&hash);
                Ok(hash)
            }
            Err(e) => {
                warn!(symbol = %self.coin.symbol, "claim failed: {e}");
                self.state.send_replace(ClaimState::Failed {
                    reason: e.to_string(),
                });
                self.notify_error(&e);
                Err(e)
            }
        }
    }

    async fn run(&self) -> Result<String, ClaimError> {
        let request = ClaimRequest::for_coin(&self.coin, &self.config)?;
        debug!(
            function = %request.target_function,
            type_argument = %request.type_argument,
            amount = %request.amount,
            "submitting claim"
        );

        let pending = self.session.sign_and_submit(&request.to_payload()).await?;
        self.state.send_replace(ClaimState::AwaitingConfirmation {
            hash: pending.hash.clone(),
        });

        let committed = self
            .ledger
            .wait_for_transaction(&pending.hash, WaitOptions::from_faucet_config(&self.config))
            .await?;
        Ok(committed.hash)
    }

    fn notify_success(&self, hash: &str) {
        let notification = AppNotification::new(NotificationType::Success, hash)
            .with_title(SUCCESS_TITLE)
            .with_link(EXPLORER_LINK_LABEL, self.config.explorer_txn_url(hash))
            .with_duration_ms(self.config.notification_duration_ms);
        self.notifications.lock().push(notification);
    }

    fn notify_error(&self, error: &ClaimError) {
        let notification = AppNotification::new(NotificationType::Error, error.to_string())
            .with_title(ERROR_TITLE)
            .with_duration_ms(self.config.notification_duration_ms);
        self.notifications.lock().push(notification);
    }
}
