//! Wallet providers -- the collaborators that hold keys and sign on the
//! user's behalf.
//!
//! [`BridgeWallet`] talks to a wallet through a small local HTTP bridge. The
//! bridge signs; the faucet only forwards payloads and broadcasts the signed
//! result through the [`LedgerClient`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ConnectionError, SubmitError, TransactionError};
use crate::ledger::LedgerClient;
use crate::types::{EntryFunctionPayload, PendingTransaction};

/// Availability of a wallet on this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadyState {
    Installed,
    NotDetected,
    Loadable,
    Unsupported,
}

impl ReadyState {
    pub fn is_installed(&self) -> bool {
        matches!(self, ReadyState::Installed)
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReadyState::Installed => "Installed",
            ReadyState::NotDetected => "Not detected",
            ReadyState::Loadable => "Loadable",
            ReadyState::Unsupported => "Unsupported",
        };
        f.write_str(label)
    }
}

/// The account a wallet exposes once connected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAccount {
    pub address: String,
    #[serde(default)]
    pub public_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Unified interface for every wallet the faucet can connect to.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Display name, also used to select the wallet.
    fn name(&self) -> &str;

    async fn ready_state(&self) -> ReadyState;

    /// Ask the wallet for access to its account. The user may refuse.
    async fn connect(&self) -> Result<WalletAccount, ConnectionError>;

    async fn disconnect(&self) -> Result<(), ConnectionError>;

    /// Have the wallet sign `payload` as `sender` and broadcast it.
    async fn sign_and_submit_transaction(
        &self,
        sender: &str,
        payload: &EntryFunctionPayload,
    ) -> Result<PendingTransaction, SubmitError>;
}

// ---------------------------------------------------------------------------
// Bridge API types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BridgeStatus {
    ready_state: ReadyState,
}

#[derive(Debug, Serialize)]
struct SignRequest<'a> {
    sender: &'a str,
    payload: &'a EntryFunctionPayload,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    signed_transaction: Value,
}

#[derive(Debug, Deserialize)]
struct BridgeError {
    message: String,
}

fn rejection(body: String) -> ConnectionError {
    let message = match serde_json::from_str::<BridgeError>(&body) {
        Ok(err) => err.message,
        Err(_) if body.is_empty() => "Request rejected by wallet".into(),
        Err(_) => body,
    };
    ConnectionError::Rejected(message)
}

// ---------------------------------------------------------------------------
// Bridge wallet
// ---------------------------------------------------------------------------

/// A wallet reached through its local signing bridge.
pub struct BridgeWallet {
    name: String,
    base_url: String,
    client: reqwest::Client,
    ledger: Arc<dyn LedgerClient>,
}

impl BridgeWallet {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        ledger: Arc<dyn LedgerClient>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            ledger,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post(
        &self,
        path: &str,
        body: Option<&SignRequest<'_>>,
    ) -> Result<reqwest::Response, ConnectionError> {
        let mut request = self.client.post(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let resp = request
            .send()
            .await
            .map_err(|e| ConnectionError::Network(e.to_string()))?;

        if resp.status().is_success() {
            Ok(resp)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(rejection(body))
        }
    }
}

#[async_trait]
impl WalletProvider for BridgeWallet {
    fn name(&self) -> &str {
        &self.name
    }

    /// Probe `/status` with a short timeout; an unreachable bridge means the
    /// wallet is not installed.
    async fn ready_state(&self) -> ReadyState {
        let resp = match self
            .client
            .get(self.url("/status"))
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                debug!(wallet = %self.name, status = %r.status(), "wallet bridge status check failed");
                return ReadyState::NotDetected;
            }
            Err(e) => {
                debug!(wallet = %self.name, "wallet bridge not reachable: {e}");
                return ReadyState::NotDetected;
            }
        };

        match resp.json::<BridgeStatus>().await {
            Ok(status) => status.ready_state,
            Err(_) => ReadyState::Unsupported,
        }
    }

    async fn connect(&self) -> Result<WalletAccount, ConnectionError> {
        let resp = self.post("/connect", None).await?;
        let account: WalletAccount = resp
            .json()
            .await
            .map_err(|e| ConnectionError::Network(format!("invalid connect response: {e}")))?;
        info!(wallet = %self.name, address = %account.address, "wallet connected");
        Ok(account)
    }

    async fn disconnect(&self) -> Result<(), ConnectionError> {
        self.post("/disconnect", None).await?;
        info!(wallet = %self.name, "wallet disconnected");
        Ok(())
    }

    async fn sign_and_submit_transaction(
        &self,
        sender: &str,
        payload: &EntryFunctionPayload,
    ) -> Result<PendingTransaction, SubmitError> {
        let request = SignRequest { sender, payload };
        let resp = self.post("/sign", Some(&request)).await?;
        let signed: SignResponse = resp
            .json()
            .await
            .map_err(|e| TransactionError::Decode(format!("invalid sign response: {e}")))?;

        debug!(wallet = %self.name, function = %payload.function, "payload signed");
        Ok(self.ledger.submit_transaction(&signed.signed_transaction).await?)
    }
}
