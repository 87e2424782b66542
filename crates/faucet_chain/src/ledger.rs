//! Ledger node client -- account resources, transaction submission and
//! confirmation polling over the node's REST API.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{FetchError, TransactionError};
use crate::rpc_config::{RpcConfig, WaitOptions};
use crate::types::{AccountResource, CommittedTransaction, PendingTransaction};

/// Response header carrying the pagination cursor for resource listings.
const CURSOR_HEADER: &str = "x-aptos-cursor";
const PENDING_TRANSACTION: &str = "pending_transaction";

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// The remote ledger as seen by the faucet.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// All resources owned by `address`.
    async fn get_account_resources(
        &self,
        address: &str,
    ) -> Result<Vec<AccountResource>, FetchError>;

    /// Broadcast a transaction the wallet has already signed.
    async fn submit_transaction(
        &self,
        signed: &Value,
    ) -> Result<PendingTransaction, TransactionError>;

    /// Poll until the transaction leaves the mempool or `options.timeout`
    /// elapses.
    async fn wait_for_transaction(
        &self,
        hash: &str,
        options: WaitOptions,
    ) -> Result<CommittedTransaction, TransactionError>;
}

// ---------------------------------------------------------------------------
// Node API types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct NodeError {
    message: String,
    #[allow(dead_code)]
    error_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NodeTransaction {
    #[serde(rename = "type")]
    kind: String,
    hash: String,
    version: Option<String>,
    success: Option<bool>,
    vm_status: Option<String>,
}

/// Turn an error body into a readable message, preferring the node's own
/// `message` field.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<NodeError>(body) {
        Ok(err) => err.message,
        Err(_) if body.is_empty() => "empty response".into(),
        Err(_) => body.to_string(),
    }
}

// ---------------------------------------------------------------------------
// REST client
// ---------------------------------------------------------------------------

/// [`LedgerClient`] backed by the full node REST API.
pub struct RestLedgerClient {
    rpc: RpcConfig,
    client: reqwest::Client,
}

impl RestLedgerClient {
    pub fn new(rpc: RpcConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(rpc.timeout())
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {e}");
                reqwest::Client::new()
            });
        Self { rpc, client }
    }

    /// One lookup of a transaction by hash. `None` while the node has not
    /// seen it yet.
    async fn get_transaction_by_hash(
        &self,
        hash: &str,
    ) -> Result<Option<NodeTransaction>, TransactionError> {
        let url = self.rpc.endpoint(&format!("/transactions/by_hash/{hash}"));
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TransactionError::Network(e.to_string()))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransactionError::Api {
                status,
                message: error_message(&body),
            });
        }

        resp.json::<NodeTransaction>()
            .await
            .map(Some)
            .map_err(|e| TransactionError::Decode(e.to_string()))
    }
}

#[async_trait]
impl LedgerClient for RestLedgerClient {
    async fn get_account_resources(
        &self,
        address: &str,
    ) -> Result<Vec<AccountResource>, FetchError> {
        let url = self.rpc.endpoint(&format!("/accounts/{address}/resources"));
        let mut resources = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut request = self.client.get(&url);
            if let Some(start) = &cursor {
                request = request.query(&[("start", start)]);
            }

            let resp = request
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;

            if !resp.status().is_success() {
                let status = resp.status().as_u16();
                let body = resp.text().await.unwrap_or_default();
                return Err(FetchError::Api {
                    status,
                    message: error_message(&body),
                });
            }

            cursor = resp
                .headers()
                .get(CURSOR_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string);

            let page: Vec<AccountResource> = resp
                .json()
                .await
                .map_err(|e| FetchError::Decode(e.to_string()))?;
            debug!(address, count = page.len(), "fetched account resources page");
            resources.extend(page);

            if cursor.is_none() {
                break;
            }
        }

        Ok(resources)
    }

    async fn submit_transaction(
        &self,
        signed: &Value,
    ) -> Result<PendingTransaction, TransactionError> {
        let url = self.rpc.endpoint("/transactions");
        let resp = self
            .client
            .post(&url)
            .json(signed)
            .send()
            .await
            .map_err(|e| TransactionError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransactionError::Api {
                status,
                message: error_message(&body),
            });
        }

        let pending: PendingTransaction = resp
            .json()
            .await
            .map_err(|e| TransactionError::Decode(e.to_string()))?;
        debug!(hash = %pending.hash, "transaction submitted");
        Ok(pending)
    }

    async fn wait_for_transaction(
        &self,
        hash: &str,
        options: WaitOptions,
    ) -> Result<CommittedTransaction, TransactionError> {
        let started = Instant::now();

        loop {
            if let Some(txn) = self.get_transaction_by_hash(hash).await? {
                if txn.kind != PENDING_TRANSACTION {
                    let committed = CommittedTransaction {
                        hash: txn.hash,
                        version: txn.version,
                        success: txn.success.unwrap_or(false),
                        vm_status: txn.vm_status.unwrap_or_default(),
                    };
                    if options.check_success && !committed.success {
                        return Err(TransactionError::Failed {
                            hash: committed.hash,
                            vm_status: committed.vm_status,
                        });
                    }
                    return Ok(committed);
                }
            }

            if started.elapsed() >= options.timeout {
                return Err(TransactionError::Timeout {
                    hash: hash.to_string(),
                    timeout: options.timeout,
                });
            }
            tokio::time::sleep(options.poll_interval).await;
        }
    }
}
