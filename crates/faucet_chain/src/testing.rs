//! Hand-rolled collaborators for unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::Notify;

use crate::error::{ConnectionError, FetchError, SubmitError, TransactionError};
use crate::ledger::LedgerClient;
use crate::rpc_config::WaitOptions;
use crate::types::{AccountResource, CommittedTransaction, EntryFunctionPayload, PendingTransaction};
use crate::wallet::{ReadyState, WalletAccount, WalletProvider};

pub(crate) fn coin_resource(symbol: &str, decimals: u8) -> AccountResource {
    AccountResource {
        resource_type: format!("0x1::coin::CoinInfo<0xc0::test_coins::{symbol}>"),
        data: json!({
            "decimals": decimals,
            "name": format!("{symbol} Test Coin"),
            "symbol": symbol,
            "supply": { "vec": [] },
        }),
    }
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

pub(crate) struct MockWallet {
    name: String,
    address: String,
    ready: ReadyState,
    connect_error: Option<String>,
    disconnect_fails: bool,
    disconnect_gate: Option<Arc<Notify>>,
    sign_result: Result<String, SubmitError>,
    connect_calls: AtomicUsize,
    disconnect_calls: AtomicUsize,
    submitted: Mutex<Vec<(String, EntryFunctionPayload)>>,
}

impl MockWallet {
    pub(crate) fn new(name: &str, address: &str) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            ready: ReadyState::Installed,
            connect_error: None,
            disconnect_fails: false,
            disconnect_gate: None,
            sign_result: Ok("0xhash".into()),
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn ready(mut self, ready: ReadyState) -> Self {
        self.ready = ready;
        self
    }

    pub(crate) fn reject_connect(mut self, message: &str) -> Self {
        self.connect_error = Some(message.into());
        self
    }

    pub(crate) fn fail_disconnect(mut self) -> Self {
        self.disconnect_fails = true;
        self
    }

    /// Hold `disconnect` open until the returned handle is notified.
    pub(crate) fn gated_disconnect(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.disconnect_gate = Some(gate.clone());
        (self, gate)
    }

    pub(crate) fn with_hash(mut self, hash: &str) -> Self {
        self.sign_result = Ok(hash.into());
        self
    }

    pub(crate) fn sign_error(mut self, err: SubmitError) -> Self {
        self.sign_result = Err(err);
        self
    }

    pub(crate) fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn submitted(&self) -> Vec<(String, EntryFunctionPayload)> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ready_state(&self) -> ReadyState {
        self.ready
    }

    async fn connect(&self) -> Result<WalletAccount, ConnectionError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        match &self.connect_error {
            Some(message) => Err(ConnectionError::Rejected(message.clone())),
            None => Ok(WalletAccount {
                address: self.address.clone(),
                public_key: None,
            }),
        }
    }

    async fn disconnect(&self) -> Result<(), ConnectionError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.disconnect_gate {
            gate.notified().await;
        }
        if self.disconnect_fails {
            return Err(ConnectionError::Network("bridge gone".into()));
        }
        Ok(())
    }

    async fn sign_and_submit_transaction(
        &self,
        sender: &str,
        payload: &EntryFunctionPayload,
    ) -> Result<PendingTransaction, SubmitError> {
        self.submitted
            .lock()
            .push((sender.to_string(), payload.clone()));
        self.sign_result
            .clone()
            .map(|hash| PendingTransaction { hash })
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

pub(crate) struct MockLedger {
    resources: Result<Vec<AccountResource>, FetchError>,
    wait_error: Option<TransactionError>,
    gate: Option<Arc<Notify>>,
    resource_calls: AtomicUsize,
    waited: Mutex<Vec<String>>,
}

impl MockLedger {
    pub(crate) fn new(resources: Vec<AccountResource>) -> Self {
        Self {
            resources: Ok(resources),
            wait_error: None,
            gate: None,
            resource_calls: AtomicUsize::new(0),
            waited: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing_fetch(err: FetchError) -> Self {
        Self {
            resources: Err(err),
            ..Self::new(Vec::new())
        }
    }

    pub(crate) fn wait_error(mut self, err: TransactionError) -> Self {
        self.wait_error = Some(err);
        self
    }

    /// Block `wait_for_transaction` until the returned handle is notified.
    pub(crate) fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub(crate) fn resource_calls(&self) -> usize {
        self.resource_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn waited(&self) -> Vec<String> {
        self.waited.lock().clone()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_account_resources(
        &self,
        _address: &str,
    ) -> Result<Vec<AccountResource>, FetchError> {
        self.resource_calls.fetch_add(1, Ordering::SeqCst);
        self.resources.clone()
    }

    async fn submit_transaction(
        &self,
        _signed: &Value,
    ) -> Result<PendingTransaction, TransactionError> {
        Ok(PendingTransaction {
            hash: "0xsubmitted".into(),
        })
    }

    async fn wait_for_transaction(
        &self,
        hash: &str,
        _options: WaitOptions,
    ) -> Result<CommittedTransaction, TransactionError> {
        self.waited.lock().push(hash.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.wait_error {
            Some(err) => Err(err.clone()),
            None => Ok(CommittedTransaction {
                hash: hash.to_string(),
                version: Some("1".into()),
                success: true,
                vm_status: "Executed successfully".into(),
            }),
        }
    }
}
