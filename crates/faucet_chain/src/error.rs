//! Error types for wallet sessions, ledger calls and claims.

use std::time::Duration;

/// A wallet could not be connected, or refused to act for the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    #[error("Unknown wallet: {0}")]
    UnknownWallet(String),

    #[error("Wallet {0} is not installed")]
    Unavailable(String),

    /// The wallet (or its user) declined; carries the wallet's own message.
    #[error("{0}")]
    Rejected(String),

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Wallet bridge unreachable: {0}")]
    Network(String),
}

/// Broadcasting or confirming a transaction failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Node API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transaction {hash} committed to the blockchain but execution failed: {vm_status}")]
    Failed { hash: String, vm_status: String },

    #[error("Waiting for transaction {hash} timed out after {timeout:?}")]
    Timeout { hash: String, timeout: Duration },

    #[error("Invalid node response: {0}")]
    Decode(String),
}

/// Reading account state from the ledger failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Node API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid node response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Malformed coin metadata in {resource_type}: {reason}")]
    Parse {
        resource_type: String,
        reason: String,
    },
}

/// Failure of the wallet's sign-and-submit step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimError {
    #[error("Connect a wallet to claim")]
    NotConnected,

    #[error("A {0} claim is already in progress")]
    AlreadyPending(String),

    #[error("Claim amount {amount} with {decimals} decimals does not fit in a u64")]
    AmountOverflow { amount: u64, decimals: u8 },

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl From<SubmitError> for ClaimError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Connection(ConnectionError::NotConnected) => Self::NotConnected,
            SubmitError::Connection(e) => Self::Connection(e),
            SubmitError::Transaction(e) => Self::Transaction(e),
        }
    }
}
