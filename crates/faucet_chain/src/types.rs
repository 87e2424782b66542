use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Coin metadata published on chain: display name, ticker and precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// A raw resource record owned by an account, as returned by the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub data: Value,
}

/// Payload handed to a wallet for signing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryFunctionPayload {
    #[serde(rename = "type")]
    pub payload_type: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
}

impl EntryFunctionPayload {
    pub const TYPE: &'static str = "entry_function_payload";

    pub fn new(function: String, type_arguments: Vec<String>, arguments: Vec<Value>) -> Self {
        Self {
            payload_type: Self::TYPE.into(),
            function,
            type_arguments,
            arguments,
        }
    }
}

/// A transaction accepted into the node's mempool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub hash: String,
}

/// A transaction the ledger has committed, successfully or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedTransaction {
    pub hash: String,
    pub version: Option<String>,
    pub success: bool,
    pub vm_status: String,
}

/// What the user is told about a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionOutcome {
    Pending,
    Confirmed(String),
    Failed(String),
}
