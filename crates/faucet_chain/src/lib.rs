// Test-coin faucet: ledger client, wallets, catalog and claims

pub mod catalog;
pub mod claim;
pub mod error;
pub mod faucet;
pub mod ledger;
pub mod rpc_config;
pub mod session;
#[cfg(test)]
mod testing;
pub mod types;
pub mod wallet;

// Re-export primary types for convenient access.
pub use catalog::{CatalogLoader, parse_coin_info};
pub use claim::{ClaimRequest, ClaimState, CoinClaim, scale_amount};
pub use error::{CatalogError, ClaimError, ConnectionError, FetchError, SubmitError, TransactionError};
pub use faucet::Faucet;
pub use ledger::{LedgerClient, RestLedgerClient};
pub use rpc_config::{RpcConfig, WaitOptions};
pub use session::{SessionManager, WalletOption, WalletSession};
pub use types::{
    AccountResource, CoinInfo, CommittedTransaction, EntryFunctionPayload, PendingTransaction,
    TransactionOutcome,
};
pub use wallet::{BridgeWallet, ReadyState, WalletAccount, WalletProvider};
