use std::sync::Arc;

use faucet_core::FaucetConfig;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::CatalogError;
use crate::ledger::LedgerClient;
use crate::types::{AccountResource, CoinInfo};

/// Payload fields of an on-chain coin metadata record. Extra fields such as
/// `supply` are ignored.
#[derive(Debug, Deserialize)]
struct RawCoinInfo {
    name: String,
    symbol: String,
    decimals: u8,
}

/// Strictly parse a coin metadata resource.
pub fn parse_coin_info(resource: &AccountResource) -> Result<CoinInfo, CatalogError> {
    let parse_error = |reason: String| CatalogError::Parse {
        resource_type: resource.resource_type.clone(),
        reason,
    };

    let raw = RawCoinInfo::deserialize(&resource.data).map_err(|e| parse_error(e.to_string()))?;
    if raw.symbol.trim().is_empty() {
        return Err(parse_error("empty symbol".into()));
    }

    Ok(CoinInfo {
        name: raw.name,
        symbol: raw.symbol,
        decimals: raw.decimals,
    })
}

/// Reads the set of claimable coins from the publisher account.
pub struct CatalogLoader {
    ledger: Arc<dyn LedgerClient>,
    type_prefix: String,
}

impl CatalogLoader {
    pub fn new(ledger: Arc<dyn LedgerClient>, type_prefix: impl Into<String>) -> Self {
        Self {
            ledger,
            type_prefix: type_prefix.into(),
        }
    }

    pub fn from_config(ledger: Arc<dyn LedgerClient>, config: &FaucetConfig) -> Self {
        Self::new(ledger, config.coin_info_type_prefix.clone())
    }

    /// Fetch every resource of `publisher_address` and parse the coin
    /// metadata records among them, in the order the node returns them.
    ///
    /// Resources outside the coin metadata prefix are skipped without a
    /// trace; a matching record that does not parse fails the whole load.
    pub async fn load_catalog(
        &self,
        publisher_address: &str,
    ) -> Result<Vec<CoinInfo>, CatalogError> {
        let resources = self.ledger.get_account_resources(publisher_address).await?;
        let total = resources.len();

        let coins = resources
            .iter()
            .filter(|r| r.resource_type.starts_with(&self.type_prefix))
            .map(parse_coin_info)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(total, kept = coins.len(), "filtered publisher resources");
        info!(publisher = publisher_address, coins = coins.len(), "coin catalog loaded");
        Ok(coins)
    }
}
