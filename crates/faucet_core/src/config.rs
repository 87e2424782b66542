use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Account that publishes the `test_coins` module and owns the coin metadata.
pub const DEFAULT_PUBLISHER_ADDRESS: &str =
    "0x03c27315fb69ba6e4b960f1507d1cefcc9a4247869f26a8d59d6b7869d23782c";
pub const DEFAULT_NODE_URL: &str = "https://fullnode.testnet.aptoslabs.com";
pub const DEFAULT_EXPLORER_URL: &str = "https://explorer.aptoslabs.com";
pub const DEFAULT_CLAIM_AMOUNT: u64 = 1000;

/// A wallet reachable through a local signing bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletEndpoint {
    pub name: String,
    pub url: String,
}

/// Faucet configuration stored at `~/.faucet/config.json`.
///
/// Every constant the claim workflow depends on lives here and is handed to
/// the catalog loader and the claim orchestrators at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaucetConfig {
    // Ledger
    pub node_url: String,
    pub network: String,
    pub publisher_address: String,
    pub coin_info_type_prefix: String,
    pub coins_module: String,
    pub mint_function: String,

    // Claims
    pub claim_amount: u64,
    pub explorer_url: String,

    // Node client timings
    pub request_timeout_secs: u64,
    pub wait_timeout_secs: u64,
    pub poll_interval_ms: u64,

    // Wallets
    pub wallets: Vec<WalletEndpoint>,

    // UI
    pub notification_duration_ms: u64,

    // General
    pub log_level: String,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            node_url: DEFAULT_NODE_URL.into(),
            network: "testnet".into(),
            publisher_address: DEFAULT_PUBLISHER_ADDRESS.into(),
            coin_info_type_prefix: "0x1::coin::CoinInfo".into(),
            coins_module: "test_coins".into(),
            mint_function: "mint_coin".into(),
            claim_amount: DEFAULT_CLAIM_AMOUNT,
            explorer_url: DEFAULT_EXPLORER_URL.into(),
            request_timeout_secs: 30,
            wait_timeout_secs: 20,
            poll_interval_ms: 1000,
            wallets: vec![WalletEndpoint {
                name: "Petra".into(),
                url: "http://127.0.0.1:7450".into(),
            }],
            notification_duration_ms: 5000,
            log_level: "info".into(),
        }
    }
}

impl FaucetConfig {
    /// Returns the base config directory: `~/.faucet/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".faucet"))
    }

    /// Returns the config file path: `~/.faucet/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    /// Returns the logs directory: `~/.faucet/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Ensures all required directories exist.
    pub fn ensure_dirs() -> Result<()> {
        for dir in [Self::base_dir()?, Self::logs_dir()?] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            }
        }
        Ok(())
    }

    /// Loads config from `~/.faucet/config.json`, or creates the default if missing.
    pub fn load() -> Result<Self> {
        Self::ensure_dirs()?;
        let path = Self::config_path()?;
        Self::load_from_path(&path)
    }

    /// Load config from a specific file path, writing defaults when it does
    /// not exist yet.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Self = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            config.validate()?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Save config to a specific file path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Reject configurations the faucet cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !validate_url(&self.node_url) {
            anyhow::bail!("invalid node URL: {}", self.node_url);
        }
        if !validate_url(&self.explorer_url) {
            anyhow::bail!("invalid explorer URL: {}", self.explorer_url);
        }
        if self.publisher_address.trim().is_empty() {
            anyhow::bail!("publisher_address must not be empty");
        }
        if self.claim_amount == 0 {
            anyhow::bail!("claim_amount must be greater than zero");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }
        if self.wait_timeout_secs == 0 {
            anyhow::bail!("wait_timeout_secs must be greater than zero");
        }
        for wallet in &self.wallets {
            if !validate_url(&wallet.url) {
                anyhow::bail!("invalid bridge URL for wallet {}: {}", wallet.name, wallet.url);
            }
        }
        Ok(())
    }

    /// Fully-qualified entry function used to mint test coins.
    pub fn mint_function_id(&self) -> String {
        format!(
            "{}::{}::{}",
            self.publisher_address, self.coins_module, self.mint_function
        )
    }

    /// Move type tag of the coin with the given symbol.
    pub fn coin_type(&self, symbol: &str) -> String {
        format!(
            "{}::{}::{}",
            self.publisher_address,
            self.coins_module,
            symbol.to_uppercase()
        )
    }

    /// Explorer page for a transaction on the configured network.
    pub fn explorer_txn_url(&self, hash: &str) -> String {
        format!(
            "{}/txn/{hash}?network={}",
            self.explorer_url.trim_end_matches('/'),
            self.network
        )
    }
}

/// Validate that a URL is well-formed and uses HTTP or HTTPS.
pub fn validate_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            (scheme == "http" || scheme == "https") && parsed.host().is_some()
        }
        Err(_) => false,
    }
}
