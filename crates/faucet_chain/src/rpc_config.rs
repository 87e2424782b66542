use std::time::Duration;

use faucet_core::FaucetConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How long and how often to poll the node for a transaction's fate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Treat a committed-but-failed transaction as an error.
    pub check_success: bool,
}

impl WaitOptions {
    pub fn from_faucet_config(config: &FaucetConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.wait_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            check_success: true,
        }
    }
}

/// Configuration for the ledger node's REST endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl RpcConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn from_faucet_config(config: &FaucetConfig) -> Self {
        Self {
            url: config.node_url.clone(),
            timeout_secs: config.request_timeout_secs,
        }
    }

    /// Versioned API root. Accepts node URLs with or without a trailing `/v1`.
    pub fn api_base(&self) -> String {
        let trimmed = self.url.trim_end_matches('/');
        if trimmed.ends_with("/v1") {
            trimmed.to_string()
        } else {
            format!("{trimmed}/v1")
        }
    }

    /// Absolute URL of an API path such as `/transactions`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
