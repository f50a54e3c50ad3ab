//! Signer Configuration
//!
//! Settings for the wallet connector and the signing flow, loaded from a
//! JSON file or built from defaults.

use crate::error::{PayError, PayResult};
use crate::provider::local::DEFAULT_CHAIN_ID;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "TYPED_PAY_CONFIG";

/// How the dApp identifies itself to wallets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DappMetadata {
    pub name: String,
    pub url: String,
}

impl Default for DappMetadata {
    fn default() -> Self {
        Self {
            name: "Typed Pay Storefront".to_string(),
            url: "http://localhost:4200".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorConfig {
    #[serde(default)]
    pub dapp: DappMetadata,
}

/// What to do when no wallet provider is attached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingProviderPolicy {
    /// Publish `ProviderUnavailable`
    #[default]
    Report,
    /// Return without publishing anything
    Ignore,
}

/// Signer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    pub connector: ConnectorConfig,
    pub missing_provider: MissingProviderPolicy,
    /// Upper bound for each wallet round trip; none waits forever
    pub request_timeout_secs: Option<u64>,
    /// Chain reported by the local wallet
    pub chain_id: u64,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            connector: ConnectorConfig::default(),
            missing_provider: MissingProviderPolicy::Report,
            request_timeout_secs: None,
            chain_id: DEFAULT_CHAIN_ID,
        }
    }
}

impl SignerConfig {
    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> PayResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PayError::config_error(format!("cannot read config: {}", e))
                .with_details(path.display().to_string())
        })?;

        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            PayError::config_error(format!("invalid config: {}", e))
                .with_details(path.display().to_string())
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `TYPED_PAY_CONFIG` if set, otherwise defaults
    pub fn from_env() -> PayResult<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Reject settings the flow cannot run with
    pub fn validate(&self) -> PayResult<()> {
        let dapp = &self.connector.dapp;
        if dapp.name.trim().is_empty() {
            return Err(PayError::config_error("dapp name must not be empty"));
        }

        let url = url::Url::parse(&dapp.url)
            .map_err(|e| PayError::config_error(format!("invalid dapp url '{}': {}", dapp.url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PayError::config_error(format!(
                "dapp url must be http or https, got {}",
                url.scheme()
            )));
        }

        if self.request_timeout_secs == Some(0) {
            return Err(PayError::config_error("request timeout must be at least one second"));
        }

        if self.chain_id == 0 {
            return Err(PayError::config_error("chain id must be non-zero"));
        }

        Ok(())
    }
}
