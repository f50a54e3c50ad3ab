//! Wallet Connector
//!
//! An explicitly owned session holding the attached wallet provider, if any.

use crate::config::{ConnectorConfig, DappMetadata};
use crate::provider::{ProviderError, WalletProvider};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub struct WalletConnector {
    config: ConnectorConfig,
    provider: Option<Arc<dyn WalletProvider>>,
}

impl WalletConnector {
    pub fn new(config: ConnectorConfig) -> Self {
        Self {
            config,
            provider: None,
        }
    }

    /// Attach a provider, replacing any previous one
    pub fn attach(&mut self, provider: Arc<dyn WalletProvider>) {
        debug!(dapp = %self.config.dapp.name, "wallet provider attached");
        self.provider = Some(provider);
    }

    pub fn with_provider(mut self, provider: Arc<dyn WalletProvider>) -> Self {
        self.attach(provider);
        self
    }

    pub fn detach(&mut self) -> Option<Arc<dyn WalletProvider>> {
        self.provider.take()
    }

    pub fn provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.provider.clone()
    }

    pub fn metadata(&self) -> &DappMetadata {
        &self.config.dapp
    }

    /// Request account access from the attached provider
    pub async fn connect(&self) -> Result<Vec<String>, ProviderError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| ProviderError::disconnected("no wallet provider attached"))?;
        provider.connect().await
    }
}

impl fmt::Debug for WalletConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConnector")
            .field("dapp", &self.config.dapp)
            .field("attached", &self.provider.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockProvider;

    #[tokio::test]
    async fn test_connect_without_provider() {
        let connector = WalletConnector::new(ConnectorConfig::default());
        let err = connector.connect().await.unwrap_err();
        assert_eq!(err.code, ProviderError::DISCONNECTED);
    }

    #[tokio::test]
    async fn test_attach_and_detach() {
        let mut connector = WalletConnector::new(ConnectorConfig::default());
        connector.attach(Arc::new(MockProvider::new(["0xabc"])));

        assert_eq!(connector.connect().await.unwrap(), vec!["0xabc"]);
        assert!(connector.detach().is_some());
        assert!(connector.provider().is_none());
    }
}
