//! Payment Signing Flow
//!
//! The "Pay" action: connect to the wallet, submit the document for
//! `eth_signTypedData_v4` signing, and publish what happened to the
//! last-result slot.

use crate::config::{MissingProviderPolicy, SignerConfig};
use crate::connector::WalletConnector;
use crate::eip712::SigningRequest;
use crate::logging::{redact_address, redact_hex};
use crate::provider::{ProviderError, RpcRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Outcome of one signing attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignatureOutcome {
    /// The wallet's signature, as returned
    Signed { signature: String },
    /// Connect or sign failed; the wallet's error text
    Failed { message: String },
    /// No wallet provider was attached
    ProviderUnavailable,
}

impl SignatureOutcome {
    pub fn signature(&self) -> Option<&str> {
        match self {
            SignatureOutcome::Signed { signature } => Some(signature),
            _ => None,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, SignatureOutcome::Signed { .. })
    }

    fn failed(message: impl Into<String>) -> Self {
        SignatureOutcome::Failed {
            message: message.into(),
        }
    }
}

impl fmt::Display for SignatureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureOutcome::Signed { signature } => f.write_str(signature),
            SignatureOutcome::Failed { message } => f.write_str(message),
            SignatureOutcome::ProviderUnavailable => f.write_str("no wallet provider available"),
        }
    }
}

/// Requests signatures through an owned wallet connector.
///
/// The last outcome is kept in a watch channel: every publish overwrites it
/// and subscribers see the newest value only.
pub struct PaymentSigner {
    connector: WalletConnector,
    missing_provider: MissingProviderPolicy,
    timeout: Option<Duration>,
    last_result: watch::Sender<Option<SignatureOutcome>>,
}

impl PaymentSigner {
    pub fn new(connector: WalletConnector, config: &SignerConfig) -> Self {
        let (last_result, _) = watch::channel(None);
        Self {
            connector,
            missing_provider: config.missing_provider,
            timeout: config.request_timeout(),
            last_result,
        }
    }

    /// Override the per-step timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connector(&self) -> &WalletConnector {
        &self.connector
    }

    pub fn connector_mut(&mut self) -> &mut WalletConnector {
        &mut self.connector
    }

    /// Watch the last-result slot
    pub fn subscribe(&self) -> watch::Receiver<Option<SignatureOutcome>> {
        self.last_result.subscribe()
    }

    /// The most recently published outcome
    pub fn last_result(&self) -> Option<SignatureOutcome> {
        self.last_result.borrow().clone()
    }

    /// Ask the attached wallet to sign `document`.
    ///
    /// Never fails: every error becomes a published `Failed` outcome. Returns
    /// the outcome published, or `None` when no provider is attached and the
    /// policy is `Ignore`.
    pub async fn request_signature(&self, document: &SigningRequest) -> Option<SignatureOutcome> {
        let Some(provider) = self.connector.provider() else {
            return match self.missing_provider {
                MissingProviderPolicy::Report => {
                    warn!("no wallet provider attached");
                    Some(self.publish(SignatureOutcome::ProviderUnavailable))
                }
                MissingProviderPolicy::Ignore => {
                    debug!("no wallet provider attached, ignoring pay request");
                    None
                }
            };
        };

        let serialized = match document.to_canonical_json() {
            Ok(json) => json,
            Err(e) => return Some(self.publish(SignatureOutcome::failed(e.to_string()))),
        };

        let accounts = match self.bounded(self.connector.connect()).await {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!(code = e.code, error = %e, "wallet connect failed");
                return Some(self.publish(SignatureOutcome::failed(e.message)));
            }
        };

        let Some(account) = accounts.into_iter().next() else {
            warn!("wallet returned no accounts");
            return Some(self.publish(SignatureOutcome::failed("wallet returned no accounts")));
        };

        info!(
            account = %redact_address(&account),
            primary_type = document.message_type(),
            "requesting typed data signature"
        );

        let request = RpcRequest::sign_typed_data_v4(account, serialized);
        let outcome = match self.bounded(provider.request(request)).await {
            Ok(value) => signature_from_value(value),
            Err(e) => {
                warn!(code = e.code, error = %e, "wallet signing failed");
                SignatureOutcome::failed(e.message)
            }
        };

        Some(self.publish(outcome))
    }

    fn publish(&self, outcome: SignatureOutcome) -> SignatureOutcome {
        match &outcome {
            SignatureOutcome::Signed { signature } => {
                debug!(signature = %redact_hex(signature), "publishing signature")
            }
            other => debug!(outcome = %other, "publishing failure"),
        }
        self.last_result.send_replace(Some(outcome.clone()));
        outcome
    }

    async fn bounded<T, F>(&self, step: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, step)
                .await
                .map_err(|_| ProviderError::timed_out(limit))?,
            None => step.await,
        }
    }
}

impl fmt::Debug for PaymentSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentSigner")
            .field("connector", &self.connector)
            .field("missing_provider", &self.missing_provider)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Wallets answer with a hex string; anything else is kept as compact JSON
fn signature_from_value(value: Value) -> SignatureOutcome {
    match value {
        Value::Null => SignatureOutcome::failed("wallet returned an empty signature"),
        Value::String(s) if s.is_empty() => {
            SignatureOutcome::failed("wallet returned an empty signature")
        }
        Value::String(signature) => SignatureOutcome::Signed { signature },
        other => SignatureOutcome::Signed {
            signature: other.to_string(),
        },
    }
}
