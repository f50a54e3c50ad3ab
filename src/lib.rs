//! Typed Pay Core Library
//!
//! Wallet-signed EIP-712 payments for a storefront "Pay" button.
//!
//! # Architecture
//!
//! This crate provides:
//! - **eip712**: Typed data documents, hashing, signing and recovery
//! - **provider**: The wallet provider interface, a local key wallet and a mock
//! - **connector**: The owned wallet session
//! - **payment**: The signing flow and its last-result slot
//! - **documents**: The demo document and ERC-3009 / ERC-2612 builders
//! - **verify**: Signer recovery for a signed document
//!
//! # Security
//!
//! Private keys live in `zeroize` containers and are cleared on drop.
//! Log output only ever carries shortened addresses and hashes.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use typed_pay::{documents, LocalWalletProvider, PaymentSigner, SignerConfig, WalletConnector};
//!
//! let config = SignerConfig::default();
//! let wallet = LocalWalletProvider::random()?;
//! let connector = WalletConnector::new(config.connector.clone()).with_provider(Arc::new(wallet));
//! let signer = PaymentSigner::new(connector, &config);
//!
//! let outcome = signer.request_signature(&documents::demo_mail()).await;
//! println!("{:?}", outcome);
//! ```

pub mod config;
pub mod connector;
pub mod documents;
pub mod eip712;
pub mod error;
pub mod logging;
pub mod payment;
pub mod provider;
pub mod verify;

// Re-export key types for convenience
pub use config::{ConnectorConfig, DappMetadata, MissingProviderPolicy, SignerConfig};
pub use connector::WalletConnector;
pub use eip712::{Eip712Domain, Eip712Error, Eip712Signature, SigningRequest};
pub use error::{ErrorCode, PayError, PayResult};
pub use payment::{PaymentSigner, SignatureOutcome};
pub use provider::{LocalWalletProvider, MockProvider, ProviderError, RpcRequest, WalletProvider};
pub use verify::{recover_signer, verify_signer, VerifyError};
