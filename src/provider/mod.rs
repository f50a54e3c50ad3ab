//! Wallet Provider Interface
//!
//! The narrow capability a wallet exposes to a dApp: reveal accounts and
//! answer JSON-RPC style requests. Errors follow EIP-1193 codes.

pub mod local;
pub mod mock;

pub use local::LocalWalletProvider;
pub use mock::MockProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Method name for EIP-712 typed data signing
pub const SIGN_TYPED_DATA_V4: &str = "eth_signTypedData_v4";
/// Method name for requesting account access
pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
/// Method name for listing already authorized accounts
pub const ACCOUNTS: &str = "eth_accounts";
/// Method name for the active chain id
pub const CHAIN_ID: &str = "eth_chainId";

/// A request submitted to a wallet provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// `eth_signTypedData_v4` with `[address, serializedDocument]`
    pub fn sign_typed_data_v4(address: impl Into<String>, document_json: impl Into<String>) -> Self {
        Self::new(
            SIGN_TYPED_DATA_V4,
            vec![
                Value::String(address.into()),
                Value::String(document_json.into()),
            ],
        )
    }
}

/// EIP-1193 provider error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    pub const USER_REJECTED: i64 = 4001;
    pub const UNAUTHORIZED: i64 = 4100;
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    pub const DISCONNECTED: i64 = 4900;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL: i64 = -32603;
    /// Local to this crate: the wallet did not answer within the configured limit
    pub const TIMED_OUT: i64 = -32000;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn user_rejected(message: impl Into<String>) -> Self {
        Self::new(Self::USER_REJECTED, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(Self::UNAUTHORIZED, message)
    }

    pub fn unsupported_method(method: &str) -> Self {
        Self::new(
            Self::UNSUPPORTED_METHOD,
            format!("unsupported method: {}", method),
        )
    }

    pub fn disconnected(message: impl Into<String>) -> Self {
        Self::new(Self::DISCONNECTED, message)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(Self::INVALID_PARAMS, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL, message)
    }

    pub fn timed_out(limit: std::time::Duration) -> Self {
        Self::new(
            Self::TIMED_OUT,
            format!("wallet request timed out after {:?}", limit),
        )
    }
}

// Display is the bare message text, without the code
impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderError {}

/// A wallet able to reveal accounts and sign on request
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Request account access; the first account is the active one
    async fn connect(&self) -> Result<Vec<String>, ProviderError>;

    /// Submit a request and await the wallet's answer
    async fn request(&self, request: RpcRequest) -> Result<Value, ProviderError>;
}
