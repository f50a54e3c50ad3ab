//! Unified error types for typed-pay
//!
//! Module errors convert into `PayError` so callers see one
//! serializable error with a category code.

use crate::eip712::Eip712Error;
use crate::provider::ProviderError;
use crate::verify::VerifyError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for typed-pay operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl PayError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidDocument, msg)
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, msg)
    }

    pub fn signing_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SigningFailed, msg)
    }

    pub fn provider_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProviderUnavailable, msg)
    }

    pub fn invalid_private_key(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPrivateKey, msg)
    }
}

impl fmt::Display for PayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for PayError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    InvalidInput,
    InvalidAddress,
    InvalidPrivateKey,
    InvalidDocument,
    InvalidSignature,
    ConfigError,

    // Wallet errors
    ProviderUnavailable,
    UserRejected,
    ProviderError,
    Timeout,

    // Crypto errors
    SigningFailed,
    VerificationFailed,

    // Parse errors
    JsonError,
    HexError,

    // Internal
    Internal,
}

/// Result type alias for typed-pay operations
pub type PayResult<T> = Result<T, PayError>;

// Conversions from common error types

impl From<serde_json::Error> for PayError {
    fn from(e: serde_json::Error) -> Self {
        PayError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for PayError {
    fn from(e: hex::FromHexError) -> Self {
        PayError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<std::io::Error> for PayError {
    fn from(e: std::io::Error) -> Self {
        PayError::new(ErrorCode::Internal, e.to_string())
    }
}

impl From<Eip712Error> for PayError {
    fn from(e: Eip712Error) -> Self {
        let code = match e {
            Eip712Error::InvalidJson(_) => ErrorCode::JsonError,
            Eip712Error::InvalidAddress(_) => ErrorCode::InvalidAddress,
            Eip712Error::InvalidSignature(_) => ErrorCode::InvalidSignature,
            Eip712Error::SigningError(_) => ErrorCode::SigningFailed,
            _ => ErrorCode::InvalidDocument,
        };
        PayError::new(code, e.to_string())
    }
}

impl From<ProviderError> for PayError {
    fn from(e: ProviderError) -> Self {
        let code = match e.code {
            ProviderError::USER_REJECTED => ErrorCode::UserRejected,
            ProviderError::DISCONNECTED => ErrorCode::ProviderUnavailable,
            ProviderError::TIMED_OUT => ErrorCode::Timeout,
            _ => ErrorCode::ProviderError,
        };
        PayError::new(code, e.message).with_details(format!("provider code {}", e.code))
    }
}

impl From<VerifyError> for PayError {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::Document(inner) => inner.into(),
            other => PayError::new(ErrorCode::VerificationFailed, other.to_string()),
        }
    }
}
