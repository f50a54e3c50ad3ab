//! EIP-712 Typed Data Signing
//!
//! Implementation of EIP-712 typed structured data hashing and signing.
//! Signing requests are validated against their own schema and serialized
//! canonically before they are handed to a wallet.
//!
//! # Reference
//! - <https://eips.ethereum.org/EIPS/eip-712>
//!
//! # Example
//! ```rust,ignore
//! use typed_pay::eip712::{SigningRequest, hash_typed_data, sign_typed_data};
//!
//! let request = SigningRequest::from_json(json_string)?;
//! let hash = hash_typed_data(&request)?;
//! let signature = sign_typed_data(&request, &private_key)?;
//! ```

pub mod types;
pub mod encoder;
pub mod hasher;
pub mod signer;

pub use types::*;
pub use encoder::*;
pub use hasher::*;
pub use signer::*;

#[cfg(test)]
mod tests;
