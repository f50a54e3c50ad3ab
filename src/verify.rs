//! Signature Verification
//!
//! Recovers the signer of a typed-data document and checks it against the
//! account that was expected to sign.

use crate::eip712::{
    hash_typed_data, recover_address, same_address, Eip712Error, Eip712Signature, SigningRequest,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Document(#[from] Eip712Error),

    #[error("signer mismatch: recovered {recovered}, expected {expected}")]
    SignerMismatch { recovered: String, expected: String },
}

/// Recover the checksummed address that produced `signature_hex`.
///
/// The signature is 65 bytes of hex, with or without `0x`; the recovery
/// byte may be 0, 1, 27 or 28.
pub fn recover_signer(document: &SigningRequest, signature_hex: &str) -> Result<String, VerifyError> {
    let signature = Eip712Signature::from_hex(signature_hex)?;
    let digest = hash_typed_data(document)?;
    Ok(recover_address(&digest, &signature)?)
}

/// Recover the signer and require it to be `expected`.
///
/// Returns the recovered address on success.
pub fn verify_signer(
    document: &SigningRequest,
    signature_hex: &str,
    expected: &str,
) -> Result<String, VerifyError> {
    let recovered = recover_signer(document, signature_hex)?;
    if !same_address(&recovered, expected) {
        return Err(VerifyError::SignerMismatch {
            recovered,
            expected: expected.to_string(),
        });
    }
    Ok(recovered)
}
