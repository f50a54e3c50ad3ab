//! EIP-712 Hashing
//!
//! Implements domain separator and struct hashing for EIP-712.

use super::encoder::{encode_data, keccak256};
use super::types::*;

/// Magic prefix for EIP-712 encoding
const EIP712_PREFIX: &[u8] = b"\x19\x01";

/// Calculate the domain separator hash
///
/// domainSeparator = hashStruct(eip712Domain)
///
/// The declared `EIP712Domain` entry fixes the field order. When the schema
/// has none, the standard order for the fields present is used.
pub fn domain_separator(domain: &Eip712Domain, types: &TypeSchema) -> Result<[u8; 32], Eip712Error> {
    let domain_value = domain.to_value()?;

    if types.contains_key(EIP712_DOMAIN_TYPE) {
        return hash_struct(EIP712_DOMAIN_TYPE, &domain_value, types);
    }

    let mut domain_only = TypeSchema::new();
    domain_only.insert(EIP712_DOMAIN_TYPE.to_string(), domain.present_fields());
    hash_struct(EIP712_DOMAIN_TYPE, &domain_value, &domain_only)
}

/// Hash a struct according to EIP-712
///
/// hashStruct(s) = keccak256(typeHash || encodeData(s))
pub fn hash_struct(
    type_name: &str,
    data: &serde_json::Value,
    types: &TypeSchema,
) -> Result<[u8; 32], Eip712Error> {
    let encoded = encode_data(type_name, data, types)?;
    Ok(keccak256(&encoded))
}

/// Calculate the final EIP-712 hash for signing
///
/// hash = keccak256("\x19\x01" || domainSeparator || hashStruct(message))
pub fn hash_typed_data(request: &SigningRequest) -> Result<[u8; 32], Eip712Error> {
    Ok(get_pre_image(request)?.final_hash)
}

/// Pre-image components (for external signing and display)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eip712PreImage {
    pub domain_separator: [u8; 32],
    pub struct_hash: [u8; 32],
    pub final_hash: [u8; 32],
}

/// Calculate the pre-image components for EIP-712
pub fn get_pre_image(request: &SigningRequest) -> Result<Eip712PreImage, Eip712Error> {
    let domain_separator = domain_separator(request.domain(), request.type_schema())?;
    let struct_hash = hash_struct(
        request.message_type(),
        request.message(),
        request.type_schema(),
    )?;

    let mut data = Vec::with_capacity(2 + 32 + 32);
    data.extend_from_slice(EIP712_PREFIX);
    data.extend_from_slice(&domain_separator);
    data.extend_from_slice(&struct_hash);
    let final_hash = keccak256(&data);

    Ok(Eip712PreImage {
        domain_separator,
        struct_hash,
        final_hash,
    })
}
