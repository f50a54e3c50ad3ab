//! EIP-712 Type Encoding
//!
//! Implements the `encodeType` and `encodeData` rules for EIP-712 typed data.

use super::types::*;
use ethers_core::types::{I256, U256};
use serde_json::Value;
use std::collections::BTreeSet;
use tiny_keccak::{Hasher, Keccak};

/// Encode a type string for a struct type
/// Format: "TypeName(type1 name1,type2 name2,...)Dep1(...)Dep2(...)"
pub fn encode_type(type_name: &str, types: &TypeSchema) -> Result<String, Eip712Error> {
    let fields = types
        .get(type_name)
        .ok_or_else(|| Eip712Error::InvalidType(type_name.to_string()))?;

    let mut result = format_type_string(type_name, fields);

    // BTreeSet iteration gives the alphabetical order encodeType requires
    for dep in find_type_dependencies(type_name, types) {
        if dep == type_name {
            continue;
        }
        if let Some(dep_fields) = types.get(&dep) {
            result.push_str(&format_type_string(&dep, dep_fields));
        }
    }

    Ok(result)
}

fn format_type_string(type_name: &str, fields: &[TypedDataField]) -> String {
    let field_strs: Vec<String> = fields
        .iter()
        .map(|f| format!("{} {}", f.type_name, f.name))
        .collect();

    format!("{}({})", type_name, field_strs.join(","))
}

/// Find all struct types reachable from `type_name`, including itself
pub fn find_type_dependencies(type_name: &str, types: &TypeSchema) -> BTreeSet<String> {
    let mut dependencies = BTreeSet::new();
    let mut to_visit = vec![type_name.to_string()];

    while let Some(current) = to_visit.pop() {
        if dependencies.contains(&current) {
            continue;
        }

        if let Some(fields) = types.get(&current) {
            dependencies.insert(current.clone());

            for field in fields {
                let base_type = get_base_type(&field.type_name);
                if types.contains_key(base_type) && !dependencies.contains(base_type) {
                    to_visit.push(base_type.to_string());
                }
            }
        }
    }

    dependencies
}

/// Get the base type from a potentially array type
/// e.g., "Person[]" -> "Person", "uint256[2][]" -> "uint256"
pub fn get_base_type(type_name: &str) -> &str {
    match type_name.find('[') {
        Some(bracket_pos) => &type_name[..bracket_pos],
        None => type_name,
    }
}

/// Split off the outermost array dimension
///
/// `"Person[]"` -> `("Person", None)`, `"uint8[3]"` -> `("uint8", Some(3))`,
/// `"uint8[3][]"` -> `("uint8[3]", None)`. Returns `None` for non-array types.
pub fn split_array_type(type_name: &str) -> Result<Option<(&str, Option<usize>)>, Eip712Error> {
    if !type_name.contains('[') {
        return Ok(None);
    }

    let invalid = || Eip712Error::InvalidType(type_name.to_string());

    let inner_end = type_name.len().checked_sub(1).ok_or_else(invalid)?;
    if !type_name.ends_with(']') {
        return Err(invalid());
    }
    let open = type_name.rfind('[').ok_or_else(invalid)?;
    if open == 0 {
        return Err(invalid());
    }

    let size = &type_name[open + 1..inner_end];
    let length = if size.is_empty() {
        None
    } else {
        let n: usize = size.parse().map_err(|_| invalid())?;
        Some(n)
    };

    Ok(Some((&type_name[..open], length)))
}

/// Number of array dimensions in a type name; errors on malformed suffixes
pub fn array_dimensions(type_name: &str) -> Result<usize, Eip712Error> {
    let mut current = type_name;
    let mut depth = 0;
    while let Some((element, _)) = split_array_type(current)? {
        current = element;
        depth += 1;
    }
    Ok(depth)
}

/// typeHash = keccak256(encodeType(typeOf(s)))
pub fn type_hash(type_name: &str, types: &TypeSchema) -> Result<[u8; 32], Eip712Error> {
    let encoded = encode_type(type_name, types)?;
    Ok(keccak256(encoded.as_bytes()))
}

/// encodeData for a struct value, prefixed with its type hash
pub fn encode_data(
    type_name: &str,
    value: &Value,
    types: &TypeSchema,
) -> Result<Vec<u8>, Eip712Error> {
    let obj = value.as_object().ok_or_else(|| Eip712Error::InvalidValue {
        type_name: type_name.to_string(),
        value: value.to_string(),
    })?;

    let fields = types
        .get(type_name)
        .ok_or_else(|| Eip712Error::InvalidType(type_name.to_string()))?;

    let mut encoded = Vec::with_capacity(32 * (fields.len() + 1));
    encoded.extend_from_slice(&type_hash(type_name, types)?);

    for field in fields {
        let field_value = obj
            .get(&field.name)
            .ok_or_else(|| Eip712Error::MissingField(format!("{}.{}", type_name, field.name)))?;

        encoded.extend_from_slice(&encode_value(&field.type_name, field_value, types)?);
    }

    Ok(encoded)
}

/// Encode a single member value into its 32-byte slot
///
/// Structs, arrays and dynamic types are hashed; atomic types are padded.
pub fn encode_value(
    type_name: &str,
    value: &Value,
    types: &TypeSchema,
) -> Result<[u8; 32], Eip712Error> {
    if let Some((element_type, length)) = split_array_type(type_name)? {
        let items = value.as_array().ok_or_else(|| Eip712Error::InvalidValue {
            type_name: type_name.to_string(),
            value: value.to_string(),
        })?;

        if let Some(expected) = length {
            if items.len() != expected {
                return Err(Eip712Error::InvalidValue {
                    type_name: type_name.to_string(),
                    value: format!("expected {} elements, got {}", expected, items.len()),
                });
            }
        }

        let mut encoded = Vec::with_capacity(items.len() * 32);
        for item in items {
            encoded.extend_from_slice(&encode_value(element_type, item, types)?);
        }
        return Ok(keccak256(&encoded));
    }

    match type_name {
        "string" => Ok(keccak256(encode_string(value)?.as_bytes())),
        "bytes" => Ok(keccak256(&encode_bytes(value)?)),
        struct_type if types.contains_key(struct_type) => {
            Ok(keccak256(&encode_data(struct_type, value, types)?))
        }
        atomic => encode_atomic(atomic, value),
    }
}

fn invalid_value(type_name: &str, value: impl ToString) -> Eip712Error {
    Eip712Error::InvalidValue {
        type_name: type_name.to_string(),
        value: value.to_string(),
    }
}

/// Encode an atomic (fixed-size) value
fn encode_atomic(type_name: &str, value: &Value) -> Result<[u8; 32], Eip712Error> {
    let mut result = [0u8; 32];

    if type_name == "address" {
        let addr = value.as_str().ok_or_else(|| invalid_value(type_name, value))?;
        result[12..].copy_from_slice(&parse_address(addr)?);
        return Ok(result);
    }

    if type_name == "bool" {
        let b = value.as_bool().ok_or_else(|| invalid_value(type_name, value))?;
        result[31] = u8::from(b);
        return Ok(result);
    }

    if type_name.starts_with("uint") {
        let bits = checked_bits(type_name)?;
        let n = parse_uint(type_name, value)?;
        if n.bits() > bits {
            return Err(invalid_value(type_name, format!("{} exceeds {} bits", n, bits)));
        }
        n.to_big_endian(&mut result);
        return Ok(result);
    }

    if type_name.starts_with("int") {
        let bits = checked_bits(type_name)?;
        let n = parse_int(type_name, value)?;
        if bits < 256 {
            let limit = U256::from(2u8).pow(U256::from(bits - 1));
            let out_of_range = if n.is_negative() {
                n.unsigned_abs() > limit
            } else {
                n.into_raw() >= limit
            };
            if out_of_range {
                return Err(invalid_value(type_name, format!("{} exceeds {} bits", n, bits)));
            }
        }
        // two's complement, sign-extended to 256 bits
        n.into_raw().to_big_endian(&mut result);
        return Ok(result);
    }

    // bytesN (fixed-size bytes, right-padded)
    if let Some(size) = type_name.strip_prefix("bytes") {
        let size: usize = match size.parse() {
            Ok(size) if (1..=32).contains(&size) => size,
            _ => return Err(Eip712Error::InvalidType(type_name.to_string())),
        };

        let hex_str = value.as_str().ok_or_else(|| invalid_value(type_name, value))?;
        let bytes = parse_hex(hex_str)?;
        if bytes.len() > size {
            return Err(invalid_value(
                type_name,
                format!("bytes too long: {} > {}", bytes.len(), size),
            ));
        }

        result[..bytes.len()].copy_from_slice(&bytes);
        return Ok(result);
    }

    Err(Eip712Error::InvalidType(type_name.to_string()))
}

fn checked_bits(type_name: &str) -> Result<usize, Eip712Error> {
    match integer_bits(type_name) {
        Some(bits) if bits > 0 && bits <= 256 && bits % 8 == 0 => Ok(bits),
        _ => Err(Eip712Error::InvalidType(type_name.to_string())),
    }
}

fn encode_bytes(value: &Value) -> Result<Vec<u8>, Eip712Error> {
    let hex_str = value.as_str().ok_or_else(|| invalid_value("bytes", value))?;
    parse_hex(hex_str)
}

fn encode_string(value: &Value) -> Result<&str, Eip712Error> {
    value.as_str().ok_or_else(|| invalid_value("string", value))
}

/// Parse a 20-byte Ethereum address (checksum is not enforced)
pub fn parse_address(addr: &str) -> Result<[u8; 20], Eip712Error> {
    let addr = strip_hex_prefix(addr).unwrap_or(addr);

    if addr.len() != 40 {
        return Err(Eip712Error::InvalidAddress(format!(
            "invalid length: expected 40 hex chars, got {}",
            addr.len()
        )));
    }

    let bytes =
        hex::decode(addr).map_err(|e| Eip712Error::InvalidAddress(format!("invalid hex: {}", e)))?;

    let mut result = [0u8; 20];
    result.copy_from_slice(&bytes);
    Ok(result)
}

/// Parse an unsigned integer (JSON number, decimal string or 0x hex string)
fn parse_uint(type_name: &str, value: &Value) -> Result<U256, Eip712Error> {
    match value {
        Value::Number(n) => match n.as_u64() {
            Some(u) => Ok(U256::from(u)),
            // floats and negatives are rejected; big integers survive only with
            // serde_json's arbitrary precision enabled
            None => U256::from_dec_str(&n.to_string()).map_err(|_| invalid_value(type_name, n)),
        },
        Value::String(s) => match strip_hex_prefix(s) {
            Some(digits) => {
                U256::from_str_radix(digits, 16).map_err(|_| invalid_value(type_name, s))
            }
            None => U256::from_dec_str(s).map_err(|_| invalid_value(type_name, s)),
        },
        _ => Err(invalid_value(type_name, value)),
    }
}

/// Parse a signed integer; hex strings are taken as two's complement
fn parse_int(type_name: &str, value: &Value) -> Result<I256, Eip712Error> {
    match value {
        Value::Number(n) => {
            I256::from_dec_str(&n.to_string()).map_err(|_| invalid_value(type_name, n))
        }
        Value::String(s) => match strip_hex_prefix(s) {
            Some(digits) => U256::from_str_radix(digits, 16)
                .map(I256::from_raw)
                .map_err(|_| invalid_value(type_name, s)),
            None => I256::from_dec_str(s).map_err(|_| invalid_value(type_name, s)),
        },
        _ => Err(invalid_value(type_name, value)),
    }
}

pub(crate) fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

/// Parse a hex string (with or without 0x prefix)
fn parse_hex(s: &str) -> Result<Vec<u8>, Eip712Error> {
    let s = strip_hex_prefix(s).unwrap_or(s);
    hex::decode(s).map_err(|e| Eip712Error::EncodingError(format!("invalid hex: {}", e)))
}

/// Compute keccak256 hash
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}
