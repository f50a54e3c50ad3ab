//! EIP-712 Type Definitions
//!
//! The signing request document, its schema and the signature value.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Name of the schema entry describing the domain record
pub const EIP712_DOMAIN_TYPE: &str = "EIP712Domain";

/// Type name -> ordered field descriptors
pub type TypeSchema = BTreeMap<String, Vec<TypedDataField>>;

/// A field in a struct type definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypedDataField {
    /// The name of the field
    pub name: String,
    /// The type of the field (e.g., "address", "uint256", "Person[]")
    #[serde(rename = "type")]
    pub type_name: String,
}

impl TypedDataField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// The EIP-712 domain record
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Eip712Domain {
    /// The EIP-155 chain ID
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_chain_id"
    )]
    pub chain_id: Option<u64>,

    /// The human-readable name of the signing domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The address of the contract that will verify the signature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<String>,

    /// The current major version of the signing domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// An optional disambiguating salt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

impl Eip712Domain {
    /// Standard EIP712Domain fields for the values present, in canonical order
    pub fn present_fields(&self) -> Vec<TypedDataField> {
        let mut fields = Vec::new();

        if self.name.is_some() {
            fields.push(TypedDataField::new("name", "string"));
        }
        if self.version.is_some() {
            fields.push(TypedDataField::new("version", "string"));
        }
        if self.chain_id.is_some() {
            fields.push(TypedDataField::new("chainId", "uint256"));
        }
        if self.verifying_contract.is_some() {
            fields.push(TypedDataField::new("verifyingContract", "address"));
        }
        if self.salt.is_some() {
            fields.push(TypedDataField::new("salt", "bytes32"));
        }

        fields
    }

    /// The domain as a JSON record, as consumed by the encoder
    pub fn to_value(&self) -> Result<Value, Eip712Error> {
        serde_json::to_value(self).map_err(|e| Eip712Error::InvalidJson(e.to_string()))
    }
}

/// The standard type for a known domain field name
pub(crate) fn standard_domain_field_type(name: &str) -> Option<&'static str> {
    match name {
        "name" | "version" => Some("string"),
        "chainId" => Some("uint256"),
        "verifyingContract" => Some("address"),
        "salt" => Some("bytes32"),
        _ => None,
    }
}

/// Accepts a chain id as a JSON number, a decimal string or a 0x-prefixed hex string
fn deserialize_chain_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw = Option::<Value>::deserialize(deserializer)?;
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid chainId: {}", n))),
        Some(Value::String(s)) => {
            let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex_digits) => u64::from_str_radix(hex_digits, 16),
                None => s.parse(),
            };
            parsed
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid chainId: {}", s)))
        }
        Some(other) => Err(D::Error::custom(format!("invalid chainId: {}", other))),
    }
}

/// A structured document submitted for signature
///
/// The value is validated on construction and never mutated afterwards.
/// On the wire `message_type` is `primaryType` and `type_schema` is `types`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "SigningRequestWire")]
pub struct SigningRequest {
    domain: Eip712Domain,
    message: Value,
    #[serde(rename = "primaryType")]
    message_type: String,
    #[serde(rename = "types")]
    type_schema: TypeSchema,
}

#[derive(Deserialize)]
struct SigningRequestWire {
    domain: Eip712Domain,
    message: Value,
    #[serde(rename = "primaryType")]
    message_type: String,
    #[serde(rename = "types")]
    type_schema: TypeSchema,
}

impl TryFrom<SigningRequestWire> for SigningRequest {
    type Error = Eip712Error;

    fn try_from(wire: SigningRequestWire) -> Result<Self, Self::Error> {
        SigningRequest::new(wire.domain, wire.message_type, wire.message, wire.type_schema)
    }
}

impl SigningRequest {
    /// Build and validate a signing request
    pub fn new(
        domain: Eip712Domain,
        message_type: impl Into<String>,
        message: Value,
        type_schema: TypeSchema,
    ) -> Result<Self, Eip712Error> {
        let request = Self::from_parts(domain, message_type, message, type_schema);
        request.validate()?;
        Ok(request)
    }

    /// Assemble without validation, for documents known to be well formed
    pub(crate) fn from_parts(
        domain: Eip712Domain,
        message_type: impl Into<String>,
        message: Value,
        type_schema: TypeSchema,
    ) -> Self {
        Self {
            domain,
            message,
            message_type: message_type.into(),
            type_schema,
        }
    }

    /// Parse a signing request from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Eip712Error> {
        let wire: SigningRequestWire =
            serde_json::from_str(json).map_err(|e| Eip712Error::InvalidJson(e.to_string()))?;
        Self::try_from(wire)
    }

    /// Parse a signing request from an already decoded JSON value
    pub fn from_value(value: Value) -> Result<Self, Eip712Error> {
        let wire: SigningRequestWire =
            serde_json::from_value(value).map_err(|e| Eip712Error::InvalidJson(e.to_string()))?;
        Self::try_from(wire)
    }

    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    pub fn message(&self) -> &Value {
        &self.message
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    pub fn type_schema(&self) -> &TypeSchema {
        &self.type_schema
    }

    /// Serialize to the canonical JSON string presented for signing
    ///
    /// Object keys are sorted at every level and no whitespace is emitted, so
    /// equal documents always produce identical bytes.
    pub fn to_canonical_json(&self) -> Result<String, Eip712Error> {
        let value =
            serde_json::to_value(self).map_err(|e| Eip712Error::InvalidJson(e.to_string()))?;
        serde_json::to_string(&sort_keys(value)).map_err(|e| Eip712Error::InvalidJson(e.to_string()))
    }

    /// Check the document against its own schema
    pub fn validate(&self) -> Result<(), Eip712Error> {
        if !self.type_schema.contains_key(&self.message_type) {
            return Err(Eip712Error::InvalidPrimaryType(self.message_type.clone()));
        }

        self.validate_domain()?;

        for fields in self.type_schema.values() {
            for field in fields {
                self.validate_type(&field.type_name)?;
            }
        }

        self.check_conformance(&self.message_type, &self.message, &self.message_type)
    }

    /// The EIP712Domain entry must describe exactly the domain fields present
    fn validate_domain(&self) -> Result<(), Eip712Error> {
        let declared = self
            .type_schema
            .get(EIP712_DOMAIN_TYPE)
            .ok_or(Eip712Error::MissingDomainType)?;

        for field in declared {
            let expected = standard_domain_field_type(&field.name).ok_or_else(|| {
                Eip712Error::DomainMismatch(format!("unknown domain field '{}'", field.name))
            })?;
            if field.type_name != expected {
                return Err(Eip712Error::DomainMismatch(format!(
                    "domain field '{}' must be {}, found {}",
                    field.name, expected, field.type_name
                )));
            }
        }

        let mut declared_names: Vec<&str> = declared.iter().map(|f| f.name.as_str()).collect();
        let present = self.domain.present_fields();
        let mut present_names: Vec<&str> = present.iter().map(|f| f.name.as_str()).collect();
        declared_names.sort_unstable();
        present_names.sort_unstable();

        if declared_names != present_names {
            return Err(Eip712Error::DomainMismatch(format!(
                "schema declares [{}] but domain has [{}]",
                declared_names.join(","),
                present_names.join(",")
            )));
        }

        Ok(())
    }

    /// Check if a type is valid (either a built-in type or defined in the schema)
    fn validate_type(&self, type_name: &str) -> Result<(), Eip712Error> {
        let base_type = super::encoder::get_base_type(type_name);
        super::encoder::array_dimensions(type_name)?;

        if is_atomic_type(base_type) || is_dynamic_type(base_type) {
            return Ok(());
        }

        if self.type_schema.contains_key(base_type) {
            return Ok(());
        }

        Err(Eip712Error::InvalidType(type_name.to_string()))
    }

    /// Every field named by the schema must be present in the message
    fn check_conformance(&self, type_name: &str, value: &Value, path: &str) -> Result<(), Eip712Error> {
        if let Some((element_type, length)) = super::encoder::split_array_type(type_name)? {
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
            for (i, item) in items.iter().enumerate() {
                self.check_conformance(element_type, item, &format!("{}[{}]", path, i))?;
            }
            return Ok(());
        }

        let Some(fields) = self.type_schema.get(type_name) else {
            return Ok(());
        };

        let obj = value.as_object().ok_or_else(|| Eip712Error::InvalidValue {
            type_name: type_name.to_string(),
            value: value.to_string(),
        })?;

        for field in fields {
            let field_path = format!("{}.{}", path, field.name);
            let field_value = obj
                .get(&field.name)
                .ok_or_else(|| Eip712Error::MissingField(field_path.clone()))?;
            self.check_conformance(&field.type_name, field_value, &field_path)?;
        }

        Ok(())
    }
}

/// Rebuild a JSON value with object keys in lexicographic order
pub(crate) fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, inner) in entries {
                sorted.insert(key, sort_keys(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// EIP-712 signature components
#[derive(Debug, Clone, Zeroize, ZeroizeOnDrop)]
pub struct Eip712Signature {
    /// r component (32 bytes)
    pub r: [u8; 32],
    /// s component (32 bytes)
    pub s: [u8; 32],
    /// v component (27 or 28)
    pub v: u8,
}

impl Eip712Signature {
    /// Create from raw components
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Self { r, s, v }
    }

    /// Create from 65-byte signature (r || s || v)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Eip712Error> {
        if bytes.len() != 65 {
            return Err(Eip712Error::InvalidSignature(format!(
                "expected 65 bytes, got {}",
                bytes.len()
            )));
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[0..32]);
        s.copy_from_slice(&bytes[32..64]);

        // Some wallets return the bare recovery id
        let v = match bytes[64] {
            0 | 1 => bytes[64] + 27,
            27 | 28 => bytes[64],
            other => {
                return Err(Eip712Error::InvalidSignature(format!(
                    "unsupported recovery byte {}",
                    other
                )))
            }
        };

        Ok(Self { r, s, v })
    }

    /// Parse a hex signature, with or without the 0x prefix
    pub fn from_hex(signature: &str) -> Result<Self, Eip712Error> {
        let trimmed = signature.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(digits)
            .map_err(|e| Eip712Error::InvalidSignature(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Convert to 65-byte representation (r || s || v)
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[0..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

/// Errors that can occur during EIP-712 operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Eip712Error {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid type: {0}")]
    InvalidType(String),

    #[error("Invalid primary type: {0}")]
    InvalidPrimaryType(String),

    #[error("Missing EIP712Domain type definition")]
    MissingDomainType,

    #[error("Domain does not match EIP712Domain: {0}")]
    DomainMismatch(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid value for type {type_name}: {value}")]
    InvalidValue { type_name: String, value: String },

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Signing error: {0}")]
    SigningError(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

/// Check if a type is an atomic (fixed-size) type
pub fn is_atomic_type(type_name: &str) -> bool {
    if type_name == "address" || type_name == "bool" {
        return true;
    }

    if let Some(bits) = integer_bits(type_name) {
        return bits > 0 && bits <= 256 && bits % 8 == 0;
    }

    // bytesN (fixed-size bytes)
    if let Some(size) = type_name.strip_prefix("bytes") {
        if let Ok(n) = size.parse::<u32>() {
            return n > 0 && n <= 32;
        }
    }

    false
}

/// Bit width of a `uintN`/`intN` type name
pub(crate) fn integer_bits(type_name: &str) -> Option<usize> {
    let digits = type_name
        .strip_prefix("uint")
        .or_else(|| type_name.strip_prefix("int"))?;
    digits.parse().ok()
}

/// Check if a type is a dynamic type
pub fn is_dynamic_type(type_name: &str) -> bool {
    type_name == "bytes" || type_name == "string"
}
