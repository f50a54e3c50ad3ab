//! Payment Documents
//!
//! The fixed demo document plus builders for the token authorizations a
//! payment facilitator verifies: ERC-3009 `TransferWithAuthorization` and
//! ERC-2612 `Permit`.

use crate::eip712::{
    Eip712Domain, Eip712Error, SigningRequest, TypeSchema, TypedDataField, EIP712_DOMAIN_TYPE,
};
use crate::error::{PayError, PayResult};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

/// USDC on Base Sepolia
pub const BASE_SEPOLIA_USDC: &str = "0x036CbD53842c5426634e7929541eC2318f3dCF7e";
pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84532;

/// Authorizations are valid from slightly in the past to absorb clock skew
const VALID_AFTER_SKEW_SECS: i64 = 600;

fn field(name: &str, type_name: &str) -> TypedDataField {
    TypedDataField::new(name, type_name)
}

fn standard_domain_fields() -> Vec<TypedDataField> {
    vec![
        field("name", "string"),
        field("version", "string"),
        field("chainId", "uint256"),
        field("verifyingContract", "address"),
    ]
}

/// The fixed "Ether Mail" document signed by the storefront Pay button
pub fn demo_mail() -> SigningRequest {
    let domain = Eip712Domain {
        chain_id: Some(BASE_SEPOLIA_CHAIN_ID),
        name: Some("Ether Mail".to_string()),
        verifying_contract: Some("0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC".to_string()),
        version: Some("1".to_string()),
        salt: None,
    };

    let message = json!({
        "contents": "Hello, Bob!",
        "attachedMoneyInEth": 4.2,
        "from": {
            "name": "Cow",
            "wallets": [
                "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826",
                "0xDeaDbeefdEAdbeefdEadbEEFdeadbeEFdEaDbeeF"
            ]
        },
        "to": [{
            "name": "Bob",
            "wallets": [
                "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB",
                "0xB0BdaBea57B0BDABeA57b0bdABEA57b0BDabEa57",
                "0xB0B0b0b0b0b0B000000000000000000000000000"
            ]
        }]
    });

    let mut types = TypeSchema::new();
    types.insert(EIP712_DOMAIN_TYPE.to_string(), standard_domain_fields());
    types.insert(
        "Group".to_string(),
        vec![field("name", "string"), field("members", "Person[]")],
    );
    types.insert(
        "Mail".to_string(),
        vec![
            field("from", "Person"),
            field("to", "Person[]"),
            field("contents", "string"),
        ],
    );
    types.insert(
        "Person".to_string(),
        vec![field("name", "string"), field("wallets", "address[]")],
    );

    SigningRequest::from_parts(domain, "Mail", message, types)
}

/// Domain of an EIP-712 enabled token contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: String,
}

impl TokenDomain {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract: verifying_contract.into(),
        }
    }

    /// USDC on Base Sepolia ("USDC", version "2")
    pub fn base_sepolia_usdc() -> Self {
        Self::new("USDC", "2", BASE_SEPOLIA_CHAIN_ID, BASE_SEPOLIA_USDC)
    }

    fn to_domain(&self) -> Eip712Domain {
        Eip712Domain {
            chain_id: Some(self.chain_id),
            name: Some(self.name.clone()),
            verifying_contract: Some(self.verifying_contract.clone()),
            version: Some(self.version.clone()),
            salt: None,
        }
    }
}

/// ERC-3009 transfer authorization
///
/// Integers are decimal strings so full uint256 values survive JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferAuthorization {
    pub from: String,
    pub to: String,
    pub value: String,
    pub valid_after: String,
    pub valid_before: String,
    /// 32-byte hex nonce
    pub nonce: String,
}

impl TransferAuthorization {
    /// Authorization valid from ten minutes ago until `valid_for` from now,
    /// with a random nonce.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        value: impl Into<String>,
        valid_for: Duration,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        let valid_for = i64::try_from(valid_for.as_secs()).unwrap_or(i64::MAX);

        Self {
            from: from.into(),
            to: to.into(),
            value: value.into(),
            valid_after: (now - VALID_AFTER_SKEW_SECS).to_string(),
            valid_before: now.saturating_add(valid_for).to_string(),
            nonce: random_nonce(),
        }
    }
}

/// ERC-2612 permit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permit {
    pub owner: String,
    pub spender: String,
    pub value: String,
    pub nonce: String,
    pub deadline: String,
}

/// Random 32-byte nonce as 0x-prefixed hex
pub fn random_nonce() -> String {
    let mut nonce = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    format!("0x{}", hex::encode(nonce))
}

/// Build the ERC-3009 `TransferWithAuthorization` document
pub fn transfer_with_authorization(
    domain: &TokenDomain,
    auth: &TransferAuthorization,
) -> Result<SigningRequest, Eip712Error> {
    let mut types = TypeSchema::new();
    types.insert(EIP712_DOMAIN_TYPE.to_string(), standard_domain_fields());
    types.insert(
        "TransferWithAuthorization".to_string(),
        vec![
            field("from", "address"),
            field("to", "address"),
            field("value", "uint256"),
            field("validAfter", "uint256"),
            field("validBefore", "uint256"),
            field("nonce", "bytes32"),
        ],
    );

    let message =
        serde_json::to_value(auth).map_err(|e| Eip712Error::InvalidJson(e.to_string()))?;
    SigningRequest::new(domain.to_domain(), "TransferWithAuthorization", message, types)
}

/// Build the ERC-2612 `Permit` document
pub fn permit(domain: &TokenDomain, permit: &Permit) -> Result<SigningRequest, Eip712Error> {
    let mut types = TypeSchema::new();
    types.insert(EIP712_DOMAIN_TYPE.to_string(), standard_domain_fields());
    types.insert(
        "Permit".to_string(),
        vec![
            field("owner", "address"),
            field("spender", "address"),
            field("value", "uint256"),
            field("nonce", "uint256"),
            field("deadline", "uint256"),
        ],
    );

    let message =
        serde_json::to_value(permit).map_err(|e| Eip712Error::InvalidJson(e.to_string()))?;
    SigningRequest::new(domain.to_domain(), "Permit", message, types)
}

/// Read a document from a JSON file, or fall back to the demo document
pub fn load_document(path: Option<&Path>) -> PayResult<SigningRequest> {
    let Some(path) = path else {
        return Ok(demo_mail());
    };

    let json = std::fs::read_to_string(path).map_err(|e| {
        PayError::invalid_input(format!("cannot read document: {}", e))
            .with_details(path.display().to_string())
    })?;
    SigningRequest::from_json(&json).map_err(|e| {
        PayError::invalid_document(e.to_string()).with_details(path.display().to_string())
    })
}
