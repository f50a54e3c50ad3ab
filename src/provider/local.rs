//! Local Key Wallet
//!
//! A software wallet over a single secp256k1 key. It answers the same
//! requests a browser wallet would, without prompting.

use super::{
    ProviderError, RpcRequest, WalletProvider, ACCOUNTS, CHAIN_ID, REQUEST_ACCOUNTS,
    SIGN_TYPED_DATA_V4,
};
use crate::eip712::encoder::strip_hex_prefix;
use crate::eip712::{address_from_private_key, same_address, sign_typed_data, SigningRequest};
use crate::logging::redact_address;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use tracing::debug;
use zeroize::Zeroizing;

/// Default chain for the local wallet (Base Sepolia)
pub const DEFAULT_CHAIN_ID: u64 = 84532;

pub struct LocalWalletProvider {
    private_key: Zeroizing<[u8; 32]>,
    address: String,
    chain_id: u64,
}

impl LocalWalletProvider {
    /// Create from raw key bytes
    pub fn from_private_key(private_key: &[u8]) -> Result<Self, ProviderError> {
        let address = address_from_private_key(private_key)
            .map_err(|e| ProviderError::invalid_params(e.to_string()))?;

        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(private_key);

        Ok(Self {
            private_key: key,
            address,
            chain_id: DEFAULT_CHAIN_ID,
        })
    }

    /// Create from a hex key, with or without 0x prefix
    pub fn from_hex(private_key_hex: &str) -> Result<Self, ProviderError> {
        let trimmed = private_key_hex.trim();
        let digits = strip_hex_prefix(trimmed).unwrap_or(trimmed);
        let bytes = Zeroizing::new(
            hex::decode(digits)
                .map_err(|e| ProviderError::invalid_params(format!("invalid key hex: {}", e)))?,
        );
        Self::from_private_key(&bytes)
    }

    /// Create with a fresh random key
    pub fn random() -> Result<Self, ProviderError> {
        let secret = secp256k1::SecretKey::new(&mut rand::rngs::OsRng);
        let bytes = Zeroizing::new(secret.secret_bytes());
        Self::from_private_key(&bytes[..])
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Checksummed address of the key
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn sign_typed_data_v4(&self, params: &[Value]) -> Result<Value, ProviderError> {
        let [address, document] = params else {
            return Err(ProviderError::invalid_params(format!(
                "expected [address, typedData], got {} params",
                params.len()
            )));
        };

        let address = address
            .as_str()
            .ok_or_else(|| ProviderError::invalid_params("address must be a string"))?;
        if !same_address(address, &self.address) {
            return Err(ProviderError::unauthorized(format!(
                "account {} is not managed by this wallet",
                address
            )));
        }

        // Browser wallets accept the document as a JSON string or an object
        let request = match document {
            Value::String(json) => SigningRequest::from_json(json),
            other => SigningRequest::from_value(other.clone()),
        }
        .map_err(|e| ProviderError::invalid_params(e.to_string()))?;

        let signature = sign_typed_data(&request, &self.private_key[..])
            .map_err(|e| ProviderError::internal(e.to_string()))?;

        debug!(
            signer = %redact_address(&self.address),
            primary_type = request.message_type(),
            "typed data signed"
        );

        Ok(Value::String(signature.to_hex()))
    }
}

impl fmt::Debug for LocalWalletProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalWalletProvider")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl WalletProvider for LocalWalletProvider {
    async fn connect(&self) -> Result<Vec<String>, ProviderError> {
        Ok(vec![self.address.clone()])
    }

    async fn request(&self, request: RpcRequest) -> Result<Value, ProviderError> {
        match request.method.as_str() {
            REQUEST_ACCOUNTS | ACCOUNTS => Ok(Value::from(vec![self.address.clone()])),
            CHAIN_ID => Ok(Value::String(format!("0x{:x}", self.chain_id))),
            SIGN_TYPED_DATA_V4 => self.sign_typed_data_v4(&request.params),
            other => Err(ProviderError::unsupported_method(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::demo_mail;
    use crate::eip712::{hash_typed_data, recover_address, Eip712Signature};
    use serde_json::json;

    const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[tokio::test]
    async fn test_connect_returns_own_address() {
        let wallet = LocalWalletProvider::from_hex(TEST_KEY).unwrap();
        let accounts = wallet.connect().await.unwrap();
        assert_eq!(accounts, vec!["0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"]);
    }

    #[tokio::test]
    async fn test_chain_id() {
        let wallet = LocalWalletProvider::from_hex(TEST_KEY).unwrap().with_chain_id(1);
        let result = wallet.request(RpcRequest::new(CHAIN_ID, vec![])).await.unwrap();
        assert_eq!(result, json!("0x1"));

        let default = LocalWalletProvider::from_hex(TEST_KEY).unwrap();
        let result = default.request(RpcRequest::new(CHAIN_ID, vec![])).await.unwrap();
        assert_eq!(result, json!("0x14a34"));
    }

    #[tokio::test]
    async fn test_sign_recovers_to_wallet() {
        let wallet = LocalWalletProvider::from_hex(TEST_KEY).unwrap();
        let document = demo_mail();
        let json = document.to_canonical_json().unwrap();

        let result = wallet
            .request(RpcRequest::sign_typed_data_v4(wallet.address().to_lowercase(), json))
            .await
            .unwrap();

        let signature = Eip712Signature::from_hex(result.as_str().unwrap()).unwrap();
        let hash = hash_typed_data(&document).unwrap();
        assert_eq!(recover_address(&hash, &signature).unwrap(), wallet.address());
    }

    #[tokio::test]
    async fn test_sign_accepts_object_document() {
        let wallet = LocalWalletProvider::from_hex(TEST_KEY).unwrap();
        let document = serde_json::to_value(demo_mail()).unwrap();

        let result = wallet
            .request(RpcRequest::new(
                SIGN_TYPED_DATA_V4,
                vec![json!(wallet.address()), document],
            ))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_foreign_account_unauthorized() {
        let wallet = LocalWalletProvider::from_hex(TEST_KEY).unwrap();
        let json = demo_mail().to_canonical_json().unwrap();

        let err = wallet
            .request(RpcRequest::sign_typed_data_v4(
                "0x0000000000000000000000000000000000000001",
                json,
            ))
            .await
            .unwrap_err();
        assert_eq!(err.code, ProviderError::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_document_invalid_params() {
        let wallet = LocalWalletProvider::from_hex(TEST_KEY).unwrap();
        let err = wallet
            .request(RpcRequest::sign_typed_data_v4(wallet.address(), "{}"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ProviderError::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let wallet = LocalWalletProvider::random().unwrap();
        let err = wallet
            .request(RpcRequest::new("eth_sendTransaction", vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ProviderError::UNSUPPORTED_METHOD);
    }

    #[test]
    fn test_debug_redacts_key() {
        let wallet = LocalWalletProvider::from_hex(TEST_KEY).unwrap();
        let debug = format!("{:?}", wallet);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("4c0883a6"));
    }

    #[test]
    fn test_key_prefix_forms() {
        let bare = LocalWalletProvider::from_hex(&TEST_KEY[2..]).unwrap();
        let upper = LocalWalletProvider::from_hex(&format!("0X{}", &TEST_KEY[2..])).unwrap();
        assert_eq!(bare.address(), upper.address());
    }

    #[tokio::test]
    async fn test_upper_prefixed_account_authorized() {
        let wallet = LocalWalletProvider::from_hex(TEST_KEY).unwrap();
        let account = format!("0X{}", wallet.address()[2..].to_ascii_uppercase());
        let json = demo_mail().to_canonical_json().unwrap();

        let result = wallet
            .request(RpcRequest::sign_typed_data_v4(account, json))
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_bad_key_rejected() {
        assert!(LocalWalletProvider::from_hex("zz").is_err());
        assert!(LocalWalletProvider::from_private_key(&[0u8; 32]).is_err());
    }
}
