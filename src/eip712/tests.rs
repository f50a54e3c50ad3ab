//! EIP-712 Test Suite
//!
//! End-to-end tests over realistic signing requests.

use super::*;
use serde_json::json;

/// Test the canonical Mail example from EIP-712
#[test]
fn test_eip712_mail_example() {
    let json = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "version", "type": "string"},
                {"name": "chainId", "type": "uint256"},
                {"name": "verifyingContract", "type": "address"}
            ],
            "Person": [
                {"name": "name", "type": "string"},
                {"name": "wallet", "type": "address"}
            ],
            "Mail": [
                {"name": "from", "type": "Person"},
                {"name": "to", "type": "Person"},
                {"name": "contents", "type": "string"}
            ]
        },
        "primaryType": "Mail",
        "domain": {
            "name": "Ether Mail",
            "version": "1",
            "chainId": 1,
            "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
        },
        "message": {
            "from": {
                "name": "Cow",
                "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"
            },
            "to": {
                "name": "Bob",
                "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"
            },
            "contents": "Hello, Bob!"
        }
    }"#;

    let request = SigningRequest::from_json(json).unwrap();
    let hash = hash_typed_data(&request).unwrap();

    assert_eq!(
        hex::encode(hash),
        "be609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2"
    );
}

/// ERC-2612 style Permit message
#[test]
fn test_eip712_permit() {
    let json = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "version", "type": "string"},
                {"name": "chainId", "type": "uint256"},
                {"name": "verifyingContract", "type": "address"}
            ],
            "Permit": [
                {"name": "owner", "type": "address"},
                {"name": "spender", "type": "address"},
                {"name": "value", "type": "uint256"},
                {"name": "nonce", "type": "uint256"},
                {"name": "deadline", "type": "uint256"}
            ]
        },
        "primaryType": "Permit",
        "domain": {
            "name": "USDC",
            "version": "2",
            "chainId": 84532,
            "verifyingContract": "0x036CbD53842c5426634e7929541eC2318f3dCF7e"
        },
        "message": {
            "owner": "0x1234567890123456789012345678901234567890",
            "spender": "0x0987654321098765432109876543210987654321",
            "value": "1000000",
            "nonce": 0,
            "deadline": 1893456000
        }
    }"#;

    let request = SigningRequest::from_json(json).unwrap();
    request.validate().unwrap();

    let pre_image = get_pre_image(&request).unwrap();
    assert_ne!(pre_image.domain_separator, pre_image.struct_hash);
    assert_eq!(pre_image.final_hash, hash_typed_data(&request).unwrap());
}

/// Test with array types
#[test]
fn test_eip712_with_arrays() {
    let json = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "chainId", "type": "uint256"}
            ],
            "Order": [
                {"name": "items", "type": "uint256[]"},
                {"name": "prices", "type": "uint256[]"}
            ]
        },
        "primaryType": "Order",
        "domain": {
            "name": "Test",
            "chainId": 1
        },
        "message": {
            "items": [1, 2, 3],
            "prices": [100, 200, 300]
        }
    }"#;

    let request = SigningRequest::from_json(json).unwrap();
    let hash = hash_typed_data(&request).unwrap();

    // Reordering an array changes the digest
    let mut message = request.message().clone();
    message["items"] = json!([3, 2, 1]);
    let reordered = SigningRequest::new(
        request.domain().clone(),
        "Order",
        message,
        request.type_schema().clone(),
    )
    .unwrap();
    assert_ne!(hash, hash_typed_data(&reordered).unwrap());
}

/// Test with nested struct arrays
#[test]
fn test_eip712_struct_arrays() {
    let json = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "chainId", "type": "uint256"}
            ],
            "Item": [
                {"name": "id", "type": "uint256"},
                {"name": "name", "type": "string"}
            ],
            "Order": [
                {"name": "items", "type": "Item[]"},
                {"name": "buyer", "type": "address"}
            ]
        },
        "primaryType": "Order",
        "domain": {
            "name": "Marketplace",
            "chainId": 1
        },
        "message": {
            "items": [
                {"id": 1, "name": "Widget"},
                {"id": 2, "name": "Gadget"}
            ],
            "buyer": "0x1234567890123456789012345678901234567890"
        }
    }"#;

    let request = SigningRequest::from_json(json).unwrap();
    assert_eq!(
        encode_type("Order", request.type_schema()).unwrap(),
        "Order(Item[] items,address buyer)Item(uint256 id,string name)"
    );
    assert_eq!(hash_typed_data(&request).unwrap().len(), 32);
}

/// Seaport-style order with small integers and fixed bytes
#[test]
fn test_eip712_opensea_order() {
    let json = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "version", "type": "string"},
                {"name": "chainId", "type": "uint256"},
                {"name": "verifyingContract", "type": "address"}
            ],
            "OrderComponents": [
                {"name": "offerer", "type": "address"},
                {"name": "zone", "type": "address"},
                {"name": "orderType", "type": "uint8"},
                {"name": "startTime", "type": "uint256"},
                {"name": "endTime", "type": "uint256"},
                {"name": "zoneHash", "type": "bytes32"},
                {"name": "salt", "type": "uint256"},
                {"name": "conduitKey", "type": "bytes32"},
                {"name": "counter", "type": "uint256"}
            ]
        },
        "primaryType": "OrderComponents",
        "domain": {
            "name": "Seaport",
            "version": "1.1",
            "chainId": 1,
            "verifyingContract": "0x00000000006c3852cbEf3e08E8dF289169EdE581"
        },
        "message": {
            "offerer": "0x1234567890123456789012345678901234567890",
            "zone": "0x0000000000000000000000000000000000000000",
            "orderType": 0,
            "startTime": 1640000000,
            "endTime": 1893456000,
            "zoneHash": "0x0000000000000000000000000000000000000000000000000000000000000000",
            "salt": "12345",
            "conduitKey": "0x0000000000000000000000000000000000000000000000000000000000000000",
            "counter": 0
        }
    }"#;

    let request = SigningRequest::from_json(json).unwrap();
    request.validate().unwrap();
    assert_eq!(hash_typed_data(&request).unwrap().len(), 32);

    // orderType is a uint8; the schema check passes and the encoder rejects the range
    let mut message = request.message().clone();
    message["orderType"] = json!(256);
    let overflow = SigningRequest::new(
        request.domain().clone(),
        "OrderComponents",
        message,
        request.type_schema().clone(),
    )
    .unwrap();
    assert!(matches!(
        hash_typed_data(&overflow),
        Err(Eip712Error::InvalidValue { .. })
    ));
}

/// Test invalid primary type
#[test]
fn test_eip712_invalid_primary_type() {
    let json = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"}
            ],
            "Person": [
                {"name": "name", "type": "string"}
            ]
        },
        "primaryType": "NonExistent",
        "domain": {"name": "Test"},
        "message": {}
    }"#;

    let result = SigningRequest::from_json(json);
    assert!(matches!(result, Err(Eip712Error::InvalidPrimaryType(_))));
}

#[test]
fn test_missing_domain_type_rejected() {
    let json = r#"{
        "types": {
            "Message": [{"name": "content", "type": "string"}]
        },
        "primaryType": "Message",
        "domain": {"name": "Test"},
        "message": {"content": "hi"}
    }"#;

    assert!(matches!(
        SigningRequest::from_json(json),
        Err(Eip712Error::MissingDomainType)
    ));
}

#[test]
fn test_domain_mismatch_rejected() {
    let json = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "chainId", "type": "uint256"}
            ],
            "Message": [{"name": "content", "type": "string"}]
        },
        "primaryType": "Message",
        "domain": {"name": "Test"},
        "message": {"content": "hi"}
    }"#;

    assert!(matches!(
        SigningRequest::from_json(json),
        Err(Eip712Error::DomainMismatch(_))
    ));
}

#[test]
fn test_missing_message_field_rejected() {
    let json = r#"{
        "types": {
            "EIP712Domain": [{"name": "name", "type": "string"}],
            "Person": [
                {"name": "name", "type": "string"},
                {"name": "wallet", "type": "address"}
            ]
        },
        "primaryType": "Person",
        "domain": {"name": "Test"},
        "message": {"name": "Cow"}
    }"#;

    match SigningRequest::from_json(json) {
        Err(Eip712Error::MissingField(path)) => assert_eq!(path, "Person.wallet"),
        other => panic!("expected missing field, got {:?}", other),
    }
}

#[test]
fn test_unknown_field_type_rejected() {
    let json = r#"{
        "types": {
            "EIP712Domain": [{"name": "name", "type": "string"}],
            "Message": [{"name": "owner", "type": "Account"}]
        },
        "primaryType": "Message",
        "domain": {"name": "Test"},
        "message": {"owner": {}}
    }"#;

    assert!(matches!(
        SigningRequest::from_json(json),
        Err(Eip712Error::InvalidType(_))
    ));
}

#[test]
fn test_malformed_json_rejected() {
    assert!(matches!(
        SigningRequest::from_json("{not json"),
        Err(Eip712Error::InvalidJson(_))
    ));
}

/// Chain ID in every accepted notation hashes identically
#[test]
fn test_chain_id_parsing() {
    let base = json!({
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "chainId", "type": "uint256"}
            ],
            "Message": [{"name": "content", "type": "string"}]
        },
        "primaryType": "Message",
        "domain": {"name": "Test", "chainId": 137},
        "message": {"content": "Hello World"}
    });

    let mut as_decimal = base.clone();
    as_decimal["domain"]["chainId"] = json!("137");
    let mut as_hex = base.clone();
    as_hex["domain"]["chainId"] = json!("0x89");

    let expected = hash_typed_data(&SigningRequest::from_value(base).unwrap()).unwrap();
    for value in [as_decimal, as_hex] {
        let request = SigningRequest::from_value(value).unwrap();
        assert_eq!(request.domain().chain_id, Some(137));
        assert_eq!(hash_typed_data(&request).unwrap(), expected);
    }
}

/// Test pre-image generation
#[test]
fn test_pre_image_generation() {
    let json = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "chainId", "type": "uint256"}
            ],
            "Message": [
                {"name": "content", "type": "string"}
            ]
        },
        "primaryType": "Message",
        "domain": {
            "name": "Test",
            "chainId": 1
        },
        "message": {
            "content": "Hello World"
        }
    }"#;

    let request = SigningRequest::from_json(json).unwrap();
    let pre_image = get_pre_image(&request).unwrap();

    let mut preimage_bytes = Vec::with_capacity(66);
    preimage_bytes.extend_from_slice(&[0x19, 0x01]);
    preimage_bytes.extend_from_slice(&pre_image.domain_separator);
    preimage_bytes.extend_from_slice(&pre_image.struct_hash);

    assert_eq!(pre_image.final_hash, keccak256(&preimage_bytes));
    assert_eq!(pre_image.final_hash, hash_typed_data(&request).unwrap());
}

/// Canonical form ignores source key order
#[test]
fn test_canonical_json_is_order_independent() {
    let a = r#"{"primaryType":"Message","domain":{"name":"Test","chainId":1},
        "types":{"Message":[{"name":"content","type":"string"}],
        "EIP712Domain":[{"name":"name","type":"string"},{"name":"chainId","type":"uint256"}]},
        "message":{"content":"Hello"}}"#;
    let b = r#"{"message":{"content":"Hello"},
        "types":{"EIP712Domain":[{"type":"string","name":"name"},{"type":"uint256","name":"chainId"}],
        "Message":[{"type":"string","name":"content"}]},
        "domain":{"chainId":1,"name":"Test"},"primaryType":"Message"}"#;

    let a = SigningRequest::from_json(a).unwrap().to_canonical_json().unwrap();
    let b = SigningRequest::from_json(b).unwrap().to_canonical_json().unwrap();

    assert_eq!(a, b);
    assert!(!a.contains(' '));
    assert!(a.starts_with(r#"{"domain":{"chainId":1,"name":"Test"},"message":"#));
}

/// Canonical JSON parses back to an equal request
#[test]
fn test_canonical_json_reparses() {
    let request = crate::documents::demo_mail();
    let canonical = request.to_canonical_json().unwrap();
    let reparsed = SigningRequest::from_json(&canonical).unwrap();

    assert_eq!(reparsed, request);
    assert_eq!(reparsed.to_canonical_json().unwrap(), canonical);
}

/// Test signing roundtrip
#[test]
fn test_signing_roundtrip() {
    let request = crate::documents::demo_mail();

    let private_key =
        hex::decode("0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef").unwrap();
    let signer = address_from_private_key(&private_key).unwrap();

    let signature = sign_typed_data(&request, &private_key).unwrap();

    let hash = hash_typed_data(&request).unwrap();
    assert_eq!(recover_address(&hash, &signature).unwrap(), signer);
    assert!(verify_typed_data(&request, &signature, &signer).unwrap());

    let wrong_address = "0x0000000000000000000000000000000000000000";
    assert!(!verify_typed_data(&request, &signature, wrong_address).unwrap());

    // Signatures survive a hex round trip
    let parsed = Eip712Signature::from_hex(&signature.to_hex()).unwrap();
    assert!(verify_signature(&hash, &parsed, &signer).unwrap());
}
