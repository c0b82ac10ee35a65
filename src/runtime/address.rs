//! Address parsing and EIP-55 checksums

use alloy_primitives::{keccak256, Address};

use super::BindingError;

/// Parse a chain address without touching the network
///
/// Accepts exactly 40 hex digits with an optional `0x` prefix. All-lower
/// and all-upper input is accepted as-is; mixed case must be a valid
/// EIP-55 checksum.
pub fn parse_address(input: &str) -> Result<Address, BindingError> {
    let invalid = |reason: String| BindingError::InvalidAddress {
        input: input.to_string(),
        reason,
    };

    let payload = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);

    if payload.len() != 40 {
        return Err(invalid(format!(
            "expected 40 hex characters, got {}",
            payload.len()
        )));
    }
    if !payload.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid("contains non-hex characters".to_string()));
    }

    let has_lower = payload.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = payload.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        let expected = to_checksum_address(&payload.to_ascii_lowercase());
        if expected[2..] != *payload {
            return Err(invalid(format!("bad checksum (expected {expected})")));
        }
    }

    let bytes = hex::decode(payload).map_err(|e| invalid(e.to_string()))?;
    Ok(Address::from_slice(&bytes))
}

/// EIP-55 checksum of a lowercase 40-hex-digit address (no prefix)
pub fn to_checksum_address(addr: &str) -> String {
    let hash = keccak256(addr.as_bytes());
    let hash_hex = hex::encode(hash.as_slice());

    let mut result = String::with_capacity(42);
    result.push_str("0x");

    for (c, hash_char) in addr.chars().zip(hash_hex.chars()) {
        let hash_val = hash_char.to_digit(16).unwrap_or(0);
        if hash_val >= 8 {
            result.push(c.to_ascii_uppercase());
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum() {
        let addr = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";
        let expected = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
        assert_eq!(to_checksum_address(&addr[2..]), expected);
    }

    #[test]
    fn test_parse_valid() {
        assert_eq!(
            parse_address("0x0000000000000000000000000000000000000000").unwrap(),
            Address::ZERO
        );
        assert!(parse_address("0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359").is_ok());
        assert!(parse_address("0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359").is_ok());
        assert!(parse_address("FB6916095CA1DF60BB79CE92CE3EA74C37C5D359").is_ok());
    }

    #[test]
    fn test_parse_invalid() {
        for input in [
            "",
            "0x",
            "0x123",
            "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d35",
            "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d3590",
            "0xgb6916095ca1df60bb79ce92ce3ea74c37c5d359",
            " 0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359",
            // bad checksum: first letter case flipped
            "0xFb6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        ] {
            let err = parse_address(input).unwrap_err();
            assert!(matches!(err, BindingError::InvalidAddress { .. }), "{input:?}");
        }
    }
}
