use alloy_primitives::Address;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::{EncodedPoint, PublicKey};
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Derives the Ethereum address belonging to an uncompressed secp256k1 public
/// key (65 bytes, starting with 0x04).
///
/// The address is the low 20 bytes of the Keccak-256 hash of the 64-byte
/// public point (without the 0x04 prefix).
pub fn from_uncompressed_pubkey(pubkey: &[u8; 65]) -> Result<Address, EthError> {
    if pubkey[0] != 0x04 {
        return Err(EthError::InvalidPublicKey(
            "uncompressed key must start with 0x04".into(),
        ));
    }

    let hash = Keccak256::digest(&pubkey[1..]);
    Ok(Address::from_slice(&hash[12..]))
}

/// Derives the Ethereum address belonging to a compressed secp256k1 public key
/// (33 bytes).
pub fn from_compressed_pubkey(pubkey: &[u8; 33]) -> Result<Address, EthError> {
    let encoded = EncodedPoint::from_bytes(pubkey).map_err(|e| {
        EthError::InvalidPublicKey(format!("invalid compressed key encoding: {e}"))
    })?;

    let pubkey: Option<PublicKey> = PublicKey::from_encoded_point(&encoded).into();
    let pubkey = pubkey.ok_or_else(|| {
        EthError::InvalidPublicKey("point is not on the secp256k1 curve".into())
    })?;

    let uncompressed = pubkey.to_encoded_point(false);
    let mut key_65 = [0u8; 65];
    key_65.copy_from_slice(uncompressed.as_bytes());

    from_uncompressed_pubkey(&key_65)
}

/// Formats an address as its EIP-55 mixed-case checksummed hex string.
pub fn to_checksummed(address: &Address) -> String {
    let hex_part = hex::encode(address.as_slice());

    // EIP-55: hash the lowercase hex address (without the 0x prefix) and
    // uppercase every letter whose corresponding hash nibble is >= 8.
    let hash = Keccak256::digest(hex_part.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in hex_part.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Parses a 0x-prefixed 40-hex-digit address string.
///
/// All-lowercase and all-uppercase inputs are accepted as-is; mixed-case
/// inputs must carry a valid EIP-55 checksum.
pub fn parse_address(s: &str) -> Result<Address, EthError> {
    let hex_part = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))?;

    if hex_part.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    let bytes = hex::decode(hex_part)
        .map_err(|e| EthError::InvalidAddress(format!("invalid hex: {e}")))?;
    let address = Address::from_slice(&bytes);

    let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && to_checksummed(&address) != format!("0x{hex_part}") {
        return Err(EthError::InvalidAddress("EIP-55 checksum mismatch".into()));
    }

    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eip55_checksum_known_addresses() {
        // Test vectors from EIP-55.
        let cases = [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ];

        for expected in &cases {
            let addr = parse_address(&expected.to_lowercase()).unwrap();
            assert_eq!(&to_checksummed(&addr), expected);
        }
    }

    #[test]
    fn parse_accepts_all_lowercase() {
        let addr = parse_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(
            to_checksummed(&addr),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }

    #[test]
    fn parse_accepts_all_uppercase() {
        assert!(parse_address("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").is_ok());
    }

    #[test]
    fn parse_accepts_valid_checksum() {
        assert!(parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_ok());
    }

    #[test]
    fn parse_rejects_bad_checksum() {
        // Wrong case on one letter.
        assert!(parse_address("0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
    }

    #[test]
    fn parse_rejects_short_input() {
        assert!(parse_address("0x5aAeb6053F").is_err());
    }

    #[test]
    fn parse_rejects_missing_prefix() {
        assert!(parse_address("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").is_err());
    }

    #[test]
    fn parse_rejects_non_hex() {
        assert!(parse_address("0xGGGGb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
    }

    #[test]
    fn pubkey_to_address_known_vector() {
        // Private key 0x...01 maps to a well-known address.
        use k256::SecretKey;

        let mut privkey = [0u8; 32];
        privkey[31] = 1;

        let secret = SecretKey::from_bytes((&privkey).into()).expect("valid private key");
        let uncompressed = secret.public_key().to_encoded_point(false);

        let mut key_65 = [0u8; 65];
        key_65.copy_from_slice(uncompressed.as_bytes());

        let address = from_uncompressed_pubkey(&key_65).unwrap();
        assert_eq!(
            to_checksummed(&address),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn compressed_and_uncompressed_keys_agree() {
        use k256::SecretKey;

        let mut privkey = [0u8; 32];
        privkey[31] = 1;

        let secret = SecretKey::from_bytes((&privkey).into()).expect("valid private key");
        let pubkey = secret.public_key();

        let mut key_33 = [0u8; 33];
        key_33.copy_from_slice(pubkey.to_encoded_point(true).as_bytes());
        let mut key_65 = [0u8; 65];
        key_65.copy_from_slice(pubkey.to_encoded_point(false).as_bytes());

        assert_eq!(
            from_compressed_pubkey(&key_33).unwrap(),
            from_uncompressed_pubkey(&key_65).unwrap()
        );
    }

    #[test]
    fn invalid_uncompressed_prefix_errors() {
        let mut key = [0u8; 65];
        key[0] = 0x03; // wrong prefix
        assert!(from_uncompressed_pubkey(&key).is_err());
    }
}
