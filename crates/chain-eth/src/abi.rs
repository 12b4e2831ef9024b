//! Minimal ABI encoding and decoding for EVM function calls.
//!
//! Just enough of the ABI to build and explain the wallet's contract calls
//! (fixed-width 32-byte words) without pulling in a full ABI parser.

use alloy_primitives::{Address, U256};

use crate::error::EthError;

/// A single statically-encoded ABI parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiParam {
    /// A 20-byte Ethereum address, left-padded to 32 bytes.
    Address(Address),
    /// A 256-bit unsigned integer, big-endian.
    Uint256(U256),
}

impl AbiParam {
    fn to_word(&self) -> [u8; 32] {
        match self {
            AbiParam::Address(addr) => {
                let mut word = [0u8; 32];
                word[12..].copy_from_slice(addr.as_slice());
                word
            }
            AbiParam::Uint256(value) => value.to_be_bytes(),
        }
    }
}

/// Encodes a function call: `selector || word(params[0]) || word(params[1]) ...`
pub fn encode_call(selector: [u8; 4], params: &[AbiParam]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + params.len() * 32);
    data.extend_from_slice(&selector);
    for param in params {
        data.extend_from_slice(&param.to_word());
    }
    data
}

/// Splits call data into its 4-byte selector and argument block.
///
/// Returns `None` when the data is too short to carry a selector.
pub fn split_selector(data: &[u8]) -> Option<([u8; 4], &[u8])> {
    if data.len() < 4 {
        return None;
    }
    Some(([data[0], data[1], data[2], data[3]], &data[4..]))
}

/// Splits an argument block into exactly `N` 32-byte words.
///
/// Truncated or over-long blocks are rejected with [`EthError::DecodeError`]
/// rather than yielding partial values.
pub fn decode_words<const N: usize>(data: &[u8]) -> Result<[[u8; 32]; N], EthError> {
    if data.len() != N * 32 {
        return Err(EthError::DecodeError(format!(
            "expected {} argument bytes, got {}",
            N * 32,
            data.len()
        )));
    }

    let mut words = [[0u8; 32]; N];
    for (i, word) in words.iter_mut().enumerate() {
        word.copy_from_slice(&data[i * 32..(i + 1) * 32]);
    }
    Ok(words)
}

/// Reads the low 20 bytes of an ABI word as an address.
pub fn word_as_address(word: &[u8; 32]) -> Address {
    Address::from_slice(&word[12..])
}

/// Reads an ABI word as a big-endian uint256.
pub fn word_as_u256(word: &[u8; 32]) -> U256 {
    U256::from_be_bytes(*word)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    #[test]
    fn encode_address_param_is_left_padded() {
        let data = encode_call([0; 4], &[AbiParam::Address(addr(0xde))]);
        assert_eq!(data.len(), 36);
        assert_eq!(&data[4..16], &[0u8; 12]);
        assert_eq!(&data[16..36], addr(0xde).as_slice());
    }

    #[test]
    fn encode_uint256_param_is_big_endian() {
        let data = encode_call([0; 4], &[AbiParam::Uint256(U256::from(42u64))]);
        assert_eq!(data[35], 42);
        assert_eq!(&data[4..35], &[0u8; 31]);
    }

    #[test]
    fn encode_call_selector_only() {
        let selector = [0xa9, 0x05, 0x9c, 0xbb];
        assert_eq!(encode_call(selector, &[]), selector.to_vec());
    }

    #[test]
    fn split_selector_short_data() {
        assert!(split_selector(&[0xa9, 0x05, 0x9c]).is_none());
        assert!(split_selector(&[]).is_none());
    }

    #[test]
    fn split_selector_returns_arguments() {
        let mut data = vec![0xa9, 0x05, 0x9c, 0xbb];
        data.extend_from_slice(&[0u8; 64]);

        let (selector, args) = split_selector(&data).unwrap();
        assert_eq!(selector, [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(args.len(), 64);
    }

    #[test]
    fn decode_words_roundtrip() {
        let params = [
            AbiParam::Address(addr(0x11)),
            AbiParam::Uint256(U256::from(7u64)),
        ];
        let data = encode_call([0; 4], &params);

        let words: [[u8; 32]; 2] = decode_words(&data[4..]).unwrap();
        assert_eq!(word_as_address(&words[0]), addr(0x11));
        assert_eq!(word_as_u256(&words[1]), U256::from(7u64));
    }

    #[test]
    fn decode_words_rejects_truncated_block() {
        let data = [0u8; 63];
        let result: Result<[[u8; 32]; 2], _> = decode_words(&data);
        assert!(result.is_err());
    }

    #[test]
    fn decode_words_rejects_trailing_bytes() {
        let data = [0u8; 33];
        let result: Result<[[u8; 32]; 1], _> = decode_words(&data);
        assert!(result.is_err());
    }

    #[test]
    fn word_as_u256_max() {
        let word = [0xff; 32];
        assert_eq!(word_as_u256(&word), U256::MAX);
    }
}
