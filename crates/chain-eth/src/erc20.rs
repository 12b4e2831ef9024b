//! ERC-20 call-data helpers and the verified-token lookup table.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};

use crate::abi::{encode_call, AbiParam};
use crate::error::EthError;

/// Function selector for `transfer(address,uint256)`: `0xa9059cbb`.
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// Function selector for `balanceOf(address)`: `0x70a08231`.
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// Function selector for `name()`: `0x06fdde03`.
pub const NAME_SELECTOR: [u8; 4] = [0x06, 0xfd, 0xde, 0x03];

/// Function selector for `symbol()`: `0x95d89b41`.
pub const SYMBOL_SELECTOR: [u8; 4] = [0x95, 0xd8, 0x9b, 0x41];

/// Function selector for `decimals()`: `0x313ce567`.
pub const DECIMALS_SELECTOR: [u8; 4] = [0x31, 0x3c, 0xe5, 0x67];

/// Encodes an ERC-20 `transfer(address,uint256)` call.
pub fn encode_transfer(to: Address, amount: U256) -> Vec<u8> {
    encode_call(
        TRANSFER_SELECTOR,
        &[AbiParam::Address(to), AbiParam::Uint256(amount)],
    )
}

/// Encodes an ERC-20 `balanceOf(address)` call.
pub fn encode_balance_of(owner: Address) -> Vec<u8> {
    encode_call(BALANCE_OF_SELECTOR, &[AbiParam::Address(owner)])
}

/// Encodes an ERC-20 `name()` call.
pub fn encode_name() -> Vec<u8> {
    encode_call(NAME_SELECTOR, &[])
}

/// Encodes an ERC-20 `symbol()` call.
pub fn encode_symbol() -> Vec<u8> {
    encode_call(SYMBOL_SELECTOR, &[])
}

/// Encodes an ERC-20 `decimals()` call.
pub fn encode_decimals() -> Vec<u8> {
    encode_call(DECIMALS_SELECTOR, &[])
}

/// Decodes a single uint256 return value (`balanceOf`, `decimals` and friends).
pub fn decode_uint256(data: &[u8]) -> Result<U256, EthError> {
    if data.len() < 32 {
        return Err(EthError::DecodeError(format!(
            "expected at least 32 bytes for uint256, got {}",
            data.len()
        )));
    }

    let mut word = [0u8; 32];
    word.copy_from_slice(&data[..32]);
    Ok(U256::from_be_bytes(word))
}

/// Metadata of a known token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// An immutable address-keyed table of verified tokens.
///
/// Injected into call sites that need token metadata (instead of a
/// compiled-in singleton) so tests can substitute their own table.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: HashMap<Address, TokenInfo>,
}

impl TokenRegistry {
    pub fn new<I: IntoIterator<Item = TokenInfo>>(tokens: I) -> Self {
        Self {
            tokens: tokens
                .into_iter()
                .map(|info| (info.address, info))
                .collect(),
        }
    }

    pub fn get(&self, address: &Address) -> Option<&TokenInfo> {
        self.tokens.get(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.tokens.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dead_address() -> Address {
        "0x000000000000000000000000000000000000dEaD"
            .parse()
            .unwrap()
    }

    #[test]
    fn encode_transfer_layout() {
        let amount = U256::from(1_000_000_000_000_000_000u128); // 1e18
        let data = encode_transfer(dead_address(), amount);

        // 4 (selector) + 32 (address) + 32 (amount) = 68 bytes.
        assert_eq!(data.len(), 68);
        assert_eq!(hex::encode(&data[..4]), "a9059cbb");
        assert!(hex::encode(&data[4..36]).ends_with("dead"));
        assert!(hex::encode(&data[36..68]).ends_with("0de0b6b3a7640000"));
    }

    #[test]
    fn encode_balance_of_layout() {
        let data = encode_balance_of(dead_address());
        assert_eq!(data.len(), 36);
        assert_eq!(&data[..4], &BALANCE_OF_SELECTOR);
    }

    #[test]
    fn metadata_calls_are_selector_only() {
        assert_eq!(encode_name(), NAME_SELECTOR.to_vec());
        assert_eq!(encode_symbol(), SYMBOL_SELECTOR.to_vec());
        assert_eq!(encode_decimals(), DECIMALS_SELECTOR.to_vec());
    }

    #[test]
    fn decode_uint256_valid() {
        let mut data = [0u8; 32];
        data[31] = 42;
        assert_eq!(decode_uint256(&data).unwrap(), U256::from(42u64));
    }

    #[test]
    fn decode_uint256_ignores_extra_return_words() {
        let mut data = vec![0u8; 64];
        data[31] = 42;
        data[63] = 99;
        assert_eq!(decode_uint256(&data).unwrap(), U256::from(42u64));
    }

    #[test]
    fn decode_uint256_too_short() {
        assert!(decode_uint256(&[0u8; 16]).is_err());
    }

    #[test]
    fn registry_lookup() {
        let registry = TokenRegistry::new([TokenInfo {
            address: dead_address(),
            name: "Dead Token".into(),
            symbol: "DEAD".into(),
            decimals: 18,
        }]);

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&dead_address()));
        assert_eq!(registry.get(&dead_address()).unwrap().symbol, "DEAD");
        assert!(registry.get(&Address::ZERO).is_none());
    }

    #[test]
    fn registry_default_is_empty() {
        let registry = TokenRegistry::default();
        assert!(registry.is_empty());
    }
}
