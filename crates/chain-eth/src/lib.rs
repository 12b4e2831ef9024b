//! Ethereum/EVM support for the multisig wallet engine.
//!
//! This crate provides:
//! - Legacy (EIP-155) transaction encoding, signing and decoding
//! - Multisig wallet call-data decoding into semantic operations (and back)
//! - ERC-20 token interaction encoding (transfer, balanceOf, metadata reads)
//! - Ethereum address derivation from secp256k1 public keys (EIP-55 checksums)
//! - Minimal 32-byte-word ABI encoding/decoding utilities
//! - EVM network definitions

pub mod abi;
pub mod address;
pub mod chains;
pub mod erc20;
pub mod error;
pub mod multisig;
pub mod transaction;
