//! Mnemonic and hierarchical-key engine for Ethereum accounts.
//!
//! `wallet-core` covers the account side of the wallet: BIP-39 phrase
//! generation/validation, BIP-32/44 key derivation, and convenience flows
//! that combine a derived key with the `chain-eth` codec to sign
//! transactions and personal messages.

pub mod error;
pub mod hd;
pub mod mnemonic;

pub use bip39::Language;
pub use error::WalletError;
pub use hd::{derive_account, derive_child, master_key, KeyPair};
pub use mnemonic::{
    generate_mnemonic, is_valid_word, mnemonic_to_seed, validate_mnemonic, word_list, Seed,
};

use alloy_primitives::U256;
use chain_eth::transaction::{self, SignedTransaction, Transaction};

/// Derive the checksummed address for an account index straight from a phrase.
pub fn derive_address_from_mnemonic(
    phrase: &str,
    passphrase: &str,
    index: u32,
) -> Result<String, WalletError> {
    let seed = mnemonic::mnemonic_to_seed(phrase, passphrase)?;
    let key = hd::derive_account(&seed, index)?;
    key.checksummed_address()
}

/// Sign a transaction with the key at the given account index.
pub fn sign_transaction(
    seed: &Seed,
    index: u32,
    tx: Transaction,
) -> Result<SignedTransaction, WalletError> {
    let key = hd::derive_account(seed, index)?;
    transaction::sign_transaction(tx, &key.private_key).map_err(WalletError::from)
}

/// Sign an arbitrary message with EIP-191 personal_sign.
/// Returns the 65-byte signature (r + s + v).
pub fn sign_personal_message(
    seed: &Seed,
    index: u32,
    message: &[u8],
) -> Result<[u8; 65], WalletError> {
    let key = hd::derive_account(seed, index)?;
    let signature = transaction::sign_message(message, &key.private_key)?;
    signature.to_rsv_bytes().map_err(WalletError::from)
}

/// Recover the checksummed signer address of a personal message signature.
pub fn recover_personal_signer(
    message: &[u8],
    signature: &[u8; 65],
) -> Result<String, WalletError> {
    let v = match signature[64] {
        v @ 27..=28 => u64::from(v),
        parity @ 0..=1 => u64::from(parity) + 27,
        v => {
            return Err(WalletError::TransactionFailed(format!(
                "unexpected recovery byte {v}"
            )))
        }
    };
    let signature = transaction::Signature {
        v,
        r: U256::from_be_slice(&signature[..32]),
        s: U256::from_be_slice(&signature[32..64]),
    };

    let address = transaction::recover_message_signer(message, &signature)?;
    Ok(chain_eth::address::to_checksummed(&address))
}
