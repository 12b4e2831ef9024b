use alloy_primitives::Address;
use bip32::{ChildNumber, DerivationPath, XPrv};
use k256::ecdsa::SigningKey;
use zeroize::Zeroize;

use crate::error::WalletError;
use crate::mnemonic::Seed;

/// BIP-44 path for Ethereum accounts: m/44'/60'/0'/0/{index}
fn account_path(index: u32) -> String {
    format!("m/44'/60'/0'/0/{index}")
}

/// Derive the BIP-32 master extended key from a seed.
///
/// HMAC-SHA512 keyed with `"Bitcoin seed"`; left half becomes the private
/// scalar, right half the chain code.
pub fn master_key(seed: &Seed) -> Result<XPrv, WalletError> {
    XPrv::new(seed.as_bytes()).map_err(|e| WalletError::DerivationFailed(e.to_string()))
}

/// Derive one child key, hardened or not.
///
/// A zero or out-of-range child scalar fails with `InvalidDerivedKey`.
pub fn derive_child(parent: &XPrv, index: u32, hardened: bool) -> Result<XPrv, WalletError> {
    let child = ChildNumber::new(index, hardened)
        .map_err(|e| WalletError::DerivationFailed(e.to_string()))?;
    parent
        .derive_child(child)
        .map_err(|e| WalletError::InvalidDerivedKey(e.to_string()))
}

/// Walk the fixed Ethereum account path and return the final key pair.
pub fn derive_account(seed: &Seed, index: u32) -> Result<KeyPair, WalletError> {
    let path_str = account_path(index);
    let path: DerivationPath = path_str
        .parse()
        .map_err(|e: bip32::Error| WalletError::DerivationFailed(e.to_string()))?;

    let xprv = XPrv::derive_from_path(seed.as_bytes(), &path)
        .map_err(|e| WalletError::InvalidDerivedKey(e.to_string()))?;

    KeyPair::from_xprv(&xprv, path_str)
}

/// A derived secp256k1 key pair; the private scalar is wiped on drop.
pub struct KeyPair {
    pub private_key: [u8; 32],
    pub public_key_uncompressed: [u8; 65],
    pub derivation_path: String,
}

impl KeyPair {
    fn from_xprv(xprv: &XPrv, derivation_path: String) -> Result<Self, WalletError> {
        let private_key: [u8; 32] = xprv.to_bytes().into();
        let signing_key = SigningKey::from_bytes(&private_key.into())
            .map_err(|e| WalletError::InvalidDerivedKey(e.to_string()))?;

        let public_key_uncompressed: [u8; 65] = signing_key
            .verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .try_into()
            .map_err(|_| WalletError::InvalidDerivedKey("Invalid public key length".into()))?;

        Ok(Self {
            private_key,
            public_key_uncompressed,
            derivation_path,
        })
    }

    /// The Keccak-derived 20-byte Ethereum address for this key.
    pub fn address(&self) -> Result<Address, WalletError> {
        chain_eth::address::from_uncompressed_pubkey(&self.public_key_uncompressed)
            .map_err(WalletError::from)
    }

    /// EIP-55 mixed-case text form of [`KeyPair::address`].
    pub fn checksummed_address(&self) -> Result<String, WalletError> {
        Ok(chain_eth::address::to_checksummed(&self.address()?))
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}
