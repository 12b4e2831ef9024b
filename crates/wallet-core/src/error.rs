use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid entropy length: {0} bits")]
    InvalidEntropyLength(usize),

    #[error("Empty mnemonic")]
    EmptyMnemonic,

    #[error("Mnemonic contains words outside every known word list")]
    MnemonicNotInWordlist,

    #[error("Mnemonic checksum mismatch")]
    InvalidChecksum,

    #[error("Invalid mnemonic entropy: {0}")]
    InvalidEntropy(String),

    #[error("Derived key out of range: {0}")]
    InvalidDerivedKey(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

impl From<chain_eth::error::EthError> for WalletError {
    fn from(e: chain_eth::error::EthError) -> Self {
        WalletError::TransactionFailed(format!("ETH: {e}"))
    }
}
