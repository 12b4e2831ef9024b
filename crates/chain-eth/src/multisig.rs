//! Multisig wallet call-data codec.
//!
//! Translates the data field of a multisig wallet transaction into a
//! semantic [`WalletOperation`] and back, using the wallet contract's
//! method selectors (owner management, daily limit, confirmation threshold)
//! plus the ERC-20 `transfer` selector for token movements.

use alloy_primitives::{Address, Bytes, U256};

use crate::abi::{self, encode_call, AbiParam};
use crate::erc20::{self, TokenInfo, TokenRegistry};
use crate::error::EthError;

/// Selector for `replaceOwner(address,address)`: `0xe20056e6`.
pub const REPLACE_OWNER_SELECTOR: [u8; 4] = [0xe2, 0x00, 0x56, 0xe6];

/// Selector for `addOwner(address)`: `0x7065cb48`.
pub const ADD_OWNER_SELECTOR: [u8; 4] = [0x70, 0x65, 0xcb, 0x48];

/// Selector for `removeOwner(address)`: `0x173825d9`.
pub const REMOVE_OWNER_SELECTOR: [u8; 4] = [0x17, 0x38, 0x25, 0xd9];

/// Selector for `changeDailyLimit(uint256)`: `0xcea08621`.
pub const CHANGE_DAILY_LIMIT_SELECTOR: [u8; 4] = [0xce, 0xa0, 0x86, 0x21];

/// Selector for `changeRequirement(uint256)`: `0xba51a6df`.
pub const CHANGE_REQUIREMENT_SELECTOR: [u8; 4] = [0xba, 0x51, 0xa6, 0xdf];

/// Selector for `confirmTransaction(uint256)`: `0xc01a8c84`.
pub const CONFIRM_TRANSACTION_SELECTOR: [u8; 4] = [0xc0, 0x1a, 0x8c, 0x84];

/// Selector for `revokeConfirmation(uint256)`: `0x20ea8d86`.
pub const REVOKE_CONFIRMATION_SELECTOR: [u8; 4] = [0x20, 0xea, 0x8d, 0x86];

/// Selector for the `transactions(uint256)` getter: `0x9ace38c2`.
pub const TRANSACTIONS_SELECTOR: [u8; 4] = [0x9a, 0xce, 0x38, 0xc2];

/// How the wallet contract executes a wrapped transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Call,
    DelegateCall,
    Create,
}

impl OperationKind {
    pub fn as_u8(self) -> u8 {
        match self {
            OperationKind::Call => 0,
            OperationKind::DelegateCall => 1,
            OperationKind::Create => 2,
        }
    }

    pub fn from_u8(value: u8) -> Result<Self, EthError> {
        match value {
            0 => Ok(OperationKind::Call),
            1 => Ok(OperationKind::DelegateCall),
            2 => Ok(OperationKind::Create),
            n => Err(EthError::DecodeError(format!("unknown operation kind {n}"))),
        }
    }
}

/// A transaction wrapped by the multisig wallet contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeTransaction {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: OperationKind,
}

/// The semantic meaning of a multisig wallet transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletOperation {
    /// Plain ether transfer.
    Transfer { to: Address, value: U256 },
    /// ERC-20 token transfer executed through the token contract.
    TokenTransfer {
        token: Address,
        to: Address,
        amount: U256,
    },
    /// Swap one wallet owner for another.
    ReplaceOwner { old: Address, new: Address },
    AddOwner { owner: Address },
    RemoveOwner { owner: Address },
    /// Change the wallet's confirmation-free daily spending limit.
    ChangeDailyLimit { limit: U256 },
    /// Change the number of owner confirmations required to execute.
    ChangeConfirmations { required: U256 },
    /// Call data that matches no known selector and moves no value.
    Unrecognized,
}

impl WalletOperation {
    /// Looks up verified-token metadata for a decoded token transfer.
    ///
    /// Returns `None` for every other operation kind, and for transfers of
    /// tokens the registry does not know.
    pub fn token_info<'a>(&self, registry: &'a TokenRegistry) -> Option<&'a TokenInfo> {
        match self {
            WalletOperation::TokenTransfer { token, .. } => registry.get(token),
            _ => None,
        }
    }
}

/// Decodes a wrapped transaction into its semantic operation.
///
/// Matches the leading 4-byte selector against the wallet and ERC-20
/// selector table and decodes the 32-byte-aligned argument words. A matched
/// selector with a truncated argument block is a hard [`EthError::DecodeError`].
///
/// Unmatched call data falls back to [`WalletOperation::Transfer`] whenever
/// the attached value is non-zero — even when the data field is non-empty.
/// That mirrors the wallet contract's behavior of forwarding value alongside
/// arbitrary calls, but it can misclassify calls into unknown contracts;
/// callers rendering the result should treat it as a best-effort summary.
pub fn decode_operation(tx: &SafeTransaction) -> Result<WalletOperation, EthError> {
    if let Some((selector, args)) = abi::split_selector(&tx.data) {
        match selector {
            REPLACE_OWNER_SELECTOR => {
                let [old, new] = abi::decode_words(args)?;
                return Ok(WalletOperation::ReplaceOwner {
                    old: abi::word_as_address(&old),
                    new: abi::word_as_address(&new),
                });
            }
            ADD_OWNER_SELECTOR => {
                let [owner] = abi::decode_words(args)?;
                return Ok(WalletOperation::AddOwner {
                    owner: abi::word_as_address(&owner),
                });
            }
            REMOVE_OWNER_SELECTOR => {
                let [owner] = abi::decode_words(args)?;
                return Ok(WalletOperation::RemoveOwner {
                    owner: abi::word_as_address(&owner),
                });
            }
            CHANGE_DAILY_LIMIT_SELECTOR => {
                let [limit] = abi::decode_words(args)?;
                return Ok(WalletOperation::ChangeDailyLimit {
                    limit: abi::word_as_u256(&limit),
                });
            }
            CHANGE_REQUIREMENT_SELECTOR => {
                let [required] = abi::decode_words(args)?;
                return Ok(WalletOperation::ChangeConfirmations {
                    required: abi::word_as_u256(&required),
                });
            }
            erc20::TRANSFER_SELECTOR => {
                let [to, amount] = abi::decode_words(args)?;
                return Ok(WalletOperation::TokenTransfer {
                    token: tx.to,
                    to: abi::word_as_address(&to),
                    amount: abi::word_as_u256(&amount),
                });
            }
            _ => {}
        }
    }

    if tx.value != U256::ZERO {
        Ok(WalletOperation::Transfer {
            to: tx.to,
            value: tx.value,
        })
    } else {
        Ok(WalletOperation::Unrecognized)
    }
}

/// Encodes a semantic operation as a wrapped transaction — the inverse of
/// [`decode_operation`].
///
/// Owner-management and limit operations call back into the wallet contract
/// itself, so `wallet` is used as their destination.
pub fn encode_operation(op: &WalletOperation, wallet: Address) -> SafeTransaction {
    let (to, value, data) = match op {
        WalletOperation::Transfer { to, value } => (*to, *value, Vec::new()),
        WalletOperation::TokenTransfer { token, to, amount } => {
            (*token, U256::ZERO, erc20::encode_transfer(*to, *amount))
        }
        WalletOperation::ReplaceOwner { old, new } => (
            wallet,
            U256::ZERO,
            encode_call(
                REPLACE_OWNER_SELECTOR,
                &[AbiParam::Address(*old), AbiParam::Address(*new)],
            ),
        ),
        WalletOperation::AddOwner { owner } => (
            wallet,
            U256::ZERO,
            encode_call(ADD_OWNER_SELECTOR, &[AbiParam::Address(*owner)]),
        ),
        WalletOperation::RemoveOwner { owner } => (
            wallet,
            U256::ZERO,
            encode_call(REMOVE_OWNER_SELECTOR, &[AbiParam::Address(*owner)]),
        ),
        WalletOperation::ChangeDailyLimit { limit } => (
            wallet,
            U256::ZERO,
            encode_call(CHANGE_DAILY_LIMIT_SELECTOR, &[AbiParam::Uint256(*limit)]),
        ),
        WalletOperation::ChangeConfirmations { required } => (
            wallet,
            U256::ZERO,
            encode_call(CHANGE_REQUIREMENT_SELECTOR, &[AbiParam::Uint256(*required)]),
        ),
        WalletOperation::Unrecognized => (wallet, U256::ZERO, Vec::new()),
    };

    SafeTransaction {
        to,
        value,
        data: Bytes::from(data),
        operation: OperationKind::Call,
    }
}

/// Encodes a `confirmTransaction(uint256)` call for a pending transaction id.
pub fn encode_confirmation(transaction_id: U256) -> Vec<u8> {
    encode_call(
        CONFIRM_TRANSACTION_SELECTOR,
        &[AbiParam::Uint256(transaction_id)],
    )
}

/// Encodes a `revokeConfirmation(uint256)` call for a pending transaction id.
pub fn encode_revocation(transaction_id: U256) -> Vec<u8> {
    encode_call(
        REVOKE_CONFIRMATION_SELECTOR,
        &[AbiParam::Uint256(transaction_id)],
    )
}

/// Encodes a read of the wallet's `transactions(uint256)` mapping, for use
/// as `eth_call` data.
pub fn encode_transaction_query(transaction_id: U256) -> Vec<u8> {
    encode_call(TRANSACTIONS_SELECTOR, &[AbiParam::Uint256(transaction_id)])
}

/// A transaction stored in the wallet's `transactions` mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTransaction {
    pub destination: Address,
    pub value: U256,
    pub data: Bytes,
    pub executed: bool,
}

impl StoredTransaction {
    /// Decodes the stored transaction's inner call data.
    pub fn operation(&self) -> Result<WalletOperation, EthError> {
        decode_operation(&SafeTransaction {
            to: self.destination,
            value: self.value,
            data: self.data.clone(),
            operation: OperationKind::Call,
        })
    }
}

/// Decodes the ABI return value of the `transactions(uint256)` getter:
/// `(address destination, uint256 value, bytes data, bool executed)`.
pub fn decode_stored_transaction(data: &[u8]) -> Result<StoredTransaction, EthError> {
    if data.len() < 4 * 32 || data.len() % 32 != 0 {
        return Err(EthError::DecodeError(format!(
            "stored transaction must be whole 32-byte words, got {} bytes",
            data.len()
        )));
    }

    let head: [[u8; 32]; 4] = abi::decode_words(&data[..128])?;
    let destination = abi::word_as_address(&head[0]);
    let value = abi::word_as_u256(&head[1]);
    let executed = abi::word_as_u256(&head[3]) != U256::ZERO;

    // The third word is the byte offset of the dynamic `data` field. Both
    // the offset and length words come straight off the wire, so the bounds
    // arithmetic must not overflow.
    let offset = usize::try_from(abi::word_as_u256(&head[2]))
        .map_err(|_| EthError::DecodeError("data offset overflows usize".into()))?;
    let start = offset
        .checked_add(32)
        .ok_or_else(|| EthError::DecodeError("data offset out of bounds".into()))?;
    if start > data.len() {
        return Err(EthError::DecodeError("data offset out of bounds".into()));
    }

    let mut len_word = [0u8; 32];
    len_word.copy_from_slice(&data[offset..start]);
    let len = usize::try_from(abi::word_as_u256(&len_word))
        .map_err(|_| EthError::DecodeError("data length overflows usize".into()))?;
    let end = start
        .checked_add(len)
        .ok_or_else(|| EthError::DecodeError("data field truncated".into()))?;
    if end > data.len() {
        return Err(EthError::DecodeError("data field truncated".into()));
    }

    Ok(StoredTransaction {
        destination,
        value,
        data: Bytes::copy_from_slice(&data[start..end]),
        executed,
    })
}
