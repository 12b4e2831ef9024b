//! Legacy (EIP-155) Ethereum transaction encoding, signing and decoding.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_rlp::{BufMut, Decodable, Encodable, Header, EMPTY_STRING_CODE};
use k256::ecdsa::{RecoveryId, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

use crate::address;
use crate::error::EthError;

/// An unsigned legacy Ethereum transaction.
///
/// Numeric fields are 256-bit unsigned integers as on the wire; `to` is
/// `None` for contract creation. A `chain_id` of zero selects the
/// pre-EIP-155 signing scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: U256,
    pub gas_price: U256,
    pub gas_limit: U256,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
    pub chain_id: u64,
}

/// An ECDSA signature in Ethereum's (v, r, s) form.
///
/// For transactions, `v` folds in the chain id per EIP-155
/// (`v = parity + chain_id * 2 + 35`); for personal messages it is 27 or 28.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub v: u64,
    pub r: U256,
    pub s: U256,
}

impl Signature {
    /// The public-key recovery parity bit (0 or 1) encoded in `v`.
    pub fn y_parity(&self) -> Result<u8, EthError> {
        match self.v {
            27 | 28 => Ok((self.v - 27) as u8),
            v if v >= 35 => Ok(((v - 35) % 2) as u8),
            v => Err(EthError::InvalidSignature(format!("v out of range: {v}"))),
        }
    }

    /// The chain id encoded in `v`, or `None` for a pre-EIP-155 signature.
    pub fn chain_id(&self) -> Option<u64> {
        match self.v {
            v if v >= 35 => Some((v - 35) / 2),
            _ => None,
        }
    }

    /// Serializes as the 65-byte `r || s || v` layout used for message
    /// signatures. Fails when `v` carries a folded-in chain id.
    pub fn to_rsv_bytes(&self) -> Result<[u8; 65], EthError> {
        let v = u8::try_from(self.v)
            .map_err(|_| EthError::InvalidSignature(format!("v does not fit a byte: {}", self.v)))?;
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r.to_be_bytes::<32>());
        out[32..64].copy_from_slice(&self.s.to_be_bytes::<32>());
        out[64] = v;
        Ok(out)
    }
}

/// A signed transaction; its RLP encoding is the broadcast representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub tx: Transaction,
    pub signature: Signature,
}

impl Transaction {
    /// Computes the EIP-155 signing hash.
    ///
    /// Keccak-256 of the RLP list `(nonce, gasPrice, gasLimit, to, value,
    /// data, chainId, 0, 0)`, or of the six-field list when `chain_id` is
    /// zero (pre-EIP-155).
    pub fn signing_hash(&self) -> B256 {
        let mut payload = Vec::new();
        self.encode_for_signing(&mut payload);
        B256::from_slice(&Keccak256::digest(&payload))
    }

    fn base_fields_length(&self) -> usize {
        self.nonce.length()
            + self.gas_price.length()
            + self.gas_limit.length()
            + to_field_length(&self.to)
            + self.value.length()
            + self.data.length()
    }

    fn encode_base_fields(&self, out: &mut dyn BufMut) {
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        encode_to_field(&self.to, out);
        self.value.encode(out);
        self.data.encode(out);
    }

    fn encode_for_signing(&self, out: &mut dyn BufMut) {
        let mut payload_length = self.base_fields_length();
        if self.chain_id > 0 {
            // chainId, 0, 0 per EIP-155.
            payload_length += self.chain_id.length() + 2;
        }

        Header {
            list: true,
            payload_length,
        }
        .encode(out);
        self.encode_base_fields(out);
        if self.chain_id > 0 {
            self.chain_id.encode(out);
            0u8.encode(out);
            0u8.encode(out);
        }
    }
}

/// Signs a transaction with a secp256k1 private key.
///
/// Uses the deterministic RFC 6979 nonce and canonicalizes `s` to the lower
/// half of the curve order, flipping the recovery parity when needed.
pub fn sign_transaction(
    tx: Transaction,
    private_key: &[u8; 32],
) -> Result<SignedTransaction, EthError> {
    let hash = tx.signing_hash();
    let (parity, r, s) = sign_hash(&hash, private_key)?;

    let v = if tx.chain_id > 0 {
        tx.chain_id
            .checked_mul(2)
            .and_then(|folded| folded.checked_add(u64::from(parity) + 35))
            .ok_or_else(|| EthError::SigningError("chain id overflows v".into()))?
    } else {
        u64::from(parity) + 27
    };

    Ok(SignedTransaction {
        tx,
        signature: Signature { v, r, s },
    })
}

/// Signs an arbitrary message with EIP-191 personal_sign.
///
/// The signed hash is `keccak256("\x19Ethereum Signed Message:\n" +
/// len(message) + message)`; the returned `v` is 27 or 28.
pub fn sign_message(message: &[u8], private_key: &[u8; 32]) -> Result<Signature, EthError> {
    let mut hasher = Keccak256::new();
    hasher.update(format!("\x19Ethereum Signed Message:\n{}", message.len()).as_bytes());
    hasher.update(message);
    let hash = B256::from_slice(&hasher.finalize());

    let (parity, r, s) = sign_hash(&hash, private_key)?;
    Ok(Signature {
        v: u64::from(parity) + 27,
        r,
        s,
    })
}

/// Recovers the signer address of an EIP-191 personal message signature.
pub fn recover_message_signer(message: &[u8], signature: &Signature) -> Result<Address, EthError> {
    let mut hasher = Keccak256::new();
    hasher.update(format!("\x19Ethereum Signed Message:\n{}", message.len()).as_bytes());
    hasher.update(message);
    let hash = B256::from_slice(&hasher.finalize());

    recover_address(&hash, signature)
}

fn sign_hash(hash: &B256, private_key: &[u8; 32]) -> Result<(u8, U256, U256), EthError> {
    let mut key_bytes = *private_key;
    let signing_key = SigningKey::from_bytes((&key_bytes).into())
        .map_err(|e| EthError::InvalidPrivateKey(e.to_string()))?;
    key_bytes.zeroize();

    let (sig, recid) = signing_key
        .sign_prehash_recoverable(hash.as_slice())
        .map_err(|e| EthError::SigningError(e.to_string()))?;

    // Canonical low-s form; flipping s across the curve order flips the
    // recovery parity.
    let (sig, recid) = match sig.normalize_s() {
        Some(normalized) => {
            let flipped = RecoveryId::from_byte(recid.to_byte() ^ 1)
                .ok_or_else(|| EthError::SigningError("invalid recovery id".into()))?;
            (normalized, flipped)
        }
        None => (sig, recid),
    };

    Ok((
        recid.is_y_odd() as u8,
        U256::from_be_slice(&sig.r().to_bytes()),
        U256::from_be_slice(&sig.s().to_bytes()),
    ))
}

fn recover_address(hash: &B256, signature: &Signature) -> Result<Address, EthError> {
    let r: [u8; 32] = signature.r.to_be_bytes();
    let s: [u8; 32] = signature.s.to_be_bytes();
    let sig = k256::ecdsa::Signature::from_scalars(r, s)
        .map_err(|e| EthError::InvalidSignature(e.to_string()))?;
    let recid = RecoveryId::from_byte(signature.y_parity()?)
        .ok_or_else(|| EthError::InvalidSignature("invalid recovery id".into()))?;

    let key = VerifyingKey::recover_from_prehash(hash.as_slice(), &sig, recid)
        .map_err(|e| EthError::InvalidSignature(format!("recovery failed: {e}")))?;

    let point = key.to_encoded_point(false);
    let mut key_65 = [0u8; 65];
    key_65.copy_from_slice(point.as_bytes());
    address::from_uncompressed_pubkey(&key_65)
}

impl SignedTransaction {
    /// RLP-encodes the nine-field signed transaction for broadcast.
    pub fn encode(&self) -> Vec<u8> {
        let payload_length = self.tx.base_fields_length()
            + self.signature.v.length()
            + self.signature.r.length()
            + self.signature.s.length();

        let mut out = Vec::with_capacity(payload_length + 4);
        Header {
            list: true,
            payload_length,
        }
        .encode(&mut out);
        self.tx.encode_base_fields(&mut out);
        self.signature.v.encode(&mut out);
        self.signature.r.encode(&mut out);
        self.signature.s.encode(&mut out);
        out
    }

    /// Decodes an RLP-encoded signed transaction.
    ///
    /// Rejects non-list payloads, wrong field counts, trailing bytes and
    /// out-of-range `v` values.
    pub fn decode(raw: &[u8]) -> Result<Self, EthError> {
        let mut buf = raw;
        let header = Header::decode(&mut buf)?;
        if !header.list {
            return Err(EthError::DecodeError("expected RLP list".into()));
        }
        if buf.len() != header.payload_length {
            return Err(EthError::DecodeError(
                "trailing bytes after transaction".into(),
            ));
        }

        let payload = &mut &buf[..];
        let nonce = U256::decode(payload)?;
        let gas_price = U256::decode(payload)?;
        let gas_limit = U256::decode(payload)?;
        let to = decode_to_field(payload)?;
        let value = U256::decode(payload)?;
        let data = Bytes::decode(payload)?;
        let v = u64::decode(payload)?;
        let r = U256::decode(payload)?;
        let s = U256::decode(payload)?;
        if !payload.is_empty() {
            return Err(EthError::DecodeError(format!(
                "{} unexpected bytes after signature",
                payload.len()
            )));
        }

        let signature = Signature { v, r, s };
        let chain_id = match signature.chain_id() {
            Some(id) => id,
            None => {
                // Must be a valid pre-EIP-155 v.
                signature.y_parity()?;
                0
            }
        };

        Ok(Self {
            tx: Transaction {
                nonce,
                gas_price,
                gas_limit,
                to,
                value,
                data,
                chain_id,
            },
            signature,
        })
    }

    /// The transaction hash (Keccak-256 of the broadcast bytes).
    pub fn hash(&self) -> B256 {
        B256::from_slice(&Keccak256::digest(self.encode()))
    }

    /// The 0x-prefixed hex string passed to `eth_sendRawTransaction`.
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(self.encode()))
    }

    /// Recovers the signer address from the signature and signing hash.
    pub fn recover_signer(&self) -> Result<Address, EthError> {
        recover_address(&self.tx.signing_hash(), &self.signature)
    }
}

fn to_field_length(to: &Option<Address>) -> usize {
    match to {
        Some(addr) => addr.length(),
        None => 1,
    }
}

fn encode_to_field(to: &Option<Address>, out: &mut dyn BufMut) {
    match to {
        Some(addr) => addr.encode(out),
        // Contract creation encodes as the empty byte string.
        None => out.put_u8(EMPTY_STRING_CODE),
    }
}

fn decode_to_field(buf: &mut &[u8]) -> Result<Option<Address>, EthError> {
    let bytes = Bytes::decode(buf)?;
    match bytes.len() {
        0 => Ok(None),
        20 => Ok(Some(Address::from_slice(&bytes))),
        n => Err(EthError::DecodeError(format!(
            "recipient must be empty or 20 bytes, got {n}"
        ))),
    }
}
