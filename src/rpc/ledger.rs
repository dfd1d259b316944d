//! Ledger keys, entries, keypairs and transaction envelopes
//!
//! Addresses and secrets are strkey encoded (`G...` / `S...`). Ledger keys,
//! entries and envelopes travel as base64 XDR. Transaction hashes are taken
//! over the signature payload, which binds them to the network passphrase.

use std::fmt;

use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};
use stellar_strkey::ed25519;
use stellar_xdr::curr as xdr;
use stellar_xdr::curr::{Limits, ReadXdr, WriteXdr};

use crate::common::{Error, Result};

use super::types::AccountState;

/// Fee in stroops per operation for transactions built by the harness
pub const BASE_FEE: u32 = 100;

/// Decode a `G...` address into its raw ed25519 key
pub fn decode_address(address: &str) -> Result<[u8; 32]> {
    ed25519::PublicKey::from_string(address)
        .map(|pk| pk.0)
        .map_err(|e| Error::AddressDecode(format!("{address}: {e}")))
}

/// Encode a raw ed25519 key as a `G...` address
pub fn encode_address(key: &[u8; 32]) -> String {
    ed25519::PublicKey(*key).to_string()
}

fn account_id(key: [u8; 32]) -> xdr::AccountId {
    xdr::AccountId(xdr::PublicKey::PublicKeyTypeEd25519(xdr::Uint256(key)))
}

/// Base64 XDR of the `LedgerKey` addressing an account entry
pub fn account_ledger_key(address: &str) -> Result<String> {
    let key = xdr::LedgerKey::Account(xdr::LedgerKeyAccount {
        account_id: account_id(decode_address(address)?),
    });
    key.to_xdr_base64(Limits::none()).map_err(Error::xdr)
}

/// Decode a base64 `LedgerEntryData` XDR into an account snapshot
pub fn decode_account_entry(entry_xdr: &str) -> Result<AccountState> {
    let data = xdr::LedgerEntryData::from_xdr_base64(entry_xdr, Limits::none())
        .map_err(|e| Error::EntryDecode(format!("{entry_xdr}: {e}")))?;

    match data {
        xdr::LedgerEntryData::Account(entry) => {
            let xdr::PublicKey::PublicKeyTypeEd25519(xdr::Uint256(key)) = entry.account_id.0;
            Ok(AccountState {
                id: encode_address(&key),
                sequence: entry.seq_num.0,
            })
        }
        _ => Err(Error::EntryDecode(format!(
            "{entry_xdr}: ledger entry is not an account entry"
        ))),
    }
}

/// An ed25519 signing keypair
#[derive(Clone)]
pub struct Keypair {
    signing: SigningKey,
}

impl Keypair {
    /// Generate a fresh random keypair
    pub fn random() -> Self {
        Self {
            signing: SigningKey::generate(&mut rand::rngs::OsRng),
        }
    }

    /// Load a keypair from an `S...` secret seed
    pub fn from_secret(secret: &str) -> Result<Self> {
        let seed = ed25519::PrivateKey::from_string(secret)
            .map_err(|e| Error::AddressDecode(format!("secret seed: {e}")))?;
        Ok(Self {
            signing: SigningKey::from_bytes(&seed.0),
        })
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing.verifying_key().to_bytes()
    }

    /// `G...` address
    pub fn address(&self) -> String {
        encode_address(&self.public_key())
    }

    /// `S...` secret seed
    pub fn secret(&self) -> String {
        ed25519::PrivateKey(self.signing.to_bytes()).to_string()
    }

    fn hint(&self) -> [u8; 4] {
        let key = self.public_key();
        [key[28], key[29], key[30], key[31]]
    }

    fn sign_decorated(&self, hash: &[u8; 32]) -> Result<xdr::DecoratedSignature> {
        let signature = self.signing.sign(hash);
        Ok(xdr::DecoratedSignature {
            hint: xdr::SignatureHint(self.hint()),
            signature: xdr::Signature(
                signature.to_bytes().to_vec().try_into().map_err(Error::xdr)?,
            ),
        })
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// A signed transaction ready for submission, with its network hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEnvelope {
    xdr: String,
    hash: [u8; 32],
}

impl TransactionEnvelope {
    pub fn new(xdr: impl Into<String>, hash: [u8; 32]) -> Self {
        Self {
            xdr: xdr.into(),
            hash,
        }
    }

    /// Wrap an existing base64 envelope, deriving its hash for the network
    pub fn from_xdr(envelope_xdr: &str, network_passphrase: &str) -> Result<Self> {
        let envelope = xdr::TransactionEnvelope::from_xdr_base64(envelope_xdr, Limits::none())
            .map_err(Error::xdr)?;
        let tagged = match envelope {
            xdr::TransactionEnvelope::Tx(v1) => {
                xdr::TransactionSignaturePayloadTaggedTransaction::Tx(v1.tx)
            }
            xdr::TransactionEnvelope::TxFeeBump(bump) => {
                xdr::TransactionSignaturePayloadTaggedTransaction::TxFeeBump(bump.tx)
            }
            xdr::TransactionEnvelope::TxV0(_) => {
                return Err(Error::Xdr(
                    "v0 transaction envelopes are not supported".to_string(),
                ))
            }
        };
        Ok(Self::new(
            envelope_xdr.trim(),
            transaction_hash(tagged, network_passphrase)?,
        ))
    }

    /// Base64 XDR as submitted to `sendTransaction`
    pub fn xdr(&self) -> &str {
        &self.xdr
    }

    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Hex transaction hash, as used by `getTransaction`
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

fn network_id(network_passphrase: &str) -> xdr::Hash {
    xdr::Hash(Sha256::digest(network_passphrase.as_bytes()).into())
}

fn transaction_hash(
    tagged_transaction: xdr::TransactionSignaturePayloadTaggedTransaction,
    network_passphrase: &str,
) -> Result<[u8; 32]> {
    let payload = xdr::TransactionSignaturePayload {
        network_id: network_id(network_passphrase),
        tagged_transaction,
    };
    let bytes = payload.to_xdr(Limits::none()).map_err(Error::xdr)?;
    Ok(Sha256::digest(&bytes).into())
}

/// Build and sign a transaction creating `destination` funded by `source`
///
/// `source_sequence` must be the source account's current sequence, read
/// from the network immediately before calling this.
pub fn create_account_envelope(
    source: &Keypair,
    source_sequence: i64,
    destination: &str,
    starting_balance: i64,
    network_passphrase: &str,
) -> Result<TransactionEnvelope> {
    let operation = xdr::Operation {
        source_account: None,
        body: xdr::OperationBody::CreateAccount(xdr::CreateAccountOp {
            destination: account_id(decode_address(destination)?),
            starting_balance,
        }),
    };

    let tx = xdr::Transaction {
        source_account: xdr::MuxedAccount::Ed25519(xdr::Uint256(source.public_key())),
        fee: BASE_FEE,
        seq_num: xdr::SequenceNumber(source_sequence + 1),
        cond: xdr::Preconditions::None,
        memo: xdr::Memo::None,
        operations: vec![operation].try_into().map_err(Error::xdr)?,
        ext: xdr::TransactionExt::V0,
    };

    let hash = transaction_hash(
        xdr::TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
        network_passphrase,
    )?;
    let signature = source.sign_decorated(&hash)?;

    let envelope = xdr::TransactionEnvelope::Tx(xdr::TransactionV1Envelope {
        tx,
        signatures: vec![signature].try_into().map_err(Error::xdr)?,
    });
    let encoded = envelope.to_xdr_base64(Limits::none()).map_err(Error::xdr)?;

    Ok(TransactionEnvelope::new(encoded, hash))
}
