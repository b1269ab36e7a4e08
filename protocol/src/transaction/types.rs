//! Core transaction value types.
//!
//! [`TransactionBody`] is everything a signer signs over; the signed form
//! adds payload and envelope signature lists on top of it.

use serde::{Deserialize, Serialize};

use super::encoding;
use crate::error::{FclError, Result};
use crate::types::Address;

// ---------------------------------------------------------------------------
// ProposalKey
// ---------------------------------------------------------------------------

/// The key whose sequence number this transaction consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalKey {
    pub address: Address,
    pub key_index: u32,
    pub sequence_number: u64,
}

// ---------------------------------------------------------------------------
// TransactionSignature
// ---------------------------------------------------------------------------

/// A payload or envelope signature, keyed by `(address, key_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSignature {
    pub address: Address,
    pub key_index: u32,
    /// Lowercase hex, no prefix.
    pub signature: String,
}

impl TransactionSignature {
    pub fn new(address: Address, key_index: u32, signature: impl Into<String>) -> Self {
        Self {
            address,
            key_index,
            signature: signature.into(),
        }
    }

    /// `true` when `other` is for the same `(address, key_index)`.
    pub fn same_key(&self, other: &TransactionSignature) -> bool {
        self.address == other.address && self.key_index == other.key_index
    }

    pub fn signature_bytes(&self) -> Result<Vec<u8>> {
        hex::decode(&self.signature).map_err(|e| {
            FclError::DecodeFailure(format!("signature for {}: {}", self.address, e))
        })
    }
}

// ---------------------------------------------------------------------------
// TransactionBody
// ---------------------------------------------------------------------------

/// The signable fields of a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBody {
    pub script: String,
    /// JSON-Cadence arguments in declared order.
    pub arguments: Vec<serde_json::Value>,
    /// Hex id of the reference block.
    pub reference_block_id: String,
    pub compute_limit: u64,
    pub proposal_key: ProposalKey,
    pub payer: Address,
    /// Deduplicated, first-seen order.
    pub authorizers: Vec<Address>,
}

impl TransactionBody {
    /// Message a payload signer signs.
    pub fn payload_message(&self) -> Result<Vec<u8>> {
        encoding::payload_message(self)
    }

    /// Message the payer signs, covering `payload_signatures`.
    pub fn envelope_message(&self, payload_signatures: &[TransactionSignature]) -> Result<Vec<u8>> {
        encoding::envelope_message(self, payload_signatures)
    }

    /// Ordered unique signer addresses: proposer, payer, then authorizers.
    /// A signature's signer index is its address's position in this list.
    pub fn signer_addresses(&self) -> Vec<Address> {
        let mut out: Vec<Address> = Vec::with_capacity(self.authorizers.len() + 2);
        for addr in std::iter::once(&self.proposal_key.address)
            .chain(std::iter::once(&self.payer))
            .chain(self.authorizers.iter())
        {
            if !out.contains(addr) {
                out.push(*addr);
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// SignedTransaction
// ---------------------------------------------------------------------------

/// A transaction body plus the signatures collected for it.
///
/// Produced by [`super::TransactionBuilder`]. Payload signatures can only
/// be attached while no envelope signature is present, because the
/// envelope message covers them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    pub body: TransactionBody,
    pub(crate) payload_signatures: Vec<TransactionSignature>,
    pub(crate) envelope_signatures: Vec<TransactionSignature>,
}

impl SignedTransaction {
    pub fn payload_signatures(&self) -> &[TransactionSignature] {
        &self.payload_signatures
    }

    pub fn envelope_signatures(&self) -> &[TransactionSignature] {
        &self.envelope_signatures
    }

    /// Attaches a payload signature. A second signature for the same key
    /// is ignored.
    pub fn add_payload_signature(&mut self, sig: TransactionSignature) -> Result<()> {
        if !self.envelope_signatures.is_empty() {
            return Err(FclError::SignatureOrder {
                address: sig.address.hex(),
            });
        }
        if !self.payload_signatures.iter().any(|s| s.same_key(&sig)) {
            self.payload_signatures.push(sig);
        }
        Ok(())
    }

    /// Attaches an envelope signature. A second signature for the same key
    /// is ignored.
    pub fn add_envelope_signature(&mut self, sig: TransactionSignature) {
        if !self.envelope_signatures.iter().any(|s| s.same_key(&sig)) {
            self.envelope_signatures.push(sig);
        }
    }

    pub fn payload_message(&self) -> Result<Vec<u8>> {
        self.body.payload_message()
    }

    /// Envelope message over the currently attached payload signatures.
    pub fn envelope_message(&self) -> Result<Vec<u8>> {
        self.body.envelope_message(&self.payload_signatures)
    }

    pub fn is_envelope_signed(&self) -> bool {
        !self.envelope_signatures.is_empty()
    }
}
