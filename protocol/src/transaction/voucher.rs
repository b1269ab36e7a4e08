//! Voucher construction.
//!
//! A [`Voucher`] is the wire description of a transaction that is still
//! being signed. It is what a remote wallet displays and validates before
//! it signs. Vouchers are pure projections of an [`Interaction`]: they are
//! rebuilt on every use and never edited.

use serde::{Deserialize, Serialize};

use super::types::{ProposalKey, TransactionBody, TransactionSignature};
use crate::error::{FclError, Result};
use crate::interaction::{Interaction, SignableAccount, SignerSets};
use crate::types::Address;

/// Proposal key as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherProposalKey {
    pub address: Address,
    #[serde(rename = "keyId")]
    pub key_id: u32,
    #[serde(rename = "sequenceNum")]
    pub sequence_num: u64,
}

/// A collected signature as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherSignature {
    pub address: Address,
    #[serde(rename = "keyId")]
    pub key_id: u32,
    pub sig: String,
}

/// Serializable snapshot of an interaction's transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub cadence: String,
    pub ref_block: Option<String>,
    pub compute_limit: u64,
    pub arguments: Vec<serde_json::Value>,
    pub proposal_key: VoucherProposalKey,
    pub payer: Option<Address>,
    pub authorizers: Vec<Address>,
    pub payload_sigs: Vec<VoucherSignature>,
    pub envelope_sigs: Vec<VoucherSignature>,
}

impl From<ProposalKey> for VoucherProposalKey {
    fn from(key: ProposalKey) -> Self {
        Self {
            address: key.address,
            key_id: key.key_index,
            sequence_num: key.sequence_number,
        }
    }
}

impl From<&VoucherSignature> for TransactionSignature {
    fn from(sig: &VoucherSignature) -> Self {
        TransactionSignature::new(sig.address, sig.key_id, sig.sig.clone())
    }
}

/// Proposal key of `ix`'s proposer.
///
/// `InvalidProposer` when the proposer is unset or lacks an address, key
/// index, or resolved sequence number.
pub fn proposal_key(ix: &Interaction) -> Result<ProposalKey> {
    let temp_id = ix
        .proposer()
        .ok_or_else(|| FclError::InvalidProposer("no proposer set".to_string()))?;
    let account = ix
        .account(temp_id)
        .ok_or_else(|| FclError::InvalidProposer(format!("unknown proposer {}", temp_id)))?;
    let address = account
        .address
        .ok_or_else(|| FclError::InvalidProposer(format!("proposer {} has no address", temp_id)))?;
    let key_index = account.key_index.ok_or_else(|| {
        FclError::InvalidProposer(format!("proposer {} has no key index", temp_id))
    })?;
    let sequence_number = account.sequence_number.ok_or_else(|| {
        FclError::InvalidProposer(format!(
            "proposer {} has no resolved sequence number",
            temp_id
        ))
    })?;
    Ok(ProposalKey {
        address,
        key_index,
        sequence_number,
    })
}

/// Signature entries for the signed members of `signers`.
pub(crate) fn collected_signatures(
    ix: &Interaction,
    signers: &[String],
) -> Result<Vec<TransactionSignature>> {
    let mut out = Vec::with_capacity(signers.len());
    for temp_id in signers {
        let Some(account) = ix.account(temp_id) else {
            continue;
        };
        if let Some(signature) = account.signature() {
            let (address, key_index) = signing_key(account)?;
            out.push(TransactionSignature::new(address, key_index, signature));
        }
    }
    Ok(out)
}

/// `(address, key_index)` of an account that signs.
pub(crate) fn signing_key(account: &SignableAccount) -> Result<(Address, u32)> {
    match (account.address, account.key_index) {
        (Some(address), Some(key_index)) => Ok((address, key_index)),
        _ => Err(FclError::InvalidAddress(format!(
            "signer {} has no address or key index",
            account.temp_id
        ))),
    }
}

/// Builds the voucher for `ix`.
///
/// Signers that have not signed yet are left out of the signature lists,
/// so a partially signed interaction yields a valid partial voucher.
pub fn build_voucher(ix: &Interaction) -> Result<Voucher> {
    ix.ensure_script()?;
    let proposal_key = proposal_key(ix)?;

    let payer = match ix.payer() {
        Some(temp_id) => Some(
            ix.account(temp_id)
                .and_then(|a| a.address)
                .ok_or_else(|| FclError::InvalidAddress(format!("payer {} has no address", temp_id)))?,
        ),
        None => None,
    };

    let sets = SignerSets::resolve(ix);
    let to_wire = |sigs: Vec<TransactionSignature>| {
        sigs.into_iter()
            .map(|s| VoucherSignature {
                address: s.address,
                key_id: s.key_index,
                sig: s.signature,
            })
            .collect::<Vec<_>>()
    };

    Ok(Voucher {
        cadence: ix.message.cadence.clone(),
        ref_block: ix.message.ref_block_id.clone(),
        compute_limit: ix.message.compute_limit,
        arguments: ix
            .ordered_arguments()
            .into_iter()
            .map(|a| a.value.clone())
            .collect(),
        proposal_key: proposal_key.into(),
        payer,
        authorizers: ix.authorizer_addresses()?,
        payload_sigs: to_wire(collected_signatures(ix, &sets.inside)?),
        envelope_sigs: to_wire(collected_signatures(ix, &sets.outside)?),
    })
}

impl Voucher {
    /// The signable body. Requires a payer and a reference block.
    pub fn to_body(&self) -> Result<TransactionBody> {
        Ok(TransactionBody {
            script: self.cadence.clone(),
            arguments: self.arguments.clone(),
            reference_block_id: self
                .ref_block
                .clone()
                .filter(|id| !id.is_empty())
                .ok_or(FclError::MissingReferenceBlock)?,
            compute_limit: self.compute_limit,
            proposal_key: ProposalKey {
                address: self.proposal_key.address,
                key_index: self.proposal_key.key_id,
                sequence_number: self.proposal_key.sequence_num,
            },
            payer: self.payer.ok_or(FclError::MissingPayer)?,
            authorizers: self.authorizers.clone(),
        })
    }

    pub fn payload_message(&self) -> Result<Vec<u8>> {
        self.to_body()?.payload_message()
    }

    /// Envelope message over the payload signatures in this voucher.
    pub fn envelope_message(&self) -> Result<Vec<u8>> {
        let sigs: Vec<TransactionSignature> = self.payload_sigs.iter().map(Into::into).collect();
        self.to_body()?.envelope_message(&sigs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
