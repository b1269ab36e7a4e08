//! Per-account signing state.

use serde::{Deserialize, Serialize};

use super::role::Role;
use crate::error::{FclError, Result};
use crate::service::Service;
use crate::types::Address;

/// Outcome of folding a signature into a [`SignableAccount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureMerge {
    /// The slot was empty and now holds the signature.
    Applied,
    /// The slot was already signed; the incoming signature was dropped.
    AlreadySigned,
}

/// One participant of an interaction.
///
/// Addressed by `temp_id` rather than by address because a signer that is
/// still being negotiated may not have an address yet. The signature slot
/// is write-once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignableAccount {
    pub temp_id: String,
    pub address: Option<Address>,
    pub key_index: Option<u32>,
    /// Fetched lazily from the ledger for the proposer.
    pub sequence_number: Option<u64>,
    signature: Option<String>,
    pub role: Role,
    /// Remote service that signs for this account. `None` signs locally.
    pub authz: Option<Service>,
}

/// tempId used for an account whose address and key are already known.
pub fn temp_id_for(address: &Address, key_index: u32) -> String {
    format!("{}-{}", address.hex(), key_index)
}

impl SignableAccount {
    /// A participant whose address is not yet known.
    pub fn unresolved(temp_id: impl Into<String>) -> Self {
        Self {
            temp_id: temp_id.into(),
            address: None,
            key_index: None,
            sequence_number: None,
            signature: None,
            role: Role::default(),
            authz: None,
        }
    }

    /// A participant identified by address and key index.
    pub fn for_key(address: Address, key_index: u32) -> Self {
        Self {
            temp_id: temp_id_for(&address, key_index),
            address: Some(address),
            key_index: Some(key_index),
            ..Self::unresolved(String::new())
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = self.role.merge(role);
        self
    }

    pub fn with_authz(mut self, service: Service) -> Self {
        self.authz = Some(service);
        self
    }

    pub fn with_sequence_number(mut self, sequence_number: u64) -> Self {
        self.sequence_number = Some(sequence_number);
        self
    }

    /// Hex signature, if this participant has signed.
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Stores `signature` unless the slot is already filled.
    ///
    /// A late or duplicate response never replaces the stored value. An
    /// observer (all-false role) never takes a signature.
    pub fn apply_signature(&mut self, signature: &str) -> Result<SignatureMerge> {
        if self.role.is_observer() {
            return Err(FclError::NotASigner(self.temp_id.clone()));
        }
        let normalized = signature.trim_start_matches("0x").to_lowercase();
        if normalized.is_empty() || hex::decode(&normalized).is_err() {
            return Err(FclError::DecodeFailure(format!(
                "signature for {} is not hex",
                self.temp_id
            )));
        }
        if self.signature.is_some() {
            return Ok(SignatureMerge::AlreadySigned);
        }
        self.signature = Some(normalized);
        Ok(SignatureMerge::Applied)
    }

    /// Folds `other` (same tempId) into `self`.
    ///
    /// Roles are OR-merged and unknown fields are filled from `other`.
    /// Known fields and an existing signature are kept.
    pub fn absorb(&mut self, other: SignableAccount) {
        self.role = self.role.merge(other.role);
        self.address = self.address.or(other.address);
        self.key_index = self.key_index.or(other.key_index);
        self.sequence_number = self.sequence_number.or(other.sequence_number);
        if self.signature.is_none() {
            self.signature = other.signature;
        }
        if self.authz.is_none() {
            self.authz = other.authz;
        }
    }
}
