//! Wallet response records.
//!
//! Every wallet reply is an [`AuthnResponse`] (the polling-response
//! envelope). Its `data` member is shaped by the request that produced
//! it, so it is kept as raw JSON and decoded on demand by the typed
//! accessors below.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use super::service::Service;
use crate::config::{
    ACCOUNT_PROOF_FTYPE, ACCOUNT_PROOF_VSN, COMPOSITE_SIGNATURE_FTYPE, COMPOSITE_SIGNATURE_VSN,
    POLLING_RESPONSE_FTYPE, POLLING_RESPONSE_VSN,
};
use crate::error::{FclError, Result};
use crate::interaction::Interaction;
use crate::transaction::encoding;
use crate::types::Address;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Pending,
    Approved,
    Declined,
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Approved => write!(f, "APPROVED"),
            Self::Declined => write!(f, "DECLINED"),
        }
    }
}

// ---------------------------------------------------------------------------
// CompositeSignature
// ---------------------------------------------------------------------------

/// A signature together with the key that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeSignature {
    pub f_type: String,
    pub f_vsn: String,
    pub addr: Address,
    #[serde(rename = "keyId")]
    pub key_id: u32,
    /// Hex signature.
    pub signature: String,
}

impl CompositeSignature {
    pub fn new(addr: Address, key_id: u32, signature: impl Into<String>) -> Self {
        Self {
            f_type: COMPOSITE_SIGNATURE_FTYPE.to_string(),
            f_vsn: COMPOSITE_SIGNATURE_VSN.to_string(),
            addr,
            key_id,
            signature: signature.into(),
        }
    }

    /// `UnexpectedSigner` unless this signature is from `expected`.
    pub fn ensure_signer(&self, expected: &Address) -> Result<()> {
        if &self.addr != expected {
            return Err(FclError::UnexpectedSigner {
                expected: expected.hex(),
                got: self.addr.hex(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AccountProof
// ---------------------------------------------------------------------------

/// Proof that a wallet controls `address`, bound to an app and a nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProof {
    pub f_type: String,
    pub f_vsn: String,
    pub address: Address,
    /// Hex nonce supplied by the requesting app.
    pub nonce: String,
    pub signatures: Vec<CompositeSignature>,
}

impl AccountProof {
    pub fn new(address: Address, nonce: impl Into<String>, signatures: Vec<CompositeSignature>) -> Self {
        Self {
            f_type: ACCOUNT_PROOF_FTYPE.to_string(),
            f_vsn: ACCOUNT_PROOF_VSN.to_string(),
            address,
            nonce: nonce.into(),
            signatures,
        }
    }

    /// The message each signature in this proof is expected to cover.
    pub fn message(&self, app_identifier: &str) -> Result<Vec<u8>> {
        encoding::account_proof_message(app_identifier, &self.address, &self.nonce)
    }
}

// ---------------------------------------------------------------------------
// Response data shapes
// ---------------------------------------------------------------------------

/// `data` of an authentication response. Every field is optional; wallets
/// differ in what they send.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthnData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f_vsn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr: Option<Address>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,
}

impl AuthnData {
    /// First advertised service of `service_type`.
    pub fn service(&self, service_type: &super::ServiceType) -> Option<&Service> {
        self.services.iter().find(|s| &s.service_type == service_type)
    }
}

/// `data` of a pre-authorization response: who proposes, pays, and
/// authorizes, each as an authz service with an identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreAuthzData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f_vsn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposer: Option<Service>,
    #[serde(default)]
    pub payer: Vec<Service>,
    #[serde(default)]
    pub authorization: Vec<Service>,
}

impl PreAuthzData {
    /// Folds the announced roles into `ix`.
    ///
    /// Only the first payer service is used, since an interaction has a
    /// single payer slot.
    pub fn merge_into(&self, ix: &mut Interaction) -> Result<()> {
        if let Some(proposer) = &self.proposer {
            ix.set_proposer(proposer.signable_account()?);
        }
        if self.payer.len() > 1 {
            warn!(count = self.payer.len(), "multiple payer services, using the first");
        }
        if let Some(payer) = self.payer.first() {
            ix.set_payer(payer.signable_account()?);
        }
        for authorizer in &self.authorization {
            ix.add_authorizer(authorizer.signable_account()?);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AuthnResponse
// ---------------------------------------------------------------------------

/// The response envelope every wallet reply uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthnResponse {
    pub f_type: String,
    pub f_vsn: String,
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Services advertised alongside the reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<Service>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updates: Option<Service>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<Service>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(
        rename = "compositeSignature",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub composite_signature: Option<CompositeSignature>,
}

impl AuthnResponse {
    fn with_status(status: ResponseStatus) -> Self {
        Self {
            f_type: POLLING_RESPONSE_FTYPE.to_string(),
            f_vsn: POLLING_RESPONSE_VSN.to_string(),
            status,
            data: None,
            services: None,
            updates: None,
            local: None,
            reason: None,
            composite_signature: None,
        }
    }

    pub fn approved(data: serde_json::Value) -> Self {
        Self {
            data: Some(data),
            ..Self::with_status(ResponseStatus::Approved)
        }
    }

    pub fn pending() -> Self {
        Self::with_status(ResponseStatus::Pending)
    }

    pub fn declined(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::with_status(ResponseStatus::Declined)
        }
    }

    fn decode_data<T: DeserializeOwned>(&self, what: &str) -> Result<T> {
        let data = self
            .data
            .clone()
            .ok_or_else(|| FclError::DecodeFailure(format!("{} response has no data", what)))?;
        serde_json::from_value(data)
            .map_err(|e| FclError::DecodeFailure(format!("{} data: {}", what, e)))
    }

    pub fn authn_data(&self) -> Result<AuthnData> {
        self.decode_data("authn")
    }

    pub fn pre_authz_data(&self) -> Result<PreAuthzData> {
        self.decode_data("pre-authz")
    }

    /// The authorization signature, from `data` or the legacy
    /// `compositeSignature` member.
    pub fn composite_signature(&self) -> Result<CompositeSignature> {
        if self.data.is_none() {
            if let Some(sig) = &self.composite_signature {
                return Ok(sig.clone());
            }
        }
        self.decode_data("authz")
    }

    pub fn composite_signatures(&self) -> Result<Vec<CompositeSignature>> {
        self.decode_data("user-signature")
    }

    pub fn account_proof(&self) -> Result<AccountProof> {
        self.decode_data("account-proof")
    }
}
