//! # Engine Configuration & Constants
//!
//! Wire identifiers, domain tags, and defaults for the signing engine live
//! here. The wire constants are shared with every counterparty wallet that
//! speaks the same protocol family, so they are fixed strings, not knobs.
//!
//! [`EngineConfig`] holds the few values a host application may tune.

use serde::{Deserialize, Serialize};

use crate::error::{FclError, Result};

// ---------------------------------------------------------------------------
// Wire Versions
// ---------------------------------------------------------------------------

/// `f_vsn` carried by [`crate::service::Service`] records.
pub const SERVICE_VSN: &str = "1.0.0";

/// `f_vsn` carried by polling responses.
pub const POLLING_RESPONSE_VSN: &str = "1.0.0";

/// `f_vsn` carried by signables and pre-signables.
pub const SIGNABLE_VSN: &str = "1.0.1";

/// `f_vsn` carried by composite signatures.
pub const COMPOSITE_SIGNATURE_VSN: &str = "1.0.0";

/// `f_vsn` carried by account-proof data.
pub const ACCOUNT_PROOF_VSN: &str = "2.0.0";

// ---------------------------------------------------------------------------
// Wire Type Tags (`f_type`)
// ---------------------------------------------------------------------------

pub const SERVICE_FTYPE: &str = "Service";
pub const POLLING_RESPONSE_FTYPE: &str = "PollingResponse";
pub const SIGNABLE_FTYPE: &str = "Signable";
pub const PRE_SIGNABLE_FTYPE: &str = "PreSignable";
pub const COMPOSITE_SIGNATURE_FTYPE: &str = "CompositeSignature";
pub const ACCOUNT_PROOF_FTYPE: &str = "account-proof";

// ---------------------------------------------------------------------------
// Session RPC Methods
// ---------------------------------------------------------------------------

pub const METHOD_AUTHN: &str = "flow_authn";
pub const METHOD_PRE_AUTHZ: &str = "flow_pre_authz";
pub const METHOD_AUTHZ: &str = "flow_authz";
pub const METHOD_USER_SIGN: &str = "flow_user_sign";
pub const METHOD_ACCOUNT_PROOF: &str = "flow_account_proof";

/// JSON-RPC version string carried in every session envelope.
pub const JSON_RPC_VERSION: &str = "2.0";

// ---------------------------------------------------------------------------
// Signing Domain Tags
// ---------------------------------------------------------------------------

/// Domain tags are right-padded with zero bytes to this length.
pub const DOMAIN_TAG_LENGTH: usize = 32;

/// Prefix for transaction payload and envelope messages.
pub const TRANSACTION_DOMAIN_TAG: &str = "FLOW-V0.0-transaction";

/// Prefix for arbitrary user messages.
pub const USER_DOMAIN_TAG: &str = "FLOW-V0.0-user";

/// Prefix for account-proof messages.
pub const ACCOUNT_PROOF_DOMAIN_TAG: &str = "FCL-ACCOUNT-PROOF-V0.0";

/// Returns `tag` right-padded with zero bytes to [`DOMAIN_TAG_LENGTH`].
pub fn padded_domain_tag(tag: &str) -> [u8; DOMAIN_TAG_LENGTH] {
    let mut out = [0u8; DOMAIN_TAG_LENGTH];
    let bytes = tag.as_bytes();
    let n = bytes.len().min(DOMAIN_TAG_LENGTH);
    out[..n].copy_from_slice(&bytes[..n]);
    out
}

// ---------------------------------------------------------------------------
// Ledger Layout
// ---------------------------------------------------------------------------

/// Byte length of a native ledger address.
pub const NATIVE_ADDRESS_LENGTH: usize = 8;

/// Byte length of a secondary (EVM-style) address.
pub const SECONDARY_ADDRESS_LENGTH: usize = 20;

/// Byte length of a reference block id.
pub const BLOCK_ID_LENGTH: usize = 32;

/// Minimum nonce length, in bytes, for account-proof requests.
pub const MIN_ACCOUNT_PROOF_NONCE_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Compute limit applied when the caller does not set one.
pub const DEFAULT_COMPUTE_LIMIT: u64 = 9999;

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Host-tunable settings for the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Compute limit seeded into new transaction interactions.
    pub default_compute_limit: u64,
    /// Application identifier bound into account-proof messages.
    pub app_identifier: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_compute_limit: DEFAULT_COMPUTE_LIMIT,
            app_identifier: None,
        }
    }
}

impl EngineConfig {
    /// Parses a JSON document. Missing keys fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FclError::DecodeFailure(format!("config: {}", e)))
    }
}
