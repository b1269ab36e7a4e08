//! Service descriptors.
//!
//! A [`Service`] tells the engine how to reach a wallet capability: what
//! it does (`type`), how to call it (`method`), and where (`endpoint`).
//! Services arrive inside authentication and pre-authorization responses
//! and are re-serialized when forwarded, so the encoding must reproduce
//! the decoded bytes exactly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::params::ParamValue;
use super::response::AccountProof;
use crate::config::{SERVICE_FTYPE, SERVICE_VSN};
use crate::error::{FclError, Result};
use crate::interaction::SignableAccount;
use crate::types::Address;

// ---------------------------------------------------------------------------
// ServiceType
// ---------------------------------------------------------------------------

/// The capability a service provides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceType {
    Authn,
    PreAuthz,
    Authz,
    UserSignature,
    AccountProof,
    OpenId,
    BackChannelRpc,
    LocalView,
    /// Any type this engine does not act on. Kept verbatim.
    Other(String),
}

impl ServiceType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Authn => "authn",
            Self::PreAuthz => "pre-authz",
            Self::Authz => "authz",
            Self::UserSignature => "user-signature",
            Self::AccountProof => "account-proof",
            Self::OpenId => "open-id",
            Self::BackChannelRpc => "back-channel-rpc",
            Self::LocalView => "local-view",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for ServiceType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "authn" => Self::Authn,
            "pre-authz" => Self::PreAuthz,
            "authz" => Self::Authz,
            "user-signature" => Self::UserSignature,
            "account-proof" => Self::AccountProof,
            "open-id" => Self::OpenId,
            "back-channel-rpc" => Self::BackChannelRpc,
            "local-view" => Self::LocalView,
            _ => Self::Other(s),
        }
    }
}

impl From<ServiceType> for String {
    fn from(t: ServiceType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ServiceMethod
// ---------------------------------------------------------------------------

/// Transport used to reach a service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceMethod {
    HttpPost,
    HttpGet,
    IframeRpc,
    PopRpc,
    TabRpc,
    ExtRpc,
    WalletConnectRpc,
    Data,
    Other(String),
}

impl ServiceMethod {
    pub fn as_str(&self) -> &str {
        match self {
            Self::HttpPost => "HTTP/POST",
            Self::HttpGet => "HTTP/GET",
            Self::IframeRpc => "IFRAME/RPC",
            Self::PopRpc => "POP/RPC",
            Self::TabRpc => "TAB/RPC",
            Self::ExtRpc => "EXT/RPC",
            Self::WalletConnectRpc => "WC/RPC",
            Self::Data => "DATA",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for ServiceMethod {
    fn from(s: String) -> Self {
        match s.as_str() {
            "HTTP/POST" => Self::HttpPost,
            "HTTP/GET" => Self::HttpGet,
            "IFRAME/RPC" => Self::IframeRpc,
            "POP/RPC" => Self::PopRpc,
            "TAB/RPC" => Self::TabRpc,
            "EXT/RPC" => Self::ExtRpc,
            "WC/RPC" => Self::WalletConnectRpc,
            "DATA" => Self::Data,
            _ => Self::Other(s),
        }
    }
}

impl From<ServiceMethod> for String {
    fn from(m: ServiceMethod) -> Self {
        m.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// Identity / Provider
// ---------------------------------------------------------------------------

/// The account a service acts for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceIdentity {
    pub address: Address,
    #[serde(rename = "keyId", default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<u32>,
}

/// Display metadata about the wallet offering a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProvider {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub f_type: String,
    pub f_vsn: String,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub method: ServiceMethod,
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<ServiceIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ServiceProvider>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, ParamValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AccountProof>,
}

impl Service {
    /// A service record with the current wire version and no extras.
    pub fn new(service_type: ServiceType, method: ServiceMethod, endpoint: impl Into<String>) -> Self {
        Self {
            f_type: SERVICE_FTYPE.to_string(),
            f_vsn: SERVICE_VSN.to_string(),
            service_type,
            method,
            endpoint: endpoint.into(),
            uid: None,
            identity: None,
            provider: None,
            params: BTreeMap::new(),
            data: None,
        }
    }

    pub fn with_identity(mut self, address: Address, key_id: Option<u32>) -> Self {
        self.identity = Some(ServiceIdentity { address, key_id });
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// The signing participant this service stands for.
    ///
    /// Requires an identity. A missing `keyId` means key 0. The service is
    /// attached as the account's `authz` so later signature requests are
    /// routed to it.
    pub fn signable_account(&self) -> Result<SignableAccount> {
        let identity = self.identity.as_ref().ok_or_else(|| {
            FclError::DecodeFailure(format!("{} service has no identity", self.service_type))
        })?;
        Ok(SignableAccount::for_key(identity.address, identity.key_id.unwrap_or(0))
            .with_authz(self.clone()))
    }
}
