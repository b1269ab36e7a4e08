//! Per-session negotiation state machine.
//!
//! ```text
//! Idle ─pair─► Paired ─request─► AwaitingResponse(type) ─reply─► Responded(status)
//!                                        ▲                             │
//!                                        └──────── PENDING ────────────┘
//! ```
//!
//! A session issues one request at a time and waits for the reply whose
//! id matches. Every request id is unique, so several sessions may share
//! one topic; replies for other ids are skipped. There is no timeout and
//! no retry: the caller cancels by dropping the future.

use futures::stream::{BoxStream, StreamExt};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::channel::SessionChannel;
use super::codec;
use super::response::{
    AccountProof, AuthnData, AuthnResponse, CompositeSignature, PreAuthzData, ResponseStatus,
};
use super::service::ServiceType;
use super::signable::{PreSignable, Signable};
use crate::config::{
    EngineConfig, METHOD_ACCOUNT_PROOF, METHOD_AUTHN, METHOD_AUTHZ, METHOD_PRE_AUTHZ,
    METHOD_USER_SIGN,
};
use crate::error::{FclError, Result};
use crate::interaction::{temp_id_for, Interaction, SignatureMerge};
use crate::transaction::encoding;
use crate::types::Address;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Paired,
    AwaitingResponse(ServiceType),
    Responded(ResponseStatus),
    /// The channel ended. No further requests are possible.
    Closed,
}

// ---------------------------------------------------------------------------
// NegotiationSession
// ---------------------------------------------------------------------------

pub struct NegotiationSession {
    channel: Arc<dyn SessionChannel>,
    topic: String,
    state: SessionState,
    responses: Option<BoxStream<'static, Vec<u8>>>,
    app_identifier: Option<String>,
    /// Request id -> tempId for every authz request this session sent.
    authz_requests: HashMap<String, String>,
}

impl NegotiationSession {
    pub fn new(channel: Arc<dyn SessionChannel>, topic: impl Into<String>) -> Self {
        Self {
            channel,
            topic: topic.into(),
            state: SessionState::Idle,
            responses: None,
            app_identifier: None,
            authz_requests: HashMap::new(),
        }
    }

    /// Takes the account-proof app identifier from `config`.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.app_identifier = config.app_identifier.clone();
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Subscribes to the topic. Must be called once before any request.
    pub fn pair(&mut self) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(FclError::InvalidSession(format!(
                "cannot pair from {:?}",
                self.state
            )));
        }
        self.responses = Some(self.channel.on_response(&self.topic));
        self.state = SessionState::Paired;
        info!(topic = %self.topic, "session paired");
        Ok(())
    }

    pub fn close(&mut self) {
        self.responses = None;
        self.authz_requests.clear();
        self.state = SessionState::Closed;
        debug!(topic = %self.topic, "session closed");
    }

    // -- requests -----------------------------------------------------------

    /// Authenticates the wallet user. Returns the account address and the
    /// services the wallet offers.
    pub async fn authenticate(&mut self) -> Result<AuthnData> {
        let id = uuid::Uuid::new_v4().to_string();
        let response = self
            .round_trip(ServiceType::Authn, METHOD_AUTHN, &id, Vec::new())
            .await?;
        let data = response.authn_data()?;
        info!(topic = %self.topic, addr = ?data.addr, services = data.services.len(), "authenticated");
        Ok(data)
    }

    /// Asks the wallet who will propose, pay, and authorize, then folds the
    /// answer into `ix`.
    pub async fn pre_authorize(&mut self, ix: &mut Interaction) -> Result<PreAuthzData> {
        let id = uuid::Uuid::new_v4().to_string();
        let params = vec![serde_json::to_value(PreSignable::from_interaction(ix))?];
        let response = self
            .round_trip(ServiceType::PreAuthz, METHOD_PRE_AUTHZ, &id, params)
            .await?;
        let data = response.pre_authz_data()?;
        data.merge_into(ix)?;
        Ok(data)
    }

    /// Requests the signature of account `temp_id` over `message` and folds
    /// it into `ix`.
    ///
    /// An already-signed account is not asked again. The request id is the
    /// tempId plus a fresh suffix, so a reply can only ever be matched to
    /// the request that asked for it.
    pub async fn authorize(
        &mut self,
        ix: &mut Interaction,
        temp_id: &str,
        message: &[u8],
    ) -> Result<SignatureMerge> {
        let account = ix.account(temp_id).ok_or_else(|| {
            FclError::InvalidSession(format!("no account {} in interaction", temp_id))
        })?;
        if account.is_signed() {
            debug!(temp_id = %temp_id, "already signed, not requesting again");
            return Ok(SignatureMerge::AlreadySigned);
        }

        let signable = Signable::for_account(ix, temp_id, message)?;
        let params = vec![serde_json::to_value(&signable)?];
        let id = authz_request_id(temp_id);
        self.authz_requests.insert(id.clone(), temp_id.to_string());
        let response = self
            .round_trip(ServiceType::Authz, METHOD_AUTHZ, &id, params)
            .await?;

        let sig = response.composite_signature()?;
        sig.ensure_signer(&signable.addr)?;
        if sig.key_id != signable.key_id {
            return Err(FclError::UnexpectedSigner {
                expected: temp_id.to_string(),
                got: temp_id_for(&sig.addr, sig.key_id),
            });
        }

        let merge = ix.apply_signature(temp_id, &sig.signature)?;
        match merge {
            SignatureMerge::Applied => info!(temp_id = %temp_id, "signature applied"),
            SignatureMerge::AlreadySigned => {
                debug!(temp_id = %temp_id, "duplicate signature ignored")
            }
        }
        Ok(merge)
    }

    /// Asks `address` to sign an arbitrary message. The wallet signs the
    /// user-tagged form of `message`.
    pub async fn sign_user_message(
        &mut self,
        address: &Address,
        message: &[u8],
    ) -> Result<Vec<CompositeSignature>> {
        let id = uuid::Uuid::new_v4().to_string();
        let params = vec![json!({
            "message": hex::encode(message),
            "addr": address.hex(),
        })];
        let response = self
            .round_trip(ServiceType::UserSignature, METHOD_USER_SIGN, &id, params)
            .await?;
        let signatures = response.composite_signatures()?;
        if signatures.is_empty() {
            return Err(FclError::DecodeFailure(
                "user-signature response has no signatures".to_string(),
            ));
        }
        for sig in &signatures {
            sig.ensure_signer(address)?;
        }
        debug!(addr = %address, count = signatures.len(), "user message signed");
        Ok(signatures)
    }

    /// Requests an account proof over `nonce_hex` for the configured app
    /// identifier.
    ///
    /// The nonce and the app identifier are checked before anything is sent.
    pub async fn request_account_proof(&mut self, nonce_hex: &str) -> Result<AccountProof> {
        encoding::decode_nonce(nonce_hex)?;
        let app_identifier = self.app_identifier.clone().ok_or_else(|| {
            FclError::InvalidSession("no app identifier configured".to_string())
        })?;
        let id = uuid::Uuid::new_v4().to_string();
        let params = vec![json!({
            "appIdentifier": app_identifier,
            "nonce": nonce_hex,
        })];
        let response = self
            .round_trip(ServiceType::AccountProof, METHOD_ACCOUNT_PROOF, &id, params)
            .await?;
        let proof = response.account_proof()?;

        let requested = nonce_hex.trim_start_matches("0x");
        if !proof.nonce.trim_start_matches("0x").eq_ignore_ascii_case(requested) {
            return Err(FclError::DecodeFailure(
                "account proof is for a different nonce".to_string(),
            ));
        }
        for sig in &proof.signatures {
            sig.ensure_signer(&proof.address)?;
        }
        Ok(proof)
    }

    // -- internals ----------------------------------------------------------

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            SessionState::Paired | SessionState::Responded(_) => Ok(()),
            ref other => Err(FclError::InvalidSession(format!(
                "cannot send a request in state {:?}",
                other
            ))),
        }
    }

    async fn round_trip(
        &mut self,
        service_type: ServiceType,
        method: &str,
        id: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<AuthnResponse> {
        self.ensure_ready()?;
        let payload = codec::encode_request(id, method, params)?;
        self.channel.send(&self.topic, method, payload).await?;
        self.state = SessionState::AwaitingResponse(service_type.clone());
        debug!(topic = %self.topic, method, id, "request sent");

        loop {
            let next = match self.responses.as_mut() {
                Some(stream) => stream.next().await,
                None => None,
            };
            let Some(bytes) = next else {
                warn!(topic = %self.topic, id, "channel ended while awaiting response");
                self.close();
                return Err(FclError::InvalidSession(
                    "session ended before a response arrived".to_string(),
                ));
            };

            let rpc = match codec::decode_response(&bytes) {
                Ok(rpc) => rpc,
                Err(e) => {
                    warn!(topic = %self.topic, error = %e, "undecodable response");
                    self.state = SessionState::Paired;
                    return Err(e);
                }
            };
            if rpc.id != id {
                match self.authz_requests.get(&rpc.id) {
                    Some(temp_id) => {
                        debug!(topic = %self.topic, temp_id = %temp_id, got = %rpc.id, "skipping late reply to an earlier authz request")
                    }
                    None => {
                        debug!(topic = %self.topic, expected = id, got = %rpc.id, "skipping response for another request")
                    }
                }
                continue;
            }

            let response = match rpc.into_authn_response() {
                Ok(response) => response,
                Err(e) => {
                    self.state = match e {
                        FclError::Declined(_) => SessionState::Responded(ResponseStatus::Declined),
                        _ => SessionState::Paired,
                    };
                    return Err(e);
                }
            };

            self.state = SessionState::Responded(response.status);
            match response.status {
                ResponseStatus::Pending => {
                    debug!(topic = %self.topic, id, "wallet reports pending");
                    self.state = SessionState::AwaitingResponse(service_type.clone());
                }
                ResponseStatus::Approved => {
                    debug!(topic = %self.topic, id, service = %service_type, "approved");
                    return Ok(response);
                }
                ResponseStatus::Declined => {
                    let reason = response
                        .reason
                        .unwrap_or_else(|| format!("{} declined", service_type));
                    info!(topic = %self.topic, id, reason = %reason, "declined");
                    return Err(FclError::Declined(reason));
                }
            }
        }
    }
}

/// A request id unique to one authz request for `temp_id`.
fn authz_request_id(temp_id: &str) -> String {
    format!("{}#{}", temp_id, uuid::Uuid::new_v4())
}
