//! Transaction composition flow.
//!
//! A [`TransactionComposer`] owns one [`Interaction`] from seeding to
//! submission and drives it through:
//!
//! ```text
//! Composing ──► AwaitingSignatures ──► Assembled ──► Submitted
//!     │                 │                  │
//!     └──► Declined ◄───┤                  │
//!     └──► Failed   ◄───┴──────────────────┘
//! ```
//!
//! Payload signatures are collected before the envelope signature. Local
//! signers are asked concurrently; remote signers are asked one at a time
//! over the wallet session. Dropping the composer cancels the flow and
//! discards the interaction.

use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{FclError, Result};
use crate::interaction::{resolve_sequence_number, Interaction, SignerSets};
use crate::ledger::{LedgerReader, LedgerSubmitter, SealResult, TransactionId};
use crate::service::NegotiationSession;
use crate::signer::SigningCapability;
use crate::transaction::voucher::signing_key;
use crate::transaction::{assemble_resolved, build_voucher, SignedTransaction};

// ---------------------------------------------------------------------------
// ComposeState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComposeState {
    Composing,
    AwaitingSignatures,
    Assembled,
    Submitted,
    Declined,
    Failed,
}

impl ComposeState {
    /// Whether the flow may move from `self` to `next`.
    pub fn can_transition_to(self, next: ComposeState) -> bool {
        use ComposeState::*;
        matches!(
            (self, next),
            (Composing, AwaitingSignatures)
                | (AwaitingSignatures, Assembled)
                | (Assembled, Submitted)
                | (Composing, Declined)
                | (Composing, Failed)
                | (AwaitingSignatures, Declined)
                | (AwaitingSignatures, Failed)
                | (Assembled, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Submitted | Self::Declined | Self::Failed)
    }
}

impl fmt::Display for ComposeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Composing => "composing",
            Self::AwaitingSignatures => "awaiting-signatures",
            Self::Assembled => "assembled",
            Self::Submitted => "submitted",
            Self::Declined => "declined",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// What a completed flow hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeOutcome {
    pub transaction_id: TransactionId,
    pub seal: SealResult,
}

// ---------------------------------------------------------------------------
// TransactionComposer
// ---------------------------------------------------------------------------

pub struct TransactionComposer {
    ix: Interaction,
    state: ComposeState,
    ledger: Arc<dyn LedgerReader>,
    submitter: Arc<dyn LedgerSubmitter>,
    signer: Option<Arc<dyn SigningCapability>>,
    session: Option<NegotiationSession>,
}

impl TransactionComposer {
    pub fn new(
        ix: Interaction,
        ledger: Arc<dyn LedgerReader>,
        submitter: Arc<dyn LedgerSubmitter>,
    ) -> Self {
        Self {
            ix,
            state: ComposeState::Composing,
            ledger,
            submitter,
            signer: None,
            session: None,
        }
    }

    /// Signs for accounts that have no remote `authz` service.
    pub fn with_signer(mut self, signer: Arc<dyn SigningCapability>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Paired wallet session used for pre-authorization and remote signers.
    pub fn with_session(mut self, session: NegotiationSession) -> Self {
        self.session = Some(session);
        self
    }

    pub fn state(&self) -> ComposeState {
        self.state
    }

    pub fn interaction(&self) -> &Interaction {
        &self.ix
    }

    /// Mutable access while the flow is still composing.
    pub fn interaction_mut(&mut self) -> Result<&mut Interaction> {
        if self.state != ComposeState::Composing {
            return Err(FclError::InvalidTransition {
                from: self.state.to_string(),
                to: ComposeState::Composing.to_string(),
            });
        }
        Ok(&mut self.ix)
    }

    pub fn into_interaction(self) -> Interaction {
        self.ix
    }

    // -- steps --------------------------------------------------------------

    /// Asks the wallet session who proposes, pays, and authorizes.
    pub async fn pre_authorize(&mut self) -> Result<()> {
        self.require(ComposeState::Composing, ComposeState::Composing)?;
        let result = match self.session.as_mut() {
            Some(session) => session.pre_authorize(&mut self.ix).await.map(|_| ()),
            None => Err(FclError::InvalidSession(
                "pre-authorization needs a wallet session".to_string(),
            )),
        };
        result.map_err(|e| self.fail(e))
    }

    /// Resolves the reference block and the proposer's sequence number.
    pub async fn prepare(&mut self) -> Result<()> {
        self.require(ComposeState::Composing, ComposeState::AwaitingSignatures)?;
        match self.resolve_context().await {
            Ok(()) => self.transition(ComposeState::AwaitingSignatures),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Collects every outstanding payload signature.
    pub async fn collect_payload_signatures(&mut self) -> Result<()> {
        self.require(ComposeState::AwaitingSignatures, ComposeState::Assembled)?;
        let result = self.sign_inside().await;
        result.map_err(|e| self.fail(e))
    }

    /// Collects the payer's envelope signature. Every payload signature
    /// must already be present.
    pub async fn collect_envelope_signature(&mut self) -> Result<()> {
        self.require(ComposeState::AwaitingSignatures, ComposeState::Assembled)?;
        let result = self.sign_outside().await;
        result.map_err(|e| self.fail(e))
    }

    pub fn assemble(&mut self) -> Result<SignedTransaction> {
        self.require(ComposeState::AwaitingSignatures, ComposeState::Assembled)?;
        match assemble_resolved(&self.ix) {
            Ok(tx) => {
                self.transition(ComposeState::Assembled)?;
                Ok(tx)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Submits `tx` and waits for the ledger to seal it.
    pub async fn submit(&mut self, tx: &SignedTransaction) -> Result<ComposeOutcome> {
        self.require(ComposeState::Assembled, ComposeState::Submitted)?;
        let result = self.submit_and_seal(tx).await;
        match result {
            Ok(outcome) => {
                self.transition(ComposeState::Submitted)?;
                Ok(outcome)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Runs every step from `Composing` to `Submitted`.
    pub async fn run(&mut self) -> Result<ComposeOutcome> {
        self.prepare().await?;
        self.collect_payload_signatures().await?;
        self.collect_envelope_signature().await?;
        let tx = self.assemble()?;
        self.submit(&tx).await
    }

    // -- internals ----------------------------------------------------------

    fn require(&self, expected: ComposeState, next: ComposeState) -> Result<()> {
        if self.state != expected {
            return Err(FclError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: ComposeState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(FclError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        debug!(from = %self.state, to = %next, "compose state");
        self.state = next;
        Ok(())
    }

    /// Moves to `Declined` or `Failed` and returns `err` unchanged.
    fn fail(&mut self, err: FclError) -> FclError {
        let next = match err {
            FclError::Declined(_) => ComposeState::Declined,
            _ => ComposeState::Failed,
        };
        if self.state.can_transition_to(next) {
            warn!(from = %self.state, to = %next, error = %err, "composition stopped");
            self.state = next;
            self.ix.mark_bad(err.to_string());
        }
        err
    }

    async fn resolve_context(&mut self) -> Result<()> {
        self.ix.ensure_script()?;
        let has_block = self
            .ix
            .message
            .ref_block_id
            .as_deref()
            .map(|id| !id.is_empty())
            .unwrap_or(false);
        if !has_block {
            let block_id = self.ledger.latest_block_id().await?;
            debug!(block_id = %block_id, "reference block resolved");
            self.ix.message.ref_block_id = Some(block_id);
        }
        resolve_sequence_number(&mut self.ix, self.ledger.as_ref()).await?;
        Ok(())
    }

    async fn sign_inside(&mut self) -> Result<()> {
        let message = build_voucher(&self.ix)?.payload_message()?;
        let inside = SignerSets::resolve(&self.ix).inside;
        self.sign_accounts(&inside, &message).await
    }

    async fn sign_outside(&mut self) -> Result<()> {
        let sets = SignerSets::resolve(&self.ix);
        let missing: Vec<String> = sets
            .inside
            .iter()
            .filter(|id| !self.ix.account(id).map(|a| a.is_signed()).unwrap_or(false))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(FclError::IncompleteSignatures { missing });
        }
        if sets.outside.is_empty() {
            return Err(FclError::MissingPayer);
        }
        let message = build_voucher(&self.ix)?.envelope_message()?;
        self.sign_accounts(&sets.outside, &message).await
    }

    /// Signs `message` for every unsigned account in `temp_ids`.
    async fn sign_accounts(&mut self, temp_ids: &[String], message: &[u8]) -> Result<()> {
        let mut local = Vec::new();
        let mut remote = Vec::new();
        for temp_id in temp_ids {
            let account = self.ix.account(temp_id).ok_or_else(|| {
                FclError::InvalidSession(format!("no account {} in interaction", temp_id))
            })?;
            if account.is_signed() {
                continue;
            }
            if account.authz.is_some() {
                remote.push(temp_id.clone());
            } else {
                let (address, key_index) = signing_key(account)?;
                local.push((temp_id.clone(), address, key_index));
            }
        }

        if !local.is_empty() {
            let signer = self
                .signer
                .clone()
                .ok_or_else(|| FclError::Signing("no local signing capability".to_string()))?;
            let results = join_all(
                local
                    .iter()
                    .map(|(_, address, key_index)| signer.sign(address, *key_index, message)),
            )
            .await;
            for ((temp_id, _, _), result) in local.iter().zip(results) {
                let signature = result?;
                self.ix.apply_signature(temp_id, &hex::encode(signature))?;
                debug!(temp_id = %temp_id, "signed locally");
            }
        }

        if !remote.is_empty() {
            let session = self.session.as_mut().ok_or_else(|| {
                FclError::InvalidSession("remote signer without a wallet session".to_string())
            })?;
            for temp_id in &remote {
                session.authorize(&mut self.ix, temp_id, message).await?;
            }
        }
        Ok(())
    }

    async fn submit_and_seal(&self, tx: &SignedTransaction) -> Result<ComposeOutcome> {
        let transaction_id = self.submitter.submit(tx).await?;
        info!(id = %transaction_id, "transaction submitted");
        let seal = self.submitter.await_seal(&transaction_id).await?;
        match &seal.error_message {
            Some(msg) => warn!(id = %transaction_id, error = %msg, "transaction sealed with error"),
            None => info!(id = %transaction_id, complete = seal.is_complete, "transaction sealed"),
        }
        Ok(ComposeOutcome {
            transaction_id,
            seal,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
