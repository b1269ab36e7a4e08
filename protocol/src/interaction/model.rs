//! The mutable state of one pending transaction.
//!
//! An [`Interaction`] is created per transaction intent and owned by the
//! flow that created it. UI input seeds the script and arguments, the
//! negotiation layer adds accounts, roles, signatures, and sequence
//! numbers, and the resolver reads it. It is dropped once the transaction
//! is submitted or the user cancels.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::account::{SignableAccount, SignatureMerge};
use super::role::Role;
use crate::config::EngineConfig;
use crate::error::{FclError, Result};
use crate::types::{Address, Argument};

// ---------------------------------------------------------------------------
// Tag / Status
// ---------------------------------------------------------------------------

/// What the interaction asks the ledger to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionTag {
    #[default]
    Unknown,
    Script,
    Transaction,
    GetAccount,
    GetTransactionStatus,
    GetLatestBlock,
    Ping,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionStatus {
    #[default]
    Ok,
    Bad,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Script-level fields of the interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub cadence: String,
    /// Hex id of the reference block. Resolved from the ledger when unset.
    pub ref_block_id: Option<String>,
    pub compute_limit: u64,
    /// Argument tempIds in declared order.
    pub argument_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Interaction
// ---------------------------------------------------------------------------

/// Session state for one pending transaction.
///
/// `authorizations` keeps one entry per `add_authorizer` call, duplicates
/// included. Deduplication happens only when addresses are listed.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    pub tag: InteractionTag,
    pub status: InteractionStatus,
    pub reason: Option<String>,
    pub message: Message,
    accounts: BTreeMap<String, SignableAccount>,
    proposer: Option<String>,
    payer: Option<String>,
    authorizations: Vec<String>,
    arguments: HashMap<String, Argument>,
}

impl Interaction {
    /// An empty, untagged interaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// A transaction interaction seeded with `cadence` and the configured
    /// compute limit.
    pub fn transaction(cadence: impl Into<String>, config: &EngineConfig) -> Self {
        let mut ix = Self::new();
        ix.tag = InteractionTag::Transaction;
        ix.message.cadence = cadence.into();
        ix.message.compute_limit = config.default_compute_limit;
        ix
    }

    /// A read-only script interaction.
    pub fn script(cadence: impl Into<String>) -> Self {
        let mut ix = Self::new();
        ix.tag = InteractionTag::Script;
        ix.message.cadence = cadence.into();
        ix
    }

    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.push_argument(argument);
        self
    }

    pub fn with_compute_limit(mut self, compute_limit: u64) -> Self {
        self.message.compute_limit = compute_limit;
        self
    }

    pub fn with_reference_block(mut self, block_id: impl Into<String>) -> Self {
        self.message.ref_block_id = Some(block_id.into());
        self
    }

    /// Appends an argument at the end of the declared order.
    pub fn push_argument(&mut self, argument: Argument) {
        self.message.argument_ids.push(argument.temp_id.clone());
        self.arguments.insert(argument.temp_id.clone(), argument);
    }

    /// Arguments in declared order.
    pub fn ordered_arguments(&self) -> Vec<&Argument> {
        self.message
            .argument_ids
            .iter()
            .filter_map(|id| self.arguments.get(id))
            .collect()
    }

    // -- accounts -----------------------------------------------------------

    /// Inserts `account`, merging with an existing entry of the same tempId.
    /// Returns the tempId.
    pub fn upsert_account(&mut self, account: SignableAccount) -> String {
        let temp_id = account.temp_id.clone();
        match self.accounts.get_mut(&temp_id) {
            Some(existing) => existing.absorb(account),
            None => {
                self.accounts.insert(temp_id.clone(), account);
            }
        }
        temp_id
    }

    /// Designates the proposer. A later call replaces the slot and clears
    /// the proposer flag of the account it replaced.
    pub fn set_proposer(&mut self, account: SignableAccount) -> String {
        let temp_id = self.upsert_account(account.with_role(Role::PROPOSER));
        if let Some(previous) = self.proposer.replace(temp_id.clone()) {
            if previous != temp_id {
                if let Some(old) = self.accounts.get_mut(&previous) {
                    old.role.proposer = false;
                }
                debug!(temp_id = %temp_id, replaced = %previous, "proposer replaced");
                return temp_id;
            }
        }
        debug!(temp_id = %temp_id, "proposer set");
        temp_id
    }

    /// Designates the payer. Same replacement rule as the proposer.
    pub fn set_payer(&mut self, account: SignableAccount) -> String {
        let temp_id = self.upsert_account(account.with_role(Role::PAYER));
        if let Some(previous) = self.payer.replace(temp_id.clone()) {
            if previous != temp_id {
                if let Some(old) = self.accounts.get_mut(&previous) {
                    old.role.payer = false;
                }
                debug!(temp_id = %temp_id, replaced = %previous, "payer replaced");
                return temp_id;
            }
        }
        debug!(temp_id = %temp_id, "payer set");
        temp_id
    }

    /// Appends an authorizer slot.
    pub fn add_authorizer(&mut self, account: SignableAccount) -> String {
        let temp_id = self.upsert_account(account.with_role(Role::AUTHORIZER));
        debug!(temp_id = %temp_id, "authorizer added");
        self.authorizations.push(temp_id.clone());
        temp_id
    }

    pub fn account(&self, temp_id: &str) -> Option<&SignableAccount> {
        self.accounts.get(temp_id)
    }

    pub fn account_mut(&mut self, temp_id: &str) -> Option<&mut SignableAccount> {
        self.accounts.get_mut(temp_id)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &SignableAccount> {
        self.accounts.values()
    }

    pub fn proposer(&self) -> Option<&str> {
        self.proposer.as_deref()
    }

    pub fn payer(&self) -> Option<&str> {
        self.payer.as_deref()
    }

    pub fn authorizations(&self) -> &[String] {
        &self.authorizations
    }

    /// Folds a signature into the account `temp_id`.
    ///
    /// Already-signed slots keep their signature; see
    /// [`SignableAccount::apply_signature`].
    pub fn apply_signature(&mut self, temp_id: &str, signature: &str) -> Result<SignatureMerge> {
        let account = self.accounts.get_mut(temp_id).ok_or_else(|| {
            FclError::InvalidSession(format!("no account {} in interaction", temp_id))
        })?;
        account.apply_signature(signature)
    }

    /// Authorizer addresses, deduplicated in first-seen order.
    pub fn authorizer_addresses(&self) -> Result<Vec<Address>> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(self.authorizations.len());
        for temp_id in &self.authorizations {
            let address = self
                .accounts
                .get(temp_id)
                .and_then(|a| a.address)
                .ok_or_else(|| {
                    FclError::InvalidAddress(format!("authorizer {} has no address", temp_id))
                })?;
            if seen.insert(address) {
                out.push(address);
            }
        }
        Ok(out)
    }

    /// Fails with `EmptyScript` for a transaction without a script.
    pub fn ensure_script(&self) -> Result<()> {
        if self.tag == InteractionTag::Transaction && self.message.cadence.trim().is_empty() {
            return Err(FclError::EmptyScript);
        }
        Ok(())
    }

    /// Marks the interaction bad with a reason.
    pub fn mark_bad(&mut self, reason: impl Into<String>) {
        self.status = InteractionStatus::Bad;
        self.reason = Some(reason.into());
    }

    pub fn is_ok(&self) -> bool {
        self.status == InteractionStatus::Ok
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
