//! Transaction construction via the builder pattern.
//!
//! [`TransactionBuilder`] collects the body fields and produces an
//! unsigned [`SignedTransaction`]. Signatures are attached afterwards, in
//! payload-then-envelope order, by the assembler or by tests.

use super::types::{ProposalKey, SignedTransaction, TransactionBody};
use crate::config::DEFAULT_COMPUTE_LIMIT;
use crate::error::{FclError, Result};
use crate::types::Address;

/// Fluent builder for [`SignedTransaction`].
///
/// ```rust
/// use fcl_protocol::transaction::{ProposalKey, TransactionBuilder};
/// use fcl_protocol::types::Address;
///
/// let payer = Address::parse("0x02").unwrap();
/// let tx = TransactionBuilder::new("transaction { execute {} }")
///     .reference_block("0a".repeat(32))
///     .proposal_key(ProposalKey { address: payer, key_index: 0, sequence_number: 7 })
///     .payer(payer)
///     .build()
///     .unwrap();
/// assert!(tx.payload_signatures().is_empty());
/// ```
pub struct TransactionBuilder {
    script: String,
    arguments: Vec<serde_json::Value>,
    reference_block_id: Option<String>,
    compute_limit: u64,
    proposal_key: Option<ProposalKey>,
    payer: Option<Address>,
    authorizers: Vec<Address>,
}

impl TransactionBuilder {
    /// Starts a transaction running `script` with the default compute limit.
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            arguments: Vec::new(),
            reference_block_id: None,
            compute_limit: DEFAULT_COMPUTE_LIMIT,
            proposal_key: None,
            payer: None,
            authorizers: Vec::new(),
        }
    }

    /// Appends an argument. Call order is argument order.
    pub fn argument(mut self, value: serde_json::Value) -> Self {
        self.arguments.push(value);
        self
    }

    pub fn reference_block(mut self, block_id: impl Into<String>) -> Self {
        self.reference_block_id = Some(block_id.into());
        self
    }

    pub fn compute_limit(mut self, compute_limit: u64) -> Self {
        self.compute_limit = compute_limit;
        self
    }

    pub fn proposal_key(mut self, key: ProposalKey) -> Self {
        self.proposal_key = Some(key);
        self
    }

    pub fn payer(mut self, payer: Address) -> Self {
        self.payer = Some(payer);
        self
    }

    /// Appends an authorizer unless it is already listed.
    pub fn authorizer(mut self, address: Address) -> Self {
        if !self.authorizers.contains(&address) {
            self.authorizers.push(address);
        }
        self
    }

    /// Produces the unsigned transaction.
    ///
    /// Fails with `EmptyScript`, `InvalidProposer`, `MissingPayer`, or
    /// `MissingReferenceBlock` when the corresponding field is unset.
    pub fn build(self) -> Result<SignedTransaction> {
        if self.script.trim().is_empty() {
            return Err(FclError::EmptyScript);
        }
        let proposal_key = self
            .proposal_key
            .ok_or_else(|| FclError::InvalidProposer("no proposal key".to_string()))?;
        let payer = self.payer.ok_or(FclError::MissingPayer)?;
        let reference_block_id = self
            .reference_block_id
            .filter(|id| !id.is_empty())
            .ok_or(FclError::MissingReferenceBlock)?;

        Ok(SignedTransaction {
            body: TransactionBody {
                script: self.script,
                arguments: self.arguments,
                reference_block_id,
                compute_limit: self.compute_limit,
                proposal_key,
                payer,
                authorizers: self.authorizers,
            },
            payload_signatures: Vec::new(),
            envelope_signatures: Vec::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
