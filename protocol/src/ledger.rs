//! Ledger collaborators.
//!
//! The engine reads accounts and the latest block through
//! [`LedgerReader`] and hands finished transactions to
//! [`LedgerSubmitter`]. Implementations own transport, timeouts, and any
//! retry policy. The engine calls each method at most once per need.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::transaction::SignedTransaction;
use crate::types::Address;

/// One key registered on a ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountKey {
    pub index: u32,
    pub sequence_number: u64,
    /// Hex-encoded public key.
    pub public_key: String,
    #[serde(default)]
    pub revoked: bool,
}

/// The parts of a ledger account the engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAccount {
    pub address: Address,
    pub keys: Vec<AccountKey>,
}

impl LedgerAccount {
    pub fn key(&self, index: u32) -> Option<&AccountKey> {
        self.keys.iter().find(|k| k.index == index)
    }
}

/// Identifier returned by the ledger on submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Final state of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealResult {
    pub is_complete: bool,
    pub error_message: Option<String>,
}

/// Read access to the ledger.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Fetches `address` with its keys and their sequence numbers.
    async fn get_account(&self, address: &Address) -> Result<LedgerAccount>;

    /// Hex id of the latest sealed block.
    async fn latest_block_id(&self) -> Result<String>;
}

/// Write access to the ledger.
#[async_trait]
pub trait LedgerSubmitter: Send + Sync {
    async fn submit(&self, transaction: &SignedTransaction) -> Result<TransactionId>;

    /// Resolves once the ledger has sealed `id`.
    async fn await_seal(&self, id: &TransactionId) -> Result<SealResult>;
}
