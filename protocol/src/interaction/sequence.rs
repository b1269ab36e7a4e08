//! Proposal-key sequence number resolution.

use tracing::{debug, warn};

use super::model::Interaction;
use crate::error::{FclError, Result};
use crate::ledger::LedgerReader;

/// Ensures the proposer account carries a sequence number.
///
/// A cached value is returned as-is. Otherwise the proposer's account is
/// read from the ledger and the sequence number of its `key_index` key is
/// cached on the account. Any read failure, including a missing or revoked
/// key, is `FetchAccountFailure`; the sequence number is never defaulted.
pub async fn resolve_sequence_number(
    ix: &mut Interaction,
    ledger: &dyn LedgerReader,
) -> Result<u64> {
    let temp_id = ix
        .proposer()
        .ok_or_else(|| FclError::InvalidProposer("no proposer set".to_string()))?
        .to_string();

    let account = ix
        .account(&temp_id)
        .ok_or_else(|| FclError::InvalidProposer(format!("unknown proposer {}", temp_id)))?;

    if let Some(seq) = account.sequence_number {
        return Ok(seq);
    }

    let address = account
        .address
        .ok_or_else(|| FclError::InvalidProposer(format!("proposer {} has no address", temp_id)))?;
    let key_index = account.key_index.ok_or_else(|| {
        FclError::InvalidProposer(format!("proposer {} has no key index", temp_id))
    })?;

    debug!(address = %address, key_index, "fetching proposer sequence number");
    let ledger_account = ledger.get_account(&address).await.map_err(|e| {
        warn!(address = %address, error = %e, "proposer account fetch failed");
        FclError::FetchAccountFailure {
            address: address.hex(),
            reason: e.to_string(),
        }
    })?;

    let key = ledger_account
        .key(key_index)
        .ok_or_else(|| FclError::FetchAccountFailure {
            address: address.hex(),
            reason: format!("key index {} not found", key_index),
        })?;
    if key.revoked {
        warn!(address = %address, key_index, "proposal key is revoked");
        return Err(FclError::FetchAccountFailure {
            address: address.hex(),
            reason: format!("key index {} is revoked", key_index),
        });
    }
    let seq = key.sequence_number;

    if let Some(account) = ix.account_mut(&temp_id) {
        account.sequence_number = Some(seq);
    }
    Ok(seq)
}
