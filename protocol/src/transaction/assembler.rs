//! Conversion of a fully signed interaction into a submittable transaction.

use tracing::{debug, info};

use super::builder::TransactionBuilder;
use super::types::SignedTransaction;
use super::voucher::{collected_signatures, proposal_key};
use crate::error::{FclError, Result};
use crate::interaction::{resolve_sequence_number, Interaction, SignerSets};
use crate::ledger::LedgerReader;

/// Resolves the proposer's sequence number, then assembles.
///
/// Errors surface in this order: `InvalidProposer` or
/// `FetchAccountFailure`, `MissingPayer`, `MissingReferenceBlock`,
/// `IncompleteSignatures`.
pub async fn assemble(
    ix: &mut Interaction,
    ledger: &dyn LedgerReader,
) -> Result<SignedTransaction> {
    resolve_sequence_number(ix, ledger).await?;
    assemble_resolved(ix)
}

/// Assembles an interaction whose sequence number is already known.
pub fn assemble_resolved(ix: &Interaction) -> Result<SignedTransaction> {
    ix.ensure_script()?;
    let proposal_key = proposal_key(ix)?;

    let payer_id = ix.payer().ok_or(FclError::MissingPayer)?;
    let payer = ix
        .account(payer_id)
        .and_then(|a| a.address)
        .ok_or_else(|| FclError::InvalidAddress(format!("payer {} has no address", payer_id)))?;

    let reference_block = ix
        .message
        .ref_block_id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or(FclError::MissingReferenceBlock)?;

    let sets = SignerSets::resolve(ix);
    let missing = sets.unsigned(ix);
    if !missing.is_empty() {
        debug!(missing = ?missing, "signers still outstanding");
        return Err(FclError::IncompleteSignatures { missing });
    }

    let mut builder = TransactionBuilder::new(ix.message.cadence.clone())
        .reference_block(reference_block)
        .compute_limit(ix.message.compute_limit)
        .proposal_key(proposal_key)
        .payer(payer);
    for argument in ix.ordered_arguments() {
        builder = builder.argument(argument.value.clone());
    }
    for authorizer in ix.authorizer_addresses()? {
        builder = builder.authorizer(authorizer);
    }
    let mut tx = builder.build()?;

    for sig in collected_signatures(ix, &sets.inside)? {
        tx.add_payload_signature(sig)?;
    }
    for sig in collected_signatures(ix, &sets.outside)? {
        tx.add_envelope_signature(sig);
    }

    info!(
        proposer = %tx.body.proposal_key.address,
        payer = %tx.body.payer,
        payload_sigs = tx.payload_signatures().len(),
        envelope_sigs = tx.envelope_signatures().len(),
        "transaction assembled"
    );
    Ok(tx)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::interaction::SignableAccount;
    use crate::ledger::{AccountKey, LedgerAccount};
    use crate::types::{Address, Argument};
    use async_trait::async_trait;

    struct OneKeyLedger(u64);

    #[async_trait]
    impl LedgerReader for OneKeyLedger {
        async fn get_account(&self, address: &Address) -> Result<LedgerAccount> {
            Ok(LedgerAccount {
                address: *address,
                keys: vec![AccountKey {
                    index: 0,
                    sequence_number: self.0,
                    public_key: "00".into(),
                    revoked: false,
                }],
            })
        }

        async fn latest_block_id(&self) -> Result<String> {
            Ok("0b".repeat(32))
        }
    }

    fn key(addr: &str) -> SignableAccount {
        SignableAccount::for_key(Address::parse(addr).unwrap(), 0)
    }

    fn base() -> Interaction {
        Interaction::transaction("transaction { execute {} }", &EngineConfig::default())
            .with_reference_block("0a".repeat(32))
            .with_argument(Argument::typed("UFix64", "1.0"))
    }

    // One account is proposer, payer, and authorizer.
    #[tokio::test]
    async fn single_account_signs_envelope_only() {
        let mut ix = base();
        let a = ix.set_proposer(key("0x0a"));
        ix.set_payer(key("0x0a"));
        ix.add_authorizer(key("0x0a"));

        let sets = SignerSets::resolve(&ix);
        assert!(sets.inside.is_empty());
        assert_eq!(sets.outside, vec![a.clone()]);

        ix.apply_signature(&a, "aa").unwrap();
        let tx = assemble(&mut ix, &OneKeyLedger(5)).await.unwrap();
        assert!(tx.payload_signatures().is_empty());
        assert_eq!(tx.envelope_signatures().len(), 1);
        assert_eq!(tx.body.proposal_key.sequence_number, 5);
        assert_eq!(tx.body.authorizers, vec![Address::parse("0x0a").unwrap()]);
    }

    // A proposes and authorizes, B pays, C authorizes.
    #[tokio::test]
    async fn three_party_transaction() {
        let mut ix = base();
        let a = ix.set_proposer(key("0x0a"));
        let b = ix.set_payer(key("0x0b"));
        ix.add_authorizer(key("0x0a"));
        let c = ix.add_authorizer(key("0x0c"));

        ix.apply_signature(&c, "cc").unwrap();
        ix.apply_signature(&a, "aa").unwrap();
        ix.apply_signature(&b, "bb").unwrap();

        let tx = assemble(&mut ix, &OneKeyLedger(1)).await.unwrap();
        assert_eq!(tx.payload_signatures().len(), 2);
        assert_eq!(tx.envelope_signatures().len(), 1);
        assert_eq!(tx.envelope_signatures()[0].signature, "bb");
        assert_eq!(tx.body.authorizers.len(), 2);
    }

    // The payer has not signed yet.
    #[tokio::test]
    async fn missing_envelope_signature_is_incomplete() {
        let mut ix = base();
        let a = ix.set_proposer(key("0x0a"));
        let b = ix.set_payer(key("0x0b"));
        ix.add_authorizer(key("0x0a"));
        ix.apply_signature(&a, "aa").unwrap();

        match assemble(&mut ix, &OneKeyLedger(1)).await {
            Err(FclError::IncompleteSignatures { missing }) => assert_eq!(missing, vec![b]),
            other => panic!("expected IncompleteSignatures, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn missing_payer_precedes_missing_signatures() {
        let mut ix = base();
        ix.set_proposer(key("0x0a"));
        assert!(matches!(
            assemble(&mut ix, &OneKeyLedger(1)).await,
            Err(FclError::MissingPayer)
        ));
    }

    #[tokio::test]
    async fn missing_proposer_is_invalid_proposer() {
        let mut ix = base();
        ix.set_payer(key("0x0b"));
        assert!(matches!(
            assemble(&mut ix, &OneKeyLedger(1)).await,
            Err(FclError::InvalidProposer(_))
        ));
    }

    #[test]
    fn unresolved_reference_block_is_reported() {
        let mut ix = Interaction::transaction("transaction {}", &EngineConfig::default());
        let a = ix.set_proposer(key("0x0a").with_sequence_number(0));
        ix.set_payer(key("0x0a"));
        ix.apply_signature(&a, "aa").unwrap();
        assert!(matches!(
            assemble_resolved(&ix),
            Err(FclError::MissingReferenceBlock)
        ));
    }

    #[test]
    fn assembled_payload_matches_voucher_payload() {
        let mut ix = base();
        let a = ix.set_proposer(key("0x0a").with_sequence_number(3));
        let b = ix.set_payer(key("0x0b"));
        ix.add_authorizer(key("0x0a"));
        ix.apply_signature(&a, "aa").unwrap();
        ix.apply_signature(&b, "bb").unwrap();

        let voucher = super::super::voucher::build_voucher(&ix).unwrap();
        let tx = assemble_resolved(&ix).unwrap();
        assert_eq!(tx.payload_message().unwrap(), voucher.payload_message().unwrap());
        assert_eq!(tx.envelope_message().unwrap(), voucher.envelope_message().unwrap());
    }
}
