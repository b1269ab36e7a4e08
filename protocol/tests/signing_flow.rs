//! End-to-end signing flows with local signers.
//!
//! Each test seeds an interaction, drives it through the composer or the
//! assembler against in-memory collaborators, and checks the resulting
//! signatures with real Ed25519 keys.

mod common;

use std::sync::Arc;

use common::{addr, FakeLedger, FakeSubmitter, KeyRing, BLOCK_ID};
use fcl_protocol::config::EngineConfig;
use fcl_protocol::interaction::{Interaction, SignableAccount, SignerSets};
use fcl_protocol::transaction::{assemble, build_voucher, Voucher};
use fcl_protocol::types::Argument;
use fcl_protocol::{ComposeState, FclError, TransactionComposer};

fn key(s: &str) -> SignableAccount {
    SignableAccount::for_key(addr(s), 0)
}

fn transfer() -> Interaction {
    Interaction::transaction(
        "transaction(amount: UFix64, to: Address) { execute {} }",
        &EngineConfig::default(),
    )
    .with_argument(Argument::typed("UFix64", "12.5"))
    .with_argument(Argument::typed("Address", "0x0000000000000c0c"))
}

// ---------------------------------------------------------------------------
// Single account in every role
// ---------------------------------------------------------------------------

#[tokio::test]
async fn single_account_proposer_payer_authorizer_signs_envelope_only() {
    let keys = Arc::new(KeyRing::new(&[addr("0x0a")]));
    let ledger = Arc::new(FakeLedger::new(3));
    let submitter = Arc::new(FakeSubmitter::default());

    let mut ix = transfer();
    ix.set_proposer(key("0x0a"));
    ix.set_payer(key("0x0a"));
    ix.add_authorizer(key("0x0a"));

    let sets = SignerSets::resolve(&ix);
    assert!(sets.inside.is_empty());
    assert_eq!(sets.outside, vec!["0x000000000000000a-0".to_string()]);

    let mut composer = TransactionComposer::new(ix, ledger, submitter.clone()).with_signer(keys.clone());
    composer.run().await.unwrap();
    assert_eq!(composer.state(), ComposeState::Submitted);

    let submitted = submitter.submitted.lock();
    let tx = &submitted[0];
    assert!(tx.payload_signatures().is_empty());
    assert_eq!(tx.envelope_signatures().len(), 1);
    let envelope = tx.envelope_message().unwrap();
    assert!(keys.verify(&addr("0x0a"), &envelope, &tx.envelope_signatures()[0].signature));
}

// ---------------------------------------------------------------------------
// Three parties
// ---------------------------------------------------------------------------

#[tokio::test]
async fn three_party_assembly_waits_for_every_signer() {
    let (a, b, c) = (addr("0x0a"), addr("0x0b"), addr("0x0c"));
    let keys = KeyRing::new(&[a, b, c]);
    let ledger = FakeLedger::new(8);

    let mut ix = transfer().with_reference_block(BLOCK_ID);
    let id_a = ix.set_proposer(key("0x0a"));
    let id_b = ix.set_payer(key("0x0b"));
    ix.add_authorizer(key("0x0a"));
    let id_c = ix.add_authorizer(key("0x0c"));

    let sets = SignerSets::resolve(&ix);
    assert_eq!(sets.inside, vec![id_a.clone(), id_c.clone()]);
    assert_eq!(sets.outside, vec![id_b.clone()]);

    // A signs the payload; C and B have not signed yet.
    fcl_protocol::interaction::resolve_sequence_number(&mut ix, &ledger)
        .await
        .unwrap();
    let payload = build_voucher(&ix).unwrap().payload_message().unwrap();
    ix.apply_signature(&id_a, &keys.sign_hex(&a, &payload)).unwrap();

    match assemble(&mut ix, &ledger).await {
        Err(FclError::IncompleteSignatures { missing }) => {
            assert_eq!(missing, vec![id_c.clone(), id_b.clone()])
        }
        other => panic!("expected IncompleteSignatures, got {:?}", other.map(|_| ())),
    }

    ix.apply_signature(&id_c, &keys.sign_hex(&c, &payload)).unwrap();
    let envelope = build_voucher(&ix).unwrap().envelope_message().unwrap();
    ix.apply_signature(&id_b, &keys.sign_hex(&b, &envelope)).unwrap();

    let tx = assemble(&mut ix, &ledger).await.unwrap();
    assert_eq!(tx.body.proposal_key.sequence_number, 8);
    assert_eq!(tx.body.authorizers, vec![a, c]);
    assert_eq!(tx.payload_message().unwrap(), payload);
    assert_eq!(tx.envelope_message().unwrap(), envelope);
    for sig in tx.payload_signatures() {
        assert!(keys.verify(&sig.address, &payload, &sig.signature));
    }
    assert!(keys.verify(&b, &envelope, &tx.envelope_signatures()[0].signature));
    // The sequence number was read once and then cached.
    assert_eq!(ledger.reads(), 1);
}

#[tokio::test]
async fn composer_signs_three_parties_locally() {
    let (a, b, c) = (addr("0x0a"), addr("0x0b"), addr("0x0c"));
    let keys = Arc::new(KeyRing::new(&[a, b, c]));
    let ledger = Arc::new(FakeLedger::new(21));
    let submitter = Arc::new(FakeSubmitter::default());

    let mut ix = transfer();
    ix.set_proposer(key("0x0a"));
    ix.set_payer(key("0x0b"));
    ix.add_authorizer(key("0x0a"));
    ix.add_authorizer(key("0x0c"));

    let mut composer =
        TransactionComposer::new(ix, ledger.clone(), submitter.clone()).with_signer(keys.clone());
    let outcome = composer.run().await.unwrap();
    assert_eq!(outcome.transaction_id.0, "tx-1");
    assert!(outcome.seal.is_complete);
    assert_eq!(ledger.reads(), 1);

    let submitted = submitter.submitted.lock();
    let tx = &submitted[0];
    assert_eq!(tx.body.reference_block_id, BLOCK_ID);
    let payload = tx.payload_message().unwrap();
    assert_eq!(tx.payload_signatures().len(), 2);
    for sig in tx.payload_signatures() {
        assert!(keys.verify(&sig.address, &payload, &sig.signature));
    }
    let envelope = tx.envelope_message().unwrap();
    assert!(keys.verify(&b, &envelope, &tx.envelope_signatures()[0].signature));
}

// ---------------------------------------------------------------------------
// Ledger failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_failure_is_reported_before_missing_signatures() {
    let ledger = FakeLedger::failing();
    let mut ix = transfer().with_reference_block(BLOCK_ID);
    ix.set_proposer(key("0x0a"));
    ix.set_payer(key("0x0b"));

    match assemble(&mut ix, &ledger).await {
        Err(FclError::FetchAccountFailure { address, reason }) => {
            assert_eq!(address, "0x000000000000000a");
            assert!(reason.contains("unreachable"));
        }
        other => panic!("expected FetchAccountFailure, got {:?}", other.map(|_| ())),
    }
    assert!(ix.account("0x000000000000000a-0").unwrap().sequence_number.is_none());
}

#[tokio::test]
async fn fetch_failure_fails_the_composition() {
    let keys = Arc::new(KeyRing::new(&[addr("0x0a")]));
    let submitter = Arc::new(FakeSubmitter::default());
    let mut ix = transfer();
    ix.set_proposer(key("0x0a"));
    ix.set_payer(key("0x0a"));

    let mut composer = TransactionComposer::new(ix, Arc::new(FakeLedger::failing()), submitter.clone())
        .with_signer(keys);
    let err = composer.run().await.unwrap_err();
    assert!(matches!(err, FclError::FetchAccountFailure { .. }));
    assert_eq!(composer.state(), ComposeState::Failed);
    assert!(submitter.submitted.lock().is_empty());
}

// ---------------------------------------------------------------------------
// Other properties
// ---------------------------------------------------------------------------

#[tokio::test]
async fn secondary_address_cannot_be_submitted() {
    let evm = addr("0x000000000000000000000002b87c966bc00bc2c4");
    let keys = Arc::new(KeyRing::new(&[addr("0x0a"), evm]));
    let mut ix = transfer();
    ix.set_proposer(key("0x0a"));
    ix.set_payer(SignableAccount::for_key(evm, 0));

    let mut composer = TransactionComposer::new(
        ix,
        Arc::new(FakeLedger::new(1)),
        Arc::new(FakeSubmitter::default()),
    )
    .with_signer(keys);
    assert!(matches!(
        composer.run().await,
        Err(FclError::InvalidAddress(_))
    ));
    assert_eq!(composer.state(), ComposeState::Failed);
}

#[test]
fn voucher_wire_form_reproduces_signing_messages() {
    let mut ix = transfer().with_reference_block(BLOCK_ID);
    let a = ix.set_proposer(key("0x0a").with_sequence_number(4));
    ix.set_payer(key("0x0b"));
    ix.add_authorizer(key("0x0a"));
    ix.apply_signature(&a, "00ff").unwrap();

    let voucher = build_voucher(&ix).unwrap();
    let wire = serde_json::to_string(&voucher).unwrap();
    let received: Voucher = serde_json::from_str(&wire).unwrap();
    assert_eq!(received, voucher);
    assert_eq!(received.payload_message().unwrap(), voucher.payload_message().unwrap());
    assert_eq!(received.envelope_message().unwrap(), voucher.envelope_message().unwrap());
    assert_eq!(build_voucher(&ix).unwrap(), voucher);
}
