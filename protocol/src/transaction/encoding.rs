//! Canonical signing messages.
//!
//! Every message is a 32-byte domain tag followed by an RLP document:
//!
//! ```text
//! payload  = TX_TAG  ‖ rlp([script, [arg…], refBlock, computeLimit,
//!                          proposer, keyIndex, sequenceNum, payer, [auth…]])
//! envelope = TX_TAG  ‖ rlp([payload_fields, [[signerIndex, keyIndex, sig]…]])
//! user     = USR_TAG ‖ message
//! proof    = AP_TAG  ‖ rlp([appIdentifier, address, nonce])
//! ```
//!
//! Addresses are left-padded to 8 bytes and the reference block to 32.
//! Payload signatures inside the envelope are sorted by signer index, then
//! key index, so the envelope does not depend on arrival order.

use rlp::RlpStream;

use super::types::{TransactionBody, TransactionSignature};
use crate::config::{
    padded_domain_tag, ACCOUNT_PROOF_DOMAIN_TAG, BLOCK_ID_LENGTH, MIN_ACCOUNT_PROOF_NONCE_LENGTH,
    TRANSACTION_DOMAIN_TAG, USER_DOMAIN_TAG,
};
use crate::error::{FclError, Result};
use crate::types::Address;

/// Payload message for `body`.
pub fn payload_message(body: &TransactionBody) -> Result<Vec<u8>> {
    let payload = payload_rlp(body)?;
    Ok(tagged(TRANSACTION_DOMAIN_TAG, &payload))
}

/// Envelope message for `body` covering `payload_signatures`.
pub fn envelope_message(
    body: &TransactionBody,
    payload_signatures: &[TransactionSignature],
) -> Result<Vec<u8>> {
    let payload = payload_rlp(body)?;
    let signers = body.signer_addresses();

    let mut indexed = Vec::with_capacity(payload_signatures.len());
    for sig in payload_signatures {
        let signer_index = signers
            .iter()
            .position(|a| *a == sig.address)
            .ok_or_else(|| FclError::UnexpectedSigner {
                expected: "a transaction signer".to_string(),
                got: sig.address.hex(),
            })?;
        indexed.push((signer_index as u64, sig.key_index, sig.signature_bytes()?));
    }
    indexed.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

    let mut stream = RlpStream::new_list(2);
    stream.append_raw(&payload, 1);
    stream.begin_list(indexed.len());
    for (signer_index, key_index, sig) in &indexed {
        stream.begin_list(3);
        stream.append(signer_index);
        stream.append(key_index);
        stream.append(sig);
    }
    Ok(tagged(TRANSACTION_DOMAIN_TAG, &stream.out()))
}

/// Message signed for an arbitrary user-signature request.
pub fn user_message(message: &[u8]) -> Vec<u8> {
    tagged(USER_DOMAIN_TAG, message)
}

/// Message a wallet signs to prove it controls `address`.
///
/// `nonce_hex` must decode to at least 32 bytes.
pub fn account_proof_message(
    app_identifier: &str,
    address: &Address,
    nonce_hex: &str,
) -> Result<Vec<u8>> {
    let nonce = decode_nonce(nonce_hex)?;
    let mut stream = RlpStream::new_list(3);
    stream.append(&app_identifier.as_bytes().to_vec());
    stream.append(&address.native_bytes()?.to_vec());
    stream.append(&nonce);
    Ok(tagged(ACCOUNT_PROOF_DOMAIN_TAG, &stream.out()))
}

/// Decodes and length-checks an account-proof nonce.
pub fn decode_nonce(nonce_hex: &str) -> Result<Vec<u8>> {
    let nonce = hex::decode(nonce_hex.trim_start_matches("0x"))
        .map_err(|e| FclError::InvalidNonce(e.to_string()))?;
    if nonce.len() < MIN_ACCOUNT_PROOF_NONCE_LENGTH {
        return Err(FclError::InvalidNonce(format!(
            "{} bytes, need at least {}",
            nonce.len(),
            MIN_ACCOUNT_PROOF_NONCE_LENGTH
        )));
    }
    Ok(nonce)
}

fn payload_rlp(body: &TransactionBody) -> Result<Vec<u8>> {
    let mut stream = RlpStream::new_list(9);
    stream.append(&body.script.as_bytes().to_vec());

    stream.begin_list(body.arguments.len());
    for arg in &body.arguments {
        stream.append(&serde_json::to_vec(arg)?);
    }

    stream.append(&reference_block_bytes(&body.reference_block_id)?);
    stream.append(&body.compute_limit);
    stream.append(&body.proposal_key.address.native_bytes()?.to_vec());
    stream.append(&body.proposal_key.key_index);
    stream.append(&body.proposal_key.sequence_number);
    stream.append(&body.payer.native_bytes()?.to_vec());

    stream.begin_list(body.authorizers.len());
    for authorizer in &body.authorizers {
        stream.append(&authorizer.native_bytes()?.to_vec());
    }
    Ok(stream.out().to_vec())
}

fn reference_block_bytes(block_id: &str) -> Result<Vec<u8>> {
    let raw = hex::decode(block_id.trim_start_matches("0x"))
        .map_err(|e| FclError::DecodeFailure(format!("reference block id: {}", e)))?;
    if raw.is_empty() {
        return Err(FclError::MissingReferenceBlock);
    }
    if raw.len() > BLOCK_ID_LENGTH {
        return Err(FclError::DecodeFailure(format!(
            "reference block id is {} bytes",
            raw.len()
        )));
    }
    let mut out = vec![0u8; BLOCK_ID_LENGTH - raw.len()];
    out.extend_from_slice(&raw);
    Ok(out)
}

fn tagged(tag: &str, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(32 + body.len());
    out.extend_from_slice(&padded_domain_tag(tag));
    out.extend_from_slice(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::types::ProposalKey;

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    fn body() -> TransactionBody {
        TransactionBody {
            script: "transaction { execute { log(\"hi\") } }".into(),
            arguments: vec![serde_json::json!({"type": "UFix64", "value": "1.0"})],
            reference_block_id: "0a".repeat(32),
            compute_limit: 9999,
            proposal_key: ProposalKey {
                address: addr("0x01"),
                key_index: 0,
                sequence_number: 42,
            },
            payer: addr("0x02"),
            authorizers: vec![addr("0x01")],
        }
    }

    #[test]
    fn payload_message_starts_with_domain_tag() {
        let msg = payload_message(&body()).unwrap();
        assert_eq!(&msg[..32], &padded_domain_tag(TRANSACTION_DOMAIN_TAG));
        // RLP list prefix follows the tag.
        assert!(msg[32] >= 0xc0);
    }

    #[test]
    fn payload_message_is_deterministic() {
        assert_eq!(payload_message(&body()).unwrap(), payload_message(&body()).unwrap());
    }

    #[test]
    fn arguments_are_encoded_as_compact_json() {
        let msg = payload_message(&body()).unwrap();
        let arg = br#"{"type":"UFix64","value":"1.0"}"#;
        assert!(msg.windows(arg.len()).any(|w| w == arg));
    }

    #[test]
    fn payload_depends_on_sequence_number() {
        let mut other = body();
        other.proposal_key.sequence_number += 1;
        assert_ne!(payload_message(&body()).unwrap(), payload_message(&other).unwrap());
    }

    #[test]
    fn envelope_covers_payload_signatures() {
        let b = body();
        let empty = envelope_message(&b, &[]).unwrap();
        let signed = envelope_message(
            &b,
            &[TransactionSignature::new(addr("0x01"), 0, "aabb")],
        )
        .unwrap();
        assert_ne!(empty, signed);
    }

    #[test]
    fn envelope_ignores_signature_arrival_order() {
        let mut b = body();
        b.authorizers.push(addr("0x03"));
        let s1 = TransactionSignature::new(addr("0x03"), 0, "aa");
        let s2 = TransactionSignature::new(addr("0x01"), 0, "bb");
        assert_eq!(
            envelope_message(&b, &[s1.clone(), s2.clone()]).unwrap(),
            envelope_message(&b, &[s2, s1]).unwrap()
        );
    }

    #[test]
    fn envelope_rejects_non_signer() {
        let err = envelope_message(
            &body(),
            &[TransactionSignature::new(addr("0x09"), 0, "aa")],
        )
        .unwrap_err();
        assert!(matches!(err, FclError::UnexpectedSigner { .. }));
    }

    #[test]
    fn secondary_address_cannot_be_encoded() {
        let mut b = body();
        b.payer = addr("0x000000000000000000000002b87c966bc00bc2c4");
        assert!(matches!(
            payload_message(&b),
            Err(FclError::InvalidAddress(_))
        ));
    }

    #[test]
    fn short_reference_block_is_left_padded() {
        let bytes = reference_block_bytes("0x01").unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[31], 1);
        assert!(bytes[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn empty_reference_block_is_missing() {
        assert!(matches!(
            reference_block_bytes(""),
            Err(FclError::MissingReferenceBlock)
        ));
    }

    #[test]
    fn user_message_is_tagged() {
        let msg = user_message(b"hello");
        assert_eq!(&msg[..32], &padded_domain_tag(USER_DOMAIN_TAG));
        assert_eq!(&msg[32..], b"hello");
    }

    #[test]
    fn account_proof_requires_long_nonce() {
        let a = addr("0x01");
        assert!(matches!(
            account_proof_message("app", &a, "abcd"),
            Err(FclError::InvalidNonce(_))
        ));
        let msg = account_proof_message("app", &a, &"11".repeat(32)).unwrap();
        assert_eq!(&msg[..32], &padded_domain_tag(ACCOUNT_PROOF_DOMAIN_TAG));
    }
}
