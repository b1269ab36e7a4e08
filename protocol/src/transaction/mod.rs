//! # Transaction Module
//!
//! Projection of an [`crate::interaction::Interaction`] into the ledger's
//! transaction form, and the canonical byte messages every signer signs.
//!
//! ## Architecture
//!
//! ```text
//! types.rs      Core value types (ProposalKey, TransactionBody, SignedTransaction)
//! encoding.rs   Domain-tagged RLP payload, envelope, user, and account-proof messages
//! builder.rs    Fluent TransactionBuilder for unsigned transactions
//! voucher.rs    Voucher: the wire snapshot shown to remote signers
//! assembler.rs  Fully signed Interaction -> SignedTransaction
//! ```
//!
//! ## Signing Order
//!
//! 1. **Payload**: every inside signer signs [`TransactionBody::payload_message`].
//! 2. **Envelope**: the payer signs [`TransactionBody::envelope_message`],
//!    which covers the payload signatures.
//!
//! A payload signature can never be attached after an envelope signature.

pub mod assembler;
pub mod builder;
pub mod encoding;
pub mod types;
pub mod voucher;

pub use assembler::{assemble, assemble_resolved};
pub use builder::TransactionBuilder;
pub use types::{ProposalKey, SignedTransaction, TransactionBody, TransactionSignature};
pub use voucher::{build_voucher, proposal_key, Voucher, VoucherProposalKey, VoucherSignature};
