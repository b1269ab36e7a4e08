// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # FCL Protocol: Interaction and Multi-Party Signing Engine
//!
//! The wallet-side engine that turns a transaction intent into a fully
//! signed, submittable transaction. One account may propose, another pay,
//! and any number authorize; each of them may sign locally or through a
//! remote wallet reached over a paired session.
//!
//! ## Architecture
//!
//! - **types**: addresses and JSON-Cadence arguments.
//! - **interaction**: the mutable per-transaction model and signer resolution.
//! - **transaction**: vouchers, canonical signing messages, assembly.
//! - **service**: wallet wire records and the session negotiation protocol.
//! - **composer**: the end-to-end flow from seeding to sealed.
//! - **ledger** / **signer**: collaborator traits the host implements.
//! - **config**, **error**, **logging**: constants, the error enum, tracing setup.
//!
//! ## Design Philosophy
//!
//! 1. The interaction is owned by exactly one flow. No shared mutable state.
//! 2. Collaborators are injected as trait objects. No globals.
//! 3. Payload signatures always precede the envelope signature.
//! 4. A signature slot is written once. Late replies never overwrite it.

pub mod composer;
pub mod config;
pub mod error;
pub mod interaction;
pub mod ledger;
pub mod logging;
pub mod service;
pub mod signer;
pub mod transaction;
pub mod types;

pub use composer::{ComposeOutcome, ComposeState, TransactionComposer};
pub use error::{FclError, Result};
pub use interaction::{Interaction, Role, SignableAccount};
pub use transaction::{SignedTransaction, Voucher};
pub use types::{Address, Argument};
