//! # Interaction Module
//!
//! The in-memory model of one pending transaction and the pure logic that
//! reads it.
//!
//! ```text
//! role.rs      Role flags and their OR-merge
//! account.rs   SignableAccount: per-participant signing state
//! model.rs     Interaction: script, arguments, accounts, role slots
//! resolver.rs  inside (payload) / outside (envelope) signer sets
//! sequence.rs  lazy proposal-key sequence number resolution
//! ```

pub mod account;
pub mod model;
pub mod resolver;
pub mod role;
pub mod sequence;

pub use account::{temp_id_for, SignableAccount, SignatureMerge};
pub use model::{Interaction, InteractionStatus, InteractionTag, Message};
pub use resolver::{inside_signers, outside_signers, SignerSets};
pub use role::Role;
pub use sequence::resolve_sequence_number;
