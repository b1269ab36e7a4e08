//! Value types shared by the interaction, transaction, and service layers.

pub mod address;
pub mod argument;

pub use address::Address;
pub use argument::Argument;
