//! Local signing collaborator.
//!
//! Keys never enter the engine. A host hands it a [`SigningCapability`]
//! that signs on behalf of the accounts it custodies; accounts without a
//! remote `authz` service are signed through it.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Address;

#[async_trait]
pub trait SigningCapability: Send + Sync {
    /// Signs `message` with key `key_index` of `address`.
    ///
    /// `message` is already domain-tagged. Failures are reported as
    /// `FclError::Signing`.
    async fn sign(&self, address: &Address, key_index: u32, message: &[u8]) -> Result<Vec<u8>>;
}
