//! The session channel collaborator.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;

/// A paired, bidirectional message channel to a remote wallet.
///
/// Implementations own pairing, encryption, and relay transport. The
/// engine only sends framed requests on a topic and reads the framed
/// responses that come back on it. Responses for several requests may
/// share one topic; the engine correlates them by request id.
#[async_trait]
pub trait SessionChannel: Send + Sync {
    /// Sends `payload` for `method` on `topic`. Transport failures are
    /// reported as `FclError::Session`.
    async fn send(&self, topic: &str, method: &str, payload: Vec<u8>) -> Result<()>;

    /// Stream of raw responses arriving on `topic`. Ends when the session
    /// is closed.
    fn on_response(&self, topic: &str) -> BoxStream<'static, Vec<u8>>;
}
