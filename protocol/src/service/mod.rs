//! # Service Negotiation Layer
//!
//! Wire records exchanged with remote wallets and the session protocol
//! that carries them.
//!
//! ```text
//! params.rs    ParamValue: Int | Double | Bool | String
//! service.rs   Service descriptors (type, method, endpoint, identity)
//! response.rs  AuthnResponse envelope and its data shapes
//! signable.rs  Signable / PreSignable requests
//! codec.rs     JSON-RPC framing
//! channel.rs   SessionChannel collaborator trait
//! session.rs   NegotiationSession state machine
//! ```
//!
//! Records are plain data; the only logic here is encoding, decoding, and
//! the per-session request/response loop.

pub mod channel;
pub mod codec;
pub mod params;
pub mod response;
#[allow(clippy::module_inception)]
pub mod service;
pub mod session;
pub mod signable;

pub use channel::SessionChannel;
pub use codec::{RpcError, RpcRequest, RpcResponse};
pub use params::ParamValue;
pub use response::{
    AccountProof, AuthnData, AuthnResponse, CompositeSignature, PreAuthzData, ResponseStatus,
};
pub use service::{Service, ServiceIdentity, ServiceMethod, ServiceProvider, ServiceType};
pub use session::{NegotiationSession, SessionState};
pub use signable::{PreSignable, Signable};
