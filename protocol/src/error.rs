//! Error types for the interaction and signing engine.
//!
//! Every fallible engine operation returns an [`FclError`]. Protocol
//! variants are terminal for the composition flow that raised them;
//! collaborator variants carry the collaborator's message through
//! unchanged. Nothing in this crate retries on either kind.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FclError>;

/// Errors raised while composing, negotiating, or assembling a transaction.
#[derive(Debug, Error)]
pub enum FclError {
    /// No proposer was designated, or the proposer account cannot be
    /// turned into a proposal key (unknown tempId, missing address, key
    /// index, or sequence number).
    #[error("invalid proposer: {0}")]
    InvalidProposer(String),

    /// The interaction has no payer.
    #[error("transaction has no payer")]
    MissingPayer,

    /// One or more required signers have not produced a signature yet.
    #[error("incomplete signatures: missing {}", missing.join(", "))]
    IncompleteSignatures {
        /// tempIds of the signers still owing a signature.
        missing: Vec<String>,
    },

    /// The sequence number of the proposal key could not be fetched.
    #[error("failed to fetch account {address}: {reason}")]
    FetchAccountFailure {
        /// Canonical hex of the account that was queried.
        address: String,
        /// Collaborator message or lookup failure.
        reason: String,
    },

    /// A transaction-tagged interaction has no script.
    #[error("transaction script is empty")]
    EmptyScript,

    /// No reference block id was resolved before encoding.
    #[error("transaction has no reference block")]
    MissingReferenceBlock,

    /// A payload signature was attached after an envelope signature.
    #[error("payload signature for {address} attached after envelope signing")]
    SignatureOrder {
        /// Address of the late payload signer.
        address: String,
    },

    /// The session is not in a state that allows the requested operation.
    #[error("invalid session: {0}")]
    InvalidSession(String),

    /// The remote party declined the request.
    #[error("declined: {0}")]
    Declined(String),

    /// A remote payload could not be decoded.
    #[error("decode failure: {0}")]
    DecodeFailure(String),

    /// An address string or variant is not usable where it was supplied.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// An account-proof nonce is not valid hex of at least 32 bytes.
    #[error("invalid account-proof nonce: {0}")]
    InvalidNonce(String),

    /// A signature was offered for an account with no signing role.
    #[error("account {0} has no signing role")]
    NotASigner(String),

    /// A remote signature names an account other than the one requested.
    #[error("unexpected signer: expected {expected}, got {got}")]
    UnexpectedSigner {
        /// Address the request was made for.
        expected: String,
        /// Address carried in the response.
        got: String,
    },

    /// The composition state machine received an out-of-order transition.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// State the flow was in.
        from: String,
        /// State that was requested.
        to: String,
    },

    /// Ledger read collaborator failure.
    #[error("ledger error: {0}")]
    Ledger(String),

    /// Ledger submit collaborator failure.
    #[error("submission failed: {0}")]
    Submit(String),

    /// Session channel collaborator failure.
    #[error("session channel error: {0}")]
    Session(String),

    /// Signing capability collaborator failure.
    #[error("signing failed: {0}")]
    Signing(String),
}

impl FclError {
    /// Short message suitable for showing to the wallet user.
    ///
    /// Every variant maps to a distinct message.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidProposer(_) => "The transaction has no valid proposer.",
            Self::MissingPayer => "No account was found to pay for this transaction.",
            Self::IncompleteSignatures { .. } => {
                "The transaction is not fully signed and was not sent."
            }
            Self::FetchAccountFailure { .. } => "Could not load the account from the network.",
            Self::EmptyScript => "The transaction has no script to run.",
            Self::MissingReferenceBlock => "The transaction is missing its reference block.",
            Self::SignatureOrder { .. } => "Signatures were collected in the wrong order.",
            Self::InvalidSession(_) => "The wallet connection is no longer valid.",
            Self::Declined(_) => "The request was declined.",
            Self::DecodeFailure(_) => "The wallet sent a response that could not be read.",
            Self::InvalidAddress(_) => "The address is not valid.",
            Self::InvalidNonce(_) => "The account proof request is malformed.",
            Self::NotASigner(_) => "This account is not asked to sign the transaction.",
            Self::UnexpectedSigner { .. } => "A different account signed than was requested.",
            Self::InvalidTransition { .. } => "The transaction is in an unexpected state.",
            Self::Ledger(_) => "The network could not be reached.",
            Self::Submit(_) => "The transaction could not be submitted.",
            Self::Session(_) => "The message could not be sent to the wallet.",
            Self::Signing(_) => "The transaction could not be signed.",
        }
    }

    /// Returns `true` for failures raised by an external collaborator
    /// rather than by the engine's own protocol checks.
    pub fn is_collaborator_error(&self) -> bool {
        matches!(
            self,
            Self::Ledger(_) | Self::Submit(_) | Self::Session(_) | Self::Signing(_)
        )
    }
}

impl From<serde_json::Error> for FclError {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodeFailure(err.to_string())
    }
}
