//! Signing roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The duties an account carries in one transaction.
///
/// Roles only ever grow: [`Role::merge`] is a per-field OR, so adding the
/// same account twice under different roles is order-independent. An
/// all-false role is a valid observer that never signs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    pub proposer: bool,
    pub authorizer: bool,
    pub payer: bool,
}

impl Role {
    pub const PROPOSER: Role = Role {
        proposer: true,
        authorizer: false,
        payer: false,
    };

    pub const AUTHORIZER: Role = Role {
        proposer: false,
        authorizer: true,
        payer: false,
    };

    pub const PAYER: Role = Role {
        proposer: false,
        authorizer: false,
        payer: true,
    };

    /// Per-field OR of `self` and `other`.
    pub fn merge(self, other: Role) -> Role {
        Role {
            proposer: self.proposer || other.proposer,
            authorizer: self.authorizer || other.authorizer,
            payer: self.payer || other.payer,
        }
    }

    /// `true` when the account has no signing duty.
    pub fn is_observer(&self) -> bool {
        !(self.proposer || self.authorizer || self.payer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if self.proposer {
            parts.push("proposer");
        }
        if self.authorizer {
            parts.push("authorizer");
        }
        if self.payer {
            parts.push("payer");
        }
        if parts.is_empty() {
            write!(f, "observer")
        } else {
            write!(f, "{}", parts.join("+"))
        }
    }
}
