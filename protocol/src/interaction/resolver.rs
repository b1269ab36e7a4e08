//! Signer resolution.
//!
//! Decides which participants owe a payload signature (inside signers)
//! and which owes the envelope signature (outside signer):
//!
//! ```text
//! inside  = (authorizations ∪ {proposer}) \ {payer}
//! outside = {payer}
//! ```
//!
//! Both sets are computed over tempIds, not addresses. The functions here
//! are pure and can be re-run as signatures arrive.

use std::collections::HashSet;

use super::model::Interaction;

/// Resolved signer sets, in deterministic order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerSets {
    /// Payload signers: authorizations in declared order, then the proposer.
    pub inside: Vec<String>,
    /// Envelope signer: the payer, if one is set.
    pub outside: Vec<String>,
}

impl SignerSets {
    pub fn resolve(ix: &Interaction) -> Self {
        Self {
            inside: inside_signers(ix),
            outside: outside_signers(ix),
        }
    }

    /// Required signers that have not signed yet, inside first.
    pub fn unsigned(&self, ix: &Interaction) -> Vec<String> {
        self.inside
            .iter()
            .chain(self.outside.iter())
            .filter(|id| !ix.account(id).map(|a| a.is_signed()).unwrap_or(false))
            .cloned()
            .collect()
    }
}

/// tempIds that must produce a payload signature.
pub fn inside_signers(ix: &Interaction) -> Vec<String> {
    let payer = ix.payer();
    let mut seen = HashSet::new();
    ix.authorizations()
        .iter()
        .map(String::as_str)
        .chain(ix.proposer())
        .filter(|id| Some(*id) != payer)
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

/// tempIds that must produce an envelope signature.
pub fn outside_signers(ix: &Interaction) -> Vec<String> {
    ix.payer().map(str::to_string).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::SignableAccount;
    use crate::types::Address;

    fn key(addr: &str) -> SignableAccount {
        SignableAccount::for_key(Address::parse(addr).unwrap(), 0)
    }

    fn id(addr: &str) -> String {
        key(addr).temp_id
    }

    #[test]
    fn proposer_payer_authorizer_same_account() {
        let mut ix = Interaction::new();
        ix.set_proposer(key("0x0a"));
        ix.set_payer(key("0x0a"));
        ix.add_authorizer(key("0x0a"));
        let sets = SignerSets::resolve(&ix);
        assert!(sets.inside.is_empty());
        assert_eq!(sets.outside, vec![id("0x0a")]);
    }

    #[test]
    fn distinct_roles() {
        let mut ix = Interaction::new();
        ix.set_proposer(key("0x0a"));
        ix.set_payer(key("0x0b"));
        ix.add_authorizer(key("0x0a"));
        ix.add_authorizer(key("0x0c"));
        let sets = SignerSets::resolve(&ix);
        assert_eq!(sets.inside, vec![id("0x0a"), id("0x0c")]);
        assert_eq!(sets.outside, vec![id("0x0b")]);
    }

    #[test]
    fn inside_and_outside_are_disjoint_when_payer_is_separate() {
        let mut ix = Interaction::new();
        ix.set_proposer(key("0x01"));
        ix.add_authorizer(key("0x02"));
        ix.add_authorizer(key("0x03"));
        ix.set_payer(key("0x04"));
        let sets = SignerSets::resolve(&ix);
        assert!(sets.inside.iter().all(|i| !sets.outside.contains(i)));
    }

    #[test]
    fn payer_that_is_also_authorizer_signs_only_envelope() {
        let mut ix = Interaction::new();
        ix.set_proposer(key("0x01"));
        ix.add_authorizer(key("0x02"));
        ix.set_payer(key("0x02"));
        let sets = SignerSets::resolve(&ix);
        assert_eq!(sets.inside, vec![id("0x01")]);
        assert_eq!(sets.outside, vec![id("0x02")]);
    }

    #[test]
    fn no_payer_means_no_outside_signer() {
        let mut ix = Interaction::new();
        ix.set_proposer(key("0x01"));
        assert!(outside_signers(&ix).is_empty());
        assert_eq!(inside_signers(&ix), vec![id("0x01")]);
    }

    #[test]
    fn duplicate_authorizations_collapse() {
        let mut ix = Interaction::new();
        ix.add_authorizer(key("0x01"));
        ix.add_authorizer(key("0x01"));
        ix.set_proposer(key("0x01"));
        assert_eq!(inside_signers(&ix), vec![id("0x01")]);
    }

    #[test]
    fn unsigned_tracks_progress() {
        let mut ix = Interaction::new();
        ix.set_proposer(key("0x01"));
        ix.set_payer(key("0x02"));
        let sets = SignerSets::resolve(&ix);
        assert_eq!(sets.unsigned(&ix), vec![id("0x01"), id("0x02")]);
        ix.apply_signature(&id("0x01"), "aa").unwrap();
        assert_eq!(sets.unsigned(&ix), vec![id("0x02")]);
    }
}
