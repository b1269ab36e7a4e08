//! Requests sent to remote signers.

use serde::{Deserialize, Serialize};

use crate::config::{PRE_SIGNABLE_FTYPE, SIGNABLE_FTYPE, SIGNABLE_VSN};
use crate::error::{FclError, Result};
use crate::interaction::{Interaction, Role};
use crate::transaction::{build_voucher, Voucher};
use crate::types::Address;

/// What an authz service receives: the exact bytes to sign plus enough
/// context for the wallet to show the user what they are signing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signable {
    pub f_type: String,
    pub f_vsn: String,
    /// Hex of the payload or envelope message.
    pub message: String,
    pub addr: Address,
    #[serde(rename = "keyId")]
    pub key_id: u32,
    pub roles: Role,
    pub cadence: String,
    pub args: Vec<serde_json::Value>,
    pub voucher: Voucher,
}

impl Signable {
    /// Signable for the account `temp_id` of `ix` over `message`.
    pub fn for_account(ix: &Interaction, temp_id: &str, message: &[u8]) -> Result<Self> {
        let account = ix.account(temp_id).ok_or_else(|| {
            FclError::InvalidSession(format!("no account {} in interaction", temp_id))
        })?;
        let (addr, key_id) = match (account.address, account.key_index) {
            (Some(a), Some(k)) => (a, k),
            _ => {
                return Err(FclError::InvalidAddress(format!(
                    "signer {} has no address or key index",
                    temp_id
                )))
            }
        };
        let voucher = build_voucher(ix)?;
        Ok(Self {
            f_type: SIGNABLE_FTYPE.to_string(),
            f_vsn: SIGNABLE_VSN.to_string(),
            message: hex::encode(message),
            addr,
            key_id,
            roles: account.role,
            cadence: voucher.cadence.clone(),
            args: voucher.arguments.clone(),
            voucher,
        })
    }

    pub fn message_bytes(&self) -> Result<Vec<u8>> {
        hex::decode(&self.message).map_err(|e| FclError::DecodeFailure(format!("signable message: {}", e)))
    }
}

/// What a pre-authz service receives. Sent before any signer is known, so
/// it carries the script and arguments but no voucher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreSignable {
    pub f_type: String,
    pub f_vsn: String,
    pub roles: Role,
    pub cadence: String,
    pub args: Vec<serde_json::Value>,
}

impl PreSignable {
    pub fn from_interaction(ix: &Interaction) -> Self {
        Self {
            f_type: PRE_SIGNABLE_FTYPE.to_string(),
            f_vsn: SIGNABLE_VSN.to_string(),
            roles: Role {
                proposer: true,
                authorizer: true,
                payer: true,
            },
            cadence: ix.message.cadence.clone(),
            args: ix.ordered_arguments().into_iter().map(|a| a.value.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::interaction::SignableAccount;
    use crate::types::Argument;

    fn ix() -> (Interaction, String) {
        let mut ix = Interaction::transaction("transaction {}", &EngineConfig::default())
            .with_reference_block("0a".repeat(32))
            .with_argument(Argument::typed("String", "hi"));
        let a = ix.set_proposer(
            SignableAccount::for_key(Address::parse("0x0a").unwrap(), 1).with_sequence_number(4),
        );
        ix.set_payer(SignableAccount::for_key(Address::parse("0x0b").unwrap(), 0));
        (ix, a)
    }

    #[test]
    fn signable_carries_message_and_roles() {
        let (ix, a) = ix();
        let s = Signable::for_account(&ix, &a, &[1, 2, 255]).unwrap();
        assert_eq!(s.message, "0102ff");
        assert_eq!(s.key_id, 1);
        assert!(s.roles.proposer && !s.roles.payer);
        assert_eq!(s.args.len(), 1);
        assert_eq!(s.voucher.proposal_key.sequence_num, 4);
        assert_eq!(s.message_bytes().unwrap(), vec![1, 2, 255]);

        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["f_type"], "Signable");
        assert_eq!(json["f_vsn"], "1.0.1");
        assert_eq!(json["keyId"], 1);
    }

    #[test]
    fn unknown_account_is_invalid_session() {
        let (ix, _) = ix();
        assert!(matches!(
            Signable::for_account(&ix, "nobody", &[]),
            Err(FclError::InvalidSession(_))
        ));
    }

    #[test]
    fn pre_signable_asks_for_every_role() {
        let (ix, _) = ix();
        let pre = PreSignable::from_interaction(&ix);
        assert_eq!(pre.f_type, "PreSignable");
        assert!(pre.roles.proposer && pre.roles.authorizer && pre.roles.payer);
        assert_eq!(pre.args[0]["value"], "hi");
    }
}
