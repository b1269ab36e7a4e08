//! Script arguments.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One script argument.
///
/// `value` is the JSON-Cadence document (`{"type": "...", "value": ...}`)
/// passed to the ledger verbatim. Argument order is owned by the
/// interaction, not by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    /// Session-local identifier.
    pub temp_id: String,
    /// JSON-Cadence encoded value.
    pub value: serde_json::Value,
}

impl Argument {
    /// Wraps a JSON-Cadence value under a fresh tempId.
    pub fn new(value: serde_json::Value) -> Self {
        Self {
            temp_id: Uuid::new_v4().to_string(),
            value,
        }
    }

    /// Shorthand for `{"type": ty, "value": value}`.
    pub fn typed(ty: &str, value: impl Into<serde_json::Value>) -> Self {
        let value: serde_json::Value = value.into();
        Self::new(serde_json::json!({ "type": ty, "value": value }))
    }
}
