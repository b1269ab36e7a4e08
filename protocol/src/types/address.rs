//! Ledger addresses.
//!
//! Two address families show up in the wallet: native 8-byte ledger
//! addresses and 20-byte secondary (EVM-style) addresses. Both are carried
//! as a tagged [`Address`] with one canonical hex form, `0x` followed by
//! lowercase hex. Only native addresses can appear inside a transaction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::{NATIVE_ADDRESS_LENGTH, SECONDARY_ADDRESS_LENGTH};
use crate::error::{FclError, Result};

/// A ledger address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Address {
    /// Native ledger account address.
    Native([u8; NATIVE_ADDRESS_LENGTH]),
    /// Secondary-chain address.
    Secondary([u8; SECONDARY_ADDRESS_LENGTH]),
}

impl Address {
    /// Parses a hex address, with or without the `0x` prefix.
    ///
    /// Up to 16 hex digits parse as a native address, left-padded with
    /// zeros (`0x1` is `0x0000000000000001`). Exactly 40 hex digits parse
    /// as a secondary address. Anything else is rejected.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(FclError::InvalidAddress(input.to_string()));
        }

        if digits.len() <= NATIVE_ADDRESS_LENGTH * 2 {
            let padded = format!("{:0>width$}", digits, width = NATIVE_ADDRESS_LENGTH * 2);
            let mut out = [0u8; NATIVE_ADDRESS_LENGTH];
            hex::decode_to_slice(&padded, &mut out)
                .map_err(|_| FclError::InvalidAddress(input.to_string()))?;
            return Ok(Self::Native(out));
        }

        if digits.len() == SECONDARY_ADDRESS_LENGTH * 2 {
            let mut out = [0u8; SECONDARY_ADDRESS_LENGTH];
            hex::decode_to_slice(digits, &mut out)
                .map_err(|_| FclError::InvalidAddress(input.to_string()))?;
            return Ok(Self::Secondary(out));
        }

        Err(FclError::InvalidAddress(input.to_string()))
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Native(bytes) => bytes,
            Self::Secondary(bytes) => bytes,
        }
    }

    /// Canonical form: `0x` + lowercase hex.
    pub fn hex(&self) -> String {
        format!("0x{}", self.sans_prefix())
    }

    /// Lowercase hex without the `0x` prefix.
    pub fn sans_prefix(&self) -> String {
        hex::encode(self.as_bytes())
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native(_))
    }

    /// The native bytes, or `InvalidAddress` for a secondary address.
    pub fn native_bytes(&self) -> Result<[u8; NATIVE_ADDRESS_LENGTH]> {
        match self {
            Self::Native(bytes) => Ok(*bytes),
            Self::Secondary(_) => Err(FclError::InvalidAddress(format!(
                "{} is not a native ledger address",
                self.hex()
            ))),
        }
    }
}

impl FromStr for Address {
    type Err = FclError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(_) => write!(f, "Native({})", self.hex()),
            Self::Secondary(_) => write!(f, "Secondary({})", self.hex()),
        }
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::parse(&s).map_err(serde::de::Error::custom)
    }
}
