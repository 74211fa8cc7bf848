//! Token identity and metadata.
//!
//! Addresses are opaque ledger identifiers: a hex contract address on an
//! EVM chain, an account string on Keeta. Two tokens are the same asset
//! iff their addresses match; `decimals` is authoritative for every
//! fixed-point conversion involving that token.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque ledger identifier for a token contract, storage account, or holder.
///
/// Treated as a plain string key throughout; the core never parses it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Resolved token metadata. Immutable once fetched from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Ledger address; the sole basis of token identity.
    pub address: Address,
    /// Native decimal precision, authoritative for fixed-point conversion.
    pub decimals: u8,
    /// Display symbol, informational only.
    pub symbol: String,
}

impl Token {
    pub fn new(address: impl Into<String>, decimals: u8, symbol: impl Into<String>) -> Self {
        Self {
            address: Address::new(address),
            decimals,
            symbol: symbol.into(),
        }
    }

    /// Identity check: same asset iff addresses match, regardless of metadata.
    pub fn same_asset(&self, other: &Token) -> bool {
        self.address == other.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_address_only() {
        let a = Token::new("keeta:tok_usdx", 6, "USDX");
        let b = Token::new("keeta:tok_usdx", 6, "usdx-renamed");
        let c = Token::new("keeta:tok_other", 6, "USDX");

        assert!(a.same_asset(&b));
        assert!(!a.same_asset(&c));
    }
}
