//! Canonical, order-independent token-pair keys.

use crate::token::Address;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// An ordered token pair used to index pools.
///
/// Construction sorts the two addresses so that `PairKey::new(a, b)` and
/// `PairKey::new(b, a)` produce the identical key. Identical tokens yield
/// `None`; a pool against itself is meaningless.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey(Address, Address);

impl PairKey {
    /// Returns the canonical key for the given tokens, or `None` if `a` and
    /// `b` are the same address.
    pub fn new(a: Address, b: Address) -> Option<Self> {
        match a.cmp(&b) {
            Ordering::Less => Some(Self(a, b)),
            Ordering::Equal => None,
            Ordering::Greater => Some(Self(b, a)),
        }
    }

    /// The pair in canonical (sorted) order.
    pub fn get(&self) -> (&Address, &Address) {
        (&self.0, &self.1)
    }

    /// Whether `token` is one side of this pair.
    pub fn contains(&self, token: &Address) -> bool {
        &self.0 == token || &self.1 == token
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0, self.1)
    }
}
