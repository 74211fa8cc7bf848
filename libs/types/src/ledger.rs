//! Elementary ledger operations emitted by pool actions.
//!
//! Every mutating pool operation compiles to an ordered list of these
//! primitives; the ledger-write collaborator submits the list atomically (or
//! as atomically as the target ledger allows) and returns a receipt. The
//! core never interprets or retries failed submissions.

use crate::token::Address;
use ethereum_types::U256;
use serde::{Deserialize, Serialize};

/// One elementary transfer/mint/burn against the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LedgerOp {
    /// Move `amount` of `token` between two accounts.
    Transfer {
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    },
    /// Create `amount` new units of `token` in `to` (LP-token issuance).
    Mint {
        token: Address,
        to: Address,
        amount: U256,
    },
    /// Destroy `amount` units of `token` held by `from` (LP-token redemption).
    Burn {
        token: Address,
        from: Address,
        amount: U256,
    },
}

/// Success receipt from the ledger-write collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReceipt {
    /// Ledger-assigned transaction identifier.
    pub tx_id: String,
}
