//! Request and response shapes for the gateway's logical operations.
//!
//! Requests take human-decimal amount strings; responses return every
//! quantity as a [`Qty`] carrying both the raw integer (as a decimal
//! string) and the human-formatted value.

use basin_codec::to_human;
use basin_types::{Token, VenueQuote, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// LP tokens are denominated in whole units.
pub const LP_DECIMALS: u8 = 0;

/// One amount in both wire forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qty {
    /// Raw integer amount, decimal-encoded.
    pub raw: String,
    /// Human-decimal rendering at the token's precision.
    pub human: String,
}

impl Qty {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self {
            raw: raw.to_string(),
            human: to_human(raw, decimals),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSummary {
    pub pair_key: String,
    pub token_a: Token,
    pub token_b: Token,
    pub fee_bps: u16,
    pub reserve_a: Qty,
    pub reserve_b: Qty,
    pub lp_supply: Qty,
    pub lp_token: String,
    pub tradable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePoolRequest {
    pub token_a: String,
    pub token_b: String,
    pub creator: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwapQuoteRequest {
    pub token_in: String,
    pub token_out: String,
    /// Human-decimal input amount.
    pub amount_in: String,
    /// Optional gas price hint for venues that model execution cost.
    pub gas_price: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwapQuoteResponse {
    pub venue_id: String,
    pub amount_in: Qty,
    /// Input after the protocol fee, what venues actually priced.
    pub net_in: Qty,
    pub fee_taken: Qty,
    pub amount_out: Qty,
    /// Every venue's answer, for auditability.
    pub venues: Vec<VenueQuote>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwapExecuteRequest {
    pub trader: String,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: String,
    /// Human-decimal minimum acceptable output. When omitted, the default
    /// slippage tolerance is applied to a fresh quote.
    pub min_amount_out: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwapExecuteResponse {
    pub tx_id: String,
    pub amount_in: Qty,
    pub amount_out: Qty,
    pub fee_paid: Qty,
    pub price_impact: Decimal,
    /// Post-settlement reserve of the token the trader paid in.
    pub new_reserve_in: Qty,
    /// Post-settlement reserve of the token the trader received.
    pub new_reserve_out: Qty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiquidityAddRequest {
    pub provider: String,
    pub token_a: String,
    pub token_b: String,
    pub amount_a: String,
    pub amount_b: String,
    pub min_a: Option<String>,
    pub min_b: Option<String>,
}

/// Response sides mirror the request: `used_a`/`new_reserve_a` refer to the
/// token the caller supplied as `token_a`, whatever the pool's internal
/// ordering is.
#[derive(Debug, Clone, Serialize)]
pub struct LiquidityAddResponse {
    pub tx_id: String,
    pub used_a: Qty,
    pub used_b: Qty,
    pub lp_minted: Qty,
    pub share: Decimal,
    pub new_reserve_a: Qty,
    pub new_reserve_b: Qty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiquidityRemoveRequest {
    pub provider: String,
    pub token_a: String,
    pub token_b: String,
    /// LP amount to redeem, in whole LP units.
    pub lp_amount: String,
    pub min_a: Option<String>,
    pub min_b: Option<String>,
}

/// Response sides mirror the request, like [`LiquidityAddResponse`].
#[derive(Debug, Clone, Serialize)]
pub struct LiquidityRemoveResponse {
    pub tx_id: String,
    pub amount_a: Qty,
    pub amount_b: Qty,
    pub share: Decimal,
    pub new_reserve_a: Qty,
    pub new_reserve_b: Qty,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionSummary {
    pub pair_key: String,
    pub token_a: Token,
    pub token_b: Token,
    pub lp_balance: Qty,
    pub share: Decimal,
    pub entitlement_a: Qty,
    pub entitlement_b: Qty,
}
