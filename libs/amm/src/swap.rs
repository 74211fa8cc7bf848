//! Constant-product swap pricing (x*y=k with fee folded into the numerator).

use crate::math::mul_div;
use crate::BPS_DENOMINATOR;
use ethereum_types::{U256, U512};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of pricing one swap against a reserve pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOutput {
    /// Exact output amount, floored.
    pub amount_out: U256,
    /// Pool fee retained from the input, in input-token units.
    pub fee_paid: U256,
    /// Display-only spot-vs-execution price ratio in `[0, 1]`.
    pub price_impact: Decimal,
}

impl SwapOutput {
    pub fn zero() -> Self {
        Self {
            amount_out: U256::zero(),
            fee_paid: U256::zero(),
            price_impact: Decimal::ZERO,
        }
    }
}

/// Price an exact-input swap.
///
/// `amount_out = floor(net * reserve_out / (reserve_in * 10_000 + net))`
/// where `net = amount_in * (10_000 - fee_bps)`. Flooring guarantees the
/// pool never pays out more than the invariant allows. Degenerate inputs
/// (zero amount, empty reserves, fee above 100%) yield the all-zero result;
/// the caller decides whether that is an insufficient-output condition. A
/// fee of exactly 100% prices through the formula: zero out, the whole
/// input retained as fee.
pub fn swap_output(amount_in: U256, reserve_in: U256, reserve_out: U256, fee_bps: u16) -> SwapOutput {
    if amount_in.is_zero()
        || reserve_in.is_zero()
        || reserve_out.is_zero()
        || u64::from(fee_bps) > BPS_DENOMINATOR
    {
        return SwapOutput::zero();
    }

    let scale = U512::from(BPS_DENOMINATOR);
    let net = U512::from(amount_in) * U512::from(BPS_DENOMINATOR - u64::from(fee_bps));
    let denominator = U512::from(reserve_in) * scale + net;

    let amount_out = match net.checked_mul(U512::from(reserve_out)) {
        // Bounded above by reserve_out, so the narrowing cannot fail.
        Some(numerator) => U256::try_from(numerator / denominator).unwrap_or_default(),
        None => return SwapOutput::zero(),
    };

    // fee_paid = amount_in - floor(net / 10_000), the part of the input the
    // constant-product formula never sees.
    let fee_paid = amount_in - U256::try_from(net / scale).unwrap_or(amount_in);

    SwapOutput {
        amount_out,
        fee_paid,
        price_impact: price_impact(amount_in, amount_out, reserve_in, reserve_out),
    }
}

/// Required input for an exact output, rounded up so the input always
/// suffices. `None` when the requested output cannot be sourced from the
/// reserves.
pub fn swap_input(
    amount_out: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee_bps: u16,
) -> Option<U256> {
    if amount_out.is_zero()
        || reserve_in.is_zero()
        || amount_out >= reserve_out
        || u64::from(fee_bps) >= BPS_DENOMINATOR
    {
        return None;
    }

    let numerator = reserve_in
        .full_mul(amount_out)
        .checked_mul(U512::from(BPS_DENOMINATOR))?;
    let denominator = U512::from(reserve_out - amount_out)
        * U512::from(BPS_DENOMINATOR - u64::from(fee_bps));

    // +1 rounds up: under-paying by a unit would break the invariant.
    U256::try_from(numerator / denominator)
        .ok()?
        .checked_add(U256::one())
}

/// Display-only price impact: `max(0, (spot - post_trade) / spot)`.
///
/// Computed as a parts-per-million integer ratio first, then widened to
/// `Decimal`; the integer swap math above never touches this value.
fn price_impact(amount_in: U256, amount_out: U256, reserve_in: U256, reserve_out: U256) -> Decimal {
    const PPM: u64 = 1_000_000;

    let numerator = match (reserve_out - amount_out)
        .full_mul(reserve_in)
        .checked_mul(U512::from(PPM))
    {
        Some(n) => n,
        None => return Decimal::ZERO,
    };
    let denominator = match (U512::from(reserve_in) + U512::from(amount_in))
        .checked_mul(U512::from(reserve_out))
    {
        Some(d) if !d.is_zero() => d,
        _ => return Decimal::ZERO,
    };

    let post_over_spot_ppm = (numerator / denominator).min(U512::from(PPM)).as_u64();
    Decimal::new((PPM - post_over_spot_ppm) as i64, 6)
}

/// No-fee ideal output at the spot price:
/// `floor(amount_in * reserve_out / reserve_in)`. An upper bound on what any
/// fee-bearing swap can return.
pub fn ideal_output(amount_in: U256, reserve_in: U256, reserve_out: U256) -> U256 {
    mul_div(amount_in, reserve_out, reserve_in)
}
