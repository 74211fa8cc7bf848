//! Widened integer helpers shared by the pricing functions.

use ethereum_types::{U256, U512};
use tracing::debug;

/// `floor(a * b / denominator)` with a 512-bit intermediate product.
///
/// Returns zero when the denominator is zero or the quotient does not fit in
/// 256 bits; both only occur for inputs no real pool can produce, and zero is
/// the conservative direction (the pool under-pays rather than over-pays).
pub(crate) fn mul_div(a: U256, b: U256, denominator: U256) -> U256 {
    if denominator.is_zero() {
        return U256::zero();
    }
    let quotient = a.full_mul(b) / U512::from(denominator);
    match U256::try_from(quotient) {
        Ok(q) => q,
        Err(_) => {
            debug!(%a, %b, %denominator, "mul_div quotient exceeds 256 bits, clamping to zero");
            U256::zero()
        }
    }
}

/// Floor integer square root by Babylonian iteration.
///
/// Operates on the 512-bit product of a deposit pair, so the result always
/// fits in 256 bits.
pub(crate) fn isqrt(value: U512) -> U256 {
    if value.is_zero() {
        return U256::zero();
    }
    if value <= U512::from(3) {
        return U256::one();
    }
    let mut z = value;
    let mut x = value / 2 + U512::one();
    while x < z {
        z = x;
        x = (value / x + x) / 2;
    }
    // z < 2^256 because value < 2^512.
    U256::try_from(z).unwrap_or(U256::max_value())
}
