//! Protocol fee policy: deduct-before-swap, in basis points.
//!
//! The protocol fee is taken from the input amount once, upstream of every
//! venue, before any AMM pricing runs. Quotes produced here are therefore
//! advisory with respect to the settlement layer: whether an on-chain
//! contract applies its fee identically must be verified against that
//! contract before treating an off-chain quote as authoritative.

use crate::math::mul_div;
use crate::BPS_DENOMINATOR;
use ethereum_types::U256;

/// Split `amount_in` into (net input, fee taken) at `fee_bps` basis points.
///
/// `fee = floor(amount_in * fee_bps / 10_000)`, net is the remainder, so
/// `net + fee == amount_in` always. Fees above 10_000 bps are clamped to the
/// full amount.
pub fn protocol_fee(amount_in: U256, fee_bps: u16) -> (U256, U256) {
    let bps = U256::from(u64::from(fee_bps).min(BPS_DENOMINATOR));
    let fee = mul_div(amount_in, bps, U256::from(BPS_DENOMINATOR));
    (amount_in - fee, fee)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_bps_on_one_thousand() {
        let (net, fee) = protocol_fee(U256::from(1000), 30);
        assert_eq!(net, U256::from(997));
        assert_eq!(fee, U256::from(3));
    }

    #[test]
    fn dust_inputs_pay_no_fee() {
        // 30 bps of 333 is 0.999, floored to 0: dust inputs pay no fee.
        let (net, fee) = protocol_fee(U256::from(333), 30);
        assert_eq!(net, U256::from(333));
        assert_eq!(fee, U256::zero());
    }

    #[test]
    fn conserves_the_input() {
        for bps in [0u16, 1, 30, 100, 9_999, 10_000, u16::MAX] {
            let amount = U256::from(123_456_789u64);
            let (net, fee) = protocol_fee(amount, bps);
            assert_eq!(net + fee, amount);
        }
    }
}
