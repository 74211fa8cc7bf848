//! Liquidity accounting: proportional-share mint/burn and deposit matching.

use crate::math::{isqrt, mul_div};
use ethereum_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const PPM: u64 = 1_000_000;

/// Result of pricing a two-sided liquidity deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityMint {
    /// LP tokens to issue, floored.
    pub minted: U256,
    /// Display-only share of the pool after the mint, in `[0, 1]`.
    pub share: Decimal,
}

/// Result of pricing an LP-token redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityBurn {
    /// Token-A payout, floored.
    pub amount_a: U256,
    /// Token-B payout, floored.
    pub amount_b: U256,
    /// Display-only share of the pool being redeemed, in `[0, 1]`.
    pub share: Decimal,
}

/// Price a liquidity deposit against current reserves.
///
/// Bootstrap (empty pool): `minted = floor(sqrt(amount_a * amount_b))`, the
/// geometric mean. That fixes the initial price from the deposit ratio and
/// makes manipulating it expensive for the first depositor; share is 100%.
///
/// Established pool: the smaller of the two proportional mints wins, so a
/// depositor can never mint more share than either side of the deposit
/// justifies. Off-ratio deposits are allowed; only the constraining side is
/// rewarded.
pub fn liquidity_mint(
    amount_a: U256,
    amount_b: U256,
    reserve_a: U256,
    reserve_b: U256,
    total_supply: U256,
) -> LiquidityMint {
    if amount_a.is_zero() || amount_b.is_zero() {
        return LiquidityMint {
            minted: U256::zero(),
            share: Decimal::ZERO,
        };
    }

    if reserve_a.is_zero() || reserve_b.is_zero() || total_supply.is_zero() {
        return LiquidityMint {
            minted: isqrt(amount_a.full_mul(amount_b)),
            share: Decimal::ONE,
        };
    }

    let minted_by_a = mul_div(amount_a, total_supply, reserve_a);
    let minted_by_b = mul_div(amount_b, total_supply, reserve_b);
    let minted = minted_by_a.min(minted_by_b);

    let share = match total_supply.checked_add(minted) {
        Some(post_supply) => ratio(minted, post_supply),
        None => Decimal::ZERO,
    };
    LiquidityMint { minted, share }
}

/// Price an LP-token redemption: floored proportional payout of both sides.
pub fn liquidity_burn(
    lp_amount: U256,
    reserve_a: U256,
    reserve_b: U256,
    total_supply: U256,
) -> LiquidityBurn {
    if lp_amount.is_zero() || total_supply.is_zero() {
        return LiquidityBurn {
            amount_a: U256::zero(),
            amount_b: U256::zero(),
            share: Decimal::ZERO,
        };
    }

    LiquidityBurn {
        amount_a: mul_div(lp_amount, reserve_a, total_supply),
        amount_b: mul_div(lp_amount, reserve_b, total_supply),
        share: ratio(lp_amount, total_supply),
    }
}

/// Match a desired two-sided deposit to the pool ratio.
///
/// Returns the amounts actually usable: the side that binds is taken in
/// full and the other side is scaled down to the pool ratio. Neither result
/// ever exceeds what the caller supplied. An empty pool binds nothing; the
/// deposit itself fixes the price.
pub fn optimal_deposit(
    desired_a: U256,
    desired_b: U256,
    reserve_a: U256,
    reserve_b: U256,
) -> (U256, U256) {
    if reserve_a.is_zero() || reserve_b.is_zero() {
        return (desired_a, desired_b);
    }

    let b_matched = mul_div(desired_a, reserve_b, reserve_a);
    if b_matched <= desired_b {
        (desired_a, b_matched)
    } else {
        let a_matched = mul_div(desired_b, reserve_a, reserve_b);
        (a_matched, desired_b)
    }
}

/// Display ratio `numerator / denominator` at parts-per-million precision.
fn ratio(numerator: U256, denominator: U256) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    let ppm = mul_div(numerator, U256::from(PPM), denominator)
        .min(U256::from(PPM))
        .as_u64();
    Decimal::new(ppm as i64, 6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn bootstrap_mints_geometric_mean() {
        // floor(sqrt(400 * 900)) == 600, 100% share.
        let mint = liquidity_mint(
            U256::from(400),
            U256::from(900),
            U256::zero(),
            U256::zero(),
            U256::zero(),
        );
        assert_eq!(mint.minted, U256::from(600));
        assert_eq!(mint.share, Decimal::ONE);
    }

    #[test]
    fn established_pool_mints_constraining_side() {
        // Pool 1000:1000, supply 1000. Depositing 100:50 only justifies 50.
        let mint = liquidity_mint(
            U256::from(100),
            U256::from(50),
            U256::from(1000),
            U256::from(1000),
            U256::from(1000),
        );
        assert_eq!(mint.minted, U256::from(50));
    }

    #[test]
    fn zero_sided_deposit_mints_nothing() {
        let mint = liquidity_mint(
            U256::zero(),
            U256::from(50),
            U256::from(1000),
            U256::from(1000),
            U256::from(1000),
        );
        assert_eq!(mint.minted, U256::zero());
        assert_eq!(mint.share, Decimal::ZERO);
    }

    #[test]
    fn burn_pays_proportional_floored() {
        // 148 of 1483 LP against reserves (1100, 2000):
        // floor(1100*148/1483) == 109, floor(2000*148/1483) == 199.
        let burn = liquidity_burn(
            U256::from(148),
            U256::from(1100),
            U256::from(2000),
            U256::from(1483),
        );
        assert_eq!(burn.amount_a, U256::from(109));
        assert_eq!(burn.amount_b, U256::from(199));
        assert!(burn.share > dec!(0.09) && burn.share < dec!(0.11));
    }

    #[test]
    fn burn_of_nothing_is_nothing() {
        let burn = liquidity_burn(U256::zero(), U256::from(1), U256::from(1), U256::from(1));
        assert_eq!(burn.amount_a, U256::zero());
        let burn = liquidity_burn(U256::from(1), U256::from(1), U256::from(1), U256::zero());
        assert_eq!(burn.amount_b, U256::zero());
    }

    #[test]
    fn deposit_matching_clamps_to_binding_side() {
        // Pool at 1:2. Offering 100:500 binds on A: B scales down to 200.
        let (a, b) = optimal_deposit(
            U256::from(100),
            U256::from(500),
            U256::from(1000),
            U256::from(2000),
        );
        assert_eq!((a, b), (U256::from(100), U256::from(200)));

        // Offering 100:50 binds on B: A scales down to 25.
        let (a, b) = optimal_deposit(
            U256::from(100),
            U256::from(50),
            U256::from(1000),
            U256::from(2000),
        );
        assert_eq!((a, b), (U256::from(25), U256::from(50)));
    }

    proptest! {
        /// Mint-then-burn on a fresh pool returns the deposit, losing at most
        /// one unit per side to flooring.
        #[test]
        fn bootstrap_mint_burn_symmetry(a in 1u128..u128::MAX, b in 1u128..u128::MAX) {
            let (a, b) = (U256::from(a), U256::from(b));
            let mint = liquidity_mint(a, b, U256::zero(), U256::zero(), U256::zero());
            prop_assert!(mint.minted > U256::zero());
            let burn = liquidity_burn(mint.minted, a, b, mint.minted);
            prop_assert_eq!(burn.amount_a, a);
            prop_assert_eq!(burn.amount_b, b);
        }

        /// The matched deposit never exceeds either supplied amount.
        #[test]
        fn deposit_matching_never_exceeds_supplied(
            da in 0u128..u128::MAX,
            db in 0u128..u128::MAX,
            ra in 1u128..u128::MAX,
            rb in 1u128..u128::MAX,
        ) {
            let (used_a, used_b) =
                optimal_deposit(U256::from(da), U256::from(db), U256::from(ra), U256::from(rb));
            prop_assert!(used_a <= U256::from(da));
            prop_assert!(used_b <= U256::from(db));
        }

        /// Burning the whole supply drains at most the reserves.
        #[test]
        fn burn_never_exceeds_reserves(
            lp in 1u128..u128::MAX,
            supply in 1u128..u128::MAX,
            ra in 0u128..u128::MAX,
            rb in 0u128..u128::MAX,
        ) {
            let lp = U256::from(lp).min(U256::from(supply));
            let burn = liquidity_burn(lp, U256::from(ra), U256::from(rb), U256::from(supply));
            prop_assert!(burn.amount_a <= U256::from(ra));
            prop_assert!(burn.amount_b <= U256::from(rb));
        }
    }
}
