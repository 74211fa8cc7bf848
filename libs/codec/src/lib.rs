//! # Basin Fixed-Point Amount Codec
//!
//! Exact conversion between human-readable decimal strings and raw integer
//! amounts at a token's native precision. No floating point anywhere: both
//! directions are pure digit-string manipulation over 256-bit integers, so
//! a value survives any number of round trips bit-for-bit.
//!
//! Truncation rule: fractional digits beyond the token's precision are
//! dropped, never rounded up. Quoting a user less than they typed is safe;
//! quoting more is not.

use ethereum_types::U256;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid amount '{0}': expected digits with an optional single decimal point")]
    InvalidAmount(String),
}

pub type Result<T> = std::result::Result<T, CodecError>;

/// Parse a human decimal string into a raw amount at `decimals` precision.
///
/// Accepts an optional leading `+`. Negative amounts are rejected: every
/// on-ledger amount is unsigned. Fractional digits beyond `decimals` are
/// truncated toward zero.
pub fn to_raw(human: &str, decimals: u8) -> Result<U256> {
    let trimmed = human.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if unsigned.is_empty() || unsigned.starts_with('-') {
        return Err(CodecError::InvalidAmount(human.to_string()));
    }

    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, f),
        None => (unsigned, ""),
    };

    // A lone "." carries no digits; a second "." is malformed.
    if (int_part.is_empty() && frac_part.is_empty())
        || frac_part.contains('.')
        || !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(CodecError::InvalidAmount(human.to_string()));
    }

    // Truncate (never round) the fractional part to the token's precision,
    // then right-pad it so the concatenation is the raw integer.
    let kept_frac = &frac_part[..frac_part.len().min(decimals as usize)];
    let mut digits = String::with_capacity(int_part.len() + decimals as usize + 1);
    digits.push_str(if int_part.is_empty() { "0" } else { int_part });
    digits.push_str(kept_frac);
    for _ in kept_frac.len()..decimals as usize {
        digits.push('0');
    }

    U256::from_dec_str(&digits).map_err(|_| CodecError::InvalidAmount(human.to_string()))
}

/// Format a raw amount as a human decimal string at `decimals` precision.
///
/// Strips trailing fractional zeros; zero formats as `"0"`. Exact inverse of
/// [`to_raw`]: `to_raw(&to_human(x, d), d) == x` for every representable `x`.
pub fn to_human(raw: U256, decimals: u8) -> String {
    if raw.is_zero() {
        return "0".to_string();
    }

    let digits = raw.to_string();
    let scale = decimals as usize;
    if scale == 0 {
        return digits;
    }

    let (whole, frac) = if digits.len() > scale {
        let (w, f) = digits.split_at(digits.len() - scale);
        (w.to_string(), f.to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = scale))
    };

    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole
    } else {
        format!("{whole}.{frac}")
    }
}
