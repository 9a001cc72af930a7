//! Coin amounts as bitcoind prints them.
//!
//! Nodes report amounts as JSON decimals in whole coins (`50.00000123`).
//! The decimal text is converted to base units digit by digit, so no amount
//! is rounded through a float. The workspace enables `serde_json`'s
//! `arbitrary_precision` so the text survives deserialization.

use alloy_primitives::U256;
use serde_json::Number;

/// Decimal places of one coin on every supported UTXO network.
pub const COIN_DECIMALS: u32 = 8;

/// Exponents beyond this cannot describe a real amount.
const MAX_EXPONENT: i64 = 64;

/// Convert a node-reported coin amount into base units.
pub fn coins_to_base_units(amount: &Number) -> Result<U256, String> {
    decimal_to_units(&amount.to_string(), COIN_DECIMALS)
}

/// Parse a non-negative decimal (optionally in `e` notation) and scale it by
/// `10^decimals`. Digits below the smallest unit are rejected unless zero.
pub fn decimal_to_units(text: &str, decimals: u32) -> Result<U256, String> {
    let invalid = || format!("invalid amount '{text}'");

    let (mantissa, exponent) = match text.find(|c| c == 'e' || c == 'E') {
        Some(i) => {
            let exponent: i64 = text[i + 1..].parse().map_err(|_| invalid())?;
            (&text[..i], exponent)
        }
        None => (text, 0),
    };
    if !(-MAX_EXPONENT..=MAX_EXPONENT).contains(&exponent) {
        return Err(format!("amount '{text}' out of range"));
    }
    let mantissa = mantissa.strip_prefix('+').unwrap_or(mantissa);
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let digits: Vec<u8> = int_part.bytes().chain(frac_part.bytes()).map(|b| b - b'0').collect();
    // units = digits * 10^shift
    let shift = i64::from(decimals) + exponent - frac_part.len() as i64;
    let kept = if shift < 0 {
        let cut = usize::try_from(-shift).unwrap_or(usize::MAX).min(digits.len());
        let (kept, dropped) = digits.split_at(digits.len() - cut);
        if dropped.iter().any(|d| *d != 0) {
            return Err(format!("amount '{text}' is finer than the smallest unit"));
        }
        kept
    } else {
        &digits[..]
    };

    let ten = U256::from(10u8);
    let overflow = || format!("amount '{text}' out of range");
    let mut units = U256::ZERO;
    for d in kept {
        units = units
            .checked_mul(ten)
            .and_then(|u| u.checked_add(U256::from(*d)))
            .ok_or_else(overflow)?;
    }
    for _ in 0..shift.max(0) {
        units = units.checked_mul(ten).ok_or_else(overflow)?;
    }
    Ok(units)
}
