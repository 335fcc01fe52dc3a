//! Money helpers
//!
//! Ledger rows arrive as `f64`; every aggregate and percentage is computed in
//! `Decimal`. Conversion back to `f64` (2 dp) happens only when serializing.

use rust_decimal::prelude::*;
use serde::Serializer;

const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for precise calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round to `dp` places (half away from zero)
#[inline]
pub fn round_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum f64 amounts in Decimal, saturating at the Decimal bounds
pub fn sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().map(to_decimal).fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(v).unwrap_or_else(|| {
            tracing::warn!(acc = %acc, value = %v, "Decimal overflow in sum, saturating");
            if v.is_sign_negative() { Decimal::MIN } else { Decimal::MAX }
        })
    })
}

/// part / whole × 100, or 0 when whole is not positive or the result overflows
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or_else(|| {
            tracing::warn!(part = %part, whole = %whole, "Decimal overflow in percentage, using 0");
            Decimal::ZERO
        })
}

/// value × percent / 100, or 0 when the product overflows
pub fn apply_percent(value: Decimal, percent: Decimal) -> Decimal {
    value
        .checked_mul(percent)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .unwrap_or_else(|| {
            tracing::warn!(value = %value, percent = %percent, "Decimal overflow applying percentage, using 0");
            Decimal::ZERO
        })
}

/// Format as "$1,234.56" (negative as "-$1,234.56")
pub fn format_currency(value: Decimal) -> String {
    let rounded = round_dp(value.abs(), DECIMAL_PLACES);
    let text = format!("{:.2}", rounded);
    let (int_part, frac_part) = text.split_once('.').unwrap_or((&text, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < Decimal::ZERO && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}${grouped}.{frac_part}")
}

/// Format a percentage with one decimal ("35.2%")
pub fn format_percent(value: Decimal) -> String {
    format!("{:.1}%", round_dp(value, 1))
}

// ============================================================================
// serde helpers (output boundary)
// ============================================================================

pub fn serialize_money<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(to_f64(*value))
}

pub fn serialize_money_opt<S: Serializer>(
    value: &Option<Decimal>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_some(&to_f64(*v)),
        None => serializer.serialize_none(),
    }
}
