//! Amount and time primitives.
//!
//! All value is tracked as an unsigned integer count of the smallest
//! currency unit (18 decimals). Decimal conversion exists only for display
//! and for writing human-scale test fixtures.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::constants::{AMOUNT_DECIMALS, ONE_UNIT};

/// Value in the smallest currency unit.
pub type Amount = u128;

/// Seconds on the externally supplied clock.
pub type Timestamp = u64;

/// Render an amount as whole units (e.g. `4750000000000000000` → `4.75`).
///
/// Returns `None` when the amount exceeds the 96-bit mantissa of [`Decimal`].
#[must_use]
pub fn format_units(amount: Amount) -> Option<Decimal> {
    let signed = i128::try_from(amount).ok()?;
    Decimal::try_from_i128_with_scale(signed, AMOUNT_DECIMALS)
        .ok()
        .map(|d| d.normalize())
}

/// Convert whole units into the smallest unit.
///
/// Returns `None` for negative values, values with more than 18 decimal
/// places, or values that overflow.
#[must_use]
pub fn parse_units(units: Decimal) -> Option<Amount> {
    if units.is_sign_negative() {
        return None;
    }
    let scaled = units.checked_mul(Decimal::from(ONE_UNIT))?;
    if !scaled.fract().is_zero() {
        return None;
    }
    scaled.to_u128()
}

/// Serde adapter writing an [`Amount`] as a base-10 string.
///
/// JSON consumers that parse numbers as doubles cannot hold 18-decimal
/// values, and serde's buffered (internally tagged) enums reject `u128`.
///
/// ```ignore
/// #[serde(with = "crate::amount::amount_str")]
/// price: Amount,
/// ```
pub mod amount_str {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::Amount;

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<Amount>().map_err(de::Error::custom)
    }
}
