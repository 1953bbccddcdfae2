//! Two-place decimals for stored values.
//!
//! Measurements and BMI values are stored as [`Decimal`] with a scale of two,
//! matching a `decimal(5,2)` column. Their text form (`"22.86"`, `"175.50"`) is
//! also the form used in the calculation log, the CSV export and JSON output.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Fractional digits kept for stored values
pub const SCALE: u32 = 2;

/// Round to hundredths, halves away from zero, always showing two places.
pub fn to_hundredths(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(SCALE);
    rounded
}

/// Round a computed float to hundredths.
///
/// The float is taken at its exact binary value before rounding. Returns
/// `None` for NaN, infinities, and values outside the decimal range.
pub fn round_hundredths(value: f64) -> Option<Decimal> {
    Decimal::from_f64_retain(value).map(to_hundredths)
}

/// A caller-supplied float as the decimal it was written as (`64.1`, not
/// `64.099999...`).
pub fn from_input(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value)
}

/// True when the value fits `decimal(5,2)`: at most two places and an
/// absolute value no larger than 999.99.
pub fn fits_column(value: Decimal) -> bool {
    value.scale() <= SCALE && value.abs() <= dec!(999.99)
}
