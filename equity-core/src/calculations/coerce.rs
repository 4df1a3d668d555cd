//! Lenient numeric coercion for values that arrive from forms.
//!
//! Numbers pass through, numeric strings parse, and everything else (empty
//! strings, prose, NaN, infinities, `None`) reads as absent. The `coerce_*`
//! helpers turn absent into zero so calculations never see an invalid value.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

/// A value that may or may not hold a usable number.
pub trait NumericInput {
    /// Returns the numeric value, or `None` when the input is not a number.
    fn to_decimal(&self) -> Option<Decimal>;
}

impl NumericInput for Decimal {
    fn to_decimal(&self) -> Option<Decimal> {
        Some(*self)
    }
}

macro_rules! integer_input {
    ($($ty:ty),*) => {
        $(
            impl NumericInput for $ty {
                fn to_decimal(&self) -> Option<Decimal> {
                    Some(Decimal::from(*self))
                }
            }
        )*
    };
}

integer_input!(i32, i64, u32, u64, usize);

impl NumericInput for f64 {
    fn to_decimal(&self) -> Option<Decimal> {
        if self.is_finite() {
            Decimal::from_f64(*self)
        } else {
            None
        }
    }
}

impl NumericInput for f32 {
    fn to_decimal(&self) -> Option<Decimal> {
        f64::from(*self).to_decimal()
    }
}

impl NumericInput for str {
    fn to_decimal(&self) -> Option<Decimal> {
        parse_numeric_str(self)
    }
}

impl NumericInput for String {
    fn to_decimal(&self) -> Option<Decimal> {
        parse_numeric_str(self)
    }
}

impl<T: NumericInput + ?Sized> NumericInput for &T {
    fn to_decimal(&self) -> Option<Decimal> {
        (**self).to_decimal()
    }
}

impl<T: NumericInput> NumericInput for Option<T> {
    fn to_decimal(&self) -> Option<Decimal> {
        self.as_ref().and_then(NumericInput::to_decimal)
    }
}

/// Normalizes form input: trims whitespace, drops a leading `$` and removes
/// commas used as thousands separators.
fn normalize_numeric_input(s: &str) -> String {
    let trimmed = s.trim();
    let (sign, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", trimmed),
    };
    let rest = rest.strip_prefix('$').unwrap_or(rest);
    format!("{sign}{}", rest.trim().replace(',', ""))
}

fn parse_numeric_str(s: &str) -> Option<Decimal> {
    let normalized = normalize_numeric_input(s);
    if normalized.is_empty() || normalized == "-" {
        return None;
    }
    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

/// Reads `value` as a decimal, treating anything non-numeric as zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use equity_core::calculations::coerce::coerce_decimal;
///
/// assert_eq!(coerce_decimal("1,234.50"), dec!(1234.50));
/// assert_eq!(coerce_decimal(f64::NAN), dec!(0));
/// assert_eq!(coerce_decimal("abc"), dec!(0));
/// ```
pub fn coerce_decimal(value: impl NumericInput) -> Decimal {
    value.to_decimal().unwrap_or(Decimal::ZERO)
}

/// Reads `value` as a whole share count: fractions are floored, negatives
/// and non-numbers become zero.
pub fn coerce_shares(value: impl NumericInput) -> u64 {
    value
        .to_decimal()
        .filter(|v| *v > Decimal::ZERO)
        .and_then(|v| v.floor().to_u64())
        .unwrap_or(0)
}
