//! Common utility functions shared by the calculation modules.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary amount to cents using half-up rounding.
///
/// Values at exactly 0.005 round away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use equity_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a ratio (rates, scores) to four decimal places, half-up.
pub fn round_ratio(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `value`, or zero when `value` is negative.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Clamps `value` into the closed unit interval `[0, 1]`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use equity_core::calculations::common::clamp_unit;
///
/// assert_eq!(clamp_unit(dec!(1.7)), dec!(1));
/// assert_eq!(clamp_unit(dec!(-0.2)), dec!(0));
/// assert_eq!(clamp_unit(dec!(0.35)), dec!(0.35));
/// ```
pub fn clamp_unit(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE)
}

/// Width of the overlap between `[start, end]` and `[low, high]`, zero when
/// they do not meet. `high == None` means unbounded.
pub fn overlap(
    start: Decimal,
    end: Decimal,
    low: Decimal,
    high: Option<Decimal>,
) -> Decimal {
    let upper = high.map_or(end, |h| end.min(h));
    non_negative(upper - start.max(low))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_large_values() {
        assert_eq!(round_half_up(dec!(999999.999)), dec!(1000000.00));
    }

    #[test]
    fn round_ratio_keeps_four_places() {
        assert_eq!(round_ratio(dec!(0.123456)), dec!(0.1235));
        assert_eq!(round_ratio(dec!(0.25)), dec!(0.25));
    }

    // =========================================================================
    // non_negative / clamp_unit tests
    // =========================================================================

    #[test]
    fn non_negative_floors_at_zero() {
        assert_eq!(non_negative(dec!(-0.01)), dec!(0));
        assert_eq!(non_negative(dec!(5)), dec!(5));
    }

    #[test]
    fn clamp_unit_bounds_both_sides() {
        assert_eq!(clamp_unit(dec!(2)), dec!(1));
        assert_eq!(clamp_unit(dec!(-3)), dec!(0));
        assert_eq!(clamp_unit(dec!(0.5)), dec!(0.5));
    }

    // =========================================================================
    // overlap tests
    // =========================================================================

    #[test]
    fn overlap_inside_band() {
        assert_eq!(
            overlap(dec!(100), dec!(200), dec!(0), Some(dec!(1000))),
            dec!(100)
        );
    }

    #[test]
    fn overlap_straddles_band_edge() {
        assert_eq!(
            overlap(dec!(40000), dec!(60000), dec!(48350), Some(dec!(533400))),
            dec!(11650)
        );
    }

    #[test]
    fn overlap_with_unbounded_band() {
        assert_eq!(
            overlap(dec!(500), dec!(900), dec!(600), None),
            dec!(300)
        );
    }

    #[test]
    fn overlap_disjoint_is_zero() {
        assert_eq!(
            overlap(dec!(0), dec!(100), dec!(200), Some(dec!(300))),
            dec!(0)
        );
    }
}
