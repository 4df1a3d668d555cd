//! Monetary primitives: costs, proceeds, values and percentages.
//!
//! Every function accepts any [`NumericInput`] and reads unusable input as
//! zero, so form fields can be passed straight through. Denominators of the
//! percentage helpers are floored at one.

use rust_decimal::Decimal;
use tracing::warn;

use crate::calculations::coerce::{NumericInput, coerce_decimal};

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

fn product(
    what: &'static str,
    a: Decimal,
    b: Decimal,
) -> Decimal {
    a.checked_mul(b).unwrap_or_else(|| {
        warn!(%a, %b, what, "product overflowed; using zero");
        Decimal::ZERO
    })
}

/// Cost of exercising `shares` options at `strike_price`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use equity_core::calculations::monetary::exercise_cost;
///
/// assert_eq!(exercise_cost(100_u64, dec!(2.5)), dec!(250));
/// assert_eq!(exercise_cost("200", "1.5"), dec!(300));
/// assert_eq!(exercise_cost(0_u64, dec!(10)), dec!(0));
/// ```
pub fn exercise_cost(
    shares: impl NumericInput,
    strike_price: impl NumericInput,
) -> Decimal {
    product(
        "exercise_cost",
        coerce_decimal(shares),
        coerce_decimal(strike_price),
    )
}

/// [`exercise_cost`] that reports an unrepresentable cost as `None`
/// instead of zero.
pub fn checked_exercise_cost(
    shares: u64,
    strike_price: Decimal,
) -> Option<Decimal> {
    Decimal::from(shares).checked_mul(strike_price)
}

/// [`gross_proceeds`] that reports unrepresentable proceeds as `None`
/// instead of zero.
pub fn checked_gross_proceeds(
    shares: u64,
    exit_price: Decimal,
) -> Option<Decimal> {
    Decimal::from(shares).checked_mul(exit_price)
}

/// Proceeds of selling `shares` at `exit_price`, before costs and taxes.
pub fn gross_proceeds(
    shares: impl NumericInput,
    exit_price: impl NumericInput,
) -> Decimal {
    product(
        "gross_proceeds",
        coerce_decimal(shares),
        coerce_decimal(exit_price),
    )
}

/// Value of `shares` at the current fair market value.
pub fn current_value(
    shares: impl NumericInput,
    fair_market_value: impl NumericInput,
) -> Decimal {
    product(
        "current_value",
        coerce_decimal(shares),
        coerce_decimal(fair_market_value),
    )
}

/// Share of a grant already vested, in percent.
pub fn vesting_percentage(
    vested: impl NumericInput,
    total: impl NumericInput,
) -> Decimal {
    let denominator = coerce_decimal(total).max(Decimal::ONE);
    product("vesting_percentage", coerce_decimal(vested), ONE_HUNDRED) / denominator
}

/// Return of `current_price` over `cost_basis`, in percent.
///
/// ```
/// use rust_decimal_macros::dec;
/// use equity_core::calculations::monetary::return_percentage;
///
/// assert_eq!(return_percentage(dec!(15), dec!(10)), dec!(50));
/// // Cost basis below one is floored at one.
/// assert_eq!(return_percentage(dec!(3), dec!(0)), dec!(200));
/// ```
pub fn return_percentage(
    current_price: impl NumericInput,
    cost_basis: impl NumericInput,
) -> Decimal {
    let denominator = coerce_decimal(cost_basis).max(Decimal::ONE);
    let Some(ratio) = (coerce_decimal(current_price) / denominator).checked_sub(Decimal::ONE)
    else {
        warn!(what = "return_percentage", "ratio overflowed; using zero");
        return Decimal::ZERO;
    };
    product("return_percentage", ratio, ONE_HUNDRED)
}
