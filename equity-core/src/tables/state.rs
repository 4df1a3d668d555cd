use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Flat planning rate for a state's tax on equity income.
///
/// These are approximations of the top marginal rate a typical equity
/// holder reaches, not a bracket computation. Returns `None` for codes the
/// table does not know.
///
/// ```
/// use rust_decimal_macros::dec;
/// use equity_core::tables::state_tax_rate;
///
/// assert_eq!(state_tax_rate("ca"), Some(dec!(0.093)));
/// assert_eq!(state_tax_rate("TX"), Some(dec!(0)));
/// assert_eq!(state_tax_rate("ZZ"), None);
/// ```
pub fn state_tax_rate(state: &str) -> Option<Decimal> {
    let rate = match state.trim().to_ascii_uppercase().as_str() {
        "AK" | "FL" | "NH" | "NV" | "SD" | "TN" | "TX" | "WA" | "WY" => dec!(0),
        "AZ" => dec!(0.025),
        "CA" => dec!(0.093),
        "CO" => dec!(0.044),
        "CT" => dec!(0.0599),
        "DC" => dec!(0.085),
        "GA" => dec!(0.0539),
        "IL" => dec!(0.0495),
        "MA" => dec!(0.05),
        "MD" => dec!(0.0475),
        "MI" => dec!(0.0425),
        "MN" => dec!(0.0785),
        "NC" => dec!(0.0425),
        "NJ" => dec!(0.0637),
        "NY" => dec!(0.0685),
        "OR" => dec!(0.0875),
        "PA" => dec!(0.0307),
        "UT" => dec!(0.0455),
        "VA" => dec!(0.0575),
        "WI" => dec!(0.053),
        _ => return None,
    };
    Some(rate)
}
