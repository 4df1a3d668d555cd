use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of exercising and selling shares at one exit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub scenario_name: String,

    /// Exit price per share.
    pub exit_value: Decimal,
    pub shares_exercised: u64,
    pub exercise_cost: Decimal,
    pub gross_proceeds: Decimal,
    pub tax_liability: Decimal,

    /// `gross_proceeds - exercise_cost - tax_liability`; may be negative.
    pub net_proceeds: Decimal,
    pub roi_percentage: Decimal,
}

impl ScenarioResult {
    /// A result with every amount zeroed, used when the grant is unusable.
    pub fn zeroed(
        scenario_name: impl Into<String>,
        exit_value: Decimal,
    ) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            exit_value,
            shares_exercised: 0,
            exercise_cost: Decimal::ZERO,
            gross_proceeds: Decimal::ZERO,
            tax_liability: Decimal::ZERO,
            net_proceeds: Decimal::ZERO,
            roi_percentage: Decimal::ZERO,
        }
    }
}
