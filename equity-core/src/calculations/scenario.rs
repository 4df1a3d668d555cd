//! Exit scenarios: what exercising and selling would cost and return.
//!
//! ```text
//! exercise_cost = shares × strike            (0 for RSUs)
//! gross_proceeds = shares × exit_price
//! net_proceeds  = gross_proceeds − exercise_cost − tax
//! roi           = net_proceeds / max(exercise_cost, 1) × 100
//! ```
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use equity_core::calculations::scenario::calculate_scenario_result;
//! use equity_core::{Grant, GrantType, VestingSchedule};
//!
//! let grant = Grant {
//!     name: None,
//!     shares: 1000,
//!     grant_type: GrantType::Iso,
//!     strike_price: dec!(2.50),
//!     current_fair_market_value: dec!(10.00),
//!     vesting_start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
//!     vesting_cliff_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     vesting_end_date: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
//!     vesting_schedule: VestingSchedule::Monthly,
//!     vested_shares: None,
//! };
//!
//! let result = calculate_scenario_result(Some(&grant), dec!(15), 500_u64, "Test");
//! assert_eq!(result.exercise_cost, dec!(1250));
//! assert_eq!(result.gross_proceeds, dec!(7500));
//! assert_eq!(
//!     result.net_proceeds,
//!     result.gross_proceeds - result.exercise_cost - result.tax_liability
//! );
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::coerce::{NumericInput, coerce_decimal, coerce_shares};
use crate::calculations::common::round_half_up;
use crate::calculations::monetary::{checked_exercise_cost, checked_gross_proceeds};
use crate::calculations::tax::TaxStrategy;
use crate::calculations::vesting::calculate_vested_shares;
use crate::models::{Grant, GrantType, ScenarioResult, TaxTables};

/// A named exit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitScenario {
    pub name: String,
    pub exit_price: Decimal,
}

impl ExitScenario {
    pub fn new(
        name: impl Into<String>,
        exit_price: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            exit_price,
        }
    }

    /// The standard ladder of exits at 1x, 3x, 5x and 10x the current fair
    /// market value. Rungs too large to represent are left out.
    pub fn fmv_multiples(fair_market_value: Decimal) -> Vec<Self> {
        [
            ("Current FMV", dec!(1)),
            ("Moderate exit", dec!(3)),
            ("Strong exit", dec!(5)),
            ("Home run", dec!(10)),
        ]
        .into_iter()
        .filter_map(|(name, multiple)| match fair_market_value.checked_mul(multiple) {
            Some(exit_price) => Some(Self::new(name, exit_price)),
            None => {
                warn!(scenario = name, %fair_market_value, "exit price overflowed; skipping");
                None
            }
        })
        .collect()
    }
}

/// Money side of one scenario.
struct Proceeds {
    exercise_cost: Decimal,
    gross_proceeds: Decimal,
    net_proceeds: Decimal,
    roi_percentage: Decimal,
}

impl Proceeds {
    /// `None` when any amount is not representable.
    fn checked(
        grant_type: GrantType,
        shares: u64,
        strike_price: Decimal,
        exit_price: Decimal,
        tax_liability: Decimal,
    ) -> Option<Self> {
        let exercise_cost = match grant_type {
            GrantType::Rsu => Decimal::ZERO,
            GrantType::Iso | GrantType::Nso => checked_exercise_cost(shares, strike_price)?,
        };
        let gross_proceeds = checked_gross_proceeds(shares, exit_price)?;
        let net_proceeds = gross_proceeds
            .checked_sub(exercise_cost)?
            .checked_sub(tax_liability)?;
        let roi_percentage = net_proceeds
            .checked_div(exercise_cost.max(Decimal::ONE))?
            .checked_mul(Decimal::ONE_HUNDRED)?;

        Some(Self {
            exercise_cost,
            gross_proceeds,
            net_proceeds,
            roi_percentage: round_half_up(roi_percentage),
        })
    }
}

/// Evaluates exit scenarios with one tax strategy.
#[derive(Debug, Clone)]
pub struct ScenarioEvaluator<'a> {
    tables: &'a TaxTables,
    strategy: TaxStrategy,
}

impl<'a> ScenarioEvaluator<'a> {
    pub fn new(
        tables: &'a TaxTables,
        strategy: TaxStrategy,
    ) -> Self {
        Self { tables, strategy }
    }

    pub fn strategy(&self) -> &TaxStrategy {
        &self.strategy
    }

    /// Result of exercising `shares_to_exercise` and selling at `exit_price`.
    ///
    /// Never fails. A missing or invalid grant, or amounts too large to
    /// represent, yield [`ScenarioResult::zeroed`] with the given name and
    /// exit price; unreadable numbers count as zero.
    pub fn evaluate(
        &self,
        grant: Option<&Grant>,
        exit_price: impl NumericInput,
        shares_to_exercise: impl NumericInput,
        scenario_name: &str,
    ) -> ScenarioResult {
        let exit_price = coerce_decimal(exit_price);
        let Some(grant) = grant else {
            return ScenarioResult::zeroed(scenario_name, exit_price);
        };
        if let Err(error) = grant.validate() {
            warn!(%error, scenario = scenario_name, "invalid grant; returning zeroed scenario");
            return ScenarioResult::zeroed(scenario_name, exit_price);
        }

        let shares = coerce_shares(shares_to_exercise);
        let strike_price = grant.strike_price;

        let tax_liability = self
            .strategy
            .tax_result_or_default(self.tables, grant, strike_price, exit_price, shares)
            .total_tax;
        let Some(Proceeds {
            exercise_cost,
            gross_proceeds,
            net_proceeds,
            roi_percentage,
        }) = Proceeds::checked(grant.grant_type, shares, strike_price, exit_price, tax_liability)
        else {
            warn!(
                scenario = scenario_name,
                shares,
                %exit_price,
                "scenario amounts overflowed; returning zeroed scenario"
            );
            return ScenarioResult::zeroed(scenario_name, exit_price);
        };

        debug!(
            scenario = scenario_name,
            shares,
            %exit_price,
            %net_proceeds,
            %roi_percentage,
            "evaluated scenario"
        );

        ScenarioResult {
            scenario_name: scenario_name.to_string(),
            exit_value: exit_price,
            shares_exercised: shares,
            exercise_cost,
            gross_proceeds,
            tax_liability,
            net_proceeds,
            roi_percentage,
        }
    }

    /// Evaluates a sale of every share vested on `as_of`.
    pub fn evaluate_vested(
        &self,
        grant: Option<&Grant>,
        exit_price: impl NumericInput,
        as_of: NaiveDate,
        scenario_name: &str,
    ) -> ScenarioResult {
        let vested = calculate_vested_shares(grant, Some(as_of));
        self.evaluate(grant, exit_price, vested, scenario_name)
    }

    /// Evaluates `shares_to_exercise` against each scenario, in order.
    pub fn compare(
        &self,
        grant: Option<&Grant>,
        scenarios: &[ExitScenario],
        shares_to_exercise: u64,
    ) -> Vec<ScenarioResult> {
        scenarios
            .iter()
            .map(|s| self.evaluate(grant, s.exit_price, shares_to_exercise, &s.name))
            .collect()
    }
}

/// Scenario result with the simplified tax strategy at
/// [`DEFAULT_FLAT_RATE`](crate::calculations::tax::DEFAULT_FLAT_RATE).
pub fn calculate_scenario_result(
    grant: Option<&Grant>,
    exit_price: impl NumericInput,
    shares_to_exercise: impl NumericInput,
    scenario_name: &str,
) -> ScenarioResult {
    // The simplified strategy reads no tables.
    let tables = TaxTables::new();
    ScenarioEvaluator::new(&tables, TaxStrategy::default()).evaluate(
        grant,
        exit_price,
        shares_to_exercise,
        scenario_name,
    )
}
