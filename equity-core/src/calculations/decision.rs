//! Scores that feed the exercise recommendation.
//!
//! | Factor             | Score |
//! |--------------------|-------|
//! | financial capacity | `cash / (2 × exercise cost)`, 1 when nothing is owed |
//! | company outlook    | stage base (early 0.3, growth 0.5, late 0.7) + 0.3 × growth rate (clamped to ±1) |
//! | tax efficiency     | type base (ISO 0.8, NSO 0.5, RSU 0.4) × (1 − 0.3 × AMT exposure) × (1 − state rate) |
//! | timing             | `1 − years to expiration / 10` |
//!
//! AMT exposure is `(income − 100,000) / 400,000`. Every score and the
//! exposure are clamped to `[0, 1]` independently.

use rust_decimal::Decimal;
use rust_decimal::prelude::Signed;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use crate::calculations::common::{clamp_unit, round_ratio};
use crate::calculations::monetary::checked_exercise_cost;
use crate::models::{CompanyStage, DecisionFactors, DecisionInputs, GrantType};
use crate::tables::state_tax_rate;

const GROWTH_WEIGHT: Decimal = dec!(0.3);
const AMT_EXPOSURE_FLOOR: Decimal = dec!(100000);
const AMT_EXPOSURE_SPAN: Decimal = dec!(400000);
const AMT_EXPOSURE_PENALTY: Decimal = dec!(0.3);
const TIMING_HORIZON_YEARS: Decimal = dec!(10);

pub fn calculate_decision_factors(inputs: &DecisionInputs) -> DecisionFactors {
    let factors = DecisionFactors {
        financial_capacity: financial_capacity(inputs),
        company_outlook: company_outlook(inputs.company_stage, inputs.growth_rate),
        tax_efficiency: tax_efficiency(inputs),
        timing: round_ratio(clamp_unit(
            Decimal::ONE - inputs.years_to_expiration / TIMING_HORIZON_YEARS,
        )),
    };
    debug!(?factors, "decision factors");
    factors
}

fn financial_capacity(inputs: &DecisionInputs) -> Decimal {
    let cost = match inputs.option_type {
        GrantType::Rsu => Some(Decimal::ZERO),
        GrantType::Iso | GrantType::Nso => {
            checked_exercise_cost(inputs.vested_shares, inputs.strike_price)
        }
    };
    let Some(doubled) = cost.and_then(|cost| cost.checked_mul(dec!(2))) else {
        warn!(
            strike = %inputs.strike_price,
            shares = inputs.vested_shares,
            "exercise cost overflowed; no financial capacity"
        );
        return Decimal::ZERO;
    };
    if doubled <= Decimal::ZERO {
        return Decimal::ONE;
    }
    // Only a huge balance over a tiny cost overflows; its sign decides.
    let ratio = inputs
        .available_cash
        .checked_div(doubled)
        .unwrap_or_else(|| inputs.available_cash.signum());
    round_ratio(clamp_unit(ratio))
}

fn company_outlook(
    stage: CompanyStage,
    growth_rate: Decimal,
) -> Decimal {
    let base = match stage {
        CompanyStage::Early => dec!(0.3),
        CompanyStage::Growth => dec!(0.5),
        CompanyStage::Late => dec!(0.7),
    };
    let growth = growth_rate.clamp(Decimal::NEGATIVE_ONE, Decimal::ONE);
    round_ratio(clamp_unit(base + GROWTH_WEIGHT * growth))
}

fn tax_efficiency(inputs: &DecisionInputs) -> Decimal {
    let base = match inputs.option_type {
        GrantType::Iso => dec!(0.8),
        GrantType::Nso => dec!(0.5),
        GrantType::Rsu => dec!(0.4),
    };
    let exposure = clamp_unit(
        inputs
            .current_income
            .checked_sub(AMT_EXPOSURE_FLOOR)
            .map_or(Decimal::ZERO, |over| over / AMT_EXPOSURE_SPAN),
    );
    let state_rate = state_tax_rate(&inputs.state).unwrap_or(Decimal::ZERO);

    round_ratio(clamp_unit(
        base * (Decimal::ONE - AMT_EXPOSURE_PENALTY * exposure) * (Decimal::ONE - state_rate),
    ))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn inputs() -> DecisionInputs {
        DecisionInputs {
            strike_price: dec!(2.50),
            vested_shares: 1000,
            available_cash: dec!(5000),
            current_income: dec!(100000),
            company_stage: CompanyStage::Growth,
            growth_rate: dec!(0.2),
            option_type: GrantType::Iso,
            state: "TX".to_string(),
            years_to_expiration: dec!(5),
        }
    }

    #[test]
    fn baseline_factors() {
        assert_eq!(
            calculate_decision_factors(&inputs()),
            DecisionFactors {
                financial_capacity: dec!(1),
                company_outlook: dec!(0.56),
                tax_efficiency: dec!(0.8),
                timing: dec!(0.5),
            }
        );
    }

    #[test]
    fn capacity_drops_as_cost_approaches_cash() {
        let tight = DecisionInputs {
            available_cash: dec!(2500),
            ..inputs()
        };
        let short = DecisionInputs {
            available_cash: dec!(1000),
            ..inputs()
        };

        assert_eq!(calculate_decision_factors(&tight).financial_capacity, dec!(0.5));
        assert_eq!(calculate_decision_factors(&short).financial_capacity, dec!(0.2));
    }

    #[test]
    fn capacity_is_full_without_cost() {
        let free = DecisionInputs {
            strike_price: dec!(0),
            available_cash: dec!(0),
            ..inputs()
        };
        let rsu = DecisionInputs {
            option_type: GrantType::Rsu,
            available_cash: dec!(0),
            ..inputs()
        };

        assert_eq!(calculate_decision_factors(&free).financial_capacity, dec!(1));
        assert_eq!(calculate_decision_factors(&rsu).financial_capacity, dec!(1));
    }

    #[test]
    fn capacity_with_unrepresentable_cost_is_zero() {
        let huge = DecisionInputs {
            strike_price: dec!(3000000000),
            vested_shares: u64::MAX,
            available_cash: dec!(1000000),
            ..inputs()
        };

        assert_eq!(calculate_decision_factors(&huge).financial_capacity, dec!(0));
    }

    #[test]
    fn capacity_with_huge_cash_over_tiny_cost_is_full() {
        let rich = DecisionInputs {
            strike_price: dec!(0.0000000000000001),
            vested_shares: 1,
            available_cash: Decimal::MAX,
            ..inputs()
        };

        assert_eq!(calculate_decision_factors(&rich).financial_capacity, dec!(1));
    }

    #[test]
    fn extreme_income_is_handled() {
        let negative = DecisionInputs {
            current_income: Decimal::MIN,
            ..inputs()
        };

        assert_eq!(calculate_decision_factors(&negative).tax_efficiency, dec!(0.8));
    }

    #[test]
    fn outlook_rises_with_stage() {
        let scores: Vec<Decimal> = [CompanyStage::Early, CompanyStage::Growth, CompanyStage::Late]
            .into_iter()
            .map(|company_stage| {
                calculate_decision_factors(&DecisionInputs {
                    company_stage,
                    ..inputs()
                })
                .company_outlook
            })
            .collect();

        assert_eq!(scores, vec![dec!(0.36), dec!(0.56), dec!(0.76)]);
    }

    #[test]
    fn outlook_clamps_extreme_growth() {
        let boom = DecisionInputs {
            company_stage: CompanyStage::Late,
            growth_rate: dec!(5),
            ..inputs()
        };
        let bust = DecisionInputs {
            company_stage: CompanyStage::Early,
            growth_rate: dec!(-3),
            ..inputs()
        };

        assert_eq!(calculate_decision_factors(&boom).company_outlook, dec!(1));
        assert_eq!(calculate_decision_factors(&bust).company_outlook, dec!(0));
    }

    #[test]
    fn iso_is_more_tax_efficient_than_nso() {
        let iso = calculate_decision_factors(&inputs()).tax_efficiency;
        let nso = calculate_decision_factors(&DecisionInputs {
            option_type: GrantType::Nso,
            ..inputs()
        })
        .tax_efficiency;

        assert!(iso > nso);
    }

    #[test]
    fn tax_efficiency_falls_with_income_and_state_rate() {
        let high_income = DecisionInputs {
            current_income: dec!(300000),
            ..inputs()
        };
        let california = DecisionInputs {
            current_income: dec!(300000),
            state: "CA".to_string(),
            ..inputs()
        };

        // 0.8 × (1 - 0.3 × 0.5)
        assert_eq!(calculate_decision_factors(&high_income).tax_efficiency, dec!(0.68));
        // 0.68 × 0.907
        assert_eq!(calculate_decision_factors(&california).tax_efficiency, dec!(0.6168));
    }

    #[test]
    fn timing_rises_as_expiration_nears() {
        let soon = DecisionInputs {
            years_to_expiration: dec!(1),
            ..inputs()
        };
        let distant = DecisionInputs {
            years_to_expiration: dec!(12),
            ..inputs()
        };

        assert_eq!(calculate_decision_factors(&soon).timing, dec!(0.9));
        assert_eq!(calculate_decision_factors(&distant).timing, dec!(0));
    }
}
