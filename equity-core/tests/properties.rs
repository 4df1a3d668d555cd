//! Invariants that must hold across whole input ranges, not just examples.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use equity_core::calculations::{
    ScenarioEvaluator, TaxStrategy, calculate_decision_factors, calculate_scenario_result,
    calculate_vested_shares,
};
use equity_core::{
    CompanyStage, DecisionInputs, FilingStatusCode, Grant, GrantType, TaxSettings, TaxTables,
    VestingSchedule,
};

fn date(
    y: i32,
    m: u32,
    d: u32,
) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn four_year_grant(
    shares: u64,
    grant_type: GrantType,
) -> Grant {
    Grant {
        name: None,
        shares,
        grant_type,
        strike_price: dec!(2.50),
        current_fair_market_value: dec!(10.00),
        vesting_start_date: date(2023, 1, 1),
        vesting_cliff_date: date(2024, 1, 1),
        vesting_end_date: date(2027, 1, 1),
        vesting_schedule: VestingSchedule::Monthly,
        vested_shares: None,
    }
}

// =============================================================================
// Vesting
// =============================================================================

#[test]
fn vesting_examples() {
    let grant = four_year_grant(1000, GrantType::Iso);

    assert_eq!(calculate_vested_shares(Some(&grant), Some(date(2024, 1, 2))), 250);
    assert_eq!(calculate_vested_shares(Some(&grant), Some(date(2027, 1, 2))), 1000);
    assert_eq!(calculate_vested_shares(Some(&grant), Some(date(2023, 6, 1))), 0);
}

#[test]
fn vesting_is_monotonic_and_bounded() {
    for shares in [1, 7, 1000, 48_000, 1_000_003] {
        let grant = four_year_grant(shares, GrantType::Nso);
        let mut previous = 0;
        let mut day = date(2022, 12, 1);

        while day <= date(2027, 2, 1) {
            let vested = calculate_vested_shares(Some(&grant), Some(day));
            assert!(vested >= previous, "{shares} shares went down on {day}");
            assert!(vested <= shares, "{shares} shares exceeded on {day}");
            previous = vested;
            day += Duration::days(3);
        }
    }
}

#[test]
fn vesting_boundaries_are_exact() {
    let grant = four_year_grant(999, GrantType::Rsu);

    assert_eq!(
        calculate_vested_shares(Some(&grant), Some(grant.vesting_end_date)),
        999
    );
    assert_eq!(
        calculate_vested_shares(
            Some(&grant),
            Some(grant.vesting_cliff_date - Duration::days(1))
        ),
        0
    );
}

#[test]
fn precomputed_vested_shares_win() {
    let grant = Grant {
        vested_shares: Some(123),
        ..four_year_grant(1000, GrantType::Iso)
    };

    assert_eq!(calculate_vested_shares(Some(&grant), Some(date(2020, 1, 1))), 123);
}

// =============================================================================
// Scenarios and tax
// =============================================================================

#[test]
fn net_proceeds_identity_holds_everywhere() {
    let tables = TaxTables::builtin();
    let strategies = [
        TaxStrategy::default(),
        TaxStrategy::Comprehensive {
            settings: TaxSettings {
                state_of_residence: "NY".to_string(),
                ordinary_income: dec!(250000),
                ..TaxSettings::default()
            },
        },
        TaxStrategy::Comprehensive {
            settings: TaxSettings {
                filing_status: FilingStatusCode::MarriedFilingJointly,
                long_term_holding: false,
                tax_year: 2024,
                ..TaxSettings::default()
            },
        },
    ];

    for strategy in strategies {
        let evaluator = ScenarioEvaluator::new(&tables, strategy);
        for grant_type in [GrantType::Iso, GrantType::Nso, GrantType::Rsu] {
            let grant = four_year_grant(10_000, grant_type);
            for exit in [dec!(0), dec!(1), dec!(2.5), dec!(10), dec!(15), dec!(250)] {
                for shares in [0_u64, 1, 500, 10_000] {
                    let result = evaluator.evaluate(Some(&grant), exit, shares, "grid");

                    assert_eq!(
                        result.net_proceeds,
                        result.gross_proceeds - result.exercise_cost - result.tax_liability
                    );
                    assert!(result.tax_liability >= Decimal::ZERO);
                }
            }
        }
    }
}

#[test]
fn scenario_example() {
    let grant = four_year_grant(1000, GrantType::Iso);

    let result = calculate_scenario_result(Some(&grant), dec!(15), 500_u64, "Test");

    assert_eq!(result.exercise_cost, dec!(1250));
    assert_eq!(result.gross_proceeds, dec!(7500));
}

#[test]
fn calculations_are_idempotent() {
    let tables = TaxTables::builtin();
    let evaluator = ScenarioEvaluator::new(
        &tables,
        TaxStrategy::Comprehensive {
            settings: TaxSettings::default(),
        },
    );
    let grant = four_year_grant(1000, GrantType::Nso);

    let first = evaluator.evaluate(Some(&grant), dec!(33.33), 777_u64, "again");
    let second = evaluator.evaluate(Some(&grant), dec!(33.33), 777_u64, "again");

    assert_eq!(first, second);
}

// =============================================================================
// Decision factors
// =============================================================================

#[test]
fn decision_factors_stay_in_unit_interval() {
    let unit = Decimal::ZERO..=Decimal::ONE;

    for stage in [CompanyStage::Early, CompanyStage::Growth, CompanyStage::Late] {
        for option_type in [GrantType::Iso, GrantType::Nso, GrantType::Rsu] {
            for growth_rate in [dec!(-5), dec!(-0.5), dec!(0), dec!(0.4), dec!(3)] {
                for available_cash in [dec!(-100), dec!(0), dec!(1000), dec!(1000000)] {
                    for years_to_expiration in [dec!(-1), dec!(0), dec!(4), dec!(30)] {
                        let factors = calculate_decision_factors(&DecisionInputs {
                            strike_price: dec!(1.25),
                            vested_shares: 4000,
                            available_cash,
                            current_income: dec!(750000),
                            company_stage: stage,
                            growth_rate,
                            option_type,
                            state: "CA".to_string(),
                            years_to_expiration,
                        });

                        for score in [
                            factors.financial_capacity,
                            factors.company_outlook,
                            factors.tax_efficiency,
                            factors.timing,
                        ] {
                            assert!(unit.contains(&score), "{factors:?}");
                        }
                    }
                }
            }
        }
    }
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn core_types_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<Grant>();
    assert_send_sync::<TaxTables>();
    assert_send_sync::<TaxStrategy>();
    assert_send_sync::<ScenarioEvaluator<'static>>();
}
