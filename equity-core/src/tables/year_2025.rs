use rust_decimal_macros::dec;

use super::ordinary_schedule;
use crate::models::{
    AmtParameters, FilingStatusCode, FilingStatusTable, LongTermGainsThresholds, TaxYearTable,
};

const YEAR: i32 = 2025;

pub(super) fn table() -> TaxYearTable {
    use FilingStatusCode::*;

    let joint = FilingStatusTable {
        ordinary_brackets: ordinary_schedule(
            YEAR,
            MarriedFilingJointly,
            [
                dec!(23850),
                dec!(96950),
                dec!(206700),
                dec!(394600),
                dec!(501050),
                dec!(751600),
            ],
            [
                dec!(0),
                dec!(2385),
                dec!(11157),
                dec!(35302),
                dec!(80398),
                dec!(114462),
                dec!(202154.50),
            ],
        ),
        long_term_gains: LongTermGainsThresholds {
            zero_rate_max: dec!(96700),
            fifteen_rate_max: dec!(600050),
        },
        amt: AmtParameters {
            exemption: dec!(137000),
            phaseout_start: dec!(1252700),
            rate_threshold: dec!(239100),
        },
    };

    let mut surviving_spouse = joint.clone();
    for bracket in &mut surviving_spouse.ordinary_brackets {
        bracket.filing_status = QualifyingSurvivingSpouse;
    }

    TaxYearTable::new(YEAR)
        .with_status(
            Single,
            FilingStatusTable {
                ordinary_brackets: ordinary_schedule(
                    YEAR,
                    Single,
                    [
                        dec!(11925),
                        dec!(48475),
                        dec!(103350),
                        dec!(197300),
                        dec!(250525),
                        dec!(626350),
                    ],
                    [
                        dec!(0),
                        dec!(1192.50),
                        dec!(5578.50),
                        dec!(17651),
                        dec!(40199),
                        dec!(57231),
                        dec!(188769.75),
                    ],
                ),
                long_term_gains: LongTermGainsThresholds {
                    zero_rate_max: dec!(48350),
                    fifteen_rate_max: dec!(533400),
                },
                amt: AmtParameters {
                    exemption: dec!(88100),
                    phaseout_start: dec!(626350),
                    rate_threshold: dec!(239100),
                },
            },
        )
        .with_status(MarriedFilingJointly, joint)
        .with_status(
            MarriedFilingSeparately,
            FilingStatusTable {
                ordinary_brackets: ordinary_schedule(
                    YEAR,
                    MarriedFilingSeparately,
                    [
                        dec!(11925),
                        dec!(48475),
                        dec!(103350),
                        dec!(197300),
                        dec!(250525),
                        dec!(375800),
                    ],
                    [
                        dec!(0),
                        dec!(1192.50),
                        dec!(5578.50),
                        dec!(17651),
                        dec!(40199),
                        dec!(57231),
                        dec!(101077.25),
                    ],
                ),
                long_term_gains: LongTermGainsThresholds {
                    zero_rate_max: dec!(48350),
                    fifteen_rate_max: dec!(300000),
                },
                amt: AmtParameters {
                    exemption: dec!(68500),
                    phaseout_start: dec!(626350),
                    rate_threshold: dec!(119550),
                },
            },
        )
        .with_status(
            HeadOfHousehold,
            FilingStatusTable {
                ordinary_brackets: ordinary_schedule(
                    YEAR,
                    HeadOfHousehold,
                    [
                        dec!(17000),
                        dec!(64850),
                        dec!(103350),
                        dec!(197300),
                        dec!(250500),
                        dec!(626350),
                    ],
                    [
                        dec!(0),
                        dec!(1700),
                        dec!(7442),
                        dec!(15912),
                        dec!(38460),
                        dec!(55484),
                        dec!(187031.50),
                    ],
                ),
                long_term_gains: LongTermGainsThresholds {
                    zero_rate_max: dec!(64750),
                    fifteen_rate_max: dec!(566700),
                },
                amt: AmtParameters {
                    exemption: dec!(88100),
                    phaseout_start: dec!(626350),
                    rate_threshold: dec!(239100),
                },
            },
        )
        .with_status(QualifyingSurvivingSpouse, surviving_spouse)
}
