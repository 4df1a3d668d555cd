use rust_decimal_macros::dec;

use super::ordinary_schedule;
use crate::models::{
    AmtParameters, FilingStatusCode, FilingStatusTable, LongTermGainsThresholds, TaxYearTable,
};

const YEAR: i32 = 2024;

pub(super) fn table() -> TaxYearTable {
    use FilingStatusCode::*;

    let joint = FilingStatusTable {
        ordinary_brackets: ordinary_schedule(
            YEAR,
            MarriedFilingJointly,
            [
                dec!(23200),
                dec!(94300),
                dec!(201050),
                dec!(383900),
                dec!(487450),
                dec!(731200),
            ],
            [
                dec!(0),
                dec!(2320),
                dec!(10852),
                dec!(34337),
                dec!(78221),
                dec!(111357),
                dec!(196669.50),
            ],
        ),
        long_term_gains: LongTermGainsThresholds {
            zero_rate_max: dec!(94050),
            fifteen_rate_max: dec!(583750),
        },
        amt: AmtParameters {
            exemption: dec!(133300),
            phaseout_start: dec!(1218700),
            rate_threshold: dec!(232600),
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
                        dec!(11600),
                        dec!(47150),
                        dec!(100525),
                        dec!(191950),
                        dec!(243725),
                        dec!(609350),
                    ],
                    [
                        dec!(0),
                        dec!(1160),
                        dec!(5426),
                        dec!(17168.50),
                        dec!(39110.50),
                        dec!(55678.50),
                        dec!(183647.25),
                    ],
                ),
                long_term_gains: LongTermGainsThresholds {
                    zero_rate_max: dec!(47025),
                    fifteen_rate_max: dec!(518900),
                },
                amt: AmtParameters {
                    exemption: dec!(85700),
                    phaseout_start: dec!(609350),
                    rate_threshold: dec!(232600),
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
                        dec!(11600),
                        dec!(47150),
                        dec!(100525),
                        dec!(191950),
                        dec!(243725),
                        dec!(365600),
                    ],
                    [
                        dec!(0),
                        dec!(1160),
                        dec!(5426),
                        dec!(17168.50),
                        dec!(39110.50),
                        dec!(55678.50),
                        dec!(98334.75),
                    ],
                ),
                long_term_gains: LongTermGainsThresholds {
                    zero_rate_max: dec!(47025),
                    fifteen_rate_max: dec!(291850),
                },
                amt: AmtParameters {
                    exemption: dec!(66650),
                    phaseout_start: dec!(609350),
                    rate_threshold: dec!(116300),
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
                        dec!(16550),
                        dec!(63100),
                        dec!(100500),
                        dec!(191950),
                        dec!(243700),
                        dec!(609350),
                    ],
                    [
                        dec!(0),
                        dec!(1655),
                        dec!(7241),
                        dec!(15469),
                        dec!(37417),
                        dec!(53977),
                        dec!(181954.50),
                    ],
                ),
                long_term_gains: LongTermGainsThresholds {
                    zero_rate_max: dec!(63000),
                    fifteen_rate_max: dec!(551350),
                },
                amt: AmtParameters {
                    exemption: dec!(85700),
                    phaseout_start: dec!(609350),
                    rate_threshold: dec!(232600),
                },
            },
        )
        .with_status(QualifyingSurvivingSpouse, surviving_spouse)
}
