//! Built-in federal tax tables and state planning rates.
//!
//! Figures are from the IRS revenue procedures for each year (Rev. Proc.
//! 2023-34 for 2024, Rev. Proc. 2024-40 for 2025). Ordinary brackets can be
//! replaced at runtime from a bracket CSV.

mod state;
mod year_2024;
mod year_2025;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub use state::state_tax_rate;

use crate::models::{FilingStatusCode, TaxBracket, TaxTables};

/// Most recent year with built-in tables; the default `tax_year`.
pub const LATEST_TAX_YEAR: i32 = 2025;

/// Marginal rates shared by every ordinary schedule, lowest first.
const ORDINARY_RATES: [Decimal; 7] = [
    dec!(0.10),
    dec!(0.12),
    dec!(0.22),
    dec!(0.24),
    dec!(0.32),
    dec!(0.35),
    dec!(0.37),
];

impl TaxTables {
    /// Tables for every year shipped with the crate.
    pub fn builtin() -> Self {
        let mut tables = Self::new();
        tables.insert(year_2024::table());
        tables.insert(year_2025::table());
        tables
    }
}

/// Builds one ordinary schedule from the upper bound and the base tax of
/// each bracket below the top one, plus the base tax of the top bracket.
fn ordinary_schedule(
    tax_year: i32,
    filing_status: FilingStatusCode,
    upper_bounds: [Decimal; 6],
    base_taxes: [Decimal; 7],
) -> Vec<TaxBracket> {
    let mut min_income = Decimal::ZERO;
    let mut brackets = Vec::with_capacity(ORDINARY_RATES.len());

    for (i, (rate, base_tax)) in ORDINARY_RATES.into_iter().zip(base_taxes).enumerate() {
        let max_income = upper_bounds.get(i).copied();
        brackets.push(TaxBracket {
            tax_year,
            filing_status,
            min_income,
            max_income,
            tax_rate: rate,
            base_tax,
        });
        if let Some(max) = max_income {
            min_income = max;
        }
    }

    brackets
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::common::round_half_up;

    #[test]
    fn builtin_covers_every_status_for_every_year() {
        let tables = TaxTables::builtin();

        assert_eq!(tables.years().collect::<Vec<_>>(), vec![2024, LATEST_TAX_YEAR]);
        for year in tables.years() {
            let table = tables.year(year);
            for status in FilingStatusCode::ALL {
                assert!(
                    table.and_then(|t| t.status(status)).is_some(),
                    "{year} is missing {}",
                    status.as_str()
                );
            }
        }
    }

    /// Each base tax must equal the tax owed at the top of the bracket below.
    #[test]
    fn builtin_base_taxes_are_consistent() {
        let tables = TaxTables::builtin();

        for year in tables.years() {
            let Some(table) = tables.year(year) else {
                continue;
            };
            for (status, status_table) in &table.filing_statuses {
                for pair in status_table.ordinary_brackets.windows(2) {
                    let (lower, upper) = (&pair[0], &pair[1]);
                    let Some(max) = lower.max_income else {
                        panic!("open bracket below the top for {year} {status:?}");
                    };
                    let expected =
                        round_half_up(lower.base_tax + (max - lower.min_income) * lower.tax_rate);
                    assert_eq!(
                        upper.base_tax, expected,
                        "{year} {status:?} bracket starting at {}",
                        upper.min_income
                    );
                    assert_eq!(upper.min_income, max);
                }
            }
        }
    }

    #[test]
    fn top_bracket_is_open_ended() {
        let tables = TaxTables::builtin();
        let top = tables
            .year(2025)
            .and_then(|t| t.status(FilingStatusCode::Single))
            .and_then(|t| t.ordinary_brackets.last())
            .cloned();

        assert_eq!(top.map(|b| (b.min_income, b.max_income)), Some((dec!(626350), None)));
    }
}
