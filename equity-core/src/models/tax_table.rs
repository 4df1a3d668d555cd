//! Year-keyed tax parameters: ordinary brackets, long-term capital gains
//! thresholds and AMT parameters per filing status.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{FilingStatusCode, TaxBracket};

/// Upper bounds of the 0% and 15% long-term capital gains bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongTermGainsThresholds {
    pub zero_rate_max: Decimal,
    pub fifteen_rate_max: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtParameters {
    pub exemption: Decimal,

    /// Income above which the exemption starts phasing out.
    pub phaseout_start: Decimal,

    /// Taxable AMT income above which the high rate applies.
    pub rate_threshold: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingStatusTable {
    /// Ascending, contiguous brackets; the last one is open-ended.
    pub ordinary_brackets: Vec<TaxBracket>,
    pub long_term_gains: LongTermGainsThresholds,
    pub amt: AmtParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearTable {
    pub tax_year: i32,
    pub ltcg_mid_rate: Decimal,
    pub ltcg_top_rate: Decimal,
    pub amt_low_rate: Decimal,
    pub amt_high_rate: Decimal,
    pub amt_phaseout_rate: Decimal,
    pub filing_statuses: BTreeMap<FilingStatusCode, FilingStatusTable>,
}

impl TaxYearTable {
    /// An empty table carrying the statutory rates, which have not changed
    /// across the supported years.
    pub fn new(tax_year: i32) -> Self {
        Self {
            tax_year,
            ltcg_mid_rate: dec!(0.15),
            ltcg_top_rate: dec!(0.20),
            amt_low_rate: dec!(0.26),
            amt_high_rate: dec!(0.28),
            amt_phaseout_rate: dec!(0.25),
            filing_statuses: BTreeMap::new(),
        }
    }

    pub fn with_status(
        mut self,
        status: FilingStatusCode,
        table: FilingStatusTable,
    ) -> Self {
        self.filing_statuses.insert(status, table);
        self
    }

    pub fn status(
        &self,
        status: FilingStatusCode,
    ) -> Option<&FilingStatusTable> {
        self.filing_statuses.get(&status)
    }

    /// Replaces the ordinary brackets of `status`, returning `false` when the
    /// status has no table in this year.
    pub fn replace_brackets(
        &mut self,
        status: FilingStatusCode,
        mut brackets: Vec<TaxBracket>,
    ) -> bool {
        match self.filing_statuses.get_mut(&status) {
            Some(table) => {
                brackets.sort_by(|a, b| a.min_income.cmp(&b.min_income));
                table.ordinary_brackets = brackets;
                true
            }
            None => false,
        }
    }
}

/// Tax parameters for every known year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTables(BTreeMap<i32, TaxYearTable>);

impl TaxTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        table: TaxYearTable,
    ) {
        self.0.insert(table.tax_year, table);
    }

    pub fn year(
        &self,
        tax_year: i32,
    ) -> Option<&TaxYearTable> {
        self.0.get(&tax_year)
    }

    pub fn year_mut(
        &mut self,
        tax_year: i32,
    ) -> Option<&mut TaxYearTable> {
        self.0.get_mut(&tax_year)
    }

    /// The most recent year on file.
    pub fn latest(&self) -> Option<&TaxYearTable> {
        self.0.values().next_back()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
