//! Federal and state tax on equity events.
//!
//! [`TaxEngine`] is the strict API: it borrows one [`TaxYearTable`] and
//! returns [`TaxError`] when the table or the grant cannot support the
//! computation. The free functions at the bottom of this module are the
//! lenient adapters used by form-driven callers; they never fail and log
//! whatever they had to paper over.
//!
//! # Components
//!
//! | Method                     | Computes |
//! |----------------------------|----------|
//! | `ordinary_income_tax`      | bracket tax of a gain stacked on other income |
//! | `capital_gains_tax`        | 0/15/20% bands (long term) or ordinary treatment |
//! | `amt_exemption`            | exemption after the 25% phase-out |
//! | `amt_liability`            | tentative minimum tax above regular tax |
//! | `comprehensive_tax`        | all of the above for one grant, plus state tax |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use equity_core::calculations::tax::TaxEngine;
//! use equity_core::models::{FilingStatusCode, TaxTables};
//!
//! let tables = TaxTables::builtin();
//! let engine = TaxEngine::new(&tables, 2025).unwrap();
//!
//! // $20,000 of long-term gain on top of $40,000 of income: the first
//! // $8,350 falls in the 0% band, the rest in the 15% band.
//! let tax = engine
//!     .capital_gains_tax(FilingStatusCode::Single, dec!(20000), dec!(40000), true)
//!     .unwrap();
//! assert_eq!(tax, dec!(1747.50));
//! ```

mod amt;
mod brackets;
mod capital_gains;
mod comprehensive;
mod strategy;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

pub use brackets::ordinary_income_tax_flat;
pub use strategy::{DEFAULT_FLAT_RATE, TaxStrategy};

use crate::calculations::coerce::{NumericInput, coerce_decimal, coerce_shares};
use crate::models::{
    FilingStatusCode, FilingStatusTable, Grant, GrantError, GrantType, TaxResult, TaxSettings,
    TaxTables, TaxYearTable,
};

/// Errors that can occur during tax calculations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxError {
    #[error("no tax tables for {0}")]
    UnknownTaxYear(i32),

    #[error("no tax tables loaded")]
    NoTaxTables,

    #[error("tax year {tax_year} has no table for filing status {status:?}")]
    MissingFilingStatus {
        tax_year: i32,
        status: FilingStatusCode,
    },

    #[error("no tax brackets provided")]
    NoTaxBrackets,

    #[error("no tax bracket found for taxable income {0}")]
    NoMatchingBracket(Decimal),

    #[error(transparent)]
    InvalidGrant(#[from] GrantError),

    #[error("amount too large to compute")]
    Overflow,
}

/// Strict tax calculator for one tax year.
#[derive(Debug, Clone, Copy)]
pub struct TaxEngine<'a> {
    table: &'a TaxYearTable,
}

impl<'a> TaxEngine<'a> {
    /// # Errors
    ///
    /// Returns [`TaxError::UnknownTaxYear`] when `tables` has no entry for
    /// `tax_year`.
    pub fn new(
        tables: &'a TaxTables,
        tax_year: i32,
    ) -> Result<Self, TaxError> {
        tables
            .year(tax_year)
            .map(Self::from_table)
            .ok_or(TaxError::UnknownTaxYear(tax_year))
    }

    /// Like [`TaxEngine::new`], but an unknown year falls back to the most
    /// recent one on file.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::NoTaxTables`] only when `tables` is empty.
    pub fn for_year_or_latest(
        tables: &'a TaxTables,
        tax_year: i32,
    ) -> Result<Self, TaxError> {
        if let Some(table) = tables.year(tax_year) {
            return Ok(Self::from_table(table));
        }
        let latest = tables.latest().ok_or(TaxError::NoTaxTables)?;
        warn!(
            requested = tax_year,
            using = latest.tax_year,
            "no tax tables for requested year; using the most recent year"
        );
        Ok(Self::from_table(latest))
    }

    pub fn from_table(table: &'a TaxYearTable) -> Self {
        Self { table }
    }

    pub fn tax_year(&self) -> i32 {
        self.table.tax_year
    }

    pub fn table(&self) -> &'a TaxYearTable {
        self.table
    }

    fn status_table(
        &self,
        status: FilingStatusCode,
    ) -> Result<&'a FilingStatusTable, TaxError> {
        self.table
            .status(status)
            .ok_or(TaxError::MissingFilingStatus {
                tax_year: self.table.tax_year,
                status,
            })
    }
}

/// Pre-tax profit of selling `shares` at `exit_price`.
///
/// Options are bought at `strike_price`; RSUs cost nothing.
pub(crate) fn economic_gain(
    grant_type: GrantType,
    strike_price: Decimal,
    exit_price: Decimal,
    shares: Decimal,
) -> Result<Decimal, TaxError> {
    let per_share = match grant_type {
        GrantType::Rsu => Some(exit_price),
        GrantType::Iso | GrantType::Nso => exit_price.checked_sub(strike_price),
    };
    per_share
        .and_then(|per_share| per_share.checked_mul(shares))
        .ok_or(TaxError::Overflow)
}

/// Ordinary income tax on `gain` that never fails.
///
/// With a positive `flat_rate` this is the simplified `gain × flat_rate`.
/// Otherwise the gain is taxed through the most recent single-filer
/// brackets, stacked on `total_income`. Unreadable input counts as zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use equity_core::calculations::tax::ordinary_income_tax;
///
/// assert_eq!(ordinary_income_tax("10,000", dec!(90000), "0.3"), dec!(3000));
/// assert_eq!(ordinary_income_tax(dec!(15000), dec!(85000), 0), dec!(3300));
/// ```
pub fn ordinary_income_tax(
    gain: impl NumericInput,
    total_income: impl NumericInput,
    flat_rate: impl NumericInput,
) -> Decimal {
    let gain = coerce_decimal(gain);
    let flat_rate = coerce_decimal(flat_rate);
    if flat_rate > Decimal::ZERO {
        return ordinary_income_tax_flat(gain, flat_rate);
    }

    let tables = TaxTables::builtin();
    let Some(latest) = tables.latest() else {
        return Decimal::ZERO;
    };
    TaxEngine::from_table(latest)
        .ordinary_income_tax(FilingStatusCode::Single, gain, coerce_decimal(total_income))
        .unwrap_or_else(|error| {
            warn!(%error, "ordinary income tax failed; using zero");
            Decimal::ZERO
        })
}

/// Comprehensive tax for form-driven callers, against the built-in tables.
///
/// * no grant or an invalid grant → zeroed [`TaxResult`] (logged)
/// * unknown `settings.tax_year` → most recent built-in year (logged)
/// * unreadable numbers → zero
pub fn comprehensive_tax(
    grant: Option<&Grant>,
    strike_price: impl NumericInput,
    exit_price: impl NumericInput,
    shares: impl NumericInput,
    settings: &TaxSettings,
) -> TaxResult {
    let Some(grant) = grant else {
        return TaxResult::default();
    };
    comprehensive_tax_lenient(
        &TaxTables::builtin(),
        grant,
        coerce_decimal(strike_price),
        coerce_decimal(exit_price),
        coerce_shares(shares),
        settings,
    )
}

pub(crate) fn comprehensive_tax_lenient(
    tables: &TaxTables,
    grant: &Grant,
    strike_price: Decimal,
    exit_price: Decimal,
    shares: u64,
    settings: &TaxSettings,
) -> TaxResult {
    TaxEngine::for_year_or_latest(tables, settings.tax_year)
        .and_then(|engine| {
            engine.comprehensive_tax(grant, strike_price, exit_price, shares, settings)
        })
        .unwrap_or_else(|error| {
            warn!(%error, grant = %grant.display_name(), "tax calculation failed; using zero tax");
            TaxResult::default()
        })
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::models::{Grant, GrantType, VestingSchedule};

    /// A fully vested grant with strike 2.50 and FMV 10.00.
    pub fn grant(grant_type: GrantType) -> Grant {
        Grant {
            name: Some("Test".to_string()),
            shares: 1000,
            grant_type,
            strike_price: dec!(2.50),
            current_fair_market_value: dec!(10.00),
            vesting_start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            vesting_cliff_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            vesting_end_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            vesting_schedule: VestingSchedule::Monthly,
            vested_shares: None,
        }
    }
}
