//! Alternative minimum tax.
//!
//! | Step | Computation |
//! |------|-------------|
//! | 1    | exemption − 25% × max(0, AMT income − phase-out start), minimum 0 |
//! | 2    | taxable = max(0, AMT income − exemption) |
//! | 3    | TMT = 26% of taxable up to the rate threshold, 28% above |
//! | 4    | AMT = max(0, TMT − regular tax) |
//!
//! Negative AMT income and regular tax are read as zero.

use rust_decimal::Decimal;
use tracing::debug;

use super::{TaxEngine, TaxError};
use crate::calculations::common::{non_negative, round_half_up};
use crate::models::FilingStatusCode;

impl TaxEngine<'_> {
    /// AMT exemption after the phase-out for `amt_income`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::MissingFilingStatus`] if the status has no table.
    pub fn amt_exemption(
        &self,
        status: FilingStatusCode,
        amt_income: Decimal,
    ) -> Result<Decimal, TaxError> {
        let amt = self.status_table(status)?.amt;
        let amt_income = non_negative(amt_income);
        let reduction =
            self.table.amt_phaseout_rate * non_negative(amt_income - amt.phaseout_start);
        Ok(round_half_up(non_negative(amt.exemption - reduction)))
    }

    /// Tentative minimum tax on `amt_income`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::MissingFilingStatus`] if the status has no table.
    pub fn tentative_minimum_tax(
        &self,
        status: FilingStatusCode,
        amt_income: Decimal,
    ) -> Result<Decimal, TaxError> {
        let threshold = self.status_table(status)?.amt.rate_threshold;
        let amt_income = non_negative(amt_income);
        let exemption = self.amt_exemption(status, amt_income)?;
        let taxable = non_negative(amt_income - exemption);

        let low = taxable.min(threshold) * self.table.amt_low_rate;
        let high = non_negative(taxable - threshold) * self.table.amt_high_rate;

        Ok(round_half_up(low + high))
    }

    /// AMT owed on top of `regular_tax`; zero when regular tax already
    /// meets the tentative minimum tax.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::MissingFilingStatus`] if the status has no table.
    pub fn amt_liability(
        &self,
        status: FilingStatusCode,
        amt_income: Decimal,
        regular_tax: Decimal,
    ) -> Result<Decimal, TaxError> {
        let tentative = self.tentative_minimum_tax(status, amt_income)?;
        let liability = non_negative(tentative - non_negative(regular_tax));
        debug!(%amt_income, %tentative, %regular_tax, %liability, "amt liability");
        Ok(liability)
    }
}
