use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{TaxEngine, TaxError};
use crate::calculations::common::{non_negative, round_half_up};
use crate::models::FilingStatusCode;

impl TaxEngine<'_> {
    /// Tax on `taxable_income` from the ordinary rate schedule.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError`] if the filing status has no table, the schedule
    /// is empty, or no bracket covers the income.
    pub fn bracket_tax(
        &self,
        status: FilingStatusCode,
        taxable_income: Decimal,
    ) -> Result<Decimal, TaxError> {
        if taxable_income <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }

        let brackets = &self.status_table(status)?.ordinary_brackets;
        if brackets.is_empty() {
            return Err(TaxError::NoTaxBrackets);
        }

        let bracket = brackets
            .iter()
            .find(|b| b.contains(taxable_income))
            .ok_or(TaxError::NoMatchingBracket(taxable_income))?;

        let marginal_income = taxable_income - bracket.min_income;
        let tax = marginal_income
            .checked_mul(bracket.tax_rate)
            .and_then(|marginal_tax| bracket.base_tax.checked_add(marginal_tax))
            .ok_or(TaxError::Overflow)?;

        Ok(round_half_up(tax))
    }

    /// Marginal tax of stacking `gain` on top of `total_income`.
    ///
    /// Negative gains and incomes are treated as zero.
    ///
    /// # Errors
    ///
    /// See [`TaxEngine::bracket_tax`]. Returns [`TaxError::Overflow`] when
    /// `total_income + gain` is not representable.
    pub fn ordinary_income_tax(
        &self,
        status: FilingStatusCode,
        gain: Decimal,
        total_income: Decimal,
    ) -> Result<Decimal, TaxError> {
        let gain = non_negative(gain);
        if gain.is_zero() {
            // A missing table is an error even when there is nothing to tax.
            self.status_table(status)?;
            return Ok(Decimal::ZERO);
        }

        let base = non_negative(total_income);
        let stacked = base.checked_add(gain).ok_or(TaxError::Overflow)?;
        let with_gain = self.bracket_tax(status, stacked)?;
        let without_gain = self.bracket_tax(status, base)?;
        let tax = with_gain - without_gain;

        debug!(
            tax_year = self.tax_year(),
            status = status.as_str(),
            %gain,
            %base,
            %tax,
            "ordinary income tax"
        );
        Ok(tax)
    }
}

/// Simplified ordinary income tax: `gain × flat_rate`, rounded to cents.
///
/// Negative gains and rates are treated as zero. A product too large to
/// represent is logged and read as zero.
pub fn ordinary_income_tax_flat(
    gain: Decimal,
    flat_rate: Decimal,
) -> Decimal {
    checked_flat_tax(gain, flat_rate).unwrap_or_else(|error| {
        warn!(%gain, %flat_rate, %error, "flat tax overflowed; using zero");
        Decimal::ZERO
    })
}

pub(crate) fn checked_flat_tax(
    gain: Decimal,
    flat_rate: Decimal,
) -> Result<Decimal, TaxError> {
    non_negative(gain)
        .checked_mul(non_negative(flat_rate))
        .map(round_half_up)
        .ok_or(TaxError::Overflow)
}
