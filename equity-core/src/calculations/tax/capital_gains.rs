use rust_decimal::Decimal;

use super::{TaxEngine, TaxError};
use crate::calculations::common::{non_negative, overlap, round_half_up};
use crate::models::FilingStatusCode;

impl TaxEngine<'_> {
    /// Federal tax on a capital gain realized on top of `total_income`.
    ///
    /// Long-term gains fill the 0%, 15% and 20% bands starting where
    /// `total_income` ends. Short-term gains are taxed as ordinary income.
    /// Losses owe nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError`] if the filing status has no table, (short term)
    /// the ordinary schedule cannot be applied, or `total_income + gain` is
    /// not representable.
    pub fn capital_gains_tax(
        &self,
        status: FilingStatusCode,
        gain: Decimal,
        total_income: Decimal,
        is_long_term: bool,
    ) -> Result<Decimal, TaxError> {
        if !is_long_term {
            return self.ordinary_income_tax(status, gain, total_income);
        }

        let thresholds = self.status_table(status)?.long_term_gains;
        let gain = non_negative(gain);
        if gain.is_zero() {
            return Ok(Decimal::ZERO);
        }

        let start = non_negative(total_income);
        let end = start.checked_add(gain).ok_or(TaxError::Overflow)?;
        let mid_band = overlap(
            start,
            end,
            thresholds.zero_rate_max,
            Some(thresholds.fifteen_rate_max),
        );
        let top_band = overlap(start, end, thresholds.fifteen_rate_max, None);

        let mid_tax = mid_band.checked_mul(self.table.ltcg_mid_rate);
        let top_tax = top_band.checked_mul(self.table.ltcg_top_rate);
        mid_tax
            .zip(top_tax)
            .and_then(|(mid, top)| mid.checked_add(top))
            .map(round_half_up)
            .ok_or(TaxError::Overflow)
    }
}
