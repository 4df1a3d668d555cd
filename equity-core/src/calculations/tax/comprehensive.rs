//! Full tax on selling shares from one grant.
//!
//! | Grant             | Ordinary income          | Capital gain              | AMT |
//! |-------------------|--------------------------|---------------------------|-----|
//! | ISO, long term    | none                     | exit − strike             | spread is preference income |
//! | ISO, short term   | exit − strike            | none                      | none |
//! | NSO               | spread at exercise       | exit − max(FMV, strike)   | none |
//! | RSU               | FMV at vesting           | exit − FMV                | none |
//!
//! The spread is `(FMV − strike) × shares`, floored at zero. Capital gains
//! are stacked on the taxpayer's income plus any ordinary income from the
//! event. State tax is a flat planning rate on the whole gain.
//!
//! ISO AMT belongs to the exercise year: the spread is added to the
//! taxpayer's income and compared against regular tax on that income alone.
//! The sale's capital gain is taxed in a later year and does not offset it.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{TaxEngine, TaxError, economic_gain};
use crate::calculations::common::non_negative;
use crate::models::{Grant, GrantType, TaxResult, TaxSettings};
use crate::tables::state_tax_rate;

/// Federal tax and AMT of one event.
struct FederalTax {
    regular: Decimal,
    amt: Decimal,
}

impl TaxEngine<'_> {
    /// Tax on exercising (for options) and selling `shares` at `exit_price`.
    ///
    /// The engine's own tax year applies; `settings.tax_year` is only used
    /// by callers to pick the engine.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidGrant`] if the grant fails validation,
    /// [`TaxError::Overflow`] if an amount is not representable, or any table
    /// error from the underlying computations.
    pub fn comprehensive_tax(
        &self,
        grant: &Grant,
        strike_price: Decimal,
        exit_price: Decimal,
        shares: u64,
        settings: &TaxSettings,
    ) -> Result<TaxResult, TaxError> {
        grant.validate()?;

        let shares = Decimal::from(shares);
        let strike_price = non_negative(strike_price);
        let gain = economic_gain(grant.grant_type, strike_price, exit_price, shares)?;

        let federal = match grant.grant_type {
            GrantType::Iso => self.iso_tax(grant, strike_price, exit_price, shares, settings)?,
            GrantType::Nso => {
                self.income_then_gain_tax(grant, strike_price, exit_price, shares, settings)?
            }
            GrantType::Rsu => {
                self.income_then_gain_tax(grant, Decimal::ZERO, exit_price, shares, settings)?
            }
        };
        let state = state_tax(&settings.state_of_residence, gain)?;

        let result = TaxResult::checked_from_components(federal.regular, state, federal.amt, gain)
            .ok_or(TaxError::Overflow)?;
        debug!(
            grant = %grant.display_name(),
            tax_year = self.tax_year(),
            %gain,
            total_tax = %result.total_tax,
            "comprehensive tax"
        );
        Ok(result)
    }

    fn iso_tax(
        &self,
        grant: &Grant,
        strike_price: Decimal,
        exit_price: Decimal,
        shares: Decimal,
        settings: &TaxSettings,
    ) -> Result<FederalTax, TaxError> {
        let status = settings.filing_status;
        let income = non_negative(settings.ordinary_income);
        let gain = economic_gain(GrantType::Iso, strike_price, exit_price, shares)?;

        if !settings.long_term_holding {
            // Disqualifying disposition.
            return Ok(FederalTax {
                regular: self.ordinary_income_tax(status, gain, income)?,
                amt: Decimal::ZERO,
            });
        }

        let regular = self.capital_gains_tax(status, gain, income, true)?;
        if !settings.use_amt {
            return Ok(FederalTax {
                regular,
                amt: Decimal::ZERO,
            });
        }

        let preference = spread(grant.current_fair_market_value, strike_price, shares)?;
        let amt_income = income.checked_add(preference).ok_or(TaxError::Overflow)?;
        let exercise_year_regular = self.bracket_tax(status, income)?;
        let amt = self.amt_liability(status, amt_income, exercise_year_regular)?;

        Ok(FederalTax { regular, amt })
    }

    /// Ordinary income on the value received at exercise or vesting, then
    /// capital gain on the appreciation stacked above it.
    fn income_then_gain_tax(
        &self,
        grant: &Grant,
        strike_price: Decimal,
        exit_price: Decimal,
        shares: Decimal,
        settings: &TaxSettings,
    ) -> Result<FederalTax, TaxError> {
        let status = settings.filing_status;
        let income = non_negative(settings.ordinary_income);
        let fmv = grant.current_fair_market_value;

        let compensation = spread(fmv, strike_price, shares)?;
        let cost_basis = fmv.max(strike_price);
        let appreciation = exit_price
            .checked_sub(cost_basis)
            .and_then(|per_share| per_share.checked_mul(shares))
            .ok_or(TaxError::Overflow)?;
        let income_with_compensation =
            income.checked_add(compensation).ok_or(TaxError::Overflow)?;

        let ordinary = self.ordinary_income_tax(status, compensation, income)?;
        let capital = self.capital_gains_tax(
            status,
            appreciation,
            income_with_compensation,
            settings.long_term_holding,
        )?;

        Ok(FederalTax {
            regular: ordinary.checked_add(capital).ok_or(TaxError::Overflow)?,
            amt: Decimal::ZERO,
        })
    }
}

/// `(fmv − strike) × shares`, floored at zero.
fn spread(
    fair_market_value: Decimal,
    strike_price: Decimal,
    shares: Decimal,
) -> Result<Decimal, TaxError> {
    fair_market_value
        .checked_sub(strike_price)
        .map(non_negative)
        .and_then(|per_share| per_share.checked_mul(shares))
        .ok_or(TaxError::Overflow)
}

fn state_tax(
    state: &str,
    gain: Decimal,
) -> Result<Decimal, TaxError> {
    let rate = match state_tax_rate(state) {
        Some(rate) => rate,
        None if state.trim().is_empty() => Decimal::ZERO,
        None => {
            warn!(state, "no planning rate for state; state tax is zero");
            Decimal::ZERO
        }
    };
    non_negative(gain).checked_mul(rate).ok_or(TaxError::Overflow)
}
