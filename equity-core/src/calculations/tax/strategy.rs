use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::brackets::checked_flat_tax;
use super::{TaxEngine, TaxError, comprehensive_tax_lenient, economic_gain};
use crate::models::{Grant, TaxResult, TaxSettings, TaxTables};

/// Flat rate of the simplified strategy when none is configured.
pub const DEFAULT_FLAT_RATE: Decimal = dec!(0.30);

/// How much tax detail a calculation uses.
///
/// `Simplified` taxes the whole gain as federal tax at one rate.
/// `Comprehensive` runs the bracket, capital gains, AMT and state
/// computations of [`TaxEngine::comprehensive_tax`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TaxStrategy {
    Simplified { rate: Decimal },
    Comprehensive { settings: TaxSettings },
}

impl Default for TaxStrategy {
    fn default() -> Self {
        Self::Simplified {
            rate: DEFAULT_FLAT_RATE,
        }
    }
}

impl TaxStrategy {
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidGrant`] for an invalid grant,
    /// [`TaxError::Overflow`] when an amount is not representable and, for
    /// the comprehensive strategy, [`TaxError::UnknownTaxYear`] or a table
    /// error.
    pub fn tax_result(
        &self,
        tables: &TaxTables,
        grant: &Grant,
        strike_price: Decimal,
        exit_price: Decimal,
        shares: u64,
    ) -> Result<TaxResult, TaxError> {
        match self {
            Self::Simplified { rate } => {
                grant.validate()?;
                let gain = economic_gain(
                    grant.grant_type,
                    strike_price,
                    exit_price,
                    Decimal::from(shares),
                )?;
                let federal = checked_flat_tax(gain, *rate)?;
                TaxResult::checked_from_components(federal, Decimal::ZERO, Decimal::ZERO, gain)
                    .ok_or(TaxError::Overflow)
            }
            Self::Comprehensive { settings } => TaxEngine::new(tables, settings.tax_year)?
                .comprehensive_tax(grant, strike_price, exit_price, shares, settings),
        }
    }

    /// Like [`TaxStrategy::tax_result`], but never fails: unknown years use
    /// the most recent table and any other error yields a zeroed result.
    pub fn tax_result_or_default(
        &self,
        tables: &TaxTables,
        grant: &Grant,
        strike_price: Decimal,
        exit_price: Decimal,
        shares: u64,
    ) -> TaxResult {
        match self {
            Self::Simplified { .. } => self
                .tax_result(tables, grant, strike_price, exit_price, shares)
                .unwrap_or_else(|error| {
                    warn!(%error, "simplified tax failed; using zero tax");
                    TaxResult::default()
                }),
            Self::Comprehensive { settings } => comprehensive_tax_lenient(
                tables,
                grant,
                strike_price,
                exit_price,
                shares,
                settings,
            ),
        }
    }
}
