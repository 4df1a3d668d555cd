use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::{non_negative, round_half_up, round_ratio};

/// Tax owed on one equity event, split by component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResult {
    pub federal_tax: Decimal,
    pub state_tax: Decimal,
    pub amt_liability: Decimal,
    pub total_tax: Decimal,

    /// `total_tax / gain`, or zero when there is no gain.
    pub effective_tax_rate: Decimal,
}

impl TaxResult {
    /// Builds a result from its components, rounding each to cents.
    ///
    /// Negative components are floored at zero, so `total_tax` is never
    /// negative. A total or rate too large to represent is logged and the
    /// result is zeroed.
    pub fn from_components(
        federal_tax: Decimal,
        state_tax: Decimal,
        amt_liability: Decimal,
        gain: Decimal,
    ) -> Self {
        Self::checked_from_components(federal_tax, state_tax, amt_liability, gain)
            .unwrap_or_else(|| {
                warn!(%federal_tax, %state_tax, %amt_liability, %gain, "tax total overflowed; using zero");
                Self::default()
            })
    }

    /// Like [`TaxResult::from_components`], but `None` when the total or the
    /// effective rate is not representable.
    pub fn checked_from_components(
        federal_tax: Decimal,
        state_tax: Decimal,
        amt_liability: Decimal,
        gain: Decimal,
    ) -> Option<Self> {
        let federal_tax = round_half_up(non_negative(federal_tax));
        let state_tax = round_half_up(non_negative(state_tax));
        let amt_liability = round_half_up(non_negative(amt_liability));
        let total_tax = federal_tax.checked_add(state_tax)?.checked_add(amt_liability)?;
        let effective_tax_rate = if gain > Decimal::ZERO {
            round_ratio(total_tax.checked_div(gain)?)
        } else {
            Decimal::ZERO
        };

        Some(Self {
            federal_tax,
            state_tax,
            amt_liability,
            total_tax,
            effective_tax_rate,
        })
    }
}
