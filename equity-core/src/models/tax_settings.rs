use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FilingStatusCode;
use crate::tables::LATEST_TAX_YEAR;

/// Taxpayer context for computing the tax on an equity event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxSettings {
    pub filing_status: FilingStatusCode,

    /// Two-letter state code, e.g. `CA`.
    pub state_of_residence: String,

    /// Annual taxable income excluding the equity event.
    pub ordinary_income: Decimal,

    /// Whether to compute alternative minimum tax on ISO exercises.
    pub use_amt: bool,

    /// Selects the bracket table.
    pub tax_year: i32,

    /// Whether shares are held long enough for long-term capital gains
    /// treatment (and, for ISOs, a qualifying disposition).
    pub long_term_holding: bool,
}

impl Default for TaxSettings {
    fn default() -> Self {
        Self {
            filing_status: FilingStatusCode::Single,
            state_of_residence: String::new(),
            ordinary_income: Decimal::ZERO,
            use_amt: true,
            tax_year: LATEST_TAX_YEAR,
            long_term_holding: true,
        }
    }
}
