use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FilingStatusCode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub tax_year: i32,
    pub filing_status: FilingStatusCode,
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
    pub base_tax: Decimal,
}

impl TaxBracket {
    /// Returns `true` when `income` falls in `(min_income, max_income]`.
    ///
    /// An open-ended bracket (`max_income == None`) contains every income
    /// above its minimum.
    pub fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        income > self.min_income && self.max_income.is_none_or(|max| income <= max)
    }
}
