mod decision;
mod filing_status;
mod grant;
mod scenario_result;
mod tax_bracket;
mod tax_result;
mod tax_settings;
mod tax_table;

pub use decision::{CompanyStage, DecisionFactors, DecisionInputs, Recommendation};
pub use filing_status::FilingStatusCode;
pub use grant::{Grant, GrantError, GrantInput, GrantType, VestingSchedule, parse_date};
pub use scenario_result::ScenarioResult;
pub use tax_bracket::TaxBracket;
pub use tax_result::TaxResult;
pub use tax_settings::TaxSettings;
pub use tax_table::{
    AmtParameters, FilingStatusTable, LongTermGainsThresholds, TaxTables, TaxYearTable,
};
