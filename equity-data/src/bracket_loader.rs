use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use equity_core::{FilingStatusCode, TaxBracket, TaxTables};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading tax bracket data.
#[derive(Debug, Error)]
pub enum TaxBracketLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Tax year {0} has no built-in tables to attach brackets to")]
    TaxYearNotFound(i32),

    #[error("Tax year {tax_year} has no table for filing status {status}")]
    FilingStatusNotFound { tax_year: i32, status: String },

    #[error("Failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<csv::Error> for TaxBracketLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxBracketLoaderError::CsvParse(err.to_string())
    }
}

/// Maps IRS schedule codes to filing status codes.
///
/// - Schedule X → Single (S)
/// - Schedule Y-1 → Married Filing Jointly (MFJ) and Qualifying Surviving Spouse (QSS)
/// - Schedule Y-2 → Married Filing Separately (MFS)
/// - Schedule Z → Head of Household (HOH)
fn schedule_to_filing_status_codes(
    schedule: &str
) -> Result<Vec<FilingStatusCode>, TaxBracketLoaderError> {
    use FilingStatusCode::*;

    match schedule.trim() {
        "X" => Ok(vec![Single]),
        "Y-1" => Ok(vec![MarriedFilingJointly, QualifyingSurvivingSpouse]),
        "Y-2" => Ok(vec![MarriedFilingSeparately]),
        "Z" => Ok(vec![HeadOfHousehold]),
        _ => Err(TaxBracketLoaderError::InvalidSchedule(schedule.to_string())),
    }
}

/// A single record from the tax brackets CSV file.
///
/// - `tax_year`: the tax year (e.g., 2025)
/// - `schedule`: the IRS schedule code (X, Y-1, Y-2, Z)
/// - `min_income`: the minimum income for this bracket
/// - `max_income`: the maximum income for this bracket (empty for unlimited)
/// - `base_tax`: the tax owed at `min_income`
/// - `rate`: the marginal tax rate as a decimal (e.g., 0.10 for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxBracketRecord {
    pub tax_year: i32,
    pub schedule: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub base_tax: Decimal,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for ordinary tax bracket schedules from CSV files.
///
/// Loaded schedules replace the ordinary brackets of years already present
/// in a [`TaxTables`]; the capital gains and AMT parameters of that year
/// are kept.
pub struct TaxBracketLoader;

impl TaxBracketLoader {
    /// Parse tax bracket records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxBracketRecord>, TaxBracketLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TaxBracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    pub fn parse_file(path: &Path) -> Result<Vec<TaxBracketRecord>, TaxBracketLoaderError> {
        let file = File::open(path).map_err(|source| TaxBracketLoaderError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(file)
    }

    /// Load tax bracket records into `tables`.
    ///
    /// Records are grouped by (tax_year, schedule). Every group replaces the
    /// ordinary brackets of each filing status its schedule maps to, so
    /// loading the same file twice gives the same tables. Schedule Y-1 fills
    /// both MFJ and QSS.
    ///
    /// Nothing is changed unless every group can be applied.
    ///
    /// Returns the number of brackets installed.
    pub fn load(
        tables: &mut TaxTables,
        records: &[TaxBracketRecord],
    ) -> Result<usize, TaxBracketLoaderError> {
        let mut groups: BTreeMap<(i32, &str), Vec<&TaxBracketRecord>> = BTreeMap::new();
        for record in records {
            groups
                .entry((record.tax_year, record.schedule.trim()))
                .or_default()
                .push(record);
        }

        let mut replacements = Vec::new();
        for ((tax_year, schedule), group_records) in groups {
            let year = tables
                .year(tax_year)
                .ok_or(TaxBracketLoaderError::TaxYearNotFound(tax_year))?;

            for status in schedule_to_filing_status_codes(schedule)? {
                if year.status(status).is_none() {
                    return Err(TaxBracketLoaderError::FilingStatusNotFound {
                        tax_year,
                        status: status.as_str().to_string(),
                    });
                }
                let brackets: Vec<TaxBracket> = group_records
                    .iter()
                    .map(|record| TaxBracket {
                        tax_year,
                        filing_status: status,
                        min_income: record.min_income,
                        max_income: record.max_income,
                        tax_rate: record.rate,
                        base_tax: record.base_tax,
                    })
                    .collect();
                debug!(
                    tax_year,
                    schedule,
                    status = status.as_str(),
                    count = brackets.len(),
                    "replacing brackets"
                );
                replacements.push((tax_year, status, brackets));
            }
        }

        let mut inserted = 0;
        for (tax_year, status, brackets) in replacements {
            let count = brackets.len();
            let replaced = tables
                .year_mut(tax_year)
                .is_some_and(|year| year.replace_brackets(status, brackets));
            if replaced {
                inserted += count;
            }
        }

        info!(inserted, "loaded tax brackets");
        Ok(inserted)
    }
}
