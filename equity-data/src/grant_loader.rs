use std::fs::File;
use std::io::Read;
use std::path::Path;

use equity_core::{Grant, GrantError, GrantInput};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur when loading grants.
#[derive(Debug, Error)]
pub enum GrantLoadError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Line {line}: {source}")]
    InvalidGrant {
        line: u64,
        #[source]
        source: GrantError,
    },

    #[error("Line {line}: not enough data to build a grant")]
    UnreadableGrant { line: u64 },

    #[error("Failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<csv::Error> for GrantLoadError {
    fn from(err: csv::Error) -> Self {
        GrantLoadError::CsvParse(err.to_string())
    }
}

/// How strictly rows are converted into grants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// The first invalid row fails the load.
    #[default]
    Strict,
    /// Numbers that cannot be read become zero and rows that still cannot
    /// become a grant are skipped with a warning.
    Lenient,
}

/// Loader for grants from CSV.
///
/// Columns: `name` (optional), `shares`, `grant_type`, `strike_price`,
/// `current_fmv` (or `current_fair_market_value`), `vesting_start_date`,
/// `vesting_cliff_date`, `vesting_end_date`, `vesting_schedule`, and
/// `vested_shares` (optional).
pub struct GrantLoader;

impl GrantLoader {
    /// Parse the raw rows, paired with the line each starts on in the file.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<(u64, GrantInput)>, GrantLoadError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let mut rows = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            let line = record.position().map_or(0, csv::Position::line);
            let input: GrantInput = record.deserialize(Some(&headers))?;
            rows.push((line, input));
        }

        Ok(rows)
    }

    pub fn load<R: Read>(
        reader: R,
        mode: LoadMode,
    ) -> Result<Vec<Grant>, GrantLoadError> {
        let rows = Self::parse(reader)?;
        let mut grants = Vec::with_capacity(rows.len());

        for (line, input) in rows {
            match mode {
                LoadMode::Strict => grants.push(Self::convert(line, input)?),
                LoadMode::Lenient => match input.to_grant_lenient() {
                    Some(grant) => grants.push(grant),
                    None => warn!(line, "skipping grant row without a readable date or type"),
                },
            }
        }

        info!(count = grants.len(), ?mode, "loaded grants");
        Ok(grants)
    }

    /// Strictly load grants from CSV text.
    pub fn load_from_str(text: &str) -> Result<Vec<Grant>, GrantLoadError> {
        Self::load(text.as_bytes(), LoadMode::Strict)
    }

    pub fn load_from_file(
        path: &Path,
        mode: LoadMode,
    ) -> Result<Vec<Grant>, GrantLoadError> {
        let file = File::open(path).map_err(|source| GrantLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load(file, mode)
    }

    /// Strictly convert one row, reporting `line` in the error.
    pub fn convert(
        line: u64,
        input: GrantInput,
    ) -> Result<Grant, GrantLoadError> {
        if input.grant_type.trim().is_empty() && input.vesting_start_date.trim().is_empty() {
            return Err(GrantLoadError::UnreadableGrant { line });
        }
        input
            .into_grant()
            .map_err(|source| GrantLoadError::InvalidGrant { line, source })
    }
}
