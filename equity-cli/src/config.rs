//! `equity.toml` configuration.
//!
//! ```toml
//! [strategy]
//! mode = "comprehensive"   # or "simplified"
//! rate = 0.30              # simplified flat rate
//!
//! [tax]
//! filing_status = "MFJ"
//! state_of_residence = "CA"
//! ordinary_income = 150000
//! use_amt = true
//! tax_year = 2025
//! long_term_holding = true
//!
//! [tables]
//! brackets = ["brackets_2026.csv"]
//!
//! [logging]
//! level = "info"
//! file = "equity.log"
//! ```
//!
//! Every key is optional. Relative paths are resolved against the directory
//! of the file they appear in.

use std::fs;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use equity_core::calculations::tax::DEFAULT_FLAT_RATE;
use equity_core::{TaxSettings, TaxStrategy, TaxTables};
use equity_data::{TaxBracketLoader, TaxBracketLoaderError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// File name searched for when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "equity.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Simplified tax rate {0} must be between 0 and 1")]
    InvalidRate(Decimal),

    #[error("Failed to load brackets from {path}: {source}")]
    Brackets {
        path: String,
        #[source]
        source: TaxBracketLoaderError,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TaxMode {
    #[default]
    Simplified,
    Comprehensive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub mode: TaxMode,
    pub rate: Decimal,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            mode: TaxMode::default(),
            rate: DEFAULT_FLAT_RATE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    /// Bracket CSV files applied over the built-in tables, in order.
    pub brackets: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: Option<String>,
    /// Log file, appended to.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub strategy: StrategyConfig,
    pub tax: TaxSettings,
    pub tables: TablesConfig,
    pub logging: LoggingConfig,

    /// File this configuration was read from.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl AppConfig {
    /// Parses and validates TOML text. Relative paths are left as written.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Self::parse_named(contents, "<inline>")
    }

    fn parse_named(
        contents: &str,
        name: &str,
    ) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: name.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let rate = self.strategy.rate;
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(ConfigError::InvalidRate(rate));
        }
        Ok(())
    }

    /// Reads `path`, resolving relative paths inside it against the file's
    /// directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = read_config_file(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::parse_named(&contents, &path.display().to_string())?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Loads the explicit `path` when given; otherwise the nearest
    /// [`CONFIG_FILE_NAME`] in the working directory or its ancestors, or the
    /// defaults when there is none.
    ///
    /// An explicit path must exist. A discovered file that cannot be parsed
    /// is an error rather than silently ignored.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let Ok(current) = std::env::current_dir() else {
            return Ok(Self::default());
        };
        for dir in directory_ancestors(current, MAX_TRAVERSAL_DEPTH) {
            let candidate = dir.join(CONFIG_FILE_NAME);
            match Self::from_file(&candidate) {
                Ok(config) => return Ok(config),
                Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                    continue;
                }
                Err(error) => return Err(error),
            }
        }
        Ok(Self::default())
    }

    fn resolve_paths(
        &mut self,
        base: &Path,
    ) {
        for path in &mut self.tables.brackets {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        if let Some(file) = self.logging.file.as_mut() {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
    }

    /// The configured strategy.
    pub fn strategy(&self) -> TaxStrategy {
        self.strategy_for(self.strategy.mode)
    }

    /// The strategy for `mode`, filled in from this configuration: the
    /// `[strategy]` rate or the `[tax]` settings.
    pub fn strategy_for(
        &self,
        mode: TaxMode,
    ) -> TaxStrategy {
        match mode {
            TaxMode::Simplified => TaxStrategy::Simplified {
                rate: self.strategy.rate,
            },
            TaxMode::Comprehensive => TaxStrategy::Comprehensive {
                settings: self.tax.clone(),
            },
        }
    }

    /// Built-in tables with the configured bracket files applied.
    pub fn tax_tables(&self) -> Result<TaxTables, ConfigError> {
        let mut tables = TaxTables::builtin();
        for path in &self.tables.brackets {
            let brackets_error = |source| ConfigError::Brackets {
                path: path.display().to_string(),
                source,
            };
            let records = TaxBracketLoader::parse_file(path).map_err(brackets_error)?;
            TaxBracketLoader::load(&mut tables, &records).map_err(brackets_error)?;
            debug!(path = %path.display(), records = records.len(), "applied bracket file");
        }
        Ok(tables)
    }
}

fn read_config_file(path: &Path) -> Result<String, io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// `start` and its parents, nearest first, at most `max_depth` of them.
fn directory_ancestors(
    start: PathBuf,
    max_depth: usize,
) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() { Some(parent) } else { None }
    })
    .take(max_depth)
}
