use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use equity_core::{CompanyStage, FilingStatusCode, GrantType, parse_date};
use rust_decimal::Decimal;

use crate::config::TaxMode;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Vesting, exit scenario and tax calculator for startup equity grants.
#[derive(Debug, Parser)]
#[command(name = "equity", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file. Defaults to the nearest `equity.toml` above the
    /// working directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Vested shares of each grant on a date.
    Vest(VestArgs),
    /// Vesting events of each grant, one per schedule period.
    Timeline(TimelineArgs),
    /// Exercise-and-sell outcomes at one or more exit prices.
    Scenario(ScenarioArgs),
    /// Tax breakdown of selling at an exit price.
    Tax(TaxArgs),
    /// Exercise decision scores and recommendation.
    Factors(FactorsArgs),
}

#[derive(Debug, Args)]
pub struct GrantSource {
    /// CSV file of grants.
    #[arg(short, long)]
    pub grants: PathBuf,

    /// Only the grant with this name, or this 1-based row number.
    #[arg(long = "grant")]
    pub select: Option<String>,

    /// Read unusable numbers as zero and skip unreadable rows instead of
    /// failing.
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Debug, Args)]
pub struct VestArgs {
    #[command(flatten)]
    pub source: GrantSource,

    /// Date to evaluate (YYYY-MM-DD or MM/DD/YYYY). Defaults to today.
    #[arg(long, value_parser = parse_date_arg)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct TimelineArgs {
    #[command(flatten)]
    pub source: GrantSource,

    /// Write CSV instead of a table.
    #[arg(long)]
    pub csv: bool,
}

/// Tax settings that override the `[tax]` section of the config file.
#[derive(Debug, Default, Args)]
pub struct TaxOverrides {
    /// Simplified flat rate or comprehensive bracket computation.
    #[arg(long, value_enum)]
    pub mode: Option<TaxMode>,

    /// Flat rate for the simplified mode, e.g. 0.3.
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tax year of the bracket tables.
    #[arg(long)]
    pub year: Option<i32>,

    /// Filing status: S, MFJ, MFS, HOH or QSS.
    #[arg(long, value_parser = parse_filing_status)]
    pub status: Option<FilingStatusCode>,

    /// Two-letter state of residence.
    #[arg(long)]
    pub state: Option<String>,

    /// Annual taxable income excluding the equity event.
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Treat the sale as short term (disqualifying for ISOs).
    #[arg(long)]
    pub short_term: bool,

    /// Skip the alternative minimum tax.
    #[arg(long)]
    pub no_amt: bool,
}

#[derive(Debug, Args)]
pub struct ScenarioArgs {
    #[command(flatten)]
    pub source: GrantSource,

    /// Exit price per share; repeat for several scenarios. Defaults to
    /// 1x, 3x, 5x and 10x the current fair market value.
    #[arg(long = "exit")]
    pub exits: Vec<Decimal>,

    /// Shares to exercise. Defaults to the shares vested on `--as-of`.
    #[arg(long)]
    pub shares: Option<u64>,

    /// Date used to count vested shares. Defaults to today.
    #[arg(long, value_parser = parse_date_arg)]
    pub as_of: Option<NaiveDate>,

    #[command(flatten)]
    pub tax: TaxOverrides,

    /// Write CSV instead of a table.
    #[arg(long)]
    pub csv: bool,
}

#[derive(Debug, Args)]
pub struct TaxArgs {
    #[command(flatten)]
    pub source: GrantSource,

    /// Exit price per share.
    #[arg(long = "exit")]
    pub exit_price: Decimal,

    /// Shares sold. Defaults to every share in the grant.
    #[arg(long)]
    pub shares: Option<u64>,

    /// Strike price paid. Defaults to the grant's strike price.
    #[arg(long)]
    pub strike: Option<Decimal>,

    #[command(flatten)]
    pub tax: TaxOverrides,
}

#[derive(Debug, Args)]
pub struct FactorsArgs {
    #[arg(long)]
    pub strike: Decimal,

    /// Vested shares that could be exercised.
    #[arg(long)]
    pub shares: u64,

    #[arg(long)]
    pub cash: Decimal,

    /// Annual income. Defaults to the configured ordinary income.
    #[arg(long)]
    pub income: Option<Decimal>,

    /// early, growth or late.
    #[arg(long, value_parser = parse_stage)]
    pub stage: CompanyStage,

    /// Expected annual growth as a fraction, e.g. 0.25.
    #[arg(long, default_value = "0")]
    pub growth: Decimal,

    /// ISO, NSO or RSU.
    #[arg(long = "type", value_parser = parse_grant_type)]
    pub option_type: GrantType,

    /// Two-letter state. Defaults to the configured state.
    #[arg(long)]
    pub state: Option<String>,

    /// Years until the options expire.
    #[arg(long)]
    pub years: Decimal,
}

// ─── value parsers ───────────────────────────────────────────────────────────

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("'{value}' is not a date (use YYYY-MM-DD)"))
}

fn parse_filing_status(value: &str) -> Result<FilingStatusCode, String> {
    FilingStatusCode::parse(value)
        .ok_or_else(|| format!("unknown filing status '{value}' (use S, MFJ, MFS, HOH or QSS)"))
}

fn parse_stage(value: &str) -> Result<CompanyStage, String> {
    CompanyStage::parse(value)
        .ok_or_else(|| format!("unknown company stage '{value}' (use early, growth or late)"))
}

fn parse_grant_type(value: &str) -> Result<GrantType, String> {
    GrantType::parse(value).ok_or_else(|| format!("unknown grant type '{value}' (use ISO, NSO or RSU)"))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scenario_accepts_repeated_exits() {
        let cli = Cli::try_parse_from([
            "equity", "scenario", "--grants", "g.csv", "--exit", "15", "--exit", "30.5",
        ])
        .unwrap();

        let Command::Scenario(args) = cli.command else {
            panic!("expected scenario command");
        };
        assert_eq!(args.exits, vec![dec!(15), dec!(30.5)]);
    }

    #[test]
    fn tax_parses_overrides() {
        let cli = Cli::try_parse_from([
            "equity", "tax", "-g", "g.csv", "--exit", "15", "--status", "mfj", "--state", "NY",
            "--short-term", "--mode", "comprehensive",
        ])
        .unwrap();

        let Command::Tax(args) = cli.command else {
            panic!("expected tax command");
        };
        assert_eq!(args.tax.status, Some(FilingStatusCode::MarriedFilingJointly));
        assert_eq!(args.tax.mode, Some(TaxMode::Comprehensive));
        assert!(args.tax.short_term);
    }

    #[test]
    fn bad_date_is_rejected() {
        let result =
            Cli::try_parse_from(["equity", "vest", "-g", "g.csv", "--as-of", "someday"]);

        assert!(result.is_err());
    }
}
