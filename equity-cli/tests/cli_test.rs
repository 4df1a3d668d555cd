//! End-to-end runs of the `equity` commands against fixture files.

use std::path::{Path, PathBuf};

use clap::Parser;
use equity_cli::config::TaxMode;
use equity_cli::{AppConfig, Cli, commands};
use equity_core::TaxTables;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

fn grants_path() -> String {
    fixture("grants.csv").display().to_string()
}

fn run(
    args: &[&str],
    config: &AppConfig,
) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("equity").chain(args.iter().copied()))?;
    let mut out = Vec::new();
    commands::run(&cli.command, config, &mut out)?;
    Ok(String::from_utf8(out)?)
}

fn fixture_config() -> AppConfig {
    AppConfig::from_file(&fixture("equity.toml")).expect("Failed to load fixture config")
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_fixture_config_resolves_bracket_path() {
    let config = fixture_config();

    assert_eq!(config.strategy.mode, TaxMode::Comprehensive);
    assert_eq!(config.tables.brackets, vec![fixture("brackets_2025.csv")]);
    assert_eq!(config.source, Some(fixture("equity.toml")));
}

#[test]
fn test_fixture_brackets_match_builtin_tables() {
    let tables = fixture_config().tax_tables().unwrap();

    assert_eq!(tables, TaxTables::builtin());
}

// =============================================================================
// Commands
// =============================================================================

#[test]
fn test_vest_reports_each_grant() {
    let grants = grants_path();

    let text = run(&["vest", "-g", &grants, "--as-of", "2024-01-02"], &AppConfig::default()).unwrap();

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Vested as of 2024-01-02");
    assert!(lines[2].starts_with("Initial options"));
    assert!(lines[2].contains(" 250 "));
    assert!(lines[3].starts_with("Annual RSU"));
    assert!(lines[3].ends_with("0.0%"));
}

#[test]
fn test_vest_selects_grant_by_row_number() {
    let grants = grants_path();

    let text = run(
        &["vest", "-g", &grants, "--grant", "2", "--as-of", "2029-02-01"],
        &AppConfig::default(),
    )
    .unwrap();

    assert_eq!(text.lines().count(), 3);
    assert!(text.contains("Annual RSU"));
    assert!(text.contains("100.0%"));
}

#[test]
fn test_unknown_grant_name_fails() {
    let grants = grants_path();

    let result = run(&["vest", "-g", &grants, "--grant", "Nope"], &AppConfig::default());

    assert!(result.is_err());
}

#[test]
fn test_timeline_csv_ends_fully_vested() {
    let grants = grants_path();

    let text = run(&["timeline", "-g", &grants, "--csv"], &AppConfig::default()).unwrap();

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["grant", "date", "newlyVested", "vestedShares"]);

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    let last_initial = rows.iter().filter(|r| &r[0] == "Initial options").last().unwrap();
    assert_eq!(&last_initial[1], "2027-01-01");
    assert_eq!(&last_initial[3], "1000");
    let rsu_dates: Vec<&str> = rows
        .iter()
        .filter(|r| &r[0] == "Annual RSU")
        .map(|r| r.get(1).unwrap())
        .collect();
    assert_eq!(
        rsu_dates,
        vec!["2025-01-15", "2026-01-15", "2027-01-15", "2028-01-15", "2029-01-15"]
    );
}

#[test]
fn test_simplified_scenario_csv() {
    let grants = grants_path();

    let text = run(
        &[
            "scenario", "-g", &grants, "--grant", "Initial options", "--exit", "15", "--shares",
            "500", "--csv",
        ],
        &AppConfig::default(),
    )
    .unwrap();

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 1);
    let numbers: Vec<Decimal> = rows[0].iter().skip(2).map(|v| v.parse().unwrap()).collect();
    // exit, shares, cost, gross, tax, net, roi
    assert_eq!(
        numbers,
        vec![dec!(15), dec!(500), dec!(1250), dec!(7500), dec!(1875), dec!(4375), dec!(350)]
    );
}

#[test]
fn test_scenario_defaults_to_fmv_ladder() {
    let grants = grants_path();

    let text = run(
        &["scenario", "-g", &grants, "--grant", "Annual RSU", "--as-of", "2026-01-15"],
        &AppConfig::default(),
    )
    .unwrap();

    for name in ["Current FMV", "Moderate exit", "Strong exit", "Home run"] {
        assert!(text.contains(name), "missing {name} in:\n{text}");
    }
}

#[test]
fn test_comprehensive_tax_from_config() {
    let grants = grants_path();

    let text = run(
        &["tax", "-g", &grants, "--grant", "initial options", "--exit", "15", "--shares", "500"],
        &fixture_config(),
    )
    .unwrap();

    assert!(text.contains("937.50"), "got:\n{text}");
    assert!(text.contains("581.25"));
    assert!(text.contains("1,518.75"));
    assert!(text.contains("24.3%"));
}

#[test]
fn test_tax_short_term_override() {
    let grants = grants_path();

    let text = run(
        &[
            "tax", "-g", &grants, "--grant", "1", "--exit", "15", "--shares", "500",
            "--short-term",
        ],
        &fixture_config(),
    )
    .unwrap();

    // 6250 of ordinary income stacked on 150000 at 24%.
    let federal = text.lines().find(|l| l.trim_start().starts_with("Federal")).unwrap();
    assert!(federal.ends_with("1,500.00"));
}

#[test]
fn test_tax_unknown_year_fails_unless_lenient() {
    let grants = grants_path();
    let args = [
        "tax", "-g", &grants, "--grant", "1", "--exit", "15", "--shares", "500", "--year", "2031",
    ];

    let mut lenient_args = args.to_vec();
    lenient_args.push("--lenient");

    let strict = run(&args, &fixture_config());
    let lenient = run(&lenient_args, &fixture_config()).unwrap();
    let latest = run(&args[..args.len() - 2], &fixture_config()).unwrap();

    assert!(strict.is_err());
    assert_eq!(lenient, latest);
}

#[test]
fn test_factors_recommendation() {
    let text = run(
        &[
            "factors", "--strike", "2.50", "--shares", "1000", "--cash", "5000", "--income",
            "100000", "--stage", "growth", "--growth", "0.2", "--type", "ISO", "--state", "TX",
            "--years", "5",
        ],
        &AppConfig::default(),
    )
    .unwrap();

    assert!(text.contains("0.56"));
    assert!(text.ends_with("Recommendation: exercise now\n"));
}
