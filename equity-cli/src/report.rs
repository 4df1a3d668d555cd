//! Plain-text tables and CSV export of calculation results.

use std::io::{self, Write};

use chrono::NaiveDate;
use equity_core::calculations::VestingEvent;
use equity_core::{DecisionFactors, GrantType, ScenarioResult, TaxResult};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Formats an amount as `1,234,567.89`, rounding half away from zero.
pub fn money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}

/// A ratio in `[0, 1]` as a percentage with one decimal.
fn percent(ratio: Decimal) -> String {
    match ratio.checked_mul(Decimal::ONE_HUNDRED) {
        Some(value) => {
            let value = value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
            format!("{value:.1}%")
        }
        None => "n/a".to_string(),
    }
}

// ─── Vesting ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VestingRow {
    pub name: String,
    pub grant_type: GrantType,
    pub shares: u64,
    pub vested: u64,
}

pub fn write_vesting<W: Write>(
    out: &mut W,
    as_of: NaiveDate,
    rows: &[VestingRow],
) -> io::Result<()> {
    writeln!(out, "Vested as of {as_of}")?;
    writeln!(
        out,
        "{:<24} {:<4} {:>10} {:>10} {:>10} {:>7}",
        "Grant", "Type", "Shares", "Vested", "Unvested", "Vested"
    )?;
    for row in rows {
        let ratio = if row.shares == 0 {
            Decimal::ZERO
        } else {
            Decimal::from(row.vested) / Decimal::from(row.shares)
        };
        writeln!(
            out,
            "{:<24} {:<4} {:>10} {:>10} {:>10} {:>7}",
            row.name,
            row.grant_type.as_str(),
            row.shares,
            row.vested,
            row.shares.saturating_sub(row.vested),
            percent(ratio)
        )?;
    }
    Ok(())
}

// ─── Timeline ────────────────────────────────────────────────────────────────

pub fn write_timeline<W: Write>(
    out: &mut W,
    grant_name: &str,
    events: &[VestingEvent],
) -> io::Result<()> {
    writeln!(out, "{grant_name}")?;
    writeln!(out, "  {:<10} {:>10} {:>10}", "Date", "New", "Total")?;
    for event in events {
        writeln!(
            out,
            "  {:<10} {:>10} {:>10}",
            event.date.to_string(),
            event.newly_vested,
            event.vested_shares
        )?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TimelineCsvRow<'a> {
    grant: &'a str,
    date: NaiveDate,
    newly_vested: u64,
    vested_shares: u64,
}

/// One CSV row per event, each tagged with its grant name.
pub fn write_timeline_csv<W: Write>(
    out: W,
    timelines: &[(String, Vec<VestingEvent>)],
) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for (grant, events) in timelines {
        for event in events {
            writer.serialize(TimelineCsvRow {
                grant,
                date: event.date,
                newly_vested: event.newly_vested,
                vested_shares: event.vested_shares,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

pub fn write_scenarios<W: Write>(
    out: &mut W,
    grant_name: &str,
    results: &[ScenarioResult],
) -> io::Result<()> {
    writeln!(out, "{grant_name}")?;
    writeln!(
        out,
        "  {:<16} {:>10} {:>8} {:>14} {:>14} {:>14} {:>14} {:>10}",
        "Scenario", "Exit", "Shares", "Cost", "Gross", "Tax", "Net", "ROI"
    )?;
    for result in results {
        writeln!(
            out,
            "  {:<16} {:>10} {:>8} {:>14} {:>14} {:>14} {:>14} {:>9}%",
            result.scenario_name,
            money(result.exit_value),
            result.shares_exercised,
            money(result.exercise_cost),
            money(result.gross_proceeds),
            money(result.tax_liability),
            money(result.net_proceeds),
            result.roi_percentage.round_dp(2)
        )?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioCsvRow<'a> {
    grant: &'a str,
    scenario_name: &'a str,
    exit_value: Decimal,
    shares_exercised: u64,
    exercise_cost: Decimal,
    gross_proceeds: Decimal,
    tax_liability: Decimal,
    net_proceeds: Decimal,
    roi_percentage: Decimal,
}

/// One CSV row per scenario. Columns follow the camelCase field names of
/// [`ScenarioResult`], preceded by `grant`.
pub fn write_scenarios_csv<W: Write>(
    out: W,
    results: &[(String, Vec<ScenarioResult>)],
) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for (grant, scenarios) in results {
        for result in scenarios {
            writer.serialize(ScenarioCsvRow {
                grant,
                scenario_name: &result.scenario_name,
                exit_value: result.exit_value,
                shares_exercised: result.shares_exercised,
                exercise_cost: result.exercise_cost,
                gross_proceeds: result.gross_proceeds,
                tax_liability: result.tax_liability,
                net_proceeds: result.net_proceeds,
                roi_percentage: result.roi_percentage,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

// ─── Tax ─────────────────────────────────────────────────────────────────────

pub fn write_tax<W: Write>(
    out: &mut W,
    grant_name: &str,
    result: &TaxResult,
) -> io::Result<()> {
    writeln!(out, "{grant_name}")?;
    writeln!(out, "  {:<16} {:>14}", "Federal", money(result.federal_tax))?;
    writeln!(out, "  {:<16} {:>14}", "State", money(result.state_tax))?;
    writeln!(out, "  {:<16} {:>14}", "AMT", money(result.amt_liability))?;
    writeln!(out, "  {:<16} {:>14}", "Total", money(result.total_tax))?;
    writeln!(out, "  {:<16} {:>14}", "Effective rate", percent(result.effective_tax_rate))
}

// ─── Decision ────────────────────────────────────────────────────────────────

pub fn write_factors<W: Write>(
    out: &mut W,
    factors: &DecisionFactors,
) -> io::Result<()> {
    writeln!(out, "{:<20} {:>6}", "Financial capacity", factors.financial_capacity)?;
    writeln!(out, "{:<20} {:>6}", "Company outlook", factors.company_outlook)?;
    writeln!(out, "{:<20} {:>6}", "Tax efficiency", factors.tax_efficiency)?;
    writeln!(out, "{:<20} {:>6}", "Timing", factors.timing)?;
    writeln!(out, "{:<20} {:>6}", "Overall", factors.overall_score())?;
    writeln!(out, "Recommendation: {}", factors.recommendation())
}
