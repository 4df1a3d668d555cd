use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use equity_core::calculations::{
    ExitScenario, ScenarioEvaluator, calculate_decision_factors, calculate_vested_shares,
    vested_shares,
};
use equity_core::calculations::vesting::vesting_timeline;
use equity_core::{DecisionInputs, Grant, TaxStrategy, TaxTables};
use equity_data::{GrantLoader, LoadMode};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::cli::{
    Command, FactorsArgs, GrantSource, ScenarioArgs, TaxArgs, TaxOverrides, TimelineArgs,
    VestArgs,
};
use crate::config::AppConfig;
use crate::report::{self, VestingRow};

/// Runs `command`, writing its report to `out`.
pub fn run<W: Write>(
    command: &Command,
    config: &AppConfig,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Vest(args) => vest(args, out),
        Command::Timeline(args) => timeline(args, out),
        Command::Scenario(args) => scenario(args, config, out),
        Command::Tax(args) => tax(args, config, out),
        Command::Factors(args) => factors(args, config, out),
    }
}

// ─── Grants ──────────────────────────────────────────────────────────────────

fn load_grants(source: &GrantSource) -> Result<Vec<Grant>> {
    let mode = if source.lenient { LoadMode::Lenient } else { LoadMode::Strict };
    let grants = GrantLoader::load_from_file(&source.grants, mode)
        .with_context(|| format!("failed to load grants from {}", source.grants.display()))?;

    let Some(select) = source.select.as_deref() else {
        return Ok(grants);
    };
    let position = match select.parse::<usize>() {
        Ok(row) if row >= 1 && row <= grants.len() => Some(row - 1),
        _ => grants
            .iter()
            .position(|grant| grant.display_name().eq_ignore_ascii_case(select)),
    };
    match position {
        Some(index) => Ok(vec![grants[index].clone()]),
        None => bail!("no grant named '{select}' in {}", source.grants.display()),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Vested shares on `as_of`. Lenient loads treat an unusable grant as
/// nothing vested; strict loads fail on it.
fn vested_on(
    grant: &Grant,
    as_of: NaiveDate,
    lenient: bool,
) -> Result<u64> {
    if lenient {
        return Ok(calculate_vested_shares(Some(grant), Some(as_of)));
    }
    vested_shares(grant, as_of).with_context(|| format!("grant '{}'", grant.display_name()))
}

// ─── Tax settings ────────────────────────────────────────────────────────────

/// The configured strategy with command-line overrides applied.
fn effective_strategy(
    config: &AppConfig,
    overrides: &TaxOverrides,
) -> Result<TaxStrategy> {
    let configured = match overrides.mode {
        Some(mode) => config.strategy_for(mode),
        None => config.strategy(),
    };
    match configured {
        TaxStrategy::Simplified { rate } => {
            let rate = overrides.rate.unwrap_or(rate);
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                bail!("tax rate {rate} must be between 0 and 1");
            }
            Ok(TaxStrategy::Simplified { rate })
        }
        TaxStrategy::Comprehensive { mut settings } => {
            if let Some(year) = overrides.year {
                settings.tax_year = year;
            }
            if let Some(status) = overrides.status {
                settings.filing_status = status;
            }
            if let Some(state) = &overrides.state {
                settings.state_of_residence = state.clone();
            }
            if let Some(income) = overrides.income {
                settings.ordinary_income = income;
            }
            if overrides.short_term {
                settings.long_term_holding = false;
            }
            if overrides.no_amt {
                settings.use_amt = false;
            }
            Ok(TaxStrategy::Comprehensive { settings })
        }
    }
}

/// Tax year a comprehensive `strategy` asks for that `tables` lack.
fn missing_tax_year(
    strategy: &TaxStrategy,
    tables: &TaxTables,
) -> Option<i32> {
    match strategy {
        TaxStrategy::Comprehensive { settings } if tables.year(settings.tax_year).is_none() => {
            Some(settings.tax_year)
        }
        TaxStrategy::Simplified { .. } | TaxStrategy::Comprehensive { .. } => None,
    }
}

fn warn_latest_year_fallback(
    strategy: &TaxStrategy,
    tables: &TaxTables,
) {
    if let Some(tax_year) = missing_tax_year(strategy, tables) {
        warn!(tax_year, "no tables for the requested tax year; the latest year is used");
    }
}

// ─── Commands ────────────────────────────────────────────────────────────────

fn vest<W: Write>(
    args: &VestArgs,
    out: &mut W,
) -> Result<()> {
    let grants = load_grants(&args.source)?;
    let as_of = args.as_of.unwrap_or_else(today);

    let rows = grants
        .iter()
        .map(|grant| {
            Ok(VestingRow {
                name: grant.display_name(),
                grant_type: grant.grant_type,
                shares: grant.shares,
                vested: vested_on(grant, as_of, args.source.lenient)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    report::write_vesting(out, as_of, &rows)?;
    Ok(())
}

fn timeline<W: Write>(
    args: &TimelineArgs,
    out: &mut W,
) -> Result<()> {
    let grants = load_grants(&args.source)?;

    let mut timelines = Vec::with_capacity(grants.len());
    for grant in &grants {
        match vesting_timeline(grant) {
            Ok(events) => timelines.push((grant.display_name(), events)),
            Err(error) if args.source.lenient => {
                warn!(grant = %grant.display_name(), %error, "skipping grant without a timeline");
            }
            Err(error) => {
                return Err(error).with_context(|| format!("grant '{}'", grant.display_name()));
            }
        }
    }

    if args.csv {
        report::write_timeline_csv(&mut *out, &timelines)?;
    } else {
        for (name, events) in &timelines {
            report::write_timeline(out, name, events)?;
        }
    }
    Ok(())
}

fn scenario<W: Write>(
    args: &ScenarioArgs,
    config: &AppConfig,
    out: &mut W,
) -> Result<()> {
    let grants = load_grants(&args.source)?;
    let tables = config.tax_tables()?;
    let strategy = effective_strategy(config, &args.tax)?;
    warn_latest_year_fallback(&strategy, &tables);
    let evaluator = ScenarioEvaluator::new(&tables, strategy);
    let as_of = args.as_of.unwrap_or_else(today);

    let mut results = Vec::with_capacity(grants.len());
    for grant in &grants {
        let shares = match args.shares {
            Some(shares) => shares,
            None => vested_on(grant, as_of, args.source.lenient)?,
        };
        let scenarios = if args.exits.is_empty() {
            ExitScenario::fmv_multiples(grant.current_fair_market_value)
        } else {
            args.exits
                .iter()
                .map(|price| ExitScenario::new(format!("Exit at {price}"), *price))
                .collect()
        };

        info!(grant = %grant.display_name(), shares, count = scenarios.len(), "evaluating scenarios");
        results.push((grant.display_name(), evaluator.compare(Some(grant), &scenarios, shares)));
    }

    if args.csv {
        report::write_scenarios_csv(&mut *out, &results)?;
    } else {
        for (name, scenarios) in &results {
            report::write_scenarios(out, name, scenarios)?;
        }
    }
    Ok(())
}

fn tax<W: Write>(
    args: &TaxArgs,
    config: &AppConfig,
    out: &mut W,
) -> Result<()> {
    let grants = load_grants(&args.source)?;
    let tables = config.tax_tables()?;
    let strategy = effective_strategy(config, &args.tax)?;
    if args.source.lenient {
        warn_latest_year_fallback(&strategy, &tables);
    }

    for grant in &grants {
        let shares = args.shares.unwrap_or(grant.shares);
        let strike = args.strike.unwrap_or(grant.strike_price);
        let result = if args.source.lenient {
            strategy.tax_result_or_default(&tables, grant, strike, args.exit_price, shares)
        } else {
            strategy
                .tax_result(&tables, grant, strike, args.exit_price, shares)
                .with_context(|| format!("grant '{}'", grant.display_name()))?
        };
        report::write_tax(out, &grant.display_name(), &result)?;
    }
    Ok(())
}

fn factors<W: Write>(
    args: &FactorsArgs,
    config: &AppConfig,
    out: &mut W,
) -> Result<()> {
    let inputs = DecisionInputs {
        strike_price: args.strike,
        vested_shares: args.shares,
        available_cash: args.cash,
        current_income: args.income.unwrap_or(config.tax.ordinary_income),
        company_stage: args.stage,
        growth_rate: args.growth,
        option_type: args.option_type,
        state: args
            .state
            .clone()
            .unwrap_or_else(|| config.tax.state_of_residence.clone()),
        years_to_expiration: args.years,
    };

    let factors = calculate_decision_factors(&inputs);
    report::write_factors(out, &factors)?;
    Ok(())
}
