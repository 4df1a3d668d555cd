use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::coerce::{NumericInput, coerce_decimal, coerce_shares};

/// Errors raised when a grant record violates a domain rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GrantError {
    #[error("{field} is not a number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} is not a date: '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("unknown grant type '{0}' (expected ISO, NSO or RSU)")]
    UnknownGrantType(String),

    #[error("unknown vesting schedule '{0}' (expected monthly, quarterly or yearly)")]
    UnknownVestingSchedule(String),

    #[error("a grant must have a positive whole number of shares, got {0}")]
    InvalidShares(Decimal),

    #[error("{field} must not be negative, got {value}")]
    NegativePrice { field: &'static str, value: Decimal },

    #[error("vesting dates out of order: start {start}, cliff {cliff}, end {end}")]
    InvalidVestingDates {
        start: NaiveDate,
        cliff: NaiveDate,
        end: NaiveDate,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GrantType {
    Iso,
    Nso,
    Rsu,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iso => "ISO",
            Self::Nso => "NSO",
            Self::Rsu => "RSU",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ISO" => Some(Self::Iso),
            "NSO" | "NQSO" => Some(Self::Nso),
            "RSU" => Some(Self::Rsu),
            _ => None,
        }
    }

    /// Options carry an exercise price; RSUs settle without one.
    pub fn is_option(&self) -> bool {
        matches!(self, Self::Iso | Self::Nso)
    }
}

/// Period granularity for incremental vesting after the cliff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VestingSchedule {
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl VestingSchedule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "yearly" | "annually" | "annual" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Length of one vesting period in calendar months.
    pub fn period_months(&self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::Yearly => 12,
        }
    }
}

/// One equity award. The calculation core only ever reads a grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    #[serde(default)]
    pub name: Option<String>,
    pub shares: u64,
    pub grant_type: GrantType,
    pub strike_price: Decimal,
    pub current_fair_market_value: Decimal,
    pub vesting_start_date: NaiveDate,
    pub vesting_cliff_date: NaiveDate,
    pub vesting_end_date: NaiveDate,
    #[serde(default)]
    pub vesting_schedule: VestingSchedule,

    /// Vested share count cached upstream. When present it is returned as-is
    /// by the vesting evaluator.
    #[serde(default)]
    pub vested_shares: Option<u64>,
}

impl Grant {
    /// Checks the invariants every computation relies on.
    ///
    /// # Errors
    ///
    /// Returns [`GrantError`] if:
    /// - `shares` is zero
    /// - the strike price or the fair market value is negative
    /// - the vesting dates are not ordered `start <= cliff <= end`
    pub fn validate(&self) -> Result<(), GrantError> {
        if self.shares == 0 {
            return Err(GrantError::InvalidShares(Decimal::ZERO));
        }
        if self.strike_price < Decimal::ZERO {
            return Err(GrantError::NegativePrice {
                field: "strike_price",
                value: self.strike_price,
            });
        }
        if self.current_fair_market_value < Decimal::ZERO {
            return Err(GrantError::NegativePrice {
                field: "current_fair_market_value",
                value: self.current_fair_market_value,
            });
        }
        if self.vesting_start_date > self.vesting_cliff_date
            || self.vesting_cliff_date > self.vesting_end_date
        {
            return Err(GrantError::InvalidVestingDates {
                start: self.vesting_start_date,
                cliff: self.vesting_cliff_date,
                end: self.vesting_end_date,
            });
        }
        Ok(())
    }

    /// Label used in reports: the grant name, or a type/share summary.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("{} x{}", self.grant_type.as_str(), self.shares),
        }
    }
}

/// A grant as it arrives from a form or a CSV row: every field is text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub shares: String,
    #[serde(default)]
    pub grant_type: String,
    #[serde(default)]
    pub strike_price: String,
    #[serde(default, alias = "current_fmv")]
    pub current_fair_market_value: String,
    #[serde(default)]
    pub vesting_start_date: String,
    #[serde(default)]
    pub vesting_cliff_date: String,
    #[serde(default)]
    pub vesting_end_date: String,
    #[serde(default)]
    pub vesting_schedule: String,
    #[serde(default)]
    pub vested_shares: Option<String>,
}

impl GrantInput {
    /// Converts the raw record into a validated [`Grant`].
    ///
    /// # Errors
    ///
    /// Returns the first [`GrantError`] found: unreadable numbers, dates or
    /// enums, then any failure from [`Grant::validate`]. An empty vesting
    /// schedule defaults to monthly.
    pub fn into_grant(self) -> Result<Grant, GrantError> {
        let shares = strict_shares("shares", &self.shares)?;
        let grant_type = GrantType::parse(&self.grant_type)
            .ok_or_else(|| GrantError::UnknownGrantType(self.grant_type.clone()))?;
        let vesting_schedule = if self.vesting_schedule.trim().is_empty() {
            VestingSchedule::default()
        } else {
            VestingSchedule::parse(&self.vesting_schedule)
                .ok_or_else(|| GrantError::UnknownVestingSchedule(self.vesting_schedule.clone()))?
        };
        let vested_shares = match self.vested_shares.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(strict_whole_number("vested_shares", value)?),
        };

        let grant = Grant {
            name: self.name.filter(|n| !n.trim().is_empty()),
            shares,
            grant_type,
            strike_price: strict_decimal("strike_price", &self.strike_price)?,
            current_fair_market_value: strict_decimal(
                "current_fair_market_value",
                &self.current_fair_market_value,
            )?,
            vesting_start_date: strict_date("vesting_start_date", &self.vesting_start_date)?,
            vesting_cliff_date: strict_date("vesting_cliff_date", &self.vesting_cliff_date)?,
            vesting_end_date: strict_date("vesting_end_date", &self.vesting_end_date)?,
            vesting_schedule,
            vested_shares,
        };
        grant.validate()?;
        Ok(grant)
    }

    /// Converts the raw record the way form call sites expect: numbers that
    /// cannot be read become zero, an unreadable schedule becomes monthly.
    ///
    /// Returns `None` only when a date or the grant type cannot be read,
    /// since no sensible default exists for those. The result is not
    /// validated.
    pub fn to_grant_lenient(&self) -> Option<Grant> {
        Some(Grant {
            name: self.name.clone().filter(|n| !n.trim().is_empty()),
            shares: coerce_shares(self.shares.as_str()),
            grant_type: GrantType::parse(&self.grant_type)?,
            strike_price: coerce_decimal(self.strike_price.as_str()),
            current_fair_market_value: coerce_decimal(self.current_fair_market_value.as_str()),
            vesting_start_date: parse_date(&self.vesting_start_date)?,
            vesting_cliff_date: parse_date(&self.vesting_cliff_date)?,
            vesting_end_date: parse_date(&self.vesting_end_date)?,
            vesting_schedule: VestingSchedule::parse(&self.vesting_schedule).unwrap_or_default(),
            vested_shares: self
                .vested_shares
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(coerce_shares),
        })
    }
}

/// Reads a calendar date in ISO (`2024-01-31`), US (`01/31/2024`) or RFC 3339
/// form.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn strict_decimal(
    field: &'static str,
    value: &str,
) -> Result<Decimal, GrantError> {
    value
        .to_decimal()
        .ok_or_else(|| GrantError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn strict_whole_number(
    field: &'static str,
    value: &str,
) -> Result<u64, GrantError> {
    let number = strict_decimal(field, value)?;
    if number < Decimal::ZERO || !number.fract().is_zero() {
        return Err(GrantError::InvalidNumber {
            field,
            value: value.to_string(),
        });
    }
    Ok(coerce_shares(number))
}

fn strict_shares(
    field: &'static str,
    value: &str,
) -> Result<u64, GrantError> {
    let number = strict_decimal(field, value)?;
    if number <= Decimal::ZERO || !number.fract().is_zero() {
        return Err(GrantError::InvalidShares(number));
    }
    Ok(coerce_shares(number))
}

fn strict_date(
    field: &'static str,
    value: &str,
) -> Result<NaiveDate, GrantError> {
    parse_date(value).ok_or_else(|| GrantError::InvalidDate {
        field,
        value: value.to_string(),
    })
}
