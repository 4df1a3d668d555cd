//! Vesting evaluation: shares vested as of a date under a cliff + linear
//! schedule.
//!
//! # Rules
//!
//! | As-of date              | Vested shares |
//! |-------------------------|---------------|
//! | before the cliff        | `0` |
//! | on or after the end     | `shares` |
//! | otherwise               | `floor(elapsed_months / total_months × shares)` |
//!
//! Months are measured from the vesting start date as a day count divided by
//! [`AVERAGE_DAYS_PER_MONTH`]. This is an approximation of calendar months
//! that existing grant data depends on; do not change it without migrating
//! stored results.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use equity_core::calculations::vesting::vested_shares;
//! use equity_core::{Grant, GrantType, VestingSchedule};
//!
//! let grant = Grant {
//!     name: None,
//!     shares: 1000,
//!     grant_type: GrantType::Iso,
//!     strike_price: dec!(2.50),
//!     current_fair_market_value: dec!(10.00),
//!     vesting_start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
//!     vesting_cliff_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     vesting_end_date: NaiveDate::from_ymd_opt(2027, 1, 1).unwrap(),
//!     vesting_schedule: VestingSchedule::Monthly,
//!     vested_shares: None,
//! };
//!
//! let day_after_cliff = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
//! assert_eq!(vested_shares(&grant, day_after_cliff).unwrap(), 250);
//! ```

use chrono::{Local, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{Grant, GrantError};

/// Average month length, in days, used for all month arithmetic.
pub const AVERAGE_DAYS_PER_MONTH: Decimal = dec!(30.44);

/// Decimal places kept before flooring a share count. Absorbs the residue of
/// dividing by [`AVERAGE_DAYS_PER_MONTH`] twice.
const SHARE_PRECISION: u32 = 12;

/// Fractional months from `from` to `to`; negative when `to` precedes `from`.
pub fn months_between(
    from: NaiveDate,
    to: NaiveDate,
) -> Decimal {
    Decimal::from((to - from).num_days()) / AVERAGE_DAYS_PER_MONTH
}

/// One point on a grant's vesting timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VestingEvent {
    pub date: NaiveDate,
    /// Cumulative shares vested on `date`.
    pub vested_shares: u64,
    /// Shares that vested since the previous event.
    pub newly_vested: u64,
}

/// Strict vesting calculator for a single validated grant.
#[derive(Debug, Clone)]
pub struct VestingEvaluator<'a> {
    grant: &'a Grant,
}

impl<'a> VestingEvaluator<'a> {
    /// Wraps `grant` after checking its invariants.
    ///
    /// # Errors
    ///
    /// Returns the [`GrantError`] from [`Grant::validate`].
    pub fn new(grant: &'a Grant) -> Result<Self, GrantError> {
        grant.validate()?;
        Ok(Self { grant })
    }

    /// Computed vested share count on `as_of`, ignoring any precomputed value.
    pub fn vested_as_of(
        &self,
        as_of: NaiveDate,
    ) -> u64 {
        let grant = self.grant;
        if as_of < grant.vesting_cliff_date {
            return 0;
        }
        if as_of >= grant.vesting_end_date {
            return grant.shares;
        }

        let total_months = months_between(grant.vesting_start_date, grant.vesting_end_date);
        if total_months <= Decimal::ZERO {
            return grant.shares;
        }
        let elapsed_months = months_between(grant.vesting_start_date, as_of);

        let vested = (Decimal::from(grant.shares) * elapsed_months / total_months)
            .round_dp(SHARE_PRECISION)
            .floor();

        vested.to_u64().unwrap_or(0).min(grant.shares)
    }

    /// The cliff, then one event per schedule period after it, ending on the
    /// vesting end date.
    pub fn timeline(&self) -> Vec<VestingEvent> {
        let grant = self.grant;
        let period = Months::new(grant.vesting_schedule.period_months());

        let mut dates = vec![grant.vesting_cliff_date];
        let mut next = grant.vesting_cliff_date.checked_add_months(period);
        while let Some(date) = next {
            if date >= grant.vesting_end_date {
                break;
            }
            dates.push(date);
            next = date.checked_add_months(period);
        }
        if grant.vesting_end_date > grant.vesting_cliff_date {
            dates.push(grant.vesting_end_date);
        }

        let mut previous = 0;
        dates
            .into_iter()
            .map(|date| {
                let vested = self.vested_as_of(date);
                let event = VestingEvent {
                    date,
                    vested_shares: vested,
                    newly_vested: vested - previous,
                };
                previous = vested;
                event
            })
            .collect()
    }
}

/// Vested shares for `grant` on `as_of`.
///
/// A precomputed `vested_shares` on the grant is returned unchanged.
///
/// # Errors
///
/// Returns [`GrantError`] when the grant fails validation.
pub fn vested_shares(
    grant: &Grant,
    as_of: NaiveDate,
) -> Result<u64, GrantError> {
    if let Some(precomputed) = grant.vested_shares {
        return Ok(precomputed);
    }
    let vested = VestingEvaluator::new(grant)?.vested_as_of(as_of);
    debug!(shares = grant.shares, %as_of, vested, "computed vested shares");
    Ok(vested)
}

/// Vesting timeline for `grant`, one event per schedule period.
///
/// # Errors
///
/// Returns [`GrantError`] when the grant fails validation.
pub fn vesting_timeline(grant: &Grant) -> Result<Vec<VestingEvent>, GrantError> {
    Ok(VestingEvaluator::new(grant)?.timeline())
}

/// Form-facing vested share count that never fails.
///
/// * no grant → `0`
/// * precomputed `vested_shares` → that value
/// * invalid grant → `0` (logged)
/// * `as_of == None` → today's local date
pub fn calculate_vested_shares(
    grant: Option<&Grant>,
    as_of: Option<NaiveDate>,
) -> u64 {
    let Some(grant) = grant else {
        return 0;
    };
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    vested_shares(grant, as_of).unwrap_or_else(|error| {
        warn!(%error, "invalid grant; treating as nothing vested");
        0
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{GrantType, VestingSchedule};

    fn date(
        y: i32,
        m: u32,
        d: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn four_year_grant() -> Grant {
        Grant {
            name: None,
            shares: 1000,
            grant_type: GrantType::Iso,
            strike_price: dec!(2.50),
            current_fair_market_value: dec!(10.00),
            vesting_start_date: date(2023, 1, 1),
            vesting_cliff_date: date(2024, 1, 1),
            vesting_end_date: date(2027, 1, 1),
            vesting_schedule: VestingSchedule::Monthly,
            vested_shares: None,
        }
    }

    // =========================================================================
    // months_between tests
    // =========================================================================

    #[test]
    fn months_between_uses_average_month() {
        // 3044 days is exactly 100 average months
        let from = date(2020, 1, 1);
        let to = from + chrono::Duration::days(3044);

        assert_eq!(months_between(from, to), dec!(100));
    }

    #[test]
    fn months_between_is_negative_backwards() {
        assert!(months_between(date(2024, 1, 1), date(2023, 1, 1)) < Decimal::ZERO);
    }

    // =========================================================================
    // vested_shares tests
    // =========================================================================

    #[test]
    fn vested_shares_after_cliff() {
        let grant = four_year_grant();

        assert_eq!(vested_shares(&grant, date(2024, 1, 2)), Ok(250));
    }

    #[test]
    fn vested_shares_after_end() {
        let grant = four_year_grant();

        assert_eq!(vested_shares(&grant, date(2027, 1, 2)), Ok(1000));
    }

    #[test]
    fn vested_shares_exactly_at_end() {
        let grant = four_year_grant();

        assert_eq!(vested_shares(&grant, date(2027, 1, 1)), Ok(1000));
    }

    #[test]
    fn vested_shares_before_cliff() {
        let grant = four_year_grant();

        assert_eq!(vested_shares(&grant, date(2023, 6, 1)), Ok(0));
        assert_eq!(vested_shares(&grant, date(2023, 12, 31)), Ok(0));
    }

    #[test]
    fn vested_shares_jumps_at_cliff() {
        let grant = four_year_grant();

        // 365 / 1461 × 1000 = 249.83
        assert_eq!(vested_shares(&grant, date(2024, 1, 1)), Ok(249));
    }

    #[test]
    fn vested_shares_midway() {
        let grant = four_year_grant();

        // 731 / 1461 × 1000 = 500.34 (2024 is a leap year)
        assert_eq!(vested_shares(&grant, date(2025, 1, 1)), Ok(500));
    }

    #[test]
    fn vested_shares_returns_precomputed_value() {
        let mut grant = four_year_grant();
        grant.vested_shares = Some(777);

        assert_eq!(vested_shares(&grant, date(2023, 2, 1)), Ok(777));
    }

    #[test]
    fn vested_shares_rejects_invalid_dates() {
        let mut grant = four_year_grant();
        grant.vesting_end_date = date(2022, 1, 1);

        assert!(matches!(
            vested_shares(&grant, date(2024, 6, 1)),
            Err(GrantError::InvalidVestingDates { .. })
        ));
    }

    #[test]
    fn vested_shares_without_cliff_accrues_from_start() {
        let mut grant = four_year_grant();
        grant.vesting_cliff_date = grant.vesting_start_date;

        assert_eq!(vested_shares(&grant, date(2023, 1, 1)), Ok(0));
        // 31 / 1461 × 1000 = 21.2
        assert_eq!(vested_shares(&grant, date(2023, 2, 1)), Ok(21));
    }

    #[test]
    fn vested_shares_exact_multiple_is_not_floored_down() {
        let mut grant = four_year_grant();
        // 1461 shares over 1461 days: exactly one share per day
        grant.shares = 1461;

        assert_eq!(vested_shares(&grant, date(2024, 1, 2)), Ok(366));
    }

    // =========================================================================
    // calculate_vested_shares tests
    // =========================================================================

    #[test]
    fn calculate_vested_shares_without_grant_is_zero() {
        assert_eq!(calculate_vested_shares(None, Some(date(2025, 1, 1))), 0);
    }

    #[test]
    fn calculate_vested_shares_invalid_grant_is_zero() {
        let mut grant = four_year_grant();
        grant.shares = 0;

        assert_eq!(
            calculate_vested_shares(Some(&grant), Some(date(2025, 1, 1))),
            0
        );
    }

    #[test]
    fn calculate_vested_shares_prefers_precomputed_over_validation() {
        let mut grant = four_year_grant();
        grant.vesting_cliff_date = date(2020, 1, 1);
        grant.vested_shares = Some(12);

        assert_eq!(calculate_vested_shares(Some(&grant), None), 12);
    }

    #[test]
    fn calculate_vested_shares_defaults_to_today() {
        let grant = four_year_grant();
        let today = Local::now().date_naive();

        assert_eq!(
            calculate_vested_shares(Some(&grant), None),
            vested_shares(&grant, today).unwrap()
        );
    }

    // =========================================================================
    // timeline tests
    // =========================================================================

    #[test]
    fn timeline_monthly_has_cliff_then_monthly_events() {
        let grant = four_year_grant();

        let events = vesting_timeline(&grant).unwrap();

        // cliff + 35 monthly steps strictly before the end + the end itself
        assert_eq!(events.len(), 37);
        assert_eq!(events[0].date, date(2024, 1, 1));
        assert_eq!(events[0].vested_shares, 249);
        assert_eq!(events[0].newly_vested, 249);
        assert_eq!(events[1].date, date(2024, 2, 1));
        let last = events.last().unwrap();
        assert_eq!(last.date, date(2027, 1, 1));
        assert_eq!(last.vested_shares, 1000);
    }

    #[test]
    fn timeline_yearly_steps() {
        let mut grant = four_year_grant();
        grant.vesting_schedule = VestingSchedule::Yearly;

        let events = vesting_timeline(&grant).unwrap();
        let dates: Vec<_> = events.iter().map(|e| e.date).collect();

        assert_eq!(
            dates,
            vec![
                date(2024, 1, 1),
                date(2025, 1, 1),
                date(2026, 1, 1),
                date(2027, 1, 1)
            ]
        );
    }

    #[test]
    fn timeline_newly_vested_sums_to_total() {
        let mut grant = four_year_grant();
        grant.vesting_schedule = VestingSchedule::Quarterly;

        let events = vesting_timeline(&grant).unwrap();
        let total: u64 = events.iter().map(|e| e.newly_vested).sum();

        assert_eq!(total, grant.shares);
    }

    #[test]
    fn timeline_cliff_at_end_is_single_event() {
        let mut grant = four_year_grant();
        grant.vesting_cliff_date = grant.vesting_end_date;

        let events = vesting_timeline(&grant).unwrap();

        assert_eq!(
            events,
            vec![VestingEvent {
                date: date(2027, 1, 1),
                vested_shares: 1000,
                newly_vested: 1000,
            }]
        );
    }
}
