//! Calendar arithmetic for `during` intervals.
//!
//! Fields are applied one at a time in a fixed order: years, months, days,
//! hours, minutes, seconds. Year and month steps clamp to the last valid day
//! of the target month, so `2020-01-31 + P1M` is `2020-02-29` and
//! `2020-02-29 + P1Y` is `2021-02-28`. Subtraction mirrors addition with the
//! same order and the same clamping.

use chrono::{Days, Months, NaiveDateTime, TimeDelta};

use crate::cql_ast::CalendarDuration;

/// `base + duration`, or `None` when the result leaves chrono's calendar range.
pub fn add_duration(base: NaiveDateTime, duration: &CalendarDuration) -> Option<NaiveDateTime> {
    let result = base
        .checked_add_months(Months::new(duration.years.checked_mul(12)?))?
        .checked_add_months(Months::new(duration.months))?
        .checked_add_days(Days::new(u64::from(duration.days)))?
        .checked_add_signed(TimeDelta::hours(i64::from(duration.hours)))?
        .checked_add_signed(TimeDelta::minutes(i64::from(duration.minutes)))?
        .checked_add_signed(TimeDelta::seconds(i64::from(duration.seconds)))?;

    log::trace!("add_duration: {} + {} = {}", base, duration, result);
    Some(result)
}

/// `base - duration`, or `None` when the result leaves chrono's calendar range.
pub fn subtract_duration(base: NaiveDateTime, duration: &CalendarDuration) -> Option<NaiveDateTime> {
    let result = base
        .checked_sub_months(Months::new(duration.years.checked_mul(12)?))?
        .checked_sub_months(Months::new(duration.months))?
        .checked_sub_days(Days::new(u64::from(duration.days)))?
        .checked_sub_signed(TimeDelta::hours(i64::from(duration.hours)))?
        .checked_sub_signed(TimeDelta::minutes(i64::from(duration.minutes)))?
        .checked_sub_signed(TimeDelta::seconds(i64::from(duration.seconds)))?;

    log::trace!("subtract_duration: {} - {} = {}", base, duration, result);
    Some(result)
}
