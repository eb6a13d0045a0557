//! Trading-day calendar.
//!
//! A trading day is a Monday–Friday date that is not an observed holiday
//! (see [`crate::domain::holidays`]). Every function here is a pure function
//! of its inputs; the only state involved is the per-year holiday cache.

use crate::domain::error::CycError;
use crate::domain::holidays::is_holiday;
use chrono::{Datelike, NaiveDate, Weekday};

/// Compact day format used by partition file names and range strings.
pub const DAY_FORMAT: &str = "%Y%m%d";

pub fn is_trading_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !is_holiday(date)
}

/// Inclusive calendar-date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CycError> {
        if start > end {
            return Err(CycError::invalid_range(
                &format!("{}-{}", format_day(start), format_day(end)),
                "start date is after end date",
            ));
        }
        Ok(Self { start, end })
    }

    /// Parses `"YYYYMMDD"` or `"YYYYMMDD-YYYYMMDD"`; both parts are trimmed.
    pub fn parse(text: &str) -> Result<Self, CycError> {
        let raw = text.trim();
        if raw.is_empty() {
            return Err(CycError::invalid_range(text, "date string cannot be empty"));
        }

        let parts: Vec<&str> = raw.split('-').map(str::trim).collect();
        let (start_str, end_str) = match parts.as_slice() {
            [single] => (*single, *single),
            [start, end] if !start.is_empty() && !end.is_empty() => (*start, *end),
            _ => return Err(CycError::invalid_range(text, "expected YYYYMMDD or YYYYMMDD-YYYYMMDD")),
        };

        let start = parse_day(start_str).map_err(|_| CycError::invalid_range(text, "unparseable start date"))?;
        let end = parse_day(end_str).map_err(|_| CycError::invalid_range(text, "unparseable end date"))?;
        if start > end {
            return Err(CycError::invalid_range(text, "start date is after end date"));
        }
        Ok(Self { start, end })
    }

    pub fn trading_days(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|d| *d <= self.end)
            .filter(|d| is_trading_day(*d))
            .collect()
    }
}

/// Ascending trading days in `[start, end]`.
pub fn trading_days_in_range(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, CycError> {
    Ok(DateRange::new(start, end)?.trading_days())
}

/// Trading days of a textual range such as `"20241211-20241216"`.
pub fn parse_dates(text: &str) -> Result<Vec<NaiveDate>, CycError> {
    Ok(DateRange::parse(text)?.trading_days())
}

/// Parses a single `YYYYMMDD` day.
pub fn parse_day(text: &str) -> Result<NaiveDate, CycError> {
    let raw = text.trim();
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CycError::invalid_range(text, "expected eight digits YYYYMMDD"));
    }
    NaiveDate::parse_from_str(raw, DAY_FORMAT)
        .map_err(|e| CycError::invalid_range(text, e.to_string()))
}

pub fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Nearest trading day strictly before `date`.
///
/// `None` only when the walk leaves chrono's representable range.
pub fn previous_trading_day(date: NaiveDate) -> Option<NaiveDate> {
    let mut current = date.pred_opt()?;
    while !is_trading_day(current) {
        current = current.pred_opt()?;
    }
    Some(current)
}

/// Nearest trading day strictly after `date`.
pub fn next_trading_day(date: NaiveDate) -> Option<NaiveDate> {
    let mut current = date.succ_opt()?;
    while !is_trading_day(current) {
        current = current.succ_opt()?;
    }
    Some(current)
}

/// Element-wise [`previous_trading_day`].
pub fn previous_trading_days(dates: &[NaiveDate]) -> Result<Vec<NaiveDate>, CycError> {
    dates
        .iter()
        .map(|&date| previous_trading_day(date).ok_or(CycError::DateOutOfRange { date }))
        .collect()
}

/// Element-wise [`next_trading_day`].
pub fn next_trading_days(dates: &[NaiveDate]) -> Result<Vec<NaiveDate>, CycError> {
    dates
        .iter()
        .map(|&date| next_trading_day(date).ok_or(CycError::DateOutOfRange { date }))
        .collect()
}

/// False when `offset` trading days from `date` cannot fit before chrono's
/// first or last representable date. Each step moves at least one calendar
/// day, so an offset larger than the remaining days never resolves.
pub fn within_reach(date: NaiveDate, offset: i64) -> bool {
    let room = if offset >= 0 {
        NaiveDate::MAX.signed_duration_since(date)
    } else {
        date.signed_duration_since(NaiveDate::MIN)
    };
    offset.unsigned_abs() <= room.num_days().unsigned_abs()
}

/// Walks `offset` trading days from `date`: forward when positive, backward
/// when negative. Zero returns `date` itself, trading day or not.
pub fn shift_trading_days(date: NaiveDate, offset: i64) -> Option<NaiveDate> {
    if !within_reach(date, offset) {
        return None;
    }
    let step: fn(NaiveDate) -> Option<NaiveDate> = if offset >= 0 {
        next_trading_day
    } else {
        previous_trading_day
    };
    (0..offset.unsigned_abs()).try_fold(date, |current, _| step(current))
}
