//! Time-of-day parsing and intraday windows.
//!
//! Accepted forms: `H:MM`, `H:MM:SS`, `H:MM:SS.fraction`. The fraction keeps
//! at most nine digits (nanoseconds); shorter fractions are right-padded.

use crate::domain::error::CycError;
use chrono::{NaiveTime, Timelike};

pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Nanoseconds since midnight for a time-of-day string.
pub fn parse_time_to_ns(raw: &str) -> Result<u64, CycError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(CycError::invalid_time(raw, "time string cannot be empty"));
    }

    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(CycError::invalid_time(raw, "expected H:MM, H:MM:SS or H:MM:SS.fraction"));
    }

    let sec_part = parts.get(2).copied().unwrap_or("0");
    let (sec_str, frac_str) = sec_part.split_once('.').unwrap_or((sec_part, ""));

    let hour = parse_component(raw, parts[0], "hour")?;
    let minute = parse_component(raw, parts[1], "minute")?;
    let second = if sec_str.is_empty() {
        0
    } else {
        parse_component(raw, sec_str, "second")?
    };

    if hour >= 24 || minute >= 60 || second >= 60 {
        return Err(CycError::invalid_time(raw, "component out of range"));
    }
    if !frac_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CycError::invalid_time(raw, "fractional seconds must be digits"));
    }

    let nanos = if frac_str.is_empty() {
        0
    } else {
        let kept = &frac_str[..frac_str.len().min(9)];
        format!("{kept:0<9}")
            .parse::<u64>()
            .map_err(|e| CycError::invalid_time(raw, e.to_string()))?
    };

    let total_seconds = hour * 3600 + minute * 60 + second;
    Ok(total_seconds * NANOS_PER_SECOND + nanos)
}

fn parse_component(raw: &str, part: &str, name: &str) -> Result<u64, CycError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CycError::invalid_time(raw, format!("{name} must be a number")));
    }
    part.parse()
        .map_err(|_| CycError::invalid_time(raw, format!("{name} must be a number")))
}

pub fn time_to_ns(time: NaiveTime) -> u64 {
    u64::from(time.num_seconds_from_midnight()) * NANOS_PER_SECOND + u64::from(time.nanosecond())
}

/// Inverse of [`time_to_ns`]; `None` at or past midnight of the next day.
pub fn time_from_ns(ns: u64) -> Option<NaiveTime> {
    let secs = u32::try_from(ns / NANOS_PER_SECOND).ok()?;
    let nanos = u32::try_from(ns % NANOS_PER_SECOND).ok()?;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
}

/// Parses a time-of-day cell in any form [`parse_time_to_ns`] accepts.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, CycError> {
    let ns = parse_time_to_ns(raw)?;
    time_from_ns(ns).ok_or_else(|| CycError::invalid_time(raw, "component out of range"))
}

/// `HH:MM:SS`, with a fractional part only when it is non-zero.
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S%.f").to_string()
}

/// Inclusive intraday bounds; an absent bound leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_ns: Option<u64>,
    pub end_ns: Option<u64>,
}

impl TimeWindow {
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, CycError> {
        Ok(Self {
            start_ns: start.map(parse_time_to_ns).transpose()?,
            end_ns: end.map(parse_time_to_ns).transpose()?,
        })
    }

    pub fn contains(&self, ns_since_midnight: u64) -> bool {
        self.start_ns.is_none_or(|s| ns_since_midnight >= s)
            && self.end_ns.is_none_or(|e| ns_since_midnight <= e)
    }

    pub fn contains_time(&self, time: NaiveTime) -> bool {
        self.contains(time_to_ns(time))
    }

    pub fn is_unbounded(&self) -> bool {
        self.start_ns.is_none() && self.end_ns.is_none()
    }

    /// Row filter: a row without a time only passes an unbounded window.
    pub fn admits(&self, time: Option<NaiveTime>) -> bool {
        match time {
            Some(t) => self.contains_time(t),
            None => self.is_unbounded(),
        }
    }
}
