//! US equity market holiday rules.
//!
//! Ten rules produce the observed non-trading weekdays of a year:
//!
//! - Fixed dates with weekend observance: New Year's Day, Juneteenth,
//!   Independence Day, Christmas. Saturday is observed on the preceding
//!   Friday, Sunday on the following Monday; the observed date is kept only
//!   when it falls inside the target year. New Year's Day of the *following*
//!   year is also considered, since a Saturday Jan 1 is observed on Dec 31.
//! - Floating dates: MLK Day, Presidents' Day, Memorial Day, Labor Day,
//!   Thanksgiving.
//! - Good Friday, two days before Gregorian Easter Sunday.
//!
//! Sets are computed once per year and shared through a process-wide cache.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Holiday {
    NewYearsDay,
    MartinLutherKingJrDay,
    PresidentsDay,
    GoodFriday,
    MemorialDay,
    Juneteenth,
    IndependenceDay,
    LaborDay,
    Thanksgiving,
    Christmas,
}

impl fmt::Display for Holiday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Holiday::NewYearsDay => "New Year's Day",
            Holiday::MartinLutherKingJrDay => "Martin Luther King Jr. Day",
            Holiday::PresidentsDay => "Presidents' Day",
            Holiday::GoodFriday => "Good Friday",
            Holiday::MemorialDay => "Memorial Day",
            Holiday::Juneteenth => "Juneteenth",
            Holiday::IndependenceDay => "Independence Day",
            Holiday::LaborDay => "Labor Day",
            Holiday::Thanksgiving => "Thanksgiving Day",
            Holiday::Christmas => "Christmas Day",
        };
        f.write_str(name)
    }
}

/// Observed holidays of a single year, ordered by date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidaySet {
    pub year: i32,
    days: BTreeMap<NaiveDate, Holiday>,
}

impl HolidaySet {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<Holiday> {
        self.days.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Holiday)> + '_ {
        self.days.iter().map(|(d, h)| (*d, *h))
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.days.keys().copied().collect()
    }
}

type HolidayCache = RwLock<HashMap<i32, Arc<HolidaySet>>>;

static CACHE: OnceLock<HolidayCache> = OnceLock::new();

fn cache() -> &'static HolidayCache {
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Holiday set for `year`, computed on first request and cached thereafter.
///
/// Two threads missing the same year concurrently may both compute it; the
/// first insert wins and both results are identical.
pub fn holidays(year: i32) -> Arc<HolidaySet> {
    let cached = cache()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&year)
        .cloned();
    if let Some(set) = cached {
        return set;
    }

    let computed = Arc::new(compute_holidays(year));
    debug!(year, count = computed.len(), "computed holiday set");

    let mut guard = cache().write().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(guard.entry(year).or_insert(computed))
}

/// Drops every cached year. Subsequent lookups recompute on demand.
pub fn clear_holiday_cache() {
    cache()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}

pub fn is_holiday(date: NaiveDate) -> bool {
    holidays(date.year()).contains(date)
}

/// Builds the holiday set without touching the cache.
pub fn compute_holidays(year: i32) -> HolidaySet {
    let mut days = BTreeMap::new();
    let mut keep = |date: Option<NaiveDate>, holiday: Holiday| {
        if let Some(d) = date.filter(|d| d.year() == year) {
            days.insert(d, holiday);
        }
    };

    // New Year's Day of this year and of the next one (Dec 31 observance).
    keep(fixed_observed(year, 1, 1), Holiday::NewYearsDay);
    keep(
        year.checked_add(1).and_then(|next| fixed_observed(next, 1, 1)),
        Holiday::NewYearsDay,
    );
    keep(fixed_observed(year, 6, 19), Holiday::Juneteenth);
    keep(fixed_observed(year, 7, 4), Holiday::IndependenceDay);
    keep(fixed_observed(year, 12, 25), Holiday::Christmas);

    keep(
        nth_weekday_of_month(year, 1, Weekday::Mon, 3),
        Holiday::MartinLutherKingJrDay,
    );
    keep(
        nth_weekday_of_month(year, 2, Weekday::Mon, 3),
        Holiday::PresidentsDay,
    );
    keep(
        last_weekday_of_month(year, 5, Weekday::Mon),
        Holiday::MemorialDay,
    );
    keep(nth_weekday_of_month(year, 9, Weekday::Mon, 1), Holiday::LaborDay);
    keep(
        nth_weekday_of_month(year, 11, Weekday::Thu, 4),
        Holiday::Thanksgiving,
    );

    keep(
        easter_sunday(year).and_then(|easter| easter.checked_sub_days(Days::new(2))),
        Holiday::GoodFriday,
    );

    HolidaySet { year, days }
}

fn fixed_observed(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).and_then(observed)
}

/// Saturday → preceding Friday, Sunday → following Monday.
pub fn observed(date: NaiveDate) -> Option<NaiveDate> {
    match date.weekday() {
        Weekday::Sat => date.pred_opt(),
        Weekday::Sun => date.succ_opt(),
        _ => Some(date),
    }
}

/// The `n`th (1-based) `weekday` of the month.
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u32) -> Option<NaiveDate> {
    if n == 0 {
        return None;
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let lead = (7 + weekday.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    let date = first.checked_add_days(Days::new(u64::from(lead + 7 * (n - 1))))?;
    (date.month() == month).then_some(date)
}

/// The last `weekday` of the month, possibly the month's final day.
pub fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
    let back = (7 + last.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    last.checked_sub_days(Days::new(u64::from(back)))
}

/// Gregorian Easter Sunday (anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b.div_euclid(4);
    let e = b.rem_euclid(4);
    let f = (b + 8).div_euclid(25);
    let g = (b - f + 1).div_euclid(3);
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c.div_euclid(4);
    let k = c.rem_euclid(4);
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l).div_euclid(451);
    let month = (h + l - 7 * m + 114).div_euclid(31);
    let day = (h + l - 7 * m + 114).rem_euclid(31) + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}
