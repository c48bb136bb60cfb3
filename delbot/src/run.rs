//! Daily-run support.
//!
//! The run loop that fetches, classifies, and writes reports lives outside
//! this crate; what lives here is its call contract: the calendar-day
//! cursor it walks, the per-run cache of already-ensured container
//! categories, and the list of category titles a day needs checked.

use std::collections::HashSet;

use chrono::{Datelike, Days, NaiveDate};

use crate::models::category::{monthly_category_title, yearly_category_title, CategoryKind};

/// Calendar-day cursor a run walks over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunDate {
    date: NaiveDate,
}

impl RunDate {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::new)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// 1-12.
    pub fn month(&self) -> u32 {
        self.date.month()
    }

    /// 1-31.
    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn next_day(self) -> Self {
        self.add_days(1)
    }

    pub fn previous_day(self) -> Self {
        self.sub_days(1)
    }

    pub fn add_days(self, days: u64) -> Self {
        Self::new(self.date + Days::new(days))
    }

    pub fn sub_days(self, days: u64) -> Self {
        Self::new(self.date - Days::new(days))
    }
}

/// Per-run memory of the yearly and monthly container categories already
/// ensured, so a multi-day run checks each at most once. Owned by the
/// caller and passed into every day's work.
#[derive(Debug, Clone, Default)]
pub struct CategoryCreationCache {
    years: HashSet<i32>,
    months: HashSet<(i32, u32)>,
}

impl CategoryCreationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the yearly category of `year` has been ensured.
    /// Returns `true` the first time.
    pub fn mark_year(&mut self, year: i32) -> bool {
        self.years.insert(year)
    }

    /// Record that the monthly category of `(year, month)` has been
    /// ensured. Returns `true` the first time.
    pub fn mark_month(&mut self, year: i32, month: u32) -> bool {
        self.months.insert((year, month))
    }

    pub fn has_year(&self, year: i32) -> bool {
        self.years.contains(&year)
    }

    pub fn has_month(&self, year: i32, month: u32) -> bool {
        self.months.contains(&(year, month))
    }
}

/// Category titles a run over `date` must check for existence, in check
/// order: the daily variants first, then the monthly and yearly containers
/// not yet ensured in this run. The existence probe itself goes through
/// [`crate::wiki::RecordSource::missing_titles`].
pub fn categories_to_ensure(date: NaiveDate, cache: &CategoryCreationCache) -> Vec<String> {
    let mut titles: Vec<String> = CategoryKind::all()
        .iter()
        .map(|kind| kind.daily_title(date))
        .collect();

    if !cache.has_month(date.year(), date.month()) {
        titles.push(monthly_category_title(date.year(), date.month()));
    }
    if !cache.has_year(date.year()) {
        titles.push(yearly_category_title(date.year()));
    }

    titles
}
