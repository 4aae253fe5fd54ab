//! Calendar math for the scheduling grid.
//!
//! Every date handled here is a `NaiveDate`: a calendar day with no clock time and no
//! zone. Values that do carry a clock time are reduced to their local calendar fields
//! (see [`date_key`]) and never round-tripped through UTC.

use anyhow::{bail, Result};
use chrono::{Datelike, Duration, Local, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Six full Monday-first weeks.
pub const MONTH_GRID_DAYS: usize = 42;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    Week,
    Month,
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::Week
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            bail!("date range ends ({end}) before it starts ({start})");
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }
}

/// One cell of a month grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GridDay {
    pub date: NaiveDate,
    pub is_current_month: bool,
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// The seven days of the week containing `reference`, Monday first.
pub fn week_dates(reference: NaiveDate) -> [NaiveDate; 7] {
    let monday = week_start(reference);
    std::array::from_fn(|offset| monday + Duration::days(offset as i64))
}

/// 42 days covering `month` (1-12) of `year`, padded with the tail of the previous
/// month and the head of the next so the grid is always six weeks tall.
pub fn month_grid(year: i32, month: u32) -> Result<Vec<GridDay>> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        bail!("invalid month {year}-{month:02}");
    };
    let grid_start = week_start(first);

    Ok((0..MONTH_GRID_DAYS)
        .map(|offset| {
            let date = grid_start + Duration::days(offset as i64);
            GridDay {
                date,
                is_current_month: date.year() == year && date.month() == month,
            }
        })
        .collect())
}

/// `YYYY-MM-DD` built from the value's own calendar fields.
///
/// For a zoned `DateTime` this is the day on the wall clock of that zone. Converting to
/// UTC first would move late-evening times west of UTC (and early-morning times east of
/// it) onto a neighbouring day.
pub fn date_key<D: Datelike>(date: &D) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

pub fn parse_date_key(key: &str) -> Result<NaiveDate> {
    match NaiveDate::parse_from_str(key, "%Y-%m-%d") {
        Ok(date) => Ok(date),
        Err(err) => bail!("invalid date key '{key}': {err}"),
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_today(date: NaiveDate, today: NaiveDate) -> bool {
    date == today
}

/// Today's date on the local clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// The range that has to be loaded to show `cursor` in the given view mode.
///
/// Week view loads the whole Monday-Sunday week even when weekends are hidden, so
/// toggling weekends never requires a reload. Month view loads the full 42-day grid.
pub fn visible_range(cursor: NaiveDate, mode: ViewMode) -> DateRange {
    let start = match mode {
        ViewMode::Week => week_start(cursor),
        ViewMode::Month => week_start(first_of_month(cursor)),
    };
    let span = match mode {
        ViewMode::Week => 6,
        ViewMode::Month => MONTH_GRID_DAYS as i64 - 1,
    };
    DateRange {
        start,
        end: start + Duration::days(span),
    }
}

/// Days shown as columns for `cursor`, dropping Saturday and Sunday when hidden.
pub fn visible_days(cursor: NaiveDate, mode: ViewMode, show_weekends: bool) -> Vec<NaiveDate> {
    visible_range(cursor, mode)
        .days()
        .filter(|day| show_weekends || !is_weekend(*day))
        .collect()
}

/// Other days of the source's week that a copy-to-week operation writes to.
pub fn week_targets(source: NaiveDate, show_weekends: bool) -> Vec<NaiveDate> {
    week_dates(source)
        .into_iter()
        .filter(|day| *day != source)
        .filter(|day| show_weekends || !is_weekend(*day))
        .collect()
}

/// Moves the navigation cursor one page. Month steps land on the first of the month.
pub fn shift_cursor(cursor: NaiveDate, mode: ViewMode, forward: bool) -> Option<NaiveDate> {
    match (mode, forward) {
        (ViewMode::Week, true) => cursor.checked_add_signed(Duration::days(7)),
        (ViewMode::Week, false) => cursor.checked_sub_signed(Duration::days(7)),
        (ViewMode::Month, true) => first_of_month(cursor).checked_add_months(Months::new(1)),
        (ViewMode::Month, false) => first_of_month(cursor).checked_sub_months(Months::new(1)),
    }
}
