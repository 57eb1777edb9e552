//! Month board layout.
//!
//! Turns a month snapshot from `/moods/calendar/` into the ordered cells of a
//! Monday-first grid. Nothing here touches the network; the snapshot is
//! replaced wholesale whenever the cursor moves.

use crate::models::{CalendarDay, CalendarResponse};
use crate::stats::date_key;
use chrono::{Datelike, Month, NaiveDate};
use thiserror::Error;

pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub const NO_DATA_COLOR: &str = "#e2e8f0";
const SCORE_COLORS: [&str; 5] = ["#ef4444", "#f97316", "#eab308", "#62f28b", "#048509"];

/// Palette colour for a score; anything outside 1..=5 is the no-data grey.
pub fn mood_color(score: i64) -> &'static str {
    match score {
        1..=5 => SCORE_COLORS[(score - 1) as usize],
        _ => NO_DATA_COLOR,
    }
}

pub fn day_color(day: &CalendarDay) -> &'static str {
    if !day.has_data {
        return NO_DATA_COLOR;
    }
    mood_color(day.average_score.round() as i64)
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

pub fn month_name(month: u32) -> Option<&'static str> {
    let month = u8::try_from(month).ok()?;
    Month::try_from(month).ok().map(|month| month.name())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardCursor {
    pub year: i32,
    pub month: u32,
}

impl BoardCursor {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Moves by `delta` months, carrying into the year.
    pub fn shift(self, delta: i32) -> Self {
        let index = self.year * 12 + self.month as i32 - 1 + delta;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn prev(self) -> Self {
        self.shift(-1)
    }

    pub fn next(self) -> Self {
        self.shift(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub day: u32,
    pub date: NaiveDate,
    pub color: &'static str,
    pub is_today: bool,
    pub has_dot: bool,
    /// Entry count, present only when more than one entry landed on the day.
    pub badge: Option<u32>,
    pub info: CalendarDay,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridCell {
    Blank,
    Day(DayCell),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarGrid {
    pub cursor: BoardCursor,
    pub title: String,
    pub cells: Vec<GridCell>,
}

impl CalendarGrid {
    pub fn leading_blanks(&self) -> usize {
        self.cells
            .iter()
            .take_while(|cell| matches!(cell, GridCell::Blank))
            .count()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayCell> {
        self.cells.iter().find_map(|cell| match cell {
            GridCell::Day(day) if day.date == date => Some(day),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("invalid month {month} in year {year}")]
    InvalidMonth { year: i32, month: u32 },
    #[error("snapshot reports {reported} days, month has {expected}")]
    DayCountMismatch { expected: u32, reported: u32 },
    #[error("calendar unavailable: {0}")]
    Unavailable(String),
}

pub fn build_grid(snapshot: &CalendarResponse, today: NaiveDate) -> Result<CalendarGrid, GridError> {
    let invalid = || GridError::InvalidMonth {
        year: snapshot.year,
        month: snapshot.month,
    };
    let expected = days_in_month(snapshot.year, snapshot.month).ok_or_else(invalid)?;
    if expected != snapshot.total_days {
        return Err(GridError::DayCountMismatch {
            expected,
            reported: snapshot.total_days,
        });
    }
    let first = NaiveDate::from_ymd_opt(snapshot.year, snapshot.month, 1).ok_or_else(invalid)?;
    let offset = first.weekday().num_days_from_monday() as usize;

    let mut cells = Vec::with_capacity(offset + expected as usize);
    cells.extend(std::iter::repeat_n(GridCell::Blank, offset));

    for day in 1..=expected {
        let Some(date) = first.with_day(day) else {
            return Err(invalid());
        };
        let info = snapshot
            .calendar
            .get(&date_key(date))
            .cloned()
            .unwrap_or_else(|| CalendarDay::empty(date));
        let has_data = info.has_data && info.entries_count > 0;
        cells.push(GridCell::Day(DayCell {
            day,
            date,
            color: day_color(&info),
            is_today: date == today,
            has_dot: has_data,
            badge: (has_data && info.entries_count > 1).then_some(info.entries_count),
            info,
        }));
    }

    let title = if snapshot.month_name.is_empty() {
        month_name(snapshot.month).unwrap_or_default().to_string()
    } else {
        snapshot.month_name.clone()
    };

    Ok(CalendarGrid {
        cursor: BoardCursor {
            year: snapshot.year,
            month: snapshot.month,
        },
        title: format!("{title} {}", snapshot.year),
        cells,
    })
}
