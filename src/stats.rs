use crate::calendar::{days_in_month, month_name};
use crate::errors::AppError;
use crate::models::{
    CalendarDay, CalendarResponse, EntryPoint, MoodEntry, MoodStore, ScorePoint,
    StatisticsResponse,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub fn build_statistics(
    store: &MoodStore,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<StatisticsResponse, AppError> {
    if start > end {
        return Err(AppError::bad_request("start_date must not be after end_date"));
    }

    let entries: Vec<&MoodEntry> = store.between(start, end).collect();
    if entries.is_empty() {
        return Ok(StatisticsResponse {
            average_score: 0.0,
            total_entries: 0,
            mood_types: BTreeMap::new(),
            entries_data: Vec::new(),
        });
    }

    let total: u64 = entries.iter().map(|entry| u64::from(entry.mood_score)).sum();
    let mut mood_types = BTreeMap::new();
    for entry in &entries {
        *mood_types.entry(entry.mood_type.clone()).or_insert(0) += 1;
    }

    let entries_data = entries
        .iter()
        .map(|entry| EntryPoint {
            id: entry.id,
            mood_type: entry.mood_type.clone(),
            mood_score: entry.mood_score,
            date: entry.date,
        })
        .collect();

    Ok(StatisticsResponse {
        average_score: round2(total as f64 / entries.len() as f64),
        total_entries: entries.len(),
        mood_types,
        entries_data,
    })
}

/// Per-day rollup for every day of the month, keyed by ISO date.
pub fn build_calendar(store: &MoodStore, year: i32, month: u32) -> Result<CalendarResponse, AppError> {
    let total_days = days_in_month(year, month)
        .ok_or_else(|| AppError::bad_request("month must be between 1 and 12"))?;
    let name = month_name(month).ok_or_else(|| AppError::bad_request("unknown month"))?;

    let mut calendar = BTreeMap::new();
    for day in 1..=total_days {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        calendar.insert(date_key(date), CalendarDay::empty(date));
    }

    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::bad_request("invalid year"))?;
    let last = NaiveDate::from_ymd_opt(year, month, total_days)
        .ok_or_else(|| AppError::bad_request("invalid year"))?;

    let mut ordered: Vec<&MoodEntry> = store.between(first, last).collect();
    ordered.sort_by_key(|entry| (entry.created_at, entry.id));

    for entry in ordered {
        let Some(day) = calendar.get_mut(&date_key(entry.date)) else {
            continue;
        };
        day.has_data = true;
        day.entries_count += 1;
        day.entries.push(ScorePoint {
            score: entry.mood_score,
        });
        if !day.mood_types.contains(&entry.mood_type) {
            day.mood_types.push(entry.mood_type.clone());
        }
    }

    for day in calendar.values_mut().filter(|day| day.has_data) {
        let sum: u32 = day.entries.iter().map(|point| u32::from(point.score)).sum();
        day.average_score = round2(f64::from(sum) / f64::from(day.entries_count));
    }

    Ok(CalendarResponse {
        year,
        month,
        month_name: name.to_string(),
        total_days,
        calendar,
    })
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
