use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: u64,
    pub mood_type: String,
    pub mood_score: u8,
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub created_at: NaiveDateTime,
}

/// Everything persisted to the data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodStore {
    pub next_id: u64,
    pub entries: Vec<MoodEntry>,
}

impl Default for MoodStore {
    fn default() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodCreate {
    pub mood_type: String,
    pub mood_score: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoodUpdate {
    #[serde(default)]
    pub mood_type: Option<String>,
    #[serde(default)]
    pub mood_score: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
    pub date_filter: Option<NaiveDate>,
    pub mood_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatisticsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub id: u64,
    pub mood_type: String,
    pub mood_score: u8,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsResponse {
    pub average_score: f64,
    pub total_entries: usize,
    pub mood_types: BTreeMap<String, usize>,
    pub entries_data: Vec<EntryPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub has_data: bool,
    #[serde(default)]
    pub average_score: f64,
    #[serde(default)]
    pub entries_count: u32,
    #[serde(default)]
    pub mood_types: Vec<String>,
    #[serde(default)]
    pub entries: Vec<ScorePoint>,
}

impl CalendarDay {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            has_data: false,
            average_score: 0.0,
            entries_count: 0,
            mood_types: Vec::new(),
            entries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub total_days: u32,
    pub calendar: BTreeMap<String, CalendarDay>,
}
