//! Dashboard state and the actions that drive it.
//!
//! A `Dashboard` owns what the page shows (form, filters, entry list, month
//! board, statistics and the current notice) and talks to the backend only
//! through a `MoodApi`. Every failure ends up as a `Notice`; nothing here
//! returns an error to the caller.

use crate::calendar::{build_grid, mood_color, BoardCursor, CalendarGrid, GridError};
use crate::client::{ListFilters, MoodApi};
use crate::form::MoodForm;
use crate::models::{MoodEntry, StatisticsResponse};
use chrono::{Duration as DateDuration, NaiveDate};
use std::cmp::Reverse;
use std::time::Duration;
use tracing::{error, info, warn};

pub const SAVED_NOTICE_DELAY: Duration = Duration::from_millis(1500);
pub const FILTER_NOTICE_DELAY: Duration = Duration::from_millis(2000);
pub const TYPE_LABEL_CHARS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub dismiss_after: Option<Duration>,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
            dismiss_after: None,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
            dismiss_after: None,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
            dismiss_after: None,
        }
    }

    pub fn dismiss_after(mut self, delay: Duration) -> Self {
        self.dismiss_after = Some(delay);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoardView {
    Loading,
    Ready(CalendarGrid),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBucket {
    pub score: u8,
    pub count: usize,
    pub percentage: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeBucket {
    pub mood_type: String,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsSummary {
    pub average_score: f64,
    pub total_entries: usize,
    /// Ascending by score, only scores that occur.
    pub scores: Vec<ScoreBucket>,
    pub types: Vec<TypeBucket>,
}

impl StatsSummary {
    pub fn from_response(stats: &StatisticsResponse) -> Self {
        let mut counts = [0usize; 5];
        for entry in &stats.entries_data {
            if (1..=5).contains(&entry.mood_score) {
                counts[usize::from(entry.mood_score - 1)] += 1;
            }
        }

        let scores = if stats.total_entries == 0 {
            Vec::new()
        } else {
            (1..=5u8)
                .filter_map(|score| {
                    let count = counts[usize::from(score - 1)];
                    (count > 0).then(|| ScoreBucket {
                        score,
                        count,
                        percentage: percentage(count, stats.total_entries),
                        color: mood_color(i64::from(score)),
                    })
                })
                .collect()
        };

        let types = stats
            .mood_types
            .iter()
            .map(|(mood_type, count)| TypeBucket {
                mood_type: mood_type.clone(),
                label: short_label(mood_type),
                count: *count,
            })
            .collect();

        Self {
            average_score: stats.average_score,
            total_entries: stats.total_entries,
            scores,
            types,
        }
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

fn short_label(mood_type: &str) -> String {
    if mood_type.chars().count() > TYPE_LABEL_CHARS {
        let head: String = mood_type.chars().take(TYPE_LABEL_CHARS).collect();
        format!("{head}...")
    } else {
        mood_type.to_string()
    }
}

pub fn sort_newest_first(entries: &mut [MoodEntry]) {
    entries.sort_by_key(|entry| Reverse((entry.created_at, entry.id)));
}

pub struct Dashboard<A> {
    api: A,
    today: NaiveDate,
    pub form: MoodForm,
    pub filters: ListFilters,
    pub cursor: BoardCursor,
    pub entries: Vec<MoodEntry>,
    pub board: BoardView,
    pub stats_range: (NaiveDate, NaiveDate),
    pub stats: Option<StatsSummary>,
    pub notice: Option<Notice>,
}

impl<A: MoodApi> Dashboard<A> {
    pub fn new(api: A, today: NaiveDate) -> Self {
        Self {
            api,
            today,
            form: MoodForm::default(),
            filters: ListFilters::default(),
            cursor: BoardCursor::containing(today),
            entries: Vec::new(),
            board: BoardView::Loading,
            stats_range: (today - DateDuration::days(7), today),
            stats: None,
            notice: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Initial page load: entry list plus the current month.
    pub async fn start(&mut self) {
        self.load_moods().await;
        self.load_calendar().await;
    }

    /// Refreshes the entry list; `false` when the request failed.
    pub async fn load_moods(&mut self) -> bool {
        match self.api.list_moods(&self.filters).await {
            Ok(mut entries) => {
                sort_newest_first(&mut entries);
                self.entries = entries;
                true
            }
            Err(err) => {
                error!("failed to load moods: {err}");
                self.notice = Some(Notice::error(format!("Could not load entries: {err}")));
                false
            }
        }
    }

    /// Validates the form and posts it. Returns the created entry on success.
    pub async fn submit(&mut self) -> Option<MoodEntry> {
        let request = match self.form.validate() {
            Ok(request) => request,
            Err(err) => {
                warn!("mood form rejected: {err}");
                self.notice = Some(Notice::error(err.to_string()));
                return None;
            }
        };

        self.notice = Some(Notice::info("Saving mood..."));
        match self.api.create_mood(&request).await {
            Ok(entry) => {
                info!(id = entry.id, "mood saved");
                self.form.reset();
                let refreshed = self.load_moods().await;
                self.load_calendar().await;
                if refreshed {
                    self.notice = Some(
                        Notice::success("Mood saved!").dismiss_after(SAVED_NOTICE_DELAY),
                    );
                }
                Some(entry)
            }
            Err(err) => {
                error!("failed to save mood: {err}");
                self.notice = Some(Notice::error(format!("Error: {err}")));
                None
            }
        }
    }

    pub async fn apply_filters(&mut self, date_filter: Option<NaiveDate>, mood_type: &str) {
        let mood_type = mood_type.trim();
        self.filters = ListFilters {
            date_filter,
            mood_type: (!mood_type.is_empty()).then(|| mood_type.to_string()),
        };
        if self.load_moods().await && !self.filters.is_empty() {
            self.notice = Some(Notice::info("Filters applied").dismiss_after(FILTER_NOTICE_DELAY));
        }
    }

    pub async fn clear_filters(&mut self) {
        self.filters = ListFilters::default();
        if self.load_moods().await {
            self.notice = Some(Notice::info("Filters cleared").dismiss_after(FILTER_NOTICE_DELAY));
        }
    }

    /// Click on a board day: days with entries filter the list, empty days
    /// nudge towards the form.
    pub async fn select_day(&mut self, date: NaiveDate) {
        let has_data = match &self.board {
            BoardView::Ready(grid) => grid.day(date).is_some_and(|cell| cell.has_dot),
            _ => false,
        };
        if has_data {
            self.apply_filters(Some(date), "").await;
        } else {
            let label = date.format("%B %-d");
            self.notice = Some(Notice::info(format!(
                "Selected date: {label}. Fill in the form."
            )));
        }
    }

    pub async fn change_month(&mut self, delta: i32) {
        self.cursor = self.cursor.shift(delta);
        self.load_calendar().await;
    }

    /// Re-fetches and rebuilds the whole board for the cursor's month.
    pub async fn load_calendar(&mut self) {
        self.board = BoardView::Loading;
        let cursor = self.cursor;
        let result = match self.api.calendar(cursor).await {
            Ok(snapshot) if snapshot.year != cursor.year || snapshot.month != cursor.month => {
                Err(GridError::Unavailable(format!(
                    "received {}-{:02} while showing {}-{:02}",
                    snapshot.year, snapshot.month, cursor.year, cursor.month
                )))
            }
            Ok(snapshot) => build_grid(&snapshot, self.today),
            Err(err) => Err(GridError::Unavailable(err.to_string())),
        };

        self.board = match result {
            Ok(grid) => BoardView::Ready(grid),
            Err(err) => {
                error!("failed to load calendar: {err}");
                BoardView::Failed(err.to_string())
            }
        };
    }

    pub async fn load_statistics(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        let (Some(start), Some(end)) = (start, end) else {
            self.notice = Some(Notice::error("Please choose both a start and an end date"));
            return;
        };
        self.stats_range = (start, end);

        match self.api.statistics(start, end).await {
            Ok(stats) => {
                self.stats = Some(StatsSummary::from_response(&stats));
                self.notice = None;
            }
            Err(err) => {
                error!("failed to load statistics: {err}");
                self.notice = Some(Notice::error(format!("Error: {err}")));
            }
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}
