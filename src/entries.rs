use crate::errors::AppError;
use crate::form::{check_notes, check_score, check_type};
use crate::models::{ListQuery, MoodCreate, MoodEntry, MoodStore, MoodUpdate};
use chrono::{NaiveDate, NaiveDateTime};
use std::cmp::Reverse;

pub const DEFAULT_LIMIT: usize = 100;
pub const MAX_LIMIT: usize = 100;

impl MoodStore {
    pub fn create(&mut self, request: MoodCreate, now: NaiveDateTime) -> Result<MoodEntry, AppError> {
        check_type(&request.mood_type).map_err(|err| AppError::unprocessable(err.to_string()))?;
        let mood_score =
            check_score(request.mood_score).map_err(|err| AppError::unprocessable(err.to_string()))?;
        check_notes(request.notes.as_deref())
            .map_err(|err| AppError::unprocessable(err.to_string()))?;

        let entry = MoodEntry {
            id: self.next_id,
            mood_type: request.mood_type,
            mood_score,
            notes: request.notes,
            date: now.date(),
            created_at: now,
        };
        self.next_id = self.next_id.saturating_add(1);
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Filtered page of entries, newest `created_at` first.
    pub fn list(&self, query: &ListQuery) -> Result<Vec<MoodEntry>, AppError> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 || limit > MAX_LIMIT {
            return Err(AppError::unprocessable(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        let mood_type = query.mood_type.as_deref().filter(|value| !value.is_empty());

        let mut matches: Vec<&MoodEntry> = self
            .entries
            .iter()
            .filter(|entry| query.date_filter.is_none_or(|date| entry.date == date))
            .filter(|entry| mood_type.is_none_or(|kind| entry.mood_type == kind))
            .collect();
        matches.sort_by_key(|entry| Reverse((entry.created_at, entry.id)));

        Ok(matches
            .into_iter()
            .skip(query.skip.unwrap_or(0))
            .take(limit)
            .cloned()
            .collect())
    }

    pub fn get(&self, id: u64) -> Option<&MoodEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn update(&mut self, id: u64, update: MoodUpdate) -> Result<MoodEntry, AppError> {
        if let Some(mood_type) = update.mood_type.as_deref() {
            check_type(mood_type).map_err(|err| AppError::unprocessable(err.to_string()))?;
        }
        let mood_score = update
            .mood_score
            .map(check_score)
            .transpose()
            .map_err(|err| AppError::unprocessable(err.to_string()))?;
        check_notes(update.notes.as_deref())
            .map_err(|err| AppError::unprocessable(err.to_string()))?;

        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(AppError::not_found)?;

        if let Some(mood_type) = update.mood_type {
            entry.mood_type = mood_type;
        }
        if let Some(score) = mood_score {
            entry.mood_score = score;
        }
        if let Some(notes) = update.notes {
            entry.notes = Some(notes);
        }
        Ok(entry.clone())
    }

    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Entries whose calendar date falls in `start..=end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = &MoodEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.date >= start && entry.date <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn request(mood_type: &str, score: i64) -> MoodCreate {
        MoodCreate {
            mood_type: mood_type.to_string(),
            mood_score: score,
            notes: None,
        }
    }

    #[test]
    fn create_assigns_ids_and_dates() {
        let mut store = MoodStore::default();
        let first = store.create(request("calm", 4), at(2, 9)).unwrap();
        let second = store.create(request("happy", 5), at(3, 9)).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2026, 3, 3).unwrap());
        assert_eq!(store.next_id, 3);
    }

    #[test]
    fn create_rejects_invalid_score() {
        let mut store = MoodStore::default();
        let err = store.create(request("calm", 9), at(2, 9)).unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(store.entries.is_empty());
    }

    #[test]
    fn list_is_newest_first_and_filtered() {
        let mut store = MoodStore::default();
        store.create(request("calm", 4), at(2, 9)).unwrap();
        store.create(request("happy", 5), at(2, 18)).unwrap();
        store.create(request("calm", 2), at(3, 8)).unwrap();

        let all = store.list(&ListQuery::default()).unwrap();
        let ids: Vec<u64> = all.iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        let calm = store
            .list(&ListQuery {
                mood_type: Some("calm".into()),
                ..ListQuery::default()
            })
            .unwrap();
        assert_eq!(calm.len(), 2);

        let on_second = store
            .list(&ListQuery {
                date_filter: NaiveDate::from_ymd_opt(2026, 3, 2),
                ..ListQuery::default()
            })
            .unwrap();
        assert_eq!(on_second.len(), 2);
    }

    #[test]
    fn list_pages_with_skip_and_limit() {
        let mut store = MoodStore::default();
        for hour in 0..5 {
            store.create(request("calm", 3), at(4, hour)).unwrap();
        }
        let page = store
            .list(&ListQuery {
                skip: Some(1),
                limit: Some(2),
                ..ListQuery::default()
            })
            .unwrap();
        let ids: Vec<u64> = page.iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec![4, 3]);

        let err = store
            .list(&ListQuery {
                limit: Some(101),
                ..ListQuery::default()
            })
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let mut store = MoodStore::default();
        store.create(request("calm", 4), at(2, 9)).unwrap();
        let updated = store
            .update(
                1,
                MoodUpdate {
                    mood_score: Some(2),
                    ..MoodUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.mood_type, "calm");
        assert_eq!(updated.mood_score, 2);

        let missing = store.update(42, MoodUpdate::default()).unwrap_err();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn delete_reports_whether_entry_existed() {
        let mut store = MoodStore::default();
        store.create(request("calm", 4), at(2, 9)).unwrap();
        assert!(store.delete(1));
        assert!(!store.delete(1));
        assert!(store.get(1).is_none());
    }
}
