//! Mood form validation.
//!
//! The dashboard validates before any request is issued; the server runs the
//! same field checks on whatever arrives over the wire.

use crate::models::MoodCreate;
use thiserror::Error;

pub const MAX_TYPE_CHARS: usize = 50;
pub const MAX_NOTES_CHARS: usize = 500;
pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 5;
pub const DEFAULT_SCORE: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please enter a mood type")]
    MissingType,
    #[error("Mood type must be at most {} characters", MAX_TYPE_CHARS)]
    TypeTooLong,
    #[error("Score must be between {} and {}", MIN_SCORE, MAX_SCORE)]
    ScoreOutOfRange,
    #[error("Notes must be at most {} characters", MAX_NOTES_CHARS)]
    NotesTooLong,
}

pub fn check_type(mood_type: &str) -> Result<(), FormError> {
    let len = mood_type.chars().count();
    if len == 0 {
        return Err(FormError::MissingType);
    }
    if len > MAX_TYPE_CHARS {
        return Err(FormError::TypeTooLong);
    }
    Ok(())
}

pub fn check_score(score: i64) -> Result<u8, FormError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(FormError::ScoreOutOfRange);
    }
    Ok(score as u8)
}

pub fn check_notes(notes: Option<&str>) -> Result<(), FormError> {
    match notes {
        Some(text) if text.chars().count() > MAX_NOTES_CHARS => Err(FormError::NotesTooLong),
        _ => Ok(()),
    }
}

/// Raw form input, as typed by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodForm {
    pub mood_type: String,
    pub mood_score: String,
    pub notes: String,
}

impl Default for MoodForm {
    fn default() -> Self {
        Self {
            mood_type: String::new(),
            mood_score: DEFAULT_SCORE.to_string(),
            notes: String::new(),
        }
    }
}

impl MoodForm {
    pub fn new(mood_type: &str, mood_score: i64, notes: &str) -> Self {
        Self {
            mood_type: mood_type.to_string(),
            mood_score: mood_score.to_string(),
            notes: notes.to_string(),
        }
    }

    /// Turns the raw input into a create request or the first failing rule.
    pub fn validate(&self) -> Result<MoodCreate, FormError> {
        let mood_type = self.mood_type.trim();
        check_type(mood_type)?;

        let score = self
            .mood_score
            .trim()
            .parse::<i64>()
            .map_err(|_| FormError::ScoreOutOfRange)?;
        check_score(score)?;

        let notes = match self.notes.trim() {
            "" => None,
            text => Some(text.to_string()),
        };
        check_notes(notes.as_deref())?;

        Ok(MoodCreate {
            mood_type: mood_type.to_string(),
            mood_score: score,
            notes,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
