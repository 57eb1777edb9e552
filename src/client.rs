use crate::calendar::BoardCursor;
use crate::models::{CalendarResponse, MoodCreate, MoodEntry, StatisticsResponse};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Non-2xx reply; `detail` is the server's `{"detail": ...}` message.
    #[error("{}", status_message(.status, .detail))]
    Status { status: u16, detail: Option<String> },

    #[error("unexpected response: {0}")]
    Decode(String),
}

fn status_message(status: &u16, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => detail.to_string(),
        None => format!("HTTP error {status}"),
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilters {
    pub date_filter: Option<NaiveDate>,
    pub mood_type: Option<String>,
}

impl ListFilters {
    pub fn is_empty(&self) -> bool {
        self.date_filter.is_none() && self.mood_type.is_none()
    }
}

/// The REST surface the dashboard talks to.
pub trait MoodApi {
    fn list_moods(
        &self,
        filters: &ListFilters,
    ) -> impl Future<Output = Result<Vec<MoodEntry>, ClientError>> + Send;

    fn create_mood(
        &self,
        request: &MoodCreate,
    ) -> impl Future<Output = Result<MoodEntry, ClientError>> + Send;

    fn statistics(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<StatisticsResponse, ClientError>> + Send;

    fn calendar(
        &self,
        cursor: BoardCursor,
    ) -> impl Future<Output = Result<CalendarResponse, ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpMoodApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMoodApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let detail = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.get("detail").and_then(|d| d.as_str()).map(str::to_string));
        return Err(ClientError::Status {
            status: status.as_u16(),
            detail,
        });
    }
    Ok(response.json::<T>().await?)
}

impl MoodApi for HttpMoodApi {
    async fn list_moods(&self, filters: &ListFilters) -> Result<Vec<MoodEntry>, ClientError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(date) = filters.date_filter {
            query.push(("date_filter", date.to_string()));
        }
        if let Some(mood_type) = &filters.mood_type {
            query.push(("mood_type", mood_type.clone()));
        }
        let response = self
            .client
            .get(self.url("/moods/"))
            .query(&query)
            .send()
            .await?;
        decode(response).await
    }

    async fn create_mood(&self, request: &MoodCreate) -> Result<MoodEntry, ClientError> {
        let response = self
            .client
            .post(self.url("/moods/"))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    async fn statistics(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<StatisticsResponse, ClientError> {
        let response = self
            .client
            .get(self.url("/moods/statistics/"))
            .query(&[("start_date", start.to_string()), ("end_date", end.to_string())])
            .send()
            .await?;
        decode(response).await
    }

    async fn calendar(&self, cursor: BoardCursor) -> Result<CalendarResponse, ClientError> {
        let response = self
            .client
            .get(self.url("/moods/calendar/"))
            .query(&[
                ("year", cursor.year.to_string()),
                ("month", cursor.month.to_string()),
            ])
            .send()
            .await?;
        decode(response).await
    }
}
