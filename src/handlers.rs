use crate::calendar::build_grid;
use crate::errors::AppError;
use crate::models::{
    CalendarQuery, CalendarResponse, ListQuery, MoodCreate, MoodEntry, MoodStore, MoodUpdate,
    StatisticsQuery, StatisticsResponse,
};
use crate::state::AppState;
use crate::stats::{build_calendar, build_statistics};
use crate::storage::persist_store;
use crate::ui::{render_board, render_board_error, render_index};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::{Datelike, Local, NaiveDate};
use tracing::{error, info, warn};

// Extractors are taken as `Result` so rejections go through `AppError`.
type JsonBody<T> = Result<Json<T>, JsonRejection>;
type QueryParams<T> = Result<Query<T>, QueryRejection>;
type MoodId = Result<Path<u64>, PathRejection>;

pub async fn index() -> Html<String> {
    Html(render_index(&today().to_string()))
}

pub async fn list_moods(
    State(state): State<AppState>,
    query: QueryParams<ListQuery>,
) -> Result<Json<Vec<MoodEntry>>, AppError> {
    let Query(query) = query?;
    let store = state.store.lock().await;
    Ok(Json(store.list(&query)?))
}

pub async fn create_mood(
    State(state): State<AppState>,
    payload: JsonBody<MoodCreate>,
) -> Result<(StatusCode, Json<MoodEntry>), AppError> {
    let Json(payload) = payload.inspect_err(|rejection| {
        warn!("rejected mood entry: {}", rejection.body_text());
    })?;
    let mut store = state.store.lock().await;
    let mut next = store.clone();
    let entry = next.create(payload, Local::now().naive_local()).inspect_err(|err| {
        warn!("rejected mood entry: {}", err.message);
    })?;
    commit(&state, &mut store, next).await?;

    info!(id = entry.id, mood_type = %entry.mood_type, score = entry.mood_score, "mood created");
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn get_mood(
    State(state): State<AppState>,
    id: MoodId,
) -> Result<Json<MoodEntry>, AppError> {
    let Path(id) = id?;
    let store = state.store.lock().await;
    store.get(id).cloned().map(Json).ok_or_else(AppError::not_found)
}

pub async fn update_mood(
    State(state): State<AppState>,
    id: MoodId,
    payload: JsonBody<MoodUpdate>,
) -> Result<Json<MoodEntry>, AppError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let mut store = state.store.lock().await;
    let mut next = store.clone();
    let entry = next.update(id, payload)?;
    commit(&state, &mut store, next).await?;

    info!(id, "mood updated");
    Ok(Json(entry))
}

pub async fn delete_mood(
    State(state): State<AppState>,
    id: MoodId,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    let mut store = state.store.lock().await;
    let mut next = store.clone();
    if !next.delete(id) {
        return Err(AppError::not_found());
    }
    commit(&state, &mut store, next).await?;

    info!(id, "mood deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_statistics(
    State(state): State<AppState>,
    query: QueryParams<StatisticsQuery>,
) -> Result<Json<StatisticsResponse>, AppError> {
    let Query(query) = query?;
    let (Some(start), Some(end)) = (query.start_date, query.end_date) else {
        return Err(AppError::unprocessable("start_date and end_date are required"));
    };
    let store = state.store.lock().await;
    Ok(Json(build_statistics(&store, start, end)?))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    query: QueryParams<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let Query(query) = query?;
    Ok(Json(calendar_for(&state, &query).await?))
}

/// Server-rendered month board; bad requests become an inline error block.
pub async fn board(State(state): State<AppState>, query: QueryParams<CalendarQuery>) -> Html<String> {
    let snapshot = match query {
        Ok(Query(query)) => calendar_for(&state, &query).await,
        Err(rejection) => Err(rejection.into()),
    };
    let html = match snapshot {
        Ok(snapshot) => match build_grid(&snapshot, today()) {
            Ok(grid) => render_board(&grid),
            Err(err) => render_board_error(&err.to_string()),
        },
        Err(err) => {
            warn!("board request rejected: {}", err.message);
            render_board_error(&err.message)
        }
    };
    Html(html)
}

/// Writes `next` to disk and only then makes it the live store, so a failed
/// write leaves memory and file in agreement.
async fn commit(state: &AppState, store: &mut MoodStore, next: MoodStore) -> Result<(), AppError> {
    persist_store(&state.data_path, &next).await.inspect_err(|err| {
        error!("failed to persist mood store: {}", err.message);
    })?;
    *store = next;
    Ok(())
}

async fn calendar_for(state: &AppState, query: &CalendarQuery) -> Result<CalendarResponse, AppError> {
    let now = today();
    let year = query.year.unwrap_or_else(|| now.year());
    let month = query.month.unwrap_or_else(|| now.month());
    let store = state.store.lock().await;
    build_calendar(&store, year, month)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
