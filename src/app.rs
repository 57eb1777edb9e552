use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/board/", get(handlers::board))
        .route(
            "/moods/",
            get(handlers::list_moods).post(handlers::create_mood),
        )
        .route("/moods/statistics/", get(handlers::get_statistics))
        .route("/moods/calendar/", get(handlers::get_calendar))
        .route(
            "/moods/:id",
            get(handlers::get_mood)
                .put(handlers::update_mood)
                .delete(handlers::delete_mood),
        )
        .with_state(state)
}
