pub mod app;
pub mod calendar;
pub mod client;
pub mod dashboard;
pub mod entries;
pub mod errors;
pub mod form;
pub mod handlers;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
pub mod tooltip;
pub mod ui;

pub use app::router;
pub use client::{HttpMoodApi, MoodApi};
pub use dashboard::Dashboard;
pub use state::AppState;
pub use storage::{load_store, resolve_data_path, resolve_port};
