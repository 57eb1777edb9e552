use chrono::{Local, NaiveDate};
use mood_flow::dashboard::{BoardView, NoticeKind};
use mood_flow::form::MoodForm;
use mood_flow::models::MoodStore;
use mood_flow::{router, AppState, Dashboard, HttpMoodApi};
use std::path::PathBuf;

/// Data file for one in-process server, removed when the test ends.
struct TempStore(PathBuf);

impl TempStore {
    fn new(name: &str) -> Self {
        let mut path = std::env::temp_dir();
        path.push(format!("mood_flow_dashboard_{}_{name}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);
        Self(path)
    }
}

impl Drop for TempStore {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

async fn serve(name: &str) -> (String, TempStore) {
    let data = TempStore::new(name);
    let state = AppState::new(data.0.clone(), MoodStore::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    (format!("http://{addr}"), data)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[tokio::test]
async fn submit_refreshes_list_and_board() {
    let (base_url, _data) = serve("submit").await;
    let mut dashboard = Dashboard::new(HttpMoodApi::new(base_url), today());
    dashboard.start().await;
    assert!(dashboard.entries.is_empty());
    assert!(matches!(dashboard.board, BoardView::Ready(_)));

    dashboard.form = MoodForm::new("calm", 4, "walk in the park");
    let first = dashboard.submit().await.expect("first entry");
    dashboard.form = MoodForm::new("happy", 5, "");
    let second = dashboard.submit().await.expect("second entry");

    let ids: Vec<u64> = dashboard.entries.iter().map(|entry| entry.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(dashboard.entries[0].notes, None);
    assert_eq!(dashboard.notice.as_ref().unwrap().kind, NoticeKind::Success);

    match &dashboard.board {
        BoardView::Ready(grid) => {
            let cell = grid.day(today()).expect("today on board");
            assert!(cell.is_today);
            assert_eq!(cell.badge, Some(2));
        }
        other => panic!("board not ready: {other:?}"),
    }
}

#[tokio::test]
async fn invalid_form_creates_nothing() {
    let (base_url, _data) = serve("invalid").await;
    let mut dashboard = Dashboard::new(HttpMoodApi::new(base_url), today());

    dashboard.form = MoodForm::new("ok", 6, "");
    assert!(dashboard.submit().await.is_none());
    assert_eq!(dashboard.notice.as_ref().unwrap().kind, NoticeKind::Error);

    dashboard.load_moods().await;
    assert!(dashboard.entries.is_empty());
}

#[tokio::test]
async fn statistics_summarize_saved_entries() {
    let (base_url, _data) = serve("stats").await;
    let mut dashboard = Dashboard::new(HttpMoodApi::new(base_url), today());

    for (mood_type, score) in [("calm", 4), ("calm", 4), ("sad", 1), ("happy", 5)] {
        dashboard.form = MoodForm::new(mood_type, score, "");
        dashboard.submit().await.expect("saved");
    }

    let (start, end) = dashboard.stats_range;
    dashboard.load_statistics(Some(start), Some(end)).await;
    let stats = dashboard.stats.as_ref().expect("stats loaded");
    assert_eq!(stats.total_entries, 4);
    assert_eq!(stats.average_score, 3.5);
    let scores: Vec<(u8, f64)> = stats
        .scores
        .iter()
        .map(|bucket| (bucket.score, bucket.percentage))
        .collect();
    assert_eq!(scores, vec![(1, 25.0), (4, 50.0), (5, 25.0)]);
    assert_eq!(stats.types.len(), 3);
}

#[tokio::test]
async fn unreachable_backend_shows_errors() {
    let mut dashboard = Dashboard::new(HttpMoodApi::new("http://127.0.0.1:9"), today());
    dashboard.start().await;
    assert!(matches!(dashboard.board, BoardView::Failed(_)));
    assert_eq!(dashboard.notice.as_ref().unwrap().kind, NoticeKind::Error);
}
