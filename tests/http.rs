use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct MoodEntry {
    id: u64,
    mood_type: String,
    mood_score: u8,
    notes: Option<String>,
    date: NaiveDate,
    created_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
struct Statistics {
    average_score: f64,
    total_entries: usize,
    mood_types: BTreeMap<String, usize>,
}

#[derive(Debug, Deserialize)]
struct CalendarDay {
    has_data: bool,
    entries_count: u32,
    mood_types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Calendar {
    year: i32,
    month: u32,
    month_name: String,
    total_days: u32,
    calendar: BTreeMap<String, CalendarDay>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("mood_flow_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/moods/")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_mood_flow"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn create(client: &Client, base_url: &str, mood_type: &str, score: u8) -> MoodEntry {
    let response = client
        .post(format!("{base_url}/moods/"))
        .json(&serde_json::json!({ "mood_type": mood_type, "mood_score": score, "notes": "from test" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

#[tokio::test]
async fn http_created_mood_is_listed_first() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let first = create(&client, &server.base_url, "listed", 2).await;
    let second = create(&client, &server.base_url, "listed", 4).await;
    assert!(second.id > first.id);
    assert_eq!(second.notes.as_deref(), Some("from test"));
    assert_eq!(second.date, Local::now().date_naive());
    assert!(second.created_at >= first.created_at);

    let moods: Vec<MoodEntry> = client
        .get(format!("{}/moods/", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(moods.first().map(|mood| mood.id), Some(second.id));

    let filtered: Vec<MoodEntry> = client
        .get(format!("{}/moods/?mood_type=listed", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(filtered.len(), 2);
    assert!(filtered.iter().all(|mood| mood.mood_type == "listed"));
    assert_eq!(filtered[1].mood_score, 2);
}

#[tokio::test]
async fn http_invalid_mood_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/moods/", server.base_url))
        .json(&serde_json::json!({ "mood_type": "ok", "mood_score": 6 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = response.json().await.unwrap();
    assert!(body.detail.contains("between 1 and 5"));

    let response = client
        .post(format!("{}/moods/", server.base_url))
        .json(&serde_json::json!({ "mood_type": "", "mood_score": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn http_update_and_delete_by_id() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let created = create(&client, &server.base_url, "editable", 3).await;
    let url = format!("{}/moods/{}", server.base_url, created.id);

    let updated: MoodEntry = client
        .put(&url)
        .json(&serde_json::json!({ "mood_score": 5 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated.mood_score, 5);
    assert_eq!(updated.mood_type, "editable");

    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client.get(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.detail, "Not found");
}

#[tokio::test]
async fn http_statistics_and_calendar_include_today() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    create(&client, &server.base_url, "charted", 5).await;
    let today = Local::now().date_naive();

    let stats: Statistics = client
        .get(format!(
            "{}/moods/statistics/?start_date={today}&end_date={today}",
            server.base_url
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(stats.total_entries >= 1);
    assert_eq!(stats.mood_types.get("charted"), Some(&1));
    assert!(stats.average_score >= 1.0 && stats.average_score <= 5.0);

    let calendar: Calendar = client
        .get(format!(
            "{}/moods/calendar/?year={}&month={}",
            server.base_url,
            today.year(),
            today.month()
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(calendar.year, today.year());
    assert_eq!(calendar.month, today.month());
    assert!(!calendar.month_name.is_empty());
    assert_eq!(calendar.calendar.len() as u32, calendar.total_days);
    let day = &calendar.calendar[&today.to_string()];
    assert!(day.has_data);
    assert!(day.entries_count >= 1);
    assert!(day.mood_types.iter().any(|kind| kind == "charted"));

    let board = client
        .get(format!("{}/board/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(board.contains(&format!(r#"data-date="{today}" data-has-data="true""#)));
}

#[tokio::test]
async fn http_bad_month_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/moods/calendar/?year=2026&month=13", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let board = client
        .get(format!("{}/board/?year=2026&month=13", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(board.contains("board-error"));
}

#[tokio::test]
async fn http_malformed_requests_get_json_detail() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/moods/", server.base_url))
        .json(&serde_json::json!({ "mood_type": "ok" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = response.json().await.unwrap();
    assert!(body.detail.contains("mood_score"));

    for path in [
        "/moods/?limit=-1",
        "/moods/statistics/?start_date=bad&end_date=2026-01-01",
        "/moods/not-a-number",
    ] {
        let response = client
            .get(format!("{}{path}", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{path}");
        let body: ErrorBody = response.json().await.unwrap();
        assert!(!body.detail.is_empty(), "{path}");
    }

    let response = client
        .get(format!("{}/moods/?limit=0", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = response.json().await.unwrap();
    assert!(body.detail.contains("limit"));
}
