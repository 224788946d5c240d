use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Row {
    id: u64,
    name: String,
    total_lectures: i64,
    required_lectures: i64,
    max_bunkable: i64,
    weekly_skip_limit: i64,
    bunkable_standing: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Chart {
    labels: Vec<String>,
    values: Vec<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldError {
    field: String,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubjectView {
    id: u64,
    name: String,
    lectures_per_week: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct View {
    attendance_criterion: String,
    mode: String,
    duration: f64,
    last_lectures_per_week: u32,
    subjects: Vec<SubjectView>,
    valid: bool,
    rows: Vec<Row>,
    errors: Vec<FieldError>,
    chart: Option<Chart>,
    notice: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Rejection {
    errors: Vec<FieldError>,
}

struct TestServer {
    base_url: String,
    data_path: PathBuf,
    child: Child,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn stop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.stop();
        let _ = std::fs::remove_file(&self.data_path);
    }
}

#[cfg(unix)]
mod cleanup {
    use once_cell::sync::Lazy;
    use std::sync::{Mutex, Once};

    static REGISTER: Once = Once::new();
    static PIDS: Lazy<Mutex<Vec<i32>>> = Lazy::new(|| Mutex::new(Vec::new()));

    pub fn register(pid: u32) {
        if let Ok(mut pids) = PIDS.lock() {
            pids.push(pid as i32);
        }
        REGISTER.call_once(|| unsafe {
            libc::atexit(on_exit);
        });
    }

    extern "C" fn on_exit() {
        if let Ok(pids) = PIDS.lock() {
            for pid in pids.iter().copied().filter(|pid| *pid > 0) {
                unsafe {
                    libc::kill(pid, libc::SIGTERM);
                }
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

fn unique_data_path(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("bunk_calc_http_{tag}_{}_{}.json", std::process::id(), nanos));
    path
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/session")).send().await {
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

async fn spawn_server(data_path: &Path) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_bunk_calc"))
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

    TestServer {
        base_url,
        data_path: data_path.to_path_buf(),
        child,
    }
}

async fn fresh_server(tag: &str) -> TestServer {
    spawn_server(&unique_data_path(tag)).await
}

async fn session(client: &Client, server: &TestServer) -> View {
    client
        .get(server.url("/api/session"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_first_load_serves_seed_projection() {
    let server = fresh_server("seed").await;
    let client = Client::new();

    let view = session(&client, &server).await;
    assert!(view.valid);
    assert_eq!(view.attendance_criterion, "75");
    assert_eq!(view.mode, "weeks");
    assert_eq!(view.duration, 16.0);
    assert_eq!(view.last_lectures_per_week, 4);
    assert_eq!(view.subjects.len(), 4);
    assert_eq!(view.subjects[0].lectures_per_week, 5);

    let maths = &view.rows[0];
    assert_eq!(maths.name, "Maths");
    assert_eq!(
        (maths.total_lectures, maths.required_lectures, maths.max_bunkable, maths.weekly_skip_limit),
        (80, 60, 20, 1)
    );
    assert_eq!(maths.bunkable_standing, "safe");

    let chart = view.chart.expect("chart");
    assert_eq!(chart.labels, vec!["Maths", "Physics", "Chemistry", "Biology"]);
    assert_eq!(chart.values, vec![5, 4, 3, 2]);

    let page = client.get(server.url("/")).send().await.unwrap();
    assert!(page.status().is_success());
    assert!(page.text().await.unwrap().contains("Bunk Calculator"));
}

#[tokio::test]
async fn http_add_subject_and_reject_bad_input() {
    let server = fresh_server("add").await;
    let client = Client::new();

    let view: View = client
        .post(server.url("/api/subjects"))
        .json(&json!({ "name": " History ", "lecturesPerWeek": "6" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view.subjects.last().unwrap().name, "History");
    assert_eq!(view.last_lectures_per_week, 6);
    assert_eq!(view.notice.as_deref(), Some("Subject added!"));
    let history = view.rows.last().unwrap();
    assert_eq!(history.total_lectures, 96);
    assert_eq!(history.max_bunkable, 24);

    let response = client
        .post(server.url("/api/subjects"))
        .json(&json!({ "name": "", "lecturesPerWeek": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let rejection: Rejection = response.json().await.unwrap();
    let fields: Vec<&str> = rejection.errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["subjectName", "lecturesPerWeek"]);

    assert_eq!(session(&client, &server).await.subjects.len(), 5);
}

#[tokio::test]
async fn http_rename_and_remove_by_id() {
    let server = fresh_server("edit").await;
    let client = Client::new();

    let rejected = client
        .put(server.url("/api/subjects/2"))
        .json(&json!({ "name": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(session(&client, &server).await.subjects[1].name, "Physics");

    let renamed: View = client
        .put(server.url("/api/subjects/2"))
        .json(&json!({ "name": "Mechanics" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(renamed.subjects[1].name, "Mechanics");

    let removed: View = client
        .delete(server.url("/api/subjects/2"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = removed.subjects.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Maths", "Chemistry", "Biology"]);
    assert_eq!(removed.rows[1].id, 3);

    let missing = client.delete(server.url("/api/subjects/2")).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_clear_requires_confirmation_and_hides_chart() {
    let server = fresh_server("clear").await;
    let client = Client::new();

    let refused = client
        .post(server.url("/api/subjects/clear"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(refused.status(), StatusCode::BAD_REQUEST);
    assert_eq!(session(&client, &server).await.subjects.len(), 4);

    let cleared: View = client
        .post(server.url("/api/subjects/clear"))
        .json(&json!({ "confirm": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(cleared.valid);
    assert!(cleared.subjects.is_empty());
    assert!(cleared.rows.is_empty());
    assert!(cleared.errors.is_empty());
    assert!(cleared.chart.is_none());
}

#[tokio::test]
async fn http_invalid_config_suppresses_output() {
    let server = fresh_server("config").await;
    let client = Client::new();

    let view: View = client
        .put(server.url("/api/config"))
        .json(&json!({ "attendanceCriterion": "0", "workingDays": "9" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!view.valid);
    assert!(view.rows.is_empty());
    assert!(view.chart.is_none());
    assert_eq!(view.attendance_criterion, "0");
    let fields: Vec<&str> = view.errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["attendanceCriterion", "workingDays"]);
    assert_eq!(view.errors[1].message, "Enter 1-7 days.");

    let bad_duration = client
        .put(server.url("/api/config"))
        .json(&json!({ "duration": "soon" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_duration.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(session(&client, &server).await.duration, 16.0);

    let restored: View = client
        .put(server.url("/api/config"))
        .json(&json!({ "attendanceCriterion": 75, "workingDays": 5 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(restored.valid);
    assert_eq!(restored.rows.len(), 4);
}

#[tokio::test]
async fn http_mode_switch_restores_duration() {
    let server = fresh_server("mode").await;
    let client = Client::new();

    client
        .put(server.url("/api/config"))
        .json(&json!({ "duration": "10" }))
        .send()
        .await
        .unwrap();

    let days: View = client
        .put(server.url("/api/mode"))
        .json(&json!({ "mode": "days" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(days.mode, "days");
    assert_eq!(days.duration, 80.0);
    // 80 days at 5 per week is the same 16-week term.
    assert_eq!(days.rows[0].total_lectures, 80);
    assert_eq!(days.rows[0].weekly_skip_limit, 1);

    let weeks: View = client
        .put(server.url("/api/mode"))
        .json(&json!({ "mode": "weeks" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(weeks.duration, 10.0);
    assert_eq!(weeks.rows[0].total_lectures, 50);
}

#[tokio::test]
async fn http_session_survives_restart() {
    let data_path = unique_data_path("restart");
    let client = Client::new();

    let mut first = spawn_server(&data_path).await;
    client
        .post(first.url("/api/subjects"))
        .json(&json!({ "name": "Art", "lecturesPerWeek": 2 }))
        .send()
        .await
        .unwrap();
    client
        .put(first.url("/api/mode"))
        .json(&json!({ "mode": "months" }))
        .send()
        .await
        .unwrap();
    first.stop();

    let stored: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&data_path).unwrap()).unwrap();
    assert_eq!(stored["calculationMode"], "months");
    assert_eq!(stored["lastLecturesPerWeek"], "2");

    let second = spawn_server(&data_path).await;
    let view = session(&client, &second).await;
    assert_eq!(view.mode, "months");
    assert_eq!(view.duration, 4.0);
    assert_eq!(view.subjects.len(), 5);
    assert_eq!(view.subjects[4].name, "Art");
    assert_eq!(view.subjects[4].id, 5);
    drop(first);
}
