//! End-to-end smoke tests for the full porchlightd stack.
//!
//! Each test spins up the complete application (in-memory `SQLite`, a registry
//! file on disk, real transports, real services, real axum router) and
//! exercises the HTTP layer via `tower::ServiceExt::oneshot`. Devices are
//! local TCP listeners speaking the servo line protocol.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use porchlight_adapter_devices::{DeviceTransports, FileDeviceRegistry, TransportConfig};
use porchlight_adapter_http_axum::router;
use porchlight_adapter_http_axum::state::AppState;
use porchlight_adapter_storage_sqlite_sqlx::{Config, SqliteScheduleRepository};
use porchlight_app::services::dispatcher::{CommandDispatcher, DispatchPolicy, RetryPolicy};
use porchlight_app::services::schedule_service::ScheduleService;
use porchlight_domain::device::DeviceKind;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tower::ServiceExt;

struct TestApp {
    router: axum::Router,
    _dir: tempfile::TempDir,
}

/// A servo that answers every command line with `ack <command>`.
async fn spawn_servo() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let (reader, mut writer) = socket.into_split();
                let mut line = String::new();
                if BufReader::new(reader).read_line(&mut line).await.is_ok() {
                    let reply = format!("ack {}\n", line.trim());
                    let _ = writer.write_all(reply.as_bytes()).await;
                }
            });
        }
    });
    port
}

/// A port nothing listens on.
async fn dead_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Build a fully-wired router backed by an in-memory `SQLite` database.
async fn app(registry: &str, telnet_port: u16) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let registry_path = dir.path().join("devices.txt");
    std::fs::write(&registry_path, registry).unwrap();
    let static_dir = dir.path().join("static");
    std::fs::create_dir(&static_dir).unwrap();
    std::fs::write(static_dir.join("index.html"), "<h1>Porchlight</h1>").unwrap();

    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");

    let transports = DeviceTransports::new(&TransportConfig {
        timeout: Duration::from_secs(1),
        telnet_port,
        ..TransportConfig::default()
    })
    .unwrap();
    let policy = DispatchPolicy {
        smart_plug: RetryPolicy::NONE,
        direct_http: RetryPolicy::NONE,
        telnet_servo: RetryPolicy::NONE,
        fan_out_delay: Duration::ZERO,
    };
    let dispatcher = CommandDispatcher::new(
        FileDeviceRegistry::new(registry_path, DeviceKind::TelnetServo, Vec::new()),
        transports,
        policy,
    );
    let schedules = ScheduleService::new(SqliteScheduleRepository::new(db.pool().clone()));

    let state = AppState::from_arcs(Arc::new(dispatcher), Arc::new(schedules));
    TestApp {
        router: router::build(state, Some(PathBuf::from(&static_dir))),
        _dir: dir,
    }
}

async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let resp = app.router.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

// ---------------------------------------------------------------------------
// Health check and static assets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let app = app("", dead_port().await).await;

    let resp = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_serve_dashboard_from_static_dir() {
    let app = app("", dead_port().await).await;

    let resp = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(
        resp.into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec(),
    )
    .unwrap();
    assert!(body.contains("Porchlight"));
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_list_devices_from_registry_file() {
    let app = app(
        "# lights\nDesk - 127.0.0.1\nBroken - 999.0.0.1\n$Lamp - 10.0.0.12\n",
        dead_port().await,
    )
    .await;

    let (status, json) = send(&app, "GET", "/devices", None).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Desk", "Lamp"]);
    assert_eq!(json[1]["kind"], "smart_plug");
}

#[tokio::test]
async fn should_switch_single_telnet_device() {
    let app = app("Desk - 127.0.0.1\n", spawn_servo().await).await;

    let (status, json) = send(&app, "POST", "/off/127.0.0.1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["response"], "ack 180");
}

#[tokio::test]
async fn should_return_not_found_for_unregistered_address() {
    let app = app("Desk - 127.0.0.1\n", spawn_servo().await).await;

    let (status, _) = send(&app, "POST", "/on/10.9.9.9", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_fan_out_to_every_device() {
    let app = app("Desk - 127.0.0.1\n", spawn_servo().await).await;

    let (status, json) = send(&app, "POST", "/on_all", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["results"][0]["response"], "ack 0");
}

#[tokio::test]
async fn should_name_unreachable_device_when_fan_out_fails() {
    let app = app("Desk - 127.0.0.1\n", dead_port().await).await;

    let (status, json) = send(&app, "POST", "/off_all", None).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Failed to turn off: Desk");
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_manage_schedule_lifecycle() {
    let app = app("", dead_port().await).await;

    let (status, created) = send(
        &app,
        "POST",
        "/schedules",
        Some(r#"{"time":"21:45","action":"OFF"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["days"], "daily");
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, "GET", &format!("/schedules/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["time"], "21:45");

    let (_, toggled) = send(&app, "PUT", &format!("/schedules/{id}/toggle"), None).await;
    assert_eq!(toggled["enabled"], false);

    let (_, listed) = send(&app, "GET", "/schedules", None).await;
    assert_eq!(listed[0]["enabled"], false);

    let (status, _) = send(&app, "DELETE", &format!("/schedules/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "PUT", &format!("/schedules/{id}/toggle"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_not_store_schedule_with_invalid_time() {
    let app = app("", dead_port().await).await;

    let (status, _) = send(
        &app,
        "POST",
        "/schedules",
        Some(r#"{"time":"25:99","action":"ON"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, listed) = send(&app, "GET", "/schedules", None).await;
    assert!(listed.as_array().unwrap().is_empty());
}
