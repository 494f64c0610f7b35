#![allow(clippy::unwrap_used)]
// Integration tests for `DashboardController` against a wiremock gateway.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio::sync::broadcast;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use debot_core::{CoreError, DashboardConfig, DashboardController, DashboardEvent, View};

// ── Helpers ─────────────────────────────────────────────────────────

fn controller_for(server: &MockServer, refresh: Duration) -> DashboardController {
    let config = DashboardConfig::new(Url::parse(&server.uri()).unwrap())
        .with_refresh_interval(refresh);
    DashboardController::new(config).unwrap()
}

async fn setup() -> (MockServer, DashboardController) {
    let server = MockServer::start().await;
    let controller = controller_for(&server, Duration::ZERO);
    (server, controller)
}

async fn mount_status(server: &MockServer, version: &str) {
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": version,
            "uptime_s": 65.0,
            "channels": {
                "telegram": { "enabled": true, "running": true },
                "slack": { "enabled": false, "running": false }
            }
        })))
        .mount(server)
        .await;
}

async fn mount_cron(server: &MockServer, jobs: Value) {
    Mock::given(method("GET"))
        .and(path("/api/status/cron"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jobs": jobs })))
        .mount(server)
        .await;
}

async fn mount_config(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "providers": {
                "openai": { "api_key": "sk-1****", "model": "gpt-4o" },
                "anthropic": { "api_key": "sk-a****" }
            },
            "channels": { "telegram": { "enabled": true } },
            "gateway": { "port": 8000 }
        })))
        .mount(server)
        .await;
}

async fn loaded() -> (MockServer, DashboardController) {
    let (server, controller) = setup().await;
    mount_status(&server, "1.0.0").await;
    mount_cron(&server, json!([{ "id": "j1", "name": "digest" }])).await;
    mount_config(&server).await;
    controller.start().await;
    (server, controller)
}

async fn status_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/api/status")
        .count()
}

fn drain_toasts(rx: &mut broadcast::Receiver<DashboardEvent>) -> Vec<String> {
    let mut toasts = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let DashboardEvent::Toast(message) = event {
            toasts.push(message);
        }
    }
    toasts
}

// ── Lifecycle / fetch tests ─────────────────────────────────────────

#[tokio::test]
async fn test_start_loads_status_cron_and_config() {
    let (_server, controller) = loaded().await;

    let status = controller.status().unwrap();
    assert_eq!(status.version.as_deref(), Some("1.0.0"));
    assert_eq!(controller.cron_jobs().len(), 1);
    assert_eq!(controller.provider_names(), ["openai", "anthropic"]);

    let channels: Vec<String> = controller
        .channel_list()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(channels, ["telegram", "slack"]);
    assert_eq!(controller.snapshot().uptime(), "1m 5s");

    // Zero interval: no timer.
    assert!(!controller.is_refreshing().await);
}

#[tokio::test]
async fn test_status_fetch_emits_event() {
    let (server, controller) = setup().await;
    mount_status(&server, "1.0.0").await;
    mount_cron(&server, json!([])).await;
    let mut events = controller.events();

    controller.fetch_status().await.unwrap();

    assert_eq!(events.try_recv().unwrap(), DashboardEvent::StatusUpdated);
    assert!(controller.snapshot().last_status_refresh.is_some());
}

#[tokio::test]
async fn test_cron_failure_keeps_previous_status() {
    let (server, controller) = loaded().await;

    server.reset().await;
    mount_status(&server, "2.0.0").await;
    Mock::given(method("GET"))
        .and(path("/api/status/cron"))
        .respond_with(ResponseTemplate::new(500).set_body_string("scheduler down"))
        .mount(&server)
        .await;

    let result = controller.fetch_status().await;

    assert!(matches!(result, Err(CoreError::Rejected { status: 500, .. })));
    // Neither half of the cycle was committed.
    assert_eq!(controller.status().unwrap().version.as_deref(), Some("1.0.0"));
    assert_eq!(controller.cron_jobs().len(), 1);
    // No user-facing notification for background fetches.
    assert!(controller.current_toast().is_none());
}

#[tokio::test]
async fn test_non_json_status_keeps_previous_status() {
    let (server, controller) = loaded().await;

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    mount_cron(&server, json!([])).await;

    assert!(controller.fetch_status().await.is_err());
    assert_eq!(controller.status().unwrap().version.as_deref(), Some("1.0.0"));
    assert_eq!(controller.cron_jobs().len(), 1);
}

#[tokio::test]
async fn test_config_failure_keeps_previous_config() {
    let (server, controller) = loaded().await;

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(controller.fetch_config().await.is_err());
    assert_eq!(controller.provider_names(), ["openai", "anthropic"]);
    assert!(controller.current_toast().is_none());
}

#[tokio::test]
async fn test_missing_cron_jobs_default_to_empty() {
    let (server, controller) = setup().await;
    mount_status(&server, "1.0.0").await;
    Mock::given(method("GET"))
        .and(path("/api/status/cron"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": {} })))
        .mount(&server)
        .await;

    controller.fetch_status().await.unwrap();
    assert!(controller.cron_jobs().is_empty());
}

// ── Save tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_save_section_adopts_server_value() {
    let (server, controller) = loaded().await;
    Mock::given(method("PUT"))
        .and(path("/api/config/providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "a": 1 })))
        .expect(1)
        .mount(&server)
        .await;
    let mut events = controller.events();

    let saved = controller.save_section("providers").await.unwrap();

    assert_eq!(saved, json!({ "a": 1 }));
    assert_eq!(controller.section("providers").unwrap(), json!({ "a": 1 }));
    assert_eq!(drain_toasts(&mut events), ["providers saved"]);
    assert_eq!(
        controller.current_toast().unwrap().message,
        "providers saved"
    );
}

#[tokio::test]
async fn test_save_section_sends_in_memory_edits() {
    let (server, controller) = loaded().await;
    controller
        .set_field("gateway", "port", json!(9000))
        .unwrap();

    Mock::given(method("PUT"))
        .and(path("/api/config/gateway"))
        .and(body_json(json!({ "port": 9000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "port": 9000, "host": "0.0.0.0" })))
        .expect(1)
        .mount(&server)
        .await;

    controller.save_section("gateway").await.unwrap();
    assert_eq!(
        controller.section("gateway").unwrap(),
        json!({ "port": 9000, "host": "0.0.0.0" })
    );
}

#[tokio::test]
async fn test_failed_save_keeps_edit_and_toasts_server_text() {
    let (server, controller) = loaded().await;
    controller
        .set_field("providers", "default", json!("openai"))
        .unwrap();
    let before = controller.section("providers").unwrap();

    Mock::given(method("PUT"))
        .and(path("/api/config/providers"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad value"))
        .mount(&server)
        .await;
    let mut events = controller.events();

    let result = controller.save_section("providers").await;

    assert!(matches!(result, Err(CoreError::Rejected { status: 400, .. })));
    assert_eq!(controller.section("providers").unwrap(), before);
    let toasts = drain_toasts(&mut events);
    assert_eq!(toasts, ["Error: bad value"]);
    assert!(toasts[0].contains("bad value"));
}

#[tokio::test]
async fn test_failed_save_keeps_other_section_edits() {
    let (server, controller) = loaded().await;
    controller
        .set_field("channels", "slack", json!({ "enabled": true }))
        .unwrap();

    Mock::given(method("PUT"))
        .and(path("/api/config/providers"))
        .respond_with(ResponseTemplate::new(422).set_body_string("invalid provider"))
        .mount(&server)
        .await;

    assert!(controller.save_section("providers").await.is_err());
    assert_eq!(
        controller.section("channels").unwrap(),
        json!({ "telegram": { "enabled": true }, "slack": { "enabled": true } })
    );
}

#[tokio::test]
async fn test_save_unknown_section_toasts_without_request() {
    let (server, controller) = loaded().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    let mut events = controller.events();

    let result = controller.save_section("agents").await;

    assert!(matches!(result, Err(CoreError::SectionNotFound { .. })));
    assert_eq!(
        drain_toasts(&mut events),
        ["Error: Unknown config section: agents"]
    );
}

#[tokio::test]
async fn test_save_before_config_loaded() {
    let (_server, controller) = setup().await;
    let mut events = controller.events();

    let result = controller.save_section("providers").await;

    assert!(matches!(result, Err(CoreError::ConfigNotLoaded)));
    assert_eq!(drain_toasts(&mut events).len(), 1);
}

// ── Edit tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_field_rejects_masked_values() {
    let (_server, controller) = loaded().await;
    let before = controller.section("providers").unwrap();

    let result = controller.set_field("providers", "api_key", json!("sk-****abcd"));

    assert!(matches!(result, Err(CoreError::ValidationFailed { .. })));
    assert_eq!(controller.section("providers").unwrap(), before);
}

#[tokio::test]
async fn test_edit_section_creates_missing_section() {
    let (_server, controller) = loaded().await;

    controller
        .replace_section("agents", json!({ "default": { "model": "gpt-4o" } }))
        .unwrap();

    assert_eq!(
        controller.section("agents").unwrap(),
        json!({ "default": { "model": "gpt-4o" } })
    );
}

#[tokio::test]
async fn test_edit_before_config_loaded_fails() {
    let (_server, controller) = setup().await;
    let result = controller.replace_section("providers", json!({}));
    assert!(matches!(result, Err(CoreError::ConfigNotLoaded)));
}

#[tokio::test]
async fn test_mistyped_fields_do_not_fail_the_cycle() {
    let (server, controller) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": 2,
            "channels": { "telegram": { "enabled": true } }
        })))
        .mount(&server)
        .await;
    mount_cron(&server, json!([{ "id": 7, "name": "digest", "enabled": "yes" }])).await;

    controller.fetch_status().await.unwrap();

    let status = controller.status().unwrap();
    assert_eq!(status.version, None);
    assert_eq!(status.extra.get("version"), Some(&json!(2)));
    assert_eq!(controller.channel_list().len(), 1);

    let jobs = controller.cron_jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].name.as_deref(), Some("digest"));
    assert_eq!(jobs[0].extra.get("id"), Some(&json!(7)));
}

// ── Refresh timer tests ─────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_skips_ticks_while_status_fetch_in_flight() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "version": "1.0.0" }))
                .set_delay(Duration::from_millis(600)),
        )
        .mount(&server)
        .await;
    mount_cron(&server, json!([])).await;
    mount_config(&server).await;
    let controller = controller_for(&server, Duration::from_millis(50));

    // Timer runs but stays quiet until the dashboard view is back.
    controller.set_view(View::Config);
    controller.start().await;
    assert_eq!(status_requests(&server).await, 1);

    let manual = tokio::spawn({
        let controller = controller.clone();
        async move { controller.fetch_status().await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    controller.set_view(View::Dashboard);

    // Several ticks elapse while the manual fetch is pending.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(status_requests(&server).await, 2);

    manual.await.unwrap().unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(status_requests(&server).await > 2);

    controller.stop().await;
}

#[tokio::test]
async fn test_refresh_only_polls_dashboard_view() {
    let server = MockServer::start().await;
    mount_status(&server, "1.0.0").await;
    mount_cron(&server, json!([])).await;
    mount_config(&server).await;
    let controller = controller_for(&server, Duration::from_millis(50));

    controller.set_view(View::Config);
    controller.start().await;
    assert!(controller.is_refreshing().await);
    assert_eq!(status_requests(&server).await, 1);

    // Ticks while another view is active are suppressed.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(status_requests(&server).await, 1);

    controller.set_view(View::Dashboard);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(status_requests(&server).await > 1);

    controller.stop().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let after_stop = status_requests(&server).await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(status_requests(&server).await, after_stop);
}

#[tokio::test]
async fn test_start_twice_keeps_one_timer_and_stop_is_idempotent() {
    let server = MockServer::start().await;
    mount_status(&server, "1.0.0").await;
    mount_cron(&server, json!([])).await;
    mount_config(&server).await;
    let controller = controller_for(&server, Duration::from_secs(10));

    controller.start().await;
    controller.start().await;
    assert!(controller.is_refreshing().await);

    controller.stop().await;
    controller.stop().await;
    assert!(!controller.is_refreshing().await);

    // Restartable after a stop.
    controller.start().await;
    assert!(controller.is_refreshing().await);
    controller.stop().await;
}

#[tokio::test]
async fn test_stop_without_start() {
    let (_server, controller) = setup().await;
    controller.stop().await;
    controller.stop().await;
    assert!(!controller.is_refreshing().await);
}

#[tokio::test]
async fn test_set_view_notifies_once() {
    let (_server, controller) = setup().await;
    let mut events = controller.events();

    controller.set_view(View::Cron);
    controller.set_view(View::Cron);

    assert_eq!(events.try_recv().unwrap(), DashboardEvent::ViewChanged(View::Cron));
    assert!(events.try_recv().is_err());
    assert_eq!(controller.view(), View::Cron);
}
