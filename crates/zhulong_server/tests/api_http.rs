//! HTTP API integration tests against a temporary database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Local, TimeZone, Timelike};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use zhulong_core::{RankingSettings, ReminderSettings};
use zhulong_server::api::profile::UserProfile;
use zhulong_server::{build_router, AppState};

struct TestApp {
    router: Router,
    _dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState {
            db_path: dir.path().join("zhulong.db"),
            ranking: RankingSettings::new(["rust", "ai"]),
            reminders: ReminderSettings::default(),
            daily_push_count: 2,
            profile: UserProfile {
                identity: "builder".to_string(),
                transcendent: "curious".to_string(),
                worldly: "shipping".to_string(),
            },
        };
        Self {
            router: build_router(state),
            _dir: dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn post_empty(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::post(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }
}

fn rfc3339_at(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .unwrap()
        .fixed_offset()
        .to_rfc3339()
}

// ── Service ────────────────────────────────────────────────────

#[tokio::test]
async fn root_and_health() {
    let app = TestApp::new();

    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "zhulong");

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn profile_comes_from_config() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/user/profile").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"identity": "builder", "transcendent": "curious", "worldly": "shipping"})
    );
}

// ── Memos ──────────────────────────────────────────────────────

#[tokio::test]
async fn memo_due_date_parsed_and_reminded() {
    let app = TestApp::new();

    let (status, memo) = app
        .post("/api/memos", json!({"text": "Call mom tomorrow at 5pm"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(memo["completed"], false);

    let due_at = memo["due_at"].as_i64().expect("due_at set");
    let due_local = Local.timestamp_millis_opt(due_at).unwrap();
    assert_eq!(due_local.hour(), 17);
    assert_eq!(due_local.minute(), 0);
    assert_eq!(
        due_local.date_naive(),
        Local::now().date_naive() + Duration::days(1)
    );

    let later = app
        .post(
            "/api/memos",
            json!({"text": "later", "due_at": due_at + 60 * 60 * 1000}),
        )
        .await
        .1;

    let before = rfc3339_at(due_at - 60 * 60 * 1000);
    let (status, reminders) = app
        .get(&format!("/api/memos/reminders?now={}", encode(&before)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reminders[0]["id"], memo["id"]);
    assert_eq!(reminders[0]["group"], "upcoming");

    let after = rfc3339_at(due_at + 60 * 1000);
    let (_, reminders) = app
        .get(&format!("/api/memos/reminders?now={}", encode(&after)))
        .await;
    assert_eq!(reminders[0]["id"], memo["id"]);
    assert_eq!(reminders[0]["group"], "overdue");
    assert_eq!(reminders[1]["id"], later["id"]);
    assert_eq!(reminders[1]["group"], "upcoming");
}

#[tokio::test]
async fn memo_lifecycle() {
    let app = TestApp::new();
    let (_, memo) = app.post("/api/memos", json!({"text": "buy milk"})).await;
    let id = memo["id"].as_i64().unwrap();
    assert!(memo["due_at"].is_null());

    let (status, completed) = app.post_empty(&format!("/api/memos/{id}/complete")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["completed"], true);

    let (_, open) = app.get("/api/memos").await;
    assert_eq!(open.as_array().unwrap().len(), 0);
    let (_, all) = app.get("/api/memos?include_completed=true").await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (status, _) = app.delete(&format!("/api/memos/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = app.get(&format!("/api/memos/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "not_found");
}

#[tokio::test]
async fn completing_missing_memo_is_404() {
    let app = TestApp::new();
    let (status, body) = app.post_empty("/api/memos/424242/complete").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "not_found");
}

#[tokio::test]
async fn blank_memo_text_is_400() {
    let app = TestApp::new();
    let (status, body) = app.post("/api/memos", json!({"text": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "invalid_input");

    let (status, _) = app.post("/api/memos", json!({"details": "no text"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_reminder_instant_is_400() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/memos/reminders?now=yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "invalid_input");
}

// ── Messages ───────────────────────────────────────────────────

#[tokio::test]
async fn message_priority_filter_and_read() {
    let app = TestApp::new();

    let (status, urgent) = app
        .post(
            "/api/wechat/messages",
            json!({"sender": "Alice", "content": "urgent: server down"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(urgent["priority"], "high");
    assert_eq!(urgent["read"], false);

    app.post(
        "/api/wechat/messages",
        json!({"content": "lunch?", "priority": "routine"}),
    )
    .await;

    let (_, high) = app.get("/api/wechat/messages?priority=high").await;
    assert_eq!(high.as_array().unwrap().len(), 1);

    let id = urgent["id"].as_i64().unwrap();
    for _ in 0..2 {
        let (status, read) = app
            .post_empty(&format!("/api/wechat/messages/{id}/read"))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(read["read"], true);
    }

    let (_, unread) = app.get("/api/wechat/messages?unread_only=true").await;
    let unread = unread.as_array().unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0]["priority"], "low");
}

#[tokio::test]
async fn unknown_priority_filter_is_400() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/wechat/messages?priority=critical").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "invalid_input");
}

// ── Contents & feedback ────────────────────────────────────────

#[tokio::test]
async fn contents_ranked_and_limited_by_push_count() {
    let app = TestApp::new();
    for (title, body) in [
        ("Gardening", "soil"),
        ("Rust and AI", "systems"),
        ("Rust only", "memory"),
    ] {
        let (status, _) = app
            .post("/api/contents", json!({"title": title, "body": body}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, top) = app.get("/api/contents").await;
    assert_eq!(status, StatusCode::OK);
    let top = top.as_array().unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0]["title"], "Rust and AI");
    assert_eq!(top[1]["title"], "Rust only");

    let (_, all) = app.get("/api/contents?limit=10").await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn feedback_roundtrip_and_errors() {
    let app = TestApp::new();
    let (_, content) = app
        .post("/api/contents", json!({"title": "Rust weekly"}))
        .await;
    let id = content["id"].as_i64().unwrap();

    let (status, feedback) = app
        .post(
            &format!("/api/contents/{id}/feedback"),
            json!({"score": 5, "comment": "great"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(feedback["content_id"], id);

    let (_, listed) = app.get(&format!("/api/contents/{id}/feedback")).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = app
        .post(
            &format!("/api/contents/{id}/feedback"),
            json!({"content_id": id + 1, "score": 3}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(&format!("/api/contents/{id}/feedback"), json!({"score": 9}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "invalid_input");

    let (status, body) = app
        .post("/api/contents/9999/feedback", json!({"score": 4}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "not_found");

    let (status, _) = app.delete(&format!("/api/contents/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&format!("/api/contents/{id}/feedback")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Free-text input ────────────────────────────────────────────

#[tokio::test]
async fn unclassified_input_writes_nothing() {
    let app = TestApp::new();

    let (status, routed) = app.post("/api/input", json!({"text": "xyzzy"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(routed["kind"], "unclassified");
    assert_eq!(routed["confidence"], 0.0);
    assert_eq!(routed["original_text"], "xyzzy");

    let (_, memos) = app.get("/api/memos?include_completed=true").await;
    assert!(memos.as_array().unwrap().is_empty());
    let (_, messages) = app.get("/api/wechat/messages").await;
    assert!(messages.as_array().unwrap().is_empty());
    let (_, contents) = app.get("/api/contents").await;
    assert!(contents.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn input_routes_to_stores() {
    let app = TestApp::new();

    let (status, routed) = app
        .post("/api/input", json!({"text": "remind me to call the bank"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(routed["kind"], "memo");
    assert_eq!(routed["memo"]["text"], "remind me to call the bank");

    let (_, routed) = app
        .post(
            "/api/input",
            json!({"text": "ok see you", "input_type": "message"}),
        )
        .await;
    assert_eq!(routed["kind"], "message");
    assert_eq!(routed["confidence"], 1.0);

    let (status, body) = app.post("/api/input", json!({"text": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "invalid_input");

    let (status, _) = app
        .post("/api/input", json!({"text": "#77 loved it"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn encode(value: &str) -> String {
    value.replace('+', "%2B").replace(':', "%3A")
}
