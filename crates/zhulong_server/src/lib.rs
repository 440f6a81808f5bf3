//! HTTP API for the Zhulong backend.
//!
//! # Responsibility
//! - Expose the memo, message, content and free-text input endpoints
//!   under `/api`.
//! - Map service errors onto status codes with a uniform JSON body.
//!
//! # Invariants
//! - Each request opens its own SQLite connection on the blocking pool.
//! - Handlers hold no mutable shared state.

pub mod api;
pub mod config;
pub mod error;

use api::profile::UserProfile;
use api::{contents, input, memos, messages, profile};
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use config::ServerConfig;
use log::{info, warn};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use zhulong_core::{RankingSettings, ReminderSettings};

const SERVICE_NAME: &str = "zhulong";

/// Shared, read-only handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db_path: PathBuf,
    pub ranking: RankingSettings,
    pub reminders: ReminderSettings,
    pub daily_push_count: u32,
    pub profile: UserProfile,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            db_path: config.db_path.clone(),
            ranking: config.ranking(),
            reminders: config.reminders(),
            daily_push_count: config.daily_push_count,
            profile: UserProfile {
                identity: config.user_identity.clone(),
                transcendent: config.user_transcendent.clone(),
                worldly: config.user_worldly.clone(),
            },
        }
    }
}

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/user/profile", get(profile::get_profile))
        .route(
            "/contents",
            get(contents::list_contents).post(contents::create_content),
        )
        .route(
            "/contents/{id}",
            get(contents::get_content).delete(contents::delete_content),
        )
        .route(
            "/contents/{id}/feedback",
            get(contents::list_feedback).post(contents::submit_feedback),
        )
        .route("/memos", get(memos::list_memos).post(memos::create_memo))
        .route("/memos/reminders", get(memos::reminders))
        .route(
            "/memos/{id}",
            get(memos::get_memo).delete(memos::delete_memo),
        )
        .route("/memos/{id}/complete", post(memos::complete_memo))
        .route(
            "/wechat/messages",
            get(messages::list_messages).post(messages::create_message),
        )
        .route(
            "/wechat/messages/{id}",
            get(messages::get_message).delete(messages::delete_message),
        )
        .route("/wechat/messages/{id}/read", post(messages::mark_read))
        .route("/input", post(input::submit_input));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api", api_routes)
        .with_state(Arc::new(state))
        .layer(middleware::from_fn(log_requests))
        .layer(CorsLayer::permissive())
}

async fn root_handler() -> Json<Value> {
    Json(json!({
        "name": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn log_requests(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = started_at.elapsed().as_millis();
    if status.is_server_error() {
        warn!(
            "event=http_request module=server status=error method={method} path={path} code={} duration_ms={duration_ms}",
            status.as_u16()
        );
    } else {
        info!(
            "event=http_request module=server status=ok method={method} path={path} code={} duration_ms={duration_ms}",
            status.as_u16()
        );
    }
    response
}
