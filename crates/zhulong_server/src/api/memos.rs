use crate::api::with_stores;
use crate::config::hours;
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use serde::Deserialize;
use std::sync::Arc;
use zhulong_core::{
    Memo, MemoId, MemoListQuery, NewMemo, Reminder, ReminderSettings, RequestContext,
};

#[derive(Debug, Deserialize)]
pub struct CreateMemoRequest {
    text: String,
    #[serde(default)]
    details: String,
    /// Epoch milliseconds. Parsed from `text` when absent.
    due_at: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListMemosParams {
    #[serde(default)]
    include_completed: bool,
    limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReminderParams {
    /// RFC 3339 instant; defaults to the server clock.
    now: Option<String>,
    window_hours: Option<u64>,
}

pub async fn create_memo(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateMemoRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Memo>)> {
    let Json(request) = body?;
    let ctx = RequestContext::now_local();
    let memo = NewMemo {
        text: request.text,
        details: request.details,
        due_at: request.due_at,
    };
    let created = with_stores(&state, move |stores| {
        stores.memos.create_from_text(memo, ctx.now)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_memos(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListMemosParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Memo>>> {
    let Query(params) = params?;
    let query = MemoListQuery {
        include_completed: params.include_completed,
        limit: params.limit,
    };
    let memos = with_stores(&state, move |stores| stores.memos.list(&query)).await?;
    Ok(Json(memos))
}

pub async fn get_memo(
    State(state): State<Arc<AppState>>,
    id: Result<Path<MemoId>, PathRejection>,
) -> ApiResult<Json<Memo>> {
    let Path(id) = id?;
    let memo = with_stores(&state, move |stores| stores.memos.get(id)).await?;
    Ok(Json(memo))
}

pub async fn complete_memo(
    State(state): State<Arc<AppState>>,
    id: Result<Path<MemoId>, PathRejection>,
) -> ApiResult<Json<Memo>> {
    let Path(id) = id?;
    let memo = with_stores(&state, move |stores| {
        stores.memos.complete(id)?;
        stores.memos.get(id)
    })
    .await?;
    Ok(Json(memo))
}

pub async fn delete_memo(
    State(state): State<Arc<AppState>>,
    id: Result<Path<MemoId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    with_stores(&state, move |stores| stores.memos.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reminders(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ReminderParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Reminder>>> {
    let Query(params) = params?;
    let now_ms = match params.now.as_deref() {
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map_err(|err| ApiError::invalid_input(format!("invalid `now` `{value}`: {err}")))?
            .timestamp_millis(),
        None => RequestContext::now_local().now_ms(),
    };
    let settings = match params.window_hours {
        Some(window_hours) => ReminderSettings {
            window: hours(window_hours),
        },
        None => state.reminders,
    };

    let reminders = with_stores(&state, move |stores| {
        stores.memos.reminders(now_ms, &settings)
    })
    .await?;
    Ok(Json(reminders))
}
