use crate::api::with_stores;
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use zhulong_core::{Content, ContentId, ContentListQuery, Feedback, NewContent, NewFeedback};

#[derive(Debug, Deserialize)]
pub struct CreateContentRequest {
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    source: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    /// Optional; must match the path id when present.
    content_id: Option<ContentId>,
    score: i64,
    comment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    limit: Option<u32>,
}

/// Highest-ranked contents, `daily_push_count` by default.
pub async fn list_contents(
    State(state): State<Arc<AppState>>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Content>>> {
    let Query(params) = params?;
    let query = ContentListQuery {
        limit: Some(params.limit.unwrap_or(state.daily_push_count)),
    };
    let contents = with_stores(&state, move |stores| stores.contents.list(&query)).await?;
    Ok(Json(contents))
}

pub async fn create_content(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateContentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Content>)> {
    let Json(request) = body?;
    let content = NewContent {
        title: request.title,
        body: request.body,
        url: request.url,
        source: request.source,
    };
    let created = with_stores(&state, move |stores| stores.contents.ingest(&content)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_content(
    State(state): State<Arc<AppState>>,
    id: Result<Path<ContentId>, PathRejection>,
) -> ApiResult<Json<Content>> {
    let Path(id) = id?;
    let content = with_stores(&state, move |stores| stores.contents.get(id)).await?;
    Ok(Json(content))
}

pub async fn delete_content(
    State(state): State<Arc<AppState>>,
    id: Result<Path<ContentId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    with_stores(&state, move |stores| stores.contents.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    id: Result<Path<ContentId>, PathRejection>,
    body: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Feedback>)> {
    let Path(id) = id?;
    let Json(request) = body?;
    if let Some(body_id) = request.content_id {
        if body_id != id {
            return Err(ApiError::invalid_input(format!(
                "content_id {body_id} does not match path id {id}"
            )));
        }
    }
    let feedback = NewFeedback {
        content_id: id,
        score: request.score,
        comment: request.comment,
    };
    let created = with_stores(&state, move |stores| {
        stores.contents.submit_feedback(&feedback)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_feedback(
    State(state): State<Arc<AppState>>,
    id: Result<Path<ContentId>, PathRejection>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Feedback>>> {
    let Path(id) = id?;
    let Query(params) = params?;
    let feedback = with_stores(&state, move |stores| {
        stores.contents.list_feedback(id, params.limit)
    })
    .await?;
    Ok(Json(feedback))
}
