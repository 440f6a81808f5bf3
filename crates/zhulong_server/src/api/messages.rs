use crate::api::with_stores;
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use zhulong_core::{MessageId, MessageListQuery, NewMessage, Priority, WeChatMessage};

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    #[serde(default)]
    sender: String,
    content: String,
    /// Derived from keywords when absent.
    priority: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListMessagesParams {
    priority: Option<String>,
    #[serde(default)]
    unread_only: bool,
    limit: Option<u32>,
}

fn parse_priority(value: Option<&str>) -> Result<Option<Priority>, ApiError> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(|value| value.parse::<Priority>().map_err(ApiError::invalid_input))
        .transpose()
}

pub async fn create_message(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<WeChatMessage>)> {
    let Json(request) = body?;
    let message = NewMessage {
        priority: parse_priority(request.priority.as_deref())?,
        sender: request.sender,
        content: request.content,
    };
    let created = with_stores(&state, move |stores| stores.messages.create(&message)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListMessagesParams>, QueryRejection>,
) -> ApiResult<Json<Vec<WeChatMessage>>> {
    let Query(params) = params?;
    let query = MessageListQuery {
        priority: parse_priority(params.priority.as_deref())?,
        unread_only: params.unread_only,
        limit: params.limit,
    };
    let messages = with_stores(&state, move |stores| stores.messages.list(&query)).await?;
    Ok(Json(messages))
}

pub async fn get_message(
    State(state): State<Arc<AppState>>,
    id: Result<Path<MessageId>, PathRejection>,
) -> ApiResult<Json<WeChatMessage>> {
    let Path(id) = id?;
    let message = with_stores(&state, move |stores| stores.messages.get(id)).await?;
    Ok(Json(message))
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    id: Result<Path<MessageId>, PathRejection>,
) -> ApiResult<Json<WeChatMessage>> {
    let Path(id) = id?;
    let message = with_stores(&state, move |stores| {
        stores.messages.mark_read(id)?;
        stores.messages.get(id)
    })
    .await?;
    Ok(Json(message))
}

pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    id: Result<Path<MessageId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    with_stores(&state, move |stores| stores.messages.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
