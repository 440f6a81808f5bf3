use crate::api::with_stores;
use crate::error::ApiResult;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use zhulong_core::{RequestContext, RoutedResult};

#[derive(Debug, Deserialize)]
pub struct InputRequest {
    text: String,
    /// `text`, `voice`, `memo`, `message` or `feedback`.
    input_type: Option<String>,
}

/// Classifies free text and stores it as a memo, message or feedback.
///
/// Unrecognized input answers 200 with an `unclassified` payload.
pub async fn submit_input(
    State(state): State<Arc<AppState>>,
    body: Result<Json<InputRequest>, JsonRejection>,
) -> ApiResult<Json<RoutedResult>> {
    let Json(request) = body?;
    let ctx = RequestContext::now_local();
    let routed = with_stores(&state, move |stores| {
        stores
            .router()
            .route(&ctx, &request.text, request.input_type.as_deref())
    })
    .await?;
    Ok(Json(routed))
}
