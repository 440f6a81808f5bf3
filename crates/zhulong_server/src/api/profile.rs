use crate::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

/// User's self-description, served straight from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub identity: String,
    pub transcendent: String,
    pub worldly: String,
}

pub async fn get_profile(State(state): State<Arc<AppState>>) -> Json<UserProfile> {
    Json(state.profile.clone())
}
