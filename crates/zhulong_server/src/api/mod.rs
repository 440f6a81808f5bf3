//! Route handlers grouped by resource.

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use zhulong_core::{open_db, ServiceResult, Stores};

pub mod contents;
pub mod input;
pub mod memos;
pub mod messages;
pub mod profile;

/// Runs `work` on the blocking pool against a fresh connection.
pub(crate) async fn with_stores<T, F>(state: &AppState, work: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Stores<'_>) -> ServiceResult<T> + Send + 'static,
{
    let db_path = state.db_path.clone();
    let ranking = state.ranking.clone();

    tokio::task::spawn_blocking(move || -> ServiceResult<T> {
        let conn = open_db(&db_path)?;
        let stores = Stores::try_new(&conn, ranking)?;
        work(&stores)
    })
    .await
    .map_err(|err| ApiError::internal(format!("storage task failed: {err}")))?
    .map_err(ApiError::from)
}
