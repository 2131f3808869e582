use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};

use crate::AppState;
use crate::error::FetchError;

use super::model::StatusQuery;

#[axum::debug_handler]
pub async fn get_status(
    State(state): State<AppState>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> Response {
    // 查询串无法解析时与缺少 pnr 同样处理
    let pnr = match query {
        Ok(Query(query)) => query.pnr,
        Err(e) => {
            tracing::debug!("Rejected status query: {}", e);
            return FetchError::InvalidInput.into_response();
        }
    };

    match state.fetcher.get_status(pnr.as_deref().unwrap_or_default()).await {
        Ok(status) => Json(status).into_response(),
        Err(e) => e.into_response(),
    }
}
