use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Response},
    Extension,
};
use serde::Deserialize;
use service_core::error::AppError;
use service_core::middleware::tracing::RequestId;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PlacesQuery {
    pub query: Option<String>,
}

/// `GET /google?query=<text>`
pub async fn text_search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    params: Result<Query<PlacesQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(params) = params.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("query parameter is required".to_string()))?;

    let upstream = state.places.text_search(&query).await?;

    tracing::info!(
        request_id = %request_id,
        status = %upstream.status,
        "Places search relayed"
    );

    Ok(upstream.into_response())
}
