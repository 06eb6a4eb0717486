use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::Value;
use service_core::error::AppError;
use service_core::middleware::tracing::RequestId;

use crate::AppState;

/// `POST /gemini`: body forwarded verbatim, upstream status passed through.
pub async fn generate_content(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload.map_err(|rejection| match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(rejection.body_text()),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => AppError::UnsupportedMediaType(rejection.body_text()),
        _ => AppError::BadRequest(rejection.body_text()),
    })?;

    let upstream = state.gemini.generate_content(&body).await?;

    tracing::info!(
        request_id = %request_id,
        model = %state.gemini.model(),
        status = %upstream.status,
        "Gemini request relayed"
    );

    Ok(upstream.into_response())
}
