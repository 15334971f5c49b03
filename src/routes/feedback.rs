use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    routes::AppState,
    services::feedback::{record_feedback, FeedbackReceipt},
};

/// Handler for recommender feedback
///
/// The body is taken as raw JSON since it may mix several payload shapes.
pub async fn output_result(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<FeedbackReceipt>> {
    let Json(body) = body?;
    tracing::debug!(request_id = %request_id, "Processing feedback");
    let receipt = record_feedback(&state.feedback_log, &body).await?;
    Ok(Json(receipt))
}
