use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    routes::{parse_user_id, AppState},
    services::profile::build_user_preference_profile,
};

/// Builds the user's preference profile and forwards it to the recommender
///
/// The recommender's JSON is returned unchanged.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = parse_user_id(&user_id)?;

    let profile = build_user_preference_profile(state.store.as_ref(), user_id)
        .await
        .ok_or_else(|| {
            AppError::NotFound(format!("Not enough data to build a profile for user {}", user_id))
        })?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        tags = profile.tags.len(),
        liked = profile.liked_trips_ids.len(),
        "Sending preference profile to recommender"
    );

    let recommendations = state.recommender.recommend(&profile).await?;
    Ok(Json(recommendations))
}
