use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::EngagementCache,
    error::{AppError, AppResult},
    middleware::RequestId,
    routes::{parse_user_id, AppState},
    services::{
        social_graph::{seed_all_followings, BulkFollowingsReport},
        test_users::{create_test_user, CreateTestUserRequest, CreatedTestUser, SeedLimits},
    },
};

/// Handler for test user provisioning
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<CreateTestUserRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CreatedTestUser>)> {
    let Json(request) = body?;
    let mut rng = state.rng();
    let created = create_test_user(
        state.store.as_ref(),
        request,
        SeedLimits::from(&state.config),
        &mut rng,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        user_id = %created.user_id,
        followings = created.seeded.followings_count,
        liked = created.seeded.liked_count,
        saved = created.seeded.saved_count,
        "Test user created"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

/// Looks up a user by id
pub async fn owner(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = parse_user_id(&user_id)?;
    let user = state
        .store
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({ "user": user })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResyncResponse {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub cache: EngagementCache,
}

/// Rebuilds a user's liked/saved caches from trip-side edges
pub async fn resync_engagement(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<String>,
) -> AppResult<Json<ResyncResponse>> {
    let user_id = parse_user_id(&user_id)?;
    let cache = state
        .store
        .resync_engagement_cache(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(request_id = %request_id, user_id = %user_id, "Engagement resynced");

    Ok(Json(ResyncResponse { user_id, cache }))
}

/// Reseeds followings for every user with a random cohesion each
pub async fn reseed_followings(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<BulkFollowingsReport>> {
    let mut rng = state.rng();
    let report = seed_all_followings(state.store.as_ref(), &mut rng).await?;

    tracing::info!(
        request_id = %request_id,
        users_seeded = report.users_seeded,
        "Followings reseeded"
    );

    Ok(Json(report))
}
