use axum::{
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use rand::{rngs::StdRng, SeedableRng};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::{
    config::Config,
    db::Store,
    error::{AppError, AppResult},
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{FeedbackLog, Recommender},
};

pub mod feedback;
pub mod profile;
pub mod taxonomy;
pub mod test_users;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub recommender: Arc<dyn Recommender>,
    pub feedback_log: FeedbackLog,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, recommender: Arc<dyn Recommender>) -> Self {
        let feedback_log = FeedbackLog::new(&config.export_dir);
        Self {
            config,
            store,
            recommender,
            feedback_log,
        }
    }

    /// Random source for one seeding run
    ///
    /// With `RNG_SEED` set every run starts from the same seed.
    pub fn rng(&self) -> StdRng {
        match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Parses a user id path segment
pub(crate) fn parse_user_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput("Invalid userId".to_string()))
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/test-user", test_user_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// Test-data harness routes under /api/test-user
fn test_user_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(ping))
        .route("/createTestUser", post(test_users::create))
        .route("/getPreferenceProfile/:user_id", post(profile::recommend))
        .route("/trip/:user_id/owner", get(test_users::owner))
        .route("/trip/outputResult", post(feedback::output_result))
        .route("/resyncEngagement/:user_id", post(test_users::resync_engagement))
        .route("/reseedFollowings", post(test_users::reseed_followings))
        .route("/tags", get(taxonomy::tags))
        .route("/pools", get(taxonomy::pools))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })),
    )
}

async fn ping() -> Json<Value> {
    Json(json!({ "ok": true, "route": "/api/test-user/ping" }))
}
