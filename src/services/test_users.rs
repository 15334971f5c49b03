use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::Config,
    db::Store,
    error::{AppError, AppResult},
    models::{NewTrip, NewUser, PopulatedUser},
    services::{
        engagement::{seed_user_interactions, InteractionsRequest},
        social_graph::{seed_user_followings, FollowingsRequest},
    },
};

fn default_cohesion_score() -> f64 {
    1.0
}

/// Body of a test-user provisioning request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestUserRequest {
    #[serde(default = "default_cohesion_score")]
    pub cohesion_score: f64,
    #[serde(default)]
    pub like_pools: Vec<String>,
    #[serde(default)]
    pub travel_style: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub trips: Vec<NewTrip>,
}

/// Seeding caps applied to every provisioned user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedLimits {
    pub max_followings: usize,
    pub like_cap: usize,
    pub save_cap: usize,
}

impl From<&Config> for SeedLimits {
    fn from(config: &Config) -> Self {
        Self {
            max_followings: config.max_followings,
            like_cap: config.like_cap,
            save_cap: config.save_cap,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeededCounts {
    pub followings_count: usize,
    pub liked_count: usize,
    pub saved_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTestUser {
    pub message: String,
    pub user_id: Uuid,
    pub user: PopulatedUser,
    pub seeded: SeededCounts,
}

/// Provisions a test user with its trips, then seeds followings and engagement
///
/// An empty trip list is rejected before anything is written.
pub async fn create_test_user<R: Rng + Send + ?Sized>(
    store: &dyn Store,
    request: CreateTestUserRequest,
    limits: SeedLimits,
    rng: &mut R,
) -> AppResult<CreatedTestUser> {
    if request.trips.is_empty() {
        return Err(AppError::InvalidInput("Trips array is required".to_string()));
    }

    let travel_style = request.travel_style.filter(|s| !s.is_empty());
    let user = store
        .create_user(NewUser::test_user(travel_style.clone(), request.location))
        .await?;

    tracing::info!(
        user_id = %user.id,
        cohesion_score = request.cohesion_score,
        like_pools = request.like_pools.len(),
        trips = request.trips.len(),
        "Provisioning test user"
    );

    store.create_trips(user.id, request.trips).await?;

    let followings = seed_user_followings(
        store,
        &FollowingsRequest {
            user_id: user.id,
            travel_style,
            cohesion_score: request.cohesion_score,
            max_followings: limits.max_followings,
        },
        rng,
    )
    .await?;

    let interactions = seed_user_interactions(
        store,
        &InteractionsRequest {
            user_id: user.id,
            like_pools: request.like_pools,
            like_cap: limits.like_cap,
            save_cap: limits.save_cap,
        },
        rng,
    )
    .await?;

    let fresh = store
        .get_user_with_relations(user.id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("User {} vanished after creation", user.id)))?;

    Ok(CreatedTestUser {
        message: "Test user created with followings & interactions".to_string(),
        user_id: user.id,
        user: PopulatedUser::from(fresh),
        seeded: SeededCounts {
            followings_count: followings.len(),
            liked_count: interactions.like_selections.len(),
            saved_count: interactions.save_selections.len(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use rand::{rngs::StdRng, SeedableRng};
    use serde_json::json;

    fn limits() -> SeedLimits {
        SeedLimits::from(&Config::default())
    }

    fn request(body: serde_json::Value) -> CreateTestUserRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_request_defaults() {
        let req = request(json!({ "trips": [{ "title": "x" }] }));
        assert_eq!(req.cohesion_score, 1.0);
        assert!(req.like_pools.is_empty());
        assert_eq!(req.travel_style, None);
    }

    #[tokio::test]
    async fn test_empty_trips_rejected_without_side_effects() {
        let store = InMemoryStore::new();
        let result = create_test_user(
            &store,
            request(json!({ "travelStyle": "budget", "trips": [] })),
            limits(),
            &mut StdRng::seed_from_u64(1),
        )
        .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert!(store.list_user_styles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provisions_and_seeds() {
        let store = InMemoryStore::new();
        let peer = store
            .create_user(NewUser::test_user(Some("solo".to_string()), None))
            .await
            .unwrap();
        let peer_trips = store
            .create_trips(
                peer.id,
                (0..4)
                    .map(|_| NewTrip {
                        title: "peer".to_string(),
                        tags: vec!["Budget".to_string()],
                        ..NewTrip::default()
                    })
                    .collect(),
            )
            .await
            .unwrap();

        let created = create_test_user(
            &store,
            request(json!({
                "cohesionScore": 5,
                "likePools": ["budget"],
                "travelStyle": "budget",
                "location": "Berlin",
                "trips": [
                    { "title": "own", "destination": "Lisbon", "tags": ["Budget"], "budget": 500 }
                ]
            })),
            limits(),
            &mut StdRng::seed_from_u64(4),
        )
        .await
        .unwrap();

        assert_eq!(created.user.id, created.user_id);
        assert_eq!(created.user.location.as_deref(), Some("Berlin"));
        assert_eq!(created.user.travel_style.as_deref(), Some("budget"));
        assert_eq!(created.user.trips.len(), 1);
        // "solo" shares Budget with "budget"
        assert_eq!(created.seeded.followings_count, 1);
        assert_eq!(created.user.followings[0].id, peer.id);
        // Own trip is never a target
        assert_eq!(created.seeded.liked_count, peer_trips.len());
        assert_eq!(created.seeded.saved_count, peer_trips.len());
        assert_eq!(created.user.liked_trips.len(), peer_trips.len());
    }
}
