use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        BatchOutcome, NewTrip, NewUser, Trip, TripEdge, TripSummary, User, UserStyle,
        UserWithRelations,
    },
};

/// User-side engagement caches after a resync
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementCache {
    pub liked_trips: Vec<Uuid>,
    pub saved_trips: Vec<Uuid>,
}

/// Repository over users and trips
///
/// Implementations back the seeders and the aggregator. The user-side
/// `followings` / `liked_trips` / `saved_trips` fields are only changed through
/// the dedicated methods below, never by writing a whole `User`.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Inserts a user with empty reference sets
    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    /// Inserts trips owned by `owner_id` and attaches them to the owner
    async fn create_trips(&self, owner_id: Uuid, trips: Vec<NewTrip>) -> AppResult<Vec<Trip>>;

    async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>>;

    /// Loads a user with owned trips, saved trips and followings resolved
    async fn get_user_with_relations(&self, user_id: Uuid) -> AppResult<Option<UserWithRelations>>;

    /// Every user's id and travel style
    async fn list_user_styles(&self) -> AppResult<Vec<UserStyle>>;

    /// Every trip's id, owner and tags
    async fn list_trip_summaries(&self) -> AppResult<Vec<TripSummary>>;

    /// Ids of trips whose `likes` edge set contains `user_id`
    async fn trips_liked_by(&self, user_id: Uuid) -> AppResult<Vec<Uuid>>;

    /// Ids of trips whose `saved_by` edge set contains `user_id`
    async fn trips_saved_by(&self, user_id: Uuid) -> AppResult<Vec<Uuid>>;

    /// Replaces the user's followings wholesale
    async fn replace_followings(&self, user_id: Uuid, followings: &[Uuid]) -> AppResult<()>;

    /// Unions trip ids into the user's liked/saved caches without duplicates
    async fn add_engagement_cache(
        &self,
        user_id: Uuid,
        liked: &[Uuid],
        saved: &[Uuid],
    ) -> AppResult<()>;

    /// Overwrites the user's liked/saved caches
    async fn set_engagement_cache(&self, user_id: Uuid, cache: &EngagementCache) -> AppResult<()>;

    /// Adds users to trip edge sets, one item at a time
    ///
    /// Best-effort: a failing item is reported in `BatchOutcome::failed` and
    /// does not stop the remaining items. Re-adding an existing edge is a no-op.
    async fn apply_trip_edges(&self, edges: &[TripEdge]) -> BatchOutcome;

    /// Recomputes the user-side engagement caches from the trip-side edges
    async fn resync_engagement_cache(&self, user_id: Uuid) -> AppResult<Option<EngagementCache>> {
        if self.get_user(user_id).await?.is_none() {
            return Ok(None);
        }

        let cache = EngagementCache {
            liked_trips: self.trips_liked_by(user_id).await?,
            saved_trips: self.trips_saved_by(user_id).await?,
        };
        self.set_engagement_cache(user_id, &cache).await?;

        tracing::info!(
            user_id = %user_id,
            liked = cache.liked_trips.len(),
            saved = cache.saved_trips.len(),
            "Engagement cache recomputed from trip edges"
        );

        Ok(Some(cache))
    }
}
