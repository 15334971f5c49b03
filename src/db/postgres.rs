use sqlx::{
    postgres::{PgPoolOptions, PgQueryResult},
    PgPool,
};
use uuid::Uuid;

use crate::{
    db::store::{EngagementCache, Store},
    error::{AppError, AppResult},
    models::{
        BatchOutcome, EdgeKind, NewTrip, NewUser, Trip, TripEdge, TripSummary, User, UserStyle,
        UserWithRelations,
    },
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    Ok(pool)
}

// Owned trips are derived from trips.owner_id rather than stored on the user row
const USER_COLUMNS: &str = r#"
    u.id, u.email, u.travel_style, u.location, u.followings, u.liked_trips, u.saved_trips,
    ARRAY(SELECT t.id FROM trips t WHERE t.owner_id = u.id ORDER BY t.seq) AS trips,
    u.created_at
"#;

const TRIP_COLUMNS: &str = r#"
    id, owner_id, title, destination, description, start_date, end_date, tags, budget,
    likes, saved_by, created_at
"#;

/// `Store` backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn trips_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Trip>> {
        let trips = sqlx::query_as::<_, Trip>(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips WHERE id = ANY($1) ORDER BY array_position($1, id)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(trips)
    }

    async fn apply_trip_edge(&self, edge: &TripEdge) -> Result<(), sqlx::Error> {
        let column = match edge.kind {
            EdgeKind::Like => "likes",
            EdgeKind::Save => "saved_by",
        };

        // Existing edges are left alone, so only a missing trip affects zero rows
        let result = sqlx::query(&format!(
            "UPDATE trips SET {column} = CASE WHEN $2 = ANY({column}) THEN {column} \
             ELSE array_append({column}, $2) END WHERE id = $1"
        ))
        .bind(edge.trip_id)
        .bind(edge.user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }
}

/// Maps an update that matched no user row onto `NotFound`
fn require_user_row(result: PgQueryResult, user_id: Uuid) -> AppResult<()> {
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("User {}", user_id)));
    }
    Ok(())
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        sqlx::query(
            "INSERT INTO users (id, email, travel_style, location) VALUES ($1, $2, $3, $4)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.travel_style)
        .bind(&user.location)
        .execute(&self.pool)
        .await?;

        self.get_user(user.id).await?.ok_or_else(|| {
            AppError::Internal(format!("User {} vanished after insert", user.id))
        })
    }

    async fn create_trips(&self, owner_id: Uuid, trips: Vec<NewTrip>) -> AppResult<Vec<Trip>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(trips.len());

        for trip in trips {
            let row = sqlx::query_as::<_, Trip>(&format!(
                "INSERT INTO trips (id, owner_id, title, destination, description, \
                 start_date, end_date, tags, budget) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {TRIP_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(&trip.title)
            .bind(&trip.destination)
            .bind(&trip.description)
            .bind(trip.start_date)
            .bind(trip.end_date)
            .bind(&trip.tags)
            .bind(trip.budget)
            .fetch_one(&mut *tx)
            .await?;
            created.push(row);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user_with_relations(&self, user_id: Uuid) -> AppResult<Option<UserWithRelations>> {
        let Some(user) = self.get_user(user_id).await? else {
            return Ok(None);
        };

        let trips = self.trips_by_ids(&user.trips).await?;
        let saved_trips = self.trips_by_ids(&user.saved_trips).await?;
        let followings = sqlx::query_as::<_, UserStyle>(
            "SELECT id, travel_style FROM users WHERE id = ANY($1) ORDER BY array_position($1, id)",
        )
        .bind(&user.followings)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(UserWithRelations {
            user,
            trips,
            saved_trips,
            followings,
        }))
    }

    async fn list_user_styles(&self) -> AppResult<Vec<UserStyle>> {
        let users = sqlx::query_as::<_, UserStyle>(
            "SELECT id, travel_style FROM users ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn list_trip_summaries(&self) -> AppResult<Vec<TripSummary>> {
        let trips = sqlx::query_as::<_, TripSummary>(
            "SELECT id, owner_id, tags FROM trips ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(trips)
    }

    async fn trips_liked_by(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM trips WHERE $1 = ANY(likes) ORDER BY seq",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn trips_saved_by(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM trips WHERE $1 = ANY(saved_by) ORDER BY seq",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn replace_followings(&self, user_id: Uuid, followings: &[Uuid]) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET followings = $2 WHERE id = $1")
            .bind(user_id)
            .bind(followings)
            .execute(&self.pool)
            .await?;

        require_user_row(result, user_id)
    }

    async fn add_engagement_cache(
        &self,
        user_id: Uuid,
        liked: &[Uuid],
        saved: &[Uuid],
    ) -> AppResult<()> {
        // Union that keeps first-seen order
        let result = sqlx::query(
            r#"
            UPDATE users SET
                liked_trips = ARRAY(
                    SELECT x FROM unnest(liked_trips || $2::uuid[]) WITH ORDINALITY AS t(x, n)
                    GROUP BY x ORDER BY min(n)
                ),
                saved_trips = ARRAY(
                    SELECT x FROM unnest(saved_trips || $3::uuid[]) WITH ORDINALITY AS t(x, n)
                    GROUP BY x ORDER BY min(n)
                )
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(liked)
        .bind(saved)
        .execute(&self.pool)
        .await?;

        require_user_row(result, user_id)
    }

    async fn set_engagement_cache(&self, user_id: Uuid, cache: &EngagementCache) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET liked_trips = $2, saved_trips = $3 WHERE id = $1")
                .bind(user_id)
                .bind(&cache.liked_trips)
                .bind(&cache.saved_trips)
                .execute(&self.pool)
                .await?;

        require_user_row(result, user_id)
    }

    async fn apply_trip_edges(&self, edges: &[TripEdge]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for edge in edges {
            match self.apply_trip_edge(edge).await {
                Ok(()) => outcome.applied.push(*edge),
                Err(e) => outcome.failed.push((*edge, e.to_string())),
            }
        }

        outcome
    }
}
