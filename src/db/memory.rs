use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::store::{EngagementCache, Store},
    error::{AppError, AppResult},
    models::{
        BatchOutcome, EdgeKind, NewTrip, NewUser, Trip, TripEdge, TripSummary, User, UserStyle,
        UserWithRelations,
    },
};

/// `Store` kept in process memory
///
/// Users and trips are kept in insertion order so listings are stable.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    trips: Vec<Trip>,
}

impl Inner {
    fn user_mut(&mut self, user_id: Uuid) -> AppResult<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))
    }
}

fn union_into(target: &mut Vec<Uuid>, ids: &[Uuid]) {
    for id in ids {
        if !target.contains(id) {
            target.push(*id);
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_trip(&self, trip_id: Uuid) -> Option<Trip> {
        let inner = self.inner.read().await;
        inner.trips.iter().find(|t| t.id == trip_id).cloned()
    }
}

#[async_trait::async_trait]
impl Store for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.id == user.id) {
            return Err(AppError::InvalidInput(format!("User {} already exists", user.id)));
        }

        let user = User {
            id: user.id,
            email: user.email,
            travel_style: user.travel_style,
            location: user.location,
            followings: Vec::new(),
            liked_trips: Vec::new(),
            saved_trips: Vec::new(),
            trips: Vec::new(),
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn create_trips(&self, owner_id: Uuid, trips: Vec<NewTrip>) -> AppResult<Vec<Trip>> {
        let mut inner = self.inner.write().await;
        inner.user_mut(owner_id)?;

        let created: Vec<Trip> = trips
            .into_iter()
            .map(|trip| Trip {
                id: Uuid::new_v4(),
                owner_id,
                title: trip.title,
                destination: trip.destination,
                description: trip.description,
                start_date: trip.start_date,
                end_date: trip.end_date,
                tags: trip.tags,
                budget: trip.budget,
                likes: Vec::new(),
                saved_by: Vec::new(),
                created_at: Utc::now(),
            })
            .collect();

        let ids: Vec<Uuid> = created.iter().map(|t| t.id).collect();
        union_into(&mut inner.user_mut(owner_id)?.trips, &ids);
        inner.trips.extend(created.iter().cloned());

        Ok(created)
    }

    async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn get_user_with_relations(&self, user_id: Uuid) -> AppResult<Option<UserWithRelations>> {
        let inner = self.inner.read().await;
        let Some(user) = inner.users.iter().find(|u| u.id == user_id).cloned() else {
            return Ok(None);
        };

        let resolve_trips = |ids: &[Uuid]| -> Vec<Trip> {
            ids.iter()
                .filter_map(|id| inner.trips.iter().find(|t| t.id == *id).cloned())
                .collect()
        };

        let trips = resolve_trips(&user.trips);
        let saved_trips = resolve_trips(&user.saved_trips);
        let followings = user
            .followings
            .iter()
            .filter_map(|id| inner.users.iter().find(|u| u.id == *id))
            .map(|u| UserStyle {
                id: u.id,
                travel_style: u.travel_style.clone(),
            })
            .collect();

        Ok(Some(UserWithRelations {
            user,
            trips,
            saved_trips,
            followings,
        }))
    }

    async fn list_user_styles(&self) -> AppResult<Vec<UserStyle>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .map(|u| UserStyle {
                id: u.id,
                travel_style: u.travel_style.clone(),
            })
            .collect())
    }

    async fn list_trip_summaries(&self) -> AppResult<Vec<TripSummary>> {
        let inner = self.inner.read().await;
        Ok(inner
            .trips
            .iter()
            .map(|t| TripSummary {
                id: t.id,
                owner_id: t.owner_id,
                tags: t.tags.clone(),
            })
            .collect())
    }

    async fn trips_liked_by(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let inner = self.inner.read().await;
        Ok(inner
            .trips
            .iter()
            .filter(|t| t.likes.contains(&user_id))
            .map(|t| t.id)
            .collect())
    }

    async fn trips_saved_by(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let inner = self.inner.read().await;
        Ok(inner
            .trips
            .iter()
            .filter(|t| t.saved_by.contains(&user_id))
            .map(|t| t.id)
            .collect())
    }

    async fn replace_followings(&self, user_id: Uuid, followings: &[Uuid]) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.user_mut(user_id)?.followings = followings.to_vec();
        Ok(())
    }

    async fn add_engagement_cache(
        &self,
        user_id: Uuid,
        liked: &[Uuid],
        saved: &[Uuid],
    ) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let user = inner.user_mut(user_id)?;
        union_into(&mut user.liked_trips, liked);
        union_into(&mut user.saved_trips, saved);
        Ok(())
    }

    async fn set_engagement_cache(&self, user_id: Uuid, cache: &EngagementCache) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let user = inner.user_mut(user_id)?;
        user.liked_trips = cache.liked_trips.clone();
        user.saved_trips = cache.saved_trips.clone();
        Ok(())
    }

    async fn apply_trip_edges(&self, edges: &[TripEdge]) -> BatchOutcome {
        let mut inner = self.inner.write().await;
        let mut outcome = BatchOutcome::default();

        for edge in edges {
            match inner.trips.iter_mut().find(|t| t.id == edge.trip_id) {
                Some(trip) => {
                    let set = match edge.kind {
                        EdgeKind::Like => &mut trip.likes,
                        EdgeKind::Save => &mut trip.saved_by,
                    };
                    union_into(set, &[edge.user_id]);
                    outcome.applied.push(*edge);
                }
                None => outcome
                    .failed
                    .push((*edge, format!("Trip {} not found", edge.trip_id))),
            }
        }

        outcome
    }
}
