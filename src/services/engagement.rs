use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{EdgeKind, TripEdge, TripSummary},
    services::sampling::{distribute_counts, sample_unique},
    taxonomy::{find_matching_pool, ThemePool},
};

pub const DEFAULT_LIKE_CAP: usize = 100;
pub const DEFAULT_SAVE_CAP: usize = 70;

/// Inputs for one engagement seeding run
#[derive(Debug, Clone)]
pub struct InteractionsRequest {
    pub user_id: Uuid,
    /// Interest pools in priority order; unknown names are dropped
    pub like_pools: Vec<String>,
    pub like_cap: usize,
    pub save_cap: usize,
}

impl InteractionsRequest {
    pub fn new(user_id: Uuid, like_pools: Vec<String>) -> Self {
        Self {
            user_id,
            like_pools,
            like_cap: DEFAULT_LIKE_CAP,
            save_cap: DEFAULT_SAVE_CAP,
        }
    }
}

/// Trips chosen in one run, in selection order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionSelections {
    pub like_selections: Vec<Uuid>,
    pub save_selections: Vec<Uuid>,
}

/// Running "already taken" set for one edge kind across all pools of a run
struct ExclusionSet {
    excluded: HashSet<Uuid>,
    chosen: Vec<Uuid>,
}

impl ExclusionSet {
    fn new(historical: &[Uuid]) -> Self {
        Self {
            excluded: historical.iter().copied().collect(),
            chosen: Vec::new(),
        }
    }

    fn take<R: Rng + ?Sized>(&mut self, candidates: &[&TripSummary], n: usize, rng: &mut R) {
        let picked = sample_unique(candidates, n, &self.excluded, |trip| trip.id, rng);
        for trip in picked {
            self.excluded.insert(trip.id);
            self.chosen.push(trip.id);
        }
    }
}

/// Resolves pool names against the taxonomy, dropping unknown ones
pub fn resolve_pools(names: &[String]) -> Vec<&'static ThemePool> {
    names.iter().filter_map(|name| find_matching_pool(name)).collect()
}

/// Picks like and save targets for `user_id`
///
/// Each pool gets its share of the caps and draws from trips tagged for it
/// that the user does not own. Trips already liked (or saved) historically
/// or earlier in this run are skipped, independently for likes and saves.
#[allow(clippy::too_many_arguments)]
pub fn plan_interactions<R: Rng + ?Sized>(
    user_id: Uuid,
    pools: &[&ThemePool],
    trips: &[TripSummary],
    already_liked: &[Uuid],
    already_saved: &[Uuid],
    like_cap: usize,
    save_cap: usize,
    rng: &mut R,
) -> InteractionSelections {
    let like_split = distribute_counts(like_cap, pools.len());
    let save_split = distribute_counts(save_cap, pools.len());

    let mut likes = ExclusionSet::new(already_liked);
    let mut saves = ExclusionSet::new(already_saved);

    for (idx, pool) in pools.iter().enumerate() {
        let pool_trips: Vec<&TripSummary> = trips
            .iter()
            .filter(|trip| trip.owner_id != user_id && pool.matches_any_tag(&trip.tags))
            .collect();

        likes.take(&pool_trips, like_split[idx], rng);
        saves.take(&pool_trips, save_split[idx], rng);
    }

    InteractionSelections {
        like_selections: likes.chosen,
        save_selections: saves.chosen,
    }
}

/// Seeds likes and saves for a user and persists both sides of each edge
///
/// Trip-side edges go out as one best-effort batch; failed items are logged
/// and left out of the user-side caches and of the returned selections.
pub async fn seed_user_interactions<R: Rng + Send + ?Sized>(
    store: &dyn Store,
    request: &InteractionsRequest,
    rng: &mut R,
) -> AppResult<InteractionSelections> {
    let pools = resolve_pools(&request.like_pools);
    if pools.is_empty() {
        tracing::info!(
            user_id = %request.user_id,
            like_pools = ?request.like_pools,
            "No valid like pools provided, skipping interactions"
        );
        return Ok(InteractionSelections::default());
    }

    let user = store
        .get_user(request.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {}", request.user_id)))?;
    let trips = store.list_trip_summaries().await?;

    let planned = plan_interactions(
        request.user_id,
        &pools,
        &trips,
        &user.liked_trips,
        &user.saved_trips,
        request.like_cap,
        request.save_cap,
        rng,
    );

    let edges: Vec<TripEdge> = planned
        .like_selections
        .iter()
        .map(|trip_id| (*trip_id, EdgeKind::Like))
        .chain(planned.save_selections.iter().map(|trip_id| (*trip_id, EdgeKind::Save)))
        .map(|(trip_id, kind)| TripEdge {
            trip_id,
            user_id: request.user_id,
            kind,
        })
        .collect();

    let outcome = store.apply_trip_edges(&edges).await;
    for (edge, error) in &outcome.failed {
        tracing::warn!(
            user_id = %request.user_id,
            trip_id = %edge.trip_id,
            kind = ?edge.kind,
            error = %error,
            "Trip edge write failed"
        );
    }

    let seeded = InteractionSelections {
        like_selections: outcome.applied_trip_ids(EdgeKind::Like),
        save_selections: outcome.applied_trip_ids(EdgeKind::Save),
    };

    store
        .add_engagement_cache(request.user_id, &seeded.like_selections, &seeded.save_selections)
        .await?;

    tracing::info!(
        user_id = %request.user_id,
        pools = pools.len(),
        liked = seeded.like_selections.len(),
        saved = seeded.save_selections.len(),
        failed = outcome.failed.len(),
        "Seeded interactions"
    );

    Ok(seeded)
}
