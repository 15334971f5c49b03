use std::collections::BTreeMap;
use uuid::Uuid;

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{PreferenceProfile, UserWithRelations},
};

/// Median of the given budgets, `None` when there are none
pub fn median_budget(budgets: &[f64]) -> Option<f64> {
    if budgets.is_empty() {
        return None;
    }

    let mut sorted = budgets.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;

    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Folds a resolved user and its trip-side likes into a profile
///
/// Liked trips come from the `likes` edges on trips, saved trips from the
/// user-side cache.
// TODO: settle whether saved trips should also be read from the `saved_by` edges
pub fn aggregate_profile(
    resolved: &UserWithRelations,
    liked_trip_ids: Vec<Uuid>,
) -> PreferenceProfile {
    let mut tags: BTreeMap<String, u32> = BTreeMap::new();
    let mut destinations: BTreeMap<String, u32> = BTreeMap::new();
    let mut budgets = Vec::new();

    for trip in &resolved.trips {
        for tag in &trip.tags {
            *tags.entry(tag.clone()).or_default() += 1;
        }

        if let Some(destination) = trip.destination.as_deref().filter(|d| !d.is_empty()) {
            *destinations.entry(destination.to_string()).or_default() += 1;
        }

        // A zero budget is the client's blank field
        if let Some(budget) = trip.budget.filter(|b| b.is_finite() && *b != 0.0) {
            budgets.push(budget);
        }
    }

    PreferenceProfile {
        user_id: resolved.user.id,
        travel_style: resolved.user.travel_style.clone(),
        location: resolved.user.location.clone(),
        followings: resolved.followings.iter().map(|f| f.id).collect(),
        saved_trips_ids: resolved.saved_trips.iter().map(|t| t.id).collect(),
        liked_trips_ids: liked_trip_ids,
        avg_budget: median_budget(&budgets),
        recent_destinations: destinations,
        tags,
    }
}

async fn try_build_profile(store: &dyn Store, user_id: Uuid) -> AppResult<PreferenceProfile> {
    let resolved = store
        .get_user_with_relations(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))?;
    let liked = store.trips_liked_by(user_id).await?;

    Ok(aggregate_profile(&resolved, liked))
}

/// Builds the preference profile for a user
///
/// Any failure, including an unknown user, yields `None`: callers treat that
/// as "not enough data to recommend", distinct from an empty profile.
pub async fn build_user_preference_profile(
    store: &dyn Store,
    user_id: Uuid,
) -> Option<PreferenceProfile> {
    match try_build_profile(store, user_id).await {
        Ok(profile) => Some(profile),
        Err(e) => {
            tracing::warn!(
                user_id = %user_id,
                error = %e,
                "Failed to build user preference profile"
            );
            None
        }
    }
}
