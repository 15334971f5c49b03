use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    db::Store,
    error::AppResult,
    models::UserStyle,
    services::sampling::sample_unique,
    taxonomy::{find_matching_pool, ThemePool},
};

pub const MAX_COHESION: f64 = 5.0;

/// Followings cap for the bulk reseed of every user
pub const BULK_MAX_FOLLOWINGS: usize = 30;

/// Inputs for one social-graph seeding run
#[derive(Debug, Clone)]
pub struct FollowingsRequest {
    pub user_id: Uuid,
    pub travel_style: Option<String>,
    /// 0..=5, clamped
    pub cohesion_score: f64,
    pub max_followings: usize,
}

/// How a followings cap splits between the user's own pool and the rest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CohesionSplit {
    pub same_count: usize,
    pub diff_count: usize,
}

impl CohesionSplit {
    pub fn new(cohesion_score: f64, max_followings: usize) -> Self {
        let score = if cohesion_score.is_nan() {
            0.0
        } else {
            cohesion_score.clamp(0.0, MAX_COHESION)
        };
        let same_count = ((score / MAX_COHESION) * max_followings as f64).round() as usize;
        let same_count = same_count.min(max_followings);

        Self {
            same_count,
            diff_count: max_followings - same_count,
        }
    }
}

/// Picks followings for `user_id` out of `users`
///
/// Other users whose own pool is related to `pool` form the same-pool
/// partition; everyone else forms the different-pool partition. The acting
/// user is never a candidate. Short partitions are taken whole.
pub fn plan_followings<R: Rng + ?Sized>(
    user_id: Uuid,
    pool: &ThemePool,
    users: &[UserStyle],
    split: CohesionSplit,
    rng: &mut R,
) -> Vec<Uuid> {
    let (same_pool, different_pool): (Vec<Uuid>, Vec<Uuid>) = users
        .iter()
        .filter(|u| u.id != user_id)
        .map(|u| {
            let related = u
                .travel_style
                .as_deref()
                .and_then(find_matching_pool)
                .is_some_and(|other| pool.is_related(other));
            (u.id, related)
        })
        .fold((Vec::new(), Vec::new()), |(mut same, mut diff), (id, related)| {
            if related {
                same.push(id);
            } else {
                diff.push(id);
            }
            (same, diff)
        });

    let none = HashSet::new();
    let mut followings = sample_unique(&same_pool, split.same_count, &none, |id| *id, rng);
    followings.extend(sample_unique(&different_pool, split.diff_count, &none, |id| *id, rng));
    followings
}

/// Seeds and persists a user's followings
///
/// Returns an empty list, without touching the store, when the travel style
/// matches no theme pool. Otherwise the result fully replaces the user's
/// previous followings.
pub async fn seed_user_followings<R: Rng + Send + ?Sized>(
    store: &dyn Store,
    request: &FollowingsRequest,
    rng: &mut R,
) -> AppResult<Vec<Uuid>> {
    let style = request.travel_style.as_deref().unwrap_or_default();
    let Some(pool) = find_matching_pool(style) else {
        tracing::info!(
            user_id = %request.user_id,
            travel_style = %style,
            "No matching pool for travel style, skipping followings"
        );
        return Ok(Vec::new());
    };

    let users = store.list_user_styles().await?;
    let split = CohesionSplit::new(request.cohesion_score, request.max_followings);
    let followings = plan_followings(request.user_id, pool, &users, split, rng);

    store.replace_followings(request.user_id, &followings).await?;

    tracing::info!(
        user_id = %request.user_id,
        pool = pool.name,
        same_pool_target = split.same_count,
        different_pool_target = split.diff_count,
        followings = followings.len(),
        "Seeded followings"
    );

    Ok(followings)
}

/// Outcome of a bulk followings reseed
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BulkFollowingsReport {
    pub users_seeded: usize,
    pub users_skipped: usize,
    pub followings_total: usize,
}

/// Reseeds the followings of every user in the store
///
/// Each user draws an integer cohesion score in 1..=5 and gets at most
/// [`BULK_MAX_FOLLOWINGS`] followings. Users whose travel style matches no
/// theme pool are skipped and keep their current followings. Candidates come
/// from one snapshot of the user list taken before any write.
pub async fn seed_all_followings<R: Rng + Send + ?Sized>(
    store: &dyn Store,
    rng: &mut R,
) -> AppResult<BulkFollowingsReport> {
    let users = store.list_user_styles().await?;
    let mut report = BulkFollowingsReport::default();

    for user in &users {
        let Some(pool) = user.travel_style.as_deref().and_then(find_matching_pool) else {
            report.users_skipped += 1;
            continue;
        };

        let cohesion_score = f64::from(rng.gen_range(1u8..=5));
        let split = CohesionSplit::new(cohesion_score, BULK_MAX_FOLLOWINGS);
        let followings = plan_followings(user.id, pool, &users, split, rng);
        store.replace_followings(user.id, &followings).await?;

        tracing::debug!(
            user_id = %user.id,
            pool = pool.name,
            cohesion_score,
            followings = followings.len(),
            "Reseeded followings"
        );

        report.users_seeded += 1;
        report.followings_total += followings.len();
    }

    tracing::info!(
        users_seeded = report.users_seeded,
        users_skipped = report.users_skipped,
        followings_total = report.followings_total,
        "Bulk followings reseed complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use crate::models::NewUser;
    use rand::{rngs::StdRng, SeedableRng};

    fn styled(style: &str, count: usize) -> Vec<UserStyle> {
        (0..count)
            .map(|_| UserStyle {
                id: Uuid::new_v4(),
                travel_style: Some(style.to_string()),
            })
            .collect()
    }

    #[test]
    fn test_cohesion_split_rounds_and_clamps() {
        assert_eq!(CohesionSplit::new(0.0, 100), CohesionSplit { same_count: 0, diff_count: 100 });
        assert_eq!(CohesionSplit::new(2.5, 100), CohesionSplit { same_count: 50, diff_count: 50 });
        assert_eq!(CohesionSplit::new(1.0, 30), CohesionSplit { same_count: 6, diff_count: 24 });
        assert_eq!(CohesionSplit::new(9.0, 100).same_count, 100);
        assert_eq!(CohesionSplit::new(-3.0, 100).same_count, 0);
        assert_eq!(CohesionSplit::new(f64::NAN, 10).same_count, 0);
    }

    #[test]
    fn test_full_cap_reached_with_enough_candidates() {
        let budget = find_matching_pool("budget").unwrap();
        // "digital nomad" shares Asia/Europe with "budget"; "party" shares nothing
        let mut users = styled("digital nomad", 120);
        users.extend(styled("party", 120));
        let same_ids: HashSet<Uuid> = users[..120].iter().map(|u| u.id).collect();

        for step in 0..=10 {
            let score = step as f64 / 2.0;
            let split = CohesionSplit::new(score, 100);
            let mut rng = StdRng::seed_from_u64(step);
            let followings = plan_followings(Uuid::new_v4(), budget, &users, split, &mut rng);

            assert_eq!(followings.len(), 100);
            let same = followings.iter().filter(|id| same_ids.contains(id)).count();
            assert_eq!(same, (score / 5.0 * 100.0).round() as usize);
        }
    }

    #[test]
    fn test_never_follows_self_and_no_duplicates() {
        let budget = find_matching_pool("budget").unwrap();
        let users = styled("budget", 10);
        let me = users[3].id;
        let mut rng = StdRng::seed_from_u64(1);

        let split = CohesionSplit::new(5.0, 100);
        let followings = plan_followings(me, budget, &users, split, &mut rng);
        assert_eq!(followings.len(), 9);
        assert!(!followings.contains(&me));
        let unique: HashSet<Uuid> = followings.iter().copied().collect();
        assert_eq!(unique.len(), followings.len());
    }

    #[test]
    fn test_unresolvable_styles_land_in_different_pool() {
        let budget = find_matching_pool("budget").unwrap();
        let users = vec![
            UserStyle { id: Uuid::new_v4(), travel_style: None },
            UserStyle { id: Uuid::new_v4(), travel_style: Some("glamping".to_string()) },
        ];
        let mut rng = StdRng::seed_from_u64(1);

        let split = CohesionSplit::new(5.0, 10);
        let all_same = plan_followings(Uuid::new_v4(), budget, &users, split, &mut rng);
        assert!(all_same.is_empty());

        let split = CohesionSplit::new(0.0, 10);
        let all_diff = plan_followings(Uuid::new_v4(), budget, &users, split, &mut rng);
        assert_eq!(all_diff.len(), 2);
    }

    #[tokio::test]
    async fn test_seed_without_matching_pool_leaves_store_untouched() {
        let store = InMemoryStore::new();
        let user = store
            .create_user(NewUser::test_user(Some("glamping".to_string()), None))
            .await
            .unwrap();
        let other = store
            .create_user(NewUser::test_user(Some("budget".to_string()), None))
            .await
            .unwrap();
        store.replace_followings(user.id, &[other.id]).await.unwrap();

        let request = FollowingsRequest {
            user_id: user.id,
            travel_style: Some("glamping".to_string()),
            cohesion_score: 5.0,
            max_followings: 100,
        };
        let followings = seed_user_followings(&store, &request, &mut StdRng::seed_from_u64(3))
            .await
            .unwrap();

        assert!(followings.is_empty());
        let user = store.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(user.followings, vec![other.id]);
    }

    #[tokio::test]
    async fn test_seed_replaces_previous_followings() {
        let store = InMemoryStore::new();
        let user = store
            .create_user(NewUser::test_user(Some("Budget".to_string()), None))
            .await
            .unwrap();
        let peer = store
            .create_user(NewUser::test_user(Some("digital nomad".to_string()), None))
            .await
            .unwrap();
        let stale = Uuid::new_v4();
        store.replace_followings(user.id, &[stale]).await.unwrap();

        let request = FollowingsRequest {
            user_id: user.id,
            travel_style: Some("Budget".to_string()),
            cohesion_score: 5.0,
            max_followings: 100,
        };
        let followings = seed_user_followings(&store, &request, &mut StdRng::seed_from_u64(3))
            .await
            .unwrap();

        assert_eq!(followings, vec![peer.id]);
        let user = store.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(user.followings, vec![peer.id]);
    }

    #[tokio::test]
    async fn test_bulk_reseed_covers_every_pooled_user() {
        let store = InMemoryStore::new();
        let mut pooled = Vec::new();
        for style in ["budget", "digital nomad", "party", "solo"] {
            for _ in 0..15 {
                let user = store
                    .create_user(NewUser::test_user(Some(style.to_string()), None))
                    .await
                    .unwrap();
                pooled.push(user.id);
            }
        }
        let loner = store
            .create_user(NewUser::test_user(Some("glamping".to_string()), None))
            .await
            .unwrap();
        let kept = Uuid::new_v4();
        store.replace_followings(loner.id, &[kept]).await.unwrap();

        let report = seed_all_followings(&store, &mut StdRng::seed_from_u64(9))
            .await
            .unwrap();

        assert_eq!(report.users_seeded, pooled.len());
        assert_eq!(report.users_skipped, 1);

        let mut total = 0;
        for id in &pooled {
            let user = store.get_user(*id).await.unwrap().unwrap();
            // 14 same-style peers always land in the same-pool partition
            assert!(!user.followings.is_empty());
            assert!(user.followings.len() <= BULK_MAX_FOLLOWINGS);
            assert!(!user.followings.contains(id));
            let unique: HashSet<Uuid> = user.followings.iter().copied().collect();
            assert_eq!(unique.len(), user.followings.len());
            total += user.followings.len();
        }
        assert_eq!(report.followings_total, total);

        let loner = store.get_user(loner.id).await.unwrap().unwrap();
        assert_eq!(loner.followings, vec![kept]);
    }

    #[tokio::test]
    async fn test_bulk_reseed_on_empty_store() {
        let store = InMemoryStore::new();
        let report = seed_all_followings(&store, &mut StdRng::seed_from_u64(1))
            .await
            .unwrap();
        assert_eq!(report, BulkFollowingsReport::default());
    }
}
