use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Compact preference features sent to the recommender
///
/// Built fresh per request and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceProfile {
    pub user_id: Uuid,
    pub travel_style: Option<String>,
    pub location: Option<String>,
    pub followings: Vec<Uuid>,
    pub saved_trips_ids: Vec<Uuid>,
    pub liked_trips_ids: Vec<Uuid>,
    /// Median budget over owned trips that carry one
    pub avg_budget: Option<f64>,
    /// Destination -> number of owned trips
    pub recent_destinations: BTreeMap<String, u32>,
    /// Tag -> number of owned trips carrying it
    pub tags: BTreeMap<String, u32>,
}
