use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A trip owned by a user, with its authoritative engagement edges
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub destination: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub budget: Option<f64>,
    /// Users who liked this trip
    pub likes: Vec<Uuid>,
    /// Users who saved this trip
    pub saved_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A trip as submitted by the provisioning client
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_client_date")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_client_date")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub budget: Option<f64>,
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC)
///
/// Blank strings and `null` mean no date.
fn deserialize_client_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(timestamp.with_timezone(&Utc)));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| Some(date.and_time(NaiveTime::MIN).and_utc()))
        .map_err(|_| serde::de::Error::custom(format!("invalid date: {raw:?}")))
}

/// Projection of a trip used when picking engagement targets
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TripSummary {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub tags: Vec<String>,
}

/// Which trip-side edge set an engagement write targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Like,
    Save,
}

/// A single "add user to trip edge set" mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TripEdge {
    pub trip_id: Uuid,
    pub user_id: Uuid,
    pub kind: EdgeKind,
}

/// Result of a best-effort batch of trip edge writes
///
/// Every edge lands in exactly one of the two lists.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub applied: Vec<TripEdge>,
    pub failed: Vec<(TripEdge, String)>,
}

impl BatchOutcome {
    /// Trip ids whose edge of `kind` was written
    pub fn applied_trip_ids(&self, kind: EdgeKind) -> Vec<Uuid> {
        self.applied
            .iter()
            .filter(|edge| edge.kind == kind)
            .map(|edge| edge.trip_id)
            .collect()
    }
}
