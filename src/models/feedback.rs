use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Display;

/// Whether a user judged one engine's recommended trip relevant
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceRecord {
    pub user_id: String,
    pub model: String,
    pub trip_id: String,
    /// 0 or 1
    pub value: u8,
    pub received_at: DateTime<Utc>,
}

/// Role a trip played in an engine's offline evaluation
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EvalKind {
    Recommended,
    Relevant,
    Candidate,
}

impl Display for EvalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalKind::Recommended => write!(f, "recommended"),
            EvalKind::Relevant => write!(f, "relevant"),
            EvalKind::Candidate => write!(f, "candidate"),
        }
    }
}

/// One eval sidecar observation
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvalRecord {
    pub user_id: String,
    pub model: String,
    pub trip_id: String,
    pub kind: EvalKind,
    pub received_at: DateTime<Utc>,
}
