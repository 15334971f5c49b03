//! Recommender feedback normalization
//!
//! A feedback body can carry relevance judgments in three shapes at once:
//!
//! * engine maps at the top level: `{ "<engine>": { "<tripId>": flag } }`
//! * a result list: `recommendedResult: [{ engine, tripId, relevant }]`
//! * an explicit `models` object with the same shape as the top-level maps
//!
//! All three fold into one `(engine, tripId) -> 0|1` matrix, later shapes
//! overriding earlier ones in that order. An optional `_eval` sidecar carries
//! per-engine trip id lists for offline evaluation and is kept separate.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::{
    error::{AppError, AppResult},
    models::{EvalKind, EvalRecord, RelevanceRecord},
    services::export::FeedbackLog,
};

/// Engine used for result-list items that do not name one
pub const DEFAULT_ENGINE: &str = "recModel1";

/// Top-level keys that never hold an engine map
const RESERVED_KEYS: &[&str] = &["user", "userId", "recommendedResult", "models", "_eval"];

/// engine -> trip id -> 0|1
pub type RelevanceMatrix = BTreeMap<String, BTreeMap<String, u8>>;

/// One result-list entry
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceItem {
    pub engine: String,
    pub trip_id: String,
    pub value: u8,
}

/// A relevance judgment source, one per legal input shape
#[derive(Debug, Clone, PartialEq)]
pub enum RelevanceSource {
    EngineMaps(RelevanceMatrix),
    ResultList(Vec<RelevanceItem>),
    ExplicitModels(RelevanceMatrix),
}

impl RelevanceSource {
    /// Higher precedence is applied later and wins on conflicts
    pub fn precedence(&self) -> u8 {
        match self {
            RelevanceSource::EngineMaps(_) => 0,
            RelevanceSource::ResultList(_) => 1,
            RelevanceSource::ExplicitModels(_) => 2,
        }
    }

    fn apply(&self, matrix: &mut RelevanceMatrix) {
        match self {
            RelevanceSource::EngineMaps(maps) | RelevanceSource::ExplicitModels(maps) => {
                for (engine, trips) in maps {
                    let entry = matrix.entry(engine.clone()).or_default();
                    for (trip_id, value) in trips {
                        entry.insert(trip_id.clone(), *value);
                    }
                }
            }
            RelevanceSource::ResultList(items) => {
                for item in items {
                    matrix
                        .entry(item.engine.clone())
                        .or_default()
                        .insert(item.trip_id.clone(), item.value);
                }
            }
        }
    }
}

/// Per-engine evaluation lists from the `_eval` sidecar
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalLists {
    pub recommended_trip_ids: Vec<String>,
    pub relevant_trip_ids: Vec<String>,
    pub all_candidate_trip_ids: Vec<String>,
}

/// A parsed feedback body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackPayload {
    pub user_id: Option<String>,
    pub sources: Vec<RelevanceSource>,
    pub eval: BTreeMap<String, EvalLists>,
}

/// JSON truthiness: `false`, `0`, `""` and `null` are falsy
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn flag(value: &Value) -> u8 {
    u8::from(is_truthy(value))
}

/// Renders an id-like scalar as a string
///
/// Extended-JSON object ids (`{"$oid": "..."}`) are unwrapped.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(obj) => obj.get("$oid").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn parse_engine_maps<'a>(
    entries: impl Iterator<Item = (&'a String, &'a Value)>,
) -> RelevanceMatrix {
    let mut matrix = RelevanceMatrix::new();
    for (engine, trips) in entries {
        let Some(trips) = trips.as_object() else {
            continue;
        };
        let entry = matrix.entry(engine.clone()).or_default();
        for (trip_id, value) in trips {
            entry.insert(trip_id.clone(), flag(value));
        }
    }
    matrix
}

fn parse_result_item(item: &Value) -> Option<RelevanceItem> {
    let item = item.as_object()?;

    let engine = ["engineType", "engine", "model"]
        .iter()
        .filter_map(|key| item.get(*key))
        .find(|v| is_truthy(v))
        .and_then(id_string)
        .unwrap_or_else(|| DEFAULT_ENGINE.to_string());

    // First non-null id field wins, even when it renders empty
    let trip_id = ["tripId", "id", "_id"]
        .iter()
        .filter_map(|key| item.get(*key))
        .find(|v| !v.is_null())
        .and_then(id_string)
        .filter(|id| !id.is_empty())?;

    Some(RelevanceItem {
        engine,
        trip_id,
        value: item.get("relevant").map(flag).unwrap_or(0),
    })
}

fn parse_id_list(block: &Map<String, Value>, key: &str) -> Vec<String> {
    block
        .get(key)
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(id_string).collect())
        .unwrap_or_default()
}

fn parse_user_id(body: &Map<String, Value>) -> Option<String> {
    let explicit = body.get("userId").filter(|v| !v.is_null());
    let candidate = match explicit {
        Some(v) => id_string(v),
        None => match body.get("user") {
            Some(Value::Object(user)) => ["id", "_id"]
                .iter()
                .filter_map(|key| user.get(*key))
                .find(|v| is_truthy(v))
                .and_then(id_string),
            Some(other) => id_string(other),
            None => None,
        },
    };

    candidate.filter(|id| !id.is_empty())
}

impl FeedbackPayload {
    /// Parses a raw feedback body
    ///
    /// Never fails: shapes that are absent or malformed contribute nothing.
    pub fn parse(body: &Value) -> Self {
        let Some(body) = body.as_object() else {
            return Self::default();
        };

        let mut sources = Vec::new();

        let engine_maps = parse_engine_maps(
            body.iter()
                .filter(|(key, value)| !RESERVED_KEYS.contains(&key.as_str()) && value.is_object()),
        );
        if !engine_maps.is_empty() {
            sources.push(RelevanceSource::EngineMaps(engine_maps));
        }

        if let Some(items) = body.get("recommendedResult").and_then(Value::as_array) {
            let items: Vec<RelevanceItem> = items.iter().filter_map(parse_result_item).collect();
            if !items.is_empty() {
                sources.push(RelevanceSource::ResultList(items));
            }
        }

        if let Some(models) = body.get("models").and_then(Value::as_object) {
            sources.push(RelevanceSource::ExplicitModels(parse_engine_maps(models.iter())));
        }

        let eval = body
            .get("_eval")
            .and_then(Value::as_object)
            .map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|(engine, block)| {
                        let block = block.as_object()?;
                        Some((
                            engine.clone(),
                            EvalLists {
                                recommended_trip_ids: parse_id_list(block, "recommendedTripIds"),
                                relevant_trip_ids: parse_id_list(block, "relevantTripIds"),
                                all_candidate_trip_ids: parse_id_list(block, "allCandidateTripIds"),
                            },
                        ))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            user_id: parse_user_id(body),
            sources,
            eval,
        }
    }

    /// Folds every relevance source into one matrix, honoring precedence
    pub fn relevance(&self) -> RelevanceMatrix {
        let mut ordered: Vec<&RelevanceSource> = self.sources.iter().collect();
        ordered.sort_by_key(|source| source.precedence());

        let mut matrix = RelevanceMatrix::new();
        for source in ordered {
            source.apply(&mut matrix);
        }
        matrix
    }

    pub fn relevance_records(
        &self,
        user_id: &str,
        received_at: DateTime<Utc>,
    ) -> Vec<RelevanceRecord> {
        self.relevance()
            .into_iter()
            .flat_map(|(model, trips)| {
                trips.into_iter().map(move |(trip_id, value)| RelevanceRecord {
                    user_id: user_id.to_string(),
                    model: model.clone(),
                    trip_id,
                    value,
                    received_at,
                })
            })
            .collect()
    }

    pub fn eval_records(&self, user_id: &str, received_at: DateTime<Utc>) -> Vec<EvalRecord> {
        let mut records = Vec::new();
        for (model, lists) in &self.eval {
            let by_kind = [
                (EvalKind::Recommended, &lists.recommended_trip_ids),
                (EvalKind::Relevant, &lists.relevant_trip_ids),
                (EvalKind::Candidate, &lists.all_candidate_trip_ids),
            ];
            for (kind, trip_ids) in by_kind {
                records.extend(trip_ids.iter().map(|trip_id| EvalRecord {
                    user_id: user_id.to_string(),
                    model: model.clone(),
                    trip_id: trip_id.clone(),
                    kind,
                    received_at,
                }));
            }
        }
        records
    }
}

/// What a feedback write produced
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReceipt {
    pub ok: bool,
    pub wrote: usize,
    pub relevance_file: String,
    pub wrote_eval_rows: usize,
    pub eval_file: Option<String>,
}

/// Normalizes a feedback body and appends it to the user's logs
pub async fn record_feedback(log: &FeedbackLog, body: &Value) -> AppResult<FeedbackReceipt> {
    let payload = FeedbackPayload::parse(body);
    let user_id = payload
        .user_id
        .clone()
        .ok_or_else(|| AppError::InvalidInput("userId required".to_string()))?;

    let received_at = Utc::now();
    let relevance = payload.relevance_records(&user_id, received_at);
    let evals = payload.eval_records(&user_id, received_at);

    let relevance_file = log.append_relevance(&user_id, &relevance).await?;
    let eval_file = log.append_eval(&user_id, &evals).await?;

    tracing::info!(
        user_id = %user_id,
        relevance_rows = relevance.len(),
        eval_rows = evals.len(),
        "Feedback recorded"
    );

    Ok(FeedbackReceipt {
        ok: true,
        wrote: relevance.len(),
        relevance_file: relevance_file.display().to_string(),
        wrote_eval_rows: evals.len(),
        eval_file: eval_file.map(|path| path.display().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_explicit_models_win_over_other_shapes() {
        let body = json!({
            "userId": "u1",
            "x": { "1": 0 },
            "recommendedResult": [{ "engine": "x", "tripId": "1", "relevant": 1 }],
            "models": { "x": { "1": 1 } }
        });

        let payload = FeedbackPayload::parse(&body);
        assert_eq!(payload.sources.len(), 3);
        assert_eq!(payload.relevance()["x"]["1"], 1);
    }

    #[test]
    fn test_result_list_overrides_engine_maps() {
        let body = json!({
            "userId": "u1",
            "x": { "1": 1, "2": 1 },
            "recommendedResult": [{ "engine": "x", "tripId": "1", "relevant": false }]
        });

        let matrix = FeedbackPayload::parse(&body).relevance();
        assert_eq!(matrix["x"]["1"], 0);
        assert_eq!(matrix["x"]["2"], 1);
    }

    #[test]
    fn test_precedence_does_not_depend_on_source_order() {
        let payload = FeedbackPayload {
            user_id: Some("u1".to_string()),
            sources: vec![
                RelevanceSource::ExplicitModels(BTreeMap::from([(
                    "x".to_string(),
                    BTreeMap::from([("1".to_string(), 1)]),
                )])),
                RelevanceSource::ResultList(vec![RelevanceItem {
                    engine: "x".to_string(),
                    trip_id: "1".to_string(),
                    value: 0,
                }]),
            ],
            eval: BTreeMap::new(),
        };

        assert_eq!(payload.relevance()["x"]["1"], 1);
    }

    #[test]
    fn test_engine_maps_only() {
        let body = json!({
            "userId": "u1",
            "contentBased": { "a": true, "b": 0, "c": "yes", "d": null },
            "popular": { "a": 1 },
            "notAnEngine": ["a", "b"],
            "alsoNot": 5
        });

        let matrix = FeedbackPayload::parse(&body).relevance();
        assert_eq!(matrix.len(), 2);
        assert_eq!(
            matrix["contentBased"],
            BTreeMap::from([
                ("a".to_string(), 1),
                ("b".to_string(), 0),
                ("c".to_string(), 1),
                ("d".to_string(), 0),
            ])
        );
    }

    #[test]
    fn test_result_list_field_fallbacks() {
        let body = json!({
            "userId": "u1",
            "recommendedResult": [
                { "engineType": "cf", "engine": "ignored", "id": 42, "relevant": 1 },
                { "model": "pop", "_id": { "$oid": "abc" }, "relevant": true },
                { "engine": "", "tripId": "t3" },
                { "engine": "cf" },
                { "engine": "cf", "tripId": "" },
                null
            ]
        });

        let payload = FeedbackPayload::parse(&body);
        let RelevanceSource::ResultList(items) = &payload.sources[0] else {
            panic!("expected a result list");
        };
        assert_eq!(
            items,
            &vec![
                RelevanceItem { engine: "cf".to_string(), trip_id: "42".to_string(), value: 1 },
                RelevanceItem { engine: "pop".to_string(), trip_id: "abc".to_string(), value: 1 },
                RelevanceItem {
                    engine: DEFAULT_ENGINE.to_string(),
                    trip_id: "t3".to_string(),
                    value: 0,
                },
            ]
        );
    }

    #[test]
    fn test_user_id_resolution() {
        let cases = [
            (json!({ "userId": "abc" }), Some("abc")),
            (json!({ "userId": 7 }), Some("7")),
            (json!({ "user": "plain" }), Some("plain")),
            (json!({ "user": { "_id": "obj" } }), Some("obj")),
            (json!({ "user": { "id": "first", "_id": "second" } }), Some("first")),
            (json!({ "userId": null, "user": "fallback" }), Some("fallback")),
            (json!({ "userId": "" }), None),
            (json!({}), None),
            (json!("not an object"), None),
        ];

        for (body, expected) in cases {
            assert_eq!(
                FeedbackPayload::parse(&body).user_id.as_deref(),
                expected,
                "body: {body}"
            );
        }
    }

    #[test]
    fn test_eval_sidecar_is_independent_of_relevance() {
        let body = json!({
            "userId": "u1",
            "_eval": {
                "cf": {
                    "recommendedTripIds": ["a", "b"],
                    "relevantTripIds": [1],
                    "allCandidateTripIds": ["a", "b", "c"]
                },
                "broken": "nope"
            }
        });

        let payload = FeedbackPayload::parse(&body);
        assert!(payload.relevance().is_empty());
        assert_eq!(payload.eval.len(), 1);

        let records = payload.eval_records("u1", Utc::now());
        let summary: Vec<(&str, EvalKind)> = records
            .iter()
            .map(|r| (r.trip_id.as_str(), r.kind))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("a", EvalKind::Recommended),
                ("b", EvalKind::Recommended),
                ("1", EvalKind::Relevant),
                ("a", EvalKind::Candidate),
                ("b", EvalKind::Candidate),
                ("c", EvalKind::Candidate),
            ]
        );
    }

    #[test]
    fn test_relevance_records_carry_user_and_timestamp() {
        let body = json!({ "userId": "u1", "models": { "x": { "1": 1, "2": 0 } } });
        let now = Utc::now();
        let records = FeedbackPayload::parse(&body).relevance_records("u1", now);

        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|r| r.user_id == "u1" && r.model == "x" && r.received_at == now));
        assert_eq!(records[0].value, 1);
        assert_eq!(records[1].value, 0);
    }

    #[tokio::test]
    async fn test_record_feedback_requires_user_id() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = FeedbackLog::new(dir.path());

        let err = record_feedback(&log, &json!({ "models": { "x": { "1": 1 } } }))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_record_feedback_without_data_writes_zero_rows() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = FeedbackLog::new(dir.path());

        let receipt = record_feedback(&log, &json!({ "userId": "u1" })).await.unwrap();
        assert!(receipt.ok);
        assert_eq!(receipt.wrote, 0);
        assert_eq!(receipt.wrote_eval_rows, 0);
        assert_eq!(receipt.eval_file, None);
    }
}
