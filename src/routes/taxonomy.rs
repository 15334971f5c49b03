use axum::{extract::Query, Json};
use serde::Deserialize;

use crate::taxonomy::{search_tags, PredefinedTag, ThemePool, THEME_POOLS};

#[derive(Debug, Deserialize)]
pub struct TagQuery {
    #[serde(default)]
    q: String,
}

/// Handler for tag vocabulary search
pub async fn tags(Query(params): Query<TagQuery>) -> Json<Vec<&'static PredefinedTag>> {
    Json(search_tags(&params.q))
}

pub async fn pools() -> Json<&'static [ThemePool]> {
    Json(THEME_POOLS)
}
