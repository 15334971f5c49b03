use reqwest::{header::CONTENT_TYPE, Client as HttpClient};
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::PreferenceProfile,
};

/// External trip recommender
///
/// Responses are passed through to the client untouched, so they stay as raw JSON.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(&self, profile: &PreferenceProfile) -> AppResult<Value>;
}

/// Recommender reached over HTTP at `POST {base_url}/recommend`
#[derive(Clone)]
pub struct HttpRecommender {
    http_client: HttpClient,
    base_url: String,
}

impl HttpRecommender {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl Recommender for HttpRecommender {
    async fn recommend(&self, profile: &PreferenceProfile) -> AppResult<Value> {
        let url = format!("{}/recommend", self.base_url.trim_end_matches('/'));

        let response = self.http_client.post(&url).json(profile).send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                user_id = %profile.user_id,
                status = %status,
                body = %body,
                "Recommender request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Recommender HTTP {}",
                status.as_u16()
            )));
        }

        if !content_type.contains("application/json") {
            tracing::error!(
                user_id = %profile.user_id,
                content_type = %content_type,
                body = %body,
                "Recommender returned non-JSON"
            );
            return Err(AppError::ExternalApi(
                "Recommender did not return JSON".to_string(),
            ));
        }

        let recommendations: Value = serde_json::from_str(&body).map_err(|e| {
            AppError::ExternalApi(format!("Failed to parse recommender response: {}", e))
        })?;

        tracing::info!(user_id = %profile.user_id, "Recommendations received");

        Ok(recommendations)
    }
}
