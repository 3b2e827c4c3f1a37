use super::{ApiError, ApiResponse, TimelineParams, Tweet, TwitterApi, User};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

pub const TWITTER_API_BASE: &str = "https://api.twitter.com";

/// Bearer-authenticated, read-only v2 client. No retries.
pub struct TwitterClient {
    bearer_token: String,
    base_url: String,
    client: reqwest::Client,
}

impl TwitterClient {
    pub fn new(bearer_token: String, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tweetdump/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            bearer_token,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(String, String)],
    ) -> Result<ApiResponse<T>> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, params = query.len(), "Twitter API request");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            return Ok(serde_json::from_slice(&bytes)?);
        }

        debug!(status = status.as_u16(), "Twitter API returned an error status");
        match error_body(status.as_u16(), &bytes) {
            ErrorBody::Errors(errors) => Ok(ApiResponse {
                data: None,
                meta: None,
                errors: Some(errors),
            }),
            ErrorBody::Opaque(e) => Err(e),
        }
    }
}

enum ErrorBody {
    Errors(Vec<ApiError>),
    Opaque(Error),
}

/// Non-2xx bodies come either as a v2 envelope with `errors` or as a single
/// problem document (`title`/`detail`/`type`).
fn error_body(status: u16, bytes: &[u8]) -> ErrorBody {
    if let Ok(mut envelope) = serde_json::from_slice::<ApiResponse<serde_json::Value>>(bytes) {
        if let Some(errors) = envelope.take_errors() {
            return ErrorBody::Errors(errors);
        }
    }
    if let Ok(problem) = serde_json::from_slice::<ApiError>(bytes) {
        if problem.title.is_some() || problem.detail.is_some() {
            return ErrorBody::Errors(vec![problem]);
        }
    }
    ErrorBody::Opaque(Error::Api {
        status,
        body: String::from_utf8_lossy(bytes).into_owned(),
    })
}

#[async_trait]
impl TwitterApi for TwitterClient {
    #[instrument(skip(self, user_fields))]
    async fn user_by_username(
        &self,
        username: &str,
        user_fields: &[String],
    ) -> Result<ApiResponse<User>> {
        let mut query = Vec::new();
        if !user_fields.is_empty() {
            query.push(("user.fields".to_string(), user_fields.join(",")));
        }
        let endpoint = format!("/2/users/by/username/{}", urlencoding::encode(username));
        self.get(&endpoint, &query).await
    }

    #[instrument(skip(self, params), fields(token = ?params.pagination_token))]
    async fn user_timeline(
        &self,
        user_id: &str,
        params: &TimelineParams,
    ) -> Result<ApiResponse<Vec<Tweet>>> {
        let endpoint = format!("/2/users/{}/tweets", urlencoding::encode(user_id));
        self.get(&endpoint, &params.to_query()).await
    }
}
