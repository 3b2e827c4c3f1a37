pub mod client;
pub mod types;

pub use client::TwitterClient;
pub use types::{
    ApiError, ApiResponse, PageMeta, ReferenceKind, ReferencedTweet, Tweet, TweetPublicMetrics,
    User, UserPublicMetrics,
};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::Result;

pub const DEFAULT_USER_FIELDS: &[&str] = &["protected", "public_metrics"];
pub const DEFAULT_TWEET_FIELDS: &[&str] =
    &["source", "referenced_tweets", "public_metrics", "created_at"];

/// Query parameters for `GET /2/users/:id/tweets`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineParams {
    pub max_results: u32,
    pub since_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub tweet_fields: Vec<String>,
    pub pagination_token: Option<String>,
}

impl TimelineParams {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![("max_results".to_string(), self.max_results.to_string())];
        if let Some(since_id) = &self.since_id {
            query.push(("since_id".to_string(), since_id.clone()));
        }
        if let Some(start_time) = &self.start_time {
            query.push((
                "start_time".to_string(),
                start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        if !self.tweet_fields.is_empty() {
            query.push(("tweet.fields".to_string(), self.tweet_fields.join(",")));
        }
        if let Some(token) = &self.pagination_token {
            query.push(("pagination_token".to_string(), token.clone()));
        }
        query
    }
}

/// Read-only Twitter API surface the dumper depends on.
#[async_trait]
pub trait TwitterApi: Send + Sync {
    async fn user_by_username(
        &self,
        username: &str,
        user_fields: &[String],
    ) -> Result<ApiResponse<User>>;

    async fn user_timeline(
        &self,
        user_id: &str,
        params: &TimelineParams,
    ) -> Result<ApiResponse<Vec<Tweet>>>;
}
