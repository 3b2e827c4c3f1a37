use crate::api::{TimelineParams, TwitterApi};
use crate::error::{Error, Result};
use crate::timeline::Timeline;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Per-run timeline request options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Requested page width; the API accepts 5..=100
    pub max_results: u32,
    /// Exclude posts at or before this id
    pub since_id: Option<String>,
    /// Exclude posts created before this instant
    pub start_time: Option<DateTime<Utc>>,
    pub tweet_fields: Vec<String>,
}

impl FetchOptions {
    fn params(&self, pagination_token: Option<String>) -> TimelineParams {
        TimelineParams {
            max_results: self.max_results,
            since_id: self.since_id.clone(),
            start_time: self.start_time,
            tweet_fields: self.tweet_fields.clone(),
            pagination_token,
        }
    }
}

/// Inspectable pagination state handed from one fetch to the next.
#[derive(Debug, Clone)]
pub struct FetchSession {
    pub user_id: String,
    pub options: FetchOptions,
    pub timeline: Timeline,
    /// Posts received on the most recent page
    pub last_page_len: usize,
    pub pages: usize,
}

impl FetchSession {
    pub fn next_token(&self) -> Option<&str> {
        self.timeline.meta.next_token.as_deref()
    }
}

pub struct TimelineFetcher<'a, A: TwitterApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: TwitterApi + ?Sized> TimelineFetcher<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    pub async fn fetch_first_page(
        &self,
        user_id: &str,
        options: FetchOptions,
    ) -> Result<FetchSession> {
        let mut response = self
            .api
            .user_timeline(user_id, &options.params(None))
            .await?;
        if let Some(errors) = response.take_errors() {
            return Err(Error::Fetch { errors });
        }

        let data = response.data.unwrap_or_default();
        let meta = response.meta.unwrap_or_default();
        debug!(user_id, received = data.len(), next = ?meta.next_token, "first page");

        Ok(FetchSession {
            user_id: user_id.to_string(),
            last_page_len: data.len(),
            timeline: Timeline::from_page(data, meta),
            options,
            pages: 1,
        })
    }

    pub async fn fetch_next_page(&self, mut session: FetchSession) -> Result<FetchSession> {
        let token = session
            .timeline
            .meta
            .next_token
            .clone()
            .ok_or_else(|| Error::fetch("no next page to fetch"))?;

        let params = session.options.params(Some(token));
        let mut response = self.api.user_timeline(&session.user_id, &params).await?;
        if let Some(errors) = response.take_errors() {
            return Err(Error::Fetch { errors });
        }

        let data = response.data.unwrap_or_default();
        let meta = response.meta.unwrap_or_default();
        debug!(
            page = session.pages + 1,
            received = data.len(),
            next = ?meta.next_token,
            "next page"
        );

        session.last_page_len = data.len();
        session.timeline.append_page(data, meta);
        session.pages += 1;
        Ok(session)
    }
}
