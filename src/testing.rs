//! Scripted `TwitterApi` and fixtures shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{ApiError, ApiResponse, PageMeta, TimelineParams, Tweet, TwitterApi, User};
use crate::error::Result;

pub(crate) struct ScriptedApi {
    profile: ApiResponse<User>,
    pages: Mutex<VecDeque<ApiResponse<Vec<Tweet>>>>,
    pub profile_calls: AtomicUsize,
    pub looked_up: Mutex<Vec<String>>,
    pub timeline_calls: Mutex<Vec<(String, TimelineParams)>>,
}

impl ScriptedApi {
    pub fn new(profile: User, pages: Vec<ApiResponse<Vec<Tweet>>>) -> Self {
        Self {
            profile: ApiResponse {
                data: Some(profile),
                meta: None,
                errors: None,
            },
            pages: Mutex::new(pages.into()),
            profile_calls: AtomicUsize::new(0),
            looked_up: Mutex::new(Vec::new()),
            timeline_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn timeline_call_count(&self) -> usize {
        self.timeline_calls.lock().unwrap().len()
    }

    pub fn tokens_sent(&self) -> Vec<Option<String>> {
        self.timeline_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, p)| p.pagination_token.clone())
            .collect()
    }
}

#[async_trait]
impl TwitterApi for ScriptedApi {
    async fn user_by_username(
        &self,
        username: &str,
        _user_fields: &[String],
    ) -> Result<ApiResponse<User>> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.looked_up.lock().unwrap().push(username.to_string());
        Ok(self.profile.clone())
    }

    async fn user_timeline(
        &self,
        user_id: &str,
        params: &TimelineParams,
    ) -> Result<ApiResponse<Vec<Tweet>>> {
        self.timeline_calls
            .lock()
            .unwrap()
            .push((user_id.to_string(), params.clone()));
        let page = self
            .pages
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted page left");
        Ok(page)
    }
}

pub(crate) fn user(id: &str, username: &str, protected: bool) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        name: None,
        protected,
        public_metrics: None,
    }
}

/// `count` tweets with descending numeric ids starting at `newest`.
pub(crate) fn tweets(newest: u64, count: u64) -> Vec<Tweet> {
    (0..count)
        .map(|i| Tweet {
            id: (newest - i).to_string(),
            text: format!("post {}", newest - i),
            author_id: None,
            created_at: None,
            source: None,
            referenced_tweets: None,
            public_metrics: None,
        })
        .collect()
}

pub(crate) fn page_meta(count: u32, next: Option<&str>, newest: &str, oldest: &str) -> PageMeta {
    PageMeta {
        result_count: count,
        next_token: next.map(str::to_string),
        newest_id: Some(newest.to_string()),
        oldest_id: Some(oldest.to_string()),
    }
}

/// A successful page of `count` tweets starting at id `newest`.
pub(crate) fn page(newest: u64, count: u64, next: Option<&str>) -> ApiResponse<Vec<Tweet>> {
    let oldest = newest + 1 - count.max(1);
    ApiResponse {
        data: Some(tweets(newest, count)),
        meta: Some(page_meta(
            count as u32,
            next,
            &newest.to_string(),
            &oldest.to_string(),
        )),
        errors: None,
    }
}

pub(crate) fn error_page(detail: &str) -> ApiResponse<Vec<Tweet>> {
    ApiResponse {
        data: None,
        meta: None,
        errors: Some(vec![ApiError {
            title: Some("Invalid Request".to_string()),
            detail: Some(detail.to_string()),
            ..ApiError::default()
        }]),
    }
}
