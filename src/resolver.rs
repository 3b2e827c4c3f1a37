use crate::api::{TwitterApi, User};
use crate::error::{Error, Result};
use tracing::{debug, info};

/// Drops surrounding whitespace and a leading `@`.
pub fn normalize_username(raw: &str) -> &str {
    raw.trim().trim_start_matches('@')
}

/// Looks up a profile by username.
pub struct UserResolver<'a, A: TwitterApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: TwitterApi + ?Sized> UserResolver<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    pub async fn resolve(&self, username: &str, fields: &[String]) -> Result<User> {
        let username = normalize_username(username);
        if username.is_empty() {
            return Err(Error::Resolution {
                username: String::new(),
                errors: Vec::new(),
            });
        }

        debug!(username, ?fields, "resolving user");
        let mut response = self.api.user_by_username(username, fields).await?;

        if let Some(errors) = response.take_errors() {
            return Err(Error::Resolution {
                username: username.to_string(),
                errors,
            });
        }

        let user = response.data.ok_or_else(|| Error::Resolution {
            username: username.to_string(),
            errors: Vec::new(),
        })?;

        info!(
            id = %user.id,
            username = %user.username,
            protected = user.protected,
            "resolved user"
        );
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ApiResponse, TimelineParams, Tweet};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeProfiles {
        response: ApiResponse<User>,
        seen: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl FakeProfiles {
        fn new(response: ApiResponse<User>) -> Self {
            Self {
                response,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TwitterApi for FakeProfiles {
        async fn user_by_username(
            &self,
            username: &str,
            user_fields: &[String],
        ) -> Result<ApiResponse<User>> {
            self.seen
                .lock()
                .unwrap()
                .push((username.to_string(), user_fields.to_vec()));
            Ok(self.response.clone())
        }

        async fn user_timeline(
            &self,
            _user_id: &str,
            _params: &TimelineParams,
        ) -> Result<ApiResponse<Vec<Tweet>>> {
            panic!("resolver must not fetch timelines");
        }
    }

    fn user(protected: bool) -> User {
        User {
            id: "42".to_string(),
            username: "alice".to_string(),
            name: None,
            protected,
            public_metrics: None,
        }
    }

    #[tokio::test]
    async fn test_resolve_returns_user() {
        let api = FakeProfiles::new(ApiResponse {
            data: Some(user(false)),
            meta: None,
            errors: None,
        });
        let fields = vec!["protected".to_string()];
        let resolved = UserResolver::new(&api).resolve("@alice", &fields).await.unwrap();
        assert_eq!(resolved.id, "42");
        assert_eq!(
            api.seen.lock().unwrap()[0],
            ("alice".to_string(), vec!["protected".to_string()])
        );
    }

    #[tokio::test]
    async fn test_resolve_keeps_protected_flag() {
        let api = FakeProfiles::new(ApiResponse {
            data: Some(user(true)),
            meta: None,
            errors: None,
        });
        let resolved = UserResolver::new(&api).resolve("alice", &[]).await.unwrap();
        assert!(resolved.protected);
    }

    #[tokio::test]
    async fn test_resolve_upstream_errors() {
        let api = FakeProfiles::new(ApiResponse {
            data: None,
            meta: None,
            errors: Some(vec![ApiError {
                title: Some("Not Found Error".to_string()),
                ..ApiError::default()
            }]),
        });
        let err = UserResolver::new(&api).resolve("ghost", &[]).await.unwrap_err();
        match err {
            Error::Resolution { username, errors } => {
                assert_eq!(username, "ghost");
                assert_eq!(errors[0].title.as_deref(), Some("Not Found Error"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_empty_username() {
        let api = FakeProfiles::new(ApiResponse {
            data: Some(user(false)),
            meta: None,
            errors: None,
        });
        let err = UserResolver::new(&api).resolve("  ", &[]).await.unwrap_err();
        assert!(matches!(err, Error::Resolution { .. }));
        assert!(api.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_missing_data() {
        let api = FakeProfiles::new(ApiResponse {
            data: None,
            meta: None,
            errors: None,
        });
        let err = UserResolver::new(&api).resolve("alice", &[]).await.unwrap_err();
        assert!(matches!(err, Error::Resolution { .. }));
    }
}
