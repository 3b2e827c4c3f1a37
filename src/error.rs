//! Error types shared by every stage of a dump run.

use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum Error {
    /// Missing credential or invalid run parameters
    #[error("configuration error: {0}")]
    Config(String),

    /// Username lookup failed
    #[error("failed to resolve user `{username}`: {}", describe(.errors))]
    Resolution {
        username: String,
        errors: Vec<ApiError>,
    },

    /// A timeline page came back with upstream errors
    #[error("timeline fetch failed: {}", describe(.errors))]
    Fetch { errors: Vec<ApiError> },

    /// Reading or writing a dump file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success status whose body was not a Twitter error document
    #[error("Twitter API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
}

impl Error {
    pub(crate) fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            errors: vec![ApiError::message(message)],
        }
    }
}

fn describe(errors: &[ApiError]) -> String {
    if errors.is_empty() {
        return "no detail returned".to_string();
    }
    errors
        .iter()
        .map(ApiError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, Error>;
