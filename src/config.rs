use crate::api::client::TWITTER_API_BASE;
use crate::api::{DEFAULT_TWEET_FIELDS, DEFAULT_USER_FIELDS};
use crate::error::{Error, Result};
use crate::fetcher::FetchOptions;
use crate::output::next_output_path;
use crate::paginator::{CapPolicy, DEFAULT_CEILING};
use crate::resolver::normalize_username;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const BEARER_TOKEN_VAR: &str = "BEARER_TOKEN";

/// Parameters of one dump run. File values override defaults; CLI flags
/// override file values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub username: String,
    pub max_results: u32,
    /// Explicit output file; otherwise the next free `out-<user>_<n>.json` in `out_dir`
    pub out: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub since_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub save_raw: bool,
    pub raw_out: PathBuf,
    pub ceiling: usize,
    pub cap_policy: CapPolicy,
    pub user_fields: Vec<String>,
    pub tweet_fields: Vec<String>,
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            username: "nullluvsu".to_string(),
            max_results: 100,
            out: None,
            out_dir: PathBuf::from("./data"),
            since_id: Some("1514120256268419072".to_string()),
            start_time: None,
            save_raw: false,
            raw_out: PathBuf::from("./test.out.json"),
            ceiling: DEFAULT_CEILING,
            cap_policy: CapPolicy::PageAligned,
            user_fields: DEFAULT_USER_FIELDS.iter().map(|f| f.to_string()).collect(),
            tweet_fields: DEFAULT_TWEET_FIELDS.iter().map(|f| f.to_string()).collect(),
            api_url: TWITTER_API_BASE.to_string(),
            timeout_secs: 30,
        }
    }
}

impl RunConfig {
    /// Loads `path`, or the per-user config file when it exists, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(content)?;
        config.username = normalize_username(&config.username).to_string();
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !is_valid_username(&self.username) {
            return Err(Error::Config(format!(
                "invalid username `{}`: expected 1-15 letters, digits or underscores",
                self.username
            )));
        }
        if !(5..=100).contains(&self.max_results) {
            return Err(Error::Config(format!(
                "max_results must be between 5 and 100, got {}",
                self.max_results
            )));
        }
        if self.ceiling == 0 {
            return Err(Error::Config("ceiling must be positive".to_string()));
        }
        if let Some(since_id) = &self.since_id {
            if since_id.is_empty() || !since_id.chars().all(|c| c.is_ascii_digit()) {
                return Err(Error::Config(format!(
                    "since_id must be a numeric post id, got `{}`",
                    since_id
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_string()));
        }
        if self.api_url.trim().is_empty() {
            return Err(Error::Config("api_url must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn output_path(&self) -> Result<PathBuf> {
        match &self.out {
            Some(out) => Ok(out.clone()),
            None => next_output_path(&self.out_dir, &self.username),
        }
    }

    pub fn raw_output_path(&self) -> Option<PathBuf> {
        self.save_raw.then(|| self.raw_out.clone())
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            max_results: self.max_results,
            since_id: self.since_id.clone(),
            start_time: self.start_time,
            tweet_fields: self.tweet_fields.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tweetdump").join("config.toml"))
}

/// Reads the API credential from the process environment.
pub fn bearer_token_from_env() -> Result<String> {
    bearer_token(std::env::var(BEARER_TOKEN_VAR).ok())
}

fn bearer_token(value: Option<String>) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(Error::Config(format!(
            "bearer token not provided: set {}",
            BEARER_TOKEN_VAR
        ))),
    }
}

fn is_valid_username(username: &str) -> bool {
    (1..=15).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}
