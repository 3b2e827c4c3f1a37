use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::paginator::CapPolicy;
use crate::resolver::normalize_username;
use chrono::{DateTime, TimeDelta, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tweetdump",
    version,
    about = "Dump a user's Twitter timeline to JSON",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options for the default `fetch` action
    #[command(flatten)]
    pub fetch: FetchArgs,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a timeline and write it to disk (default)
    Fetch(FetchArgs),
    /// Summarize previously written dumps
    Stats(StatsArgs),
}

/// Every flag is optional so unset ones keep config-file or default values.
#[derive(Args, Debug, Default, Clone)]
pub struct FetchArgs {
    /// Account to dump
    #[arg(long)]
    pub username: Option<String>,

    /// Posts requested per page (5-100)
    #[arg(long)]
    pub max_results: Option<u32>,

    /// Output file [default: ./data/out-<username>_<n>.json]
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Only fetch posts newer than this post id
    #[arg(long, conflicts_with = "no_since_id")]
    pub since_id: Option<String>,

    /// Do not send a since id
    #[arg(long)]
    pub no_since_id: bool,

    /// Only fetch posts created at or after this RFC 3339 instant
    #[arg(long, conflicts_with = "lookback_days")]
    pub start_time: Option<DateTime<Utc>>,

    /// Only fetch posts from the last N days
    #[arg(long)]
    pub lookback_days: Option<f64>,

    /// Also write a copy to the raw output path
    #[arg(long)]
    pub save_raw: bool,

    /// Path of the raw copy [default: ./test.out.json]
    #[arg(long)]
    pub raw_out: Option<PathBuf>,

    /// Stop paginating once this many posts are counted [default: 3200]
    #[arg(long)]
    pub ceiling: Option<usize>,

    /// Count received posts against the ceiling and cut the result to it
    #[arg(long)]
    pub exact_cap: bool,

    /// Config file [default: <config dir>/tweetdump/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// API base URL
    #[arg(long)]
    pub api_url: Option<String>,
}

impl FetchArgs {
    /// Overrides `config` with the flags that were given.
    pub fn apply(self, config: &mut RunConfig, now: DateTime<Utc>) -> Result<()> {
        if let Some(username) = self.username {
            config.username = normalize_username(&username).to_string();
        }
        if let Some(max_results) = self.max_results {
            config.max_results = max_results;
        }
        if self.out.is_some() {
            config.out = self.out;
        }
        if self.no_since_id {
            config.since_id = None;
        } else if self.since_id.is_some() {
            config.since_id = self.since_id;
        }
        if self.start_time.is_some() {
            config.start_time = self.start_time;
        }
        if let Some(days) = self.lookback_days {
            if !days.is_finite() || days <= 0.0 {
                return Err(Error::Config(format!(
                    "lookback_days must be positive, got {}",
                    days
                )));
            }
            config.start_time = Some(lookback_start(now, days)?);
        }
        if self.save_raw {
            config.save_raw = true;
        }
        if let Some(raw_out) = self.raw_out {
            config.raw_out = raw_out;
        }
        if let Some(ceiling) = self.ceiling {
            config.ceiling = ceiling;
        }
        if self.exact_cap {
            config.cap_policy = CapPolicy::Exact;
        }
        if let Some(api_url) = self.api_url {
            config.api_url = api_url;
        }
        Ok(())
    }
}

/// `now` minus `days`, or a config error when the instant is out of range.
fn lookback_start(now: DateTime<Utc>, days: f64) -> Result<DateTime<Utc>> {
    let seconds = days * 86_400.0;
    (seconds < i64::MAX as f64)
        .then(|| TimeDelta::try_seconds(seconds as i64))
        .flatten()
        .and_then(|delta| now.checked_sub_signed(delta))
        .ok_or_else(|| {
            Error::Config(format!(
                "lookback_days {} reaches before the earliest representable time",
                days
            ))
        })
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// Dump files, oldest run first
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// IANA timezone used for days and hours
    #[arg(long, default_value = "UTC")]
    pub timezone: String,

    /// Number of interaction partners to list
    #[arg(long, default_value_t = 15)]
    pub top: usize,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}
