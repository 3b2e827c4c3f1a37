use anyhow::{Context, Result};
use chrono::Utc;
use chrono_tz::Tz;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tweetdump::api::TwitterClient;
use tweetdump::cli::{Cli, Command, FetchArgs, StatsArgs};
use tweetdump::config::{bearer_token_from_env, RunConfig};
use tweetdump::output::{read_timeline, to_pretty_json};
use tweetdump::run::{run, ConsoleProgress, RunOutcome};
use tweetdump::stats;

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        command,
        fetch,
        verbose,
    } = Cli::parse();

    init_tracing(verbose);

    match command.unwrap_or(Command::Fetch(fetch)) {
        Command::Fetch(args) => fetch_timeline(args).await,
        Command::Stats(args) => print_stats(args),
    }
}

/// Logs go to stderr; stdout carries only the progress lines.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn fetch_timeline(args: FetchArgs) -> Result<()> {
    let token = bearer_token_from_env()?;

    let mut config = RunConfig::load(args.config.as_deref())?;
    args.apply(&mut config, Utc::now())?;
    config.validate()?;

    let client = TwitterClient::new(token, &config.api_url, config.timeout())
        .context("failed to build HTTP client")?;

    match run(&client, &config, &mut ConsoleProgress).await? {
        RunOutcome::Protected { username } => {
            tracing::info!(%username, "nothing written");
        }
        RunOutcome::Written {
            path,
            posts,
            fetches,
        } => {
            tracing::info!(path = %path.display(), posts, fetches, "run complete");
        }
    }
    Ok(())
}

fn print_stats(args: StatsArgs) -> Result<()> {
    let tz: Tz = args
        .timezone
        .parse()
        .map_err(|e| anyhow::anyhow!("unknown timezone `{}`: {}", args.timezone, e))?;

    let timelines = args
        .files
        .iter()
        .map(|path| read_timeline(path).with_context(|| format!("loading {}", path.display())))
        .collect::<Result<Vec<_>>>()?;
    let posts = stats::merge(timelines);
    let report = stats::analyze(&posts, tz, args.top);

    if args.json {
        let bytes = to_pretty_json(&report)?;
        println!("{}", String::from_utf8_lossy(&bytes));
    } else {
        print!("{}", stats::render(&report, tz));
    }
    Ok(())
}
