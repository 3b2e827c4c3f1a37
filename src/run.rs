use crate::api::{TwitterApi, User};
use crate::config::RunConfig;
use crate::error::Result;
use crate::output::OutputWriter;
use crate::paginator::PaginationDriver;
use crate::resolver::UserResolver;
use std::path::{Path, PathBuf};
use tracing::info;

/// User-facing progress lines of a dump run.
pub trait Progress {
    fn tick(&mut self, counter: usize);
    fn protected(&mut self, user: &User);
    fn done(&mut self, path: &Path, posts: usize);
}

/// Prints progress to stdout.
pub struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn tick(&mut self, counter: usize) {
        println!("Tick {}", counter);
    }

    fn protected(&mut self, _user: &User) {
        println!("Tweets are protected. Exiting.");
    }

    fn done(&mut self, _path: &Path, _posts: usize) {
        println!("Done");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Account is protected; nothing fetched, nothing written
    Protected { username: String },
    Written {
        path: PathBuf,
        posts: usize,
        fetches: usize,
    },
}

/// Resolve, paginate, write. Errors abort the run and nothing is written.
pub async fn run<A, P>(api: &A, config: &RunConfig, progress: &mut P) -> Result<RunOutcome>
where
    A: TwitterApi + ?Sized,
    P: Progress,
{
    config.validate()?;

    let user = UserResolver::new(api)
        .resolve(&config.username, &config.user_fields)
        .await?;
    if user.protected {
        info!(username = %user.username, "account is protected, skipping");
        progress.protected(&user);
        return Ok(RunOutcome::Protected {
            username: user.username,
        });
    }

    let outcome = PaginationDriver::new(api, config.ceiling, config.cap_policy)
        .run(&user.id, config.fetch_options(), |n| progress.tick(n))
        .await?;

    let path = config.output_path()?;
    OutputWriter::new(config.raw_output_path())
        .write(&path, &outcome.timeline)
        .await?;
    progress.done(&path, outcome.timeline.len());

    Ok(RunOutcome::Written {
        path,
        posts: outcome.timeline.len(),
        fetches: outcome.fetches,
    })
}
