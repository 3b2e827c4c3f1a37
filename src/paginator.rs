use crate::api::TwitterApi;
use crate::error::Result;
use crate::fetcher::{FetchOptions, FetchSession, TimelineFetcher};
use crate::timeline::Timeline;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Historical fetch limit of the user timeline endpoint.
pub const DEFAULT_CEILING: usize = 3200;

/// How the running counter is advanced against the ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapPolicy {
    /// Each follow-up fetch adds the requested page width; the first page is
    /// not counted. Output may overshoot the ceiling by up to one page.
    #[default]
    PageAligned,
    /// Counts posts actually received and truncates the result to the ceiling.
    Exact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    FetchingFirstPage,
    FetchingNextPage,
    Done,
}

#[derive(Debug)]
pub struct DriveOutcome {
    pub timeline: Timeline,
    pub fetched_count: usize,
    pub fetches: usize,
    pub state: DriverState,
}

/// Transition taken after every fetch.
pub fn next_state(next_token: Option<&str>, fetched_count: usize, ceiling: usize) -> DriverState {
    match next_token {
        Some(_) if fetched_count < ceiling => DriverState::FetchingNextPage,
        _ => DriverState::Done,
    }
}

pub struct PaginationDriver<'a, A: TwitterApi + ?Sized> {
    fetcher: TimelineFetcher<'a, A>,
    ceiling: usize,
    policy: CapPolicy,
}

impl<'a, A: TwitterApi + ?Sized> PaginationDriver<'a, A> {
    pub fn new(api: &'a A, ceiling: usize, policy: CapPolicy) -> Self {
        Self {
            fetcher: TimelineFetcher::new(api),
            ceiling,
            policy,
        }
    }

    /// Fetches pages one at a time until the token runs out or the counter
    /// reaches the ceiling. `on_tick` receives the counter before every
    /// follow-up fetch. Any fetch error discards everything gathered so far.
    pub async fn run<F>(
        &self,
        user_id: &str,
        options: FetchOptions,
        mut on_tick: F,
    ) -> Result<DriveOutcome>
    where
        F: FnMut(usize),
    {
        let page_width = options.max_results as usize;
        let mut fetched_count = 0;

        let mut session = self.fetcher.fetch_first_page(user_id, options).await?;
        if self.policy == CapPolicy::Exact {
            fetched_count += session.last_page_len;
        }
        let mut state = next_state(session.next_token(), fetched_count, self.ceiling);

        while state == DriverState::FetchingNextPage {
            on_tick(fetched_count);
            session = self.fetcher.fetch_next_page(session).await?;

            fetched_count += match self.policy {
                CapPolicy::PageAligned => page_width,
                CapPolicy::Exact => session.last_page_len,
            };
            state = self.after_next_page(&session, fetched_count);
        }

        let FetchSession {
            mut timeline,
            pages,
            ..
        } = session;
        if self.policy == CapPolicy::Exact {
            timeline.truncate(self.ceiling);
        }

        info!(
            pages,
            posts = timeline.len(),
            counter = fetched_count,
            ceiling = self.ceiling,
            "pagination finished"
        );

        Ok(DriveOutcome {
            timeline,
            fetched_count,
            fetches: pages,
            state,
        })
    }

    fn after_next_page(&self, session: &FetchSession, fetched_count: usize) -> DriverState {
        // An empty page under exact counting would never move the counter.
        if self.policy == CapPolicy::Exact && session.last_page_len == 0 {
            warn!(page = session.pages, "empty page with continuation token, stopping");
            return DriverState::Done;
        }
        next_state(session.next_token(), fetched_count, self.ceiling)
    }
}
