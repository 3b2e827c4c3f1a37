//! Dump a user's Twitter timeline to a JSON file.
//!
//! A run resolves the username, refuses protected accounts, walks the user
//! timeline page by page until the continuation token runs out or the
//! configured ceiling is reached, and writes everything in one go.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod output;
pub mod paginator;
pub mod resolver;
pub mod run;
pub mod stats;
pub mod timeline;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
