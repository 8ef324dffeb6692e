//! GitHub data model and provider traits.
//!
//! The UI core only ever talks to [`IssueSearcher`] and [`ReadmeFetcher`];
//! the octocrab-backed implementation lives in [`client`].

mod client;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use color_eyre::eyre::eyre;

pub use client::GithubClient;

/// An issue as the dashboard needs it: enough for a list row and for the
/// rendered detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueBatch {
    pub issues: Vec<Issue>,
    /// Highest result-page number the provider reports for this query.
    pub last_page: u32,
}

/// A repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoId {
    type Err = color_eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(eyre!("repository must be given as OWNER/NAME, got {s:?}")),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Searches a repository's open issues.
#[async_trait]
pub trait IssueSearcher: Send + Sync {
    /// Fetch one result page. `page` is 1-based.
    async fn search(
        &self,
        repo: &RepoId,
        term: &str,
        page: u32,
        per_page: u8,
    ) -> color_eyre::Result<IssueBatch>;
}

/// Fetches a repository's README as raw markdown.
#[async_trait]
pub trait ReadmeFetcher: Send + Sync {
    async fn readme(&self, repo: &RepoId) -> color_eyre::Result<String>;
}
