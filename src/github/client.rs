use async_trait::async_trait;
use color_eyre::eyre::eyre;
use octocrab::Octocrab;
use tracing::debug;

use crate::github::{Issue, IssueBatch, IssueSearcher, ReadmeFetcher, RepoId};

/// Octocrab-backed implementation of the provider traits.
pub struct GithubClient {
    inner: Octocrab,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> color_eyre::Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }
        Ok(Self {
            inner: builder.build()?,
        })
    }
}

#[async_trait]
impl IssueSearcher for GithubClient {
    async fn search(
        &self,
        repo: &RepoId,
        term: &str,
        page: u32,
        per_page: u8,
    ) -> color_eyre::Result<IssueBatch> {
        let query = format!("repo:{repo} is:issue is:open {term}");
        debug!(%query, page, "searching issues");

        let results = self
            .inner
            .search()
            .issues_and_pull_requests(&query)
            .sort("created")
            .order("desc")
            .per_page(per_page)
            .page(page)
            .send()
            .await?;

        let last_page = results.number_of_pages().unwrap_or(1).max(1);
        let issues = results
            .items
            .into_iter()
            .map(|item| Issue {
                number: u64::try_from(item.number).unwrap_or_default(),
                title: item.title,
                body: item.body.unwrap_or_default(),
                author: item.user.login,
                created_at: item.created_at,
            })
            .collect();

        Ok(IssueBatch { issues, last_page })
    }
}

#[async_trait]
impl ReadmeFetcher for GithubClient {
    async fn readme(&self, repo: &RepoId) -> color_eyre::Result<String> {
        debug!(repo = %repo, "fetching readme");

        let contents = self
            .inner
            .repos(&repo.owner, &repo.name)
            .get_content()
            .path("README.md")
            .send()
            .await?;

        contents
            .items
            .into_iter()
            .next()
            .and_then(|item| item.decoded_content())
            .ok_or_else(|| eyre!("{repo} has no decodable README.md"))
    }
}
