// src/github/search.rs
// =============================================================================
// This module counts pull requests and issues through the GitHub search API.
//
// Strategy:
// - Build one search query per statistic, scoped with `repo:<owner>/<name>`
// - Ask for a single result per page; we only read `total_count`
// - Run the queries for one repository at the same time with join!
//
// Two query modes:
// - Standard: merged PRs, open PRs and issues opened by a fixed author
// - Organization: for one sentinel owner we count closed and open PRs that
//   mention a search token instead, and issues are always zero
//
// Failures are best-effort. A query that fails (network, rate limit, bad
// JSON) is logged and counted as zero. It never reaches the caller.
// =============================================================================

use anyhow::{Context, Result};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use url::Url;

use super::repo::RepoRef;

const USER_AGENT: &str = concat!("readme-stats/", env!("CARGO_PKG_VERSION"));

/// PR and issue counts for one repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepoStats {
    pub merged_prs: u64,
    pub open_prs: u64,
    pub issues: u64,
}

// Something that can produce stats for a repository.
//
// The line rewriter only depends on this trait, so tests can hand it fixed
// numbers instead of talking to GitHub.
#[allow(async_fn_in_trait)]
pub trait StatsSource {
    async fn repo_stats(&self, repo: &RepoRef) -> RepoStats;
}

// Who we count contributions for, and which owner gets the special search
#[derive(Debug, Clone)]
pub struct StatsPolicy {
    /// GitHub login used in `author:` qualifiers
    pub author: String,
    /// Owner that switches to organization mode
    pub sentinel_org: String,
    /// Free-text token searched for in organization mode
    pub org_search: String,
}

/// Which set of queries to run for a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsMode<'a> {
    Standard { author: &'a str },
    Organization { search: &'a str },
}

impl<'a> StatsMode<'a> {
    /// Organization mode only when the owner is exactly the sentinel org
    pub fn for_owner(owner: &str, policy: &'a StatsPolicy) -> Self {
        if owner == policy.sentinel_org {
            StatsMode::Organization {
                search: &policy.org_search,
            }
        } else {
            StatsMode::Standard {
                author: &policy.author,
            }
        }
    }
}

// Which statistic a query is for (used in log lines)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    MergedPrs,
    OpenPrs,
    Issues,
    ClosedOrgPrs,
    OpenOrgPrs,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QueryKind::MergedPrs => "merged PRs",
            QueryKind::OpenPrs => "open PRs",
            QueryKind::Issues => "issues",
            QueryKind::ClosedOrgPrs => "organization closed PRs",
            QueryKind::OpenOrgPrs => "organization open PRs",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub kind: QueryKind,
    pub q: String,
}

// Queries for a standard repository: [merged, open, issues]
pub fn standard_queries(repo: &RepoRef, author: &str) -> [SearchQuery; 3] {
    let slug = repo.slug();
    [
        SearchQuery {
            kind: QueryKind::MergedPrs,
            q: format!("repo:{slug} is:pr is:merged author:{author}"),
        },
        SearchQuery {
            kind: QueryKind::OpenPrs,
            q: format!("repo:{slug} is:pr is:open author:{author}"),
        },
        SearchQuery {
            kind: QueryKind::Issues,
            q: format!("repo:{slug} is:issue author:{author}"),
        },
    ]
}

// Queries for a sentinel-org repository: [closed, open]
pub fn organization_queries(repo: &RepoRef, search: &str) -> [SearchQuery; 2] {
    let slug = repo.slug();
    [
        SearchQuery {
            kind: QueryKind::ClosedOrgPrs,
            q: format!(r#"repo:{slug} is:pr is:closed "{search}""#),
        },
        SearchQuery {
            kind: QueryKind::OpenOrgPrs,
            q: format!(r#"repo:{slug} is:pr is:open "{search}""#),
        },
    ]
}

// Outcome of a single search, decided right where the HTTP call is made.
// A failed search counts as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryCount {
    Found(u64),
    Failed,
}

impl QueryCount {
    pub fn value(self) -> u64 {
        match self {
            QueryCount::Found(count) => count,
            QueryCount::Failed => 0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("GitHub returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("could not decode search response: {0}")]
    Decode(#[source] reqwest::Error),
}

// The only field we need from /search/issues
#[derive(Debug, Deserialize)]
struct SearchResponse {
    total_count: u64,
}

/// HTTP client for the issue/PR search endpoint
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    endpoint: Url,
    token: Option<String>,
    policy: StatsPolicy,
}

impl SearchClient {
    // Creates a client for the API rooted at `api_base`
    //
    // `api_base` may carry a path prefix (GitHub Enterprise uses /api/v3),
    // so we make sure it ends in a slash before joining.
    pub fn new(api_base: &Url, token: Option<String>, policy: StatsPolicy) -> Result<Self> {
        let mut base = api_base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join("search/issues")
            .with_context(|| format!("invalid API base URL: {api_base}"))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            token,
            policy,
        })
    }

    // Runs one search and returns its total match count
    async fn total_count(&self, q: &str) -> Result<u64, SearchError> {
        let mut request = self
            .client
            .get(self.endpoint.clone())
            .query(&[("q", q), ("per_page", "1")])
            .header(header::ACCEPT, "application/vnd.github+json");

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(SearchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status { status, body });
        }

        let body: SearchResponse = response.json().await.map_err(SearchError::Decode)?;
        Ok(body.total_count)
    }

    // Best-effort wrapper around total_count: logs and swallows failures
    async fn count(&self, repo: &RepoRef, query: &SearchQuery) -> QueryCount {
        debug!(q = %query.q, "searching");

        match self.total_count(&query.q).await {
            Ok(count) => QueryCount::Found(count),
            Err(e) => {
                warn!(
                    owner = %repo.owner,
                    repo = %repo.name,
                    query = %query.kind,
                    error = %e,
                    "error fetching {} for {}", query.kind, repo
                );
                QueryCount::Failed
            }
        }
    }
}

impl StatsSource for SearchClient {
    async fn repo_stats(&self, repo: &RepoRef) -> RepoStats {
        match StatsMode::for_owner(&repo.owner, &self.policy) {
            StatsMode::Standard { author } => {
                let [merged, open, issues] = standard_queries(repo, author);
                let (merged, open, issues) = futures::join!(
                    self.count(repo, &merged),
                    self.count(repo, &open),
                    self.count(repo, &issues)
                );

                RepoStats {
                    merged_prs: merged.value(),
                    open_prs: open.value(),
                    issues: issues.value(),
                }
            }
            StatsMode::Organization { search } => {
                let [closed, open] = organization_queries(repo, search);
                let (closed, open) =
                    futures::join!(self.count(repo, &closed), self.count(repo, &open));

                // Closed PRs stand in for merged ones here
                RepoStats {
                    merged_prs: closed.value(),
                    open_prs: open.value(),
                    issues: 0,
                }
            }
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does futures::join! do?
//    - Polls several futures at once and waits until all are done
//    - Like Promise.all(), but each result keeps its own type
//
// 2. Why does count() return QueryCount instead of Result?
//    - The decision "failed means zero" is made right here, next to the HTTP
//      call, so nothing above this module ever sees a search error
// -----------------------------------------------------------------------------
