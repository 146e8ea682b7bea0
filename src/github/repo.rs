// src/github/repo.rs
// =============================================================================
// This module turns a GitHub URL into an owner/name pair.
//
// Supported formats (anything containing the path segment is accepted):
//   - https://github.com/owner/repo
//   - https://github.com/owner/repo/tree/main/docs
//   - https://github.com/owner/repo?tab=readme
//   - https://github.com/owner/repo#install
//
// A URL without a `github.com/<owner>/<repo>` segment is not an error, it
// just isn't a repository link, so we return None and let the caller pass
// the line through.
// =============================================================================

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

// Owner is a run of non-slash characters; the repo name stops at the next
// `/`, `?` or `#`.
static REPO_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"github\.com/([^/]+)/([^/?#]+)").expect("valid regex"));

/// A repository reference parsed out of a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// The `owner/name` slug used in search qualifiers (`repo:owner/name`)
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// Parses a GitHub URL to extract owner and repository name
//
// Example:
//   "https://github.com/rust-lang/rust" -> Some(RepoRef { "rust-lang", "rust" })
//   "https://gitlab.com/user/repo"      -> None
pub fn parse_repo_url(url: &str) -> Option<RepoRef> {
    let caps = REPO_URL_RE.captures(url)?;

    Some(RepoRef {
        owner: caps[1].to_string(),
        name: caps[2].to_string(),
    })
}
