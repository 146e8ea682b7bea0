// src/github/mod.rs
// =============================================================================
// This module handles everything that talks about GitHub.
//
// Submodules:
// - repo: Parsing GitHub URLs to extract owner/repo
// - search: Counting PRs and issues through the search API
// =============================================================================

mod repo;
mod search;

// Re-export the public API so callers can write `github::parse_repo_url()`
pub use repo::{parse_repo_url, RepoRef};
pub use search::{RepoStats, SearchClient, StatsPolicy, StatsSource};
