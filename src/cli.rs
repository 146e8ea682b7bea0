// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There is a single command. Every flag has a default, so running plain
// `readme-stats` in a repository annotates ./README.md for the default
// author and section.
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "readme-stats",
    version,
    about = "Annotate GitHub repository links in a README with PR and issue counts",
    long_about = "readme-stats finds the repository links in one section of a markdown file, \
                  counts the pull requests and issues a given author opened there, and appends \
                  a summary like \"(2 open PRs, 5 merged PRs, 1 issue)\" after each link. \
                  Set PAT_READ_ONLY or GITHUB_TOKEN to authenticate search requests."
)]
pub struct Cli {
    /// Markdown file to annotate (rewritten in place)
    #[arg(default_value = "README.md")]
    pub path: PathBuf,

    /// Title of the top-level section whose links get annotated
    ///
    /// Matches a line containing "# <TITLE>"
    #[arg(long, default_value = "Code Review and Security Engineering")]
    pub section: String,

    /// GitHub login whose PRs and issues are counted
    #[arg(long, default_value = "johnsaigle")]
    pub author: String,

    /// Repository owner that uses the organization search instead
    #[arg(long, default_value = "m0-foundation")]
    pub org: String,

    /// Text searched for in the organization's PRs
    #[arg(long, default_value = "AR")]
    pub org_search: String,

    /// Base URL of the GitHub REST API
    #[arg(long, default_value = "https://api.github.com")]
    pub api_url: String,

    /// Report what would change without writing the file
    #[arg(long)]
    pub dry_run: bool,

    /// Print a JSON report of every repository looked up
    #[arg(long)]
    pub json: bool,
}
