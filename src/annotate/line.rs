// src/annotate/line.rs
// =============================================================================
// This module rewrites a single README line.
//
// Given a line like:
//   - [MyOrg/repo](https://github.com/myorg/repo) (1 merged PR) extra text
//
// we find the first markdown link, look up stats for the repository it
// points to, and produce:
//   - [MyOrg/repo](https://github.com/myorg/repo) (2 open PRs, 3 merged PRs) extra text
//
// The line is returned unchanged when:
// 1. it doesn't mention github.com at all
// 2. it has no markdown link
// 3. the link points at one PR, issue, discussion or commit
// 4. the link URL has no owner/repo in it
// 5. every count came back zero
//
// Each pattern lives behind its own small function so it can be tested on
// its own.
// =============================================================================

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::github::{parse_repo_url, RepoRef, RepoStats, StatsSource};

// `[text](url)`, first match only
static MARKDOWN_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid regex"));

// `/pull/12`, `/issues/7`, `/discussions/3`, `/commit/1`
static ITEM_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(pull|issues|discussions|commit)/\d+").expect("valid regex")
});

// Any parenthetical mentioning "PR" or "issue", plus the whitespace before it
static STALE_ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*(?:PR|issue)[^)]*\)").expect("valid regex"));

/// A markdown link found in a line, with its byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownLink<'a> {
    /// The whole `[text](url)` as written
    pub markdown: &'a str,
    pub text: &'a str,
    pub url: &'a str,
    pub start: usize,
    pub end: usize,
}

/// What came out of rewriting a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub line: String,
    /// Set when a repository was looked up (even if all counts were zero)
    pub queried: Option<(RepoRef, RepoStats)>,
}

impl Rewrite {
    fn unchanged(line: &str) -> Self {
        Self {
            line: line.to_string(),
            queried: None,
        }
    }
}

// Finds the first `[text](url)` in a line
pub fn find_markdown_link(line: &str) -> Option<MarkdownLink<'_>> {
    let caps = MARKDOWN_LINK_RE.captures(line)?;
    let whole = caps.get(0)?;

    Some(MarkdownLink {
        markdown: whole.as_str(),
        text: caps.get(1)?.as_str(),
        url: caps.get(2)?.as_str(),
        start: whole.start(),
        end: whole.end(),
    })
}

// True for links to a single PR, issue, discussion or commit.
// Those are references to one item and never get aggregate stats.
pub fn is_item_link(url: &str) -> bool {
    ITEM_LINK_RE.is_match(url) || url.contains("/commit/")
}

// Removes every stale stats parenthetical from the text after a link and
// trims what is left.
//
// NOTE: this matches any "(...PR...)" or "(...issue...)" in the remainder,
// not only one right next to the link, so an unrelated "(known issue)"
// gets removed as well.
pub fn strip_stale_annotations(after_link: &str) -> String {
    STALE_ANNOTATION_RE
        .replace_all(after_link, "")
        .trim()
        .to_string()
}

fn pluralize(count: u64, singular: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {singular}s")
    }
}

// Builds " (2 open PRs, 5 merged PRs, 1 issue)" from the non-zero counts.
// Returns None when all counts are zero.
pub fn stats_phrase(stats: &RepoStats) -> Option<String> {
    let mut parts = Vec::new();

    if stats.open_prs > 0 {
        parts.push(pluralize(stats.open_prs, "open PR"));
    }
    if stats.merged_prs > 0 {
        parts.push(pluralize(stats.merged_prs, "merged PR"));
    }
    if stats.issues > 0 {
        parts.push(pluralize(stats.issues, "issue"));
    }

    if parts.is_empty() {
        return None;
    }

    Some(format!(" ({})", parts.join(", ")))
}

// Rewrites one line, fetching stats from `source` if it links a repository
pub async fn rewrite_line<S: StatsSource>(line: &str, source: &S) -> Rewrite {
    if !line.contains("github.com") {
        return Rewrite::unchanged(line);
    }

    let Some(link) = find_markdown_link(line) else {
        return Rewrite::unchanged(line);
    };

    if is_item_link(link.url) {
        return Rewrite::unchanged(line);
    }

    let Some(repo) = parse_repo_url(link.url) else {
        return Rewrite::unchanged(line);
    };
    debug!(text = link.text, url = link.url, "found repository link");

    let stats = source.repo_stats(&repo).await;

    info!(
        "{}: {} open PRs, {} merged PRs, {} issues",
        repo, stats.open_prs, stats.merged_prs, stats.issues
    );

    let Some(phrase) = stats_phrase(&stats) else {
        return Rewrite {
            line: line.to_string(),
            queried: Some((repo, stats)),
        };
    };

    let before = &line[..link.start];
    let after = strip_stale_annotations(&line[link.end..]);

    let mut rewritten = String::with_capacity(line.len() + phrase.len());
    rewritten.push_str(before);
    rewritten.push_str(link.markdown);
    rewritten.push_str(&phrase);
    if !after.is_empty() {
        rewritten.push(' ');
        rewritten.push_str(&after);
    }

    Rewrite {
        line: rewritten,
        queried: Some((repo, stats)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    // Hands back the same numbers for every repository and counts lookups
    struct FixedStats {
        stats: RepoStats,
        calls: Cell<usize>,
    }

    impl FixedStats {
        fn new(merged_prs: u64, open_prs: u64, issues: u64) -> Self {
            Self {
                stats: RepoStats {
                    merged_prs,
                    open_prs,
                    issues,
                },
                calls: Cell::new(0),
            }
        }
    }

    impl StatsSource for FixedStats {
        async fn repo_stats(&self, _repo: &RepoRef) -> RepoStats {
            self.calls.set(self.calls.get() + 1);
            self.stats
        }
    }

    #[test]
    fn test_find_first_link_only() {
        let line = "see [one](https://github.com/a/one) and [two](https://github.com/b/two)";
        let link = find_markdown_link(line).unwrap();
        assert_eq!(link.text, "one");
        assert_eq!(link.url, "https://github.com/a/one");
        assert_eq!(link.markdown, "[one](https://github.com/a/one)");
        assert_eq!(&line[link.start..link.end], link.markdown);
    }

    #[test]
    fn test_find_no_link() {
        assert_eq!(find_markdown_link("plain https://github.com/a/b"), None);
        assert_eq!(find_markdown_link("[](https://github.com/a/b)"), None);
    }

    #[test]
    fn test_item_links() {
        assert!(is_item_link("https://github.com/a/b/pull/42"));
        assert!(is_item_link("https://github.com/a/b/issues/7"));
        assert!(is_item_link("https://github.com/a/b/discussions/3"));
        assert!(is_item_link("https://github.com/a/b/commit/abcd"));
        assert!(!is_item_link("https://github.com/a/b"));
        assert!(!is_item_link("https://github.com/a/b/pulls"));
        assert!(!is_item_link("https://github.com/a/b/issues"));
    }

    #[test]
    fn test_stats_phrase_pluralization() {
        let phrase = stats_phrase(&RepoStats {
            merged_prs: 1,
            open_prs: 2,
            issues: 1,
        });
        assert_eq!(phrase.as_deref(), Some(" (2 open PRs, 1 merged PR, 1 issue)"));

        let phrase = stats_phrase(&RepoStats {
            merged_prs: 0,
            open_prs: 1,
            issues: 2,
        });
        assert_eq!(phrase.as_deref(), Some(" (1 open PR, 2 issues)"));
    }

    #[test]
    fn test_stats_phrase_all_zero() {
        assert_eq!(stats_phrase(&RepoStats::default()), None);
    }

    #[test]
    fn test_strip_stale_annotations() {
        assert_eq!(strip_stale_annotations(" (5 merged PRs) extra text"), "extra text");
        assert_eq!(strip_stale_annotations(" (1 issue)"), "");
        assert_eq!(strip_stale_annotations(" - a fuzzer (Rust)"), "- a fuzzer (Rust)");
    }

    // Known edge case: any parenthetical mentioning "issue" or "PR" is
    // treated as stale, wherever it sits after the link.
    #[test]
    fn test_strip_removes_unrelated_parenthetical_mentioning_issue() {
        assert_eq!(
            strip_stale_annotations(" - see (known issue list) and (notes)"),
            "- see and (notes)"
        );
    }

    #[tokio::test]
    async fn test_rewrite_appends_stats() {
        let source = FixedStats::new(3, 0, 1);
        let rewrite = rewrite_line("- [MyOrg/repo](https://github.com/myorg/repo)", &source).await;

        assert_eq!(
            rewrite.line,
            "- [MyOrg/repo](https://github.com/myorg/repo) (3 merged PRs, 1 issue)"
        );
        let (repo, stats) = rewrite.queried.unwrap();
        assert_eq!(repo.owner, "myorg");
        assert_eq!(repo.name, "repo");
        assert_eq!(stats.merged_prs, 3);
    }

    #[tokio::test]
    async fn test_rewrite_replaces_stale_annotation_and_keeps_trailing_text() {
        let source = FixedStats::new(5, 2, 0);
        let rewrite = rewrite_line(
            "- [A/b](https://github.com/a/b) (5 merged PRs) extra text",
            &source,
        )
        .await;

        assert_eq!(
            rewrite.line,
            "- [A/b](https://github.com/a/b) (2 open PRs, 5 merged PRs) extra text"
        );
    }

    #[tokio::test]
    async fn test_rewrite_twice_is_stable() {
        let source = FixedStats::new(4, 1, 2);
        let line = "* Reviewed [x/y](https://github.com/x/y) - parser work";

        let once = rewrite_line(line, &source).await.line;
        let twice = rewrite_line(&once, &source).await.line;

        assert_eq!(
            once,
            "* Reviewed [x/y](https://github.com/x/y) (1 open PR, 4 merged PRs, 2 issues) - parser work"
        );
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_rewrite_all_zero_leaves_line_alone() {
        let source = FixedStats::new(0, 0, 0);
        let line = "- [A/b](https://github.com/a/b) (2 merged PRs)";

        let rewrite = rewrite_line(line, &source).await;

        assert_eq!(rewrite.line, line);
        assert!(!rewrite.line.contains("()"));
        // The lookup still happened
        assert!(rewrite.queried.is_some());
    }

    #[tokio::test]
    async fn test_item_links_are_never_annotated() {
        let source = FixedStats::new(1, 1, 1);
        for line in [
            "- [fix](https://github.com/a/b/pull/42)",
            "- [bug](https://github.com/a/b/issues/7)",
            "- [talk](https://github.com/a/b/discussions/3)",
            "- [change](https://github.com/a/b/commit/abcd)",
        ] {
            let rewrite = rewrite_line(line, &source).await;
            assert_eq!(rewrite.line, line);
            assert_eq!(rewrite.queried, None);
        }
        assert_eq!(source.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_lines_without_repo_links_are_untouched() {
        let source = FixedStats::new(1, 1, 1);
        for line in [
            "Just some text",
            "Mentions github.com but has no link",
            "[docs](https://docs.rs/foo) mirrored on github.com",
            "[profile](https://github.com/someone)",
        ] {
            assert_eq!(rewrite_line(line, &source).await.line, line);
        }
        assert_eq!(source.calls.get(), 0);
    }
}
