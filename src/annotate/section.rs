// src/annotate/section.rs
// =============================================================================
// This module walks a whole README and rewrites only the lines inside one
// top-level section.
//
// How it works:
// 1. Split the document into lines
// 2. Fold a two-state machine (Outside / Inside) over the lines
// 3. Lines inside the section go through the line rewriter, one at a time
// 4. Join everything back with '\n' and write it out in a single call
//
// State transitions:
//   any     --"# <Section Title>"-->  Inside   (heading itself passes through)
//   Inside  --"# <other heading>"-->  Outside  (heading itself passes through)
//   "## sub-headings" never change state
// =============================================================================

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

use super::line::rewrite_line;
use crate::github::{RepoRef, RepoStats, StatsSource};

// A single '#' followed by a space and a non-'#' character
static TOP_LEVEL_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^# [^#]").expect("valid regex"));

/// The section whose lines get annotated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    marker: String,
}

impl Section {
    pub fn new(title: &str) -> Self {
        Self {
            marker: format!("# {title}"),
        }
    }

    // Containment, not equality: "## Title" and "# Title (2024)" both enter
    pub fn is_entry(&self, line: &str) -> bool {
        line.contains(&self.marker)
    }
}

pub fn is_top_level_heading(line: &str) -> bool {
    TOP_LEVEL_HEADING_RE.is_match(line)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SectionState {
    #[default]
    Outside,
    Inside,
}

/// What to do with a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    PassThrough,
    Rewrite,
}

impl SectionState {
    /// Advance the machine by one line
    pub fn step(self, line: &str, section: &Section) -> (SectionState, LineAction) {
        if section.is_entry(line) {
            return (SectionState::Inside, LineAction::PassThrough);
        }

        match self {
            SectionState::Inside if is_top_level_heading(line) => {
                (SectionState::Outside, LineAction::PassThrough)
            }
            SectionState::Inside => (SectionState::Inside, LineAction::Rewrite),
            SectionState::Outside => (SectionState::Outside, LineAction::PassThrough),
        }
    }
}

// Pairs every line with its action. The state is the scan accumulator.
pub fn plan_lines<'a>(
    text: &'a str,
    section: &'a Section,
) -> impl Iterator<Item = (&'a str, LineAction)> + 'a {
    text.split('\n')
        .scan(SectionState::default(), move |state, line| {
            let (next, action) = state.step(line, section);
            *state = next;
            Some((line, action))
        })
}

/// One repository lookup made during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedLink {
    /// 1-based line number in the document
    pub line_number: usize,
    #[serde(flatten)]
    pub repo: RepoRef,
    #[serde(flatten)]
    pub stats: RepoStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedDocument {
    pub text: String,
    pub lines_total: usize,
    pub lines_rewritten: usize,
    pub links: Vec<AnnotatedLink>,
}

// Rewrites the target section of `text`.
//
// Lines are handled strictly in order: each line's lookups finish before
// the next line starts.
pub async fn process_lines<S: StatsSource>(
    text: &str,
    section: &Section,
    source: &S,
) -> ProcessedDocument {
    let mut output = Vec::new();
    let mut links = Vec::new();
    let mut lines_rewritten = 0;

    for (index, (line, action)) in plan_lines(text, section).enumerate() {
        match action {
            LineAction::PassThrough => output.push(line.to_string()),
            LineAction::Rewrite => {
                let rewrite = rewrite_line(line, source).await;

                if rewrite.line != line {
                    lines_rewritten += 1;
                }
                if let Some((repo, stats)) = rewrite.queried {
                    links.push(AnnotatedLink {
                        line_number: index + 1,
                        repo,
                        stats,
                    });
                }

                output.push(rewrite.line);
            }
        }
    }

    ProcessedDocument {
        lines_total: output.len(),
        text: output.join("\n"),
        lines_rewritten,
        links,
    }
}

/// Summary of one run over a file
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub path: PathBuf,
    pub lines_total: usize,
    pub lines_rewritten: usize,
    pub links: Vec<AnnotatedLink>,
    /// False in dry-run mode
    pub written: bool,
}

// Reads the file at `path`, rewrites its target section and, when `write`
// is set, replaces the file contents in one write.
pub async fn process_file<S: StatsSource>(
    path: &Path,
    section: &Section,
    source: &S,
    write: bool,
) -> Result<RunReport> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let document = process_lines(&content, section, source).await;
    debug!(
        lines = document.lines_total,
        rewritten = document.lines_rewritten,
        "processed document"
    );

    if write {
        tokio::fs::write(path, &document.text)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(RunReport {
        path: path.to_path_buf(),
        lines_total: document.lines_total,
        lines_rewritten: document.lines_rewritten,
        links: document.links,
        written: write,
    })
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does .scan() do?
//    - Like .map(), but carries a piece of mutable state from item to item
//    - Here the state is the SectionState, so each line sees the state left
//      behind by the line before it
//
// 2. Why not spawn a task per line?
//    - Lines must finish in order so the log reads top to bottom
//    - It also keeps at most one repository's searches in flight at a time
//
// 3. Why split('\n') and not lines()?
//    - lines() drops a trailing empty line, so join() would lose the final
//      newline of the file
// -----------------------------------------------------------------------------
