// src/annotate/mod.rs
// =============================================================================
// This module contains the README rewriting logic.
//
// Submodules:
// - line: Rewrites one line (link detection + stats annotation)
// - section: Walks the document and only rewrites the target section
// =============================================================================

mod line;
mod section;

pub use section::{process_file, RunReport, Section};
