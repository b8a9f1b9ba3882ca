//! macrotrace-core - Core library for macro expansion reconstruction
//!
//! An instrumented LaTeXML logs every macro invocation it expands: where the
//! invocation appeared in the source, which arguments it consumed, and which
//! tokens its expansion produced. This crate turns that interleaved trace
//! back into records of the form "this macro call, at this source span,
//! expanded to this exact text".
//!
//! # Features
//!
//! - `walk` - Enable [`WalkSources`] for gitignore-aware directory walking (brings in `ignore` and `globset`)
//! - `parallel` - Enable parallel extraction over many traces (brings in `rayon`)
//!
//! # Trace format
//!
//! Four kinds of lines are recognized; everything else is ignored:
//!
//! ```text
//! Start of expansion. Control sequence: T_CS[\simpledef]. (object ID: 1). Current expansion depth: 1. (If this was a literal control sequence in a file rather than from an expansion, it appeared in /path/to/main.tex from line 2, col 1 to line 2, col 11).
//! Argument token: "{" (source file /path/to/main.tex, from line 2 col 13 to line 2 col 14).
//! Expansion token: x (object ID 2). Category: 11. Expandable: false.
//! End of expansion (object ID: 1). Current expansion depth: 1. Expansion: x.
//! ```
//!
//! # Detecting expansions
//!
//! ```
//! use macrotrace_core::{DetectConfig, Expansion, detect_expansions};
//!
//! let log = br"Start of expansion. Control sequence: T_CS[\simpledef]. (object ID: 1). Current expansion depth: 1. (If this was a literal control sequence in a file rather than from an expansion, it appeared in /path/to/main.tex from line 2, col 1 to line 2, col 11).
//! Expansion token: x (object ID 2). Category: 11. Expandable: false.
//! End of expansion (object ID: 1). Current expansion depth: 1. Expansion: x.";
//!
//! let expansions: Vec<Expansion> =
//!     detect_expansions(log, DetectConfig::in_files(["/path/to/main.tex"])).collect();
//!
//! assert_eq!(expansions, vec![Expansion::new(r"\simpledef".as_bytes(), 2, 1, 2, 11, "x")]);
//! ```
//!
//! # Many traces at once
//!
//! ```
//! use macrotrace_core::{DetectConfig, MemorySources, Sources};
//!
//! let extraction = MemorySources::new()
//!     .add("paper-a.log", "This is LaTeXML")
//!     .add("paper-b.log", "")
//!     .extract(&DetectConfig::any_file())
//!     .unwrap();
//!
//! assert_eq!(extraction.traces.len(), 2);
//! assert!(extraction.is_empty());
//! ```

mod anchor;
mod classify;
mod detect;
mod report;
mod sources;
mod span;
mod tracker;
mod wrapper;

pub use anchor::AnchorFilter;
pub use classify::{
    ArgumentToken, ExpansionToken, LineKind, MalformedLine, StartExpansion, TraceEvent, classify,
    classify_checked,
};
pub use detect::{Expansions, detect_expansions};
pub use report::{Expansion, TraceReport, TraceStats, TraceWarning, WarningKind};
pub use sources::{
    Extraction, MemorySources, PathSources, Sources, TRACE_EXTENSIONS, TraceResult, extract_trace,
};
pub use span::{Span, resolve_span};
pub use tracker::{DetectConfig, ExpansionTracker};
pub use wrapper::{DEFAULT_WRAPPER_SUFFIXES, WrapperFilter};

#[cfg(feature = "walk")]
pub use sources::WalkSources;
