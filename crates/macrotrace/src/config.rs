//! Configuration schema for macrotrace
//!
//! Config lives at `.config/macrotrace/config.yaml` relative to the working
//! directory, unless a path is given with `--config`.

use facet::Facet;
use macrotrace_core::{DetectConfig, WrapperFilter};
use std::path::PathBuf;

/// Root configuration for macrotrace
#[derive(Debug, Clone, Default, Facet)]
pub struct Config {
    /// Source files whose invocations are reported
    /// e.g., `["/papers/1234/main.tex"]`
    #[facet(default)]
    pub in_files: Vec<PathBuf>,

    /// Report invocations anchored in any file instead of `in_files`
    #[facet(default)]
    pub any_file: bool,

    /// Exact wrapper control sequence names to drop from expansion text
    /// e.g., `["\\nolimits@"]`
    #[facet(default)]
    pub wrappers: Vec<String>,

    /// Wrapper name suffixes; defaults to `["@wrapper"]` when empty
    #[facet(default)]
    pub wrapper_suffixes: Vec<String>,

    /// Glob patterns selecting trace files when walking a directory
    /// Defaults to every trace extension if not specified
    #[facet(default)]
    pub include: Vec<String>,

    /// Glob patterns to exclude when walking a directory
    #[facet(default)]
    pub exclude: Vec<String>,
}

impl Config {
    /// Fold command line overrides into the config.
    pub fn merge_args(
        mut self,
        in_files: Vec<PathBuf>,
        any_file: bool,
        wrappers: Vec<String>,
    ) -> Self {
        self.in_files.extend(in_files);
        self.any_file |= any_file;
        self.wrappers.extend(wrappers);
        self
    }

    /// Whether the config says which invocations to report
    pub fn has_anchor(&self) -> bool {
        self.any_file || !self.in_files.is_empty()
    }

    pub fn wrapper_filter(&self) -> WrapperFilter {
        let filter = if self.wrapper_suffixes.is_empty() {
            WrapperFilter::default()
        } else {
            WrapperFilter::none().suffixes(self.wrapper_suffixes.iter().map(String::as_str))
        };
        filter.names(self.wrappers.iter().map(String::as_str))
    }

    pub fn detect_config(&self) -> DetectConfig {
        let config = if self.any_file {
            DetectConfig::any_file()
        } else {
            DetectConfig::in_files(self.in_files.iter().cloned())
        };
        config.wrappers(self.wrapper_filter())
    }
}
