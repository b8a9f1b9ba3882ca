//! Trace providers for batch extraction

use crate::detect::detect_expansions;
use crate::report::{Expansion, TraceReport};
use crate::tracker::DetectConfig;
use eyre::{Result, WrapErr};
use std::path::PathBuf;
use tracing::debug;

/// File extensions instrumented engine runs write their traces to
pub const TRACE_EXTENSIONS: &[&str] = &["log", "trace"];

/// Expansions reconstructed from one trace
#[derive(Debug, Clone)]
pub struct TraceResult {
    pub path: PathBuf,
    pub expansions: Vec<Expansion>,
    pub report: TraceReport,
}

/// Result of extracting expansions from a set of traces, including any
/// warnings about traces that could not be read
#[derive(Debug, Default)]
pub struct Extraction {
    /// One entry per trace, sorted by path
    pub traces: Vec<TraceResult>,
    pub warnings: Vec<String>,
}

impl Extraction {
    /// Total number of expansions across all traces
    pub fn len(&self) -> usize {
        self.traces.iter().map(|t| t.expansions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sorted(mut self) -> Self {
        self.traces.sort_by(|a, b| a.path.cmp(&b.path));
        self
    }
}

/// Run one full pass over an in-memory trace.
pub fn extract_trace(path: impl Into<PathBuf>, log: &[u8], config: &DetectConfig) -> TraceResult {
    let path = path.into();
    let mut detected = detect_expansions(log, config.clone());
    let expansions: Vec<Expansion> = detected.by_ref().collect();
    let report = detected.into_report();
    debug!(
        path = %path.display(),
        expansions = expansions.len(),
        warnings = report.warnings.len(),
        "extracted trace"
    );
    TraceResult {
        path,
        expansions,
        report,
    }
}

/// Trait for providing traces to extract expansions from
pub trait Sources {
    /// Extract expansions from all traces
    fn extract(self, config: &DetectConfig) -> Result<Extraction>;
}

/// Traces from an explicit list of file paths
pub struct PathSources(Vec<PathBuf>);

impl PathSources {
    /// Create from an iterator of paths
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self(paths.into_iter().map(Into::into).collect())
    }
}

fn read_and_extract(path: PathBuf, config: &DetectConfig) -> Result<TraceResult> {
    let log = std::fs::read(&path)
        .wrap_err_with(|| format!("Failed to read trace {}", path.display()))?;
    Ok(extract_trace(path, &log, config))
}

impl Sources for PathSources {
    fn extract(self, config: &DetectConfig) -> Result<Extraction> {
        #[cfg(feature = "parallel")]
        let traces = {
            use rayon::prelude::*;

            self.0
                .into_par_iter()
                .map(|path| read_and_extract(path, config))
                .collect::<Result<Vec<_>>>()?
        };

        #[cfg(not(feature = "parallel"))]
        let traces = self
            .0
            .into_iter()
            .map(|path| read_and_extract(path, config))
            .collect::<Result<Vec<_>>>()?;

        Ok(Extraction {
            traces,
            warnings: Vec::new(),
        }
        .sorted())
    }
}

/// In-memory traces (useful for testing)
pub struct MemorySources(Vec<(PathBuf, Vec<u8>)>);

impl MemorySources {
    /// Create empty memory sources
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a trace with content
    pub fn add(mut self, path: impl Into<PathBuf>, log: impl Into<Vec<u8>>) -> Self {
        self.0.push((path.into(), log.into()));
        self
    }
}

impl Default for MemorySources {
    fn default() -> Self {
        Self::new()
    }
}

impl Sources for MemorySources {
    fn extract(self, config: &DetectConfig) -> Result<Extraction> {
        let traces = self
            .0
            .into_iter()
            .map(|(path, log)| extract_trace(path, &log, config))
            .collect();
        Ok(Extraction {
            traces,
            warnings: Vec::new(),
        }
        .sorted())
    }
}

/// Gitignore-aware directory walker for trace files
#[cfg(feature = "walk")]
pub struct WalkSources {
    root: PathBuf,
    include: Vec<String>,
    exclude: Vec<String>,
}

#[cfg(feature = "walk")]
impl WalkSources {
    /// Create a walker for the given root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Add include patterns (e.g., `["**/*.log"]`); defaults to every trace extension
    pub fn include(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.include.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add exclude patterns (e.g., `["build/**"]`)
    pub fn exclude(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }

    fn trace_paths(&self, warnings: &mut Vec<String>) -> Result<Vec<PathBuf>> {
        use ignore::WalkBuilder;

        let include = if self.include.is_empty() {
            build_globs(TRACE_EXTENSIONS.iter().map(|ext| format!("**/*.{}", ext)))?
        } else {
            build_globs(self.include.iter().cloned())?
        };
        let exclude = build_globs(self.exclude.iter().cloned())?;

        let walker = WalkBuilder::new(&self.root)
            .follow_links(true)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .build();

        let mut paths = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warnings.push(format!("Warning: {}", e));
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            if include.is_match(relative) && !exclude.is_match(relative) {
                paths.push(path.to_path_buf());
            }
        }
        Ok(paths)
    }
}

#[cfg(feature = "walk")]
fn build_globs(patterns: impl IntoIterator<Item = String>) -> Result<globset::GlobSet> {
    let mut builder = globset::GlobSetBuilder::new();
    for pattern in patterns {
        let glob = globset::Glob::new(&pattern)
            .wrap_err_with(|| format!("Invalid glob pattern {:?}", pattern))?;
        builder.add(glob);
    }
    builder.build().wrap_err("Failed to build glob set")
}

#[cfg(feature = "walk")]
impl Sources for WalkSources {
    fn extract(self, config: &DetectConfig) -> Result<Extraction> {
        let mut warnings = Vec::new();
        let paths = self.trace_paths(&mut warnings)?;

        let extract_one = |path: PathBuf| match std::fs::read(&path) {
            Ok(log) => Ok(extract_trace(path, &log, config)),
            Err(e) => Err(format!(
                "Warning: could not read trace {}: {}",
                path.display(),
                e
            )),
        };

        #[cfg(feature = "parallel")]
        let results: Vec<_> = {
            use rayon::prelude::*;
            paths.into_par_iter().map(extract_one).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let results: Vec<_> = paths.into_iter().map(extract_one).collect();

        let mut traces = Vec::new();
        for result in results {
            match result {
                Ok(trace) => traces.push(trace),
                Err(warning) => warnings.push(warning),
            }
        }

        Ok(Extraction { traces, warnings }.sorted())
    }
}
