//! macrotrace library - Recover macro expansions from instrumented LaTeXML traces
//!
//! This library exposes the command line tool's config loading and trace
//! collection for testing and embedding purposes.

pub mod config;
pub mod output;

use config::Config;
use eyre::{Result, WrapErr};
use macrotrace_core::{Extraction, PathSources, Sources, WalkSources};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where the config is looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = ".config/macrotrace/config.yaml";

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        eyre::bail!(
            "Config file not found at {}\n\n\
             Create a config file naming the sources you care about:\n\n\
             in_files:\n  \
                 - /papers/1234/main.tex\n\
             wrappers:\n  \
                 - \\nolimits@\n\
             exclude:\n  \
                 - \"build/**\"",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = facet_yaml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Load config if it exists, otherwise return default empty config.
pub fn load_config_or_default(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => facet_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}

/// Extract expansions from every trace named on the command line.
///
/// Files are read directly and a missing one is an error. Directories are
/// walked for trace files using the config's include and exclude patterns.
pub fn collect_traces(paths: &[PathBuf], config: &Config) -> Result<Extraction> {
    let detect = config.detect_config();
    let (dirs, files): (Vec<&PathBuf>, Vec<&PathBuf>) = paths.iter().partition(|p| p.is_dir());

    let mut extraction = PathSources::new(files).extract(&detect)?;

    for dir in dirs {
        debug!(dir = %dir.display(), "walking for traces");
        let walked = WalkSources::new(dir)
            .include(config.include.iter().cloned())
            .exclude(config.exclude.iter().cloned())
            .extract(&detect)
            .wrap_err_with(|| format!("Failed to walk {}", dir.display()))?;
        extraction.traces.extend(walked.traces);
        extraction.warnings.extend(walked.warnings);
    }

    extraction.traces.sort_by(|a, b| a.path.cmp(&b.path));
    for trace in &extraction.traces {
        info!(
            path = %trace.path.display(),
            expansions = trace.expansions.len(),
            warnings = trace.report.warnings.len(),
            "trace done"
        );
    }
    Ok(extraction)
}
