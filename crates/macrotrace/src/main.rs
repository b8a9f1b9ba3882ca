//! macrotrace - Recover macro expansions from instrumented LaTeXML traces
//!
//! Reads the trace an instrumented LaTeXML run writes, and reports each macro
//! invocation found in the files of interest together with the source span it
//! covered and the text it expanded to.

use eyre::{Result, WrapErr};
use figue as args;
use macrotrace::config::Config;
use macrotrace::output::{OutputFormat, render_extraction};
use macrotrace::{DEFAULT_CONFIG_PATH, collect_traces, load_config, load_config_or_default};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// CLI arguments
#[derive(Debug, facet::Facet)]
struct Args {
    /// Subcommand to run
    #[facet(args::subcommand)]
    command: Command,
}

/// Subcommands
#[derive(Debug, facet::Facet)]
#[repr(u8)]
enum Command {
    /// Reconstruct expansions from one or more traces
    Extract {
        /// Trace files, or directories to search for trace files
        #[facet(args::positional)]
        traces: Vec<PathBuf>,

        /// Source file whose invocations are reported (repeatable)
        #[facet(args::named, args::short = 'i', default)]
        in_file: Vec<PathBuf>,

        /// Report invocations anchored in any file
        #[facet(args::named, default)]
        any_file: bool,

        /// Extra wrapper control sequence to drop from expansion text (repeatable)
        #[facet(args::named, args::short = 'w', default)]
        wrapper: Vec<String>,

        /// Path to config file (default: .config/macrotrace/config.yaml)
        #[facet(args::named, args::short = 'c', default)]
        config: Option<PathBuf>,

        /// Output format: text, json
        #[facet(args::named, args::short = 'f', default)]
        format: Option<String>,

        /// List every trace warning
        #[facet(args::named, args::short = 'v', default)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Args = args::from_std_args().wrap_err("Failed to parse command line arguments")?;

    match args.command {
        Command::Extract {
            traces,
            in_file,
            any_file,
            wrapper,
            config,
            format,
            verbose,
        } => run_extract_command(traces, in_file, any_file, wrapper, config, format, verbose),
    }
}

fn run_extract_command(
    traces: Vec<PathBuf>,
    in_files: Vec<PathBuf>,
    any_file: bool,
    wrappers: Vec<String>,
    config_path: Option<PathBuf>,
    format: Option<String>,
    verbose: bool,
) -> Result<()> {
    if traces.is_empty() {
        eyre::bail!(
            "No traces specified. Usage: macrotrace extract <trace>... --in-file <file.tex>"
        );
    }

    let format = match format.as_deref() {
        None => OutputFormat::default(),
        Some(name) => OutputFormat::from_str(name).ok_or_else(|| {
            eyre::eyre!("Unknown output format {:?} (expected text or json)", name)
        })?,
    };

    // An explicit config must exist; the default location is optional
    let config = match config_path {
        Some(path) => load_config(&path)?,
        None => load_config_or_default(Path::new(DEFAULT_CONFIG_PATH)),
    };
    let config: Config = config.merge_args(in_files, any_file, wrappers);

    if !config.has_anchor() {
        eyre::bail!(
            "No files of interest given. Pass --in-file <file.tex> (repeatable), \
             or --any-file to report invocations from every file"
        );
    }

    eprintln!(
        "{} Extracting expansions from {} path(s)...",
        "->".blue().bold(),
        traces.len()
    );

    let extraction = collect_traces(&traces, &config)?;

    for warning in &extraction.warnings {
        eprintln!("{} {}", "!".yellow().bold(), warning);
    }

    eprintln!(
        "   Found {} expansions in {} trace(s)",
        extraction.len().to_string().green(),
        extraction.traces.len()
    );

    let rendered = render_extraction(&extraction, format, verbose)?;
    println!("{}", rendered);

    Ok(())
}
