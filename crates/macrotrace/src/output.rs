//! Output formatting for extracted expansions

use eyre::{Result, WrapErr};
use facet::Facet;
use macrotrace_core::{Expansion, Extraction, TraceResult, TraceStats};
use owo_colors::OwoColorize;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render an extraction in the specified format
pub fn render_extraction(
    extraction: &Extraction,
    format: OutputFormat,
    verbose: bool,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(extraction, verbose)),
        OutputFormat::Json => render_json(extraction),
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn render_text(extraction: &Extraction, verbose: bool) -> String {
    let mut output = String::new();

    for trace in &extraction.traces {
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "##".bold(),
            trace.path.display().to_string().cyan().bold()
        ));

        for expansion in &trace.expansions {
            output.push_str(&format!(
                "  {} {} {} {}\n",
                lossy(&expansion.name).green(),
                expansion.span.to_string().dimmed(),
                "->".dimmed(),
                lossy(&expansion.text)
            ));
        }

        let stats = &trace.report.stats;
        output.push_str(&format!(
            "  {} expansions ({} nested, {} outside files of interest) from {} lines\n",
            stats.emitted.to_string().green(),
            stats.nested,
            stats.dropped_unanchored,
            stats.lines
        ));

        if !trace.report.warnings.is_empty() {
            if verbose {
                for warning in &trace.report.warnings {
                    output.push_str(&format!("  {} {}\n", "!".yellow().bold(), warning));
                }
            } else {
                output.push_str(&format!(
                    "  {} {} trace warnings (use --verbose to list)\n",
                    "!".yellow().bold(),
                    trace.report.warnings.len()
                ));
            }
        }
    }

    output
}

#[derive(Facet)]
struct JsonExtraction {
    traces: Vec<JsonTrace>,
}

#[derive(Facet)]
struct JsonTrace {
    path: String,
    expansions: Vec<JsonExpansion>,
    stats: TraceStats,
    warnings: Vec<String>,
}

#[derive(Facet)]
struct JsonExpansion {
    name: String,
    start_line: usize,
    start_col: usize,
    end_line: usize,
    end_col: usize,
    text: String,
}

impl From<&Expansion> for JsonExpansion {
    fn from(expansion: &Expansion) -> Self {
        Self {
            name: lossy(&expansion.name),
            start_line: expansion.span.start_line,
            start_col: expansion.span.start_col,
            end_line: expansion.span.end_line,
            end_col: expansion.span.end_col,
            text: lossy(&expansion.text),
        }
    }
}

impl From<&TraceResult> for JsonTrace {
    fn from(trace: &TraceResult) -> Self {
        Self {
            path: trace.path.display().to_string(),
            expansions: trace.expansions.iter().map(JsonExpansion::from).collect(),
            stats: trace.report.stats.clone(),
            warnings: trace
                .report
                .warnings
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

fn render_json(extraction: &Extraction) -> Result<String> {
    let json = JsonExtraction {
        traces: extraction.traces.iter().map(JsonTrace::from).collect(),
    };

    facet_json::to_string_pretty(&json).wrap_err("JSON serialization failed")
}
