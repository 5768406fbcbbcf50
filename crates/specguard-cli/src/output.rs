//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), including validation
//! summaries and progress indicators.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use specguard_core::{OpenApiVersion, Report, ValidationError};
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use tracing::{debug, trace};

/// A validation error flattened for display and machine-readable output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportedError {
    /// JSON pointer of the offending node, without the leading `#`
    pub path: String,
    pub message: String,
    /// Id of the semantic rule that fired, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// JSON pointer into the meta-schema or schema that produced the error
    pub schema_path: String,
    /// Per-branch errors of a failed composition keyword
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<ReportedError>,
}

impl ReportedError {
    fn from_error(error: &ValidationError, with_context: bool) -> Self {
        Self {
            path: error.pointer(),
            message: error.message.clone(),
            rule: error.rule_id().map(str::to_string),
            schema_path: error.schema_pointer(),
            context: if with_context {
                error
                    .context
                    .iter()
                    .map(|branch| Self::from_error(branch, true))
                    .collect()
            } else {
                Vec::new()
            },
        }
    }
}

/// Outcome of validating one source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationSummary {
    /// Path or URL that was validated
    pub source: String,
    /// OpenAPI version the document was validated as
    pub version: Option<OpenApiVersion>,
    pub valid: bool,
    pub error_count: usize,
    pub errors: Vec<ReportedError>,
}

impl ValidationSummary {
    /// Summarize `report`; composition context is kept only when asked for
    pub fn new(source: impl Into<String>, report: &Report, with_context: bool) -> Self {
        Self {
            source: source.into(),
            version: report.version,
            valid: report.is_valid(),
            error_count: report.errors.len(),
            errors: report
                .errors
                .iter()
                .map(|error| ReportedError::from_error(error, with_context))
                .collect(),
        }
    }
}

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a validation summary
    fn format_summary(&self, summary: &ValidationSummary, use_color: bool) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => {
                // For human format, use pretty JSON as fallback
                Ok(serde_json::to_string_pretty(value)?)
            }
        }
    }

    fn format_summary(&self, summary: &ValidationSummary, use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_summary_human(summary, use_color)),
            _ => self.format(summary),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, show_progress: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: show_progress && !quiet && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            show_progress: false, // No progress bars with custom writers
            quiet,
            writer,
        }
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "Outputting data");

        if self.format == OutputFormat::Human {
            self.writeln(&formatted)
        } else {
            // Machine formats end with exactly one newline
            self.writeln(formatted.trim_end())
        }
    }

    /// Write a validation summary
    ///
    /// In quiet mode a valid document prints nothing in the human format;
    /// machine formats always print the summary.
    pub fn summary(&mut self, summary: &ValidationSummary) -> Result<()> {
        if self.format != OutputFormat::Human {
            return self.data(summary);
        }
        if self.quiet && summary.valid {
            return Ok(());
        }
        let formatted = self.format.format_summary(summary, self.use_color)?;
        self.write(&formatted)
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(default_spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

/// Helper function to create a spinner style
pub fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Format a validation summary for human reading
fn format_summary_human(summary: &ValidationSummary, use_color: bool) -> String {
    let version = summary
        .version
        .map(|version| format!(" OpenAPI {}", version))
        .unwrap_or_default();

    if summary.valid {
        let line = format!("✓ {} is a valid{} document", summary.source, version);
        return if use_color {
            format!("{}\n", line.green())
        } else {
            format!("{}\n", line)
        };
    }

    let noun = if summary.error_count == 1 { "error" } else { "errors" };
    let header = format!(
        "✗ {} is not a valid{} document ({} {})",
        summary.source, version, summary.error_count, noun
    );
    let mut output = if use_color {
        format!("{}\n", header.red().bold())
    } else {
        format!("{}\n", header)
    };

    for (i, error) in summary.errors.iter().enumerate() {
        output.push('\n');
        push_error(&mut output, &format!("{}.", i + 1), error, 0, use_color);
    }

    output
}

fn push_error(output: &mut String, label: &str, error: &ReportedError, depth: usize, use_color: bool) {
    let indent = "   ".repeat(depth);
    let location = format!("#{}", error.path);
    let origin = match &error.rule {
        Some(rule) => format!("rule: {}", rule),
        None => format!("schema: #{}", error.schema_path),
    };

    if use_color {
        output.push_str(&format!("{}{} {}\n", indent, label, location.bold()));
        output.push_str(&format!("{}   {}\n", indent, error.message));
        output.push_str(&format!("{}   {}\n", indent, origin.dimmed()));
    } else {
        output.push_str(&format!("{}{} {}\n", indent, label, location));
        output.push_str(&format!("{}   {}\n", indent, error.message));
        output.push_str(&format!("{}   {}\n", indent, origin));
    }

    for branch in &error.context {
        push_error(output, "-", branch, depth + 1, use_color);
    }
}
