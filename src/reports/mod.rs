//! Report generation for validation results.
//!
//! This module provides multiple output formats for validation results:
//! - Text: Human-readable terminal output with optional color
//! - JSON: Structured data for programmatic integration
//! - CSV: Flat rows for spreadsheet import
//! - Markdown: Human-readable documentation
//!
//! # Security
//!
//! The `escape` module provides utilities for safe output generation.
//! All document-controlled data (file names, property values, rule
//! reasons) should be escaped before embedding in Markdown reports.

mod csv;
pub mod escape;
mod json;
mod markdown;
mod text;
mod types;

pub use csv::CsvReporter;
pub use json::JsonReporter;
pub use markdown::MarkdownReporter;
pub use text::TextReporter;
pub use types::{
    DetectedFormat, FileReport, FileStatus, ReportFormat, ReportMetadata, ReportSummary,
    ValidationReport,
};

use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Format error: {0}")]
    FormatError(#[from] std::fmt::Error),
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Render a validation report to a string
    fn generate(&self, report: &ValidationReport) -> Result<String, ReportError>;

    /// Write a rendered report to a writer
    fn write_report(
        &self,
        report: &ValidationReport,
        writer: &mut dyn Write,
    ) -> Result<(), ReportError> {
        let rendered = self.generate(report)?;
        writer.write_all(rendered.as_bytes())?;
        Ok(())
    }

    /// Get the format this generator produces
    fn format(&self) -> ReportFormat;
}

/// Resolve `Auto` against the output target.
///
/// A concrete format request always wins. `Auto` picks the format from
/// the output file extension, and falls back to text for stdout or
/// unrecognized extensions.
#[must_use]
pub fn resolve_format(requested: ReportFormat, output: Option<&Path>) -> ReportFormat {
    if requested != ReportFormat::Auto {
        return requested;
    }
    let Some(path) = output else {
        return ReportFormat::Text;
    };
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => ReportFormat::Json,
        Some("csv") => ReportFormat::Csv,
        Some("md") | Some("markdown") => ReportFormat::Markdown,
        _ => ReportFormat::Text,
    }
}

/// Create a report generator for the given format
#[must_use]
pub fn create_reporter(format: ReportFormat) -> Box<dyn ReportGenerator> {
    create_reporter_with_options(format, true, None)
}

/// Create a report generator with color and indentation control
#[must_use]
pub fn create_reporter_with_options(
    format: ReportFormat,
    use_color: bool,
    indent: Option<usize>,
) -> Box<dyn ReportGenerator> {
    match format {
        ReportFormat::Auto | ReportFormat::Text => {
            if use_color {
                Box::new(TextReporter::new())
            } else {
                Box::new(TextReporter::new().no_color())
            }
        }
        ReportFormat::Json => match indent {
            Some(width) => Box::new(JsonReporter::new().indent(width)),
            None => Box::new(JsonReporter::new()),
        },
        ReportFormat::Csv => Box::new(CsvReporter::new()),
        ReportFormat::Markdown => Box::new(MarkdownReporter::new()),
    }
}
