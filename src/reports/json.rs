//! JSON report generator.

use super::{ReportError, ReportFormat, ReportGenerator, ValidationReport};
use serde::Serialize;

/// JSON report generator
pub struct JsonReporter {
    /// Whether to only include the summary block
    summary_only: bool,
    /// Pretty print output
    pretty: bool,
    /// Indentation width for pretty output
    indent: usize,
}

impl JsonReporter {
    /// Create a new JSON reporter
    #[must_use]
    pub const fn new() -> Self {
        Self {
            summary_only: false,
            pretty: true,
            indent: 4,
        }
    }

    /// Create a summary-only reporter
    #[must_use]
    pub const fn summary_only() -> Self {
        Self {
            summary_only: true,
            pretty: true,
            indent: 4,
        }
    }

    /// Set the indentation width. Zero produces compact output.
    #[must_use]
    pub const fn indent(mut self, width: usize) -> Self {
        self.indent = width;
        self.pretty = width != 0;
        self
    }

    fn render<T: Serialize>(&self, value: &T) -> Result<String, ReportError> {
        if !self.pretty {
            return serde_json::to_string(value)
                .map_err(|e| ReportError::SerializationError(e.to_string()));
        }

        let indent = " ".repeat(self.indent.min(16));
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value
            .serialize(&mut ser)
            .map_err(|e| ReportError::SerializationError(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| ReportError::SerializationError(e.to_string()))
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct SummaryOnlyReport<'a> {
    metadata: &'a super::ReportMetadata,
    summary: &'a super::ReportSummary,
}

impl ReportGenerator for JsonReporter {
    fn generate(&self, report: &ValidationReport) -> Result<String, ReportError> {
        if self.summary_only {
            self.render(&SummaryOnlyReport {
                metadata: &report.metadata,
                summary: &report.summary,
            })
        } else {
            self.render(report)
        }
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }
}
