//! Text report generator for shell output.
//!
//! Provides a compact, human-readable report for terminal usage.

use super::{FileReport, FileStatus, ReportError, ReportFormat, ReportGenerator, ValidationReport};

/// Apply ANSI color formatting if colored output is enabled.
fn ansi_color(text: &str, color: &str, colored: bool) -> String {
    if colored {
        match color {
            "red" => format!("\x1b[31m{text}\x1b[0m"),
            "green" => format!("\x1b[32m{text}\x1b[0m"),
            "yellow" => format!("\x1b[33m{text}\x1b[0m"),
            "cyan" => format!("\x1b[36m{text}\x1b[0m"),
            "bold" => format!("\x1b[1m{text}\x1b[0m"),
            "dim" => format!("\x1b[2m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    } else {
        text.to_string()
    }
}

/// Text reporter for shell output
pub struct TextReporter {
    /// Use colored output
    colored: bool,
}

impl TextReporter {
    /// Create a new text reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        ansi_color(text, color, self.colored)
    }

    fn status_color(status: FileStatus) -> &'static str {
        match status {
            FileStatus::Valid => "green",
            FileStatus::Invalid | FileStatus::Error => "red",
            FileStatus::UnknownFormat => "yellow",
        }
    }

    fn render_file(&self, lines: &mut Vec<String>, file: &FileReport) {
        let marker = self.color(file.status.marker(), Self::status_color(file.status));
        let label = file
            .detected
            .as_ref()
            .map_or_else(|| self.color(file.status.label(), "dim"), |d| d.label());
        lines.push(format!("{} {}  {}", marker, file.file, label));

        if let Some(error) = &file.error {
            lines.push(format!("    {}", self.color(error, "red")));
        }

        for issue in &file.conformance {
            lines.push(format!(
                "    {} {}",
                self.color("[schema]", "red"),
                issue
            ));
        }

        for violation in &file.violations {
            let color = match violation.severity {
                crate::validation::ViolationSeverity::Error => "red",
                crate::validation::ViolationSeverity::Warning => "yellow",
                crate::validation::ViolationSeverity::Info => "dim",
            };
            lines.push(format!("    {}", self.color(&violation.to_string(), color)));
        }
    }
}

impl Default for TextReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for TextReporter {
    fn generate(&self, report: &ValidationReport) -> Result<String, ReportError> {
        let mut lines = Vec::new();

        // Header
        lines.push(self.color("SBOM Validation Report", "bold"));
        lines.push(self.color("─".repeat(40).as_str(), "dim"));

        // Per-file results
        for file in &report.files {
            self.render_file(&mut lines, file);
        }

        // Summary footer
        lines.push(String::new());
        let summary = &report.summary;
        let mut parts = vec![format!(
            "{} {}",
            summary.files,
            if summary.files == 1 { "file" } else { "files" }
        )];
        parts.push(format!(
            "{} valid",
            self.color(&summary.valid.to_string(), "green")
        ));
        if summary.invalid > 0 {
            parts.push(format!(
                "{} invalid",
                self.color(&summary.invalid.to_string(), "red")
            ));
        }
        if summary.unknown_format > 0 {
            parts.push(format!(
                "{} unknown format",
                self.color(&summary.unknown_format.to_string(), "yellow")
            ));
        }
        if summary.errors > 0 {
            parts.push(format!(
                "{} errors",
                self.color(&summary.errors.to_string(), "red")
            ));
        }
        lines.push(format!(
            "{}  {}",
            self.color("Total:", "cyan"),
            parts.join(", ")
        ));

        if summary.violations > 0 || summary.conformance_issues > 0 {
            lines.push(format!(
                "{}  {} rule, {} schema",
                self.color("Findings:", "cyan"),
                summary.violations,
                summary.conformance_issues
            ));
        }

        Ok(lines.join("\n"))
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{DetectedFormat, ReportMetadata};
    use crate::validation::Violation;

    fn sample_report() -> ValidationReport {
        let valid = FileReport {
            file: "clean.json".to_string(),
            status: FileStatus::Valid,
            detected: Some(DetectedFormat {
                format: "CycloneDX".to_string(),
                version: "1.6".to_string(),
                variant: String::new(),
                schema_url: String::new(),
            }),
            conformance: Vec::new(),
            violations: Vec::new(),
            error: None,
        };
        let invalid = FileReport {
            file: "dirty.json".to_string(),
            status: FileStatus::Invalid,
            detected: Some(DetectedFormat {
                format: "CycloneDX".to_string(),
                version: "1.4".to_string(),
                variant: String::new(),
                schema_url: String::new(),
            }),
            conformance: Vec::new(),
            violations: vec![Violation::new(
                "unique:id",
                "metadata.properties[1]",
                "x",
                "duplicate value \"x\" for metadata property \"id\"",
            )],
            error: None,
        };
        ValidationReport::new(ReportMetadata::new(), vec![valid, invalid])
    }

    #[test]
    fn test_text_report_lists_files_and_findings() {
        let report = sample_report();
        let out = TextReporter::new().no_color().generate(&report).unwrap();

        assert!(out.contains("clean.json"));
        assert!(out.contains("CycloneDX 1.6"));
        assert!(out.contains("dirty.json"));
        assert!(out.contains("unique:id"));
        assert!(out.contains("metadata.properties[1]"));
        assert!(out.contains("2 files"));
        assert!(out.contains("1 valid"));
        assert!(out.contains("1 invalid"));
    }

    #[test]
    fn test_no_color_output_has_no_ansi_codes() {
        let report = sample_report();
        let out = TextReporter::new().no_color().generate(&report).unwrap();
        assert!(!out.contains("\x1b["));
    }

    #[test]
    fn test_colored_output_has_ansi_codes() {
        let report = sample_report();
        let out = TextReporter::new().generate(&report).unwrap();
        assert!(out.contains("\x1b["));
    }
}
