//! Markdown report generator.
//!
//! Produces a document suitable for pull-request comments and wikis.

use super::escape::escape_markdown_table;
use super::{FileReport, ReportError, ReportFormat, ReportGenerator, ValidationReport};
use std::fmt::Write;

/// Markdown report generator
pub struct MarkdownReporter;

impl MarkdownReporter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for MarkdownReporter {
    fn generate(&self, report: &ValidationReport) -> Result<String, ReportError> {
        let mut out = String::new();

        writeln!(out, "# SBOM Validation Report")?;
        writeln!(out)?;
        writeln!(
            out,
            "Generated by {} {} at {}",
            report.metadata.tool, report.metadata.version, report.metadata.generated_at
        )?;
        writeln!(out)?;

        // Summary table
        let summary = &report.summary;
        writeln!(out, "## Summary")?;
        writeln!(out)?;
        writeln!(out, "| Files | Valid | Invalid | Unknown format | Errors |")?;
        writeln!(out, "|-------|-------|---------|----------------|--------|")?;
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            summary.files, summary.valid, summary.invalid, summary.unknown_format, summary.errors
        )?;
        writeln!(out)?;

        for file in &report.files {
            write_file_section(&mut out, file)?;
        }

        Ok(out)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Markdown
    }
}

fn write_file_section(out: &mut String, file: &FileReport) -> Result<(), ReportError> {
    writeln!(out, "## `{}`", file.file.replace('`', "'"))?;
    writeln!(out)?;

    let format_label = file
        .detected
        .as_ref()
        .map_or_else(|| "unknown".to_string(), super::DetectedFormat::label);
    writeln!(
        out,
        "Status: **{}** ({})",
        file.status,
        escape_markdown_table(&format_label)
    )?;
    writeln!(out)?;

    if let Some(error) = &file.error {
        writeln!(out, "> {}", escape_markdown_table(error))?;
        writeln!(out)?;
    }

    if file.finding_count() == 0 {
        return Ok(());
    }

    writeln!(out, "| Check | Rule | Path | Detail |")?;
    writeln!(out, "|-------|------|------|--------|")?;

    for issue in &file.conformance {
        let path = if issue.instance_path.is_empty() {
            "(root)"
        } else {
            issue.instance_path.as_str()
        };
        writeln!(
            out,
            "| schema | - | `{}` | {} |",
            escape_markdown_table(path),
            escape_markdown_table(&issue.message)
        )?;
    }

    for violation in &file.violations {
        writeln!(
            out,
            "| rule | `{}` | `{}` | {} |",
            escape_markdown_table(&violation.rule),
            escape_markdown_table(&violation.path),
            escape_markdown_table(&violation.reason)
        )?;
    }

    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{DetectedFormat, FileStatus, ReportMetadata};
    use crate::validation::Violation;

    #[test]
    fn test_markdown_report_structure() {
        let report = ValidationReport::new(
            ReportMetadata::new(),
            vec![FileReport {
                file: "sbom.json".to_string(),
                status: FileStatus::Invalid,
                detected: Some(DetectedFormat {
                    format: "SPDX".to_string(),
                    version: "SPDX-2.3".to_string(),
                    variant: String::new(),
                    schema_url: String::new(),
                }),
                conformance: Vec::new(),
                violations: vec![Violation::new(
                    "unique:id",
                    "metadata.properties[1]",
                    "x",
                    "duplicate value",
                )],
                error: None,
            }],
        );

        let out = MarkdownReporter::new().generate(&report).unwrap();
        assert!(out.starts_with("# SBOM Validation Report"));
        assert!(out.contains("## Summary"));
        assert!(out.contains("## `sbom.json`"));
        assert!(out.contains("SPDX SPDX-2.3"));
        assert!(out.contains("| rule | `unique:id` |"));
    }

    #[test]
    fn test_markdown_escapes_pipes_in_values() {
        let report = ValidationReport::new(
            ReportMetadata::new(),
            vec![FileReport {
                file: "sbom.json".to_string(),
                status: FileStatus::Invalid,
                detected: None,
                conformance: Vec::new(),
                violations: vec![Violation::new(
                    "regex:name",
                    "metadata.properties[0]",
                    "a|b",
                    "value \"a|b\" does not match pattern \"^x\"",
                )],
                error: None,
            }],
        );

        let out = MarkdownReporter::new().generate(&report).unwrap();
        assert!(out.contains("a\\|b"));
    }
}
