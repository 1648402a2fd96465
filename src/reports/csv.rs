//! CSV report generator.
//!
//! Generates one comma-separated row per finding, suitable for
//! spreadsheet import and data analysis pipelines.

use super::{FileReport, ReportError, ReportFormat, ReportGenerator, ValidationReport};

/// CSV report generator.
pub struct CsvReporter;

impl CsvReporter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for CsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for CsvReporter {
    fn generate(&self, report: &ValidationReport) -> Result<String, ReportError> {
        let mut content = String::new();
        content.push_str("File,Status,Format,Check,Rule,Path,Detail\n");

        for file in &report.files {
            write_file_rows(&mut content, file);
        }

        Ok(content)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Csv
    }
}

fn write_file_rows(content: &mut String, file: &FileReport) {
    let format_label = file
        .detected
        .as_ref()
        .map_or_else(|| "-".to_string(), super::DetectedFormat::label);

    if file.finding_count() == 0 {
        content.push_str(&format!(
            "\"{}\",{},\"{}\",-,-,-,\"{}\"\n",
            escape_csv(&file.file),
            file.status,
            escape_csv(&format_label),
            file.error.as_deref().map(escape_csv).unwrap_or_default()
        ));
        return;
    }

    for issue in &file.conformance {
        let path = if issue.instance_path.is_empty() {
            "(root)"
        } else {
            issue.instance_path.as_str()
        };
        content.push_str(&format!(
            "\"{}\",{},\"{}\",schema,-,\"{}\",\"{}\"\n",
            escape_csv(&file.file),
            file.status,
            escape_csv(&format_label),
            escape_csv(path),
            escape_csv(&issue.message)
        ));
    }

    for violation in &file.violations {
        content.push_str(&format!(
            "\"{}\",{},\"{}\",rule,\"{}\",\"{}\",\"{}\"\n",
            escape_csv(&file.file),
            file.status,
            escape_csv(&format_label),
            escape_csv(&violation.rule),
            escape_csv(&violation.path),
            escape_csv(&violation.reason)
        ));
    }
}

/// Escape a string for CSV embedding: double-quote escaping per RFC 4180,
/// plus newline flattening since fields are already wrapped in double quotes.
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"").replace('\n', " ")
}
