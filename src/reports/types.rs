//! Report type definitions.

use crate::registry::SchemaDescriptor;
use crate::validation::{ConformanceIssue, Violation, ViolationSeverity};
use chrono::Utc;
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output format for reports
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Auto-detect: by output file extension, text otherwise
    #[default]
    Auto,
    /// Human-readable terminal output
    Text,
    /// Structured JSON output
    Json,
    /// CSV for spreadsheet import
    Csv,
    /// Human-readable Markdown
    #[value(alias = "md")]
    Markdown,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Auto => write!(f, "auto"),
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Csv => write!(f, "csv"),
            ReportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Outcome of validating a single input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileStatus {
    /// Detected, conformant, and no rule violations
    Valid,
    /// Detected but failed conformance or rule checks
    Invalid,
    /// No registered format signature matched
    UnknownFormat,
    /// The file could not be read or parsed
    Error,
}

impl FileStatus {
    /// Short status label for tabular output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::UnknownFormat => "unknown-format",
            Self::Error => "error",
        }
    }

    /// One-character marker for terminal output.
    #[must_use]
    pub const fn marker(&self) -> &'static str {
        match self {
            Self::Valid => "✓",
            Self::Invalid => "✗",
            Self::UnknownFormat => "?",
            Self::Error => "!",
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Serializable summary of a matched schema descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedFormat {
    /// Format name, e.g. "CycloneDX"
    pub format: String,
    /// Schema version label, e.g. "1.4"
    pub version: String,
    /// Variant label; empty for the base variant
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub variant: String,
    /// Canonical schema URL, if declared
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub schema_url: String,
}

impl DetectedFormat {
    /// Snapshot a registry descriptor into a report row.
    #[must_use]
    pub fn from_descriptor(descriptor: &SchemaDescriptor) -> Self {
        Self {
            format: descriptor.format().to_string(),
            version: descriptor.version().to_string(),
            variant: descriptor.variant().to_string(),
            schema_url: descriptor.schema_url().to_string(),
        }
    }

    /// Human-readable label, e.g. `CycloneDX 1.4`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.variant.is_empty() {
            format!("{} {}", self.format, self.version)
        } else {
            format!("{} {} ({})", self.format, self.version, self.variant)
        }
    }
}

/// Per-file validation results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// Input file path as given on the command line
    pub file: String,
    /// Overall outcome for this file
    pub status: FileStatus,
    /// Matched format, when detection succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected: Option<DetectedFormat>,
    /// JSON Schema conformance findings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conformance: Vec<ConformanceIssue>,
    /// Custom rule violations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
    /// Load or detection error, for non-fatal failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    /// Total findings attached to this file.
    #[must_use]
    pub fn finding_count(&self) -> usize {
        self.conformance.len() + self.violations.len()
    }

    /// True when every violation is a warning or informational finding.
    #[must_use]
    pub fn only_warnings(&self) -> bool {
        self.conformance.is_empty()
            && self
                .violations
                .iter()
                .all(|v| v.severity != ViolationSeverity::Error)
    }
}

/// Aggregated counts across a batch of files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub files: usize,
    pub valid: usize,
    pub invalid: usize,
    pub unknown_format: usize,
    pub errors: usize,
    pub conformance_issues: usize,
    pub violations: usize,
}

impl ReportSummary {
    /// Tally a batch of per-file results.
    #[must_use]
    pub fn from_files(files: &[FileReport]) -> Self {
        let mut summary = Self {
            files: files.len(),
            ..Self::default()
        };
        for file in files {
            match file.status {
                FileStatus::Valid => summary.valid += 1,
                FileStatus::Invalid => summary.invalid += 1,
                FileStatus::UnknownFormat => summary.unknown_format += 1,
                FileStatus::Error => summary.errors += 1,
            }
            summary.conformance_issues += file.conformance.len();
            summary.violations += file.violations.len();
        }
        summary
    }
}

/// Metadata included in reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Tool name
    pub tool: String,
    /// Tool version
    pub version: String,
    /// Generation timestamp (RFC 3339)
    pub generated_at: String,
    /// Registry file the run used, when loaded from disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    /// Rules file the run used, when loaded from disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
}

impl ReportMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tool: "sbom-vet".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now().to_rfc3339(),
            registry: None,
            rules: None,
        }
    }
}

impl Default for ReportMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// Full validation report for a batch of input files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub files: Vec<FileReport>,
}

impl ValidationReport {
    /// Assemble a report, computing the summary from the file results.
    #[must_use]
    pub fn new(metadata: ReportMetadata, files: Vec<FileReport>) -> Self {
        Self {
            metadata,
            summary: ReportSummary::from_files(&files),
            files,
        }
    }

    /// True when at least one file produced findings or failed to load.
    #[must_use]
    pub fn has_findings(&self) -> bool {
        self.summary.invalid > 0 || self.summary.unknown_format > 0 || self.summary.errors > 0
    }
}
