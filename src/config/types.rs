//! Configuration types for sbom-vet operations.

use crate::reports::ReportFormat;
use crate::validation::UniquenessScope;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration, loadable from CLI args or config files.
///
/// CLI arguments are layered over file settings via [`AppConfig::merge`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Locations of the data files (registry, rules, policies)
    pub data: DataFilesConfig,
    /// Output configuration (format, file, colors)
    pub output: OutputConfig,
    /// Rule evaluation tuning
    pub evaluation: EvaluationConfig,
    /// Behavior flags
    pub behavior: BehaviorConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the format registry file.
    pub fn registry(mut self, path: Option<PathBuf>) -> Self {
        self.config.data.registry = path;
        self
    }

    /// Set the custom validation rules file.
    pub fn rules(mut self, path: Option<PathBuf>) -> Self {
        self.config.data.rules = path;
        self
    }

    /// Set the license policy file.
    pub fn policies(mut self, path: Option<PathBuf>) -> Self {
        self.config.data.policies = path;
        self
    }

    /// Set the base directory for schema files.
    pub fn schema_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config.data.schema_dir = dir;
        self
    }

    /// Set the output format.
    pub const fn output_format(mut self, format: ReportFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Set the output file.
    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    /// Disable colored output.
    pub const fn no_color(mut self, no_color: bool) -> Self {
        self.config.output.no_color = no_color;
        self
    }

    /// Override the uniqueness pooling scope declared by the rules file.
    pub const fn uniqueness_scope(mut self, scope: Option<UniquenessScope>) -> Self {
        self.config.evaluation.uniqueness_scope = scope;
        self
    }

    /// Skip the JSON-Schema conformance stage.
    pub const fn skip_conformance(mut self, skip: bool) -> Self {
        self.config.evaluation.skip_conformance = skip;
        self
    }

    /// Evaluate custom rules even when format detection fails.
    pub const fn rules_only(mut self, rules_only: bool) -> Self {
        self.config.evaluation.rules_only = rules_only;
        self
    }

    /// Enable quiet mode.
    pub const fn quiet(mut self, quiet: bool) -> Self {
        self.config.behavior.quiet = quiet;
        self
    }

    /// Stop a batch at the first invalid document.
    pub const fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.behavior.fail_fast = fail_fast;
        self
    }

    /// Build the `AppConfig`.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Sub-configuration Types
// ============================================================================

/// Locations of the data files the tool reads at startup.
///
/// Unset entries fall back to the built-in copies compiled into the binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DataFilesConfig {
    /// Format registry (signatures and schema descriptors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<PathBuf>,
    /// Custom validation rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<PathBuf>,
    /// License policy table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policies: Option<PathBuf>,
    /// Base directory for schema files; overrides registry-relative lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_dir: Option<PathBuf>,
}

/// Output-related configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: ReportFormat,
    /// Output file path (None for stdout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Disable colored output
    pub no_color: bool,
    /// Indentation width for JSON output
    #[schemars(range(min = 0, max = 16))]
    pub indent: usize,
}

impl OutputConfig {
    /// Default indentation width for JSON output.
    pub const DEFAULT_INDENT: usize = 4;
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Auto,
            file: None,
            no_color: false,
            indent: Self::DEFAULT_INDENT,
        }
    }
}

/// Rule evaluation tuning.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Pooling scope for uniqueness rules; overrides the rules file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uniqueness_scope: Option<UniquenessScope>,
    /// Skip the JSON-Schema conformance stage
    pub skip_conformance: bool,
    /// Evaluate custom rules even when format detection fails; detection
    /// failures become warnings and conformance is not run
    pub rules_only: bool,
}

/// Behavior flags
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Suppress non-essential output
    pub quiet: bool,
    /// Stop validating a batch at the first invalid document
    pub fail_fast: bool,
}
