//! Unified error types for sbom-vet.
//!
//! One crate-level error enum covers the whole pipeline: configuration
//! loading, input handling, document parsing, format detection, and the
//! query engine. Rule violations are findings, not errors, and live in
//! [`crate::validation`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sbom-vet operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SbomVetError {
    /// Configuration file errors (registry, custom rules, license policies,
    /// schema files). Always fatal to the invocation.
    #[error("Invalid configuration file {path:?}: {source}")]
    Config {
        path: String,
        #[source]
        source: ConfigErrorKind,
    },

    /// Input file errors (missing, unreadable, empty filename).
    #[error("Input file {path:?}: {source}")]
    Input {
        path: String,
        #[source]
        source: InputErrorKind,
    },

    /// The input bytes are not well-formed JSON.
    #[error("Failed to parse {path:?} as JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// No registry descriptor matched the document.
    ///
    /// Carries the document's observed top-level keys for diagnostics.
    /// Recoverable at the caller's discretion: rule evaluation does not
    /// require a detected format.
    #[error("Unable to determine SBOM format of {path:?}: {detail} (top-level keys: [{}])", .observed_keys.join(", "))]
    UnknownFormat {
        path: String,
        detail: String,
        observed_keys: Vec<String>,
    },

    /// Query evaluation errors (bad path, bad predicate).
    #[error("Query failed: {source}")]
    Query {
        #[source]
        source: QueryErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Report generation errors surfaced through the library API.
    #[error("Report generation failed: {0}")]
    Report(String),
}

/// Specific configuration error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigErrorKind {
    #[error("invalid (empty) filename")]
    EmptyFilename,

    #[error("unable to read file: {source}")]
    Read {
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse content: {source}")]
    Malformed {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid content: {message}")]
    Invalid { message: String },

    #[error("schema does not compile: {message}")]
    SchemaCompile { message: String },
}

/// Specific input error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum InputErrorKind {
    #[error("missing input filename")]
    EmptyFilename,

    #[error("unable to read file: {source}")]
    Read {
        #[source]
        source: std::io::Error,
    },

    #[error("file too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },
}

/// Specific query error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum QueryErrorKind {
    #[error("FROM path {path:?} not found in document")]
    PathNotFound { path: String },

    #[error("FROM path {path:?} does not resolve to an object or array")]
    NotSelectable { path: String },

    #[error("SELECT field {field:?} not found in object at {path:?}")]
    FieldNotFound { field: String, path: String },

    #[error("WHERE clause requires an array at {path:?}")]
    WhereRequiresArray { path: String },

    #[error("invalid WHERE predicate {predicate:?}: {message}")]
    InvalidPredicate { predicate: String, message: String },
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for sbom-vet operations
pub type Result<T> = std::result::Result<T, SbomVetError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl SbomVetError {
    /// Create a config error for an empty filename.
    pub fn config_empty_filename() -> Self {
        Self::Config {
            path: String::new(),
            source: ConfigErrorKind::EmptyFilename,
        }
    }

    /// Create a config error for an unreadable file.
    pub fn config_read(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Config {
            path: path.into(),
            source: ConfigErrorKind::Read { source },
        }
    }

    /// Create a config error for malformed content.
    pub fn config_malformed(path: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Config {
            path: path.into(),
            source: ConfigErrorKind::Malformed { source },
        }
    }

    /// Create a config error for semantically invalid content.
    pub fn config_invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            source: ConfigErrorKind::Invalid {
                message: message.into(),
            },
        }
    }

    /// Create a config error for a pattern that fails to compile.
    pub fn config_pattern(
        path: impl Into<String>,
        pattern: impl Into<String>,
        source: regex::Error,
    ) -> Self {
        Self::Config {
            path: path.into(),
            source: ConfigErrorKind::InvalidPattern {
                pattern: pattern.into(),
                source,
            },
        }
    }

    /// Create a config error for a schema that fails to compile.
    pub fn config_schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            source: ConfigErrorKind::SchemaCompile {
                message: message.into(),
            },
        }
    }

    /// Create an input error for an empty filename.
    pub fn input_empty_filename() -> Self {
        Self::Input {
            path: String::new(),
            source: InputErrorKind::EmptyFilename,
        }
    }

    /// Create an input error for an unreadable file.
    pub fn input_read(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Input {
            path: path.into(),
            source: InputErrorKind::Read { source },
        }
    }

    /// Create an input error for a file exceeding the size guard.
    pub fn input_too_large(path: impl Into<String>, size: u64, limit: u64) -> Self {
        Self::Input {
            path: path.into(),
            source: InputErrorKind::TooLarge { size, limit },
        }
    }

    /// Create a parse error for invalid JSON input.
    pub fn parse(path: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Create an unknown-format error: no generic signature matched at all.
    pub fn unknown_format(path: impl Into<String>, observed_keys: Vec<String>) -> Self {
        Self::UnknownFormat {
            path: path.into(),
            detail: "no format signature matched".to_string(),
            observed_keys,
        }
    }

    /// Create an unknown-format error: a format claimed the document but no
    /// schema version signature matched.
    pub fn unknown_version(
        path: impl Into<String>,
        format: impl Into<String>,
        observed_keys: Vec<String>,
    ) -> Self {
        Self::UnknownFormat {
            path: path.into(),
            detail: format!(
                "matched format {:?} but no schema version signature",
                format.into()
            ),
            observed_keys,
        }
    }

    /// Create a query error.
    pub fn query(source: QueryErrorKind) -> Self {
        Self::Query { source }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a report error
    pub fn report(message: impl Into<String>) -> Self {
        Self::Report(message.into())
    }

    /// True for detection failures that a caller may choose to recover from
    /// (e.g. still run custom rules against the undetected document).
    #[must_use]
    pub const fn is_unknown_format(&self) -> bool {
        matches!(self, Self::UnknownFormat { .. })
    }

    /// True for configuration failures, which are always fatal.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for SbomVetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn json_err() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{not json").unwrap_err()
    }

    #[test]
    fn test_config_error_display_contains_filename() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = SbomVetError::config_read("missing/config.json", io_err);
        let display = err.to_string();
        assert!(
            display.contains("missing/config.json"),
            "Config error must name the attempted file: {}",
            display
        );
    }

    #[test]
    fn test_config_error_source_chain() {
        let err = SbomVetError::config_malformed("custom.json", json_err());
        let source = err.source().expect("config error should carry a source");
        assert!(source.to_string().contains("cannot parse"));
    }

    #[test]
    fn test_config_pattern_error_names_pattern() {
        let bad = regex::Regex::new("[unclosed").unwrap_err();
        let err = SbomVetError::config_pattern("custom.json", "[unclosed", bad);
        let display = format!("{}: {}", err, err.source().expect("source"));
        assert!(display.contains("custom.json"));
        assert!(display.contains("[unclosed"));
    }

    #[test]
    fn test_input_empty_filename() {
        let err = SbomVetError::input_empty_filename();
        assert!(err.to_string().contains("missing input filename"));
    }

    #[test]
    fn test_unknown_format_lists_observed_keys() {
        let err = SbomVetError::unknown_format(
            "thing.json",
            vec!["foo".to_string(), "bar".to_string()],
        );
        let display = err.to_string();
        assert!(display.contains("thing.json"));
        assert!(display.contains("foo, bar"));
        assert!(err.is_unknown_format());
        assert!(!err.is_config());
    }

    #[test]
    fn test_unknown_version_names_claimed_format() {
        let err = SbomVetError::unknown_version(
            "bom.json",
            "CycloneDX",
            vec!["bomFormat".to_string(), "specVersion".to_string()],
        );
        let display = err.to_string();
        assert!(display.contains("CycloneDX"));
        assert!(display.contains("bomFormat, specVersion"));
    }

    #[test]
    fn test_io_error_contains_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = SbomVetError::io("/path/to/file.json", io_err);
        assert!(err.to_string().contains("/path/to/file.json"));
    }

    #[test]
    fn test_query_error_display() {
        let err = SbomVetError::query(QueryErrorKind::PathNotFound {
            path: "metadata.missing".to_string(),
        });
        let display = format!("{}: {}", err, err.source().expect("source"));
        assert!(display.contains("metadata.missing"));
    }
}
