//! **A library for classifying and validating Software Bills of Materials (SBOMs).**
//!
//! `sbom-vet` answers two questions about a JSON document that claims to be an
//! SBOM: *what is it* (which format and specification version) and *is it any
//! good* (does it conform to the format's schema and to your own rules). It
//! powers both a command-line interface for CI pipelines and a Rust library for
//! programmatic integration.
//!
//! Detection is registry-driven: a table of format descriptors, each carrying a
//! structural signature, is matched against the document's top-level keys. The
//! registry ships built in and can be replaced with a JSON file, so supporting
//! a new format version is a data change, not a code change.
//!
//! ## Key Features
//!
//! - **Format Detection**: Identifies CycloneDX (1.2 through 1.6) and SPDX
//!   (2.2, 2.3) JSON documents from structural signatures, without guessing
//!   from file names.
//! - **Schema Conformance**: Validates detected documents against the format's
//!   JSON Schema, collecting every violation with its instance path.
//! - **Custom Rules**: Evaluates user-defined uniqueness and pattern rules
//!   against any part of the document, with deterministic finding order.
//! - **License Inspection**: Collects license declarations, checks SPDX
//!   expression validity, and joins them against a usage policy table.
//! - **Queries**: Extracts sub-trees with small SELECT/FROM/WHERE clauses,
//!   preserving the document's key order.
//! - **Reports**: Renders results as text, JSON, CSV, or Markdown.
//!
//! ## Core Concepts & Modules
//!
//! The library is organized around a simple pipeline:
//!
//! 1. [`document`]: Loads an input file into a [`CandidateDocument`], an
//!    order-preserving JSON tree plus file metadata.
//! 2. [`registry`]: The [`SchemaRegistry`] of format descriptors and their
//!    detection signatures.
//! 3. [`detection`]: The [`FormatDetector`] matches a candidate against the
//!    registry and names its format, or reports the keys it saw.
//! 4. [`validation`]: JSON-Schema conformance plus the [`RuleEvaluator`] for
//!    custom uniqueness and pattern rules.
//! 5. [`policy`] and [`query`]: license policy rulings and document queries.
//! 6. [`reports`]: renders a [`ValidationReport`] in the configured format.
//!
//! The [`pipeline`] module ties the stages together behind
//! [`ValidationPipeline`], and [`config`] layers defaults, config files, and
//! command-line overrides into one [`AppConfig`].
//!
//! ## Getting Started
//!
//! Detect and validate a single document:
//!
//! ```no_run
//! use sbom_vet::{CandidateDocument, FormatDetector, RuleEvaluator};
//! use sbom_vet::config::builtin_registry;
//! use sbom_vet::validation::CustomValidationConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = builtin_registry()?;
//! let doc = CandidateDocument::load("bom.cdx.json")?;
//!
//! let detector = FormatDetector::new(&registry);
//! let descriptor = detector.detect(&doc)?;
//! println!("{} {}", descriptor.format(), descriptor.version());
//!
//! let rules = CustomValidationConfig::load("rules.json")?;
//! let violations = RuleEvaluator::new(&rules).evaluate(&doc);
//! for v in &violations {
//!     println!("{}: {} at {}", v.rule, v.reason, v.path);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Or run the whole pipeline the way the CLI does:
//!
//! ```no_run
//! use sbom_vet::config::AppConfig;
//! use sbom_vet::pipeline::ValidationPipeline;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let pipeline = ValidationPipeline::from_config(&config)?;
//! let files = pipeline.validate_batch(&["bom.cdx.json".into()], false);
//! let report = pipeline.report(files);
//! println!(
//!     "{}/{} valid, {} rule violations",
//!     report.summary.valid, report.summary.files, report.summary.violations
//! );
//! # Ok(())
//! # }
//! ```

#![warn(clippy::unwrap_used)]
#![allow(
    // Style lints that conflict with this codebase's conventions
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    // Doc completeness: # Errors / # Panics sections are written only where
    // the failure modes are not obvious from the signature
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cli;
pub mod config;
pub mod detection;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod query;
pub mod registry;
pub mod reports;
pub mod validation;

// Core types
pub use document::CandidateDocument;
pub use error::{Result, SbomVetError};
pub use registry::{FormatEntry, SchemaDescriptor, SchemaRegistry};

// Detection
pub use detection::{detect_format, FormatDetector};

// Validation
pub use validation::{
    evaluate_rules, CustomValidationConfig, RuleEvaluator, UniquenessScope, Violation,
    ViolationSeverity,
};

// License policy and queries
pub use policy::{collect_licenses, LicenseOccurrence, LicensePolicyConfig, UsagePolicy};
pub use query::QueryRequest;

// Pipeline and reporting
pub use config::AppConfig;
pub use pipeline::ValidationPipeline;
pub use reports::{create_reporter, ReportFormat, ReportGenerator, ValidationReport};
