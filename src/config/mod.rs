//! Configuration module for sbom-vet.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Embedded default data files (registry, rules, license policies)
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sbom_vet::config::AppConfig;
//!
//! // Use defaults
//! let config = AppConfig::default();
//!
//! // Use builder
//! let config = AppConfig::builder()
//!     .rules(Some("ci/sbom-rules.json".into()))
//!     .fail_fast(true)
//!     .build();
//!
//! // Load from file
//! use sbom_vet::config::load_or_default;
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.sbom-vet.yaml` file in your project root or `~/.config/sbom-vet/`:
//!
//! ```yaml
//! data:
//!   rules: ./ci/sbom-rules.json
//! behavior:
//!   fail_fast: true
//! ```

mod defaults;
pub mod file;
mod types;

// Re-export main types
pub use defaults::{
    builtin_policies, builtin_registry, builtin_rules, DEFAULT_POLICIES_JSON,
    DEFAULT_REGISTRY_JSON, DEFAULT_RULES_JSON,
};
pub use types::{
    AppConfig, AppConfigBuilder, BehaviorConfig, DataFilesConfig, EvaluationConfig, OutputConfig,
};

// Re-export file utilities
pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.sbom-vet.yaml` config files. It can be used by editors for
/// validation and autocompletion.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
