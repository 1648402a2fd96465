//! Built-in data files and their loaders.
//!
//! The binary ships with an embedded format registry, an empty custom
//! rules file, and a license policy table, so it works out of the box
//! without any files on disk. Each can be replaced via [`DataFilesConfig`].

use super::types::DataFilesConfig;
use crate::error::Result;
use crate::policy::LicensePolicyConfig;
use crate::registry::SchemaRegistry;
use crate::validation::CustomValidationConfig;

// ============================================================================
// Embedded Data Files
// ============================================================================

/// Built-in format registry: CycloneDX and SPDX detection signatures.
pub const DEFAULT_REGISTRY_JSON: &str = include_str!("../../data/registry.json");

/// Built-in custom validation rules. Ships empty: rules encode site
/// policy and are expected to come from a project-local file.
pub const DEFAULT_RULES_JSON: &str = include_str!("../../data/rules.json");

/// Built-in license policy table.
pub const DEFAULT_POLICIES_JSON: &str = include_str!("../../data/policies.json");

/// Parse the embedded format registry.
pub fn builtin_registry() -> Result<SchemaRegistry> {
    SchemaRegistry::from_json(DEFAULT_REGISTRY_JSON)
}

/// Parse the embedded custom validation rules.
pub fn builtin_rules() -> Result<CustomValidationConfig> {
    CustomValidationConfig::from_json(DEFAULT_RULES_JSON)
}

/// Parse the embedded license policy table.
pub fn builtin_policies() -> Result<LicensePolicyConfig> {
    LicensePolicyConfig::from_json(DEFAULT_POLICIES_JSON)
}

// ============================================================================
// Resolution Against Configured Paths
// ============================================================================

impl DataFilesConfig {
    /// Load the format registry from the configured path, falling back to
    /// the embedded copy when none is set.
    pub fn load_registry(&self) -> Result<SchemaRegistry> {
        match &self.registry {
            Some(path) => SchemaRegistry::load(path),
            None => builtin_registry(),
        }
    }

    /// Load custom validation rules from the configured path, falling back
    /// to the embedded (empty) copy when none is set.
    pub fn load_rules(&self) -> Result<CustomValidationConfig> {
        match &self.rules {
            Some(path) => CustomValidationConfig::load(path),
            None => builtin_rules(),
        }
    }

    /// Load the license policy table from the configured path, falling back
    /// to the embedded copy when none is set.
    pub fn load_policies(&self) -> Result<LicensePolicyConfig> {
        match &self.policies {
            Some(path) => LicensePolicyConfig::load(path),
            None => builtin_policies(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
