//! Custom validation rule configuration.
//!
//! Rules live in a JSON file shaped like:
//!
//! ```json
//! {
//!   "validation": {
//!     "metadata": {
//!       "properties": [
//!         {
//!           "name": "classification",
//!           "_validate_description": "Disclaimer must be unique and well-formed",
//!           "_validate_unique": true,
//!           "_validate_regex": "^(public|internal)$"
//!         }
//!       ],
//!       "tools": [
//!         { "vendor": "Acme", "name": "scanner", "version": "1.0" }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! The target key of a property rule is its `name` field; entries with an
//! empty `name` are kept as-is and compared like any other. All regexes are
//! compiled when the file is loaded, so a bad pattern fails the whole load
//! rather than surfacing mid-evaluation.

use crate::error::{Result, SbomVetError};
use clap::ValueEnum;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Wire format
// ============================================================================

/// Pooling scope for uniqueness checks.
///
/// `Global` pools property values across every property list in the document
/// (top-level metadata properties plus any nested under metadata tools);
/// `PerList` restricts duplicate detection to values within the same list.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum UniquenessScope {
    #[default]
    Global,
    PerList,
}

/// One declarative rule against named metadata properties.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyRule {
    /// Target key: occurrences are matched on their `name` field.
    #[serde(default)]
    pub name: String,
    /// Expected value for seed/merge tooling; not consulted during evaluation.
    #[serde(default)]
    pub value: String,
    #[serde(default, rename = "_validate_description")]
    pub description: String,
    /// Present in the wire format for compatibility; the target key is
    /// always taken from `name`.
    #[serde(default, rename = "_validate_key")]
    pub key: String,
    #[serde(default, rename = "_validate_unique", deserialize_with = "lenient_bool")]
    pub check_unique: bool,
    #[serde(default, rename = "_validate_regex")]
    pub check_regex: String,
    #[serde(skip)]
    compiled_regex: Option<Regex>,
}

impl PropertyRule {
    /// The property name this rule applies to.
    #[must_use]
    pub fn target_key(&self) -> &str {
        &self.name
    }

    /// Compiled form of `check_regex`, if one was declared.
    #[must_use]
    pub fn pattern(&self) -> Option<&Regex> {
        self.compiled_regex.as_ref()
    }
}

/// One required-tool rule against the document's metadata tools.
///
/// Empty fields are not constraints: a rule only checks the fields it
/// declares, and a rule with no declared fields is inert.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolRule {
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, rename = "_validate_description")]
    pub description: String,
}

impl ToolRule {
    /// True when no field is declared, i.e. the rule can never fail.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.vendor.is_empty() && self.name.is_empty() && self.version.is_empty()
    }

    /// Short identifier for reports: the tool name when declared, otherwise
    /// whichever fields the rule carries.
    #[must_use]
    pub fn identity(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        let mut parts = Vec::new();
        if !self.vendor.is_empty() {
            parts.push(format!("vendor={}", self.vendor));
        }
        if !self.version.is_empty() {
            parts.push(format!("version={}", self.version));
        }
        parts.join(" ")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MetadataRules {
    #[serde(default)]
    properties: Vec<PropertyRule>,
    #[serde(default)]
    tools: Vec<ToolRule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ValidationSection {
    #[serde(default)]
    metadata: MetadataRules,
    #[serde(default)]
    uniqueness_scope: UniquenessScope,
}

// ============================================================================
// Loader
// ============================================================================

/// Parsed and compiled custom-validation ruleset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomValidationConfig {
    #[serde(default)]
    validation: ValidationSection,
    #[serde(skip)]
    source: Option<PathBuf>,
}

impl CustomValidationConfig {
    /// Load rules from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        if display.is_empty() {
            return Err(SbomVetError::config_empty_filename());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| SbomVetError::config_read(&display, e))?;
        let mut config = Self::from_named_json(&content, &display)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse rules from an in-memory JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        Self::from_named_json(content, "<inline rules>")
    }

    fn from_named_json(content: &str, origin: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(content)
            .map_err(|e| SbomVetError::config_malformed(origin, e))?;
        config.compile_patterns(origin)?;
        Ok(config)
    }

    fn compile_patterns(&mut self, origin: &str) -> Result<()> {
        for rule in &mut self.validation.metadata.properties {
            if rule.check_regex.is_empty() {
                continue;
            }
            let compiled = Regex::new(&rule.check_regex)
                .map_err(|e| SbomVetError::config_pattern(origin, &rule.check_regex, e))?;
            rule.compiled_regex = Some(compiled);
        }
        Ok(())
    }

    #[must_use]
    pub fn property_rules(&self) -> &[PropertyRule] {
        &self.validation.metadata.properties
    }

    #[must_use]
    pub fn tool_rules(&self) -> &[ToolRule] {
        &self.validation.metadata.tools
    }

    #[must_use]
    pub const fn uniqueness_scope(&self) -> UniquenessScope {
        self.validation.uniqueness_scope
    }

    /// File the rules were loaded from, when not built from inline JSON.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.validation.metadata.properties.len() + self.validation.metadata.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }
}

/// Accept both JSON booleans and their string spellings ("true"/"false").
fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => Ok(s.trim().eq_ignore_ascii_case("true")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const RULES: &str = r#"{
        "validation": {
            "metadata": {
                "properties": [
                    {
                        "name": "classification",
                        "_validate_description": "exactly one, from the approved set",
                        "_validate_unique": true,
                        "_validate_regex": "^(public|internal)$"
                    },
                    {
                        "name": "id",
                        "_validate_unique": "true"
                    },
                    {
                        "name": "",
                        "_validate_unique": true
                    }
                ],
                "tools": [
                    { "vendor": "Acme", "name": "scanner", "version": "1.0" }
                ]
            }
        }
    }"#;

    #[test]
    fn test_load_full_shape() {
        let config = CustomValidationConfig::from_json(RULES).expect("parse");
        assert_eq!(config.rule_count(), 4);
        assert_eq!(config.property_rules().len(), 3);
        assert_eq!(config.tool_rules().len(), 1);
        assert_eq!(config.property_rules()[0].target_key(), "classification");
        assert!(config.property_rules()[0].pattern().is_some());
        assert_eq!(config.uniqueness_scope(), UniquenessScope::Global);
    }

    #[test]
    fn test_lenient_unique_flag() {
        let config = CustomValidationConfig::from_json(RULES).expect("parse");
        assert!(config.property_rules()[0].check_unique);
        // string spelling
        assert!(config.property_rules()[1].check_unique);
    }

    #[test]
    fn test_lenient_flag_false_spellings() {
        let json = r#"{"validation":{"metadata":{"properties":[
            {"name":"a","_validate_unique":"false"},
            {"name":"b","_validate_unique":""},
            {"name":"c"}
        ]}}}"#;
        let config = CustomValidationConfig::from_json(json).expect("parse");
        assert!(config.property_rules().iter().all(|r| !r.check_unique));
    }

    #[test]
    fn test_empty_target_key_rule_is_kept() {
        let config = CustomValidationConfig::from_json(RULES).expect("parse");
        let empty: Vec<_> = config
            .property_rules()
            .iter()
            .filter(|r| r.target_key().is_empty())
            .collect();
        assert_eq!(empty.len(), 1);
        assert!(empty[0].check_unique);
    }

    #[test]
    fn test_invalid_regex_fails_whole_load() {
        let json = r#"{"validation":{"metadata":{"properties":[
            {"name":"v","_validate_regex":"["}
        ]}}}"#;
        let err = CustomValidationConfig::from_json(json).expect_err("must fail");
        assert!(err.is_config());
        assert!(err.to_string().contains("<inline rules>"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = CustomValidationConfig::load("/no/such/rules.json").expect_err("must fail");
        assert!(err.is_config());
        assert!(err.to_string().contains("/no/such/rules.json"));
    }

    #[test]
    fn test_load_from_file_records_source() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(RULES.as_bytes()).expect("write");
        let config = CustomValidationConfig::load(file.path()).expect("load");
        assert_eq!(config.source(), Some(file.path()));
        assert_eq!(config.rule_count(), 4);
    }

    #[test]
    fn test_uniqueness_scope_per_list() {
        let json = r#"{"validation":{
            "uniqueness_scope": "per-list",
            "metadata":{"properties":[{"name":"id","_validate_unique":true}]}
        }}"#;
        let config = CustomValidationConfig::from_json(json).expect("parse");
        assert_eq!(config.uniqueness_scope(), UniquenessScope::PerList);
    }

    #[test]
    fn test_absent_sections_default_empty() {
        let config = CustomValidationConfig::from_json("{}").expect("parse");
        assert!(config.is_empty());
        assert_eq!(config.uniqueness_scope(), UniquenessScope::Global);
    }

    #[test]
    fn test_inert_tool_rule() {
        let rule = ToolRule::default();
        assert!(rule.is_inert());
        let named = ToolRule {
            name: "scanner".into(),
            ..ToolRule::default()
        };
        assert!(!named.is_inert());
        assert_eq!(named.identity(), "scanner");
    }

    #[test]
    fn test_tool_identity_without_name() {
        let rule = ToolRule {
            vendor: "Acme".into(),
            version: "2.0".into(),
            ..ToolRule::default()
        };
        assert_eq!(rule.identity(), "vendor=Acme version=2.0");
    }
}
