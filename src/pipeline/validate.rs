//! Validation pipeline: load, detect, conformance, rules.
//!
//! Provides the shared orchestration behind the `validate` command. Input
//! and detection failures are folded into per-file results so a batch
//! always produces a complete report; only configuration problems abort a
//! run, and those surface when the pipeline is constructed.

use crate::config::AppConfig;
use crate::detection::FormatDetector;
use crate::document::CandidateDocument;
use crate::error::Result;
use crate::registry::{SchemaDescriptor, SchemaRegistry};
use crate::reports::{
    DetectedFormat, FileReport, FileStatus, ReportMetadata, ValidationReport,
};
use crate::validation::conformance::{check_document, compile_schema, resolve_schema_file};
use crate::validation::{ConformanceIssue, CustomValidationConfig, RuleEvaluator, UniquenessScope, ViolationSeverity};
use jsonschema::Validator;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A fully loaded validation pipeline.
///
/// Owns the registry and rules so a batch shares one loaded configuration;
/// all methods take `&self`, so batches can fan out across threads.
#[derive(Debug)]
pub struct ValidationPipeline {
    registry: SchemaRegistry,
    rules: CustomValidationConfig,
    schema_dir: Option<PathBuf>,
    schema_override: Option<Validator>,
    scope_override: Option<UniquenessScope>,
    skip_conformance: bool,
    rules_only: bool,
}

impl ValidationPipeline {
    /// Load registry and rules per the application configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let registry = config.data.load_registry()?;
        let rules = config.data.load_rules()?;

        info!(
            formats = registry.format_count(),
            schemas = registry.descriptor_count(),
            rules = rules.rule_count(),
            "loaded validation configuration"
        );

        Ok(Self {
            registry,
            rules,
            schema_dir: config.data.schema_dir.clone(),
            schema_override: None,
            scope_override: config.evaluation.uniqueness_scope,
            skip_conformance: config.evaluation.skip_conformance,
            rules_only: config.evaluation.rules_only,
        })
    }

    /// Force one schema file for the conformance stage of every input.
    ///
    /// Unlike registry-resolved schema files, a forced schema that is
    /// missing or does not compile is a configuration error.
    pub fn with_schema_override(mut self, path: &Path) -> Result<Self> {
        self.schema_override = Some(compile_schema(path)?);
        Ok(self)
    }

    /// The loaded format registry.
    #[must_use]
    pub const fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The loaded custom validation rules.
    #[must_use]
    pub const fn rules(&self) -> &CustomValidationConfig {
        &self.rules
    }

    /// Validate one input file.
    ///
    /// Never fails: unreadable or unparseable inputs and unrecognized
    /// formats become per-file findings. In rules-only mode a detection
    /// failure is downgraded to a warning and the rules still run.
    pub fn validate_file(&self, path: &Path) -> FileReport {
        let file = path.display().to_string();

        let mut doc = match CandidateDocument::load(path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(file = %file, error = %e, "failed to load input");
                return failed_file(file, FileStatus::Error, e.to_string());
            }
        };

        let mut detection_warning = None;
        let descriptor = match FormatDetector::new(&self.registry).detect(&doc) {
            Ok(descriptor) => Some(descriptor),
            Err(e) if self.rules_only => {
                warn!(file = %file, error = %e, "format not recognized, evaluating rules anyway");
                detection_warning = Some(e.to_string());
                None
            }
            Err(e) => {
                return failed_file(file, FileStatus::UnknownFormat, e.to_string());
            }
        };

        let conformance = if let Some(descriptor) = &descriptor {
            debug!(file = %file, format = %descriptor.label(), "detected format");
            doc.attach_format(descriptor.clone());
            self.conformance_issues(&doc, descriptor)
        } else {
            Vec::new()
        };

        let evaluator = match self.scope_override {
            Some(scope) => RuleEvaluator::new(&self.rules).with_scope(scope),
            None => RuleEvaluator::new(&self.rules),
        };
        let violations = evaluator.evaluate(&doc);

        let has_errors = !conformance.is_empty()
            || violations
                .iter()
                .any(|v| v.severity == ViolationSeverity::Error);
        let status = if has_errors {
            FileStatus::Invalid
        } else {
            FileStatus::Valid
        };

        FileReport {
            file,
            status,
            detected: descriptor
                .as_ref()
                .map(DetectedFormat::from_descriptor),
            conformance,
            violations,
            error: detection_warning,
        }
    }

    /// Validate a batch of files, preserving input order.
    ///
    /// With `fail_fast`, processing is sequential and stops after the first
    /// file that is not valid; the report then covers only the files seen.
    pub fn validate_batch(&self, paths: &[PathBuf], fail_fast: bool) -> Vec<FileReport> {
        if fail_fast {
            let mut results = Vec::with_capacity(paths.len());
            for path in paths {
                let result = self.validate_file(path);
                let stop = result.status != FileStatus::Valid;
                results.push(result);
                if stop {
                    break;
                }
            }
            return results;
        }

        use rayon::prelude::*;

        // Parallelism pays for itself only with several inputs
        if paths.len() > 1 {
            paths.par_iter().map(|p| self.validate_file(p)).collect()
        } else {
            paths.iter().map(|p| self.validate_file(p)).collect()
        }
    }

    /// Assemble the final report, recording the data files the run used.
    #[must_use]
    pub fn report(&self, files: Vec<FileReport>) -> ValidationReport {
        let mut metadata = ReportMetadata::new();
        metadata.registry = self
            .registry
            .source()
            .map(|p| p.display().to_string());
        metadata.rules = self.rules.source().map(|p| p.display().to_string());
        ValidationReport::new(metadata, files)
    }

    /// Run the JSON Schema conformance stage, best effort.
    ///
    /// Descriptors without a schema payload on disk (the embedded registry
    /// ships none) skip the stage rather than failing the file.
    fn conformance_issues(
        &self,
        doc: &CandidateDocument,
        descriptor: &SchemaDescriptor,
    ) -> Vec<ConformanceIssue> {
        if self.skip_conformance || self.rules_only {
            return Vec::new();
        }

        if let Some(validator) = &self.schema_override {
            return check_document(validator, doc);
        }

        let Some(schema_path) = self.schema_path_for(descriptor) else {
            debug!(
                schema = %descriptor.label(),
                "descriptor declares no schema file, skipping conformance"
            );
            return Vec::new();
        };
        if !schema_path.exists() {
            debug!(
                schema_file = %schema_path.display(),
                "schema file not on disk, skipping conformance"
            );
            return Vec::new();
        }

        match compile_schema(&schema_path) {
            Ok(validator) => check_document(&validator, doc),
            Err(e) => {
                warn!(
                    schema_file = %schema_path.display(),
                    error = %e,
                    "failed to compile schema, skipping conformance"
                );
                Vec::new()
            }
        }
    }

    /// Locate a descriptor's schema file: an explicit schema directory wins
    /// over registry-relative resolution.
    fn schema_path_for(&self, descriptor: &SchemaDescriptor) -> Option<PathBuf> {
        if descriptor.schema_file().is_empty() {
            return None;
        }
        let raw = Path::new(descriptor.schema_file());
        if raw.is_absolute() {
            return Some(raw.to_path_buf());
        }
        if let Some(dir) = &self.schema_dir {
            let joined = dir.join(raw);
            if joined.exists() {
                return Some(joined);
            }
        }
        resolve_schema_file(descriptor, &self.registry)
    }
}

fn failed_file(file: String, status: FileStatus, error: String) -> FileReport {
    FileReport {
        file,
        status,
        detected: None,
        conformance: Vec::new(),
        violations: Vec::new(),
        error: Some(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use std::io::Write;
    use tempfile::TempDir;

    const REGISTRY: &str = r#"{
        "formats": [
            {
                "name": "CycloneDX",
                "signature": [ { "key": "bomFormat", "equals": "CycloneDX" } ],
                "schemas": [
                    { "version": "1.6", "signature": [ { "key": "specVersion", "equals": "1.6" } ], "latest": true },
                    { "version": "1.4", "signature": [ { "key": "specVersion", "equals": "1.4" } ] }
                ]
            }
        ]
    }"#;

    const RULES: &str = r#"{
        "validation": {
            "metadata": {
                "properties": [
                    { "name": "id", "_validate_unique": "true" }
                ]
            }
        }
    }"#;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn pipeline_with(dir: &TempDir) -> ValidationPipeline {
        let registry_path = write_file(dir, "registry.json", REGISTRY);
        let rules_path = write_file(dir, "rules.json", RULES);
        let config = AppConfig::builder()
            .registry(Some(registry_path))
            .rules(Some(rules_path))
            .build();
        ValidationPipeline::from_config(&config).expect("pipeline")
    }

    #[test]
    fn test_valid_file_passes() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_with(&dir);
        let sbom = write_file(
            &dir,
            "clean.json",
            r#"{"bomFormat": "CycloneDX", "specVersion": "1.6", "components": []}"#,
        );

        let result = pipeline.validate_file(&sbom);
        assert_eq!(result.status, FileStatus::Valid);
        assert_eq!(result.detected.as_ref().unwrap().version, "1.6");
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_duplicate_property_values_fail_the_file() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_with(&dir);
        let sbom = write_file(
            &dir,
            "dupes.json",
            r#"{
                "bomFormat": "CycloneDX",
                "specVersion": "1.4",
                "metadata": {
                    "properties": [
                        { "name": "id", "value": "x1" },
                        { "name": "id", "value": "x1" }
                    ]
                }
            }"#,
        );

        let result = pipeline.validate_file(&sbom);
        assert_eq!(result.status, FileStatus::Invalid);
        assert_eq!(result.violations.len(), 2);
        assert_eq!(result.violations[0].path, "metadata.properties[0]");
        assert_eq!(result.violations[1].path, "metadata.properties[1]");
    }

    #[test]
    fn test_unknown_format_is_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_with(&dir);
        let other = write_file(&dir, "other.json", r#"{"kind": "inventory"}"#);

        let result = pipeline.validate_file(&other);
        assert_eq!(result.status, FileStatus::UnknownFormat);
        assert!(result.error.as_ref().unwrap().contains("kind"));
    }

    #[test]
    fn test_unreadable_file_is_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_with(&dir);

        let result = pipeline.validate_file(Path::new("no/such/file.json"));
        assert_eq!(result.status, FileStatus::Error);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_batch_preserves_input_order() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_with(&dir);
        let a = write_file(
            &dir,
            "a.json",
            r#"{"bomFormat": "CycloneDX", "specVersion": "1.6"}"#,
        );
        let b = write_file(&dir, "b.json", r#"{"kind": "other"}"#);
        let c = write_file(
            &dir,
            "c.json",
            r#"{"bomFormat": "CycloneDX", "specVersion": "1.4"}"#,
        );

        let results = pipeline.validate_batch(&[a.clone(), b.clone(), c.clone()], false);
        assert_eq!(results.len(), 3);
        assert!(results[0].file.ends_with("a.json"));
        assert!(results[1].file.ends_with("b.json"));
        assert!(results[2].file.ends_with("c.json"));
        assert_eq!(results[1].status, FileStatus::UnknownFormat);
    }

    #[test]
    fn test_fail_fast_stops_after_first_failure() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_with(&dir);
        let bad = write_file(&dir, "bad.json", r#"{"kind": "other"}"#);
        let good = write_file(
            &dir,
            "good.json",
            r#"{"bomFormat": "CycloneDX", "specVersion": "1.6"}"#,
        );

        let results = pipeline.validate_batch(&[bad, good], true);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, FileStatus::UnknownFormat);
    }

    #[test]
    fn test_report_names_data_file_sources() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_with(&dir);
        let report = pipeline.report(Vec::new());
        assert!(report
            .metadata
            .registry
            .as_ref()
            .unwrap()
            .ends_with("registry.json"));
        assert!(report
            .metadata
            .rules
            .as_ref()
            .unwrap()
            .ends_with("rules.json"));
    }

    #[test]
    fn test_missing_schema_payload_skips_conformance() {
        // The registry above declares no schema files at all, so the
        // conformance stage must quietly contribute nothing.
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_with(&dir);
        let sbom = write_file(
            &dir,
            "clean.json",
            r#"{"bomFormat": "CycloneDX", "specVersion": "1.6"}"#,
        );
        let result = pipeline.validate_file(&sbom);
        assert!(result.conformance.is_empty());
        assert_eq!(result.status, FileStatus::Valid);
    }

    #[test]
    fn test_conformance_issues_fail_the_file() {
        let dir = TempDir::new().unwrap();
        let registry_json = r#"{
            "formats": [
                {
                    "name": "CycloneDX",
                    "signature": [ { "key": "bomFormat", "equals": "CycloneDX" } ],
                    "schemas": [
                        {
                            "version": "1.6",
                            "signature": [ { "key": "specVersion", "equals": "1.6" } ],
                            "file": "bom.schema.json"
                        }
                    ]
                }
            ]
        }"#;
        let schema = r#"{
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "required": ["bomFormat", "specVersion", "version"]
        }"#;
        let registry_path = write_file(&dir, "registry.json", registry_json);
        write_file(&dir, "bom.schema.json", schema);

        let config = AppConfig::builder()
            .registry(Some(registry_path))
            .build();
        let pipeline = ValidationPipeline::from_config(&config).expect("pipeline");

        let sbom = write_file(
            &dir,
            "incomplete.json",
            r#"{"bomFormat": "CycloneDX", "specVersion": "1.6"}"#,
        );
        let result = pipeline.validate_file(&sbom);
        assert_eq!(result.status, FileStatus::Invalid);
        assert!(!result.conformance.is_empty());
        assert!(result.conformance[0].message.contains("version"));
    }

    #[test]
    fn test_rules_only_evaluates_unrecognized_documents() {
        let dir = TempDir::new().unwrap();
        let registry_path = write_file(&dir, "registry.json", REGISTRY);
        let rules_path = write_file(&dir, "rules.json", RULES);
        let config = AppConfig::builder()
            .registry(Some(registry_path))
            .rules(Some(rules_path))
            .rules_only(true)
            .build();
        let pipeline = ValidationPipeline::from_config(&config).expect("pipeline");

        // Not an SBOM at all, but the property rule still applies.
        let other = write_file(
            &dir,
            "other.json",
            r#"{
                "kind": "inventory",
                "metadata": {
                    "properties": [
                        { "name": "id", "value": "x1" },
                        { "name": "id", "value": "x1" }
                    ]
                }
            }"#,
        );
        let result = pipeline.validate_file(&other);
        assert_eq!(result.status, FileStatus::Invalid);
        assert_eq!(result.violations.len(), 2);
        assert!(result.detected.is_none());
        assert!(result.error.as_ref().unwrap().contains("kind"));
    }

    #[test]
    fn test_schema_override_applies_to_every_input() {
        let dir = TempDir::new().unwrap();
        let schema = write_file(
            &dir,
            "strict.schema.json",
            r#"{
                "$schema": "http://json-schema.org/draft-07/schema#",
                "type": "object",
                "required": ["serialNumber"]
            }"#,
        );
        let pipeline = pipeline_with(&dir)
            .with_schema_override(&schema)
            .expect("compile override");

        let sbom = write_file(
            &dir,
            "no-serial.json",
            r#"{"bomFormat": "CycloneDX", "specVersion": "1.6"}"#,
        );
        let result = pipeline.validate_file(&sbom);
        assert_eq!(result.status, FileStatus::Invalid);
        assert!(result.conformance[0].message.contains("serialNumber"));
    }

    #[test]
    fn test_missing_schema_override_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = pipeline_with(&dir)
            .with_schema_override(Path::new("no/such/schema.json"))
            .expect_err("must fail");
        assert!(err.is_config());
    }

    #[test]
    fn test_scope_override_changes_pooling() {
        let dir = TempDir::new().unwrap();
        let registry_path = write_file(&dir, "registry.json", REGISTRY);
        let rules_path = write_file(&dir, "rules.json", RULES);
        let config = AppConfig::builder()
            .registry(Some(registry_path))
            .rules(Some(rules_path))
            .uniqueness_scope(Some(UniquenessScope::PerList))
            .build();
        let pipeline = ValidationPipeline::from_config(&config).expect("pipeline");

        // Same value in two different property lists: per-list pooling
        // sees no duplicates.
        let sbom = write_file(
            &dir,
            "split.json",
            r#"{
                "bomFormat": "CycloneDX",
                "specVersion": "1.4",
                "metadata": {
                    "properties": [ { "name": "id", "value": "x1" } ],
                    "tools": [
                        { "name": "gen", "properties": [ { "name": "id", "value": "x1" } ] }
                    ]
                }
            }"#,
        );
        let result = pipeline.validate_file(&sbom);
        assert_eq!(result.status, FileStatus::Valid);
        assert!(result.violations.is_empty());
    }
}
