//! Validate command handler.
//!
//! Runs the full pipeline over a batch of inputs and renders the report
//! in the requested format.

use crate::config::AppConfig;
use crate::pipeline::{
    auto_detect_format, exit_codes, should_use_color, write_output, OutputTarget,
    ValidationPipeline,
};
use crate::reports::create_reporter_with_options;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Per-invocation options of the `validate` subcommand.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Input files, validated in the order given
    pub paths: Vec<PathBuf>,
    /// Force one schema file for the conformance stage of every input
    pub schema: Option<PathBuf>,
}

/// Run the validate command, returning the process exit code.
pub fn run_validate(config: &AppConfig, options: &ValidateOptions) -> Result<i32> {
    if options.paths.is_empty() {
        bail!("No input files specified");
    }

    let mut pipeline = ValidationPipeline::from_config(config)
        .context("failed to load validation configuration")?;
    if let Some(schema) = &options.schema {
        pipeline = pipeline
            .with_schema_override(schema)
            .with_context(|| format!("cannot use schema override {}", schema.display()))?;
    }

    let files = pipeline.validate_batch(&options.paths, config.behavior.fail_fast);
    let report = pipeline.report(files);

    let target = OutputTarget::from_option(config.output.file.clone());
    let format = auto_detect_format(config.output.format, &target);
    let use_color = should_use_color(config.output.no_color) && target.is_terminal();
    let reporter = create_reporter_with_options(format, use_color, Some(config.output.indent));
    let content = reporter
        .generate(&report)
        .context("failed to render report")?;
    write_output(&content, &target, config.behavior.quiet)?;

    Ok(if report.has_findings() {
        exit_codes::FINDINGS
    } else {
        exit_codes::SUCCESS
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn config_writing_to(dir: &TempDir, name: &str) -> (AppConfig, PathBuf) {
        let out = dir.path().join(name);
        let config = AppConfig::builder().output_file(Some(out.clone())).build();
        (config, out)
    }

    #[test]
    fn test_no_inputs_is_an_error() {
        let config = AppConfig::default();
        let err = run_validate(&config, &ValidateOptions::default()).expect_err("must fail");
        assert!(err.to_string().contains("No input files"));
    }

    #[test]
    fn test_valid_input_exits_zero() {
        let dir = TempDir::new().unwrap();
        let sbom = write_file(
            &dir,
            "bom.json",
            r#"{"bomFormat": "CycloneDX", "specVersion": "1.6", "version": 1}"#,
        );
        let (config, out) = config_writing_to(&dir, "report.json");

        let options = ValidateOptions {
            paths: vec![sbom],
            schema: None,
        };
        let code = run_validate(&config, &options).expect("run");
        assert_eq!(code, exit_codes::SUCCESS);

        let written = std::fs::read_to_string(out).unwrap();
        assert!(written.contains("\"valid\": 1"));
    }

    #[test]
    fn test_unrecognized_input_exits_findings() {
        let dir = TempDir::new().unwrap();
        let other = write_file(&dir, "notes.json", r#"{"kind": "inventory"}"#);
        let (config, _out) = config_writing_to(&dir, "report.json");

        let options = ValidateOptions {
            paths: vec![other],
            schema: None,
        };
        let code = run_validate(&config, &options).expect("run");
        assert_eq!(code, exit_codes::FINDINGS);
    }

    #[test]
    fn test_missing_schema_override_is_an_error() {
        let dir = TempDir::new().unwrap();
        let sbom = write_file(
            &dir,
            "bom.json",
            r#"{"bomFormat": "CycloneDX", "specVersion": "1.6", "version": 1}"#,
        );
        let (config, _out) = config_writing_to(&dir, "report.json");

        let options = ValidateOptions {
            paths: vec![sbom],
            schema: Some(PathBuf::from("no/such/schema.json")),
        };
        let err = run_validate(&config, &options).expect_err("must fail");
        assert!(err.to_string().contains("schema override"));
    }

    #[test]
    fn test_format_follows_output_extension() {
        let dir = TempDir::new().unwrap();
        let sbom = write_file(
            &dir,
            "bom.json",
            r#"{"bomFormat": "CycloneDX", "specVersion": "1.6", "version": 1}"#,
        );
        let (config, out) = config_writing_to(&dir, "report.csv");

        let options = ValidateOptions {
            paths: vec![sbom],
            schema: None,
        };
        run_validate(&config, &options).expect("run");
        let written = std::fs::read_to_string(out).unwrap();
        assert!(written.starts_with("File,Status,Format,Check,Rule,Path,Detail"));
    }
}
