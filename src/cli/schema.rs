//! Schema registry inspection.
//!
//! `schema list` prints every descriptor the loaded registry declares, in
//! declaration order.

use super::table::TableData;
use crate::config::AppConfig;
use crate::pipeline::{auto_detect_format, write_output, OutputTarget};
use crate::registry::SchemaRegistry;
use crate::reports::ReportFormat;
use anyhow::Result;
use serde::Serialize;

/// One rendered row of `schema list`.
#[derive(Debug, Clone, Serialize)]
struct SchemaRow {
    format: String,
    version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    variant: String,
    latest: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    schema_file: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    schema_url: String,
}

/// Run `schema list`: print the registry's descriptors.
pub fn run_schema_list(config: &AppConfig) -> Result<()> {
    let registry = config.data.load_registry()?;

    let rows: Vec<SchemaRow> = registry
        .descriptors()
        .map(|descriptor| SchemaRow {
            format: descriptor.format().to_string(),
            version: descriptor.version().to_string(),
            variant: descriptor.variant().to_string(),
            latest: descriptor.is_latest(),
            schema_file: descriptor.schema_file().to_string(),
            schema_url: descriptor.schema_url().to_string(),
        })
        .collect();

    let target = OutputTarget::from_option(config.output.file.clone());
    let format = auto_detect_format(config.output.format, &target);

    let output = match format {
        ReportFormat::Json => serde_json::to_string_pretty(&rows)?,
        ReportFormat::Csv => descriptor_table(&rows).to_csv(),
        ReportFormat::Markdown => descriptor_table(&rows).to_markdown(),
        _ => format!(
            "{}\n{}\n",
            descriptor_table(&rows).to_text(),
            summary_line(&registry),
        ),
    };

    write_output(&output, &target, config.behavior.quiet)?;
    Ok(())
}

fn descriptor_table(rows: &[SchemaRow]) -> TableData {
    let mut table = TableData::new(["Format", "Version", "Variant", "Latest", "Schema file"]);
    for row in rows {
        table.push_row(vec![
            row.format.clone(),
            row.version.clone(),
            row.variant.clone(),
            if row.latest { "yes" } else { "" }.to_string(),
            row.schema_file.clone(),
        ]);
    }
    table
}

fn summary_line(registry: &SchemaRegistry) -> String {
    format!(
        "{} formats, {} schemas ({})",
        registry.format_count(),
        registry.descriptor_count(),
        registry
            .source()
            .map_or_else(|| "built-in".to_string(), |p| p.display().to_string()),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_listing() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("formats.csv");
        let config = AppConfig::builder().output_file(Some(out.clone())).build();

        run_schema_list(&config).expect("list");
        let csv = std::fs::read_to_string(out).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Format,Version,Variant,Latest,Schema file");
        // Declaration order: every CycloneDX descriptor before any SPDX one.
        let last_cyclonedx = lines
            .iter()
            .rposition(|l| l.starts_with("CycloneDX"))
            .unwrap();
        let first_spdx = lines.iter().position(|l| l.starts_with("SPDX")).unwrap();
        assert!(last_cyclonedx < first_spdx);
    }

    #[test]
    fn test_text_output_names_source() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("formats.txt");
        let config = AppConfig::builder().output_file(Some(out.clone())).build();

        run_schema_list(&config).expect("list");
        let text = std::fs::read_to_string(out).unwrap();
        assert!(text.contains("built-in"));
        assert!(text.contains("CycloneDX"));
    }
}
