//! License command handlers.
//!
//! `license list` locates license declarations in one document and can
//! join the policy table; `license policy` prints the loaded table.

use super::table::TableData;
use crate::config::AppConfig;
use crate::document::CandidateDocument;
use crate::pipeline::{auto_detect_format, write_output, OutputTarget};
use crate::policy::{collect_licenses, LicensePolicyConfig, UsagePolicy};
use crate::reports::ReportFormat;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// One rendered row of `license list`.
#[derive(Debug, Clone, Serialize)]
struct LicenseRow {
    expression: String,
    location: String,
    valid_spdx: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage: Option<UsagePolicy>,
}

/// Run `license list`: collect declarations, optionally joined with the
/// policy table.
pub fn run_license_list(config: &AppConfig, path: &Path, with_policy: bool) -> Result<()> {
    let doc = CandidateDocument::load(path)
        .with_context(|| format!("failed to load {}", path.display()))?;

    let policy = if with_policy {
        Some(config.data.load_policies()?)
    } else {
        None
    };

    let rows: Vec<LicenseRow> = collect_licenses(&doc)
        .into_iter()
        .map(|found| LicenseRow {
            usage: policy
                .as_ref()
                .map(|table| table.usage_for_expression(&found.expression)),
            expression: found.expression,
            location: found.location,
            valid_spdx: found.valid_spdx,
        })
        .collect();

    let target = OutputTarget::from_option(config.output.file.clone());
    let format = auto_detect_format(config.output.format, &target);

    let output = match format {
        ReportFormat::Json => serde_json::to_string_pretty(&rows)?,
        ReportFormat::Csv => list_table(&rows, with_policy).to_csv(),
        ReportFormat::Markdown => list_table(&rows, with_policy).to_markdown(),
        _ => {
            if rows.is_empty() {
                format!("No license declarations found in {}\n", doc.file_name())
            } else {
                format!(
                    "Licenses in {}:\n\n{}\n{} declarations\n",
                    doc.file_name(),
                    list_table(&rows, with_policy).to_text(),
                    rows.len()
                )
            }
        }
    };

    write_output(&output, &target, config.behavior.quiet)?;
    Ok(())
}

/// Run `license policy`: print the loaded policy table.
pub fn run_license_policy(config: &AppConfig) -> Result<()> {
    let policy = config.data.load_policies()?;

    let target = OutputTarget::from_option(config.output.file.clone());
    let format = auto_detect_format(config.output.format, &target);

    let output = match format {
        ReportFormat::Json => serde_json::to_string_pretty(policy.policies())?,
        ReportFormat::Csv => policy_table(&policy).to_csv(),
        ReportFormat::Markdown => policy_table(&policy).to_markdown(),
        _ => format!(
            "{}\n{} policies ({})\n",
            policy_table(&policy).to_text(),
            policy.len(),
            policy
                .source()
                .map_or_else(|| "built-in".to_string(), |p| p.display().to_string()),
        ),
    };

    write_output(&output, &target, config.behavior.quiet)?;
    Ok(())
}

fn list_table(rows: &[LicenseRow], with_policy: bool) -> TableData {
    let headers: &[&str] = if with_policy {
        &["Expression", "Location", "SPDX", "Usage"]
    } else {
        &["Expression", "Location", "SPDX"]
    };
    let mut table = TableData::new(headers.iter().copied());
    for row in rows {
        let mut cells = vec![
            row.expression.clone(),
            row.location.clone(),
            if row.valid_spdx { "yes" } else { "no" }.to_string(),
        ];
        if let Some(usage) = row.usage {
            cells.push(usage.to_string());
        }
        table.push_row(cells);
    }
    table
}

fn policy_table(policy: &LicensePolicyConfig) -> TableData {
    let mut table = TableData::new(["Id", "Family", "Usage", "Aliases"]);
    for row in policy.policies() {
        table.push_row(vec![
            row.id.clone(),
            row.family.clone(),
            row.usage_policy.to_string(),
            row.aliases.join(", "),
        ]);
    }
    table
}

// ============================================================================
// Tests
// ============================================================================
