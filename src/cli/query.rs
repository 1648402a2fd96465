//! Query command handler.
//!
//! Extracts a sub-tree from one document with SELECT/FROM/WHERE clauses
//! and renders it as JSON or, for tabular results, as a row table.

use super::table::TableData;
use crate::config::AppConfig;
use crate::document::CandidateDocument;
use crate::pipeline::{auto_detect_format, write_output, OutputTarget};
use crate::query::QueryRequest;
use crate::reports::ReportFormat;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

/// Clause strings of one `query` invocation, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Comma-separated fields to project, or `*`
    pub select: String,
    /// Dot-separated key path to walk before selecting
    pub from: String,
    /// Optional comma-separated `key=regex` predicates
    pub where_clause: Option<String>,
}

/// Run the query command against one input document.
pub fn run_query(config: &AppConfig, path: &Path, options: &QueryOptions) -> Result<()> {
    let doc = CandidateDocument::load(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let request = QueryRequest::parse(
        &options.select,
        &options.from,
        options.where_clause.as_deref(),
    )?;
    let result = request.execute(doc.tree())?;

    let target = OutputTarget::from_option(config.output.file.clone());
    let format = auto_detect_format(config.output.format, &target);

    let output = match format {
        ReportFormat::Json => serde_json::to_string_pretty(&result)?,
        ReportFormat::Csv => match tabulate(&result) {
            Some(table) => table.to_csv(),
            None => bail!("query result is not tabular; use --format json"),
        },
        ReportFormat::Markdown => match tabulate(&result) {
            Some(table) => table.to_markdown(),
            None => bail!("query result is not tabular; use --format json"),
        },
        // Scalars and nested objects have no row shape; print them as JSON
        _ => match tabulate(&result) {
            Some(table) => format!("{}\n{} rows ({request})\n", table.to_text(), table.len()),
            None => serde_json::to_string_pretty(&result)?,
        },
    };

    write_output(&output, &target, config.behavior.quiet)?;
    Ok(())
}

/// Lay an array of objects out as rows under the union of their keys,
/// holding first-seen key order. Anything else is not tabular.
fn tabulate(value: &Value) -> Option<TableData> {
    let Value::Array(entries) = value else {
        return None;
    };
    if entries.is_empty() {
        return None;
    }

    let mut headers: Vec<String> = Vec::new();
    for entry in entries {
        let Value::Object(map) = entry else {
            return None;
        };
        for key in map.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }

    let mut table = TableData::new(headers.iter().map(String::as_str));
    for entry in entries {
        let row = headers
            .iter()
            .map(|h| entry.get(h).map_or_else(String::new, render_cell))
            .collect();
        table.push_row(row);
    }
    Some(table)
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const DOC: &str = r#"{
        "bomFormat": "CycloneDX",
        "specVersion": "1.6",
        "components": [
            { "name": "zlib", "version": "1.3" },
            { "name": "openssl", "version": "3.2.1", "scope": "required" }
        ]
    }"#;

    fn write_doc(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("bom.json");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(DOC.as_bytes()).unwrap();
        path
    }

    fn run_to_file(format: &str, options: &QueryOptions) -> String {
        let dir = TempDir::new().unwrap();
        let doc = write_doc(&dir);
        let out = dir.path().join(format!("result.{format}"));
        let config = AppConfig::builder().output_file(Some(out.clone())).build();
        run_query(&config, &doc, options).expect("query");
        std::fs::read_to_string(out).unwrap()
    }

    #[test]
    fn test_json_output_preserves_order() {
        let options = QueryOptions {
            select: "version,name".to_string(),
            from: "components".to_string(),
            where_clause: None,
        };
        let json = run_to_file("json", &options);
        let zlib = json.find("zlib").unwrap();
        let version = json.find("1.3").unwrap();
        assert!(version < zlib, "projection must keep requested field order");
    }

    #[test]
    fn test_csv_output_uses_key_union() {
        let options = QueryOptions {
            select: "*".to_string(),
            from: "components".to_string(),
            where_clause: None,
        };
        let csv = run_to_file("csv", &options);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "name,version,scope");
        assert_eq!(lines[1], "zlib,1.3,");
        assert_eq!(lines[2], "openssl,3.2.1,required");
    }

    #[test]
    fn test_where_filters_rows() {
        let options = QueryOptions {
            select: "name".to_string(),
            from: "components".to_string(),
            where_clause: Some("name=^z".to_string()),
        };
        let csv = run_to_file("csv", &options);
        assert!(csv.contains("zlib"));
        assert!(!csv.contains("openssl"));
    }

    #[test]
    fn test_non_tabular_csv_is_an_error() {
        let dir = TempDir::new().unwrap();
        let doc = write_doc(&dir);
        let config = AppConfig::builder()
            .output_format(ReportFormat::Csv)
            .output_file(Some(dir.path().join("out.txt")))
            .build();
        let options = QueryOptions {
            select: "*".to_string(),
            from: String::new(),
            where_clause: None,
        };
        let err = run_query(&config, &doc, &options).expect_err("must fail");
        assert!(err.to_string().contains("not tabular"));
    }

    #[test]
    fn test_bad_predicate_is_an_error() {
        let dir = TempDir::new().unwrap();
        let doc = write_doc(&dir);
        let config = AppConfig::default();
        let options = QueryOptions {
            select: "*".to_string(),
            from: "components".to_string(),
            where_clause: Some("no-equals-sign".to_string()),
        };
        let err = run_query(&config, &doc, &options).expect_err("must fail");
        assert!(err.to_string().contains("key=regex"));
    }
}
