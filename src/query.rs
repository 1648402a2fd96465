//! SELECT/FROM/WHERE queries over the ordered document tree.
//!
//! The grammar is deliberately small: `--select` names the fields to project
//! (or `*` for everything), `--from` walks dot-separated keys down from the
//! document root, and `--where` filters array entries with `key=regex`
//! predicates. Results keep the document's own key and entry order.

use crate::error::{QueryErrorKind, Result, SbomVetError};
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;

// ============================================================================
// Request
// ============================================================================

/// Projection part of a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectClause {
    /// `*`: keep every field.
    #[default]
    All,
    /// Explicit field list, projected in the order given.
    Fields(Vec<String>),
}

/// One WHERE predicate: the named entry field must match the pattern.
#[derive(Debug, Clone)]
pub struct WherePredicate {
    key: String,
    pattern: Regex,
    raw: String,
}

impl WherePredicate {
    fn matches(&self, entry: &Value) -> bool {
        let Some(field) = entry.get(&self.key) else {
            return false;
        };
        let text = match field {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.pattern.is_match(&text)
    }
}

/// A parsed query, ready to run against any document tree.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    select: SelectClause,
    from: Vec<String>,
    predicates: Vec<WherePredicate>,
}

impl QueryRequest {
    /// Parse the three clause strings as given on the command line.
    ///
    /// `select` is `*` or a comma-separated field list; `from` is a
    /// dot-separated key path (empty for the document root); `where_clause`
    /// is an optional comma-separated list of `key=regex` predicates.
    pub fn parse(select: &str, from: &str, where_clause: Option<&str>) -> Result<Self> {
        let select = match select.trim() {
            "" | "*" => SelectClause::All,
            fields => SelectClause::Fields(
                fields
                    .split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        };

        let from: Vec<String> = match from.trim() {
            "" => Vec::new(),
            path => path.split('.').map(str::to_string).collect(),
        };

        let mut predicates = Vec::new();
        if let Some(clause) = where_clause {
            for raw in clause.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let Some((key, pattern)) = raw.split_once('=') else {
                    return Err(SbomVetError::query(QueryErrorKind::InvalidPredicate {
                        predicate: raw.to_string(),
                        message: "expected key=regex".to_string(),
                    }));
                };
                let pattern = Regex::new(pattern).map_err(|e| {
                    SbomVetError::query(QueryErrorKind::InvalidPredicate {
                        predicate: raw.to_string(),
                        message: e.to_string(),
                    })
                })?;
                predicates.push(WherePredicate {
                    key: key.trim().to_string(),
                    pattern,
                    raw: raw.to_string(),
                });
            }
        }

        Ok(Self {
            select,
            from,
            predicates,
        })
    }

    fn from_path(&self, upto: usize) -> String {
        if upto == 0 {
            "(root)".to_string()
        } else {
            self.from[..upto].join(".")
        }
    }

    /// Run the query against a document tree.
    pub fn execute(&self, tree: &Value) -> Result<Value> {
        let mut cursor = tree;
        for (index, segment) in self.from.iter().enumerate() {
            let Value::Object(map) = cursor else {
                return Err(SbomVetError::query(QueryErrorKind::NotSelectable {
                    path: self.from_path(index),
                }));
            };
            cursor = map.get(segment).ok_or_else(|| {
                SbomVetError::query(QueryErrorKind::PathNotFound {
                    path: self.from_path(index + 1),
                })
            })?;
        }

        let path = self.from_path(self.from.len());
        match cursor {
            Value::Object(map) => {
                if !self.predicates.is_empty() {
                    return Err(SbomVetError::query(QueryErrorKind::WhereRequiresArray {
                        path,
                    }));
                }
                Ok(Value::Object(self.project_object(map, &path)?))
            }
            Value::Array(entries) => {
                let mut selected = Vec::new();
                'entries: for entry in entries {
                    for predicate in &self.predicates {
                        if !predicate.matches(entry) {
                            continue 'entries;
                        }
                    }
                    match (&self.select, entry) {
                        (SelectClause::All, _) => selected.push(entry.clone()),
                        (SelectClause::Fields(_), Value::Object(map)) => {
                            selected.push(Value::Object(self.project_object(map, &path)?));
                        }
                        (SelectClause::Fields(_), _) => {
                            return Err(SbomVetError::query(QueryErrorKind::NotSelectable {
                                path,
                            }));
                        }
                    }
                }
                Ok(Value::Array(selected))
            }
            _ => Err(SbomVetError::query(QueryErrorKind::NotSelectable { path })),
        }
    }

    /// Project an object through the SELECT clause. Fields come out in the
    /// order they were requested; `*` keeps the object as-is.
    fn project_object(&self, map: &Map<String, Value>, path: &str) -> Result<Map<String, Value>> {
        match &self.select {
            SelectClause::All => Ok(map.clone()),
            SelectClause::Fields(fields) => {
                let mut projected = Map::new();
                for field in fields {
                    let value = map.get(field).ok_or_else(|| {
                        SbomVetError::query(QueryErrorKind::FieldNotFound {
                            field: field.clone(),
                            path: path.to_string(),
                        })
                    })?;
                    projected.insert(field.clone(), value.clone());
                }
                Ok(projected)
            }
        }
    }

    #[must_use]
    pub const fn select(&self) -> &SelectClause {
        &self.select
    }

    #[must_use]
    pub fn from(&self) -> &[String] {
        &self.from
    }
}

impl fmt::Display for QueryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.select {
            SelectClause::All => write!(f, "SELECT *")?,
            SelectClause::Fields(fields) => write!(f, "SELECT {}", fields.join(","))?,
        }
        if self.from.is_empty() {
            write!(f, " FROM (root)")?;
        } else {
            write!(f, " FROM {}", self.from.join("."))?;
        }
        if !self.predicates.is_empty() {
            let raw: Vec<&str> = self.predicates.iter().map(|p| p.raw.as_str()).collect();
            write!(f, " WHERE {}", raw.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(json: &str) -> Value {
        serde_json::from_str(json).expect("valid test JSON")
    }

    const DOC: &str = r#"{
        "bomFormat": "CycloneDX",
        "metadata": {
            "timestamp": "2024-01-01T00:00:00Z",
            "component": { "name": "app", "version": "1.0.0", "type": "application" }
        },
        "components": [
            { "name": "zlib", "version": "1.3", "type": "library" },
            { "name": "acme-core", "version": "2.1", "type": "library" },
            { "name": "acme-ui", "version": "2.2", "type": "framework" }
        ]
    }"#;

    #[test]
    fn test_select_all_from_root() {
        let query = QueryRequest::parse("*", "", None).expect("parse");
        let result = query.execute(&tree(DOC)).expect("execute");
        assert_eq!(result, tree(DOC));
    }

    #[test]
    fn test_from_walks_nested_objects() {
        let query = QueryRequest::parse("*", "metadata.component", None).expect("parse");
        let result = query.execute(&tree(DOC)).expect("execute");
        assert_eq!(result["name"], "app");
    }

    #[test]
    fn test_select_projects_in_requested_order() {
        let query = QueryRequest::parse("version,name", "metadata.component", None).expect("parse");
        let result = query.execute(&tree(DOC)).expect("execute");
        let rendered = serde_json::to_string(&result).expect("serialize");
        assert_eq!(rendered, r#"{"version":"1.0.0","name":"app"}"#);
    }

    #[test]
    fn test_missing_from_path() {
        let query = QueryRequest::parse("*", "metadata.missing.deeper", None).expect("parse");
        let err = query.execute(&tree(DOC)).expect_err("must fail");
        assert!(err.to_string().contains("metadata.missing"));
    }

    #[test]
    fn test_from_through_scalar_is_not_selectable() {
        let query = QueryRequest::parse("*", "bomFormat.inner", None).expect("parse");
        let err = query.execute(&tree(DOC)).expect_err("must fail");
        assert!(err
            .to_string()
            .contains("does not resolve to an object or array"));
    }

    #[test]
    fn test_select_missing_field() {
        let query = QueryRequest::parse("name,missing", "metadata.component", None).expect("parse");
        let err = query.execute(&tree(DOC)).expect_err("must fail");
        assert!(err.to_string().contains("\"missing\""));
    }

    #[test]
    fn test_where_filters_array_entries() {
        let query = QueryRequest::parse("name", "components", Some("name=^acme")).expect("parse");
        let result = query.execute(&tree(DOC)).expect("execute");
        let rendered = serde_json::to_string(&result).expect("serialize");
        assert_eq!(rendered, r#"[{"name":"acme-core"},{"name":"acme-ui"}]"#);
    }

    #[test]
    fn test_where_predicates_are_and_combined() {
        let query = QueryRequest::parse("name", "components", Some("name=^acme,type=library"))
            .expect("parse");
        let result = query.execute(&tree(DOC)).expect("execute");
        let rendered = serde_json::to_string(&result).expect("serialize");
        assert_eq!(rendered, r#"[{"name":"acme-core"}]"#);
    }

    #[test]
    fn test_where_on_object_requires_array() {
        let query = QueryRequest::parse("*", "metadata", Some("name=x")).expect("parse");
        let err = query.execute(&tree(DOC)).expect_err("must fail");
        assert!(err.to_string().contains("requires an array"));
    }

    #[test]
    fn test_where_matches_non_string_values_by_rendering() {
        let query = QueryRequest::parse("*", "items", Some("count=^4")).expect("parse");
        let result = query
            .execute(&tree(r#"{"items":[{"count":42},{"count":17}]}"#))
            .expect("execute");
        let rendered = serde_json::to_string(&result).expect("serialize");
        assert_eq!(rendered, r#"[{"count":42}]"#);
    }

    #[test]
    fn test_where_entry_without_key_is_filtered() {
        let query = QueryRequest::parse("*", "items", Some("name=.")).expect("parse");
        let result = query
            .execute(&tree(r#"{"items":[{"name":"a"},{"other":"b"}]}"#))
            .expect("execute");
        assert_eq!(result.as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_invalid_predicate_shape() {
        let err = QueryRequest::parse("*", "components", Some("nameacme")).expect_err("must fail");
        assert!(err.to_string().contains("key=regex"));
    }

    #[test]
    fn test_invalid_predicate_regex() {
        let err = QueryRequest::parse("*", "components", Some("name=[")).expect_err("must fail");
        assert!(err.to_string().contains("name=["));
    }

    #[test]
    fn test_select_on_scalar_target() {
        let query = QueryRequest::parse("*", "bomFormat", None).expect("parse");
        let err = query.execute(&tree(DOC)).expect_err("must fail");
        assert!(err.to_string().contains("bomFormat"));
    }

    #[test]
    fn test_array_entry_order_is_preserved() {
        let query = QueryRequest::parse("*", "components", None).expect("parse");
        let result = query.execute(&tree(DOC)).expect("execute");
        let names: Vec<&str> = result
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|e| e["name"].as_str())
            .collect();
        assert_eq!(names, vec!["zlib", "acme-core", "acme-ui"]);
    }

    #[test]
    fn test_display_round_trips_clauses() {
        let query = QueryRequest::parse("name,version", "components", Some("name=^acme"))
            .expect("parse");
        let rendered = query.to_string();
        assert_eq!(rendered, "SELECT name,version FROM components WHERE name=^acme");
    }
}
