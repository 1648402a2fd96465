//! Rule evaluation over candidate documents.
//!
//! Evaluation is total and deterministic: every rule runs against every
//! occurrence, nothing halts on the first finding, and the output order is
//! fixed (rules in declaration order, occurrences in document order). Running
//! the same rules against the same document twice yields identical output.

use crate::document::CandidateDocument;
use crate::validation::config::{
    CustomValidationConfig, PropertyRule, ToolRule, UniquenessScope,
};
use crate::validation::Violation;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

// ============================================================================
// Occurrence collection
// ============================================================================

/// A single named property found in the document, with its location.
#[derive(Debug, Clone)]
struct PropertyOccurrence {
    /// Entry location, e.g. `metadata.properties[2]`.
    path: String,
    /// The list the entry came from, e.g. `metadata.properties`.
    context: String,
    name: String,
    value: Value,
}

impl PropertyOccurrence {
    /// Text form used for display and regex matching: strings verbatim,
    /// everything else in compact JSON.
    fn value_text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Pool key for uniqueness: values of different JSON types never
    /// collide, so the string `"1"` and the number `1` stay distinct.
    fn canonical_value(&self) -> String {
        self.value.to_string()
    }
}

fn collect_from_list(list: Option<&Value>, context: &str, out: &mut Vec<PropertyOccurrence>) {
    let Some(Value::Array(entries)) = list else {
        return;
    };
    for (index, entry) in entries.iter().enumerate() {
        let Some(name) = entry.get("name").and_then(Value::as_str) else {
            continue;
        };
        out.push(PropertyOccurrence {
            path: format!("{context}[{index}]"),
            context: context.to_string(),
            name: name.to_string(),
            value: entry.get("value").cloned().unwrap_or(Value::Null),
        });
    }
}

/// Gather every property occurrence the rules can see, in document order:
/// `metadata.properties` first, then properties nested under each metadata
/// tool entry (both the legacy tools array and the newer
/// `tools.components` / `tools.services` object form).
fn collect_property_occurrences(tree: &Value) -> Vec<PropertyOccurrence> {
    let mut out = Vec::new();
    let Some(metadata) = tree.get("metadata") else {
        return out;
    };
    collect_from_list(metadata.get("properties"), "metadata.properties", &mut out);
    match metadata.get("tools") {
        Some(Value::Array(tools)) => {
            for (index, tool) in tools.iter().enumerate() {
                collect_from_list(
                    tool.get("properties"),
                    &format!("metadata.tools[{index}].properties"),
                    &mut out,
                );
            }
        }
        Some(Value::Object(sections)) => {
            for section in ["components", "services"] {
                let Some(Value::Array(entries)) = sections.get(section) else {
                    continue;
                };
                for (index, entry) in entries.iter().enumerate() {
                    collect_from_list(
                        entry.get("properties"),
                        &format!("metadata.tools.{section}[{index}].properties"),
                        &mut out,
                    );
                }
            }
        }
        _ => {}
    }
    out
}

/// A tool entry under `metadata.tools`, with whichever identity fields the
/// document declares.
#[derive(Debug, Clone)]
struct ToolOccurrence {
    path: String,
    vendor: Option<String>,
    name: Option<String>,
    version: Option<String>,
}

fn tool_occurrence(entry: &Value, path: String) -> ToolOccurrence {
    let field = |key: &str| entry.get(key).and_then(Value::as_str).map(str::to_string);
    ToolOccurrence {
        path,
        vendor: field("vendor"),
        name: field("name"),
        version: field("version"),
    }
}

fn collect_tool_occurrences(tree: &Value) -> Vec<ToolOccurrence> {
    let mut out = Vec::new();
    let Some(tools) = tree.get("metadata").and_then(|m| m.get("tools")) else {
        return out;
    };
    match tools {
        Value::Array(entries) => {
            for (index, entry) in entries.iter().enumerate() {
                out.push(tool_occurrence(entry, format!("metadata.tools[{index}]")));
            }
        }
        Value::Object(sections) => {
            for section in ["components", "services"] {
                let Some(Value::Array(entries)) = sections.get(section) else {
                    continue;
                };
                for (index, entry) in entries.iter().enumerate() {
                    out.push(tool_occurrence(
                        entry,
                        format!("metadata.tools.{section}[{index}]"),
                    ));
                }
            }
        }
        _ => {}
    }
    out
}

// ============================================================================
// Evaluator
// ============================================================================

/// Evaluates a compiled ruleset against one document at a time.
#[derive(Debug, Clone, Copy)]
pub struct RuleEvaluator<'a> {
    config: &'a CustomValidationConfig,
    scope: UniquenessScope,
}

impl<'a> RuleEvaluator<'a> {
    #[must_use]
    pub fn new(config: &'a CustomValidationConfig) -> Self {
        Self {
            config,
            scope: config.uniqueness_scope(),
        }
    }

    /// Override the uniqueness scope declared by the ruleset.
    #[must_use]
    pub const fn with_scope(mut self, scope: UniquenessScope) -> Self {
        self.scope = scope;
        self
    }

    /// Run every rule and collect every violation, in declaration order of
    /// the rules and document order of the occurrences.
    #[must_use]
    pub fn evaluate(&self, doc: &CandidateDocument) -> Vec<Violation> {
        let properties = collect_property_occurrences(doc.tree());
        let tools = collect_tool_occurrences(doc.tree());
        debug!(
            file = doc.file_name(),
            properties = properties.len(),
            tools = tools.len(),
            "collected occurrences"
        );

        let mut violations = Vec::new();
        for rule in self.config.property_rules() {
            self.evaluate_property_rule(rule, &properties, &mut violations);
        }
        for rule in self.config.tool_rules() {
            evaluate_tool_rule(rule, &tools, &mut violations);
        }
        violations
    }

    fn evaluate_property_rule(
        &self,
        rule: &PropertyRule,
        occurrences: &[PropertyOccurrence],
        out: &mut Vec<Violation>,
    ) {
        let hits: Vec<&PropertyOccurrence> = occurrences
            .iter()
            .filter(|o| o.name == rule.target_key())
            .collect();

        // Value frequency per pool. The map orders nothing: findings below
        // are emitted by walking `hits` in document order.
        let mut counts: HashMap<(String, String), usize> = HashMap::new();
        if rule.check_unique {
            for occurrence in &hits {
                *counts.entry(self.pool_key(occurrence)).or_insert(0) += 1;
            }
        }

        for occurrence in hits {
            let duplicated = rule.check_unique
                && counts
                    .get(&self.pool_key(occurrence))
                    .is_some_and(|&n| n > 1);
            if duplicated {
                out.push(Violation::new(
                    format!("unique:{}", rule.target_key()),
                    occurrence.path.clone(),
                    occurrence.value_text(),
                    format!(
                        "duplicate value {:?} for metadata property {:?}",
                        occurrence.value_text(),
                        rule.target_key()
                    ),
                ));
            }
            if let Some(pattern) = rule.pattern() {
                let text = occurrence.value_text();
                if !pattern.is_match(&text) {
                    out.push(Violation::new(
                        format!("regex:{}", rule.target_key()),
                        occurrence.path.clone(),
                        text.clone(),
                        format!(
                            "value {:?} does not match pattern {:?}",
                            text, rule.check_regex
                        ),
                    ));
                }
            }
        }
    }

    fn pool_key(&self, occurrence: &PropertyOccurrence) -> (String, String) {
        let context = match self.scope {
            UniquenessScope::Global => String::new(),
            UniquenessScope::PerList => occurrence.context.clone(),
        };
        (context, occurrence.canonical_value())
    }
}

/// Required-tool check: at most one violation per rule, either "not found"
/// or "found but fields differ".
fn evaluate_tool_rule(rule: &ToolRule, tools: &[ToolOccurrence], out: &mut Vec<Violation>) {
    if rule.is_inert() {
        return;
    }

    let candidates: Vec<&ToolOccurrence> = if rule.name.is_empty() {
        tools.iter().collect()
    } else {
        tools
            .iter()
            .filter(|t| t.name.as_deref() == Some(rule.name.as_str()))
            .collect()
    };

    if candidates.is_empty() {
        out.push(Violation::new(
            format!("tool:{}", rule.identity()),
            "metadata.tools",
            "-",
            format!("required metadata tool {:?} not found", rule.identity()),
        ));
        return;
    }

    let matches_declared = |tool: &ToolOccurrence| {
        (rule.vendor.is_empty() || tool.vendor.as_deref() == Some(rule.vendor.as_str()))
            && (rule.name.is_empty() || tool.name.as_deref() == Some(rule.name.as_str()))
            && (rule.version.is_empty() || tool.version.as_deref() == Some(rule.version.as_str()))
    };
    if candidates.iter().any(|t| matches_declared(t)) {
        return;
    }

    let mut expected = Vec::new();
    if !rule.vendor.is_empty() {
        expected.push(format!("vendor={:?}", rule.vendor));
    }
    if !rule.version.is_empty() {
        expected.push(format!("version={:?}", rule.version));
    }
    out.push(Violation::new(
        format!("tool:{}", rule.identity()),
        candidates[0].path.clone(),
        "-",
        format!(
            "metadata tool {:?} found but does not match {}",
            rule.identity(),
            expected.join(" ")
        ),
    ));
}

/// Convenience wrapper over [`RuleEvaluator`].
#[must_use]
pub fn evaluate_rules(doc: &CandidateDocument, config: &CustomValidationConfig) -> Vec<Violation> {
    RuleEvaluator::new(config).evaluate(doc)
}
