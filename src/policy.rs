//! License policy table and document license collection.
//!
//! The policy table is a JSON file mapping license identifiers (and their
//! aliases) to a usage ruling. Expressions found in documents are evaluated
//! through the `spdx` crate: `OR` takes the most permissive branch (the
//! consumer may choose it), `AND` takes the most restrictive. Identifiers
//! the table does not know resolve to `needs-review`.

use crate::document::CandidateDocument;
use crate::error::{Result, SbomVetError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

// ============================================================================
// Policy table
// ============================================================================

/// Usage ruling for a license. Ordered by restrictiveness.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum UsagePolicy {
    Allow,
    #[default]
    NeedsReview,
    Deny,
}

impl UsagePolicy {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::NeedsReview => "needs-review",
            Self::Deny => "deny",
        }
    }
}

impl fmt::Display for UsagePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the policy table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicensePolicy {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "usagePolicy")]
    pub usage_policy: UsagePolicy,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPolicyTable {
    #[serde(default)]
    policies: Vec<LicensePolicy>,
}

/// Loaded policy table with case-insensitive id and alias lookup.
#[derive(Debug, Clone, Default)]
pub struct LicensePolicyConfig {
    source: Option<PathBuf>,
    policies: Vec<LicensePolicy>,
    lookup: HashMap<String, usize>,
}

impl LicensePolicyConfig {
    /// Load a policy table from a JSON file.
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

    /// Parse a policy table from an in-memory JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        Self::from_named_json(content, "<inline policies>")
    }

    fn from_named_json(content: &str, origin: &str) -> Result<Self> {
        let raw: RawPolicyTable = serde_json::from_str(content)
            .map_err(|e| SbomVetError::config_malformed(origin, e))?;

        let mut lookup = HashMap::new();
        for (index, policy) in raw.policies.iter().enumerate() {
            let mut keys = vec![policy.id.clone()];
            keys.extend(policy.aliases.iter().cloned());
            for key in keys {
                if key.is_empty() {
                    continue;
                }
                if lookup.insert(key.to_lowercase(), index).is_some() {
                    return Err(SbomVetError::config_invalid(
                        origin,
                        format!("duplicate license id or alias {key:?}"),
                    ));
                }
            }
        }

        Ok(Self {
            source: None,
            policies: raw.policies,
            lookup,
        })
    }

    /// Look up the policy row for a single license identifier.
    #[must_use]
    pub fn policy_for(&self, license_id: &str) -> Option<&LicensePolicy> {
        self.lookup
            .get(&license_id.trim().to_lowercase())
            .map(|&index| &self.policies[index])
    }

    /// Usage ruling for a single identifier; unknown ids need review.
    #[must_use]
    pub fn usage_for(&self, license_id: &str) -> UsagePolicy {
        self.policy_for(license_id)
            .map(|p| p.usage_policy)
            .unwrap_or_default()
    }

    /// Evaluate a full SPDX expression against the table.
    ///
    /// The parsed expression is walked in postfix order: `AND` keeps the
    /// more restrictive ruling, `OR` the more permissive one. Expressions
    /// the `spdx` crate cannot parse fall back to a whole-string lookup.
    #[must_use]
    pub fn usage_for_expression(&self, expression: &str) -> UsagePolicy {
        let trimmed = expression.trim();
        if trimmed.is_empty() || trimmed.contains("NOASSERTION") {
            return UsagePolicy::NeedsReview;
        }
        let Ok(parsed) = spdx::Expression::parse_mode(trimmed, spdx::ParseMode::LAX) else {
            return self.usage_for(trimmed);
        };

        let mut stack: Vec<UsagePolicy> = Vec::new();
        for node in parsed.iter() {
            match node {
                spdx::expression::ExprNode::Req(req) => {
                    let usage = if let spdx::LicenseItem::Spdx { id, .. } = req.req.license {
                        self.usage_for(id.name)
                    } else {
                        UsagePolicy::NeedsReview
                    };
                    stack.push(usage);
                }
                spdx::expression::ExprNode::Op(op) => {
                    let right = stack.pop().unwrap_or_default();
                    let left = stack.pop().unwrap_or_default();
                    stack.push(match op {
                        spdx::expression::Operator::And => left.max(right),
                        spdx::expression::Operator::Or => left.min(right),
                    });
                }
            }
        }
        stack.pop().unwrap_or_default()
    }

    #[must_use]
    pub fn policies(&self) -> &[LicensePolicy] {
        &self.policies
    }

    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

// ============================================================================
// Document license collection
// ============================================================================

/// A license reference found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseOccurrence {
    pub expression: String,
    /// Where the reference was found, e.g. `components[2].licenses`.
    pub location: String,
    /// Whether the expression parses as SPDX (lax mode).
    pub valid_spdx: bool,
}

impl LicenseOccurrence {
    fn new(expression: &str, location: impl Into<String>) -> Self {
        Self {
            expression: expression.to_string(),
            location: location.into(),
            valid_spdx: is_valid_spdx(expression),
        }
    }
}

/// Lax SPDX validity check; NOASSERTION and NONE never count as valid.
fn is_valid_spdx(expression: &str) -> bool {
    if expression.is_empty()
        || expression.contains("NOASSERTION")
        || expression.contains("NONE")
    {
        return false;
    }
    spdx::Expression::parse_mode(expression, spdx::ParseMode::LAX).is_ok()
}

/// One CycloneDX `licenses` array: entries carry either an `expression`
/// or a nested `license` object with `id` or `name`.
fn push_license_list(list: Option<&Value>, location: &str, out: &mut Vec<LicenseOccurrence>) {
    let Some(Value::Array(entries)) = list else {
        return;
    };
    for entry in entries {
        let nested = |field: &str| {
            entry
                .get("license")
                .and_then(|l| l.get(field))
                .and_then(Value::as_str)
        };
        let expression = entry
            .get("expression")
            .and_then(Value::as_str)
            .or_else(|| nested("id"))
            .or_else(|| nested("name"));
        if let Some(expr) = expression {
            out.push(LicenseOccurrence::new(expr, location));
        }
    }
}

/// Walk a document for license declarations, in a fixed traversal order.
///
/// Understands both CycloneDX shapes (`metadata.licenses`,
/// `metadata.component.licenses`, `components[*].licenses`) and SPDX shapes
/// (`dataLicense`, `packages[*].licenseConcluded` / `licenseDeclared`).
/// Works on undetected documents too; absent sections are skipped.
#[must_use]
pub fn collect_licenses(doc: &CandidateDocument) -> Vec<LicenseOccurrence> {
    let tree = doc.tree();
    let mut out = Vec::new();

    if let Some(expr) = tree.get("dataLicense").and_then(Value::as_str) {
        out.push(LicenseOccurrence::new(expr, "dataLicense"));
    }

    if let Some(metadata) = tree.get("metadata") {
        push_license_list(metadata.get("licenses"), "metadata.licenses", &mut out);
        if let Some(component) = metadata.get("component") {
            push_license_list(
                component.get("licenses"),
                "metadata.component.licenses",
                &mut out,
            );
        }
    }

    if let Some(Value::Array(components)) = tree.get("components") {
        for (index, component) in components.iter().enumerate() {
            push_license_list(
                component.get("licenses"),
                &format!("components[{index}].licenses"),
                &mut out,
            );
        }
    }

    if let Some(Value::Array(packages)) = tree.get("packages") {
        for (index, package) in packages.iter().enumerate() {
            for field in ["licenseConcluded", "licenseDeclared"] {
                if let Some(expr) = package.get(field).and_then(Value::as_str) {
                    out.push(LicenseOccurrence::new(
                        expr,
                        format!("packages[{index}].{field}"),
                    ));
                }
            }
        }
    }

    out
}
