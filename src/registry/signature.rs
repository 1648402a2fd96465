//! Structural signature checks used by format detection.
//!
//! A signature is an ordered list of checks against the candidate document
//! tree; it matches when every check matches. Three check kinds exist:
//! key presence, literal-value match (type-faithful: the string `"1.4"`
//! does not equal the number `1.4`), and regex match on string values.
//! Keys may be dotted paths resolving through nested objects.

use crate::error::{Result, SbomVetError};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

/// Wire form of one signature check.
///
/// `equals` and `matches` are mutually exclusive; with neither, the check
/// degrades to key presence. Unknown fields are rejected so that a typo in
/// a registry file fails the load instead of silently weakening a check.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSignatureCheck {
    pub key: String,
    #[serde(default)]
    pub equals: Option<Value>,
    #[serde(default)]
    pub matches: Option<String>,
}

/// One compiled signature check.
#[derive(Debug, Clone)]
pub enum SignatureCheck {
    /// The key resolves to some value.
    KeyPresent { key: String },
    /// The key resolves to exactly this literal (type-faithful comparison).
    ValueEquals { key: String, literal: Value },
    /// The key resolves to a string matching this pattern.
    ValueMatches { key: String, pattern: Regex },
}

impl SignatureCheck {
    /// The key (or dotted path) this check inspects.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::KeyPresent { key }
            | Self::ValueEquals { key, .. }
            | Self::ValueMatches { key, .. } => key,
        }
    }

    /// Evaluate the check against a document tree.
    #[must_use]
    pub fn matches(&self, tree: &Value) -> bool {
        match self {
            Self::KeyPresent { key } => resolve_path(tree, key).is_some(),
            Self::ValueEquals { key, literal } => resolve_path(tree, key) == Some(literal),
            Self::ValueMatches { key, pattern } => resolve_path(tree, key)
                .and_then(Value::as_str)
                .is_some_and(|s| pattern.is_match(s)),
        }
    }

    /// Short human-readable rendering for debug logs.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::KeyPresent { key } => format!("{key} present"),
            Self::ValueEquals { key, literal } => format!("{key} == {literal}"),
            Self::ValueMatches { key, pattern } => format!("{key} ~ /{pattern}/"),
        }
    }
}

/// A compiled signature: all checks must match.
///
/// An empty signature never matches; combined with first-match-wins
/// detection, a vacuously true signature would turn its format into a
/// catch-all for every document.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    checks: Vec<SignatureCheck>,
}

impl Signature {
    /// Compile raw checks, validating patterns and check shape.
    ///
    /// `origin` names the configuration file for error messages.
    pub fn compile(raw: &[RawSignatureCheck], origin: &str) -> Result<Self> {
        let mut checks = Vec::with_capacity(raw.len());
        for check in raw {
            checks.push(compile_check(check, origin)?);
        }
        Ok(Self { checks })
    }

    /// Evaluate the signature against a document tree.
    #[must_use]
    pub fn matches(&self, tree: &Value) -> bool {
        !self.checks.is_empty() && self.checks.iter().all(|c| c.matches(tree))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    #[must_use]
    pub fn checks(&self) -> &[SignatureCheck] {
        &self.checks
    }

    /// Render the whole signature for debug logs.
    #[must_use]
    pub fn describe(&self) -> String {
        self.checks
            .iter()
            .map(SignatureCheck::describe)
            .collect::<Vec<_>>()
            .join(" && ")
    }
}

fn compile_check(raw: &RawSignatureCheck, origin: &str) -> Result<SignatureCheck> {
    match (&raw.equals, &raw.matches) {
        (Some(_), Some(_)) => Err(SbomVetError::config_invalid(
            origin,
            format!(
                "signature check for key {:?} declares both \"equals\" and \"matches\"",
                raw.key
            ),
        )),
        (Some(literal), None) => Ok(SignatureCheck::ValueEquals {
            key: raw.key.clone(),
            literal: literal.clone(),
        }),
        (None, Some(pattern)) => {
            let compiled = Regex::new(pattern)
                .map_err(|e| SbomVetError::config_pattern(origin, pattern, e))?;
            Ok(SignatureCheck::ValueMatches {
                key: raw.key.clone(),
                pattern: compiled,
            })
        }
        (None, None) => Ok(SignatureCheck::KeyPresent {
            key: raw.key.clone(),
        }),
    }
}

/// Resolve a dotted key path through nested objects.
///
/// Dots always separate segments; array indices are not supported here
/// (signatures address identity fields, not list elements).
pub(crate) fn resolve_path<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = tree;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}
