//! JSON-Schema conformance stage.
//!
//! Runs after format detection: the detected descriptor names a schema file,
//! the schema is compiled once, and the document tree is checked against it.
//! All `$ref` resolution is local. Any URI the schema references but the
//! retriever cannot resolve is answered with the permissive empty schema, so
//! validation proceeds without ever touching the network.

use crate::document::CandidateDocument;
use crate::error::{Result, SbomVetError};
use crate::registry::{SchemaDescriptor, SchemaRegistry};
use jsonschema::{Retrieve, Uri, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One schema error reported by the conformance stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConformanceIssue {
    /// JSON Pointer into the document.
    pub instance_path: String,
    /// JSON Pointer into the schema keyword that failed.
    pub schema_path: String,
    pub message: String,
}

impl fmt::Display for ConformanceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Answers unresolved `$ref` URIs with a schema that accepts anything.
/// Keeps the engine off the network and tolerant of absent metaschemas.
struct PermissiveRetriever;

impl Retrieve for PermissiveRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> std::result::Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        debug!(uri = uri.as_str(), "unresolved schema reference, accepting");
        Ok(serde_json::json!({}))
    }
}

/// Locate the schema file for a detected descriptor.
///
/// Relative paths resolve against the directory the registry was loaded
/// from; descriptors without a schema file yield `None`.
#[must_use]
pub fn resolve_schema_file(
    descriptor: &SchemaDescriptor,
    registry: &SchemaRegistry,
) -> Option<PathBuf> {
    if descriptor.schema_file().is_empty() {
        return None;
    }
    let file = Path::new(descriptor.schema_file());
    if file.is_absolute() {
        return Some(file.to_path_buf());
    }
    match registry.source().and_then(Path::parent) {
        Some(dir) => Some(dir.join(file)),
        None => Some(file.to_path_buf()),
    }
}

/// Read and compile a schema file into a reusable validator.
pub fn compile_schema(path: &Path) -> Result<Validator> {
    let display = path.display().to_string();
    let content =
        std::fs::read_to_string(path).map_err(|e| SbomVetError::config_read(&display, e))?;
    let schema: Value =
        serde_json::from_str(&content).map_err(|e| SbomVetError::config_malformed(&display, e))?;

    let mut options = jsonschema::options();
    options.with_retriever(PermissiveRetriever);
    options
        .build(&schema)
        .map_err(|e| SbomVetError::config_schema(&display, e.to_string()))
}

/// Check a document against a compiled validator, collecting every issue.
#[must_use]
pub fn check_document(validator: &Validator, doc: &CandidateDocument) -> Vec<ConformanceIssue> {
    validator
        .iter_errors(doc.tree())
        .map(|e| ConformanceIssue {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        })
        .collect()
}

/// Compile the schema at `schema_path` and check `doc` against it.
pub fn check_conformance(doc: &CandidateDocument, schema_path: &Path) -> Result<Vec<ConformanceIssue>> {
    let validator = compile_schema(schema_path)?;
    Ok(check_document(&validator, doc))
}
