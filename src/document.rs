//! Candidate document loading.
//!
//! A [`CandidateDocument`] owns the parsed tree of one input file plus its
//! provenance (filename, byte size) and, once detection has run, the
//! matched [`SchemaDescriptor`]. The tree preserves source key order and
//! numeric/string distinctions (`serde_json` with `preserve_order`), which
//! format signatures and violation paths depend on.

use crate::error::{Result, SbomVetError};
use crate::registry::{resolve_path, SchemaDescriptor};
use serde_json::Value;
use std::path::Path;

/// Maximum input file size (512 MB). Guards against accidentally feeding
/// disk images or container layers to the JSON parser.
pub const MAX_INPUT_FILE_SIZE: u64 = 512 * 1024 * 1024;

/// The parsed, not-yet-classified (or just-classified) input tree.
#[derive(Debug, Clone)]
pub struct CandidateDocument {
    file_name: String,
    size: u64,
    tree: Value,
    format: Option<SchemaDescriptor>,
}

impl CandidateDocument {
    /// Load and parse an input file.
    ///
    /// Requires a non-empty filename. Missing/unreadable files are input
    /// errors; content that is not well-formed JSON is a parse error. The
    /// returned document is untrusted and unconstrained in shape (it need
    /// not even be a JSON object).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(SbomVetError::input_empty_filename());
        }
        let display = path.display().to_string();

        let metadata = std::fs::metadata(path)
            .map_err(|e| SbomVetError::input_read(&display, e))?;
        if metadata.len() > MAX_INPUT_FILE_SIZE {
            return Err(SbomVetError::input_too_large(
                &display,
                metadata.len(),
                MAX_INPUT_FILE_SIZE,
            ));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| SbomVetError::input_read(&display, e))?;
        Self::from_str(&display, &content)
    }

    /// Parse a document from in-memory content, with `name` used for error
    /// messages and reports.
    pub fn from_str(name: &str, content: &str) -> Result<Self> {
        let tree: Value =
            serde_json::from_str(content).map_err(|e| SbomVetError::parse(name, e))?;
        Ok(Self {
            file_name: name.to_string(),
            size: content.len() as u64,
            tree,
            format: None,
        })
    }

    /// Originating filename (or the name given to [`Self::from_str`]).
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Byte size of the raw input.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// The parsed tree.
    #[must_use]
    pub const fn tree(&self) -> &Value {
        &self.tree
    }

    /// Top-level keys in source order; empty when the root is not an object.
    #[must_use]
    pub fn top_level_keys(&self) -> Vec<String> {
        match &self.tree {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Resolve a dotted key path through nested objects.
    #[must_use]
    pub fn value_at(&self, path: &str) -> Option<&Value> {
        resolve_path(&self.tree, path)
    }

    /// The descriptor attached by detection, if any.
    #[must_use]
    pub fn format(&self) -> Option<&SchemaDescriptor> {
        self.format.as_ref()
    }

    /// Attach the detection result. A document carries at most one
    /// descriptor; re-attaching replaces it.
    pub fn attach_format(&mut self, descriptor: SchemaDescriptor) {
        self.format = Some(descriptor);
    }

    #[must_use]
    pub const fn is_detected(&self) -> bool {
        self.format.is_some()
    }
}
