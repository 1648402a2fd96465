//! Schema registry: the set of recognizable SBOM dialects.
//!
//! The registry is loaded from a declarative JSON file and holds, per
//! format, a generic detection signature and an ordered list of schema
//! descriptors (most-recent first by convention). It is a pure lookup
//! table: detection logic lives in [`crate::detection`].
//!
//! Registries are plain values. They are constructed once at startup and
//! passed by shared reference into detection; tests build them inline with
//! [`SchemaRegistry::from_json`] without touching the filesystem.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "formats": [
//!     {
//!       "name": "CycloneDX",
//!       "description": "OWASP CycloneDX bill of materials",
//!       "signature": [ { "key": "bomFormat", "equals": "CycloneDX" } ],
//!       "schemas": [
//!         {
//!           "version": "1.6",
//!           "signature": [ { "key": "specVersion", "equals": "1.6" } ],
//!           "file": "schemas/cyclonedx/bom-1.6.schema.json",
//!           "url": "https://example.invalid/bom-1.6.schema.json",
//!           "latest": true
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```

mod signature;

pub use signature::{RawSignatureCheck, Signature, SignatureCheck};

pub(crate) use signature::resolve_path;

use crate::error::{Result, SbomVetError};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRegistry {
    #[serde(default)]
    formats: Vec<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    signature: Vec<RawSignatureCheck>,
    #[serde(default)]
    schemas: Vec<RawSchema>,
}

#[derive(Debug, Deserialize)]
struct RawSchema {
    version: String,
    #[serde(default)]
    variant: String,
    #[serde(default)]
    signature: Vec<RawSignatureCheck>,
    #[serde(default)]
    file: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    latest: bool,
}

// ============================================================================
// Compiled model
// ============================================================================

/// One recognizable SBOM dialect: (format, schema version, variant).
///
/// Immutable once loaded. The specific signature discriminates this
/// descriptor from its siblings within the same format; `file` and `url`
/// point at the JSON Schema consumed by the conformance stage.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    format: String,
    version: String,
    variant: String,
    signature: Signature,
    file: String,
    url: String,
    latest: bool,
}

impl SchemaDescriptor {
    /// Declared format name (e.g. "CycloneDX").
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Schema version label (e.g. "1.4" or "SPDX-2.3"). Opaque, not semver.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Source variant label; empty for the base variant.
    #[must_use]
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// The descriptor-specific detection signature.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// On-disk schema file path (possibly relative to the registry file).
    #[must_use]
    pub fn schema_file(&self) -> &str {
        &self.file
    }

    /// Canonical schema URL (informational).
    #[must_use]
    pub fn schema_url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub const fn is_latest(&self) -> bool {
        self.latest
    }

    /// Human-readable label, e.g. `CycloneDX 1.4` or `SPDX SPDX-2.3 (strict)`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.variant.is_empty() {
            format!("{} {}", self.format, self.version)
        } else {
            format!("{} {} ({})", self.format, self.version, self.variant)
        }
    }
}

/// One format entry: generic signature plus ordered version descriptors.
#[derive(Debug, Clone)]
pub struct FormatEntry {
    name: String,
    description: String,
    signature: Signature,
    descriptors: Vec<SchemaDescriptor>,
}

impl FormatEntry {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The format-level generic signature.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Version descriptors in declaration order.
    #[must_use]
    pub fn descriptors(&self) -> &[SchemaDescriptor] {
        &self.descriptors
    }
}

/// The loaded registry: format name → entry, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    source: Option<PathBuf>,
    formats: IndexMap<String, FormatEntry>,
}

impl SchemaRegistry {
    /// Load and compile a registry from a JSON file.
    ///
    /// All-or-nothing: on any error (unreadable file, malformed JSON,
    /// invalid signature pattern, duplicate format name) no registry value
    /// is produced, so a previously loaded registry held by the caller is
    /// untouched.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(SbomVetError::config_empty_filename());
        }
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SbomVetError::config_read(&display, e))?;
        let mut registry = Self::from_named_json(&content, &display)?;
        registry.source = Some(path.to_path_buf());
        Ok(registry)
    }

    /// Compile a registry from in-memory JSON (used by tests and tools that
    /// embed a registry).
    pub fn from_json(content: &str) -> Result<Self> {
        Self::from_named_json(content, "<inline registry>")
    }

    /// Replace this registry with a fresh load. Commits only on success;
    /// on error the current contents are preserved.
    pub fn reload(&mut self, path: impl AsRef<Path>) -> Result<()> {
        *self = Self::load(path)?;
        Ok(())
    }

    fn from_named_json(content: &str, origin: &str) -> Result<Self> {
        let raw: RawRegistry = serde_json::from_str(content)
            .map_err(|e| SbomVetError::config_malformed(origin, e))?;

        let mut formats = IndexMap::with_capacity(raw.formats.len());
        for raw_format in raw.formats {
            if formats.contains_key(&raw_format.name) {
                return Err(SbomVetError::config_invalid(
                    origin,
                    format!("duplicate format name {:?}", raw_format.name),
                ));
            }

            let generic = Signature::compile(&raw_format.signature, origin)?;
            let mut descriptors = Vec::with_capacity(raw_format.schemas.len());
            for raw_schema in raw_format.schemas {
                descriptors.push(SchemaDescriptor {
                    format: raw_format.name.clone(),
                    version: raw_schema.version,
                    variant: raw_schema.variant,
                    signature: Signature::compile(&raw_schema.signature, origin)?,
                    file: raw_schema.file,
                    url: raw_schema.url,
                    latest: raw_schema.latest,
                });
            }

            formats.insert(
                raw_format.name.clone(),
                FormatEntry {
                    name: raw_format.name,
                    description: raw_format.description,
                    signature: generic,
                    descriptors,
                },
            );
        }

        Ok(Self {
            source: None,
            formats,
        })
    }

    /// All descriptors for a format, in declaration order. Unknown format
    /// names yield an empty slice.
    #[must_use]
    pub fn find_candidates(&self, format_name: &str) -> &[SchemaDescriptor] {
        self.formats
            .get(format_name)
            .map(|f| f.descriptors.as_slice())
            .unwrap_or(&[])
    }

    /// Format entries in declaration order.
    pub fn formats(&self) -> impl Iterator<Item = &FormatEntry> {
        self.formats.values()
    }

    /// Every descriptor across all formats, in declaration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &SchemaDescriptor> {
        self.formats.values().flat_map(|f| f.descriptors.iter())
    }

    /// Where this registry was loaded from, if it came from a file.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    #[must_use]
    pub fn format_count(&self) -> usize {
        self.formats.len()
    }

    #[must_use]
    pub fn descriptor_count(&self) -> usize {
        self.formats.values().map(|f| f.descriptors.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}
