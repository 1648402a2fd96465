//! Format detection against the schema registry.
//!
//! Detection is heuristic, content-based dispatch over an open set of
//! dialects: no single field reliably identifies every SBOM format, so
//! each registry entry declares its own signature strategy. For each
//! format in registry declaration order the generic signature is evaluated
//! first; the first format whose generic signature matches claims the
//! document, and its version descriptors are then tried in order until the
//! first full match wins. Detection is a pure function of (document,
//! registry): either a descriptor or an [`UnknownFormat`] error, never
//! both, never neither.
//!
//! [`UnknownFormat`]: crate::error::SbomVetError::UnknownFormat

use crate::document::CandidateDocument;
use crate::error::{Result, SbomVetError};
use crate::registry::{SchemaDescriptor, SchemaRegistry};
use tracing::debug;

/// Registry-driven format detector.
///
/// Borrows the registry; construct once and reuse across documents.
#[derive(Debug, Clone, Copy)]
pub struct FormatDetector<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> FormatDetector<'a> {
    #[must_use]
    pub const fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Classify a candidate document.
    ///
    /// Returns the earliest-declared descriptor whose format-generic and
    /// schema-specific signatures both match. When a format claims the
    /// document generically but no version descriptor matches, the error
    /// names that format; either way the error carries the document's
    /// observed top-level keys.
    pub fn detect(&self, doc: &CandidateDocument) -> Result<SchemaDescriptor> {
        let tree = doc.tree();

        for format in self.registry.formats() {
            if !format.signature().matches(tree) {
                debug!(
                    format = format.name(),
                    signature = %format.signature().describe(),
                    "generic signature did not match"
                );
                continue;
            }
            debug!(format = format.name(), "generic signature matched");

            for descriptor in format.descriptors() {
                if descriptor.signature().matches(tree) {
                    debug!(schema = %descriptor.label(), "schema signature matched");
                    return Ok(descriptor.clone());
                }
                debug!(schema = %descriptor.label(), "schema signature did not match");
            }

            // The claiming format has no matching version descriptor; later
            // formats do not get a second chance at the document.
            return Err(SbomVetError::unknown_version(
                doc.file_name(),
                format.name(),
                doc.top_level_keys(),
            ));
        }

        Err(SbomVetError::unknown_format(
            doc.file_name(),
            doc.top_level_keys(),
        ))
    }
}

/// Detect the format of a candidate document against a registry.
///
/// Convenience wrapper over [`FormatDetector`].
pub fn detect_format(
    doc: &CandidateDocument,
    registry: &SchemaRegistry,
) -> Result<SchemaDescriptor> {
    FormatDetector::new(registry).detect(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_registry() -> SchemaRegistry {
        SchemaRegistry::from_json(
            r#"{
                "formats": [
                    {
                        "name": "CycloneDX",
                        "signature": [ { "key": "bomFormat", "equals": "CycloneDX" } ],
                        "schemas": [
                            { "version": "1.6", "signature": [ { "key": "specVersion", "equals": "1.6" } ], "latest": true },
                            { "version": "1.5", "signature": [ { "key": "specVersion", "equals": "1.5" } ] },
                            { "version": "1.4", "signature": [ { "key": "specVersion", "equals": "1.4" } ] }
                        ]
                    },
                    {
                        "name": "SPDX",
                        "signature": [ { "key": "spdxVersion", "matches": "^SPDX-" } ],
                        "schemas": [
                            { "version": "SPDX-2.3", "signature": [ { "key": "spdxVersion", "equals": "SPDX-2.3" } ] },
                            { "version": "SPDX-2.2", "signature": [ { "key": "spdxVersion", "equals": "SPDX-2.2" } ] }
                        ]
                    }
                ]
            }"#,
        )
        .expect("registry")
    }

    fn doc(content: &str) -> CandidateDocument {
        CandidateDocument::from_str("test.json", content).expect("parse")
    }

    #[test]
    fn test_detects_cyclonedx_by_version() {
        let registry = test_registry();
        let document = doc(r#"{"bomFormat": "CycloneDX", "specVersion": "1.4"}"#);
        let descriptor = detect_format(&document, &registry).expect("detect");
        assert_eq!(descriptor.format(), "CycloneDX");
        assert_eq!(descriptor.version(), "1.4");
    }

    #[test]
    fn test_detects_spdx_by_pattern() {
        let registry = test_registry();
        let document = doc(r#"{"spdxVersion": "SPDX-2.2", "SPDXID": "SPDXRef-DOCUMENT"}"#);
        let descriptor = detect_format(&document, &registry).expect("detect");
        assert_eq!(descriptor.format(), "SPDX");
        assert_eq!(descriptor.version(), "SPDX-2.2");
    }

    #[test]
    fn test_earliest_declared_descriptor_wins() {
        // Both descriptors' signatures match any 1.x version string.
        let registry = SchemaRegistry::from_json(
            r#"{"formats": [{
                "name": "CycloneDX",
                "signature": [ { "key": "bomFormat", "equals": "CycloneDX" } ],
                "schemas": [
                    { "version": "first", "signature": [ { "key": "specVersion", "matches": "^1\\." } ] },
                    { "version": "second", "signature": [ { "key": "specVersion", "matches": "^1\\." } ] }
                ]
            }]}"#,
        )
        .expect("registry");
        let document = doc(r#"{"bomFormat": "CycloneDX", "specVersion": "1.4"}"#);
        let descriptor = detect_format(&document, &registry).expect("detect");
        assert_eq!(descriptor.version(), "first");
    }

    #[test]
    fn test_earliest_declared_format_claims_the_document() {
        let registry = test_registry();
        // Pathological document carrying both formats' identity keys.
        let document = doc(
            r#"{"bomFormat": "CycloneDX", "specVersion": "1.5", "spdxVersion": "SPDX-2.3"}"#,
        );
        let descriptor = detect_format(&document, &registry).expect("detect");
        assert_eq!(descriptor.format(), "CycloneDX");
    }

    #[test]
    fn test_unknown_format_carries_observed_keys() {
        let registry = test_registry();
        let document = doc(r#"{"kind": "inventory", "items": []}"#);
        let err = detect_format(&document, &registry).expect_err("must fail");
        assert!(err.is_unknown_format());
        match err {
            SbomVetError::UnknownFormat { observed_keys, .. } => {
                assert_eq!(observed_keys, vec!["kind", "items"]);
            }
            other => panic!("expected UnknownFormat, got {other}"),
        }
    }

    #[test]
    fn test_generic_match_without_version_match_is_unknown() {
        let registry = test_registry();
        let document = doc(r#"{"bomFormat": "CycloneDX", "specVersion": "0.9"}"#);
        let err = detect_format(&document, &registry).expect_err("must fail");
        assert!(err.is_unknown_format());
        assert!(
            err.to_string().contains("CycloneDX"),
            "error should name the claiming format: {}",
            err
        );
    }

    #[test]
    fn test_non_object_document_is_unknown() {
        let registry = test_registry();
        let document = doc("[1, 2, 3]");
        let err = detect_format(&document, &registry).expect_err("must fail");
        match err {
            SbomVetError::UnknownFormat { observed_keys, .. } => {
                assert!(observed_keys.is_empty());
            }
            other => panic!("expected UnknownFormat, got {other}"),
        }
    }

    #[test]
    fn test_detection_is_pure_and_repeatable() {
        let registry = test_registry();
        let document = doc(r#"{"bomFormat": "CycloneDX", "specVersion": "1.6"}"#);
        let first = detect_format(&document, &registry).expect("detect");
        let second = detect_format(&document, &registry).expect("detect");
        assert_eq!(first.label(), second.label());
        assert_eq!(first.schema_file(), second.schema_file());
    }
}
