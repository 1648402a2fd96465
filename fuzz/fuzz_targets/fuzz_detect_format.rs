#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_vet::registry::SchemaRegistry;
use sbom_vet::{detect_format, CandidateDocument};
use std::sync::OnceLock;

const MAX_WRAPPED_INPUT_LEN: usize = 10_000;

fn registry() -> &'static SchemaRegistry {
    static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        sbom_vet::config::builtin_registry().expect("built-in registry loads")
    })
}

/// Fuzz signature matching against the built-in registry.
///
/// Wraps input in a CycloneDX envelope as well, so mutated version
/// strings reach the per-schema signature checks rather than failing
/// at the format gate.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(doc) = CandidateDocument::from_str("fuzz.json", s) {
            let _ = detect_format(&doc, registry());
        }

        if s.len() < MAX_WRAPPED_INPUT_LEN {
            let wrapped = format!(
                r#"{{"bomFormat":"CycloneDX","specVersion":{},"version":1}}"#,
                serde_json::Value::String(s.to_string())
            );
            if let Ok(doc) = CandidateDocument::from_str("fuzz.json", &wrapped) {
                let _ = detect_format(&doc, registry());
            }
        }
    }
});
