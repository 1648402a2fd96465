#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_vet::CandidateDocument;

/// Fuzz document parsing and the tree accessors.
///
/// Arbitrary bytes exercise the JSON parse error path; parseable input
/// exercises key ordering and path lookup.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(doc) = CandidateDocument::from_str("fuzz.json", s) {
            let _ = doc.top_level_keys();
            let _ = doc.value_at("metadata.component.name");
            let _ = doc.value_at("");
        }
    }
});
