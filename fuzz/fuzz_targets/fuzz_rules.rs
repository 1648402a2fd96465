#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_vet::validation::{CustomValidationConfig, RuleEvaluator};
use sbom_vet::CandidateDocument;

const MAX_WRAPPED_INPUT_LEN: usize = 4_000;

/// Fuzz rules loading and evaluation.
///
/// Raw input exercises the rules parser; the wrapped variant feeds the
/// input through a fixed ruleset as document property values, reaching
/// the uniqueness and pattern checks.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = CustomValidationConfig::from_json(s);

        if s.len() < MAX_WRAPPED_INPUT_LEN {
            let rules = CustomValidationConfig::from_json(
                r#"{
                    "validation": {
                        "metadata": {
                            "properties": [
                                { "name": "id", "_validate_unique": true,
                                  "_validate_regex": "^[a-z-]+$" }
                            ]
                        }
                    }
                }"#,
            )
            .expect("fixed ruleset loads");

            let tree = serde_json::json!({
                "metadata": {
                    "properties": [
                        { "name": "id", "value": s },
                        { "name": "id", "value": s }
                    ]
                }
            });
            if let Ok(doc) = CandidateDocument::from_str("fuzz.json", &tree.to_string()) {
                let _ = RuleEvaluator::new(&rules).evaluate(&doc);
            }
        }
    }
});
