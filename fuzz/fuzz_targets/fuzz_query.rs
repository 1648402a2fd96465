#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_vet::query::QueryRequest;

/// Fuzz query parsing and execution.
///
/// The input is split into SELECT, FROM, and WHERE clauses on newlines,
/// then run against a small fixed document.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let mut parts = s.splitn(3, '\n');
        let select = parts.next().unwrap_or("*");
        let from = parts.next().unwrap_or("");
        let where_clause = parts.next();

        if let Ok(request) = QueryRequest::parse(select, from, where_clause) {
            let tree = serde_json::json!({
                "bomFormat": "CycloneDX",
                "metadata": { "component": { "name": "app" } },
                "components": [
                    { "name": "zlib", "version": "1.3" },
                    { "name": "openssl", "version": "3.2.1" }
                ]
            });
            let _ = request.execute(&tree);
            let _ = request.to_string();
        }
    }
});
