//! Embedded Open Annotation JSON-LD context
//!
//! Documents that reference the published OA context by URL are rewritten to
//! carry the pinned snapshot inline, so expansion never fetches anything.

use serde_json::Value;

/// Snapshot of the 2013-02-08 OA context document
pub const OA_CONTEXT_DOCUMENT: &str = include_str!("oa_context_20130208.json");

/// Context URLs resolved to the embedded snapshot
pub const OA_CONTEXT_URLS: &[&str] = &[
    "http://www.w3.org/ns/oa-context-20130208.json",
    "http://www.w3.org/ns/oa.jsonld",
    "https://www.w3.org/ns/oa-context-20130208.json",
    "https://www.w3.org/ns/oa.jsonld",
];

/// The inner `@context` object of the embedded snapshot
pub fn oa_context() -> Value {
    serde_json::from_str::<Value>(OA_CONTEXT_DOCUMENT)
        .ok()
        .and_then(|mut document| document.get_mut("@context").map(Value::take))
        .unwrap_or(Value::Null)
}

fn is_oa_context_url(value: &Value) -> bool {
    value
        .as_str()
        .map(|url| OA_CONTEXT_URLS.contains(&url.trim()))
        .unwrap_or(false)
}

/// Replace OA context URLs in `document`'s top-level `@context` with the
/// embedded context. Returns whether anything was replaced.
pub fn inline_oa_context(document: &mut Value) -> bool {
    let Some(context) = document.get_mut("@context") else {
        return false;
    };

    if is_oa_context_url(context) {
        *context = oa_context();
        return true;
    }

    match context {
        Value::Array(entries) => {
            let mut replaced = false;
            for entry in entries.iter_mut().filter(|entry| is_oa_context_url(entry)) {
                *entry = oa_context();
                replaced = true;
            }
            replaced
        }
        _ => false,
    }
}
