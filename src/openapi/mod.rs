//! # API Description Documents
//!
//! Operations over unified OpenAPI (JSON) documents, downstream of the
//! interface-file annotations:
//!
//! - [`DocumentPartitioner`] splits one document into per-domain documents,
//!   carrying over only the tags each domain actually uses;
//! - [`DocumentEnricher`] adds the bearer-auth scheme, applies it globally,
//!   backfills `info` from the service metadata table and gives every used tag
//!   a definition with a description.
//!
//! Documents are handled as [`serde_json::Value`] with key order preserved, so
//! a rewritten document diffs cleanly against its source.

mod enrich;
mod partition;

#[cfg(test)]
mod tests;

pub use enrich::{service_key_for, DocumentEnricher};
pub use partition::DocumentPartitioner;

use crate::error::ArtifactError;
use serde_json::{Map, Value};

/// Path-item keys that hold operations
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// `(path, method, operation)` for every operation under `paths`, in document order
pub fn operations(paths: &Map<String, Value>) -> impl Iterator<Item = (&str, &str, &Value)> {
    paths.iter().flat_map(|(path, item)| {
        item.as_object()
            .into_iter()
            .flat_map(|methods| methods.iter())
            .filter(|(method, _)| HTTP_METHODS.contains(&method.as_str()))
            .map(move |(method, operation)| (path.as_str(), method.as_str(), operation))
    })
}

/// Tag names referenced by operations under `paths`, each once, in first-reference order
pub fn used_tags(paths: &Map<String, Value>) -> Vec<String> {
    let mut seen = Vec::new();
    for (_, _, operation) in operations(paths) {
        let tags = operation.get("tags").and_then(Value::as_array);
        for tag in tags.into_iter().flatten().filter_map(Value::as_str) {
            if !seen.iter().any(|t: &String| t == tag) {
                seen.push(tag.to_string());
            }
        }
    }
    seen
}

/// Description of a tag definition, when present and non-empty
pub(crate) fn tag_description(tag: &Value) -> Option<&str> {
    tag.get("description")
        .and_then(Value::as_str)
        .filter(|d| !d.trim().is_empty())
}

/// Parse an API description document
pub fn parse_document(text: &str) -> Result<Value, ArtifactError> {
    serde_json::from_str(text).map_err(|e| ArtifactError::unparsable(format!("invalid JSON: {e}")))
}

/// Two-space indented JSON with a trailing newline
pub fn render_document(doc: &Value) -> Result<String, ArtifactError> {
    let mut text = serde_json::to_string_pretty(doc)
        .map_err(|e| ArtifactError::unparsable(format!("cannot serialize document: {e}")))?;
    text.push('\n');
    Ok(text)
}
