use super::{tag_description, used_tags};
use crate::config::PartitionConfig;
use crate::error::ArtifactError;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Splits a unified document into per-domain documents
///
/// A path belongs to the domain named by its segment at the configured index
/// (`/api/v1/finance/...` → `finance`), after the override table has had a
/// chance to redirect it (`users` → `auth`). Paths whose segment names no
/// domain are dropped.
#[derive(Debug, Clone)]
pub struct DocumentPartitioner {
    config: PartitionConfig,
}

impl DocumentPartitioner {
    pub fn new(config: &PartitionConfig) -> Self {
        DocumentPartitioner {
            config: config.clone(),
        }
    }

    /// Domain key for `path`, if any
    pub fn domain_for(&self, path: &str) -> Option<&str> {
        let segment = path.split('/').nth(self.config.segment_index)?;
        let key = self
            .config
            .overrides
            .get(segment)
            .map(String::as_str)
            .unwrap_or(segment);
        self.config
            .domains
            .get_key_value(key)
            .map(|(key, _)| key.as_str())
    }

    /// Domain key → sub-document; domains without paths are omitted
    pub fn partition(&self, doc: &Value) -> Result<BTreeMap<String, Value>, ArtifactError> {
        let root = doc
            .as_object()
            .ok_or_else(|| ArtifactError::unparsable("API description is not a JSON object"))?;
        let empty = Map::new();
        let paths = match root.get("paths") {
            Some(Value::Object(paths)) => paths,
            Some(_) => return Err(ArtifactError::unparsable("`paths` is not an object")),
            None => &empty,
        };

        let mut assigned: BTreeMap<&str, Map<String, Value>> = BTreeMap::new();
        for (path, item) in paths {
            match self.domain_for(path) {
                Some(key) => {
                    assigned
                        .entry(key)
                        .or_default()
                        .insert(path.clone(), item.clone());
                }
                None => tracing::debug!(path = %path, "no domain for path, dropped"),
            }
        }

        let source_tags: Vec<&Value> = root
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().collect())
            .unwrap_or_default();

        let mut result = BTreeMap::new();
        for (key, domain_paths) in assigned {
            let Some(domain) = self.config.domains.get(key) else {
                continue;
            };

            let mut tags = Vec::new();
            for name in used_tags(&domain_paths) {
                let mut tag = source_tags
                    .iter()
                    .find(|t| t.get("name").and_then(Value::as_str) == Some(name.as_str()))
                    .map(|t| (*t).clone())
                    .unwrap_or_else(|| json!({ "name": name }));

                if tag_description(&tag).is_none() {
                    let extra = self
                        .config
                        .extra_tags
                        .get(key)
                        .and_then(|extras| extras.iter().find(|e| e.name == name))
                        .filter(|e| !e.description.is_empty());
                    if let (Some(extra), Some(object)) = (extra, tag.as_object_mut()) {
                        object.insert("description".to_string(), json!(extra.description));
                    }
                }
                tags.push(tag);
            }

            tracing::debug!(
                domain = key,
                paths = domain_paths.len(),
                tags = tags.len(),
                "partitioned domain"
            );

            let mut sub = Map::new();
            sub.insert(
                "openapi".to_string(),
                root.get("openapi").cloned().unwrap_or_else(|| json!("3.0.3")),
            );
            sub.insert(
                "info".to_string(),
                json!({
                    "title": format!("{} - {}", self.config.title_prefix, domain.name),
                    "description": domain.description,
                    "version": self.config.version,
                }),
            );
            sub.insert(
                "servers".to_string(),
                root.get("servers").cloned().unwrap_or_else(|| json!([])),
            );
            sub.insert("paths".to_string(), Value::Object(domain_paths));
            sub.insert("tags".to_string(), Value::Array(tags));
            sub.insert(
                "components".to_string(),
                root.get("components").cloned().unwrap_or_else(|| json!({})),
            );

            result.insert(key.to_string(), Value::Object(sub));
        }

        Ok(result)
    }
}
