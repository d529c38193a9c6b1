use super::{parse_document, render_document, tag_description, used_tags};
use crate::config::{EnrichConfig, TagConfig};
use crate::error::ArtifactError;
use crate::proto::SpliceOutcome;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const BEARER_SCHEME: &str = "BearerAuth";

/// Metadata key for an API description file
///
/// `docs/openapi/order_service.openapi3.json` → `order_service`
pub fn service_key_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.strip_suffix(".openapi3") {
        Some(key) => key.to_string(),
        None => stem,
    }
}

/// Security, `info` and tag backfill for generated API descriptions
#[derive(Debug, Clone)]
pub struct DocumentEnricher {
    config: EnrichConfig,
    // Category descriptions from the tag tables, used after `tag_descriptions`
    category_descriptions: HashMap<String, String>,
}

impl DocumentEnricher {
    pub fn new(config: &EnrichConfig, tags: &TagConfig) -> Self {
        let category_descriptions = tags
            .categories
            .iter()
            .filter(|c| !c.description.is_empty())
            .map(|c| (c.name.clone(), c.description.clone()))
            .collect();
        DocumentEnricher {
            config: config.clone(),
            category_descriptions,
        }
    }

    /// Enrich `doc` in place; returns whether anything changed
    ///
    /// 1. `info` from the metadata entry for `service_key` (a generic `info` is
    ///    added when there is neither an entry nor an existing `info`)
    /// 2. `components.securitySchemes.BearerAuth`
    /// 3. a global `security` requirement on `BearerAuth`
    /// 4. a definition with a description for every used tag, sorted by name
    pub fn enrich(&self, doc: &mut Value, service_key: &str) -> Result<bool, ArtifactError> {
        let before = doc.clone();
        let root = doc
            .as_object_mut()
            .ok_or_else(|| ArtifactError::unparsable("API description is not a JSON object"))?;

        self.backfill_info(root, service_key)?;
        self.add_security(root)?;
        self.define_tags(root)?;

        Ok(*doc != before)
    }

    /// [`DocumentEnricher::enrich`] over document text
    ///
    /// An unchanged document comes back byte-identical with a count of zero.
    pub fn enrich_text(&self, text: &str, service_key: &str) -> Result<SpliceOutcome, ArtifactError> {
        let mut doc = parse_document(text)?;
        if !self.enrich(&mut doc, service_key)? {
            return Ok(SpliceOutcome::unchanged(text));
        }
        Ok(SpliceOutcome {
            text: render_document(&doc)?,
            modified: 1,
        })
    }

    fn backfill_info(
        &self,
        root: &mut Map<String, Value>,
        service_key: &str,
    ) -> Result<(), ArtifactError> {
        let Some(metadata) = self.config.services.get(service_key) else {
            if !root.contains_key("info") {
                tracing::debug!(service = service_key, "no metadata, adding generic info");
                root.insert(
                    "info".to_string(),
                    json!({ "title": "Enterprise API", "version": "0.1.0" }),
                );
            }
            return Ok(());
        };

        let info = object_entry(root, "info")?;
        info.insert("title".to_string(), json!(metadata.title));
        if !info.contains_key("version") {
            info.insert("version".to_string(), json!("0.1.0"));
        }
        info.insert("description".to_string(), json!(metadata.description));
        if let Some(contact) = &metadata.contact {
            info.insert(
                "contact".to_string(),
                json!({ "name": contact.name, "email": contact.email }),
            );
        }
        Ok(())
    }

    fn add_security(&self, root: &mut Map<String, Value>) -> Result<(), ArtifactError> {
        let components = object_entry(root, "components")?;
        let schemes = object_entry(components, "securitySchemes")?;
        schemes.insert(
            BEARER_SCHEME.to_string(),
            json!({
                "type": "http",
                "scheme": "bearer",
                "bearerFormat": "JWT",
                "description": self.config.bearer_description,
            }),
        );

        let security = root
            .entry("security")
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .ok_or_else(|| ArtifactError::unparsable("`security` is not an array"))?;
        let has_bearer = security
            .iter()
            .any(|requirement| requirement.get(BEARER_SCHEME).is_some());
        if !has_bearer {
            security.push(json!({ BEARER_SCHEME: [] }));
        }
        Ok(())
    }

    fn define_tags(&self, root: &mut Map<String, Value>) -> Result<(), ArtifactError> {
        let used = match root.get("paths") {
            Some(Value::Object(paths)) => used_tags(paths),
            _ => Vec::new(),
        };

        // Taken in place so `tags` keeps its position in the document
        let existing = match root.get_mut("tags") {
            Some(Value::Array(tags)) => std::mem::take(tags),
            Some(_) => return Err(ArtifactError::unparsable("`tags` is not an array")),
            None => Vec::new(),
        };

        let mut defined: BTreeMap<String, Value> = BTreeMap::new();
        for tag in existing {
            if let Some(name) = tag.get("name").and_then(Value::as_str) {
                defined.entry(name.to_string()).or_insert(tag);
            }
        }

        for name in used {
            let description = self
                .config
                .tag_descriptions
                .get(&name)
                .or_else(|| self.category_descriptions.get(&name))
                .cloned()
                .or_else(|| {
                    defined
                        .get(&name)
                        .and_then(tag_description)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| name.clone());

            let tag = defined
                .entry(name.clone())
                .or_insert_with(|| json!({ "name": name }));
            if let Some(object) = tag.as_object_mut() {
                object.insert("description".to_string(), json!(description));
            }
        }

        root.insert(
            "tags".to_string(),
            Value::Array(defined.into_values().collect()),
        );
        Ok(())
    }
}

/// `root[key]` as an object, created when absent
fn object_entry<'a>(
    root: &'a mut Map<String, Value>,
    key: &str,
) -> Result<&'a mut Map<String, Value>, ArtifactError> {
    root.entry(key)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| ArtifactError::unparsable(format!("`{key}` is not an object")))
}
