use super::RouteCategory;
use crate::config::RouteConfig;

/// Ordered rule engine: method name → [`RouteCategory`]
///
/// Every rule is an independent prefix test, evaluated in a fixed order:
///
/// 1. `Create`
/// 2. `BatchCreate`
/// 3. `Get` (unless the name contains `List` or `Statistics`)
/// 4. `List` / `Search` / `Stream`
/// 5. `Update`
/// 6. `Delete`
/// 7. configured action verbs, first prefix in list order wins
/// 8. `Batch`
/// 9. fallback on the whole name
///
/// Rules 1-3, 5 and 6 only match when a resource follows the prefix; a bare
/// `Create` falls through to the later rules. Rule 9 is total, so
/// classification cannot fail.
#[derive(Debug, Clone)]
pub struct VerbClassifier {
    action_verbs: Vec<String>,
    collection_markers: Vec<String>,
}

const LIST_PREFIXES: [&str; 3] = ["List", "Search", "Stream"];

impl VerbClassifier {
    /// Build from the verb and collection-marker tables
    pub fn new(config: &RouteConfig) -> Self {
        VerbClassifier {
            action_verbs: config.action_verbs.clone(),
            collection_markers: config.collection_markers.clone(),
        }
    }

    /// Classify `method`
    pub fn classify(&self, method: &str) -> RouteCategory {
        if let Some(resource) = resource_after(method, "Create") {
            return RouteCategory::Create { resource };
        }

        if let Some(resource) = resource_after(method, "BatchCreate") {
            return RouteCategory::BatchCreate { resource };
        }

        if !method.contains("List") && !method.contains("Statistics") {
            if let Some(resource) = resource_after(method, "Get") {
                if self
                    .collection_markers
                    .iter()
                    .any(|marker| resource.contains(marker.as_str()))
                {
                    return RouteCategory::GetCollection { resource };
                }
                return RouteCategory::Get { resource };
            }
        }

        for prefix in LIST_PREFIXES {
            if let Some(rest) = method.strip_prefix(prefix) {
                return RouteCategory::List {
                    resource: rest.to_string(),
                };
            }
        }

        if let Some(resource) = resource_after(method, "Update") {
            return RouteCategory::Update { resource };
        }

        if let Some(resource) = resource_after(method, "Delete") {
            return RouteCategory::Delete { resource };
        }

        for verb in &self.action_verbs {
            if let Some(rest) = method.strip_prefix(verb.as_str()) {
                return RouteCategory::Action {
                    verb: verb.clone(),
                    resource: rest.to_string(),
                };
            }
        }

        if let Some(rest) = method.strip_prefix("Batch") {
            return RouteCategory::Batch {
                operation: rest.to_string(),
            };
        }

        RouteCategory::Fallback {
            method: method.to_string(),
        }
    }
}

fn resource_after(method: &str, prefix: &str) -> Option<String> {
    method
        .strip_prefix(prefix)
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
}
