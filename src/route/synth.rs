use super::{HttpVerb, RouteCategory, RouteMapping};
use crate::config::{IdParamPolicy, RouteConfig};
use crate::naming::{singular_snake, to_kebab_case, ResourceAliasTable};

/// Category → concrete [`RouteMapping`]
///
/// | Category | Verb | Path |
/// |---|---|---|
/// | Create | POST | `{base}/{segment}` |
/// | BatchCreate | POST | `{base}/{segment}/batch` |
/// | Get | GET | `{base}/{segment}/{param}` |
/// | GetCollection, List | GET | `{base}/{segment}` |
/// | Update | PUT | `{base}/{segment}/{param}` |
/// | Delete | DELETE | `{base}/{segment}/{param}` |
/// | Action, id verb | POST | `{base}/{segment}/{param}/{verb}` |
/// | Action, other verb | POST | `{base}/{segment}/{verb}` |
/// | Action, no resource | POST | `{base}/{verb}` |
/// | Batch | POST | `{base}/batch/{operation}` |
/// | Fallback | POST | `{base}/{method}` |
#[derive(Debug, Clone)]
pub struct PathSynthesizer {
    aliases: ResourceAliasTable,
    id_param: IdParamPolicy,
    id_verbs: Vec<String>,
    list_placeholder: String,
}

impl PathSynthesizer {
    /// Build from the alias table and identifier policy
    pub fn new(config: &RouteConfig) -> Self {
        PathSynthesizer {
            aliases: ResourceAliasTable::new(config.aliases.clone()),
            id_param: config.id_param,
            id_verbs: config.id_verbs.clone(),
            list_placeholder: config.list_placeholder.clone(),
        }
    }

    /// Build the route for `category` under `base_path`
    pub fn synthesize(&self, category: &RouteCategory, base_path: &str) -> RouteMapping {
        let base = base_path.trim_end_matches('/');
        let body = category.body_policy();

        let (verb, path) = match category {
            RouteCategory::Create { resource } => {
                (HttpVerb::Post, format!("{base}/{}", self.aliases.segment(resource)))
            }
            RouteCategory::BatchCreate { resource } => (
                HttpVerb::Post,
                format!("{base}/{}/batch", self.aliases.segment(resource)),
            ),
            RouteCategory::Get { resource } => (HttpVerb::Get, self.item_path(base, resource)),
            RouteCategory::GetCollection { resource } => {
                (HttpVerb::Get, format!("{base}/{}", self.aliases.segment(resource)))
            }
            RouteCategory::List { resource } => {
                let segment = if resource.is_empty() {
                    self.list_placeholder.clone()
                } else {
                    self.aliases.segment(resource)
                };
                (HttpVerb::Get, format!("{base}/{segment}"))
            }
            RouteCategory::Update { resource } => (HttpVerb::Put, self.item_path(base, resource)),
            RouteCategory::Delete { resource } => {
                (HttpVerb::Delete, self.item_path(base, resource))
            }
            RouteCategory::Action { verb, resource } => {
                let action = to_kebab_case(verb);
                let path = if resource.is_empty() {
                    format!("{base}/{action}")
                } else if self.id_verbs.iter().any(|v| v == verb) {
                    format!("{}/{action}", self.item_path(base, resource))
                } else {
                    format!("{base}/{}/{action}", self.aliases.segment(resource))
                };
                (HttpVerb::Post, path)
            }
            RouteCategory::Batch { operation } => {
                let path = if operation.is_empty() {
                    format!("{base}/batch")
                } else {
                    format!("{base}/batch/{}", to_kebab_case(operation))
                };
                (HttpVerb::Post, path)
            }
            RouteCategory::Fallback { method } => {
                (HttpVerb::Post, format!("{base}/{}", to_kebab_case(method)))
            }
        };

        RouteMapping { verb, path, body }
    }

    fn item_path(&self, base: &str, resource: &str) -> String {
        format!(
            "{base}/{}/{{{}}}",
            self.aliases.segment(resource),
            self.param_name(resource)
        )
    }

    fn param_name(&self, resource: &str) -> String {
        match self.id_param {
            IdParamPolicy::Universal => "id".to_string(),
            IdParamPolicy::ResourceScoped => format!("{}_id", singular_snake(resource)),
        }
    }
}
