//! Business category tagging.
//!
//! A method belongs to a category by exact name membership; there is no prefix
//! or pattern matching here. Categories are consulted in configuration order,
//! so a method listed twice lands in the first category that names it.

use crate::config::{TagConfig, UncategorizedPolicy};
use std::collections::HashMap;

/// Tag assigned to one method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTag {
    /// Tag name
    pub name: String,
    /// Tag description (empty when the category has none)
    pub description: String,
    /// Operation summary
    pub summary: String,
}

/// Method name → optional [`CategoryTag`]
#[derive(Debug, Clone)]
pub struct TagCategorizer {
    // method → index into `categories`
    membership: HashMap<String, usize>,
    categories: Vec<(String, String)>,
    summaries: HashMap<String, String>,
    uncategorized: UncategorizedPolicy,
}

impl TagCategorizer {
    /// Build the membership index from configuration
    pub fn new(config: &TagConfig) -> Self {
        let mut membership = HashMap::new();
        let mut categories = Vec::with_capacity(config.categories.len());

        for (index, category) in config.categories.iter().enumerate() {
            categories.push((category.name.clone(), category.description.clone()));
            for method in &category.methods {
                membership.entry(method.clone()).or_insert(index);
            }
        }

        TagCategorizer {
            membership,
            categories,
            summaries: config.summaries.clone(),
            uncategorized: config.uncategorized,
        }
    }

    /// Override the uncategorized policy (the `--service-tags` flag)
    pub fn with_uncategorized(mut self, policy: UncategorizedPolicy) -> Self {
        self.uncategorized = policy;
        self
    }

    /// Categorize `method`
    ///
    /// Summary resolution: override table, then the leading comment, then the
    /// method name. Methods in no category get no tag unless the policy is
    /// [`UncategorizedPolicy::ServiceName`] and a service name is known.
    pub fn categorize(
        &self,
        method: &str,
        leading_comment: Option<&str>,
        service: Option<&str>,
    ) -> Option<CategoryTag> {
        let (name, description) = match self.membership.get(method) {
            Some(&index) => self.categories[index].clone(),
            None => match (self.uncategorized, service) {
                (UncategorizedPolicy::ServiceName, Some(service)) => {
                    (service.to_string(), String::new())
                }
                _ => return None,
            },
        };

        let summary = self
            .summaries
            .get(method)
            .cloned()
            .or_else(|| {
                leading_comment
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| method.to_string());

        Some(CategoryTag {
            name,
            description,
            summary,
        })
    }

    /// Every configured category as `(name, description)`
    pub fn categories(&self) -> impl Iterator<Item = (&str, &str)> {
        self.categories
            .iter()
            .map(|(name, description)| (name.as_str(), description.as_str()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::config::CategoryDef;

    fn config() -> TagConfig {
        TagConfig {
            uncategorized: UncategorizedPolicy::Skip,
            categories: vec![
                CategoryDef {
                    name: "Journal Entry Core".to_string(),
                    description: "Create and maintain journal entries".to_string(),
                    methods: vec![
                        "CreateJournalEntry".to_string(),
                        "GetJournalEntry".to_string(),
                    ],
                },
                CategoryDef {
                    name: "Duplicates".to_string(),
                    description: String::new(),
                    methods: vec!["GetJournalEntry".to_string()],
                },
            ],
            summaries: [(
                "CreateJournalEntry".to_string(),
                "Create a journal entry".to_string(),
            )]
            .into_iter()
            .collect(),
        }
    }

    #[test]
    fn test_summary_resolution_order() {
        let tags = TagCategorizer::new(&config());

        let with_override = tags
            .categorize("CreateJournalEntry", Some("ignored"), None)
            .unwrap();
        assert_eq!(with_override.summary, "Create a journal entry");
        assert_eq!(with_override.name, "Journal Entry Core");

        let from_comment = tags
            .categorize("GetJournalEntry", Some(" Fetch one entry "), None)
            .unwrap();
        assert_eq!(from_comment.summary, "Fetch one entry");

        let from_name = tags.categorize("GetJournalEntry", None, None).unwrap();
        assert_eq!(from_name.summary, "GetJournalEntry");
    }

    #[test]
    fn test_first_category_wins() {
        let tags = TagCategorizer::new(&config());
        let tag = tags.categorize("GetJournalEntry", None, None).unwrap();
        assert_eq!(tag.name, "Journal Entry Core");
    }

    #[test]
    fn test_membership_is_exact() {
        let tags = TagCategorizer::new(&config());
        assert!(tags
            .categorize("CreateJournalEntryDraft", None, Some("GlService"))
            .is_none());
    }

    #[test]
    fn test_service_name_policy() {
        let tags =
            TagCategorizer::new(&config()).with_uncategorized(UncategorizedPolicy::ServiceName);
        let tag = tags
            .categorize("Login", Some("Sign in"), Some("AuthService"))
            .unwrap();
        assert_eq!(tag.name, "AuthService");
        assert_eq!(tag.summary, "Sign in");
        // No enclosing service known: still untagged
        assert!(tags.categorize("Login", None, None).is_none());
    }
}
