//! # Route Inference
//!
//! Turns an RPC method name into an HTTP route: verb, path template and body
//! policy. Inference is purely name-driven; nothing about the request or
//! response message is inspected.
//!
//! ## Overview
//!
//! Two stages, both pure:
//!
//! 1. [`VerbClassifier`] applies an ordered rule list to the method name and
//!    yields a [`RouteCategory`]. The first matching rule wins, so the order of
//!    the rules is part of the contract (`BatchCreateX` must never be read as
//!    `CreateX`).
//! 2. [`PathSynthesizer`] turns the category into a [`RouteMapping`] using the
//!    resource alias table and the identifier-parameter policy.
//!
//! [`RouteInferrer`] bundles both and is what the annotation passes, the
//! linter and the `classify` command use.
//!
//! ## Example
//!
//! ```rust
//! use protoroute::config::RouteConfig;
//! use protoroute::route::{BodyPolicy, HttpVerb, RouteInferrer};
//!
//! let inferrer = RouteInferrer::new(&RouteConfig::default());
//! let route = inferrer.infer("ApproveJournalEntry", "/api/v1/finance");
//! assert_eq!(route.verb, HttpVerb::Post);
//! assert_eq!(route.path, "/api/v1/finance/journal-entries/{id}/approve");
//! assert_eq!(route.body, BodyPolicy::Wildcard);
//! ```

mod classify;
mod synth;

#[cfg(test)]
mod tests;

pub use classify::VerbClassifier;
pub use synth::PathSynthesizer;

use crate::config::RouteConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Outcome of classifying a method name
///
/// `resource` is the method name with the rule's prefix stripped. It is never
/// empty for the CRUD categories; `List` and `Action` may carry an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteCategory {
    /// `Create<Resource>`
    Create { resource: String },
    /// `BatchCreate<Resource>`
    BatchCreate { resource: String },
    /// `Get<Resource>` addressing one resource
    Get { resource: String },
    /// `Get<Resource>` whose resource contains a collection marker (`ById`, `History`, ...)
    GetCollection { resource: String },
    /// `List<Resource>`, `Search<Resource>`, `Stream<Resource>`
    List { resource: String },
    /// `Update<Resource>`
    Update { resource: String },
    /// `Delete<Resource>`
    Delete { resource: String },
    /// `<ActionVerb><Resource>`
    Action { verb: String, resource: String },
    /// `Batch<Operation>` other than `BatchCreate`
    Batch { operation: String },
    /// Nothing else matched
    Fallback { method: String },
}

impl RouteCategory {
    /// Short, stable name for logs and the `classify` command
    pub fn label(&self) -> &'static str {
        match self {
            RouteCategory::Create { .. } => "create",
            RouteCategory::BatchCreate { .. } => "batch-create",
            RouteCategory::Get { .. } => "get",
            RouteCategory::GetCollection { .. } => "get-collection",
            RouteCategory::List { .. } => "list",
            RouteCategory::Update { .. } => "update",
            RouteCategory::Delete { .. } => "delete",
            RouteCategory::Action { .. } => "action",
            RouteCategory::Batch { .. } => "batch",
            RouteCategory::Fallback { .. } => "fallback",
        }
    }

    /// Request body policy implied by the category
    pub fn body_policy(&self) -> BodyPolicy {
        match self {
            RouteCategory::Get { .. }
            | RouteCategory::GetCollection { .. }
            | RouteCategory::List { .. }
            | RouteCategory::Delete { .. } => BodyPolicy::None,
            _ => BodyPolicy::Wildcard,
        }
    }
}

/// HTTP verb of an inferred route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    /// Lowercase form used as the key inside `(google.api.http)`
    pub fn as_option_key(self) -> &'static str {
        match self {
            HttpVerb::Get => "get",
            HttpVerb::Post => "post",
            HttpVerb::Put => "put",
            HttpVerb::Delete => "delete",
        }
    }

    /// Parse an option key (`get`, `post`, ...); `patch` and custom verbs are not inferred
    pub fn from_option_key(key: &str) -> Option<Self> {
        match key {
            "get" => Some(HttpVerb::Get),
            "post" => Some(HttpVerb::Post),
            "put" => Some(HttpVerb::Put),
            "delete" => Some(HttpVerb::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// Whether the whole request message is bound to the HTTP body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPolicy {
    /// No body; fields travel in the path or query
    None,
    /// `body: "*"`
    Wildcard,
}

/// Verb, path template and body policy for one method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMapping {
    /// HTTP verb
    pub verb: HttpVerb,
    /// Path template, `{param}` segments included
    pub path: String,
    /// Body policy
    pub body: BodyPolicy,
}

impl fmt::Display for RouteMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.path)?;
        if self.body == BodyPolicy::Wildcard {
            f.write_str(" (body: *)")?;
        }
        Ok(())
    }
}

/// Classifier and synthesizer configured from the same [`RouteConfig`]
#[derive(Debug, Clone)]
pub struct RouteInferrer {
    classifier: VerbClassifier,
    synthesizer: PathSynthesizer,
}

impl RouteInferrer {
    /// Build both stages from configuration
    pub fn new(config: &RouteConfig) -> Self {
        RouteInferrer {
            classifier: VerbClassifier::new(config),
            synthesizer: PathSynthesizer::new(config),
        }
    }

    /// First stage only
    pub fn classify(&self, method: &str) -> RouteCategory {
        self.classifier.classify(method)
    }

    /// Second stage only
    pub fn synthesize(&self, category: &RouteCategory, base_path: &str) -> RouteMapping {
        self.synthesizer.synthesize(category, base_path)
    }

    /// Classify then synthesize
    pub fn infer(&self, method: &str, base_path: &str) -> RouteMapping {
        let category = self.classify(method);
        self.synthesize(&category, base_path)
    }
}

static METHOD_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("method name regex is valid")
});

/// True when `name` is a valid proto identifier
pub fn is_method_name(name: &str) -> bool {
    METHOD_NAME_REGEX.is_match(name)
}

/// Base path derived from a proto package declaration
///
/// `/api/v1/` followed by the package segments, minus a trailing version
/// segment (`v1`, `v2beta1`): `finance.gl.v1` → `/api/v1/finance/gl`.
pub fn base_path_for_package(package: &str) -> String {
    let mut segments: Vec<&str> = package.split('.').filter(|s| !s.is_empty()).collect();
    if segments.last().is_some_and(|s| is_version_segment(s)) {
        segments.pop();
    }
    if segments.is_empty() {
        "/api/v1".to_string()
    } else {
        format!("/api/v1/{}", segments.join("/"))
    }
}

fn is_version_segment(segment: &str) -> bool {
    let Some(rest) = segment.strip_prefix('v') else {
        return false;
    };
    rest.chars().next().is_some_and(|c| c.is_ascii_digit())
        && rest.chars().all(|c| c.is_ascii_alphanumeric())
}
