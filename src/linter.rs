//! # Consistency Linter
//!
//! Re-derives routes from each kind of artifact and reports where the written
//! artifact and the inference rules disagree. Nothing is modified.
//!
//! ## Checks Performed
//!
//! **Interface files (`.proto`)**
//!
//! 1. **route_drift** - an existing `(google.api.http)` rule differs from the inferred route
//! 2. **missing_http_annotation** - a declaration has no HTTP rule yet
//!
//! **Routing rules (`.yaml`, `.yml`)**
//!
//! 3. **missing_grpc_prefix** - a single-matcher rule has not been projected
//! 4. **grpc_prefix_drift** - the second matcher differs from the derived prefix
//!
//! **API descriptions (`.json`)**
//!
//! 5. **undefined_tag** - an operation references a tag with no top-level definition
//! 6. **duplicate_tag** - a tag is defined more than once
//! 7. **empty_tag_description** - a tag definition has no description
//!
//! ## Usage
//!
//! ```rust,ignore
//! use protoroute::linter::{Linter, print_lint_issues};
//!
//! let linter = Linter::new(&config, None);
//! let issues = linter.lint_artifact(Path::new("proto/gl.proto"))?;
//! print_lint_issues(&issues);
//! ```

use crate::config::EngineConfig;
use crate::error::ArtifactError;
use crate::gateway::GatewayProjector;
use crate::openapi::{operations, tag_description};
use crate::proto::{parse, HttpPass, HttpRule, HTTP_OPTION};
use crate::route::RouteInferrer;
use anyhow::Context;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;


/// Severity level for lint issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Error - the artifacts are inconsistent
    Error,
    /// Warning - written and inferred data disagree
    Warning,
    /// Info - an annotation pass would change this artifact
    Info,
}

impl fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LintSeverity::Error => "error",
            LintSeverity::Warning => "warning",
            LintSeverity::Info => "info",
        };
        f.write_str(s)
    }
}

/// A lint issue found in an artifact
#[derive(Debug, Clone)]
pub struct LintIssue {
    /// Where the issue occurred (e.g., "gl.proto:JournalService.GetJournalEntry")
    pub location: String,
    /// Severity of the issue
    pub severity: LintSeverity,
    /// Type of lint issue (e.g., "route_drift", "undefined_tag")
    pub kind: String,
    /// Human-readable description of the problem
    pub message: String,
    /// Optional suggestion for how to fix it
    pub suggestion: Option<String>,
}

impl LintIssue {
    /// Create a new lint issue
    pub fn new(
        location: impl Into<String>,
        severity: LintSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        LintIssue {
            location: location.into(),
            severity,
            kind: kind.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Add a suggestion for fixing the issue
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Checks artifacts against the inference rules
#[derive(Debug, Clone)]
pub struct Linter {
    inferrer: RouteInferrer,
    projector: GatewayProjector,
    base_path: Option<String>,
}

impl Linter {
    /// `base_path` overrides the configured and package-derived base paths
    pub fn new(config: &EngineConfig, base_path: Option<String>) -> Self {
        Linter {
            inferrer: RouteInferrer::new(&config.routes),
            projector: GatewayProjector::new(&config.gateway),
            base_path: base_path.or_else(|| config.routes.base_path.clone()),
        }
    }

    /// Lint one artifact, dispatching on its extension
    pub fn lint_artifact(&self, path: &Path) -> anyhow::Result<Vec<LintIssue>> {
        if !path.exists() {
            return Err(ArtifactError::MissingArtifact {
                path: path.to_path_buf(),
            }
            .into());
        }
        let label = path.display().to_string();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let issues = match extension {
            "proto" => self.lint_proto(&text, &label).map_err(|e| e.at(path))?,
            "yaml" | "yml" => self.lint_gateway(&text, &label).map_err(|e| e.at(path))?,
            "json" => {
                let doc: Value = serde_json::from_str(&text)
                    .with_context(|| format!("Failed to parse {}", path.display()))?;
                self.lint_openapi(&doc, &label)
            }
            other => anyhow::bail!("Unsupported artifact type '{}': {}", other, path.display()),
        };
        Ok(issues)
    }

    /// Compare written HTTP rules with inferred routes
    pub fn lint_proto(&self, text: &str, label: &str) -> Result<Vec<LintIssue>, ArtifactError> {
        let file = parse(text)?;
        let base = HttpPass::new(&self.inferrer, self.base_path.clone()).base_path_for(&file);
        let mut issues = Vec::new();

        for method in file.methods() {
            let location = format!("{label}:{}.{}", method.service, method.name);
            let route = self.inferrer.infer(&method.name, &base);

            let written: Vec<_> = method.options_named(HTTP_OPTION).collect();
            let Some(option) = written.first() else {
                issues.push(
                    LintIssue::new(
                        &location,
                        LintSeverity::Info,
                        "missing_http_annotation",
                        format!("No HTTP rule; would be annotated as {route}"),
                    )
                    .with_suggestion("Run: protoroute annotate-http"),
                );
                continue;
            };

            let rule = if option.name == HTTP_OPTION {
                HttpRule::parse(&text[option.value.clone()])
            } else {
                HttpRule::from_fields(written.iter().filter_map(|o| {
                    let field = o.name.strip_prefix(HTTP_OPTION)?.strip_prefix('.')?;
                    Some((field, &text[o.value.clone()]))
                }))
            };

            match rule {
                Some(rule) => {
                    if let Some(message) = rule.drift_from(&route) {
                        issues.push(
                            LintIssue::new(&location, LintSeverity::Warning, "route_drift", message)
                                .with_suggestion(format!("Change to: {route}")),
                        );
                    }
                }
                None => issues.push(LintIssue::new(
                    &location,
                    LintSeverity::Warning,
                    "route_drift",
                    "HTTP rule has no readable pattern",
                )),
            }
        }

        Ok(issues)
    }

    /// Compare gateway matchers with the prefixes derived from their hosts
    pub fn lint_gateway(&self, text: &str, label: &str) -> Result<Vec<LintIssue>, ArtifactError> {
        let mut issues = Vec::new();

        for (index, rule) in self.projector.rules(text)?.iter().enumerate() {
            let location = format!("{label}:http[{index}]");

            if let Some(prefix) = self.projector.projection_for(rule) {
                issues.push(
                    LintIssue::new(
                        &location,
                        LintSeverity::Info,
                        "missing_grpc_prefix",
                        format!("Rule for {} has no gRPC matcher", rule.prefixes[0]),
                    )
                    .with_suggestion(format!("Add prefix: {prefix}")),
                );
                continue;
            }

            if let ([_, written], [host]) = (rule.prefixes.as_slice(), rule.hosts.as_slice()) {
                if let Some(derived) = self.projector.derive_prefix(host) {
                    if *written != derived {
                        issues.push(
                            LintIssue::new(
                                &location,
                                LintSeverity::Warning,
                                "grpc_prefix_drift",
                                format!("gRPC matcher '{written}' does not match host {host}"),
                            )
                            .with_suggestion(format!("Change to: {derived}")),
                        );
                    }
                }
            }
        }

        Ok(issues)
    }

    /// Check tag references and definitions of an API description
    pub fn lint_openapi(&self, doc: &Value, label: &str) -> Vec<LintIssue> {
        let mut issues = Vec::new();

        let definitions: Vec<&Value> = doc
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().collect())
            .unwrap_or_default();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for tag in &definitions {
            let Some(name) = tag.get("name").and_then(Value::as_str) else {
                continue;
            };
            let count = counts.entry(name).or_insert(0);
            *count += 1;
            let location = format!("{label}:tags[{name}]");
            if *count == 2 {
                issues.push(
                    LintIssue::new(
                        &location,
                        LintSeverity::Error,
                        "duplicate_tag",
                        format!("Tag '{name}' is defined more than once"),
                    )
                    .with_suggestion("Keep a single definition"),
                );
            }
            if *count == 1 && tag_description(tag).is_none() {
                issues.push(
                    LintIssue::new(
                        &location,
                        LintSeverity::Warning,
                        "empty_tag_description",
                        format!("Tag '{name}' has no description"),
                    )
                    .with_suggestion("Run: protoroute enrich"),
                );
            }
        }

        if let Some(paths) = doc.get("paths").and_then(Value::as_object) {
            let mut reported = Vec::new();
            for (path, method, operation) in operations(paths) {
                let tags = operation.get("tags").and_then(Value::as_array);
                for tag in tags.into_iter().flatten().filter_map(Value::as_str) {
                    if counts.contains_key(tag) || reported.contains(&tag) {
                        continue;
                    }
                    reported.push(tag);
                    issues.push(
                        LintIssue::new(
                            format!("{label}:{path} {}", method.to_uppercase()),
                            LintSeverity::Error,
                            "undefined_tag",
                            format!("Tag '{tag}' is used but not defined in top-level tags"),
                        )
                        .with_suggestion("Run: protoroute enrich"),
                    );
                }
            }
        }

        issues
    }
}

/// True when any issue is an error
pub fn has_errors(issues: &[LintIssue]) -> bool {
    issues.iter().any(|i| i.severity == LintSeverity::Error)
}

/// Print lint issues in a formatted way
pub fn print_lint_issues(issues: &[LintIssue]) {
    if issues.is_empty() {
        println!("✅ No lint issues found!");
        return;
    }

    let errors: Vec<_> = issues
        .iter()
        .filter(|i| i.severity == LintSeverity::Error)
        .collect();
    let warnings: Vec<_> = issues
        .iter()
        .filter(|i| i.severity == LintSeverity::Warning)
        .collect();
    let infos: Vec<_> = issues
        .iter()
        .filter(|i| i.severity == LintSeverity::Info)
        .collect();

    println!("\n📋 Lint Results:");
    println!(
        "   {} error(s), {} warning(s), {} info(s)\n",
        errors.len(),
        warnings.len(),
        infos.len()
    );

    print_group("❌ Errors (must fix):", &errors);
    print_group("⚠️  Warnings (drift):", &warnings);
    print_group("ℹ️  Info (pending annotations):", &infos);
}

fn print_group(title: &str, issues: &[&LintIssue]) {
    if issues.is_empty() {
        return;
    }
    println!("{title}");
    for issue in issues {
        println!("   [{}] {}", issue.kind, issue.location);
        println!("      {}", issue.message);
        if let Some(suggestion) = &issue.suggestion {
            println!("      💡 Suggestion: {}", suggestion);
        }
    }
    println!();
}
