//! # Gateway Route Projection
//!
//! Keeps gateway routing rules in step with the routes written into the
//! interface files. A REST rule such as
//!
//! ```yaml
//!   - match:
//!     - uri:
//!         prefix: /api/v1/finance/gl
//!     route:
//!     - destination:
//!         host: gl-service.cuba-fi.svc.cluster.local
//! ```
//!
//! gains a second, protocol-specific matcher derived from the destination
//! host, so gRPC clients reach the same backend:
//!
//! ```yaml
//!     - uri:
//!         prefix: /finance.gl.v1
//! ```
//!
//! ## Derivation
//!
//! The host is read as `<service>.<namespace>.<cluster domain>`. The service
//! code is `<service>` up to its first `-`; the namespace suffix is the
//! namespace minus the configured prefix (`cuba-`). The package is then:
//!
//! - `iam` for the identity service in the identity namespace;
//! - `<domain>.<code>` when the suffix has a domain entry;
//! - `<fallback_root>.<suffix>.<code>` otherwise.
//!
//! ## Idempotence
//!
//! Only rules with exactly one matcher and one destination are projected, so a
//! projected rule (two matchers) is returned untouched.

mod document;

#[cfg(test)]
mod tests;

use crate::config::GatewayConfig;
use crate::error::ArtifactError;
use crate::proto::SpliceOutcome;

/// One HTTP routing rule, reduced to what projection needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingRule {
    /// URI prefix matchers, in document order
    pub prefixes: Vec<String>,
    /// Matchers of any other kind (`exact`, `regex`, headers, ...)
    pub other_matchers: usize,
    /// Destination hosts, in document order
    pub hosts: Vec<String>,
    /// Port of the first destination, if given
    pub port: Option<u64>,
}

/// Derives gRPC prefixes from destination hosts
#[derive(Debug, Clone)]
pub struct GatewayProjector {
    config: GatewayConfig,
}

impl GatewayProjector {
    pub fn new(config: &GatewayConfig) -> Self {
        GatewayProjector {
            config: config.clone(),
        }
    }

    /// Package name for `host`, e.g. `finance.gl`
    pub fn derive_package(&self, host: &str) -> Option<String> {
        let mut labels = host.split('.');
        let service = labels.next().filter(|s| !s.is_empty())?;
        let namespace = labels.next()?;
        let suffix = namespace.strip_prefix(self.config.namespace_prefix.as_str())?;
        if suffix.is_empty() {
            return None;
        }
        let code = service.split('-').next().unwrap_or(service);

        let package = if suffix == self.config.identity_namespace
            && code == self.config.identity_code
        {
            self.config.identity_code.clone()
        } else if let Some(domain) = self.config.domains.get(suffix) {
            format!("{domain}.{code}")
        } else {
            format!("{}.{suffix}.{code}", self.config.fallback_root)
        };
        Some(package)
    }

    /// Second matcher prefix for `host`, e.g. `/finance.gl.v1`
    pub fn derive_prefix(&self, host: &str) -> Option<String> {
        self.derive_package(host).map(|package| format!("/{package}.v1"))
    }

    /// Prefix to add to `rule`, or `None` when the rule is not projectable
    pub fn projection_for(&self, rule: &RoutingRule) -> Option<String> {
        if rule.prefixes.len() != 1 || rule.other_matchers != 0 || rule.hosts.len() != 1 {
            return None;
        }
        self.derive_prefix(&rule.hosts[0])
    }

    /// Rule with the derived matcher appended; unprojectable rules come back as-is
    pub fn project_rule(&self, rule: &RoutingRule) -> RoutingRule {
        let mut projected = rule.clone();
        if let Some(prefix) = self.projection_for(rule) {
            projected.prefixes.push(prefix);
        }
        projected
    }

    /// Parsed routing rules of the `VirtualService` in `text`
    pub fn rules(&self, text: &str) -> Result<Vec<RoutingRule>, ArtifactError> {
        Ok(document::VirtualServiceText::locate(text)?.rules)
    }

    /// Add the derived matcher to every projectable rule in `text`
    ///
    /// The new `- uri:` entry is a copy of the existing one with its prefix
    /// replaced, inserted right after it. All other bytes are preserved.
    pub fn project(&self, text: &str) -> Result<SpliceOutcome, ArtifactError> {
        let service = document::VirtualServiceText::locate(text)?;

        let mut inserts = Vec::new();
        for (index, rule) in service.rules.iter().enumerate() {
            let Some(prefix) = self.projection_for(rule) else {
                tracing::debug!(
                    rule = index,
                    matchers = rule.prefixes.len(),
                    "rule not projectable"
                );
                continue;
            };
            let block = &service.blocks[index];
            match block.matcher_copy(text, &prefix) {
                Some(insert) => {
                    tracing::debug!(rule = index, prefix = %prefix, "adding gRPC matcher");
                    inserts.push(insert);
                }
                None => {
                    tracing::warn!(
                        rule = index,
                        "matcher is not in block style, leaving rule unchanged"
                    );
                }
            }
        }

        if inserts.is_empty() {
            return Ok(SpliceOutcome::unchanged(text));
        }

        let modified = inserts.len();
        let mut out = text.to_string();
        for (at, fragment) in inserts.into_iter().rev() {
            out.insert_str(at, &fragment);
        }
        Ok(SpliceOutcome {
            text: out,
            modified,
        })
    }
}
