//! # Engine Configuration
//!
//! All lookup tables the engine consumes live here: resource aliases, the
//! ordered action-verb list, category membership, the gateway domain table,
//! partition domains and the service metadata used for enrichment.
//!
//! ## Overview
//!
//! Configuration is read once at start-up from a TOML file and then handed to
//! each component by reference. Nothing mutates it afterwards, which is what
//! keeps a batch run deterministic: every artifact sees the same tables.
//!
//! Every section has built-in defaults, so an empty (or absent) file yields a
//! usable engine. Category tables and service metadata are data, not rules,
//! and default to empty.
//!
//! ## File Location
//!
//! 1. `--config <FILE>` on the command line
//! 2. `protoroute.toml` in the working directory
//! 3. Built-in defaults
//!
//! ## Example
//!
//! ```toml
//! [routes]
//! base_path = "/api/v1/finance"
//! id_param = "universal"
//!
//! [routes.aliases]
//! JournalEntry = "journal-entries"
//!
//! [tags]
//! uncategorized = "skip"
//!
//! [[tags.categories]]
//! name = "Journal Entry Core"
//! methods = ["CreateJournalEntry", "GetJournalEntry"]
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "protoroute.toml";

/// Root configuration object
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Route inference tables
    pub routes: RouteConfig,
    /// Tag categorization tables
    pub tags: TagConfig,
    /// Gateway projection tables
    pub gateway: GatewayConfig,
    /// API description partitioning tables
    pub partition: PartitionConfig,
    /// API description enrichment tables
    pub enrich: EnrichConfig,
}

/// Identifier path-parameter naming policy
///
/// Only one policy is active per run; the two are never mixed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum IdParamPolicy {
    /// Every identifier parameter is the literal `{id}`
    #[default]
    Universal,
    /// `{<singular_resource>_id}`, e.g. `{journal_entry_id}`
    ResourceScoped,
}

/// Tables driving [`crate::route`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Fixed base path; when absent it is derived from the proto package
    pub base_path: Option<String>,
    /// Identifier parameter policy
    pub id_param: IdParamPolicy,
    /// Segment used for `List`/`Search`/`Stream` without a resource
    pub list_placeholder: String,
    /// Action verbs, in priority order (first prefix match wins)
    pub action_verbs: Vec<String>,
    /// Action verbs that address a single resource and therefore carry `{id}`
    pub id_verbs: Vec<String>,
    /// Tokens that turn `Get<Resource>` into a collection lookup without `{id}`
    pub collection_markers: Vec<String>,
    /// PascalCase resource → path segment
    pub aliases: HashMap<String, String>,
}

impl Default for RouteConfig {
    fn default() -> Self {
        RouteConfig {
            base_path: None,
            id_param: IdParamPolicy::Universal,
            list_placeholder: "items".to_string(),
            action_verbs: strings(&[
                "Post",
                "Reverse",
                "Cancel",
                "Reset",
                "Clear",
                "Validate",
                "Simulate",
                "Approve",
                "Reject",
                "Submit",
                "Execute",
                "Process",
                "Upload",
                "Download",
                "Export",
                "Generate",
                "Park",
                "Reconcile",
                "Revaluate",
                "Reclassify",
                "CarryForward",
                "Configure",
                "Adjust",
                "Recalculate",
                "Save",
                "Enable",
                "Disable",
                "Verify",
                "Import",
                "Start",
                "Stop",
                "Confirm",
                "Assign",
                "Revoke",
                "Calculate",
                "Register",
                "Release",
            ]),
            id_verbs: strings(&["Post", "Reverse", "Cancel", "Reset", "Approve", "Reject"]),
            collection_markers: strings(&["ById", "ByAccount", "History"]),
            aliases: [
                ("JournalEntry", "journal-entries"),
                ("JournalEntries", "journal-entries"),
                ("OpenItem", "open-items"),
                ("OpenItems", "open-items"),
                ("Attachment", "attachments"),
                ("Attachments", "attachments"),
                ("Approval", "approvals"),
                ("Template", "templates"),
                ("Templates", "templates"),
                ("RecurringEntry", "recurring-entries"),
                ("RecurringEntries", "recurring-entries"),
                ("ParkedJournalEntry", "parked-journal-entries"),
                ("ParkedJournalEntries", "parked-journal-entries"),
                ("BatchInputSession", "batch-sessions"),
                ("DocumentChain", "document-chains"),
                ("AccountBalance", "account-balances"),
                ("AccountLineItem", "account-line-items"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        }
    }
}

/// What happens to methods that belong to no category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum UncategorizedPolicy {
    /// The method keeps no tag
    #[default]
    Skip,
    /// The enclosing service name becomes a catch-all tag
    ServiceName,
}

/// One business category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryDef {
    /// Tag name written into the operation options
    pub name: String,
    /// Tag description (used by enrichment and partitioning)
    #[serde(default)]
    pub description: String,
    /// Exact method names belonging to the category
    #[serde(default)]
    pub methods: Vec<String>,
}

/// Tables driving [`crate::tags`]
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TagConfig {
    /// Policy for methods absent from every category
    pub uncategorized: UncategorizedPolicy,
    /// Categories in lookup order
    pub categories: Vec<CategoryDef>,
    /// Per-method summary overrides
    pub summaries: HashMap<String, String>,
}

/// Tables driving [`crate::gateway`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Prefix stripped from the destination namespace (`cuba-fi` → `fi`)
    pub namespace_prefix: String,
    /// Root package used when the namespace suffix has no domain entry
    pub fallback_root: String,
    /// Namespace suffix of the identity/access domain
    pub identity_namespace: String,
    /// Service code of the identity/access service
    pub identity_code: String,
    /// Namespace suffix → domain package name
    pub domains: BTreeMap<String, String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            namespace_prefix: "cuba-".to_string(),
            fallback_root: "cuba".to_string(),
            identity_namespace: "system".to_string(),
            identity_code: "iam".to_string(),
            domains: [
                ("system", "iam"),
                ("fi", "finance"),
                ("sd", "sales"),
                ("pm", "procurement"),
                ("mf", "manufacturing"),
                ("sc", "supplychain"),
                ("hr", "hr"),
                ("am", "asset"),
                ("cs", "customer"),
                ("rd", "rd"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        }
    }
}

/// Display metadata for one partition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainDef {
    /// Human-readable domain name, e.g. `Finance (FI)`
    pub name: String,
    /// Sub-document description
    #[serde(default)]
    pub description: String,
}

/// A tag name with its description
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagDef {
    /// Tag name
    pub name: String,
    /// Tag description
    #[serde(default)]
    pub description: String,
}

/// Tables driving [`crate::openapi::partition`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    /// Index into `path.split('/')` holding the domain segment
    pub segment_index: usize,
    /// Prefix of every sub-document title
    pub title_prefix: String,
    /// Version written into every sub-document `info`
    pub version: String,
    /// Domain key → display metadata
    pub domains: BTreeMap<String, DomainDef>,
    /// Path segment → domain key, consulted before `domains`
    pub overrides: HashMap<String, String>,
    /// Domain key → tag descriptions merged when the tag is used
    pub extra_tags: BTreeMap<String, Vec<TagDef>>,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        let domains = [
            ("finance", "Finance (FI)", "Financial Management - General Ledger, Accounts Receivable/Payable, Cost Control, Treasury"),
            ("procurement", "Procurement (PM)", "Procurement Management - Purchase Orders, Contracts, Invoices, Supplier Portal"),
            ("sales", "Sales (SD)", "Sales Management - Sales Orders, Pricing, Revenue Recognition, Sales Analytics"),
            ("supplychain", "Supply Chain (SC)", "Supply Chain Management - Inventory, Warehouse, Transportation, Demand Forecasting, Batch Traceability"),
            ("asset", "Asset Management (AM)", "Asset Management - Equipment Maintenance, Health Monitoring, EHS Incidents, Geolocation"),
            ("manufacturing", "Manufacturing (MF)", "Manufacturing Management - Production Planning, Shop Floor Execution, Quality Inspection, Kanban, Outsourcing"),
            ("service", "Customer Service (CS)", "Customer Service Management - Field Dispatch, Warranty Claims, Contract Billing"),
            ("rd", "R&D (RD)", "R&D Management - PLM Integration, Project Cost Control"),
            ("hr", "Human Resources (HR)", "Human Resources Management - Talent Acquisition, Employee Experience"),
            ("auth", "Identity & Access (IAM)", "Identity & Access Management - User Authentication, Role Permissions, Two-Factor Authentication"),
        ]
        .into_iter()
        .map(|(key, name, description)| {
            (
                key.to_string(),
                DomainDef {
                    name: name.to_string(),
                    description: description.to_string(),
                },
            )
        })
        .collect();

        let overrides = [
            "users",
            "roles",
            "permissions",
            "policies",
            "admin",
            "oauth2",
            "api-keys",
        ]
        .into_iter()
        .map(|segment| (segment.to_string(), "auth".to_string()))
        .collect();

        PartitionConfig {
            segment_index: 3,
            title_prefix: "CUBA ERP".to_string(),
            version: "1.0.0".to_string(),
            domains,
            overrides,
            extra_tags: BTreeMap::new(),
        }
    }
}

/// Contact block copied into `info.contact`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactInfo {
    /// Team name
    pub name: String,
    /// Team e-mail
    pub email: String,
}

/// Static per-artifact metadata, keyed by artifact stem
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceMetadata {
    /// `info.title`
    pub title: String,
    /// `info.description`
    #[serde(default)]
    pub description: String,
    /// `info.contact`
    #[serde(default)]
    pub contact: Option<ContactInfo>,
}

/// Tables driving [`crate::openapi::enrich`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    /// Description of the injected bearer scheme
    pub bearer_description: String,
    /// Tag name → description, wins over descriptions already in the document
    pub tag_descriptions: HashMap<String, String>,
    /// Artifact stem (`order_service`) → metadata
    pub services: HashMap<String, ServiceMetadata>,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        EnrichConfig {
            bearer_description: "Enter your JWT token (e.g. from Login API)".to_string(),
            tag_descriptions: HashMap::new(),
            services: HashMap::new(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Load configuration from a TOML file
///
/// # Returns
///
/// `Ok(Some(config))` if the file exists and parses, `Ok(None)` if it does not
/// exist (not an error), `Err` if it exists but fails to parse.
pub fn load_config(config_path: &Path) -> anyhow::Result<Option<EngineConfig>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

    let config: EngineConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;

    Ok(Some(config))
}

/// Look for `protoroute.toml` in `dir`
pub fn auto_detect_config_path(dir: &Path) -> Option<PathBuf> {
    let config_path = dir.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Resolve the configuration path
///
/// Priority:
/// 1. Explicitly provided path (via CLI)
/// 2. Auto-detected in `dir`
/// 3. None (built-in defaults)
pub fn resolve_config_path(explicit_path: Option<&Path>, dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }
    auto_detect_config_path(dir)
}

/// Resolve and load, falling back to [`EngineConfig::default`]
///
/// An explicit path that does not exist is an error; a missing auto-detected
/// file is not.
pub fn load_or_default(explicit_path: Option<&Path>, dir: &Path) -> anyhow::Result<EngineConfig> {
    match resolve_config_path(explicit_path, dir) {
        Some(path) => match load_config(&path)? {
            Some(config) => {
                tracing::debug!(config = %path.display(), "loaded configuration");
                Ok(config)
            }
            None => anyhow::bail!("Config file not found: {}", path.display()),
        },
        None => Ok(EngineConfig::default()),
    }
}
