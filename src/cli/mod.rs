//! # CLI Module
//!
//! Command-line interface for the `protoroute` binary.
//!
//! ## Overview
//!
//! The CLI supports:
//! - **Annotation** - add HTTP rules and operation tags to interface files
//! - **Projection** - add gRPC prefix matchers to gateway routing rules
//! - **Documents** - partition and enrich API descriptions
//! - **Inspection** - print inferred routes, lint artifacts for drift
//!
//! Every rewriting command is idempotent: running it twice leaves the second
//! run with nothing to write.
//!
//! ## Commands
//!
//! ### `annotate-http`
//!
//! ```bash
//! protoroute annotate-http proto/finance --base-path /api/v1/finance
//! ```
//!
//! Options:
//! - `--base-path <PATH>` - base path for every route (default: from the package)
//! - `--dry-run` - report what would change without writing
//!
//! ### `annotate-tags`
//!
//! ```bash
//! protoroute annotate-tags proto/finance/gl.proto --service-tags
//! ```
//!
//! ### `toggle-docs`
//!
//! ```bash
//! protoroute toggle-docs disable proto/
//! protoroute toggle-docs enable proto/
//! ```
//!
//! ### `project-gateway`
//!
//! ```bash
//! protoroute project-gateway deploy/gateway/routes.yaml
//! ```
//!
//! ### `partition` / `enrich`
//!
//! ```bash
//! protoroute partition docs/openapi.json --out docs/domains
//! protoroute enrich docs/domains
//! ```
//!
//! ### `classify`
//!
//! ```bash
//! protoroute classify CreateJournalEntry ApproveJournalEntry --base-path /api/v1/finance
//! ```
//!
//! ### `lint`
//!
//! ```bash
//! protoroute lint proto/ deploy/gateway/routes.yaml --fail-on-error
//! ```
//!
//! ## Global Options
//!
//! - `--config <FILE>` - configuration file (`PROTOROUTE_CONFIG`)
//! - `--verbose` - debug logging
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use protoroute::cli::{Cli, run_cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! run_cli(cli)?;
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, Commands};
