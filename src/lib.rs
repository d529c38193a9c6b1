//! # protoroute
//!
//! **protoroute** infers REST routes from gRPC method names and keeps every
//! artifact that depends on those routes in step: interface-definition files,
//! gateway routing rules and generated API descriptions.
//!
//! ## Overview
//!
//! Services are written as `rpc CreateJournalEntry(...)`, `rpc
//! ApproveJournalEntry(...)` and so on. The naming convention already says which
//! HTTP verb and path each method should have; protoroute turns that convention
//! into annotations so nobody has to write (or keep fixing) them by hand.
//!
//! Every transformation is idempotent and edits only the bytes it has to. A
//! second run over the same artifact finds nothing to do and writes nothing.
//!
//! ## Architecture
//!
//! - **[`route`]** - method name → category → verb, path and body policy
//! - **[`tags`]** - method name → business category tag
//! - **[`proto`]** - lexer, recognizer and splicing passes over `.proto` files
//! - **[`gateway`]** - gRPC prefix matchers for gateway routing rules
//! - **[`openapi`]** - partitioning and enrichment of API descriptions
//! - **[`linter`]** - drift detection across all artifact kinds
//! - **[`artifact`]** - read-modify-write runner, parallel batches
//! - **[`config`]** - lookup tables, loaded from `protoroute.toml`
//! - **[`cli`]** - the `protoroute` binary
//!
//! ### Annotation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as protoroute
//!     participant Runner as artifact::run_batch
//!     participant Recognizer as proto::parse
//!     participant Inferrer as RouteInferrer
//!     participant FS as File System
//!
//!     User->>CLI: protoroute annotate-http proto/
//!     CLI->>Runner: collect *.proto, run in parallel
//!     Runner->>FS: read artifact
//!     Runner->>Recognizer: parse(text)
//!     Recognizer-->>Runner: services, rpcs, imports, options (byte spans)
//!     loop every rpc without (google.api.http)
//!         Runner->>Inferrer: infer(method, base_path)
//!         Inferrer-->>Runner: POST /api/v1/finance/journal-entries (body: *)
//!     end
//!     Runner->>Runner: apply edits back to front
//!     alt modified > 0
//!         Runner->>FS: write artifact
//!     else nothing to do
//!         Runner-->>CLI: Unchanged
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use protoroute::config::RouteConfig;
//! use protoroute::route::RouteInferrer;
//!
//! let inferrer = RouteInferrer::new(&RouteConfig::default());
//! let route = inferrer.infer("ApproveJournalEntry", "/api/v1/finance");
//! assert_eq!(route.to_string(), "POST /api/v1/finance/journal-entries/{id}/approve (body: *)");
//! ```
//!
//! ## Configuration
//!
//! All tables (aliases, verb lists, categories, domain maps, service metadata)
//! come from [`config::EngineConfig`]; see `config/protoroute.toml` for a
//! complete sample.

pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod linter;
pub mod logging;
pub mod naming;
pub mod openapi;
pub mod proto;
pub mod route;
pub mod tags;

pub use error::ArtifactError;
pub use proto::SpliceOutcome;
pub use route::{RouteCategory, RouteInferrer, RouteMapping};
