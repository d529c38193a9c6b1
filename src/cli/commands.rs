use crate::artifact::{collect_artifacts, run_artifact, run_batch, BatchResults, BatchSummary};
use crate::config::{load_or_default, EngineConfig, UncategorizedPolicy};
use crate::gateway::GatewayProjector;
use crate::linter::{has_errors, print_lint_issues, LintIssue, LintSeverity, Linter};
use crate::openapi::{
    parse_document, render_document, service_key_for, DocumentEnricher, DocumentPartitioner,
};
use crate::proto::{annotate_http, annotate_tags, toggle_docs, DocsMode};
use crate::route::{is_method_name, RouteInferrer};
use crate::tags::TagCategorizer;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Command-line interface for protoroute
///
/// Infers HTTP routes from RPC method names and keeps interface files,
/// gateway routing rules and API descriptions consistent with them.
#[derive(Parser)]
#[command(name = "protoroute", version)]
#[command(about = "Route inference and artifact annotation for gRPC services", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./protoroute.toml when present)
    #[arg(long, global = true, env = "PROTOROUTE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available protoroute commands
#[derive(Subcommand)]
pub enum Commands {
    /// Add `(google.api.http)` rules to every RPC declaration
    AnnotateHttp {
        /// Interface files or directories (searched for *.proto)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Base path for every route (default: derived from the package)
        #[arg(long)]
        base_path: Option<String>,

        /// Show what would change without writing files
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Add openapiv2 operation tags to categorized RPC declarations
    AnnotateTags {
        /// Interface files or directories (searched for *.proto)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Tag uncategorized methods with their service name
        #[arg(long, default_value_t = false)]
        service_tags: bool,

        /// Show what would change without writing files
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Comment openapiv2 annotations out (disable) or back in (enable)
    ToggleDocs {
        /// Direction of the toggle
        #[arg(value_enum)]
        mode: DocsMode,

        /// Interface files or directories (searched for *.proto)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Show what would change without writing files
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Add gRPC prefix matchers to gateway routing rules
    ProjectGateway {
        /// Routing-rules YAML file
        file: PathBuf,

        /// Show what would change without writing files
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Split a unified API description into per-domain documents
    Partition {
        /// Unified API description (JSON)
        file: PathBuf,

        /// Output directory for `<domain>.json` files
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Add security, service metadata and tag definitions to API descriptions
    Enrich {
        /// API description files or directories (searched for *.json)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Show what would change without writing files
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Print the inferred route for RPC method names
    Classify {
        /// Method names, e.g. CreateJournalEntry
        #[arg(required = true)]
        names: Vec<String>,

        /// Base path for the printed routes
        #[arg(long)]
        base_path: Option<String>,
    },
    /// Check artifacts for drift from the inferred routes and tags
    Lint {
        /// Artifacts or directories (*.proto, *.yaml, *.yml, *.json)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Exit with a failure status if any errors are found
        #[arg(long, default_value_t = false)]
        fail_on_error: bool,

        /// Only show errors (hide warnings and info)
        #[arg(long, default_value_t = false)]
        errors_only: bool,
    },
}

const PROTO: &[&str] = &["proto"];
const JSON: &[&str] = &["json"];
const LINTABLE: &[&str] = &["proto", "yaml", "yml", "json"];

/// Execute a parsed command line
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let config = load_or_default(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Commands::AnnotateHttp {
            paths,
            base_path,
            dry_run,
        } => {
            let inferrer = RouteInferrer::new(&config.routes);
            let base = base_path.or_else(|| config.routes.base_path.clone());
            let paths = collect_artifacts(&paths, PROTO);
            let results = run_batch(
                &paths,
                |text| annotate_http(text, &inferrer, base.as_deref()),
                dry_run,
            );
            finish_batch("annotate-http", &results)
        }
        Commands::AnnotateTags {
            paths,
            service_tags,
            dry_run,
        } => {
            let mut tags = TagCategorizer::new(&config.tags);
            if service_tags {
                tags = tags.with_uncategorized(UncategorizedPolicy::ServiceName);
            }
            let paths = collect_artifacts(&paths, PROTO);
            let results = run_batch(&paths, |text| annotate_tags(text, &tags), dry_run);
            finish_batch("annotate-tags", &results)
        }
        Commands::ToggleDocs {
            mode,
            paths,
            dry_run,
        } => {
            let paths = collect_artifacts(&paths, PROTO);
            let results = run_batch(&paths, |text| toggle_docs(text, mode), dry_run);
            finish_batch("toggle-docs", &results)
        }
        Commands::ProjectGateway { file, dry_run } => {
            let projector = GatewayProjector::new(&config.gateway);
            let report = run_artifact(&file, |text| projector.project(text), dry_run)?;
            if !report.is_written() {
                println!("No projectable rules in {}", file.display());
            }
            Ok(())
        }
        Commands::Partition { file, out } => partition(&config, &file, &out),
        Commands::Enrich { paths, dry_run } => {
            let enricher = DocumentEnricher::new(&config.enrich, &config.tags);
            let paths = collect_artifacts(&paths, JSON);
            let results: BatchResults = paths
                .iter()
                .map(|path| {
                    let key = service_key_for(path);
                    let result =
                        run_artifact(path, |text| enricher.enrich_text(text, &key), dry_run);
                    if let Err(e) = &result {
                        tracing::warn!(path = %path.display(), kind = e.kind(), error = %e, "skipped");
                    }
                    (path.clone(), result)
                })
                .collect();
            finish_batch("enrich", &results)
        }
        Commands::Classify { names, base_path } => {
            let inferrer = RouteInferrer::new(&config.routes);
            let base = base_path
                .or_else(|| config.routes.base_path.clone())
                .unwrap_or_default();
            for name in &names {
                if !is_method_name(name) {
                    tracing::warn!(name = %name, "not a method name, skipped");
                    continue;
                }
                let category = inferrer.classify(name);
                let route = inferrer.synthesize(&category, &base);
                println!("{name}\t{}\t{route}", category.label());
            }
            Ok(())
        }
        Commands::Lint {
            paths,
            fail_on_error,
            errors_only,
        } => {
            let linter = Linter::new(&config, None);
            let paths = collect_artifacts(&paths, LINTABLE);

            let mut issues: Vec<LintIssue> = Vec::new();
            let mut failed = 0;
            for path in &paths {
                match linter.lint_artifact(path) {
                    Ok(found) => issues.extend(found),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipped");
                        failed += 1;
                    }
                }
            }
            if errors_only {
                issues.retain(|i| i.severity == LintSeverity::Error);
            }

            print_lint_issues(&issues);
            if failed > 0 {
                anyhow::bail!("lint: {} artifact(s) failed", failed);
            }
            if fail_on_error && has_errors(&issues) {
                anyhow::bail!("Lint found errors");
            }
            Ok(())
        }
    }
}

fn partition(config: &EngineConfig, file: &Path, out: &Path) -> anyhow::Result<()> {
    let text = crate::artifact::read_artifact(file)?;
    let doc = parse_document(&text).map_err(|e| e.at(file))?;
    let parts = DocumentPartitioner::new(&config.partition)
        .partition(&doc)
        .map_err(|e| e.at(file))?;

    std::fs::create_dir_all(out)
        .with_context(|| format!("Failed to create output directory {}", out.display()))?;

    for (key, sub) in &parts {
        let target = out.join(format!("{key}.json"));
        crate::artifact::write_artifact(&target, &render_document(sub)?)?;
        tracing::info!(
            path = %target.display(),
            paths = sub["paths"].as_object().map_or(0, |p| p.len()),
            tags = sub["tags"].as_array().map_or(0, |t| t.len()),
            "generated"
        );
    }
    println!("Generated {} domain document(s) in {}", parts.len(), out.display());
    Ok(())
}

/// Log the batch summary; failing artifacts make the command fail after all ran
fn finish_batch(command: &str, results: &BatchResults) -> anyhow::Result<()> {
    let summary = BatchSummary::of(results);
    tracing::info!(
        command,
        written = summary.written,
        unchanged = summary.unchanged,
        failed = summary.failed,
        "done"
    );
    if summary.failed > 0 {
        anyhow::bail!("{}: {} artifact(s) failed", command, summary.failed);
    }
    Ok(())
}
