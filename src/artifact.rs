//! # Artifact Runner
//!
//! Read-modify-write discipline shared by every rewriting command:
//!
//! - the whole file is read, the whole output computed in memory;
//! - the file is written only when the transform reports a change and the run
//!   is not a dry run;
//! - in a batch, each artifact is processed independently and a failure is
//!   reported for that artifact alone.
//!
//! ```rust,ignore
//! let paths = collect_artifacts(&inputs, &["proto"]);
//! let results = run_batch(&paths, |text| annotate_http(text, &inferrer, None), false);
//! ```

use crate::error::ArtifactError;
use crate::proto::SpliceOutcome;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What happened to one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStatus {
    /// Changed and written back (or would have been, on a dry run)
    Written {
        /// Declarations, rules or documents changed
        count: usize,
    },
    /// Nothing to do; the file was not touched
    Unchanged,
}

/// Outcome of processing one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReport {
    pub path: PathBuf,
    pub status: ArtifactStatus,
    pub dry_run: bool,
}

impl ArtifactReport {
    pub fn is_written(&self) -> bool {
        matches!(self.status, ArtifactStatus::Written { .. })
    }
}

/// Result of every artifact in a batch, in input order
pub type BatchResults = Vec<(PathBuf, Result<ArtifactReport, ArtifactError>)>;

/// Read `path` in full, failing with [`ArtifactError::MissingArtifact`] when absent
pub fn read_artifact(path: &Path) -> Result<String, ArtifactError> {
    if !path.is_file() {
        return Err(ArtifactError::MissingArtifact {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace the content of `path`
pub fn write_artifact(path: &Path, text: &str) -> Result<(), ArtifactError> {
    std::fs::write(path, text).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply `transform` to one artifact
pub fn run_artifact<F>(path: &Path, transform: F, dry_run: bool) -> Result<ArtifactReport, ArtifactError>
where
    F: Fn(&str) -> Result<SpliceOutcome, ArtifactError>,
{
    let text = read_artifact(path)?;
    let outcome = transform(&text).map_err(|e| e.at(path))?;

    if !outcome.is_modified() {
        tracing::debug!(path = %path.display(), "no applicable change");
        return Ok(ArtifactReport {
            path: path.to_path_buf(),
            status: ArtifactStatus::Unchanged,
            dry_run,
        });
    }

    if dry_run {
        tracing::info!(path = %path.display(), count = outcome.modified, "would update (dry run)");
    } else {
        write_artifact(path, &outcome.text)?;
        tracing::info!(path = %path.display(), count = outcome.modified, "updated");
    }

    Ok(ArtifactReport {
        path: path.to_path_buf(),
        status: ArtifactStatus::Written {
            count: outcome.modified,
        },
        dry_run,
    })
}

/// Apply `transform` to every artifact in parallel
///
/// A failing artifact is logged and reported in its slot; the rest still run.
pub fn run_batch<F>(paths: &[PathBuf], transform: F, dry_run: bool) -> BatchResults
where
    F: Fn(&str) -> Result<SpliceOutcome, ArtifactError> + Sync,
{
    paths
        .par_iter()
        .map(|path| {
            let result = run_artifact(path, &transform, dry_run);
            if let Err(e) = &result {
                tracing::warn!(path = %path.display(), kind = e.kind(), error = %e, "skipped");
            }
            (path.clone(), result)
        })
        .collect()
}

/// Counts over a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub written: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn of(results: &BatchResults) -> Self {
        let mut summary = BatchSummary::default();
        for (_, result) in results {
            match result {
                Ok(report) if report.is_written() => summary.written += 1,
                Ok(_) => summary.unchanged += 1,
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }
}

/// Expand `inputs` into artifact paths
///
/// Directories are walked recursively for files with one of `extensions`
/// (sorted, for stable batch order). Explicit files are kept as given,
/// whatever their extension. A missing input is kept too, so the run reports
/// it as `MissingArtifact` in its own slot.
pub fn collect_artifacts(inputs: &[PathBuf], extensions: &[&str]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            paths.push(input.clone());
            continue;
        }

        let mut found: Vec<PathBuf> = WalkDir::new(input)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| extensions.contains(&e))
            })
            .collect();
        found.sort();
        tracing::debug!(dir = %input.display(), count = found.len(), "collected artifacts");
        paths.extend(found);
    }
    paths
}
