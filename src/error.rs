use std::fmt;
use std::path::{Path, PathBuf};

/// Failure while processing a single artifact
///
/// Every variant is local to one artifact: batch runs report it and carry on
/// with the next file. "Nothing to change" is not an error and is reported
/// through [`crate::proto::SpliceOutcome::modified`] instead.
#[derive(Debug)]
pub enum ArtifactError {
    /// The input file does not exist
    MissingArtifact {
        /// Path that was requested
        path: PathBuf,
    },
    /// The document could not be recognized well enough to splice safely
    ///
    /// Nothing is written when this is returned.
    UnparsableStructure {
        /// Path of the offending artifact (empty for in-memory documents)
        path: PathBuf,
        /// What the recognizer tripped over
        reason: String,
    },
    /// Reading or writing the artifact failed
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl ArtifactError {
    /// Build an [`ArtifactError::UnparsableStructure`] not yet tied to a file
    pub fn unparsable(reason: impl Into<String>) -> Self {
        ArtifactError::UnparsableStructure {
            path: PathBuf::new(),
            reason: reason.into(),
        }
    }

    /// Attach a path to errors produced by in-memory transforms
    pub fn at(self, at: &Path) -> Self {
        match self {
            ArtifactError::UnparsableStructure { path, reason } if path.as_os_str().is_empty() => {
                ArtifactError::UnparsableStructure {
                    path: at.to_path_buf(),
                    reason,
                }
            }
            other => other,
        }
    }

    /// Short machine-friendly kind, used in batch summaries
    pub fn kind(&self) -> &'static str {
        match self {
            ArtifactError::MissingArtifact { .. } => "missing_artifact",
            ArtifactError::UnparsableStructure { .. } => "unparsable_structure",
            ArtifactError::Io { .. } => "io",
        }
    }
}

impl fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactError::MissingArtifact { path } => {
                write!(f, "artifact not found: {}", path.display())
            }
            ArtifactError::UnparsableStructure { path, reason } => {
                if path.as_os_str().is_empty() {
                    write!(f, "unrecognized document structure: {}", reason)
                } else {
                    write!(
                        f,
                        "unrecognized document structure in {}: {}",
                        path.display(),
                        reason
                    )
                }
            }
            ArtifactError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ArtifactError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArtifactError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
