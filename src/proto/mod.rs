//! # Interface File Splicing
//!
//! Idempotent, byte-range edits to interface-definition (`.proto`) files.
//!
//! ## Overview
//!
//! Documents are never rewritten by whole-document substitution. Instead:
//!
//! 1. [`lexer`] cuts the text into tokens (string literals and comments are
//!    atomic, so `"/journal-entries/{id}"` cannot unbalance a block);
//! 2. [`recognizer`] finds services, `rpc` declarations, imports, the package
//!    and option statements, recording byte spans for each;
//! 3. a [`SplicePass`] decides, per declaration, whether and where a fragment
//!    goes;
//! 4. the collected edits are applied back to front so earlier offsets stay
//!    valid.
//!
//! Everything outside the edited ranges is byte-identical to the input.
//!
//! ## Idempotence
//!
//! Each pass has two markers:
//!
//! - a document marker (an import path): if the document already imports it,
//!   the whole document is left alone;
//! - a declaration marker (an option name): a declaration that already carries
//!   the option is never touched, even when the import is missing.
//!
//! When no declaration changes, the original text comes back with a count of
//! zero and callers do not write the file.
//!
//! ## Passes
//!
//! | Pass | Import | Option |
//! |------|--------|--------|
//! | [`HttpPass`] | `google/api/annotations.proto` | `(google.api.http)` |
//! | [`TagPass`] | `protoc-gen-openapiv2/options/annotations.proto` | `(...openapiv2_operation)` |
//!
//! [`toggle_docs`] comments the openapiv2 annotations in and out on top of the
//! same recognizer.

pub mod lexer;
pub mod recognizer;

mod passes;
mod toggle;


pub use passes::{
    render_http_option, HttpPass, HttpRule, Placement, SplicePass, TagPass, HTTP_IMPORT,
    HTTP_OPTION, OPENAPI_IMPORT, OPENAPI_OPERATION_OPTION, OPENAPI_OPTION_PREFIX,
};
pub use recognizer::{parse, MethodDescriptor, OptionStatement, ProtoFile};
pub use toggle::{toggle_docs, DocsMode};

use crate::error::ArtifactError;
use crate::route::RouteInferrer;
use crate::tags::TagCategorizer;
use std::ops::Range;

/// Marker prefix for lines commented out by [`toggle_docs`]
pub const DOCS_OFF_PREFIX: &str = "// docs-off: ";

/// Result of running a pass over one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceOutcome {
    /// Full document text after the pass
    pub text: String,
    /// Number of declarations (or statements) changed
    pub modified: usize,
}

impl SpliceOutcome {
    /// The input, untouched
    pub fn unchanged(text: &str) -> Self {
        SpliceOutcome {
            text: text.to_string(),
            modified: 0,
        }
    }

    /// True when at least one change was made
    pub fn is_modified(&self) -> bool {
        self.modified > 0
    }
}

/// Byte-range replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Edit {
    range: Range<usize>,
    text: String,
}

impl Edit {
    pub(crate) fn insert(at: usize, text: impl Into<String>) -> Self {
        Edit {
            range: at..at,
            text: text.into(),
        }
    }

    pub(crate) fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Edit {
            range,
            text: text.into(),
        }
    }
}

/// Apply non-overlapping edits back to front
pub(crate) fn apply_edits(text: &str, mut edits: Vec<Edit>, modified: usize) -> SpliceOutcome {
    if modified == 0 || edits.is_empty() {
        return SpliceOutcome::unchanged(text);
    }
    // Stable sort, then back to front: same-offset inserts keep generation order
    edits.sort_by_key(|e| e.range.start);
    let mut out = text.to_string();
    for edit in edits.iter().rev() {
        out.replace_range(edit.range.clone(), &edit.text);
    }
    SpliceOutcome { text: out, modified }
}

/// Run `pass` over `text`
pub fn annotate(text: &str, pass: &dyn SplicePass) -> Result<SpliceOutcome, ArtifactError> {
    let file = parse(text)?;

    if file.references_import(pass.document_marker()) {
        tracing::debug!(
            pass = pass.name(),
            marker = pass.document_marker(),
            "document already annotated"
        );
        return Ok(SpliceOutcome::unchanged(text));
    }

    let mut edits = Vec::new();
    let mut modified = 0;

    for method in file.methods() {
        if method.carries_option(pass.declaration_marker()) {
            tracing::debug!(pass = pass.name(), method = %method.name, "already annotated");
            continue;
        }

        let indent = format!("{}  ", method.indent);
        let edit = match pass.placement(method) {
            Placement::Skip => {
                tracing::debug!(pass = pass.name(), method = %method.name, "not applicable");
                continue;
            }
            Placement::FirstStatement => {
                let Some(fragment) = pass.render(&file, method, &indent) else {
                    continue;
                };
                match &method.body {
                    None => Edit::replace(
                        method.signature_end..method.span.end,
                        format!(" {{\n{fragment}\n{}}}", method.indent),
                    ),
                    Some(body) if text[body.clone()].trim().is_empty() => {
                        Edit::replace(body.clone(), format!("\n{fragment}\n{}", method.indent))
                    }
                    Some(body) => {
                        let rest = &text[body.clone()];
                        let starts_on_new_line = rest
                            .trim_start_matches([' ', '\t', '\r'])
                            .starts_with('\n');
                        if starts_on_new_line {
                            Edit::insert(body.start, format!("\n{fragment}"))
                        } else {
                            let padding = rest.len() - rest.trim_start_matches([' ', '\t']).len();
                            Edit::replace(
                                body.start..body.start + padding,
                                format!("\n{fragment}\n{indent}"),
                            )
                        }
                    }
                }
            }
            Placement::After(offset) => {
                let Some(fragment) = pass.render(&file, method, &indent) else {
                    tracing::debug!(pass = pass.name(), method = %method.name, "no fragment");
                    continue;
                };
                Edit::insert(offset, format!("\n{fragment}"))
            }
        };

        tracing::debug!(pass = pass.name(), method = %method.name, "annotating");
        edits.push(edit);
        modified += 1;
    }

    if modified == 0 {
        return Ok(SpliceOutcome::unchanged(text));
    }

    edits.push(import_edit(text, &file, pass.document_marker()));
    Ok(apply_edits(text, edits, modified))
}

/// Insert `import "<path>";` after the last import, else the package, else `syntax`
fn import_edit(text: &str, file: &ProtoFile, path: &str) -> Edit {
    let line = format!("import \"{path}\";");
    if let Some(last) = file.imports.iter().map(|i| i.span.end).max() {
        Edit::insert(statement_line_end(text, last), format!("\n{line}"))
    } else if let Some(package) = &file.package {
        Edit::insert(statement_line_end(text, package.span.end), format!("\n\n{line}"))
    } else if let Some(syntax) = &file.syntax {
        Edit::insert(statement_line_end(text, syntax.end), format!("\n\n{line}"))
    } else {
        Edit::insert(0, format!("{line}\n\n"))
    }
}

/// End of the line holding a statement ending at `end`, when only a line
/// comment follows it; otherwise `end` itself
fn statement_line_end(text: &str, end: usize) -> usize {
    let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i);
    let rest = text[end..line_end].trim();
    if rest.is_empty() || rest.starts_with("//") {
        line_end
    } else {
        end
    }
}

/// HTTP pass over `text`
///
/// `base_path` overrides the base derived from the package declaration.
pub fn annotate_http(
    text: &str,
    inferrer: &RouteInferrer,
    base_path: Option<&str>,
) -> Result<SpliceOutcome, ArtifactError> {
    let pass = HttpPass::new(inferrer, base_path.map(str::to_string));
    annotate(text, &pass)
}

/// Tag pass over `text`
pub fn annotate_tags(text: &str, tags: &TagCategorizer) -> Result<SpliceOutcome, ArtifactError> {
    annotate(text, &TagPass::new(tags))
}
