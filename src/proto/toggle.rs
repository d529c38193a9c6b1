use super::lexer::{tokenize, TokenKind};
use super::passes::{OPENAPI_IMPORT, OPENAPI_OPTION_PREFIX};
use super::recognizer::parse;
use super::{apply_edits, Edit, SpliceOutcome, DOCS_OFF_PREFIX};
use crate::error::ArtifactError;
use std::ops::Range;

/// Direction of the documentation toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DocsMode {
    /// Restore statements previously commented out
    Enable,
    /// Comment out openapiv2 imports and options
    Disable,
}

/// Comment out or restore the openapiv2 documentation annotations
///
/// `Disable` prefixes every line of each live openapiv2 import and option
/// statement with `// docs-off: `; `Enable` strips that prefix. The count in
/// the outcome is the number of statements (for `Disable`) or lines (for
/// `Enable`) touched. A statement that shares a line with other code is left
/// alone with a warning, since commenting out its lines would take the other
/// code with it.
pub fn toggle_docs(text: &str, mode: DocsMode) -> Result<SpliceOutcome, ArtifactError> {
    match mode {
        DocsMode::Disable => disable(text),
        DocsMode::Enable => enable(text),
    }
}

fn disable(text: &str) -> Result<SpliceOutcome, ArtifactError> {
    let file = parse(text)?;

    let mut targets: Vec<(String, Range<usize>)> = file
        .imports
        .iter()
        .filter(|i| i.path == OPENAPI_IMPORT)
        .map(|i| (format!("import \"{}\"", i.path), i.span.clone()))
        .collect();
    targets.extend(
        file.options
            .iter()
            .filter(|o| o.name.starts_with(OPENAPI_OPTION_PREFIX))
            .map(|o| (format!("option ({})", o.name), o.span.clone())),
    );
    targets.sort_by_key(|(_, span)| span.start);

    let mut edits = Vec::new();
    let mut count = 0;
    for (label, span) in targets {
        let Some(lines) = whole_lines(text, &span) else {
            tracing::warn!(
                statement = %label,
                offset = span.start,
                "statement shares a line with other code, left enabled"
            );
            continue;
        };
        for line_start in line_starts(text, lines) {
            let indent = text[line_start..]
                .find(|c: char| c != ' ' && c != '\t')
                .unwrap_or(0);
            edits.push(Edit::insert(line_start + indent, DOCS_OFF_PREFIX));
        }
        count += 1;
    }

    Ok(apply_edits(text, edits, count))
}

fn enable(text: &str) -> Result<SpliceOutcome, ArtifactError> {
    let tokens = tokenize(text)?;
    let edits: Vec<Edit> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::LineComment)
        .filter(|t| t.text(text).starts_with(DOCS_OFF_PREFIX))
        .map(|t| Edit::replace(t.span.start..t.span.start + DOCS_OFF_PREFIX.len(), ""))
        .collect();
    let count = edits.len();
    Ok(apply_edits(text, edits, count))
}

/// Line range covered by `span` when nothing but whitespace shares those lines
fn whole_lines(text: &str, span: &Range<usize>) -> Option<Range<usize>> {
    let line_start = text[..span.start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[span.end..]
        .find('\n')
        .map_or(text.len(), |i| span.end + i);
    let before = &text[line_start..span.start];
    let after = &text[span.end..line_end];
    if before.trim().is_empty() && after.trim().is_empty() {
        Some(line_start..line_end)
    } else {
        None
    }
}

fn line_starts(text: &str, lines: Range<usize>) -> Vec<usize> {
    let mut starts = vec![lines.start];
    starts.extend(
        text[lines.clone()]
            .match_indices('\n')
            .map(|(i, _)| lines.start + i + 1),
    );
    starts
}
