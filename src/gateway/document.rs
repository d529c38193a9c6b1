//! Line-level view of a `VirtualService` document.
//!
//! `serde_yaml` gives the authoritative rule list; the line scan only finds
//! where each rule's matcher entries sit in the text so they can be copied
//! without re-serializing (and reformatting) the whole file.

use super::RoutingRule;
use crate::error::ArtifactError;
use serde_yaml::Value;
use std::ops::Range;

#[derive(Debug, Clone, Copy)]
struct Line {
    start: usize,
    // Excludes the newline
    end: usize,
    indent: usize,
}

impl Line {
    fn content<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start + self.indent..self.end]
    }

    fn is_blank(&self, text: &str) -> bool {
        let content = self.content(text).trim();
        content.is_empty() || content.starts_with('#')
    }
}

fn split_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0;
    for segment in text.split('\n') {
        let end = start + segment.len();
        let indent = segment.len() - segment.trim_start_matches(' ').len();
        lines.push(Line { start, end, indent });
        start = end + 1;
    }
    lines
}

/// Matcher entries of one `http` rule, as byte ranges
#[derive(Debug, Clone, Default)]
pub(super) struct RuleBlock {
    entries: Vec<Range<usize>>,
}

impl RuleBlock {
    /// Copy of the single matcher entry with its prefix replaced
    ///
    /// Returns the insertion offset and the text to insert there.
    pub(super) fn matcher_copy(&self, text: &str, prefix: &str) -> Option<(usize, String)> {
        let [entry] = self.entries.as_slice() else {
            return None;
        };
        let original = &text[entry.clone()];

        let mut replaced = false;
        let mut copy = Vec::new();
        for line in original.split('\n') {
            match line.find("prefix:") {
                Some(at) if !replaced && !line.contains('{') => {
                    let value = line[at + "prefix:".len()..].trim();
                    let quoted = match value.chars().next() {
                        Some(q @ ('"' | '\'')) => format!("{q}{prefix}{q}"),
                        _ => prefix.to_string(),
                    };
                    let carriage = if line.ends_with('\r') { "\r" } else { "" };
                    copy.push(format!("{}prefix: {quoted}{carriage}", &line[..at]));
                    replaced = true;
                }
                _ => copy.push(line.to_string()),
            }
        }

        if !replaced {
            return None;
        }
        Some((entry.end, format!("\n{}", copy.join("\n"))))
    }
}

/// The routing part of the first `VirtualService` document in a file
#[derive(Debug)]
pub(super) struct VirtualServiceText {
    pub(super) rules: Vec<RoutingRule>,
    pub(super) blocks: Vec<RuleBlock>,
}

impl VirtualServiceText {
    pub(super) fn locate(text: &str) -> Result<Self, ArtifactError> {
        let lines = split_lines(text);

        let document = documents(text, &lines)
            .into_iter()
            .find(|doc| {
                lines[doc.clone()].iter().any(|l| {
                    l.indent == 0 && l.content(text).trim_end() == "kind: VirtualService"
                })
            })
            .ok_or_else(|| ArtifactError::unparsable("no VirtualService document"))?;
        let doc_lines = &lines[document];

        let doc_text = match (doc_lines.first(), doc_lines.last()) {
            (Some(first), Some(last)) => &text[first.start..last.end],
            _ => "",
        };
        let value: Value = serde_yaml::from_str(doc_text)
            .map_err(|e| ArtifactError::unparsable(format!("invalid YAML: {e}")))?;
        let http = value
            .get("spec")
            .and_then(|spec| spec.get("http"))
            .and_then(Value::as_sequence)
            .ok_or_else(|| ArtifactError::unparsable("VirtualService has no spec.http list"))?;
        let rules: Vec<RoutingRule> = http.iter().map(routing_rule).collect();

        let blocks = rule_blocks(text, doc_lines);
        if blocks.len() != rules.len() {
            return Err(ArtifactError::unparsable(format!(
                "found {} rule blocks but spec.http has {} entries",
                blocks.len(),
                rules.len()
            )));
        }

        Ok(VirtualServiceText { rules, blocks })
    }
}

/// Line index ranges of the `---`-separated documents
fn documents(text: &str, lines: &[Line]) -> Vec<Range<usize>> {
    let mut docs = Vec::new();
    let mut start = 0;
    for (i, line) in lines.iter().enumerate() {
        if line.indent == 0 && line.content(text).trim_end() == "---" {
            if i > start {
                docs.push(start..i);
            }
            start = i + 1;
        }
    }
    if start < lines.len() {
        docs.push(start..lines.len());
    }
    docs
}

fn routing_rule(entry: &Value) -> RoutingRule {
    let matchers = entry
        .get("match")
        .and_then(Value::as_sequence)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let prefixes: Vec<String> = matchers
        .iter()
        .filter_map(|m| m.get("uri")?.get("prefix")?.as_str().map(str::to_string))
        .collect();
    let other_matchers = matchers.len() - prefixes.len();

    let destinations: Vec<&Value> = entry
        .get("route")
        .and_then(Value::as_sequence)
        .map(|routes| routes.iter().filter_map(|r| r.get("destination")).collect())
        .unwrap_or_default();
    let hosts = destinations
        .iter()
        .filter_map(|d| d.get("host")?.as_str().map(str::to_string))
        .collect();
    let port = destinations
        .first()
        .and_then(|d| d.get("port")?.get("number")?.as_u64());

    RoutingRule {
        prefixes,
        other_matchers,
        hosts,
        port,
    }
}

/// Rule blocks under `spec.http`, in document order
fn rule_blocks(text: &str, lines: &[Line]) -> Vec<RuleBlock> {
    let Some(spec) = lines
        .iter()
        .position(|l| l.indent == 0 && l.content(text).trim_end() == "spec:")
    else {
        return Vec::new();
    };
    let Some(http) = lines[spec + 1..]
        .iter()
        .position(|l| l.indent > 0 && l.content(text).trim_end() == "http:")
        .map(|p| spec + 1 + p)
    else {
        return Vec::new();
    };
    let http_indent = lines[http].indent;

    let mut blocks: Vec<Vec<Line>> = Vec::new();
    let mut item_indent = None;
    for line in &lines[http + 1..] {
        if line.is_blank(text) {
            continue;
        }
        let content = line.content(text);
        let indent = *item_indent.get_or_insert(line.indent);
        if line.indent < indent || line.indent < http_indent {
            break;
        }
        if line.indent == indent {
            if !content.starts_with('-') {
                break;
            }
            blocks.push(vec![*line]);
        } else if let Some(block) = blocks.last_mut() {
            block.push(*line);
        }
    }

    blocks
        .iter()
        .map(|block| RuleBlock {
            entries: matcher_entries(text, block),
        })
        .collect()
}

/// Entries of the `match:` sequence inside one rule block
fn matcher_entries(text: &str, block: &[Line]) -> Vec<Range<usize>> {
    let mut key_column = None;
    let mut rest = block;
    for (n, line) in block.iter().enumerate() {
        let content = line.content(text);
        let (key, column) = if n == 0 {
            let stripped = content.trim_start_matches('-').trim_start();
            (stripped, line.indent + content.len() - stripped.len())
        } else {
            (content, line.indent)
        };
        if key.trim_end() == "match:" {
            key_column = Some(column);
            rest = &block[n + 1..];
            break;
        }
    }
    let Some(key_column) = key_column else {
        return Vec::new();
    };

    let mut entries: Vec<Range<usize>> = Vec::new();
    let mut entry_indent = None;
    for line in rest {
        if line.is_blank(text) {
            continue;
        }
        let starts_item = line.content(text).starts_with('-');
        match entry_indent {
            None if starts_item && line.indent >= key_column => {
                entry_indent = Some(line.indent);
                entries.push(line.start..line.end);
            }
            None => break,
            Some(indent) if line.indent < indent => break,
            Some(indent) if line.indent == indent => {
                if !starts_item {
                    break;
                }
                entries.push(line.start..line.end);
            }
            Some(_) => {
                if let Some(entry) = entries.last_mut() {
                    entry.end = line.end;
                }
            }
        }
    }
    entries
}
