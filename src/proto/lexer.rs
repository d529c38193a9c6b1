//! Flat tokenizer for interface-definition text.
//!
//! Every byte of the input belongs to exactly one token, so concatenating the
//! token texts reproduces the document. String literals and comments are single
//! tokens: a `{id}` inside `"/journal-entries/{id}"` never reaches the brace
//! matcher.

use crate::error::ArtifactError;
use std::ops::Range;

/// Token classes the recognizer cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier, keyword, number or dotted name (`google.api.http`, `.pkg.Type`, `3`)
    Word,
    /// Single punctuation character
    Punct(char),
    /// Quoted string literal, quotes included
    Str,
    /// `// ...` up to (not including) the newline
    LineComment,
    /// `/* ... */`
    BlockComment,
    /// Run of whitespace, newlines included
    Whitespace,
}

/// One token with its byte range in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    /// Comments and whitespace
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    /// Source text of the token
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.clone()]
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

/// Tokenize `source`
///
/// Fails only on an unterminated string literal or block comment.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ArtifactError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        let b = bytes[pos];

        let kind = if b.is_ascii_whitespace() {
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            TokenKind::Whitespace
        } else if source[pos..].starts_with("//") {
            pos = source[pos..]
                .find('\n')
                .map_or(bytes.len(), |offset| pos + offset);
            TokenKind::LineComment
        } else if source[pos..].starts_with("/*") {
            let Some(offset) = source[pos + 2..].find("*/") else {
                return Err(ArtifactError::unparsable(format!(
                    "unterminated block comment at byte {start}"
                )));
            };
            pos += 2 + offset + 2;
            TokenKind::BlockComment
        } else if b == b'"' || b == b'\'' {
            pos = string_end(bytes, pos).ok_or_else(|| {
                ArtifactError::unparsable(format!("unterminated string literal at byte {start}"))
            })?;
            TokenKind::Str
        } else if is_word_byte(b) {
            while pos < bytes.len() && is_word_byte(bytes[pos]) {
                pos += 1;
            }
            TokenKind::Word
        } else {
            // Multi-byte characters outside strings and comments are kept whole
            let ch = source[pos..].chars().next().unwrap_or('\0');
            pos += ch.len_utf8().max(1);
            TokenKind::Punct(ch)
        };

        tokens.push(Token {
            kind,
            span: start..pos,
        });
    }

    Ok(tokens)
}

/// End offset (exclusive) of the string literal opening at `start`
fn string_end(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'\n' => return None,
            b if b == quote => return Some(pos + 1),
            _ => pos += 1,
        }
    }
    None
}

/// Value of a string literal token, quotes removed and simple escapes resolved
pub fn unquote(literal: &str) -> String {
    let inner = literal
        .get(1..literal.len().saturating_sub(1))
        .unwrap_or_default();
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Quote `value` as a string literal
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokens_cover_the_whole_input() {
        let source = "rpc A(B) returns (C) { option (x.y) = { get: \"/a/{id}\" }; } // done\n";
        let tokens = tokenize(source).unwrap();
        let rebuilt: String = tokens.iter().map(|t| t.text(source)).collect();
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn test_braces_inside_strings_are_atomic() {
        assert_eq!(
            kinds("{\"{id}\"}"),
            vec![TokenKind::Punct('{'), TokenKind::Str, TokenKind::Punct('}')]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("// a { b\n/* c } */x"),
            vec![
                TokenKind::LineComment,
                TokenKind::Whitespace,
                TokenKind::BlockComment,
                TokenKind::Word
            ]
        );
    }

    #[test]
    fn test_unterminated_constructs_fail() {
        assert!(tokenize("option x = \"abc").is_err());
        assert!(tokenize("/* never closed").is_err());
    }

    #[test]
    fn test_quote_roundtrip_of_escapes() {
        let quoted = quote("say \"hi\"");
        assert_eq!(quoted, "\"say \\\"hi\\\"\"");
        assert_eq!(unquote(&quoted), "say \"hi\"");
    }
}
