//! Minimal structural recognizer.
//!
//! Understands just enough of the interface-definition grammar to locate the
//! things the passes splice around: `syntax`, `package` and `import`
//! statements, `service` blocks, `rpc` declarations in both terminated and
//! block form, and `option` statements at any nesting level. Everything else
//! (messages, enums, extensions) is skipped as balanced blocks.

use super::lexer::{tokenize, unquote, Token, TokenKind};
use super::DOCS_OFF_PREFIX;
use crate::error::ArtifactError;
use std::ops::Range;

/// `package finance.gl.v1;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDecl {
    pub name: String,
    pub span: Range<usize>,
}

/// `import "google/api/annotations.proto";`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub path: String,
    pub span: Range<usize>,
}

/// `option (<name>) = <value>;` or `option <name> = <value>;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionStatement {
    /// Option name without parentheses, e.g. `google.api.http`
    pub name: String,
    /// Span of the value between `=` and `;`, trimmed
    pub value: Range<usize>,
    /// From `option` through the terminating `;`
    pub span: Range<usize>,
}

/// One recognized `rpc` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub request_type: String,
    pub response_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
    /// Contiguous `//` comment lines directly above the declaration
    pub leading_comment: Option<String>,
    /// Enclosing service name
    pub service: String,
    /// From `rpc` through the closing `;` or `}`
    pub span: Range<usize>,
    /// End of the `returns (...)` clause
    pub signature_end: usize,
    /// Range strictly between `{` and `}` for block declarations
    pub body: Option<Range<usize>>,
    /// Whitespace preceding `rpc` on its line
    pub indent: String,
    /// Live option statements inside the block
    pub options: Vec<OptionStatement>,
    /// Option names inside the block that are commented out by the docs toggle
    pub disabled_options: Vec<String>,
}

impl MethodDescriptor {
    /// Live option statement named `name`, including `(name).field` forms
    pub fn option(&self, name: &str) -> Option<&OptionStatement> {
        self.options.iter().find(|o| option_matches(&o.name, name))
    }

    /// Every live statement of option `name`, in source order
    pub fn options_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a OptionStatement> {
        self.options.iter().filter(move |o| option_matches(&o.name, name))
    }

    /// Live or toggled-off option named `name`
    pub fn carries_option(&self, name: &str) -> bool {
        self.option(name).is_some()
            || self
                .disabled_options
                .iter()
                .any(|o| option_matches(o, name))
    }
}

/// `google.api.http.get` (from `(google.api.http).get`) matches `google.api.http`
fn option_matches(found: &str, name: &str) -> bool {
    found
        .strip_prefix(name)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// `service <Name> { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDecl {
    pub name: String,
    pub span: Range<usize>,
    pub methods: Vec<MethodDescriptor>,
}

/// Everything the passes need to know about one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtoFile {
    /// `syntax = "...";` (or `edition = "...";`) statement span
    pub syntax: Option<Range<usize>>,
    pub package: Option<PackageDecl>,
    pub imports: Vec<ImportDecl>,
    /// Import paths commented out by the docs toggle
    pub disabled_imports: Vec<String>,
    pub services: Vec<ServiceDecl>,
    /// Every live option statement, any nesting level, in document order
    pub options: Vec<OptionStatement>,
}

impl ProtoFile {
    /// All methods across all services, in document order
    pub fn methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.services.iter().flat_map(|s| s.methods.iter())
    }

    /// Live import of `path`
    pub fn imports_path(&self, path: &str) -> bool {
        self.imports.iter().any(|i| i.path == path)
    }

    /// Live or toggled-off import of `path`
    pub fn references_import(&self, path: &str) -> bool {
        self.imports_path(path) || self.disabled_imports.iter().any(|p| p == path)
    }
}

/// Recognize `source`
pub fn parse(source: &str) -> Result<ProtoFile, ArtifactError> {
    let tokens = tokenize(source)?;
    Parser::new(source, &tokens).parse_file()
}

struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    // Indices of significant (non-trivia) tokens
    sig: Vec<usize>,
    pos: usize,
    file: ProtoFile,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        let sig = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_trivia())
            .map(|(i, _)| i)
            .collect();
        Parser {
            source,
            tokens,
            sig,
            pos: 0,
            file: ProtoFile::default(),
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        let tokens: &'a [Token] = self.tokens;
        self.sig.get(self.pos).map(|&i| &tokens[i])
    }

    fn peek_text(&self) -> Option<&'a str> {
        self.peek().map(|t| t.text(self.source))
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, what: &str) -> ArtifactError {
        match self.peek() {
            Some(token) => ArtifactError::unparsable(format!(
                "{what} at line {}, found `{}`",
                self.line_of(token.span.start),
                token.text(self.source)
            )),
            None => ArtifactError::unparsable(format!("{what} at end of document")),
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.source[..offset].matches('\n').count() + 1
    }

    fn expect_punct(&mut self, ch: char) -> Result<&'a Token, ArtifactError> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Punct(ch) => {
                self.pos += 1;
                Ok(token)
            }
            _ => Err(self.error(&format!("expected `{ch}`"))),
        }
    }

    fn expect_word(&mut self) -> Result<&'a str, ArtifactError> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Word => {
                self.pos += 1;
                Ok(token.text(self.source))
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    fn at_punct(&self, ch: char) -> bool {
        self.peek().is_some_and(|t| t.kind == TokenKind::Punct(ch))
    }

    fn parse_file(mut self) -> Result<ProtoFile, ArtifactError> {
        self.collect_disabled_imports();

        while let Some(token) = self.peek() {
            let start = token.span.start;
            match (token.kind, token.text(self.source)) {
                (TokenKind::Word, "syntax" | "edition") => {
                    let end = self.skip_statement()?;
                    self.file.syntax = Some(start..end);
                }
                (TokenKind::Word, "package") => {
                    self.pos += 1;
                    let name = self.expect_word()?.to_string();
                    let end = self.expect_punct(';')?.span.end;
                    self.file.package = Some(PackageDecl {
                        name,
                        span: start..end,
                    });
                }
                (TokenKind::Word, "import") => {
                    self.pos += 1;
                    if matches!(self.peek_text(), Some("public" | "weak")) {
                        self.pos += 1;
                    }
                    let path = match self.next() {
                        Some(t) if t.kind == TokenKind::Str => unquote(t.text(self.source)),
                        _ => return Err(self.error("expected import path")),
                    };
                    let end = self.expect_punct(';')?.span.end;
                    self.file.imports.push(ImportDecl {
                        path,
                        span: start..end,
                    });
                }
                (TokenKind::Word, "option") => {
                    let option = self.parse_option()?;
                    self.file.options.push(option);
                }
                (TokenKind::Word, "service") => {
                    let service = self.parse_service()?;
                    self.file.services.push(service);
                }
                (TokenKind::Punct(';'), _) => self.pos += 1,
                _ => {
                    self.skip_statement()?;
                }
            }
        }

        Ok(self.file)
    }

    /// Skip to the end of a `;`-terminated statement or a balanced block,
    /// recording nested option statements on the way
    fn skip_statement(&mut self) -> Result<usize, ArtifactError> {
        loop {
            let Some(token) = self.peek() else {
                return Err(self.error("unterminated statement"));
            };
            match token.kind {
                TokenKind::Punct(';') => {
                    self.pos += 1;
                    return Ok(token.span.end);
                }
                TokenKind::Punct('{') => {
                    self.pos += 1;
                    return self.skip_block_body();
                }
                TokenKind::Punct('}') => return Err(self.error("unbalanced `}`")),
                _ => self.pos += 1,
            }
        }
    }

    /// Called just past `{`; returns the end of the matching `}`
    fn skip_block_body(&mut self) -> Result<usize, ArtifactError> {
        loop {
            let Some(token) = self.peek() else {
                return Err(self.error("unclosed `{`"));
            };
            match (token.kind, token.text(self.source)) {
                (TokenKind::Punct('}'), _) => {
                    self.pos += 1;
                    return Ok(token.span.end);
                }
                (TokenKind::Punct(';'), _) => self.pos += 1,
                (TokenKind::Word, "option") => {
                    let option = self.parse_option()?;
                    self.file.options.push(option);
                }
                _ => {
                    self.skip_statement()?;
                }
            }
        }
    }

    fn parse_option(&mut self) -> Result<OptionStatement, ArtifactError> {
        let start = match self.next() {
            Some(t) => t.span.start,
            None => return Err(self.error("expected `option`")),
        };

        let name = if self.at_punct('(') {
            self.pos += 1;
            let mut name = self.expect_word()?.to_string();
            self.expect_punct(')')?;
            // `(ext).field` continues with a dotted word
            if let Some(t) = self.peek() {
                let text = t.text(self.source);
                if t.kind == TokenKind::Word && text.starts_with('.') {
                    name.push_str(text);
                    self.pos += 1;
                }
            }
            name
        } else {
            self.expect_word()?.to_string()
        };

        self.expect_punct('=')?;

        let mut depth = 0usize;
        let mut value_start = None;
        let mut value_end = 0;
        loop {
            let Some(token) = self.next() else {
                return Err(self.error("unterminated option statement"));
            };
            match token.kind {
                TokenKind::Punct(';') if depth == 0 => {
                    let value_start = value_start.unwrap_or(token.span.start);
                    return Ok(OptionStatement {
                        name,
                        value: value_start..value_end.max(value_start),
                        span: start..token.span.end,
                    });
                }
                TokenKind::Punct('{' | '[' | '(') => depth += 1,
                TokenKind::Punct('}' | ']' | ')') => {
                    if depth == 0 {
                        return Err(self.error("unbalanced option value"));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            value_start.get_or_insert(token.span.start);
            value_end = token.span.end;
        }
    }

    fn parse_service(&mut self) -> Result<ServiceDecl, ArtifactError> {
        let start = match self.next() {
            Some(t) => t.span.start,
            None => return Err(self.error("expected `service`")),
        };
        let name = self.expect_word()?.to_string();
        self.expect_punct('{')?;

        let mut methods = Vec::new();
        loop {
            let Some(token) = self.peek() else {
                return Err(self.error(&format!("unclosed service `{name}`")));
            };
            match (token.kind, token.text(self.source)) {
                (TokenKind::Punct('}'), _) => {
                    self.pos += 1;
                    return Ok(ServiceDecl {
                        name,
                        span: start..token.span.end,
                        methods,
                    });
                }
                (TokenKind::Punct(';'), _) => self.pos += 1,
                (TokenKind::Word, "option") => {
                    let option = self.parse_option()?;
                    self.file.options.push(option);
                }
                (TokenKind::Word, "rpc") => {
                    let method = self.parse_rpc(&name)?;
                    methods.push(method);
                }
                _ => return Err(self.error(&format!("unexpected token in service `{name}`"))),
            }
        }
    }

    fn parse_rpc(&mut self, service: &str) -> Result<MethodDescriptor, ArtifactError> {
        let rpc_index = self.sig[self.pos];
        let start = self.tokens[rpc_index].span.start;
        self.pos += 1;

        let name = self.expect_word()?.to_string();
        let (client_streaming, request_type) = self.parse_message_ref()?;
        match self.next() {
            Some(t) if t.kind == TokenKind::Word && t.text(self.source) == "returns" => {}
            _ => return Err(self.error(&format!("expected `returns` in rpc `{name}`"))),
        }
        let (server_streaming, response_type) = self.parse_message_ref()?;
        let signature_end = self.tokens[self.sig[self.pos - 1]].span.end;

        let mut options = Vec::new();
        let (end, body) = match self.next() {
            Some(t) if t.kind == TokenKind::Punct(';') => (t.span.end, None),
            Some(t) if t.kind == TokenKind::Punct('{') => {
                let body_start = t.span.end;
                loop {
                    let Some(token) = self.peek() else {
                        return Err(self.error(&format!("unclosed rpc `{name}`")));
                    };
                    match (token.kind, token.text(self.source)) {
                        (TokenKind::Punct('}'), _) => {
                            self.pos += 1;
                            break (token.span.end, Some(body_start..token.span.start));
                        }
                        (TokenKind::Punct(';'), _) => self.pos += 1,
                        (TokenKind::Word, "option") => {
                            let option = self.parse_option()?;
                            self.file.options.push(option.clone());
                            options.push(option);
                        }
                        _ => {
                            return Err(
                                self.error(&format!("unexpected token in rpc `{name}`"))
                            )
                        }
                    }
                }
            }
            _ => return Err(self.error(&format!("expected `;` or `{{` after rpc `{name}`"))),
        };

        let disabled_options = match &body {
            Some(range) => self.disabled_options_in(range.clone()),
            None => Vec::new(),
        };

        Ok(MethodDescriptor {
            name,
            request_type,
            response_type,
            client_streaming,
            server_streaming,
            leading_comment: self.leading_comment(rpc_index),
            service: service.to_string(),
            span: start..end,
            signature_end,
            body,
            indent: self.indent_before(start),
            options,
            disabled_options,
        })
    }

    /// `( [stream] Type )`
    fn parse_message_ref(&mut self) -> Result<(bool, String), ArtifactError> {
        self.expect_punct('(')?;
        let mut streaming = false;
        let mut ty = self.expect_word()?.to_string();
        if ty == "stream" && !self.at_punct(')') {
            streaming = true;
            ty = self.expect_word()?.to_string();
        }
        self.expect_punct(')')?;
        Ok((streaming, ty))
    }

    /// Contiguous line comments ending on the line above `tokens[index]`
    fn leading_comment(&self, index: usize) -> Option<String> {
        let mut lines = Vec::new();
        let mut i = index;
        while i > 0 {
            let token = &self.tokens[i - 1];
            match token.kind {
                TokenKind::Whitespace => {
                    if token.text(self.source).matches('\n').count() > 1 {
                        break;
                    }
                }
                TokenKind::LineComment => {
                    let text = token.text(self.source);
                    // Trailing comments belong to the previous line's code
                    let own_line = i < 2
                        || (self.tokens[i - 2].kind == TokenKind::Whitespace
                            && self.tokens[i - 2].text(self.source).contains('\n'));
                    if text.starts_with(DOCS_OFF_PREFIX) || !own_line {
                        break;
                    }
                    lines.push(text.trim_start_matches('/').trim().to_string());
                }
                _ => break,
            }
            i -= 1;
        }
        lines.reverse();
        let joined = lines
            .into_iter()
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    }

    fn indent_before(&self, offset: usize) -> String {
        let line_start = self.source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let prefix = &self.source[line_start..offset];
        if prefix.chars().all(char::is_whitespace) {
            prefix.to_string()
        } else {
            String::new()
        }
    }

    fn disabled_options_in(&self, range: Range<usize>) -> Vec<String> {
        self.tokens
            .iter()
            .filter(|t| t.kind == TokenKind::LineComment && range.contains(&t.span.start))
            .filter_map(|t| disabled_option_name(t.text(self.source)))
            .collect()
    }

    fn collect_disabled_imports(&mut self) {
        let paths: Vec<String> = self
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::LineComment)
            .filter_map(|t| {
                let rest = t.text(self.source).strip_prefix(DOCS_OFF_PREFIX)?;
                let rest = rest.trim_start().strip_prefix("import")?;
                let open = rest.find('"')?;
                let close = rest[open + 1..].find('"')?;
                Some(rest[open + 1..open + 1 + close].to_string())
            })
            .collect();
        self.file.disabled_imports = paths;
    }
}

/// `// docs-off: option (a.b.c) = {` → `a.b.c`
fn disabled_option_name(comment: &str) -> Option<String> {
    let rest = comment.strip_prefix(DOCS_OFF_PREFIX)?.trim_start();
    let rest = rest.strip_prefix("option")?.trim_start();
    let rest = rest.strip_prefix('(')?;
    let close = rest.find(')')?;
    Some(rest[..close].trim().to_string())
}
