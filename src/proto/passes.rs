use super::lexer::{quote, tokenize, unquote, TokenKind};
use super::recognizer::{MethodDescriptor, ProtoFile};
use crate::route::{base_path_for_package, BodyPolicy, HttpVerb, RouteInferrer, RouteMapping};
use crate::tags::TagCategorizer;

/// Import that makes `(google.api.http)` available
pub const HTTP_IMPORT: &str = "google/api/annotations.proto";
/// HTTP rule option name
pub const HTTP_OPTION: &str = "google.api.http";
/// Import that makes the openapiv2 operation options available
pub const OPENAPI_IMPORT: &str = "protoc-gen-openapiv2/options/annotations.proto";
/// Operation tag/summary option name
pub const OPENAPI_OPERATION_OPTION: &str =
    "grpc.gateway.protoc_gen_openapiv2.options.openapiv2_operation";
/// Prefix shared by every openapiv2 option
pub const OPENAPI_OPTION_PREFIX: &str = "grpc.gateway.protoc_gen_openapiv2";

/// Where a pass puts its fragment inside a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// First statement of the block; terminated declarations become blocks
    FirstStatement,
    /// Directly after the statement ending at this byte offset
    After(usize),
    /// Leave the declaration alone
    Skip,
}

/// One idempotent splicing transformation over an interface file
///
/// A pass is a no-op for the whole document when its import is already
/// referenced, and for a single declaration when that declaration already
/// carries its option.
pub trait SplicePass {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Import path whose presence marks the document as done
    fn document_marker(&self) -> &str;

    /// Option name whose presence marks a declaration as done
    fn declaration_marker(&self) -> &str;

    /// Where the fragment goes for `method`
    fn placement(&self, method: &MethodDescriptor) -> Placement;

    /// Option statement for `method`, each line prefixed with `indent`
    ///
    /// `None` leaves the declaration untouched.
    fn render(&self, file: &ProtoFile, method: &MethodDescriptor, indent: &str) -> Option<String>;
}

/// Adds `(google.api.http)` to every declaration
pub struct HttpPass<'a> {
    inferrer: &'a RouteInferrer,
    base_path: Option<String>,
}

impl<'a> HttpPass<'a> {
    /// `base_path` overrides the path derived from the package declaration
    pub fn new(inferrer: &'a RouteInferrer, base_path: Option<String>) -> Self {
        HttpPass {
            inferrer,
            base_path,
        }
    }

    /// Base path in effect for `file`
    pub fn base_path_for(&self, file: &ProtoFile) -> String {
        match (&self.base_path, &file.package) {
            (Some(base), _) => base.clone(),
            (None, Some(package)) => base_path_for_package(&package.name),
            (None, None) => base_path_for_package(""),
        }
    }
}

impl SplicePass for HttpPass<'_> {
    fn name(&self) -> &'static str {
        "http"
    }

    fn document_marker(&self) -> &str {
        HTTP_IMPORT
    }

    fn declaration_marker(&self) -> &str {
        HTTP_OPTION
    }

    fn placement(&self, _method: &MethodDescriptor) -> Placement {
        Placement::FirstStatement
    }

    fn render(&self, file: &ProtoFile, method: &MethodDescriptor, indent: &str) -> Option<String> {
        let route = self.inferrer.infer(&method.name, &self.base_path_for(file));
        tracing::debug!(method = %method.name, route = %route, "inferred route");
        Some(render_http_option(&route, indent))
    }
}

/// `option (google.api.http) = { ... };` for `route`
pub fn render_http_option(route: &RouteMapping, indent: &str) -> String {
    let mut out = format!("{indent}option (google.api.http) = {{\n");
    out.push_str(&format!(
        "{indent}  {}: {}\n",
        route.verb.as_option_key(),
        quote(&route.path)
    ));
    if route.body == BodyPolicy::Wildcard {
        out.push_str(&format!("{indent}  body: \"*\"\n"));
    }
    out.push_str(&format!("{indent}}};"));
    out
}

/// Adds the openapiv2 operation tag and summary after an existing HTTP rule
pub struct TagPass<'a> {
    tags: &'a TagCategorizer,
}

impl<'a> TagPass<'a> {
    pub fn new(tags: &'a TagCategorizer) -> Self {
        TagPass { tags }
    }
}

impl SplicePass for TagPass<'_> {
    fn name(&self) -> &'static str {
        "tags"
    }

    fn document_marker(&self) -> &str {
        OPENAPI_IMPORT
    }

    fn declaration_marker(&self) -> &str {
        OPENAPI_OPERATION_OPTION
    }

    fn placement(&self, method: &MethodDescriptor) -> Placement {
        match method.options_named(HTTP_OPTION).last() {
            Some(option) => Placement::After(option.span.end),
            None => Placement::Skip,
        }
    }

    fn render(&self, _file: &ProtoFile, method: &MethodDescriptor, indent: &str) -> Option<String> {
        let tag = self.tags.categorize(
            &method.name,
            method.leading_comment.as_deref(),
            Some(&method.service),
        )?;
        Some(format!(
            "{indent}option (grpc.gateway.protoc_gen_openapiv2.options.openapiv2_operation) = {{\n\
             {indent}  tags: {}\n\
             {indent}  summary: {}\n\
             {indent}}};",
            quote(&tag.name),
            quote(&tag.summary)
        ))
    }
}

/// HTTP rule as written in an existing `(google.api.http)` option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRule {
    /// Pattern key (`get`, `post`, `patch`, `custom`, ...)
    pub method: String,
    /// Path template
    pub path: String,
    /// `body` field, if present
    pub body: Option<String>,
}

impl HttpRule {
    /// Parse the aggregate value of an HTTP option (`{ post: "/x" body: "*" }`)
    ///
    /// Only top-level `key: "string"` pairs are read; nested
    /// `additional_bindings` are ignored.
    pub fn parse(value: &str) -> Option<HttpRule> {
        let tokens = tokenize(value).ok()?;
        let significant: Vec<_> = tokens.iter().filter(|t| !t.is_trivia()).collect();

        let mut method = None;
        let mut body = None;
        let mut depth = 0usize;
        let mut i = 0;
        while i < significant.len() {
            let token = significant[i];
            match token.kind {
                TokenKind::Punct('{') => depth += 1,
                TokenKind::Punct('}') => depth = depth.saturating_sub(1),
                TokenKind::Word if depth == 1 => {
                    let key = token.text(value);
                    let is_pair = significant
                        .get(i + 1)
                        .is_some_and(|t| t.kind == TokenKind::Punct(':'))
                        && significant
                            .get(i + 2)
                            .is_some_and(|t| t.kind == TokenKind::Str);
                    if is_pair {
                        let literal = unquote(significant[i + 2].text(value));
                        match key {
                            "body" => body = Some(literal),
                            "response_body" | "selector" => {}
                            _ if method.is_none() => method = Some((key.to_string(), literal)),
                            _ => {}
                        }
                        i += 2;
                    }
                }
                _ => {}
            }
            i += 1;
        }

        let (method, path) = method?;
        Some(HttpRule { method, path, body })
    }

    /// Rule written field by field: `option (google.api.http).get = "/x";`
    ///
    /// `fields` are `(field, value)` pairs with the value as written.
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Option<HttpRule> {
        let mut method = None;
        let mut body = None;
        for (field, value) in fields {
            let literal = unquote(value.trim());
            match field {
                "body" => body = Some(literal),
                "response_body" | "selector" | "additional_bindings" => {}
                _ if method.is_none() => method = Some((field.to_string(), literal)),
                _ => {}
            }
        }
        let (method, path) = method?;
        Some(HttpRule { method, path, body })
    }

    /// Compare with an inferred route; `None` when they agree
    pub fn drift_from(&self, route: &RouteMapping) -> Option<String> {
        let verb_matches = HttpVerb::from_option_key(&self.method) == Some(route.verb);
        let body_matches = match route.body {
            BodyPolicy::Wildcard => self.body.as_deref() == Some("*"),
            BodyPolicy::None => self.body.is_none(),
        };
        if verb_matches && self.path == route.path && body_matches {
            return None;
        }
        let written_body = self.body.as_deref().map_or(String::new(), |b| format!(" (body: {b})"));
        Some(format!(
            "written as {} {}{written_body}, inferred {route}",
            self.method.to_uppercase(),
            self.path
        ))
    }
}
