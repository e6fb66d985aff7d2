//! Structural markup codec for trees.
//!
//! Trees are written as nested elements, pre-order, one element per tree:
//!
//! ```text
//! <?xml version="1.0"?><Sexp><Symbol>:lasgn</Symbol><Symbol>:a</Symbol>
//! <Sexp><Symbol>:lit</Symbol><Integer>3</Integer></Sexp></Sexp>
//! ```
//!
//! | Tree         | Element                          |
//! |--------------|----------------------------------|
//! | node         | `<Sexp>children</Sexp>`          |
//! | symbol       | `<Symbol>:name</Symbol>`         |
//! | string       | `<String>"text"</String>`        |
//! | integer      | `<Integer>42</Integer>`          |
//! | boolean      | `<Boolean>true</Boolean>`        |
//! | none         | `<Nil>nil</Nil>`                 |
//!
//! The decoder also accepts the legacy element names `Array`, `Fixnum`,
//! `Bignum`, `TrueClass`, `FalseClass` and `NilClass`, and single-quoted strings.
//! Decoding fails fast on the first malformed element.

use pest::{iterators::Pair, Parser};
use pest_derive::Parser;

use crate::ast::{Span, Tree};
use crate::diagnostics::{to_error_source, RelatedLabel, SourceArc};
use crate::{err_ctx, err_src, SpliceError};

pub const PROLOG: &str = "<?xml version=\"1.0\"?>";

#[derive(Parser)]
#[grammar = "codec/markup.pest"]
struct MarkupParser;

// ============================================================================
// ENCODING
// ============================================================================

/// Serialises `tree` behind the markup prolog.
pub fn encode(tree: &Tree) -> String {
    let mut out = String::from(PROLOG);
    write_tree(tree, &mut out);
    out
}

fn write_tree(tree: &Tree, out: &mut String) {
    match tree {
        Tree::List(items) => {
            out.push_str("<Sexp>");
            for item in items {
                write_tree(item, out);
            }
            out.push_str("</Sexp>");
        }
        Tree::Symbol(name) => write_atom(out, "Symbol", &format!(":{}", name)),
        Tree::Str(text) => write_atom(out, "String", &quote(text)),
        Tree::Int(value) => write_atom(out, "Integer", &value.to_string()),
        Tree::Bool(value) => write_atom(out, "Boolean", &value.to_string()),
        Tree::Nil => write_atom(out, "Nil", "nil"),
    }
}

fn write_atom(out: &mut String, element: &str, text: &str) {
    out.push('<');
    out.push_str(element);
    out.push('>');
    out.push_str(&escape_entities(text));
    out.push_str("</");
    out.push_str(element);
    out.push('>');
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Escapes markup metacharacters. Whitespace at either edge becomes a
/// character reference, since the decoder trims element text.
fn escape_entities(text: &str) -> String {
    let start = text.len() - text.trim_start().len();
    let end = text.trim_end().len().max(start);
    let mut out = String::with_capacity(text.len());
    for (at, ch) in text.char_indices() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            ch if ch.is_whitespace() && (at < start || at >= end) => {
                out.push_str(&format!("&#{};", u32::from(ch)))
            }
            other => out.push(other),
        }
    }
    out
}

// ============================================================================
// DECODING
// ============================================================================

/// Parses markup produced by [`encode`] (or a compatible producer) back into a tree.
pub fn decode(markup: &str) -> Result<Tree, SpliceError> {
    let src = to_error_source("markup", markup);
    let mut pairs = MarkupParser::parse(Rule::document, markup).map_err(|e| {
        let span = match &e.location {
            pest::error::InputLocation::Pos(pos) => Span { start: *pos, end: *pos },
            pest::error::InputLocation::Span((start, end)) => Span { start: *start, end: *end },
        };
        err_ctx!(Codec, "malformed markup", &src, span, e.variant.message())
    })?;
    let root = pairs
        .next()
        .and_then(|document| document.into_inner().find(|p| p.as_rule() == Rule::element))
        .ok_or_else(|| err_ctx!(Codec, "document has no root element", &src, Span::default()))?;
    Decoder { src }.element(root)
}

struct Decoder {
    src: SourceArc,
}

impl Decoder {
    fn element(&self, pair: Pair<Rule>) -> Result<Tree, SpliceError> {
        let span = span_of(&pair);
        let mut inner = pair.into_inner();
        let first = inner
            .next()
            .ok_or_else(|| self.error("empty element", span))?;

        let (name, content) = match first.as_rule() {
            Rule::empty_element => (tag_name(first), None),
            _ => {
                let open = tag_name(first);
                let content = inner.next();
                let close = inner
                    .next()
                    .map(tag_name)
                    .ok_or_else(|| self.error("missing close tag", span))?;
                if open.0 != close.0 {
                    let opened = RelatedLabel {
                        source: SourceArc::clone(&self.src),
                        span: open.1,
                        label: format!("<{}> opened here", open.0),
                    };
                    return Err(err_src!(
                        Codec,
                        format!("mismatched close tag </{}> for <{}>", close.0, open.0),
                        &self.src,
                        close.1,
                        vec![opened]
                    ));
                }
                (open, content)
            }
        };

        let mut children = Vec::new();
        let mut text = String::new();
        if let Some(content) = content {
            for part in content.into_inner() {
                match part.as_rule() {
                    Rule::element => children.push(part),
                    _ => text.push_str(part.as_str()),
                }
            }
        }
        let text = unescape_entities(text.trim());

        match name.0 {
            "Sexp" | "Array" => {
                if !text.is_empty() {
                    return Err(self.error(&format!("unexpected text '{}' inside <{}>", text, name.0), span));
                }
                children
                    .into_iter()
                    .map(|child| self.element(child))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Tree::List)
            }
            element => {
                if !children.is_empty() {
                    return Err(self.error(&format!("<{}> cannot contain elements", element), span));
                }
                self.atom(element, &text, span)
            }
        }
    }

    fn atom(&self, element: &str, text: &str, span: Span) -> Result<Tree, SpliceError> {
        let mismatch = || self.error(&format!("'{}' is not a valid <{}> value", text, element), span);
        match element {
            "Symbol" => text
                .strip_prefix(':')
                .map(Tree::sym)
                .ok_or_else(mismatch),
            "String" => unquote(text).map(Tree::Str).ok_or_else(mismatch),
            "Integer" | "Fixnum" | "Bignum" => {
                text.parse::<i64>().map(Tree::Int).map_err(|_| mismatch())
            }
            "Boolean" => match text {
                "true" => Ok(Tree::Bool(true)),
                "false" => Ok(Tree::Bool(false)),
                _ => Err(mismatch()),
            },
            "TrueClass" if text == "true" => Ok(Tree::Bool(true)),
            "FalseClass" if text == "false" => Ok(Tree::Bool(false)),
            "Nil" | "NilClass" if text == "nil" || text.is_empty() => Ok(Tree::Nil),
            "TrueClass" | "FalseClass" | "Nil" | "NilClass" => Err(mismatch()),
            other => Err(self.error(&format!("unknown element <{}>", other), span)),
        }
    }

    fn error(&self, message: &str, span: Span) -> SpliceError {
        err_ctx!(Codec, message, &self.src, span)
    }
}

fn tag_name(pair: Pair<Rule>) -> (&str, Span) {
    let span = span_of(&pair);
    let name = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::name)
        .map(|p| p.as_str())
        .unwrap_or("");
    (name, span)
}

fn span_of(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

/// Resolves named and numeric character references in one pass. An
/// unrecognised reference is kept literally.
fn unescape_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        let resolved = rest
            .find(';')
            .and_then(|end| entity(&rest[1..end]).map(|ch| (ch, end)));
        match resolved {
            Some((ch, end)) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Strips the quotes of a double- or single-quoted string literal.
fn unquote(text: &str) -> Option<String> {
    if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        return Some(text[1..text.len() - 1].to_string());
    }
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                other => out.push(other),
            },
            '"' => return None,
            other => out.push(other),
        }
    }
    Some(out)
}
