//! Host syntax parser.
//!
//! Converts source text into [`Tree`]s shaped the way the macro system expects:
//! `(call recv name (arglist ...))` for calls and operators, `(lasgn name value)`
//! for assignments, `(lvar name)` for names assigned earlier in scope, and so on.
//! Bare names never assigned in scope parse as receiverless calls.

use std::collections::HashSet;

use pest::{error::Error, iterators::Pair, Parser};
use pest_derive::Parser;

use crate::ast::{Span, Tree};
use crate::diagnostics::{to_error_source, SourceArc};
use crate::{err_ctx, err_msg, SpliceError};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct HostParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses `source`, naming it `name` in diagnostics.
///
/// An empty program is `Tree::Nil`, a single statement is returned as is, and
/// several statements are wrapped in a `block`.
pub fn parse(name: &str, source: &str) -> Result<Tree, SpliceError> {
    let src = to_error_source(name, source);
    let mut pairs =
        HostParser::parse(Rule::program, source).map_err(|e| convert_parse_error(e, &src))?;
    let program = pairs
        .next()
        .ok_or_else(|| err_msg!(Internal, "parser produced no program"))?;
    let stmts = program
        .into_inner()
        .find(|p| p.as_rule() == Rule::stmts)
        .ok_or_else(|| err_msg!(Internal, "program without statements"))?;

    let mut builder = TreeBuilder {
        src,
        locals: HashSet::new(),
    };
    builder.build_stmts(stmts)
}

// ============================================================================
// TREE BUILDER
// ============================================================================

struct TreeBuilder {
    src: SourceArc,
    /// Names assigned so far in the current scope.
    locals: HashSet<String>,
}

impl TreeBuilder {
    fn build_stmts(&mut self, pair: Pair<Rule>) -> Result<Tree, SpliceError> {
        let mut statements = significant(pair)
            .map(|stmt| self.build(stmt))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match statements.len() {
            0 => Tree::Nil,
            1 => statements.remove(0),
            _ => Tree::node("block", statements),
        })
    }

    fn build(&mut self, pair: Pair<Rule>) -> Result<Tree, SpliceError> {
        let span = span_of(&pair);
        match pair.as_rule() {
            Rule::stmt => self.build_stmt(pair),
            Rule::assignment => self.build_assignment(pair),
            Rule::command_call => {
                let mut inner = significant(pair);
                let name = self.expect(inner.next(), "command name", span)?;
                let args = inner.map(|arg| self.build(arg)).collect::<Result<Vec<_>, _>>()?;
                Ok(call(Tree::Nil, name.as_str(), args))
            }

            Rule::expr
            | Rule::and_expr
            | Rule::equality
            | Rule::comparison
            | Rule::additive
            | Rule::term => self.build_binary(pair),
            Rule::unary => self.build_unary(pair),
            Rule::postfix => self.build_postfix(pair),

            Rule::integer => {
                let value = pair.as_str().parse::<i64>().map_err(|_| {
                    err_ctx!(Parse, "integer literal out of range", &self.src, span)
                })?;
                Ok(Tree::node("lit", vec![Tree::Int(value)]))
            }
            Rule::symbol_lit => Ok(Tree::node("lit", vec![Tree::sym(&pair.as_str()[1..])])),
            Rule::dstring => Ok(Tree::node("str", vec![Tree::Str(unescape_double(pair.as_str()))])),
            Rule::sstring => Ok(Tree::node("str", vec![Tree::Str(unescape_single(pair.as_str()))])),
            Rule::nil_lit => Ok(Tree::node("nil", vec![])),
            Rule::true_lit => Ok(Tree::node("true", vec![])),
            Rule::false_lit => Ok(Tree::node("false", vec![])),

            Rule::if_expr => self.build_if(pair),
            Rule::array => {
                let items = match significant(pair).next() {
                    Some(list) => self.build_args(list)?,
                    None => vec![],
                };
                Ok(Tree::node("array", items))
            }
            Rule::paren_expr => {
                let stmts = self.expect(significant(pair).next(), "statements", span)?;
                self.build_stmts(stmts)
            }
            Rule::paren_call => {
                let mut inner = significant(pair);
                let name = self.expect(inner.next(), "method name", span)?;
                let args = match inner.next() {
                    Some(args) => self.build_call_args(args)?,
                    None => vec![],
                };
                Ok(call(Tree::Nil, name.as_str(), args))
            }
            Rule::constant => Ok(Tree::node("const", vec![Tree::sym(pair.as_str())])),
            Rule::identifier => {
                let name = pair.as_str();
                if self.locals.contains(name) {
                    Ok(Tree::node("lvar", vec![Tree::sym(name)]))
                } else {
                    Ok(call(Tree::Nil, name, vec![]))
                }
            }

            rule => Err(err_ctx!(
                Parse,
                format!("unexpected {:?}", rule),
                &self.src,
                span
            )),
        }
    }

    fn build_stmt(&mut self, pair: Pair<Rule>) -> Result<Tree, SpliceError> {
        let span = span_of(&pair);
        let mut inner = significant(pair);
        let first = self.expect(inner.next(), "statement", span)?;
        let mut tree = self.build(first)?;
        for modifier in inner {
            let mod_span = span_of(&modifier);
            let condition = self.expect(significant(modifier).next(), "condition", mod_span)?;
            let condition = self.build(condition)?;
            tree = Tree::node("if", vec![condition, tree, Tree::Nil]);
        }
        Ok(tree)
    }

    fn build_assignment(&mut self, pair: Pair<Rule>) -> Result<Tree, SpliceError> {
        let span = span_of(&pair);
        let mut inner = significant(pair);
        let name = self.expect(inner.next(), "variable name", span)?;
        let name = name.as_str().to_string();
        self.locals.insert(name.clone());
        let value = self.expect(inner.next(), "assigned value", span)?;
        let value = self.build(value)?;
        Ok(Tree::node("lasgn", vec![Tree::Symbol(name), value]))
    }

    /// Left-folds `operand (op operand)*`.
    fn build_binary(&mut self, pair: Pair<Rule>) -> Result<Tree, SpliceError> {
        let span = span_of(&pair);
        let mut inner = significant(pair);
        let first = self.expect(inner.next(), "operand", span)?;
        let mut tree = self.build(first)?;
        while let Some(op) = inner.next() {
            let rhs = self.expect(inner.next(), "right operand", span)?;
            let rhs = self.build(rhs)?;
            tree = match op.as_str() {
                "||" => Tree::node("or", vec![tree, rhs]),
                "&&" => Tree::node("and", vec![tree, rhs]),
                operator => call(tree, operator, vec![rhs]),
            };
        }
        Ok(tree)
    }

    fn build_unary(&mut self, pair: Pair<Rule>) -> Result<Tree, SpliceError> {
        let span = span_of(&pair);
        let parts: Vec<Pair<Rule>> = significant(pair).collect();
        let (operand, ops) = parts
            .split_last()
            .ok_or_else(|| err_ctx!(Parse, "missing operand", &self.src, span))?;
        let mut tree = self.build(operand.clone())?;
        for op in ops.iter().rev() {
            tree = match op.as_str() {
                "!" => Tree::node("not", vec![tree]),
                _ => call(tree, "-@", vec![]),
            };
        }
        Ok(tree)
    }

    fn build_postfix(&mut self, pair: Pair<Rule>) -> Result<Tree, SpliceError> {
        let span = span_of(&pair);
        let mut inner = significant(pair);
        let base = self.expect(inner.next(), "expression", span)?;
        let mut tree = self.build(base)?;
        for suffix in inner {
            tree = match suffix.as_rule() {
                Rule::method_suffix => {
                    let suffix_span = span_of(&suffix);
                    let mut parts = significant(suffix);
                    let name = self.expect(parts.next(), "method name", suffix_span)?;
                    let args = match parts.next() {
                        Some(args) => self.build_call_args(args)?,
                        None => vec![],
                    };
                    call(tree, name.as_str(), args)
                }
                Rule::index_suffix => {
                    let args = match significant(suffix).next() {
                        Some(list) => self.build_args(list)?,
                        None => vec![],
                    };
                    call(tree, "[]", args)
                }
                Rule::brace_block | Rule::do_block => self.build_iter(tree, suffix)?,
                rule => {
                    return Err(err_ctx!(
                        Parse,
                        format!("unexpected {:?} after expression", rule),
                        &self.src,
                        span_of(&suffix)
                    ))
                }
            };
        }
        Ok(tree)
    }

    /// Blocks see the enclosing locals plus their parameters; names they
    /// assign do not leak out.
    fn build_iter(&mut self, target: Tree, block: Pair<Rule>) -> Result<Tree, SpliceError> {
        let target = match target.tag() {
            Some("lvar") => {
                let name = target.get(1).cloned().unwrap_or(Tree::Nil);
                Tree::node("call", vec![Tree::Nil, name, Tree::node("arglist", vec![])])
            }
            _ => target,
        };

        let saved = self.locals.clone();
        let mut params = Tree::Nil;
        let mut body = Tree::Nil;
        for part in significant(block) {
            match part.as_rule() {
                Rule::block_params => {
                    let names: Vec<Tree> = part
                        .into_inner()
                        .map(|p| Tree::sym(p.as_str()))
                        .collect();
                    for name in names.iter().filter_map(Tree::as_symbol) {
                        self.locals.insert(name.to_string());
                    }
                    params = Tree::node("args", names);
                }
                _ => body = self.build_stmts(part)?,
            }
        }
        self.locals = saved;
        Ok(Tree::node("iter", vec![target, params, body]))
    }

    fn build_if(&mut self, pair: Pair<Rule>) -> Result<Tree, SpliceError> {
        let span = span_of(&pair);
        let mut inner = significant(pair);
        let condition = self.expect(inner.next(), "condition", span)?;
        let condition = self.build(condition)?;
        let then_body = self.expect(inner.next(), "then branch", span)?;
        let then_body = self.build_stmts(then_body)?;

        let mut branches = Vec::new();
        let mut else_body = Tree::Nil;
        for clause in inner {
            let clause_span = span_of(&clause);
            match clause.as_rule() {
                Rule::elsif_clause => {
                    let mut parts = significant(clause);
                    let cond = self.expect(parts.next(), "elsif condition", clause_span)?;
                    let cond = self.build(cond)?;
                    let body = self.expect(parts.next(), "elsif branch", clause_span)?;
                    let body = self.build_stmts(body)?;
                    branches.push((cond, body));
                }
                _ => {
                    let body = self.expect(significant(clause).next(), "else branch", clause_span)?;
                    else_body = self.build_stmts(body)?;
                }
            }
        }

        let else_body = branches
            .into_iter()
            .rev()
            .fold(else_body, |rest, (cond, body)| Tree::node("if", vec![cond, body, rest]));
        Ok(Tree::node("if", vec![condition, then_body, else_body]))
    }

    fn build_call_args(&mut self, pair: Pair<Rule>) -> Result<Vec<Tree>, SpliceError> {
        match significant(pair).next() {
            Some(inner) if inner.as_rule() == Rule::arg_list => self.build_args(inner),
            Some(command) => Ok(vec![self.build(command)?]),
            None => Ok(vec![]),
        }
    }

    fn build_args(&mut self, pair: Pair<Rule>) -> Result<Vec<Tree>, SpliceError> {
        significant(pair).map(|arg| self.build(arg)).collect()
    }

    fn expect<'i>(
        &self,
        pair: Option<Pair<'i, Rule>>,
        what: &str,
        span: Span,
    ) -> Result<Pair<'i, Rule>, SpliceError> {
        pair.ok_or_else(|| err_ctx!(Parse, format!("missing {}", what), &self.src, span))
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

fn call(receiver: Tree, name: &str, args: Vec<Tree>) -> Tree {
    Tree::node(
        "call",
        vec![receiver, Tree::sym(name), Tree::node("arglist", args)],
    )
}

/// Inner pairs with keyword tokens dropped.
fn significant(pair: Pair<Rule>) -> impl Iterator<Item = Pair<Rule>> {
    pair.into_inner().filter(|p| !is_keyword(p.as_rule()))
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_if
            | Rule::kw_elsif
            | Rule::kw_else
            | Rule::kw_end
            | Rule::kw_then
            | Rule::kw_do
            | Rule::EOI
    )
}

fn span_of(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

fn unescape_double(text: &str) -> String {
    let inner = &text[1..text.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

fn unescape_single(text: &str) -> String {
    text[1..text.len() - 1]
        .replace("\\'", "'")
        .replace("\\\\", "\\")
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn convert_parse_error(error: Error<Rule>, src: &SourceArc) -> SpliceError {
    let span = match &error.location {
        pest::error::InputLocation::Pos(pos) => Span { start: *pos, end: *pos },
        pest::error::InputLocation::Span((start, end)) => Span { start: *start, end: *end },
    };
    let (line, col) = match &error.line_col {
        pest::error::LineColLocation::Pos(pos) => *pos,
        pest::error::LineColLocation::Span(start, _) => *start,
    };
    let expected = match &error.variant {
        pest::error::ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
            let names: Vec<String> = positives.iter().map(|r| format!("{:?}", r)).collect();
            format!("expected {}", names.join(", "))
        }
        pest::error::ErrorVariant::CustomError { message } => message.clone(),
        _ => "unexpected input".to_string(),
    };
    err_ctx!(
        Parse,
        format!("syntax error at {}:{}", line, col),
        src,
        span,
        expected
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp;

    fn p(source: &str) -> Tree {
        parse("test", source).unwrap()
    }

    #[test]
    fn empty_input_is_nil() {
        assert_eq!(p(""), Tree::Nil);
        assert_eq!(p("\n  # only a comment\n"), Tree::Nil);
    }

    #[test]
    fn assignment_introduces_local() {
        assert_eq!(p("a = 3"), sexp!(lasgn a (lit 3)));
        assert_eq!(
            p("a = 3; a"),
            sexp!(block (lasgn a (lit 3)) (lvar a))
        );
    }

    #[test]
    fn unknown_names_are_calls() {
        assert_eq!(
            p("add(a, b)"),
            sexp!(call nil add (arglist (call nil a (arglist)) (call nil b (arglist))))
        );
    }

    #[test]
    fn operators_are_calls() {
        assert_eq!(p("1+1"), sexp!(call (lit 1) [+] (arglist (lit 1))));
        assert_eq!(
            p("1 + 2 * 3"),
            sexp!(call (lit 1) [+] (arglist (call (lit 2) [*] (arglist (lit 3)))))
        );
    }

    #[test]
    fn modifier_if() {
        assert_eq!(
            p("b if a"),
            sexp!(if (call nil a (arglist)) (call nil b (arglist)) nil)
        );
    }

    #[test]
    fn unterminated_call_is_a_parse_error() {
        let err = parse("test", "foo(1, 2").unwrap_err();
        assert!(matches!(err, SpliceError::Parse { .. }));
    }
}
