//! Host syntax unparser.
//!
//! Renders a [`Tree`] back to source text that parses to the same tree.
//! Statements are rendered one per line; anything that is not a plain
//! expression is parenthesised when it appears inside another expression.

use crate::ast::call::{argument_list, message_name, receiver};
use crate::ast::Tree;
use crate::{err_msg, SpliceError};

const INDENT: &str = "  ";

/// Renders a whole program. `Tree::Nil` is the empty program.
pub fn unparse(tree: &Tree) -> Result<String, SpliceError> {
    match tree {
        Tree::Nil => Ok(String::new()),
        _ => statements(tree),
    }
}

/// Renders a tree used as a macro argument: operator expressions and
/// statements are parenthesised so that splicing the text into a larger
/// expression keeps their grouping.
pub fn unparse_argument(tree: &Tree) -> Result<String, SpliceError> {
    if precedence(tree).is_some() || is_compound(tree) {
        Ok(format!("({})", inner_text(tree)?))
    } else {
        unparse(tree)
    }
}

// ============================================================================
// STATEMENTS
// ============================================================================

fn statements(tree: &Tree) -> Result<String, SpliceError> {
    if tree.has_tag("block") {
        let lines = tree
            .rest()
            .iter()
            .map(statement)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(lines.join("\n"));
    }
    statement(tree)
}

fn statement(tree: &Tree) -> Result<String, SpliceError> {
    match tree.tag() {
        Some("if") => if_statement(tree),
        Some("block") => Ok(format!("({})", inline_block(tree)?)),
        _ => expression(tree),
    }
}

fn if_statement(tree: &Tree) -> Result<String, SpliceError> {
    let (condition, then_body, else_body) = if_parts(tree)?;
    let cond = if is_compound(condition) {
        format!("({})", inner_text(condition)?)
    } else {
        expression(condition)?
    };

    if else_body.is_nil() && !then_body.is_nil() && !then_body.has_tag("block") {
        let body = statement(then_body)?;
        if !body.contains('\n') {
            return Ok(format!("{} if {}", body, cond));
        }
    }

    let mut out = format!("if {} then\n", cond);
    push_body(&mut out, then_body)?;
    if !else_body.is_nil() {
        out.push_str("else\n");
        push_body(&mut out, else_body)?;
    }
    out.push_str("end");
    Ok(out)
}

fn push_body(out: &mut String, body: &Tree) -> Result<(), SpliceError> {
    if body.is_nil() {
        return Ok(());
    }
    for line in statements(body)?.lines() {
        out.push_str(INDENT);
        out.push_str(line);
        out.push('\n');
    }
    Ok(())
}

fn if_parts(tree: &Tree) -> Result<(&Tree, &Tree, &Tree), SpliceError> {
    match tree.rest() {
        [condition, then_body, else_body] => Ok((condition, then_body, else_body)),
        _ => Err(err_msg!(Unparse, "malformed if: {}", tree)),
    }
}

fn inline_block(tree: &Tree) -> Result<String, SpliceError> {
    let parts = tree
        .rest()
        .iter()
        .map(statement)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join("; "))
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

fn expression(tree: &Tree) -> Result<String, SpliceError> {
    let items = match tree {
        Tree::Nil => return Ok("nil".to_string()),
        Tree::List(items) if !items.is_empty() => items,
        other => return Err(err_msg!(Unparse, "cannot render bare atom {}", other)),
    };
    let tag = tree
        .tag()
        .ok_or_else(|| err_msg!(Unparse, "node without a tag: {}", tree))?;
    let children = &items[1..];

    match (tag, children) {
        ("lit", [Tree::Int(value)]) => Ok(value.to_string()),
        ("lit", [Tree::Symbol(name)]) => Ok(format!(":{}", name)),
        ("str", [Tree::Str(text)]) => Ok(quote_string(text)),
        ("nil", []) => Ok("nil".to_string()),
        ("true", []) => Ok("true".to_string()),
        ("false", []) => Ok("false".to_string()),
        ("lvar", [Tree::Symbol(name)]) | ("const", [Tree::Symbol(name)]) => Ok(name.clone()),
        ("lasgn", [Tree::Symbol(name), value]) => Ok(format!("{} = {}", name, argument(value)?)),
        ("array", items) => Ok(format!("[{}]", arguments(items)?)),
        ("and", [lhs, rhs]) => binary(tree, lhs, "&&", rhs),
        ("or", [lhs, rhs]) => binary(tree, lhs, "||", rhs),
        ("not", [value]) => Ok(format!("!{}", operand(value)?)),
        ("call", _) => call(tree),
        ("iter", [target, params, body]) => iter(target, params, body),
        ("if", _) | ("block", _) => Ok(format!("({})", statement_inline(tree)?)),
        _ => Err(err_msg!(Unparse, "unsupported node: {}", tree)),
    }
}

fn statement_inline(tree: &Tree) -> Result<String, SpliceError> {
    if tree.has_tag("block") {
        inline_block(tree)
    } else {
        statement(tree)
    }
}

fn call(tree: &Tree) -> Result<String, SpliceError> {
    let name = message_name(tree).ok_or_else(|| err_msg!(Unparse, "call without a name: {}", tree))?;
    let args = argument_list(tree)
        .ok_or_else(|| err_msg!(Unparse, "call without an argument list: {}", tree))?;

    let Some(recv) = receiver(tree) else {
        return Ok(if args.is_empty() {
            name.to_string()
        } else {
            format!("{}({})", name, arguments(args)?)
        });
    };

    match (name, args) {
        ("-@", []) => {
            let inner = if recv.has_tag("lit") {
                format!("({})", expression(recv)?)
            } else {
                operand(recv)?
            };
            Ok(format!("-{}", inner))
        }
        ("[]", _) => Ok(format!("{}[{}]", postfix_operand(recv)?, arguments(args)?)),
        (op, [rhs]) if binary_precedence(op).is_some() => binary(tree, recv, op, rhs),
        (_, []) => Ok(format!("{}.{}", postfix_operand(recv)?, name)),
        _ => Ok(format!(
            "{}.{}({})",
            postfix_operand(recv)?,
            name,
            arguments(args)?
        )),
    }
}

fn iter(target: &Tree, params: &Tree, body: &Tree) -> Result<String, SpliceError> {
    let head = expression(target)?;
    let params = match params {
        Tree::Nil => String::new(),
        _ => {
            let names: Vec<&str> = params.rest().iter().filter_map(Tree::as_symbol).collect();
            format!("|{}| ", names.join(", "))
        }
    };
    let body_text = match body {
        Tree::Nil => String::new(),
        _ => statements(body)?,
    };
    if !body_text.contains('\n') {
        return Ok(format!("{} {{ {}{} }}", head, params, body_text));
    }
    let mut out = format!("{} do", head);
    if !params.is_empty() {
        out.push(' ');
        out.push_str(params.trim_end());
    }
    out.push('\n');
    push_body(&mut out, body)?;
    out.push_str("end");
    Ok(out)
}

fn arguments(args: &[Tree]) -> Result<String, SpliceError> {
    let parts = args
        .iter()
        .map(argument)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join(", "))
}

/// Any expression, with statements parenthesised.
fn argument(tree: &Tree) -> Result<String, SpliceError> {
    match tree.tag() {
        Some("if") | Some("block") => Ok(format!("({})", statement_inline(tree)?)),
        _ => expression(tree),
    }
}

// ============================================================================
// OPERATORS
// ============================================================================

fn binary(tree: &Tree, lhs: &Tree, op: &str, rhs: &Tree) -> Result<String, SpliceError> {
    let level = precedence(tree).unwrap_or(0);
    let left = match precedence(lhs) {
        Some(inner) if inner >= level => expression(lhs)?,
        _ => operand(lhs)?,
    };
    let right = match precedence(rhs) {
        Some(inner) if inner > level => expression(rhs)?,
        _ => operand(rhs)?,
    };
    Ok(format!("{} {} {}", left, op, right))
}

/// Renders `tree` as a self-contained operand, parenthesising anything
/// looser than a postfix expression.
fn operand(tree: &Tree) -> Result<String, SpliceError> {
    if is_compound(tree) || precedence(tree).is_some() {
        Ok(format!("({})", inner_text(tree)?))
    } else {
        expression(tree)
    }
}

fn postfix_operand(tree: &Tree) -> Result<String, SpliceError> {
    if tree.has_tag("not") || is_unary_minus(tree) {
        return Ok(format!("({})", expression(tree)?));
    }
    operand(tree)
}

fn inner_text(tree: &Tree) -> Result<String, SpliceError> {
    match tree.tag() {
        Some("if") | Some("block") => statement_inline(tree),
        _ => expression(tree),
    }
}

fn is_compound(tree: &Tree) -> bool {
    matches!(tree.tag(), Some("if" | "block" | "lasgn" | "iter"))
}

fn is_unary_minus(tree: &Tree) -> bool {
    tree.has_tag("call") && message_name(tree) == Some("-@")
}

/// Binding strength of an operator node; `None` for everything else.
fn precedence(tree: &Tree) -> Option<u8> {
    match tree.tag()? {
        "or" => Some(1),
        "and" => Some(2),
        "call" => {
            let args = argument_list(tree)?;
            receiver(tree)?;
            match args {
                [_] => binary_precedence(message_name(tree)?),
                _ => None,
            }
        }
        _ => None,
    }
}

fn binary_precedence(op: &str) -> Option<u8> {
    match op {
        "||" => Some(1),
        "&&" => Some(2),
        "==" | "!=" => Some(3),
        "<" | ">" | "<=" | ">=" => Some(4),
        "+" | "-" => Some(5),
        "*" | "/" | "%" => Some(6),
        _ => None,
    }
}

fn quote_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp;

    #[test]
    fn modifier_form_for_single_line_if() {
        let tree = sexp!(if (call nil a (arglist)) (call nil b (arglist)) nil);
        assert_eq!(unparse(&tree).unwrap(), "b if a");
    }

    #[test]
    fn full_form_with_else() {
        let tree = sexp!(if (lvar a) (lit 1) (lit 2));
        assert_eq!(unparse(&tree).unwrap(), "if a then\n  1\nelse\n  2\nend");
    }

    #[test]
    fn operator_grouping_is_preserved() {
        let sum = sexp!(call (lit 1) [+] (arglist (lit 1)));
        let product = Tree::node(
            "call",
            vec![sum.clone(), Tree::sym("*"), Tree::node("arglist", vec![sum])],
        );
        assert_eq!(unparse(&product).unwrap(), "(1 + 1) * (1 + 1)");
    }

    #[test]
    fn arguments_keep_their_grouping() {
        let sum = sexp!(call (lit 1) [+] (arglist (lit 1)));
        assert_eq!(unparse_argument(&sum).unwrap(), "(1 + 1)");
        assert_eq!(unparse_argument(&sexp!(lvar a)).unwrap(), "a");
    }

    #[test]
    fn statement_arguments_are_grouped() {
        let guarded = sexp!(if (lvar a) (lvar b) nil);
        assert_eq!(unparse_argument(&guarded).unwrap(), "(b if a)");
        let assign = Tree::node("lasgn", vec![Tree::sym("c"), Tree::node("lit", vec![Tree::int(1)])]);
        assert_eq!(unparse_argument(&assign).unwrap(), "(c = 1)");
        let block = sexp!(block (lvar a) (lvar b));
        assert_eq!(unparse_argument(&block).unwrap(), "(a; b)");
    }

    #[test]
    fn strings_are_escaped() {
        let tree = Tree::node("str", vec![Tree::string("say \"hi\"\n")]);
        assert_eq!(unparse(&tree).unwrap(), r#""say \"hi\"\n""#);
    }

    #[test]
    fn bare_atoms_are_rejected() {
        let err = unparse(&Tree::int(3)).unwrap_err();
        assert!(matches!(err, SpliceError::Unparse { .. }));
    }
}
