//! Tree module for Splice
//!
//! This module provides the universal syntax representation every other
//! component operates on: a tree of atoms and tagged nodes, independent of the
//! host language the tree was parsed from.

// ============================================================================
// IMPORTS
// ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Represents a span in source text.
///
/// Trees carry no spans; spans only locate diagnostics in the text a tree was
/// parsed from.
///
/// # Examples
///
/// ```rust
/// use splice::ast::Span;
/// let span = Span { start: 0, end: 5 };
/// assert_eq!(span.len(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The universal syntax value: an atom or a node.
///
/// A node (`List`) is an ordered sequence whose first element is
/// conventionally a tag symbol naming the construct, e.g. `call` or `if`.
/// Valid input never contains an empty node.
///
/// # Examples
///
/// ```rust
/// use splice::ast::Tree;
/// let call = Tree::node("call", vec![Tree::Nil, Tree::sym("hello"), Tree::node("arglist", vec![])]);
/// assert_eq!(call.tag(), Some("call"));
/// assert_eq!(call.pretty(), "(call nil hello (arglist))");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tree {
    Symbol(String),
    Str(String),
    Int(i64),
    Bool(bool),
    Nil,
    List(Vec<Tree>),
}

/// The runtime kind of a tree, as named by the structural codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    Symbol,
    Str,
    Int,
    Bool,
    Nil,
    List,
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Tree {
    pub fn sym(name: impl Into<String>) -> Self {
        Tree::Symbol(name.into())
    }

    pub fn string(text: impl Into<String>) -> Self {
        Tree::Str(text.into())
    }

    pub fn int(value: i64) -> Self {
        Tree::Int(value)
    }

    pub fn list(items: Vec<Tree>) -> Self {
        Tree::List(items)
    }

    /// Builds a node whose first element is the tag symbol.
    pub fn node(tag: &str, children: Vec<Tree>) -> Self {
        let mut items = Vec::with_capacity(children.len() + 1);
        items.push(Tree::sym(tag));
        items.extend(children);
        Tree::List(items)
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Tree::List(_))
    }

    pub fn is_atom(&self) -> bool {
        !self.is_node()
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Tree::Nil)
    }

    pub fn kind(&self) -> TreeKind {
        match self {
            Tree::Symbol(_) => TreeKind::Symbol,
            Tree::Str(_) => TreeKind::Str,
            Tree::Int(_) => TreeKind::Int,
            Tree::Bool(_) => TreeKind::Bool,
            Tree::Nil => TreeKind::Nil,
            Tree::List(_) => TreeKind::List,
        }
    }

    /// All elements of a node, tag included.
    pub fn items(&self) -> Option<&[Tree]> {
        match self {
            Tree::List(items) => Some(items),
            _ => None,
        }
    }

    /// The tag of a node whose first element is a symbol.
    pub fn tag(&self) -> Option<&str> {
        self.items()?.first()?.as_symbol()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag() == Some(tag)
    }

    /// The elements after the first one; empty for atoms and single-element nodes.
    ///
    /// ```rust
    /// use splice::sexp;
    /// let tree = sexp!(array 1 2);
    /// assert_eq!(tree.rest(), &[sexp!(1), sexp!(2)]);
    /// ```
    pub fn rest(&self) -> &[Tree] {
        match self {
            Tree::List(items) if !items.is_empty() => &items[1..],
            _ => &[],
        }
    }

    /// Element `index` of a node.
    pub fn get(&self, index: usize) -> Option<&Tree> {
        self.items()?.get(index)
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Tree::Symbol(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Tree::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Pretty-prints the tree as an s-expression.
    ///
    /// Symbols print bare, strings quoted, the none atom as `nil`.
    pub fn pretty(&self) -> String {
        match self {
            Tree::Symbol(name) => name.clone(),
            Tree::Str(text) => format!("{:?}", text),
            Tree::Int(value) => value.to_string(),
            Tree::Bool(value) => value.to_string(),
            Tree::Nil => "nil".to_string(),
            Tree::List(items) => Self::pretty_list(items),
        }
    }

    // ------------------------------------------------------------------------
    // Pretty-printing helpers
    // ------------------------------------------------------------------------

    fn pretty_list(items: &[Tree]) -> String {
        let inner = items
            .iter()
            .map(Tree::pretty)
            .collect::<Vec<_>>()
            .join(" ");
        format!("({})", inner)
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty())
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<i64> for Tree {
    fn from(value: i64) -> Self {
        Tree::Int(value)
    }
}

impl From<i32> for Tree {
    fn from(value: i32) -> Self {
        Tree::Int(i64::from(value))
    }
}

impl From<bool> for Tree {
    fn from(value: bool) -> Self {
        Tree::Bool(value)
    }
}

impl From<&str> for Tree {
    fn from(text: &str) -> Self {
        Tree::Str(text.to_string())
    }
}

impl From<String> for Tree {
    fn from(text: String) -> Self {
        Tree::Str(text)
    }
}

impl From<Vec<Tree>> for Tree {
    fn from(items: Vec<Tree>) -> Self {
        Tree::List(items)
    }
}

// ============================================================================
// BUILDER MACRO
// ============================================================================

/// Builds a [`Tree`] from s-expression tokens.
///
/// Identifiers become symbols, `nil` the none atom, literals their atoms,
/// parenthesised groups nested nodes, and `[op]` an operator symbol.
///
/// ```rust
/// use splice::{sexp, ast::Tree};
/// let tree = sexp!(call (lvar a) [==] (arglist (lit 3)));
/// assert_eq!(tree.get(2), Some(&Tree::sym("==")));
/// assert_eq!(sexp!(nil), Tree::Nil);
/// ```
#[macro_export]
macro_rules! sexp {
    (nil) => {
        $crate::ast::Tree::Nil
    };
    (($($inner:tt)*)) => {
        $crate::ast::Tree::List(vec![$($crate::sexp!($inner)),*])
    };
    ([$op:tt]) => {
        $crate::ast::Tree::Symbol(stringify!($op).to_string())
    };
    ($lit:literal) => {
        $crate::ast::Tree::from($lit)
    };
    ($name:ident) => {
        $crate::ast::Tree::Symbol(stringify!($name).to_string())
    };
    ($($inner:tt)+) => {
        $crate::ast::Tree::List(vec![$($crate::sexp!($inner)),+])
    };
}

// ============================================================================
// MODULE EXPORTS
// ============================================================================

pub mod call;
pub mod rewrite;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_and_rest_of_a_node() {
        let tree = sexp!(lasgn a (lit 3));
        assert_eq!(tree.tag(), Some("lasgn"));
        assert_eq!(tree.rest(), &[Tree::sym("a"), sexp!(lit 3)]);
        assert!(tree.is_node());
    }

    #[test]
    fn atoms_have_no_tag() {
        assert_eq!(Tree::int(3).tag(), None);
        assert!(Tree::Nil.rest().is_empty());
        assert_eq!(Tree::Nil.kind(), TreeKind::Nil);
    }

    #[test]
    fn node_without_symbol_head_has_no_tag() {
        let tree = sexp!(1 2 (3 4));
        assert_eq!(tree.tag(), None);
        assert_eq!(tree.pretty(), "(1 2 (3 4))");
    }

    #[test]
    fn macro_builds_literals() {
        assert_eq!(sexp!("hi"), Tree::Str("hi".to_string()));
        assert_eq!(sexp!(true), Tree::Bool(true));
        assert_eq!(sexp!(-4), Tree::Int(-4));
        assert_eq!(sexp!((arglist)), Tree::node("arglist", vec![]));
    }

    #[test]
    fn pretty_quotes_strings() {
        let tree = sexp!(str "say \"hi\"");
        assert_eq!(tree.to_string(), r#"(str "say \"hi\"")"#);
    }
}
