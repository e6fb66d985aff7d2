//! Host syntax.
//!
//! The macro system only needs two services from a host language: text to
//! tree and tree to text. [`Syntax`] is that seam; [`HostSyntax`] is the
//! built-in implementation for a small Ruby-flavoured expression language.

pub mod parser;
pub mod unparser;

use crate::ast::Tree;
use crate::SpliceError;

/// Parser and unparser for one host language.
///
/// Implementations must round-trip: `parse(unparse(t)?)?` yields a tree that
/// unparses to the same text.
pub trait Syntax {
    fn parse_named(&self, name: &str, source: &str) -> Result<Tree, SpliceError>;

    fn parse(&self, source: &str) -> Result<Tree, SpliceError> {
        self.parse_named("<source>", source)
    }

    fn unparse(&self, tree: &Tree) -> Result<String, SpliceError>;

    /// Text handed to a macro rule for one argument.
    fn unparse_argument(&self, tree: &Tree) -> Result<String, SpliceError> {
        self.unparse(tree)
    }
}

/// The built-in host language.
///
/// ```rust
/// use splice::syntax::{HostSyntax, Syntax};
/// let syntax = HostSyntax::new();
/// let tree = syntax.parse("my_if(a == 3, \"success\")").unwrap();
/// assert_eq!(syntax.unparse(&tree).unwrap(), "my_if(a == 3, \"success\")");
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct HostSyntax;

impl HostSyntax {
    pub fn new() -> Self {
        HostSyntax
    }
}

impl Syntax for HostSyntax {
    fn parse_named(&self, name: &str, source: &str) -> Result<Tree, SpliceError> {
        parser::parse(name, source)
    }

    fn unparse(&self, tree: &Tree) -> Result<String, SpliceError> {
        unparser::unparse(tree)
    }

    fn unparse_argument(&self, tree: &Tree) -> Result<String, SpliceError> {
        unparser::unparse_argument(tree)
    }
}
