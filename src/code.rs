//! A tree bundled with its lazily rendered forms.
//!
//! [`Code`] is what macro authors and embedders pass around when they want
//! to move between source text, trees and markup without re-rendering the
//! same tree twice.

use std::fmt;

use once_cell::unsync::OnceCell;

use crate::ast::Tree;
use crate::codec;
use crate::engine::Loader;
use crate::syntax::Syntax;
use crate::SpliceError;

pub struct Code {
    tree: Tree,
    // Cached on first `to_source`; the syntax used then wins.
    source: OnceCell<String>,
    markup: OnceCell<String>,
}

impl Code {
    pub fn from_tree(tree: Tree) -> Self {
        Code {
            tree,
            source: OnceCell::new(),
            markup: OnceCell::new(),
        }
    }

    /// Parses `source`, keeping the text as the cached rendering.
    pub fn from_source(syntax: &dyn Syntax, source: &str) -> Result<Self, SpliceError> {
        let tree = syntax.parse(source)?;
        Ok(Code {
            tree,
            source: OnceCell::with_value(source.to_string()),
            markup: OnceCell::new(),
        })
    }

    /// Parses each fragment and joins the statements in one `block`.
    pub fn block_from_sources(syntax: &dyn Syntax, sources: &[&str]) -> Result<Self, SpliceError> {
        let statements = sources
            .iter()
            .map(|source| syntax.parse(source))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_tree(Tree::node("block", statements)))
    }

    pub fn from_markup(markup: &str) -> Result<Self, SpliceError> {
        let tree = codec::decode(markup)?;
        Ok(Code {
            tree,
            source: OnceCell::new(),
            markup: OnceCell::with_value(markup.to_string()),
        })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    pub fn to_source(&self, syntax: &dyn Syntax) -> Result<&str, SpliceError> {
        self.source
            .get_or_try_init(|| syntax.unparse(&self.tree))
            .map(String::as_str)
    }

    pub fn to_markup(&self) -> &str {
        self.markup.get_or_init(|| codec::encode(&self.tree))
    }

    /// Renders the tree and hands the text to `loader`.
    pub fn evaluate<V, L>(&self, syntax: &dyn Syntax, loader: &mut L) -> Result<V, SpliceError>
    where
        L: Loader<V> + ?Sized,
    {
        let source = self.to_source(syntax)?;
        loader.load(source, None)
    }
}

impl PartialEq for Code {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl Eq for Code {}

impl Clone for Code {
    fn clone(&self) -> Self {
        Code {
            tree: self.tree.clone(),
            source: self.source.clone(),
            markup: self.markup.clone(),
        }
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Code").field("tree", &self.tree).finish()
    }
}

impl From<Tree> for Code {
    fn from(tree: Tree) -> Self {
        Code::from_tree(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp;
    use crate::syntax::HostSyntax;

    #[test]
    fn source_is_kept_verbatim() {
        let syntax = HostSyntax::new();
        let code = Code::from_source(&syntax, "a  +  1").unwrap();
        assert_eq!(code.to_source(&syntax).unwrap(), "a  +  1");
        assert_eq!(
            code.tree(),
            &sexp!(call (call nil a (arglist)) [+] (arglist (lit 1)))
        );
    }

    #[test]
    fn equality_ignores_rendering() {
        let syntax = HostSyntax::new();
        let spaced = Code::from_source(&syntax, "a  +  1").unwrap();
        let tight = Code::from_source(&syntax, "a + 1").unwrap();
        assert_eq!(spaced, tight);
    }

    #[test]
    fn block_from_sources_joins_statements() {
        let syntax = HostSyntax::new();
        let code = Code::block_from_sources(&syntax, &["a = 1", "a"]).unwrap();
        assert!(code.tree().has_tag("block"));
        assert_eq!(code.tree().rest().len(), 2);
        assert_eq!(code.to_source(&syntax).unwrap(), "a = 1\na");
    }

    #[test]
    fn markup_round_trips_through_facade() {
        let code = Code::from_tree(sexp!(lit 1));
        let again = Code::from_markup(code.to_markup()).unwrap();
        assert_eq!(code, again);
    }

    #[test]
    fn evaluate_hands_rendered_source_to_loader() {
        let syntax = HostSyntax::new();
        let code = Code::from_tree(sexp!(lit 42));
        let mut loader = |source: &str, path: Option<&std::path::Path>| {
            assert!(path.is_none());
            Ok::<_, SpliceError>(source.len())
        };
        assert_eq!(code.evaluate(&syntax, &mut loader).unwrap(), 2);
    }
}
