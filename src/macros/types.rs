//! Core types shared by the registry and the expander.
//!
//! ## Error Handling
//!
//! Rules report failures as [`SpliceError`]; the expander wraps whatever a rule
//! returns in a `MacroInvocation` error naming the rule's key.
//!
//! ```rust
//! use splice::macros::bind_args;
//! let args = vec!["a".to_string()];
//! let err = bind_args::<2>("my_if", &args).unwrap_err();
//! assert!(matches!(err, splice::SpliceError::MacroInvocation { .. }));
//! ```

use std::rc::Rc;

use crate::ast::call::MacroKey;
use crate::ast::Tree;
use crate::macros::hygiene::Gensym;
use crate::syntax::Syntax;
use crate::{err_msg, SpliceError};

/// A rewrite rule: argument source texts in, replacement source text out.
pub type MacroRule = Rc<dyn Fn(&mut MacroContext<'_>, &[String]) -> Result<String, SpliceError>>;

/// Wraps a closure as a [`MacroRule`], pinning its signature.
pub fn rule<F>(f: F) -> MacroRule
where
    F: Fn(&mut MacroContext<'_>, &[String]) -> Result<String, SpliceError> + 'static,
{
    Rc::new(f)
}

/// One completed rule invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionStep {
    pub key: MacroKey,
    pub arguments: Vec<String>,
    pub output: String,
}

/// What a rule can reach while it runs: the session's name generator and the
/// syntax used to move between text and trees.
pub struct MacroContext<'a> {
    syntax: &'a dyn Syntax,
    gensym: &'a mut Gensym,
    trace: &'a mut Vec<ExpansionStep>,
}

impl<'a> MacroContext<'a> {
    pub fn new(
        syntax: &'a dyn Syntax,
        gensym: &'a mut Gensym,
        trace: &'a mut Vec<ExpansionStep>,
    ) -> Self {
        MacroContext {
            syntax,
            gensym,
            trace,
        }
    }

    pub fn syntax(&self) -> &dyn Syntax {
        self.syntax
    }

    /// A fresh name for `base`, absent from the session's source.
    pub fn gensym(&mut self, base: &str) -> String {
        self.gensym.gensym(base)
    }

    pub fn parse(&self, source: &str) -> Result<Tree, SpliceError> {
        self.syntax.parse(source)
    }

    pub fn unparse(&self, tree: &Tree) -> Result<String, SpliceError> {
        self.syntax.unparse(tree)
    }

    /// Parses one fragment, or several fragments into a single `block`.
    pub fn quote(&self, fragments: &[&str]) -> Result<Tree, SpliceError> {
        match fragments {
            [single] => self.parse(single),
            many => {
                let statements = many
                    .iter()
                    .map(|fragment| self.parse(fragment))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Tree::node("block", statements))
            }
        }
    }

    /// Unparses one tree, or several trees as a single `block`.
    pub fn unquote(&self, trees: &[Tree]) -> Result<String, SpliceError> {
        match trees {
            [single] => self.unparse(single),
            many => self.unparse(&Tree::node("block", many.to_vec())),
        }
    }

    /// Steps recorded so far in this session.
    pub fn trace(&self) -> &[ExpansionStep] {
        &self.trace[..]
    }

    pub(crate) fn record(&mut self, step: ExpansionStep) {
        self.trace.push(step);
    }
}

/// Checks that a rule received exactly `N` arguments and hands them out as an array.
pub fn bind_args<'s, const N: usize>(
    name: &str,
    args: &'s [String],
) -> Result<[&'s str; N], SpliceError> {
    if args.len() != N {
        return Err(err_msg!(
            MacroInvocation,
            "macro '{}' expects {} argument(s), got {}",
            name,
            N,
            args.len()
        ));
    }
    Ok(std::array::from_fn(|i| args[i].as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_args_checks_arity() {
        let args = vec!["a == 3".to_string(), "\"success\"".to_string()];
        let [cond, clause] = bind_args::<2>("my_if", &args).unwrap();
        assert_eq!(cond, "a == 3");
        assert_eq!(clause, "\"success\"");
        let err = bind_args::<1>("delay", &args).unwrap_err();
        assert!(err.message().contains("expects 1 argument(s), got 2"));
    }
}
