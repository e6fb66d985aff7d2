//! Call-site introspection.
//!
//! A call site is a node shaped `(call receiver message (arglist args...))`.
//! Every accessor here answers `None`/`false` for trees of any other shape, so
//! callers can probe arbitrary sub-trees without checking the tag first.

use std::fmt;

use crate::ast::Tree;

/// Names the rule a call site would dispatch to.
///
/// `receiver` is `None` for instance-scoped rules and the provider's type name
/// for type-scoped ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacroKey {
    pub receiver: Option<String>,
    pub message: String,
}

impl MacroKey {
    pub fn global(message: impl Into<String>) -> Self {
        MacroKey {
            receiver: None,
            message: message.into(),
        }
    }

    pub fn scoped(receiver: impl Into<String>, message: impl Into<String>) -> Self {
        MacroKey {
            receiver: Some(receiver.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for MacroKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.receiver {
            Some(receiver) => write!(f, "{}.{}", receiver, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// The receiver of a call site, flattened where it has a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverName<'a> {
    /// No receiver.
    Global,
    /// A constant reference such as `Person`.
    Const(&'a str),
    /// Any other receiver expression; it has no flat name.
    Computed(&'a Tree),
}

pub fn is_call(tree: &Tree) -> bool {
    tree.has_tag("call")
}

/// The receiver slot of a call, or `None` when the tree is not a call or the
/// call has no receiver.
pub fn receiver(tree: &Tree) -> Option<&Tree> {
    if !is_call(tree) {
        return None;
    }
    tree.get(1).filter(|recv| !recv.is_nil())
}

pub fn message_name(tree: &Tree) -> Option<&str> {
    if !is_call(tree) {
        return None;
    }
    tree.get(2)?.as_symbol()
}

/// The argument sub-trees of a call, in source order.
pub fn argument_list(tree: &Tree) -> Option<&[Tree]> {
    if !is_call(tree) {
        return None;
    }
    let arglist = tree.get(3)?;
    if !arglist.has_tag("arglist") {
        return None;
    }
    Some(arglist.rest())
}

/// Same as [`argument_list`], empty for non-calls.
pub fn call_arguments(tree: &Tree) -> &[Tree] {
    argument_list(tree).unwrap_or(&[])
}

pub fn is_receiverless_call(tree: &Tree) -> bool {
    is_call(tree) && tree.get(1).map_or(false, Tree::is_nil)
}

pub fn is_constant_receiver_call(tree: &Tree) -> bool {
    is_call(tree) && tree.get(1).map_or(false, |recv| recv.has_tag("const"))
}

pub fn receiver_name(tree: &Tree) -> Option<ReceiverName<'_>> {
    if is_receiverless_call(tree) {
        return Some(ReceiverName::Global);
    }
    let recv = receiver(tree)?;
    if recv.has_tag("const") {
        if let Some(name) = recv.get(1).and_then(Tree::as_symbol) {
            return Some(ReceiverName::Const(name));
        }
    }
    Some(ReceiverName::Computed(recv))
}

/// Receiver name and message for any call, computed receivers included.
pub fn call_key(tree: &Tree) -> Option<(ReceiverName<'_>, &str)> {
    Some((receiver_name(tree)?, message_name(tree)?))
}

/// The registry key for global and constant-receiver calls.
pub fn macro_key(tree: &Tree) -> Option<MacroKey> {
    match call_key(tree)? {
        (ReceiverName::Global, message) => Some(MacroKey::global(message)),
        (ReceiverName::Const(name), message) => Some(MacroKey::scoped(name, message)),
        (ReceiverName::Computed(_), _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp;

    fn one_plus_one() -> Tree {
        sexp!(call (lit 1) [+] (arglist (lit 1)))
    }

    fn add_a_b() -> Tree {
        sexp!(call nil add (arglist (call nil a (arglist)) (call nil b (arglist))))
    }

    #[test]
    fn recognises_call_sites() {
        assert!(is_call(&one_plus_one()));
        assert!(!is_call(&sexp!(lasgn a (lit 3))));
        assert!(!is_call(&Tree::sym("call")));
    }

    #[test]
    fn receiver_of_calls() {
        assert_eq!(receiver(&one_plus_one()), Some(&sexp!(lit 1)));
        assert_eq!(receiver(&sexp!(lasgn a (lit 3))), None);
        assert_eq!(receiver(&add_a_b()), None);
    }

    #[test]
    fn message_of_calls() {
        assert_eq!(message_name(&one_plus_one()), Some("+"));
        assert_eq!(message_name(&sexp!(lasgn a (lit 3))), None);
        assert_eq!(message_name(&add_a_b()), Some("add"));
    }

    #[test]
    fn global_and_constant_calls() {
        assert!(!is_receiverless_call(&one_plus_one()));
        assert!(is_receiverless_call(&add_a_b()));
        let constant = sexp!(call (const Hello) hey (arglist (lit 3)));
        assert!(is_constant_receiver_call(&constant));
        assert!(!is_constant_receiver_call(&add_a_b()));
        assert!(!is_constant_receiver_call(&one_plus_one()));
    }

    #[test]
    fn receiver_names() {
        let constant = sexp!(call (const Person) hello (arglist));
        assert_eq!(receiver_name(&constant), Some(ReceiverName::Const("Person")));
        assert_eq!(receiver_name(&add_a_b()), Some(ReceiverName::Global));
        let computed = sexp!(call (call nil abc (arglist)) add (arglist));
        assert_eq!(
            receiver_name(&computed),
            Some(ReceiverName::Computed(&sexp!(call nil abc (arglist))))
        );
        assert_eq!(receiver_name(&Tree::int(1)), None);
    }

    #[test]
    fn macro_key_and_arguments_of_global_call() {
        let tree = add_a_b();
        assert_eq!(macro_key(&tree), Some(MacroKey::global("add")));
        assert_eq!(
            argument_list(&tree),
            Some(&[sexp!(call nil a (arglist)), sexp!(call nil b (arglist))][..])
        );
    }

    #[test]
    fn computed_receivers_have_no_macro_key() {
        let tree = sexp!(call (call nil abc (arglist)) add (arglist (lit 1)));
        assert_eq!(macro_key(&tree), None);
        assert!(call_key(&tree).is_some());
        assert_eq!(call_arguments(&sexp!(lit 1)), &[] as &[Tree]);
    }

    #[test]
    fn key_display() {
        assert_eq!(MacroKey::global("my_if").to_string(), "my_if");
        assert_eq!(MacroKey::scoped("MacroDefs", "my_add").to_string(), "MacroDefs.my_add");
    }
}
