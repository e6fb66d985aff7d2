//! Expansion engine.
//!
//! Expansion rewrites every expandable call site innermost first until no
//! expandable call remains anywhere in the tree:
//!
//! - arguments are expanded before the rule sees their source text,
//! - a rule's output is re-scanned, so macros may expand into macro calls,
//! - the first failing rule aborts the whole expansion.
//!
//! ## Error Handling
//!
//! A failing rule, or a rule whose output does not parse, surfaces as
//! `SpliceError::MacroInvocation` naming the macro key, with the underlying
//! error attached as its source.

use crate::ast::call::{
    call_arguments, is_constant_receiver_call, is_receiverless_call, macro_key,
};
use crate::ast::rewrite::try_depth_first_exhaustive_collect;
use crate::ast::Tree;
use crate::macros::registry::MacroRegistry;
use crate::macros::types::{ExpansionStep, MacroContext};
use crate::{err_msg, SpliceError};

/// True for global or constant-receiver calls whose key has a registered rule.
pub fn expandable(tree: &Tree, registry: &MacroRegistry) -> bool {
    if !(is_receiverless_call(tree) || is_constant_receiver_call(tree)) {
        return false;
    }
    macro_key(tree).map_or(false, |key| registry.contains(&key))
}

/// Expands `tree` to a fixpoint.
///
/// Trees without expandable calls come back unchanged.
pub fn expand(
    tree: Tree,
    registry: &MacroRegistry,
    cx: &mut MacroContext<'_>,
) -> Result<Tree, SpliceError> {
    try_depth_first_exhaustive_collect(
        tree,
        |t| expandable(t, registry),
        |call| expand_call(&call, registry, cx),
    )
}

/// Runs the rule for one call site and parses its output.
pub fn expand_call(
    call: &Tree,
    registry: &MacroRegistry,
    cx: &mut MacroContext<'_>,
) -> Result<Tree, SpliceError> {
    let key = macro_key(call)
        .ok_or_else(|| err_msg!(Internal, "not a macro call site: {}", call))?;
    let rule = registry
        .lookup(&key)
        .cloned()
        .ok_or_else(|| err_msg!(Internal, "no rule registered for '{}'", key))?;

    let arguments = call_arguments(call)
        .iter()
        .map(|arg| cx.syntax().unparse_argument(arg))
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("expanding '{}' with {} argument(s)", key, arguments.len());
    log::trace!("'{}' arguments: {:?}", key, arguments);

    let output = rule(&mut *cx, &arguments).map_err(|err| {
        err_msg!(MacroInvocation, "macro '{}' failed", key).with_cause(err)
    })?;
    let expanded = cx.parse(&output).map_err(|err| {
        err_msg!(MacroInvocation, "macro '{}' produced code that does not parse", key)
            .with_help(format!("generated code:\n{}", output))
            .with_cause(err)
    })?;

    cx.record(ExpansionStep {
        key,
        arguments,
        output,
    });
    Ok(expanded)
}
