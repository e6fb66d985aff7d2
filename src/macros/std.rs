//! Standard macro library.
//!
//! `StdMacros` is an ordinary [`MacroProvider`]; register it like any other:
//!
//! ```rust
//! use splice::macros::{RegistryBuilder, StdMacros};
//! let registry = RegistryBuilder::new().provider(StdMacros).build();
//! assert_eq!(registry.len(), 5);
//! ```

use crate::ast::call::{is_call, message_name};
use crate::ast::rewrite::{replace, replace_with_tag};
use crate::ast::Tree;
use crate::macros::registry::{Export, MacroProvider};
use crate::macros::types::{bind_args, MacroContext};
use crate::{err_msg, SpliceError};

// ===================================================================================================
// PROVIDER
// ===================================================================================================

/// Built-in macros, type name `Std`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdMacros;

impl MacroProvider for StdMacros {
    fn type_name(&self) -> &str {
        "Std"
    }

    fn exports(&self) -> Vec<Export<Self>> {
        vec![
            Export::instance("destructuring_bind", Self::destructuring_bind),
            Export::instance("ntimes", Self::ntimes),
            Export::instance("time", Self::time),
            Export::instance("delay", Self::delay),
            Export::instance("progn", Self::progn),
        ]
    }
}

// ===================================================================================================
// RULES
// ===================================================================================================

impl StdMacros {
    /// `destructuring_bind([a, [b, _], c], seq)` binds each named position of
    /// the template to the matching element of `seq`. `_` skips a position.
    fn destructuring_bind(
        &self,
        cx: &mut MacroContext<'_>,
        args: &[String],
    ) -> Result<String, SpliceError> {
        let [template, sequence] = bind_args::<2>("destructuring_bind", args)?;
        let pattern = binding_pattern(cx.parse(template)?);

        let mut bindings = Vec::new();
        collect_bindings(&pattern, &mut Vec::new(), &mut bindings)?;

        let array = cx.gensym("array");
        let mut code = format!("{} = {}\n", array, sequence);
        for (name, path) in bindings {
            let index: String = path.iter().map(|i| format!("[{}]", i)).collect();
            code.push_str(&format!("{} = {}{}\n", name, array, index));
        }
        Ok(code)
    }

    /// `ntimes(n, body)` runs `body` `n` times.
    fn ntimes(&self, _cx: &mut MacroContext<'_>, args: &[String]) -> Result<String, SpliceError> {
        let [count, body] = bind_args::<2>("ntimes", args)?;
        Ok(format!("{}.times do\n{}\nend", count, body))
    }

    /// `time(code)` evaluates `code` and yields the elapsed time.
    fn time(&self, cx: &mut MacroContext<'_>, args: &[String]) -> Result<String, SpliceError> {
        let [code] = bind_args::<1>("time", args)?;
        let now = cx.gensym("now");
        Ok(format!("{now} = Time.now\n{code}\nTime.now - {now}"))
    }

    fn delay(&self, _cx: &mut MacroContext<'_>, args: &[String]) -> Result<String, SpliceError> {
        let [code] = bind_args::<1>("delay", args)?;
        Ok(format!("lambda {{ {} }}", code))
    }

    /// `progn(a, b, c)` sequences its arguments as one block.
    fn progn(&self, cx: &mut MacroContext<'_>, args: &[String]) -> Result<String, SpliceError> {
        let fragments: Vec<&str> = args.iter().map(String::as_str).collect();
        let block = cx.quote(&fragments)?;
        cx.unparse(&block)
    }
}

// ===================================================================================================
// DESTRUCTURING HELPERS
// ===================================================================================================

/// Turns `[a, [b, c]]` into the bare nested list `(a (b c))`.
fn binding_pattern(template: Tree) -> Tree {
    let names = replace(
        template,
        |t| is_call(t) || t.has_tag("lvar"),
        |t| {
            let name = if is_call(&t) {
                message_name(&t).map(str::to_string)
            } else {
                t.get(1).and_then(Tree::as_symbol).map(str::to_string)
            };
            name.map(Tree::Symbol).unwrap_or(t)
        },
    );
    replace_with_tag(names, "array", |t| Tree::List(t.rest().to_vec()))
}

fn collect_bindings(
    pattern: &Tree,
    path: &mut Vec<usize>,
    out: &mut Vec<(String, Vec<usize>)>,
) -> Result<(), SpliceError> {
    let items = pattern
        .items()
        .ok_or_else(|| err_msg!(MacroInvocation, "destructuring template must be an array"))?;
    for (index, item) in items.iter().enumerate() {
        path.push(index);
        match item {
            Tree::Symbol(name) if name == "_" => {}
            Tree::Symbol(name) => out.push((name.clone(), path.clone())),
            Tree::List(_) => collect_bindings(item, path, out)?,
            other => {
                return Err(err_msg!(
                    MacroInvocation,
                    "cannot bind to '{}' in a destructuring template",
                    other
                ))
            }
        }
        path.pop();
    }
    Ok(())
}
