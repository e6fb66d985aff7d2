//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use splice::ast::Tree;
use splice::engine::MacroEngine;
use splice::macros::{
    bind_args, Export, MacroContext, MacroProvider, MacroRegistry, RegistryBuilder, StdMacros,
};
use splice::SpliceError;

/// The macro definitions the integration tests expand with.
///
/// `my_when` and `my_add` are type-scoped and called as `MacroDefs.my_when(..)`.
pub struct MacroDefs;

impl MacroDefs {
    fn my_if(&self, cx: &mut MacroContext<'_>, args: &[String]) -> Result<String, SpliceError> {
        let [condition, clause] = bind_args::<2>("my_if", args)?;
        let tree = Tree::node("if", vec![cx.parse(condition)?, cx.parse(clause)?, Tree::Nil]);
        cx.unparse(&tree)
    }

    fn time(&self, cx: &mut MacroContext<'_>, args: &[String]) -> Result<String, SpliceError> {
        let [code] = bind_args::<1>("time", args)?;
        let now = cx.gensym("now");
        Ok(format!("{now} = Time.now\n{code}\nTime.now - {now}"))
    }

    fn delay(&self, _cx: &mut MacroContext<'_>, args: &[String]) -> Result<String, SpliceError> {
        let [code] = bind_args::<1>("delay", args)?;
        Ok(format!("lambda {{ {} }}", code))
    }

    fn my_multiply(&self, _cx: &mut MacroContext<'_>, args: &[String]) -> Result<String, SpliceError> {
        let [a, b] = bind_args::<2>("my_multiply", args)?;
        Ok(format!("{} * {}", a, b))
    }

    fn progn(&self, cx: &mut MacroContext<'_>, args: &[String]) -> Result<String, SpliceError> {
        let fragments: Vec<&str> = args.iter().map(String::as_str).collect();
        let block = cx.quote(&fragments)?;
        cx.unquote(&[block])
    }

    fn my_when(_cx: &mut MacroContext<'_>, args: &[String]) -> Result<String, SpliceError> {
        let [test, body] = bind_args::<2>("my_when", args)?;
        Ok(format!("my_if({}, {})", test, body))
    }

    fn my_add(_cx: &mut MacroContext<'_>, args: &[String]) -> Result<String, SpliceError> {
        let [a, b] = bind_args::<2>("my_add", args)?;
        Ok(format!("{} + {}", a, b))
    }
}

impl MacroProvider for MacroDefs {
    fn type_name(&self) -> &str {
        "MacroDefs"
    }

    fn exports(&self) -> Vec<Export<Self>> {
        vec![
            Export::instance("my_if", Self::my_if),
            Export::instance("time", Self::time),
            Export::instance("delay", Self::delay),
            Export::instance("my_multiply", Self::my_multiply),
            Export::instance("progn", Self::progn),
            Export::type_scoped("my_when", Self::my_when),
            Export::type_scoped("my_add", Self::my_add),
        ]
    }
}

pub fn registry() -> MacroRegistry {
    RegistryBuilder::new().provider(MacroDefs).build()
}

pub fn engine() -> MacroEngine {
    MacroEngine::new(registry())
}

pub fn std_engine() -> MacroEngine {
    MacroEngine::new(RegistryBuilder::new().provider(StdMacros).build())
}

/// A fresh, empty directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("splice-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}
