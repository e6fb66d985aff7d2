//! # Splice Macro System
//!
//! Macros are named rewrite rules applied to a parsed tree. A rule receives
//! the source text of each argument at a call site and returns replacement
//! source text, which is parsed and spliced in place of the call.
//!
//! ## Core Principles
//!
//! - **Textual interface**: rules see and produce source text; trees stay an
//!   implementation detail of the expander.
//! - **Explicit registration**: providers export their rules through
//!   [`MacroProvider::exports`]; nothing is discovered at runtime.
//! - **Fixpoint expansion**: the expander keeps rewriting until no call in
//!   the tree matches a registered key.
//! - **Session hygiene**: [`Gensym`] hands out names absent from the source
//!   being expanded.
//!
//! ## Termination
//!
//! A rule whose output always contains another call to itself never reaches a
//! fixpoint. This is not detected; rule authors must avoid it.

pub mod expander;
pub mod hygiene;
pub mod registry;
pub mod std;
pub mod types;

pub use expander::{expand, expand_call, expandable};
pub use hygiene::{find_absent_counter_name, Gensym};
pub use registry::{Export, MacroProvider, MacroRegistry, RegistryBuilder, Scope};
pub use self::std::StdMacros;
pub use types::{bind_args, rule, ExpansionStep, MacroContext, MacroRule};
