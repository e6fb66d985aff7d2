//! # Splice
//!
//! Lisp-style macros for a host language. Source text is parsed into a
//! [`Tree`], every call site whose key names a registered rule is replaced by
//! the parsed output of that rule, and the rewritten tree is turned back into
//! source for a caller-supplied loader.
//!
//! ```rust
//! use splice::engine::MacroEngine;
//! use splice::macros::{RegistryBuilder, StdMacros};
//!
//! let mut engine = MacroEngine::new(RegistryBuilder::new().provider(StdMacros).build());
//! let expanded = engine.expand_session("delay(work)").unwrap();
//! assert_eq!(expanded, "lambda { work }");
//! ```

pub use crate::ast::{Span, Tree};
pub use crate::diagnostics::{ErrorContext, ErrorType, SpliceError};

pub mod ast;
pub mod cli;
pub mod code;
pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod macros;
pub mod syntax;
