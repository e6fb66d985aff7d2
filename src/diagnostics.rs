//!
//! ****************************************************************************************
//! ** ERROR CONSTRUCTION RULES FOR Splice Error Macros (`err_msg!`, `err_ctx!`)           **
//! ****************************************************************************************
//!
//! # Overview
//!
//! This module defines the unified, `miette`-based diagnostic system for Splice. Every
//! failure produced while parsing host source, expanding macros, decoding markup, loading
//! expanded code or reading configuration is represented by [`SpliceError`].
//!
//! # Error Construction Macros
//!
//! - **Use `err_msg!` for simple, message-only errors.**
//!   - `err_msg!(Codec, "unknown element <{}>", name)`
//!
//! - **Use `err_ctx!` for errors with a named source and a span.**
//!   - `err_ctx!(Parse, "Syntax error", &src, span)`
//!   - `err_ctx!(Parse, "Syntax error", &src, span, help)`
//!
//! - **Use `err_src!` for errors with a pre-built `NamedSource` and related labels.**
//!
//! # Rules
//!
//! - Pass `src` as a `&SourceArc`; the macros clone the `Arc`.
//! - Always pass a `Span`, never a bare offset.
//! - Attach a cause with [`SpliceError::with_cause`] instead of flattening it to a string.
//!
//! ****************************************************************************************

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::Span;

pub type SourceArc = Arc<NamedSource<String>>;

type Cause = Option<Box<dyn std::error::Error + Send + Sync + 'static>>;

/// Type-safe error classification that mirrors the `SpliceError` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Malformed host source handed to the parser.
    Parse,
    /// A tree the unparser has no rendering for.
    Unparse,
    /// A macro rule failed while computing its replacement text.
    MacroInvocation,
    /// Malformed structural markup handed to the tree decoder.
    Codec,
    /// The loader rejected expanded code.
    Load,
    /// File system failures.
    Io,
    /// Unreadable or invalid configuration.
    Config,
    /// Broken engine invariants.
    Internal,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Parse => "Parse",
            ErrorType::Unparse => "Unparse",
            ErrorType::MacroInvocation => "MacroInvocation",
            ErrorType::Codec => "Codec",
            ErrorType::Load => "Load",
            ErrorType::Io => "Io",
            ErrorType::Config => "Config",
            ErrorType::Internal => "Internal",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single additional label for multi-span diagnostics.
#[derive(Debug)]
pub struct RelatedLabel {
    pub source: SourceArc,
    pub span: Span,
    pub label: String,
}

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default)]
pub struct ErrorContext {
    /// The primary source for this error (if any).
    pub source: Option<SourceArc>,
    /// The primary span for this error (if any).
    pub span: Option<Span>,
    /// An optional help message.
    pub help: Option<String>,
    /// Additional labeled spans for multi-label diagnostics.
    pub related: Vec<RelatedLabel>,
}

impl ErrorContext {
    /// Returns an empty error context (no source, span, or help).
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_source_and_span(source: SourceArc, span: Span) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            help: None,
            related: vec![],
        }
    }

    pub fn with_help(help: impl Into<String>) -> Self {
        Self {
            help: Some(help.into()),
            ..Self::default()
        }
    }
}

/// Unified error type for every Splice failure mode.
#[derive(Debug, Error)]
pub enum SpliceError {
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Unparse error: {message}")]
    Unparse {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Macro invocation error: {message}")]
    MacroInvocation {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Codec error: {message}")]
    Codec {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Load error: {message}")]
    Load {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("I/O error: {message}")]
    Io {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl SpliceError {
    fn get_ctx(&self) -> &ErrorContext {
        match self {
            SpliceError::Parse { ctx, .. }
            | SpliceError::Unparse { ctx, .. }
            | SpliceError::MacroInvocation { ctx, .. }
            | SpliceError::Codec { ctx, .. }
            | SpliceError::Load { ctx, .. }
            | SpliceError::Io { ctx, .. }
            | SpliceError::Config { ctx, .. }
            | SpliceError::Internal { ctx, .. } => ctx,
        }
    }

    fn get_ctx_mut(&mut self) -> &mut ErrorContext {
        match self {
            SpliceError::Parse { ctx, .. }
            | SpliceError::Unparse { ctx, .. }
            | SpliceError::MacroInvocation { ctx, .. }
            | SpliceError::Codec { ctx, .. }
            | SpliceError::Load { ctx, .. }
            | SpliceError::Io { ctx, .. }
            | SpliceError::Config { ctx, .. }
            | SpliceError::Internal { ctx, .. } => ctx,
        }
    }

    fn cause_slot(&mut self) -> &mut Cause {
        match self {
            SpliceError::Parse { source, .. }
            | SpliceError::Unparse { source, .. }
            | SpliceError::MacroInvocation { source, .. }
            | SpliceError::Codec { source, .. }
            | SpliceError::Load { source, .. }
            | SpliceError::Io { source, .. }
            | SpliceError::Config { source, .. }
            | SpliceError::Internal { source, .. } => source,
        }
    }

    /// The human-readable message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            SpliceError::Parse { message, .. }
            | SpliceError::Unparse { message, .. }
            | SpliceError::MacroInvocation { message, .. }
            | SpliceError::Codec { message, .. }
            | SpliceError::Load { message, .. }
            | SpliceError::Io { message, .. }
            | SpliceError::Config { message, .. }
            | SpliceError::Internal { message, .. } => message,
        }
    }

    /// Returns the type-safe error classification for this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            SpliceError::Parse { .. } => ErrorType::Parse,
            SpliceError::Unparse { .. } => ErrorType::Unparse,
            SpliceError::MacroInvocation { .. } => ErrorType::MacroInvocation,
            SpliceError::Codec { .. } => ErrorType::Codec,
            SpliceError::Load { .. } => ErrorType::Load,
            SpliceError::Io { .. } => ErrorType::Io,
            SpliceError::Config { .. } => ErrorType::Config,
            SpliceError::Internal { .. } => ErrorType::Internal,
        }
    }

    /// Chains `cause` underneath this error.
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        *self.cause_slot() = Some(Box::new(cause));
        self
    }

    /// Attaches a help message, replacing any previous one.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.get_ctx_mut().help = Some(help.into());
        self
    }

    /// Wraps an I/O failure on `path`.
    pub fn io(action: &str, path: &std::path::Path, err: std::io::Error) -> Self {
        crate::err_msg!(Io, "failed to {} '{}'", action, path.display()).with_cause(err)
    }
}

impl Diagnostic for SpliceError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let code = match self.error_type() {
            ErrorType::Parse => "splice::parse",
            ErrorType::Unparse => "splice::unparse",
            ErrorType::MacroInvocation => "splice::macro",
            ErrorType::Codec => "splice::codec",
            ErrorType::Load => "splice::load",
            ErrorType::Io => "splice::io",
            ErrorType::Config => "splice::config",
            ErrorType::Internal => "splice::internal",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.get_ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get_ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let ctx = self.get_ctx();
        let mut labels = Vec::new();
        if let Some(span) = ctx.span {
            labels.push(LabeledSpan::new(
                Some(self.message().to_string()),
                span.start,
                span.len().max(1),
            ));
        }
        for rel in &ctx.related {
            labels.push(LabeledSpan::new(
                Some(rel.label.clone()),
                rel.span.start,
                rel.span.len().max(1),
            ));
        }
        if labels.is_empty() {
            None
        } else {
            Some(Box::new(labels.into_iter()))
        }
    }
}

/// Converts a source string into an `Arc<NamedSource<String>>` for use in error contexts.
pub fn to_error_source<S: AsRef<str>>(name: &str, source: S) -> SourceArc {
    Arc::new(NamedSource::new(name, source.as_ref().to_string()))
}

/// Constructs a SpliceError variant with a formatted message and no context.
#[macro_export]
macro_rules! err_msg {
    ($variant:ident, $($fmt:tt)+) => {
        $crate::SpliceError::$variant {
            message: format!($($fmt)+),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
}

/// Constructs a SpliceError variant with a message, a named source, a span and an optional help text.
#[macro_export]
macro_rules! err_ctx {
    // Message, src, span, help
    ($variant:ident, $msg:expr, $src:expr, $span:expr, $help:expr) => {
        $crate::SpliceError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext {
                source: Some($crate::diagnostics::SourceArc::clone($src)),
                span: Some($span),
                help: Some(format!("{}", $help)),
                related: vec![],
            },
            source: None,
        }
    };
    // Message, src, span
    ($variant:ident, $msg:expr, $src:expr, $span:expr) => {
        $crate::SpliceError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext::with_source_and_span(
                $crate::diagnostics::SourceArc::clone($src),
                $span,
            ),
            source: None,
        }
    };
}

/// Constructs a SpliceError variant with a pre-built `NamedSource` and related labels.
#[macro_export]
macro_rules! err_src {
    ($variant:ident, $msg:expr, $source:expr, $span:expr, $related:expr) => {
        $crate::SpliceError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext {
                source: Some(std::sync::Arc::clone($source)),
                span: Some($span),
                help: None,
                related: $related,
            },
            source: None,
        }
    };
}
