//! Expansion sessions.
//!
//! [`MacroEngine`] ties a [`Syntax`], a [`MacroRegistry`] and the session state
//! (gensym counters and the expansion trace) together:
//!
//! ```text
//! source ──parse──▶ Tree ──expand──▶ Tree ──unparse──▶ source ──▶ Loader
//! ```
//!
//! A session starts with [`MacroEngine::expand_session`] or
//! [`MacroEngine::require_with_macro`]; both reset the gensym against the
//! session's source so generated names never collide with names in it.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::ast::Tree;
use crate::config::EngineConfig;
use crate::macros::{expand, ExpansionStep, Gensym, MacroContext, MacroRegistry};
use crate::syntax::{HostSyntax, Syntax};
use crate::{err_msg, SpliceError};

// ============================================================================
// LOADER
// ============================================================================

/// Consumes expanded source text. `path` is set when the text was written
/// to disk first.
pub trait Loader<V> {
    fn load(&mut self, source: &str, path: Option<&Path>) -> Result<V, SpliceError>;
}

impl<V, F> Loader<V> for F
where
    F: FnMut(&str, Option<&Path>) -> Result<V, SpliceError>,
{
    fn load(&mut self, source: &str, path: Option<&Path>) -> Result<V, SpliceError> {
        self(source, path)
    }
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct MacroEngine<S: Syntax = HostSyntax> {
    syntax: S,
    registry: MacroRegistry,
    gensym: Gensym,
    trace: Vec<ExpansionStep>,
    config: EngineConfig,
}

impl MacroEngine<HostSyntax> {
    pub fn new(registry: MacroRegistry) -> Self {
        Self::with_syntax(HostSyntax::new(), registry)
    }
}

impl<S: Syntax> MacroEngine<S> {
    pub fn with_syntax(syntax: S, registry: MacroRegistry) -> Self {
        MacroEngine {
            syntax,
            registry,
            gensym: Gensym::new(),
            trace: Vec::new(),
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn syntax(&self) -> &S {
        &self.syntax
    }

    pub fn registry(&self) -> &MacroRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut MacroRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn gensym(&mut self) -> &mut Gensym {
        &mut self.gensym
    }

    /// Steps of the current session, in the order rules ran.
    pub fn trace(&self) -> &[ExpansionStep] {
        &self.trace
    }

    pub fn expand_tree(&mut self, tree: Tree) -> Result<Tree, SpliceError> {
        let mut cx = MacroContext::new(&self.syntax, &mut self.gensym, &mut self.trace);
        expand(tree, &self.registry, &mut cx)
    }

    /// Parses, expands and unparses `source` within the current session.
    pub fn macro_expand(&mut self, source: &str) -> Result<String, SpliceError> {
        self.macro_expand_named("<source>", source)
    }

    pub fn macro_expand_named(&mut self, name: &str, source: &str) -> Result<String, SpliceError> {
        let tree = self.syntax.parse_named(name, source)?;
        let expanded = self.expand_tree(tree)?;
        self.syntax.unparse(&expanded)
    }

    /// Starts a new session seeded with `source`, then expands it.
    pub fn expand_session(&mut self, source: &str) -> Result<String, SpliceError> {
        self.expand_session_named("<source>", source)
    }

    pub fn expand_session_named(&mut self, name: &str, source: &str) -> Result<String, SpliceError> {
        self.begin_session(source);
        let expanded = self.macro_expand_named(name, source)?;
        log::info!("expanded {} ({} step(s))", name, self.trace.len());
        Ok(expanded)
    }

    fn begin_session(&mut self, source: &str) {
        self.trace.clear();
        self.gensym.reset(source);
    }

    /// True when `code` expands to the same tree `expected` parses to.
    pub fn expansion_equal(&mut self, expected: &str, code: &str) -> Result<bool, SpliceError> {
        let expected = self.syntax.parse(expected)?;
        let expanded = self.macro_expand(code)?;
        Ok(expected == self.syntax.parse(&expanded)?)
    }

    /// Reads and expands one file in a fresh session.
    pub fn expand_file(&mut self, path: &Path) -> Result<String, SpliceError> {
        let source = fs::read_to_string(path).map_err(|e| SpliceError::io("read", path, e))?;
        self.expand_session_named(&path.display().to_string(), &source)
    }

    /// Expands `path` and writes the result next to it under the configured
    /// prefix. Returns the written path and the expanded text.
    pub fn write_expanded(&mut self, path: &Path) -> Result<(PathBuf, String), SpliceError> {
        let expanded = self.expand_file(path)?;
        let file_name = path
            .file_name()
            .ok_or_else(|| err_msg!(Io, "'{}' does not name a file", path.display()))?;
        let target = path.with_file_name(format!(
            "{}{}",
            self.config.expanded_prefix,
            file_name.to_string_lossy()
        ));
        fs::write(&target, &expanded).map_err(|e| SpliceError::io("write", &target, e))?;
        log::info!("wrote {}", target.display());
        Ok((target, expanded))
    }

    /// Finds `file_name` on the load path, expands it into a sibling file and
    /// hands the expanded text to `loader`.
    ///
    /// The configured extension is appended when `file_name` has none. The
    /// expanded file is removed afterwards unless `keep_expanded` is set, even
    /// when the loader fails.
    pub fn require_with_macro<V, L>(&mut self, file_name: &str, loader: &mut L) -> Result<V, SpliceError>
    where
        L: Loader<V> + ?Sized,
    {
        let name = self.config.source_file_name(file_name);
        let path = search_file(&self.config.load_path, &name)
            .into_iter()
            .next()
            .ok_or_else(|| {
                let dirs: Vec<_> = self
                    .config
                    .load_path
                    .iter()
                    .map(|d| d.display().to_string())
                    .collect();
                err_msg!(Load, "cannot find '{}' on the load path", name)
                    .with_help(format!("searched: {}", dirs.join(", ")))
            })?;
        log::info!("requiring {}", path.display());

        let (target, expanded) = self.write_expanded(&path)?;
        let loaded = loader.load(&expanded, Some(&target));
        let cleanup = if self.config.keep_expanded {
            Ok(())
        } else {
            fs::remove_file(&target).map_err(|e| SpliceError::io("remove", &target, e))
        };
        let value = loaded?;
        cleanup?;
        Ok(value)
    }
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Every existing `dir/name` across `dirs`, in load-path order.
pub fn search_file(dirs: &[PathBuf], name: &str) -> Vec<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(name))
        .filter(|candidate| candidate.is_file())
        .collect()
}

/// Recursively collects files under `root` with `extension`, sorted, leaving
/// out files whose name starts with `skip_prefix`.
pub fn discover_sources(
    root: &Path,
    extension: &str,
    skip_prefix: &str,
) -> Result<Vec<PathBuf>, SpliceError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry =
            entry.map_err(|e| err_msg!(Io, "failed to walk '{}'", root.display()).with_cause(e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().map_or(true, |ext| ext != extension) {
            continue;
        }
        let generated = path
            .file_name()
            .map_or(false, |n| !skip_prefix.is_empty() && n.to_string_lossy().starts_with(skip_prefix));
        if generated {
            continue;
        }
        files.push(path.to_path_buf());
    }
    files.sort();
    Ok(files)
}
