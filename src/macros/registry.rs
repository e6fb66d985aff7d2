//! Macro registry for storage and lookup of rewrite rules.
//!
//! Rules are registered explicitly by [`MacroProvider`]s. A provider exports
//! two kinds of rule:
//!
//! - **Instance rules** run against the provider value they were exported
//!   from and are keyed `(None, name)`.
//! - **Type-scoped rules** take no receiver value and are keyed
//!   `(Some(type_name), name)`, so they match calls such as `MacroDefs.my_add(1, 2)`.
//!
//! # Collisions
//!
//! Registering a key twice keeps the later rule. The overwrite is logged at
//! debug level and is never an error.
//!
//! # Thread Safety
//! Rules are `Rc` closures, so a registry is neither `Send` nor `Sync`.
//!
//! # Summary Table
//! | Method       | Overwrites | Notes                              |
//! |--------------|------------|------------------------------------|
//! | insert       | Yes        | Returns the displaced rule         |
//! | lookup       | N/A        | Exact key match                    |
//! | remove       | N/A        | Returns the removed rule           |
//! | keys         | N/A        | Sorted, for stable listings        |
//!
//! # Example
//! ```rust
//! use splice::ast::call::MacroKey;
//! use splice::macros::{rule, RegistryBuilder};
//! let registry = RegistryBuilder::new()
//!     .rule(MacroKey::global("twice"), rule(|_, args| Ok(format!("{0}; {0}", args[0]))))
//!     .build();
//! assert!(registry.contains(&MacroKey::global("twice")));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::call::MacroKey;
use crate::macros::types::{rule, MacroContext, MacroRule};
use crate::SpliceError;

// ============================================================================
// PROVIDERS
// ============================================================================

/// An instance rule: receives the provider it was exported from.
pub type InstanceFn<P> = fn(&P, &mut MacroContext<'_>, &[String]) -> Result<String, SpliceError>;

/// A type-scoped rule.
pub type TypeFn = fn(&mut MacroContext<'_>, &[String]) -> Result<String, SpliceError>;

/// How an exported rule is scoped.
pub enum Scope<P> {
    Instance(InstanceFn<P>),
    Type(TypeFn),
}

/// A named rule exported by a provider.
pub struct Export<P> {
    pub name: &'static str,
    pub scope: Scope<P>,
}

impl<P> Export<P> {
    pub fn instance(name: &'static str, f: InstanceFn<P>) -> Self {
        Export {
            name,
            scope: Scope::Instance(f),
        }
    }

    pub fn type_scoped(name: &'static str, f: TypeFn) -> Self {
        Export {
            name,
            scope: Scope::Type(f),
        }
    }
}

/// A value that contributes macros to a registry.
///
/// `type_name` is the receiver name type-scoped rules are keyed under.
pub trait MacroProvider: 'static {
    fn type_name(&self) -> &str;

    fn exports(&self) -> Vec<Export<Self>>
    where
        Self: Sized;
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Map from [`MacroKey`] to [`MacroRule`].
#[derive(Clone, Default)]
pub struct MacroRegistry {
    rules: HashMap<MacroKey, MacroRule>,
}

impl MacroRegistry {
    /// Creates a new, empty registry.
    ///
    /// ```rust
    /// use splice::macros::MacroRegistry;
    /// assert!(MacroRegistry::new().is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `rule` under `key`.
    ///
    /// # Returns
    /// The rule previously bound to `key`, if any. It is no longer reachable
    /// through the registry.
    pub fn insert(&mut self, key: MacroKey, rule: MacroRule) -> Option<MacroRule> {
        let previous = self.rules.insert(key.clone(), rule);
        if previous.is_some() {
            log::debug!("macro '{}' redefined; the later definition wins", key);
        }
        previous
    }

    pub fn lookup(&self, key: &MacroKey) -> Option<&MacroRule> {
        self.rules.get(key)
    }

    pub fn contains(&self, key: &MacroKey) -> bool {
        self.rules.contains_key(key)
    }

    pub fn remove(&mut self, key: &MacroKey) -> Option<MacroRule> {
        self.rules.remove(key)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All registered keys, sorted.
    pub fn keys(&self) -> Vec<&MacroKey> {
        let mut keys: Vec<_> = self.rules.keys().collect();
        keys.sort();
        keys
    }
}

impl fmt::Debug for MacroRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Collects providers and loose rules into a [`MacroRegistry`].
///
/// Later registrations win on key collisions, so the order of `provider`
/// calls is significant.
#[derive(Default)]
pub struct RegistryBuilder {
    registry: MacroRegistry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every export of `provider`.
    ///
    /// Instance rules share one `Rc` of the provider.
    pub fn provider<P: MacroProvider>(mut self, provider: P) -> Self {
        let shared = Rc::new(provider);
        let type_name = shared.type_name().to_string();
        for export in shared.exports() {
            match export.scope {
                Scope::Instance(f) => {
                    let bound = Rc::clone(&shared);
                    self.registry.insert(
                        MacroKey::global(export.name),
                        rule(move |cx, args| f(&*bound, cx, args)),
                    );
                }
                Scope::Type(f) => {
                    self.registry
                        .insert(MacroKey::scoped(type_name.as_str(), export.name), rule(f));
                }
            }
        }
        log::debug!("registered provider '{}'", type_name);
        self
    }

    pub fn rule(mut self, key: MacroKey, rule: MacroRule) -> Self {
        self.registry.insert(key, rule);
        self
    }

    pub fn build(self) -> MacroRegistry {
        self.registry
    }
}
