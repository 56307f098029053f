//! Factory Registry: maps a [`ComponentKind`] to a set of named factories
//! that construct live [`crate::instance::PluginInstance`]s.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::error::FactoryError;
use crate::instance::PluginInstance;
use crate::kind::ComponentKind;

/// A typed-and-named bag of arguments the Dynamic Invoker and the Factory
/// Registry both draw from when assembling a call.
///
/// Lookup tries the type table first, then the name table — matching the
/// "type match, then name match" order `# 4.B` specifies.
#[derive(Default)]
pub struct InjectedArgs {
    by_type: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    by_name: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl InjectedArgs {
    /// Returns an empty arg bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value keyed by its own type, overwriting any prior value of
    /// the same type.
    pub fn with_typed<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.by_type.insert(TypeId::of::<T>(), Box::new(value));
        self
    }

    /// Inserts a value keyed by a caller-chosen name, overwriting any prior
    /// entry under that name.
    pub fn with_named<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.by_name.insert(name.into(), Box::new(value));
        self
    }

    /// Looks the value up by type first.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.by_type
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    /// Looks the value up by name, regardless of type table contents.
    #[must_use]
    pub fn get_named<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
        self.by_name.get(name).and_then(|v| v.downcast_ref::<T>())
    }

    /// Resolves an input the way the Dynamic Invoker does: type match, then
    /// name match, else [`FactoryError`]-shaped failure reported by the caller.
    #[must_use]
    pub fn resolve<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
        self.get::<T>().or_else(|| self.get_named::<T>(name))
    }
}

/// A callable producing a [`PluginInstance`] given an [`InjectedArgs`] bag —
/// the scope, its UI, the context, and a derived logger arrive through it.
#[async_trait]
pub trait Factory: Send + Sync {
    /// Constructs the plugin value this factory is registered for.
    async fn construct(&self, args: &InjectedArgs) -> Result<PluginInstance, FactoryError>;
}

/// Maps [`ComponentKind`] to a name table of [`Factory`]s.
///
/// Mirrors the teacher's tool registry: `IndexMap`-backed so insertion order
/// is cheap to preserve, with `names()` sorting lexicographically on top for
/// the deterministic enumeration `# 4.A` requires.
#[derive(Default)]
pub struct FactoryRegistry {
    kinds: IndexMap<ComponentKind, IndexMap<String, Arc<dyn Factory>>>,
}

impl core::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field(
                "kinds",
                &self
                    .kinds
                    .iter()
                    .map(|(k, v)| (*k, v.keys().collect::<Vec<_>>()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl FactoryRegistry {
    /// Returns an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `(kind, name)`. Idempotent for an identical
    /// pair re-registered with the same `Arc`; re-registering with a
    /// different factory replaces the entry.
    pub fn register(&mut self, kind: ComponentKind, name: impl Into<String>, factory: Arc<dyn Factory>) {
        self.kinds
            .entry(kind)
            .or_default()
            .insert(name.into(), factory);
    }

    /// Returns the registered names for `kind`, lexicographically ordered.
    #[must_use]
    pub fn names(&self, kind: ComponentKind) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .kinds
            .get(&kind)
            .map(|table| table.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Looks up the factory registered under `(kind, name)`.
    pub fn lookup(&self, kind: ComponentKind, name: &str) -> Result<Arc<dyn Factory>, FactoryError> {
        let table = self
            .kinds
            .get(&kind)
            .ok_or(FactoryError::UnknownKind(kind))?;
        table
            .get(name)
            .cloned()
            .ok_or_else(|| FactoryError::UnknownName {
                kind,
                name: name.to_string(),
            })
    }

    /// Returns whether any factory is registered under `(kind, name)`.
    #[must_use]
    pub fn has(&self, kind: ComponentKind, name: &str) -> bool {
        self.kinds
            .get(&kind)
            .is_some_and(|table| table.contains_key(name))
    }
}
