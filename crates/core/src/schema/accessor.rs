//! Method tables for getter/setter dispatch
//!
//! Instead of probing a type's methods reflectively, a type registers its
//! accessor methods by name in an [`AccessorTable`]. The resolver probes the
//! deterministic name candidates (`get<name>`, `get<name-without-underscores>`
//! and the `set` equivalents) against this table once per type; the resulting
//! bindings are stored in the descriptor as method *names*, which keeps the
//! descriptor serializable. Views dispatch through the table at call time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::value::Value;
use crate::view::{PropertyView, ViewError};

/// A bound getter: reads its value from the view, taking full precedence over
/// the backing store.
pub type GetterFn = Arc<dyn Fn(&PropertyView) -> Value + Send + Sync>;

/// A bound setter: applies a value to the view however it sees fit.
pub type SetterFn = Arc<dyn Fn(&mut PropertyView, Value) -> Result<(), ViewError> + Send + Sync>;

/// The method set of a type, keyed by method name.
#[derive(Clone, Default)]
pub struct AccessorTable {
    getters: HashMap<String, GetterFn>,
    setters: HashMap<String, SetterFn>,
}

impl AccessorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_getter(
        mut self,
        method: impl Into<String>,
        f: impl Fn(&PropertyView) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.getters.insert(method.into(), Arc::new(f));
        self
    }

    pub fn with_setter(
        mut self,
        method: impl Into<String>,
        f: impl Fn(&mut PropertyView, Value) -> Result<(), ViewError> + Send + Sync + 'static,
    ) -> Self {
        self.setters.insert(method.into(), Arc::new(f));
        self
    }

    pub fn getter(&self, method: &str) -> Option<&GetterFn> {
        self.getters.get(method)
    }

    pub fn setter(&self, method: &str) -> Option<&SetterFn> {
        self.setters.get(method)
    }

    pub fn has_getter(&self, method: &str) -> bool {
        self.getters.contains_key(method)
    }

    pub fn has_setter(&self, method: &str) -> bool {
        self.setters.contains_key(method)
    }

    pub fn is_empty(&self) -> bool {
        self.getters.is_empty() && self.setters.is_empty()
    }

    pub fn clear(&mut self) {
        self.getters.clear();
        self.setters.clear();
    }

    /// Overlay this table on top of a base table; entries here win on
    /// conflict. Used when a derived type extends a base type's method set.
    pub fn merged_over(self, mut base: AccessorTable) -> AccessorTable {
        base.getters.extend(self.getters);
        base.setters.extend(self.setters);
        base
    }
}

impl fmt::Debug for AccessorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut getters: Vec<&str> = self.getters.keys().map(String::as_str).collect();
        let mut setters: Vec<&str> = self.setters.keys().map(String::as_str).collect();
        getters.sort_unstable();
        setters.sort_unstable();
        f.debug_struct("AccessorTable")
            .field("getters", &getters)
            .field("setters", &setters)
            .finish()
    }
}
