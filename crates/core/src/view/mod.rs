//! Property view runtime
//!
//! A [`PropertyView`] is an ordered key/value store with schema-aware access:
//! every read and write routes through alias resolution and getter/setter
//! dispatch, exports are level-filtered, and nested plain maps can be wrapped
//! into child views with reference-like mutation semantics.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │ PropertyView                                              │
//! │  store:   ordered key -> Value (insertion order matters)  │
//! │  aliases: name -> canonical key (every stored key is its  │
//! │           own alias; grows as new keys appear)            │
//! │  getters/setters: name -> bound method, dispatched        │
//! │           through the type's AccessorTable                │
//! │  levels:  level -> property subset (export filtering)     │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Descriptor-derived fields (aliases, accessor bindings, levels) are
//! type-level data copied into the instance at construction; they are
//! discarded by [`PropertyView::prepare_for_cache`] before the instance is
//! persisted externally and recomputed on reactivation.

mod cursor;
mod export;
mod ingest;
mod sort;

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::schema::{AccessorTable, Descriptor};
use crate::value::{SharedView, Value};

pub use export::{LevelExport, ToPlainMap};
pub use ingest::IngestPolicy;
pub use sort::natural_cmp;

bitflags::bitflags! {
    /// Per-view behavior flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ViewFlags: u8 {
        /// Indexed reads wrap nested plain maps into child views.
        const WRAP_NESTED = 1 << 0;
        /// This view was synthesized as a wrapper over a nested map; exports
        /// convert it back to plain data.
        const WRAPPER_OF_MAP = 1 << 1;
        /// Writes to keys outside the alias table fail softly.
        const REJECT_UNDECLARED = 1 << 2;
    }
}

/// View operation errors.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// The validity predicate rejected the value; nothing was written.
    #[error("invalid value for key `{key}`")]
    InvalidValue { key: String },

    /// Ingestion input was neither a map, a view, nor a sequence.
    #[error("non-traversable data (not a map, view, or sequence)")]
    NonTraversable,

    /// Seek outside `[0, count]`. The cursor is left at the invalid
    /// position until the next `rewind` or valid `seek`.
    #[error("invalid seek position {position} (count {count})")]
    InvalidSeek { position: usize, count: usize },

    /// A descriptor binds a method name the accessor table does not have.
    /// Only reachable with a stale persisted descriptor.
    #[error("accessor method `{method}` is bound but not registered")]
    AccessorMissing { method: String },
}

/// Pluggable value validity predicate. The single extension point for
/// subclass-style validation rules; the default accepts everything.
pub type ValidatorFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Alias-transparent, getter/setter-mediated view over associative data.
#[derive(Default)]
pub struct PropertyView {
    class_name: String,
    store: IndexMap<String, Value>,
    aliases: IndexMap<String, String>,
    aliases_different: IndexMap<String, String>,
    getters: IndexMap<String, String>,
    setters: IndexMap<String, String>,
    levels: IndexMap<String, Vec<String>>,
    accessors: AccessorTable,
    default_level: String,
    flags: ViewFlags,
    ignored_on_export: HashSet<String>,
    validator: Option<ValidatorFn>,
    position: usize,
    next_append: u64,
}

impl PropertyView {
    /// An empty, schema-less view: every key is accepted dynamically.
    pub fn new() -> Self {
        Self::default()
    }

    /// A schema-less view over the given data.
    pub fn from_value(data: Value) -> Result<Self, ViewError> {
        let mut view = Self::new();
        view.ingest(data, IngestPolicy::All)?;
        Ok(view)
    }

    /// A view bound to a resolved descriptor and its type's accessor table.
    pub fn from_descriptor(descriptor: &Descriptor, accessors: AccessorTable) -> Self {
        let mut view = Self::new();
        view.apply_descriptor(descriptor, accessors);
        view
    }

    /// Child view synthesized by the wrapping mechanism.
    pub(crate) fn new_wrapper(map: IndexMap<String, Value>) -> Self {
        let mut view = Self::new();
        view.flags = ViewFlags::WRAP_NESTED | ViewFlags::WRAPPER_OF_MAP;
        view.replace_container(map);
        view
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn flags(&self) -> ViewFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: ViewFlags) {
        self.flags = flags;
    }

    /// Enable wrapping of nested plain maps on indexed reads.
    pub fn enable_wrapping(&mut self) {
        self.flags |= ViewFlags::WRAP_NESTED;
    }

    pub fn is_wrapper(&self) -> bool {
        self.flags.contains(ViewFlags::WRAPPER_OF_MAP)
    }

    /// Install the value validity predicate consulted by [`set`](Self::set).
    pub fn set_validator(
        &mut self,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) {
        self.validator = Some(Arc::new(predicate));
    }

    /// Exclude a property from export output. It stays readable and
    /// writable.
    pub fn ignore_on_export(&mut self, key: impl Into<String>) {
        self.ignored_on_export.insert(key.into());
    }

    pub fn unignore_on_export(&mut self, key: &str) {
        self.ignored_on_export.remove(key);
    }

    /// Number of stored entries.
    pub fn count(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The backing store, insertion order preserved.
    pub fn container(&self) -> &IndexMap<String, Value> {
        &self.store
    }

    /// The current alias table.
    pub fn aliases(&self) -> &IndexMap<String, String> {
        &self.aliases
    }

    /// Resolve a key through the alias table; unknown keys resolve to
    /// themselves.
    pub fn resolved_key<'a>(&'a self, key: &'a str) -> &'a str {
        self.aliases.get(key).map(String::as_str).unwrap_or(key)
    }

    /// Read a property. A bound getter takes full precedence over stored
    /// data; otherwise the key resolves through the alias table, and an
    /// absent key yields [`Value::Null`]. Wrapper views read through this
    /// path come back as their plain exported form.
    pub fn get(&self, key: &str) -> Value {
        self.read(key, true)
    }

    /// Indexed-access read. With [`ViewFlags::WRAP_NESTED`] enabled, a plain
    /// nested map is replaced in place by a child wrapper view and the same
    /// child instance is returned on every subsequent read, so mutations
    /// through the child stay visible through this view. Without the flag
    /// this is identical to [`get`](Self::get).
    pub fn at(&mut self, key: &str) -> Value {
        if !self.flags.contains(ViewFlags::WRAP_NESTED) {
            return self.get(key);
        }
        match self.read(key, false) {
            Value::Map(map) => {
                let shared: SharedView = Rc::new(RefCell::new(PropertyView::new_wrapper(map)));
                self.store_back(key, Value::View(shared.clone()));
                Value::View(shared)
            }
            other => other,
        }
    }

    /// Direct store read: alias-resolved, no getter dispatch, no wrapper
    /// conversion.
    pub fn raw(&self, key: &str) -> Value {
        let resolved = self.resolved_key(key);
        self.store.get(resolved).cloned().unwrap_or(Value::Null)
    }

    fn read(&self, key: &str, convert_wrappers: bool) -> Value {
        let ret = if let Some(method) = self.getters.get(key) {
            match self.accessors.getter(method) {
                Some(g) => g.as_ref()(self),
                // Stale binding: fall through to the store.
                None => self.raw(key),
            }
        } else {
            self.raw(key)
        };
        if convert_wrappers {
            Self::wrapper_to_plain(ret)
        } else {
            ret
        }
    }

    fn wrapper_to_plain(value: Value) -> Value {
        if let Value::View(rc) = &value {
            let child = rc.borrow();
            if child.is_wrapper() {
                return Value::Map(child.to_map(None, true));
            }
        }
        value
    }

    /// Write a property.
    ///
    /// - A rejected value (validity predicate) is a hard error.
    /// - An empty key appends positionally, unless undeclared keys are
    ///   rejected, in which case the write fails softly (`Ok(false)`).
    /// - A bound setter receives the value and the alias table is left
    ///   untouched (a binding implies the property is already declared).
    /// - Otherwise the key resolves through the alias table (or becomes its
    ///   own canonical key) and is written directly; in reject-undeclared
    ///   mode an unknown alias fails softly without mutating state.
    pub fn set(&mut self, key: &str, value: Value) -> Result<bool, ViewError> {
        self.check_valid(key, &value)?;

        if key.is_empty() {
            if self.flags.contains(ViewFlags::REJECT_UNDECLARED) {
                return Ok(false);
            }
            self.append(value);
            return Ok(true);
        }

        if let Some(method) = self.setter_method(key) {
            self.dispatch_setter(&method, value)?;
            return Ok(true);
        }

        if self.flags.contains(ViewFlags::REJECT_UNDECLARED) && !self.aliases.contains_key(key) {
            return Ok(false);
        }

        self.store_back(key, value);
        Ok(true)
    }

    /// Direct write: alias-resolved, bypassing setters and validation. An
    /// empty key appends. This is what bound setters use to store their
    /// result without re-entering dispatch.
    pub fn set_direct(&mut self, key: &str, value: Value) {
        if key.is_empty() {
            self.append(value);
        } else {
            self.store_back(key, value);
        }
    }

    /// Append at the next positional key.
    pub fn append(&mut self, value: Value) {
        let key = self.next_append.to_string();
        self.next_append += 1;
        self.store.insert(key.clone(), value);
        self.aliases.insert(key.clone(), key);
    }

    /// Whether a key (after alias resolution) is present, neutral values
    /// included.
    pub fn contains(&self, key: &str) -> bool {
        let resolved = self.resolved_key(key);
        self.store.contains_key(resolved)
    }

    /// Remove a key (after alias resolution), preserving the order of the
    /// remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let resolved = self.resolved_key(key).to_string();
        self.store.shift_remove(&resolved)
    }

    /// Replace the backing store wholesale. Alias entries for the new keys
    /// are added; existing alias mappings win over identity.
    pub fn replace_container(&mut self, data: IndexMap<String, Value>) {
        self.store = data;
        let keys: Vec<String> = self.store.keys().cloned().collect();
        for key in keys {
            self.track_numeric_key(&key);
            if !self.aliases.contains_key(&key) {
                self.aliases.insert(key.clone(), key);
            }
        }
    }

    /// Load type-level data from a resolved descriptor. Stored keys keep
    /// their identity aliases; descriptor aliases win on conflict.
    pub fn apply_descriptor(&mut self, descriptor: &Descriptor, accessors: AccessorTable) {
        self.class_name = descriptor.class_name.clone();
        let mut aliases: IndexMap<String, String> = self
            .store
            .keys()
            .map(|k| (k.clone(), k.clone()))
            .collect();
        for (alias, target) in &descriptor.aliases {
            aliases.insert(alias.clone(), target.clone());
        }
        self.aliases = aliases;
        self.aliases_different = descriptor.aliases_different.clone();
        self.getters = descriptor.getters.clone();
        self.setters = descriptor.setters.clone();
        self.levels = descriptor.levels.clone();
        self.default_level = descriptor.default_level.clone();
        self.accessors = accessors;
        self.position = 0;
    }

    /// Discard descriptor-derived fields before this instance is persisted
    /// externally. They are type-level data; use
    /// [`apply_descriptor`](Self::apply_descriptor) (or the engine's
    /// reactivation helper) to recompute them afterwards.
    pub fn prepare_for_cache(&mut self) {
        self.aliases.clear();
        self.aliases_different.clear();
        self.getters.clear();
        self.setters.clear();
        self.levels.clear();
        self.accessors.clear();
    }

    /// Counterpart of [`prepare_for_cache`](Self::prepare_for_cache): fetch
    /// this type's current descriptor and accessors from the engine and
    /// reapply them. The cursor resets.
    pub fn after_cache(&mut self, engine: &crate::engine::ViewEngine) {
        engine.reactivate(self);
    }

    fn check_valid(&self, key: &str, value: &Value) -> Result<(), ViewError> {
        if let Some(predicate) = &self.validator {
            if !predicate(value) {
                return Err(ViewError::InvalidValue {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    fn setter_method(&self, key: &str) -> Option<String> {
        self.setters.get(key).cloned()
    }

    fn dispatch_setter(&mut self, method: &str, value: Value) -> Result<(), ViewError> {
        let setter = self
            .accessors
            .setter(method)
            .cloned()
            .ok_or_else(|| ViewError::AccessorMissing {
                method: method.to_string(),
            })?;
        setter.as_ref()(self, value)
    }

    /// Merge already-resolved keys into the store in one pass, registering
    /// identity aliases for new keys.
    fn merge_direct(&mut self, entries: IndexMap<String, Value>) {
        for (key, value) in entries {
            self.track_numeric_key(&key);
            self.store.insert(key.clone(), value);
            self.aliases.entry(key.clone()).or_insert(key);
        }
    }

    fn store_back(&mut self, key: &str, value: Value) {
        let resolved = self
            .aliases
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string());
        self.track_numeric_key(&resolved);
        self.store.insert(resolved.clone(), value);
        self.aliases.insert(key.to_string(), resolved);
    }

    /// Keep positional appends from colliding with numeric keys introduced
    /// by direct writes or ingestion.
    fn track_numeric_key(&mut self, key: &str) {
        if let Ok(n) = key.parse::<u64>() {
            if n >= self.next_append {
                self.next_append = n + 1;
            }
        }
    }
}

impl fmt::Debug for PropertyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyView")
            .field("class_name", &self.class_name)
            .field("store", &self.store)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{resolve, DeclarationBlock, LEVEL_ALL};

    fn map(entries: &[(&str, Value)]) -> IndexMap<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn customer_view() -> PropertyView {
        let block = DeclarationBlock::new()
            .property("id")
            .property("name")
            .alias("identifier", "id");
        let descriptor = resolve("Customer", LEVEL_ALL, &[block], &AccessorTable::new());
        PropertyView::from_descriptor(&descriptor, AccessorTable::new())
    }

    #[test]
    fn test_get_absent_key_is_neutral() {
        let view = PropertyView::new();
        assert_eq!(view.get("missing"), Value::Null);
    }

    #[test]
    fn test_alias_convergence_on_set_and_get() {
        let mut view = customer_view();
        view.set("identifier", Value::Int(7)).unwrap();

        assert_eq!(view.get("id"), Value::Int(7));
        assert_eq!(view.get("identifier"), Value::Int(7));
        // One stored slot under the canonical key.
        assert_eq!(view.count(), 1);
        assert!(view.container().contains_key("id"));
        assert!(!view.container().contains_key("identifier"));
    }

    #[test]
    fn test_dynamic_keys_register_their_own_alias() {
        let mut view = PropertyView::new();
        view.set("color", Value::Str("red".into())).unwrap();
        assert_eq!(view.resolved_key("color"), "color");
        assert!(view.contains("color"));
    }

    #[test]
    fn test_getter_takes_precedence_over_store() {
        let block = DeclarationBlock::new().property("name").alias("label", "name");
        let accessors =
            AccessorTable::new().with_getter("getname", |v| match v.raw("name") {
                Value::Str(s) => Value::Str(s.to_uppercase()),
                other => other,
            });
        let descriptor = resolve("T", LEVEL_ALL, &[block], &accessors);
        let mut view = PropertyView::from_descriptor(&descriptor, accessors);

        view.set_direct("name", Value::Str("ada".into()));
        assert_eq!(view.get("name"), Value::Str("ADA".into()));
        // Getter binding covers the alias too.
        assert_eq!(view.get("label"), Value::Str("ADA".into()));
    }

    #[test]
    fn test_setter_path_is_alias_table_neutral() {
        let block = DeclarationBlock::new().property("name");
        let accessors = AccessorTable::new().with_setter("setname", |view, v| {
            view.set_direct("name", v);
            Ok(())
        });
        let descriptor = resolve("T", LEVEL_ALL, &[block], &accessors);
        let mut view = PropertyView::from_descriptor(&descriptor, accessors);

        let aliases_before = view.aliases().len();
        view.set("name", Value::Str("a".into())).unwrap();
        assert_eq!(view.aliases().len(), aliases_before);
        assert_eq!(view.get("name"), Value::Str("a".into()));
    }

    #[test]
    fn test_validator_rejection_is_an_error() {
        let mut view = PropertyView::new();
        view.set_validator(|v| !matches!(v, Value::Int(i) if *i < 0));

        assert!(view.set("ok", Value::Int(1)).unwrap());
        let err = view.set("bad", Value::Int(-1)).unwrap_err();
        assert!(matches!(err, ViewError::InvalidValue { .. }));
        assert!(!view.contains("bad"));
    }

    #[test]
    fn test_empty_key_appends_positionally() {
        let mut view = PropertyView::new();
        view.set("", Value::Str("a".into())).unwrap();
        view.set("", Value::Str("b".into())).unwrap();
        assert_eq!(view.get("0"), Value::Str("a".into()));
        assert_eq!(view.get("1"), Value::Str("b".into()));
    }

    #[test]
    fn test_append_skips_past_existing_numeric_keys() {
        let mut view = PropertyView::new();
        view.set("4", Value::Int(4)).unwrap();
        view.append(Value::Int(5));
        assert_eq!(view.get("5"), Value::Int(5));
    }

    #[test]
    fn test_reject_undeclared_soft_failure() {
        let mut view = customer_view();
        view.set_flags(view.flags() | ViewFlags::REJECT_UNDECLARED);

        assert!(view.set("identifier", Value::Int(1)).unwrap());
        assert!(!view.set("unknown", Value::Int(2)).unwrap());
        assert!(!view.set("", Value::Int(3)).unwrap());
        assert!(!view.contains("unknown"));
        assert_eq!(view.count(), 1);
    }

    #[test]
    fn test_remove_and_contains_resolve_aliases() {
        let mut view = customer_view();
        view.set("id", Value::Int(7)).unwrap();
        assert!(view.contains("identifier"));
        assert_eq!(view.remove("identifier"), Some(Value::Int(7)));
        assert!(!view.contains("id"));
    }

    #[test]
    fn test_contains_includes_neutral_values() {
        let mut view = PropertyView::new();
        view.set("gone", Value::Null).unwrap();
        assert!(view.contains("gone"));
    }

    #[test]
    fn test_wrapping_gives_reference_semantics() {
        let mut view = PropertyView::new();
        view.enable_wrapping();
        view.set("n", Value::Map(map(&[("a", Value::Int(1))]))).unwrap();

        let child = match view.at("n") {
            Value::View(rc) => rc,
            other => panic!("expected wrapper view, got {other:?}"),
        };
        child.borrow_mut().set("a", Value::Int(2)).unwrap();

        // Mutation through the child is visible through the parent.
        let reread = view.at("n");
        match &reread {
            Value::View(rc) => {
                assert!(Rc::ptr_eq(rc, &child));
                assert_eq!(rc.borrow().get("a"), Value::Int(2));
            }
            other => panic!("expected the same wrapper back, got {other:?}"),
        }
        // The plain read path flattens the wrapper.
        assert_eq!(view.get("n"), Value::Map(map(&[("a", Value::Int(2))])));
    }

    #[test]
    fn test_without_wrapping_nested_maps_are_value_copies() {
        let mut view = PropertyView::new();
        view.set("n", Value::Map(map(&[("a", Value::Int(1))]))).unwrap();

        let copy = view.at("n");
        if let Value::Map(mut m) = copy {
            m.insert("a".to_string(), Value::Int(2));
        }
        assert_eq!(view.get("n"), Value::Map(map(&[("a", Value::Int(1))])));
    }

    #[test]
    fn test_wrapping_is_recursive() {
        let mut view = PropertyView::new();
        view.enable_wrapping();
        let nested = map(&[("inner", Value::Map(map(&[("x", Value::Int(1))])))]);
        view.set("outer", Value::Map(nested)).unwrap();

        let child = view.at("outer").as_view().cloned().unwrap();
        let grandchild = child.borrow_mut().at("inner").as_view().cloned().unwrap();
        grandchild.borrow_mut().set("x", Value::Int(9)).unwrap();

        assert_eq!(
            view.get("outer"),
            Value::Map(map(&[("inner", Value::Map(map(&[("x", Value::Int(9))])))]))
        );
    }

    #[test]
    fn test_unwrap_view_flattens_wrappers_only() {
        let wrapper = Rc::new(RefCell::new(PropertyView::new_wrapper(map(&[(
            "a",
            Value::Int(1),
        )]))));
        let plain = Rc::new(RefCell::new(PropertyView::new()));

        assert_eq!(
            Value::View(wrapper).unwrap_view(),
            Value::Map(map(&[("a", Value::Int(1))]))
        );
        match Value::View(plain.clone()).unwrap_view() {
            Value::View(rc) => assert!(Rc::ptr_eq(&rc, &plain)),
            other => panic!("expected view, got {other:?}"),
        }
    }

    #[test]
    fn test_prepare_for_cache_round_trip() {
        let block = DeclarationBlock::new()
            .property("id")
            .alias("identifier", "id");
        let descriptor = resolve("Customer", LEVEL_ALL, &[block], &AccessorTable::new());
        let mut view = PropertyView::from_descriptor(&descriptor, AccessorTable::new());
        view.set("identifier", Value::Int(7)).unwrap();

        view.prepare_for_cache();
        assert!(view.aliases().is_empty());
        // Data survives; schema-derived lookups are gone.
        assert_eq!(view.raw("id"), Value::Int(7));
        assert_eq!(view.get("identifier"), Value::Null);

        view.apply_descriptor(&descriptor, AccessorTable::new());
        assert_eq!(view.get("identifier"), Value::Int(7));
    }
}
