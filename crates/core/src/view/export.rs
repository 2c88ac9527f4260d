//! Level-filtered export to plain data.

use indexmap::IndexMap;

use crate::schema::LEVEL_ALL;
use crate::value::Value;
use crate::view::PropertyView;

/// Conversion into a plain ordered map, nested views flattened.
pub trait ToPlainMap {
    fn to_plain_map(&self) -> IndexMap<String, Value>;
}

/// Export filtered by a visibility level.
pub trait LevelExport {
    fn to_map_level(&self, level: Option<&str>, recursive: bool) -> IndexMap<String, Value>;
}

impl PropertyView {
    /// Export the view as a plain ordered map.
    ///
    /// `level` selects the property subset (`None` means the view's default
    /// level). The "all" level exports every aliased property; a declared
    /// level seeds its property set with neutral values and overlays the
    /// stored data on top, so undeclared-but-stored keys still appear. An
    /// undeclared level behaves as "all" (chained per-level exports on nested
    /// views must not silently lose data); a level declared empty yields an
    /// empty map.
    ///
    /// Bound getters are applied to every exported key they cover. With
    /// `convert_nested`, nested views and containers are recursively
    /// flattened to plain data.
    pub fn to_map(&self, level: Option<&str>, convert_nested: bool) -> IndexMap<String, Value> {
        let resolved = level.unwrap_or(&self.default_level);

        let keys: Vec<String> = if resolved == LEVEL_ALL {
            self.all_level_keys()
        } else {
            match self.levels.get(resolved) {
                Some(props) => props.clone(),
                None => self.all_level_keys(),
            }
        };
        if keys.is_empty() {
            return IndexMap::new();
        }

        let mut out: IndexMap<String, Value> = keys.into_iter().map(|k| (k, Value::Null)).collect();
        for (key, value) in &self.store {
            out.insert(key.clone(), value.clone());
        }

        for (alias, method) in &self.getters {
            if out.contains_key(alias) {
                if let Some(getter) = self.accessors.getter(method) {
                    out.insert(alias.clone(), getter.as_ref()(self));
                }
            }
        }

        for ignored in &self.ignored_on_export {
            out.shift_remove(ignored);
        }

        if convert_nested {
            for value in out.values_mut() {
                let taken = std::mem::replace(value, Value::Null);
                *value = export_value(taken, level);
            }
        }
        out
    }

    /// The "all" export key set: the deduplicated canonical keys of the alias
    /// table, in first-appearance order.
    fn all_level_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for target in self.aliases.values() {
            if !keys.iter().any(|k| k == target) {
                keys.push(target.clone());
            }
        }
        keys
    }
}

/// Recursively flatten nested views and containers to plain data. Nested
/// views export at the same requested level, so chained per-level exports
/// stay consistent down the graph (a level the child never declared falls
/// back to its "all").
pub(crate) fn export_value(value: Value, level: Option<&str>) -> Value {
    match value {
        Value::View(rc) => Value::Map(rc.borrow().to_map(level, true)),
        Value::Map(map) => Value::Map(
            map.into_iter()
                .map(|(k, v)| (k, export_value(v, level)))
                .collect(),
        ),
        Value::Seq(items) => Value::Seq(
            items
                .into_iter()
                .map(|v| export_value(v, level))
                .collect(),
        ),
        other => other,
    }
}

impl ToPlainMap for PropertyView {
    fn to_plain_map(&self) -> IndexMap<String, Value> {
        self.to_map(None, true)
    }
}

impl LevelExport for PropertyView {
    fn to_map_level(&self, level: Option<&str>, recursive: bool) -> IndexMap<String, Value> {
        self.to_map(level, recursive)
    }
}
