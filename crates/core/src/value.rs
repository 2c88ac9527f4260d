//! Dynamic value model for property views
//!
//! Views store loosely-typed data, so values are modeled as a small enum over
//! the shapes that plain associative data can take. Maps preserve insertion
//! order (`IndexMap`), which the view iteration and export contracts rely on.
//!
//! `Value::View` holds a shared handle to a nested [`PropertyView`]; this is
//! what gives wrapper views reference-like mutation semantics (see
//! [`crate::view`]).

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::view::{PropertyView, ViewFlags};

/// Shared handle to a nested view.
///
/// Views form single-threaded object graphs (one logical owner mutating at a
/// time), so plain `Rc<RefCell<..>>` sharing is sufficient.
pub type SharedView = Rc<RefCell<PropertyView>>;

/// A dynamically-typed value held in a view's backing store.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The neutral "no value" placeholder.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Positional sequence.
    Seq(Vec<Value>),
    /// Insertion-ordered associative data.
    Map(IndexMap<String, Value>),
    /// A nested view, usually a wrapper synthesized over a plain map.
    View(SharedView),
}

impl Value {
    /// Whether this is the neutral placeholder.
    pub fn is_neutral(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Loose emptiness test: neutral, `false`, zero, empty string or empty
    /// container. Nested views are never falsy.
    pub fn is_falsy(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !*b,
            Value::Int(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::Str(s) => s.is_empty(),
            Value::Seq(s) => s.is_empty(),
            Value::Map(m) => m.is_empty(),
            Value::View(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_view(&self) -> Option<&SharedView> {
        match self {
            Value::View(v) => Some(v),
            _ => None,
        }
    }

    /// If this is a wrapper view, returns its plain exported form; any other
    /// value (including a non-wrapper view) is returned unchanged.
    pub fn unwrap_view(self) -> Value {
        if let Value::View(rc) = &self {
            let is_wrapper = rc.borrow().flags().contains(ViewFlags::WRAPPER_OF_MAP);
            if is_wrapper {
                return Value::Map(rc.borrow().to_map(None, true));
            }
        }
        self
    }

    /// Total ordering used by value sorts: variant rank first, then the
    /// natural order within the variant. Ints and floats compare numerically
    /// across variants.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        use Value::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Str(a), Str(b)) => a.cmp(b),
            (Seq(a), Seq(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.total_cmp(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Map(a), Map(b)) => {
                for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
                    let ord = ka.cmp(kb).then_with(|| va.total_cmp(vb));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (View(a), View(b)) => (Rc::as_ptr(a) as usize).cmp(&(Rc::as_ptr(b) as usize)),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Str(_) => 3,
            Value::Seq(_) => 4,
            Value::Map(_) => 5,
            Value::View(_) => 6,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Seq(a), Seq(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            // Views are equal only when they are the same instance.
            (View(a), View(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            other => f.write_str(&serde_json::to_string(other).unwrap_or_default()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Seq(seq) => {
                let mut s = serializer.serialize_seq(Some(seq.len()))?;
                for v in seq {
                    s.serialize_element(v)?;
                }
                s.end()
            }
            Value::Map(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k, v)?;
                }
                m.end()
            }
            // Nested views serialize as their plain exported form.
            Value::View(rc) => {
                let exported = rc.borrow().to_map(None, true);
                let mut m = serializer.serialize_map(Some(exported.len()))?;
                for (k, v) in &exported {
                    m.serialize_entry(k, v)?;
                }
                m.end()
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Seq(v)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(v: IndexMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl From<SharedView> for Value {
    fn from(v: SharedView) -> Self {
        Value::View(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, Value)]) -> IndexMap<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_neutral_and_falsy() {
        assert!(Value::Null.is_neutral());
        assert!(!Value::Int(0).is_neutral());

        assert!(Value::Null.is_falsy());
        assert!(Value::Bool(false).is_falsy());
        assert!(Value::Int(0).is_falsy());
        assert!(Value::Str(String::new()).is_falsy());
        assert!(Value::Seq(vec![]).is_falsy());
        assert!(!Value::Int(7).is_falsy());
        assert!(!Value::Str("x".into()).is_falsy());
    }

    #[test]
    fn test_total_cmp_ranks_and_numerics() {
        assert_eq!(Value::Null.total_cmp(&Value::Int(0)), Ordering::Less);
        assert_eq!(Value::Int(2).total_cmp(&Value::Float(2.5)), Ordering::Less);
        assert_eq!(Value::Float(3.0).total_cmp(&Value::Int(2)), Ordering::Greater);
        assert_eq!(
            Value::Str("a".into()).total_cmp(&Value::Str("b".into())),
            Ordering::Less
        );
    }

    #[test]
    fn test_map_equality_is_order_sensitive_on_iteration_only() {
        let a = Value::Map(map(&[("x", Value::Int(1)), ("y", Value::Int(2))]));
        let b = Value::Map(map(&[("x", Value::Int(1)), ("y", Value::Int(2))]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_serialize_plain_shapes() {
        let v = Value::Map(map(&[
            ("id", Value::Int(7)),
            ("name", Value::Str("a".into())),
            ("gone", Value::Null),
        ]));
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"id":7,"name":"a","gone":null}"#);
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Str("img10".into()).to_string(), "img10");
    }
}
