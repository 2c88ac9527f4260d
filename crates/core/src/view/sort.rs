//! In-place sorts over the backing store.
//!
//! Every sort is stable, reorders entries in place, and keeps each value
//! attached to its key. The cursor position is left untouched.

use std::cmp::Ordering;

use crate::value::Value;
use crate::view::PropertyView;

impl PropertyView {
    /// Sort entries by key, lexicographically.
    pub fn sort_keys(&mut self) {
        self.store.sort_by(|k1, _, k2, _| k1.cmp(k2));
    }

    /// Sort entries by value, using the value type's total ordering.
    pub fn sort_values(&mut self) {
        self.store.sort_by(|_, v1, _, v2| v1.total_cmp(v2));
    }

    /// Sort entries by value with a caller-supplied comparator.
    pub fn sort_by_value(&mut self, mut cmp: impl FnMut(&Value, &Value) -> Ordering) {
        self.store.sort_by(|_, v1, _, v2| cmp(v1, v2));
    }

    /// Sort entries by key with a caller-supplied comparator.
    pub fn sort_by_key(&mut self, mut cmp: impl FnMut(&str, &str) -> Ordering) {
        self.store.sort_by(|k1, _, k2, _| cmp(k1, k2));
    }

    /// Sort entries by the natural order of their values' string forms:
    /// digit runs compare numerically, so `"img2"` sorts before `"img10"`.
    pub fn natural_sort(&mut self) {
        self.store
            .sort_by(|_, v1, _, v2| natural_cmp(&v1.to_string(), &v2.to_string()));
    }

    /// [`natural_sort`](Self::natural_sort) with case folded out.
    pub fn natural_sort_case_insensitive(&mut self) {
        self.store.sort_by(|_, v1, _, v2| {
            natural_cmp(
                &v1.to_string().to_lowercase(),
                &v2.to_string().to_lowercase(),
            )
        });
    }
}

/// Natural string comparison: maximal digit runs compare as numbers, the
/// rest compares character by character.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ca = a.chars().peekable();
    let mut cb = b.chars().peekable();
    loop {
        match (ca.peek().copied(), cb.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let run_a = take_digit_run(&mut ca);
                let run_b = take_digit_run(&mut cb);
                let ord = cmp_digit_runs(&run_a, &run_b);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => match x.cmp(&y) {
                Ordering::Equal => {
                    ca.next();
                    cb.next();
                }
                ord => return ord,
            },
        }
    }
}

fn take_digit_run(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(*c);
        chars.next();
    }
    run
}

/// Compare digit runs numerically without parsing: strip leading zeros,
/// compare lengths, then bytes. Avoids overflow on arbitrarily long runs.
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn view_of(entries: &[(&str, Value)]) -> PropertyView {
        let mut view = PropertyView::new();
        for (k, v) in entries {
            view.set(k, v.clone()).unwrap();
        }
        view
    }

    fn keys(view: &PropertyView) -> Vec<&str> {
        view.container().keys().map(String::as_str).collect()
    }

    #[test]
    fn test_sort_keys_is_lexicographic() {
        let mut view = view_of(&[
            ("b", Value::Int(2)),
            ("a", Value::Int(1)),
            ("c", Value::Int(3)),
        ]);
        view.sort_keys();
        assert_eq!(keys(&view), vec!["a", "b", "c"]);
        // Values ride along with their keys.
        assert_eq!(view.get("a"), Value::Int(1));
    }

    #[test]
    fn test_sort_values_uses_total_ordering() {
        let mut view = view_of(&[
            ("a", Value::Str("z".into())),
            ("b", Value::Int(3)),
            ("c", Value::Null),
            ("d", Value::Float(1.5)),
        ]);
        view.sort_values();
        assert_eq!(keys(&view), vec!["c", "d", "b", "a"]);
    }

    #[test]
    fn test_custom_comparators() {
        let mut view = view_of(&[
            ("a", Value::Int(1)),
            ("b", Value::Int(3)),
            ("c", Value::Int(2)),
        ]);
        view.sort_by_value(|v1, v2| v2.total_cmp(v1));
        assert_eq!(keys(&view), vec!["b", "c", "a"]);

        view.sort_by_key(|k1, k2| k2.cmp(k1));
        assert_eq!(keys(&view), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_natural_cmp_digit_runs() {
        assert_eq!(natural_cmp("img2", "img10"), Ordering::Less);
        assert_eq!(natural_cmp("img10", "img10"), Ordering::Equal);
        assert_eq!(natural_cmp("img007", "img7"), Ordering::Equal);
        assert_eq!(natural_cmp("a2b", "a2a"), Ordering::Greater);
        assert_eq!(natural_cmp("a", "a1"), Ordering::Less);
        // Runs longer than u64 still compare correctly.
        assert_eq!(
            natural_cmp("v99999999999999999999", "v100000000000000000000"),
            Ordering::Less
        );
    }

    #[test]
    fn test_natural_sort_orders_numbered_values() {
        let mut view = view_of(&[
            ("a", Value::Str("img10".into())),
            ("b", Value::Str("img2".into())),
            ("c", Value::Str("img1".into())),
        ]);
        view.natural_sort();
        assert_eq!(keys(&view), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_natural_sort_case_insensitive_folds_case() {
        let mut view = view_of(&[
            ("a", Value::Str("IMG10".into())),
            ("b", Value::Str("img2".into())),
        ]);
        view.natural_sort_case_insensitive();
        assert_eq!(keys(&view), vec!["b", "a"]);
    }

    #[test]
    fn test_sorts_preserve_key_value_pairs() {
        let mut view = PropertyView::new();
        let data: IndexMap<String, Value> = [
            ("x".to_string(), Value::Int(9)),
            ("y".to_string(), Value::Int(1)),
        ]
        .into_iter()
        .collect();
        view.replace_container(data);
        view.sort_values();
        assert_eq!(view.get("x"), Value::Int(9));
        assert_eq!(view.get("y"), Value::Int(1));
    }
}
