//! Cursor-style iteration over a view's entries.
//!
//! The cursor walks the store in insertion order. Its validity window is
//! `[0, count]` inclusive: the one-past-the-end position is still "valid"
//! with a neutral current value, which lets a drain loop observe the end
//! before stepping off it. [`PropertyView::iter`] is the plain iterator form
//! for `for` loops; it ignores the cursor entirely.

use crate::value::Value;
use crate::view::{PropertyView, ViewError};

impl PropertyView {
    /// Reset the cursor to the first entry.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Step the cursor forward by one.
    pub fn next(&mut self) {
        self.position += 1;
    }

    /// Value under the cursor, neutral when out of range.
    pub fn current(&self) -> Value {
        self.store
            .get_index(self.position)
            .map(|(_, v)| v.clone())
            .unwrap_or(Value::Null)
    }

    /// Key under the cursor.
    pub fn current_key(&self) -> Option<&str> {
        self.store.get_index(self.position).map(|(k, _)| k.as_str())
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether the cursor is within the validity window, the one-past-the-end
    /// position included.
    pub fn valid(&self) -> bool {
        self.position <= self.count()
    }

    /// Move the cursor to an absolute position. A position beyond the window
    /// is an error; the cursor is left at the requested (invalid) position
    /// until the next `rewind` or in-range `seek`.
    pub fn seek(&mut self, position: usize) -> Result<(), ViewError> {
        self.position = position;
        if self.position > self.count() {
            return Err(ViewError::InvalidSeek {
                position,
                count: self.count(),
            });
        }
        Ok(())
    }

    /// Iterate over the stored entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.store.iter()
    }
}

impl<'a> IntoIterator for &'a PropertyView {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
