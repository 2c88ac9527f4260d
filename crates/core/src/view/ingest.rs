//! Bulk ingestion of external data into a view.
//!
//! Ingestion is the alias-aware, setter-aware bulk counterpart of
//! [`PropertyView::set`]: keys resolve through the alias table, bound setters
//! run, and a policy decides which incoming entries may land. Entries without
//! a setter are merged in one pass so a half-applied map is never observable
//! through direct reads.

use indexmap::IndexMap;

use crate::value::Value;
use crate::view::{PropertyView, ViewError, ViewFlags};

/// Which incoming entries an ingestion run may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestPolicy {
    /// Every admitted entry overwrites whatever is stored.
    All,
    /// Only keys not yet present land; existing entries are untouched.
    IfAbsent,
    /// Keys that are absent or hold a neutral value land; real data is
    /// never overwritten.
    IfNull,
}

impl PropertyView {
    /// Ingest a data blob under the given policy.
    ///
    /// Falsy input (neutral, empty map, empty sequence, zero, empty string)
    /// is a silent no-op. A map ingests entry by entry; a nested view ingests
    /// its full export; a sequence appends positionally. Any other value is a
    /// [`ViewError::NonTraversable`] error.
    ///
    /// The policy's per-entry existence/neutrality filter applies to map and
    /// view input. Sequence input appends under fresh positional keys, which
    /// every policy admits; if sequences ever gain keyed entries, they must
    /// go through the same filter as map entries.
    pub fn ingest(&mut self, data: Value, policy: IngestPolicy) -> Result<(), ViewError> {
        if data.is_falsy() {
            return Ok(());
        }
        match data {
            Value::Map(map) => self.ingest_map(map, policy),
            Value::View(rc) => {
                let exported = rc.borrow().to_map(None, true);
                self.ingest_map(exported, policy)
            }
            Value::Seq(items) => self.ingest_seq(items, policy),
            _ => Err(ViewError::NonTraversable),
        }
    }

    fn ingest_map(
        &mut self,
        data: IndexMap<String, Value>,
        policy: IngestPolicy,
    ) -> Result<(), ViewError> {
        let mut direct: IndexMap<String, Value> = IndexMap::new();
        // Setter-bound entries run after the direct merge, in input order.
        let mut deferred: Vec<(String, Value)> = Vec::new();

        for (key, value) in data {
            let resolved = self.resolved_key(&key).to_string();
            if !self.admits(&resolved, policy) {
                continue;
            }
            if self.flags().contains(ViewFlags::REJECT_UNDECLARED)
                && !self.aliases().contains_key(&key)
            {
                continue;
            }
            self.check_valid(&key, &value)?;
            match self.setter_method(&key) {
                Some(method) => deferred.push((method, value)),
                None => {
                    direct.insert(resolved, value);
                }
            }
        }

        self.merge_direct(direct);

        for (method, value) in deferred {
            self.dispatch_setter(&method, value)?;
        }
        Ok(())
    }

    // Appended keys are brand new, so every policy admits them.
    fn ingest_seq(&mut self, items: Vec<Value>, _policy: IngestPolicy) -> Result<(), ViewError> {
        if self.flags().contains(ViewFlags::REJECT_UNDECLARED) {
            return Ok(());
        }
        for item in items {
            self.check_valid("", &item)?;
            self.append(item);
        }
        Ok(())
    }

    fn admits(&self, resolved: &str, policy: IngestPolicy) -> bool {
        match policy {
            IngestPolicy::All => true,
            IngestPolicy::IfAbsent => !self.container().contains_key(resolved),
            IngestPolicy::IfNull => self
                .container()
                .get(resolved)
                .map(Value::is_neutral)
                .unwrap_or(true),
        }
    }
}
