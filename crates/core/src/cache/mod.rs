//! Two-tier descriptor cache
//!
//! Descriptor lookups check an in-process memo first, then the external
//! cache service, and only then invoke the resolver, writing the fresh
//! descriptor through both tiers. The external write is best-effort: a
//! storage fault is logged and swallowed, never surfaced to the caller.
//!
//! ```text
//! get(class) ── memo hit ──────────────────────────▶ Arc<Descriptor>
//!      │ miss
//!      ├─ service hit (JSON) ──▶ memo insert ──────▶ Arc<Descriptor>
//!      │ miss / disabled / parse failure
//!      └─ resolve(registry) ──▶ service write-through (best effort)
//!                            └▶ memo insert ───────▶ Arc<Descriptor>
//! ```
//!
//! The memo is process-wide shared state, read-mostly after warm-up;
//! resolution is pure and idempotent, so a duplicate concurrent resolution
//! is wasted work rather than a correctness problem.

pub mod service;

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::{debug, trace, warn};

use crate::schema::{resolve, Descriptor, SchemaRegistry, LEVEL_ALL};

pub use service::{CacheError, CacheService, MemoryCacheService, NullCacheService, DEFAULT_TTL};

/// Namespace prefix for every key this system writes to the cache service.
pub const KEY_PREFIX: &str = "psa";

/// Memoizing descriptor cache backed by an injected [`CacheService`].
pub struct DescriptorCache {
    memo: DashMap<String, Arc<Descriptor>>,
    service: Arc<dyn CacheService>,
    /// Application-specific key salt, appended to [`KEY_PREFIX`].
    salt: String,
    ttl: Duration,
}

impl DescriptorCache {
    pub fn new(service: Arc<dyn CacheService>) -> Self {
        Self {
            memo: DashMap::new(),
            service,
            salt: String::new(),
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = salt.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn prefix(&self) -> String {
        format!("{KEY_PREFIX}{}", self.salt)
    }

    fn complete_key(&self, class_name: &str) -> String {
        format!("{}{}", self.prefix(), class_name)
    }

    /// Number of descriptors in the in-process tier.
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    /// Get (or resolve) the descriptor for a type.
    ///
    /// Unregistered types resolve to an empty descriptor, which is cached
    /// like any other.
    pub fn get(&self, registry: &SchemaRegistry, class_name: &str) -> Arc<Descriptor> {
        if let Some(hit) = self.memo.get(class_name) {
            trace!(class = class_name, "descriptor memo hit");
            return hit.clone();
        }

        if self.service.is_enabled() {
            if let Some(payload) = self.service.get(&self.complete_key(class_name)) {
                match serde_json::from_str::<Descriptor>(&payload) {
                    Ok(descriptor) => {
                        trace!(class = class_name, "descriptor loaded from cache service");
                        let descriptor = Arc::new(descriptor);
                        self.memo.insert(class_name.to_string(), descriptor.clone());
                        return descriptor;
                    }
                    Err(e) => {
                        warn!(class = class_name, error = %e, "discarding unreadable cached descriptor");
                    }
                }
            }
        }

        let descriptor = Arc::new(match registry.get(class_name) {
            Some(schema) => resolve(
                class_name,
                &schema.default_level,
                &schema.declarations,
                &schema.accessors,
            ),
            None => {
                debug!(class = class_name, "no registered schema, using empty descriptor");
                resolve(class_name, LEVEL_ALL, &[], &crate::schema::AccessorTable::new())
            }
        });

        if self.service.is_enabled() {
            match serde_json::to_string(descriptor.as_ref()) {
                Ok(payload) => {
                    if let Err(e) = self.service.set(&self.complete_key(class_name), payload, self.ttl) {
                        warn!(class = class_name, error = %e, "descriptor write-through failed");
                    }
                }
                Err(e) => {
                    warn!(class = class_name, error = %e, "descriptor serialization failed");
                }
            }
        }

        self.memo.insert(class_name.to_string(), descriptor.clone());
        descriptor
    }

    /// Clear the in-process tier and ask the service to drop every key under
    /// this system's prefix.
    pub fn invalidate_all(&self) {
        self.memo.clear();
        if let Err(e) = self.service.delete_prefix(&self.prefix()) {
            warn!(error = %e, "prefix invalidation failed on cache service");
        }
        debug!("descriptor cache invalidated");
    }
}
