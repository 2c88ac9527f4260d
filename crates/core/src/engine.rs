//! Engine facade: registry + descriptor cache + view construction.
//!
//! The engine wires the three collaborators together: types register their
//! schemas once, descriptors resolve lazily through the two-tier cache, and
//! views come out bound to their type's descriptor and accessor table.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheService, DescriptorCache, MemoryCacheService, NullCacheService};
use crate::config::EngineConfig;
use crate::schema::{AccessorTable, Descriptor, SchemaRegistry, ViewSchema};
use crate::value::Value;
use crate::view::{IngestPolicy, PropertyView, ViewError, ViewFlags};

pub struct ViewEngine {
    registry: SchemaRegistry,
    cache: DescriptorCache,
}

impl ViewEngine {
    /// An engine backed by the given cache service.
    pub fn new(service: Arc<dyn CacheService>) -> Self {
        Self {
            registry: SchemaRegistry::new(),
            cache: DescriptorCache::new(service),
        }
    }

    /// An engine with a process-local external tier. Descriptors survive
    /// [`invalidate_all`](Self::invalidate_all) of other engines sharing the
    /// service, but not the process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCacheService::new()))
    }

    /// Build an engine from configuration. A disabled cache section plugs in
    /// the no-op service, so only the in-process memo tier remains.
    pub fn from_config(config: &EngineConfig) -> Self {
        let service: Arc<dyn CacheService> = if config.cache.enabled {
            Arc::new(MemoryCacheService::new())
        } else {
            Arc::new(NullCacheService)
        };
        let cache = DescriptorCache::new(service)
            .with_salt(config.cache.salt.clone())
            .with_ttl(Duration::from_secs(config.cache.ttl_seconds));
        debug!(
            enabled = config.cache.enabled,
            ttl = config.cache.ttl_seconds,
            "engine configured"
        );
        Self {
            registry: SchemaRegistry::new(),
            cache,
        }
    }

    /// Register a schema type. Idempotent.
    pub fn register<T: ViewSchema>(&self) {
        self.registry.register::<T>();
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The resolved descriptor for a type name, from cache or fresh.
    pub fn descriptor(&self, class_name: &str) -> Arc<Descriptor> {
        self.cache.get(&self.registry, class_name)
    }

    /// Drop every cached descriptor, in-process and external. Call after
    /// changing a type's declarations at runtime.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// A view of `data` under `T`'s schema.
    pub fn view<T: ViewSchema>(&self, data: Value) -> Result<PropertyView, ViewError> {
        self.view_with_flags::<T>(data, ViewFlags::empty())
    }

    /// A view of `data` under `T`'s schema with behavior flags applied
    /// before ingestion, so reject-undeclared filters the initial data too.
    pub fn view_with_flags<T: ViewSchema>(
        &self,
        data: Value,
        flags: ViewFlags,
    ) -> Result<PropertyView, ViewError> {
        self.register::<T>();
        let descriptor = self.descriptor(T::class_name());
        let mut view = PropertyView::from_descriptor(&descriptor, T::accessors());
        view.set_flags(flags);
        view.ingest(data, IngestPolicy::All)?;
        Ok(view)
    }

    /// Recompute the descriptor-derived fields of a view that went through
    /// [`PropertyView::prepare_for_cache`]. A view of an unregistered type
    /// gets the empty descriptor, leaving its data reachable by exact key.
    pub fn reactivate(&self, view: &mut PropertyView) {
        let class_name = view.class_name().to_string();
        let descriptor = self.descriptor(&class_name);
        let accessors = self
            .registry
            .get(&class_name)
            .map(|schema| schema.accessors.clone())
            .unwrap_or_default();
        view.apply_descriptor(&descriptor, accessors);
    }
}

impl Default for ViewEngine {
    fn default() -> Self {
        Self::in_memory()
    }
}
