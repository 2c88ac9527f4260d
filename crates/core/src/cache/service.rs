//! External cache service contract and backends
//!
//! The descriptor cache persists resolved descriptors through this generic
//! key/value contract so they survive process restarts. The service is an
//! injected collaborator; a fault here must never block descriptor
//! resolution, so every write is best-effort from the caller's side.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// Default entry lifetime for persisted descriptors.
pub const DEFAULT_TTL: Duration = Duration::from_secs(86_400);

/// Cache service errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache service is disabled")]
    Disabled,

    #[error("cache storage error: {0}")]
    Storage(String),

    #[error("failed to encode cached descriptor: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Generic key/value store with TTL and prefix deletion.
///
/// Payloads are opaque strings; the descriptor cache stores JSON. All keys
/// written by this system share one prefix so `delete_prefix` can drop them
/// without touching unrelated entries in a shared store.
pub trait CacheService: Send + Sync {
    /// Fetch a live entry; expired or missing keys yield `None`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store an entry with the given lifetime.
    fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Drop every entry whose key starts with `prefix`.
    fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError>;

    /// Whether the service currently accepts reads and writes.
    fn is_enabled(&self) -> bool;
}

/// In-process cache service backend.
///
/// Entries expire lazily: an expired entry is dropped on the read that
/// observes it. Suitable as the default backend and for tests; a deployment
/// backed by an external store implements [`CacheService`] itself.
#[derive(Default)]
pub struct MemoryCacheService {
    entries: RwLock<HashMap<String, (String, Instant)>>,
    disabled: AtomicBool,
}

impl MemoryCacheService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&self) {
        self.disabled.store(false, Ordering::Relaxed);
    }

    pub fn disable(&self) {
        self.disabled.store(true, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl CacheService for MemoryCacheService {
    fn get(&self, key: &str) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        let expired = {
            let entries = self.entries.read();
            match entries.get(key) {
                Some((value, deadline)) => {
                    if Instant::now() < *deadline {
                        return Some(value.clone());
                    }
                    true
                }
                None => false,
            }
        };
        if expired {
            self.entries.write().remove(key);
        }
        None
    }

    fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        if !self.is_enabled() {
            return Err(CacheError::Disabled);
        }
        let deadline = Instant::now() + ttl;
        self.entries.write().insert(key.to_string(), (value, deadline));
        Ok(())
    }

    fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        self.entries.write().retain(|k, _| !k.starts_with(prefix));
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        !self.disabled.load(Ordering::Relaxed)
    }
}

/// A permanently-disabled service: the descriptor cache degrades to
/// resolver-plus-in-process-memoization.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCacheService;

impl CacheService for NullCacheService {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Disabled)
    }

    fn delete_prefix(&self, _prefix: &str) -> Result<(), CacheError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_round_trip() {
        let svc = MemoryCacheService::new();
        svc.set("psa:Customer", "{}".into(), DEFAULT_TTL).unwrap();
        assert_eq!(svc.get("psa:Customer"), Some("{}".to_string()));
        assert_eq!(svc.get("psa:Other"), None);
    }

    #[test]
    fn test_expired_entries_are_dropped_on_read() {
        let svc = MemoryCacheService::new();
        svc.set("k", "v".into(), Duration::from_secs(0)).unwrap();
        assert_eq!(svc.get("k"), None);
        assert!(svc.is_empty());
    }

    #[test]
    fn test_delete_prefix_spares_other_keys() {
        let svc = MemoryCacheService::new();
        svc.set("psaA", "1".into(), DEFAULT_TTL).unwrap();
        svc.set("psaB", "2".into(), DEFAULT_TTL).unwrap();
        svc.set("other", "3".into(), DEFAULT_TTL).unwrap();
        svc.delete_prefix("psa").unwrap();
        assert_eq!(svc.get("psaA"), None);
        assert_eq!(svc.get("other"), Some("3".to_string()));
    }

    #[test]
    fn test_disabled_service_rejects_writes_and_hides_reads() {
        let svc = MemoryCacheService::new();
        svc.set("k", "v".into(), DEFAULT_TTL).unwrap();
        svc.disable();
        assert!(!svc.is_enabled());
        assert_eq!(svc.get("k"), None);
        assert!(matches!(
            svc.set("k2", "v".into(), DEFAULT_TTL),
            Err(CacheError::Disabled)
        ));
        svc.enable();
        assert_eq!(svc.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_null_service() {
        let svc = NullCacheService;
        assert!(!svc.is_enabled());
        assert_eq!(svc.get("k"), None);
        assert!(svc.delete_prefix("psa").is_ok());
    }
}
