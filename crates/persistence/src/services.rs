//! Capability services and their registry.
//!
//! Cross-cutting capabilities (caching, audit logging) are addressed by URI:
//! the scheme selects a factory registered at startup, and the rest of the
//! URI is handed to the factory as configuration. Swapping `memory://` for a
//! shared cache is then a config change, not a code change.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{ConfigError, StorageResult};
use crate::tenant::TenantId;
use crate::types::RecordKind;

/// A key-value cache capability.
pub trait CacheService: Send + Sync {
    /// Returns the cached value for a key, if any.
    fn get(&self, key: &str) -> Option<String>;
    /// Stores a value under a key.
    fn set(&self, key: &str, value: String);
    /// Removes a key.
    fn delete(&self, key: &str);
}

/// An audit trail capability, appended to on every mutation.
pub trait AuditLog: Send + Sync {
    /// Records that `userid` performed `action` on `kind/id` in `tenant`.
    fn append(&self, tenant: &TenantId, userid: &str, action: &str, kind: RecordKind, id: i64);
}

/// In-process cache backed by a hash map. The `memory://` scheme.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl CacheService for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries.write().insert(key.to_string(), value);
    }

    fn delete(&self, key: &str) {
        self.entries.write().remove(key);
    }
}

/// Audit sink that emits structured log events. The `log://` scheme.
pub struct TracingAuditLog;

impl AuditLog for TracingAuditLog {
    fn append(&self, tenant: &TenantId, userid: &str, action: &str, kind: RecordKind, id: i64) {
        tracing::info!(
            target: "lectern::audit",
            tenant = %tenant,
            user = userid,
            action,
            kind = %kind,
            id,
            "audit"
        );
    }
}

type CacheFactory = Box<dyn Fn(&str) -> StorageResult<Arc<dyn CacheService>> + Send + Sync>;
type AuditFactory = Box<dyn Fn(&str) -> StorageResult<Arc<dyn AuditLog>> + Send + Sync>;

/// Maps capability URI schemes to factories.
///
/// Resolution happens once at startup; an unknown scheme is a fatal
/// configuration error rather than a silent fallback.
pub struct ServiceRegistry {
    cache_factories: HashMap<String, CacheFactory>,
    audit_factories: HashMap<String, AuditFactory>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            cache_factories: HashMap::new(),
            audit_factories: HashMap::new(),
        }
    }

    /// Creates a registry with the built-in schemes registered:
    /// `memory://` for caching and `log://` for auditing.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_cache("memory", |_rest| Ok(Arc::new(MemoryCache::default())));
        registry.register_audit("log", |_rest| Ok(Arc::new(TracingAuditLog)));
        registry
    }

    /// Registers a cache factory for a scheme.
    pub fn register_cache<F>(&mut self, scheme: &str, factory: F)
    where
        F: Fn(&str) -> StorageResult<Arc<dyn CacheService>> + Send + Sync + 'static,
    {
        self.cache_factories
            .insert(scheme.to_string(), Box::new(factory));
    }

    /// Registers an audit factory for a scheme.
    pub fn register_audit<F>(&mut self, scheme: &str, factory: F)
    where
        F: Fn(&str) -> StorageResult<Arc<dyn AuditLog>> + Send + Sync + 'static,
    {
        self.audit_factories
            .insert(scheme.to_string(), Box::new(factory));
    }

    /// Resolves a cache service from its URI.
    pub fn resolve_cache(&self, uri: &str) -> StorageResult<Arc<dyn CacheService>> {
        let (scheme, rest) = split_uri(uri)?;
        let factory = self
            .cache_factories
            .get(scheme)
            .ok_or_else(|| ConfigError::UnknownScheme {
                scheme: scheme.to_string(),
            })?;
        factory(rest)
    }

    /// Resolves an audit log from its URI.
    pub fn resolve_audit(&self, uri: &str) -> StorageResult<Arc<dyn AuditLog>> {
        let (scheme, rest) = split_uri(uri)?;
        let factory = self
            .audit_factories
            .get(scheme)
            .ok_or_else(|| ConfigError::UnknownScheme {
                scheme: scheme.to_string(),
            })?;
        factory(rest)
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn split_uri(uri: &str) -> Result<(&str, &str), ConfigError> {
    uri.split_once("://")
        .filter(|(scheme, _)| !scheme.is_empty())
        .ok_or_else(|| ConfigError::MalformedUri {
            uri: uri.to_string(),
        })
}
