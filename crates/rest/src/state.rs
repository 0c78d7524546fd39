//! Application state for the REST API.

use std::sync::Arc;

use lectern_persistence::RecordService;
use lectern_persistence::core::Store;
use lectern_persistence::services::CacheService;
use lectern_persistence::tenant::{TenantId, TenantSettings};

use crate::auth::TokenService;
use crate::config::ServerConfig;
use crate::tenant::TenantRegistry;

/// Shared application state for the REST API.
///
/// Holds everything handlers need: the record service over the storage
/// backend, the tenant registry, the session token service, the resolved
/// cache capability, and the server configuration.
///
/// # Type Parameters
///
/// * `S` - The storage backend type (must implement [`Store`])
pub struct AppState<S> {
    service: Arc<RecordService<S>>,
    tenants: Arc<TenantRegistry>,
    tokens: Arc<TokenService>,
    cache: Arc<dyn CacheService>,
    config: Arc<ServerConfig>,
}

// Manual Clone: S itself is behind an Arc and need not be Clone.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            tenants: Arc::clone(&self.tenants),
            tokens: Arc::clone(&self.tokens),
            cache: Arc::clone(&self.cache),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: Store> AppState<S> {
    /// Creates a new AppState.
    pub fn new(
        service: Arc<RecordService<S>>,
        tenants: Arc<TenantRegistry>,
        tokens: Arc<TokenService>,
        cache: Arc<dyn CacheService>,
        config: ServerConfig,
    ) -> Self {
        Self {
            service,
            tenants,
            tokens,
            cache,
            config: Arc::new(config),
        }
    }

    /// Returns the record service.
    pub fn service(&self) -> &RecordService<S> {
        &self.service
    }

    /// Returns the tenant registry.
    pub fn tenants(&self) -> &TenantRegistry {
        &self.tenants
    }

    /// Registers or replaces a tenant's settings.
    ///
    /// Also drops the tenant's cached client configuration view, so the next
    /// request re-exports the new settings.
    pub fn register_tenant(&self, tenant: TenantId, settings: TenantSettings) {
        self.cache.delete(&format!("client:{tenant}"));
        self.tenants.register(tenant, settings);
    }

    /// Returns the token service.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Returns the cache capability.
    pub fn cache(&self) -> &dyn CacheService {
        self.cache.as_ref()
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the default page size for listings.
    pub fn default_page_size(&self) -> usize {
        self.config.default_page_size
    }

    /// Returns the maximum page size for listings and exports.
    pub fn max_page_size(&self) -> usize {
        self.config.max_page_size
    }
}
