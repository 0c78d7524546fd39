//! Tenant resolution for incoming requests.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use lectern_persistence::tenant::{TenantId, TenantSettings};

/// Registry of known tenants and their settings.
///
/// Requests select a tenant with the `X-Tenant-ID` header; absent the
/// header, the configured default tenant applies. Unknown tenants are
/// rejected, not lazily created.
pub struct TenantRegistry {
    default: TenantId,
    tenants: RwLock<HashMap<TenantId, Arc<TenantSettings>>>,
}

impl TenantRegistry {
    /// Creates a registry holding the default tenant with default settings.
    pub fn new(default: TenantId) -> Self {
        let mut tenants = HashMap::new();
        tenants.insert(default.clone(), Arc::new(TenantSettings::default()));
        Self {
            default,
            tenants: RwLock::new(tenants),
        }
    }

    /// Returns the default tenant id.
    pub fn default_tenant(&self) -> &TenantId {
        &self.default
    }

    /// Registers or replaces a tenant.
    pub fn register(&self, tenant: TenantId, settings: TenantSettings) {
        self.tenants.write().insert(tenant, Arc::new(settings));
    }

    /// Looks up a tenant's settings.
    pub fn get(&self, tenant: &TenantId) -> Option<Arc<TenantSettings>> {
        self.tenants.read().get(tenant).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tenant_is_registered() {
        let registry = TenantRegistry::new(TenantId::new("default").unwrap());
        assert!(registry.get(registry.default_tenant()).is_some());
    }

    #[test]
    fn test_unknown_tenant_is_none() {
        let registry = TenantRegistry::new(TenantId::new("default").unwrap());
        assert!(registry.get(&TenantId::new("other").unwrap()).is_none());
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = TenantRegistry::new(TenantId::new("default").unwrap());
        let other = TenantId::new("other").unwrap();
        registry.register(other.clone(), TenantSettings::new("Other Repo"));
        assert_eq!(registry.get(&other).unwrap().title, "Other Repo");
    }
}
