//! Tenant context threaded through storage operations.

use std::sync::Arc;

use crate::auth::{self, Action, Principal, Visibility};
use crate::error::AccessError;
use crate::types::{RecordKind, StoredRecord};

use super::id::TenantId;
use super::settings::TenantSettings;

/// The tenant partition and acting principal of one request.
///
/// A context is built once per request from the tenant header and the
/// session token, then passed to every access-layer call. It owns a handle
/// to the tenant's settings so validation never needs a second lookup.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use lectern_persistence::auth::{Principal, Role};
/// use lectern_persistence::tenant::{TenantContext, TenantId, TenantSettings};
///
/// let ctx = TenantContext::new(
///     TenantId::new("default").unwrap(),
///     Principal::with_role("jdoe", Role::Editor),
///     Arc::new(TenantSettings::default()),
/// );
/// assert_eq!(ctx.tenant_id().as_str(), "default");
/// ```
#[derive(Debug, Clone)]
pub struct TenantContext {
    tenant_id: TenantId,
    principal: Principal,
    settings: Arc<TenantSettings>,
}

impl TenantContext {
    /// Creates a context for the given tenant and principal.
    pub fn new(tenant_id: TenantId, principal: Principal, settings: Arc<TenantSettings>) -> Self {
        Self {
            tenant_id,
            principal,
            settings,
        }
    }

    /// Returns the tenant id.
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Returns the acting principal.
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Returns the tenant settings.
    pub fn settings(&self) -> &TenantSettings {
        &self.settings
    }

    /// Checks a collection-level action against the principal.
    pub fn authorize(&self, action: Action, kind: RecordKind) -> Result<(), AccessError> {
        auth::authorize(&self.principal, action, kind, None)
    }

    /// Checks a record-level action against the principal.
    pub fn authorize_record(
        &self,
        action: Action,
        record: &StoredRecord,
    ) -> Result<(), AccessError> {
        auth::authorize(&self.principal, action, record.kind, Some(record))
    }

    /// Returns the listing visibility filter for the principal.
    pub fn visibility(&self) -> Visibility {
        auth::visibility(&self.principal)
    }
}
