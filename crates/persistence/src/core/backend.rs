//! Backend lifecycle trait.

use async_trait::async_trait;

use crate::error::StorageResult;

/// Identity and liveness of a storage backend.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// A short name identifying the backend implementation.
    fn backend_name(&self) -> &'static str;

    /// Verifies the backend can serve requests.
    ///
    /// Used by the health endpoint; a cheap round trip, not a benchmark.
    async fn ping(&self) -> StorageResult<()>;
}
