//! Source document storage seam.

use async_trait::async_trait;

use crate::Result;

/// Boundary to durable byte storage for uploaded source documents.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Reads the full content of a stored object by its locator.
    ///
    /// Returns a not-found error if the locator does not resolve.
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>>;
}
