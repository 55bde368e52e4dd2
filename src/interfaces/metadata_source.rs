use async_trait::async_trait;

use crate::error::Result;

/// Read-only key-value source the metadata registry refreshes from. Blobs
/// live under fixed, well-known keys; `None` means the key has never been
/// published.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<Option<String>>;
}
