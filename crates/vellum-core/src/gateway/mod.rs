//! Persistence gateways
//!
//! The gateway is the only part of the system that performs I/O. The
//! [`ContentStore`](crate::store::ContentStore) hands it whole documents and
//! pending assets and gets back success or a [`GatewayError`].
//!
//! ## Implementations
//!
//! - [`HttpGateway`]: the dashboard backend over HTTP
//! - [`FileGateway`]: a JSON file in a local directory
//! - [`MemoryGateway`]: in-memory, with failure injection for tests

use async_trait::async_trait;
use serde_json::Value;

use crate::document::Document;

pub mod error;
pub mod file;
pub mod http;
pub mod memory;

pub use error::{GatewayError, GatewayResult};
pub use file::FileGateway;
pub use http::HttpGateway;
pub use memory::{MemoryGateway, Operation};

/// Prefix of browser object URLs, only valid inside the page that made them
pub const BLOB_PREFIX: &str = "blob:";

/// Prefix of local files waiting to be uploaded
pub const FILE_PREFIX: &str = "file://";

/// Whether an image reference still points at a local, unpersisted asset
pub fn is_pending_asset(reference: &str) -> bool {
    reference.starts_with(BLOB_PREFIX) || reference.starts_with(FILE_PREFIX)
}

/// Backend the content store persists to
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Human readable location of the backend (URL or path)
    fn location(&self) -> String;

    /// Fetch the raw stored document
    ///
    /// Fails with [`GatewayError::NotFound`] when nothing has been saved yet.
    async fn fetch_document(&self) -> GatewayResult<Value>;

    /// Persist a document, returning what the backend stored
    async fn save_document(&self, document: &Document) -> GatewayResult<Value>;

    /// Upload pending local assets, returning one URL per asset in order
    async fn upload_assets(&self, assets: &[String]) -> GatewayResult<Vec<String>>;
}

#[async_trait]
impl<G: PersistenceGateway + ?Sized> PersistenceGateway for Box<G> {
    fn location(&self) -> String {
        (**self).location()
    }

    async fn fetch_document(&self) -> GatewayResult<Value> {
        (**self).fetch_document().await
    }

    async fn save_document(&self, document: &Document) -> GatewayResult<Value> {
        (**self).save_document(document).await
    }

    async fn upload_assets(&self, assets: &[String]) -> GatewayResult<Vec<String>> {
        (**self).upload_assets(assets).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pending_asset() {
        assert!(is_pending_asset("blob:http://localhost:3000/1f2e"));
        assert!(is_pending_asset("file:///tmp/bg.png"));
        assert!(!is_pending_asset("https://cdn.example.com/bg.png"));
        assert!(!is_pending_asset("/uploads/bg.png"));
    }

    #[tokio::test]
    async fn test_boxed_gateway_delegates() {
        let gateway: Box<dyn PersistenceGateway> = Box::new(MemoryGateway::new());
        assert_eq!(gateway.location(), "memory");

        gateway.save_document(&Document::default()).await.unwrap();
        assert!(gateway.fetch_document().await.is_ok());
    }
}
