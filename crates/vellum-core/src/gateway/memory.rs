//! In-memory gateway
//!
//! Holds the document in memory. Failures can be injected per operation,
//! either for the next call only or for every call, which makes it the
//! gateway of choice for exercising the store's error paths.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::{GatewayError, GatewayResult, PersistenceGateway};
use crate::document::Document;

/// Which operation a failure is injected into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Save,
    Upload,
}

/// How long an injected failure lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Once,
    Always,
}

#[derive(Debug, Default)]
struct State {
    document: Option<Value>,
    fetch_failure: Option<Failure>,
    save_failure: Option<Failure>,
    upload_failure: Option<Failure>,
    /// URLs handed out by the next upload, instead of generated ones
    upload_urls: Option<Vec<String>>,
    save_count: usize,
    upload_count: usize,
    uploaded: Vec<String>,
}

impl State {
    fn slot(&mut self, op: Operation) -> &mut Option<Failure> {
        match op {
            Operation::Fetch => &mut self.fetch_failure,
            Operation::Save => &mut self.save_failure,
            Operation::Upload => &mut self.upload_failure,
        }
    }

    /// Consume the injected failure for `op`, if any
    fn take_failure(&mut self, op: Operation) -> bool {
        let slot = self.slot(op);
        match *slot {
            Some(Failure::Once) => {
                *slot = None;
                true
            }
            Some(Failure::Always) => true,
            None => false,
        }
    }
}

/// Gateway that keeps the document in memory
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<State>,
}

impl MemoryGateway {
    /// Create an empty gateway (fetch fails with not found)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gateway that already holds `document`
    pub fn with_document(document: Value) -> Self {
        let gateway = Self::new();
        gateway.lock().document = Some(document);
        gateway
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock leaves plain data behind
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fail the next call of `op`
    pub fn fail_next(&self, op: Operation) {
        *self.lock().slot(op) = Some(Failure::Once);
    }

    /// Fail every call of `op` until [`MemoryGateway::recover`]
    pub fn fail_always(&self, op: Operation) {
        *self.lock().slot(op) = Some(Failure::Always);
    }

    /// Clear injected failures for `op`
    pub fn recover(&self, op: Operation) {
        *self.lock().slot(op) = None;
    }

    /// Answer the next upload with these URLs, whatever the asset count
    pub fn set_upload_urls(&self, urls: Vec<String>) {
        self.lock().upload_urls = Some(urls);
    }

    /// The currently stored document
    pub fn document(&self) -> Option<Value> {
        self.lock().document.clone()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.lock().save_count
    }

    /// Number of successful uploads
    pub fn upload_count(&self) -> usize {
        self.lock().upload_count
    }

    /// Every asset reference uploaded so far
    pub fn uploaded(&self) -> Vec<String> {
        self.lock().uploaded.clone()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    fn location(&self) -> String {
        "memory".to_string()
    }

    async fn fetch_document(&self) -> GatewayResult<Value> {
        let mut state = self.lock();
        if state.take_failure(Operation::Fetch) {
            return Err(GatewayError::Unreachable("injected fetch failure".to_string()));
        }
        state.document.clone().ok_or_else(|| GatewayError::NotFound {
            location: "memory".to_string(),
        })
    }

    async fn save_document(&self, document: &Document) -> GatewayResult<Value> {
        let mut state = self.lock();
        if state.take_failure(Operation::Save) {
            return Err(GatewayError::Unreachable("injected save failure".to_string()));
        }
        let value = document.to_value()?;
        state.document = Some(value.clone());
        state.save_count += 1;
        Ok(value)
    }

    async fn upload_assets(&self, assets: &[String]) -> GatewayResult<Vec<String>> {
        let mut state = self.lock();
        if state.take_failure(Operation::Upload) {
            return Err(GatewayError::EndpointUnavailable {
                url: "memory://upload".to_string(),
            });
        }

        let urls = match state.upload_urls.take() {
            Some(urls) => urls,
            None => {
                let start = state.uploaded.len();
                (0..assets.len())
                    .map(|i| format!("https://assets.test/bg-{}.png", start + i + 1))
                    .collect()
            }
        };
        state.uploaded.extend(assets.iter().cloned());
        state.upload_count += 1;
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_empty_gateway_not_found() {
        let gateway = MemoryGateway::new();
        assert!(matches!(
            gateway.fetch_document().await,
            Err(GatewayError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_save_then_fetch() {
        let gateway = MemoryGateway::new();
        let document = Document::default();

        gateway.save_document(&document).await.unwrap();
        assert_eq!(gateway.save_count(), 1);

        let fetched = gateway.fetch_document().await.unwrap();
        assert_eq!(fetched, document.to_value().unwrap());
    }

    #[tokio::test]
    async fn test_fail_next_is_one_shot() {
        let gateway = MemoryGateway::with_document(json!({ "content": {} }));
        gateway.fail_next(Operation::Fetch);

        assert!(gateway.fetch_document().await.is_err());
        assert!(gateway.fetch_document().await.is_ok());
    }

    #[tokio::test]
    async fn test_fail_always_until_recovered() {
        let gateway = MemoryGateway::new();
        gateway.fail_always(Operation::Save);

        let document = Document::default();
        assert!(gateway.save_document(&document).await.is_err());
        assert!(gateway.save_document(&document).await.is_err());
        assert_eq!(gateway.save_count(), 0);
        assert!(gateway.document().is_none());

        gateway.recover(Operation::Save);
        assert!(gateway.save_document(&document).await.is_ok());
    }

    #[tokio::test]
    async fn test_upload_urls() {
        let gateway = MemoryGateway::new();
        let assets = vec!["file:///a.png".to_string(), "file:///b.png".to_string()];

        let urls = gateway.upload_assets(&assets).await.unwrap();
        assert_eq!(urls.len(), 2);
        assert_eq!(gateway.uploaded(), assets);

        gateway.set_upload_urls(vec!["https://x/1.png".to_string()]);
        let urls = gateway.upload_assets(&assets).await.unwrap();
        assert_eq!(urls, vec!["https://x/1.png".to_string()]);
        assert_eq!(gateway.upload_count(), 2);
    }
}
