//! Local file gateway
//!
//! Persists the document as a JSON file in a data directory, the same layout
//! the reference backend writes. Uses atomic writes (write to temp file, then
//! rename) to prevent corruption, and reads the file back after every write
//! so callers get exactly what was stored.
//!
//! Files:
//! - `dashboard-content.json` - The document
//! - `uploads/` - Copied background images

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{GatewayError, GatewayResult, PersistenceGateway, BLOB_PREFIX, FILE_PREFIX};
use crate::document::Document;
use crate::id::generate_id;

/// Document file name inside the data directory
pub const DOCUMENT_FILE: &str = "dashboard-content.json";

/// Directory (inside the data directory) holding uploaded assets
pub const UPLOADS_DIR: &str = "uploads";

/// Gateway storing the document on the local filesystem
#[derive(Debug, Clone)]
pub struct FileGateway {
    data_dir: PathBuf,
}

impl FileGateway {
    /// Create a gateway rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the document file
    pub fn document_path(&self) -> PathBuf {
        self.data_dir.join(DOCUMENT_FILE)
    }

    /// Path of the uploads directory
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join(UPLOADS_DIR)
    }

    /// Read and parse the stored document
    fn read_document(&self) -> GatewayResult<Value> {
        let path = self.document_path();
        if !path.exists() {
            return Err(GatewayError::NotFound {
                location: path.display().to_string(),
            });
        }

        let text = fs::read_to_string(&path).map_err(|source| GatewayError::ReadError {
            path: path.clone(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|e| GatewayError::InvalidFormat {
            details: format!("{}: {}", path.display(), e),
        })
    }

    /// Copy one local asset into the uploads directory
    fn store_asset(&self, reference: &str) -> GatewayResult<String> {
        let Some(source) = reference.strip_prefix(FILE_PREFIX) else {
            let reason = if reference.starts_with(BLOB_PREFIX) {
                "browser object URLs cannot be read outside the page that created them"
            } else {
                "not a local file reference"
            };
            return Err(GatewayError::UnreadableAsset {
                reference: reference.to_string(),
                reason: reason.to_string(),
            });
        };

        let source = Path::new(source);
        let bytes = fs::read(source).map_err(|e| GatewayError::UnreadableAsset {
            reference: reference.to_string(),
            reason: e.to_string(),
        })?;

        let name = match source.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("bg-{}.{}", generate_id(), ext),
            None => format!("bg-{}", generate_id()),
        };
        let target = self.uploads_dir().join(&name);
        atomic_write(&target, &bytes)?;

        Ok(format!("/{}/{}", UPLOADS_DIR, name))
    }
}

#[async_trait]
impl PersistenceGateway for FileGateway {
    fn location(&self) -> String {
        self.document_path().display().to_string()
    }

    async fn fetch_document(&self) -> GatewayResult<Value> {
        debug!("Reading document from {:?}", self.document_path());
        self.read_document()
    }

    async fn save_document(&self, document: &Document) -> GatewayResult<Value> {
        let bytes = serde_json::to_vec_pretty(document)?;
        let path = self.document_path();
        debug!("Writing {} bytes to {:?}", bytes.len(), path);

        atomic_write(&path, &bytes)?;

        // Read back the saved content to confirm
        self.read_document()
    }

    async fn upload_assets(&self, assets: &[String]) -> GatewayResult<Vec<String>> {
        assets
            .iter()
            .map(|reference| self.store_asset(reference))
            .collect()
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
fn atomic_write(path: &Path, data: &[u8]) -> GatewayResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| GatewayError::from_io(e, parent.to_path_buf()))?;
    }

    // Same directory so the rename stays atomic
    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| GatewayError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| GatewayError::from_io(e, temp_path.clone()))?;

    file.sync_all()
        .map_err(|e| GatewayError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|e| GatewayError::from_io(e, path.to_path_buf()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SiteContent;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fetch_missing_document() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = FileGateway::new(temp_dir.path());

        assert!(!gateway.document_path().exists());
        let err = gateway.fetch_document().await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_save_and_fetch() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = FileGateway::new(temp_dir.path());

        let mut document = Document::default();
        document.content.logo_text = "Cue Club".to_string();
        document.history.push(document.content.clone());

        let echoed = gateway.save_document(&document).await.unwrap();
        assert!(gateway.document_path().exists());
        assert_eq!(echoed["content"]["logoText"], "Cue Club");

        let fetched = gateway.fetch_document().await.unwrap();
        let parsed = Document::from_value(&fetched).unwrap();
        assert_eq!(parsed.content.logo_text, "Cue Club");
        assert_eq!(parsed.history.len(), 1);
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_document() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = FileGateway::new(temp_dir.path());

        let mut document = Document::default();
        gateway.save_document(&document).await.unwrap();

        document.content = SiteContent {
            logo_text: "Second".to_string(),
            ..SiteContent::default()
        };
        gateway.save_document(&document).await.unwrap();

        let fetched = gateway.fetch_document().await.unwrap();
        assert_eq!(fetched["content"]["logoText"], "Second");
        assert!(!temp_dir.path().join("dashboard-content.tmp").exists());
    }

    #[tokio::test]
    async fn test_fetch_corrupt_document() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = FileGateway::new(temp_dir.path());
        fs::write(gateway.document_path(), "{ not json").unwrap();

        let err = gateway.fetch_document().await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidFormat { .. }));
    }

    #[tokio::test]
    async fn test_upload_copies_local_files() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("terrace.png");
        fs::write(&source, b"png bytes").unwrap();

        let gateway = FileGateway::new(temp_dir.path().join("data"));
        let reference = format!("file://{}", source.display());
        let urls = gateway.upload_assets(&[reference]).await.unwrap();

        assert_eq!(urls.len(), 1);
        assert!(urls[0].starts_with("/uploads/bg-"));
        assert!(urls[0].ends_with(".png"));

        let stored = gateway
            .data_dir()
            .join(urls[0].trim_start_matches('/'));
        assert_eq!(fs::read(stored).unwrap(), b"png bytes");
    }

    #[tokio::test]
    async fn test_upload_rejects_blob_references() {
        let temp_dir = TempDir::new().unwrap();
        let gateway = FileGateway::new(temp_dir.path());

        let err = gateway
            .upload_assets(&["blob:http://localhost/abc".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::UnreadableAsset { .. }));
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir
            .path()
            .join("a")
            .join("b")
            .join("c")
            .join("file.txt");

        atomic_write(&nested_path, b"test data").unwrap();

        assert!(nested_path.exists());
        let content = fs::read_to_string(&nested_path).unwrap();
        assert_eq!(content, "test data");
    }
}
