//! Versioned content store
//!
//! The `ContentStore` owns the editable site content and coordinates:
//! - the live aggregate being edited
//! - the baseline (last persisted snapshot) used for dirty tracking
//! - the bounded version history
//! - the persistence gateway
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = ContentStore::new(HttpGateway::from_config(&config)?);
//! store.load().await;
//!
//! store.try_mutate(|c| edit::set_field(c, "logoText", "Cue Club"))?;
//! let outcome = store.save(SaveMeta::default()).await?;
//! println!("saved version {}", outcome.version);
//! ```
//!
//! ## Consistency
//!
//! Every persisting operation builds the new ledger on a copy and only
//! installs it once the gateway confirms the write. The one exception is
//! `revert`: the live aggregate switches to the chosen version before the
//! write, and stays there if the write fails.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dirty::{is_dirty, SaveStatus};
use crate::document::{Document, DocumentError};
use crate::edit::EditError;
use crate::gateway::{is_pending_asset, GatewayError, PersistenceGateway};
use crate::history::{HistoryLedger, INITIAL_VERSION};
use crate::models::{GameRule, NewsPost, SiteContent, VersionMeta};

/// Errors returned by store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Content has not been loaded yet")]
    NotLoaded,

    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("No version at position {index} (history has {len} entries)")]
    VersionIndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Invalid document: {0}")]
    InvalidDocument(#[from] DocumentError),

    #[error(transparent)]
    Edit(#[from] EditError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Where the content came from on load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Fetched from the backend
    Remote,
    /// Backend unavailable or empty, built-in defaults installed
    Defaults,
}

impl LoadSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, LoadSource::Remote)
    }
}

/// Optional label and note for a save
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveMeta {
    pub name: Option<String>,
    pub note: Option<String>,
}

impl SaveMeta {
    pub fn new(name: Option<String>, note: Option<String>) -> Self {
        Self { name, note }
    }
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Version the content was saved as
    pub version: String,
    /// Pending image references removed because they could not be uploaded
    pub dropped_assets: Vec<String>,
}

/// Editable, versioned site content backed by a gateway
pub struct ContentStore<G: PersistenceGateway> {
    gateway: G,
    loaded: bool,
    content: SiteContent,
    baseline: SiteContent,
    ledger: HistoryLedger,
    active_version: String,
    status: SaveStatus,
    news: Vec<NewsPost>,
    game_rules: Vec<GameRule>,
}

impl<G: PersistenceGateway> ContentStore<G> {
    /// Create a store that has not loaded anything yet
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            loaded: false,
            content: SiteContent::default(),
            baseline: SiteContent::default(),
            ledger: HistoryLedger::new(),
            active_version: INITIAL_VERSION.to_string(),
            status: SaveStatus::Saved,
            news: Vec::new(),
            game_rules: Vec::new(),
        }
    }

    // ==================== Accessors ====================

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The live aggregate
    pub fn content(&self) -> &SiteContent {
        &self.content
    }

    /// The last persisted snapshot
    pub fn baseline(&self) -> &SiteContent {
        &self.baseline
    }

    /// Saved versions, newest first
    pub fn history(&self) -> &[SiteContent] {
        self.ledger.entries()
    }

    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    /// Whether the live aggregate differs from the baseline
    pub fn is_dirty(&self) -> bool {
        is_dirty(&self.content, &self.baseline)
    }

    /// Version the live aggregate is based on
    pub fn active_version(&self) -> &str {
        &self.active_version
    }

    /// Version the next save will get
    pub fn next_version(&self) -> String {
        self.ledger.next_version()
    }

    /// Position of `version` in the history
    pub fn find_version(&self, version: &str) -> Option<usize> {
        self.ledger.position_of(version)
    }

    pub fn news(&self) -> &[NewsPost] {
        &self.news
    }

    pub fn game_rules(&self) -> &[GameRule] {
        &self.game_rules
    }

    /// The document as it would be persisted now
    pub fn document(&self) -> Document {
        self.document_with(self.content.clone(), &self.ledger)
    }

    fn document_with(&self, content: SiteContent, ledger: &HistoryLedger) -> Document {
        Document {
            content,
            history: ledger.to_vec(),
            news: self.news.clone(),
            game_rules: self.game_rules.clone(),
        }
    }

    fn ensure_loaded(&self) -> StoreResult<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(StoreError::NotLoaded)
        }
    }

    /// Operations that write must not overlap a save
    fn ensure_writable(&self) -> StoreResult<()> {
        self.ensure_loaded()?;
        if self.status == SaveStatus::Saving {
            return Err(StoreError::SaveInProgress);
        }
        Ok(())
    }

    fn index_error(&self, index: usize) -> StoreError {
        StoreError::VersionIndexOutOfRange {
            index,
            len: self.ledger.len(),
        }
    }

    fn refresh_status(&mut self) {
        let dirty = self.is_dirty();
        self.status = self.status.recompute(dirty);
    }

    // ==================== Loading ====================

    /// Load content and history from the gateway
    ///
    /// Never fails: when the backend is unreachable, empty or returns
    /// garbage, the built-in defaults are installed with an empty history.
    pub async fn load(&mut self) -> LoadSource {
        match self.fetch().await {
            Ok(document) => {
                info!(
                    "Loaded content from {} ({} versions)",
                    self.gateway.location(),
                    document.history.len()
                );
                self.install(document);
                LoadSource::Remote
            }
            Err(e) => {
                warn!(
                    "Could not load content from {}, using defaults: {}",
                    self.gateway.location(),
                    e
                );
                self.install(Document::default());
                LoadSource::Defaults
            }
        }
    }

    async fn fetch(&self) -> StoreResult<Document> {
        let raw = self.gateway.fetch_document().await?;
        Ok(Document::from_value(&raw)?)
    }

    fn install(&mut self, document: Document) {
        self.active_version = document
            .content
            .version()
            .unwrap_or(INITIAL_VERSION)
            .to_string();
        self.baseline = document.content.clone();
        self.content = document.content;
        self.ledger = HistoryLedger::from_entries(document.history);
        self.news = document.news;
        self.game_rules = document.game_rules;
        self.status = SaveStatus::Saved;
        self.loaded = true;
    }

    // ==================== Editing ====================

    /// Apply a transformation to the live aggregate
    pub fn mutate<F>(&mut self, f: F) -> StoreResult<SaveStatus>
    where
        F: FnOnce(SiteContent) -> SiteContent,
    {
        self.ensure_loaded()?;
        self.content = f(self.content.clone());
        self.refresh_status();
        Ok(self.status)
    }

    /// Apply a fallible transformation; on error the aggregate is unchanged
    pub fn try_mutate<F>(&mut self, f: F) -> StoreResult<SaveStatus>
    where
        F: FnOnce(SiteContent) -> Result<SiteContent, EditError>,
    {
        self.ensure_loaded()?;
        self.content = f(self.content.clone())?;
        self.refresh_status();
        Ok(self.status)
    }

    // ==================== Versioning ====================

    /// Save the live aggregate as a new version
    ///
    /// Pending background images are resolved in the live aggregate before
    /// the write, so a failed save keeps their uploaded URLs (or their removal).
    pub async fn save(&mut self, meta: SaveMeta) -> StoreResult<SaveOutcome> {
        self.ensure_writable()?;
        self.status = SaveStatus::Saving;

        match self.persist_new_version(meta).await {
            Ok(outcome) => {
                self.status = SaveStatus::Saved;
                info!("Saved version {}", outcome.version);
                Ok(outcome)
            }
            Err(e) => {
                self.status = SaveStatus::Unsaved;
                warn!("Save failed: {}", e);
                Err(e)
            }
        }
    }

    async fn persist_new_version(&mut self, meta: SaveMeta) -> StoreResult<SaveOutcome> {
        let dropped_assets = self.resolve_pending_assets().await;

        let version = self.ledger.next_version();
        let stamped = self
            .content
            .clone()
            .with_version_meta(VersionMeta::new(version.clone(), meta.name, meta.note));

        let mut ledger = self.ledger.clone();
        ledger.push(stamped.clone());

        let document = self.document_with(stamped.clone(), &ledger);
        self.gateway.save_document(&document).await?;

        self.ledger = ledger;
        self.baseline = stamped.clone();
        self.content = stamped;
        self.active_version = version.clone();

        Ok(SaveOutcome {
            version,
            dropped_assets,
        })
    }

    /// Upload pending background images and swap in their URLs
    ///
    /// If the upload fails or the backend returns the wrong number of URLs,
    /// the pending references are removed instead and returned.
    async fn resolve_pending_assets(&mut self) -> Vec<String> {
        let pending: Vec<String> = self
            .content
            .background_images
            .iter()
            .filter(|r| is_pending_asset(r))
            .cloned()
            .collect();
        if pending.is_empty() {
            return Vec::new();
        }

        debug!("Uploading {} pending background image(s)", pending.len());
        let uploaded = match self.gateway.upload_assets(&pending).await {
            Ok(urls) if urls.len() == pending.len() => Some(urls),
            Ok(urls) => {
                warn!(
                    "Upload returned {} URL(s) for {} image(s), dropping them",
                    urls.len(),
                    pending.len()
                );
                None
            }
            Err(e) => {
                warn!("Upload failed, dropping pending images: {}", e);
                None
            }
        };

        match uploaded {
            Some(urls) => {
                let mut urls = urls.into_iter();
                for reference in self.content.background_images.iter_mut() {
                    if is_pending_asset(reference) {
                        if let Some(url) = urls.next() {
                            *reference = url;
                        }
                    }
                }
                Vec::new()
            }
            None => {
                self.content
                    .background_images
                    .retain(|r| !is_pending_asset(r));
                pending
            }
        }
    }

    /// Make the version at `index` the current content
    ///
    /// History is left as is. The live aggregate changes before the write;
    /// if the write fails it stays reverted and the error is returned.
    pub async fn revert(&mut self, index: usize) -> StoreResult<()> {
        self.ensure_writable()?;
        let entry = self
            .ledger
            .get(index)
            .cloned()
            .ok_or_else(|| self.index_error(index))?;

        self.content = entry.clone();
        self.active_version = entry.version().unwrap_or(INITIAL_VERSION).to_string();

        let document = self.document_with(entry.clone(), &self.ledger);
        match self.gateway.save_document(&document).await {
            Ok(_) => {
                self.baseline = entry;
                self.status = SaveStatus::Saved;
                info!("Reverted to version {}", self.active_version);
                Ok(())
            }
            Err(e) => {
                self.refresh_status();
                warn!("Revert to version {} not persisted: {}", self.active_version, e);
                Err(e.into())
            }
        }
    }

    /// Remove the version at `index` from the history
    ///
    /// The new history is persisted alongside the current live aggregate.
    /// Once that succeeds, deleting the active version moves the live
    /// aggregate to the newest remaining version, or to the defaults when
    /// none is left. Returns the removed entry.
    pub async fn delete_version(&mut self, index: usize) -> StoreResult<SiteContent> {
        self.ensure_writable()?;
        let mut ledger = self.ledger.clone();
        let removed = ledger.remove(index).ok_or_else(|| self.index_error(index))?;

        let document = self.document_with(self.content.clone(), &ledger);
        self.gateway.save_document(&document).await?;

        let removed_version = removed.version().unwrap_or(INITIAL_VERSION);
        if removed_version == self.active_version {
            let (content, active_version) = match ledger.head() {
                Some(head) => (
                    head.clone(),
                    head.version().unwrap_or(INITIAL_VERSION).to_string(),
                ),
                None => (SiteContent::default(), INITIAL_VERSION.to_string()),
            };
            self.content = content;
            self.active_version = active_version;
        }

        info!(
            "Deleted version {}, active version {}",
            removed_version, self.active_version
        );
        self.ledger = ledger;
        self.refresh_status();
        Ok(removed)
    }

    /// Collapse the history to the current content, saved as version 1
    pub async fn clear_history(&mut self) -> StoreResult<()> {
        self.ensure_writable()?;
        let stamped = self
            .content
            .clone()
            .with_version_meta(VersionMeta::new(INITIAL_VERSION, None, None));

        let mut ledger = self.ledger.clone();
        ledger.reset(stamped.clone());

        let document = self.document_with(stamped.clone(), &ledger);
        self.gateway.save_document(&document).await?;

        info!("Cleared history");
        self.ledger = ledger;
        self.baseline = stamped.clone();
        self.content = stamped;
        self.active_version = INITIAL_VERSION.to_string();
        self.status = SaveStatus::Saved;
        Ok(())
    }

    /// Rename or annotate the version at `index`
    ///
    /// Version number and timestamp are kept. Empty strings clear the value.
    pub async fn edit_version_meta(
        &mut self,
        index: usize,
        name: Option<String>,
        note: Option<String>,
    ) -> StoreResult<()> {
        self.ensure_writable()?;
        let mut ledger = self.ledger.clone();
        if !ledger.annotate(index, name, note) {
            return Err(self.index_error(index));
        }

        let meta = ledger.get(index).and_then(|e| e.version_meta.clone());
        let is_active = meta
            .as_ref()
            .is_some_and(|m| m.version == self.active_version);

        let mut content = self.content.clone();
        if is_active {
            content.version_meta = meta.clone();
        }

        let document = self.document_with(content.clone(), &ledger);
        self.gateway.save_document(&document).await?;

        self.ledger = ledger;
        self.content = content;
        if is_active {
            self.baseline.version_meta = meta;
        }
        Ok(())
    }
}
