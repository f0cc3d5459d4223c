//! Vellum Core Library
//!
//! This crate provides the versioned content store behind the Vellum site
//! editor: one JSON document holds the site's content plus a bounded history
//! of saved versions, and an operator edits, saves, reverts and prunes it.
//!
//! # Architecture
//!
//! - **ContentStore**: owns the live content, the last saved baseline and the
//!   history, and decides the save status
//! - **PersistenceGateway**: the only place that performs I/O (HTTP backend,
//!   local file, or memory)
//!
//! # Quick Start
//!
//! ```text
//! let mut store = ContentStore::new(HttpGateway::from_config(&config)?);
//! store.load().await;
//!
//! store.try_mutate(|c| edit::set_field(c, "heroTitle", "Welcome"))?;
//! store.save(SaveMeta::default()).await?;
//! ```
//!
//! # Modules
//!
//! - `store`: the content store (main entry point)
//! - `models`: site content, pages, blocks, menu items, version metadata
//! - `normalize`: turns arbitrary JSON into well-formed content
//! - `dirty`: change detection and save status
//! - `history`: bounded version history and version allocation
//! - `edit`: editing operations for use with the store
//! - `document`: the persisted document layout
//! - `gateway`: persistence backends
//! - `config`: application configuration

pub mod config;
pub mod dirty;
pub mod document;
pub mod edit;
pub mod gateway;
pub mod history;
pub mod id;
pub mod models;
pub mod normalize;
pub mod store;

pub use config::Config;
pub use dirty::{is_dirty, SaveStatus};
pub use document::{Document, DocumentError};
pub use edit::EditError;
pub use gateway::{FileGateway, GatewayError, HttpGateway, MemoryGateway, PersistenceGateway};
pub use history::{HistoryLedger, HISTORY_LIMIT};
pub use models::{Block, BlockKind, MenuCategory, MenuItem, NavLink, Page, SiteContent, VersionMeta};
pub use normalize::normalize;
pub use store::{ContentStore, LoadSource, SaveMeta, SaveOutcome, StoreError};
