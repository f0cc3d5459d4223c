//! Content editing command handlers
//!
//! Each command applies one edit and saves a new version, unless `--no-save`
//! is given. The save note records what was changed.

use std::path::Path;

use anyhow::{bail, Context, Result};

use vellum_core::edit::{self, EditError, NEW_PAGE_PATH, NEW_PAGE_TITLE};
use vellum_core::{Block, MenuCategory, MenuItem, NavLink, SaveMeta, SiteContent};

use super::{resolve_id, Store};
use crate::commands::history::report_save;
use crate::editor::edit_text;
use crate::output::Output;

/// Apply an edit, then save or report the status
async fn apply<F>(
    store: &mut Store,
    no_save: bool,
    summary: String,
    output: &Output,
    f: F,
) -> Result<()>
where
    F: FnOnce(SiteContent) -> Result<SiteContent, EditError>,
{
    let status = store.try_mutate(f)?;

    if no_save {
        output.message(&format!("{} (not saved, status: {})", summary, status));
        return Ok(());
    }

    if !store.is_dirty() {
        output.message(&format!("{}: nothing changed", summary));
        return Ok(());
    }

    let outcome = store
        .save(SaveMeta::new(None, Some(summary)))
        .await
        .context("Failed to save content")?;
    report_save(&outcome, output);
    Ok(())
}

fn page_id(store: &Store, id: &str) -> Result<String> {
    resolve_id("page", id, store.content().pages.iter().map(|p| p.id.as_str()))
}

fn block_id(store: &Store, page_id: &str, id: &str) -> Result<String> {
    let content = store.content();
    let page = content
        .page_index(page_id)
        .map(|i| &content.pages[i])
        .ok_or_else(|| anyhow::anyhow!("Page not found: {}", page_id))?;
    resolve_id("block", id, page.blocks.iter().map(|b| b.id.as_str()))
}

/// First 8 characters of an id, for messages
fn short(id: &str) -> String {
    id.chars().take(8).collect()
}

fn menu_item_id(store: &Store, id: &str) -> Result<String> {
    resolve_id("menu item", id, store.content().menu.iter().map(|m| m.id.as_str()))
}

// ==================== Fields ====================

pub async fn set_field(
    store: &mut Store,
    field: String,
    value: String,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    let summary = format!("Set {}", field);
    apply(store, no_save, summary, output, |c| {
        edit::set_field(c, &field, value)
    })
    .await
}

// ==================== Pages ====================

pub async fn add_page(
    store: &mut Store,
    title: Option<String>,
    path: Option<String>,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    let title = title.unwrap_or_else(|| NEW_PAGE_TITLE.to_string());
    let path = path.unwrap_or_else(|| NEW_PAGE_PATH.to_string());
    let summary = format!("Add page {}", title);
    apply(store, no_save, summary, output, |c| {
        Ok(edit::add_page(c, &title, &path))
    })
    .await
}

pub async fn remove_page(store: &mut Store, id: String, no_save: bool, output: &Output) -> Result<()> {
    let id = page_id(store, &id)?;
    let summary = format!("Remove page {}", id);
    apply(store, no_save, summary, output, |c| edit::remove_page(c, &id)).await
}

/// Change title, path and hero copy of a page
pub struct PageChanges {
    pub title: Option<String>,
    pub path: Option<String>,
    pub hero_title: Option<String>,
    pub hero_subtitle: Option<String>,
}

pub async fn rename_page(
    store: &mut Store,
    id: String,
    changes: PageChanges,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    if changes.title.is_none()
        && changes.path.is_none()
        && changes.hero_title.is_none()
        && changes.hero_subtitle.is_none()
    {
        bail!("Nothing to change. Use --title, --path, --hero or --subtitle.");
    }

    let id = page_id(store, &id)?;
    let summary = format!("Update page {}", id);
    apply(store, no_save, summary, output, |mut c| {
        if let Some(ref title) = changes.title {
            c = edit::set_page_title(c, &id, title)?;
        }
        if let Some(ref path) = changes.path {
            c = edit::set_page_path(c, &id, path)?;
        }
        edit::set_page_hero(
            c,
            &id,
            changes.hero_title.as_deref(),
            changes.hero_subtitle.as_deref(),
        )
    })
    .await
}

pub async fn move_page(
    store: &mut Store,
    id: String,
    to: usize,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    let id = page_id(store, &id)?;
    let from = store
        .content()
        .page_index(&id)
        .ok_or_else(|| anyhow::anyhow!("Page not found: {}", id))?;
    let summary = format!("Move page {} to position {}", id, to);
    apply(store, no_save, summary, output, |c| edit::move_page(c, from, to)).await
}

// ==================== Blocks ====================

pub async fn add_block(
    store: &mut Store,
    page: String,
    kind: String,
    text: Option<String>,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    let page = page_id(store, &page)?;
    let kind = edit::parse_block_kind(&kind)?;
    let summary = format!("Add {} block to {}", kind, page);
    let block = Block::with_text(kind, text.unwrap_or_default());
    apply(store, no_save, summary, output, |c| {
        edit::insert_block(c, &page, block)
    })
    .await
}

/// Change a block's text, opening $EDITOR when no text is given
pub async fn edit_block(
    store: &mut Store,
    page: String,
    block: String,
    text: Option<String>,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    let page = page_id(store, &page)?;
    let block = block_id(store, &page, &block)?;

    let text = match text {
        Some(text) => text,
        None => {
            let content = store.content();
            let current = content
                .page_index(&page)
                .and_then(|i| content.pages[i].blocks.iter().find(|b| b.id == block))
                .map(|b| b.text.clone())
                .unwrap_or_default();
            edit_text(&current, &format!("Editing block {} on page {}", block, page))
                .context("Failed to edit block")?
        }
    };

    let summary = format!("Edit block {} on {}", short(&block), page);
    apply(store, no_save, summary, output, |c| {
        edit::set_block_text(c, &page, &block, &text)
    })
    .await
}

pub async fn set_block_type(
    store: &mut Store,
    page: String,
    block: String,
    kind: String,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    let page = page_id(store, &page)?;
    let block = block_id(store, &page, &block)?;
    let kind = edit::parse_block_kind(&kind)?;
    let summary = format!("Change block {} on {} to {}", short(&block), page, kind);
    apply(store, no_save, summary, output, |c| {
        edit::set_block_kind(c, &page, &block, kind)
    })
    .await
}

pub async fn remove_block(
    store: &mut Store,
    page: String,
    block: String,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    let page = page_id(store, &page)?;
    let block = block_id(store, &page, &block)?;
    let summary = format!("Remove block {} from {}", short(&block), page);
    apply(store, no_save, summary, output, |c| {
        edit::remove_block(c, &page, &block)
    })
    .await
}

pub async fn move_block(
    store: &mut Store,
    page: String,
    block: String,
    to: usize,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    let page = page_id(store, &page)?;
    let block = block_id(store, &page, &block)?;
    let content = store.content();
    let from = content
        .page_index(&page)
        .and_then(|i| content.pages[i].block_index(&block))
        .ok_or_else(|| anyhow::anyhow!("Block not found: {}", block))?;
    let summary = format!("Move block {} on {} to position {}", short(&block), page, to);
    apply(store, no_save, summary, output, |c| {
        edit::move_block(c, &page, from, to)
    })
    .await
}

// ==================== Menu ====================

pub async fn add_menu_item(
    store: &mut Store,
    name: String,
    price: String,
    category: String,
    description: Option<String>,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    let mut item = MenuItem::new(name, price, MenuCategory::parse(&category));
    item.set_description(description.filter(|d| !d.is_empty()));
    let summary = format!("Add menu item {}", item.name);
    apply(store, no_save, summary, output, |c| {
        Ok(edit::add_menu_item(c, item))
    })
    .await
}

pub async fn remove_menu_item(
    store: &mut Store,
    id: String,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    let id = menu_item_id(store, &id)?;
    let summary = format!("Remove menu item {}", short(&id));
    apply(store, no_save, summary, output, |c| {
        edit::remove_menu_item(c, &id)
    })
    .await
}

// ==================== Navigation ====================

pub async fn add_nav_link(
    store: &mut Store,
    label: String,
    path: String,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    let summary = format!("Add navigation link {}", label);
    apply(store, no_save, summary, output, |c| {
        Ok(edit::add_nav_link(c, NavLink::new(label, path)))
    })
    .await
}

pub async fn remove_nav_link(
    store: &mut Store,
    index: usize,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    let summary = format!("Remove navigation link {}", index);
    apply(store, no_save, summary, output, |c| {
        edit::remove_nav_link(c, index)
    })
    .await
}

// ==================== Background images ====================

pub async fn add_background(
    store: &mut Store,
    source: String,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    let reference = image_reference(&source)?;
    let summary = "Add background image".to_string();
    apply(store, no_save, summary, output, |c| {
        Ok(edit::add_background(c, &reference))
    })
    .await
}

pub async fn replace_background(
    store: &mut Store,
    index: usize,
    source: String,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    let reference = image_reference(&source)?;
    let summary = format!("Replace background image {}", index);
    apply(store, no_save, summary, output, |c| {
        edit::replace_background(c, index, &reference)
    })
    .await
}

pub async fn remove_background(
    store: &mut Store,
    index: usize,
    no_save: bool,
    output: &Output,
) -> Result<()> {
    let summary = format!("Remove background image {}", index);
    apply(store, no_save, summary, output, |c| {
        edit::remove_background(c, index)
    })
    .await
}

/// Turn a URL or local path into an image reference
///
/// Local files become `file://` references, uploaded on the next save.
fn image_reference(source: &str) -> Result<String> {
    if source.starts_with("http://")
        || source.starts_with("https://")
        || source.starts_with("file://")
        || (source.starts_with('/') && !Path::new(source).exists())
    {
        return Ok(source.to_string());
    }

    let path = std::fs::canonicalize(source)
        .with_context(|| format!("Image file not found: {}", source))?;
    Ok(format!("file://{}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_image_reference_urls_pass_through() {
        assert_eq!(
            image_reference("https://cdn.test/a.png").unwrap(),
            "https://cdn.test/a.png"
        );
        assert_eq!(
            image_reference("/uploads/missing-on-disk.png").unwrap(),
            "/uploads/missing-on-disk.png"
        );
    }

    #[test]
    fn test_image_reference_local_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bar.png");
        std::fs::write(&path, b"png").unwrap();

        let reference = image_reference(path.to_str().unwrap()).unwrap();
        assert!(reference.starts_with("file://"));
        assert!(reference.ends_with("bar.png"));
    }

    #[test]
    fn test_image_reference_missing_file() {
        assert!(image_reference("not/a/real/file.png").is_err());
    }
}
