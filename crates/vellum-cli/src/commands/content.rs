//! Content viewing, import and export

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;

use vellum_core::{normalize, SaveMeta};

use super::{resolve_id, Store};
use crate::commands::history::report_save;
use crate::output::Output;

/// Show the whole content, or one page
pub fn show(store: &Store, page: Option<String>, output: &Output) -> Result<()> {
    let content = store.content();
    match page {
        Some(page_id) => {
            let page_id = resolve_id("page", &page_id, content.pages.iter().map(|p| p.id.as_str()))?;
            let page = content
                .pages
                .iter()
                .find(|p| p.id == page_id)
                .ok_or_else(|| anyhow::anyhow!("Page not found: {}", page_id))?;
            output.print_page(page);
        }
        None => output.print_content(content),
    }
    Ok(())
}

/// Print the document as it is persisted
pub fn export(store: &Store, output: &Output) -> Result<()> {
    output.print_json(&store.document());
    Ok(())
}

/// Replace the content with a JSON file and save it as a new version
///
/// Accepts either a whole document (`{ "content": ... }`) or bare content.
pub async fn import(
    store: &mut Store,
    file: PathBuf,
    name: Option<String>,
    note: Option<String>,
    output: &Output,
) -> Result<()> {
    let text = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {:?}", file))?;
    let raw: Value =
        serde_json::from_str(&text).with_context(|| format!("{:?} is not valid JSON", file))?;

    let imported = normalize(content_of(&raw));
    store.mutate(|_| imported)?;

    let name = name.or_else(|| {
        file.file_name()
            .map(|n| format!("Import {}", n.to_string_lossy()))
    });
    let outcome = store
        .save(SaveMeta::new(name, note))
        .await
        .context("Failed to save imported content")?;
    report_save(&outcome, output);
    Ok(())
}

/// The content part of a document, or the value itself
fn content_of(raw: &Value) -> &Value {
    match raw.get("content") {
        Some(content) if content.is_object() => content,
        _ => raw,
    }
}
