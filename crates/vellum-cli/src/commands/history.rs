//! Version history command handlers
//!
//! Saving, listing, reverting, deleting and annotating versions.

use anyhow::{Context, Result};

use vellum_core::{SaveMeta, SaveOutcome};

use super::{resolve_version, Store};
use crate::editor::confirm;
use crate::output::Output;

/// List saved versions
pub fn list(store: &Store, output: &Output) -> Result<()> {
    output.print_history(store.history(), store.active_version());
    Ok(())
}

/// Save the current content as a new version
pub async fn save(
    store: &mut Store,
    name: Option<String>,
    note: Option<String>,
    output: &Output,
) -> Result<()> {
    let outcome = store
        .save(SaveMeta::new(name, note))
        .await
        .context("Failed to save content")?;
    report_save(&outcome, output);
    Ok(())
}

/// Tell the user about a finished save
pub fn report_save(outcome: &SaveOutcome, output: &Output) {
    if !outcome.dropped_assets.is_empty() {
        output.warn(&format!(
            "{} background image(s) could not be uploaded and were removed",
            outcome.dropped_assets.len()
        ));
    }
    output.success(&format!("Saved version {}", outcome.version));
}

/// Make an older version the current content
pub async fn revert(store: &mut Store, version: String, output: &Output) -> Result<()> {
    let index = resolve_version(store, &version)?;

    if store.is_dirty() && output.should_prompt() {
        println!("The current content has unsaved changes.");
        if !confirm(&format!("Discard them and revert to version {}?", version))? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store
        .revert(index)
        .await
        .with_context(|| format!("Failed to revert to version {}", version))?;

    output.success(&format!("Reverted to version {}", store.active_version()));
    Ok(())
}

/// Delete a version from the history
pub async fn delete(store: &mut Store, version: String, yes: bool, output: &Output) -> Result<()> {
    let index = resolve_version(store, &version)?;

    if !yes && output.should_prompt() {
        let is_active = store.active_version() == version.trim_start_matches('v');
        println!("Delete version {}", version);
        if is_active {
            println!("This is the active version; the newest remaining version becomes active.");
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = store
        .delete_version(index)
        .await
        .context("Failed to delete version")?;

    output.success(&format!(
        "Deleted version {}, active version is {}",
        removed.version().unwrap_or("?"),
        store.active_version()
    ));
    Ok(())
}

/// Collapse the history to the current content
pub async fn clear(store: &mut Store, yes: bool, output: &Output) -> Result<()> {
    if !yes && output.should_prompt() {
        println!(
            "This removes all {} saved version(s) and saves the current content as version 1.",
            store.history().len()
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store
        .clear_history()
        .await
        .context("Failed to clear history")?;

    output.success("History cleared, current content saved as version 1");
    Ok(())
}

/// Change the name and note of a version
pub async fn annotate(
    store: &mut Store,
    version: String,
    name: Option<String>,
    note: Option<String>,
    output: &Output,
) -> Result<()> {
    let index = resolve_version(store, &version)?;

    // Keep what was there for anything not given
    let (name, note) = match store.history()[index].version_meta.clone() {
        Some(current) => (name.or(current.name), note.or(current.note)),
        None => (name, note),
    };

    store
        .edit_version_meta(index, name, note)
        .await
        .context("Failed to update version")?;

    output.success(&format!("Updated version {}", version));
    Ok(())
}
