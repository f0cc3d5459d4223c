//! Status command handler

use anyhow::Result;

use vellum_core::{Config, LoadSource, HISTORY_LIMIT};

use super::Store;
use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &Store, source: LoadSource, config: &Config, output: &Output) -> Result<()> {
    let content = store.content();

    match output.format {
        OutputFormat::Json => {
            output.print_json(&serde_json::json!({
                "backend": store.gateway().location(),
                "loaded_from": if source.is_remote() { "remote" } else { "defaults" },
                "status": store.status(),
                "active_version": store.active_version(),
                "next_version": store.next_version(),
                "history": {
                    "versions": store.history().len(),
                    "limit": HISTORY_LIMIT
                },
                "counts": {
                    "pages": content.pages.len(),
                    "blocks": content.block_count(),
                    "menu_items": content.menu.len(),
                    "background_images": content.background_images.len(),
                    "news": store.news().len(),
                    "game_rules": store.game_rules().len()
                }
            }));
        }
        OutputFormat::Quiet => {
            println!("{}", store.active_version());
        }
        OutputFormat::Human => {
            println!("Vellum Status");
            println!("=============");
            println!();
            println!("Backend:");
            println!("  Location: {}", store.gateway().location());
            if config.local_dir.is_none() {
                println!(
                    "  Auth:     {}",
                    if config.auth_token.is_some() {
                        "token configured"
                    } else {
                        "no token"
                    }
                );
            }
            if !source.is_remote() {
                println!("  Loaded:   built-in defaults (nothing fetched)");
            }
            println!();
            println!("Versions:");
            println!("  Active:  v{}", store.active_version());
            println!("  Next:    v{}", store.next_version());
            println!(
                "  History: {} of {}",
                store.history().len(),
                HISTORY_LIMIT
            );
            println!();
            println!("Contents:");
            println!("  Pages:       {}", content.pages.len());
            println!("  Blocks:      {}", content.block_count());
            println!("  Menu items:  {}", content.menu.len());
            println!("  Backgrounds: {}", content.background_images.len());
            println!("  News posts:  {}", store.news().len());
            println!("  Game rules:  {}", store.game_rules().len());
        }
    }

    Ok(())
}
