//! Vellum CLI
//!
//! Command-line editor for versioned site content.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use vellum_core::Config;

mod commands;
mod editor;
mod output;

use commands::edit::PageChanges;
use commands::Store;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "vellum")]
#[command(about = "Vellum - edit, version and publish site content")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by editing commands
#[derive(clap::Args, Clone, Copy)]
struct EditArgs {
    /// Apply the change without saving a new version
    #[arg(long)]
    no_save: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show backend, version and content summary
    Status,
    /// List saved versions
    #[command(alias = "log")]
    History,
    /// Show the current content
    Show {
        /// Show a single page (id or id prefix)
        #[arg(short, long)]
        page: Option<String>,
    },
    /// Save the current content as a new version
    Save {
        /// Short name for the version
        #[arg(short, long)]
        name: Option<String>,
        /// Longer note for the version
        #[arg(long)]
        note: Option<String>,
    },
    /// Make a saved version the current content
    Revert {
        /// Version number
        version: String,
    },
    /// Delete a saved version
    #[command(alias = "rm")]
    Delete {
        /// Version number
        version: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Remove all versions and save the current content as version 1
    ClearHistory {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Rename or annotate a saved version
    Annotate {
        /// Version number
        version: String,
        /// New name (empty string clears it)
        #[arg(short, long)]
        name: Option<String>,
        /// New note (empty string clears it)
        #[arg(long)]
        note: Option<String>,
    },
    /// Set a site-wide field (e.g. logoText, heroTitle, email)
    Set {
        /// Field name
        field: String,
        /// New value
        value: String,
        #[command(flatten)]
        edit: EditArgs,
    },
    /// Manage pages
    Page {
        #[command(subcommand)]
        command: PageCommands,
    },
    /// Manage content blocks on a page
    Block {
        #[command(subcommand)]
        command: BlockCommands,
    },
    /// Manage menu items
    Menu {
        #[command(subcommand)]
        command: MenuCommands,
    },
    /// Manage navigation links
    Nav {
        #[command(subcommand)]
        command: NavCommands,
    },
    /// Manage background images
    Bg {
        #[command(subcommand)]
        command: BgCommands,
    },
    /// Replace the content with a JSON file and save it
    Import {
        /// JSON file with a document or bare content
        file: PathBuf,
        /// Short name for the version
        #[arg(short, long)]
        name: Option<String>,
        /// Longer note for the version
        #[arg(long)]
        note: Option<String>,
    },
    /// Print the stored document as JSON
    Export,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum PageCommands {
    /// Add a page
    Add {
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        path: Option<String>,
        #[command(flatten)]
        edit: EditArgs,
    },
    /// Remove a page
    #[command(alias = "rm")]
    Remove {
        /// Page id (or prefix)
        page: String,
        #[command(flatten)]
        edit: EditArgs,
    },
    /// Change title, path or hero copy of a page
    Rename {
        /// Page id (or prefix)
        page: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        path: Option<String>,
        /// Hero title
        #[arg(long)]
        hero: Option<String>,
        /// Hero subtitle
        #[arg(long)]
        subtitle: Option<String>,
        #[command(flatten)]
        edit: EditArgs,
    },
    /// Move a page to another position
    Move {
        /// Page id (or prefix)
        page: String,
        /// New position (0-based)
        to: usize,
        #[command(flatten)]
        edit: EditArgs,
    },
}

#[derive(Subcommand)]
enum BlockCommands {
    /// Add a block to a page
    Add {
        /// Page id (or prefix)
        page: String,
        /// Block type: heading, text, divider or quote
        #[arg(short = 'T', long = "type", default_value = "text")]
        kind: String,
        /// Block text
        #[arg(short, long)]
        text: Option<String>,
        #[command(flatten)]
        edit: EditArgs,
    },
    /// Change a block's text (opens $EDITOR if --text is not given)
    Edit {
        /// Page id (or prefix)
        page: String,
        /// Block id (or prefix)
        block: String,
        #[arg(short, long)]
        text: Option<String>,
        #[command(flatten)]
        edit: EditArgs,
    },
    /// Change a block's type
    Type {
        /// Page id (or prefix)
        page: String,
        /// Block id (or prefix)
        block: String,
        /// heading, text, divider or quote
        kind: String,
        #[command(flatten)]
        edit: EditArgs,
    },
    /// Remove a block
    #[command(alias = "rm")]
    Remove {
        /// Page id (or prefix)
        page: String,
        /// Block id (or prefix)
        block: String,
        #[command(flatten)]
        edit: EditArgs,
    },
    /// Move a block within its page
    Move {
        /// Page id (or prefix)
        page: String,
        /// Block id (or prefix)
        block: String,
        /// New position (0-based)
        to: usize,
        #[command(flatten)]
        edit: EditArgs,
    },
}

#[derive(Subcommand)]
enum MenuCommands {
    /// Add a menu item
    Add {
        name: String,
        /// Price as shown, e.g. 4.50
        price: String,
        /// Food, Drinks, Snacks, Cocktails, Desserts or Other
        #[arg(short, long, default_value = "Food")]
        category: String,
        #[arg(short, long)]
        description: Option<String>,
        #[command(flatten)]
        edit: EditArgs,
    },
    /// Remove a menu item
    #[command(alias = "rm")]
    Remove {
        /// Menu item id (or prefix)
        id: String,
        #[command(flatten)]
        edit: EditArgs,
    },
}

#[derive(Subcommand)]
enum NavCommands {
    /// Add a navigation link
    Add {
        label: String,
        path: String,
        #[command(flatten)]
        edit: EditArgs,
    },
    /// Remove a navigation link by position
    #[command(alias = "rm")]
    Remove {
        index: usize,
        #[command(flatten)]
        edit: EditArgs,
    },
}

#[derive(Subcommand)]
enum BgCommands {
    /// Add a background image (URL or local file, uploaded on save)
    Add {
        source: String,
        #[command(flatten)]
        edit: EditArgs,
    },
    /// Replace the background image at a position
    Replace {
        index: usize,
        source: String,
        #[command(flatten)]
        edit: EditArgs,
    },
    /// Remove a background image by position
    #[command(alias = "rm")]
    Remove {
        index: usize,
        #[command(flatten)]
        edit: EditArgs,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (backend_url, auth_token, local_dir, request_timeout_secs, log_file)
        key: String,
        /// Configuration value ("none" or empty clears optional keys)
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work even when the config file is broken
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);
    debug!("Using backend {}", config.backend_description());

    let (mut store, source) = commands::open_store(&config, &output).await?;

    let result = match cli.command {
        Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Status => commands::status::show(&store, source, &config, &output),
        Commands::History => commands::history::list(&store, &output),
        Commands::Show { page } => commands::content::show(&store, page, &output),
        Commands::Export => commands::content::export(&store, &output),
        Commands::Save { name, note } => {
            commands::history::save(&mut store, name, note, &output).await
        }
        Commands::Revert { version } => {
            commands::history::revert(&mut store, version, &output).await
        }
        Commands::Delete { version, yes } => {
            commands::history::delete(&mut store, version, yes, &output).await
        }
        Commands::ClearHistory { yes } => commands::history::clear(&mut store, yes, &output).await,
        Commands::Annotate {
            version,
            name,
            note,
        } => commands::history::annotate(&mut store, version, name, note, &output).await,
        Commands::Import { file, name, note } => {
            commands::content::import(&mut store, file, name, note, &output).await
        }
        Commands::Set { field, value, edit } => {
            commands::edit::set_field(&mut store, field, value, edit.no_save, &output).await
        }
        Commands::Page { command } => handle_page_command(command, &mut store, &output).await,
        Commands::Block { command } => handle_block_command(command, &mut store, &output).await,
        Commands::Menu { command } => handle_menu_command(command, &mut store, &output).await,
        Commands::Nav { command } => handle_nav_command(command, &mut store, &output).await,
        Commands::Bg { command } => handle_bg_command(command, &mut store, &output).await,
    };

    if let Err(ref e) = result {
        if let Some(hint) = commands::recovery_hint(e) {
            output.warn(hint);
        }
    }
    result
}

async fn handle_page_command(command: PageCommands, store: &mut Store, output: &Output) -> Result<()> {
    use commands::edit;

    match command {
        PageCommands::Add { title, path, edit: e } => {
            edit::add_page(store, title, path, e.no_save, output).await
        }
        PageCommands::Remove { page, edit: e } => {
            edit::remove_page(store, page, e.no_save, output).await
        }
        PageCommands::Rename {
            page,
            title,
            path,
            hero,
            subtitle,
            edit: e,
        } => {
            let changes = PageChanges {
                title,
                path,
                hero_title: hero,
                hero_subtitle: subtitle,
            };
            edit::rename_page(store, page, changes, e.no_save, output).await
        }
        PageCommands::Move { page, to, edit: e } => {
            edit::move_page(store, page, to, e.no_save, output).await
        }
    }
}

async fn handle_block_command(
    command: BlockCommands,
    store: &mut Store,
    output: &Output,
) -> Result<()> {
    use commands::edit;

    match command {
        BlockCommands::Add {
            page,
            kind,
            text,
            edit: e,
        } => edit::add_block(store, page, kind, text, e.no_save, output).await,
        BlockCommands::Edit {
            page,
            block,
            text,
            edit: e,
        } => edit::edit_block(store, page, block, text, e.no_save, output).await,
        BlockCommands::Type {
            page,
            block,
            kind,
            edit: e,
        } => edit::set_block_type(store, page, block, kind, e.no_save, output).await,
        BlockCommands::Remove { page, block, edit: e } => {
            edit::remove_block(store, page, block, e.no_save, output).await
        }
        BlockCommands::Move {
            page,
            block,
            to,
            edit: e,
        } => edit::move_block(store, page, block, to, e.no_save, output).await,
    }
}

async fn handle_menu_command(command: MenuCommands, store: &mut Store, output: &Output) -> Result<()> {
    use commands::edit;

    match command {
        MenuCommands::Add {
            name,
            price,
            category,
            description,
            edit: e,
        } => {
            edit::add_menu_item(store, name, price, category, description, e.no_save, output)
                .await
        }
        MenuCommands::Remove { id, edit: e } => {
            edit::remove_menu_item(store, id, e.no_save, output).await
        }
    }
}

async fn handle_nav_command(command: NavCommands, store: &mut Store, output: &Output) -> Result<()> {
    use commands::edit;

    match command {
        NavCommands::Add { label, path, edit: e } => {
            edit::add_nav_link(store, label, path, e.no_save, output).await
        }
        NavCommands::Remove { index, edit: e } => {
            edit::remove_nav_link(store, index, e.no_save, output).await
        }
    }
}

async fn handle_bg_command(command: BgCommands, store: &mut Store, output: &Output) -> Result<()> {
    use commands::edit;

    match command {
        BgCommands::Add { source, edit: e } => {
            edit::add_background(store, source, e.no_save, output).await
        }
        BgCommands::Replace {
            index,
            source,
            edit: e,
        } => edit::replace_background(store, index, source, e.no_save, output).await,
        BgCommands::Remove { index, edit: e } => {
            edit::remove_background(store, index, e.no_save, output).await
        }
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging
///
/// Level comes from VELLUM_LOG (default: warn); RUST_LOG, when set, takes
/// over completely. Logs go to stderr, or to `log_file` when configured.
fn init_logging(config: &Config) {
    let log_level = std::env::var("VELLUM_LOG").unwrap_or_else(|_| "warn".to_string());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "vellum_core={},vellum_cli={}",
            log_level, log_level
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    // Ignore errors if a subscriber is already installed
    match config.log_file.as_ref() {
        Some(log_path) => match File::create(log_path) {
            Ok(file) => {
                let _ = builder
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init();
            }
            Err(e) => {
                eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
                let _ = builder.with_writer(std::io::stderr).try_init();
            }
        },
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
}
