//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use chrono::{Local, TimeZone};
use serde::Serialize;

use vellum_core::{Page, SiteContent};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is JSON
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print any serializable value as pretty JSON
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to encode JSON output: {}", e),
        }
    }

    /// Print the whole site content
    pub fn print_content(&self, content: &SiteContent) {
        match self.format {
            OutputFormat::Human => {
                println!("Logo:      {}", content.logo_text);
                println!("Hero:      {}", content.hero_title);
                println!("           {}", truncate(&content.hero_subtitle, 60));
                println!("Info:      {}", content.info_title);
                println!(
                    "Colors:    main {}  accent {}",
                    content.main_color, content.accent_color
                );
                println!();
                println!("Contact:");
                println!("  Email:   {}", content.email);
                println!("  Tel:     {}", content.tel);
                println!("  Address: {}", content.address);
                println!("  KvK:     {}", content.kvk);
                println!("  Payment: {}", content.payment);

                println!();
                println!("── Navigation ({}) ──", content.nav_links.len());
                for (i, link) in content.nav_links.iter().enumerate() {
                    println!("{:>2}. {} -> {}", i, link.label, link.path);
                }

                println!();
                println!("── Pages ({}) ──", content.pages.len());
                for (i, page) in content.pages.iter().enumerate() {
                    println!(
                        "{:>2}. {} | {} | {} | {} block(s)",
                        i,
                        short_id(&page.id),
                        truncate(&page.title, 25),
                        page.path,
                        page.blocks.len()
                    );
                }

                if !content.menu.is_empty() {
                    println!();
                    println!("── Menu ({}) ──", content.menu.len());
                    for item in &content.menu {
                        println!(
                            "{} | {} | {} | {}",
                            short_id(&item.id),
                            item.category.label(),
                            truncate(&item.name, 30),
                            item.price
                        );
                    }
                }

                println!();
                println!(
                    "── Background images ({}) ──",
                    content.background_images.len()
                );
                for (i, url) in content.background_images.iter().enumerate() {
                    println!("{:>2}. {}", i, truncate(url, 70));
                }
            }
            OutputFormat::Json => self.print_json(content),
            OutputFormat::Quiet => {
                for page in &content.pages {
                    println!("{}", page.id);
                }
            }
        }
    }

    /// Print one page with its blocks
    pub fn print_page(&self, page: &Page) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", page.id);
                println!("Title:    {}", page.title);
                println!("Path:     {}", page.path);
                if let Some(ref hero) = page.hero_title {
                    println!("Hero:     {}", hero);
                }
                if let Some(ref subtitle) = page.hero_subtitle {
                    if !subtitle.is_empty() {
                        println!("          {}", truncate(subtitle, 60));
                    }
                }

                println!();
                if page.blocks.is_empty() {
                    println!("No blocks on this page.");
                    return;
                }
                println!("── Blocks ({}) ──", page.blocks.len());
                for (i, block) in page.blocks.iter().enumerate() {
                    println!(
                        "{:>2}. {} | {:<7} | {}",
                        i,
                        short_id(&block.id),
                        block.kind,
                        truncate_line(&block.text, 50)
                    );
                }
            }
            OutputFormat::Json => self.print_json(page),
            OutputFormat::Quiet => {
                for block in &page.blocks {
                    println!("{}", block.id);
                }
            }
        }
    }

    /// Print the version history, marking the active version
    pub fn print_history(&self, history: &[SiteContent], active_version: &str) {
        match self.format {
            OutputFormat::Human => {
                if history.is_empty() {
                    println!("No saved versions.");
                    return;
                }
                for entry in history {
                    let Some(meta) = entry.version_meta.as_ref() else {
                        println!("  v?   (no version information)");
                        continue;
                    };
                    let marker = if meta.version == active_version { "*" } else { " " };
                    let mut line = format!(
                        "{} v{:<4} {}",
                        marker,
                        meta.version,
                        format_timestamp(meta.timestamp)
                    );
                    if let Some(ref name) = meta.name {
                        line.push_str(&format!("  {}", name));
                    }
                    if let Some(ref note) = meta.note {
                        line.push_str(&format!(" - {}", truncate_line(note, 40)));
                    }
                    println!("{}", line);
                }
                println!("\n{} version(s), * = active", history.len());
            }
            OutputFormat::Json => {
                let versions: Vec<_> = history
                    .iter()
                    .filter_map(|e| e.version_meta.as_ref())
                    .map(|meta| {
                        serde_json::json!({
                            "version": meta.version,
                            "timestamp": meta.timestamp,
                            "name": meta.name,
                            "note": meta.note,
                            "active": meta.version == active_version
                        })
                    })
                    .collect();
                self.print_json(&versions);
            }
            OutputFormat::Quiet => {
                for entry in history {
                    if let Some(version) = entry.version() {
                        println!("{}", version);
                    }
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr (suppressed in quiet mode)
    pub fn warn(&self, message: &str) {
        if !self.is_quiet() {
            eprintln!("⚠ {}", message);
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Render epoch milliseconds in local time
pub fn format_timestamp(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

/// First 8 characters of an id
fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}
