//! Data models for Vellum
//!
//! Defines the site content aggregate and its parts: pages, blocks, menu
//! items, navigation links, opening hours and rates, plus the version
//! metadata stamped on saved snapshots and the peer collections (news posts,
//! game rules) that share the persisted document.
//!
//! Field names serialize in camelCase to match the documents the backend
//! already stores.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::id::generate_id;

/// Kind of a content block
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Heading,
    Text,
    Divider,
    Quote,
}

impl BlockKind {
    /// Parse a block kind, `None` for unknown names
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "heading" => Some(Self::Heading),
            "text" => Some(Self::Text),
            "divider" => Some(Self::Divider),
            "quote" => Some(Self::Quote),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Text => "text",
            Self::Divider => "divider",
            Self::Quote => "quote",
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content block on a page
///
/// `text` is plain for headings and quotes, rich markup for text blocks and
/// ignored for dividers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    /// Assigned once at creation, never changes
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub text: String,
}

impl Block {
    /// Create an empty block with a fresh id
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: generate_id(),
            kind,
            text: String::new(),
        }
    }

    /// Create a block with text
    pub fn with_text(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::new(kind)
        }
    }
}

/// A site page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub title: String,
    /// Route, expected (not enforced) to be unique
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_subtitle: Option<String>,
    /// Render order
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Page {
    /// Create a page with a fresh id, hero title set to the page title
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_id(generate_id(), title, path)
    }

    /// Create a page with a specific id
    pub fn with_id(id: impl Into<String>, title: impl Into<String>, path: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id: id.into(),
            hero_title: Some(title.clone()),
            hero_subtitle: Some(String::new()),
            title,
            path: path.into(),
            blocks: Vec::new(),
        }
    }

    /// Set the hero copy
    pub fn hero(mut self, title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        self.hero_title = Some(title.into());
        self.hero_subtitle = Some(subtitle.into());
        self
    }

    /// Find a block's position by id
    pub fn block_index(&self, block_id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == block_id)
    }
}

/// Menu category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum MenuCategory {
    #[default]
    Food,
    Drinks,
    Snacks,
    Cocktails,
    Desserts,
    Other,
}

impl MenuCategory {
    pub const ALL: [MenuCategory; 6] = [
        Self::Food,
        Self::Drinks,
        Self::Snacks,
        Self::Cocktails,
        Self::Desserts,
        Self::Other,
    ];

    /// Parse a category name, unknown names map to `Other`
    pub fn parse(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
            .unwrap_or(Self::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Drinks => "Drinks",
            Self::Snacks => "Snacks",
            Self::Cocktails => "Cocktails",
            Self::Desserts => "Desserts",
            Self::Other => "Other",
        }
    }

    /// Label shown on the public menu
    pub fn label(&self) -> &'static str {
        match self {
            Self::Food => "Eten",
            Self::Drinks => "Dranken",
            Self::Snacks => "Snacks",
            Self::Cocktails => "Cocktails",
            Self::Desserts => "Nagerechten",
            Self::Other => "Overig",
        }
    }
}

impl std::fmt::Display for MenuCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An item on the food and drinks menu
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    /// Decimal kept as typed, e.g. "4.50"
    pub price: String,
    pub category: MenuCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MenuItem {
    /// Create a menu item with a fresh id
    pub fn new(name: impl Into<String>, price: impl Into<String>, category: MenuCategory) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            price: price.into(),
            category,
            description: None,
        }
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }
}

/// Navigation entry, listed in navigation order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub path: String,
}

impl NavLink {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// One row of the opening hours table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpeningHours {
    #[serde(rename = "d")]
    pub day: String,
    #[serde(rename = "v")]
    pub hours: String,
}

impl OpeningHours {
    pub fn new(day: impl Into<String>, hours: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            hours: hours.into(),
        }
    }
}

/// One row of the rate table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rate {
    pub label: String,
    pub price: String,
}

impl Rate {
    pub fn new(label: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            price: price.into(),
        }
    }
}

/// Provenance of a saved snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionMeta {
    /// Integer valued, increases with every save
    pub version: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl VersionMeta {
    /// Create metadata stamped with the current time
    pub fn new(version: impl Into<String>, name: Option<String>, note: Option<String>) -> Self {
        Self {
            version: version.into(),
            timestamp: Utc::now().timestamp_millis(),
            name: name.filter(|n| !n.is_empty()),
            note: note.filter(|n| !n.is_empty()),
        }
    }
}

/// The full editable site content
///
/// `version_meta` is transient: it says which saved version this aggregate
/// equals and is ignored by change detection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteContent {
    pub hero_title: String,
    pub hero_subtitle: String,
    pub info_title: String,
    pub info_text: String,
    pub main_color: String,
    pub accent_color: String,
    pub background_images: Vec<String>,
    pub logo_text: String,
    pub nav_links: Vec<NavLink>,
    pub opening: Vec<OpeningHours>,
    pub rates: Vec<Rate>,
    pub email: String,
    pub tel: String,
    pub kvk: String,
    pub address: String,
    pub payment: String,
    pub pages: Vec<Page>,
    pub menu: Vec<MenuItem>,
    #[serde(
        rename = "__versionMeta",
        alias = "versionMeta",
        skip_serializing_if = "Option::is_none"
    )]
    pub version_meta: Option<VersionMeta>,
}

impl SiteContent {
    /// Version this aggregate was saved as, if any
    pub fn version(&self) -> Option<&str> {
        self.version_meta.as_ref().map(|m| m.version.as_str())
    }

    /// Return a copy tagged with `meta`
    pub fn with_version_meta(mut self, meta: VersionMeta) -> Self {
        self.version_meta = Some(meta);
        self
    }

    /// Return a copy with the version tag removed
    pub fn without_version_meta(mut self) -> Self {
        self.version_meta = None;
        self
    }

    /// Find a page's position by id
    pub fn page_index(&self, page_id: &str) -> Option<usize> {
        self.pages.iter().position(|p| p.id == page_id)
    }

    /// Total number of blocks across all pages
    pub fn block_count(&self) -> usize {
        self.pages.iter().map(|p| p.blocks.len()).sum()
    }
}

impl Default for SiteContent {
    /// The built-in site content used before anything was ever saved
    fn default() -> Self {
        let tagline = "Enjoy a modern pool lounge, specialty drinks, and a vibrant social scene.";
        Self {
            hero_title: "Snooker Pool Centrum".to_string(),
            hero_subtitle: tagline.to_string(),
            info_title: "About Our Cafe".to_string(),
            info_text: "Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
                        Lorem ipsum dolor sit amet, consectetur adipiscing elit."
                .to_string(),
            main_color: "#00b894".to_string(),
            accent_color: "#232526".to_string(),
            background_images: vec![
                "https://dynamic-media-cdn.tripadvisor.com/media/photo-o/12/bc/33/4e/getlstd-property-photo.jpg?w=1200&h=-1&s=1".to_string(),
                "https://images.socialdeal.nl/bedrijf/pool-cafe-hart-van-utrecht-19062608564682.jpg".to_string(),
                "https://m-en.bredastudentapp.com/uploads/image/5c8252172a5ab06d94dfcd1e-large.jpg".to_string(),
            ],
            logo_text: "SPC - Snooker Pool Centrum".to_string(),
            nav_links: vec![
                NavLink::new("Home", "/"),
                NavLink::new("Menu", "/menu"),
                NavLink::new("Contact", "/contact"),
                NavLink::new("Nieuws", "/nieuws"),
                NavLink::new("Spelregels", "/spelregels"),
            ],
            opening: vec![
                OpeningHours::new("Maandag", "Gesloten"),
                OpeningHours::new("Dinsdag", "18:00 – 23:00"),
                OpeningHours::new("Woensdag", "13:00 – 24:00"),
                OpeningHours::new("Donderdag", "13:00 – 24:00"),
                OpeningHours::new("Vrijdag", "18:00 – 01:00"),
                OpeningHours::new("Zaterdag", "13:00 – 01:00"),
                OpeningHours::new("Zondag", "13:00 – 18:00"),
            ],
            rates: vec![
                Rate::new("Pool", "€15 / uur"),
                Rate::new("Snooker", "€15 / uur"),
                Rate::new("Biljart (groot)", "€10 / uur"),
                Rate::new("Biljart (klein)", "€8 / uur"),
            ],
            email: "spccapelle010@gmail.com".to_string(),
            tel: "010-4585733".to_string(),
            kvk: "89548477".to_string(),
            address: "Marsdiep 2, 2904 ES Capelle a/d IJssel".to_string(),
            payment: "Pin of contant".to_string(),
            pages: vec![
                Page::with_id("home", "Home", "/").hero("Welcome to SPC", tagline),
                Page::with_id("menu", "Menu", "/menu")
                    .hero("Menu", "Our delicious menu will be here."),
                Page::with_id("contact", "Contact", "/contact")
                    .hero("Contact Us", "Contact form and info."),
            ],
            menu: Vec::new(),
            version_meta: None,
        }
    }
}

/// A news post, stored next to the content in the same document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsPost {
    pub id: String,
    pub title: String,
    /// HTML
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub big_image: Option<bool>,
    pub datetime: String,
}

/// Rules for one of the games played at the venue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GameRule {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub short_description: String,
    pub details: Vec<String>,
    pub rules: Vec<String>,
    pub tips: Vec<String>,
    pub enabled: bool,
    pub order: i64,
}

impl Default for GameRule {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            kind: "Pool".to_string(),
            short_description: String::new(),
            details: Vec::new(),
            rules: Vec::new(),
            tips: Vec::new(),
            enabled: true,
            order: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::is_generated_id;

    #[test]
    fn test_block_new() {
        let block = Block::new(BlockKind::Quote);
        assert!(is_generated_id(&block.id));
        assert_eq!(block.kind, BlockKind::Quote);
        assert!(block.text.is_empty());
    }

    #[test]
    fn test_block_kind_parse() {
        assert_eq!(BlockKind::parse("heading"), Some(BlockKind::Heading));
        assert_eq!(BlockKind::parse("divider"), Some(BlockKind::Divider));
        assert_eq!(BlockKind::parse("image"), None);
        assert_eq!(BlockKind::Text.to_string(), "text");
    }

    #[test]
    fn test_page_new() {
        let page = Page::new("About", "/about");
        assert!(is_generated_id(&page.id));
        assert_eq!(page.hero_title.as_deref(), Some("About"));
        assert_eq!(page.hero_subtitle.as_deref(), Some(""));
        assert!(page.blocks.is_empty());
    }

    #[test]
    fn test_menu_category_parse() {
        assert_eq!(MenuCategory::parse("Drinks"), MenuCategory::Drinks);
        assert_eq!(MenuCategory::parse("cocktails"), MenuCategory::Cocktails);
        assert_eq!(MenuCategory::parse("Pizza"), MenuCategory::Other);
        assert_eq!(MenuCategory::Desserts.label(), "Nagerechten");
    }

    #[test]
    fn test_version_meta_drops_empty_name() {
        let meta = VersionMeta::new("3", Some(String::new()), Some("launch".to_string()));
        assert_eq!(meta.version, "3");
        assert!(meta.name.is_none());
        assert_eq!(meta.note.as_deref(), Some("launch"));
        assert!(meta.timestamp > 0);
    }

    #[test]
    fn test_default_content() {
        let content = SiteContent::default();
        assert_eq!(content.logo_text, "SPC - Snooker Pool Centrum");
        assert_eq!(content.pages.len(), 3);
        assert_eq!(content.pages[0].id, "home");
        assert_eq!(content.opening.len(), 7);
        assert!(content.version_meta.is_none());
        assert_eq!(content.page_index("contact"), Some(2));
    }

    #[test]
    fn test_version_meta_wire_key() {
        let content =
            SiteContent::default().with_version_meta(VersionMeta::new("2", None, None));
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["__versionMeta"]["version"], "2");
        assert_eq!(json["logoText"], "SPC - Snooker Pool Centrum");
        assert_eq!(json["opening"][0]["d"], "Maandag");

        let plain = serde_json::to_value(SiteContent::default()).unwrap();
        assert!(plain.get("__versionMeta").is_none());
    }

    #[test]
    fn test_content_serialization() {
        let mut content = SiteContent::default();
        content.pages[0]
            .blocks
            .push(Block::with_text(BlockKind::Heading, "Hello"));
        content
            .menu
            .push(MenuItem::new("Tosti", "4.50", MenuCategory::Snacks));

        let json = serde_json::to_string(&content).unwrap();
        let deserialized: SiteContent = serde_json::from_str(&json).unwrap();
        assert_eq!(content, deserialized);
    }

    #[test]
    fn test_game_rule_defaults() {
        let rule: GameRule = serde_json::from_str(r#"{"id":"r1","title":"8-ball"}"#).unwrap();
        assert_eq!(rule.kind, "Pool");
        assert!(rule.enabled);
        assert!(rule.details.is_empty());
    }
}
