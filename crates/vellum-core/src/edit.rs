//! Editing operations
//!
//! Pure transformations of [`SiteContent`] meant to be passed to
//! [`ContentStore::try_mutate`](crate::store::ContentStore::try_mutate).
//! Every function takes the aggregate by value and hands back the edited
//! one. Ids of existing pages, blocks and menu items are never touched.

use thiserror::Error;

use crate::models::{Block, BlockKind, MenuItem, NavLink, Page, SiteContent};

/// Title of a page created without one
pub const NEW_PAGE_TITLE: &str = "New Page";

/// Path of a page created without one
pub const NEW_PAGE_PATH: &str = "/new";

/// Scalar fields editable with [`set_field`], in display order
pub const FIELDS: &[&str] = &[
    "heroTitle",
    "heroSubtitle",
    "infoTitle",
    "infoText",
    "mainColor",
    "accentColor",
    "logoText",
    "email",
    "tel",
    "kvk",
    "address",
    "payment",
];

/// Errors from editing operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Unknown field '{0}'. Editable fields: {}", FIELDS.join(", "))]
    UnknownField(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Block '{block}' not found on page '{page}'")]
    BlockNotFound { page: String, block: String },

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(String),

    #[error("Unknown block type '{0}' (expected heading, text, divider or quote)")]
    UnknownBlockKind(String),

    #[error("Position {index} is out of range ({len} items)")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type EditResult = Result<SiteContent, EditError>;

fn field_mut<'a>(content: &'a mut SiteContent, name: &str) -> Option<&'a mut String> {
    let field = match name {
        "heroTitle" => &mut content.hero_title,
        "heroSubtitle" => &mut content.hero_subtitle,
        "infoTitle" => &mut content.info_title,
        "infoText" => &mut content.info_text,
        "mainColor" => &mut content.main_color,
        "accentColor" => &mut content.accent_color,
        "logoText" => &mut content.logo_text,
        "email" => &mut content.email,
        "tel" => &mut content.tel,
        "kvk" => &mut content.kvk,
        "address" => &mut content.address,
        "payment" => &mut content.payment,
        _ => return None,
    };
    Some(field)
}

/// Read a scalar field by its document name
pub fn get_field<'a>(content: &'a SiteContent, name: &str) -> Option<&'a str> {
    let value = match name {
        "heroTitle" => &content.hero_title,
        "heroSubtitle" => &content.hero_subtitle,
        "infoTitle" => &content.info_title,
        "infoText" => &content.info_text,
        "mainColor" => &content.main_color,
        "accentColor" => &content.accent_color,
        "logoText" => &content.logo_text,
        "email" => &content.email,
        "tel" => &content.tel,
        "kvk" => &content.kvk,
        "address" => &content.address,
        "payment" => &content.payment,
        _ => return None,
    };
    Some(value.as_str())
}

/// Set a scalar field by its document name (e.g. `logoText`)
pub fn set_field(mut content: SiteContent, name: &str, value: impl Into<String>) -> EditResult {
    let field = field_mut(&mut content, name).ok_or_else(|| EditError::UnknownField(name.to_string()))?;
    *field = value.into();
    Ok(content)
}

/// Move an element, shifting the ones in between
fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), EditError> {
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(EditError::IndexOutOfRange { index, len });
        }
    }
    let item = items.remove(from);
    items.insert(to, item);
    Ok(())
}

fn remove_at<T>(items: &mut Vec<T>, index: usize) -> Result<T, EditError> {
    if index >= items.len() {
        return Err(EditError::IndexOutOfRange {
            index,
            len: items.len(),
        });
    }
    Ok(items.remove(index))
}

fn page_mut<'a>(content: &'a mut SiteContent, page_id: &str) -> Result<&'a mut Page, EditError> {
    content
        .pages
        .iter_mut()
        .find(|p| p.id == page_id)
        .ok_or_else(|| EditError::PageNotFound(page_id.to_string()))
}

fn block_mut<'a>(page: &'a mut Page, block_id: &str) -> Result<&'a mut Block, EditError> {
    let page_id = page.id.clone();
    page.blocks
        .iter_mut()
        .find(|b| b.id == block_id)
        .ok_or_else(|| EditError::BlockNotFound {
            page: page_id,
            block: block_id.to_string(),
        })
}

// ==================== Pages ====================

/// Append a page with a fresh id
pub fn add_page(mut content: SiteContent, title: &str, path: &str) -> SiteContent {
    content.pages.push(Page::new(title, path));
    content
}

pub fn remove_page(mut content: SiteContent, page_id: &str) -> EditResult {
    let index = content
        .page_index(page_id)
        .ok_or_else(|| EditError::PageNotFound(page_id.to_string()))?;
    content.pages.remove(index);
    Ok(content)
}

pub fn set_page_title(mut content: SiteContent, page_id: &str, title: &str) -> EditResult {
    page_mut(&mut content, page_id)?.title = title.to_string();
    Ok(content)
}

pub fn set_page_path(mut content: SiteContent, page_id: &str, path: &str) -> EditResult {
    page_mut(&mut content, page_id)?.path = path.to_string();
    Ok(content)
}

/// Set the hero copy of a page. `None` leaves that part unchanged.
pub fn set_page_hero(
    mut content: SiteContent,
    page_id: &str,
    title: Option<&str>,
    subtitle: Option<&str>,
) -> EditResult {
    let page = page_mut(&mut content, page_id)?;
    if let Some(title) = title {
        page.hero_title = Some(title.to_string());
    }
    if let Some(subtitle) = subtitle {
        page.hero_subtitle = Some(subtitle.to_string());
    }
    Ok(content)
}

/// Reorder pages
pub fn move_page(mut content: SiteContent, from: usize, to: usize) -> EditResult {
    move_item(&mut content.pages, from, to)?;
    Ok(content)
}

// ==================== Blocks ====================

/// Append an empty block with a fresh id to a page
pub fn add_block(content: SiteContent, page_id: &str, kind: BlockKind) -> EditResult {
    insert_block(content, page_id, Block::new(kind))
}

/// Append a prepared block to a page
pub fn insert_block(mut content: SiteContent, page_id: &str, block: Block) -> EditResult {
    page_mut(&mut content, page_id)?.blocks.push(block);
    Ok(content)
}

pub fn set_block_text(
    mut content: SiteContent,
    page_id: &str,
    block_id: &str,
    text: &str,
) -> EditResult {
    let page = page_mut(&mut content, page_id)?;
    block_mut(page, block_id)?.text = text.to_string();
    Ok(content)
}

pub fn set_block_kind(
    mut content: SiteContent,
    page_id: &str,
    block_id: &str,
    kind: BlockKind,
) -> EditResult {
    let page = page_mut(&mut content, page_id)?;
    block_mut(page, block_id)?.kind = kind;
    Ok(content)
}

pub fn remove_block(mut content: SiteContent, page_id: &str, block_id: &str) -> EditResult {
    let page = page_mut(&mut content, page_id)?;
    let index = page.block_index(block_id).ok_or_else(|| EditError::BlockNotFound {
        page: page_id.to_string(),
        block: block_id.to_string(),
    })?;
    page.blocks.remove(index);
    Ok(content)
}

/// Reorder blocks within a page
pub fn move_block(mut content: SiteContent, page_id: &str, from: usize, to: usize) -> EditResult {
    move_item(&mut page_mut(&mut content, page_id)?.blocks, from, to)?;
    Ok(content)
}

/// Parse a block type name
pub fn parse_block_kind(name: &str) -> Result<BlockKind, EditError> {
    BlockKind::parse(name).ok_or_else(|| EditError::UnknownBlockKind(name.to_string()))
}

// ==================== Menu ====================

pub fn add_menu_item(mut content: SiteContent, item: MenuItem) -> SiteContent {
    content.menu.push(item);
    content
}

/// Replace the menu item with the same id
pub fn update_menu_item(mut content: SiteContent, item: MenuItem) -> EditResult {
    let slot = content
        .menu
        .iter_mut()
        .find(|m| m.id == item.id)
        .ok_or_else(|| EditError::MenuItemNotFound(item.id.clone()))?;
    *slot = item;
    Ok(content)
}

pub fn remove_menu_item(mut content: SiteContent, item_id: &str) -> EditResult {
    let index = content
        .menu
        .iter()
        .position(|m| m.id == item_id)
        .ok_or_else(|| EditError::MenuItemNotFound(item_id.to_string()))?;
    content.menu.remove(index);
    Ok(content)
}

// ==================== Navigation ====================

pub fn add_nav_link(mut content: SiteContent, link: NavLink) -> SiteContent {
    content.nav_links.push(link);
    content
}

pub fn remove_nav_link(mut content: SiteContent, index: usize) -> EditResult {
    remove_at(&mut content.nav_links, index)?;
    Ok(content)
}

pub fn move_nav_link(mut content: SiteContent, from: usize, to: usize) -> EditResult {
    move_item(&mut content.nav_links, from, to)?;
    Ok(content)
}

// ==================== Background images ====================

pub fn add_background(mut content: SiteContent, url: &str) -> SiteContent {
    content.background_images.push(url.to_string());
    content
}

pub fn replace_background(mut content: SiteContent, index: usize, url: &str) -> EditResult {
    let len = content.background_images.len();
    let slot = content
        .background_images
        .get_mut(index)
        .ok_or(EditError::IndexOutOfRange { index, len })?;
    *slot = url.to_string();
    Ok(content)
}

pub fn remove_background(mut content: SiteContent, index: usize) -> EditResult {
    remove_at(&mut content.background_images, index)?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MenuCategory;

    fn block_ids(content: &SiteContent, page_id: &str) -> Vec<String> {
        let page = &content.pages[content.page_index(page_id).unwrap()];
        page.blocks.iter().map(|b| b.id.clone()).collect()
    }

    fn with_blocks() -> SiteContent {
        let content = SiteContent::default();
        let content = add_block(content, "home", BlockKind::Heading).unwrap();
        let content = add_block(content, "home", BlockKind::Text).unwrap();
        add_block(content, "home", BlockKind::Quote).unwrap()
    }

    #[test]
    fn test_set_field() {
        let content = set_field(SiteContent::default(), "logoText", "Cue Club").unwrap();
        assert_eq!(content.logo_text, "Cue Club");
        assert_eq!(get_field(&content, "logoText"), Some("Cue Club"));

        for name in FIELDS {
            assert!(get_field(&content, name).is_some(), "{name}");
        }
    }

    #[test]
    fn test_set_unknown_field() {
        let err = set_field(SiteContent::default(), "pages", "x").unwrap_err();
        assert_eq!(err, EditError::UnknownField("pages".to_string()));
        assert!(err.to_string().contains("logoText"));
    }

    #[test]
    fn test_block_text_edit_keeps_ids() {
        let content = with_blocks();
        let before = block_ids(&content, "home");

        let content = set_block_text(content, "home", &before[1], "<p>Open late</p>").unwrap();
        assert_eq!(block_ids(&content, "home"), before);

        let page = &content.pages[0];
        assert_eq!(page.blocks[1].text, "<p>Open late</p>");
    }

    #[test]
    fn test_block_reorder_keeps_ids() {
        let content = with_blocks();
        let before = block_ids(&content, "home");

        let content = move_block(content, "home", 0, 2).unwrap();
        let after = block_ids(&content, "home");
        assert_eq!(after, vec![before[1].clone(), before[2].clone(), before[0].clone()]);

        let mut sorted_before = before.clone();
        let mut sorted_after = after.clone();
        sorted_before.sort();
        sorted_after.sort();
        assert_eq!(sorted_before, sorted_after);
    }

    #[test]
    fn test_block_type_and_remove() {
        let content = with_blocks();
        let ids = block_ids(&content, "home");

        let content = set_block_kind(content, "home", &ids[0], BlockKind::Divider).unwrap();
        assert_eq!(content.pages[0].blocks[0].kind, BlockKind::Divider);

        let content = remove_block(content, "home", &ids[1]).unwrap();
        assert_eq!(block_ids(&content, "home"), vec![ids[0].clone(), ids[2].clone()]);

        let err = remove_block(content, "home", &ids[1]).unwrap_err();
        assert!(matches!(err, EditError::BlockNotFound { .. }));
    }

    #[test]
    fn test_add_block_to_missing_page() {
        let err = add_block(SiteContent::default(), "nope", BlockKind::Text).unwrap_err();
        assert_eq!(err, EditError::PageNotFound("nope".to_string()));
    }

    #[test]
    fn test_page_operations() {
        let content = add_page(SiteContent::default(), NEW_PAGE_TITLE, NEW_PAGE_PATH);
        let new_id = content.pages.last().unwrap().id.clone();
        assert_eq!(content.pages.len(), 4);

        let content = set_page_title(content, &new_id, "Events").unwrap();
        let content = set_page_path(content, &new_id, "/events").unwrap();
        let content = set_page_hero(content, &new_id, Some("Events"), None).unwrap();
        let content = move_page(content, 3, 0).unwrap();

        let page = &content.pages[0];
        assert_eq!(page.id, new_id);
        assert_eq!(page.title, "Events");
        assert_eq!(page.path, "/events");
        assert_eq!(page.hero_title.as_deref(), Some("Events"));
        assert_eq!(content.pages[1].id, "home");

        let content = remove_page(content, &new_id).unwrap();
        assert_eq!(content.pages.len(), 3);
    }

    #[test]
    fn test_move_out_of_range() {
        let err = move_page(SiteContent::default(), 0, 9).unwrap_err();
        assert_eq!(err, EditError::IndexOutOfRange { index: 9, len: 3 });
    }

    #[test]
    fn test_menu_operations() {
        let item = MenuItem::new("Bitterballen", "6.50", MenuCategory::Snacks);
        let id = item.id.clone();
        let content = add_menu_item(SiteContent::default(), item);

        let mut updated = content.menu[0].clone();
        updated.price = "7.00".to_string();
        let content = update_menu_item(content, updated).unwrap();
        assert_eq!(content.menu[0].price, "7.00");
        assert_eq!(content.menu[0].id, id);

        let content = remove_menu_item(content, &id).unwrap();
        assert!(content.menu.is_empty());
        assert!(remove_menu_item(content, &id).is_err());
    }

    #[test]
    fn test_nav_and_backgrounds() {
        let content = SiteContent::default();
        let count = content.nav_links.len();

        let content = add_nav_link(content, NavLink::new("Events", "/events"));
        let content = move_nav_link(content, count, 0).unwrap();
        assert_eq!(content.nav_links[0].label, "Events");
        let content = remove_nav_link(content, 0).unwrap();
        assert_eq!(content.nav_links.len(), count);

        let content = SiteContent {
            background_images: Vec::new(),
            ..content
        };
        let content = add_background(content, "https://cdn.test/a.png");
        let content = replace_background(content, 0, "https://cdn.test/b.png").unwrap();
        assert_eq!(content.background_images, vec!["https://cdn.test/b.png"]);
        let content = remove_background(content, 0).unwrap();
        assert!(content.background_images.is_empty());
        assert!(remove_background(content, 0).is_err());
    }

    #[test]
    fn test_parse_block_kind() {
        assert_eq!(parse_block_kind("quote").unwrap(), BlockKind::Quote);
        assert!(matches!(
            parse_block_kind("video"),
            Err(EditError::UnknownBlockKind(_))
        ));
    }
}
