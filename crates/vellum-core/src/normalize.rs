//! Snapshot normalization
//!
//! Documents fetched from the backend may be hand edited, written by an older
//! schema, or simply broken. [`normalize`] turns any JSON value into a
//! structurally valid [`SiteContent`]:
//!
//! - missing or wrongly typed fields fall back to the built-in defaults
//! - every block gets a machine generated id (short ids are replaced)
//! - entries that are not objects are dropped
//!
//! It never fails, never touches its input, and is idempotent.

use serde_json::{Map, Value};

use crate::id::{generate_id, is_generated_id};
use crate::models::{
    Block, BlockKind, MenuCategory, MenuItem, NavLink, OpeningHours, Page, Rate, SiteContent,
    VersionMeta,
};

type Object = Map<String, Value>;

/// Build a valid content aggregate from an arbitrary JSON value
pub fn normalize(raw: &Value) -> SiteContent {
    let Some(obj) = raw.as_object() else {
        return SiteContent::default();
    };

    let defaults = SiteContent::default();

    SiteContent {
        hero_title: string_or(obj, "heroTitle", defaults.hero_title),
        hero_subtitle: string_or(obj, "heroSubtitle", defaults.hero_subtitle),
        info_title: string_or(obj, "infoTitle", defaults.info_title),
        info_text: string_or(obj, "infoText", defaults.info_text),
        main_color: string_or(obj, "mainColor", defaults.main_color),
        accent_color: string_or(obj, "accentColor", defaults.accent_color),
        background_images: string_list(obj, "backgroundImages")
            .unwrap_or(defaults.background_images),
        logo_text: string_or(obj, "logoText", defaults.logo_text),
        nav_links: object_list(obj, "navLinks", nav_link).unwrap_or(defaults.nav_links),
        opening: object_list(obj, "opening", opening_hours).unwrap_or(defaults.opening),
        rates: object_list(obj, "rates", rate).unwrap_or(defaults.rates),
        email: string_or(obj, "email", defaults.email),
        tel: string_or(obj, "tel", defaults.tel),
        kvk: string_or(obj, "kvk", defaults.kvk),
        address: string_or(obj, "address", defaults.address),
        payment: string_or(obj, "payment", defaults.payment),
        pages: object_list(obj, "pages", page).unwrap_or(defaults.pages),
        menu: object_list(obj, "menu", menu_item).unwrap_or_default(),
        version_meta: obj
            .get("__versionMeta")
            .or_else(|| obj.get("versionMeta"))
            .and_then(Value::as_object)
            .and_then(version_meta),
    }
}

fn string_or(obj: &Object, key: &str, default: String) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or(default)
}

fn string_field(obj: &Object, key: &str) -> String {
    string_or(obj, key, String::new())
}

fn optional_string(obj: &Object, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Strings or numbers as text, anything else is `None`
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_list(obj: &Object, key: &str) -> Option<Vec<String>> {
    let items = obj.get(key)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

/// Map every object element of the array at `key`, `None` if there is no array
fn object_list<T>(obj: &Object, key: &str, convert: fn(&Object) -> Option<T>) -> Option<Vec<T>> {
    let items = obj.get(key)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(convert)
            .collect(),
    )
}

fn nav_link(obj: &Object) -> Option<NavLink> {
    Some(NavLink::new(string_field(obj, "label"), string_field(obj, "path")))
}

fn opening_hours(obj: &Object) -> Option<OpeningHours> {
    Some(OpeningHours::new(string_field(obj, "d"), string_field(obj, "v")))
}

fn rate(obj: &Object) -> Option<Rate> {
    Some(Rate::new(string_field(obj, "label"), string_field(obj, "price")))
}

fn page(obj: &Object) -> Option<Page> {
    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(generate_id);

    Some(Page {
        id,
        title: string_field(obj, "title"),
        path: string_field(obj, "path"),
        hero_title: optional_string(obj, "heroTitle"),
        hero_subtitle: optional_string(obj, "heroSubtitle"),
        blocks: object_list(obj, "blocks", block).unwrap_or_default(),
    })
}

fn block(obj: &Object) -> Option<Block> {
    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| is_generated_id(id))
        .map(str::to_string)
        .unwrap_or_else(generate_id);

    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .and_then(BlockKind::parse)
        .unwrap_or(BlockKind::Text);

    Some(Block {
        id,
        kind,
        text: string_field(obj, "text"),
    })
}

fn menu_item(obj: &Object) -> Option<MenuItem> {
    let name = obj.get("name").and_then(scalar_text)?;
    let price = obj.get("price").and_then(scalar_text)?;

    let id = obj
        .get("id")
        .and_then(scalar_text)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(generate_id);

    let category = obj
        .get("category")
        .and_then(Value::as_str)
        .map(MenuCategory::parse)
        .unwrap_or(MenuCategory::Other);

    Some(MenuItem {
        id,
        name,
        price,
        category,
        description: optional_string(obj, "description"),
    })
}

fn version_meta(obj: &Object) -> Option<VersionMeta> {
    let version = obj.get("version").and_then(scalar_text)?;
    let timestamp = match obj.get("timestamp") {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        _ => 0,
    };

    Some(VersionMeta {
        version,
        timestamp,
        name: optional_string(obj, "name").filter(|s| !s.is_empty()),
        note: optional_string(obj, "note").filter(|s| !s.is_empty()),
    })
}
