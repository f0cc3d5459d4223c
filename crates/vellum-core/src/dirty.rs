//! Change detection
//!
//! The live content is "dirty" when it differs from the baseline (the last
//! content known to be persisted). Version metadata is provenance, not
//! content, so it never counts as a change; otherwise every save would leave
//! the store looking modified.

use serde::{Deserialize, Serialize};

use crate::models::SiteContent;

/// Save state reported to the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    /// Live content matches the baseline
    Saved,
    /// Live content has diverged from the baseline
    Unsaved,
    /// A write is in flight
    Saving,
}

impl SaveStatus {
    /// Status after re-evaluating dirtiness
    ///
    /// `Saving` is sticky: only the outcome of the save may leave it.
    pub fn recompute(self, dirty: bool) -> Self {
        match self {
            SaveStatus::Saving => SaveStatus::Saving,
            _ if dirty => SaveStatus::Unsaved,
            _ => SaveStatus::Saved,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SaveStatus::Saved => "saved",
            SaveStatus::Unsaved => "unsaved",
            SaveStatus::Saving => "saving",
        }
    }
}

impl std::fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `current` differs from `baseline`, ignoring version metadata
pub fn is_dirty(current: &SiteContent, baseline: &SiteContent) -> bool {
    !content_eq(current, baseline)
}

/// Structural equality of two aggregates without their version metadata
///
/// Destructures both sides so that a new field on [`SiteContent`] fails to
/// compile here until it is compared.
pub fn content_eq(a: &SiteContent, b: &SiteContent) -> bool {
    let SiteContent {
        hero_title,
        hero_subtitle,
        info_title,
        info_text,
        main_color,
        accent_color,
        background_images,
        logo_text,
        nav_links,
        opening,
        rates,
        email,
        tel,
        kvk,
        address,
        payment,
        pages,
        menu,
        version_meta: _,
    } = a;

    hero_title == &b.hero_title
        && hero_subtitle == &b.hero_subtitle
        && info_title == &b.info_title
        && info_text == &b.info_text
        && main_color == &b.main_color
        && accent_color == &b.accent_color
        && background_images == &b.background_images
        && logo_text == &b.logo_text
        && nav_links == &b.nav_links
        && opening == &b.opening
        && rates == &b.rates
        && email == &b.email
        && tel == &b.tel
        && kvk == &b.kvk
        && address == &b.address
        && payment == &b.payment
        && pages == &b.pages
        && menu == &b.menu
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Block, BlockKind, VersionMeta};

    #[test]
    fn test_identical_content_is_clean() {
        let content = SiteContent::default();
        assert!(!is_dirty(&content, &content));

        let tagged = content.with_version_meta(VersionMeta::new("9", None, None));
        assert!(!is_dirty(&tagged, &tagged));
    }

    #[test]
    fn test_version_meta_is_ignored() {
        let a = SiteContent::default().with_version_meta(VersionMeta::new("1", None, None));
        let b = SiteContent::default().with_version_meta(VersionMeta::new(
            "2",
            Some("spring".to_string()),
            Some("new colors".to_string()),
        ));
        let c = SiteContent::default();

        assert!(!is_dirty(&a, &b));
        assert!(!is_dirty(&a, &c));
        assert!(!is_dirty(&c, &b));
    }

    #[test]
    fn test_field_change_is_dirty() {
        let baseline = SiteContent::default();
        let mut current = baseline.clone();
        current.logo_text = "New logo".to_string();
        assert!(is_dirty(&current, &baseline));
    }

    #[test]
    fn test_nested_change_is_dirty() {
        let baseline = SiteContent::default();
        let mut current = baseline.clone();
        current.pages[1]
            .blocks
            .push(Block::with_text(BlockKind::Text, "Happy hour"));
        assert!(is_dirty(&current, &baseline));
    }

    #[test]
    fn test_reorder_is_dirty() {
        let baseline = SiteContent::default();
        let mut current = baseline.clone();
        current.nav_links.swap(0, 1);
        assert!(is_dirty(&current, &baseline));
    }

    #[test]
    fn test_recompute() {
        assert_eq!(SaveStatus::Saved.recompute(true), SaveStatus::Unsaved);
        assert_eq!(SaveStatus::Unsaved.recompute(false), SaveStatus::Saved);
        assert_eq!(SaveStatus::Saving.recompute(true), SaveStatus::Saving);
        assert_eq!(SaveStatus::Saving.recompute(false), SaveStatus::Saving);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SaveStatus::Unsaved.to_string(), "unsaved");
        assert_eq!(
            serde_json::to_string(&SaveStatus::Saving).unwrap(),
            "\"saving\""
        );
    }
}
