//! Identifier generation
//!
//! Blocks, pages and menu items get random ids that are long enough to be
//! told apart from short hand-typed placeholders (see [`is_generated_id`]).

use uuid::Uuid;

/// Ids of this length or shorter are treated as hand-typed or legacy
/// placeholders and get replaced on normalization.
pub const MIN_GENERATED_ID_LEN: usize = 8;

/// Generate a new identifier
///
/// Random (v4) UUID in its 32 character hex form. Carries no ordering.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Whether `id` looks machine generated
pub fn is_generated_id(id: &str) -> bool {
    id.len() > MIN_GENERATED_ID_LEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_length() {
        let id = generate_id();
        assert_eq!(id.len(), 32);
        assert!(is_generated_id(&id));
    }

    #[test]
    fn test_generate_id_unique() {
        let ids: HashSet<String> = (0..500).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_short_ids_are_not_generated() {
        assert!(!is_generated_id(""));
        assert!(!is_generated_id("home"));
        assert!(!is_generated_id("12345678"));
        assert!(is_generated_id("123456789"));
    }
}
