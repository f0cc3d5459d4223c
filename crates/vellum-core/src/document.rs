//! Persisted document layout
//!
//! The backend stores one JSON object:
//!
//! ```text
//! { "content": SiteContent, "history": [SiteContent], "news": [...], "gameRules": [...] }
//! ```
//!
//! `news` and `gameRules` are peer collections that share the round trip but
//! are not versioned. They are optional on read and omitted when empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{GameRule, NewsPost, SiteContent};
use crate::normalize::normalize;

/// Errors that can occur while reading a fetched document
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Document is not a JSON object")]
    NotAnObject,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field type for {0}")]
    InvalidType(&'static str),
}

/// Keys used in the persisted document
mod keys {
    pub const CONTENT: &str = "content";
    pub const HISTORY: &str = "history";
    pub const NEWS: &str = "news";
    pub const GAME_RULES: &str = "gameRules";
}

/// The document exchanged with the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub content: SiteContent,
    #[serde(default)]
    pub history: Vec<SiteContent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub news: Vec<NewsPost>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub game_rules: Vec<GameRule>,
}

impl Document {
    /// Read a raw fetched document
    ///
    /// Content and every history entry go through the normalizer. A missing
    /// or malformed history is treated as empty, malformed news posts and
    /// rules are skipped. Only a missing `content` object is an error.
    pub fn from_value(raw: &Value) -> Result<Self, DocumentError> {
        let obj = raw.as_object().ok_or(DocumentError::NotAnObject)?;

        let content = match obj.get(keys::CONTENT) {
            Some(value) if value.is_object() => normalize(value),
            Some(_) => return Err(DocumentError::InvalidType(keys::CONTENT)),
            None => return Err(DocumentError::MissingField(keys::CONTENT)),
        };

        let history = obj
            .get(keys::HISTORY)
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.is_object())
                    .map(normalize)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            content,
            history,
            news: lenient_list(obj.get(keys::NEWS)),
            game_rules: lenient_list(obj.get(keys::GAME_RULES)),
        })
    }

    /// Serialize for sending
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Deserialize each element on its own, dropping the ones that fail
fn lenient_list<T: serde::de::DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
