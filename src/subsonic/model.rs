//! Subsonic response types.
//!
//! Only the fields the client uses are modelled. Identifiers are kept as
//! strings; older servers send them as JSON numbers.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// An artist from the server index.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Artist {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
}

/// One child of a music directory: a sub-directory or a song.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Entry {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub is_dir: bool,
    pub path: String,
    pub artist: String,
}

impl Entry {
    /// The title, or the last segment of the path when the server sent none.
    ///
    /// A path that is empty or ends with `/` yields an empty title.
    pub fn display_title(&self) -> String {
        if !self.title.is_empty() {
            return self.title.clone();
        }

        if self.path.is_empty() || self.path.ends_with('/') {
            return String::new();
        }

        match self.path.rsplit_once('/') {
            Some((_, last)) => last.to_string(),
            None => self.path.clone(),
        }
    }

    /// The entry's artist, or `fallback` when it has none.
    pub fn artist_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.artist.is_empty() {
            fallback
        } else {
            &self.artist
        }
    }
}

/// A resolved location: its children, parent and display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    pub id: String,
    pub parent: Option<String>,
    pub name: String,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawDirectory {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    #[serde(deserialize_with = "string_or_number")]
    parent: String,
    name: String,
    child: Vec<Entry>,
}

impl From<RawDirectory> for Directory {
    fn from(raw: RawDirectory) -> Self {
        Self {
            id: raw.id,
            parent: Some(raw.parent).filter(|p| !p.is_empty()),
            name: raw.name,
            entries: raw.child,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct Indexes {
    pub index: Vec<Index>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct Index {
    pub artist: Vec<Artist>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ApiError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ResponseBody {
    pub status: String,
    pub error: Option<ApiError>,
    pub indexes: Option<Indexes>,
    pub directory: Option<RawDirectory>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Envelope {
    #[serde(rename = "subsonic-response")]
    pub response: ResponseBody,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
