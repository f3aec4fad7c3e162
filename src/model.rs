//! Canonical data model for downloaded stories.
//!
//! One metadata fetch produces a [StoryInfo]; the page fetcher and writer
//! consume it. Nothing here is mutated after construction.

use serde::{Deserialize, Deserializer};
use std::fmt;

/// Opaque story identifier: the path remainder after `/s/` in a story URL,
/// or the `id` field of a series listing entry.
///
/// The API returns series ids as JSON numbers but accepts them as path
/// segments, so both `"lovers-in-the-dark"` and `12345` deserialize here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryId(String);

impl StoryId {
    pub fn new(id: impl Into<String>) -> Self {
        StoryId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StoryId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u64),
            Str(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Num(n) => StoryId(n.to_string()),
            Raw::Str(s) => StoryId(s),
        })
    }
}

/// Metadata for one story, from a single metadata fetch.
#[derive(Debug, Clone)]
pub struct StoryInfo {
    pub id: StoryId,
    pub title: String,
    pub author: String,
    /// Total content pages, fetched as 1..=page_count. Always >= 1.
    pub page_count: u32,
    /// Present when the story belongs to a series, in listed order.
    pub series_items: Option<Vec<SeriesItem>>,
}

/// One entry of a series listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeriesItem {
    pub id: StoryId,
    pub title: String,
}
