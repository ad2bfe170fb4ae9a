//! Read-time resolution of logical attributes stored under several historical
//! column names.
//!
//! Older rows of `artist_profiles` carry `artist_name`/`image_url`, newer ones
//! `stage_name`/`profile_image_url`, and some carry both. Each logical
//! attribute is described by a [`FieldChain`]: an ordered list of source
//! columns, where the first non-blank string value wins.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy)]
pub struct FieldChain {
    pub name: &'static str,
    pub sources: &'static [&'static str],
}

impl FieldChain {
    pub const fn new(name: &'static str, sources: &'static [&'static str]) -> Self {
        Self { name, sources }
    }

    /// First non-blank string among the source columns, in priority order
    pub fn resolve<'a>(&self, row: &'a Map<String, Value>) -> Option<&'a str> {
        self.sources.iter().find_map(|column| match row.get(*column) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        })
    }

    /// Name of the column that supplied the resolved value
    pub fn source_of(&self, row: &Map<String, Value>) -> Option<&'static str> {
        self.sources.iter().copied().find(|column| {
            matches!(row.get(*column), Some(Value::String(s)) if !s.trim().is_empty())
        })
    }
}

pub mod artist {
    use super::FieldChain;

    pub const DISPLAY_NAME: FieldChain = FieldChain::new("display_name", &["stage_name", "artist_name", "name"]);
    pub const IMAGE_URL: FieldChain = FieldChain::new("image_url", &["profile_image_url", "image_url", "avatar_url"]);
    pub const BIO: FieldChain = FieldChain::new("bio", &["bio", "description"]);
    pub const GENRE: FieldChain = FieldChain::new("genre", &["primary_genre", "genre"]);

    pub const ALL: [FieldChain; 4] = [DISPLAY_NAME, IMAGE_URL, BIO, GENRE];
}
