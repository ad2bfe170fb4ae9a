use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::fields::artist;

/// Artist profile as read from its raw row, with legacy columns resolved
#[derive(Debug, Clone, Serialize)]
pub struct ArtistView {
    pub id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub display_name: Option<String>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
    pub genre: Option<String>,
}

impl ArtistView {
    pub fn from_row(row: &Map<String, Value>) -> Self {
        let uuid_of = |key: &str| {
            row.get(key)
                .and_then(Value::as_str)
                .and_then(|s| Uuid::parse_str(s).ok())
        };
        let owned = |s: Option<&str>| s.map(str::to_string);

        Self {
            id: uuid_of("id"),
            user_id: uuid_of("user_id"),
            display_name: owned(artist::DISPLAY_NAME.resolve(row)),
            image_url: owned(artist::IMAGE_URL.resolve(row)),
            bio: owned(artist::BIO.resolve(row)),
            genre: owned(artist::GENRE.resolve(row)),
        }
    }

    /// Which column each resolved attribute came from, for diagnostics
    pub fn sources(row: &Map<String, Value>) -> Map<String, Value> {
        artist::ALL
            .iter()
            .map(|chain| {
                let source = chain
                    .source_of(row)
                    .map(|s| Value::String(s.to_string()))
                    .unwrap_or(Value::Null);
                (chain.name.to_string(), source)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SocialLink {
    pub artist_id: Uuid,
    pub platform: String,
    pub url: String,
}
