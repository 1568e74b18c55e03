//! Record types shared by both backends.
//!
//! A [`Comic`] is the unit of work for every phase. Its identifier is empty
//! until a backend assigns one during Create; the same identifier joins the
//! relational `availability` row and suffixes the key-value keys.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Key prefix for the comic hash in the key-value store.
pub const COMIC_KEY_PREFIX: &str = "comic:";
/// Key prefix for the availability hash in the key-value store.
pub const AVAILABILITY_KEY_PREFIX: &str = "availability:";
/// Field holding the count inside an availability hash.
pub const AVAILABLE_COUNT_FIELD: &str = "available_count";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comic {
    /// Backend-assigned identifier, `None` before Create.
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub year: i32,
    pub genre: String,
    pub description: String,
}

/// Secondary attribute joined one-to-one to a [`Comic`] by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub comic_id: i64,
    pub available_count: i32,
}

/// Key of the comic hash for an identifier.
pub fn comic_key(id: i64) -> String {
    format!("{COMIC_KEY_PREFIX}{id}")
}

/// Key of the availability hash for an identifier.
pub fn availability_key(id: i64) -> String {
    format!("{AVAILABILITY_KEY_PREFIX}{id}")
}

/// Fixed-shape key-value form of a comic.
///
/// Every field is written as a string; `year` and `id` are parsed back on
/// read, so a round trip is exact apart from the added `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComicHash {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub year: i32,
    pub genre: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl ComicHash {
    pub fn new(id: i64, comic: &Comic, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: comic.title.clone(),
            author: comic.author.clone(),
            publisher: comic.publisher.clone(),
            year: comic.year,
            genre: comic.genre.clone(),
            description: comic.description.clone(),
            created_at,
        }
    }

    pub fn key(&self) -> String {
        comic_key(self.id)
    }

    /// Field/value pairs in the order they are written.
    pub fn to_fields(&self) -> [(&'static str, String); 8] {
        [
            ("id", self.id.to_string()),
            ("title", self.title.clone()),
            ("author", self.author.clone()),
            ("publisher", self.publisher.clone()),
            ("year", self.year.to_string()),
            ("genre", self.genre.clone()),
            ("description", self.description.clone()),
            (
                "created_at",
                self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
        ]
    }

    /// Decode a hash read back from the store. An empty map means the key
    /// does not exist and yields `Ok(None)`.
    pub fn from_fields(key: &str, mut fields: HashMap<String, String>) -> Result<Option<Self>> {
        if fields.is_empty() {
            return Ok(None);
        }

        let mut take = |name: &str| {
            fields.remove(name).ok_or_else(|| Error::Decode {
                key: key.to_string(),
                reason: format!("missing field `{name}`"),
            })
        };

        let id = take("id")?;
        let title = take("title")?;
        let author = take("author")?;
        let publisher = take("publisher")?;
        let year = take("year")?;
        let genre = take("genre")?;
        let description = take("description")?;
        let created_at = take("created_at")?;

        let invalid = |name: &str, value: &str| Error::Decode {
            key: key.to_string(),
            reason: format!("invalid `{name}`: {value:?}"),
        };

        Ok(Some(Self {
            id: id.parse().map_err(|_| invalid("id", &id))?,
            title,
            author,
            publisher,
            year: year.parse().map_err(|_| invalid("year", &year))?,
            genre,
            description,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map_err(|_| invalid("created_at", &created_at))?
                .with_timezone(&Utc),
        }))
    }

    pub fn into_comic(self) -> Comic {
        Comic {
            id: Some(self.id),
            title: self.title,
            author: self.author,
            publisher: self.publisher,
            year: self.year,
            genre: self.genre,
            description: self.description,
        }
    }
}
