//! Book model and its JSON projection

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Wire format for every date in the API
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Stored book record
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    /// Storage reference of the cover image, relative to the media root
    pub picture: String,
    pub date_published: NaiveDate,
    pub checked_out: bool,
    pub date_checked_out: Option<NaiveDate>,
}

impl Book {
    /// Project the record to its wire shape. `picture_url` is the resolved
    /// URL for `self.picture`; the storage reference itself is never exposed.
    pub fn to_json(&self, picture_url: String) -> BookJson {
        BookJson {
            id: self.id,
            title: self.title.clone(),
            author: self.author.clone(),
            description: self.description.clone(),
            picture: picture_url,
            date_published: self.date_published.format(DATE_FORMAT).to_string(),
            checked_out: self.checked_out,
            date_checked_out: self
                .date_checked_out
                .map(|date| date.format(DATE_FORMAT).to_string()),
        }
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} by {}", self.title, self.author)
    }
}

/// Book as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookJson {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    /// Resolvable URL of the cover image
    pub picture: String,
    /// YYYY-MM-DD
    pub date_published: String,
    pub checked_out: bool,
    /// YYYY-MM-DD, null unless checked out
    pub date_checked_out: Option<String>,
}

/// Fields for a new record; the identifier is assigned by the store
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub picture: String,
    pub date_published: NaiveDate,
    #[serde(default)]
    pub checked_out: bool,
    #[serde(default)]
    pub date_checked_out: Option<NaiveDate>,
}
