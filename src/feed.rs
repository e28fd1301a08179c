//! The RSS-to-JSON payload describing a Medium user's feed.

use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::PrimitiveDateTime;

static PUB_DATE_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Feed {
    pub status: String,
    pub feed: FeedInfo,
    pub items: Vec<Article>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FeedInfo {
    pub url: String,
    pub title: String,
    pub link: String,
    pub author: String,
    pub description: String,
    pub image: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub pub_date: String,
    pub link: String,
    pub guid: String,
    pub author: String,
    pub thumbnail: String,
    pub description: String,
    pub content: String,
    pub enclosure: Enclosure,
    pub categories: Vec<String>,
}

/// Always serialized as `{}`; whatever the upstream puts in there is discarded.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Enclosure {}

impl Article {
    /// Parses `pub_date`, which the upstream formats as `YYYY-MM-DD HH:MM:SS`.
    pub fn parsed_pub_date(&self) -> Result<PrimitiveDateTime, time::error::Parse> {
        PrimitiveDateTime::parse(&self.pub_date, PUB_DATE_FORMAT)
    }
}
