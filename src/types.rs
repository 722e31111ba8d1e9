use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use serde_json::Value;
use url::Url;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub title_id: i64,
    pub name: String,
    pub author: String,
    pub portrait_image_url: Option<String>,
    pub landscape_image_url: Option<String>,
    pub view_count: Option<i64>,
}

/// One row of a title's chapter listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterListEntry {
    pub title_id: i64,
    pub chapter_id: i64,
    pub name: String,
    /// Epoch seconds.
    pub start_time_stamp: i64,
    pub sub_title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub end_time_stamp: Option<i64>,
    pub already_viewed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manga {
    pub title: Title,
    pub title_image_url: String,
    pub overview: String,
    pub background_image_url: String,
    pub first_chapter_list: Vec<ChapterListEntry>,
    pub last_chapter_list: Vec<ChapterListEntry>,
    pub next_time_stamp: Option<i64>,
    pub viewing_period_description: Option<String>,
}

impl Manga {
    /// First and last chapter lists merged, ordered by chapter id, without duplicates.
    pub fn chapters(&self) -> Vec<&ChapterListEntry> {
        let mut all: Vec<&ChapterListEntry> = self
            .first_chapter_list
            .iter()
            .chain(self.last_chapter_list.iter())
            .collect();
        all.sort_by_key(|c| c.chapter_id);
        all.dedup_by_key(|c| c.chapter_id);
        all
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterPage {
    pub image_url: String,
    pub width: u32,
    pub height: u32,
    /// Hex encoded repeating-XOR key for the image body.
    pub encryption_key: String,
}

impl ChapterPage {
    /// Extension of the image path, `jpg` when the URL carries none.
    pub fn file_extension(&self) -> String {
        Url::parse(&self.image_url)
            .ok()
            .and_then(|u| {
                let path = u.path().to_string();
                let name = path.rsplit('/').next()?.to_string();
                let (_, ext) = name.rsplit_once('.')?;
                Some(ext.to_ascii_lowercase())
            })
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "jpg".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chapter {
    pub chapter_id: i64,
    pub title_id: i64,
    /// Sibling chapter descriptors exactly as the viewer returned them.
    pub chapters: Vec<Value>,
    pub title_name: String,
    pub chapter_name: String,
    pub pages: Vec<ChapterPage>,
    pub number_of_comments: i64,
    pub region_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageQuality {
    Low,
    High,
    #[default]
    SuperHigh,
}

impl ImageQuality {
    pub const ALL: [ImageQuality; 3] = [ImageQuality::Low, ImageQuality::High, ImageQuality::SuperHigh];

    /// Token sent as the `img_quality` query parameter.
    pub fn as_wire(self) -> &'static str {
        match self {
            ImageQuality::Low => "low",
            ImageQuality::High => "high",
            ImageQuality::SuperHigh => "super_high",
        }
    }

    pub fn from_wire(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.as_wire() == token)
    }
}

impl FromStr for ImageQuality {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.to_lowercase();
        Self::from_wire(&norm).ok_or(ConfigError::InvalidQuality(norm))
    }
}

impl fmt::Display for ImageQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl Serialize for ImageQuality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}
