//! Marketplace catalog items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use soundsync_core::{Price, TrackId};

const fn default_true() -> bool {
    true
}

/// A beat or other item listed on the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    #[serde(alias = "artist")]
    pub producer: String,
    #[serde(default)]
    pub image_url: String,
    pub price: Price,
    #[serde(default)]
    pub bpm: Option<u16>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub genre: String,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "Utc::now")]
    pub date_added: DateTime<Utc>,
}

impl Track {
    /// Shown in the home page's featured section.
    #[must_use]
    pub const fn is_featured_on_home(&self) -> bool {
        self.featured && self.in_stock
    }

    /// Case-insensitive genre match.
    #[must_use]
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genre.eq_ignore_ascii_case(genre.trim())
    }
}

/// Admin console form for creating or replacing a track.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInput {
    pub title: String,
    #[serde(alias = "artist")]
    pub producer: String,
    #[serde(default)]
    pub image_url: String,
    pub price: Price,
    #[serde(default)]
    pub bpm: Option<u16>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub genre: String,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
}

impl TrackInput {
    /// Names of required fields that are blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.producer.trim().is_empty() {
            missing.push("producer");
        }
        missing
    }

    /// Build the stored record.
    #[must_use]
    pub fn into_track(self, id: TrackId, date_added: DateTime<Utc>) -> Track {
        Track {
            id,
            title: self.title.trim().to_owned(),
            producer: self.producer.trim().to_owned(),
            image_url: self.image_url,
            price: self.price,
            bpm: self.bpm,
            key: self.key,
            genre: self.genre.trim().to_owned(),
            in_stock: self.in_stock,
            featured: self.featured,
            date_added,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_record_defaults() {
        let json = r#"{"id": 3, "title": "Night Drive", "artist": "Kay", "price": "$29.99"}"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.producer, "Kay");
        assert!(track.in_stock);
        assert!(!track.featured);
        assert!(!track.is_featured_on_home());
    }

    #[test]
    fn test_featured_requires_stock() {
        let json = r#"{"id": 1, "title": "A", "producer": "B", "price": 10,
                       "featured": true, "inStock": false}"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert!(!track.is_featured_on_home());
    }

    #[test]
    fn test_missing_fields() {
        let input: TrackInput =
            serde_json::from_str(r#"{"title": " ", "producer": "", "price": "$1"}"#).unwrap();
        assert_eq!(input.missing_fields(), vec!["title", "producer"]);
    }
}
