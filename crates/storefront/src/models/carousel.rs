//! Home page carousel slides.

use serde::{Deserialize, Serialize};

use soundsync_core::CarouselItemId;

/// One slide of the home page carousel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselItem {
    pub id: CarouselItemId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image_url: String,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// Admin console form for a slide.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image_url: String,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

impl CarouselInput {
    /// Names of required fields that are blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.image_url.trim().is_empty() {
            missing.push("imageUrl");
        }
        missing
    }

    /// Build the stored record.
    #[must_use]
    pub fn into_item(self, id: CarouselItemId) -> CarouselItem {
        CarouselItem {
            id,
            title: self.title.trim().to_owned(),
            description: self.description,
            image_url: self.image_url.trim().to_owned(),
            link_url: self.link_url.filter(|url| !url.trim().is_empty()),
            is_active: self.is_active,
            sort_order: self.sort_order,
        }
    }
}

/// Sort slides for display: by `sort_order`, ties broken by id.
pub fn sort_for_display(items: &mut [CarouselItem]) {
    items.sort_by_key(|item| (item.sort_order, item.id));
}
