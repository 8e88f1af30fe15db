//! Home page carousel management.

use thiserror::Error;
use tracing::instrument;

use soundsync_core::CarouselItemId;

use crate::models::carousel::sort_for_display;
use crate::models::{CarouselInput, CarouselItem};
use crate::services::missing_fields_message;
use crate::store::{Storage, StoreError, keys};

/// Errors that can occur during carousel operations.
#[derive(Debug, Error)]
pub enum CarouselError {
    #[error("carousel item {0} not found")]
    NotFound(CarouselItemId),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Service for carousel slides.
pub struct CarouselService<'a> {
    storage: &'a Storage,
}

impl<'a> CarouselService<'a> {
    /// Create a new carousel service.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Every slide in display order, active or not.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn list(&self) -> Result<Vec<CarouselItem>, StoreError> {
        let mut items = self.storage.read(keys::CAROUSEL)?;
        sort_for_display(&mut items);
        Ok(items)
    }

    /// Slides shown on the home page.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn active(&self) -> Result<Vec<CarouselItem>, StoreError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|item| item.is_active)
            .collect())
    }

    /// Add a slide.
    ///
    /// # Errors
    ///
    /// Returns `CarouselError::Validation` if required fields are blank.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub fn create(&self, input: CarouselInput) -> Result<CarouselItem, CarouselError> {
        validate(&input)?;
        let item = self.storage.update(keys::CAROUSEL, |items| {
            let id = items
                .iter()
                .map(|item| item.id)
                .max()
                .map_or(CarouselItemId::new(1), |max| max.next());
            let item = input.into_item(id);
            items.push(item.clone());
            item
        })?;
        tracing::info!(item_id = %item.id, "Carousel item created");
        Ok(item)
    }

    /// Replace a slide's fields.
    ///
    /// # Errors
    ///
    /// Returns `CarouselError::NotFound` or `CarouselError::Validation`.
    #[instrument(skip(self, input))]
    pub fn update(
        &self,
        id: CarouselItemId,
        input: CarouselInput,
    ) -> Result<CarouselItem, CarouselError> {
        validate(&input)?;
        self.storage.try_update(keys::CAROUSEL, |items| {
            let item = items
                .iter_mut()
                .find(|item| item.id == id)
                .ok_or(CarouselError::NotFound(id))?;
            *item = input.into_item(id);
            Ok(item.clone())
        })
    }

    /// Delete a slide.
    ///
    /// # Errors
    ///
    /// Returns `CarouselError::NotFound` if there is no such slide.
    #[instrument(skip(self))]
    pub fn delete(&self, id: CarouselItemId) -> Result<(), CarouselError> {
        self.storage.try_update(keys::CAROUSEL, |items| {
            let before = items.len();
            items.retain(|item| item.id != id);
            if items.len() == before {
                return Err(CarouselError::NotFound(id));
            }
            Ok(())
        })
    }
}

fn validate(input: &CarouselInput) -> Result<(), CarouselError> {
    let missing = input.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CarouselError::Validation(missing_fields_message(&missing)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn slide(title: &str, sort_order: i32, is_active: bool) -> CarouselInput {
        CarouselInput {
            title: title.to_string(),
            description: String::new(),
            image_url: "/static/slide.jpg".to_string(),
            link_url: None,
            is_active,
            sort_order,
        }
    }

    #[test]
    fn test_active_in_sort_order() {
        let storage = Storage::in_memory();
        let carousel = CarouselService::new(&storage);
        carousel.create(slide("Third", 3, true)).unwrap();
        carousel.create(slide("Hidden", 0, false)).unwrap();
        carousel.create(slide("First", 1, true)).unwrap();

        let titles: Vec<String> = carousel
            .active()
            .unwrap()
            .into_iter()
            .map(|item| item.title)
            .collect();
        assert_eq!(titles, vec!["First", "Third"]);
        assert_eq!(carousel.list().unwrap().len(), 3);
    }

    #[test]
    fn test_update_and_delete() {
        let storage = Storage::in_memory();
        let carousel = CarouselService::new(&storage);
        let item = carousel.create(slide("Launch", 1, false)).unwrap();

        let updated = carousel.update(item.id, slide("Launch", 1, true)).unwrap();
        assert!(updated.is_active);

        carousel.delete(item.id).unwrap();
        assert!(matches!(
            carousel.delete(item.id),
            Err(CarouselError::NotFound(_))
        ));
    }

    #[test]
    fn test_create_requires_image() {
        let storage = Storage::in_memory();
        let mut input = slide("No image", 1, true);
        input.image_url = " ".to_string();
        let err = CarouselService::new(&storage).create(input).unwrap_err();
        assert_eq!(err.to_string(), "missing required fields: imageUrl");
    }
}
