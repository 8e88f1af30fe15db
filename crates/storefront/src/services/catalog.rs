//! Marketplace catalog operations.

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use soundsync_core::TrackId;

use crate::models::{Track, TrackInput};
use crate::services::missing_fields_message;
use crate::store::{Storage, StoreError, keys};

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("track {0} not found")]
    NotFound(TrackId),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Service for marketplace tracks.
pub struct CatalogService<'a> {
    storage: &'a Storage,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Every track, in stored order.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn list(&self) -> Result<Vec<Track>, StoreError> {
        self.storage.read(keys::TRACKS)
    }

    /// Look up one track.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn get(&self, id: TrackId) -> Result<Option<Track>, StoreError> {
        Ok(self.list()?.into_iter().find(|track| track.id == id))
    }

    /// Tracks for the home page's featured section: featured and in stock.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn featured(&self) -> Result<Vec<Track>, StoreError> {
        let mut tracks: Vec<Track> = self
            .list()?
            .into_iter()
            .filter(Track::is_featured_on_home)
            .collect();
        tracks.sort_by(|a, b| b.date_added.cmp(&a.date_added));
        Ok(tracks)
    }

    /// Marketplace listing: every in-stock track, optionally by genre.
    ///
    /// The `featured` flag plays no part here.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn marketplace(&self, genre: Option<&str>) -> Result<Vec<Track>, StoreError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|track| track.in_stock)
            .filter(|track| genre.is_none_or(|genre| track.has_genre(genre)))
            .collect())
    }

    /// Add a track; its ID is one past the highest existing ID.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if required fields are blank.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub fn create(&self, input: TrackInput) -> Result<Track, CatalogError> {
        let missing = input.missing_fields();
        if !missing.is_empty() {
            return Err(CatalogError::Validation(missing_fields_message(&missing)));
        }

        let track = self.storage.update(keys::TRACKS, |tracks| {
            let id = tracks
                .iter()
                .map(|track| track.id)
                .max()
                .map_or(TrackId::new(1), |max| max.next());
            let track = input.into_track(id, Utc::now());
            tracks.push(track.clone());
            track
        })?;

        tracing::info!(track_id = %track.id, "Track created");
        Ok(track)
    }

    /// Replace a track's editable fields, keeping its ID and `date_added`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` or `CatalogError::Validation`.
    #[instrument(skip(self, input))]
    pub fn update(&self, id: TrackId, input: TrackInput) -> Result<Track, CatalogError> {
        let missing = input.missing_fields();
        if !missing.is_empty() {
            return Err(CatalogError::Validation(missing_fields_message(&missing)));
        }

        self.modify(id, move |track| {
            *track = input.into_track(track.id, track.date_added);
        })
    }

    /// Delete a track.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if there is no such track.
    #[instrument(skip(self))]
    pub fn delete(&self, id: TrackId) -> Result<(), CatalogError> {
        self.storage.try_update(keys::TRACKS, |tracks| {
            let before = tracks.len();
            tracks.retain(|track| track.id != id);
            if tracks.len() == before {
                return Err(CatalogError::NotFound(id));
            }
            Ok(())
        })
    }

    /// Flip the `featured` flag.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if there is no such track.
    #[instrument(skip(self))]
    pub fn toggle_featured(&self, id: TrackId) -> Result<Track, CatalogError> {
        self.modify(id, |track| track.featured = !track.featured)
    }

    /// Flip the `in_stock` flag.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if there is no such track.
    #[instrument(skip(self))]
    pub fn toggle_in_stock(&self, id: TrackId) -> Result<Track, CatalogError> {
        self.modify(id, |track| track.in_stock = !track.in_stock)
    }

    fn modify(&self, id: TrackId, f: impl FnOnce(&mut Track)) -> Result<Track, CatalogError> {
        self.storage.try_update(keys::TRACKS, |tracks| {
            let track = tracks
                .iter_mut()
                .find(|track| track.id == id)
                .ok_or(CatalogError::NotFound(id))?;
            f(track);
            Ok(track.clone())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use soundsync_core::Price;

    use super::*;

    fn input(title: &str, genre: &str) -> TrackInput {
        TrackInput {
            title: title.to_string(),
            producer: "Kay".to_string(),
            image_url: String::new(),
            price: Price::from_cents(2999),
            bpm: Some(140),
            key: Some("A minor".to_string()),
            genre: genre.to_string(),
            in_stock: true,
            featured: false,
        }
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let storage = Storage::in_memory();
        let catalog = CatalogService::new(&storage);
        let a = catalog.create(input("A", "trap")).unwrap();
        let b = catalog.create(input("B", "trap")).unwrap();
        assert_eq!(a.id, TrackId::new(1));
        assert_eq!(b.id, TrackId::new(2));

        catalog.delete(a.id).unwrap();
        let c = catalog.create(input("C", "trap")).unwrap();
        assert_eq!(c.id, TrackId::new(3));
    }

    #[test]
    fn test_create_rejects_blank_title() {
        let storage = Storage::in_memory();
        let err = CatalogService::new(&storage)
            .create(input("  ", "trap"))
            .unwrap_err();
        assert_eq!(err.to_string(), "missing required fields: title");
    }

    #[test]
    fn test_toggle_featured_only_changes_home_section() {
        let storage = Storage::in_memory();
        let catalog = CatalogService::new(&storage);
        let track = catalog.create(input("A", "trap")).unwrap();
        catalog.create(input("B", "lofi")).unwrap();

        let marketplace_before = catalog.marketplace(None).unwrap();
        assert!(catalog.featured().unwrap().is_empty());

        let toggled = catalog.toggle_featured(track.id).unwrap();
        assert!(toggled.featured);

        let featured: Vec<TrackId> = catalog.featured().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(featured, vec![track.id]);

        let marketplace_after: Vec<TrackId> =
            catalog.marketplace(None).unwrap().iter().map(|t| t.id).collect();
        let before_ids: Vec<TrackId> = marketplace_before.iter().map(|t| t.id).collect();
        assert_eq!(marketplace_after, before_ids);
    }

    #[test]
    fn test_out_of_stock_hidden_everywhere() {
        let storage = Storage::in_memory();
        let catalog = CatalogService::new(&storage);
        let track = catalog.create(input("A", "trap")).unwrap();
        catalog.toggle_featured(track.id).unwrap();
        catalog.toggle_in_stock(track.id).unwrap();

        assert!(catalog.featured().unwrap().is_empty());
        assert!(catalog.marketplace(None).unwrap().is_empty());
        assert_eq!(catalog.list().unwrap().len(), 1);
    }

    #[test]
    fn test_marketplace_genre_filter() {
        let storage = Storage::in_memory();
        let catalog = CatalogService::new(&storage);
        catalog.create(input("A", "Trap")).unwrap();
        catalog.create(input("B", "lofi")).unwrap();

        let trap = catalog.marketplace(Some("trap")).unwrap();
        assert_eq!(trap.len(), 1);
        assert_eq!(trap[0].title, "A");
    }

    #[test]
    fn test_update_keeps_id_and_date() {
        let storage = Storage::in_memory();
        let catalog = CatalogService::new(&storage);
        let original = catalog.create(input("A", "trap")).unwrap();

        let updated = catalog.update(original.id, input("A (Remix)", "trap")).unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.date_added, original.date_added);
        assert_eq!(updated.title, "A (Remix)");

        assert!(matches!(
            catalog.update(TrackId::new(99), input("X", "trap")),
            Err(CatalogError::NotFound(_))
        ));
    }
}
