//! Keyed JSON storage for a storefront profile.
//!
//! Every piece of storefront state (session, cart, purchases, catalog,
//! carousel, admin roster) lives under a fixed string key as a JSON document,
//! the same layout a browser's local storage would hold. A [`KeyedStore`]
//! backend only moves raw strings; [`Storage`] adds typed access through
//! [`Key`] constants, defensive parsing and change notifications.
//!
//! # Read contract
//!
//! A missing key reads as `T::default()`. A key holding malformed JSON is
//! logged at `warn` and also reads as the default, so a hand-edited or
//! truncated record never takes the storefront down.
//!
//! # Write contract
//!
//! [`Storage::write`] is last-write-wins. [`Storage::update`] runs one
//! read-modify-write block under a per-store lock so that two handlers
//! touching the same key in this process cannot interleave and lose an
//! update. Every successful write emits [`Signal::StorageChanged`].
//!
//! # Blocking
//!
//! The API is synchronous. With a [`FileStore`] each call does small
//! blocking file I/O on the calling thread, inside the update lock when it
//! is a write, so a slow disk stalls that tokio worker for the duration of
//! one document write. Profiles are a handful of small documents; callers
//! that need more than that should move storage calls to
//! `tokio::task::spawn_blocking`.

pub mod file;
pub mod keys;
pub mod memory;

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::events::{EventBus, Signal};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O error on key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be serialized for writing.
    #[error("failed to serialize value for key {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The key cannot be used as a storage name.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// A raw string key/value backend.
///
/// Implementations are synchronous, mirroring browser storage. They do not
/// need their own locking for read-modify-write sequences; [`Storage`]
/// serializes those.
pub trait KeyedStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn set_raw(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// List every stored key, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be listed.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// A storage key bound to the type stored under it.
pub struct Key<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    /// Declare a typed key.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The raw key name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> std::fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Key").field(&self.name).finish()
    }
}

/// Typed, notifying access to a [`KeyedStore`].
///
/// Cheaply cloneable; all clones share the backend, the lock and the
/// [`EventBus`].
#[derive(Clone)]
pub struct Storage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    backend: Box<dyn KeyedStore>,
    events: EventBus,
    write_lock: Mutex<()>,
}

impl Storage {
    /// Wrap a backend, publishing changes on `events`.
    #[must_use]
    pub fn new(backend: impl KeyedStore + 'static, events: EventBus) -> Self {
        Self {
            inner: Arc::new(StorageInner {
                backend: Box::new(backend),
                events,
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// An empty in-memory profile with its own event bus.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new(), EventBus::new())
    }

    /// The event bus this storage publishes on.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// The raw backend.
    #[must_use]
    pub fn backend(&self) -> &dyn KeyedStore {
        self.inner.backend.as_ref()
    }

    /// Read the value under `key`, substituting the default when the key is
    /// missing or holds malformed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend itself fails.
    pub fn read<T>(&self, key: Key<T>) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        let Some(raw) = self.inner.backend.get_raw(key.name())? else {
            return Ok(T::default());
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(key = key.name(), error = %e, "Discarding malformed stored value");
                Ok(T::default())
            }
        }
    }

    /// Replace the value under `key` (last write wins).
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized or the backend fails.
    pub fn write<T>(&self, key: Key<T>, value: &T) -> Result<(), StoreError>
    where
        T: Serialize,
    {
        let _guard = self.lock();
        self.write_locked(key, value)
    }

    /// Delete `key` entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    pub fn remove<T>(&self, key: Key<T>) -> Result<(), StoreError> {
        let _guard = self.lock();
        self.inner.backend.remove(key.name())?;
        self.notify(key.name());
        Ok(())
    }

    /// Run one read-modify-write block on `key`.
    ///
    /// The closure sees the current value (or the default) and the result is
    /// written back before the lock is released.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the value cannot be serialized.
    pub fn update<T, R>(&self, key: Key<T>, f: impl FnOnce(&mut T) -> R) -> Result<R, StoreError>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let _guard = self.lock();
        let mut value = self.read(key)?;
        let out = f(&mut value);
        self.write_locked(key, &value)?;
        Ok(out)
    }

    /// Like [`update`](Self::update), but the closure may reject the change.
    ///
    /// Nothing is written and no signal is emitted when the closure fails.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a [`StoreError`] converted into `E`.
    pub fn try_update<T, R, E>(
        &self,
        key: Key<T>,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Result<R, E>
    where
        T: Serialize + DeserializeOwned + Default,
        E: From<StoreError>,
    {
        let _guard = self.lock();
        let mut value = self.read(key)?;
        let out = f(&mut value)?;
        self.write_locked(key, &value)?;
        Ok(out)
    }

    fn write_locked<T: Serialize>(&self, key: Key<T>, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.name().to_owned(),
            source,
        })?;
        self.inner.backend.set_raw(key.name(), raw)?;
        self.notify(key.name());
        Ok(())
    }

    fn notify(&self, key: &str) {
        self.inner.events.emit(Signal::StorageChanged {
            key: key.to_owned(),
        });
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        self.inner
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const NUMBERS: Key<Vec<u32>> = Key::new("numbers");

    #[test]
    fn test_missing_key_reads_default() {
        let storage = Storage::in_memory();
        assert!(storage.read(NUMBERS).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_json_reads_default() {
        let storage = Storage::in_memory();
        storage
            .backend()
            .set_raw("numbers", "[1, 2,".to_string())
            .unwrap();
        assert!(storage.read(NUMBERS).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_shape_reads_default() {
        let storage = Storage::in_memory();
        storage
            .backend()
            .set_raw("numbers", "{\"not\": \"a list\"}".to_string())
            .unwrap();
        assert!(storage.read(NUMBERS).unwrap().is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let storage = Storage::in_memory();
        storage.write(NUMBERS, &vec![1, 2, 3]).unwrap();
        assert_eq!(storage.read(NUMBERS).unwrap(), vec![1, 2, 3]);
        assert_eq!(
            storage.backend().get_raw("numbers").unwrap().as_deref(),
            Some("[1,2,3]")
        );
    }

    #[test]
    fn test_update_returns_closure_result() {
        let storage = Storage::in_memory();
        let len = storage
            .update(NUMBERS, |numbers| {
                numbers.push(4);
                numbers.len()
            })
            .unwrap();
        assert_eq!(len, 1);
        assert_eq!(storage.read(NUMBERS).unwrap(), vec![4]);
    }

    #[test]
    fn test_try_update_failure_writes_nothing() {
        let storage = Storage::in_memory();
        let mut sub = storage.events().subscribe();

        let result: Result<(), StoreError> = storage.try_update(NUMBERS, |numbers| {
            numbers.push(9);
            Err(StoreError::InvalidKey("rejected".to_string()))
        });

        assert!(result.is_err());
        assert!(storage.backend().get_raw("numbers").unwrap().is_none());
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_writes_emit_storage_changed() {
        let storage = Storage::in_memory();
        let mut sub = storage.events().subscribe();

        storage.write(NUMBERS, &vec![1]).unwrap();
        storage.remove(NUMBERS).unwrap();

        let expected = Signal::StorageChanged {
            key: "numbers".to_string(),
        };
        assert_eq!(sub.try_recv(), Some(expected.clone()));
        assert_eq!(sub.try_recv(), Some(expected));
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn test_concurrent_updates_do_not_lose_writes() {
        let storage = Storage::in_memory();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let storage = storage.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        storage.update(NUMBERS, |numbers| numbers.push(i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(storage.read(NUMBERS).unwrap().len(), 200);
    }
}
