//! In-memory photo storage

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Photo {
    pub id: u64,
    pub title: String,
    pub disk: String,
}

/// Thread-safe photo store, bound as a singleton by `AppServiceProvider`
#[derive(Debug)]
pub struct PhotoStore {
    disk: String,
    photos: RwLock<Vec<Photo>>,
    next_id: AtomicU64,
}

impl Default for PhotoStore {
    fn default() -> Self {
        Self::new("local")
    }
}

impl PhotoStore {
    pub fn new(disk: impl Into<String>) -> Self {
        Self {
            disk: disk.into(),
            photos: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn disk(&self) -> &str {
        &self.disk
    }

    pub fn len(&self) -> usize {
        self.read(|photos| photos.len())
    }

    /// One page of photos, oldest first; pages start at 1
    pub fn page(&self, page: usize, per_page: usize) -> Vec<Photo> {
        let skip = page.saturating_sub(1).saturating_mul(per_page);
        self.read(|photos| photos.iter().skip(skip).take(per_page).cloned().collect())
    }

    pub fn find(&self, id: u64) -> Option<Photo> {
        self.read(|photos| photos.iter().find(|p| p.id == id).cloned())
    }

    pub fn create(&self, title: impl Into<String>) -> Photo {
        let photo = Photo {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            title: title.into(),
            disk: self.disk.clone(),
        };
        self.write(|photos| photos.push(photo.clone()));
        photo
    }

    pub fn update(&self, id: u64, title: impl Into<String>) -> Option<Photo> {
        let title = title.into();
        self.write(|photos| {
            let photo = photos.iter_mut().find(|p| p.id == id)?;
            photo.title = title;
            Some(photo.clone())
        })
    }

    /// Returns false if no photo had this id
    pub fn delete(&self, id: u64) -> bool {
        self.write(|photos| {
            let before = photos.len();
            photos.retain(|p| p.id != id);
            photos.len() != before
        })
    }

    // A poisoned lock only means a writer panicked; the Vec itself is intact
    fn read<R>(&self, f: impl FnOnce(&Vec<Photo>) -> R) -> R {
        let guard = self.photos.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    fn write<R>(&self, f: impl FnOnce(&mut Vec<Photo>) -> R) -> R {
        let mut guard = self.photos.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }
}
