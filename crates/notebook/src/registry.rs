//! In-memory note registry.
//!
//! The registry maps note ids to notes behind a single read/write lock.
//! Mutations take the write lock and are serialized against each other;
//! reads share the read lock and always see a whole map, never a half-applied
//! write. The lock is held only for the map operation itself.
//!
//! A registry may be bounded. When a bounded registry is full and a note with
//! a new id is saved, the note with the smallest `last_modified` is evicted
//! first. Ties go to the smallest id so eviction does not depend on hash map
//! iteration order.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::note::Note;

/// Storage contract used by the note service.
///
/// All operations are total: the in-memory implementation cannot fail, and a
/// durable backend would report failures through the service instead.
#[async_trait::async_trait]
pub trait NoteRepository: Send + Sync + std::fmt::Debug {
    /// Insert or replace a note by id, returning the stored note.
    async fn save(&self, note: Note) -> Note;

    /// Look up a note by id.
    async fn find_by_id(&self, id: &str) -> Option<Note>;

    /// All stored notes, in no particular order.
    async fn find_all(&self) -> Vec<Note>;

    /// Remove a note. Returns `true` if one was removed.
    async fn delete_by_id(&self, id: &str) -> bool;

    /// Remove every note.
    async fn delete_all(&self);

    /// Number of stored notes.
    async fn count(&self) -> usize;

    /// Whether a note with this id exists.
    async fn exists_by_id(&self, id: &str) -> bool;
}

/// Lock-guarded in-memory registry with optional capacity bound.
#[derive(Debug, Default)]
pub struct InMemoryNoteRegistry {
    notes: RwLock<HashMap<String, Note>>,
    capacity: Option<usize>,
}

impl InMemoryNoteRegistry {
    /// Create an unbounded registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding at most `capacity` notes.
    ///
    /// A capacity of zero is treated as unbounded.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            notes: RwLock::new(HashMap::with_capacity(capacity.min(1024))),
            capacity: (capacity > 0).then_some(capacity),
        }
    }

    /// Create a registry from an optional bound.
    #[must_use]
    pub fn bounded(capacity: Option<usize>) -> Self {
        capacity.map_or_else(Self::new, Self::with_capacity)
    }

    /// The configured capacity bound, if any.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

/// The eviction candidate: oldest `last_modified`, then smallest id.
fn oldest_id(notes: &HashMap<String, Note>) -> Option<String> {
    notes
        .values()
        .min_by(|a, b| {
            a.last_modified
                .cmp(&b.last_modified)
                .then_with(|| a.id.cmp(&b.id))
        })
        .map(|note| note.id.clone())
}

#[async_trait::async_trait]
impl NoteRepository for InMemoryNoteRegistry {
    async fn save(&self, note: Note) -> Note {
        let mut notes = self.notes.write().await;

        if let Some(capacity) = self.capacity {
            if notes.len() >= capacity && !notes.contains_key(&note.id) {
                if let Some(evicted) = oldest_id(&notes) {
                    notes.remove(&evicted);
                    info!("Evicted note {} to stay within capacity {}", evicted, capacity);
                }
            }
        }

        notes.insert(note.id.clone(), note.clone());
        debug!("Saved note {} ({} stored)", note.id, notes.len());
        note
    }

    async fn find_by_id(&self, id: &str) -> Option<Note> {
        self.notes.read().await.get(id).cloned()
    }

    async fn find_all(&self) -> Vec<Note> {
        self.notes.read().await.values().cloned().collect()
    }

    async fn delete_by_id(&self, id: &str) -> bool {
        self.notes.write().await.remove(id).is_some()
    }

    async fn delete_all(&self) {
        let mut notes = self.notes.write().await;
        let removed = notes.len();
        notes.clear();
        debug!("Cleared {} notes", removed);
    }

    async fn count(&self) -> usize {
        self.notes.read().await.len()
    }

    async fn exists_by_id(&self, id: &str) -> bool {
        self.notes.read().await.contains_key(id)
    }
}
