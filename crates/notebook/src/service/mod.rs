//! The note service.
//!
//! [`NoteService`] sits between the transport and the registry. It validates
//! requests, assigns ids and timestamps, turns bad input into typed errors,
//! and republishes the full note list to subscribers after each mutation.

pub mod clock;
pub mod id;
mod publisher;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{NoteApi, SnapshotStream};
use crate::error::{Error, Result};
use crate::note::{sort_newest_first, CreateNoteRequest, Note, UpdateNoteRequest};
use crate::registry::NoteRepository;

pub use clock::{Clock, ManualClock, SystemClock};
pub use id::{IdGenerator, SequentialIdGenerator, UuidGenerator};

use publisher::SnapshotPublisher;

/// Note service backed by a [`NoteRepository`].
///
/// Creating a service starts its snapshot publisher, so it must happen
/// inside a Tokio runtime.
#[derive(Debug)]
pub struct NoteService {
    repository: Arc<dyn NoteRepository>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    publisher: SnapshotPublisher,
}

/// Builder for [`NoteService`].
#[derive(Debug)]
pub struct NoteServiceBuilder {
    repository: Arc<dyn NoteRepository>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl NoteServiceBuilder {
    /// Use a different time source.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use a different id generator.
    #[must_use]
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Build the service and start publishing snapshots.
    #[must_use]
    pub fn build(self) -> NoteService {
        let publisher = SnapshotPublisher::spawn(Arc::clone(&self.repository));
        NoteService {
            repository: self.repository,
            clock: self.clock,
            ids: self.ids,
            publisher,
        }
    }
}

impl NoteService {
    /// Create a service with the system clock and UUID ids.
    #[must_use]
    pub fn new(repository: Arc<dyn NoteRepository>) -> Self {
        Self::builder(repository).build()
    }

    /// Start building a service over `repository`.
    #[must_use]
    pub fn builder(repository: Arc<dyn NoteRepository>) -> NoteServiceBuilder {
        NoteServiceBuilder {
            repository,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidGenerator),
        }
    }

    /// A `watch` receiver holding the latest published snapshot.
    ///
    /// Holds `None` until the registry has been read for the first time.
    #[must_use]
    pub fn snapshots(&self) -> watch::Receiver<Option<Vec<Note>>> {
        self.publisher.receiver()
    }

    /// The timestamp for a save that replaces a note stamped `previous`.
    ///
    /// Never returns a value at or below `previous`, even if the clock has
    /// not moved.
    fn next_timestamp(&self, previous: i64) -> i64 {
        self.clock.now_millis().max(previous.saturating_add(1))
    }
}

fn require_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::invalid_identifier("Note ID cannot be blank"));
    }
    Ok(())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

#[async_trait::async_trait]
impl NoteApi for NoteService {
    async fn create_note(&self, request: CreateNoteRequest) -> Result<Note> {
        debug!("Creating note with title: {:?}", request.title);
        request.validate()?;

        let note = Note {
            id: self.ids.generate(),
            title: trimmed(request.title),
            content: trimmed(request.content),
            last_modified: self.clock.now_millis(),
        };

        let saved = self.repository.save(note).await;
        info!("Created note with id: {}", saved.id);
        self.publisher.refresh();
        Ok(saved)
    }

    async fn get_note_by_id(&self, id: &str) -> Result<Option<Note>> {
        debug!("Getting note by id: {}", id);
        require_id(id)?;

        let note = self.repository.find_by_id(id).await;
        if note.is_none() {
            warn!("Note not found with id: {}", id);
        }
        Ok(note)
    }

    async fn get_all_notes(&self) -> Result<Vec<Note>> {
        let mut notes = self.repository.find_all().await;
        sort_newest_first(&mut notes);
        debug!("Retrieved {} notes", notes.len());
        Ok(notes)
    }

    async fn update_note(&self, id: &str, request: UpdateNoteRequest) -> Result<Note> {
        debug!("Updating note with id: {}", id);
        require_id(id)?;

        let existing = self
            .repository
            .find_by_id(id)
            .await
            .ok_or_else(|| Error::not_found(id))?;

        if !request.has_changes() {
            debug!("No changes requested for note: {}", id);
            return Ok(existing);
        }

        let updated = Note {
            last_modified: self.next_timestamp(existing.last_modified),
            title: trimmed(request.title).or(existing.title),
            content: trimmed(request.content).or(existing.content),
            id: existing.id,
        };
        updated.validate()?;

        let saved = self.repository.save(updated).await;
        info!("Updated note with id: {}", saved.id);
        self.publisher.refresh();
        Ok(saved)
    }

    async fn delete_note(&self, id: &str) -> Result<bool> {
        debug!("Deleting note with id: {}", id);
        require_id(id)?;

        let deleted = self.repository.delete_by_id(id).await;
        if deleted {
            info!("Deleted note with id: {}", id);
            self.publisher.refresh();
        } else {
            warn!("Nothing to delete for id: {}", id);
        }
        Ok(deleted)
    }

    async fn search_notes(&self, query: &str) -> Result<Vec<Note>> {
        debug!("Searching notes with query: {}", query);
        if query.trim().is_empty() {
            return self.get_all_notes().await;
        }

        let needle = query.trim().to_lowercase();
        let mut notes: Vec<Note> = self
            .repository
            .find_all()
            .await
            .into_iter()
            .filter(|note| note.matches(&needle))
            .collect();
        sort_newest_first(&mut notes);
        debug!("Found {} notes matching query: {}", notes.len(), query);
        Ok(notes)
    }

    async fn subscribe(&self) -> Result<SnapshotStream> {
        Ok(self.publisher.stream())
    }
}
