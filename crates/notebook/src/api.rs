//! The note operations shared by the local service and the remote client.
//!
//! Code written against [`NoteApi`] works the same whether it talks to an
//! in-process [`NoteService`](crate::NoteService) or to a server through a
//! [`Connection`](crate::client::Connection).

use futures_util::stream::BoxStream;

use crate::error::Result;
use crate::note::{CreateNoteRequest, Note, UpdateNoteRequest};

/// A stream of full note snapshots, each sorted newest first.
///
/// The first item is the latest snapshot at the time of subscription. After
/// that a new snapshot arrives for every committed create, update, or delete.
/// A slow consumer skips intermediate snapshots but always sees the latest.
pub type SnapshotStream = BoxStream<'static, Vec<Note>>;

/// Note operations.
#[async_trait::async_trait]
pub trait NoteApi: Send + Sync {
    /// Validate and store a new note. The id and timestamp are assigned here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNote`](crate::Error::InvalidNote) if the title is
    /// absent, blank, or too long, or the content is too long.
    async fn create_note(&self, request: CreateNoteRequest) -> Result<Note>;

    /// Look up a note. A missing note is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`](crate::Error::InvalidIdentifier) for
    /// a blank id.
    async fn get_note_by_id(&self, id: &str) -> Result<Option<Note>>;

    /// All notes, newest first.
    ///
    /// # Errors
    ///
    /// Only fails on transport errors.
    async fn get_all_notes(&self) -> Result<Vec<Note>>;

    /// Merge the present fields of `request` onto an existing note.
    ///
    /// A request with no fields returns the note unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`](crate::Error::InvalidIdentifier) for
    /// a blank id, [`Error::NotFound`](crate::Error::NotFound) if the note does
    /// not exist, and [`Error::InvalidNote`](crate::Error::InvalidNote) if the
    /// merged note fails validation.
    async fn update_note(&self, id: &str, request: UpdateNoteRequest) -> Result<Note>;

    /// Delete a note. Returns whether one was removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`](crate::Error::InvalidIdentifier) for
    /// a blank id.
    async fn delete_note(&self, id: &str) -> Result<bool>;

    /// Case-insensitive substring search over titles and contents, newest
    /// first. A blank query returns every note.
    ///
    /// # Errors
    ///
    /// Only fails on transport errors.
    async fn search_notes(&self, query: &str) -> Result<Vec<Note>>;

    /// Subscribe to note snapshots.
    ///
    /// # Errors
    ///
    /// Fails if the subscription cannot be established.
    async fn subscribe(&self) -> Result<SnapshotStream>;
}
