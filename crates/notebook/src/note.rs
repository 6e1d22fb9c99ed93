//! Core note types for notebook.
//!
//! This module defines the note record, the request payloads used to create
//! and update notes, and the validation rules shared by the service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum title length, in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum content length, in characters.
pub const MAX_CONTENT_LENGTH: usize = 10_000;

/// A single note.
///
/// The `id` is assigned by the service on creation and never changes.
/// `last_modified` is the time of the last successful save, in milliseconds
/// since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier.
    pub id: String,

    /// Note title.
    #[serde(default)]
    pub title: Option<String>,

    /// Note body.
    #[serde(default)]
    pub content: Option<String>,

    /// Milliseconds since the Unix epoch.
    pub last_modified: i64,
}

impl Note {
    /// Create a note with all fields given.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: Option<String>,
        content: Option<String>,
        last_modified: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title,
            content,
            last_modified,
        }
    }

    /// Check whether the title or content contains `needle`.
    ///
    /// `needle` must already be lower-cased.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        let contains = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|value| value.to_lowercase().contains(needle))
        };
        contains(&self.title) || contains(&self.content)
    }

    /// Check the title and content against the length and blank rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNote`] describing the first failed rule.
    pub fn validate(&self) -> Result<()> {
        validate_fields(self.title.as_deref(), self.content.as_deref())
    }
}

/// Payload for creating a note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    /// Title for the new note. Required and non-blank.
    #[serde(default)]
    pub title: Option<String>,

    /// Initial content.
    #[serde(default)]
    pub content: Option<String>,
}

impl CreateNoteRequest {
    /// Build a request with a title and optional content.
    #[must_use]
    pub fn new(title: impl Into<String>, content: Option<String>) -> Self {
        Self {
            title: Some(title.into()),
            content,
        }
    }

    /// Check the request as supplied, before any trimming.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNote`] describing the first failed rule.
    pub fn validate(&self) -> Result<()> {
        validate_fields(self.title.as_deref(), self.content.as_deref())
    }
}

/// Partial update for a note. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    /// Replacement title.
    #[serde(default)]
    pub title: Option<String>,

    /// Replacement content.
    #[serde(default)]
    pub content: Option<String>,
}

impl UpdateNoteRequest {
    /// Whether the request would change anything.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.title.is_some() || self.content.is_some()
    }
}

fn validate_fields(title: Option<&str>, content: Option<&str>) -> Result<()> {
    let title = match title {
        Some(title) if !title.trim().is_empty() => title,
        _ => return Err(Error::invalid_note("Note title cannot be blank")),
    };
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(Error::invalid_note(format!(
            "Note title cannot exceed {MAX_TITLE_LENGTH} characters"
        )));
    }
    if content.map_or(0, |c| c.chars().count()) > MAX_CONTENT_LENGTH {
        return Err(Error::invalid_note(format!(
            "Note content cannot exceed {MAX_CONTENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Sort notes newest first.
pub fn sort_newest_first(notes: &mut [Note]) {
    notes.sort_by(|a, b| {
        b.last_modified
            .cmp(&a.last_modified)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Render a millisecond timestamp as `dd/MM/yyyy HH:mm` in UTC.
///
/// Out-of-range values fall back to the raw number.
#[must_use]
pub fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis).map_or_else(
        || millis.to_string(),
        |dt| dt.format("%d/%m/%Y %H:%M").to_string(),
    )
}
