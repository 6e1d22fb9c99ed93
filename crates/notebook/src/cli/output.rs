//! Rendering notes for the terminal.

use crate::error::Result;
use crate::note::{format_timestamp, Note};

use super::commands::OutputFormat;

const NO_TITLE: &str = "(untitled)";

/// Render one note.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn render_note(note: &Note, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(note)?),
        OutputFormat::Plain => {
            let mut out = note_header(note);
            if let Some(content) = note.content.as_deref().filter(|c| !c.is_empty()) {
                out.push('\n');
                out.push_str(content);
            }
            Ok(out)
        }
    }
}

/// Render a list of notes, one summary line each.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn render_notes(notes: &[Note], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(notes)?),
        OutputFormat::Plain if notes.is_empty() => Ok("No notes.".to_string()),
        OutputFormat::Plain => Ok(notes
            .iter()
            .map(note_header)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Render one snapshot of a watch stream. JSON snapshots stay on one line.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn render_snapshot(notes: &[Note], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(notes)?),
        OutputFormat::Plain => {
            let body = render_notes(notes, format)?;
            Ok(format!("--- {} notes ---\n{body}", notes.len()))
        }
    }
}

fn note_header(note: &Note) -> String {
    format!(
        "{}  {}  {}",
        note.id,
        format_timestamp(note.last_modified),
        note.title.as_deref().unwrap_or(NO_TITLE)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Note {
        // 2023-11-14 22:13:20 UTC
        Note::new(
            "n-1",
            Some("Groceries".to_string()),
            Some("milk".to_string()),
            1_700_000_000_000,
        )
    }

    #[test]
    fn test_render_note_plain() {
        let out = render_note(&sample(), OutputFormat::Plain).unwrap();
        assert_eq!(out, "n-1  14/11/2023 22:13  Groceries\nmilk");
    }

    #[test]
    fn test_render_note_json() {
        let out = render_note(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["lastModified"], 1_700_000_000_000_i64);
    }

    #[test]
    fn test_render_notes_empty() {
        assert_eq!(render_notes(&[], OutputFormat::Plain).unwrap(), "No notes.");
    }

    #[test]
    fn test_render_untitled() {
        let note = Note::new("n-2", None, None, 0);
        let out = render_notes(&[note], OutputFormat::Plain).unwrap();
        assert_eq!(out, "n-2  01/01/1970 00:00  (untitled)");
    }

    #[test]
    fn test_render_snapshot_json_is_single_line() {
        let out = render_snapshot(&[sample(), sample()], OutputFormat::Json).unwrap();
        assert!(!out.contains('\n'));
    }

    #[test]
    fn test_render_snapshot_plain_has_count() {
        let out = render_snapshot(&[sample()], OutputFormat::Plain).unwrap();
        assert!(out.starts_with("--- 1 notes ---\n"));
    }
}
