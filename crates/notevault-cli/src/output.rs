//! Output formatting for notes: comfy-table for terminals, JSON for scripts.

use chrono::{DateTime, Local, Utc};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use notevault_core::storage::Note;

const PREVIEW_CHARS: usize = 48;

/// Format epoch milliseconds in local time.
pub fn format_timestamp(millis: Option<i64>) -> String {
    millis
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn preview(content: &str) -> String {
    let first_line = content.lines().next().unwrap_or("");
    let mut out: String = first_line.chars().take(PREVIEW_CHARS).collect();
    if first_line.chars().count() > PREVIEW_CHARS || content.lines().nth(1).is_some() {
        out.push('…');
    }
    out
}

/// Render the note list as a table.
pub fn notes_table(notes: &[Note]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Preview").add_attribute(Attribute::Bold),
            Cell::new("Updated").add_attribute(Attribute::Bold),
        ]);
    for note in notes {
        table.add_row(vec![
            Cell::new(note.id.to_string()),
            Cell::new(&note.title),
            Cell::new(preview(&note.content)),
            Cell::new(format_timestamp(note.updated_at)),
        ]);
    }
    table.to_string()
}

/// Render a single note for reading.
pub fn note_text(note: &Note) -> String {
    format!(
        "{}\n\nid: {}\ncreated: {}\nupdated: {}\n\n{}",
        note.title,
        note.id,
        format_timestamp(note.created_at),
        format_timestamp(note.updated_at),
        note.content
    )
}

/// Convert a note to JSON for output.
pub fn note_json(note: &Note) -> serde_json::Value {
    serde_json::json!({
        "id": note.id.as_saved(),
        "title": note.title,
        "content": note.content,
        "created_at": note.created_at,
        "updated_at": note.updated_at,
    })
}

/// Convert multiple notes to a JSON array for output.
pub fn notes_json(notes: &[Note]) -> Vec<serde_json::Value> {
    notes.iter().map(note_json).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notevault_core::storage::NoteId;

    fn saved(id: i64, title: &str, content: &str) -> Note {
        Note {
            id: NoteId::Saved(id),
            title: title.to_string(),
            content: content.to_string(),
            created_at: Some(1_700_000_000_000),
            updated_at: Some(1_700_000_000_500),
        }
    }

    #[test]
    fn test_note_json_fields() {
        let value = note_json(&saved(4, "Plans", "ship it"));
        assert_eq!(value["id"], 4);
        assert_eq!(value["title"], "Plans");
        assert_eq!(value["content"], "ship it");
        assert_eq!(value["updated_at"], 1_700_000_000_500i64);
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("short"), "short");
        assert_eq!(preview("line one\nline two"), "line one…");
        let long = "x".repeat(100);
        assert_eq!(preview(&long).chars().count(), PREVIEW_CHARS + 1);
    }

    #[test]
    fn test_table_lists_titles() {
        let table = notes_table(&[saved(1, "Alpha", "a"), saved(2, "Beta", "b")]);
        assert!(table.contains("Alpha"));
        assert!(table.contains("Beta"));
    }

    #[test]
    fn test_missing_timestamp() {
        assert_eq!(format_timestamp(None), "-");
    }
}
