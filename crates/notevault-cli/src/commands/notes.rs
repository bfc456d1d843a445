use notevault_core::storage::Note;

use crate::app::{AppContext, VaultService};
use crate::cli::{AddArgs, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::errors::CliError;
use crate::helpers::{parse_note_id, read_content, validate_title};
use crate::output::{note_json, note_text, notes_json, notes_table};

fn require_note(service: &VaultService, id: i64) -> anyhow::Result<Note> {
    service.get_note(id)?.ok_or_else(|| {
        CliError::not_found(
            format!("Note {} not found", id),
            "Run `notevault list` to see note IDs.",
        )
        .into()
    })
}

pub fn handle_add(ctx: &AppContext, args: &AddArgs) -> anyhow::Result<()> {
    validate_title(&args.title)?;
    let content = read_content(args.content.clone())?;

    let service = ctx.open_service()?;
    let note = service.add_note(&args.title, &content)?;
    service.close()?;

    if !ctx.quiet() {
        println!("status=ok");
        println!("id={}", note.id);
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    let notes = service.load_notes()?;
    service.close()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&notes_json(&notes))?);
    } else if notes.is_empty() {
        if !ctx.quiet() {
            println!("No notes yet. Add one with `notevault add --title <TITLE>`.");
        }
    } else {
        println!("{}", notes_table(&notes));
    }
    Ok(())
}

pub fn handle_show(ctx: &AppContext, args: &ShowArgs) -> anyhow::Result<()> {
    let id = parse_note_id(&args.id)?;
    let service = ctx.open_service()?;
    let note = require_note(&service, id)?;
    service.close()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&note_json(&note))?);
    } else {
        println!("{}", note_text(&note));
    }
    Ok(())
}

pub fn handle_edit(ctx: &AppContext, args: &EditArgs) -> anyhow::Result<()> {
    let id = parse_note_id(&args.id)?;
    if args.title.is_none() && args.content.is_none() {
        return Err(CliError::invalid_input("Nothing to change; pass --title or --content").into());
    }
    if let Some(title) = args.title.as_deref() {
        validate_title(title)?;
    }

    let service = ctx.open_service()?;
    let current = require_note(&service, id)?;
    let title = args.title.as_deref().unwrap_or(&current.title);
    let content = args.content.as_deref().unwrap_or(&current.content);
    let note = service.update_note(id, title, content)?;
    service.close()?;

    if !ctx.quiet() {
        println!("status=ok");
        println!("id={}", note.id);
    }
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, args: &DeleteArgs) -> anyhow::Result<()> {
    let id = parse_note_id(&args.id)?;
    let service = ctx.open_service()?;
    service.delete_note(id)?;
    service.close()?;

    if !ctx.quiet() {
        println!("status=ok");
        println!("deleted={}", id);
    }
    Ok(())
}
