//! Note service: relays note operations to a repository and reports each
//! outcome to a single registered observer.
//!
//! The service holds no state beyond the repository and the observer. It
//! returns every result to its caller as well, so callers that do not
//! register an observer lose nothing.

use std::fmt;

use crate::error::{NoteError, Result};
use crate::storage::{Note, NoteRepository};

/// Operations the service can report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LoadNotes,
    GetNote,
    AddNote,
    UpdateNote,
    DeleteNote,
    Reset,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::LoadNotes => "load notes",
            Operation::GetNote => "get note",
            Operation::AddNote => "add note",
            Operation::UpdateNote => "update note",
            Operation::DeleteNote => "delete note",
            Operation::Reset => "reset",
        };
        f.write_str(name)
    }
}

/// Outcome of one service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteEvent {
    Loaded(Vec<Note>),
    Fetched(Option<Note>),
    Added(Note),
    Updated(Note),
    Deleted(i64),
    Reset,
    Failed { operation: Operation, message: String },
}

/// Receives service outcomes.
pub trait NoteObserver {
    fn on_event(&self, event: &NoteEvent);
}

impl<F> NoteObserver for F
where
    F: Fn(&NoteEvent),
{
    fn on_event(&self, event: &NoteEvent) {
        self(event)
    }
}

/// Presenter over a [`NoteRepository`].
pub struct NoteService<R: NoteRepository> {
    repository: R,
    observer: Option<Box<dyn NoteObserver>>,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            observer: None,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Register the observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: Box<dyn NoteObserver>) {
        self.observer = Some(observer);
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    pub fn load_notes(&self) -> Result<Vec<Note>> {
        let result = self.repository.list();
        self.relay(Operation::LoadNotes, result, |notes| {
            NoteEvent::Loaded(notes.clone())
        })
    }

    pub fn get_note(&self, id: i64) -> Result<Option<Note>> {
        let result = self.repository.get(id);
        self.relay(Operation::GetNote, result, |note| {
            NoteEvent::Fetched(note.clone())
        })
    }

    /// Save a new note and report it as stored.
    pub fn add_note(&self, title: &str, content: &str) -> Result<Note> {
        let result = self
            .repository
            .save(&Note::draft(title, content))
            .and_then(|id| self.reload(id));
        self.relay(Operation::AddNote, result, |note| NoteEvent::Added(note.clone()))
    }

    /// Replace the title and content of a saved note.
    pub fn update_note(&self, id: i64, title: &str, content: &str) -> Result<Note> {
        let result = self
            .repository
            .save(&Note::revision(id, title, content))
            .and_then(|id| self.reload(id));
        self.relay(Operation::UpdateNote, result, |note| {
            NoteEvent::Updated(note.clone())
        })
    }

    pub fn delete_note(&self, id: i64) -> Result<()> {
        let result = self.repository.delete(id);
        self.relay(Operation::DeleteNote, result, |_| NoteEvent::Deleted(id))
    }

    /// Drop every note and the encryption key.
    pub fn reset_vault(&self) -> Result<()> {
        let result = self.repository.reset();
        self.relay(Operation::Reset, result, |_| NoteEvent::Reset)
    }

    /// Release the repository connection.
    pub fn close(&self) -> Result<()> {
        self.repository.close()
    }

    fn reload(&self, id: i64) -> Result<Note> {
        self.repository
            .get(id)?
            .ok_or_else(|| NoteError::NotFound(format!("Note {} not found after save", id)))
    }

    fn relay<T>(
        &self,
        operation: Operation,
        result: Result<T>,
        on_success: impl FnOnce(&T) -> NoteEvent,
    ) -> Result<T> {
        if let Some(observer) = &self.observer {
            let event = match &result {
                Ok(value) => on_success(value),
                Err(err) => NoteEvent::Failed {
                    operation,
                    message: err.to_string(),
                },
            };
            observer.on_event(&event);
        }
        result
    }
}
