use std::path::PathBuf;

use tracing::debug;

use crate::app::Model;
use crate::app::model::{DEFAULT_BUTTON_LABEL, Mode, ToastLevel};
use crate::document::{CursorMove, Editor};
use crate::trigger::{InsertOutcome, Keystroke, ScanOutcome};
use crate::workspace::ClearOutcome;

/// All possible events and actions in the application.
///
/// Editing messages carry the time they happened (milliseconds since the app
/// started) so trigger scans can be debounced without reading a clock here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// Type a character at the cursor
    InsertChar(char, u64),
    /// Start a new paragraph after the focused block
    InsertParagraph(u64),
    /// Delete the character or button before the cursor
    DeleteBack(u64),
    /// Move the cursor
    MoveCursor(CursorMove),
    /// Time passed; run a due trigger scan
    Tick(u64),

    // Document
    /// Save the document as `<name>.json`
    Save,
    /// Ask for a path to open
    StartOpen,
    /// Ask for a new document name
    StartRename,
    /// Ask for a button label
    StartInsertButton,
    /// Ask before clearing the document
    StartClear,
    /// Answer to the clear question
    ConfirmClear(bool),

    // Prompts
    /// Type into the active prompt
    PromptInput(char),
    /// Delete the last prompt character
    PromptBackspace,
    /// Accept the prompt
    PromptSubmit,
    /// Dismiss the prompt
    PromptCancel,

    // File watching
    /// Toggle file watching
    ToggleWatch,
    /// File changed externally, reload
    FileChanged,

    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,

    // Window
    /// Terminal resized
    Resize(u16, u16),
    /// Redraw screen
    Redraw,

    // Application
    /// Quit the application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// File IO for `Save`, `PromptSubmit` (open), `ToggleWatch` and
/// `FileChanged` happens afterwards in the side-effect handler.
pub fn update(mut model: Model, msg: Message) -> Model {
    // Reset the quit confirmation on any other action.
    if !matches!(msg, Message::Quit | Message::Tick(_)) {
        model.quit_confirmed = false;
    }

    match msg {
        Message::InsertChar(ch, now_ms) => {
            ensure_cursor(model.workspace.host_mut());
            model.workspace.handle_key(Keystroke::Char(ch), now_ms);
            let mut buf = [0u8; 4];
            match model.workspace.host_mut().type_text(ch.encode_utf8(&mut buf)) {
                Ok(()) => model.dirty = true,
                Err(err) => debug!(%err, "keystroke not applied"),
            }
        }
        Message::InsertParagraph(now_ms) => {
            ensure_cursor(model.workspace.host_mut());
            model.workspace.handle_key(Keystroke::Enter, now_ms);
            model.workspace.host_mut().insert_paragraph_after();
            model.dirty = true;
        }
        Message::DeleteBack(now_ms) => {
            model.workspace.handle_key(Keystroke::Backspace, now_ms);
            if model.workspace.host_mut().delete_back() {
                model.dirty = true;
            }
        }
        Message::MoveCursor(motion) => {
            model.workspace.host_mut().move_cursor(motion);
        }
        Message::Tick(now_ms) => match model.workspace.tick(now_ms) {
            Some(ScanOutcome::Converted { .. }) => model.dirty = true,
            Some(ScanOutcome::NoMatch | ScanOutcome::Failed { .. }) | None => {}
        },

        Message::StartOpen => {
            let initial = model.save_dir.join("").display().to_string();
            model.start_prompt(Mode::OpeningFile, &initial);
        }
        Message::StartRename => {
            let current = model.workspace.document_name().to_string();
            model.start_prompt(Mode::RenamingDocument, &current);
        }
        Message::StartInsertButton => {
            model.start_prompt(Mode::InsertingButton, DEFAULT_BUTTON_LABEL);
        }
        Message::StartClear => {
            model.mode = Mode::ConfirmClear;
        }
        Message::ConfirmClear(accepted) => {
            model.mode = Mode::Editing;
            match model.workspace.clear(|_| accepted) {
                Ok(ClearOutcome::Cleared) => {
                    model.dirty = true;
                    model.show_toast(ToastLevel::Info, "Document cleared");
                }
                Ok(ClearOutcome::Declined) => {}
                Err(err) => model.show_toast(ToastLevel::Error, err.alert_message()),
            }
        }

        Message::PromptInput(ch) => {
            if model.mode.is_prompt() {
                model.input.push(ch);
            }
        }
        Message::PromptBackspace => {
            model.input.pop();
        }
        Message::PromptCancel => {
            model.close_prompt();
        }
        Message::PromptSubmit => submit_prompt(&mut model),

        Message::ToggleWatch => {
            model.watch_enabled = !model.watch_enabled;
        }
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }
        // Save/FileChanged: handled in side effects
        // Resize/Redraw: no state change needed
        Message::Save | Message::FileChanged | Message::Resize(..) | Message::Redraw => {}

        Message::Quit => {
            if model.dirty && !model.quit_confirmed {
                model.quit_confirmed = true;
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved changes. Press Ctrl-Q again to quit, Ctrl-S to save",
                );
            } else {
                model.should_quit = true;
            }
        }
    }

    model
}

fn submit_prompt(model: &mut Model) {
    let mode = model.mode;
    let value = model.close_prompt();
    let value = value.trim();
    match mode {
        Mode::RenamingDocument => {
            if value.is_empty() {
                model.show_toast(ToastLevel::Warning, "Document name cannot be empty");
            } else if value != model.workspace.document_name() {
                model.workspace.set_document_name(value);
                model.dirty = true;
            }
        }
        Mode::InsertingButton => {
            if value.is_empty() {
                return;
            }
            match model.workspace.insert_button(value) {
                InsertOutcome::AtCursor | InsertOutcome::AppendedToLastBlock => {
                    model.dirty = true;
                }
                InsertOutcome::Failed => {
                    model.show_toast(ToastLevel::Warning, "Nowhere to insert a button");
                }
            }
        }
        Mode::OpeningFile => {
            if !value.is_empty() {
                model.pending_open = Some(PathBuf::from(value));
            }
        }
        Mode::Editing | Mode::ConfirmClear => {}
    }
}

/// Make sure typing has somewhere to go, creating a paragraph in an empty
/// document.
fn ensure_cursor(editor: &mut Editor) {
    if editor.cursor().is_some() {
        return;
    }
    editor.place_cursor_at_end();
    if editor.cursor().is_none() {
        editor.insert_paragraph_after();
    }
}
