use std::path::Path;
use std::time::Duration;

use tracing::warn;

use crate::app::{App, Message, Model, ToastLevel};
use crate::watcher::DocumentWatcher;

impl App {
    pub(super) fn make_file_watcher(path: &Path) -> notify::Result<DocumentWatcher> {
        DocumentWatcher::new(path, Duration::from_millis(200))
    }

    pub(super) fn handle_message_side_effects(
        model: &mut Model,
        file_watcher: &mut Option<DocumentWatcher>,
        msg: &Message,
    ) {
        match msg {
            Message::ToggleWatch => {
                if !model.watch_enabled {
                    *file_watcher = None;
                    model.show_toast(ToastLevel::Info, "Watch disabled");
                    return;
                }
                let Some(path) = model.file_path.clone() else {
                    model.show_toast(ToastLevel::Info, "Watching starts once the document is saved");
                    return;
                };
                match Self::make_file_watcher(&path) {
                    Ok(watcher) => {
                        *file_watcher = Some(watcher);
                        model.show_toast(ToastLevel::Info, "Watching file changes");
                    }
                    Err(err) => {
                        model.watch_enabled = false;
                        *file_watcher = None;
                        model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
                        warn!(path = %path.display(), %err, "failed to watch document");
                    }
                }
            }
            Message::Save => Self::save(model, file_watcher),
            Message::PromptSubmit => {
                if let Some(path) = model.pending_open.take()
                    && model.load_file(&path).is_ok()
                {
                    model.show_toast(
                        ToastLevel::Info,
                        format!("Opened {}", model.workspace.document_name()),
                    );
                }
            }
            Message::FileChanged => {
                let Some(path) = model.file_path.clone() else {
                    return;
                };
                if model.dirty {
                    warn!(path = %path.display(), "file changed on disk, keeping unsaved edits");
                    model.show_toast(
                        ToastLevel::Warning,
                        "File changed on disk. Unsaved edits kept, Ctrl-S overwrites it",
                    );
                    return;
                }
                if model.load_file(&path).is_ok() {
                    model.show_toast(ToastLevel::Info, "Reloaded");
                }
            }
            _ => {}
        }
    }

    fn save(model: &mut Model, file_watcher: &mut Option<DocumentWatcher>) {
        if let Some(watcher) = file_watcher.as_mut() {
            watcher.note_own_write();
        }
        match model.workspace.save_to_dir(&model.save_dir) {
            Ok(path) => {
                model.dirty = false;
                model.show_toast(ToastLevel::Info, format!("Saved {}", path.display()));
                model.file_path = Some(path);
            }
            Err(err) => {
                warn!(%err, "save failed");
                model.show_toast(ToastLevel::Error, format!("Save failed: {err}"));
            }
        }
    }
}
