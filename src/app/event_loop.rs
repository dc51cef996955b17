use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::DefaultTerminal;
use tracing::{info, warn};

use crate::app::{App, Message, Model, ToastLevel, update};
use crate::document::{Editor, HostEditor, Schema, seed_blocks};
use crate::envelope::name_from_file_name;
use crate::watcher::DocumentWatcher;
use crate::workspace::Workspace;

/// Longest wait for terminal input when nothing is scheduled.
const IDLE_POLL_MS: u64 = 250;

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization or the event loop
    /// encounters an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let mut model = self.initial_model()?;

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal - blockpad requires an interactive terminal")?;

        let result = Self::event_loop(&mut terminal, &mut model);

        ratatui::restore();
        result
    }

    /// Build the starting model: the file given on the command line, or a
    /// fresh document.
    pub(super) fn initial_model(&self) -> Result<Model> {
        let editor = if self.seed && self.file_path.is_none() {
            Editor::with_blocks(Schema::with_inline_button(), seed_blocks())
                .context("Failed to build the welcome document")?
        } else {
            Editor::new(Schema::with_inline_button())
        };
        let mut model = Model::new(Workspace::new(editor, self.options), self.file_path.clone());
        model.watch_enabled = self.watch_enabled;
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);

        if let Some(path) = &self.file_path {
            if path.exists() {
                // Failures leave an empty document and an alert toast.
                if let Err(err) = model.load_file(path) {
                    warn!(path = %path.display(), %err, "starting with an empty document");
                }
            } else if let Some(file_name) = path.file_name() {
                let name = name_from_file_name(&file_name.to_string_lossy());
                model.workspace.set_document_name(name);
            }
        }
        if let Some(name) = &self.document_name {
            model.workspace.set_document_name(name.clone());
        }
        model.workspace.host_mut().place_cursor_at_end();
        info!(
            name = model.workspace.document_name(),
            blocks = model.workspace.host().top_level_blocks().len(),
            "document ready"
        );
        Ok(model)
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let start = Instant::now();
        let elapsed_ms = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let mut file_watcher: Option<DocumentWatcher> = None;
        let mut watched_path: Option<PathBuf> = None;
        let mut needs_render = true;

        loop {
            // (Re)create the watcher when watching is on and the bound file changed.
            if !model.watch_enabled {
                file_watcher = None;
                watched_path = None;
            } else if model.file_path != watched_path {
                watched_path.clone_from(&model.file_path);
                file_watcher = match model.file_path.as_deref().map(Self::make_file_watcher) {
                    Some(Ok(watcher)) => Some(watcher),
                    Some(Err(err)) => {
                        model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
                        warn!(%err, "failed to watch document");
                        None
                    }
                    None => None,
                };
            }

            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = elapsed_ms();
            if model.workspace.scan_pending() {
                let before = model.dirty;
                *model = update(std::mem::take(model), Message::Tick(now_ms));
                needs_render |= model.dirty != before || !model.workspace.scan_pending();
            }

            if file_watcher
                .as_mut()
                .is_some_and(DocumentWatcher::take_change_ready)
            {
                *model = update(std::mem::take(model), Message::FileChanged);
                Self::handle_message_side_effects(model, &mut file_watcher, &Message::FileChanged);
                needs_render = true;
            }

            if needs_render {
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }

            let poll_ms = model
                .workspace
                .scan_remaining_ms(elapsed_ms())
                .map_or(IDLE_POLL_MS, |ms| ms.clamp(1, IDLE_POLL_MS));
            if event::poll(Duration::from_millis(poll_ms))? {
                // Coalesce key repeat bursts into a single render.
                loop {
                    let event_ms = elapsed_ms();
                    if let Some(msg) = Self::handle_event(&event::read()?, model, event_ms) {
                        let side_msg = msg.clone();
                        *model = update(std::mem::take(model), msg);
                        Self::handle_message_side_effects(model, &mut file_watcher, &side_msg);
                        needs_render = true;
                    }
                    if !event::poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}
