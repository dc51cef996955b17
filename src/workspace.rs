//! One open document: the host editor, its name and its trigger watcher.
//!
//! The workspace is what a page shell would hold. It mounts the trigger
//! watcher when created and unmounts it when dropped, and it implements the
//! user-level actions: save, load, clear and insert button.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::document::{Editor, HostEditor, HostError, Schema, seed_blocks};
use crate::envelope::{
    self, Envelope, LoadError, SaveError, document_file_name, name_from_file_name,
    serialize_document,
};
use crate::trigger::{
    ConversionMode, DEFAULT_TRIGGER_DELAY, InsertOutcome, Keystroke, ScanOutcome, TriggerWatcher,
    insert_inline_button,
};

/// Name used until the user picks one.
pub const DEFAULT_DOCUMENT_NAME: &str = "Untitled Document";

/// Prompt shown before clearing.
pub const CLEAR_PROMPT: &str = "Are you sure you want to clear all content?";

/// Trigger behaviour of a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceOptions {
    pub trigger_delay: Duration,
    pub conversion: ConversionMode,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        Self {
            trigger_delay: DEFAULT_TRIGGER_DELAY,
            conversion: ConversionMode::default(),
        }
    }
}

/// Result of a clear request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    Declined,
}

/// The host rejected the clear.
#[derive(Debug, Error)]
#[error("failed to clear document: {0}")]
pub struct ClearError(#[from] pub HostError);

impl ClearError {
    pub const fn alert_message(&self) -> &'static str {
        "Clear failed, please try again"
    }
}

/// An open document.
pub struct Workspace<H: HostEditor = Editor> {
    host: H,
    document_name: String,
    watcher: Option<TriggerWatcher>,
}

impl Workspace<Editor> {
    /// Workspace holding the welcome document.
    ///
    /// # Errors
    /// Fails if the seed content is rejected by the editor.
    pub fn with_seed(options: WorkspaceOptions) -> Result<Self, HostError> {
        let editor = Editor::with_blocks(Schema::with_inline_button(), seed_blocks())?;
        Ok(Self::new(editor, options))
    }

    /// Workspace holding an empty document.
    pub fn empty(options: WorkspaceOptions) -> Self {
        Self::new(Editor::new(Schema::with_inline_button()), options)
    }
}

impl<H: HostEditor> Workspace<H> {
    /// Mount a workspace on `host` and attach a trigger watcher using the
    /// button rule registered in the host's schema. Hosts without the button
    /// get no watcher.
    pub fn new(host: H, options: WorkspaceOptions) -> Self {
        let mut watcher =
            TriggerWatcher::for_schema(host.schema(), options.trigger_delay, options.conversion);
        if let Some(watcher) = watcher.as_mut() {
            watcher.attach();
        }
        Self {
            host,
            document_name: DEFAULT_DOCUMENT_NAME.to_string(),
            watcher,
        }
    }

    pub const fn host(&self) -> &H {
        &self.host
    }

    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub fn set_document_name(&mut self, name: impl Into<String>) {
        self.document_name = name.into();
    }

    /// Feed a keystroke to the trigger watcher. Call before applying the key
    /// to the host.
    pub fn handle_key(&mut self, key: Keystroke, now_ms: u64) -> bool {
        self.watcher
            .as_mut()
            .is_some_and(|w| w.on_key(key, &self.host, now_ms))
    }

    /// Run a due trigger scan.
    pub fn tick(&mut self, now_ms: u64) -> Option<ScanOutcome> {
        self.watcher.as_mut()?.poll(&mut self.host, now_ms)
    }

    pub fn scan_pending(&self) -> bool {
        self.watcher.as_ref().is_some_and(TriggerWatcher::is_pending)
    }

    /// Milliseconds until a pending scan is due.
    pub fn scan_remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.watcher.as_ref()?.remaining_ms(now_ms)
    }

    /// Insert a button at the cursor (or the end of the document).
    pub fn insert_button(&mut self, label: &str) -> InsertOutcome {
        insert_inline_button(&mut self.host, label)
    }

    /// Encode the document as an envelope stamped with `at`.
    ///
    /// # Errors
    /// Fails if a block cannot be encoded.
    pub fn save_json(&self, at: DateTime<Utc>) -> Result<String, SaveError> {
        Ok(serialize_document(
            self.host.top_level_blocks(),
            &self.document_name,
            at,
        )?)
    }

    /// Save to `<dir>/<document name>.json`.
    ///
    /// # Errors
    /// Fails if encoding or writing fails.
    pub fn save_to_dir(&self, dir: &Path) -> Result<PathBuf, SaveError> {
        let path = dir.join(document_file_name(&self.document_name));
        self.save_to_path(&path)?;
        Ok(path)
    }

    /// Save to an explicit path.
    ///
    /// # Errors
    /// Fails if encoding or writing fails.
    pub fn save_to_path(&self, path: &Path) -> Result<(), SaveError> {
        let json = self.save_json(Utc::now())?;
        envelope::write_envelope(path, &json)?;
        info!(path = %path.display(), name = %self.document_name, "saved document");
        Ok(())
    }

    /// Replace the document with an envelope read from text.
    ///
    /// `file_name` names the source and supplies the document name when the
    /// envelope has none. On any error the document and its name are left
    /// as they were.
    ///
    /// # Errors
    /// See [`LoadError`].
    pub fn load_str(&mut self, text: &str, file_name: &str) -> Result<(), LoadError> {
        let envelope = envelope::parse_envelope(text).inspect_err(|err| {
            warn!(file = file_name, %err, "document could not be parsed");
        })?;
        self.apply_envelope(envelope, file_name)
    }

    /// Replace the document with the envelope stored at `path`.
    ///
    /// # Errors
    /// See [`LoadError`].
    pub fn load_file(&mut self, path: &Path) -> Result<(), LoadError> {
        let (envelope, file_name) = envelope::read_envelope(path).inspect_err(|err| {
            warn!(path = %path.display(), %err, "document could not be read");
        })?;
        self.apply_envelope(envelope, &file_name)
    }

    fn apply_envelope(&mut self, envelope: Envelope, file_name: &str) -> Result<(), LoadError> {
        let block_count = envelope.content.len();
        self.host.replace_blocks(envelope.content).inspect_err(|err| {
            warn!(file = file_name, %err, "editor rejected loaded document");
        })?;
        self.document_name = envelope
            .document_name
            .unwrap_or_else(|| name_from_file_name(file_name));
        info!(
            file = file_name,
            name = %self.document_name,
            blocks = block_count,
            "loaded document"
        );
        Ok(())
    }

    /// Empty the document once `confirm` agrees.
    ///
    /// # Errors
    /// Fails if the host rejects the replace; the document is unchanged.
    pub fn clear(
        &mut self,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<ClearOutcome, ClearError> {
        if !confirm(CLEAR_PROMPT) {
            return Ok(ClearOutcome::Declined);
        }
        self.host.replace_blocks(Vec::new()).inspect_err(|err| {
            warn!(%err, "clear failed");
        })?;
        info!("cleared document");
        Ok(ClearOutcome::Cleared)
    }
}

impl<H: HostEditor> Drop for Workspace<H> {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.as_mut() {
            watcher.detach();
        }
    }
}
