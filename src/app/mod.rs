//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{DEFAULT_BUTTON_LABEL, Mode, Model, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::workspace::WorkspaceOptions;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    file_path: Option<PathBuf>,
    document_name: Option<String>,
    options: WorkspaceOptions,
    seed: bool,
    watch_enabled: bool,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application, optionally bound to a document file.
    pub fn new(file_path: Option<PathBuf>) -> Self {
        Self {
            file_path,
            document_name: None,
            options: WorkspaceOptions::default(),
            seed: false,
            watch_enabled: false,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Enable or disable file watching.
    pub fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Start a new document from the welcome content.
    pub fn with_seed(mut self, enabled: bool) -> Self {
        self.seed = enabled;
        self
    }

    /// Override the starting document name.
    pub fn with_document_name(mut self, name: Option<String>) -> Self {
        self.document_name = name;
        self
    }

    /// Trigger delay and conversion mode.
    pub const fn with_options(mut self, options: WorkspaceOptions) -> Self {
        self.options = options;
        self
    }

    /// Set config paths to show in help.
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }
}
