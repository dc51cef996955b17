use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::document::{Editor, HostEditor};
use crate::envelope::LoadError;
use crate::workspace::{Workspace, WorkspaceOptions};

/// Label offered when the insert-button prompt opens.
pub const DEFAULT_BUTTON_LABEL: &str = "Test button";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// What the keyboard is currently driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Editing,
    RenamingDocument,
    OpeningFile,
    InsertingButton,
    ConfirmClear,
}

impl Mode {
    /// Modes that collect a line of text in `Model::input`.
    pub const fn is_prompt(self) -> bool {
        matches!(
            self,
            Self::RenamingDocument | Self::OpeningFile | Self::InsertingButton
        )
    }

    pub const fn prompt_title(self) -> &'static str {
        match self {
            Self::RenamingDocument => "Document name",
            Self::OpeningFile => "Open document",
            Self::InsertingButton => "Button label",
            Self::Editing | Self::ConfirmClear => "",
        }
    }
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    /// The open document with its trigger watcher
    pub workspace: Workspace<Editor>,
    /// File the document was loaded from or last saved to
    pub file_path: Option<PathBuf>,
    /// Directory new documents are saved into
    pub save_dir: PathBuf,
    pub mode: Mode,
    /// Text typed into the active prompt
    pub input: String,
    /// Whether file watching is enabled
    pub watch_enabled: bool,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    /// Whether help overlay is visible
    pub help_visible: bool,
    /// Whether the document changed since it was last saved or loaded
    pub dirty: bool,
    /// Set after first quit attempt with unsaved changes; allows second quit to proceed
    pub quit_confirmed: bool,
    /// Path queued by the open prompt, consumed by the side-effect handler
    pub(super) pending_open: Option<PathBuf>,
    toast: Option<Toast>,
    /// Whether the app should quit
    pub should_quit: bool,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("document_name", &self.workspace.document_name())
            .field("file_path", &self.file_path)
            .field("mode", &self.mode)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a model around an open workspace.
    pub fn new(workspace: Workspace<Editor>, file_path: Option<PathBuf>) -> Self {
        let save_dir = file_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self {
            workspace,
            file_path,
            save_dir,
            mode: Mode::Editing,
            input: String::new(),
            watch_enabled: false,
            config_global_path: None,
            config_local_path: None,
            help_visible: false,
            dirty: false,
            quit_confirmed: false,
            pending_open: None,
            toast: None,
            should_quit: false,
        }
    }

    pub fn editor(&self) -> &Editor {
        self.workspace.host()
    }

    pub fn block_count(&self) -> usize {
        self.editor().top_level_blocks().len()
    }

    /// Open a prompt, pre-filled with `initial`.
    pub(super) fn start_prompt(&mut self, mode: Mode, initial: &str) {
        self.mode = mode;
        self.input = initial.to_string();
    }

    pub(super) fn close_prompt(&mut self) -> String {
        self.mode = Mode::Editing;
        std::mem::take(&mut self.input)
    }

    /// Replace the document with the file at `path`, reporting failures as
    /// an alert toast.
    pub(super) fn load_file(&mut self, path: &Path) -> Result<(), LoadError> {
        match self.workspace.load_file(path) {
            Ok(()) => {
                self.file_path = Some(path.to_path_buf());
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    self.save_dir = parent.to_path_buf();
                }
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                self.show_toast(ToastLevel::Error, err.alert_message());
                Err(err)
            }
        }
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(Workspace::empty(WorkspaceOptions::default()), None)
    }
}
