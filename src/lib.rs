// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. trigger::TriggerWatcher)
    clippy::module_name_repetitions
)]

//! # Blockpad
//!
//! A terminal block editor with one custom inline widget: the inline button.
//!
//! Blockpad keeps a block document (paragraphs, headings, list items,
//! images) and:
//! - Turns a typed `[label]` into an inline button once Space or Enter
//!   settles
//! - Saves and loads the document as a `blocknote` JSON envelope
//! - Optionally reloads the file when it changes on disk
//!
//! ## Architecture
//!
//! The document model and trigger logic are plain library code driven by
//! explicit timestamps. The terminal front end uses The Elm Architecture
//! (TEA):
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`document`]: Blocks, the inline content schema and the host editor
//! - [`trigger`]: Trigger watcher and widget inserter
//! - [`envelope`]: Document save/load format
//! - [`workspace`]: One open document with its watcher and actions
//! - [`config`]: Persisted default flags
//! - [`watcher`]: File watching
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components

pub mod app;
pub mod config;
pub mod document;
pub mod envelope;
pub mod trigger;
pub mod ui;
pub mod watcher;
pub mod workspace;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::{Block, Editor, HostEditor, InlineItem, PartialBlock, Schema};
    pub use crate::trigger::{ConversionMode, Keystroke, ScanOutcome, TriggerWatcher};
    pub use crate::workspace::{Workspace, WorkspaceOptions};
}
