//! Block document model and the host editor.
//!
//! This module handles:
//! - The block tree and its inline items (text runs and inline buttons)
//! - The inline content schema with its Markdown match rule
//! - The in-memory editor that owns the document and guards every mutation

mod editor;
mod schema;
mod types;

pub use editor::{ContentSpan, Cursor, CursorMove, Editor, HostEditor, HostError, normalize_content};
pub use schema::{
    BUTTON_PATTERN, InlineContentSpec, MarkdownRule, PropSpec, RuleMatch, Schema,
};
pub use types::{
    Block, BlockId, BlockKind, ButtonProps, InlineItem, PartialBlock, PartialContent, find_block,
    seed_blocks,
};
