//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`render`]: Layout and the block document surface
//! - the name, toast and status bars
//! - prompt, confirmation and help overlays

mod overlays;
mod render;
mod status;

pub use render::{block_line, document_lines, render};

pub const DOCUMENT_LEFT_PADDING: u16 = 2;

#[cfg(test)]
mod tests;
