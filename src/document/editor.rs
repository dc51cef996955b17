//! The host editor: owner of the block list and the only way to mutate it.
//!
//! Everything outside this module goes through [`HostEditor`], which mirrors
//! the four document operations an embedded block editor exposes: read the
//! top-level blocks, update one block's content by id, replace the whole
//! document, and insert inline content at the cursor.

use std::collections::HashSet;

use thiserror::Error;

use super::schema::Schema;
use super::types::{
    Block, BlockId, BlockKind, InlineItem, PartialBlock, PartialContent, find_block,
    find_block_mut,
};

/// Rejections raised by the host editor's mutation API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("cursor is not inside a block that accepts inline content")]
    NoInsertionPoint,
    #[error("block {0} not found")]
    BlockNotFound(BlockId),
    #[error("blocks of type {0} cannot hold inline content")]
    ContentNotAllowed(BlockKind),
    #[error("inline content type {0:?} is not registered")]
    UnknownInlineType(String),
    #[error("duplicate block id {0}")]
    DuplicateBlockId(BlockId),
}

/// Document operations offered by the host editor.
pub trait HostEditor {
    /// Snapshot of the top-level blocks.
    fn top_level_blocks(&self) -> &[Block];

    /// Replace the content sequence of the block with `id`.
    ///
    /// # Errors
    /// Fails if the block does not exist, cannot hold inline content, or the
    /// content contains an unregistered inline type.
    fn update_block_content(&mut self, id: &BlockId, content: Vec<InlineItem>)
    -> Result<(), HostError>;

    /// Replace every top-level block. Nothing changes when this fails.
    ///
    /// # Errors
    /// Fails when any block is malformed.
    fn replace_blocks(&mut self, blocks: Vec<PartialBlock>) -> Result<(), HostError>;

    /// Insert inline items at the cursor.
    ///
    /// # Errors
    /// Fails when there is no cursor or the cursor sits in a block that cannot
    /// hold inline content.
    fn insert_inline_content(&mut self, items: Vec<InlineItem>) -> Result<(), HostError>;

    /// Schema the host validates inline content against.
    fn schema(&self) -> &Schema;

    /// Replace a block's content after an edit described by `span`.
    ///
    /// Hosts that track a cursor keep it on the same character. The default
    /// is a plain [`HostEditor::update_block_content`].
    ///
    /// # Errors
    /// Same as [`HostEditor::update_block_content`].
    fn splice_block_content(
        &mut self,
        id: &BlockId,
        content: Vec<InlineItem>,
        _span: ContentSpan,
    ) -> Result<(), HostError> {
        self.update_block_content(id, content)
    }

    /// Block that currently holds the cursor, when the host exposes it.
    fn focused_block(&self) -> Option<&BlockId> {
        None
    }
}

/// An edit inside one block, in cursor positions: `removed` positions
/// starting at `at` became `inserted` positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentSpan {
    pub at: usize,
    pub removed: usize,
    pub inserted: usize,
}

impl ContentSpan {
    /// Where a position before the edit lands after it. Positions inside
    /// the removed range move to the end of the inserted one.
    pub const fn remap(self, offset: usize) -> usize {
        if offset >= self.at + self.removed {
            offset - self.removed + self.inserted
        } else if offset > self.at {
            self.at + self.inserted
        } else {
            offset
        }
    }
}

/// Cursor position: a block and an inline offset inside it.
///
/// Offsets count characters of text runs; a widget is one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub block: BlockId,
    pub offset: usize,
}

/// Arrow-key style cursor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

/// In-memory block editor.
#[derive(Debug, Clone)]
pub struct Editor {
    schema: Schema,
    blocks: Vec<Block>,
    cursor: Option<Cursor>,
}

impl Editor {
    /// Create an editor with an empty document.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            blocks: Vec::new(),
            cursor: None,
        }
    }

    /// Create an editor holding `blocks`, cursor at the end.
    ///
    /// # Errors
    /// Fails when any block is malformed.
    pub fn with_blocks(schema: Schema, blocks: Vec<PartialBlock>) -> Result<Self, HostError> {
        let mut editor = Self::new(schema);
        editor.replace_blocks(blocks)?;
        editor.place_cursor_at_end();
        Ok(editor)
    }

    pub const fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Move the cursor into `id`, clamping the offset to the block's content.
    ///
    /// # Errors
    /// Fails when the block does not exist.
    pub fn set_cursor(&mut self, id: &BlockId, offset: usize) -> Result<(), HostError> {
        let block =
            find_block(&self.blocks, id).ok_or_else(|| HostError::BlockNotFound(id.clone()))?;
        self.cursor = Some(Cursor {
            block: id.clone(),
            offset: offset.min(block.content_width()),
        });
        Ok(())
    }

    pub fn clear_cursor(&mut self) {
        self.cursor = None;
    }

    /// Put the cursor at the end of the last block that takes inline content.
    pub fn place_cursor_at_end(&mut self) {
        self.cursor = self
            .blocks
            .iter()
            .rev()
            .find(|b| b.kind.has_inline_content())
            .map(|b| Cursor {
                block: b.id.clone(),
                offset: b.content_width(),
            });
    }

    /// Move the cursor. Up and Down step through the blocks that take inline
    /// content in document order; Left and Right wrap across them.
    ///
    /// Returns `true` if the cursor moved.
    pub fn move_cursor(&mut self, motion: CursorMove) -> bool {
        let mut stops = Vec::new();
        collect_stops(&self.blocks, &mut stops);
        let Some(current) = self.cursor.as_ref().and_then(|c| {
            stops
                .iter()
                .position(|(id, _)| id == &c.block)
                .map(|index| (index, c.offset))
        }) else {
            self.place_cursor_at_end();
            return self.cursor.is_some();
        };
        let (index, offset) = current;
        let width = stops[index].1;
        let last = stops.len() - 1;
        let (index, offset) = match motion {
            CursorMove::Left if offset > 0 => (index, offset - 1),
            CursorMove::Left if index > 0 => (index - 1, stops[index - 1].1),
            CursorMove::Right if offset < width => (index, offset + 1),
            CursorMove::Right if index < last => (index + 1, 0),
            CursorMove::Up if index > 0 => (index - 1, offset.min(stops[index - 1].1)),
            CursorMove::Down if index < last => (index + 1, offset.min(stops[index + 1].1)),
            CursorMove::Home if offset > 0 => (index, 0),
            CursorMove::End if offset < width => (index, width),
            _ => return false,
        };
        let (block, _) = stops.swap_remove(index);
        self.cursor = Some(Cursor { block, offset });
        true
    }

    /// Type text at the cursor.
    ///
    /// # Errors
    /// Same as [`HostEditor::insert_inline_content`].
    pub fn type_text(&mut self, text: &str) -> Result<(), HostError> {
        self.insert_inline_content(vec![InlineItem::text(text)])
    }

    /// Delete the character or widget before the cursor (Backspace).
    ///
    /// Returns `true` if something was deleted.
    pub fn delete_back(&mut self) -> bool {
        let Some(cursor) = self.cursor.clone() else {
            return false;
        };
        if cursor.offset == 0 {
            return false;
        }
        let Some(block) = find_block_mut(&mut self.blocks, &cursor.block) else {
            return false;
        };
        let Some(items) = &block.content else {
            return false;
        };
        let (before, rest) = split_content(items, cursor.offset - 1);
        let (_, after) = split_content(&rest, 1);
        block.content = Some(normalize_content(before.into_iter().chain(after).collect()));
        self.cursor = Some(Cursor {
            block: cursor.block,
            offset: cursor.offset - 1,
        });
        true
    }

    /// Insert an empty paragraph after the focused top-level block and move
    /// the cursor into it. Appends at the end when nothing is focused.
    pub fn insert_paragraph_after(&mut self) -> BlockId {
        let index = self
            .cursor
            .as_ref()
            .and_then(|c| {
                self.blocks
                    .iter()
                    .position(|b| find_block(std::slice::from_ref(b), &c.block).is_some())
            })
            .map_or(self.blocks.len(), |i| i + 1);
        let id = BlockId::generate();
        self.blocks.insert(
            index,
            Block {
                id: id.clone(),
                kind: BlockKind::Paragraph,
                props: serde_json::Map::new(),
                content: Some(Vec::new()),
                children: Vec::new(),
            },
        );
        self.cursor = Some(Cursor {
            block: id.clone(),
            offset: 0,
        });
        id
    }

    /// Text content of the whole document, widgets rendered through the
    /// schema. Blocks are concatenated without separators.
    pub fn rendered_text(&self) -> String {
        let mut out = String::new();
        render_into(&self.schema, &self.blocks, &mut out);
        out
    }

    fn validate_items(&self, items: &[InlineItem]) -> Result<(), HostError> {
        match items.iter().find(|item| !self.schema.accepts(item)) {
            Some(item) => Err(HostError::UnknownInlineType(item.type_name().to_string())),
            None => Ok(()),
        }
    }

    fn materialize(
        &self,
        partial: PartialBlock,
        seen: &mut HashSet<BlockId>,
    ) -> Result<Block, HostError> {
        let id = partial.id.unwrap_or_else(BlockId::generate);
        if !seen.insert(id.clone()) {
            return Err(HostError::DuplicateBlockId(id));
        }
        let content = if partial.kind.has_inline_content() {
            let items = match partial.content {
                None => Vec::new(),
                Some(PartialContent::Text(text)) => vec![InlineItem::text(text)],
                Some(PartialContent::Items(items)) => items,
            };
            self.validate_items(&items)?;
            Some(normalize_content(items))
        } else {
            match partial.content {
                None => None,
                Some(PartialContent::Items(items)) if items.is_empty() => None,
                Some(_) => return Err(HostError::ContentNotAllowed(partial.kind)),
            }
        };
        let children = partial
            .children
            .into_iter()
            .map(|child| self.materialize(child, seen))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Block {
            id,
            kind: partial.kind,
            props: partial.props,
            content,
            children,
        })
    }
}

impl HostEditor for Editor {
    fn top_level_blocks(&self) -> &[Block] {
        &self.blocks
    }

    fn update_block_content(
        &mut self,
        id: &BlockId,
        content: Vec<InlineItem>,
    ) -> Result<(), HostError> {
        self.validate_items(&content)?;
        let block = find_block_mut(&mut self.blocks, id)
            .ok_or_else(|| HostError::BlockNotFound(id.clone()))?;
        if !block.kind.has_inline_content() {
            return Err(HostError::ContentNotAllowed(block.kind));
        }
        block.content = Some(normalize_content(content));
        let width = block.content_width();
        if let Some(cursor) = self.cursor.as_mut().filter(|c| &c.block == id) {
            cursor.offset = cursor.offset.min(width);
        }
        Ok(())
    }

    fn replace_blocks(&mut self, blocks: Vec<PartialBlock>) -> Result<(), HostError> {
        let mut seen = HashSet::new();
        let blocks = blocks
            .into_iter()
            .map(|partial| self.materialize(partial, &mut seen))
            .collect::<Result<Vec<_>, _>>()?;
        self.blocks = blocks;
        if self
            .cursor
            .as_ref()
            .is_some_and(|c| find_block(&self.blocks, &c.block).is_none())
        {
            self.cursor = None;
        }
        Ok(())
    }

    fn insert_inline_content(&mut self, items: Vec<InlineItem>) -> Result<(), HostError> {
        let cursor = self.cursor.clone().ok_or(HostError::NoInsertionPoint)?;
        self.validate_items(&items)?;
        let block = find_block_mut(&mut self.blocks, &cursor.block)
            .ok_or_else(|| HostError::BlockNotFound(cursor.block.clone()))?;
        let Some(existing) = &block.content else {
            return Err(HostError::ContentNotAllowed(block.kind));
        };
        let inserted: usize = items.iter().map(InlineItem::width).sum();
        let (before, after) = split_content(existing, cursor.offset);
        let merged = before.into_iter().chain(items).chain(after).collect();
        block.content = Some(normalize_content(merged));
        self.cursor = Some(Cursor {
            block: cursor.block,
            offset: cursor.offset + inserted,
        });
        Ok(())
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn splice_block_content(
        &mut self,
        id: &BlockId,
        content: Vec<InlineItem>,
        span: ContentSpan,
    ) -> Result<(), HostError> {
        let before = self.cursor.as_ref().filter(|c| &c.block == id).map(|c| c.offset);
        self.update_block_content(id, content)?;
        if let Some(offset) = before {
            self.set_cursor(id, span.remap(offset))?;
        }
        Ok(())
    }

    fn focused_block(&self) -> Option<&BlockId> {
        self.cursor.as_ref().map(|c| &c.block)
    }
}

fn collect_stops(blocks: &[Block], out: &mut Vec<(BlockId, usize)>) {
    for block in blocks {
        if block.kind.has_inline_content() {
            out.push((block.id.clone(), block.content_width()));
        }
        collect_stops(&block.children, out);
    }
}

fn render_into(schema: &Schema, blocks: &[Block], out: &mut String) {
    for block in blocks {
        out.push_str(&block.text_with(|props| schema.render_widget(props)));
        render_into(schema, &block.children, out);
    }
}

/// Drop empty text runs and merge adjacent runs that share styles.
pub fn normalize_content(items: Vec<InlineItem>) -> Vec<InlineItem> {
    let mut out: Vec<InlineItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.is_empty_text() {
            continue;
        }
        if let (
            Some(InlineItem::Text {
                text: prev,
                styles: prev_styles,
            }),
            InlineItem::Text { text, styles },
        ) = (out.last_mut(), &item)
            && prev_styles == styles
        {
            prev.push_str(text);
            continue;
        }
        out.push(item);
    }
    out
}

/// Split a content sequence at an inline offset.
fn split_content(
    items: &[InlineItem],
    offset: usize,
) -> (Vec<InlineItem>, Vec<InlineItem>) {
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut remaining = offset;
    for item in items {
        if remaining == 0 {
            after.push(item.clone());
            continue;
        }
        let width = item.width();
        if width <= remaining {
            before.push(item.clone());
            remaining -= width;
            continue;
        }
        match item {
            InlineItem::Text { text, styles } => {
                let at = text
                    .char_indices()
                    .nth(remaining)
                    .map_or(text.len(), |(i, _)| i);
                before.push(InlineItem::Text {
                    text: text[..at].to_string(),
                    styles: styles.clone(),
                });
                after.push(InlineItem::Text {
                    text: text[at..].to_string(),
                    styles: styles.clone(),
                });
            }
            InlineItem::InlineButton { .. } => after.push(item.clone()),
        }
        remaining = 0;
    }
    (before, after)
}
