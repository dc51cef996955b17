//! Core document types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable block identifier assigned by the host editor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Generate a fresh random id (uuid v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of a block, serialized as the block's `type` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    #[default]
    Paragraph,
    Heading,
    BulletListItem,
    NumberedListItem,
    CheckListItem,
    Quote,
    CodeBlock,
    Image,
}

impl BlockKind {
    /// Whether blocks of this kind hold a sequence of inline items.
    ///
    /// Images carry their data in props only.
    pub const fn has_inline_content(self) -> bool {
        !matches!(self, Self::Image)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Heading => "heading",
            Self::BulletListItem => "bulletListItem",
            Self::NumberedListItem => "numberedListItem",
            Self::CheckListItem => "checkListItem",
            Self::Quote => "quote",
            Self::CodeBlock => "codeBlock",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Props of an inline button widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonProps {
    #[serde(default)]
    pub title: String,
}

/// One unit of a block's content sequence.
///
/// Text runs serialize as `{"type":"text","text":...,"styles":{}}`; a bare
/// JSON string is also accepted when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", from = "RawInlineItem")]
pub enum InlineItem {
    Text {
        text: String,
        #[serde(default)]
        styles: Map<String, Value>,
    },
    InlineButton {
        props: ButtonProps,
    },
}

impl InlineItem {
    /// Unstyled text run.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            styles: Map::new(),
        }
    }

    /// Inline button widget with the given title.
    pub fn button(title: impl Into<String>) -> Self {
        Self::InlineButton {
            props: ButtonProps {
                title: title.into(),
            },
        }
    }

    /// The `type` discriminator of this item.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::InlineButton { .. } => "inlineButton",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            Self::InlineButton { .. } => None,
        }
    }

    pub fn button_title(&self) -> Option<&str> {
        match self {
            Self::InlineButton { props } => Some(&props.title),
            Self::Text { .. } => None,
        }
    }

    pub fn is_empty_text(&self) -> bool {
        self.as_text().is_some_and(str::is_empty)
    }

    /// Number of cursor positions this item occupies.
    ///
    /// Text counts characters; a widget is a single position.
    pub fn width(&self) -> usize {
        match self {
            Self::Text { text, .. } => text.chars().count(),
            Self::InlineButton { .. } => 1,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInlineItem {
    Bare(String),
    Tagged(TaggedInlineItem),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum TaggedInlineItem {
    Text {
        text: String,
        #[serde(default)]
        styles: Map<String, Value>,
    },
    InlineButton {
        #[serde(default)]
        props: ButtonProps,
    },
}

impl From<RawInlineItem> for InlineItem {
    fn from(raw: RawInlineItem) -> Self {
        match raw {
            RawInlineItem::Bare(text) => Self::text(text),
            RawInlineItem::Tagged(TaggedInlineItem::Text { text, styles }) => {
                Self::Text { text, styles }
            }
            RawInlineItem::Tagged(TaggedInlineItem::InlineButton { props }) => {
                Self::InlineButton { props }
            }
        }
    }
}

/// A block as held by the host editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub props: Map<String, Value>,
    /// `None` for kinds without inline content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<InlineItem>>,
    #[serde(default)]
    pub children: Vec<Block>,
}

impl Block {
    /// Plain text of the content sequence, widgets rendered by `render_widget`.
    pub fn text_with(&self, render_widget: impl Fn(&ButtonProps) -> String) -> String {
        let Some(items) = &self.content else {
            return String::new();
        };
        let mut out = String::new();
        for item in items {
            match item {
                InlineItem::Text { text, .. } => out.push_str(text),
                InlineItem::InlineButton { props } => out.push_str(&render_widget(props)),
            }
        }
        out
    }

    /// Number of cursor positions in the content sequence.
    pub fn content_width(&self) -> usize {
        self.content
            .as_ref()
            .map_or(0, |items| items.iter().map(InlineItem::width).sum())
    }

    /// Count inline buttons in this block and its children.
    pub fn button_count(&self) -> usize {
        let own = self.content.as_ref().map_or(0, |items| {
            items
                .iter()
                .filter(|item| matches!(item, InlineItem::InlineButton { .. }))
                .count()
        });
        own + self.children.iter().map(Self::button_count).sum::<usize>()
    }
}

/// Find a block by id anywhere in a block tree.
pub fn find_block<'a>(blocks: &'a [Block], id: &BlockId) -> Option<&'a Block> {
    blocks.iter().find_map(|block| {
        if &block.id == id {
            Some(block)
        } else {
            find_block(&block.children, id)
        }
    })
}

pub(crate) fn find_block_mut<'a>(blocks: &'a mut [Block], id: &BlockId) -> Option<&'a mut Block> {
    for block in blocks.iter_mut() {
        if &block.id == id {
            return Some(block);
        }
        if let Some(found) = find_block_mut(&mut block.children, id) {
            return Some(found);
        }
    }
    None
}

/// Content of a partial block: either a shorthand string or inline items.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PartialContent {
    Text(String),
    Items(Vec<InlineItem>),
}

/// A block description as accepted by the host's replace operation.
///
/// Everything except the kind is optional; the host fills in ids and
/// defaults when the block is inserted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartialBlock {
    #[serde(default)]
    pub id: Option<BlockId>,
    #[serde(rename = "type", default)]
    pub kind: BlockKind,
    #[serde(default)]
    pub props: Map<String, Value>,
    #[serde(default)]
    pub content: Option<PartialContent>,
    #[serde(default)]
    pub children: Vec<PartialBlock>,
}

impl PartialBlock {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content = Some(PartialContent::Text(text.into()));
        self
    }

    #[must_use]
    pub fn with_items(mut self, items: Vec<InlineItem>) -> Self {
        self.content = Some(PartialContent::Items(items));
        self
    }

    #[must_use]
    pub fn with_prop(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }
}

impl From<Block> for PartialBlock {
    fn from(block: Block) -> Self {
        Self {
            id: Some(block.id),
            kind: block.kind,
            props: block.props,
            content: block.content.map(PartialContent::Items),
            children: block.children.into_iter().map(Self::from).collect(),
        }
    }
}

/// Welcome content shown when the editor starts without a document.
pub fn seed_blocks() -> Vec<PartialBlock> {
    vec![
        PartialBlock::new(BlockKind::Image).with_prop(
            "url",
            "https://cdn.midjourney.com/ec9e385d-0833-4234-bb1e-5ef438ada569/0_0.png",
        ),
        PartialBlock::new(BlockKind::Heading)
            .with_prop("level", 1)
            .with_text("Welcome to the blockpad editor prototype!"),
        PartialBlock::new(BlockKind::Paragraph)
            .with_text("This is a terminal rich text editor built on blocks."),
        PartialBlock::new(BlockKind::Paragraph).with_text("You can:"),
        PartialBlock::new(BlockKind::BulletListItem)
            .with_text("Type a label in square brackets and a space to make a button"),
        PartialBlock::new(BlockKind::BulletListItem)
            .with_text("Save the document as JSON with Ctrl+S"),
        PartialBlock::new(BlockKind::BulletListItem)
            .with_text("Load a saved document with Ctrl+O"),
        PartialBlock::new(BlockKind::Paragraph).with_items(vec![
            InlineItem::text("I enjoy working with "),
            InlineItem::button("Hector"),
            InlineItem::text(" and "),
            InlineItem::button("BlockNote"),
            InlineItem::text("!"),
        ]),
        PartialBlock::new(BlockKind::Paragraph).with_items(vec![
            InlineItem::text("These are "),
            InlineItem::button("blue buttons"),
            InlineItem::text(" embedded in the text!"),
        ]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_item_accepts_bare_string() {
        let item: InlineItem = serde_json::from_str(r#""hello""#).unwrap();
        assert_eq!(item, InlineItem::text("hello"));
    }

    #[test]
    fn test_inline_button_serializes_with_type_tag() {
        let json = serde_json::to_value(InlineItem::button("World")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "inlineButton", "props": {"title": "World"}})
        );
    }

    #[test]
    fn test_text_run_serializes_with_styles() {
        let json = serde_json::to_value(InlineItem::text("hi")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "text", "text": "hi", "styles": {}})
        );
    }

    #[test]
    fn test_button_without_props_gets_empty_title() {
        let item: InlineItem = serde_json::from_str(r#"{"type":"inlineButton"}"#).unwrap();
        assert_eq!(item.button_title(), Some(""));
    }

    #[test]
    fn test_unknown_inline_type_is_rejected() {
        let result: Result<InlineItem, _> =
            serde_json::from_str(r#"{"type":"mention","props":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_image_block_omits_content() {
        let block = Block {
            id: BlockId::from("img"),
            kind: BlockKind::Image,
            props: Map::new(),
            content: None,
            children: Vec::new(),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert!(json.get("content").is_none());
        assert_eq!(json["type"], "image");
    }

    #[test]
    fn test_partial_block_accepts_string_content() {
        let partial: PartialBlock =
            serde_json::from_str(r#"{"type":"heading","content":"Welcome"}"#).unwrap();
        assert_eq!(partial.kind, BlockKind::Heading);
        assert_eq!(
            partial.content,
            Some(PartialContent::Text("Welcome".to_string()))
        );
        assert!(partial.id.is_none());
    }

    #[test]
    fn test_partial_block_defaults_to_paragraph() {
        let partial: PartialBlock = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert_eq!(partial.kind, BlockKind::Paragraph);
    }

    #[test]
    fn test_widget_occupies_one_position() {
        assert_eq!(InlineItem::button("a long title").width(), 1);
        assert_eq!(InlineItem::text("café").width(), 4);
    }

    #[test]
    fn test_find_block_searches_children() {
        let child = Block {
            id: BlockId::from("child"),
            kind: BlockKind::Paragraph,
            props: Map::new(),
            content: Some(vec![InlineItem::text("nested")]),
            children: Vec::new(),
        };
        let parent = Block {
            id: BlockId::from("parent"),
            kind: BlockKind::BulletListItem,
            props: Map::new(),
            content: Some(Vec::new()),
            children: vec![child],
        };
        let blocks = [parent];
        let found = find_block(&blocks, &BlockId::from("child")).unwrap();
        assert_eq!(found.text_with(|p| p.title.clone()), "nested");
    }

    #[test]
    fn test_seed_blocks_have_two_button_paragraphs() {
        let buttons = seed_blocks()
            .iter()
            .filter_map(|b| match &b.content {
                Some(PartialContent::Items(items)) => Some(items.len()),
                _ => None,
            })
            .count();
        assert_eq!(buttons, 2, "two seed paragraphs carry inline buttons");
    }
}
