use std::ops::Range;

use crate::document::{ContentSpan, InlineItem, MarkdownRule, normalize_content};

/// A trigger found in a block's content sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMatch {
    /// Index of the text run holding the match.
    pub item: usize,
    /// Byte range of `[label]` inside that run.
    pub range: Range<usize>,
    /// Cursor position of the opening bracket within the whole block.
    pub offset: usize,
    /// Cursor positions covered by `[label]`.
    pub width: usize,
    pub label: String,
}

impl TriggerMatch {
    /// The edit made by turning this trigger into a single widget.
    pub const fn span(&self) -> ContentSpan {
        ContentSpan {
            at: self.offset,
            removed: self.width,
            inserted: 1,
        }
    }
}

/// First trigger across the text runs of `content`.
///
/// A trigger never spans items: widgets break the text.
pub fn find_trigger(rule: &MarkdownRule, content: &[InlineItem]) -> Option<TriggerMatch> {
    let mut offset = 0;
    for (item, inline) in content.iter().enumerate() {
        if let Some(text) = inline.as_text()
            && let Some(found) = rule.find(text)
        {
            return Some(TriggerMatch {
                item,
                offset: offset + text[..found.range.start].chars().count(),
                width: text[found.range.clone()].chars().count(),
                range: found.range,
                label: found.label,
            });
        }
        offset += inline.width();
    }
    None
}

/// Replace the first trigger with an inline button at the same position.
///
/// Returns the match and the rewritten content, or `None` when there is no
/// trigger.
pub fn convert_first_trigger(
    rule: &MarkdownRule,
    content: &[InlineItem],
) -> Option<(TriggerMatch, Vec<InlineItem>)> {
    let found = find_trigger(rule, content)?;
    let mut rewritten = Vec::with_capacity(content.len() + 2);
    for (index, item) in content.iter().enumerate() {
        match item {
            InlineItem::Text { text, styles } if index == found.item => {
                rewritten.push(InlineItem::Text {
                    text: text[..found.range.start].to_string(),
                    styles: styles.clone(),
                });
                rewritten.push(InlineItem::button(found.label.clone()));
                rewritten.push(InlineItem::Text {
                    text: text[found.range.end..].to_string(),
                    styles: styles.clone(),
                });
            }
            other => rewritten.push(other.clone()),
        }
    }
    Some((found, normalize_content(rewritten)))
}

/// Remove every trigger from every text run, dropping runs left empty.
/// Widgets pass through unchanged.
pub fn strip_triggers(rule: &MarkdownRule, content: &[InlineItem]) -> Vec<InlineItem> {
    content
        .iter()
        .map(|item| match item {
            InlineItem::Text { text, styles } => InlineItem::Text {
                text: rule.strip_all(text),
                styles: styles.clone(),
            },
            other => other.clone(),
        })
        .filter(|item| !item.is_empty_text())
        .collect()
}
