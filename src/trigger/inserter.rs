use tracing::{debug, warn};

use crate::document::{HostEditor, InlineItem};

/// Where an inserted button ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Inserted at the cursor.
    AtCursor,
    /// Cursor insertion was rejected; appended to the last top-level block.
    AppendedToLastBlock,
    /// Both strategies were rejected. Nothing changed.
    Failed,
}

/// Insert an inline button titled `label`.
///
/// Tries the cursor first. If the host rejects that, appends the button to the
/// content of the last top-level block (a block without a content sequence
/// starts from an empty one). A second rejection is logged and dropped. At
/// most one button is inserted per call.
pub fn insert_inline_button<H: HostEditor + ?Sized>(host: &mut H, label: &str) -> InsertOutcome {
    let widget = InlineItem::button(label);
    match host.insert_inline_content(vec![widget.clone()]) {
        Ok(()) => {
            debug!(label, "inserted inline button at cursor");
            return InsertOutcome::AtCursor;
        }
        Err(err) => {
            debug!(label, %err, "cursor insertion rejected, appending to last block");
        }
    }

    let Some(last) = host.top_level_blocks().last() else {
        warn!(label, "no block to append the inline button to");
        return InsertOutcome::Failed;
    };
    let id = last.id.clone();
    let content: Vec<InlineItem> = last
        .content
        .iter()
        .flatten()
        .cloned()
        .chain(std::iter::once(widget))
        .filter(|item| !item.is_empty_text())
        .collect();

    match host.update_block_content(&id, content) {
        Ok(()) => InsertOutcome::AppendedToLastBlock,
        Err(err) => {
            warn!(label, block = %id, %err, "fallback inline button insertion failed");
            InsertOutcome::Failed
        }
    }
}
