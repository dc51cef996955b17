//! Typed `[label]` to inline button conversion.
//!
//! The watcher is fed keystrokes by whoever owns the editor surface. A space
//! or Enter arms a single debounce token; once it settles the watcher scans
//! the block that was focused when the key was pressed (or the last
//! top-level block) and turns the first `[label]` it finds into a button.
//!
//! Every failure here degrades silently: the host rejection is logged and the
//! document stays as the host left it.

mod inserter;
mod pattern;

use std::time::Duration;

use tracing::{debug, info, warn};

pub use inserter::{InsertOutcome, insert_inline_button};
pub use pattern::{TriggerMatch, convert_first_trigger, find_trigger, strip_triggers};

use crate::document::{BlockId, HostEditor, MarkdownRule, Schema, find_block};

/// Delay between a qualifying keystroke and the scan.
pub const DEFAULT_TRIGGER_DELAY: Duration = Duration::from_millis(300);

/// A key press as seen by the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    Char(char),
    Enter,
    Backspace,
    Other,
}

impl Keystroke {
    /// Space and Enter arm a scan.
    pub const fn is_trigger(self) -> bool {
        matches!(self, Self::Char(' ') | Self::Enter)
    }
}

/// How a detected trigger is turned into a button.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConversionMode {
    /// Replace the trigger text with the button in a single block update.
    #[default]
    InPlace,
    /// Insert the button at the cursor (or append it to the last block), then
    /// strip every trigger from the scanned block in a second update.
    Append,
}

impl ConversionMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InPlace => "in-place",
            Self::Append => "append",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in-place" => Some(Self::InPlace),
            "append" => Some(Self::Append),
            _ => None,
        }
    }
}

/// Result of one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Nothing matched; the document was not touched.
    NoMatch,
    /// A button titled `label` replaced the trigger in `block`.
    Converted { label: String, block: BlockId },
    /// A trigger matched but the host rejected the conversion.
    Failed { label: String },
}

#[derive(Debug, Clone)]
struct PendingScan {
    queued_at: u64,
    target: Option<BlockId>,
}

/// Single cancellable debounce token.
#[derive(Debug, Clone)]
struct ScanDebouncer {
    delay_ms: u64,
    pending: Option<PendingScan>,
}

impl ScanDebouncer {
    const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    fn queue(&mut self, target: Option<BlockId>, now_ms: u64) {
        self.pending = Some(PendingScan {
            queued_at: now_ms,
            target,
        });
    }

    fn take_ready(&mut self, now_ms: u64) -> Option<Option<BlockId>> {
        let queued_at = self.pending.as_ref()?.queued_at;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending.take().map(|p| p.target)
        } else {
            None
        }
    }

    fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        let queued_at = self.pending.as_ref()?.queued_at;
        Some(self.delay_ms.saturating_sub(now_ms.saturating_sub(queued_at)))
    }

    fn cancel(&mut self) {
        self.pending = None;
    }

    const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Watches keystrokes on one editor and converts typed triggers.
#[derive(Debug, Clone)]
pub struct TriggerWatcher {
    rule: MarkdownRule,
    mode: ConversionMode,
    debounce: ScanDebouncer,
    attached: bool,
}

impl TriggerWatcher {
    pub fn new(rule: MarkdownRule, delay: Duration, mode: ConversionMode) -> Self {
        Self {
            rule,
            mode,
            debounce: ScanDebouncer::new(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)),
            attached: false,
        }
    }

    /// Watcher using the button rule registered in `schema`.
    pub fn for_schema(schema: &Schema, delay: Duration, mode: ConversionMode) -> Option<Self> {
        schema
            .button_rule()
            .map(|rule| Self::new(rule.clone(), delay, mode))
    }

    pub fn attach(&mut self) {
        self.attached = true;
        debug!(mode = self.mode.as_str(), "trigger watcher attached");
    }

    /// Stop reacting to keys and drop any pending scan.
    pub fn detach(&mut self) {
        if self.attached {
            debug!("trigger watcher detached");
        }
        self.attached = false;
        self.debounce.cancel();
    }

    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    pub const fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    pub const fn mode(&self) -> ConversionMode {
        self.mode
    }

    /// Milliseconds until the pending scan is due.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.debounce.remaining_ms(now_ms)
    }

    /// Feed a keystroke. Must be called before the host applies the key so
    /// the focused block is the one the user was typing in.
    ///
    /// Returns `true` when a scan was armed; re-arming replaces any pending
    /// scan.
    pub fn on_key<H: HostEditor + ?Sized>(&mut self, key: Keystroke, host: &H, now_ms: u64) -> bool {
        if !self.attached || !key.is_trigger() {
            return false;
        }
        self.debounce.queue(host.focused_block().cloned(), now_ms);
        true
    }

    /// Run the pending scan if its delay has elapsed.
    pub fn poll<H: HostEditor + ?Sized>(&mut self, host: &mut H, now_ms: u64) -> Option<ScanOutcome> {
        let target = self.debounce.take_ready(now_ms)?;
        Some(self.scan(host, target.as_ref()))
    }

    /// Scan `target` (or the last top-level block) and convert the first
    /// trigger.
    pub fn scan<H: HostEditor + ?Sized>(&self, host: &mut H, target: Option<&BlockId>) -> ScanOutcome {
        let blocks = host.top_level_blocks();
        let Some(block) = target
            .and_then(|id| find_block(blocks, id))
            .or_else(|| blocks.last())
        else {
            return ScanOutcome::NoMatch;
        };
        let Some(items) = block.content.as_deref() else {
            return ScanOutcome::NoMatch;
        };
        let id = block.id.clone();

        match self.mode {
            ConversionMode::InPlace => {
                let Some((found, content)) = convert_first_trigger(&self.rule, items) else {
                    return ScanOutcome::NoMatch;
                };
                let span = found.span();
                let label = found.label;
                match host.splice_block_content(&id, content, span) {
                    Ok(()) => {
                        info!(label, block = %id, "converted trigger to inline button");
                        ScanOutcome::Converted { label, block: id }
                    }
                    Err(err) => {
                        warn!(label, block = %id, %err, "trigger conversion rejected");
                        ScanOutcome::Failed { label }
                    }
                }
            }
            ConversionMode::Append => {
                let Some(found) = find_trigger(&self.rule, items) else {
                    return ScanOutcome::NoMatch;
                };
                let inserted = insert_inline_button(host, &found.label);
                self.strip_block(host, &id);
                if inserted == InsertOutcome::Failed {
                    ScanOutcome::Failed { label: found.label }
                } else {
                    info!(label = found.label, block = %id, "inserted inline button for trigger");
                    ScanOutcome::Converted {
                        label: found.label,
                        block: id,
                    }
                }
            }
        }
    }

    fn strip_block<H: HostEditor + ?Sized>(&self, host: &mut H, id: &BlockId) {
        let Some(items) = find_block(host.top_level_blocks(), id).and_then(|b| b.content.as_deref())
        else {
            return;
        };
        let stripped = strip_triggers(&self.rule, items);
        if let Err(err) = host.update_block_content(id, stripped) {
            warn!(block = %id, %err, "failed to remove trigger text");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockKind, Editor, InlineItem, PartialBlock};

    fn editor(text: &str) -> Editor {
        Editor::with_blocks(
            Schema::with_inline_button(),
            vec![PartialBlock::new(BlockKind::Paragraph).with_text(text)],
        )
        .unwrap()
    }

    fn watcher(mode: ConversionMode) -> TriggerWatcher {
        let mut watcher =
            TriggerWatcher::for_schema(&Schema::with_inline_button(), DEFAULT_TRIGGER_DELAY, mode)
                .unwrap();
        watcher.attach();
        watcher
    }

    fn last_content(editor: &Editor) -> Vec<InlineItem> {
        editor.top_level_blocks()[editor.top_level_blocks().len() - 1]
            .content
            .clone()
            .unwrap()
    }

    #[test]
    fn test_only_space_and_enter_arm_scan() {
        let editor = editor("");
        let mut watcher = watcher(ConversionMode::InPlace);
        assert!(!watcher.on_key(Keystroke::Char('a'), &editor, 0));
        assert!(!watcher.on_key(Keystroke::Backspace, &editor, 0));
        assert!(watcher.on_key(Keystroke::Char(' '), &editor, 0));
        assert!(watcher.on_key(Keystroke::Enter, &editor, 0));
    }

    #[test]
    fn test_scan_waits_for_delay() {
        let mut editor = editor("Hello [World] ");
        let mut watcher = watcher(ConversionMode::InPlace);
        watcher.on_key(Keystroke::Char(' '), &editor, 1_000);
        assert_eq!(watcher.poll(&mut editor, 1_299), None);
        assert!(watcher.is_pending());
        assert!(matches!(
            watcher.poll(&mut editor, 1_300),
            Some(ScanOutcome::Converted { .. })
        ));
        assert!(!watcher.is_pending());
    }

    #[test]
    fn test_burst_of_keys_yields_single_scan() {
        let mut editor = editor("Hello [World] ");
        let mut watcher = watcher(ConversionMode::InPlace);
        for t in [0, 50, 100, 150] {
            watcher.on_key(Keystroke::Char(' '), &editor, t);
        }
        assert_eq!(watcher.poll(&mut editor, 300), None, "re-armed at 150");
        assert!(watcher.poll(&mut editor, 450).is_some());
        assert_eq!(watcher.poll(&mut editor, 10_000), None);
        let buttons: usize = editor
            .top_level_blocks()
            .iter()
            .map(crate::document::Block::button_count)
            .sum();
        assert_eq!(buttons, 1);
    }

    #[test]
    fn test_detached_watcher_ignores_keys_and_cancels() {
        let editor = editor("[x] ");
        let mut watcher = watcher(ConversionMode::InPlace);
        watcher.on_key(Keystroke::Char(' '), &editor, 0);
        watcher.detach();
        assert!(!watcher.is_pending());
        assert!(!watcher.on_key(Keystroke::Char(' '), &editor, 10));
    }

    #[test]
    fn test_in_place_conversion_scenario() {
        let mut editor = editor("Hello [World] today ");
        let watcher = watcher(ConversionMode::InPlace);
        let outcome = watcher.scan(&mut editor, None);
        assert!(matches!(outcome, ScanOutcome::Converted { ref label, .. } if label == "World"));
        assert_eq!(
            last_content(&editor),
            vec![
                InlineItem::text("Hello "),
                InlineItem::button("World"),
                InlineItem::text(" today "),
            ]
        );
    }

    #[test]
    fn test_no_match_leaves_document_untouched() {
        let mut editor = editor("plain text ");
        let before = editor.top_level_blocks().to_vec();
        let watcher = watcher(ConversionMode::InPlace);
        assert_eq!(watcher.scan(&mut editor, None), ScanOutcome::NoMatch);
        assert_eq!(editor.top_level_blocks(), before.as_slice());
    }

    #[test]
    fn test_append_mode_inserts_at_cursor_and_strips() {
        let mut editor = editor("Hello [World] ");
        let watcher = watcher(ConversionMode::Append);
        let outcome = watcher.scan(&mut editor, None);
        assert!(matches!(outcome, ScanOutcome::Converted { .. }));
        assert_eq!(
            last_content(&editor),
            vec![InlineItem::text("Hello  "), InlineItem::button("World")]
        );
    }

    #[test]
    fn test_scan_targets_focused_block_recorded_at_keystroke() {
        let mut editor = Editor::with_blocks(
            Schema::with_inline_button(),
            vec![
                PartialBlock::new(BlockKind::Paragraph).with_text("typed [here]"),
                PartialBlock::new(BlockKind::Paragraph).with_text("last block"),
            ],
        )
        .unwrap();
        let first = editor.top_level_blocks()[0].id.clone();
        editor.set_cursor(&first, 12).unwrap();
        let mut watcher = watcher(ConversionMode::InPlace);
        watcher.on_key(Keystroke::Enter, &editor, 0);
        editor.insert_paragraph_after();
        let outcome = watcher.poll(&mut editor, 300).unwrap();
        assert_eq!(
            outcome,
            ScanOutcome::Converted {
                label: "here".to_string(),
                block: first,
            }
        );
    }

    #[test]
    fn test_rejected_conversion_reports_failure() {
        let watcher = TriggerWatcher::new(
            MarkdownRule::button(),
            DEFAULT_TRIGGER_DELAY,
            ConversionMode::InPlace,
        );
        let mut plain = Editor::with_blocks(
            Schema::new(),
            vec![PartialBlock::new(BlockKind::Paragraph).with_text("[x] ")],
        )
        .unwrap();
        let before = plain.top_level_blocks().to_vec();
        assert_eq!(
            watcher.scan(&mut plain, None),
            ScanOutcome::Failed {
                label: "x".to_string()
            }
        );
        assert_eq!(plain.top_level_blocks(), before.as_slice());
    }

    #[test]
    fn test_conversion_before_cursor_keeps_typing_position() {
        let mut editor = editor("abc");
        let id = editor.top_level_blocks()[0].id.clone();
        editor.set_cursor(&id, 0).unwrap();
        editor.type_text("[W] ").unwrap();

        let outcome = watcher(ConversionMode::InPlace).scan(&mut editor, Some(&id));
        assert!(matches!(outcome, ScanOutcome::Converted { .. }));
        assert_eq!(editor.cursor().map(|c| c.offset), Some(2));

        editor.type_text("Z").unwrap();
        assert_eq!(
            last_content(&editor),
            vec![InlineItem::button("W"), InlineItem::text(" Zabc")]
        );
    }

    #[test]
    fn test_conversion_after_cursor_leaves_cursor_alone() {
        let mut editor = editor("ab [W] ");
        let id = editor.top_level_blocks()[0].id.clone();
        editor.set_cursor(&id, 1).unwrap();
        watcher(ConversionMode::InPlace).scan(&mut editor, Some(&id));
        assert_eq!(editor.cursor().map(|c| c.offset), Some(1));
    }

    #[test]
    fn test_conversion_mode_round_trips_names() {
        for mode in [ConversionMode::InPlace, ConversionMode::Append] {
            assert_eq!(ConversionMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(ConversionMode::parse("other"), None);
    }
}
