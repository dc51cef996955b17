//! Benchmarks for trigger detection and conversion.

use std::time::Duration;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use blockpad::document::{BlockKind, Editor, InlineItem, MarkdownRule, PartialBlock, Schema};
use blockpad::trigger::{ConversionMode, TriggerWatcher, convert_first_trigger};

fn long_content() -> Vec<InlineItem> {
    let mut items = Vec::new();
    for i in 0..50 {
        items.push(InlineItem::text(format!("line {i} with some plain words ")));
        items.push(InlineItem::button(format!("b{i}")));
    }
    items.push(InlineItem::text("and finally [Launch] here"));
    items
}

fn bench_convert_first_trigger(c: &mut Criterion) {
    let rule = MarkdownRule::button();
    let items = long_content();
    c.bench_function("convert_first_trigger", |b| {
        b.iter(|| convert_first_trigger(&rule, black_box(&items)));
    });
}

fn bench_watcher_scan(c: &mut Criterion) {
    let blocks: Vec<PartialBlock> = (0..200)
        .map(|i| PartialBlock::new(BlockKind::Paragraph).with_text(format!("paragraph {i}")))
        .chain(std::iter::once(
            PartialBlock::new(BlockKind::Paragraph).with_items(long_content()),
        ))
        .collect();
    let editor = Editor::with_blocks(Schema::with_inline_button(), blocks).unwrap();
    let watcher = TriggerWatcher::new(
        MarkdownRule::button(),
        Duration::from_millis(300),
        ConversionMode::InPlace,
    );
    c.bench_function("watcher_scan_last_block", |b| {
        b.iter_batched(
            || editor.clone(),
            |mut editor| watcher.scan(&mut editor, None),
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_convert_first_trigger, bench_watcher_scan);
criterion_main!(benches);
