use proptest::prelude::*;

use blockpad::document::{Block, BlockKind, Editor, HostEditor, InlineItem, PartialBlock, Schema};
use blockpad::envelope::LoadError;
use blockpad::workspace::{ClearOutcome, Workspace, WorkspaceOptions};

fn workspace_from(blocks: Vec<PartialBlock>) -> Workspace {
    let editor = Editor::with_blocks(Schema::with_inline_button(), blocks).unwrap();
    Workspace::new(editor, WorkspaceOptions::default())
}

fn inline_item() -> impl Strategy<Value = InlineItem> {
    prop_oneof![
        "[a-z ]{1,8}".prop_map(InlineItem::text),
        "[A-Za-z]{1,6}".prop_map(InlineItem::button),
    ]
}

fn paragraph() -> impl Strategy<Value = PartialBlock> {
    prop::collection::vec(inline_item(), 0..5)
        .prop_map(|items| PartialBlock::new(BlockKind::Paragraph).with_items(items))
}

fn snapshot(workspace: &Workspace) -> Vec<Block> {
    workspace.host().top_level_blocks().to_vec()
}

proptest! {
    #[test]
    fn saved_document_loads_back_identically(
        name in "[A-Za-z][A-Za-z0-9 ]{0,12}",
        blocks in prop::collection::vec(paragraph(), 0..6),
    ) {
        let mut source = workspace_from(blocks);
        source.set_document_name(name.clone());
        let json = source.save_json(chrono::Utc::now()).unwrap();

        let mut target = Workspace::empty(WorkspaceOptions::default());
        target.load_str(&json, "ignored.json").unwrap();

        prop_assert_eq!(target.document_name(), name.as_str());
        prop_assert_eq!(snapshot(&target), snapshot(&source));
    }
}

#[test]
fn test_wrong_envelope_type_leaves_document_unchanged() {
    let mut workspace = workspace_from(vec![
        PartialBlock::new(BlockKind::Paragraph).with_text("keep me"),
    ]);
    workspace.set_document_name("Original");
    let before = snapshot(&workspace);

    let err = workspace
        .load_str(r#"{"type":"other","content":[]}"#, "other.json")
        .unwrap_err();

    assert!(matches!(err, LoadError::UnsupportedFormat));
    assert_eq!(
        err.alert_message(),
        "File format not supported, please select a valid BlockNote document"
    );
    assert_eq!(snapshot(&workspace), before);
    assert_eq!(workspace.document_name(), "Original");
}

#[test]
fn test_invalid_json_has_its_own_alert() {
    let mut workspace = workspace_from(vec![
        PartialBlock::new(BlockKind::Paragraph).with_text("keep me"),
    ]);
    let before = snapshot(&workspace);

    let invalid = workspace.load_str("not json at all", "x.json").unwrap_err();
    let wrong_type = workspace
        .load_str(r#"{"type":"markdown","content":[]}"#, "x.json")
        .unwrap_err();

    assert!(matches!(invalid, LoadError::InvalidJson(_)));
    assert_ne!(invalid.alert_message(), wrong_type.alert_message());
    assert_eq!(snapshot(&workspace), before);
}

#[test]
fn test_missing_document_name_falls_back_to_file_name() {
    let mut workspace = Workspace::empty(WorkspaceOptions::default());
    workspace
        .load_str(
            r#"{"type":"blocknote","content":[{"type":"paragraph","content":"hi"}]}"#,
            "Meeting notes.json",
        )
        .unwrap();
    assert_eq!(workspace.document_name(), "Meeting notes");
    assert_eq!(workspace.host().top_level_blocks().len(), 1);
}

#[test]
fn test_clear_confirmed_empties_document() {
    let mut workspace = workspace_from(vec![
        PartialBlock::new(BlockKind::Paragraph)
            .with_items(vec![InlineItem::text("a "), InlineItem::button("b")]),
        PartialBlock::new(BlockKind::Paragraph).with_text("c"),
    ]);
    let outcome = workspace.clear(|_| true).unwrap();
    assert_eq!(outcome, ClearOutcome::Cleared);
    assert!(workspace.host().top_level_blocks().is_empty());
}

#[test]
fn test_clear_declined_touches_nothing() {
    let mut workspace = workspace_from(vec![
        PartialBlock::new(BlockKind::Paragraph).with_text("c"),
    ]);
    let before = snapshot(&workspace);
    let outcome = workspace.clear(|_| false).unwrap();
    assert_eq!(outcome, ClearOutcome::Declined);
    assert_eq!(snapshot(&workspace), before);
}

#[test]
fn test_save_to_dir_then_load_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = workspace_from(vec![
        PartialBlock::new(BlockKind::Heading)
            .with_prop("level", 1)
            .with_text("Title"),
        PartialBlock::new(BlockKind::Paragraph)
            .with_items(vec![InlineItem::text("Press "), InlineItem::button("Go")]),
    ]);
    source.set_document_name("Plan");
    let path = source.save_to_dir(dir.path()).unwrap();
    assert_eq!(path, dir.path().join("Plan.json"));

    let mut target = Workspace::empty(WorkspaceOptions::default());
    target.load_file(&path).unwrap();
    assert_eq!(target.document_name(), "Plan");
    assert_eq!(snapshot(&target), snapshot(&source));
}
