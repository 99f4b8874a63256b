use block_editor_core::{
    Block, BlockId, Dispatcher, Document, EditCase, HeadlessSurface, Key, KeyOutcome, Variant,
};

fn dispatcher(texts: &[&str]) -> Dispatcher<HeadlessSurface> {
    let doc = Document::from_blocks(texts.iter().map(|t| Block::new(*t)).collect()).unwrap();
    Dispatcher::new(doc, HeadlessSurface::new(), Variant::Notes)
}

fn caret(d: &Dispatcher<HeadlessSurface>) -> (BlockId, usize) {
    let pos = d.caret_position().unwrap();
    (pos.block_id, pos.offset)
}

#[test]
fn test_column_survives_short_blocks() {
    // Block lengths 4, 2, 5.
    let mut d = dispatcher(&["abcd", "ef", "ghijk"]);
    let ids = d.document().ids();
    d.focus_block(ids[0], 4).unwrap();

    d.handle_key(Key::ArrowDown).unwrap();
    assert_eq!(caret(&d), (ids[1], 2));

    d.handle_key(Key::ArrowDown).unwrap();
    assert_eq!(caret(&d), (ids[2], 4));

    d.handle_key(Key::ArrowUp).unwrap();
    assert_eq!(caret(&d), (ids[1], 2));

    d.handle_key(Key::ArrowUp).unwrap();
    assert_eq!(caret(&d), (ids[0], 4));

    let result = d.handle_key(Key::ArrowUp).unwrap();
    assert_eq!(result.case, EditCase::TopBoundary);
    assert_eq!(result.outcome, KeyOutcome::AllowDefault);
    assert_eq!(caret(&d), (ids[0], 4));
    assert_eq!(d.remembered_column(), 0);
}

#[test]
fn test_vertical_moves_are_suppressed() {
    let mut d = dispatcher(&["abc", "def"]);
    let result = d.handle_key(Key::ArrowDown).unwrap();
    assert_eq!(
        result.case,
        EditCase::MoveDown { next: d.document().ids()[1] }
    );
    assert_eq!(result.outcome, KeyOutcome::PreventDefault);
    assert!(result.caret_moved);
}

#[test]
fn test_down_at_last_block_passes_through_and_keeps_column() {
    let mut d = dispatcher(&["abcdef", "xy"]);
    let ids = d.document().ids();
    d.focus_block(ids[0], 5).unwrap();
    d.handle_key(Key::ArrowDown).unwrap();
    assert_eq!(caret(&d), (ids[1], 2));

    let result = d.handle_key(Key::ArrowDown).unwrap();
    assert_eq!(result.case, EditCase::PassThrough);
    assert_eq!(d.remembered_column(), 5);

    d.handle_key(Key::ArrowUp).unwrap();
    assert_eq!(caret(&d), (ids[0], 5));
}

#[test]
fn test_horizontal_key_records_new_column() {
    let mut d = dispatcher(&["abcdef", "xy", "uvwxyz"]);
    let ids = d.document().ids();
    d.focus_block(ids[0], 5).unwrap();
    d.handle_key(Key::ArrowDown).unwrap();
    assert_eq!(caret(&d), (ids[1], 2));

    // Left inside the short block passes through; the host moves to 1 and reports it.
    d.handle_key(Key::ArrowLeft).unwrap();
    d.surface_mut().move_caret_to(1);
    d.caret_moved().unwrap();
    assert_eq!(d.remembered_column(), 1);

    d.handle_key(Key::ArrowDown).unwrap();
    assert_eq!(caret(&d), (ids[2], 1));
}

#[test]
fn test_home_then_down_lands_at_start() {
    let mut d = dispatcher(&["abcdef", "uvwxyz"]);
    let ids = d.document().ids();
    d.focus_block(ids[0], 5).unwrap();

    // Home: not handled by the dispatcher, the host moves the caret.
    let result = d.handle_key(Key::Other).unwrap();
    assert_eq!(result.outcome, KeyOutcome::AllowDefault);
    d.surface_mut().move_caret_to(0);
    d.caret_moved().unwrap();

    d.handle_key(Key::ArrowDown).unwrap();
    assert_eq!(caret(&d), (ids[1], 0));
}

#[test]
fn test_caret_moved_waits_for_pending_paint() {
    let doc = Document::from_blocks(vec![Block::new("abcd")]).unwrap();
    let mut d = Dispatcher::new(doc, HeadlessSurface::deferred(), Variant::Notes);
    let id = d.document().ids()[0];
    d.focus_block(id, 2).unwrap();
    d.handle_key(Key::Enter).unwrap();

    assert!(matches!(
        d.caret_moved(),
        Err(block_editor_core::EditorError::PaintPending)
    ));
}

#[test]
fn test_pointer_placement_resets_column() {
    let mut d = dispatcher(&["abcdef", "xy", "uvwxyz"]);
    let ids = d.document().ids();
    d.focus_block(ids[0], 6).unwrap();

    assert!(d.surface_mut().place_caret(ids[1], 1));
    d.handle_pointer().unwrap();
    assert_eq!(d.remembered_column(), 1);

    d.handle_key(Key::ArrowDown).unwrap();
    assert_eq!(caret(&d), (ids[2], 1));
}

#[test]
fn test_top_boundary_reset_applies_to_next_run() {
    let mut d = dispatcher(&["abcdef", "uvwxyz"]);
    let ids = d.document().ids();
    d.focus_block(ids[0], 5).unwrap();

    d.handle_key(Key::ArrowUp).unwrap();
    assert_eq!(d.remembered_column(), 0);

    // The host's default Up moves the caret to the start of the block.
    d.surface_mut().move_caret_to(0);
    d.handle_key(Key::ArrowDown).unwrap();
    assert_eq!(caret(&d), (ids[1], 0));
}

#[test]
fn test_arrow_boundaries_record_landing_offset() {
    let mut d = dispatcher(&["abc", "defgh", "ij"]);
    let ids = d.document().ids();
    d.focus_block(ids[1], 0).unwrap();

    d.handle_key(Key::ArrowLeft).unwrap();
    assert_eq!(caret(&d), (ids[0], 3));
    assert_eq!(d.remembered_column(), 3);

    d.handle_key(Key::ArrowDown).unwrap();
    assert_eq!(caret(&d), (ids[1], 3));
}
