use block_editor_core::{
    Block, Dispatcher, Document, EditorError, HeadlessSurface, Key, PaintToken, Variant,
};

fn deferred(texts: &[&str]) -> Dispatcher<HeadlessSurface> {
    let doc = Document::from_blocks(texts.iter().map(|t| Block::new(*t)).collect()).unwrap();
    Dispatcher::new(doc, HeadlessSurface::deferred(), Variant::Notes)
}

fn commit_all(d: &mut Dispatcher<HeadlessSurface>) -> bool {
    let tokens = d.surface_mut().take_uncommitted_paints();
    let mut placed = false;
    for token in tokens {
        placed |= d.paint_committed(token).unwrap();
    }
    placed
}

#[test]
fn test_split_places_caret_after_paint() {
    let mut d = deferred(&["hello"]);
    let first = d.document().get(0).unwrap().id;
    d.focus_block(first, 2).unwrap();

    let result = d.handle_key(Key::Enter).unwrap();
    assert!(result.caret_moved);
    assert!(d.has_pending_paint());

    // The store is already updated; the caret still sits in the old block.
    let texts: Vec<&str> = d.document().blocks().iter().map(|b| b.text.as_str()).collect();
    assert_eq!(texts, vec!["he", "llo"]);
    assert_eq!(d.caret_position().unwrap().block_id, first);

    assert!(commit_all(&mut d));
    assert!(!d.has_pending_paint());
    let caret = d.caret_position().unwrap();
    assert_eq!(caret.block_id, d.document().get(1).unwrap().id);
    assert_eq!(caret.offset, 0);
}

#[test]
fn test_events_before_paint_are_rejected_without_mutation() {
    let mut d = deferred(&["ab", "cd"]);
    let ids = d.document().ids();
    d.focus_block(ids[1], 0).unwrap();
    d.handle_key(Key::Backspace).unwrap();
    let merged = d.document().clone();

    assert!(matches!(
        d.handle_key(Key::Enter),
        Err(EditorError::PaintPending)
    ));
    assert!(matches!(
        d.handle_input(ids[0], "zzz"),
        Err(EditorError::PaintPending)
    ));
    assert_eq!(d.document(), &merged);

    commit_all(&mut d);
    let caret = d.caret_position().unwrap();
    assert_eq!((caret.block_id, caret.offset), (ids[0], 2));
    assert!(d.handle_key(Key::Enter).is_ok());
}

#[test]
fn test_unknown_token_keeps_waiting() {
    let mut d = deferred(&["hello"]);
    let first = d.document().get(0).unwrap().id;
    d.focus_block(first, 3).unwrap();
    d.handle_key(Key::Enter).unwrap();

    assert!(!d.paint_committed(PaintToken::new(9_999)).unwrap());
    assert!(d.has_pending_paint());
    assert!(commit_all(&mut d));
}

#[test]
fn test_operations_without_text_replacement_place_caret_immediately() {
    let mut d = deferred(&["hello"]);
    let first = d.document().get(0).unwrap().id;
    d.focus_block(first, 5).unwrap();

    d.handle_key(Key::Enter).unwrap();
    assert!(!d.has_pending_paint());
    assert_eq!(
        d.caret_position().unwrap().block_id,
        d.document().get(1).unwrap().id
    );
}
