use block_editor_core::{
    Block, BlockEditor, Dispatcher, Document, EditorConfig, HeadlessSurface, Key, Variant,
    persistence,
};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

fn large_document(block_count: usize) -> Document {
    let blocks = (0..block_count)
        .map(|i| Block::new(format!("{i:06} the quick brown fox jumps over the lazy dog")))
        .collect();
    Document::from_blocks(blocks).unwrap()
}

fn bench_mount(c: &mut Criterion) {
    let doc = large_document(5_000);
    c.bench_function("mount/5k_blocks", |b| {
        b.iter_batched(
            || doc.clone(),
            |doc| {
                let dispatcher = Dispatcher::new(doc, HeadlessSurface::new(), Variant::Notes);
                black_box(dispatcher.document().len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_split_merge_in_middle(c: &mut Criterion) {
    let doc = large_document(5_000);
    c.bench_function("split_merge_middle/100_pairs", |b| {
        b.iter_batched(
            || {
                let mut dispatcher =
                    Dispatcher::new(doc.clone(), HeadlessSurface::new(), Variant::Notes);
                let middle = dispatcher.document().get(2_500).unwrap().id;
                dispatcher.focus_block(middle, 10).unwrap();
                dispatcher
            },
            |mut dispatcher| {
                for _ in 0..100 {
                    dispatcher.handle_key(Key::Enter).unwrap();
                    dispatcher.handle_key(Key::Backspace).unwrap();
                }
                black_box(dispatcher.document().len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_vertical_sweep(c: &mut Criterion) {
    let doc = large_document(1_000);
    let mut editor = BlockEditor::new(doc, HeadlessSurface::new(), EditorConfig::default());
    c.bench_function("vertical_sweep/1k_blocks", |b| {
        b.iter(|| {
            for _ in 0..999 {
                editor.handle_key(Key::ArrowDown).unwrap();
            }
            for _ in 0..999 {
                editor.handle_key(Key::ArrowUp).unwrap();
            }
            black_box(editor.caret_position());
        })
    });
}

fn bench_encode(c: &mut Criterion) {
    let doc = large_document(5_000);
    c.bench_function("encode/5k_blocks", |b| {
        b.iter(|| black_box(persistence::encode(black_box(&doc)).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_mount,
    bench_split_merge_in_middle,
    bench_vertical_sweep,
    bench_encode
);
criterion_main!(benches);
