// Example: measured rows, scroll correction and a converging scroll-to-index.
use rowscope_virtualizer::{Align, ScrollReconcile, Virtualizer, VirtualizerOptions};

fn main() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(100, |_| 10));
    v.set_viewport_and_scroll_clamped(30, 200);

    println!(
        "before: off={} total={} range={:?}",
        v.scroll_offset(),
        v.total_size(),
        v.virtual_range()
    );

    // Item 0 sits above the viewport: growing it shifts the offset so the content does not jump.
    let applied = v.resize_item(0, 30);
    println!(
        "resize_item(0): applied_delta={applied} off={} total={}",
        v.scroll_offset(),
        v.total_size()
    );

    // `measure` records a size without touching the offset.
    v.measure(2, 30);

    // Jump to row 60, then let the adapter render and report real sizes.
    v.scroll_to_index(60, Align::Start);
    let mut frame = 0u32;
    loop {
        frame += 1;
        let mut rendered = Vec::new();
        v.collect_virtual_indexes(&mut rendered);
        // Rows render taller than estimated the first time they are seen.
        v.batch_update(|v| {
            for &index in &rendered {
                if !v.is_measured(index) {
                    v.measure(index, 14);
                }
            }
        });

        match v.reconcile_scroll() {
            ScrollReconcile::Retrying { offset, attempt } => {
                println!("frame {frame}: retry #{attempt} -> off={offset}")
            }
            ScrollReconcile::Settled { offset } => {
                println!("frame {frame}: settled at off={offset}");
                break;
            }
            ScrollReconcile::GaveUp { offset } => {
                println!("frame {frame}: gave up at off={offset}");
                break;
            }
            ScrollReconcile::Idle => break,
        }
    }
    println!("item 60 starts at {:?}", v.item_start(60));
}
