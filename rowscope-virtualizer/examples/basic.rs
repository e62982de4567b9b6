// Example: fixed-height rows, a viewport and a scroll-to request.
use rowscope_virtualizer::{Align, ScrollReconcile, Virtualizer, VirtualizerOptions};

fn main() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(10_000, |_| 35).with_overscan(5));
    v.set_viewport_and_scroll(400, 0);

    let items = v.virtual_items();
    println!("total_size={}", v.total_size());
    println!("visible_range={:?}", v.visible_range());
    println!(
        "materialized={} first={:?} last={:?}",
        items.len(),
        items.first(),
        items.last()
    );

    v.scroll_to_index(9_999, Align::End);
    match v.reconcile_scroll() {
        ScrollReconcile::Settled { offset } => println!("scrolled to the last row: offset={offset}"),
        other => println!("scroll still converging: {other:?}"),
    }
}
