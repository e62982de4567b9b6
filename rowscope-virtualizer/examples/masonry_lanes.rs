// Example: a three-lane masonry layout.
use rowscope_virtualizer::{Virtualizer, VirtualizerOptions};

fn main() {
    let heights = [120u32, 80, 200, 60, 140, 90, 110, 70, 160, 100, 130, 50];
    let mut v = Virtualizer::new(
        VirtualizerOptions::new(heights.len(), move |i| heights[i])
            .with_lanes(3)
            .with_gap(8)
            .with_overscan(0),
    );
    v.set_viewport_and_scroll(250, 150);

    for item in v.measurements() {
        println!(
            "#{:<2} lane={} start={:<4} size={}",
            item.index, item.lane, item.start, item.size
        );
    }
    println!("total_size={}", v.total_size());
    println!("visible_range={:?}", v.visible_range());
}
