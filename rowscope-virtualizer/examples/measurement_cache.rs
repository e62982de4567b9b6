// Example: measurements keyed by stable ids survive reorders and can be persisted.
use std::sync::{Arc, RwLock};

use rowscope_virtualizer::{Virtualizer, VirtualizerOptions};

fn main() {
    let ids: Arc<RwLock<Vec<Arc<str>>>> = Arc::new(RwLock::new(
        ["alpha", "beta", "gamma", "delta"]
            .into_iter()
            .map(Arc::from)
            .collect(),
    ));

    let opts = VirtualizerOptions::new_with_key(4, |_| 20, {
        let ids = Arc::clone(&ids);
        move |i| Arc::clone(&ids.read().unwrap()[i])
    });
    let mut v: Virtualizer<Arc<str>> = Virtualizer::new(opts);
    v.measure(0, 64);
    println!("before reorder: sizes={:?}", sizes(&v));

    // The data set was sorted in reverse; keep the key closure and resync.
    ids.write().unwrap().reverse();
    v.sync_item_keys();
    println!("after reorder:  sizes={:?}", sizes(&v));

    let snapshot = v.export_measurement_cache();
    println!("exported {} cached sizes", snapshot.len());

    let mut restored: Virtualizer<Arc<str>> = Virtualizer::new(v.options().clone());
    restored.import_measurement_cache(snapshot);
    println!("restored:       sizes={:?}", sizes(&restored));
}

fn sizes(v: &Virtualizer<Arc<str>>) -> Vec<(Arc<str>, u32)> {
    (0..v.count())
        .map(|i| (v.key_for(i), v.item_size(i).unwrap_or_default()))
        .collect()
}
