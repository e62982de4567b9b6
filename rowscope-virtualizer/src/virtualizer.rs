use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::{Cell, Ref, RefCell};
use core::cmp;

use crate::key::{KeyCacheKey, SizeCache};
use crate::measurements::{LayoutParams, Measurements};
use crate::{
    Align, InitialOffset, ItemKey, Rect, ScrollDirection, ScrollReconcile, VirtualItem,
    VirtualItemKeyed, VirtualRange, VirtualizerOptions,
};

/// How many times a scroll-to-index request is re-applied before giving up.
pub const MAX_SCROLL_TO_INDEX_ATTEMPTS: u32 = 10;

#[derive(Clone, Copy, Debug)]
struct PendingScroll {
    index: usize,
    align: Align,
    attempts: u32,
}

/// A headless windowing engine.
///
/// This type does not hold any UI objects. Your adapter drives it by providing viewport
/// geometry, scroll offsets and measured sizes, and reads back the items to materialize.
///
/// Reads take `&self`; the measurement array is rebuilt lazily on the first read after a size
/// or layout change, starting at the smallest affected index.
#[derive(Clone, Debug)]
pub struct Virtualizer<K = ItemKey> {
    options: VirtualizerOptions<K>,
    viewport_size: u32,
    scroll_offset: u64,
    scroll_rect: Rect,
    scroll_direction: Option<ScrollDirection>,

    sizes: Vec<u32>, // base sizes (no gap)
    measured: Vec<bool>,
    size_cache: SizeCache<K>,
    measurements: RefCell<Measurements>,
    pending_scroll: Option<PendingScroll>,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl<K: KeyCacheKey> Virtualizer<K> {
    /// Creates a new virtualizer from options.
    ///
    /// If `options.initial_rect` and/or `options.initial_offset` are set, those values are applied
    /// immediately.
    pub fn new(options: VirtualizerOptions<K>) -> Self {
        let scroll_rect = options.initial_rect.unwrap_or_default();
        let scroll_offset = options.initial_offset.resolve();
        vdebug!(
            count = options.count,
            enabled = options.enabled,
            overscan = options.overscan,
            lanes = options.lanes,
            "Virtualizer::new"
        );
        let mut v = Self {
            viewport_size: scroll_rect.main,
            scroll_offset,
            scroll_rect,
            scroll_direction: None,
            sizes: Vec::new(),
            measured: Vec::new(),
            size_cache: SizeCache::new(),
            measurements: RefCell::new(Measurements::new()),
            pending_scroll: None,
            options,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        };
        v.rebuild_estimates();
        v
    }

    pub fn options(&self) -> &VirtualizerOptions<K> {
        &self.options
    }

    fn reset_to_initial(&mut self) {
        self.scroll_offset = self.options.initial_offset.resolve();
        self.scroll_rect = self.options.initial_rect.unwrap_or_default();
        self.viewport_size = self.scroll_rect.main;
        self.scroll_direction = None;
        self.pending_scroll = None;
    }

    pub fn set_options(&mut self, options: VirtualizerOptions<K>) {
        let prev_count = self.options.count;
        let prev_layout = self.layout_params();
        let was_enabled = self.options.enabled;
        let estimate_size_unchanged =
            Arc::ptr_eq(&self.options.estimate_size, &options.estimate_size);
        let get_item_key_unchanged = Arc::ptr_eq(&self.options.get_item_key, &options.get_item_key);
        self.options = options;
        vtrace!(
            count = self.options.count,
            enabled = self.options.enabled,
            overscan = self.options.overscan,
            "Virtualizer::set_options"
        );

        if !self.options.enabled {
            self.viewport_size = 0;
            self.scroll_offset = self.options.initial_offset.resolve();
            self.scroll_rect = Rect::default();
            self.scroll_direction = None;
            self.pending_scroll = None;
        } else if !was_enabled {
            self.reset_to_initial();
        }

        if !estimate_size_unchanged || !get_item_key_unchanged {
            self.rebuild_estimates();
        } else if self.options.count != prev_count {
            self.resize_count(prev_count);
        }
        if self.layout_params() != prev_layout {
            self.measurements.get_mut().invalidate_from(0);
        }

        self.notify();
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut VirtualizerOptions<K>)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_on_change(&mut self, on_change: Option<impl Fn(&Virtualizer<K>) + Send + Sync + 'static>) {
        self.options.on_change = on_change.map(|f| Arc::new(f) as _);
        self.notify();
    }

    pub fn set_initial_offset(&mut self, initial_offset: u64) {
        self.options.initial_offset = InitialOffset::Value(initial_offset);
        self.notify();
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.options.on_change {
            cb(self);
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple updates into a single `on_change` notification.
    ///
    /// On a typical frame an adapter updates the viewport, the scroll offset and a few measured
    /// sizes together; without batching each setter triggers `on_change`.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    pub fn lanes(&self) -> usize {
        self.options.lane_count()
    }

    pub fn enabled(&self) -> bool {
        self.options.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.options.enabled == enabled {
            return;
        }
        self.options.enabled = enabled;
        if !enabled {
            self.viewport_size = 0;
            self.scroll_offset = self.options.initial_offset.resolve();
            self.scroll_rect = Rect::default();
            self.scroll_direction = None;
            self.pending_scroll = None;
        } else {
            self.reset_to_initial();
        }
        self.notify();
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll_direction
    }

    pub fn viewport_size(&self) -> u32 {
        self.viewport_size
    }

    pub fn scroll_rect(&self) -> Rect {
        self.scroll_rect
    }

    pub fn set_scroll_rect(&mut self, rect: Rect) {
        if self.scroll_rect == rect {
            return;
        }
        self.scroll_rect = rect;
        self.viewport_size = rect.main;
        self.notify();
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn scroll_offset_in_list(&self) -> u64 {
        let margin = self.options.scroll_margin as u64;
        self.scroll_offset.saturating_sub(margin)
    }

    pub fn set_viewport_size(&mut self, size: u32) {
        if self.viewport_size == size && self.scroll_rect.main == size {
            return;
        }
        self.viewport_size = size;
        self.scroll_rect.main = size;
        self.notify();
    }

    pub fn set_scroll_offset(&mut self, offset: u64) {
        if self.scroll_offset == offset {
            return;
        }
        let prev = self.scroll_offset;
        self.scroll_offset = offset;
        self.scroll_direction = match offset.cmp(&prev) {
            cmp::Ordering::Greater => Some(ScrollDirection::Forward),
            cmp::Ordering::Less => Some(ScrollDirection::Backward),
            cmp::Ordering::Equal => self.scroll_direction,
        };
        self.notify();
    }

    pub fn set_scroll_offset_clamped(&mut self, offset: u64) {
        let clamped = self.clamp_scroll_offset(offset);
        self.set_scroll_offset(clamped);
    }

    pub fn set_viewport_and_scroll(&mut self, viewport_size: u32, scroll_offset: u64) {
        self.batch_update(|v| {
            v.set_viewport_size(viewport_size);
            v.set_scroll_offset(scroll_offset);
        });
    }

    pub fn set_viewport_and_scroll_clamped(&mut self, viewport_size: u32, scroll_offset: u64) {
        self.batch_update(|v| {
            v.set_viewport_size(viewport_size);
            v.set_scroll_offset_clamped(scroll_offset);
        });
    }

    /// Applies both scroll rect and scroll offset in a single coalesced update.
    pub fn apply_scroll_frame(&mut self, rect: Rect, scroll_offset: u64) {
        vtrace!(
            rect_main = rect.main,
            rect_cross = rect.cross,
            scroll_offset,
            "apply_scroll_frame"
        );
        self.batch_update(|v| {
            v.set_scroll_rect(rect);
            v.set_scroll_offset(scroll_offset);
        });
    }

    pub fn set_count(&mut self, count: usize) {
        if self.options.count == count {
            return;
        }
        let prev = self.options.count;
        self.options.count = count;
        self.resize_count(prev);
        self.notify();
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        self.options.overscan = overscan;
        self.notify();
    }

    pub fn set_lanes(&mut self, lanes: usize) {
        let lanes = lanes.max(1);
        if self.options.lanes == lanes {
            return;
        }
        self.options.lanes = lanes;
        self.measurements.get_mut().invalidate_from(0);
        self.notify();
    }

    pub fn set_padding(&mut self, padding_start: u32, padding_end: u32) {
        if self.options.padding_start != padding_start {
            self.measurements.get_mut().invalidate_from(0);
        }
        self.options.padding_start = padding_start;
        self.options.padding_end = padding_end;
        self.notify();
    }

    pub fn set_scroll_padding(&mut self, scroll_padding_start: u32, scroll_padding_end: u32) {
        self.options.scroll_padding_start = scroll_padding_start;
        self.options.scroll_padding_end = scroll_padding_end;
        self.notify();
    }

    pub fn set_scroll_margin(&mut self, scroll_margin: u32) {
        self.options.scroll_margin = scroll_margin;
        self.notify();
    }

    pub fn set_gap(&mut self, gap: u32) {
        if self.options.gap == gap {
            return;
        }
        self.options.gap = gap;
        self.measurements.get_mut().invalidate_from(0);
        self.notify();
    }

    pub fn set_get_item_key(&mut self, f: impl Fn(usize) -> K + Send + Sync + 'static) {
        self.options.get_item_key = Arc::new(f);
        self.rebuild_estimates();
        self.notify();
    }

    pub fn set_should_adjust_scroll_position_on_item_size_change(
        &mut self,
        f: Option<impl Fn(&Virtualizer<K>, VirtualItem, i64) -> bool + Send + Sync + 'static>,
    ) {
        self.options
            .should_adjust_scroll_position_on_item_size_change = f.map(|f| Arc::new(f) as _);
        self.notify();
    }

    /// Re-reads sizes from the keyed cache after the data set was reordered or replaced while
    /// `count` stayed the same.
    pub fn sync_item_keys(&mut self) {
        self.rebuild_estimates();
        self.notify();
    }

    pub fn set_estimate_size(&mut self, f: impl Fn(usize) -> u32 + Send + Sync + 'static) {
        self.options.estimate_size = Arc::new(f);
        self.rebuild_estimates();
        self.notify();
    }

    pub fn reset_measurements(&mut self) {
        self.size_cache.clear();
        self.rebuild_estimates();
        self.notify();
    }

    /// Returns the number of cached measured sizes (key → size).
    pub fn measurement_cache_len(&self) -> usize {
        self.size_cache.len()
    }

    /// Iterates over the cached measured sizes (key → size) without allocations.
    pub fn for_each_cached_size(&self, mut f: impl FnMut(&K, u32)) {
        for (k, v) in self.size_cache.iter() {
            f(k, v);
        }
    }

    pub fn export_measurement_cache(&self) -> Vec<(K, u32)>
    where
        K: Clone,
    {
        let mut out = Vec::with_capacity(self.size_cache.len());
        self.for_each_cached_size(|k, v| out.push((k.clone(), v)));
        out
    }

    /// Replaces the cached measured sizes and rebuilds per-index sizes with the current keys.
    pub fn import_measurement_cache(&mut self, entries: impl IntoIterator<Item = (K, u32)>) {
        self.size_cache.clear();
        let mut n = 0usize;
        for (k, v) in entries {
            self.size_cache.insert(k, v);
            n = n.saturating_add(1);
        }
        vdebug!(entries = n, "import_measurement_cache");
        self.rebuild_estimates();
        self.notify();
    }

    /// Records a measured size without touching the scroll offset.
    pub fn measure(&mut self, index: usize, size: u32) {
        if index >= self.options.count {
            return;
        }
        let key = self.key_for(index);
        self.measure_keyed(index, key, size);
    }

    pub fn measure_keyed(&mut self, index: usize, key: K, size: u32) {
        if index >= self.options.count {
            return;
        }
        vtrace!(index, size, "measure_keyed");
        self.set_item_size_keyed(index, key, size);
        self.notify();
    }

    pub fn measure_many(&mut self, measurements: impl IntoIterator<Item = (usize, u32)>) {
        for (index, size) in measurements {
            if index >= self.options.count {
                continue;
            }
            let key = self.key_for(index);
            self.set_item_size_keyed(index, key, size);
        }
        self.notify();
    }

    /// Records a measured size and corrects the scroll offset when the item sits above it.
    ///
    /// Returns the applied scroll adjustment (`0` when the offset was left alone).
    pub fn resize_item(&mut self, index: usize, size: u32) -> i64 {
        if index >= self.options.count {
            return 0;
        }
        let key = self.key_for(index);
        self.resize_item_keyed(index, key, size)
    }

    pub fn resize_item_keyed(&mut self, index: usize, key: K, size: u32) -> i64 {
        if index >= self.options.count {
            return 0;
        }
        let item = self.item(index);
        let delta = size as i64 - item.size as i64;
        if delta == 0 {
            self.set_item_size_keyed(index, key, size);
            return 0;
        }

        let should_adjust = match &self
            .options
            .should_adjust_scroll_position_on_item_size_change
        {
            Some(f) => f(self, item, delta),
            None => item.start < self.scroll_offset,
        };

        let applied = if should_adjust {
            vtrace!(index, delta, "resize_item: adjusting scroll offset");
            self.scroll_offset = if delta > 0 {
                self.scroll_offset.saturating_add(delta as u64)
            } else {
                self.scroll_offset.saturating_sub(delta.unsigned_abs())
            };
            delta
        } else {
            0
        };

        self.set_item_size_keyed(index, key, size);
        self.notify();
        applied
    }

    pub fn resize_item_many(
        &mut self,
        measurements: impl IntoIterator<Item = (usize, u32)>,
    ) -> i64 {
        let mut applied = 0i64;
        self.batch_update(|v| {
            for (index, size) in measurements {
                applied += v.resize_item(index, size);
            }
        });
        applied
    }

    fn set_item_size_keyed(&mut self, index: usize, key: K, size: u32) {
        self.measured[index] = true;
        self.size_cache.insert(key, size);
        if self.sizes[index] != size {
            self.sizes[index] = size;
            self.measurements.get_mut().invalidate_from(index);
        }
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.measured.get(index).copied().unwrap_or(false)
    }

    pub fn total_size(&self) -> u64 {
        if !self.options.enabled {
            return 0;
        }
        let padding_start = self.options.padding_start as u64;
        let end = self
            .measured_layout()
            .content_end(self.lanes())
            .unwrap_or(padding_start);
        end.saturating_add(self.options.padding_end as u64)
    }

    pub fn key_for(&self, index: usize) -> K {
        (self.options.get_item_key)(index)
    }

    /// Returns the measurement for `index` (start includes `scroll_margin`).
    pub fn measurement(&self, index: usize) -> Option<VirtualItem> {
        if !self.options.enabled || index >= self.options.count {
            return None;
        }
        Some(self.item(index))
    }

    /// Returns all measurements (starts include `scroll_margin`).
    pub fn measurements(&self) -> Vec<VirtualItem> {
        if !self.options.enabled {
            return Vec::new();
        }
        let margin = self.options.scroll_margin as u64;
        self.measured_layout()
            .items()
            .iter()
            .map(|m| VirtualItem {
                start: margin.saturating_add(m.start),
                ..*m
            })
            .collect()
    }

    /// Visible range widened by `overscan`.
    pub fn virtual_range(&self) -> VirtualRange {
        self.virtual_range_for(self.scroll_offset, self.viewport_size)
    }

    pub fn virtual_range_for(&self, scroll_offset: u64, viewport_size: u32) -> VirtualRange {
        if !self.options.enabled {
            return VirtualRange::EMPTY;
        }
        self.compute_range(scroll_offset, viewport_size)
    }

    /// Items intersecting the viewport, without overscan.
    pub fn visible_range(&self) -> VirtualRange {
        self.visible_range_for(self.scroll_offset, self.viewport_size)
    }

    pub fn visible_range_for(&self, scroll_offset: u64, viewport_size: u32) -> VirtualRange {
        if !self.options.enabled {
            return VirtualRange::EMPTY;
        }
        self.compute_visible_range(scroll_offset, viewport_size)
    }

    pub fn for_each_virtual_index(&self, f: impl FnMut(usize)) {
        self.for_each_virtual_index_for(self.scroll_offset, self.viewport_size, f);
    }

    pub fn for_each_virtual_index_for(
        &self,
        scroll_offset: u64,
        viewport_size: u32,
        f: impl FnMut(usize),
    ) {
        let range = self.virtual_range_for(scroll_offset, viewport_size);
        (range.start_index..range.end_index).for_each(f);
    }

    pub fn for_each_virtual_item(&self, f: impl FnMut(VirtualItem)) {
        self.for_each_virtual_item_for(self.scroll_offset, self.viewport_size, f);
    }

    pub fn for_each_virtual_item_for(
        &self,
        scroll_offset: u64,
        viewport_size: u32,
        mut f: impl FnMut(VirtualItem),
    ) {
        let range = self.virtual_range_for(scroll_offset, viewport_size);
        if range.is_empty() {
            return;
        }
        let margin = self.options.scroll_margin as u64;
        let layout = self.measured_layout();
        for m in &layout.items()[range.start_index..range.end_index] {
            f(VirtualItem {
                start: margin.saturating_add(m.start),
                ..*m
            });
        }
    }

    pub fn for_each_virtual_item_keyed(&self, f: impl FnMut(VirtualItemKeyed<K>)) {
        self.for_each_virtual_item_keyed_for(self.scroll_offset, self.viewport_size, f);
    }

    pub fn for_each_virtual_item_keyed_for(
        &self,
        scroll_offset: u64,
        viewport_size: u32,
        mut f: impl FnMut(VirtualItemKeyed<K>),
    ) {
        self.for_each_virtual_item_for(scroll_offset, viewport_size, |item| {
            f(VirtualItemKeyed {
                key: self.key_for(item.index),
                index: item.index,
                start: item.start,
                size: item.size,
                lane: item.lane,
            });
        });
    }

    /// The items to materialize for the current scroll state: visible range plus overscan.
    pub fn virtual_items(&self) -> Vec<VirtualItem> {
        let mut out = Vec::new();
        self.collect_virtual_items(&mut out);
        out
    }

    /// Collects virtual item indexes into `out` (clears `out` first).
    pub fn collect_virtual_indexes(&self, out: &mut Vec<usize>) {
        out.clear();
        self.for_each_virtual_index(|i| out.push(i));
    }

    /// Collects virtual items into `out` (clears `out` first).
    ///
    /// Prefer `for_each_virtual_item` with a reused scratch buffer on hot paths.
    pub fn collect_virtual_items(&self, out: &mut Vec<VirtualItem>) {
        out.clear();
        self.for_each_virtual_item(|it| out.push(it));
    }

    pub fn collect_virtual_items_keyed(&self, out: &mut Vec<VirtualItemKeyed<K>>) {
        out.clear();
        self.for_each_virtual_item_keyed(|it| out.push(it));
    }

    /// Programmatically scrolls to an index (no animation).
    ///
    /// The index is clamped into `[0, count - 1]`. The computed (clamped) target is applied
    /// immediately and the request stays pending: after the adapter has rendered and measured
    /// the newly visible items it should call [`Self::reconcile_scroll`], which re-applies the
    /// target if measurements moved it.
    ///
    /// Returns the applied offset.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        if !self.options.enabled || self.options.count == 0 {
            self.pending_scroll = None;
            return self.scroll_offset;
        }
        let index = index.min(self.options.count - 1);
        let item = self.item(index);
        let align = self.resolve_align(item, align);
        let offset = self.offset_for_item(item, align);
        vdebug!(index, offset, "scroll_to_index");
        self.pending_scroll = Some(PendingScroll {
            index,
            align,
            attempts: 0,
        });
        self.set_scroll_offset(offset);
        offset
    }

    /// Checks whether a pending [`Self::scroll_to_index`] has converged.
    ///
    /// Call once per frame after measurements were applied and the UI scroll position was fed
    /// back. When the freshly computed target differs from the current offset, the target is
    /// re-applied; after [`MAX_SCROLL_TO_INDEX_ATTEMPTS`] the request is dropped and the last
    /// offset kept.
    pub fn reconcile_scroll(&mut self) -> ScrollReconcile {
        let Some(mut pending) = self.pending_scroll.take() else {
            return ScrollReconcile::Idle;
        };
        if !self.options.enabled || self.options.count == 0 {
            return ScrollReconcile::Idle;
        }

        let index = pending.index.min(self.options.count - 1);
        let item = self.item(index);
        let target = self.offset_for_item(item, pending.align);
        if target == self.scroll_offset {
            vtrace!(index, offset = target, "scroll_to_index settled");
            return ScrollReconcile::Settled { offset: target };
        }

        pending.attempts += 1;
        if pending.attempts >= MAX_SCROLL_TO_INDEX_ATTEMPTS {
            vwarn!(
                index,
                attempts = pending.attempts,
                offset = self.scroll_offset,
                "failed to scroll to index"
            );
            return ScrollReconcile::GaveUp {
                offset: self.scroll_offset,
            };
        }

        vdebug!(
            index,
            attempt = pending.attempts,
            offset = target,
            "scroll_to_index retry"
        );
        self.pending_scroll = Some(pending);
        self.set_scroll_offset(target);
        ScrollReconcile::Retrying {
            offset: target,
            attempt: pending.attempts,
        }
    }

    pub fn cancel_scroll_to_index(&mut self) {
        self.pending_scroll = None;
    }

    pub fn pending_scroll_to_index(&self) -> Option<usize> {
        self.pending_scroll.map(|p| p.index)
    }

    /// Computes the scroll offset that brings `index` into view with `align` (clamped).
    pub fn scroll_to_index_offset(&self, index: usize, align: Align) -> u64 {
        if !self.options.enabled {
            return self.options.initial_offset.resolve();
        }
        if self.options.count == 0 {
            return 0;
        }
        let index = index.min(self.options.count - 1);
        let item = self.item(index);
        self.offset_for_item(item, align)
    }

    fn resolve_align(&self, item: VirtualItem, align: Align) -> Align {
        if align != Align::Auto {
            return align;
        }
        let cur = self.scroll_offset;
        let cur_end = cur.saturating_add(self.viewport_size as u64);
        if item.start >= cur && item.end() <= cur_end {
            Align::Auto
        } else if item.start < cur {
            Align::Start
        } else {
            Align::End
        }
    }

    fn offset_for_item(&self, item: VirtualItem, align: Align) -> u64 {
        let sp_start = self.options.scroll_padding_start as u64;
        let sp_end = self.options.scroll_padding_end as u64;
        let view = self.viewport_size as u64;

        let target = match self.resolve_align(item, align) {
            Align::Start => item.start.saturating_sub(sp_start),
            Align::End => item.end().saturating_add(sp_end).saturating_sub(view),
            Align::Center => {
                let center = item.start.saturating_add(item.size as u64 / 2);
                center.saturating_sub(view / 2)
            }
            Align::Auto => self.scroll_offset,
        };

        self.clamp_scroll_offset(target)
    }

    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        if !self.options.enabled || self.options.count == 0 {
            return None;
        }
        let margin = self.options.scroll_margin as u64;
        let in_list = offset.saturating_sub(margin);
        Some(self.measured_layout().nearest_index(in_list))
    }

    pub fn item_start(&self, index: usize) -> Option<u64> {
        self.measurement(index).map(|m| m.start)
    }

    pub fn item_size(&self, index: usize) -> Option<u32> {
        if !self.options.enabled {
            return None;
        }
        self.sizes.get(index).copied()
    }

    pub fn item_end(&self, index: usize) -> Option<u64> {
        self.measurement(index).map(|m| m.end())
    }

    pub fn item_lane(&self, index: usize) -> Option<usize> {
        self.measurement(index).map(|m| m.lane)
    }

    pub fn virtual_item_for_offset(&self, offset: u64) -> Option<VirtualItem> {
        let index = self.index_at_offset(offset)?;
        Some(self.item(index))
    }

    pub fn virtual_item_keyed_for_offset(&self, offset: u64) -> Option<VirtualItemKeyed<K>> {
        let item = self.virtual_item_for_offset(offset)?;
        Some(VirtualItemKeyed {
            key: self.key_for(item.index),
            index: item.index,
            start: item.start,
            size: item.size,
            lane: item.lane,
        })
    }

    pub fn max_scroll_offset(&self) -> u64 {
        if !self.options.enabled {
            return self.options.initial_offset.resolve();
        }
        let margin = self.options.scroll_margin as u64;
        let total = self.total_size();
        let view = self.viewport_size as u64;
        margin.saturating_add(total.saturating_sub(view))
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    fn size_for(&self, index: usize) -> (u32, bool) {
        match self.size_cache.get(&self.key_for(index)) {
            Some(size) => (size, true),
            None => ((self.options.estimate_size)(index), false),
        }
    }

    fn rebuild_estimates(&mut self) {
        vdebug!(
            count = self.options.count,
            cached = self.size_cache.len(),
            "rebuild_estimates"
        );
        let count = self.options.count;
        self.sizes.clear();
        self.measured.clear();
        self.sizes.reserve_exact(count);
        self.measured.reserve_exact(count);
        for i in 0..count {
            let (size, measured) = self.size_for(i);
            self.sizes.push(size);
            self.measured.push(measured);
        }
        self.measurements.get_mut().invalidate_from(0);
    }

    /// Grows or shrinks per-index sizes to `options.count`, keeping the existing prefix.
    fn resize_count(&mut self, prev_count: usize) {
        let count = self.options.count;
        if count < prev_count {
            self.sizes.truncate(count);
            self.measured.truncate(count);
        } else {
            for i in prev_count..count {
                let (size, measured) = self.size_for(i);
                self.sizes.push(size);
                self.measured.push(measured);
            }
        }
        self.measurements
            .get_mut()
            .invalidate_from(cmp::min(prev_count, count));
    }

    fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            padding_start: self.options.padding_start,
            gap: self.options.gap,
            lanes: self.options.lane_count(),
        }
    }

    fn measured_layout(&self) -> Ref<'_, Measurements> {
        if self.measurements.borrow().is_dirty() {
            let mut layout = self.measurements.borrow_mut();
            let _rebuilt_from = layout.rebuild(&self.sizes, self.layout_params());
            vtrace!(
                from = _rebuilt_from,
                count = self.sizes.len(),
                "measurements rebuilt"
            );
        }
        self.measurements.borrow()
    }

    fn item(&self, index: usize) -> VirtualItem {
        let margin = self.options.scroll_margin as u64;
        let m = self.measured_layout().items()[index];
        VirtualItem {
            start: margin.saturating_add(m.start),
            ..m
        }
    }

    fn compute_range(&self, scroll_offset: u64, viewport_size: u32) -> VirtualRange {
        let mut range = self.compute_visible_range(scroll_offset, viewport_size);
        if range.is_empty() {
            return range;
        }

        let count = self.options.count;
        let overscan = self.options.overscan;
        range.start_index = range.start_index.saturating_sub(overscan);
        range.end_index = cmp::min(count, range.end_index.saturating_add(overscan));
        range
    }

    fn compute_visible_range(&self, scroll_offset: u64, viewport_size: u32) -> VirtualRange {
        let count = self.options.count;
        if count == 0 || viewport_size == 0 {
            return VirtualRange::EMPTY;
        }

        let margin = self.options.scroll_margin as u64;
        let view = viewport_size as u64;

        let total = self.total_size();
        let max_scroll = margin.saturating_add(total.saturating_sub(view));
        let scroll_offset = scroll_offset.min(max_scroll);
        let scroll_end = scroll_offset.saturating_add(view);
        if scroll_end <= margin {
            return VirtualRange::EMPTY;
        }

        let visible_start = scroll_offset.saturating_sub(margin);
        let visible_end = scroll_end.saturating_sub(margin);
        if visible_start >= total {
            return VirtualRange {
                start_index: count,
                end_index: count,
            };
        }

        self.measured_layout()
            .range_for(visible_start, visible_end, self.lanes())
    }
}
