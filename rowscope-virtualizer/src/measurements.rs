use alloc::vec;
use alloc::vec::Vec;

use crate::{VirtualItem, VirtualRange};

/// Layout inputs the measurement array depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LayoutParams {
    pub(crate) padding_start: u32,
    pub(crate) gap: u32,
    pub(crate) lanes: usize,
}

/// Per-index measurements in list coordinates (`padding_start` included, `scroll_margin` not).
///
/// Rebuilding is lazy and incremental: size changes mark the smallest affected index, and the
/// next read recomputes only the suffix from there.
#[derive(Clone, Debug)]
pub(crate) struct Measurements {
    items: Vec<VirtualItem>,
    pending_from: Option<usize>,
}

impl Measurements {
    pub(crate) fn new() -> Self {
        Self {
            items: Vec::new(),
            pending_from: Some(0),
        }
    }

    pub(crate) fn invalidate_from(&mut self, index: usize) {
        self.pending_from = Some(match self.pending_from {
            Some(prev) => prev.min(index),
            None => index,
        });
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.pending_from.is_some()
    }

    pub(crate) fn items(&self) -> &[VirtualItem] {
        &self.items
    }

    /// Recomputes measurements from the smallest pending index to the end.
    ///
    /// Returns the first rebuilt index, or `None` when nothing was pending.
    pub(crate) fn rebuild(&mut self, sizes: &[u32], params: LayoutParams) -> Option<usize> {
        let from = self.pending_from.take()?;
        let count = sizes.len();
        let from = from.min(count).min(self.items.len());
        self.items.truncate(from);
        self.items.reserve(count - from);

        let gap = params.gap as u64;
        let padding = params.padding_start as u64;

        if params.lanes <= 1 {
            let mut start = self
                .items
                .last()
                .map_or(padding, |prev| prev.end().saturating_add(gap));
            for (index, &size) in sizes.iter().enumerate().skip(from) {
                self.items.push(VirtualItem {
                    index,
                    start,
                    size,
                    lane: 0,
                });
                start = start.saturating_add(size as u64).saturating_add(gap);
            }
            return Some(from);
        }

        let mut tails = self.lane_tails(params.lanes);
        for (index, &size) in sizes.iter().enumerate().skip(from) {
            let (lane, start) = match tails.iter().position(Option::is_none) {
                Some(empty) => (empty, padding),
                None => {
                    let (lane, end) = shortest_lane(&tails);
                    (lane, end.saturating_add(gap))
                }
            };
            let item = VirtualItem {
                index,
                start,
                size,
                lane,
            };
            tails[lane] = Some((item.end(), index));
            self.items.push(item);
        }
        Some(from)
    }

    /// The last item of every lane as `(end, index)`.
    fn lane_tails(&self, lanes: usize) -> Vec<Option<(u64, usize)>> {
        let mut tails = vec![None; lanes];
        let mut missing = lanes;
        for item in self.items.iter().rev() {
            if missing == 0 {
                break;
            }
            if item.lane < lanes && tails[item.lane].is_none() {
                tails[item.lane] = Some((item.end(), item.index));
                missing -= 1;
            }
        }
        tails
    }

    /// Furthest end offset across lanes.
    pub(crate) fn content_end(&self, lanes: usize) -> Option<u64> {
        if lanes <= 1 {
            return self.items.last().map(VirtualItem::end);
        }
        self.lane_tails(lanes)
            .into_iter()
            .flatten()
            .map(|(end, _)| end)
            .max()
    }

    /// Index of the last item starting at or before `offset` (binary search by start).
    ///
    /// Offsets before the first item map to `0`; offsets inside a gap map to the previous item.
    pub(crate) fn nearest_index(&self, offset: u64) -> usize {
        self.items
            .partition_point(|m| m.start <= offset)
            .saturating_sub(1)
    }

    /// Items intersecting `[start_offset, end_offset)` (list coordinates), before overscan.
    pub(crate) fn range_for(&self, start_offset: u64, end_offset: u64, lanes: usize) -> VirtualRange {
        let count = self.items.len();
        if count == 0 {
            return VirtualRange::EMPTY;
        }
        if count <= lanes {
            return VirtualRange {
                start_index: 0,
                end_index: count,
            };
        }

        let last = count - 1;
        let mut start = self.nearest_index(start_offset);
        let mut end = start;

        if lanes <= 1 {
            while end < last && self.items[end + 1].start < end_offset {
                end += 1;
            }
            return VirtualRange {
                start_index: start,
                end_index: end + 1,
            };
        }

        // Walk forward until every lane reaches the viewport end.
        let mut end_per_lane: Vec<Option<u64>> = vec![None; lanes];
        let mut cursor = start;
        while cursor <= last
            && end_per_lane
                .iter()
                .any(|e| e.is_none_or(|e| e < end_offset))
        {
            let item = self.items[cursor];
            end_per_lane[item.lane] = Some(item.end());
            end = cursor;
            cursor += 1;
        }

        // Walk backward until every lane has an item starting before the viewport.
        let mut start_per_lane: Vec<Option<u64>> = vec![None; lanes];
        let mut cursor = start + 1;
        while cursor > 0
            && start_per_lane
                .iter()
                .any(|s| s.is_none_or(|s| s >= start_offset))
        {
            cursor -= 1;
            let item = self.items[cursor];
            start_per_lane[item.lane] = Some(item.start);
            start = cursor;
        }

        start -= start % lanes;
        end = (end + (lanes - 1 - end % lanes)).min(last);
        VirtualRange {
            start_index: start,
            end_index: end + 1,
        }
    }
}

/// The lane whose last item ends first; ties go to the lane holding the lower index.
fn shortest_lane(tails: &[Option<(u64, usize)>]) -> (usize, u64) {
    let mut best: Option<(usize, u64, usize)> = None;
    for (lane, tail) in tails.iter().enumerate() {
        let Some((end, index)) = *tail else {
            continue;
        };
        let better = match best {
            None => true,
            Some((_, best_end, best_index)) => (end, index) < (best_end, best_index),
        };
        if better {
            best = Some((lane, end, index));
        }
    }
    best.map_or((0, 0), |(lane, end, _)| (lane, end))
}
