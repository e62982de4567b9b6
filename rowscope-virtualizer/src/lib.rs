//! A headless windowing engine for large row models.
//!
//! Given an item count, per-item size estimates (refined by measurements), a viewport size and
//! a scroll offset, the [`Virtualizer`] answers which indexes must be materialized. It keeps:
//!
//! - a measurement array (`start`, `size`, `lane` per index) rebuilt lazily from the smallest
//!   index whose size changed,
//! - a measurement cache keyed by stable item keys, so reordering does not lose measurements,
//! - multi-lane (masonry style) placement,
//! - scroll position correction when items above the viewport change size,
//! - programmatic scroll-to-index with bounded convergence retries.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - viewport size (height/width)
//! - scroll offset
//! - item size estimates and (optionally) measured sizes
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod key;
mod measurements;
mod options;
mod types;
mod virtualizer;


pub use options::{
    InitialOffset, OnChangeCallback, ShouldAdjustScrollPositionOnItemSizeChangeCallback,
    VirtualizerOptions,
};
pub use types::{
    Align, ItemKey, Rect, ScrollDirection, ScrollReconcile, VirtualItem, VirtualItemKeyed,
    VirtualRange,
};
pub use virtualizer::{MAX_SCROLL_TO_INDEX_ATTEMPTS, Virtualizer};

#[doc(hidden)]
pub use key::KeyCacheKey;
