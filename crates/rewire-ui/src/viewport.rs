//! Visible-range math and the glue that drives a [`RowStateManager`] from
//! viewport changes.

use std::cell::RefCell;
use std::collections::HashSet;

use web_time::Duration;

use crate::rows::{RowKey, RowStateManager, RowStatus};

/// Half-open `[start, end)` index range, overscan included.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
}

impl VisibleRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Which fixed-extent items intersect the viewport, padded by `overscan`
/// items on both sides and clamped to `item_count`.
pub fn visible_range(
    scroll_offset: f32,
    viewport_extent: f32,
    item_extent: f32,
    item_count: usize,
    overscan: usize,
) -> VisibleRange {
    if item_extent <= 0.0 || item_count == 0 {
        return VisibleRange { start: 0, end: 0 };
    }
    let first = (scroll_offset / item_extent).floor().max(0.0) as usize;
    let last = ((scroll_offset + viewport_extent) / item_extent).ceil() as usize;
    VisibleRange {
        start: first.saturating_sub(overscan).min(item_count),
        end: (last + overscan).min(item_count),
    }
}

/// Diffs consecutive visible-key sets and translates the deltas into row
/// manager calls: entered rows start loading (with the debounce armed),
/// exited rows unload (cancelling their pending completion).
pub struct ViewportTracker {
    load_delay: Duration,
    visible: RefCell<HashSet<RowKey>>,
}

impl ViewportTracker {
    pub fn new(load_delay: Duration) -> Self {
        Self {
            load_delay,
            visible: RefCell::new(HashSet::new()),
        }
    }

    pub fn sync(&self, manager: &RowStateManager, now_visible: impl IntoIterator<Item = RowKey>) {
        let next: HashSet<RowKey> = now_visible.into_iter().collect();
        let prev = std::mem::replace(&mut *self.visible.borrow_mut(), next.clone());

        let exited: Vec<RowKey> = prev.difference(&next).cloned().collect();
        let entered: Vec<RowKey> = next.difference(&prev).cloned().collect();

        manager.mark_unloaded(&exited);
        manager.mark_loading(&entered);
        for key in &entered {
            // rows that reloaded instantly (sticky policy) need no timer
            if manager.state_of(key).status == RowStatus::Loading {
                manager.schedule_loaded(key, self.load_delay);
            }
        }
    }

    pub fn visible_count(&self) -> usize {
        self.visible.borrow().len()
    }
}
