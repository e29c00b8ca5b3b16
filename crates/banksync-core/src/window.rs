//! Fixed-size page over a host collection
//!
//! A [`Window`] mirrors what the host last told us about one page: its scroll
//! offset, the collection size, the scroll flags and the entries themselves.
//! It never talks to the host; the owning bank does that.
//!
//! ```text
//! backing collection:  0 1 2 3 4 5 6 7 8 9 10 11 ...
//!                              [ 4 5 6 7 ]            scroll_position = 4
//! entries:                       0 1 2 3              page_size = 4
//! ```

use crate::entry::{Entry, ItemKind};
use crate::host::BankUpdate;
use crate::types::{ItemCountProbe, WindowId};

/// One page of a backing collection
#[derive(Debug)]
pub struct Window<K> {
    id: WindowId,
    page_size: usize,
    /// `page_size` entries, allocated once
    entries: Vec<Entry<K>>,
    /// Returned for out-of-range lookups in release builds
    placeholder: Entry<K>,
    /// Absolute offset of entry 0
    scroll_position: usize,
    /// Host-reported collection size
    item_count: usize,
    can_scroll_backwards: bool,
    can_scroll_forwards: bool,
    observed: bool,
    /// Published item count for sibling windows
    count_probe: Option<ItemCountProbe>,
}

impl<K: ItemKind> Window<K> {
    /// Allocate a window of `page_size` non-existent entries
    pub fn new(id: WindowId, page_size: usize) -> Self {
        Self {
            id,
            page_size,
            entries: (0..page_size).map(Entry::new).collect(),
            placeholder: Entry::new(page_size),
            scroll_position: 0,
            item_count: 0,
            can_scroll_backwards: false,
            can_scroll_forwards: false,
            observed: true,
            count_probe: None,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn entries(&self) -> &[Entry<K>] {
        &self.entries
    }

    /// Entry at relative index `index`
    ///
    /// Out-of-range indices are a caller bug: debug builds panic, release
    /// builds get a non-existent placeholder entry.
    pub fn entry_at(&self, index: usize) -> &Entry<K> {
        debug_assert!(
            index < self.page_size,
            "entry index {} out of range for page size {}",
            index,
            self.page_size
        );
        self.entries.get(index).unwrap_or(&self.placeholder)
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn scroll_position(&self) -> usize {
        self.scroll_position
    }

    pub fn can_scroll_backwards(&self) -> bool {
        self.can_scroll_backwards
    }

    pub fn can_scroll_forwards(&self) -> bool {
        self.can_scroll_forwards
    }

    pub fn is_observed(&self) -> bool {
        self.observed
    }

    /// Round `position` down to the start of its page
    pub fn align(&self, position: usize) -> usize {
        if self.page_size == 0 {
            return position;
        }
        position / self.page_size * self.page_size
    }

    /// Resolve a scroll request to the offset to apply
    ///
    /// Returns `None` for positions outside `[0, item_count)`; the request is
    /// then dropped.
    pub fn resolve_scroll(&self, position: usize, align_to_page: bool) -> Option<usize> {
        if position >= self.item_count {
            return None;
        }
        Some(if align_to_page { self.align(position) } else { position })
    }

    /// Relative index at which absolute `position` is currently shown
    pub fn relative_index(&self, position: usize) -> Option<usize> {
        let offset = position.checked_sub(self.scroll_position)?;
        (offset < self.page_size).then_some(offset)
    }

    /// Absolute position currently shown at relative `index`
    pub fn absolute_position(&self, index: usize) -> usize {
        self.scroll_position + index
    }

    /// True if absolute `position` lies inside the backing collection
    pub fn contains_position(&self, position: usize) -> bool {
        position < self.item_count
    }

    /// Publish this window's item count to a shared probe
    pub fn item_count_probe(&mut self) -> ItemCountProbe {
        let count = self.item_count;
        self.count_probe
            .get_or_insert_with(|| {
                let probe = ItemCountProbe::new();
                probe.publish(count);
                probe
            })
            .clone()
    }

    /// Toggle observation of the window and all of its entries
    ///
    /// Returns true if the state changed.
    pub fn enable_observers(&mut self, enable: bool) -> bool {
        let changed = self.observed != enable;
        self.observed = enable;
        for entry in &mut self.entries {
            entry.enable_observers(enable);
        }
        changed
    }

    /// Optimistically apply a scroll we just asked the host for
    pub(crate) fn set_scroll_position(&mut self, position: usize) {
        self.scroll_position = position;
    }

    /// Apply a window-level host update
    ///
    /// Returns false for updates the window does not own (selection, cursors,
    /// page names); the caller routes those elsewhere.
    pub(crate) fn apply(&mut self, update: &BankUpdate) -> bool {
        match update {
            BankUpdate::ItemCount(count) => {
                self.item_count = *count;
                if let Some(probe) = &self.count_probe {
                    probe.publish(*count);
                }
            }
            BankUpdate::ScrollPosition(position) => self.scroll_position = *position,
            BankUpdate::CanScrollBackwards(v) => self.can_scroll_backwards = *v,
            BankUpdate::CanScrollForwards(v) => self.can_scroll_forwards = *v,
            BankUpdate::Entry { index, update } => {
                return match self.entries.get_mut(*index) {
                    Some(entry) => entry.apply(update),
                    None => {
                        log::debug!(
                            "Window {}: dropping update for entry {} (page size {})",
                            self.id,
                            index,
                            self.page_size
                        );
                        false
                    }
                };
            }
            BankUpdate::Cursor(_) | BankUpdate::PageNames(_) | BankUpdate::SelectedPage(_) => {
                return false
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::SceneAttrs;
    use crate::host::EntryUpdate;

    fn window(page_size: usize, item_count: usize) -> Window<SceneAttrs> {
        let mut window = Window::new(WindowId::next(), page_size);
        window.apply(&BankUpdate::ItemCount(item_count));
        window
    }

    #[test]
    fn test_fresh_window_has_page_size_missing_entries() {
        for page_size in [1, 4, 8, 64] {
            let window: Window<SceneAttrs> = Window::new(WindowId::next(), page_size);
            assert_eq!(window.entries().len(), page_size);
            assert!(window.entries().iter().all(|e| !e.does_exist()));
            assert!(window.entries().iter().enumerate().all(|(i, e)| e.index() == i));
        }
    }

    #[test]
    fn test_zero_page_size_is_allowed() {
        let window: Window<SceneAttrs> = Window::new(WindowId::next(), 0);
        assert!(window.entries().is_empty());
        assert_eq!(window.align(5), 5);
        assert_eq!(window.relative_index(0), None);
    }

    #[test]
    fn test_aligned_scroll_rounds_down_to_page() {
        let window = window(8, 32);
        for position in 0..32 {
            assert_eq!(window.resolve_scroll(position, true), Some(position / 8 * 8));
            assert_eq!(window.resolve_scroll(position, false), Some(position));
        }
    }

    #[test]
    fn test_out_of_range_scroll_is_dropped() {
        let window = window(8, 32);
        assert_eq!(window.resolve_scroll(32, true), None);
        assert_eq!(window.resolve_scroll(1000, false), None);

        let empty = self::window(8, 0);
        assert_eq!(empty.resolve_scroll(0, true), None);
    }

    #[test]
    fn test_relative_index() {
        let mut window = window(4, 16);
        window.set_scroll_position(4);
        assert_eq!(window.relative_index(3), None);
        assert_eq!(window.relative_index(4), Some(0));
        assert_eq!(window.relative_index(7), Some(3));
        assert_eq!(window.relative_index(8), None);
        assert_eq!(window.absolute_position(2), 6);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_out_of_range_entry_is_placeholder() {
        let window = window(4, 16);
        let entry = window.entry_at(9);
        assert!(!entry.does_exist());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_entry_panics_in_debug() {
        let window = window(4, 16);
        let _ = window.entry_at(4);
    }

    #[test]
    fn test_host_updates() {
        let mut window = window(4, 16);
        assert!(window.apply(&BankUpdate::ScrollPosition(8)));
        assert!(window.apply(&BankUpdate::CanScrollBackwards(true)));
        assert!(window.apply(&BankUpdate::Entry {
            index: 2,
            update: EntryUpdate::Exists(true),
        }));

        assert_eq!(window.scroll_position(), 8);
        assert!(window.can_scroll_backwards());
        assert!(!window.can_scroll_forwards());
        assert!(window.entry_at(2).does_exist());

        // Entry outside the page and updates owned by others are refused
        assert!(!window.apply(&BankUpdate::Entry {
            index: 4,
            update: EntryUpdate::Exists(true),
        }));
        assert!(!window.apply(&BankUpdate::SelectedPage(1)));
    }

    #[test]
    fn test_enable_observers_reaches_every_entry() {
        let mut window = window(4, 16);
        assert!(window.enable_observers(false));
        assert!(!window.is_observed());
        assert!(window.entries().iter().all(|e| !e.is_observed()));

        // Idempotent
        assert!(!window.enable_observers(false));
        assert!(window.entries().iter().all(|e| !e.is_observed()));

        assert!(window.enable_observers(true));
        assert!(window.entries().iter().all(|e| e.is_observed()));
    }

    #[test]
    fn test_item_count_probe_follows_updates() {
        let mut window = window(4, 16);
        let probe = window.item_count_probe();
        assert_eq!(probe.get(), 16);
        window.apply(&BankUpdate::ItemCount(20));
        assert_eq!(probe.get(), 20);
    }
}
