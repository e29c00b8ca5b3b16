//! Generic windowed bank: window + selection + host handle
//!
//! [`Bank`] implements the cross-page selection protocol on top of a
//! [`Window`] and a [`SelectionTracker`]:
//!
//! ```text
//! select_next_item, selected index i:
//!   i + 1 <  page_size  →  select(i + 1)                      (synchronous)
//!   i + 1 == page_size  →  host.scroll_page_forwards()
//!                          schedule SelectPosition(scroll + page_size)
//! ```
//!
//! The follow-up is never run synchronously: the host has not applied the
//! scroll yet, and selecting relative index 0 right away would select the
//! first entry of the *old* page.
//!
//! Specializations configure a bank at construction time instead of
//! overriding its protocol: where scroll bounds come from and whether
//! positions are offset by a sibling window. Page moves here are always the
//! host's native page scroll; windows without one page with
//! [`crate::EmulatedPaging`] instead of a `Bank` page move.

use crate::entry::{Entry, ItemKind};
use crate::host::{BankUpdate, CursorUpdate, EntryUpdate, HostCollection};
use crate::navigator::PageNavigator;
use crate::scheduler::{FollowUp, FollowUpScheduler};
use crate::selection::{SelectionObserver, SelectionTracker};
use crate::types::{ItemCountProbe, WindowId};
use crate::window::Window;
use std::time::Duration;

/// Delay before the boundary selection when nothing else is configured
pub const DEFAULT_BOUNDARY_DELAY: Duration = Duration::from_millis(75);

/// Where a bank's scroll availability comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBounds {
    /// The window's own can-scroll flags
    Window,
    /// The host cursor's has-previous/has-next signal
    Cursor { has_previous: bool, has_next: bool },
}

/// One windowed host collection with its selection
pub struct Bank<K, H: ?Sized = dyn HostCollection> {
    /// Short name for log lines ("tracks", "scenes", ...)
    label: &'static str,
    window: Window<K>,
    selection: SelectionTracker,
    host: Box<H>,
    scheduler: FollowUpScheduler,
    /// Delay before selecting across a page boundary
    boundary_delay: Duration,
    bounds: ScrollBounds,
    /// Sibling window whose item count precedes this window's positions
    origin: Option<ItemCountProbe>,
}

impl<K, H: ?Sized> std::fmt::Debug for Bank<K, H>
where
    K: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bank")
            .field("label", &self.label)
            .field("window", &self.window)
            .field("selection", &self.selection)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

impl<K: ItemKind, H: HostCollection + ?Sized> Bank<K, H> {
    /// Create a bank of `page_size` entries over `host`
    pub fn new(
        label: &'static str,
        id: WindowId,
        page_size: usize,
        host: Box<H>,
        scheduler: FollowUpScheduler,
    ) -> Self {
        Self {
            label,
            window: Window::new(id, page_size),
            selection: SelectionTracker::new(),
            host,
            scheduler,
            boundary_delay: DEFAULT_BOUNDARY_DELAY,
            bounds: ScrollBounds::Window,
            origin: None,
        }
    }

    /// Set the page-boundary follow-up delay
    pub fn with_boundary_delay(mut self, delay: Duration) -> Self {
        self.boundary_delay = delay;
        self
    }

    /// Take scroll availability from the host cursor instead of the window
    pub fn with_cursor_bounds(mut self) -> Self {
        self.bounds = ScrollBounds::Cursor {
            has_previous: false,
            has_next: false,
        };
        self
    }

    /// Offset external positions by the item count behind `origin`
    pub fn with_origin(mut self, origin: ItemCountProbe) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn id(&self) -> WindowId {
        self.window.id()
    }

    pub fn window(&self) -> &Window<K> {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut Window<K> {
        &mut self.window
    }

    pub fn boundary_delay(&self) -> Duration {
        self.boundary_delay
    }

    pub fn bounds(&self) -> ScrollBounds {
        self.bounds
    }

    pub fn scheduler(&self) -> &FollowUpScheduler {
        &self.scheduler
    }

    pub(crate) fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Item count of the sibling window that precedes this one
    pub fn origin_offset(&self) -> usize {
        self.origin.as_ref().map_or(0, ItemCountProbe::get)
    }

    /// Entry at relative `index`
    pub fn item(&self, index: usize) -> &Entry<K> {
        self.window.entry_at(index)
    }

    pub fn items(&self) -> &[Entry<K>] {
        self.window.entries()
    }

    /// The selected entry, if it is on the visible page
    pub fn selected_item(&self) -> Option<&Entry<K>> {
        self.selected_index().map(|i| self.window.entry_at(i))
    }

    pub fn add_selection_observer(&mut self, observer: SelectionObserver) {
        self.selection.add_observer(observer);
    }

    /// Select the entry at relative `index`
    ///
    /// Ignored if `index` is outside the page or past the end of the
    /// collection.
    pub fn select(&mut self, index: usize) {
        let page_size = self.window.page_size();
        if index >= page_size {
            log::debug!("Bank {}: select({}) outside page of {}", self.label, index, page_size);
            return;
        }
        let position = self.window.absolute_position(index);
        if !self.window.contains_position(position) {
            log::debug!(
                "Bank {}: select({}) → position {} past item count {}",
                self.label,
                index,
                position,
                self.window.item_count()
            );
            return;
        }
        self.host.select(index);
        let scroll = self.window.scroll_position();
        self.selection.select(position, scroll, page_size);
    }

    /// Apply a host notification addressed to this bank
    ///
    /// Returns false if the update is not meant for a plain bank.
    pub fn apply(&mut self, update: &BankUpdate) -> bool {
        match update {
            BankUpdate::Entry {
                index,
                update: EntryUpdate::Selected(is_selected),
            } => {
                if *index >= self.window.page_size() {
                    return false;
                }
                let scroll = self.window.scroll_position();
                let page_size = self.window.page_size();
                self.selection.apply_host(*index, *is_selected, scroll, page_size);
                true
            }
            BankUpdate::Cursor(CursorUpdate::HasPrevious(v)) => match &mut self.bounds {
                ScrollBounds::Cursor { has_previous, .. } => {
                    *has_previous = *v;
                    true
                }
                ScrollBounds::Window => false,
            },
            BankUpdate::Cursor(CursorUpdate::HasNext(v)) => match &mut self.bounds {
                ScrollBounds::Cursor { has_next, .. } => {
                    *has_next = *v;
                    true
                }
                ScrollBounds::Window => false,
            },
            other => self.window.apply(other),
        }
    }

    /// Run a due follow-up addressed to this bank
    ///
    /// A `SelectPosition` whose target is no longer on the page (the host has
    /// not scrolled yet, or scrolled elsewhere since) is skipped; the next
    /// host notification is authoritative anyway.
    pub fn run_follow_up(&mut self, follow_up: &FollowUp) -> bool {
        match follow_up {
            FollowUp::SelectPosition(position) => {
                match self.window.relative_index(*position) {
                    Some(index) if self.window.contains_position(*position) => self.select(index),
                    _ => log::debug!(
                        "Bank {}: stale follow-up, position {} not on page at {}",
                        self.label,
                        position,
                        self.window.scroll_position()
                    ),
                }
                true
            }
            _ => false,
        }
    }

    fn schedule_selection(&self, position: usize) {
        self.scheduler.schedule(
            self.window.id(),
            self.boundary_delay,
            FollowUp::SelectPosition(position),
        );
    }

}

impl<K: ItemKind, H: HostCollection + ?Sized> PageNavigator for Bank<K, H> {
    fn page_size(&self) -> usize {
        self.window.page_size()
    }

    fn item_count(&self) -> usize {
        self.window.item_count()
    }

    fn scroll_position(&self) -> usize {
        self.window.scroll_position()
    }

    fn can_scroll_backwards(&self) -> bool {
        match self.bounds {
            ScrollBounds::Window => self.window.can_scroll_backwards(),
            ScrollBounds::Cursor { has_previous, .. } => has_previous,
        }
    }

    fn can_scroll_forwards(&self) -> bool {
        match self.bounds {
            ScrollBounds::Window => self.window.can_scroll_forwards(),
            ScrollBounds::Cursor { has_next, .. } => has_next,
        }
    }

    fn selected_index(&self) -> Option<usize> {
        self.selection
            .selected_index(self.window.scroll_position(), self.window.page_size())
    }

    fn selected_position(&self) -> Option<usize> {
        self.selection.selected_position()
    }

    fn scroll_backwards(&mut self) {
        if !self.can_scroll_backwards() {
            log::debug!("Bank {}: cannot scroll backwards", self.label);
            return;
        }
        self.host.scroll_backwards();
    }

    fn scroll_forwards(&mut self) {
        if !self.can_scroll_forwards() {
            log::debug!("Bank {}: cannot scroll forwards", self.label);
            return;
        }
        self.host.scroll_forwards();
    }

    fn scroll_page_backwards(&mut self) {
        if !self.can_scroll_page_backwards() {
            log::debug!("Bank {}: cannot scroll page backwards", self.label);
            return;
        }
        self.host.scroll_page_backwards();
    }

    fn scroll_page_forwards(&mut self) {
        if !self.can_scroll_page_forwards() {
            log::debug!("Bank {}: cannot scroll page forwards", self.label);
            return;
        }
        self.host.scroll_page_forwards();
    }

    fn scroll_to_aligned(&mut self, position: usize, align_to_page: bool) {
        let Some(local) = position.checked_sub(self.origin_offset()) else {
            log::debug!(
                "Bank {}: position {} precedes origin {}",
                self.label,
                position,
                self.origin_offset()
            );
            return;
        };
        let Some(target) = self.window.resolve_scroll(local, align_to_page) else {
            log::debug!(
                "Bank {}: scroll to {} outside item count {}",
                self.label,
                local,
                self.window.item_count()
            );
            return;
        };
        self.host.scroll_to(target);
        self.window.set_scroll_position(target);
    }

    fn select_next_item(&mut self) {
        let page_size = self.window.page_size();
        if page_size == 0 {
            return;
        }
        let index = self.selected_index().map_or(0, |i| i + 1);
        if index == page_size {
            self.select_next_page();
        } else {
            self.select(index);
        }
    }

    fn select_previous_item(&mut self) {
        if self.window.page_size() == 0 {
            return;
        }
        match self.selected_index() {
            None => self.select(0),
            Some(0) => self.select_previous_page(),
            Some(index) => self.select(index - 1),
        }
    }

    fn select_next_page(&mut self) {
        if !self.can_scroll_forwards() {
            log::debug!("Bank {}: no next page", self.label);
            return;
        }
        let target = self.window.scroll_position() + self.window.page_size();
        self.scroll_page_forwards();
        self.schedule_selection(target);
    }

    fn select_previous_page(&mut self) {
        if !self.can_scroll_backwards() {
            log::debug!("Bank {}: no previous page", self.label);
            return;
        }
        let page_size = self.window.page_size();
        let new_scroll = self.window.scroll_position().saturating_sub(page_size);
        self.scroll_page_backwards();
        self.schedule_selection(new_scroll + page_size - 1);
    }

    fn select_item_at_position(&mut self, position: usize) {
        let Some(local) = position.checked_sub(self.origin_offset()) else {
            return;
        };
        if !self.window.contains_position(local) {
            log::debug!("Bank {}: no item at position {}", self.label, local);
            return;
        }
        if let Some(index) = self.window.relative_index(local) {
            self.select(index);
            return;
        }
        self.scroll_to_aligned(position, true);
        self.schedule_selection(local);
    }

    fn enable_observers(&mut self, enable: bool) {
        if self.window.enable_observers(enable) {
            log::debug!("Bank {}: observers {}", self.label, if enable { "on" } else { "off" });
        }
        self.host.set_subscribed(enable);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::entry::SceneAttrs;
    use crate::scheduler::ManualClock;
    use std::sync::{Arc, Mutex};

    /// Host command as seen by a recording host
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Call {
        ScrollBackwards,
        ScrollForwards,
        ScrollPageBackwards,
        ScrollPageForwards,
        ScrollTo(usize),
        Select(usize),
        Subscribed(bool),
    }

    /// Host that only records what it was asked to do
    #[derive(Clone, Default)]
    pub(crate) struct RecordingHost {
        pub calls: Arc<Mutex<Vec<Call>>>,
    }

    impl RecordingHost {
        pub fn take(&self) -> Vec<Call> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }

        fn push(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl HostCollection for RecordingHost {
        fn scroll_backwards(&mut self) {
            self.push(Call::ScrollBackwards);
        }
        fn scroll_forwards(&mut self) {
            self.push(Call::ScrollForwards);
        }
        fn scroll_page_backwards(&mut self) {
            self.push(Call::ScrollPageBackwards);
        }
        fn scroll_page_forwards(&mut self) {
            self.push(Call::ScrollPageForwards);
        }
        fn scroll_to(&mut self, position: usize) {
            self.push(Call::ScrollTo(position));
        }
        fn select(&mut self, index: usize) {
            self.push(Call::Select(index));
        }
        fn set_subscribed(&mut self, enable: bool) {
            self.push(Call::Subscribed(enable));
        }
    }

    pub(crate) struct Fixture {
        pub bank: Bank<SceneAttrs>,
        pub host: RecordingHost,
        pub clock: Arc<ManualClock>,
    }

    /// Bank with `item_count` items at scroll 0, scroll flags derived from it
    pub(crate) fn fixture(page_size: usize, item_count: usize) -> Fixture {
        let clock = Arc::new(ManualClock::new());
        let scheduler = FollowUpScheduler::new(clock.clone());
        let host = RecordingHost::default();
        let mut bank: Bank<SceneAttrs> = Bank::new(
            "test",
            WindowId::next(),
            page_size,
            Box::new(host.clone()) as Box<dyn HostCollection>,
            scheduler,
        );
        bank.apply(&BankUpdate::ItemCount(item_count));
        host_scrolled(&mut bank, 0);
        Fixture { bank, host, clock }
    }

    /// What the host reports after it applied a scroll to `position`
    pub(crate) fn host_scrolled<K: ItemKind>(bank: &mut Bank<K>, position: usize) {
        let count = bank.item_count();
        let page_size = bank.page_size();
        bank.apply(&BankUpdate::ScrollPosition(position));
        bank.apply(&BankUpdate::CanScrollBackwards(position > 0));
        bank.apply(&BankUpdate::CanScrollForwards(position + page_size < count));
    }

    fn run_due(fixture: &mut Fixture) {
        for (window, follow_up) in fixture.bank.scheduler().take_due() {
            assert_eq!(window, fixture.bank.id());
            fixture.bank.run_follow_up(&follow_up);
        }
    }

    #[test]
    fn test_select_next_item_within_page() {
        let mut f = fixture(8, 32);
        f.bank.select(3);
        f.host.take();

        f.bank.select_next_item();
        assert_eq!(f.host.take(), vec![Call::Select(4)]);
        assert_eq!(f.bank.selected_index(), Some(4));
        assert!(f.bank.scheduler().is_idle());
    }

    #[test]
    fn test_select_next_item_without_selection_starts_at_zero() {
        let mut f = fixture(8, 32);
        f.bank.select_next_item();
        assert_eq!(f.host.take(), vec![Call::Select(0)]);
        assert_eq!(f.bank.selected_position(), Some(0));
    }

    #[test]
    fn test_select_previous_item_without_selection_selects_zero() {
        let mut f = fixture(8, 32);
        host_scrolled(&mut f.bank, 8);
        f.bank.select_previous_item();
        assert_eq!(f.host.take(), vec![Call::Select(0)]);
        assert_eq!(f.bank.selected_position(), Some(8));
        assert!(f.bank.scheduler().is_idle());
    }

    #[test]
    fn test_select_next_item_crosses_page_boundary() {
        // pageSize=8, itemCount=32, scroll 0, selected 7
        let mut f = fixture(8, 32);
        f.bank.select(7);
        f.host.take();

        f.bank.select_next_item();
        // Scroll first, no selection yet
        assert_eq!(f.host.take(), vec![Call::ScrollPageForwards]);
        assert_eq!(f.bank.selected_position(), Some(7));

        // Host applies the scroll, then the delay elapses
        host_scrolled(&mut f.bank, 8);
        f.clock.advance_millis(74);
        run_due(&mut f);
        assert!(f.host.take().is_empty());

        f.clock.advance_millis(1);
        run_due(&mut f);
        assert_eq!(f.host.take(), vec![Call::Select(0)]);
        assert_eq!(f.bank.scroll_position(), 8);
        assert_eq!(f.bank.selected_position(), Some(8));
        assert_eq!(f.bank.selected_index(), Some(0));
    }

    #[test]
    fn test_select_previous_item_crosses_page_boundary() {
        let mut f = fixture(8, 32);
        host_scrolled(&mut f.bank, 16);
        f.bank.select(0);
        f.host.take();

        f.bank.select_previous_item();
        assert_eq!(f.host.take(), vec![Call::ScrollPageBackwards]);

        host_scrolled(&mut f.bank, 8);
        f.clock.advance_millis(75);
        run_due(&mut f);
        assert_eq!(f.host.take(), vec![Call::Select(7)]);
        assert_eq!(f.bank.selected_position(), Some(15));
    }

    #[test]
    fn test_previous_from_first_item_of_first_page_is_noop() {
        let mut f = fixture(8, 32);
        f.bank.select(0);
        f.host.take();

        f.bank.select_previous_item();
        assert!(f.host.take().is_empty());
        assert!(f.bank.scheduler().is_idle());
        assert_eq!(f.bank.selected_position(), Some(0));
    }

    #[test]
    fn test_next_from_last_item_of_last_page_is_noop() {
        let mut f = fixture(8, 16);
        host_scrolled(&mut f.bank, 8);
        f.bank.select(7);
        f.host.take();

        f.bank.select_next_item();
        assert!(f.host.take().is_empty());
        assert!(f.bank.scheduler().is_idle());
    }

    #[test]
    fn test_stale_follow_up_is_skipped() {
        let mut f = fixture(8, 32);
        f.bank.select(7);
        f.bank.select_next_item();
        f.host.take();

        // Host has not applied the scroll when the follow-up fires
        f.clock.advance_millis(75);
        run_due(&mut f);
        assert!(f.host.take().is_empty());
        assert_eq!(f.bank.selected_position(), Some(7));
    }

    #[test]
    fn test_superseding_navigation_wins() {
        let mut f = fixture(8, 32);
        f.bank.select(7);
        f.bank.select_next_item();
        host_scrolled(&mut f.bank, 8);

        // Second page jump before the first follow-up fired
        f.bank.select_next_page();
        host_scrolled(&mut f.bank, 16);
        f.host.take();

        f.clock.advance_millis(75);
        run_due(&mut f);
        assert_eq!(f.host.take(), vec![Call::Select(0)]);
        assert_eq!(f.bank.selected_position(), Some(16));
    }

    #[test]
    fn test_scroll_to_aligns_and_is_idempotent() {
        let mut f = fixture(8, 32);
        f.bank.scroll_to(13);
        assert_eq!(f.bank.scroll_position(), 8);
        f.bank.scroll_to(13);
        assert_eq!(f.bank.scroll_position(), 8);
        assert_eq!(f.host.take(), vec![Call::ScrollTo(8), Call::ScrollTo(8)]);

        f.bank.scroll_to_aligned(13, false);
        assert_eq!(f.bank.scroll_position(), 13);
    }

    #[test]
    fn test_scroll_to_out_of_range_is_ignored() {
        let mut f = fixture(8, 32);
        f.bank.scroll_to(32);
        f.bank.scroll_to(500);
        assert!(f.host.take().is_empty());
        assert_eq!(f.bank.scroll_position(), 0);
    }

    #[test]
    fn test_scroll_respects_host_flags() {
        let mut f = fixture(8, 32);
        f.bank.scroll_backwards();
        f.bank.scroll_page_backwards();
        assert!(f.host.take().is_empty());

        f.bank.scroll_forwards();
        f.bank.scroll_page_forwards();
        assert_eq!(f.host.take(), vec![Call::ScrollForwards, Call::ScrollPageForwards]);
    }

    #[test]
    fn test_select_item_at_position_on_page() {
        let mut f = fixture(8, 32);
        f.bank.select_item_at_position(5);
        assert_eq!(f.host.take(), vec![Call::Select(5)]);
        assert!(f.bank.scheduler().is_idle());
    }

    #[test]
    fn test_select_item_at_position_off_page() {
        let mut f = fixture(8, 32);
        f.bank.select_item_at_position(21);
        assert_eq!(f.host.take(), vec![Call::ScrollTo(16)]);
        assert_eq!(f.bank.scroll_position(), 16);

        f.clock.advance_millis(75);
        run_due(&mut f);
        assert_eq!(f.host.take(), vec![Call::Select(5)]);
        assert_eq!(f.bank.selected_position(), Some(21));

        f.bank.select_item_at_position(32);
        assert!(f.host.take().is_empty());
    }

    #[test]
    fn test_select_past_item_count_is_ignored() {
        let mut f = fixture(8, 5);
        f.bank.select(6);
        assert!(f.host.take().is_empty());
        assert_eq!(f.bank.selected_position(), None);
    }

    #[test]
    fn test_host_selection_overrides() {
        let mut f = fixture(8, 32);
        f.bank.select(2);
        f.bank.apply(&BankUpdate::Entry {
            index: 6,
            update: EntryUpdate::Selected(true),
        });
        assert_eq!(f.bank.selected_index(), Some(6));
        assert_eq!(f.bank.selected_item().map(|e| e.index()), Some(6));
    }

    #[test]
    fn test_cursor_bounds() {
        let mut f = fixture(4, 32);
        let clock = f.clock.clone();
        let mut bank: Bank<SceneAttrs> = Bank::new(
            "layers",
            WindowId::next(),
            4,
            Box::new(f.host.clone()) as Box<dyn HostCollection>,
            FollowUpScheduler::new(clock),
        )
        .with_cursor_bounds();
        bank.apply(&BankUpdate::ItemCount(32));
        bank.apply(&BankUpdate::CanScrollForwards(true));
        // Window flag ignored; cursor says nothing follows
        assert!(!bank.can_scroll_forwards());

        assert!(bank.apply(&BankUpdate::Cursor(CursorUpdate::HasNext(true))));
        assert!(bank.can_scroll_forwards());
        assert!(!bank.can_scroll_backwards());

        // Plain banks refuse cursor updates
        assert!(!f.bank.apply(&BankUpdate::Cursor(CursorUpdate::HasNext(true))));
    }

    #[test]
    fn test_host_selection_reaches_observers() {
        let mut f = fixture(8, 32);
        host_scrolled(&mut f.bank, 8);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        f.bank.add_selection_observer(Box::new(move |index, selected| {
            sink.lock().unwrap().push((index, selected));
        }));

        f.bank.select(2);
        assert_eq!(std::mem::take(&mut *seen.lock().unwrap()), vec![(2, true)]);

        // Host moves the selection; observers run before apply returns
        assert!(f.bank.apply(&BankUpdate::Entry {
            index: 5,
            update: EntryUpdate::Selected(true),
        }));
        assert_eq!(std::mem::take(&mut *seen.lock().unwrap()), vec![(2, false), (5, true)]);
        assert_eq!(f.bank.selected_position(), Some(13));

        // Deselect of an entry that is not the selection is not a change
        f.bank.apply(&BankUpdate::Entry {
            index: 1,
            update: EntryUpdate::Selected(false),
        });
        assert!(seen.lock().unwrap().is_empty());

        f.bank.apply(&BankUpdate::Entry {
            index: 5,
            update: EntryUpdate::Selected(false),
        });
        assert_eq!(std::mem::take(&mut *seen.lock().unwrap()), vec![(5, false)]);
        assert_eq!(f.bank.selected_position(), None);
    }
}
