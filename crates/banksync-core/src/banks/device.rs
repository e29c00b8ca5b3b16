//! Device window driven by the host's device cursor
//!
//! Device selection belongs to the host cursor, not to the page: item moves
//! go straight to the cursor, and a page move is the cursor stepped up to
//! `page_size` times.

use crate::bank::Bank;
use crate::entry::{DeviceAttrs, Entry};
use crate::host::{BankUpdate, CursorUpdate, HostCursor};
use crate::navigator::{forward_navigator_reads, forward_navigator_scrolling};
use crate::navigator::{EmulatedPaging, PageNavigator};
use crate::scheduler::FollowUp;
use crate::types::WindowId;

/// Last state the host reported for its device cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorState {
    pub exists: bool,
    /// Absolute position of the cursor device in the chain
    pub position: Option<usize>,
    pub name: String,
    pub has_previous: bool,
    pub has_next: bool,
}

impl CursorState {
    /// Apply a cursor update; returns false for updates a device cursor lacks
    pub(crate) fn apply(&mut self, update: &CursorUpdate) -> bool {
        match update {
            CursorUpdate::Exists(v) => self.exists = *v,
            CursorUpdate::Position(p) => self.position = *p,
            CursorUpdate::Name(name) => self.name.clone_from(name),
            CursorUpdate::HasPrevious(v) => self.has_previous = *v,
            CursorUpdate::HasNext(v) => self.has_next = *v,
            CursorUpdate::HasParent(_) => return false,
        }
        true
    }
}

/// Window over the devices of the cursor track
pub struct DeviceBank {
    bank: Bank<DeviceAttrs>,
    cursor: Box<dyn HostCursor>,
    state: CursorState,
    paging: EmulatedPaging,
}

impl std::fmt::Debug for DeviceBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBank")
            .field("bank", &self.bank)
            .field("cursor", &self.state)
            .finish_non_exhaustive()
    }
}

impl DeviceBank {
    pub fn new(bank: Bank<DeviceAttrs>, cursor: Box<dyn HostCursor>) -> Self {
        let paging = EmulatedPaging::new(bank.page_size());
        Self {
            bank,
            cursor,
            state: CursorState::default(),
            paging,
        }
    }

    pub fn id(&self) -> WindowId {
        self.bank.id()
    }

    pub fn cursor(&self) -> &CursorState {
        &self.state
    }

    pub fn item(&self, index: usize) -> &Entry<DeviceAttrs> {
        self.bank.item(index)
    }

    pub fn items(&self) -> &[Entry<DeviceAttrs>] {
        self.bank.items()
    }

    /// The cursor device, if the host reports one
    pub fn selected_item(&self) -> Option<&CursorState> {
        self.state.exists.then_some(&self.state)
    }

    /// Selected device entry, if the cursor device is on the visible page
    pub fn selected_entry(&self) -> Option<&Entry<DeviceAttrs>> {
        self.selected_index().map(|i| self.bank.item(i))
    }

    /// Select the device at relative `index` through the page
    pub fn select(&mut self, index: usize) {
        self.bank.select(index);
    }

    pub(crate) fn apply(&mut self, update: &BankUpdate) -> bool {
        match update {
            BankUpdate::Cursor(cursor) => self.state.apply(cursor),
            other => self.bank.apply(other),
        }
    }

    pub(crate) fn run_follow_up(&mut self, follow_up: &FollowUp) -> bool {
        self.bank.run_follow_up(follow_up)
    }
}

impl PageNavigator for DeviceBank {
    forward_navigator_reads!(bank);
    forward_navigator_scrolling!(bank);

    fn selected_index(&self) -> Option<usize> {
        self.bank.window().relative_index(self.state.position?)
    }

    fn selected_position(&self) -> Option<usize> {
        if self.state.exists {
            self.state.position
        } else {
            None
        }
    }

    fn select_next_item(&mut self) {
        self.cursor.select_next();
    }

    fn select_previous_item(&mut self) {
        self.cursor.select_previous();
    }

    fn select_next_page(&mut self) {
        let count = self.bank.item_count();
        let position = self.state.position;
        let has_next = self.state.has_next;
        let cursor = &mut self.cursor;
        let taken = self.paging.run(
            |taken| match position {
                Some(p) => p + taken + 1 < count,
                None => taken == 0 && has_next,
            },
            || cursor.select_next(),
        );
        log::debug!("Bank devices: next page moved cursor {} steps", taken);
    }

    fn select_previous_page(&mut self) {
        let position = self.state.position;
        let has_previous = self.state.has_previous;
        let cursor = &mut self.cursor;
        let taken = self.paging.run(
            |taken| match position {
                Some(p) => taken < p,
                None => taken == 0 && has_previous,
            },
            || cursor.select_previous(),
        );
        log::debug!("Bank devices: previous page moved cursor {} steps", taken);
    }

    fn enable_observers(&mut self, enable: bool) {
        self.bank.enable_observers(enable);
        self.cursor.set_subscribed(enable);
    }
}
