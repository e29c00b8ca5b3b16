//! Remote-control parameters and their pages
//!
//! The host has no window over parameter pages, only a flat selected page
//! index plus the list of page names. [`ParameterPageBank`] presents that as
//! a window of `page_size` page names; its page jumps are emulated with
//! repeated flat page moves. [`ParameterBank`] is the window over the
//! parameters of the selected page.
//!
//! ```text
//! page names:  A B C D | E F G H | I J      page_size = 4, selected page = F (5)
//! pages window:          E F G H            scroll_position = 4
//! parameter window:      params of F        scroll_position = 5 × num_params
//! ```

use crate::entry::{Entry, ParameterAttrs};
use crate::host::{BankUpdate, CursorUpdate, HostRemoteControls};
use crate::navigator::{EmulatedPaging, PageNavigator};
use crate::types::WindowId;
use crate::window::Window;

/// Window of parameter page names over the remote-controls page cursor
pub struct ParameterPageBank {
    id: WindowId,
    page_size: usize,
    names: Vec<String>,
    selected: usize,
    has_previous: bool,
    has_next: bool,
    remote: Box<dyn HostRemoteControls>,
    paging: EmulatedPaging,
}

impl std::fmt::Debug for ParameterPageBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterPageBank")
            .field("id", &self.id)
            .field("page_size", &self.page_size)
            .field("names", &self.names)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl ParameterPageBank {
    pub fn new(id: WindowId, page_size: usize, remote: Box<dyn HostRemoteControls>) -> Self {
        Self {
            id,
            page_size,
            names: Vec::new(),
            selected: 0,
            has_previous: false,
            has_next: false,
            remote,
            paging: EmulatedPaging::new(page_size),
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn page_names(&self) -> &[String] {
        &self.names
    }

    /// Index of the selected page in the full page list
    pub fn selected_page(&self) -> usize {
        self.selected
    }

    pub fn has_previous(&self) -> bool {
        self.has_previous
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    /// Page name at relative `index`, empty past the end of the list
    pub fn item(&self, index: usize) -> &str {
        self.names
            .get(self.scroll_position() + index)
            .map_or("", String::as_str)
    }

    /// Name of the selected page, empty if there is none
    pub fn selected_item(&self) -> &str {
        self.names.get(self.selected).map_or("", String::as_str)
    }

    /// Relative index of the selected page within its page group
    pub fn selected_item_index(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.selected % self.page_size
    }

    /// Select the page at relative `index` of the visible group
    pub fn select_page(&mut self, index: usize) {
        let position = self.scroll_position() + index;
        self.scroll_to(position);
    }

    /// Absolute position of the last visible page, if any is visible
    pub fn position_of_last_item(&self) -> Option<usize> {
        (self.scroll_position() + self.page_size)
            .min(self.names.len())
            .checked_sub(1)
    }

    pub(crate) fn remote_mut(&mut self) -> &mut dyn HostRemoteControls {
        self.remote.as_mut()
    }

    fn set_selected_page(&mut self, index: usize) {
        if self.names.is_empty() {
            log::debug!("Bank pages: no parameter pages");
            return;
        }
        let index = index.min(self.names.len() - 1);
        self.remote.set_selected_page(index);
    }

    pub(crate) fn apply(&mut self, update: &BankUpdate) -> bool {
        match update {
            BankUpdate::PageNames(names) => self.names.clone_from(names),
            BankUpdate::SelectedPage(index) => self.selected = *index,
            BankUpdate::Cursor(CursorUpdate::HasPrevious(v)) => self.has_previous = *v,
            BankUpdate::Cursor(CursorUpdate::HasNext(v)) => self.has_next = *v,
            _ => return false,
        }
        true
    }
}

impl PageNavigator for ParameterPageBank {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn item_count(&self) -> usize {
        self.names.len()
    }

    fn scroll_position(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.selected / self.page_size * self.page_size
    }

    fn can_scroll_backwards(&self) -> bool {
        self.can_scroll_page_backwards()
    }

    fn can_scroll_forwards(&self) -> bool {
        self.selected + 1 < self.names.len()
    }

    fn can_scroll_page_backwards(&self) -> bool {
        self.selected > 0
    }

    fn can_scroll_page_forwards(&self) -> bool {
        self.scroll_position() + self.page_size < self.names.len()
    }

    /// Pages have no selection of their own besides the selected page
    fn selected_index(&self) -> Option<usize> {
        (!self.names.is_empty()).then(|| self.selected_item_index())
    }

    fn selected_position(&self) -> Option<usize> {
        (self.selected < self.names.len()).then_some(self.selected)
    }

    fn scroll_backwards(&mut self) {
        self.set_selected_page(self.selected.saturating_sub(1));
    }

    fn scroll_forwards(&mut self) {
        self.set_selected_page(self.selected + 1);
    }

    fn scroll_page_backwards(&mut self) {
        self.select_previous_page();
    }

    fn scroll_page_forwards(&mut self) {
        self.select_next_page();
    }

    /// Clamped to the page list
    fn scroll_to(&mut self, position: usize) {
        self.set_selected_page(position);
    }

    fn scroll_to_aligned(&mut self, _position: usize, _align_to_page: bool) {}

    fn select_next_item(&mut self) {}

    fn select_previous_item(&mut self) {}

    fn select_next_page(&mut self) {
        let selected = self.selected;
        let count = self.names.len();
        let remote = &mut self.remote;
        self.paging.run(
            |taken| selected + taken + 1 < count,
            || remote.select_next_page(false),
        );
    }

    fn select_previous_page(&mut self) {
        let selected = self.selected;
        let remote = &mut self.remote;
        self.paging
            .run(|taken| taken < selected, || remote.select_previous_page(false));
    }

    fn select_item_at_position(&mut self, _position: usize) {}

    fn enable_observers(&mut self, enable: bool) {
        self.remote.set_subscribed(enable);
    }
}

/// Window over the parameters of the selected remote-controls page
pub struct ParameterBank {
    window: Window<ParameterAttrs>,
    pages: ParameterPageBank,
}

impl std::fmt::Debug for ParameterBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterBank")
            .field("window", &self.window)
            .field("pages", &self.pages)
            .finish()
    }
}

impl ParameterBank {
    pub fn new(id: WindowId, num_params: usize, pages: ParameterPageBank) -> Self {
        Self {
            window: Window::new(id, num_params),
            pages,
        }
    }

    pub fn id(&self) -> WindowId {
        self.window.id()
    }

    pub fn page_bank(&self) -> &ParameterPageBank {
        &self.pages
    }

    pub fn page_bank_mut(&mut self) -> &mut ParameterPageBank {
        &mut self.pages
    }

    pub fn item(&self, index: usize) -> &Entry<ParameterAttrs> {
        self.window.entry_at(index)
    }

    pub fn items(&self) -> &[Entry<ParameterAttrs>] {
        self.window.entries()
    }

    pub(crate) fn owns(&self, window: WindowId) -> bool {
        window == self.window.id() || window == self.pages.id()
    }

    /// Apply an update for either the parameter or the page window
    pub(crate) fn apply(&mut self, window: WindowId, update: &BankUpdate) -> bool {
        if window == self.pages.id() {
            return self.pages.apply(update);
        }
        if window != self.window.id() {
            return false;
        }
        match update {
            BankUpdate::Cursor(_) | BankUpdate::PageNames(_) | BankUpdate::SelectedPage(_) => {
                self.pages.apply(update)
            }
            other => self.window.apply(other),
        }
    }
}

impl PageNavigator for ParameterBank {
    fn page_size(&self) -> usize {
        self.window.page_size()
    }

    /// Every page holds a full window of parameters
    fn item_count(&self) -> usize {
        self.pages.item_count() * self.window.page_size()
    }

    fn scroll_position(&self) -> usize {
        self.pages.selected_page() * self.window.page_size()
    }

    fn can_scroll_backwards(&self) -> bool {
        self.pages.has_previous()
    }

    fn can_scroll_forwards(&self) -> bool {
        self.pages.has_next()
    }

    fn can_scroll_page_backwards(&self) -> bool {
        self.pages.has_previous()
    }

    fn can_scroll_page_forwards(&self) -> bool {
        self.pages.has_next()
    }

    fn selected_index(&self) -> Option<usize> {
        None
    }

    fn selected_position(&self) -> Option<usize> {
        None
    }

    /// Previous page, wrapping around
    fn scroll_backwards(&mut self) {
        self.pages.remote_mut().select_previous_page(true);
    }

    /// Next page, wrapping around
    fn scroll_forwards(&mut self) {
        self.pages.remote_mut().select_next_page(true);
    }

    fn scroll_page_backwards(&mut self) {
        self.select_previous_page();
    }

    fn scroll_page_forwards(&mut self) {
        self.select_next_page();
    }

    /// `position` is a page index, clamped to the page list
    fn scroll_to(&mut self, position: usize) {
        self.pages.set_selected_page(position);
    }

    fn scroll_to_aligned(&mut self, _position: usize, _align_to_page: bool) {}

    fn select_next_item(&mut self) {
        self.pages.remote_mut().select_next();
    }

    fn select_previous_item(&mut self) {
        self.pages.remote_mut().select_previous();
    }

    fn select_next_page(&mut self) {
        self.pages.remote_mut().select_next_page(false);
    }

    fn select_previous_page(&mut self) {
        self.pages.remote_mut().select_previous_page(false);
    }

    fn select_item_at_position(&mut self, _position: usize) {}

    fn enable_observers(&mut self, enable: bool) {
        self.window.enable_observers(enable);
        self.pages.enable_observers(enable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Remote {
        NextPage(bool),
        PreviousPage(bool),
        SetPage(usize),
        Next,
        Previous,
        Subscribed(bool),
    }

    #[derive(Clone, Default)]
    struct RemoteLog(Arc<Mutex<Vec<Remote>>>);

    impl RemoteLog {
        fn take(&self) -> Vec<Remote> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    impl HostRemoteControls for RemoteLog {
        fn select_next_page(&mut self, cycle: bool) {
            self.0.lock().unwrap().push(Remote::NextPage(cycle));
        }
        fn select_previous_page(&mut self, cycle: bool) {
            self.0.lock().unwrap().push(Remote::PreviousPage(cycle));
        }
        fn set_selected_page(&mut self, index: usize) {
            self.0.lock().unwrap().push(Remote::SetPage(index));
        }
        fn select_next(&mut self) {
            self.0.lock().unwrap().push(Remote::Next);
        }
        fn select_previous(&mut self) {
            self.0.lock().unwrap().push(Remote::Previous);
        }
        fn set_subscribed(&mut self, enable: bool) {
            self.0.lock().unwrap().push(Remote::Subscribed(enable));
        }
    }

    fn pages(page_size: usize, names: &[&str], selected: usize) -> (ParameterPageBank, RemoteLog) {
        let log = RemoteLog::default();
        let mut pages = ParameterPageBank::new(WindowId::next(), page_size, Box::new(log.clone()));
        pages.apply(&BankUpdate::PageNames(names.iter().map(|n| n.to_string()).collect()));
        pages.apply(&BankUpdate::SelectedPage(selected));
        (pages, log)
    }

    const NAMES: [&str; 10] = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"];

    #[test]
    fn test_page_window_follows_selected_page() {
        let (pages, _) = pages(4, &NAMES, 5);
        assert_eq!(pages.scroll_position(), 4);
        assert_eq!(pages.item(0), "E");
        assert_eq!(pages.item(3), "H");
        assert_eq!(pages.selected_item(), "F");
        assert_eq!(pages.selected_item_index(), 1);
        assert_eq!(pages.position_of_last_item(), Some(7));

        let (last, _) = self::pages(4, &NAMES, 9);
        assert_eq!(last.item(1), "J");
        assert_eq!(last.item(2), "");
        assert_eq!(last.position_of_last_item(), Some(9));
        assert!(!last.can_scroll_page_forwards());
        assert!(!last.can_scroll_forwards());
    }

    #[test]
    fn test_empty_page_list() {
        let (mut pages, log) = pages(4, &[], 0);
        assert_eq!(pages.item(0), "");
        assert_eq!(pages.selected_item(), "");
        assert_eq!(pages.position_of_last_item(), None);
        assert_eq!(pages.selected_index(), None);
        pages.scroll_forwards();
        pages.scroll_to(3);
        assert!(log.take().is_empty());
    }

    #[test]
    fn test_item_scroll_is_clamped() {
        let (mut pages, log) = pages(4, &NAMES, 0);
        assert!(!pages.can_scroll_backwards());
        pages.scroll_backwards();
        pages.scroll_forwards();
        pages.scroll_to(42);
        pages.select_page(2);
        assert_eq!(
            log.take(),
            vec![Remote::SetPage(0), Remote::SetPage(1), Remote::SetPage(9), Remote::SetPage(2)]
        );
    }

    #[test]
    fn test_emulated_page_jump() {
        let (mut pages, log) = pages(4, &NAMES, 1);
        pages.select_next_page();
        assert_eq!(log.take(), vec![Remote::NextPage(false); 4]);

        // Only two pages after H
        pages.apply(&BankUpdate::SelectedPage(7));
        pages.select_next_page();
        assert_eq!(log.take(), vec![Remote::NextPage(false); 2]);

        pages.apply(&BankUpdate::SelectedPage(2));
        pages.select_previous_page();
        assert_eq!(log.take(), vec![Remote::PreviousPage(false); 2]);
    }

    #[test]
    fn test_pages_have_no_item_selection() {
        let (mut pages, log) = pages(4, &NAMES, 1);
        pages.select_next_item();
        pages.select_previous_item();
        pages.select_item_at_position(3);
        assert!(log.take().is_empty());
    }

    fn parameters() -> (ParameterBank, RemoteLog) {
        let (pages, log) = pages(4, &NAMES, 2);
        (ParameterBank::new(WindowId::next(), 8, pages), log)
    }

    #[test]
    fn test_parameter_window_geometry() {
        let (mut params, _) = parameters();
        assert_eq!(params.item_count(), 80);
        assert_eq!(params.scroll_position(), 16);
        assert!(!params.can_scroll_page_forwards());

        let pages_id = params.page_bank().id();
        params.apply(pages_id, &BankUpdate::Cursor(CursorUpdate::HasNext(true)));
        assert!(params.can_scroll_page_forwards());
        assert!(!params.can_scroll_page_backwards());
    }

    #[test]
    fn test_parameter_navigation_drives_remote() {
        let (mut params, log) = parameters();
        params.scroll_forwards();
        params.scroll_backwards();
        params.select_next_page();
        params.select_previous_page();
        params.select_next_item();
        params.select_previous_item();
        params.scroll_to(30);
        assert_eq!(
            log.take(),
            vec![
                Remote::NextPage(true),
                Remote::PreviousPage(true),
                Remote::NextPage(false),
                Remote::PreviousPage(false),
                Remote::Next,
                Remote::Previous,
                Remote::SetPage(9),
            ]
        );
    }

    #[test]
    fn test_parameter_values_reach_entries() {
        let (mut params, _) = parameters();
        let id = params.id();
        assert!(params.apply(
            id,
            &BankUpdate::Entry {
                index: 2,
                update: crate::host::EntryUpdate::Attribute(crate::host::AttributeUpdate::Value(0.5)),
            }
        ));
        assert_eq!(params.item(2).attrs().value, 0.5);
        assert!(!params.apply(WindowId::next(), &BankUpdate::ItemCount(1)));
    }

    #[test]
    fn test_enable_observers_reaches_remote() {
        let (mut params, log) = parameters();
        params.enable_observers(false);
        assert_eq!(log.take(), vec![Remote::Subscribed(false)]);
        assert!(params.items().iter().all(|e| !e.is_observed()));
    }
}
