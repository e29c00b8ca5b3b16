//! Selection tracking across page boundaries
//!
//! The tracker stores the selection as an absolute collection position, so a
//! selection survives the window scrolling away from it and back. Whether the
//! selected entity is visible is derived on demand from the window's current
//! scroll offset.
//!
//! Two sources mutate it:
//! - explicit local selects issued by navigation
//! - host notifications, which are authoritative and override local state

/// Callback for local selection changes: `(relative index, is_selected)`
pub type SelectionObserver = Box<dyn FnMut(usize, bool) + Send>;

/// Absolute selection of one window
#[derive(Default)]
pub struct SelectionTracker {
    /// Selected absolute position, if any
    selected: Option<usize>,
    observers: Vec<SelectionObserver>,
}

impl std::fmt::Debug for SelectionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionTracker")
            .field("selected", &self.selected)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected absolute position
    pub fn selected_position(&self) -> Option<usize> {
        self.selected
    }

    /// Relative index of the selection within a page, if visible
    pub fn selected_index(&self, scroll_position: usize, page_size: usize) -> Option<usize> {
        let offset = self.selected?.checked_sub(scroll_position)?;
        (offset < page_size).then_some(offset)
    }

    /// Register a listener for selection changes of visible entries
    ///
    /// Listeners run synchronously in the call that changed the selection.
    pub fn add_observer(&mut self, observer: SelectionObserver) {
        self.observers.push(observer);
    }

    /// Record a local select of absolute `position`
    ///
    /// Returns true if the selection changed.
    pub fn select(&mut self, position: usize, scroll_position: usize, page_size: usize) -> bool {
        self.move_to(Some(position), scroll_position, page_size)
    }

    /// Apply a host selection notification for relative `index`
    ///
    /// A deselect only clears the selection if it refers to the currently
    /// selected position; the host also deselects entries that were merely
    /// re-pointed by a scroll.
    pub fn apply_host(
        &mut self,
        index: usize,
        is_selected: bool,
        scroll_position: usize,
        page_size: usize,
    ) -> bool {
        let position = scroll_position + index;
        if is_selected {
            return self.move_to(Some(position), scroll_position, page_size);
        }
        if self.selected == Some(position) {
            return self.move_to(None, scroll_position, page_size);
        }
        false
    }

    /// Drop the selection
    pub fn clear(&mut self, scroll_position: usize, page_size: usize) -> bool {
        self.move_to(None, scroll_position, page_size)
    }

    fn move_to(&mut self, next: Option<usize>, scroll_position: usize, page_size: usize) -> bool {
        if self.selected == next {
            return false;
        }
        let previous_index = self.selected_index(scroll_position, page_size);
        self.selected = next;
        let next_index = self.selected_index(scroll_position, page_size);

        if let Some(index) = previous_index {
            self.notify(index, false);
        }
        if let Some(index) = next_index {
            self.notify(index, true);
        }
        true
    }

    fn notify(&mut self, index: usize, is_selected: bool) {
        for observer in &mut self.observers {
            observer(index, is_selected);
        }
    }
}
