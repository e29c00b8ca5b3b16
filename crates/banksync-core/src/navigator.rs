//! Navigation protocol shared by every window
//!
//! [`PageNavigator`] is what button and knob handlers call, and what the
//! display layer reads. Every operation is total: a request that points past
//! the collection, or in a direction the host says is closed, is a no-op.

/// Item/page scrolling and selection over a windowed collection
pub trait PageNavigator {
    fn page_size(&self) -> usize;

    /// Host-reported size of the backing collection
    fn item_count(&self) -> usize;

    /// Absolute offset of the first visible entry
    fn scroll_position(&self) -> usize;

    fn can_scroll_backwards(&self) -> bool;

    fn can_scroll_forwards(&self) -> bool;

    fn can_scroll_page_backwards(&self) -> bool {
        self.can_scroll_backwards()
    }

    fn can_scroll_page_forwards(&self) -> bool {
        self.can_scroll_forwards()
    }

    /// Relative index of the selection, if it is on the visible page
    fn selected_index(&self) -> Option<usize>;

    /// Absolute position of the selection, visible or not
    fn selected_position(&self) -> Option<usize>;

    /// Scroll one item back
    fn scroll_backwards(&mut self);

    /// Scroll one item forward
    fn scroll_forwards(&mut self);

    fn scroll_page_backwards(&mut self);

    fn scroll_page_forwards(&mut self);

    /// Scroll to `position`, page-aligned
    fn scroll_to(&mut self, position: usize) {
        self.scroll_to_aligned(position, true);
    }

    /// Scroll to `position`, optionally rounded down to its page start
    fn scroll_to_aligned(&mut self, position: usize, align_to_page: bool);

    fn select_next_item(&mut self);

    fn select_previous_item(&mut self);

    fn select_next_page(&mut self);

    fn select_previous_page(&mut self);

    /// Select the entity at absolute `position`, scrolling to it if needed
    fn select_item_at_position(&mut self, position: usize);

    /// Toggle host subscriptions for the window and all of its entries
    fn enable_observers(&mut self, enable: bool);
}

/// Forward the read side of [`PageNavigator`] to a field
macro_rules! forward_navigator_reads {
    ($field:ident) => {
        fn page_size(&self) -> usize {
            self.$field.page_size()
        }

        fn item_count(&self) -> usize {
            self.$field.item_count()
        }

        fn scroll_position(&self) -> usize {
            self.$field.scroll_position()
        }

        fn can_scroll_backwards(&self) -> bool {
            self.$field.can_scroll_backwards()
        }

        fn can_scroll_forwards(&self) -> bool {
            self.$field.can_scroll_forwards()
        }

        fn can_scroll_page_backwards(&self) -> bool {
            self.$field.can_scroll_page_backwards()
        }

        fn can_scroll_page_forwards(&self) -> bool {
            self.$field.can_scroll_page_forwards()
        }
    };
}

/// Forward scrolling and positional selection to a field
macro_rules! forward_navigator_scrolling {
    ($field:ident) => {
        fn scroll_backwards(&mut self) {
            self.$field.scroll_backwards()
        }

        fn scroll_forwards(&mut self) {
            self.$field.scroll_forwards()
        }

        fn scroll_page_backwards(&mut self) {
            self.$field.scroll_page_backwards()
        }

        fn scroll_page_forwards(&mut self) {
            self.$field.scroll_page_forwards()
        }

        fn scroll_to_aligned(&mut self, position: usize, align_to_page: bool) {
            self.$field.scroll_to_aligned(position, align_to_page)
        }

        fn select_item_at_position(&mut self, position: usize) {
            self.$field.select_item_at_position(position)
        }
    };
}

/// Forward the selection reads and item/page selection to a field
macro_rules! forward_navigator_selection {
    ($field:ident) => {
        fn selected_index(&self) -> Option<usize> {
            self.$field.selected_index()
        }

        fn selected_position(&self) -> Option<usize> {
            self.$field.selected_position()
        }

        fn select_next_item(&mut self) {
            self.$field.select_next_item()
        }

        fn select_previous_item(&mut self) {
            self.$field.select_previous_item()
        }

        fn select_next_page(&mut self) {
            self.$field.select_next_page()
        }

        fn select_previous_page(&mut self) {
            self.$field.select_previous_page()
        }
    };
}

pub(crate) use forward_navigator_reads;
pub(crate) use forward_navigator_scrolling;
pub(crate) use forward_navigator_selection;

/// Page jump built from repeated flat steps
///
/// Windows whose host scrolls natively page through [`crate::Bank`]. This
/// one is picked at construction by the windows whose host exposes a single
/// cursor and no window over it (parameter pages, the device cursor). Each step is only taken while the
/// caller's bound allows another one, so a jump near the end of the
/// collection stops early instead of issuing requests the host would ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmulatedPaging {
    steps: usize,
}

impl EmulatedPaging {
    pub fn new(steps: usize) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Run up to `steps` flat steps
    ///
    /// `has_more` receives the number of steps already taken and decides
    /// whether another one is possible. Returns the number of steps taken.
    pub fn run(&self, mut has_more: impl FnMut(usize) -> bool, mut step: impl FnMut()) -> usize {
        let mut taken = 0;
        while taken < self.steps && has_more(taken) {
            step();
            taken += 1;
        }
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emulated_paging_takes_full_page() {
        let paging = EmulatedPaging::new(8);
        let mut calls = 0;
        let taken = paging.run(|_| true, || calls += 1);
        assert_eq!(taken, 8);
        assert_eq!(calls, 8);
    }

    #[test]
    fn test_emulated_paging_stops_at_bound() {
        // Cursor at 17 of 20: only two more steps exist
        let paging = EmulatedPaging::new(8);
        let position = 17;
        let count = 20;
        let mut calls = 0;
        let taken = paging.run(|taken| position + taken + 1 < count, || calls += 1);
        assert_eq!(taken, 2);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_emulated_paging_with_nothing_left() {
        let paging = EmulatedPaging::new(4);
        let mut calls = 0;
        assert_eq!(paging.run(|_| false, || calls += 1), 0);
        assert_eq!(calls, 0);
    }
}
