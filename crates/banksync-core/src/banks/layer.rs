//! Device layer / drum pad window
//!
//! Scroll availability comes from the host's layer cursor rather than from
//! the page's item-count arithmetic; a layer cursor knows about layers the
//! page never reports a count for.

use crate::bank::Bank;
use crate::entry::{Entry, LayerAttrs};
use crate::host::{BankUpdate, HostCursor};
use crate::navigator::{forward_navigator_reads, forward_navigator_scrolling, forward_navigator_selection};
use crate::navigator::PageNavigator;
use crate::scheduler::FollowUp;
use crate::types::{Color, WindowId};

/// Window over the layers of the cursor device
pub struct LayerBank {
    /// Built with cursor scroll bounds
    bank: Bank<LayerAttrs>,
    cursor: Box<dyn HostCursor>,
}

impl std::fmt::Debug for LayerBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerBank").field("bank", &self.bank).finish_non_exhaustive()
    }
}

impl LayerBank {
    pub fn new(bank: Bank<LayerAttrs>, cursor: Box<dyn HostCursor>) -> Self {
        Self {
            bank: bank.with_cursor_bounds(),
            cursor,
        }
    }

    pub fn id(&self) -> WindowId {
        self.bank.id()
    }

    pub fn item(&self, index: usize) -> &Entry<LayerAttrs> {
        self.bank.item(index)
    }

    pub fn items(&self) -> &[Entry<LayerAttrs>] {
        self.bank.items()
    }

    pub fn selected_item(&self) -> Option<&Entry<LayerAttrs>> {
        self.bank.selected_item()
    }

    pub fn select(&mut self, index: usize) {
        self.bank.select(index);
    }

    /// True if no entry of the page exists
    pub fn has_zero_layers(&self) -> bool {
        !self.items().iter().any(Entry::does_exist)
    }

    /// Color of the selected layer, off if nothing visible is selected
    pub fn selected_color(&self) -> Color {
        self.selected_item().map(Entry::color).unwrap_or_default()
    }

    pub(crate) fn apply(&mut self, update: &BankUpdate) -> bool {
        self.bank.apply(update)
    }

    pub(crate) fn run_follow_up(&mut self, follow_up: &FollowUp) -> bool {
        self.bank.run_follow_up(follow_up)
    }
}

impl PageNavigator for LayerBank {
    forward_navigator_reads!(bank);
    forward_navigator_scrolling!(bank);
    forward_navigator_selection!(bank);

    fn enable_observers(&mut self, enable: bool) {
        self.bank.enable_observers(enable);
        self.cursor.set_subscribed(enable);
    }
}
