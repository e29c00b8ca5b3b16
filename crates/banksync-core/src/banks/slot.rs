//! Clip launcher slots of one track

use crate::bank::Bank;
use crate::entry::{Entry, SlotAttrs};
use crate::host::{BankUpdate, HostSlots};
use crate::navigator::{forward_navigator_reads, forward_navigator_scrolling, forward_navigator_selection};
use crate::navigator::PageNavigator;
use crate::scheduler::{FollowUp, FollowUpScheduler};
use crate::types::WindowId;
use std::time::Duration;

/// Slot window attached to the track shown at `track_index` of a track window
///
/// The slot window is re-pointed together with its track entry: when the
/// track window scrolls, the host reports the new track's slots here.
pub struct SlotBank {
    bank: Bank<SlotAttrs, dyn HostSlots>,
    track_index: usize,
}

impl std::fmt::Debug for SlotBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotBank")
            .field("track_index", &self.track_index)
            .field("bank", &self.bank)
            .finish()
    }
}

impl SlotBank {
    pub fn new(
        id: WindowId,
        track_index: usize,
        num_scenes: usize,
        host: Box<dyn HostSlots>,
        scheduler: FollowUpScheduler,
        boundary_delay: Duration,
    ) -> Self {
        Self {
            bank: Bank::new("slots", id, num_scenes, host, scheduler).with_boundary_delay(boundary_delay),
            track_index,
        }
    }

    pub fn id(&self) -> WindowId {
        self.bank.id()
    }

    /// Index of the owning track entry within its track window
    pub fn track_index(&self) -> usize {
        self.track_index
    }

    pub fn item(&self, index: usize) -> &Entry<SlotAttrs> {
        self.bank.item(index)
    }

    pub fn items(&self) -> &[Entry<SlotAttrs>] {
        self.bank.items()
    }

    pub fn selected_item(&self) -> Option<&Entry<SlotAttrs>> {
        self.bank.selected_item()
    }

    pub fn select(&mut self, index: usize) {
        self.bank.select(index);
    }

    /// First slot without content, scanning circularly from `start_from`
    ///
    /// Re-evaluated on every call; content changes between calls.
    pub fn get_empty_slot(&self, start_from: usize) -> Option<&Entry<SlotAttrs>> {
        let size = self.bank.page_size();
        if size == 0 {
            return None;
        }
        let start = start_from % size;
        (0..size)
            .map(|i| self.bank.item((start + i) % size))
            .find(|slot| !slot.attrs().has_content)
    }

    /// True if any slot of the page is recording
    pub fn is_recording(&self) -> bool {
        self.items().iter().any(|slot| slot.attrs().is_recording)
    }

    fn on_page(&self, index: usize, action: &str) -> bool {
        let ok = index < self.bank.page_size();
        if !ok {
            log::debug!(
                "Bank slots: {} ignored, index {} outside page of {}",
                action,
                index,
                self.bank.page_size()
            );
        }
        ok
    }

    pub fn launch(&mut self, index: usize) {
        if self.on_page(index, "launch") {
            self.bank.host_mut().launch(index);
        }
    }

    pub fn record(&mut self, index: usize) {
        if self.on_page(index, "record") {
            self.bank.host_mut().record(index);
        }
    }

    /// Create an empty clip of `length` beats
    pub fn create(&mut self, index: usize, length: u32) {
        if self.on_page(index, "create") {
            self.bank.host_mut().create(index, length);
        }
    }

    pub fn remove(&mut self, index: usize) {
        if self.on_page(index, "remove") {
            self.bank.host_mut().remove(index);
        }
    }

    pub fn duplicate(&mut self, index: usize) {
        if self.on_page(index, "duplicate") {
            self.bank.host_mut().duplicate(index);
        }
    }

    /// Open the host browser to fill the slot
    pub fn browse(&mut self, index: usize) {
        if self.on_page(index, "browse") {
            self.bank.host_mut().browse(index);
        }
    }

    pub(crate) fn apply(&mut self, update: &BankUpdate) -> bool {
        self.bank.apply(update)
    }

    pub(crate) fn run_follow_up(&mut self, follow_up: &FollowUp) -> bool {
        self.bank.run_follow_up(follow_up)
    }
}

impl PageNavigator for SlotBank {
    forward_navigator_reads!(bank);
    forward_navigator_scrolling!(bank);
    forward_navigator_selection!(bank);

    fn enable_observers(&mut self, enable: bool) {
        self.bank.enable_observers(enable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{AttributeUpdate, EntryUpdate, HostCollection};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn push(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }
    }

    impl HostCollection for Recorder {
        fn scroll_backwards(&mut self) {}
        fn scroll_forwards(&mut self) {}
        fn scroll_page_backwards(&mut self) {}
        fn scroll_page_forwards(&mut self) {}
        fn scroll_to(&mut self, _position: usize) {}
        fn select(&mut self, index: usize) {
            self.push(format!("select {}", index));
        }
        fn set_subscribed(&mut self, _enable: bool) {}
    }

    impl HostSlots for Recorder {
        fn launch(&mut self, index: usize) {
            self.push(format!("launch {}", index));
        }
        fn record(&mut self, index: usize) {
            self.push(format!("record {}", index));
        }
        fn create(&mut self, index: usize, length: u32) {
            self.push(format!("create {} {}", index, length));
        }
        fn remove(&mut self, index: usize) {
            self.push(format!("remove {}", index));
        }
        fn duplicate(&mut self, index: usize) {
            self.push(format!("duplicate {}", index));
        }
        fn browse(&mut self, index: usize) {
            self.push(format!("browse {}", index));
        }
    }

    fn slots(content: &[bool]) -> (SlotBank, Recorder) {
        let recorder = Recorder::default();
        let mut bank = SlotBank::new(
            WindowId::next(),
            0,
            content.len(),
            Box::new(recorder.clone()),
            FollowUpScheduler::system(),
            Duration::from_millis(75),
        );
        bank.apply(&BankUpdate::ItemCount(content.len()));
        for (index, has_content) in content.iter().enumerate() {
            bank.apply(&BankUpdate::Entry {
                index,
                update: EntryUpdate::Exists(true),
            });
            bank.apply(&BankUpdate::Entry {
                index,
                update: EntryUpdate::Attribute(AttributeUpdate::HasContent(*has_content)),
            });
        }
        (bank, recorder)
    }

    #[test]
    fn test_empty_slot_circular_scan() {
        let (bank, _) = slots(&[true, false, true, false]);
        assert_eq!(bank.get_empty_slot(0).map(|s| s.index()), Some(1));
        assert_eq!(bank.get_empty_slot(2).map(|s| s.index()), Some(3));
        assert_eq!(bank.get_empty_slot(3).map(|s| s.index()), Some(3));
    }

    #[test]
    fn test_single_empty_slot_found_from_anywhere() {
        let (bank, _) = slots(&[true, true, false, true, true]);
        for start in 0..10 {
            assert_eq!(bank.get_empty_slot(start).map(|s| s.index()), Some(2));
        }
    }

    #[test]
    fn test_empty_slot_scan_from_largest_start() {
        let (bank, _) = slots(&[true, true, false, true]);
        // usize::MAX % 4 == 3, so the scan wraps from slot 3 to slot 2
        assert_eq!(bank.get_empty_slot(usize::MAX).map(|s| s.index()), Some(2));
        assert_eq!(bank.get_empty_slot(usize::MAX - 1).map(|s| s.index()), Some(2));
    }

    #[test]
    fn test_full_page_has_no_empty_slot() {
        let (bank, _) = slots(&[true, true, true, true]);
        assert!(bank.get_empty_slot(0).is_none());

        let (empty, _) = slots(&[]);
        assert!(empty.get_empty_slot(0).is_none());
    }

    #[test]
    fn test_slot_commands_reach_host() {
        let (mut bank, recorder) = slots(&[false; 4]);
        bank.launch(1);
        bank.record(2);
        bank.create(0, 4);
        bank.duplicate(3);
        bank.remove(3);
        bank.browse(0);
        // Outside the page
        bank.launch(4);

        assert_eq!(
            recorder.take(),
            vec!["launch 1", "record 2", "create 0 4", "duplicate 3", "remove 3", "browse 0"]
        );
    }

    #[test]
    fn test_is_recording() {
        let (mut bank, _) = slots(&[false; 4]);
        assert!(!bank.is_recording());
        bank.apply(&BankUpdate::Entry {
            index: 2,
            update: EntryUpdate::Attribute(AttributeUpdate::Recording(true)),
        });
        assert!(bank.is_recording());
    }
}
