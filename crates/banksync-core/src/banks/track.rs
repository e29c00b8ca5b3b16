//! Track windows: main tracks and effect tracks
//!
//! Each track entry carries a slot window for its clip launcher slots, and
//! the track window owns the scene window that follows it. Effect tracks are
//! conceptually appended after the main tracks, so the effect window is built
//! with an origin offset equal to the main window's item count:
//!
//! ```text
//! main tracks:    0 .. 15
//! effect tracks:  16 17 18 ...        effect.scroll_to_aligned(20, false) → host.scroll_to(4)
//! ```

use super::scene::SceneBank;
use super::slot::SlotBank;
use crate::bank::Bank;
use crate::entry::{Entry, TrackAttrs};
use crate::host::{BankUpdate, CursorUpdate, HostFactory, HostTrackCursor, TrackBankKind};
use crate::navigator::{forward_navigator_reads, forward_navigator_scrolling, forward_navigator_selection};
use crate::navigator::PageNavigator;
use crate::scheduler::{FollowUp, FollowUpScheduler};
use crate::types::{ItemCountProbe, WindowId};
use std::time::Duration;

/// Page sizes and delays a track window is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackBankLayout {
    pub num_tracks: usize,
    pub num_scenes: usize,
    pub track_page_delay: Duration,
    pub scene_page_delay: Duration,
    pub slot_page_delay: Duration,
    pub group_enter_delay: Duration,
}

/// Window over the main or the effect tracks
pub struct TrackBank {
    kind: TrackBankKind,
    bank: Bank<TrackAttrs>,
    /// One slot window per track entry
    slots: Vec<SlotBank>,
    scenes: SceneBank,
    cursor: Box<dyn HostTrackCursor>,
    has_parent: bool,
    group_enter_delay: Duration,
}

impl std::fmt::Debug for TrackBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackBank")
            .field("kind", &self.kind)
            .field("bank", &self.bank)
            .field("slots", &self.slots.len())
            .field("has_parent", &self.has_parent)
            .finish_non_exhaustive()
    }
}

impl TrackBank {
    /// Build a track window with its slot windows, scene window and cursor
    ///
    /// `origin` offsets external positions; only effect windows get one.
    pub fn create(
        factory: &mut dyn HostFactory,
        kind: TrackBankKind,
        layout: &TrackBankLayout,
        scheduler: &FollowUpScheduler,
        origin: Option<ItemCountProbe>,
    ) -> Self {
        let id = WindowId::next();
        let host = factory.create_track_bank(id, kind, layout.num_tracks);
        let mut bank = Bank::new("tracks", id, layout.num_tracks, host, scheduler.clone())
            .with_boundary_delay(layout.track_page_delay);
        if let Some(origin) = origin {
            bank = bank.with_origin(origin);
        }

        let slots = (0..layout.num_tracks)
            .map(|track_index| {
                let slot_id = WindowId::next();
                let host = factory.create_slot_bank(slot_id, id, track_index, layout.num_scenes);
                SlotBank::new(
                    slot_id,
                    track_index,
                    layout.num_scenes,
                    host,
                    scheduler.clone(),
                    layout.slot_page_delay,
                )
            })
            .collect();

        let scene_id = WindowId::next();
        let scenes = Bank::new(
            "scenes",
            scene_id,
            layout.num_scenes,
            factory.create_scene_bank(scene_id, layout.num_scenes),
            scheduler.clone(),
        )
        .with_boundary_delay(layout.scene_page_delay);

        let cursor = factory.create_track_cursor(id);
        log::debug!(
            "Bank tracks: {:?} window {} with {} tracks × {} scenes",
            kind,
            id,
            layout.num_tracks,
            layout.num_scenes
        );

        Self {
            kind,
            bank,
            slots,
            scenes,
            cursor,
            has_parent: false,
            group_enter_delay: layout.group_enter_delay,
        }
    }

    /// Build directly from parts
    pub fn from_parts(
        kind: TrackBankKind,
        bank: Bank<TrackAttrs>,
        slots: Vec<SlotBank>,
        scenes: SceneBank,
        cursor: Box<dyn HostTrackCursor>,
        group_enter_delay: Duration,
    ) -> Self {
        Self {
            kind,
            bank,
            slots,
            scenes,
            cursor,
            has_parent: false,
            group_enter_delay,
        }
    }

    pub fn kind(&self) -> TrackBankKind {
        self.kind
    }

    pub fn id(&self) -> WindowId {
        self.bank.id()
    }

    pub fn bank(&self) -> &Bank<TrackAttrs> {
        &self.bank
    }

    /// Published item count, used as the effect window's origin
    pub fn item_count_probe(&mut self) -> ItemCountProbe {
        self.bank.window_mut().item_count_probe()
    }

    /// Item count of the window this one is appended to
    pub fn origin_offset(&self) -> usize {
        self.bank.origin_offset()
    }

    pub fn item(&self, index: usize) -> &Entry<TrackAttrs> {
        self.bank.item(index)
    }

    pub fn items(&self) -> &[Entry<TrackAttrs>] {
        self.bank.items()
    }

    pub fn selected_item(&self) -> Option<&Entry<TrackAttrs>> {
        self.bank.selected_item()
    }

    pub fn select(&mut self, index: usize) {
        self.bank.select(index);
    }

    /// Slot window of the track at relative `index`
    pub fn slot_bank(&self, index: usize) -> Option<&SlotBank> {
        self.slots.get(index)
    }

    pub fn slot_bank_mut(&mut self, index: usize) -> Option<&mut SlotBank> {
        self.slots.get_mut(index)
    }

    pub fn scene_bank(&self) -> &SceneBank {
        &self.scenes
    }

    pub fn scene_bank_mut(&mut self) -> &mut SceneBank {
        &mut self.scenes
    }

    /// True if the cursor track sits inside a group
    pub fn has_parent(&self) -> bool {
        match self.kind {
            TrackBankKind::Main => self.has_parent,
            TrackBankKind::Effect => false,
        }
    }

    /// Move the track cursor up to the enclosing group
    pub fn select_parent(&mut self) {
        match self.kind {
            TrackBankKind::Main => self.cursor.select_parent(),
            TrackBankKind::Effect => log::debug!("Bank tracks: effect tracks are flat"),
        }
    }

    /// Enter the group track at relative `index`
    ///
    /// An already selected group is entered right away; otherwise the track is
    /// selected first and entered once the host moved its cursor there.
    pub fn enter_group(&mut self, index: usize) {
        if index >= self.bank.page_size() {
            return;
        }
        let track = self.bank.item(index);
        if !track.does_exist() || !track.attrs().is_group {
            log::debug!("Bank tracks: track {} is not a group", index);
            return;
        }
        if self.bank.selected_index() == Some(index) {
            self.cursor.select_first_child();
            return;
        }
        self.bank.select(index);
        self.bank
            .scheduler()
            .schedule(self.bank.id(), self.group_enter_delay, FollowUp::EnterGroup);
    }

    /// True if any slot of the visible tracks is recording
    pub fn is_clip_recording(&self) -> bool {
        self.slots.iter().any(SlotBank::is_recording)
    }

    /// True if `window` is this track window, its scene window or a slot window
    pub(crate) fn owns(&self, window: WindowId) -> bool {
        window == self.bank.id()
            || window == self.scenes.id()
            || self.slots.iter().any(|s| s.id() == window)
    }

    /// Apply a host update if it belongs to one of this window's windows
    pub(crate) fn apply(&mut self, window: WindowId, update: &BankUpdate) -> bool {
        if window == self.bank.id() {
            if let BankUpdate::Cursor(CursorUpdate::HasParent(v)) = update {
                self.has_parent = *v;
                return true;
            }
            return self.bank.apply(update);
        }
        if window == self.scenes.id() {
            return self.scenes.apply(update);
        }
        match self.slots.iter_mut().find(|s| s.id() == window) {
            Some(slots) => slots.apply(update),
            None => false,
        }
    }

    /// Run a due follow-up if it is addressed to one of this window's windows
    pub(crate) fn run_follow_up(&mut self, window: WindowId, follow_up: &FollowUp) -> bool {
        if window == self.bank.id() {
            return match follow_up {
                FollowUp::EnterGroup => {
                    self.cursor.select_first_child();
                    true
                }
                other => self.bank.run_follow_up(other),
            };
        }
        if window == self.scenes.id() {
            return self.scenes.run_follow_up(follow_up);
        }
        match self.slots.iter_mut().find(|s| s.id() == window) {
            Some(slots) => slots.run_follow_up(follow_up),
            None => false,
        }
    }
}

impl PageNavigator for TrackBank {
    forward_navigator_reads!(bank);
    forward_navigator_scrolling!(bank);
    forward_navigator_selection!(bank);

    fn enable_observers(&mut self, enable: bool) {
        self.bank.enable_observers(enable);
        self.cursor.set_subscribed(enable);
        self.scenes.enable_observers(enable);
        for slots in &mut self.slots {
            slots.enable_observers(enable);
        }
    }
}
