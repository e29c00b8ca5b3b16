//! Owner of every window of one control surface
//!
//! The model builds all windows from a [`ModelSetup`] and a [`HostFactory`],
//! and is the single place where host notifications and due follow-ups are
//! applied:
//!
//! ```text
//! controller event ──► Model / window navigation ──► Host* commands
//!                                  │
//!                                  └─► FollowUpScheduler (page boundaries)
//!
//! Model::pump():  drain HostEvents ──► route by WindowId ──► window state
//!                 take_due()       ──► route by WindowId ──► follow-up
//! ```
//!
//! Everything runs on the caller's thread. `pump()` is expected to be called
//! from the surface's tick, the same way controller input is polled.

use crate::bank::Bank;
use crate::banks::{
    DeviceBank, LayerBank, ParameterBank, ParameterPageBank, SceneBank, SceneBankCache, SlotBank,
    TrackBank,
};
use crate::config::ModelSetup;
use crate::entry::{Entry, SlotAttrs, TrackAttrs};
use crate::error::SetupError;
use crate::host::{HostEvent, HostFactory, TrackBankKind};
use crate::navigator::PageNavigator;
use crate::scheduler::{FollowUp, FollowUpScheduler};
use crate::types::WindowId;
use flume::Receiver;

/// All windows of one surface plus the host plumbing that feeds them
pub struct Model {
    setup: ModelSetup,
    factory: Box<dyn HostFactory>,
    events: Receiver<HostEvent>,
    scheduler: FollowUpScheduler,

    track_bank: TrackBank,
    effect_track_bank: Option<TrackBank>,
    current: TrackBankKind,
    /// Global track position selected before the last track bank toggle
    last_selection: Option<usize>,

    device_bank: DeviceBank,
    layer_bank: LayerBank,
    parameter_bank: ParameterBank,
    scene_banks: SceneBankCache,

    /// Key for the cross-track slot re-selection follow-up
    slot_follow_up: WindowId,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("setup", &self.setup)
            .field("current", &self.current)
            .field("track_bank", &self.track_bank)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Build every window of `setup`
    ///
    /// `events` is the receiving half of the host bridge whose notifier was
    /// handed to the host adapter behind `factory`.
    pub fn new(
        setup: ModelSetup,
        mut factory: Box<dyn HostFactory>,
        events: Receiver<HostEvent>,
        scheduler: FollowUpScheduler,
    ) -> Result<Self, SetupError> {
        setup.validate()?;
        let layout = setup.track_layout();

        let mut track_bank =
            TrackBank::create(factory.as_mut(), TrackBankKind::Main, &layout, &scheduler, None);
        let effect_track_bank = setup.has_effect_tracks.then(|| {
            let origin = track_bank.item_count_probe();
            TrackBank::create(
                factory.as_mut(),
                TrackBankKind::Effect,
                &layout,
                &scheduler,
                Some(origin),
            )
        });

        let devices = WindowId::next();
        let device_host = factory.create_device_bank(devices, setup.num_devices);
        let device_bank = DeviceBank::new(
            Bank::new("devices", devices, setup.num_devices, device_host, scheduler.clone()),
            factory.create_device_cursor(devices),
        );

        let layers = WindowId::next();
        let layer_host = factory.create_layer_bank(layers, setup.num_device_layers);
        let layer_bank = LayerBank::new(
            Bank::new("layers", layers, setup.num_device_layers, layer_host, scheduler.clone())
                .with_boundary_delay(setup.layer_page_delay()),
            factory.create_layer_cursor(layers),
        );

        let params = WindowId::next();
        let pages = WindowId::next();
        let remote = factory.create_remote_controls(params, pages, setup.num_params);
        let parameter_bank = ParameterBank::new(
            params,
            setup.num_params,
            ParameterPageBank::new(pages, setup.num_parameter_pages, remote),
        );

        log::info!(
            "Model: {} tracks × {} scenes{}, {} devices, {} layers, {} params",
            setup.num_tracks,
            setup.num_scenes,
            if setup.has_effect_tracks { " (+ effect tracks)" } else { "" },
            setup.num_devices,
            setup.num_device_layers,
            setup.num_params
        );

        Ok(Self {
            setup,
            factory,
            events,
            scheduler,
            track_bank,
            effect_track_bank,
            current: TrackBankKind::Main,
            last_selection: None,
            device_bank,
            layer_bank,
            parameter_bank,
            scene_banks: SceneBankCache::new(),
            slot_follow_up: WindowId::next(),
        })
    }

    pub fn setup(&self) -> &ModelSetup {
        &self.setup
    }

    pub fn scheduler(&self) -> &FollowUpScheduler {
        &self.scheduler
    }

    /// Apply pending host notifications, then run due follow-ups
    ///
    /// Returns the number of notifications that changed window state.
    pub fn pump(&mut self) -> usize {
        let events: Vec<HostEvent> = self.events.try_iter().collect();
        let applied = events.iter().filter(|event| self.apply_event(event)).count();

        for (window, follow_up) in self.scheduler.take_due() {
            self.run_follow_up(window, &follow_up);
        }
        applied
    }

    fn apply_event(&mut self, event: &HostEvent) -> bool {
        let HostEvent { window, update } = event;
        let window = *window;

        let handled = if self.track_bank.owns(window) {
            self.track_bank.apply(window, update)
        } else if let Some(effects) = self.effect_track_bank.as_mut().filter(|b| b.owns(window)) {
            effects.apply(window, update)
        } else if window == self.device_bank.id() {
            self.device_bank.apply(update)
        } else if window == self.layer_bank.id() {
            self.layer_bank.apply(update)
        } else if self.parameter_bank.owns(window) {
            self.parameter_bank.apply(window, update)
        } else if let Some(scenes) = self.scene_banks.find_mut(window) {
            scenes.apply(update)
        } else {
            log::warn!("Model: notification for unknown window {}: {:?}", window, update);
            return false;
        };

        if !handled {
            log::debug!("Model: window {} ignored {:?}", window, update);
        }
        handled
    }

    fn run_follow_up(&mut self, window: WindowId, follow_up: &FollowUp) {
        if window == self.slot_follow_up {
            if let FollowUp::SelectSlotOfSelectedTrack(index) = follow_up {
                self.select_slot_of_selected_track(*index);
            }
            return;
        }

        let handled = if self.track_bank.owns(window) {
            self.track_bank.run_follow_up(window, follow_up)
        } else if let Some(effects) = self.effect_track_bank.as_mut().filter(|b| b.owns(window)) {
            effects.run_follow_up(window, follow_up)
        } else if window == self.device_bank.id() {
            self.device_bank.run_follow_up(follow_up)
        } else if window == self.layer_bank.id() {
            self.layer_bank.run_follow_up(follow_up)
        } else if let Some(scenes) = self.scene_banks.find_mut(window) {
            scenes.run_follow_up(follow_up)
        } else {
            false
        };
        if !handled {
            log::warn!("Model: dropping {:?} for window {}", follow_up, window);
        }
    }

    pub fn track_bank(&self) -> &TrackBank {
        &self.track_bank
    }

    pub fn track_bank_mut(&mut self) -> &mut TrackBank {
        &mut self.track_bank
    }

    pub fn effect_track_bank(&self) -> Option<&TrackBank> {
        self.effect_track_bank.as_ref()
    }

    pub fn effect_track_bank_mut(&mut self) -> Option<&mut TrackBank> {
        self.effect_track_bank.as_mut()
    }

    pub fn is_effect_track_bank_active(&self) -> bool {
        self.current == TrackBankKind::Effect
    }

    /// Track window the controller currently works on
    pub fn current_track_bank(&self) -> &TrackBank {
        match (self.current, &self.effect_track_bank) {
            (TrackBankKind::Effect, Some(effects)) => effects,
            _ => &self.track_bank,
        }
    }

    pub fn current_track_bank_mut(&mut self) -> &mut TrackBank {
        match (self.current, &mut self.effect_track_bank) {
            (TrackBankKind::Effect, Some(effects)) => effects,
            _ => &mut self.track_bank,
        }
    }

    /// Switch between main and effect tracks
    ///
    /// The bank switched to gets back the selection it had when it was left.
    /// Positions are global: effect tracks count on after the main tracks.
    pub fn toggle_current_track_bank(&mut self) {
        if self.effect_track_bank.is_none() {
            log::debug!("Model: no effect tracks to toggle to");
            return;
        }
        let leaving = self.current_track_bank();
        let selection = leaving
            .selected_position()
            .map(|p| p + leaving.origin_offset());

        self.current = match self.current {
            TrackBankKind::Main => TrackBankKind::Effect,
            TrackBankKind::Effect => TrackBankKind::Main,
        };
        log::debug!("Model: current track bank is now {:?}", self.current);

        if let Some(position) = self.last_selection {
            self.current_track_bank_mut().select_item_at_position(position);
        }
        self.last_selection = selection;
    }

    /// Selected track of the current track bank, if visible
    pub fn selected_track(&self) -> Option<&Entry<TrackAttrs>> {
        self.current_track_bank().selected_item()
    }

    /// Slot window of the track at relative `track_index` of the current bank
    pub fn slot_bank(&self, track_index: usize) -> Option<&SlotBank> {
        self.current_track_bank().slot_bank(track_index)
    }

    pub fn slot_bank_mut(&mut self, track_index: usize) -> Option<&mut SlotBank> {
        self.current_track_bank_mut().slot_bank_mut(track_index)
    }

    /// Selected slot of the selected track
    pub fn selected_slot(&self) -> Option<&Entry<SlotAttrs>> {
        let tracks = self.current_track_bank();
        tracks
            .selected_index()
            .and_then(|i| tracks.slot_bank(i))
            .and_then(SlotBank::selected_item)
    }

    fn selected_slot_index(&self) -> Option<usize> {
        let tracks = self.current_track_bank();
        tracks
            .selected_index()
            .and_then(|i| tracks.slot_bank(i))
            .and_then(|slots| slots.selected_index())
    }

    /// Select the next track and the same slot index on it
    pub fn select_next_track_keep_slot(&mut self) {
        self.move_track_keep_slot(true);
    }

    /// Select the previous track and the same slot index on it
    pub fn select_previous_track_keep_slot(&mut self) {
        self.move_track_keep_slot(false);
    }

    fn move_track_keep_slot(&mut self, forwards: bool) {
        let slot_index = self.selected_slot_index();
        let tracks = self.current_track_bank_mut();
        if forwards {
            tracks.select_next_item();
        } else {
            tracks.select_previous_item();
        }
        let tracks_id = tracks.id();

        let Some(index) = slot_index else {
            return;
        };
        // The slot must wait for the track selection, which may itself wait
        // for a page scroll
        let mut delay = self.setup.slot_reselect_delay();
        if self.scheduler.pending(tracks_id).is_some() {
            delay += self.setup.track_page_delay();
        }
        self.scheduler
            .schedule(self.slot_follow_up, delay, FollowUp::SelectSlotOfSelectedTrack(index));
    }

    fn select_slot_of_selected_track(&mut self, index: usize) {
        let tracks = self.current_track_bank_mut();
        let Some(track) = tracks.selected_index() else {
            log::debug!("Model: no visible selected track for slot {}", index);
            return;
        };
        if let Some(slots) = tracks.slot_bank_mut(track) {
            slots.select(index);
        }
    }

    pub fn device_bank(&self) -> &DeviceBank {
        &self.device_bank
    }

    pub fn device_bank_mut(&mut self) -> &mut DeviceBank {
        &mut self.device_bank
    }

    pub fn layer_bank(&self) -> &LayerBank {
        &self.layer_bank
    }

    pub fn layer_bank_mut(&mut self) -> &mut LayerBank {
        &mut self.layer_bank
    }

    pub fn parameter_bank(&self) -> &ParameterBank {
        &self.parameter_bank
    }

    pub fn parameter_bank_mut(&mut self) -> &mut ParameterBank {
        &mut self.parameter_bank
    }

    pub fn parameter_page_bank(&self) -> &ParameterPageBank {
        self.parameter_bank.page_bank()
    }

    pub fn parameter_page_bank_mut(&mut self) -> &mut ParameterPageBank {
        self.parameter_bank.page_bank_mut()
    }

    /// Scene window of `page_size`, created on first request
    pub fn scene_bank(&mut self, page_size: usize) -> &mut SceneBank {
        let factory = &mut self.factory;
        let scheduler = &self.scheduler;
        let delay = self.setup.track_layout().scene_page_delay;
        self.scene_banks.get_or_create(page_size, |size| {
            let id = WindowId::next();
            Bank::new("scenes", id, size, factory.create_scene_bank(id, size), scheduler.clone())
                .with_boundary_delay(delay)
        })
    }

    /// Toggle host subscriptions of every window and cursor
    pub fn enable_observers(&mut self, enable: bool) {
        log::debug!("Model: observers {}", if enable { "on" } else { "off" });
        self.track_bank.enable_observers(enable);
        if let Some(effects) = &mut self.effect_track_bank {
            effects.enable_observers(enable);
        }
        self.device_bank.enable_observers(enable);
        self.layer_bank.enable_observers(enable);
        self.parameter_bank.enable_observers(enable);
        for scenes in self.scene_banks.iter_mut() {
            scenes.enable_observers(enable);
        }
    }
}
