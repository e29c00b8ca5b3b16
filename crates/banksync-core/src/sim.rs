//! In-process host for tests and offline runs
//!
//! [`SimHost`] owns a small project (tracks, effect tracks, scenes, slots,
//! devices, layers, parameter pages) and behaves like a real host at the
//! boundary: commands change its state right away, but the model only learns
//! about it through [`HostEvent`]s sent over the bridge and applied in
//! `Model::pump()`.
//!
//! ```text
//! window → Host* command → SimWorld (mutates) → HostNotifier → channel → pump
//! ```
//!
//! Every command is also recorded, so tests can assert on what the model
//! asked the host to do.

use crate::host::{
    AttributeUpdate, BankUpdate, CursorUpdate, EntryUpdate, HostCollection, HostCursor, HostEvent,
    HostFactory, HostNotifier, HostRemoteControls, HostSlots, HostTrackCursor, TrackBankKind,
};
use crate::types::WindowId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Project the simulated host starts with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimContent {
    pub tracks: usize,
    pub effect_tracks: usize,
    pub scenes: usize,
    pub devices: usize,
    pub layers: usize,
    pub parameter_pages: Vec<String>,
    /// Main track positions that are groups
    pub groups: Vec<usize>,
}

impl Default for SimContent {
    fn default() -> Self {
        Self {
            tracks: 32,
            effect_tracks: 4,
            scenes: 16,
            devices: 5,
            layers: 12,
            parameter_pages: (1..=6).map(|n| format!("Page {}", n)).collect(),
            groups: Vec::new(),
        }
    }
}

/// Command the simulated host received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimCommand {
    ScrollBackwards,
    ScrollForwards,
    ScrollPageBackwards,
    ScrollPageForwards,
    ScrollTo(usize),
    Select(usize),
    Subscribed(bool),
    Launch(usize),
    Record(usize),
    Create(usize, u32),
    Remove(usize),
    Duplicate(usize),
    Browse(usize),
    CursorNext,
    CursorPrevious,
    SelectParent,
    SelectFirstChild,
    NextPage { cycle: bool },
    PreviousPage { cycle: bool },
    SetPage(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimKind {
    Tracks(TrackBankKind),
    Scenes,
    Slots { tracks: WindowId, track_index: usize },
    Devices,
    Layers,
    Parameters,
}

#[derive(Debug)]
struct SimWindow {
    kind: SimKind,
    page_size: usize,
    scroll: usize,
    selected: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
struct SlotState {
    has_content: bool,
    is_playing: bool,
    is_recording: bool,
}

#[derive(Debug)]
struct SimWorld {
    content: SimContent,
    windows: HashMap<WindowId, SimWindow>,
    /// Keyed by (track collection, track position, scene position)
    slots: HashMap<(TrackBankKind, usize, usize), SlotState>,
    device_window: Option<WindowId>,
    device_position: Option<usize>,
    in_group: bool,
    /// (parameter window, page window)
    remote: Option<(WindowId, WindowId)>,
    selected_page: usize,
    calls: Vec<(WindowId, SimCommand)>,
    notifier: HostNotifier,
}

impl SimWorld {
    fn count(&self, kind: SimKind) -> usize {
        match kind {
            SimKind::Tracks(TrackBankKind::Main) => self.content.tracks,
            SimKind::Tracks(TrackBankKind::Effect) => self.content.effect_tracks,
            SimKind::Scenes | SimKind::Slots { .. } => self.content.scenes,
            SimKind::Devices => self.content.devices,
            SimKind::Layers => self.content.layers,
            SimKind::Parameters => self
                .windows
                .values()
                .find(|w| w.kind == SimKind::Parameters)
                .map_or(0, |w| w.page_size),
        }
    }

    fn name(&self, kind: SimKind, position: usize) -> String {
        match kind {
            SimKind::Tracks(TrackBankKind::Main) => format!("Track {}", position + 1),
            SimKind::Tracks(TrackBankKind::Effect) => format!("FX {}", position + 1),
            SimKind::Scenes => format!("Scene {}", position + 1),
            SimKind::Slots { .. } => String::new(),
            SimKind::Devices => format!("Device {}", position + 1),
            SimKind::Layers => format!("Layer {}", position + 1),
            SimKind::Parameters => format!("Param {}", position + 1),
        }
    }

    /// Track collection and absolute track position behind a slot window
    fn slot_owner(&self, tracks: WindowId, track_index: usize) -> Option<(TrackBankKind, usize)> {
        let window = self.windows.get(&tracks)?;
        match window.kind {
            SimKind::Tracks(kind) => Some((kind, window.scroll + track_index)),
            _ => None,
        }
    }

    fn record(&mut self, window: WindowId, command: SimCommand) {
        self.calls.push((window, command));
    }

    fn emit(&self, window: WindowId, updates: Vec<BankUpdate>) {
        self.notifier
            .notify_all(updates.into_iter().map(|update| HostEvent { window, update }));
    }

    /// Publish the full state of one window
    fn refresh(&self, id: WindowId) {
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        let count = self.count(window.kind);
        let mut updates = vec![
            BankUpdate::ItemCount(count),
            BankUpdate::ScrollPosition(window.scroll),
            BankUpdate::CanScrollBackwards(window.scroll > 0),
            BankUpdate::CanScrollForwards(window.scroll + window.page_size < count),
        ];

        let slot_owner = match window.kind {
            SimKind::Slots { tracks, track_index } => self.slot_owner(tracks, track_index),
            _ => None,
        };

        for index in 0..window.page_size {
            let position = window.scroll + index;
            let exists = position < count;
            let mut entry = vec![
                EntryUpdate::Exists(exists),
                EntryUpdate::Name(if exists { self.name(window.kind, position) } else { String::new() }),
                EntryUpdate::Position(exists.then_some(position)),
                EntryUpdate::Selected(exists && window.selected == Some(position)),
            ];
            match window.kind {
                SimKind::Tracks(TrackBankKind::Main) => {
                    let is_group = self.content.groups.contains(&position);
                    entry.push(EntryUpdate::Attribute(AttributeUpdate::Group(is_group)));
                }
                SimKind::Slots { .. } => {
                    let state = slot_owner
                        .and_then(|(kind, track)| self.slots.get(&(kind, track, position)))
                        .copied()
                        .unwrap_or_default();
                    entry.push(EntryUpdate::Attribute(AttributeUpdate::HasContent(state.has_content)));
                    entry.push(EntryUpdate::Attribute(AttributeUpdate::Playing(state.is_playing)));
                    entry.push(EntryUpdate::Attribute(AttributeUpdate::Recording(state.is_recording)));
                }
                SimKind::Devices => {
                    entry.push(EntryUpdate::Attribute(AttributeUpdate::Enabled(exists)));
                }
                _ => {}
            }
            updates.extend(entry.into_iter().map(|update| BankUpdate::Entry { index, update }));
        }

        if window.kind == SimKind::Layers {
            let selected = window.selected;
            updates.push(BankUpdate::Cursor(CursorUpdate::HasPrevious(selected.is_some_and(|s| s > 0))));
            updates.push(BankUpdate::Cursor(CursorUpdate::HasNext(match selected {
                Some(s) => s + 1 < count,
                None => count > 0,
            })));
        }
        self.emit(id, updates);
    }

    /// Refresh a window and every slot window re-pointed by it
    fn refresh_with_slots(&self, id: WindowId) {
        self.refresh(id);
        let slot_windows: Vec<WindowId> = self
            .windows
            .iter()
            .filter(|(_, w)| matches!(w.kind, SimKind::Slots { tracks, .. } if tracks == id))
            .map(|(slot_id, _)| *slot_id)
            .collect();
        for slot_id in slot_windows {
            self.refresh(slot_id);
        }
    }

    fn refresh_slots_of(&self, kind: TrackBankKind) {
        let slot_windows: Vec<WindowId> = self
            .windows
            .iter()
            .filter(|(_, w)| match w.kind {
                SimKind::Slots { tracks, .. } => self
                    .windows
                    .get(&tracks)
                    .is_some_and(|t| t.kind == SimKind::Tracks(kind)),
                _ => false,
            })
            .map(|(id, _)| *id)
            .collect();
        for id in slot_windows {
            self.refresh(id);
        }
    }

    fn publish_device_cursor(&self) {
        let Some(window) = self.device_window else {
            return;
        };
        let count = self.content.devices;
        let position = self.device_position;
        self.emit(
            window,
            vec![
                BankUpdate::Cursor(CursorUpdate::Exists(position.is_some())),
                BankUpdate::Cursor(CursorUpdate::Position(position)),
                BankUpdate::Cursor(CursorUpdate::Name(
                    position.map(|p| self.name(SimKind::Devices, p)).unwrap_or_default(),
                )),
                BankUpdate::Cursor(CursorUpdate::HasPrevious(position.is_some_and(|p| p > 0))),
                BankUpdate::Cursor(CursorUpdate::HasNext(position.is_some_and(|p| p + 1 < count))),
            ],
        );
    }

    fn publish_remote(&self) {
        let Some((_, pages)) = self.remote else {
            return;
        };
        let count = self.content.parameter_pages.len();
        self.emit(
            pages,
            vec![
                BankUpdate::PageNames(self.content.parameter_pages.clone()),
                BankUpdate::SelectedPage(self.selected_page),
                BankUpdate::Cursor(CursorUpdate::HasPrevious(self.selected_page > 0)),
                BankUpdate::Cursor(CursorUpdate::HasNext(self.selected_page + 1 < count)),
            ],
        );
    }

    fn publish_parent(&self) {
        for (id, window) in &self.windows {
            if window.kind == SimKind::Tracks(TrackBankKind::Main) {
                self.emit(*id, vec![BankUpdate::Cursor(CursorUpdate::HasParent(self.in_group))]);
            }
        }
    }

    fn add_window(&mut self, id: WindowId, kind: SimKind, page_size: usize) {
        let count = self.count(kind);
        let selected = match kind {
            SimKind::Layers if count > 0 => Some(0),
            _ => None,
        };
        self.windows.insert(
            id,
            SimWindow {
                kind,
                page_size,
                scroll: 0,
                selected,
            },
        );
        self.refresh(id);
    }

    /// Apply a scroll to `scroll` if it changes anything
    fn scroll_window(&mut self, id: WindowId, scroll: usize) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        if window.scroll == scroll {
            return;
        }
        window.scroll = scroll;
        self.refresh_with_slots(id);
    }

    fn collection_command(&mut self, id: WindowId, command: SimCommand) {
        self.record(id, command.clone());
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        let count = self.count(window.kind);
        let (scroll, page_size) = (window.scroll, window.page_size);
        match command {
            SimCommand::ScrollBackwards if scroll > 0 => self.scroll_window(id, scroll - 1),
            SimCommand::ScrollForwards if scroll + page_size < count => {
                self.scroll_window(id, scroll + 1)
            }
            SimCommand::ScrollPageBackwards => self.scroll_window(id, scroll.saturating_sub(page_size)),
            SimCommand::ScrollPageForwards if scroll + page_size < count => {
                self.scroll_window(id, scroll + page_size)
            }
            SimCommand::ScrollTo(position) if position < count => self.scroll_window(id, position),
            SimCommand::Select(index) if scroll + index < count => {
                self.select_position(id, scroll + index)
            }
            _ => {}
        }
    }

    fn select_position(&mut self, id: WindowId, position: usize) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        window.selected = Some(position);
        self.refresh(id);
    }

    fn slot_command(&mut self, id: WindowId, command: SimCommand) {
        self.record(id, command.clone());
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        let SimKind::Slots { tracks, track_index } = window.kind else {
            return;
        };
        let scroll = window.scroll;
        let Some((kind, track)) = self.slot_owner(tracks, track_index) else {
            return;
        };
        let key = |index: usize| (kind, track, scroll + index);
        match command {
            SimCommand::Launch(index) => {
                let slot = self.slots.entry(key(index)).or_default();
                slot.is_playing = slot.has_content;
            }
            SimCommand::Record(index) => {
                let slot = self.slots.entry(key(index)).or_default();
                slot.has_content = true;
                slot.is_recording = true;
            }
            SimCommand::Create(index, _) => self.slots.entry(key(index)).or_default().has_content = true,
            SimCommand::Remove(index) => {
                self.slots.remove(&key(index));
            }
            SimCommand::Duplicate(index) => {
                let source = self.slots.get(&key(index)).copied().unwrap_or_default();
                self.slots.insert(key(index + 1), source);
            }
            _ => return,
        }
        self.refresh(id);
    }
}

fn lock(world: &Mutex<SimWorld>) -> MutexGuard<'_, SimWorld> {
    world.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Simulated host; clones share one project
#[derive(Clone)]
pub struct SimHost {
    world: Arc<Mutex<SimWorld>>,
}

impl SimHost {
    pub fn new(content: SimContent, notifier: HostNotifier) -> Self {
        let device_position = (content.devices > 0).then_some(0);
        Self {
            world: Arc::new(Mutex::new(SimWorld {
                content,
                windows: HashMap::new(),
                slots: HashMap::new(),
                device_window: None,
                device_position,
                in_group: false,
                remote: None,
                selected_page: 0,
                calls: Vec::new(),
                notifier,
            })),
        }
    }

    /// Commands received so far, oldest first; clears the log
    pub fn take_calls(&self) -> Vec<(WindowId, SimCommand)> {
        std::mem::take(&mut lock(&self.world).calls)
    }

    /// Commands received for `window`; clears the whole log
    pub fn take_calls_for(&self, window: WindowId) -> Vec<SimCommand> {
        self.take_calls()
            .into_iter()
            .filter(|(w, _)| *w == window)
            .map(|(_, c)| c)
            .collect()
    }

    pub fn scroll_position(&self, window: WindowId) -> Option<usize> {
        lock(&self.world).windows.get(&window).map(|w| w.scroll)
    }

    /// Host-side selection of `window`
    pub fn selected_position(&self, window: WindowId) -> Option<usize> {
        lock(&self.world).windows.get(&window).and_then(|w| w.selected)
    }

    /// Change the selection from inside the host, as a user click would
    pub fn select_in_host(&self, window: WindowId, position: usize) {
        let mut world = lock(&self.world);
        let Some(kind) = world.windows.get(&window).map(|w| w.kind) else {
            return;
        };
        if position < world.count(kind) {
            world.select_position(window, position);
        }
    }

    /// Fill or clear a slot from inside the host
    pub fn set_slot_content(&self, kind: TrackBankKind, track: usize, scene: usize, has_content: bool) {
        let mut world = lock(&self.world);
        world.slots.entry((kind, track, scene)).or_default().has_content = has_content;
        world.refresh_slots_of(kind);
    }

    /// Add or remove main tracks from inside the host
    pub fn set_track_count(&self, tracks: usize) {
        let mut world = lock(&self.world);
        world.content.tracks = tracks;
        let ids: Vec<WindowId> = world
            .windows
            .iter()
            .filter(|(_, w)| w.kind == SimKind::Tracks(TrackBankKind::Main))
            .map(|(id, _)| *id)
            .collect();
        for id in ids {
            world.refresh_with_slots(id);
        }
    }

    pub fn device_position(&self) -> Option<usize> {
        lock(&self.world).device_position
    }

    pub fn selected_page(&self) -> usize {
        lock(&self.world).selected_page
    }

    fn collection(&self, window: WindowId) -> SimCollection {
        SimCollection {
            world: self.world.clone(),
            window,
        }
    }
}

impl HostFactory for SimHost {
    fn create_track_bank(
        &mut self,
        window: WindowId,
        kind: TrackBankKind,
        num_tracks: usize,
    ) -> Box<dyn HostCollection> {
        lock(&self.world).add_window(window, SimKind::Tracks(kind), num_tracks);
        Box::new(self.collection(window))
    }

    fn create_track_cursor(&mut self, tracks: WindowId) -> Box<dyn HostTrackCursor> {
        lock(&self.world).publish_parent();
        Box::new(self.collection(tracks))
    }

    fn create_scene_bank(&mut self, window: WindowId, num_scenes: usize) -> Box<dyn HostCollection> {
        lock(&self.world).add_window(window, SimKind::Scenes, num_scenes);
        Box::new(self.collection(window))
    }

    fn create_slot_bank(
        &mut self,
        window: WindowId,
        tracks: WindowId,
        track_index: usize,
        num_scenes: usize,
    ) -> Box<dyn HostSlots> {
        lock(&self.world).add_window(window, SimKind::Slots { tracks, track_index }, num_scenes);
        Box::new(self.collection(window))
    }

    fn create_device_bank(&mut self, window: WindowId, num_devices: usize) -> Box<dyn HostCollection> {
        lock(&self.world).add_window(window, SimKind::Devices, num_devices);
        Box::new(self.collection(window))
    }

    fn create_device_cursor(&mut self, devices: WindowId) -> Box<dyn HostCursor> {
        let mut world = lock(&self.world);
        world.device_window = Some(devices);
        world.publish_device_cursor();
        Box::new(SimCursor {
            world: self.world.clone(),
            window: devices,
        })
    }

    fn create_layer_bank(&mut self, window: WindowId, num_layers: usize) -> Box<dyn HostCollection> {
        lock(&self.world).add_window(window, SimKind::Layers, num_layers);
        Box::new(self.collection(window))
    }

    fn create_layer_cursor(&mut self, layers: WindowId) -> Box<dyn HostCursor> {
        Box::new(SimCursor {
            world: self.world.clone(),
            window: layers,
        })
    }

    fn create_remote_controls(
        &mut self,
        params: WindowId,
        pages: WindowId,
        num_params: usize,
    ) -> Box<dyn HostRemoteControls> {
        let mut world = lock(&self.world);
        world.remote = Some((params, pages));
        world.add_window(params, SimKind::Parameters, num_params);
        world.publish_remote();
        Box::new(SimRemote {
            world: self.world.clone(),
            pages,
        })
    }
}

/// Handle to one simulated window
struct SimCollection {
    world: Arc<Mutex<SimWorld>>,
    window: WindowId,
}

impl HostCollection for SimCollection {
    fn scroll_backwards(&mut self) {
        lock(&self.world).collection_command(self.window, SimCommand::ScrollBackwards);
    }

    fn scroll_forwards(&mut self) {
        lock(&self.world).collection_command(self.window, SimCommand::ScrollForwards);
    }

    fn scroll_page_backwards(&mut self) {
        lock(&self.world).collection_command(self.window, SimCommand::ScrollPageBackwards);
    }

    fn scroll_page_forwards(&mut self) {
        lock(&self.world).collection_command(self.window, SimCommand::ScrollPageForwards);
    }

    fn scroll_to(&mut self, position: usize) {
        lock(&self.world).collection_command(self.window, SimCommand::ScrollTo(position));
    }

    fn select(&mut self, index: usize) {
        lock(&self.world).collection_command(self.window, SimCommand::Select(index));
    }

    fn set_subscribed(&mut self, enable: bool) {
        lock(&self.world).record(self.window, SimCommand::Subscribed(enable));
    }
}

impl HostSlots for SimCollection {
    fn launch(&mut self, index: usize) {
        lock(&self.world).slot_command(self.window, SimCommand::Launch(index));
    }

    fn record(&mut self, index: usize) {
        lock(&self.world).slot_command(self.window, SimCommand::Record(index));
    }

    fn create(&mut self, index: usize, length: u32) {
        lock(&self.world).slot_command(self.window, SimCommand::Create(index, length));
    }

    fn remove(&mut self, index: usize) {
        lock(&self.world).slot_command(self.window, SimCommand::Remove(index));
    }

    fn duplicate(&mut self, index: usize) {
        lock(&self.world).slot_command(self.window, SimCommand::Duplicate(index));
    }

    fn browse(&mut self, index: usize) {
        lock(&self.world).record(self.window, SimCommand::Browse(index));
    }
}

impl HostTrackCursor for SimCollection {
    fn select_parent(&mut self) {
        let mut world = lock(&self.world);
        world.record(self.window, SimCommand::SelectParent);
        if world.in_group {
            world.in_group = false;
            world.publish_parent();
        }
    }

    fn select_first_child(&mut self) {
        let mut world = lock(&self.world);
        world.record(self.window, SimCommand::SelectFirstChild);
        let selected = world.windows.get(&self.window).and_then(|w| w.selected);
        if selected.is_some_and(|s| world.content.groups.contains(&s)) {
            world.in_group = true;
            world.publish_parent();
        }
    }

    fn set_subscribed(&mut self, enable: bool) {
        lock(&self.world).record(self.window, SimCommand::Subscribed(enable));
    }
}

/// Device or layer cursor
struct SimCursor {
    world: Arc<Mutex<SimWorld>>,
    window: WindowId,
}

impl SimCursor {
    fn step(&mut self, forwards: bool) {
        let mut world = lock(&self.world);
        world.record(
            self.window,
            if forwards { SimCommand::CursorNext } else { SimCommand::CursorPrevious },
        );
        if world.device_window == Some(self.window) {
            let count = world.content.devices;
            world.device_position = match world.device_position {
                Some(p) if forwards && p + 1 < count => Some(p + 1),
                Some(p) if !forwards && p > 0 => Some(p - 1),
                other => other,
            };
            world.publish_device_cursor();
            return;
        }
        let count = world.content.layers;
        let Some(window) = world.windows.get_mut(&self.window) else {
            return;
        };
        window.selected = match window.selected {
            Some(s) if forwards && s + 1 < count => Some(s + 1),
            Some(s) if !forwards && s > 0 => Some(s - 1),
            None if count > 0 => Some(0),
            other => other,
        };
        world.refresh(self.window);
    }
}

impl HostCursor for SimCursor {
    fn select_next(&mut self) {
        self.step(true);
    }

    fn select_previous(&mut self) {
        self.step(false);
    }

    fn set_subscribed(&mut self, enable: bool) {
        lock(&self.world).record(self.window, SimCommand::Subscribed(enable));
    }
}

/// Remote-controls page cursor; commands are logged against the page window
struct SimRemote {
    world: Arc<Mutex<SimWorld>>,
    pages: WindowId,
}

impl SimRemote {
    fn move_page(&mut self, command: SimCommand, target: impl FnOnce(usize, usize) -> Option<usize>) {
        let mut world = lock(&self.world);
        world.record(self.pages, command);
        let count = world.content.parameter_pages.len();
        if let Some(page) = target(world.selected_page, count) {
            if page < count && page != world.selected_page {
                world.selected_page = page;
                world.publish_remote();
            }
        }
    }
}

impl HostRemoteControls for SimRemote {
    fn select_next_page(&mut self, cycle: bool) {
        self.move_page(SimCommand::NextPage { cycle }, |page, count| {
            if page + 1 < count {
                Some(page + 1)
            } else {
                cycle.then_some(0)
            }
        });
    }

    fn select_previous_page(&mut self, cycle: bool) {
        self.move_page(SimCommand::PreviousPage { cycle }, |page, count| {
            if page > 0 {
                Some(page - 1)
            } else if cycle {
                count.checked_sub(1)
            } else {
                None
            }
        });
    }

    fn set_selected_page(&mut self, index: usize) {
        self.move_page(SimCommand::SetPage(index), |_, _| Some(index));
    }

    fn select_next(&mut self) {
        self.move_page(SimCommand::CursorNext, |page, _| Some(page + 1));
    }

    fn select_previous(&mut self) {
        self.move_page(SimCommand::CursorPrevious, |page, _| page.checked_sub(1));
    }

    fn set_subscribed(&mut self, enable: bool) {
        lock(&self.world).record(self.pages, SimCommand::Subscribed(enable));
    }
}
