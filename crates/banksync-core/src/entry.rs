//! Window entries
//!
//! An [`Entry`] is a slot in a window, not an entity. It keeps its relative
//! index for its whole life while the host silently re-points it at another
//! track, device or scene every time the window scrolls.

use crate::host::{AttributeUpdate, EntryUpdate};
use crate::types::Color;
use std::fmt;

/// Kind-specific entry attributes
pub trait ItemKind: Default + Clone + fmt::Debug + Send {
    /// Apply an attribute update; returns false if this kind ignores it
    fn apply(&mut self, update: &AttributeUpdate) -> bool;
}

/// One addressable element of a window
#[derive(Debug, Clone)]
pub struct Entry<K> {
    /// Position within the window (0-based, never changes)
    index: usize,
    /// Host-reported existence
    exists: bool,
    name: String,
    color: Color,
    /// Absolute position reported by the host for the entity behind this entry
    position: Option<usize>,
    /// Whether host notifications for this entry are subscribed
    observed: bool,
    /// Kind-specific attributes
    attrs: K,
}

impl<K: ItemKind> Entry<K> {
    /// Create an entry that does not exist until the host says so
    pub fn new(index: usize) -> Self {
        Self {
            index,
            exists: false,
            name: String::new(),
            color: Color::default(),
            position: None,
            observed: true,
            attrs: K::default(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn does_exist(&self) -> bool {
        self.exists
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn is_observed(&self) -> bool {
        self.observed
    }

    pub fn attrs(&self) -> &K {
        &self.attrs
    }

    pub(crate) fn enable_observers(&mut self, enable: bool) {
        self.observed = enable;
    }

    /// Apply a host update (selection is tracked by the window owner, not here)
    ///
    /// Returns true if the update was understood.
    pub(crate) fn apply(&mut self, update: &EntryUpdate) -> bool {
        match update {
            EntryUpdate::Exists(exists) => self.exists = *exists,
            EntryUpdate::Name(name) => self.name.clone_from(name),
            EntryUpdate::Color(color) => self.color = *color,
            EntryUpdate::Position(position) => self.position = *position,
            EntryUpdate::Attribute(attr) => return self.attrs.apply(attr),
            EntryUpdate::Selected(_) => return false,
        }
        true
    }
}

/// Track attributes
#[derive(Debug, Clone, Default)]
pub struct TrackAttrs {
    pub is_group: bool,
    pub is_armed: bool,
    pub is_muted: bool,
    pub is_soloed: bool,
    pub can_hold_notes: bool,
    pub volume: f64,
}

impl ItemKind for TrackAttrs {
    fn apply(&mut self, update: &AttributeUpdate) -> bool {
        match update {
            AttributeUpdate::Group(v) => self.is_group = *v,
            AttributeUpdate::Arm(v) => self.is_armed = *v,
            AttributeUpdate::Mute(v) => self.is_muted = *v,
            AttributeUpdate::Solo(v) => self.is_soloed = *v,
            AttributeUpdate::CanHoldNotes(v) => self.can_hold_notes = *v,
            AttributeUpdate::Volume(v) => self.volume = *v,
            _ => return false,
        }
        true
    }
}

/// Scenes carry nothing beyond the common entry fields
#[derive(Debug, Clone, Default)]
pub struct SceneAttrs;

impl ItemKind for SceneAttrs {
    fn apply(&mut self, _update: &AttributeUpdate) -> bool {
        false
    }
}

/// Clip launcher slot attributes
#[derive(Debug, Clone, Default)]
pub struct SlotAttrs {
    pub has_content: bool,
    pub is_playing: bool,
    pub is_recording: bool,
    pub is_playing_queued: bool,
    pub is_recording_queued: bool,
    pub is_stop_queued: bool,
}

impl ItemKind for SlotAttrs {
    fn apply(&mut self, update: &AttributeUpdate) -> bool {
        match update {
            AttributeUpdate::HasContent(v) => self.has_content = *v,
            AttributeUpdate::Playing(v) => self.is_playing = *v,
            AttributeUpdate::Recording(v) => self.is_recording = *v,
            AttributeUpdate::PlayingQueued(v) => self.is_playing_queued = *v,
            AttributeUpdate::RecordingQueued(v) => self.is_recording_queued = *v,
            AttributeUpdate::StopQueued(v) => self.is_stop_queued = *v,
            _ => return false,
        }
        true
    }
}

/// Device attributes
#[derive(Debug, Clone, Default)]
pub struct DeviceAttrs {
    pub is_enabled: bool,
}

impl ItemKind for DeviceAttrs {
    fn apply(&mut self, update: &AttributeUpdate) -> bool {
        match update {
            AttributeUpdate::Enabled(v) => self.is_enabled = *v,
            _ => return false,
        }
        true
    }
}

/// Device layer / drum pad attributes
#[derive(Debug, Clone, Default)]
pub struct LayerAttrs {
    pub is_muted: bool,
    pub is_soloed: bool,
    pub volume: f64,
}

impl ItemKind for LayerAttrs {
    fn apply(&mut self, update: &AttributeUpdate) -> bool {
        match update {
            AttributeUpdate::Mute(v) => self.is_muted = *v,
            AttributeUpdate::Solo(v) => self.is_soloed = *v,
            AttributeUpdate::Volume(v) => self.volume = *v,
            _ => return false,
        }
        true
    }
}

/// Remote-control parameter attributes
#[derive(Debug, Clone, Default)]
pub struct ParameterAttrs {
    /// Normalized value (0.0-1.0)
    pub value: f64,
    /// Host-formatted value text
    pub display: String,
}

impl ItemKind for ParameterAttrs {
    fn apply(&mut self, update: &AttributeUpdate) -> bool {
        match update {
            AttributeUpdate::Value(v) => self.value = *v,
            AttributeUpdate::DisplayValue(text) => self.display.clone_from(text),
            _ => return false,
        }
        true
    }
}
