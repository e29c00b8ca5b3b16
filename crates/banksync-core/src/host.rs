//! Host boundary: notifications in, commands out
//!
//! The host owns every collection and only ever tells us about state changes
//! asynchronously. Notifications are plain data ([`HostEvent`]) pushed through
//! a flume channel; commands go the other way through the `Host*` traits.
//!
//! # Architecture
//!
//! ```text
//! host callback thread → HostNotifier::notify → flume channel → Model::pump()
//! Model / windows      → Host* trait calls    → host (applies later, maybe)
//! ```
//!
//! Every accessor mirrored from these events may be stale between
//! notifications. Nothing here waits for the host.

use crate::types::{Color, WindowId};
use flume::{Receiver, Sender};

/// One host notification addressed to a single window
#[derive(Debug, Clone, PartialEq)]
pub struct HostEvent {
    /// Window the notification belongs to
    pub window: WindowId,
    /// What changed
    pub update: BankUpdate,
}

/// Window-level state change reported by the host
#[derive(Debug, Clone, PartialEq)]
pub enum BankUpdate {
    /// Total size of the backing collection
    ItemCount(usize),
    /// Absolute offset of the first visible entry
    ScrollPosition(usize),
    CanScrollBackwards(bool),
    CanScrollForwards(bool),
    /// Change to one entry of the page
    Entry {
        /// Relative index within the page
        index: usize,
        update: EntryUpdate,
    },
    /// Change to the host cursor attached to this window
    Cursor(CursorUpdate),
    /// Full list of parameter page names
    PageNames(Vec<String>),
    /// Index of the selected parameter page
    SelectedPage(usize),
}

/// Entry-level state change
#[derive(Debug, Clone, PartialEq)]
pub enum EntryUpdate {
    Exists(bool),
    /// The `(relative index, is selected)` notification
    Selected(bool),
    Name(String),
    Color(Color),
    /// Absolute position the host reports for the entity behind this entry
    Position(Option<usize>),
    /// Kind-specific attribute
    Attribute(AttributeUpdate),
}

/// Kind-specific attribute change
///
/// Each entry kind picks out the variants it understands and ignores the rest.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeUpdate {
    // Slots
    HasContent(bool),
    Playing(bool),
    Recording(bool),
    PlayingQueued(bool),
    RecordingQueued(bool),
    StopQueued(bool),

    // Channels (tracks and layers)
    Mute(bool),
    Solo(bool),
    Arm(bool),
    Group(bool),
    Volume(f64),
    CanHoldNotes(bool),

    // Devices
    Enabled(bool),

    // Parameters
    Value(f64),
    DisplayValue(String),
}

/// Change to a host cursor (device cursor, layer cursor, remote-controls page)
#[derive(Debug, Clone, PartialEq)]
pub enum CursorUpdate {
    Exists(bool),
    Position(Option<usize>),
    Name(String),
    HasPrevious(bool),
    HasNext(bool),
    HasParent(bool),
}

/// Which track collection a track window mirrors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackBankKind {
    /// Audio and instrument tracks
    Main,
    /// Effect (return) tracks, conceptually appended after the main tracks
    Effect,
}

/// Commands every windowed host collection accepts
///
/// All methods are requests. The host applies them whenever it gets to it
/// and reports the outcome through [`HostEvent`]s.
pub trait HostCollection: Send {
    fn scroll_backwards(&mut self);
    fn scroll_forwards(&mut self);
    fn scroll_page_backwards(&mut self);
    fn scroll_page_forwards(&mut self);
    /// Scroll so that the page starts at `position`
    fn scroll_to(&mut self, position: usize);
    /// Select the entity currently shown at relative `index`
    fn select(&mut self, index: usize);
    /// Subscribe to or unsubscribe from this collection's notifications
    fn set_subscribed(&mut self, enable: bool);
}

/// Clip launcher slot collection of one track
pub trait HostSlots: HostCollection {
    fn launch(&mut self, index: usize);
    fn record(&mut self, index: usize);
    /// Create an empty clip of `length` beats
    fn create(&mut self, index: usize, length: u32);
    fn remove(&mut self, index: usize);
    fn duplicate(&mut self, index: usize);
    /// Open the host browser to insert a clip
    fn browse(&mut self, index: usize);
}

/// Host-native selection cursor (devices, layers)
pub trait HostCursor: Send {
    fn select_next(&mut self);
    fn select_previous(&mut self);
    fn set_subscribed(&mut self, enable: bool);
}

/// Cursor over the track hierarchy (group tracks)
pub trait HostTrackCursor: Send {
    fn select_parent(&mut self);
    fn select_first_child(&mut self);
    fn set_subscribed(&mut self, enable: bool);
}

/// Remote-controls page of the cursor device
///
/// Exposes only flat page selection; there is no paging over pages.
pub trait HostRemoteControls: Send {
    fn select_next_page(&mut self, cycle: bool);
    fn select_previous_page(&mut self, cycle: bool);
    fn set_selected_page(&mut self, index: usize);
    fn select_next(&mut self);
    fn select_previous(&mut self);
    fn set_subscribed(&mut self, enable: bool);
}

/// Creates host-side collections and cursors
///
/// Creating a collection has a cost on the host side, which is why the model
/// creates most of them once and caches the rest.
pub trait HostFactory: Send {
    fn create_track_bank(
        &mut self,
        window: WindowId,
        kind: TrackBankKind,
        num_tracks: usize,
    ) -> Box<dyn HostCollection>;

    fn create_track_cursor(&mut self, tracks: WindowId) -> Box<dyn HostTrackCursor>;

    /// Scene window following the cursor track
    fn create_scene_bank(&mut self, window: WindowId, num_scenes: usize) -> Box<dyn HostCollection>;

    /// Slot window of the track shown at `track_index` of `tracks`
    fn create_slot_bank(
        &mut self,
        window: WindowId,
        tracks: WindowId,
        track_index: usize,
        num_scenes: usize,
    ) -> Box<dyn HostSlots>;

    fn create_device_bank(&mut self, window: WindowId, num_devices: usize) -> Box<dyn HostCollection>;

    /// Device cursor; its notifications are addressed to `devices`
    fn create_device_cursor(&mut self, devices: WindowId) -> Box<dyn HostCursor>;

    fn create_layer_bank(&mut self, window: WindowId, num_layers: usize) -> Box<dyn HostCollection>;

    /// Layer cursor; its notifications are addressed to `layers`
    fn create_layer_cursor(&mut self, layers: WindowId) -> Box<dyn HostCursor>;

    /// Remote controls; parameter entries report to `params`, page state to `pages`
    fn create_remote_controls(
        &mut self,
        params: WindowId,
        pages: WindowId,
        num_params: usize,
    ) -> Box<dyn HostRemoteControls>;
}

/// Sending half of the host bridge, held by the host adapter
///
/// Cheap to clone; may be used from any thread.
#[derive(Debug, Clone)]
pub struct HostNotifier {
    tx: Sender<HostEvent>,
}

impl HostNotifier {
    /// Publish one notification
    ///
    /// Returns false if the model side has been dropped.
    pub fn notify(&self, window: WindowId, update: BankUpdate) -> bool {
        match self.tx.send(HostEvent { window, update }) {
            Ok(()) => true,
            Err(_) => {
                log::debug!("HostBridge: model dropped, discarding notification for {}", window);
                false
            }
        }
    }

    /// Publish a batch of notifications in order
    pub fn notify_all(&self, events: impl IntoIterator<Item = HostEvent>) {
        for event in events {
            if self.tx.send(event).is_err() {
                log::debug!("HostBridge: model dropped, discarding remaining notifications");
                return;
            }
        }
    }
}

/// Create the host → model bridge
///
/// Unbounded: host notifications carry state, dropping one would leave a
/// window permanently stale.
pub fn host_bridge() -> (HostNotifier, Receiver<HostEvent>) {
    let (tx, rx) = flume::unbounded();
    (HostNotifier { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_preserves_order() {
        let (notifier, rx) = host_bridge();
        let window = WindowId::next();

        notifier.notify(window, BankUpdate::ItemCount(4));
        notifier.notify_all([
            HostEvent { window, update: BankUpdate::ScrollPosition(2) },
            HostEvent { window, update: BankUpdate::CanScrollForwards(false) },
        ]);

        let received: Vec<BankUpdate> = rx.try_iter().map(|e| e.update).collect();
        assert_eq!(
            received,
            vec![
                BankUpdate::ItemCount(4),
                BankUpdate::ScrollPosition(2),
                BankUpdate::CanScrollForwards(false),
            ]
        );
    }

    #[test]
    fn test_notify_after_model_dropped() {
        let (notifier, rx) = host_bridge();
        drop(rx);
        assert!(!notifier.notify(WindowId::next(), BankUpdate::ItemCount(1)));
    }

    #[test]
    fn test_notifier_from_other_thread() {
        let (notifier, rx) = host_bridge();
        let window = WindowId::next();
        let handle = std::thread::spawn(move || {
            notifier.notify(window, BankUpdate::SelectedPage(3));
        });
        handle.join().unwrap();
        let event = rx.try_recv().unwrap();
        assert_eq!(event.window, window);
        assert_eq!(event.update, BankUpdate::SelectedPage(3));
    }
}
