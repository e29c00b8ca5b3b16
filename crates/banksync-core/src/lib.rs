//! Banksync Core - windowed banks and selection sync for control surfaces
//!
//! A control surface shows a fixed number of strips (8 tracks, 8 scenes, ...)
//! over host collections that are much larger. This crate provides:
//! - Fixed-size windows mirroring host state ([`Window`], [`Entry`])
//! - Absolute-position selection that survives scrolling ([`SelectionTracker`])
//! - Item and page navigation across page boundaries ([`PageNavigator`], [`Bank`])
//! - Deferred "select after the host scrolled" follow-ups ([`FollowUpScheduler`])
//! - Track, slot, scene, device, layer and parameter windows ([`banks`])
//! - A [`Model`] owning all windows of one surface, configured from YAML
//! - An in-process host for tests and offline runs ([`sim`])
//!
//! # Architecture
//!
//! ```text
//! host callback → HostNotifier → flume channel → Model::pump() → window state
//! controller    → Model / window navigation    → Host* commands → host
//!                              └→ FollowUpScheduler → Model::pump() (when due)
//! ```
//!
//! The host applies commands asynchronously. Windows never wait for it: they
//! mirror whatever the host last reported, and selections that depend on a
//! pending scroll are re-issued by a timed follow-up.

mod bank;
mod config;
mod entry;
mod error;
mod host;
mod model;
mod navigator;
mod scheduler;
mod selection;
mod types;
mod window;

pub mod banks;
pub mod sim;

pub use bank::{Bank, ScrollBounds, DEFAULT_BOUNDARY_DELAY};
pub use banks::{
    CursorState, DeviceBank, LayerBank, ParameterBank, ParameterPageBank, SceneBank,
    SceneBankCache, SlotBank, TrackBank, TrackBankLayout,
};
pub use config::{
    default_setup_path, load_setup, parse_setup, read_setup, FollowUpDelays, ModelSetup,
    MAX_DELAY_MS,
};
pub use entry::{
    DeviceAttrs, Entry, ItemKind, LayerAttrs, ParameterAttrs, SceneAttrs, SlotAttrs, TrackAttrs,
};
pub use error::SetupError;
pub use host::{
    host_bridge, AttributeUpdate, BankUpdate, CursorUpdate, EntryUpdate, HostCollection,
    HostCursor, HostEvent, HostFactory, HostNotifier, HostRemoteControls, HostSlots,
    HostTrackCursor, TrackBankKind,
};
pub use model::Model;
pub use navigator::{EmulatedPaging, PageNavigator};
pub use scheduler::{Clock, FollowUp, FollowUpScheduler, ManualClock, SystemClock};
pub use selection::{SelectionObserver, SelectionTracker};
pub use types::{Color, ItemCountProbe, WindowId};
pub use window::Window;
