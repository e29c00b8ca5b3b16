//! Surface setup: page sizes and follow-up delays
//!
//! Loaded from YAML at `<config dir>/banksync/surface.yaml`. Every field is
//! optional; a missing or broken file yields the default setup.
//!
//! ```yaml
//! num_tracks: 8
//! num_scenes: 8
//! has_effect_tracks: true
//! delays:
//!   track_page: 75
//!   slot_reselect: 45
//! ```

use crate::banks::TrackBankLayout;
use crate::error::SetupError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest follow-up delay a setup may ask for
pub const MAX_DELAY_MS: u64 = 1000;

/// Delays (ms) before follow-ups run, per window kind
///
/// These outlast the host's scroll latency; they are empirical, not derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowUpDelays {
    /// Select across a track page boundary
    pub track_page: u64,
    pub scene_page: u64,
    pub slot_page: u64,
    /// Select across a layer page boundary
    pub layer_page: u64,
    /// Re-select the slot index after moving to another track
    pub slot_reselect: u64,
    /// Enter a group once the host selected it
    pub group_enter: u64,
}

impl Default for FollowUpDelays {
    fn default() -> Self {
        Self {
            track_page: 75,
            scene_page: 75,
            slot_page: 75,
            layer_page: 75,
            slot_reselect: 45,
            group_enter: 100,
        }
    }
}

impl FollowUpDelays {
    fn named(&self) -> [(&'static str, u64); 6] {
        [
            ("track_page", self.track_page),
            ("scene_page", self.scene_page),
            ("slot_page", self.slot_page),
            ("layer_page", self.layer_page),
            ("slot_reselect", self.slot_reselect),
            ("group_enter", self.group_enter),
        ]
    }
}

/// Page sizes of every window the model builds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSetup {
    pub num_tracks: usize,
    pub num_scenes: usize,
    pub num_devices: usize,
    pub num_device_layers: usize,
    /// Parameters per remote-controls page
    pub num_params: usize,
    /// Page names shown per parameter page group
    pub num_parameter_pages: usize,
    pub has_effect_tracks: bool,
    pub delays: FollowUpDelays,
}

impl Default for ModelSetup {
    fn default() -> Self {
        Self {
            num_tracks: 8,
            num_scenes: 8,
            num_devices: 8,
            num_device_layers: 8,
            num_params: 8,
            num_parameter_pages: 8,
            has_effect_tracks: true,
            delays: FollowUpDelays::default(),
        }
    }
}

impl ModelSetup {
    /// Check the setup before windows are built from it
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.num_tracks == 0 {
            return Err(SetupError::EmptyPage("num_tracks"));
        }
        if self.num_scenes == 0 {
            return Err(SetupError::EmptyPage("num_scenes"));
        }
        if self.num_params == 0 && self.num_parameter_pages > 0 {
            return Err(SetupError::PagesWithoutParameters {
                pages: self.num_parameter_pages,
            });
        }
        for (name, millis) in self.delays.named() {
            if millis > MAX_DELAY_MS {
                return Err(SetupError::DelayTooLong {
                    name,
                    millis,
                    max: MAX_DELAY_MS,
                });
            }
        }
        Ok(())
    }

    /// Track window layout for this setup
    pub fn track_layout(&self) -> TrackBankLayout {
        TrackBankLayout {
            num_tracks: self.num_tracks,
            num_scenes: self.num_scenes,
            track_page_delay: Duration::from_millis(self.delays.track_page),
            scene_page_delay: Duration::from_millis(self.delays.scene_page),
            slot_page_delay: Duration::from_millis(self.delays.slot_page),
            group_enter_delay: Duration::from_millis(self.delays.group_enter),
        }
    }

    pub fn layer_page_delay(&self) -> Duration {
        Duration::from_millis(self.delays.layer_page)
    }

    pub fn slot_reselect_delay(&self) -> Duration {
        Duration::from_millis(self.delays.slot_reselect)
    }

    pub fn track_page_delay(&self) -> Duration {
        Duration::from_millis(self.delays.track_page)
    }
}

/// Default setup location: `<config dir>/banksync/surface.yaml`
pub fn default_setup_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("banksync")
        .join("surface.yaml")
}

/// Parse a setup from YAML
pub fn parse_setup(yaml: &str) -> Result<ModelSetup> {
    serde_yaml::from_str(yaml).context("Failed to parse surface setup")
}

/// Read and parse a setup file
pub fn read_setup(path: &Path) -> Result<ModelSetup> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read setup file: {:?}", path))?;
    parse_setup(&contents).with_context(|| format!("Invalid setup file: {:?}", path))
}

/// Load the setup from a YAML file
///
/// A missing file gives the default setup. An unreadable, unparsable or
/// invalid file logs a warning and also gives the default setup.
pub fn load_setup(path: &Path) -> ModelSetup {
    log::info!("load_setup: Loading from {:?}", path);

    if !path.exists() {
        log::info!("load_setup: Setup file doesn't exist, using defaults");
        return ModelSetup::default();
    }

    let setup = match read_setup(path) {
        Ok(setup) => setup,
        Err(e) => {
            log::warn!("load_setup: {:#}, using defaults", e);
            return ModelSetup::default();
        }
    };
    if let Err(e) = setup.validate() {
        log::warn!("load_setup: {}, using defaults", e);
        return ModelSetup::default();
    }

    log::info!(
        "load_setup: {} tracks × {} scenes, {} devices, {} layers, {} params",
        setup.num_tracks,
        setup.num_scenes,
        setup.num_devices,
        setup.num_device_layers,
        setup.num_params
    );
    setup
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_nonexistent_returns_default() {
        let setup = load_setup(Path::new("/nonexistent/path/surface.yaml"));
        assert_eq!(setup, ModelSetup::default());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let setup = parse_setup("num_tracks: 4\ndelays:\n  slot_reselect: 10\n").unwrap();
        assert_eq!(setup.num_tracks, 4);
        assert_eq!(setup.num_scenes, 8);
        assert_eq!(setup.delays.slot_reselect, 10);
        assert_eq!(setup.delays.group_enter, 100);
        assert!(setup.has_effect_tracks);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface.yaml");
        std::fs::write(&path, "num_tracks: 16\nhas_effect_tracks: false\n").unwrap();

        let setup = load_setup(&path);
        assert_eq!(setup.num_tracks, 16);
        assert!(!setup.has_effect_tracks);
    }

    #[test]
    fn test_broken_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface.yaml");
        std::fs::write(&path, "num_tracks: [not a number").unwrap();
        assert_eq!(load_setup(&path), ModelSetup::default());

        assert!(read_setup(&path).is_err());
    }

    #[test]
    fn test_invalid_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface.yaml");
        std::fs::write(&path, "num_scenes: 0\n").unwrap();
        assert_eq!(load_setup(&path), ModelSetup::default());
    }

    #[test]
    fn test_validate() {
        assert_eq!(ModelSetup::default().validate(), Ok(()));

        let setup = ModelSetup {
            num_tracks: 0,
            ..ModelSetup::default()
        };
        assert_eq!(setup.validate(), Err(SetupError::EmptyPage("num_tracks")));

        let setup = ModelSetup {
            num_params: 0,
            ..ModelSetup::default()
        };
        assert_eq!(
            setup.validate(),
            Err(SetupError::PagesWithoutParameters { pages: 8 })
        );

        let mut setup = ModelSetup::default();
        setup.delays.group_enter = 5000;
        assert_eq!(
            setup.validate(),
            Err(SetupError::DelayTooLong {
                name: "group_enter",
                millis: 5000,
                max: MAX_DELAY_MS,
            })
        );
    }

    #[test]
    fn test_default_path_ends_with_surface_yaml() {
        let path = default_setup_path();
        assert!(path.ends_with("banksync/surface.yaml"));
    }

    #[test]
    fn test_track_layout_uses_delays() {
        let layout = ModelSetup::default().track_layout();
        assert_eq!(layout.track_page_delay, Duration::from_millis(75));
        assert_eq!(layout.group_enter_delay, Duration::from_millis(100));
    }
}
