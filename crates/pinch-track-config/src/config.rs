//! Tracking configuration loaded from TOML.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::types::{Hand, ReleaseGrace, SourceMode};

/// Default pinch threshold for device hand tracking (centimetre units).
pub const DEVICE_PINCH_THRESHOLD: f32 = 2.5;
/// Default pinch threshold for manual kit pinch detection. Tighter than the
/// device value because kit fingertips are more precise.
pub const KIT_PINCH_THRESHOLD: f32 = 1.8;
/// Default distance from the camera at which touch points are projected.
pub const DEFAULT_TOUCH_DISTANCE: f32 = 50.0;
/// Default number of frames a lost hand or released pinch is held for.
pub const DEFAULT_STABILITY_FRAMES: u32 = 3;

const CONFIG_FILE_NAME: &str = "tracking.toml";

/// Top-level configuration: which source is active plus per-source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// The single source that drives gesture events
    pub mode: SourceMode,
    /// Tie-break hand when both hands are tracked
    pub dominant_hand: Hand,
    pub touch: TouchConfig,
    pub device: DeviceConfig,
    pub kit: KitConfig,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::default(),
            dominant_hand: Hand::Right,
            touch: TouchConfig::default(),
            device: DeviceConfig::default(),
            kit: KitConfig::default(),
        }
    }
}

/// Touch simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchConfig {
    /// Distance along the camera view axis at which touches are projected
    pub distance_from_camera: f32,
    /// Emit hover events from hover-capable pointers
    pub hover: bool,
    /// Camera used to project touches. Touch mode cannot start without it.
    pub camera: Option<CameraConfig>,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            distance_from_camera: DEFAULT_TOUCH_DISTANCE,
            hover: false,
            camera: None,
        }
    }
}

/// Perspective camera description used by touch projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    /// Camera position in world space
    #[serde(default)]
    pub position: [f32; 3],
    /// View direction; the camera keeps world +Y as its up hint
    #[serde(default = "default_forward")]
    pub forward: [f32; 3],
}

impl CameraConfig {
    /// Camera at the origin looking down +Z
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fov_degrees: default_fov(),
            position: [0.0; 3],
            forward: default_forward(),
        }
    }
}

fn default_fov() -> f32 {
    60.0
}

fn default_forward() -> [f32; 3] {
    [0.0, 0.0, 1.0]
}

/// Device hand tracking settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Frames a lost hand or a released pinch is held before the loss is accepted
    pub stability_frames: u32,
    /// Thumb to index distance below which the hand is pinching
    pub pinch_threshold: f32,
    /// Reporting during the pinch release window
    pub release_grace: ReleaseGrace,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            stability_frames: DEFAULT_STABILITY_FRAMES,
            pinch_threshold: DEVICE_PINCH_THRESHOLD,
            release_grace: ReleaseGrace::default(),
        }
    }
}

/// Interaction-kit settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitConfig {
    /// Apply found/lost notifications as they arrive instead of on the next frame
    pub sync_combined: bool,
    /// Compute pinch from fingertip distance instead of trusting the kit
    pub detect_pinch_manually: bool,
    /// Threshold used when `detect_pinch_manually` is set
    pub pinch_threshold: f32,
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            sync_combined: false,
            detect_pinch_manually: false,
            pinch_threshold: KIT_PINCH_THRESHOLD,
        }
    }
}

impl TrackingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: SourceMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_dominant_hand(mut self, hand: Hand) -> Self {
        self.dominant_hand = hand;
        self
    }

    pub fn with_stability_frames(mut self, frames: u32) -> Self {
        self.device.stability_frames = frames;
        self
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.touch.camera = Some(camera);
        self
    }

    pub fn with_hover(mut self, enable: bool) -> Self {
        self.touch.hover = enable;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: TrackingConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        tracing::info!("Loaded tracking config from {} (mode: {})", path.display(), config.mode);
        Ok(config)
    }

    /// Load `path` if given, otherwise the default location if it exists,
    /// otherwise built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(default) if default.exists() => Self::load(default),
            _ => {
                tracing::debug!("No tracking config found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Default config location in the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "pinch-track", "pinch-track")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the config, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = self.to_toml_string()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, contents).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject values no detector can work with.
    pub fn validate(&self) -> Result<()> {
        positive("touch.distance_from_camera", self.touch.distance_from_camera)?;
        positive("device.pinch_threshold", self.device.pinch_threshold)?;
        positive("kit.pinch_threshold", self.kit.pinch_threshold)?;

        if let Some(camera) = &self.touch.camera {
            if camera.width == 0 || camera.height == 0 {
                return Err(ConfigError::Invalid {
                    field: "touch.camera",
                    reason: format!("viewport must be non-empty, got {}x{}", camera.width, camera.height),
                });
            }
            if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
                return Err(ConfigError::Invalid {
                    field: "touch.camera.fov_degrees",
                    reason: format!("must be between 0 and 180, got {}", camera.fov_degrees),
                });
            }
            let [x, y, z] = camera.forward;
            if !(x.is_finite() && y.is_finite() && z.is_finite()) || x * x + y * y + z * z == 0.0 {
                return Err(ConfigError::Invalid {
                    field: "touch.camera.forward",
                    reason: format!("must be a non-zero direction, got {:?}", camera.forward),
                });
            }
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive number, got {}", value),
        })
    }
}
