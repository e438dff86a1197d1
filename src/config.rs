// Configuration management
//
// Handles viewer configuration and settings persistence.

use crate::screen::{Rotation, ScreenColors, ScreenError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file path
pub const CONFIG_FILE: &str = "gvm_config.toml";

/// Largest supported window scale
pub const MAX_SCALE: u32 = 8;

/// Viewer configuration
///
/// Stores all user-configurable settings of the screen viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Video settings
    pub video: VideoConfig,

    /// Colors for clear and set pixels
    pub colors: ScreenColors,

    /// Screenshot settings
    pub screenshot: ScreenshotConfig,
}

/// Video configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Pixel scale (1-8)
    pub scale: u32,

    /// Counter-clockwise quarter turns (0-3)
    pub rotation: u8,

    /// Target FPS
    pub fps: u32,

    /// Enable VSync
    pub vsync: bool,
}

/// Screenshot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotConfig {
    /// Screenshot directory
    pub directory: PathBuf,

    /// Include timestamp in filename
    pub include_timestamp: bool,
}

impl VideoConfig {
    /// Export scale, clamped to 1-8
    pub fn scale(&self) -> usize {
        self.scale.clamp(1, MAX_SCALE) as usize
    }

    /// Configured rotation
    ///
    /// # Errors
    /// `ScreenError::InvalidRotation` for values above 3
    pub fn rotation(&self) -> Result<Rotation, ScreenError> {
        Rotation::try_from(self.rotation)
    }

    /// Get the frame duration for the target FPS
    pub fn frame_duration(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.fps.max(1)))
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            video: VideoConfig {
                scale: 3,
                rotation: 0,
                fps: 60,
                vsync: true,
            },
            colors: ScreenColors::default(),
            screenshot: ScreenshotConfig {
                directory: PathBuf::from("screenshots"),
                include_timestamp: true,
            },
        }
    }
}

impl ViewerConfig {
    /// Load configuration from file or create default
    ///
    /// If the configuration file doesn't exist, creates a default configuration
    /// and saves it to the file.
    ///
    /// # Returns
    ///
    /// The loaded or default configuration
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            log::info!("Using default configuration ({}: {})", CONFIG_FILE, e);
            let config = Self::default();
            // Try to save the default config, but don't fail if we can't
            let _ = config.save();
            config
        })
    }

    /// Load configuration from the default file
    pub fn load() -> Result<Self, io::Error> {
        Self::load_from(CONFIG_FILE)
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<(), io::Error> {
        self.save_to(CONFIG_FILE)
    }

    /// Load configuration from a file
    ///
    /// # Returns
    ///
    /// Result containing the configuration or an error; malformed TOML is
    /// reported as `io::ErrorKind::InvalidData`
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save configuration to a file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gvm_rs::config::ViewerConfig;
    ///
    /// let config = ViewerConfig::default();
    /// config.save_to("gvm_config.toml").expect("Failed to save configuration");
    /// ```
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), io::Error> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)
    }
}
