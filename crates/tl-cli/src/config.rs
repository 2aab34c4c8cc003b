//! Configuration loading and management.

use std::path::{Path, PathBuf};

use anyhow::{Result, ensure};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tl_core::ClusterSettings;
use tl_render::{FlameStyle, SchedulerOptions};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gap in pixels below which sub-pixel neighbours merge.
    pub stick_distance: f64,

    /// Width in pixels below which a node cannot be told apart.
    pub min_block_size: f64,

    /// Rendered width below which a cluster is never re-split. Defaults to
    /// `2 * min_block_size + stick_distance`.
    pub min_cluster_size: Option<f64>,

    /// Surface size in pixels.
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,

    /// Row height of the flame chart.
    pub node_height: f64,

    /// Frames per second for `tl replay`.
    pub frame_rate: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stick_distance: 0.25,
            min_block_size: 1.0,
            min_cluster_size: None,
            width: 1280.0,
            height: 720.0,
            pixel_ratio: 1.0,
            node_height: 20.0,
            frame_rate: 60,
        }
    }
}

impl Config {
    /// Loads configuration from the default locations plus an optional
    /// explicit file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TL_*)
        figment = figment.merge(Env::prefixed("TL_"));

        figment.extract()
    }

    /// Rejects sizes the chart cannot work with.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("stick_distance", self.stick_distance),
            ("min_block_size", self.min_block_size),
            ("width", self.width),
            ("height", self.height),
            ("pixel_ratio", self.pixel_ratio),
            ("node_height", self.node_height),
        ];
        for (key, value) in positive {
            ensure!(
                value.is_finite() && value > 0.0,
                "{key} must be a positive number, got {value}"
            );
        }
        if let Some(value) = self.min_cluster_size {
            ensure!(
                value.is_finite() && value > 0.0,
                "min_cluster_size must be a positive number, got {value}"
            );
        }
        ensure!(self.frame_rate > 0, "frame_rate must be at least 1");
        Ok(())
    }

    pub fn cluster_settings(&self) -> ClusterSettings {
        let mut settings = ClusterSettings::new(self.stick_distance, self.min_block_size);
        if let Some(min_cluster_size) = self.min_cluster_size {
            settings.min_cluster_size = min_cluster_size;
        }
        settings
    }

    pub fn scheduler_options(&self) -> SchedulerOptions {
        SchedulerOptions {
            settings: self.cluster_settings(),
            ..SchedulerOptions::default()
        }
    }

    pub fn flame_style(&self) -> FlameStyle {
        FlameStyle {
            node_height: self.node_height,
            ..FlameStyle::default()
        }
    }
}

/// Returns the platform-specific config directory for tl.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();

        config.validate().unwrap();
        assert_eq!(config.cluster_settings(), ClusterSettings::default());
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "min_block_size = 2.0\nwidth = 800.0\nmin_cluster_size = 9.0\n").unwrap();

        let config = Config::load_from(Some(&path)).unwrap();

        assert!((config.min_block_size - 2.0).abs() < f64::EPSILON);
        assert!((config.width - 800.0).abs() < f64::EPSILON);
        assert!((config.stick_distance - 0.25).abs() < f64::EPSILON);
        let settings = config.cluster_settings();
        assert!((settings.min_cluster_size - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_positive_sizes_are_rejected() {
        let config = Config {
            min_block_size: 0.0,
            ..Config::default()
        };

        let err = config.validate().unwrap_err();

        assert_eq!(
            err.to_string(),
            "min_block_size must be a positive number, got 0"
        );
    }

    #[test]
    fn test_zero_frame_rate_is_rejected() {
        let config = Config {
            frame_rate: 0,
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dirs_config_path_ends_with_tl() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "tl");
    }
}
