use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::door::DoorSpec;
use crate::error::Dimension;

/// Top-level configuration for the configurator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfiguratorConfig {
    pub assets: AssetConfig,
    pub controls: DoorControls,
    pub window: WindowConfig,
    pub render: RenderConfig,
}

impl ConfiguratorConfig {
    /// Door shown before the user touches either input.
    pub fn initial_door(&self) -> DoorSpec {
        DoorSpec::new(self.controls.width.value, self.controls.height.value)
    }

    /// Parses a JSON document. Missing sections keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid configuration")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize configuration")
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::from_json(&json)?;
        info!("loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Image locations, relative to `root`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub root: String,
    pub wood: String,
    pub tile: String,
    pub wall: String,
    /// Repetitions of the tile texture across the whole floor.
    pub tile_repeat: f32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            wood: "style/img/rm187-mynt-34.jpg".to_string(),
            tile: "style/img/close-up-marble-textured-tiles.jpg".to_string(),
            wall: "style/img/14a3aca6e1611278c68ea34e72718dfd.jpg".to_string(),
            tile_repeat: 20.0,
        }
    }
}

/// Numeric range input as declared in the page markup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub value: f32,
}

impl ControlRange {
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Moves `from` by `steps` increments and keeps the result inside the range.
    ///
    /// The result lies on the decimal grid `min + k * step`, the way a browser
    /// range input reports it, so stepping 2.0 by 0.1 three times yields 2.3.
    pub fn stepped(&self, from: f32, steps: i32) -> f32 {
        if self.step <= 0.0 || !self.step.is_finite() {
            return self.clamp(from);
        }
        let (min, step) = (f64::from(self.min), f64::from(self.step));
        let index = ((f64::from(from) - min) / step).round() + f64::from(steps);
        let scale = 10f64.powi(decimals(self.min).max(decimals(self.step)) as i32);
        let value = ((min + index * step) * scale).round() / scale;
        self.clamp(value as f32)
    }
}

/// Decimal places needed to write `value` as typed in markup, at most six.
fn decimals(value: f32) -> u32 {
    let value = f64::from(value);
    (0..6)
        .find(|&places| {
            let scaled = value * 10f64.powi(places as i32);
            (scaled - scaled.round()).abs() < 1e-4
        })
        .unwrap_or(6)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorControls {
    pub width: ControlRange,
    pub height: ControlRange,
}

impl Default for DoorControls {
    fn default() -> Self {
        let spec = DoorSpec::default();
        Self {
            width: ControlRange {
                min: 1.0,
                max: 4.0,
                step: 0.1,
                value: spec.width,
            },
            height: ControlRange {
                min: 2.0,
                max: 6.0,
                step: 0.1,
                value: spec.height,
            },
        }
    }
}

impl DoorControls {
    pub fn get(&self, dimension: Dimension) -> &ControlRange {
        match dimension {
            Dimension::Width => &self.width,
            Dimension::Height => &self.height,
        }
    }

    pub fn get_mut(&mut self, dimension: Dimension) -> &mut ControlRange {
        match dimension {
            Dimension::Width => &mut self.width,
            Dimension::Height => &mut self.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Door Configurator".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub shadow_map_size: u32,
    /// Half size of the orthographic shadow camera.
    pub shadow_extent: f32,
    pub reflection_resolution: u32,
    pub clear_color: [f32; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            shadow_map_size: 512,
            shadow_extent: 10.0,
            reflection_resolution: 256,
            clear_color: [0.0, 0.0, 0.0],
        }
    }
}
