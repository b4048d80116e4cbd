//! Session configuration
//!
//! Every section has defaults matching the stock doll, so a RON file only
//! needs the fields it overrides.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoodooError};
use crate::skeleton::SkeletonSpec;

/// Gesture tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InteractionConfig {
    /// Longest press (seconds) that still counts as a tap
    pub tap_max_duration: f64,
    /// Largest mouse displacement (pixels) that still counts as a tap
    pub tap_max_distance_mouse: f32,
    /// Largest touch displacement (pixels) that still counts as a tap
    pub tap_max_distance_touch: f32,
    /// Impulse applied to a tapped part
    pub poke_impulse: Vec3,
    /// Depth change per wheel delta unit
    pub wheel_depth_scale: f32,
    /// Depth change per key press
    pub key_depth_step: f32,
    /// Depth change per pixel of two-finger vertical motion
    pub touch_depth_scale: f32,
    /// Depth change per pixel of vertical mouse motion while dragging a body
    pub drag_vertical_depth_scale: f32,
    /// Accumulated depth offset stays within `[-depth_limit, depth_limit]`
    pub depth_limit: f32,
    /// Distance a placed pin is pushed along the camera direction
    pub pin_surface_bias: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            tap_max_duration: 0.22,
            tap_max_distance_mouse: 6.0,
            tap_max_distance_touch: 10.0,
            poke_impulse: Vec3::new(0.0, 2.5, 0.0),
            wheel_depth_scale: 0.002,
            key_depth_step: 0.08,
            touch_depth_scale: 0.006,
            drag_vertical_depth_scale: 0.004,
            depth_limit: 4.0,
            pin_surface_bias: 0.06,
        }
    }
}

/// Frame loop timing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Logical physics step (seconds)
    pub fixed_step: f32,
    /// Frame deltas are clamped to this before stepping
    pub max_delta: f32,
    /// Upper bound on fixed steps per frame
    pub max_substeps: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_step: 1.0 / 60.0,
            max_delta: 0.02,
            max_substeps: 3,
        }
    }
}

/// Pin holding area
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BasketConfig {
    /// World position of the basket container
    pub position: Vec3,
    /// Returned pins land within `±spread / 2` on x and z
    pub spread: f32,
    /// Height of resting pins above the basket origin
    pub rest_height: f32,
    /// Resting offsets of the pins present at startup
    pub initial_offsets: Vec<Vec3>,
}

impl Default for BasketConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.05, 0.0),
            spread: 0.18,
            rest_height: 0.16,
            initial_offsets: vec![
                Vec3::new(0.0, 0.18, 0.0),
                Vec3::new(0.18, 0.16, 0.1),
                Vec3::new(-0.15, 0.16, -0.1),
                Vec3::new(0.1, 0.16, -0.15),
                Vec3::new(-0.2, 0.16, 0.15),
                Vec3::new(0.0, 0.16, -0.22),
            ],
        }
    }
}

/// A pin that starts attached to a part
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PinSpec {
    /// Name of the part the pin is stuck into
    pub part: String,
    /// Offset in the part's local frame
    pub offset: Vec3,
}

impl PinSpec {
    pub fn new(part: impl Into<String>, offset: Vec3) -> Self {
        Self {
            part: part.into(),
            offset,
        }
    }
}

fn default_pins() -> Vec<PinSpec> {
    vec![
        PinSpec::new("Torso", Vec3::new(0.2, 0.1, 0.22)),
        PinSpec::new("Torso", Vec3::new(-0.15, -0.35, 0.2)),
        PinSpec::new("Torso", Vec3::new(0.0, 0.5, 0.22)),
    ]
}

/// Complete session configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoodooConfig {
    #[serde(default = "SkeletonSpec::humanoid")]
    pub skeleton: SkeletonSpec,
    #[serde(default = "default_pins")]
    pub pins: Vec<PinSpec>,
    #[serde(default)]
    pub basket: BasketConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Default for VoodooConfig {
    fn default() -> Self {
        Self {
            skeleton: SkeletonSpec::humanoid(),
            pins: default_pins(),
            basket: BasketConfig::default(),
            interaction: InteractionConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl VoodooConfig {
    /// Parse a configuration from RON text
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    /// Load a configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_ron_str(&text)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path.as_ref());
        Ok(config)
    }

    /// Reject values that would break basket placement, depth clamping or stepping
    pub fn validate(&self) -> Result<()> {
        let lengths = [
            ("basket.spread", self.basket.spread),
            ("basket.rest_height", self.basket.rest_height),
            ("interaction.depth_limit", self.interaction.depth_limit),
            ("simulation.max_delta", self.simulation.max_delta),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(VoodooError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        let step = self.simulation.fixed_step;
        if !step.is_finite() || step <= 0.0 {
            return Err(VoodooError::InvalidConfig(format!(
                "simulation.fixed_step must be finite and positive, got {step}"
            )));
        }
        Ok(())
    }
}
