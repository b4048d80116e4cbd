//! Renderer configuration structures
//!
//! Everything here is serializable so the viewer can load it alongside the
//! rest of its settings.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Camera default configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance
    pub near_plane: f32,
    /// Far clipping plane distance
    pub far_plane: f32,
    /// Initial eye position
    pub eye: Vec3,
    /// Point the camera orbits around
    pub target: Vec3,
    /// Orbit sensitivity in radians per pixel
    pub orbit_sensitivity: f32,
    /// Zoom sensitivity multiplier
    pub zoom_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near_plane: 0.1,
            far_plane: 100.0,
            eye: Vec3::new(0.0, 2.8, 6.6),
            target: Vec3::new(0.0, 2.8, 0.0),
            orbit_sensitivity: 0.005,
            zoom_sensitivity: 0.1,
        }
    }
}

/// Lighting configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    /// Direction towards the key light
    pub direction: Vec3,
    /// Key light intensity multiplier
    pub intensity: f32,
    /// Sky color of the hemisphere light (RGB)
    pub sky_color: [f32; 3],
    /// Ground color of the hemisphere light (RGB)
    pub ground_color: [f32; 3],
    /// Hemisphere light strength
    pub ambient_strength: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            direction: Vec3::new(3.0, 6.0, 2.0),
            intensity: 0.9,
            sky_color: [1.0, 1.0, 1.0],
            ground_color: [0.541, 0.467, 0.373],
            ambient_strength: 0.7,
        }
    }
}

/// Linear distance fog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FogConfig {
    /// Whether fog is applied
    pub enabled: bool,
    /// Fog color (RGB)
    pub color: [f32; 3],
    /// Distance where fog starts
    pub near: f32,
    /// Distance of full fog
    pub far: f32,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: [0.906, 0.882, 0.839],
            near: 6.0,
            far: 16.0,
        }
    }
}

/// Floor grid configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FloorConfig {
    /// Whether the floor grid is drawn
    pub enabled: bool,
    /// Grid extent (half-size in each direction)
    pub size: f32,
    /// Grid line spacing
    pub spacing: f32,
    /// Floor fill color (RGB)
    pub color: [f32; 3],
    /// Grid line color (RGB)
    pub line_color: [f32; 3],
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 3.0,
            spacing: 0.5,
            color: [0.839, 0.796, 0.725],
            line_color: [0.74, 0.69, 0.62],
        }
    }
}

/// Complete renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RendererConfig {
    /// Background clear color (RGBA)
    pub background_color: [f32; 4],
    /// Camera settings
    pub camera: CameraConfig,
    /// Lighting settings
    pub lighting: LightingConfig,
    /// Fog settings
    pub fog: FogConfig,
    /// Floor settings
    pub floor: FloorConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            background_color: [0.847, 0.816, 0.761, 1.0],
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
            fog: FogConfig::default(),
            floor: FloorConfig::default(),
        }
    }
}
