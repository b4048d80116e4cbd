//! Hemisphere light, one directional key light and linear fog

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::config::{FogConfig, LightingConfig};

/// Light uniform buffer data
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    /// Unit direction towards the key light, w = intensity
    pub direction: [f32; 4],
    /// Hemisphere sky color, w = hemisphere strength
    pub sky: [f32; 4],
    /// Hemisphere ground color
    pub ground: [f32; 4],
    /// Fog color, w = 1 when fog is on
    pub fog_color: [f32; 4],
    /// Fog start and full-fog distances in x and y
    pub fog_range: [f32; 4],
}

impl LightUniform {
    /// Pack the light and fog settings
    pub fn new(lighting: &LightingConfig, fog: &FogConfig) -> Self {
        let direction = lighting.direction.normalize_or(Vec3::Y);
        let [sr, sg, sb] = lighting.sky_color;
        let [gr, gg, gb] = lighting.ground_color;
        let [fr, fg, fb] = fog.color;
        // A zero-width fog band would divide by zero in the shader
        let fog_on = fog.enabled && fog.far > fog.near;

        Self {
            direction: direction.extend(lighting.intensity).to_array(),
            sky: [sr, sg, sb, lighting.ambient_strength],
            ground: [gr, gg, gb, 0.0],
            fog_color: [fr, fg, fb, if fog_on { 1.0 } else { 0.0 }],
            fog_range: [fog.near, fog.far, 0.0, 0.0],
        }
    }
}

impl Default for LightUniform {
    fn default() -> Self {
        Self::new(&LightingConfig::default(), &FogConfig::default())
    }
}
