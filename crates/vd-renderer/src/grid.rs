//! Floor grid on the XZ plane

use glam::{Mat4, Vec3};

use crate::config::FloorConfig;
use crate::vertex::{LineVertex, PrimitiveInstance};

/// Height of the grid lines above the floor surface
const LINE_LIFT: f32 = 0.002;
/// Thickness of the floor slab below `y = 0`
const SLAB_THICKNESS: f32 = 0.02;

/// Line-list vertices of a square grid just above `y = 0`
pub fn grid_vertices(config: &FloorConfig) -> Vec<LineVertex> {
    if !config.enabled || config.spacing <= 0.0 || config.size <= 0.0 {
        return Vec::new();
    }

    let half_size = config.size;
    let num_lines = (config.size / config.spacing) as i32;
    let color = config.line_color;
    let mut vertices = Vec::with_capacity((num_lines as usize * 2 + 1) * 4);
    let mut line = |start: Vec3, end: Vec3| {
        vertices.push(LineVertex {
            position: start.to_array(),
            color,
        });
        vertices.push(LineVertex {
            position: end.to_array(),
            color,
        });
    };

    // Lines parallel to X axis
    for i in -num_lines..=num_lines {
        let z = i as f32 * config.spacing;
        line(
            Vec3::new(-half_size, LINE_LIFT, z),
            Vec3::new(half_size, LINE_LIFT, z),
        );
    }

    // Lines parallel to Z axis
    for i in -num_lines..=num_lines {
        let x = i as f32 * config.spacing;
        line(
            Vec3::new(x, LINE_LIFT, -half_size),
            Vec3::new(x, LINE_LIFT, half_size),
        );
    }

    vertices
}

/// Unit-cube instance for the floor fill, top face at `y = 0`
pub fn floor_slab(config: &FloorConfig) -> Option<PrimitiveInstance> {
    if !config.enabled || config.size <= 0.0 {
        return None;
    }
    let side = config.size * 2.0;
    let model = Mat4::from_scale_rotation_translation(
        Vec3::new(side, SLAB_THICKNESS, side),
        glam::Quat::IDENTITY,
        Vec3::new(0.0, -SLAB_THICKNESS * 0.5, 0.0),
    );
    let [r, g, b] = config.color;
    Some(PrimitiveInstance::new(model, [r, g, b, 1.0]))
}
