//! Visual descriptions of parts, pins and nails

use glam::{Quat, Vec3};

use crate::backend::{Shape, VisualDesc, VisualPrimitive, VisualShape};
use crate::geometry::Pose;

/// Default doll color (RGBA)
pub const BODY_COLOR: [f32; 4] = [0.494, 0.365, 0.255, 1.0];

const PIN_SHAFT_COLOR: [f32; 4] = [0.553, 0.553, 0.553, 1.0];
const PIN_TIP_COLOR: [f32; 4] = [0.42, 0.42, 0.42, 1.0];
const PIN_HEAD_COLOR: [f32; 4] = [0.698, 0.231, 0.231, 1.0];

const NAIL_SHAFT_COLOR: [f32; 4] = [0.239, 0.227, 0.212, 1.0];
const NAIL_TIP_COLOR: [f32; 4] = [0.169, 0.153, 0.137, 1.0];
const NAIL_HEAD_COLOR: [f32; 4] = [0.18, 0.149, 0.125, 1.0];

const BASKET_RIM_COLOR: [f32; 4] = [0.416, 0.294, 0.192, 1.0];
const BASKET_BASE_COLOR: [f32; 4] = [0.541, 0.396, 0.275, 1.0];
const BASKET_RIM_RADIUS: f32 = 0.55;
const BASKET_RIM_TUBE: f32 = 0.08;
const BASKET_BASE_RADIUS: f32 = 0.5;
const BASKET_BASE_HEIGHT: f32 = 0.09;
const BASKET_RIM_SEGMENTS: usize = 16;

pub const PIN_NAME: &str = "Pin";
pub const NAIL_NAME: &str = "Nail";
pub const BASKET_NAME: &str = "Basket";

fn primitive(shape: VisualShape, z: f32, color: [f32; 4]) -> VisualPrimitive {
    VisualPrimitive {
        shape,
        offset: Pose::new(Vec3::new(0.0, 0.0, z), Quat::IDENTITY),
        color,
    }
}

/// Single-primitive visual matching a part's collision shape
pub fn part_visual(name: &str, shape: Shape, color: [f32; 4]) -> VisualDesc {
    VisualDesc {
        name: name.to_string(),
        primitives: vec![VisualPrimitive {
            shape: shape.into(),
            offset: Pose::IDENTITY,
            color,
        }],
    }
}

/// Shaft, tip and round head, pointing down local -Z
pub fn pin_visual() -> VisualDesc {
    VisualDesc {
        name: PIN_NAME.to_string(),
        primitives: vec![
            primitive(
                VisualShape::Cylinder {
                    radius: 0.025,
                    length: 0.2,
                },
                0.0,
                PIN_SHAFT_COLOR,
            ),
            primitive(
                VisualShape::Cone {
                    radius: 0.025,
                    length: 0.06,
                },
                -0.13,
                PIN_TIP_COLOR,
            ),
            primitive(VisualShape::Sphere { radius: 0.06 }, 0.15, PIN_HEAD_COLOR),
        ],
    }
}

pub fn nail_visual() -> VisualDesc {
    VisualDesc {
        name: NAIL_NAME.to_string(),
        primitives: vec![
            primitive(
                VisualShape::Cylinder {
                    radius: 0.03,
                    length: 0.5,
                },
                0.0,
                NAIL_SHAFT_COLOR,
            ),
            primitive(
                VisualShape::Cone {
                    radius: 0.03,
                    length: 0.1,
                },
                -0.3,
                NAIL_TIP_COLOR,
            ),
            primitive(VisualShape::Sphere { radius: 0.06 }, 0.3, NAIL_HEAD_COLOR),
        ],
    }
}

/// Flat base with a rim of short cylinders around it. The origin sits on the
/// floor at the basket center.
pub fn basket_visual() -> VisualDesc {
    // Cylinders run along local Z; this stands them upright
    let upright = Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
    let mut primitives = vec![VisualPrimitive {
        shape: VisualShape::Cylinder {
            radius: BASKET_BASE_RADIUS,
            length: BASKET_BASE_HEIGHT,
        },
        offset: Pose::new(Vec3::Y * (BASKET_BASE_HEIGHT * 0.5), upright),
        color: BASKET_BASE_COLOR,
    }];

    let step = std::f32::consts::TAU / BASKET_RIM_SEGMENTS as f32;
    let chord = 2.0 * BASKET_RIM_RADIUS * (step * 0.5).sin();
    for i in 0..BASKET_RIM_SEGMENTS {
        let angle = (i as f32 + 0.5) * step;
        let center = Vec3::new(
            angle.cos() * BASKET_RIM_RADIUS,
            BASKET_BASE_HEIGHT,
            angle.sin() * BASKET_RIM_RADIUS,
        );
        // Segment axis is tangent to the rim circle
        let tangent = Vec3::new(-angle.sin(), 0.0, angle.cos());
        primitives.push(VisualPrimitive {
            shape: VisualShape::Cylinder {
                radius: BASKET_RIM_TUBE,
                length: chord + BASKET_RIM_TUBE,
            },
            offset: Pose::new(center, Quat::from_rotation_arc(Vec3::Z, tangent)),
            color: BASKET_RIM_COLOR,
        });
    }

    VisualDesc {
        name: BASKET_NAME.to_string(),
        primitives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_basket_base_stands_on_floor() {
        let basket = basket_visual();
        assert_eq!(basket.primitives.len(), BASKET_RIM_SEGMENTS + 1);

        let base = &basket.primitives[0];
        let axis = base.offset.rotation * Vec3::Z;
        assert_relative_eq!(axis.y.abs(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(base.offset.position.y, BASKET_BASE_HEIGHT * 0.5);
    }

    #[test]
    fn test_basket_rim_follows_circle() {
        for rim in &basket_visual().primitives[1..] {
            let p = rim.offset.position;
            assert_relative_eq!(Vec3::new(p.x, 0.0, p.z).length(), BASKET_RIM_RADIUS, epsilon = 1e-5);
            let axis = rim.offset.rotation * Vec3::Z;
            assert_relative_eq!(axis.dot(Vec3::new(p.x, 0.0, p.z).normalize()), 0.0, epsilon = 1e-5);
        }
    }
}
