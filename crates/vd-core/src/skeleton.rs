//! Articulated figure assembly

use std::collections::HashSet;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::backend::{
    AngleRange, BodyDesc, ConstraintDesc, ConstraintHandle, PhysicsBackend, SceneBackend, Shape,
};
use crate::error::{Result, VoodooError};
use crate::registry::{BodyRegistry, PartId};
use crate::visuals::{self, BODY_COLOR};

pub const TORSO: &str = "Torso";
pub const HEAD: &str = "Head";
pub const UPPER_ARM_L: &str = "UpperArm_L";
pub const UPPER_ARM_R: &str = "UpperArm_R";
pub const LOWER_ARM_L: &str = "LowerArm_L";
pub const LOWER_ARM_R: &str = "LowerArm_R";
pub const UPPER_LEG_L: &str = "UpperLeg_L";
pub const UPPER_LEG_R: &str = "UpperLeg_R";
pub const LOWER_LEG_L: &str = "LowerLeg_L";
pub const LOWER_LEG_R: &str = "LowerLeg_R";

/// Parts every figure must provide
pub const REQUIRED_PARTS: [&str; 10] = [
    TORSO,
    HEAD,
    UPPER_ARM_L,
    UPPER_ARM_R,
    LOWER_ARM_L,
    LOWER_ARM_R,
    UPPER_LEG_L,
    UPPER_LEG_R,
    LOWER_LEG_L,
    LOWER_LEG_R,
];

const LINEAR_DAMPING: f32 = 0.45;
const ANGULAR_DAMPING: f32 = 0.9;

fn default_linear_damping() -> f32 {
    LINEAR_DAMPING
}

fn default_angular_damping() -> f32 {
    ANGULAR_DAMPING
}

fn default_color() -> [f32; 4] {
    BODY_COLOR
}

/// One rigid part of the figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSpec {
    pub name: String,
    pub shape: Shape,
    pub mass: f32,
    /// Initial world position
    pub position: Vec3,
    #[serde(default = "default_linear_damping")]
    pub linear_damping: f32,
    #[serde(default = "default_angular_damping")]
    pub angular_damping: f32,
    #[serde(default = "default_color")]
    pub color: [f32; 4],
}

impl PartSpec {
    pub fn new(name: impl Into<String>, shape: Shape, mass: f32, position: Vec3) -> Self {
        Self {
            name: name.into(),
            shape,
            mass,
            position,
            linear_damping: LINEAR_DAMPING,
            angular_damping: ANGULAR_DAMPING,
            color: BODY_COLOR,
        }
    }
}

/// Degrees of freedom of a structural joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JointKind {
    /// Free rotation about the pivot
    Ball,
    /// Rotation about `axis` (in both parts' frames) within `limits`
    Hinge { axis: Vec3, limits: AngleRange },
}

/// Permanent connection between two parts at local pivots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointSpec {
    pub name: String,
    pub part_a: String,
    pub part_b: String,
    pub pivot_a: Vec3,
    pub pivot_b: Vec3,
    pub kind: JointKind,
}

impl JointSpec {
    pub fn ball(
        name: impl Into<String>,
        part_a: impl Into<String>,
        pivot_a: Vec3,
        part_b: impl Into<String>,
        pivot_b: Vec3,
    ) -> Self {
        Self {
            name: name.into(),
            part_a: part_a.into(),
            part_b: part_b.into(),
            pivot_a,
            pivot_b,
            kind: JointKind::Ball,
        }
    }

    pub fn hinge(
        name: impl Into<String>,
        part_a: impl Into<String>,
        pivot_a: Vec3,
        part_b: impl Into<String>,
        pivot_b: Vec3,
        axis: Vec3,
        limits: AngleRange,
    ) -> Self {
        Self {
            name: name.into(),
            part_a: part_a.into(),
            part_b: part_b.into(),
            pivot_a,
            pivot_b,
            kind: JointKind::Hinge { axis, limits },
        }
    }

    fn to_constraint(&self, registry: &BodyRegistry) -> Result<ConstraintDesc> {
        let context = format!("joint '{}'", self.name);
        let body_a = registry
            .get(registry.require(&self.part_a, &context)?)
            .map(|part| part.body);
        let body_b = registry
            .get(registry.require(&self.part_b, &context)?)
            .map(|part| part.body);
        let (Some(body_a), Some(body_b)) = (body_a, body_b) else {
            return Err(VoodooError::ConstraintRejected(self.name.clone()));
        };

        Ok(match self.kind {
            JointKind::Ball => ConstraintDesc::PointToPoint {
                body_a,
                pivot_a: self.pivot_a,
                body_b,
                pivot_b: self.pivot_b,
            },
            JointKind::Hinge { axis, limits } => ConstraintDesc::Hinge {
                body_a,
                pivot_a: self.pivot_a,
                axis_a: axis,
                body_b,
                pivot_b: self.pivot_b,
                axis_b: axis,
                limits: Some(limits),
            },
        })
    }
}

/// Declarative description of a figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonSpec {
    pub parts: Vec<PartSpec>,
    pub joints: Vec<JointSpec>,
}

impl SkeletonSpec {
    /// The stock doll: box torso and limbs, sphere head
    pub fn humanoid() -> Self {
        let mut parts = vec![
            PartSpec::new(TORSO, Shape::cuboid(0.6, 0.9, 0.35), 1.2, Vec3::new(0.0, 2.6, 0.0)),
            PartSpec::new(HEAD, Shape::sphere(0.26), 0.6, Vec3::new(0.0, 3.3, 0.0)),
        ];
        let mut joints = vec![JointSpec::ball(
            "Neck",
            TORSO,
            Vec3::new(0.0, 0.45, 0.0),
            HEAD,
            Vec3::new(0.0, -0.2, 0.0),
        )];

        for (side, sign, upper_arm, lower_arm, upper_leg, lower_leg) in [
            ("L", -1.0, UPPER_ARM_L, LOWER_ARM_L, UPPER_LEG_L, LOWER_LEG_L),
            ("R", 1.0, UPPER_ARM_R, LOWER_ARM_R, UPPER_LEG_R, LOWER_LEG_R),
        ] {
            parts.push(PartSpec::new(
                upper_arm,
                Shape::cuboid(0.2, 0.5, 0.2),
                0.5,
                Vec3::new(0.55 * sign, 2.75, 0.0),
            ));
            parts.push(PartSpec::new(
                lower_arm,
                Shape::cuboid(0.18, 0.45, 0.18),
                0.45,
                Vec3::new(0.55 * sign, 2.2, 0.0),
            ));
            parts.push(PartSpec::new(
                upper_leg,
                Shape::cuboid(0.24, 0.6, 0.24),
                0.7,
                Vec3::new(0.2 * sign, 1.95, 0.0),
            ));
            parts.push(PartSpec::new(
                lower_leg,
                Shape::cuboid(0.22, 0.55, 0.22),
                0.6,
                Vec3::new(0.2 * sign, 1.4, 0.0),
            ));

            // Left and right elbow ranges are mirrored
            let elbow_limits = if sign < 0.0 {
                AngleRange::new(-0.2, 1.3)
            } else {
                AngleRange::new(-1.3, 0.2)
            };

            joints.push(JointSpec::ball(
                format!("Shoulder_{side}"),
                TORSO,
                Vec3::new(0.35 * sign, 0.25, 0.0),
                upper_arm,
                Vec3::new(0.0, 0.25, 0.0),
            ));
            joints.push(JointSpec::hinge(
                format!("Elbow_{side}"),
                upper_arm,
                Vec3::new(0.0, -0.25, 0.0),
                lower_arm,
                Vec3::new(0.0, 0.22, 0.0),
                Vec3::Z,
                elbow_limits,
            ));
            joints.push(JointSpec::ball(
                format!("Hip_{side}"),
                TORSO,
                Vec3::new(0.15 * sign, -0.45, 0.0),
                upper_leg,
                Vec3::new(0.0, 0.3, 0.0),
            ));
            joints.push(JointSpec::hinge(
                format!("Knee_{side}"),
                upper_leg,
                Vec3::new(0.0, -0.3, 0.0),
                lower_leg,
                Vec3::new(0.0, 0.27, 0.0),
                Vec3::X,
                AngleRange::new(-0.2, 1.2),
            ));
        }

        Self { parts, joints }
    }

    /// Check the whole description without touching any backend
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for part in &self.parts {
            if !names.insert(part.name.as_str()) {
                return Err(VoodooError::DuplicatePart(part.name.clone()));
            }
            if part.mass.is_nan() || part.mass <= 0.0 {
                return Err(VoodooError::InvalidMass(part.name.clone()));
            }
        }

        for required in REQUIRED_PARTS {
            if !names.contains(required) {
                return Err(VoodooError::MissingPart(required.to_string()));
            }
        }

        for joint in &self.joints {
            for part in [&joint.part_a, &joint.part_b] {
                if !names.contains(part.as_str()) {
                    return Err(VoodooError::UnknownPart {
                        name: part.clone(),
                        context: format!("joint '{}'", joint.name),
                    });
                }
            }
            if joint.part_a == joint.part_b {
                return Err(VoodooError::SelfJoint(joint.name.clone()));
            }
            if let JointKind::Hinge { limits, .. } = joint.kind {
                if limits.min > limits.max {
                    return Err(VoodooError::InvalidRange {
                        joint: joint.name.clone(),
                        min: limits.min,
                        max: limits.max,
                    });
                }
            }
        }

        Ok(())
    }
}

impl Default for SkeletonSpec {
    fn default() -> Self {
        Self::humanoid()
    }
}

/// A joint created in the physics backend
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralJoint {
    pub name: String,
    pub part_a: PartId,
    pub part_b: PartId,
    pub kind: JointKind,
    pub constraint: ConstraintHandle,
}

/// Upper and lower segment of an arm or leg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limb {
    pub upper: PartId,
    pub lower: PartId,
}

/// Handles of the assembled figure
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    pub torso: PartId,
    pub head: PartId,
    pub left_arm: Limb,
    pub right_arm: Limb,
    pub left_leg: Limb,
    pub right_leg: Limb,
    pub joints: Vec<StructuralJoint>,
}

/// Create every part and joint of `spec` and register the parts.
///
/// The spec is validated before any body or visual is created.
pub fn build<P, S>(
    spec: &SkeletonSpec,
    physics: &mut P,
    scene: &mut S,
    registry: &mut BodyRegistry,
) -> Result<Skeleton>
where
    P: PhysicsBackend + ?Sized,
    S: SceneBackend + ?Sized,
{
    spec.validate()?;
    for part in &spec.parts {
        if registry.by_name(&part.name).is_some() {
            return Err(VoodooError::DuplicatePart(part.name.clone()));
        }
    }

    for part in &spec.parts {
        let desc = BodyDesc::dynamic(part.shape, part.mass, part.position)
            .with_damping(part.linear_damping, part.angular_damping);
        let body = physics.create_body(&desc);
        let node = scene.spawn(&visuals::part_visual(&part.name, part.shape, part.color));
        if let Some(pose) = physics.body_pose(body) {
            scene.set_world_pose(node, pose);
        }
        registry.register(part.name.clone(), part.shape, part.mass, body, node)?;
        tracing::debug!("Created part '{}' (mass {})", part.name, part.mass);
    }

    let mut joints = Vec::with_capacity(spec.joints.len());
    for joint in &spec.joints {
        let desc = joint.to_constraint(registry)?;
        let constraint = physics
            .create_constraint(&desc)
            .ok_or_else(|| VoodooError::ConstraintRejected(joint.name.clone()))?;
        joints.push(StructuralJoint {
            name: joint.name.clone(),
            part_a: registry.require(&joint.part_a, &joint.name)?,
            part_b: registry.require(&joint.part_b, &joint.name)?,
            kind: joint.kind,
            constraint,
        });
    }

    let limb = |upper: &str, lower: &str| -> Result<Limb> {
        Ok(Limb {
            upper: registry.require(upper, "skeleton")?,
            lower: registry.require(lower, "skeleton")?,
        })
    };

    let skeleton = Skeleton {
        torso: registry.require(TORSO, "skeleton")?,
        head: registry.require(HEAD, "skeleton")?,
        left_arm: limb(UPPER_ARM_L, LOWER_ARM_L)?,
        right_arm: limb(UPPER_ARM_R, LOWER_ARM_R)?,
        left_leg: limb(UPPER_LEG_L, LOWER_LEG_L)?,
        right_leg: limb(UPPER_LEG_R, LOWER_LEG_R)?,
        joints,
    };

    tracing::info!(
        "Built skeleton with {} parts and {} joints",
        spec.parts.len(),
        skeleton.joints.len()
    );
    Ok(skeleton)
}
