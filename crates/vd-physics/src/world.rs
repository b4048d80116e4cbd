//! Physics world backed by a rapier pipeline
//!
//! Bodies and joints are tracked under voodoo handles and mapped onto rapier
//! handles. Time advances in whole fixed steps; leftover time is carried in an
//! accumulator between calls to [`PhysicsBackend::step`].

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use glam::{Quat, Vec3};
use rapier3d::prelude::*;
use vd_core::{
    BodyDesc, BodyHandle, BodyKind, ConstraintDesc, ConstraintHandle, PhysicsBackend, Pose, Shape,
};

use crate::config::WorldConfig;
use crate::error::Result;

/// Bookkeeping for one joint, in voodoo terms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointRecord {
    pub handle: ImpulseJointHandle,
    pub body_a: BodyHandle,
    pub pivot_a: Vec3,
    pub body_b: BodyHandle,
    pub pivot_b: Vec3,
    /// Rotation axis in body A's frame, for hinges
    pub hinge_axis: Option<Vec3>,
}

pub struct PhysicsWorld {
    config: WorldConfig,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,

    bodies: BTreeMap<BodyHandle, RigidBodyHandle>,
    joints: BTreeMap<ConstraintHandle, JointRecord>,
    next_body: u64,
    next_constraint: u64,
    accumulator: f32,
    steps_taken: u64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::build(WorldConfig::default())
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            "Physics world: gravity {:?}, {} solver iterations, {} boundaries",
            config.gravity,
            config.solver_iterations,
            config.boundaries.len()
        );
        Ok(Self::build(config))
    }

    fn build(config: WorldConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        if let Some(iterations) = NonZeroUsize::new(config.solver_iterations as usize) {
            integration_parameters.num_solver_iterations = iterations;
        }

        let mut collider_set = ColliderSet::new();
        for boundary in &config.boundaries {
            let normal = UnitVector::new_normalize(to_vector(boundary.normal));
            let wall = ColliderBuilder::halfspace(normal)
                .translation(to_vector(boundary.origin()))
                .friction(config.friction)
                .restitution(config.restitution)
                .build();
            collider_set.insert(wall);
        }

        Self {
            gravity: to_vector(config.gravity),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set,
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            bodies: BTreeMap::new(),
            joints: BTreeMap::new(),
            next_body: 0,
            next_constraint: 0,
            accumulator: 0.0,
            steps_taken: 0,
            config,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn joint(&self, handle: ConstraintHandle) -> Option<&JointRecord> {
        self.joints.get(&handle)
    }

    /// Number of fixed steps run so far
    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    /// Unconsumed time carried into the next call to `step`
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.rigid_body(handle).map(|body| from_vector(body.linvel()))
    }

    pub fn angular_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.rigid_body(handle).map(|body| from_vector(body.angvel()))
    }

    pub fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.rigid_body_mut(handle) {
            if body.is_dynamic() {
                body.set_linvel(to_vector(velocity), true);
            }
        }
    }

    pub fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.rigid_body_mut(handle) {
            if body.is_dynamic() {
                body.set_angvel(to_vector(velocity), true);
            }
        }
    }

    /// Current angle of a hinge joint, measured about its axis from the
    /// relative orientation the two bodies were created with
    pub fn hinge_angle(&self, handle: ConstraintHandle) -> Option<f32> {
        let joint = self.joints.get(&handle)?;
        let axis = joint.hinge_axis?;
        let a = self.body_pose(joint.body_a)?;
        let b = self.body_pose(joint.body_b)?;

        let mut relative = a.rotation.inverse() * b.rotation;
        if relative.w < 0.0 {
            relative = -relative;
        }
        let twist = Vec3::new(relative.x, relative.y, relative.z).dot(axis);
        Some(2.0 * twist.atan2(relative.w))
    }

    /// Run exactly one fixed step of `dt` seconds
    pub fn step_fixed(&mut self, dt: f32) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }

        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        self.steps_taken += 1;
    }

    fn rigid_body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies
            .get(&handle)
            .and_then(|rapier| self.rigid_body_set.get(*rapier))
    }

    fn rigid_body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies
            .get(&handle)
            .and_then(|rapier| self.rigid_body_set.get_mut(*rapier))
    }

    fn collider_for(&self, shape: Shape, mass: Option<f32>) -> Collider {
        let builder = match shape {
            Shape::Cuboid { size } => {
                let half = size * 0.5;
                ColliderBuilder::cuboid(half.x, half.y, half.z)
            }
            Shape::Sphere { radius } => ColliderBuilder::ball(radius),
        };
        let builder = builder
            .friction(self.config.friction)
            .restitution(self.config.restitution);
        match mass {
            Some(mass) => builder.mass(mass).build(),
            None => builder.build(),
        }
    }

    fn joint_for(&self, desc: &ConstraintDesc) -> (GenericJoint, Vec3, Vec3, Option<Vec3>) {
        let mut record = match *desc {
            ConstraintDesc::PointToPoint {
                pivot_a, pivot_b, ..
            } => {
                let joint = SphericalJointBuilder::new()
                    .local_anchor1(to_point(pivot_a))
                    .local_anchor2(to_point(pivot_b))
                    .build();
                (GenericJoint::from(joint), pivot_a, pivot_b, None)
            }
            ConstraintDesc::Hinge {
                pivot_a,
                axis_a,
                pivot_b,
                axis_b,
                limits,
                ..
            } => {
                let axis = axis_a.normalize_or_zero();
                let mut builder = RevoluteJointBuilder::new(UnitVector::new_normalize(to_vector(axis)))
                    .local_anchor1(to_point(pivot_a))
                    .local_anchor2(to_point(pivot_b));
                if let Some(range) = limits {
                    builder = builder.limits([range.min, range.max]);
                }
                let mut joint = GenericJoint::from(builder.build());
                joint.set_local_axis2(UnitVector::new_normalize(to_vector(axis_b)));
                (joint, pivot_a, pivot_b, Some(axis))
            }
        };
        record.0.set_contacts_enabled(self.config.collide_connected);
        record
    }
}

impl PhysicsBackend for PhysicsWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let body_type = match desc.kind {
            BodyKind::Dynamic => RigidBodyType::Dynamic,
            BodyKind::Kinematic => RigidBodyType::KinematicPositionBased,
            BodyKind::Static => RigidBodyType::Fixed,
        };

        let mut builder = RigidBodyBuilder::new(body_type)
            .translation(to_vector(desc.pose.position))
            .rotation(to_vector(desc.pose.rotation.to_scaled_axis()))
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .can_sleep(self.config.allow_sleep);
        let dynamic = desc.kind == BodyKind::Dynamic && desc.mass > 0.0;
        if dynamic && desc.shape.is_none() {
            builder = builder.additional_mass(desc.mass);
        }

        let rapier = self.rigid_body_set.insert(builder.build());
        if let Some(shape) = desc.shape {
            let collider = self.collider_for(shape, dynamic.then_some(desc.mass));
            self.collider_set
                .insert_with_parent(collider, rapier, &mut self.rigid_body_set);
            if let Some(body) = self.rigid_body_set.get_mut(rapier) {
                body.recompute_mass_properties_from_colliders(&self.collider_set);
            }
        }

        let handle = BodyHandle(self.next_body);
        self.next_body += 1;
        self.bodies.insert(handle, rapier);
        handle
    }

    fn remove_body(&mut self, body: BodyHandle) -> bool {
        let Some(rapier) = self.bodies.remove(&body) else {
            return false;
        };

        // Rapier drops the body's joints and colliders along with it
        self.rigid_body_set.remove(
            rapier,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );

        let before = self.joints.len();
        self.joints
            .retain(|_, joint| joint.body_a != body && joint.body_b != body);
        let dropped = before - self.joints.len();
        if dropped > 0 {
            tracing::debug!("Removed {} joints attached to body {:?}", dropped, body);
        }
        true
    }

    fn create_constraint(&mut self, desc: &ConstraintDesc) -> Option<ConstraintHandle> {
        let (a, b) = desc.bodies();
        let (Some(rapier_a), Some(rapier_b)) =
            (self.bodies.get(&a).copied(), self.bodies.get(&b).copied())
        else {
            tracing::warn!("Rejected constraint between {:?} and {:?}", a, b);
            return None;
        };
        if a == b {
            tracing::warn!("Rejected constraint of {:?} to itself", a);
            return None;
        }

        let (joint, pivot_a, pivot_b, hinge_axis) = self.joint_for(desc);
        let rapier = self
            .impulse_joint_set
            .insert(rapier_a, rapier_b, joint, true);

        let handle = ConstraintHandle(self.next_constraint);
        self.next_constraint += 1;
        self.joints.insert(
            handle,
            JointRecord {
                handle: rapier,
                body_a: a,
                pivot_a,
                body_b: b,
                pivot_b,
                hinge_axis,
            },
        );
        Some(handle)
    }

    fn remove_constraint(&mut self, constraint: ConstraintHandle) -> bool {
        let Some(joint) = self.joints.remove(&constraint) else {
            return false;
        };
        self.impulse_joint_set.remove(joint.handle, true);
        true
    }

    fn set_body_position(&mut self, body: BodyHandle, position: Vec3) {
        let Some(rapier) = self.bodies.get(&body).copied() else {
            return;
        };
        let Some(rigid) = self.rigid_body_set.get_mut(rapier) else {
            return;
        };

        let target = to_vector(position);
        rigid.set_translation(target, true);
        if rigid.is_kinematic() {
            rigid.set_next_kinematic_translation(target);
        }

        // Sleeping partners would otherwise ignore the moved anchor
        let partners: Vec<RigidBodyHandle> = self
            .impulse_joint_set
            .attached_joints(rapier)
            .map(|(a, b, _, _)| if a == rapier { b } else { a })
            .collect();
        for partner in partners {
            if let Some(rigid) = self.rigid_body_set.get_mut(partner) {
                rigid.wake_up(true);
            }
        }
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3, world_point: Vec3) {
        if let Some(rigid) = self.rigid_body_mut(body) {
            rigid.apply_impulse_at_point(to_vector(impulse), to_point(world_point), true);
        }
    }

    fn step(&mut self, fixed_dt: f32, delta: f32, max_substeps: u32) {
        if fixed_dt <= 0.0 || !fixed_dt.is_finite() {
            return;
        }
        if delta.is_finite() && delta > 0.0 {
            self.accumulator += delta;
        }

        let mut taken = 0;
        while self.accumulator >= fixed_dt && taken < max_substeps {
            self.step_fixed(fixed_dt);
            self.accumulator -= fixed_dt;
            taken += 1;
        }
        self.accumulator %= fixed_dt;
    }

    fn body_pose(&self, body: BodyHandle) -> Option<Pose> {
        self.rigid_body(body).map(|rigid| {
            Pose::new(
                from_vector(rigid.translation()),
                from_rotation(rigid.rotation()),
            )
        })
    }

    fn contains_body(&self, body: BodyHandle) -> bool {
        self.bodies.contains_key(&body)
    }

    fn contains_constraint(&self, constraint: ConstraintHandle) -> bool {
        self.joints.contains_key(&constraint)
    }

    fn constraint_count(&self) -> usize {
        self.joints.len()
    }
}

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn to_point(v: Vec3) -> Point<Real> {
    point![v.x, v.y, v.z]
}

fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn from_rotation(rotation: &Rotation<Real>) -> Quat {
    Quat::from_xyzw(rotation.i, rotation.j, rotation.k, rotation.w)
}
