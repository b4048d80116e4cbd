//! Voodoo core: ragdoll assembly, picking, dragging, pins and nails
//!
//! Everything here is backend-agnostic. Physics and rendering are reached only
//! through [`PhysicsBackend`] and [`SceneBackend`].

pub mod backend;
pub mod config;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod nails;
pub mod picking;
pub mod pins;
pub mod registry;
pub mod session;
pub mod simulation;
pub mod skeleton;
pub mod visuals;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{
    AngleRange, BodyDesc, BodyHandle, BodyKind, ConstraintDesc, ConstraintHandle, NodeId,
    PhysicsBackend, RayHit, SceneBackend, Shape, VisualDesc, VisualPrimitive, VisualShape,
};
pub use config::{BasketConfig, InteractionConfig, PinSpec, SimulationConfig, VoodooConfig};
pub use drag::{DragController, DragSession};
pub use error::{Result, VoodooError};
pub use geometry::{Plane, Pose, Ray, TrackingPlane};
pub use input::{DepthKey, InputEvent, Viewport};
pub use interaction::{DepthTarget, GestureMode, InteractionState, PointerKind};
pub use nails::{Nail, NailId, NailSubsystem, NailToggle};
pub use picking::Pick;
pub use pins::{AttachmentTarget, Pin, PinId, PinRelease, PinSubsystem};
pub use registry::{BodyRegistry, PartId, RigidPart};
pub use session::Session;
pub use simulation::FrameStats;
pub use skeleton::{JointKind, JointSpec, Limb, PartSpec, Skeleton, SkeletonSpec, StructuralJoint};
