//! Cosmetic pins: basket, held and attached placement
//!
//! Pins have no physics body. Their world transform is recomputed every frame
//! from an [`AttachmentTarget`], so a pin stuck into a part follows it without
//! any scene-graph reparenting.

use glam::{Vec2, Vec3};
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::{NodeId, SceneBackend};
use crate::config::{BasketConfig, PinSpec};
use crate::error::Result;
use crate::geometry::{Pose, Ray, TrackingPlane};
use crate::picking::{self, pick};
use crate::registry::{BodyRegistry, PartId};
use crate::visuals;

/// Pin identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinId(pub Uuid);

impl PinId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PinId {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a pin's transform comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttachmentTarget {
    /// Resting in the basket, offset from the basket origin
    Basket { offset: Vec3 },
    /// Free-floating under the pointer
    Held { position: Vec3 },
    /// Stuck into a part, offset in the part's local frame
    AttachedTo { part: PartId, offset: Vec3 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    pub id: PinId,
    pub node: NodeId,
    pub target: AttachmentTarget,
}

/// Outcome of releasing the held pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinRelease {
    Attached { pin: PinId, part: PartId },
    Returned { pin: PinId },
}

#[derive(Debug, Clone)]
struct HeldPin {
    pin: PinId,
    plane: TrackingPlane,
}

pub struct PinSubsystem {
    pins: Vec<Pin>,
    held: Option<HeldPin>,
    basket: BasketConfig,
    surface_bias: f32,
    rng: StdRng,
}

impl PinSubsystem {
    pub fn new(basket: BasketConfig, surface_bias: f32, rng: StdRng) -> Self {
        Self {
            pins: Vec::new(),
            held: None,
            basket,
            surface_bias,
            rng,
        }
    }

    /// Spawn the startup pins: `attached` on parts, then one per basket offset.
    ///
    /// Every part name is checked before anything is spawned.
    pub fn populate<S>(
        &mut self,
        scene: &mut S,
        registry: &BodyRegistry,
        attached: &[PinSpec],
    ) -> Result<()>
    where
        S: SceneBackend + ?Sized,
    {
        let resolved = attached
            .iter()
            .map(|spec| {
                registry
                    .require(&spec.part, "pin")
                    .map(|part| (part, spec.offset))
            })
            .collect::<Result<Vec<_>>>()?;

        for (part, offset) in resolved {
            self.spawn(scene, AttachmentTarget::AttachedTo { part, offset });
        }
        for offset in self.basket.initial_offsets.clone() {
            self.spawn(scene, AttachmentTarget::Basket { offset });
        }
        self.update_transforms(scene, registry);
        tracing::info!("Spawned {} pins", self.pins.len());
        Ok(())
    }

    pub fn spawn<S>(&mut self, scene: &mut S, target: AttachmentTarget) -> PinId
    where
        S: SceneBackend + ?Sized,
    {
        let id = PinId::new();
        let node = scene.spawn(&visuals::pin_visual());
        self.pins.push(Pin { id, node, target });
        id
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn get(&self, id: PinId) -> Option<&Pin> {
        self.pins.iter().find(|pin| pin.id == id)
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn held(&self) -> Option<PinId> {
        self.held.as_ref().map(|held| held.pin)
    }

    pub fn is_holding(&self) -> bool {
        self.held.is_some()
    }

    /// Number of pins currently stuck into `part`
    pub fn attached_to(&self, part: PartId) -> usize {
        self.pins
            .iter()
            .filter(|pin| {
                matches!(pin.target, AttachmentTarget::AttachedTo { part: p, .. } if p == part)
            })
            .count()
    }

    fn set_target(&mut self, id: PinId, target: AttachmentTarget) {
        if let Some(pin) = self.pins.iter_mut().find(|pin| pin.id == id) {
            pin.target = target;
        }
    }

    /// Pick up the pin under the pointer, from the basket or from a part.
    ///
    /// Only one pin may be held; returns `None` on a miss or while holding.
    pub fn grab<S>(&mut self, scene: &mut S, ndc: Vec2) -> Option<PinId>
    where
        S: SceneBackend + ?Sized,
    {
        if self.held.is_some() {
            return None;
        }

        let nodes: Vec<NodeId> = self.pins.iter().map(|pin| pin.node).collect();
        let hit = pick(&*scene, ndc, &nodes, |node| {
            self.pins.iter().find(|pin| pin.node == node).map(|pin| (pin.id, pin.node))
        })?;
        let (id, node) = hit.owner;

        self.set_target(id, AttachmentTarget::Held { position: hit.point });
        scene.set_world_pose(node, Pose::from_position(hit.point));
        self.held = Some(HeldPin {
            pin: id,
            plane: TrackingPlane::new(scene.camera_forward(), hit.point),
        });
        tracing::debug!("Picked up pin at {:?}", hit.point);
        Some(id)
    }

    /// Move the held pin to where `ray` meets its tracking plane.
    ///
    /// A miss keeps the previous position. Returns the current position.
    pub fn track(&mut self, ray: &Ray) -> Option<Vec3> {
        let held = self.held.as_ref()?;
        let id = held.pin;
        let hit = held.plane.intersect(ray);

        let pin = self.pins.iter_mut().find(|pin| pin.id == id)?;
        if let Some(point) = hit {
            pin.target = AttachmentTarget::Held { position: point };
        }
        match pin.target {
            AttachmentTarget::Held { position } => Some(position),
            _ => None,
        }
    }

    /// Push the held pin's plane along the camera direction
    pub fn adjust_depth(&mut self, amount: f32, camera_forward: Vec3, limit: f32) -> f32 {
        match self.held.as_mut() {
            Some(held) => held.plane.adjust(amount, camera_forward, limit),
            None => 0.0,
        }
    }

    /// Drop the held pin onto the part under the pointer, or back into the basket.
    ///
    /// Returns `None` only when no pin is held.
    pub fn release<S>(
        &mut self,
        scene: &mut S,
        registry: &BodyRegistry,
        ndc: Vec2,
    ) -> Option<PinRelease>
    where
        S: SceneBackend + ?Sized,
    {
        let held = self.held.take()?;
        let pin = held.pin;

        let attachment = picking::pick_part(&*scene, registry, ndc).and_then(|hit| {
            let node = registry.get(hit.owner)?.node;
            let frame = scene.world_pose(node)?;
            let surface = hit.point + scene.camera_forward() * self.surface_bias;
            Some((hit.owner, frame.inverse_transform_point(surface)))
        });

        let outcome = match attachment {
            Some((part, offset)) => {
                self.set_target(pin, AttachmentTarget::AttachedTo { part, offset });
                let name = registry.get(part).map(|p| p.name.as_str()).unwrap_or_default();
                tracing::debug!("Pin attached to '{}'", name);
                PinRelease::Attached { pin, part }
            }
            None => {
                let offset = self.random_basket_offset();
                self.set_target(pin, AttachmentTarget::Basket { offset });
                tracing::debug!("Pin returned to basket");
                PinRelease::Returned { pin }
            }
        };
        self.update_transforms(scene, registry);
        Some(outcome)
    }

    fn random_basket_offset(&mut self) -> Vec3 {
        let half = (self.basket.spread * 0.5).abs();
        if half == 0.0 {
            return Vec3::new(0.0, self.basket.rest_height, 0.0);
        }
        Vec3::new(
            self.rng.gen_range(-half..=half),
            self.basket.rest_height,
            self.rng.gen_range(-half..=half),
        )
    }

    /// World pose implied by a pin's target
    pub fn resolve_pose<S>(
        &self,
        scene: &S,
        registry: &BodyRegistry,
        target: &AttachmentTarget,
    ) -> Option<Pose>
    where
        S: SceneBackend + ?Sized,
    {
        match *target {
            AttachmentTarget::Basket { offset } => {
                Some(Pose::from_position(self.basket.position + offset))
            }
            AttachmentTarget::Held { position } => Some(Pose::from_position(position)),
            AttachmentTarget::AttachedTo { part, offset } => {
                let frame = scene.world_pose(registry.get(part)?.node)?;
                Some(frame.compose(&Pose::from_position(offset)))
            }
        }
    }

    /// Recompute every pin's world transform. Returns the number of pins placed.
    pub fn update_transforms<S>(&self, scene: &mut S, registry: &BodyRegistry) -> usize
    where
        S: SceneBackend + ?Sized,
    {
        let mut placed = 0;
        for pin in &self.pins {
            if let Some(pose) = self.resolve_pose(&*scene, registry, &pin.target) {
                scene.set_world_pose(pin.node, pose);
                placed += 1;
            }
        }
        placed
    }
}
