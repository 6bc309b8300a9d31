//! Minimal physics collaborator: layered colliders, first-hit ray casts and
//! overlap sensors that report when a contact begins.
//!
//! Shapes are positioned by their `Transform` translation only. Cuboids are
//! axis aligned.

use {
    bevy::{
        math::bounding::{Aabb3d, BoundingSphere, RayCast3d},
        prelude::*,
    },
    bitflags::bitflags,
    session_resources::simulating,
    system_schedule::GameSchedule,
};

pub struct CollisionPlugin;

impl Plugin for CollisionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            detect_contacts
                .in_set(GameSchedule::Effect)
                .run_if(simulating),
        );
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CollisionLayers: u32 {
        const WALL = 1 << 0;
        const PLAYER = 1 << 1;
        const GUARD = 1 << 2;
        const INTERACTABLE = 1 << 3;
        const BOSS = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
#[require(Transform)]
pub struct Collider {
    pub shape: ColliderShape,
    pub layers: CollisionLayers,
}

impl Collider {
    pub fn sphere(radius: f32, layers: CollisionLayers) -> Self {
        Self {
            shape: ColliderShape::Sphere { radius },
            layers,
        }
    }

    pub fn cuboid(half_extents: Vec3, layers: CollisionLayers) -> Self {
        Self {
            shape: ColliderShape::Cuboid { half_extents },
            layers,
        }
    }

    /// Distance from `point` to the surface, zero when inside.
    pub fn distance_to(&self, center: Vec3, point: Vec3) -> f32 {
        match self.shape {
            ColliderShape::Sphere { radius } => (point.distance(center) - radius).max(0.0),
            ColliderShape::Cuboid { half_extents } => {
                let closest = point.clamp(center - half_extents, center + half_extents);
                point.distance(closest)
            }
        }
    }

    fn ray_distance(&self, ray: &RayCast3d, center: Vec3) -> Option<f32> {
        match self.shape {
            ColliderShape::Sphere { radius } => {
                ray.sphere_intersection_at(&BoundingSphere::new(center, radius))
            }
            ColliderShape::Cuboid { half_extents } => {
                ray.aabb_intersection_at(&Aabb3d::new(center, half_extents))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub distance: f32,
    pub point: Vec3,
}

/// Nearest collider on any of the `filter` layers hit within `max_distance`.
pub fn raycast_first_hit<'a>(
    origin: Vec3,
    direction: Dir3,
    max_distance: f32,
    filter: CollisionLayers,
    colliders: impl IntoIterator<Item = (Entity, &'a Transform, &'a Collider)>,
) -> Option<RayHit> {
    let ray = RayCast3d::new(origin, direction, max_distance);
    colliders
        .into_iter()
        .filter(|(_, _, collider)| collider.layers.intersects(filter))
        .filter_map(|(entity, transform, collider)| {
            let distance = collider.ray_distance(&ray, transform.translation)?;
            Some(RayHit {
                entity,
                distance,
                point: origin + direction * distance,
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Reports colliders on `targets` layers that come within `radius`.
#[derive(Component, Debug, Clone, PartialEq)]
#[require(Transform)]
pub struct ContactSensor {
    pub radius: f32,
    pub targets: CollisionLayers,
    overlapping: Vec<Entity>,
}

impl ContactSensor {
    pub fn new(radius: f32, targets: CollisionLayers) -> Self {
        Self {
            radius,
            targets,
            overlapping: Vec::new(),
        }
    }

    pub fn overlapping(&self) -> &[Entity] {
        &self.overlapping
    }
}

/// A sensor started touching `other`.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactStarted {
    pub sensor: Entity,
    pub other: Entity,
}

pub fn detect_contacts(
    mut sensors: Query<(Entity, &Transform, &mut ContactSensor)>,
    colliders: Query<(Entity, &Transform, &Collider)>,
    mut commands: Commands,
) {
    for (sensor_entity, sensor_transform, mut sensor) in sensors.iter_mut() {
        let center = sensor_transform.translation;
        let touching: Vec<Entity> = colliders
            .iter()
            .filter(|(entity, _, collider)| {
                *entity != sensor_entity && collider.layers.intersects(sensor.targets)
            })
            .filter(|(_, transform, collider)| {
                collider.distance_to(transform.translation, center) <= sensor.radius
            })
            .map(|(entity, _, _)| entity)
            .collect();

        for other in touching.iter().copied() {
            if !sensor.overlapping.contains(&other) {
                trace!(?sensor_entity, ?other, "Contact started");
                commands.trigger(ContactStarted {
                    sensor: sensor_entity,
                    other,
                });
            }
        }
        if sensor.overlapping != touching {
            sensor.overlapping = touching;
        }
    }
}
