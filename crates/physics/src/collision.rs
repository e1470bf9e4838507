//! Static box colliders.

use glam::Vec3;
use rapier3d::na::{Point3, Vector3};
use rapier3d::parry::bounding_volume::{Aabb, BoundingVolume};

/// Handle to a collider in a [`ColliderSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderId(u32);

/// Build an `Aabb` from a glam center and half extents.
pub fn aabb_from_center(center: Vec3, half_extents: Vec3) -> Aabb {
    Aabb::from_half_extents(
        Point3::new(center.x, center.y, center.z),
        Vector3::new(half_extents.x, half_extents.y, half_extents.z),
    )
}

/// A named, immovable box.
#[derive(Debug, Clone)]
pub struct BoxCollider {
    pub id: ColliderId,
    pub label: String,
    pub aabb: Aabb,
}

/// Append/remove list of static boxes the player cannot walk through.
#[derive(Debug, Default)]
pub struct ColliderSet {
    colliders: Vec<BoxCollider>,
    next_id: u32,
}

impl ColliderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a box collider centered at `center`.
    pub fn add_box(&mut self, label: impl Into<String>, center: Vec3, half_extents: Vec3) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        let label = label.into();
        log::debug!("Collider {:?} '{}' at {:?} half {:?}", id, label, center, half_extents);
        self.colliders.push(BoxCollider {
            id,
            label,
            aabb: aabb_from_center(center, half_extents),
        });
        id
    }

    /// Remove a collider. Returns false if it was already gone.
    pub fn remove(&mut self, id: ColliderId) -> bool {
        let before = self.colliders.len();
        self.colliders.retain(|c| c.id != id);
        self.colliders.len() != before
    }

    pub fn get(&self, id: ColliderId) -> Option<&BoxCollider> {
        self.colliders.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoxCollider> {
        self.colliders.iter()
    }

    /// First collider intersecting `aabb`, if any.
    pub fn overlapping(&self, aabb: &Aabb) -> Option<ColliderId> {
        self.colliders
            .iter()
            .find(|c| c.aabb.intersects(aabb))
            .map(|c| c.id)
    }

    /// True if the point lies inside any collider.
    pub fn contains_point(&self, point: Vec3) -> bool {
        let p = Point3::new(point.x, point.y, point.z);
        self.colliders.iter().any(|c| c.aabb.contains_local_point(&p))
    }
}
