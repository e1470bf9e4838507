//! Player movement against static colliders.

use glam::Vec3;

use crate::collision::{aabb_from_center, ColliderSet};

/// Shrink applied to the body box so a body resting flush against a wall can still slide along it.
const SKIN: f32 = 1e-3;

/// Upright box approximating the player for collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerBody {
    /// Half width on X and Z.
    pub radius: f32,
    /// Height above the feet.
    pub height: f32,
}

impl Default for PlayerBody {
    fn default() -> Self {
        Self { radius: 0.35, height: 1.7 }
    }
}

impl PlayerBody {
    fn blocked_at(&self, colliders: &ColliderSet, feet: Vec3) -> bool {
        let half = Vec3::new(self.radius - SKIN, self.height * 0.5 - SKIN, self.radius - SKIN);
        let center = feet + Vec3::Y * (self.height * 0.5);
        colliders.overlapping(&aabb_from_center(center, half)).is_some()
    }
}

/// Move `feet` by `displacement`, resolving X then Z independently.
///
/// An axis whose move would end inside a collider is dropped for this step,
/// which lets the player slide along walls. Vertical displacement is applied
/// unchecked (the ground is flat).
pub fn move_and_slide(colliders: &ColliderSet, body: PlayerBody, feet: Vec3, displacement: Vec3) -> Vec3 {
    let mut pos = feet;

    let try_x = pos + Vec3::new(displacement.x, 0.0, 0.0);
    if displacement.x != 0.0 && !body.blocked_at(colliders, try_x) {
        pos = try_x;
    }

    let try_z = pos + Vec3::new(0.0, 0.0, displacement.z);
    if displacement.z != 0.0 && !body.blocked_at(colliders, try_z) {
        pos = try_z;
    }

    pos.y += displacement.y;
    pos
}
