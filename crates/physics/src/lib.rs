//! Collision for Roadside: axis-aligned box colliders and player movement.
//!
//! The walkable scene is a flat ground plane with buildings, counters and
//! props blocked out as boxes. Boxes use parry's `Aabb` (bundled with Rapier).

pub mod collision;
pub mod movement;

pub use collision::*;
pub use movement::*;
