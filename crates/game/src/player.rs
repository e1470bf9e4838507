//! Player controller and state.

use glam::Vec3;
use physics::{move_and_slide, ColliderSet, PlayerBody};

/// Movement intent for one frame, already mapped from input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveIntent {
    /// -1..1, positive walks toward where the player faces.
    pub forward: f32,
    /// -1..1, positive strafes right.
    pub strafe: f32,
    /// Yaw change this frame in radians (positive turns left).
    pub turn: f32,
}

/// First-person walker. `position` is the feet; the camera sits at eye height.
#[derive(Debug, Clone)]
pub struct Player {
    pub position: Vec3,
    /// Heading in radians; 0 faces -Z.
    pub yaw: f32,
    pub eye_height: f32,
    pub move_speed: f32,
    pub default_move_speed: f32,
    pub body: PlayerBody,
}

impl Player {
    pub fn new(position: Vec3, move_speed: f32) -> Self {
        Self {
            position,
            yaw: 0.0,
            eye_height: 1.6,
            move_speed,
            default_move_speed: move_speed,
            body: PlayerBody::default(),
        }
    }

    /// Horizontal facing direction.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    pub fn eye_position(&self) -> Vec3 {
        self.position + Vec3::Y * self.eye_height
    }

    /// Yaw that faces a world position, ignoring height. `None` when standing on it.
    pub fn yaw_toward(&self, target: Vec3) -> Option<f32> {
        let to = target - self.position;
        (to.x * to.x + to.z * to.z > 1e-6).then(|| (-to.x).atan2(-to.z))
    }

    pub fn teleport(&mut self, position: Vec3) {
        log::debug!("Player teleported {:?} -> {:?}", self.position, position);
        self.position = position;
    }

    /// Override walking speed (e.g. inside a liminal area). `None` restores the default.
    pub fn set_speed_override(&mut self, speed: Option<f32>) {
        self.move_speed = speed.unwrap_or(self.default_move_speed);
    }

    /// Apply one frame of movement, sliding along colliders.
    pub fn update(&mut self, intent: &MoveIntent, colliders: &ColliderSet, dt: f32) {
        self.yaw += intent.turn;

        let mut wish = self.forward() * intent.forward + self.right() * intent.strafe;
        if wish.length_squared() > 1.0 {
            wish = wish.normalize();
        }
        let displacement = wish * self.move_speed * dt;
        if displacement != Vec3::ZERO {
            self.position = move_and_slide(colliders, self.body, self.position, displacement);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_forward_along_negative_z() {
        let mut p = Player::new(Vec3::ZERO, 4.0);
        let intent = MoveIntent { forward: 1.0, ..Default::default() };
        p.update(&intent, &ColliderSet::new(), 0.5);
        assert!((p.position - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);
    }

    #[test]
    fn diagonal_input_is_not_faster() {
        let mut p = Player::new(Vec3::ZERO, 4.0);
        let intent = MoveIntent { forward: 1.0, strafe: 1.0, turn: 0.0 };
        p.update(&intent, &ColliderSet::new(), 1.0);
        assert!((p.position.length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn face_turns_toward_target() {
        let mut p = Player::new(Vec3::ZERO, 4.0);
        p.yaw = p.yaw_toward(Vec3::new(10.0, 0.0, 0.0)).unwrap();
        assert!(p.forward().dot(Vec3::X) > 0.999);
        p.yaw = p.yaw_toward(Vec3::new(0.0, 0.0, 5.0)).unwrap();
        assert!(p.forward().dot(Vec3::Z) > 0.999);
    }

    #[test]
    fn speed_override_round_trip() {
        let mut p = Player::new(Vec3::ZERO, 4.0);
        p.set_speed_override(Some(1.5));
        assert_eq!(p.move_speed, 1.5);
        p.set_speed_override(None);
        assert_eq!(p.move_speed, 4.0);
    }
}
