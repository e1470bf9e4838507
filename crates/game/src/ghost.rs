//! The face in the saloon window. Fires once, the first time the player
//! looks at the window from close by.

use hecs::Entity;

use crate::effects;
use crate::scene::SceneError;
use crate::state::WorldState;

const TRIGGER_DISTANCE: f32 = 8.0;
/// Minimum dot between the player's heading and the direction to the window.
const FACING_DOT: f32 = 0.6;
const FADE_IN_SECONDS: f32 = 1.0;
const HOLD_SECONDS: f32 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostPhase {
    Hidden,
    FadingIn,
    Holding,
    Vanishing,
    Gone,
}

pub struct GhostFace {
    phase: GhostPhase,
    timer: f32,
    face: Entity,
    window: Entity,
    /// The saloon light that stutters as the face vanishes.
    light: Entity,
}

impl GhostFace {
    /// Takes over `face`, hiding it until triggered.
    pub fn new(world: &mut WorldState, face: Entity, window: Entity, light: Entity) -> Result<Self, SceneError> {
        world.scene.set_visible(face, false)?;
        world.scene.set_opacity(face, 0.0)?;
        Ok(Self {
            phase: GhostPhase::Hidden,
            timer: 0.0,
            face,
            window,
            light,
        })
    }

    pub fn phase(&self) -> GhostPhase {
        self.phase
    }

    fn enter(&mut self, phase: GhostPhase) {
        log::info!("Ghost face: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.timer = 0.0;
    }

    /// Close to the window and looking roughly at it.
    fn player_sees_window(&self, world: &WorldState) -> Result<bool, SceneError> {
        let mut to_window = world.scene.position(self.window)? - world.player.position;
        to_window.y = 0.0;
        let distance = to_window.length();
        if distance > TRIGGER_DISTANCE {
            return Ok(false);
        }
        if distance < 1e-3 {
            return Ok(true);
        }
        Ok(world.player.forward().dot(to_window / distance) > FACING_DOT)
    }

    pub fn update(&mut self, world: &mut WorldState, dt: f32, time: f32) -> Result<Option<GhostPhase>, SceneError> {
        let before = self.phase;
        match self.phase {
            GhostPhase::Hidden => {
                if self.player_sees_window(world)? {
                    world.scene.set_visible(self.face, true)?;
                    world.audio.play("ghost_whisper", time);
                    self.enter(GhostPhase::FadingIn);
                }
            }
            GhostPhase::FadingIn => {
                self.timer += dt;
                let opacity = (self.timer / FADE_IN_SECONDS).min(1.0);
                world.scene.set_opacity(self.face, opacity)?;
                if opacity >= 1.0 {
                    self.enter(GhostPhase::Holding);
                }
            }
            GhostPhase::Holding => {
                self.timer += dt;
                if self.timer >= HOLD_SECONDS {
                    self.enter(GhostPhase::Vanishing);
                }
            }
            GhostPhase::Vanishing => {
                world.scene.set_opacity(self.face, 0.0)?;
                world.scene.set_visible(self.face, false)?;
                effects::flicker(world, self.light, 0.06, Some(8), 0.9)?;
                world.audio.play("glass_crack", time);
                world.shake.add_trauma(0.3);
                self.enter(GhostPhase::Gone);
            }
            GhostPhase::Gone => {}
        }
        Ok((self.phase != before).then_some(self.phase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_world;
    use engine_core::{PointLight, Transform};
    use glam::Vec3;

    fn setup() -> (WorldState, GhostFace) {
        let mut world = test_world();
        let window = world.scene.spawn("saloon window", Transform::from_position(Vec3::new(0.0, 2.0, 0.0)));
        let face = world.scene.spawn("ghost face", Transform::from_position(Vec3::new(0.0, 2.0, -0.1)));
        let light = world
            .scene
            .spawn_light(None, "saloon light", Vec3::new(0.0, 3.0, -2.0), PointLight::new(1.2, Vec3::ONE, 10.0));
        let ghost = GhostFace::new(&mut world, face, window, light).unwrap();
        (world, ghost)
    }

    #[test]
    fn needs_to_be_close_and_facing() {
        let (mut world, mut ghost) = setup();
        // Close, but the window is behind the player.
        world.player.position = Vec3::new(0.0, 0.0, -5.0);
        world.player.yaw = 0.0;
        ghost.update(&mut world, 0.1, 0.0).unwrap();
        assert_eq!(ghost.phase(), GhostPhase::Hidden);

        // Facing but too far.
        world.player.position = Vec3::new(0.0, 0.0, 9.0);
        ghost.update(&mut world, 0.1, 0.0).unwrap();
        assert_eq!(ghost.phase(), GhostPhase::Hidden);

        world.player.position = Vec3::new(0.0, 0.0, 7.0);
        assert_eq!(ghost.update(&mut world, 0.1, 0.0).unwrap(), Some(GhostPhase::FadingIn));
        assert!(world.audio.has_played("ghost_whisper"));
    }

    #[test]
    fn runs_to_gone_once() {
        let (mut world, mut ghost) = setup();
        world.player.position = Vec3::new(0.0, 0.0, 4.0);
        let mut phases = Vec::new();
        let mut elapsed = 0.0;
        for _ in 0..60 {
            if let Some(p) = ghost.update(&mut world, 0.05, elapsed).unwrap() {
                phases.push((p, elapsed));
            }
            effects::update_effects(&mut world, 0.05);
            elapsed += 0.05;
        }
        let names: Vec<_> = phases.iter().map(|(p, _)| *p).collect();
        assert_eq!(
            names,
            [GhostPhase::FadingIn, GhostPhase::Holding, GhostPhase::Vanishing, GhostPhase::Gone]
        );
        let fade = phases[1].1 - phases[0].1;
        let hold = phases[2].1 - phases[1].1;
        assert!((fade - 1.0).abs() < 0.06, "fade took {fade}");
        assert!((hold - 0.75).abs() < 0.06, "hold took {hold}");
        assert!(!world.scene.is_visible(ghost.face).unwrap());
        assert_eq!(world.audio.fired.iter().filter(|c| c.name == "ghost_whisper").count(), 1);
        // Flicker finished and restored the light.
        assert_eq!(world.scene.light(ghost.light).unwrap().intensity, 1.2);
    }
}
