//! A motel corridor that never ends: walk past the far end and you are back
//! near the start. After a couple of laps the payphone on the wall rings.

use engine_core::{Material, PointLight, TaskId, Transform};
use glam::Vec3;
use hecs::Entity;

use crate::effects;
use crate::liminal::{AreaBehavior, AreaBuild, AreaConfig, AreaHandle, AreaRequest, InteractableSpec, Modulation};
use crate::scene::SceneError;
use crate::state::WorldState;

/// Corridor length along -Z from the area origin.
const LENGTH: f32 = 30.0;
const HALF_WIDTH: f32 = 1.5;
/// Crossing this far down the corridor wraps the player back by `WRAP_JUMP`.
const WRAP_AT: f32 = 26.0;
const WRAP_JUMP: f32 = 24.0;
const LAPS_BEFORE_RING: u32 = 2;

const PHONE: usize = 0;

#[derive(Default)]
pub struct MotelCorridor {
    lamp: Option<Entity>,
    flicker: Option<TaskId>,
    laps: u32,
    ringing: bool,
    answered: bool,
}

impl MotelCorridor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config() -> AreaConfig {
        AreaConfig {
            key: "motel".into(),
            name: "Motel Corridor".into(),
            origin: Vec3::new(200.0, 0.0, 0.0),
            entry_position: Vec3::new(-20.0, 1.0, 15.0),
            entry_prompt: "Step into the vacancy sign".into(),
            transition_duration: 2.5,
            modulation: Modulation { fov_delta: -15.0, move_speed: Some(2.5) },
            entry_spawn: Vec3::ZERO,
            return_position: Vec3::new(-20.0, 0.0, 18.0),
        }
    }
}

impl AreaBehavior for MotelCorridor {
    fn build(&mut self, world: &mut WorldState, origin: Vec3) -> Result<AreaBuild, SceneError> {
        let root = world.scene.spawn("motel corridor", Transform::from_position(origin));
        let carpet = Vec3::new(0.35, 0.08, 0.1);
        let wallpaper = Vec3::new(0.55, 0.5, 0.3);
        let mid_z = origin.z - LENGTH / 2.0 + 2.0;

        let side_half = Vec3::new(0.1, 1.5, LENGTH / 2.0 + 2.0);
        world.spawn_solid(Some(root), "motel wall west", Vec3::new(origin.x - HALF_WIDTH - 0.1, 1.5, mid_z), side_half, wallpaper)?;
        world.spawn_solid(Some(root), "motel wall east", Vec3::new(origin.x + HALF_WIDTH + 0.1, 1.5, mid_z), side_half, wallpaper)?;
        world.spawn_solid(
            Some(root),
            "motel wall back",
            Vec3::new(origin.x, 1.5, origin.z + 2.2),
            Vec3::new(HALF_WIDTH, 1.5, 0.1),
            wallpaper,
        )?;
        let floor = world
            .scene
            .spawn_child(root, "motel carpet", Transform::from_position(Vec3::new(origin.x, -0.05, mid_z)));
        world.scene.set_material(floor, Material::matte(carpet))?;

        for i in 0..6 {
            let z = origin.z - 3.0 - i as f32 * 4.5;
            let side = if i % 2 == 0 { -1.0 } else { 1.0 };
            world.scene.spawn_child(
                root,
                format!("room door {}", 210 + i),
                Transform::from_position(Vec3::new(origin.x + side * HALF_WIDTH, 1.0, z)),
            );
        }

        self.lamp = Some(world.scene.spawn_light(
            Some(root),
            "motel fluorescent",
            origin + Vec3::new(0.0, 2.8, -10.0),
            PointLight::new(1.4, Vec3::new(0.9, 1.0, 0.85), 12.0),
        ));

        let phone = world.scene.spawn_child(
            root,
            "payphone",
            Transform::from_position(origin + Vec3::new(-HALF_WIDTH + 0.1, 1.3, -8.0)),
        );
        let door = world.scene.spawn_child(
            root,
            "room 217",
            Transform::from_position(origin + Vec3::new(HALF_WIDTH, 1.0, -1.5)),
        );

        Ok(AreaBuild {
            root,
            interactables: vec![InteractableSpec::new(phone, "Pick up the payphone")],
            exit_trigger: Some(InteractableSpec::new(door, "Open room 217")),
        })
    }

    fn on_enter_complete(&mut self, world: &mut WorldState, _area: &AreaHandle) -> Result<(), SceneError> {
        self.laps = 0;
        self.ringing = false;
        if let Some(lamp) = self.lamp {
            self.flicker = Some(effects::flicker(world, lamp, 0.15, None, 0.6)?);
        }
        Ok(())
    }

    fn on_active(&mut self, world: &mut WorldState, area: &AreaHandle, _dt: f32, time: f32) -> Result<(), SceneError> {
        let depth = area.origin.z - world.player.position.z;
        if depth > WRAP_AT {
            let back = world.player.position + Vec3::Z * WRAP_JUMP;
            world.player.teleport(back);
            self.laps += 1;
            log::debug!("Motel corridor lap {}", self.laps);
            if self.laps == LAPS_BEFORE_RING && !self.answered {
                self.ringing = true;
                world.audio.play("phone_ring", time);
                world.messages.info("Somewhere down the hall, a phone is ringing.");
            }
        }
        Ok(())
    }

    fn on_exit_complete(&mut self, world: &mut WorldState, _area: &AreaHandle) -> Result<(), SceneError> {
        if let Some(task) = self.flicker.take() {
            // The task is unbounded, so it is still pending unless something else cancelled it.
            if let Ok(effects::Effect::Flicker { light, base, .. }) = world.effects.cancel(task) {
                world.scene.set_light_intensity(light, base)?;
            }
        }
        Ok(())
    }

    fn on_interact(&mut self, world: &mut WorldState, _area: &AreaHandle, index: usize) -> Result<AreaRequest, SceneError> {
        if index != PHONE {
            return Ok(AreaRequest::Stay);
        }
        if self.ringing {
            self.ringing = false;
            self.answered = true;
            world.audio.play("phone_voice", world.time);
            world.messages.warning("\"Your room is ready. It has always been ready.\"");
        } else {
            world.messages.info("The line is dead.");
        }
        Ok(AreaRequest::Stay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interact::InteractAction;
    use crate::liminal::{AreaStatus, LiminalAreaManager};
    use crate::state::test_world;

    fn inside() -> (WorldState, LiminalAreaManager, crate::liminal::AreaId) {
        let mut world = test_world();
        let mut areas = LiminalAreaManager::new();
        let id = areas
            .register_area(&mut world, MotelCorridor::config(), Box::new(MotelCorridor::new()))
            .unwrap();
        areas.enter_area(&mut world, id).unwrap();
        for _ in 0..30 {
            areas.update(&mut world, 0.1, 0.0).unwrap();
        }
        assert_eq!(areas.area(id).unwrap().status, AreaStatus::Active);
        (world, areas, id)
    }

    #[test]
    fn walls_keep_the_player_in_the_corridor() {
        let (mut world, _areas, _) = inside();
        let start = world.player.position;
        assert_eq!(start, Vec3::new(200.0, 0.0, 0.0));
        assert_eq!(world.player.move_speed, 2.5);
        let colliders = std::mem::take(&mut world.colliders);
        world.player.yaw = std::f32::consts::FRAC_PI_2; // face -X
        let intent = crate::player::MoveIntent { forward: 1.0, ..Default::default() };
        for _ in 0..40 {
            world.player.update(&intent, &colliders, 0.1);
        }
        assert!(world.player.position.x > 200.0 - HALF_WIDTH, "walked through the wall: {:?}", world.player.position);
    }

    #[test]
    fn corridor_loops_and_phone_rings() {
        let (mut world, mut areas, id) = inside();
        let phone = areas.area(id).unwrap().interactables[0];
        let phone_action = world.interactables.get(phone).unwrap().action.clone();

        areas.dispatch(&mut world, &phone_action).unwrap();
        assert_eq!(world.messages.latest(), Some("The line is dead."));

        for lap in 1..=2 {
            world.player.position.z = -27.0;
            areas.update(&mut world, 0.1, lap as f32).unwrap();
            assert!((world.player.position.z - -3.0).abs() < 1e-4);
        }
        assert!(world.audio.has_played("phone_ring"));

        areas.dispatch(&mut world, &phone_action).unwrap();
        assert!(world.audio.has_played("phone_voice"));
        assert!(matches!(phone_action, InteractAction::AreaLocal { index: 0, .. }));
    }

    #[test]
    fn lamp_flickers_only_while_inside() {
        let (mut world, mut areas, id) = inside();
        assert_eq!(world.effects.len(), 1);
        areas.exit_area(&mut world, id).unwrap();
        for _ in 0..30 {
            areas.update(&mut world, 0.1, 0.0).unwrap();
        }
        assert_eq!(areas.area(id).unwrap().status, AreaStatus::Inactive);
        assert!(world.effects.is_empty());
        let lamp = world.scene.find("motel fluorescent").unwrap();
        assert_eq!(world.scene.light(lamp).unwrap().intensity, 1.4);
        assert_eq!(world.player.position, Vec3::new(-20.0, 0.0, 18.0));
    }
}
