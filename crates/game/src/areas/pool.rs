//! An empty indoor pool at night. The lights sag once you are inside and
//! come back when you climb out.

use engine_core::{Material, PointLight, TaskId, Transform};
use glam::Vec3;
use hecs::Entity;

use crate::effects;
use crate::liminal::{AreaBehavior, AreaBuild, AreaConfig, AreaHandle, AreaRequest, InteractableSpec, Modulation};
use crate::scene::SceneError;
use crate::state::{Item, WorldState};

const HALL_HALF: Vec3 = Vec3::new(10.0, 3.0, 8.0);
const LIGHT_FULL: f32 = 2.0;
const LIGHT_DIM: f32 = 0.35;
const DIM_SECONDS: f32 = 4.0;

const SIGN: usize = 0;
const POSTCARD: usize = 1;

#[derive(Default)]
pub struct DrainedPool {
    light: Option<Entity>,
    postcard: Option<Entity>,
    dim: Option<TaskId>,
}

impl DrainedPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config() -> AreaConfig {
        AreaConfig {
            key: "pool".into(),
            name: "Drained Pool".into(),
            origin: Vec3::new(-200.0, 0.0, 0.0),
            entry_position: Vec3::new(22.0, 1.0, 10.0),
            entry_prompt: "Follow the smell of chlorine".into(),
            transition_duration: 3.0,
            modulation: Modulation::default(),
            entry_spawn: Vec3::new(0.0, 0.0, 6.0),
            return_position: Vec3::new(22.0, 0.0, 13.0),
        }
    }
}

impl AreaBehavior for DrainedPool {
    fn build(&mut self, world: &mut WorldState, origin: Vec3) -> Result<AreaBuild, SceneError> {
        let root = world.scene.spawn("drained pool", Transform::from_position(origin));
        let tile = Vec3::new(0.75, 0.85, 0.85);

        let walls = [
            ("pool hall north", Vec3::new(0.0, HALL_HALF.y, -HALL_HALF.z), Vec3::new(HALL_HALF.x, HALL_HALF.y, 0.2)),
            ("pool hall south", Vec3::new(0.0, HALL_HALF.y, HALL_HALF.z), Vec3::new(HALL_HALF.x, HALL_HALF.y, 0.2)),
            ("pool hall west", Vec3::new(-HALL_HALF.x, HALL_HALF.y, 0.0), Vec3::new(0.2, HALL_HALF.y, HALL_HALF.z)),
            ("pool hall east", Vec3::new(HALL_HALF.x, HALL_HALF.y, 0.0), Vec3::new(0.2, HALL_HALF.y, HALL_HALF.z)),
        ];
        for (label, offset, half) in walls {
            world.spawn_solid(Some(root), label, origin + offset, half, tile)?;
        }

        let basin = world
            .scene
            .spawn_child(root, "empty basin", Transform::from_position(origin + Vec3::new(0.0, -2.0, -1.0)));
        world.scene.set_material(basin, Material::matte(Vec3::new(0.3, 0.55, 0.6)))?;

        self.light = Some(world.scene.spawn_light(
            Some(root),
            "pool hall light",
            origin + Vec3::new(0.0, 5.5, 0.0),
            PointLight::new(LIGHT_FULL, Vec3::new(0.8, 0.95, 1.0), 20.0),
        ));

        let sign = world
            .scene
            .spawn_child(root, "lifeguard sign", Transform::from_position(origin + Vec3::new(-4.0, 1.5, 4.0)));
        let postcard = world
            .scene
            .spawn_child(root, "postcard", Transform::from_position(origin + Vec3::new(3.0, 0.5, 4.5)));
        self.postcard = Some(postcard);
        let ladder = world
            .scene
            .spawn_child(root, "pool ladder", Transform::from_position(origin + Vec3::new(0.0, 0.5, 3.0)));

        Ok(AreaBuild {
            root,
            interactables: vec![
                InteractableSpec::new(sign, "Read the sign"),
                InteractableSpec::new(postcard, "Take the postcard"),
            ],
            exit_trigger: Some(InteractableSpec::new(ladder, "Climb the ladder")),
        })
    }

    fn on_enter_start(&mut self, world: &mut WorldState, _area: &AreaHandle) -> Result<(), SceneError> {
        world.audio.play("water_drip", world.time);
        Ok(())
    }

    fn on_enter_complete(&mut self, world: &mut WorldState, _area: &AreaHandle) -> Result<(), SceneError> {
        if let Some(light) = self.light {
            self.dim = Some(effects::fade_light(world, light, LIGHT_DIM, DIM_SECONDS)?);
        }
        Ok(())
    }

    fn on_exit_complete(&mut self, world: &mut WorldState, _area: &AreaHandle) -> Result<(), SceneError> {
        if let Some(task) = self.dim.take() {
            if world.effects.cancel(task).is_err() {
                log::trace!("pool dim already finished");
            }
        }
        if let Some(light) = self.light {
            world.scene.set_light_intensity(light, LIGHT_FULL)?;
        }
        Ok(())
    }

    fn on_interact(&mut self, world: &mut WorldState, _area: &AreaHandle, index: usize) -> Result<AreaRequest, SceneError> {
        match index {
            SIGN => world.messages.info("NO LIFEGUARD ON DUTY. SWIM AT YOUR OWN RISK."),
            POSTCARD => {
                if let Some(postcard) = self.postcard.take() {
                    world.scene.set_visible(postcard, false)?;
                    world.inventory.add(Item::Postcard);
                    world.messages.info(format!("Picked up {}", Item::Postcard.name()));
                }
            }
            _ => {}
        }
        Ok(AreaRequest::Stay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liminal::{AreaStatus, LiminalAreaManager};
    use crate::state::test_world;

    fn tick(world: &mut WorldState, areas: &mut LiminalAreaManager, seconds: f32) {
        let steps = (seconds / 0.1).round() as usize;
        for _ in 0..steps {
            let now = world.time;
            areas.update(world, 0.1, now).unwrap();
            effects::update_effects(world, 0.1);
            world.time += 0.1;
        }
    }

    #[test]
    fn lights_dim_inside_and_recover_on_exit() {
        let mut world = test_world();
        let mut areas = LiminalAreaManager::new();
        let id = areas
            .register_area(&mut world, DrainedPool::config(), Box::new(DrainedPool::new()))
            .unwrap();
        let light = world.scene.find("pool hall light").unwrap();
        assert!(!world.scene.is_rendered(light));

        areas.enter_area(&mut world, id).unwrap();
        assert!(world.audio.has_played("water_drip"));
        tick(&mut world, &mut areas, 3.2);
        assert_eq!(areas.area(id).unwrap().status, AreaStatus::Active);
        assert_eq!(world.player.position, Vec3::new(-200.0, 0.0, 6.0));
        assert!(world.scene.is_rendered(light));

        tick(&mut world, &mut areas, 5.0);
        assert_eq!(world.scene.light(light).unwrap().intensity, LIGHT_DIM);

        areas.exit_area(&mut world, id).unwrap();
        tick(&mut world, &mut areas, 3.2);
        assert_eq!(areas.area(id).unwrap().status, AreaStatus::Inactive);
        assert_eq!(world.scene.light(light).unwrap().intensity, LIGHT_FULL);
        assert_eq!(world.camera.fov, world.camera.default_fov);
    }

    #[test]
    fn postcard_can_be_taken_once() {
        let mut world = test_world();
        let mut areas = LiminalAreaManager::new();
        let id = areas
            .register_area(&mut world, DrainedPool::config(), Box::new(DrainedPool::new()))
            .unwrap();
        let postcard = areas.area(id).unwrap().interactables[POSTCARD];
        let action = world.interactables.get(postcard).unwrap().action.clone();
        areas.dispatch(&mut world, &action).unwrap();
        areas.dispatch(&mut world, &action).unwrap();
        assert!(world.inventory.has(Item::Postcard));
        assert_eq!(world.inventory.items.len(), 1);
    }
}
