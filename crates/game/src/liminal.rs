//! Liminal areas: pocket scenes reached through glowing markers in the main scene.
//!
//! Every area shares one lifecycle:
//!
//! ```text
//! Inactive --enter_area--> Entering --(progress 1)--> Active
//!    ^                                                  |
//!    +----(progress 1)---- Exiting <----exit_area-------+
//! ```
//!
//! While entering, the field of view narrows linearly toward the area's
//! target; on completion the area is shown and the player is moved inside.
//! Exiting runs the same transition in reverse. Per-area behavior plugs in
//! through [`AreaBehavior`], whose hooks all default to no-ops.

use engine_core::{Material, PointLight, Transform};
use glam::Vec3;
use hecs::Entity;

use crate::effects::lerp;
use crate::interact::{InteractAction, InteractableId};
use crate::scene::SceneError;
use crate::state::WorldState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AreaId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaStatus {
    Inactive,
    Entering,
    Active,
    Exiting,
}

/// How an active area changes the player's view and movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modulation {
    /// Added to the default field of view while inside (negative narrows).
    pub fov_delta: f32,
    /// Walking speed inside the area; `None` keeps the default.
    pub move_speed: Option<f32>,
}

impl Default for Modulation {
    fn default() -> Self {
        Self { fov_delta: -20.0, move_speed: None }
    }
}

/// Registration-time configuration. Immutable once the area is registered.
#[derive(Debug, Clone)]
pub struct AreaConfig {
    pub key: String,
    pub name: String,
    /// World position of the area's root; the area is built around it.
    pub origin: Vec3,
    /// Where the entry marker glows in the main scene.
    pub entry_position: Vec3,
    pub entry_prompt: String,
    pub transition_duration: f32,
    pub modulation: Modulation,
    /// Player spawn relative to `origin`.
    pub entry_spawn: Vec3,
    /// Where the player is put back in the main scene.
    pub return_position: Vec3,
}

/// An object the area's builder wants the player to be able to use.
#[derive(Debug, Clone)]
pub struct InteractableSpec {
    pub object: Entity,
    pub prompt: String,
}

impl InteractableSpec {
    pub fn new(object: Entity, prompt: impl Into<String>) -> Self {
        Self { object, prompt: prompt.into() }
    }
}

/// What an area builder produced.
#[derive(Debug, Clone)]
pub struct AreaBuild {
    /// Container for all of the area's content; hidden while inactive.
    pub root: Entity,
    /// Routed back to [`AreaBehavior::on_interact`] by declaration index.
    pub interactables: Vec<InteractableSpec>,
    pub exit_trigger: Option<InteractableSpec>,
}

/// Identity of a registered area, handed to behavior hooks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaHandle {
    pub id: AreaId,
    pub origin: Vec3,
    pub root: Entity,
}

/// Follow-up an area asks for after handling an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaRequest {
    Stay,
    Exit,
}

/// Per-area content and hooks.
pub trait AreaBehavior {
    /// Build the area's content around `origin`. Called once at registration.
    fn build(&mut self, world: &mut WorldState, origin: Vec3) -> Result<AreaBuild, SceneError>;

    fn on_enter_start(&mut self, _world: &mut WorldState, _area: &AreaHandle) -> Result<(), SceneError> {
        Ok(())
    }

    /// Called every entering frame with progress in `[0, 1]`.
    fn on_transition_in(&mut self, _world: &mut WorldState, _area: &AreaHandle, _progress: f32) -> Result<(), SceneError> {
        Ok(())
    }

    fn on_enter_complete(&mut self, _world: &mut WorldState, _area: &AreaHandle) -> Result<(), SceneError> {
        Ok(())
    }

    fn on_active(&mut self, _world: &mut WorldState, _area: &AreaHandle, _dt: f32, _time: f32) -> Result<(), SceneError> {
        Ok(())
    }

    /// Called every exiting frame with progress in `[0, 1]`.
    fn on_transition_out(&mut self, _world: &mut WorldState, _area: &AreaHandle, _progress: f32) -> Result<(), SceneError> {
        Ok(())
    }

    fn on_exit_complete(&mut self, _world: &mut WorldState, _area: &AreaHandle) -> Result<(), SceneError> {
        Ok(())
    }

    /// The player used the `index`th interactable declared by `build`.
    fn on_interact(&mut self, _world: &mut WorldState, _area: &AreaHandle, _index: usize) -> Result<AreaRequest, SceneError> {
        Ok(AreaRequest::Stay)
    }
}

/// One registered area and its lifecycle state.
pub struct LiminalArea {
    pub config: AreaConfig,
    pub handle: AreaHandle,
    pub status: AreaStatus,
    /// Seconds spent in the current status.
    pub timer: f32,
    pub marker: Entity,
    pub marker_light: Entity,
    pub entry: InteractableId,
    pub interactables: Vec<InteractableId>,
    pub exit: Option<InteractableId>,
    behavior: Box<dyn AreaBehavior>,
}

impl LiminalArea {
    /// Normalized transition progress for the current status.
    pub fn progress(&self) -> f32 {
        transition_progress(self.timer, self.config.transition_duration)
    }

    fn target_fov(&self, default_fov: f32) -> f32 {
        default_fov + self.config.modulation.fov_delta
    }
}

/// `timer / duration` clamped to `[0, 1]`; zero-length transitions are complete immediately.
pub fn transition_progress(timer: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (timer / duration).clamp(0.0, 1.0)
    }
}

/// Owns every registered area and drives their lifecycles each frame.
#[derive(Default)]
pub struct LiminalAreaManager {
    areas: Vec<LiminalArea>,
}

impl LiminalAreaManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an area, wire its interactables through the manager, and place
    /// its entry marker in the main scene. The area starts hidden and inactive.
    pub fn register_area(
        &mut self,
        world: &mut WorldState,
        config: AreaConfig,
        mut behavior: Box<dyn AreaBehavior>,
    ) -> Result<AreaId, SceneError> {
        let id = AreaId(self.areas.len());
        let build = behavior.build(world, config.origin)?;
        world.scene.set_visible(build.root, false)?;

        let interactables: Vec<InteractableId> = build
            .interactables
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                world.interactables.register(
                    spec.object,
                    spec.prompt.clone(),
                    InteractAction::AreaLocal { area: id, index },
                )
            })
            .collect();
        let exit = build
            .exit_trigger
            .as_ref()
            .map(|spec| world.interactables.register(spec.object, spec.prompt.clone(), InteractAction::ExitArea(id)));

        let marker = world.scene.spawn(
            format!("{} entry marker", config.name),
            Transform::from_position_scale(config.entry_position, 0.6),
        );
        world
            .scene
            .set_material(marker, Material::glowing(Vec3::new(0.55, 0.85, 1.0), 2.5))?;
        world.scene.set_opacity(marker, 0.8)?;
        let marker_light = world.scene.spawn_light(
            Some(marker),
            format!("{} entry light", config.name),
            config.entry_position + Vec3::Y * 0.5,
            PointLight::new(1.5, Vec3::new(0.55, 0.85, 1.0), 6.0),
        );
        let entry = world
            .interactables
            .register(marker, config.entry_prompt.clone(), InteractAction::EnterArea(id));

        log::info!("Registered liminal area '{}' ({}) at {:?}", config.name, config.key, config.origin);

        self.areas.push(LiminalArea {
            handle: AreaHandle { id, origin: config.origin, root: build.root },
            config,
            status: AreaStatus::Inactive,
            timer: 0.0,
            marker,
            marker_light,
            entry,
            interactables,
            exit,
            behavior,
        });
        Ok(id)
    }

    pub fn area(&self, id: AreaId) -> Option<&LiminalArea> {
        self.areas.get(id.0)
    }

    pub fn find(&self, key: &str) -> Option<AreaId> {
        self.areas.iter().find(|a| a.config.key == key).map(|a| a.handle.id)
    }

    pub fn areas(&self) -> impl Iterator<Item = &LiminalArea> {
        self.areas.iter()
    }

    /// The area the player is in or moving through, if any.
    pub fn current(&self) -> Option<&LiminalArea> {
        self.areas.iter().find(|a| a.status != AreaStatus::Inactive)
    }

    /// Start entering an area. No-op (returns false) unless it is inactive.
    pub fn enter_area(&mut self, world: &mut WorldState, id: AreaId) -> Result<bool, SceneError> {
        let busy = self.current().map(|a| a.config.name.clone());
        let Some(area) = self.areas.get_mut(id.0) else {
            log::warn!("enter_area: unknown area {:?}", id);
            return Ok(false);
        };
        if area.status != AreaStatus::Inactive {
            log::debug!("enter_area '{}' ignored while {:?}", area.config.name, area.status);
            return Ok(false);
        }
        if let Some(other) = busy {
            log::warn!("Entering '{}' while '{}' is still in use", area.config.name, other);
        }
        log::info!("Entering liminal area '{}'", area.config.name);
        area.status = AreaStatus::Entering;
        area.timer = 0.0;
        let handle = area.handle;
        area.behavior.on_enter_start(world, &handle)?;
        Ok(true)
    }

    /// Start leaving an area. No-op (returns false) unless it is active.
    pub fn exit_area(&mut self, _world: &mut WorldState, id: AreaId) -> Result<bool, SceneError> {
        let Some(area) = self.areas.get_mut(id.0) else {
            log::warn!("exit_area: unknown area {:?}", id);
            return Ok(false);
        };
        if area.status != AreaStatus::Active {
            log::debug!("exit_area '{}' ignored while {:?}", area.config.name, area.status);
            return Ok(false);
        }
        log::info!("Leaving liminal area '{}'", area.config.name);
        area.status = AreaStatus::Exiting;
        area.timer = 0.0;
        Ok(true)
    }

    /// Route an interaction that belongs to an area. Returns false for
    /// actions the manager does not own.
    pub fn dispatch(&mut self, world: &mut WorldState, action: &InteractAction) -> Result<bool, SceneError> {
        match *action {
            InteractAction::EnterArea(id) => {
                self.enter_area(world, id)?;
                Ok(true)
            }
            InteractAction::ExitArea(id) => {
                self.exit_area(world, id)?;
                Ok(true)
            }
            InteractAction::AreaLocal { area, index } => {
                let Some(entry) = self.areas.get_mut(area.0) else {
                    return Ok(false);
                };
                let handle = entry.handle;
                if entry.behavior.on_interact(world, &handle, index)? == AreaRequest::Exit {
                    self.exit_area(world, area)?;
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Advance every area by one frame.
    pub fn update(&mut self, world: &mut WorldState, dt: f32, time: f32) -> Result<(), SceneError> {
        for area in &mut self.areas {
            area.timer += dt;
            let handle = area.handle;
            match area.status {
                AreaStatus::Inactive => {}
                AreaStatus::Entering => {
                    let progress = area.progress();
                    let default_fov = world.camera.default_fov;
                    world.camera.fov = lerp(default_fov, area.target_fov(default_fov), progress);
                    area.behavior.on_transition_in(world, &handle, progress)?;
                    if progress >= 1.0 {
                        world.scene.set_visible(handle.root, true)?;
                        world.player.teleport(handle.origin + area.config.entry_spawn);
                        world.player.set_speed_override(area.config.modulation.move_speed);
                        area.status = AreaStatus::Active;
                        area.timer = 0.0;
                        log::info!("Inside liminal area '{}'", area.config.name);
                        area.behavior.on_enter_complete(world, &handle)?;
                    }
                }
                AreaStatus::Active => {
                    area.behavior.on_active(world, &handle, dt, time)?;
                }
                AreaStatus::Exiting => {
                    let progress = area.progress();
                    let default_fov = world.camera.default_fov;
                    world.camera.fov = lerp(area.target_fov(default_fov), default_fov, progress);
                    area.behavior.on_transition_out(world, &handle, progress)?;
                    if progress >= 1.0 {
                        world.scene.set_visible(handle.root, false)?;
                        world.player.teleport(area.config.return_position);
                        world.player.set_speed_override(None);
                        world.camera.fov = default_fov;
                        area.status = AreaStatus::Inactive;
                        area.timer = 0.0;
                        log::info!("Back from liminal area '{}'", area.config.name);
                        area.behavior.on_exit_complete(world, &handle)?;
                    }
                }
            }
        }
        Ok(())
    }
}
