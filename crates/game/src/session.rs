//! One play session: builds the roadside and runs the per-frame systems in a
//! fixed order.

use engine_core::{Material, PointLight, Transform};
use glam::Vec3;
use hecs::Entity;
use rand::rngs::StdRng;

use crate::areas::{DrainedPool, MotelCorridor};
use crate::casino::{self, CasinoGame, RouletteBet};
use crate::config::GameConfig;
use crate::effects;
use crate::ghost::GhostFace;
use crate::interact::InteractAction;
use crate::liminal::LiminalAreaManager;
use crate::player::MoveIntent;
use crate::scene::SceneError;
use crate::sequencer::{CatPhase, CatRig, CatSequence, SkyRig};
use crate::state::{InteractPrompt, Item, WorldState, INTERACT_KEY};

/// Where the cat waits at the start.
pub const CAT_HOME: Vec3 = Vec3::new(0.0, 0.3, 45.0);
pub const SALOON_WINDOW: Vec3 = Vec3::new(11.0, 2.0, -8.0);

const TENTACLE_COUNT: usize = 6;

/// Input for one frame, already mapped from whatever drives the player.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub movement: MoveIntent,
    /// The interact key went down this frame.
    pub interact: bool,
}

pub struct Session {
    pub world: WorldState,
    pub areas: LiminalAreaManager,
    pub cat: CatSequence,
    pub ghost: GhostFace,
    config: GameConfig,
}

impl Session {
    pub fn new(config: GameConfig, rng: StdRng) -> Result<Self, SceneError> {
        let mut world = WorldState::new(&config, rng);

        build_roadside(&mut world)?;
        let sky = build_sky(&mut world);
        let cat_rig = build_cat(&mut world)?;
        let cat = CatSequence::new(&world, cat_rig, sky, config.sequencer)?;
        let ghost = build_saloon_window(&mut world)?;

        let mut areas = LiminalAreaManager::new();
        areas.register_area(&mut world, MotelCorridor::config(), Box::new(MotelCorridor::new()))?;
        areas.register_area(&mut world, DrainedPool::config(), Box::new(DrainedPool::new()))?;

        log::info!(
            "Session ready: {} scene objects, {} colliders, {} interactables",
            world.scene.len(),
            world.colliders.len(),
            world.interactables.len()
        );

        Ok(Self { world, areas, cat, ghost, config })
    }

    /// Advance one frame.
    ///
    /// Order: movement, interaction, event sequencer, liminal areas, ghost,
    /// effect scheduler, screen shake.
    pub fn frame(&mut self, dt: f32, input: &FrameInput) -> Result<(), SceneError> {
        self.world.time += dt;
        let time = self.world.time;

        self.world.player.update(&input.movement, &self.world.colliders, dt);

        if input.interact {
            self.interact()?;
        }

        if let Some(phase) = self.cat.update(&mut self.world, dt, time)? {
            if let Some(line) = narration(phase) {
                self.world.messages.info(line);
            }
        }

        self.areas.update(&mut self.world, dt, time)?;
        self.ghost.update(&mut self.world, dt, time)?;
        effects::update_effects(&mut self.world, dt);
        self.world.shake.update(dt);
        self.world.messages.update(dt);
        Ok(())
    }

    /// What [E] would do right now, if anything.
    pub fn prompt(&self) -> Option<InteractPrompt> {
        self.world
            .interactables
            .nearest(&self.world.scene, self.world.player.position, self.config.interact_range)
            .map(|i| InteractPrompt { key: INTERACT_KEY, action: i.prompt.clone() })
    }

    /// Use the nearest interactable. Returns the action taken.
    pub fn interact(&mut self) -> Result<Option<InteractAction>, SceneError> {
        let Some(entry) = self
            .world
            .interactables
            .nearest(&self.world.scene, self.world.player.position, self.config.interact_range)
            .cloned()
        else {
            return Ok(None);
        };
        log::debug!("Interact: {}", entry.prompt);

        if self.areas.dispatch(&mut self.world, &entry.action)? {
            return Ok(Some(entry.action));
        }

        let world = &mut self.world;
        match &entry.action {
            InteractAction::PickUp(item) => {
                world.scene.set_visible(entry.object, false)?;
                world.interactables.remove(entry.id);
                world.inventory.add(*item);
                world.messages.info(format!("Picked up {}", item.name()));
            }
            InteractAction::Play(game) => {
                match casino::play(*game, self.config.casino_bet, &mut world.inventory, &mut world.rng) {
                    Ok(round) => {
                        let verdict = if round.won() { "win" } else { "no luck" };
                        world.messages.info(format!("{}: {} ({verdict})", game.name(), round.summary));
                        if round.won() {
                            world.audio.play("coins", world.time);
                        }
                    }
                    Err(e) => world.messages.warning(e.to_string()),
                }
            }
            InteractAction::Read(text) => world.messages.info(text.clone()),
            InteractAction::EnterArea(_) | InteractAction::ExitArea(_) | InteractAction::AreaLocal { .. } => {}
        }
        Ok(Some(entry.action))
    }
}

fn narration(phase: CatPhase) -> Option<&'static str> {
    match phase {
        CatPhase::Approaching => Some("A stray cat pads out of the dark toward you."),
        CatPhase::Staring => Some("It stops. It stares."),
        CatPhase::Horrifying => Some("Its eyes catch fire."),
        CatPhase::Descending => Some("The asphalt opens beneath it."),
        CatPhase::QuietRespite => Some("Quiet."),
        CatPhase::Watching => Some("The moon is looking at you."),
        CatPhase::Idle | CatPhase::Descended | CatPhase::MoonSwap => None,
    }
}

fn build_roadside(world: &mut WorldState) -> Result<(), SceneError> {
    let asphalt = world
        .scene
        .spawn("highway", Transform::from_position(Vec3::new(0.0, -0.01, 0.0)));
    world.scene.set_material(asphalt, Material::matte(Vec3::new(0.12, 0.12, 0.13)))?;

    // Gas station and pumps.
    world.spawn_solid(None, "gas station", Vec3::new(-15.0, 2.0, -5.0), Vec3::new(6.0, 2.0, 4.0), Vec3::new(0.8, 0.78, 0.7))?;
    for (i, x) in [-17.0, -13.0].into_iter().enumerate() {
        world.spawn_solid(
            None,
            &format!("gas pump {}", i + 1),
            Vec3::new(x, 0.75, 1.5),
            Vec3::new(0.4, 0.75, 0.4),
            Vec3::new(0.7, 0.1, 0.1),
        )?;
    }
    world.scene.spawn_light(
        None,
        "canopy light",
        Vec3::new(-15.0, 4.5, 2.0),
        PointLight::new(1.0, Vec3::new(1.0, 0.95, 0.8), 14.0),
    );

    // Saloon, with a neon sign that never stops stuttering.
    world.spawn_solid(None, "saloon", Vec3::new(18.0, 3.0, -10.0), Vec3::new(7.0, 3.0, 5.0), Vec3::new(0.45, 0.3, 0.2))?;
    let neon = world.scene.spawn_light(
        None,
        "saloon neon",
        Vec3::new(10.8, 4.5, -10.0),
        PointLight::new(2.2, Vec3::new(1.0, 0.2, 0.5), 9.0),
    );
    effects::flicker(world, neon, 0.12, None, 0.7)?;

    // Casino and its machines.
    world.spawn_solid(None, "casino", Vec3::new(0.0, 4.0, -45.0), Vec3::new(10.0, 4.0, 6.0), Vec3::new(0.2, 0.15, 0.3))?;
    let machines = [
        ("slot machine", -4.0, CasinoGame::Slots, "Play the slots"),
        ("roulette table", 0.0, CasinoGame::Roulette(RouletteBet::Red), "Bet on red"),
        ("blackjack table", 4.0, CasinoGame::Blackjack, "Sit down for blackjack"),
    ];
    for (label, x, game, prompt) in machines {
        let machine = world.scene.spawn(label, Transform::from_position(Vec3::new(x, 1.0, -37.5)));
        world
            .scene
            .set_material(machine, Material::glowing(Vec3::new(1.0, 0.8, 0.2), 1.2))?;
        world.interactables.register(machine, prompt, InteractAction::Play(game));
    }

    // Pickups and a roadside marker.
    let keys = world
        .scene
        .spawn("car keys", Transform::from_position(Vec3::new(2.0, 0.2, 6.0)));
    world
        .interactables
        .register(keys, format!("Pick up {}", Item::CarKeys.name()), InteractAction::PickUp(Item::CarKeys));
    let chips = world
        .scene
        .spawn("chip stack", Transform::from_position(Vec3::new(-3.0, 0.2, -37.0)));
    world
        .interactables
        .register(chips, "Pick up the chips", InteractAction::PickUp(Item::Chips(25)));
    let marker = world
        .scene
        .spawn("historical marker", Transform::from_position(Vec3::new(6.0, 1.0, 12.0)));
    world.interactables.register(
        marker,
        "Read the marker",
        InteractAction::Read("ROUTE 66. LAST SERVICES FOR 140 MILES. DO NOT STOP AFTER DARK.".into()),
    );
    Ok(())
}

fn build_sky(world: &mut WorldState) -> SkyRig {
    let moon_position = Vec3::new(0.0, 80.0, -300.0);
    let moon = world
        .scene
        .spawn("moon", Transform::from_position_scale(moon_position, 12.0));
    let moon_light = world.scene.spawn_light(
        None,
        "moonlight",
        moon_position,
        PointLight::new(0.6, Vec3::new(0.75, 0.8, 1.0), 1000.0),
    );
    SkyRig { moon, moon_light }
}

fn build_cat(world: &mut WorldState) -> Result<CatRig, SceneError> {
    let scene = &mut world.scene;
    let body = scene.spawn("stray cat", Transform::from_position(CAT_HOME));
    scene.set_material(body, Material::matte(Vec3::new(0.05, 0.05, 0.05)))?;
    let head = scene.spawn_child(body, "cat head", Transform::from_position(CAT_HOME + Vec3::new(0.0, 0.25, -0.3)));
    let mut eyes = Vec::new();
    for (label, x) in [("cat eye left", -0.05), ("cat eye right", 0.05)] {
        let eye = scene.spawn_child(head, label, Transform::from_position(CAT_HOME + Vec3::new(x, 0.3, -0.42)));
        scene.set_material(eye, Material::matte(Vec3::new(0.8, 0.75, 0.2)))?;
        eyes.push(eye);
    }

    let portal_position = Vec3::new(CAT_HOME.x, 0.01, CAT_HOME.z);
    let portal = scene.spawn("portal", Transform::from_position_scale(portal_position, 0.0));
    scene.set_material(portal, Material::glowing(Vec3::new(0.5, 0.0, 0.6), 2.0))?;
    let portal_light = scene.spawn_light(
        None,
        "portal light",
        portal_position + Vec3::Y * 0.5,
        PointLight::new(0.0, Vec3::new(0.6, 0.0, 0.8), 10.0),
    );
    let tentacles: Vec<Entity> = (0..TENTACLE_COUNT)
        .map(|i| scene.spawn(format!("tentacle {i}"), Transform::from_position(portal_position - Vec3::Y)))
        .collect();

    Ok(CatRig { body, head, eyes, portal, portal_light, tentacles })
}

fn build_saloon_window(world: &mut WorldState) -> Result<GhostFace, SceneError> {
    let window = world.scene.spawn("saloon window", Transform::from_position(SALOON_WINDOW));
    let face = world
        .scene
        .spawn("ghost face", Transform::from_position(SALOON_WINDOW + Vec3::X * 0.2));
    world
        .scene
        .set_material(face, Material::glowing(Vec3::new(0.85, 0.9, 1.0), 0.6))?;
    let light = world.scene.spawn_light(
        None,
        "saloon light",
        SALOON_WINDOW + Vec3::new(3.0, 2.0, 0.0),
        PointLight::new(1.2, Vec3::new(1.0, 0.85, 0.6), 10.0),
    );
    GhostFace::new(world, face, window, light)
}
