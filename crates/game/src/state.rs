//! Game state types: the per-session world, camera rig, messages, audio cues, inventory.

use engine_core::{Material, Scheduler, Transform};
use glam::Vec3;
use hecs::Entity;
use physics::ColliderSet;
use rand::rngs::StdRng;

use crate::config::GameConfig;
use crate::effects::Effect;
use crate::interact::InteractableRegistry;
use crate::player::Player;
use crate::scene::{Scene, SceneError};

/// Where the player stands when a session starts.
pub const PLAYER_START: Vec3 = Vec3::new(0.0, 0.0, 10.0);

// ── Interaction prompts ────────────────────────────────────────────────────

/// Key label shown in prompts.
pub const INTERACT_KEY: &str = "E";

/// One on-screen interaction prompt: "[key] action" (e.g. "[E] Play the slots").
#[derive(Debug, Clone, PartialEq)]
pub struct InteractPrompt {
    pub key: &'static str,
    pub action: String,
}

impl InteractPrompt {
    pub fn display_text(&self) -> String {
        format!("[{}] {}", self.key, self.action)
    }
}

// ── Camera ─────────────────────────────────────────────────────────────────

/// The camera parameters gameplay drives. Position follows the player's eye.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    pub fov: f32,
    pub default_fov: f32,
}

impl CameraRig {
    pub fn new(default_fov: f32) -> Self {
        Self { fov: default_fov, default_fov }
    }
}

/// Camera screen shake driven by trauma in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct ScreenShake {
    pub intensity: f32,
    pub decay_rate: f32,
    pub offset: Vec3,
    pub trauma: f32,
    /// Floor the trauma cannot decay below while a ramp holds it up.
    pub sustain: f32,
    clock: f32,
}

impl ScreenShake {
    pub fn new() -> Self {
        Self {
            intensity: 0.0,
            decay_rate: 1.5,
            offset: Vec3::ZERO,
            trauma: 0.0,
            sustain: 0.0,
            clock: 0.0,
        }
    }

    pub fn add_trauma(&mut self, amount: f32) {
        self.trauma = (self.trauma + amount).min(1.0);
    }

    pub fn update(&mut self, dt: f32) {
        self.clock += dt;
        self.trauma = self.trauma.max(self.sustain);
        self.intensity = self.trauma * self.trauma;
        if self.intensity > 0.001 {
            let max_offset = self.intensity * 0.4;
            let t = self.clock;
            self.offset = Vec3::new(
                (t * 173.7).sin() * max_offset,
                (t * 259.3).cos() * max_offset,
                (t * 97.1).sin() * max_offset * 0.3,
            );
        } else {
            self.offset = Vec3::ZERO;
        }
        self.trauma = (self.trauma - self.decay_rate * dt).max(0.0);
    }
}

// ── Audio ──────────────────────────────────────────────────────────────────

/// A named sound cue fired at a point in session time.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub name: &'static str,
    pub at: f32,
}

/// Sound requests for an audio backend, plus the continuous rumble bed level.
#[derive(Debug, Default)]
pub struct AudioCues {
    pub fired: Vec<Cue>,
    pub rumble_gain: f32,
}

impl AudioCues {
    pub fn play(&mut self, name: &'static str, at: f32) {
        log::debug!("cue '{}' at {:.2}s", name, at);
        self.fired.push(Cue { name, at });
    }

    pub fn has_played(&self, name: &str) -> bool {
        self.fired.iter().any(|c| c.name == name)
    }
}

// ── Messages ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GameMessage {
    pub text: String,
    pub color: [f32; 4],
    pub time_remaining: f32,
}

/// On-screen message feed.
#[derive(Debug)]
pub struct GameMessages {
    pub messages: Vec<GameMessage>,
    default_duration: f32,
}

impl GameMessages {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            default_duration: 6.0,
        }
    }

    pub fn push(&mut self, text: impl Into<String>, color: [f32; 4]) {
        let text = text.into();
        log::info!("{}", text);
        self.messages.push(GameMessage {
            text,
            color,
            time_remaining: self.default_duration,
        });
        if self.messages.len() > 50 {
            self.messages.remove(0);
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(text, [1.0, 1.0, 1.0, 1.0]);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(text, [1.0, 0.9, 0.3, 1.0]);
    }

    pub fn update(&mut self, dt: f32) {
        for msg in &mut self.messages {
            msg.time_remaining -= dt;
        }
        self.messages.retain(|m| m.time_remaining > 0.0);
    }

    pub fn latest(&self) -> Option<&str> {
        self.messages.last().map(|m| m.text.as_str())
    }
}

// ── Inventory ──────────────────────────────────────────────────────────────

/// Things the player can pick up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    CarKeys,
    Postcard,
    Chips(u32),
}

impl Item {
    pub fn name(&self) -> String {
        match self {
            Item::CarKeys => "car keys".to_string(),
            Item::Postcard => "a faded postcard".to_string(),
            Item::Chips(n) => format!("{n} casino chips"),
        }
    }
}

#[derive(Debug, Default)]
pub struct Inventory {
    pub items: Vec<Item>,
    pub chips: u32,
}

impl Inventory {
    pub fn add(&mut self, item: Item) {
        match item {
            Item::Chips(n) => self.chips = self.chips.saturating_add(n),
            other if !self.has(other) => self.items.push(other),
            _ => {}
        }
    }

    pub fn has(&self, item: Item) -> bool {
        self.items.contains(&item)
    }
}

// ── World ──────────────────────────────────────────────────────────────────

/// Everything one play session mutates. Passed by `&mut` into every system.
pub struct WorldState {
    pub scene: Scene,
    pub player: Player,
    pub camera: CameraRig,
    pub shake: ScreenShake,
    pub interactables: InteractableRegistry,
    pub colliders: ColliderSet,
    /// All transient visual effects, ticked from the frame clock.
    pub effects: Scheduler<Effect>,
    pub audio: AudioCues,
    pub messages: GameMessages,
    pub inventory: Inventory,
    pub rng: StdRng,
    /// Session time in seconds, updated at the start of each frame.
    pub time: f32,
}

impl WorldState {
    pub fn new(config: &GameConfig, rng: StdRng) -> Self {
        let mut inventory = Inventory::default();
        inventory.chips = config.starting_chips;
        Self {
            scene: Scene::new(),
            player: Player::new(PLAYER_START, config.move_speed),
            camera: CameraRig::new(config.fov),
            shake: ScreenShake::new(),
            interactables: InteractableRegistry::new(),
            colliders: ColliderSet::new(),
            effects: Scheduler::new(),
            audio: AudioCues::default(),
            messages: GameMessages::new(),
            inventory,
            rng,
            time: 0.0,
        }
    }

    /// A solid box: a scene object plus a collider of the same extent.
    pub fn spawn_solid(
        &mut self,
        parent: Option<Entity>,
        label: &str,
        center: Vec3,
        half_extents: Vec3,
        color: Vec3,
    ) -> Result<Entity, SceneError> {
        let mut transform = Transform::from_position(center);
        transform.scale = half_extents * 2.0;
        let entity = match parent {
            Some(p) => self.scene.spawn_child(p, label, transform),
            None => self.scene.spawn(label, transform),
        };
        self.scene.set_material(entity, Material::matte(color))?;
        self.colliders.add_box(label, center, half_extents);
        Ok(entity)
    }

    /// Camera eye position including shake.
    pub fn eye_position(&self) -> Vec3 {
        self.player.eye_position() + self.shake.offset
    }
}

#[cfg(test)]
pub(crate) fn test_world() -> WorldState {
    use rand::SeedableRng;
    WorldState::new(&GameConfig::default(), StdRng::seed_from_u64(7))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shake_sustain_holds_trauma() {
        let mut shake = ScreenShake::new();
        shake.sustain = 0.5;
        for _ in 0..60 {
            shake.update(1.0 / 60.0);
        }
        assert!(shake.trauma > 0.45);
        shake.sustain = 0.0;
        for _ in 0..120 {
            shake.update(1.0 / 60.0);
        }
        assert_eq!(shake.trauma, 0.0);
        assert_eq!(shake.offset, Vec3::ZERO);
    }

    #[test]
    fn chips_stack_and_items_list() {
        let mut inv = Inventory::default();
        inv.add(Item::Chips(5));
        inv.add(Item::Chips(10));
        inv.add(Item::CarKeys);
        assert_eq!(inv.chips, 15);
        assert!(inv.has(Item::CarKeys));
        assert!(!inv.has(Item::Postcard));
    }

    #[test]
    fn messages_expire() {
        let mut msgs = GameMessages::new();
        msgs.info("hello");
        assert_eq!(msgs.latest(), Some("hello"));
        msgs.update(7.0);
        assert!(msgs.messages.is_empty());
    }
}
