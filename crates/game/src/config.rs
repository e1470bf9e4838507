//! Game configuration (view, movement, session, narrative tuning). Loaded from config.ron at startup.

use serde::{Deserialize, Serialize};

/// Persistent game settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Default vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    /// Walking speed in units per second.
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    /// Maximum distance at which the player can use an interactable.
    #[serde(default = "default_interact_range")]
    pub interact_range: f32,
    /// Simulation step rate for the headless session (Hz).
    #[serde(default = "default_fixed_rate")]
    pub fixed_rate: f64,
    /// How long the headless session runs, in simulated seconds.
    #[serde(default = "default_session_seconds")]
    pub session_seconds: f32,
    /// Chips the player starts with.
    #[serde(default = "default_starting_chips")]
    pub starting_chips: u32,
    /// Stake used for every casino round.
    #[serde(default = "default_casino_bet")]
    pub casino_bet: u32,
    /// Cat possession sequence tuning.
    #[serde(default)]
    pub sequencer: SequencerTuning,
}

fn default_fov() -> f32 {
    75.0
}
fn default_move_speed() -> f32 {
    4.0
}
fn default_interact_range() -> f32 {
    2.5
}
fn default_fixed_rate() -> f64 {
    60.0
}
fn default_session_seconds() -> f32 {
    180.0
}
fn default_starting_chips() -> u32 {
    20
}
fn default_casino_bet() -> u32 {
    5
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fov: default_fov(),
            move_speed: default_move_speed(),
            interact_range: default_interact_range(),
            fixed_rate: default_fixed_rate(),
            session_seconds: default_session_seconds(),
            starting_chips: default_starting_chips(),
            casino_bet: default_casino_bet(),
            sequencer: SequencerTuning::default(),
        }
    }
}

/// Distances, speeds and durations for the cat sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerTuning {
    /// Player distance below which the cat notices the player.
    pub notice_distance: f32,
    /// Player distance at or below which the cat stops and stares.
    pub stare_distance: f32,
    pub approach_speed: f32,
    pub stare_seconds: f32,
    pub horror_seconds: f32,
    /// Head spin in radians per second while horrifying.
    pub head_spin_rate: f32,
    /// Per-frame lerp factor for the portal opening.
    pub portal_grow: f32,
    /// Per-frame lerp factor for the portal closing.
    pub portal_shrink: f32,
    /// Portal scale above which the cat starts sinking.
    pub sink_threshold: f32,
    /// Portal light ramp in intensity per second.
    pub light_ramp: f32,
    pub light_cap: f32,
    pub sink_speed: f32,
    /// Y below which the cat has fully descended.
    pub sink_depth: f32,
    pub respite_seconds: f32,
    /// Opacity change per second during the moon swap.
    pub moon_fade_rate: f32,
}

impl Default for SequencerTuning {
    fn default() -> Self {
        Self {
            notice_distance: 25.0,
            stare_distance: 10.0,
            approach_speed: 2.0,
            stare_seconds: 2.0,
            horror_seconds: 3.0,
            head_spin_rate: std::f32::consts::TAU / 3.0,
            portal_grow: 0.05,
            portal_shrink: 0.1,
            sink_threshold: 0.9,
            light_ramp: 2.0,
            light_cap: 5.0,
            sink_speed: 1.0,
            sink_depth: -5.0,
            respite_seconds: 5.0,
            moon_fade_rate: 0.2,
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match Self::parse(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    pub fn parse(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }
}

fn config_path() -> std::path::PathBuf {
    std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from(".")).join("config.ron")
}
