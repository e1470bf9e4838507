//! Transient visual and audio effects: flicker, light fades, rumble and shake ramps.
//!
//! Effects are tasks on the world's frame scheduler. They pause when the
//! frame loop pauses, and they are the only writers of the light fields they
//! touch while running.

use engine_core::{Cadence, Firing, TaskId};
use hecs::Entity;
use rand::Rng;

use crate::scene::SceneError;
use crate::state::WorldState;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Random light intensity in `[low, high]` each firing; `base` is restored on the last one.
    Flicker { light: Entity, base: f32, low: f32, high: f32 },
    /// Linear light intensity fade.
    LightFade { light: Entity, from: f32, to: f32 },
    /// Audio rumble bed ramp.
    Rumble { from: f32, to: f32 },
    /// Raise the screen-shake floor to `peak` over the span, releasing it on completion.
    ShakeRamp { peak: f32 },
}

/// Flicker a light `repeats` times (forever when `None`) every `interval` seconds.
pub fn flicker(
    world: &mut WorldState,
    light: Entity,
    interval: f32,
    repeats: Option<u32>,
    depth: f32,
) -> Result<TaskId, SceneError> {
    let base = world.scene.light(light)?.intensity;
    let depth = depth.clamp(0.0, 1.0);
    Ok(world.effects.schedule(
        Cadence::Every { interval, repeats },
        Effect::Flicker {
            light,
            base,
            low: base * (1.0 - depth),
            high: base,
        },
    ))
}

/// Fade a light from its current intensity to `to` over `duration` seconds.
pub fn fade_light(world: &mut WorldState, light: Entity, to: f32, duration: f32) -> Result<TaskId, SceneError> {
    let from = world.scene.light(light)?.intensity;
    Ok(world
        .effects
        .schedule(Cadence::Span { duration }, Effect::LightFade { light, from, to }))
}

pub fn ramp_rumble(world: &mut WorldState, to: f32, duration: f32) -> TaskId {
    let from = world.audio.rumble_gain;
    world
        .effects
        .schedule(Cadence::Span { duration }, Effect::Rumble { from, to })
}

pub fn ramp_shake(world: &mut WorldState, peak: f32, duration: f32) -> TaskId {
    world
        .effects
        .schedule(Cadence::Span { duration }, Effect::ShakeRamp { peak })
}

/// Tick the effect scheduler and apply this frame's firings.
///
/// Targets despawned since scheduling are skipped.
pub fn update_effects(world: &mut WorldState, dt: f32) {
    for firing in world.effects.tick(dt) {
        if let Err(e) = apply(world, &firing) {
            log::debug!("Effect {:?} skipped: {}", firing.id, e);
        }
    }
}

fn apply(world: &mut WorldState, firing: &Firing<Effect>) -> Result<(), SceneError> {
    let p = firing.progress;
    match firing.task {
        Effect::Flicker { light, base, low, high } => {
            let intensity = if firing.last {
                base
            } else if high > low {
                world.rng.gen_range(low..=high)
            } else {
                low
            };
            world.scene.set_light_intensity(light, intensity)
        }
        Effect::LightFade { light, from, to } => world.scene.set_light_intensity(light, lerp(from, to, p)),
        Effect::Rumble { from, to } => {
            world.audio.rumble_gain = lerp(from, to, p);
            Ok(())
        }
        Effect::ShakeRamp { peak } => {
            world.shake.sustain = if firing.last { 0.0 } else { peak * p };
            if firing.last {
                world.shake.add_trauma(peak);
            }
            Ok(())
        }
    }
}

/// Exact at both ends: `lerp(a, b, 1.0) == b`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}
