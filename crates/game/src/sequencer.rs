//! The cat's possession sequence.
//!
//! A stray cat waits by the road. When the player comes close it walks up,
//! stares, its eyes turn red and its head spins, a portal opens beneath it and
//! drags it under, and after a quiet spell the moon is replaced by something
//! that keeps watching the player.

use engine_core::{Material, PointLight, Transform};
use glam::{Quat, Vec3};
use hecs::Entity;

use crate::config::SequencerTuning;
use crate::effects::{self, lerp};
use crate::scene::SceneError;
use crate::state::WorldState;

/// Number of points along each tentacle curve.
const TENTACLE_SEGMENTS: usize = 8;
const TENTACLE_LENGTH: f32 = 2.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatPhase {
    Idle,
    Approaching,
    Staring,
    Horrifying,
    Descending,
    Descended,
    QuietRespite,
    MoonSwap,
    Watching,
}

/// Scene objects that make up the cat and its portal.
#[derive(Debug, Clone)]
pub struct CatRig {
    pub body: Entity,
    pub head: Entity,
    pub eyes: Vec<Entity>,
    pub portal: Entity,
    pub portal_light: Entity,
    pub tentacles: Vec<Entity>,
}

impl CatRig {
    /// Objects that move with the body in every phase.
    fn carried(&self) -> impl Iterator<Item = Entity> + '_ {
        std::iter::once(self.head).chain(self.eyes.iter().copied())
    }

    /// Objects dragged along while the cat walks, left behind once the portal opens.
    fn dragged(&self) -> impl Iterator<Item = Entity> + '_ {
        [self.portal, self.portal_light]
            .into_iter()
            .chain(self.tentacles.iter().copied())
    }

    fn all(&self) -> Vec<Entity> {
        let mut all = vec![self.body];
        all.extend(self.carried());
        all.extend(self.dragged());
        all
    }
}

/// The sky objects the sequence replaces at the end.
#[derive(Debug, Clone, Copy)]
pub struct SkyRig {
    pub moon: Entity,
    pub moon_light: Entity,
}

/// State of the possession sequence. One per session; it never resets.
pub struct CatSequence {
    phase: CatPhase,
    timer: f32,
    tuning: SequencerTuning,
    cat: Option<CatRig>,
    /// Offset of every linked object from the body, captured at start.
    offsets: Vec<(Entity, Vec3)>,
    sky: SkyRig,
    moon_light_base: f32,
    watcher: Option<Entity>,
    /// Current tentacle curves in world space, rebuilt every descending frame.
    tentacle_paths: Vec<Vec<Vec3>>,
}

impl CatSequence {
    pub fn new(world: &WorldState, cat: CatRig, sky: SkyRig, tuning: SequencerTuning) -> Result<Self, SceneError> {
        let body_pos = world.scene.position(cat.body)?;
        let mut offsets = Vec::new();
        for e in cat.carried().chain(cat.dragged()) {
            offsets.push((e, world.scene.position(e)? - body_pos));
        }
        let moon_light_base = world.scene.light(sky.moon_light)?.intensity;
        Ok(Self {
            phase: CatPhase::Idle,
            timer: 0.0,
            tuning,
            tentacle_paths: vec![Vec::new(); cat.tentacles.len()],
            cat: Some(cat),
            offsets,
            sky,
            moon_light_base,
            watcher: None,
        })
    }

    pub fn phase(&self) -> CatPhase {
        self.phase
    }

    fn rig(&self) -> Result<&CatRig, SceneError> {
        self.cat
            .as_ref()
            .ok_or_else(|| SceneError::MissingObject("cat".to_string()))
    }

    fn enter(&mut self, phase: CatPhase, timer: f32) {
        log::info!("Cat sequence: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.timer = timer;
    }

    /// Advance one frame. Returns the new phase when a transition happened.
    pub fn update(&mut self, world: &mut WorldState, dt: f32, time: f32) -> Result<Option<CatPhase>, SceneError> {
        let before = self.phase;
        match self.phase {
            CatPhase::Idle => {
                let body = self.rig()?.body;
                if self.distance_to_player(world, body)? < self.tuning.notice_distance {
                    world.audio.play("cat_meow", time);
                    self.enter(CatPhase::Approaching, 0.0);
                }
            }
            CatPhase::Approaching => self.approach(world, dt)?,
            CatPhase::Staring => {
                let body = self.rig()?.body;
                let target = world.player.position;
                world.scene.update_transform(body, |t| face_flat(t, target))?;
                self.timer -= dt;
                if self.timer <= 0.0 {
                    self.start_horror(world, time)?;
                }
            }
            CatPhase::Horrifying => {
                let head = self.rig()?.head;
                let spin = self.tuning.head_spin_rate * dt;
                world.scene.update_transform(head, |t| t.rotate_y(spin))?;
                self.timer -= dt;
                if self.timer <= 0.0 {
                    world.audio.play("portal_open", time);
                    self.enter(CatPhase::Descending, 0.0);
                }
            }
            CatPhase::Descending => self.descend(world, dt, time)?,
            CatPhase::Descended => self.close_portal(world, dt)?,
            CatPhase::QuietRespite => {
                self.timer -= dt;
                if self.timer <= 0.0 {
                    self.spawn_watcher(world)?;
                    world.audio.play("low_drone", time);
                    self.enter(CatPhase::MoonSwap, 0.0);
                }
            }
            CatPhase::MoonSwap => self.swap_moon(world, dt)?,
            CatPhase::Watching => {
                let watcher = self.watcher.ok_or_else(|| SceneError::MissingObject("watcher".to_string()))?;
                let eye = world.eye_position();
                world.scene.update_transform(watcher, |t| t.look_at(eye, Vec3::Y))?;
            }
        }
        Ok((self.phase != before).then_some(self.phase))
    }

    fn distance_to_player(&self, world: &WorldState, body: Entity) -> Result<f32, SceneError> {
        Ok(world.scene.position(body)?.distance(world.player.position))
    }

    fn approach(&mut self, world: &mut WorldState, dt: f32) -> Result<(), SceneError> {
        let body = self.rig()?.body;
        if self.distance_to_player(world, body)? <= self.tuning.stare_distance {
            self.enter(CatPhase::Staring, self.tuning.stare_seconds);
            return Ok(());
        }

        let player = world.player.position;
        let pos = world.scene.position(body)?;
        let mut dir = player - pos;
        dir.y = 0.0;
        let step = dir.normalize_or_zero() * self.tuning.approach_speed * dt;
        let new_pos = pos + step;
        world.scene.update_transform(body, |t| {
            t.position = new_pos;
            face_flat(t, player);
        })?;
        for &(e, offset) in &self.offsets {
            world.scene.set_position(e, new_pos + offset)?;
        }
        Ok(())
    }

    fn start_horror(&mut self, world: &mut WorldState, time: f32) -> Result<(), SceneError> {
        let eyes = self.rig()?.eyes.clone();
        for eye in eyes {
            let base = world.scene.material(eye)?;
            let glare = Material { emissive: Vec3::new(1.0, 0.0, 0.0), emissive_intensity: 3.0, ..base };
            world.scene.set_material(eye, glare)?;
        }
        world.audio.play("rumble", time);
        effects::ramp_rumble(world, 1.0, 1.0);
        effects::ramp_shake(world, 0.6, 1.0);
        self.enter(CatPhase::Horrifying, self.tuning.horror_seconds);
        Ok(())
    }

    fn descend(&mut self, world: &mut WorldState, dt: f32, time: f32) -> Result<(), SceneError> {
        let rig = self.rig()?.clone();
        let t = self.tuning;

        let scale = world.scene.transform(rig.portal)?.scale;
        let scale = scale + (Vec3::ONE - scale) * t.portal_grow;
        world.scene.set_scale(rig.portal, scale)?;

        let light = world.scene.light(rig.portal_light)?.intensity;
        world
            .scene
            .set_light_intensity(rig.portal_light, (light + t.light_ramp * dt).min(t.light_cap))?;

        let portal_pos = world.scene.position(rig.portal)?;
        for (i, &tentacle) in rig.tentacles.iter().enumerate() {
            let path = tentacle_curve(portal_pos, i, rig.tentacles.len(), scale.x, time);
            if let Some(&tip) = path.last() {
                world.scene.set_position(tentacle, tip)?;
            }
            self.tentacle_paths[i] = path;
        }

        if scale.x > t.sink_threshold {
            let sink = t.sink_speed * dt;
            world.scene.update_transform(rig.body, |tr| tr.translate(Vec3::NEG_Y * sink))?;
            let body_pos = world.scene.position(rig.body)?;
            for e in rig.carried() {
                let offset = self.offset_of(e);
                world.scene.set_position(e, body_pos + offset)?;
            }
            if body_pos.y < t.sink_depth {
                self.enter(CatPhase::Descended, 0.0);
            }
        }
        Ok(())
    }

    fn close_portal(&mut self, world: &mut WorldState, dt: f32) -> Result<(), SceneError> {
        let rig = self.rig()?.clone();
        let t = self.tuning;

        let scale = world.scene.transform(rig.portal)?.scale;
        let scale = scale - scale * t.portal_shrink;
        world.scene.set_scale(rig.portal, scale)?;

        let light = world.scene.light(rig.portal_light)?.intensity;
        world
            .scene
            .set_light_intensity(rig.portal_light, (light - t.light_ramp * dt).max(0.0))?;

        let sink = t.sink_speed * dt;
        for &tentacle in &rig.tentacles {
            world.scene.update_transform(tentacle, |tr| tr.translate(Vec3::NEG_Y * sink))?;
        }
        for path in &mut self.tentacle_paths {
            for p in path.iter_mut() {
                p.y -= sink;
            }
        }

        if scale.x < 0.01 {
            for e in rig.all() {
                if world.scene.contains(e) {
                    world.scene.despawn(e)?;
                }
            }
            self.cat = None;
            self.offsets.clear();
            self.tentacle_paths.clear();
            self.enter(CatPhase::QuietRespite, self.tuning.respite_seconds);
        }
        Ok(())
    }

    fn spawn_watcher(&mut self, world: &mut WorldState) -> Result<(), SceneError> {
        let moon = world.scene.transform(self.sky.moon)?;
        let watcher = world.scene.spawn("watcher", moon);
        world
            .scene
            .set_material(watcher, Material::glowing(Vec3::new(0.9, 0.1, 0.05), 1.5))?;
        world.scene.set_opacity(watcher, 0.0)?;
        world.scene.insert(
            watcher,
            PointLight::new(0.0, Vec3::new(1.0, 0.2, 0.1), 400.0),
        )?;
        self.watcher = Some(watcher);
        Ok(())
    }

    fn swap_moon(&mut self, world: &mut WorldState, dt: f32) -> Result<(), SceneError> {
        let watcher = self.watcher.ok_or_else(|| SceneError::MissingObject("watcher".to_string()))?;
        let fade = self.tuning.moon_fade_rate * dt;

        let rising = (world.scene.opacity(watcher)? + fade).min(1.0);
        world.scene.set_opacity(watcher, rising)?;
        world.scene.set_opacity(self.sky.moon, 1.0 - rising)?;
        world
            .scene
            .set_light_intensity(self.sky.moon_light, lerp(self.moon_light_base, 0.0, rising))?;
        world
            .scene
            .set_light_intensity(watcher, lerp(0.0, self.moon_light_base, rising))?;

        if rising >= 1.0 {
            world.scene.set_visible(self.sky.moon, false)?;
            self.enter(CatPhase::Watching, 0.0);
        }
        Ok(())
    }

    fn offset_of(&self, e: Entity) -> Vec3 {
        self.offsets
            .iter()
            .find(|(o, _)| *o == e)
            .map(|(_, offset)| *offset)
            .unwrap_or(Vec3::ZERO)
    }
}

/// Rotate about Y so the transform faces `target` on the ground plane.
fn face_flat(t: &mut Transform, target: Vec3) {
    let to = target - t.position;
    if to.x * to.x + to.z * to.z > 1e-6 {
        t.rotation = Quat::from_rotation_y((-to.x).atan2(-to.z));
    }
}

/// A swaying curve rising out of the portal rim.
fn tentacle_curve(center: Vec3, index: usize, count: usize, reach: f32, time: f32) -> Vec<Vec3> {
    let angle = index as f32 / count.max(1) as f32 * std::f32::consts::TAU;
    let root = center + Vec3::new(angle.cos(), 0.0, angle.sin()) * 0.8 * reach;
    let outward = Vec3::new(angle.cos(), 0.0, angle.sin());
    (0..TENTACLE_SEGMENTS)
        .map(|s| {
            let u = s as f32 / (TENTACLE_SEGMENTS - 1) as f32;
            let sway = (time * 2.0 + index as f32 * 0.7 + u * 3.0).sin() * 0.35 * u;
            root + Vec3::Y * (u * TENTACLE_LENGTH * reach)
                + outward * (sway + u * 0.3)
                + Vec3::new(-outward.z, 0.0, outward.x) * sway * 0.5
        })
        .collect()
}
