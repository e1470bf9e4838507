//! Common ECS components for scene objects.
//!
//! The renderer is not part of this workspace; these components are the
//! state a renderer would read each frame.

use glam::Vec3;

/// Whether the object (and its children) is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visible(pub bool);

impl Default for Visible {
    fn default() -> Self {
        Self(true)
    }
}

/// Material opacity in `[0, 1]`. Objects without this component are opaque.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opacity(pub f32);

impl Opacity {
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn is_opaque(&self) -> bool {
        self.0 >= 1.0
    }
}

/// Point light attached to an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub intensity: f32,
    pub color: Vec3,
    pub range: f32,
}

impl PointLight {
    pub fn new(intensity: f32, color: Vec3, range: f32) -> Self {
        Self { intensity, color, range }
    }
}

/// Surface material. Only the parameters gameplay mutates are tracked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Vec3,
    pub emissive: Vec3,
    pub emissive_intensity: f32,
}

impl Material {
    pub fn matte(color: Vec3) -> Self {
        Self {
            color,
            emissive: Vec3::ZERO,
            emissive_intensity: 0.0,
        }
    }

    pub fn glowing(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            emissive: color,
            emissive_intensity: intensity,
        }
    }

    pub fn is_emissive(&self) -> bool {
        self.emissive_intensity > 0.0 && self.emissive != Vec3::ZERO
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::matte(Vec3::splat(0.8))
    }
}

/// Human-readable name, used in logs and error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label(pub String);

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Scene-graph parent link. Despawning a parent despawns its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub hecs::Entity);
