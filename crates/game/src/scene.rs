//! Headless scene store backed by `hecs`.
//!
//! Every object is an entity with at least a `Label`, `Transform` and
//! `Visible`. Lights, materials and opacity are optional components.
//! Positions are world-space; `Parent` only drives visibility and despawn.

use engine_core::{Label, Material, Opacity, Parent, PointLight, Transform, Visible};
use glam::Vec3;
use hecs::{Component, ComponentError, Entity, World};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SceneError {
    /// A referenced object was never spawned or has been despawned.
    #[error("scene object {0} is missing")]
    MissingObject(String),
    /// The object exists but lacks a component the caller relies on.
    #[error("scene object '{label}' has no {component}")]
    MissingComponent { label: String, component: &'static str },
}

pub struct Scene {
    world: World,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self { world: World::new() }
    }

    /// Spawn a visible object.
    pub fn spawn(&mut self, label: impl Into<String>, transform: Transform) -> Entity {
        self.world.spawn((Label::new(label), transform, Visible(true)))
    }

    /// Spawn an object parented to `parent`.
    pub fn spawn_child(&mut self, parent: Entity, label: impl Into<String>, transform: Transform) -> Entity {
        self.world
            .spawn((Label::new(label), transform, Visible(true), Parent(parent)))
    }

    /// Spawn a point light, optionally parented.
    pub fn spawn_light(
        &mut self,
        parent: Option<Entity>,
        label: impl Into<String>,
        position: Vec3,
        light: PointLight,
    ) -> Entity {
        let label = Label::new(label);
        let transform = Transform::from_position(position);
        match parent {
            Some(p) => self.world.spawn((label, transform, Visible(true), light, Parent(p))),
            None => self.world.spawn((label, transform, Visible(true), light)),
        }
    }

    /// Attach or replace a component.
    pub fn insert<C: Component>(&mut self, entity: Entity, component: C) -> Result<(), SceneError> {
        self.world
            .insert_one(entity, component)
            .map_err(|_| SceneError::MissingObject(format!("{entity:?}")))
    }

    /// Despawn an object and, recursively, everything parented to it.
    pub fn despawn(&mut self, entity: Entity) -> Result<(), SceneError> {
        for child in self.children(entity) {
            self.despawn(child)?;
        }
        self.world
            .despawn(entity)
            .map_err(|_| SceneError::MissingObject(format!("{entity:?}")))
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.world.contains(entity)
    }

    pub fn len(&self) -> u32 {
        self.world.len()
    }

    /// Direct children of `entity`.
    pub fn children(&self, entity: Entity) -> Vec<Entity> {
        self.world
            .query::<&Parent>()
            .iter()
            .filter(|(_, parent)| parent.0 == entity)
            .map(|(child, _)| child)
            .collect()
    }

    pub fn label(&self, entity: Entity) -> String {
        match self.world.get::<&Label>(entity) {
            Ok(label) => label.0.clone(),
            Err(_) => format!("{entity:?}"),
        }
    }

    /// Find the first object with this label.
    pub fn find(&self, label: &str) -> Option<Entity> {
        self.world
            .query::<&Label>()
            .iter()
            .find(|(_, l)| l.0 == label)
            .map(|(e, _)| e)
    }

    fn get<C: Component + Copy>(&self, entity: Entity, component: &'static str) -> Result<C, SceneError> {
        match self.world.get::<&C>(entity) {
            Ok(c) => Ok(*c),
            Err(err) => Err(self.component_error(entity, component, err)),
        }
    }

    fn with_mut<C: Component, R>(
        &mut self,
        entity: Entity,
        component: &'static str,
        f: impl FnOnce(&mut C) -> R,
    ) -> Result<R, SceneError> {
        match self.world.get::<&mut C>(entity) {
            Ok(mut c) => Ok(f(&mut *c)),
            Err(err) => Err(self.component_error(entity, component, err)),
        }
    }

    fn component_error(&self, entity: Entity, component: &'static str, err: ComponentError) -> SceneError {
        match err {
            ComponentError::NoSuchEntity => SceneError::MissingObject(format!("{entity:?}")),
            ComponentError::MissingComponent(_) => SceneError::MissingComponent {
                label: self.label(entity),
                component,
            },
        }
    }

    pub fn transform(&self, entity: Entity) -> Result<Transform, SceneError> {
        self.get::<Transform>(entity, "transform")
    }

    pub fn update_transform(&mut self, entity: Entity, f: impl FnOnce(&mut Transform)) -> Result<(), SceneError> {
        self.with_mut::<Transform, _>(entity, "transform", f)
    }

    pub fn position(&self, entity: Entity) -> Result<Vec3, SceneError> {
        Ok(self.transform(entity)?.position)
    }

    pub fn set_position(&mut self, entity: Entity, position: Vec3) -> Result<(), SceneError> {
        self.update_transform(entity, |t| t.position = position)
    }

    pub fn set_scale(&mut self, entity: Entity, scale: Vec3) -> Result<(), SceneError> {
        self.update_transform(entity, |t| t.scale = scale)
    }

    pub fn set_visible(&mut self, entity: Entity, visible: bool) -> Result<(), SceneError> {
        self.with_mut::<Visible, _>(entity, "visibility", |v| v.0 = visible)
    }

    /// The object's own visibility flag.
    pub fn is_visible(&self, entity: Entity) -> Result<bool, SceneError> {
        Ok(self.get::<Visible>(entity, "visibility")?.0)
    }

    /// True when the object and every ancestor are visible.
    pub fn is_rendered(&self, entity: Entity) -> bool {
        let mut current = Some(entity);
        while let Some(e) = current {
            if !self.is_visible(e).unwrap_or(false) {
                return false;
            }
            current = self.world.get::<&Parent>(e).ok().map(|p| p.0);
        }
        true
    }

    /// Opacity, treating objects without an `Opacity` component as opaque.
    pub fn opacity(&self, entity: Entity) -> Result<f32, SceneError> {
        match self.world.get::<&Opacity>(entity) {
            Ok(o) => Ok(o.0),
            Err(ComponentError::MissingComponent(_)) => Ok(1.0),
            Err(err) => Err(self.component_error(entity, "opacity", err)),
        }
    }

    pub fn set_opacity(&mut self, entity: Entity, opacity: f32) -> Result<(), SceneError> {
        self.insert(entity, Opacity::new(opacity))
    }

    pub fn light(&self, entity: Entity) -> Result<PointLight, SceneError> {
        self.get::<PointLight>(entity, "point light")
    }

    pub fn set_light_intensity(&mut self, entity: Entity, intensity: f32) -> Result<(), SceneError> {
        self.with_mut::<PointLight, _>(entity, "point light", |l| l.intensity = intensity.max(0.0))
    }

    pub fn material(&self, entity: Entity) -> Result<Material, SceneError> {
        self.get::<Material>(entity, "material")
    }

    pub fn set_material(&mut self, entity: Entity, material: Material) -> Result<(), SceneError> {
        self.insert(entity, material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn despawn_removes_children_recursively() {
        let mut scene = Scene::new();
        let root = scene.spawn("root", Transform::default());
        let child = scene.spawn_child(root, "child", Transform::default());
        let grandchild = scene.spawn_child(child, "grandchild", Transform::default());
        let other = scene.spawn("other", Transform::default());
        scene.despawn(root).unwrap();
        assert!(!scene.contains(child));
        assert!(!scene.contains(grandchild));
        assert!(scene.contains(other));
    }

    #[test]
    fn lights_spawn_with_their_parent() {
        let mut scene = Scene::new();
        let room = scene.spawn("room", Transform::default());
        let lamp = scene.spawn_light(Some(room), "lamp", Vec3::Y * 3.0, PointLight::new(1.5, Vec3::ONE, 8.0));
        assert_eq!(scene.children(room), vec![lamp]);
        let street = scene.spawn_light(None, "street", Vec3::ZERO, PointLight::new(0.5, Vec3::ONE, 8.0));
        assert_eq!(scene.light(lamp).unwrap().intensity, 1.5);
        assert_eq!(scene.position(lamp), Ok(Vec3::Y * 3.0));
        scene.set_visible(room, false).unwrap();
        assert!(!scene.is_rendered(lamp));
        assert!(scene.is_rendered(street));
        scene.despawn(room).unwrap();
        assert!(!scene.contains(lamp));
    }

    #[test]
    fn missing_objects_and_components_are_reported() {
        let mut scene = Scene::new();
        let lamp = scene.spawn("lamp", Transform::default());
        assert_eq!(
            scene.light(lamp),
            Err(SceneError::MissingComponent { label: "lamp".into(), component: "point light" })
        );
        scene.despawn(lamp).unwrap();
        assert!(matches!(scene.position(lamp), Err(SceneError::MissingObject(_))));
    }

    #[test]
    fn hidden_parent_hides_children() {
        let mut scene = Scene::new();
        let root = scene.spawn("root", Transform::default());
        let child = scene.spawn_child(root, "child", Transform::default());
        assert!(scene.is_rendered(child));
        scene.set_visible(root, false).unwrap();
        assert!(!scene.is_rendered(child));
        assert!(scene.is_visible(child).unwrap());
    }

    #[test]
    fn opacity_defaults_to_opaque() {
        let mut scene = Scene::new();
        let moon = scene.spawn("moon", Transform::default());
        assert_eq!(scene.opacity(moon), Ok(1.0));
        scene.set_opacity(moon, 0.25).unwrap();
        assert_eq!(scene.opacity(moon), Ok(0.25));
        assert_eq!(scene.find("moon"), Some(moon));
    }
}
