//! Interactable registry and the proximity scan that picks what [E] would use.

use glam::Vec3;
use hecs::Entity;

use crate::casino::CasinoGame;
use crate::liminal::AreaId;
use crate::scene::Scene;
use crate::state::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InteractableId(u32);

/// What happens when the player uses an interactable.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractAction {
    /// Walk through a liminal area's entry marker.
    EnterArea(AreaId),
    /// Use a liminal area's exit trigger.
    ExitArea(AreaId),
    /// An object declared by a liminal area's builder, by declaration index.
    AreaLocal { area: AreaId, index: usize },
    PickUp(Item),
    Play(CasinoGame),
    Read(String),
}

#[derive(Debug, Clone)]
pub struct Interactable {
    pub id: InteractableId,
    pub object: Entity,
    pub prompt: String,
    pub action: InteractAction,
}

/// Global list consulted by the interaction scan. Append/remove only.
#[derive(Debug, Default)]
pub struct InteractableRegistry {
    entries: Vec<Interactable>,
    next_id: u32,
}

impl InteractableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, object: Entity, prompt: impl Into<String>, action: InteractAction) -> InteractableId {
        let id = InteractableId(self.next_id);
        self.next_id += 1;
        self.entries.push(Interactable {
            id,
            object,
            prompt: prompt.into(),
            action,
        });
        id
    }

    pub fn remove(&mut self, id: InteractableId) -> Option<Interactable> {
        let index = self.entries.iter().position(|i| i.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, id: InteractableId) -> Option<&Interactable> {
        self.entries.iter().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interactable> {
        self.entries.iter()
    }

    /// Closest rendered interactable within `range` of `from`.
    ///
    /// Objects that are hidden, or whose ancestors are hidden (e.g. inside an
    /// inactive liminal area), are skipped. Ties keep registration order.
    pub fn nearest(&self, scene: &Scene, from: Vec3, range: f32) -> Option<&Interactable> {
        let mut best: Option<(&Interactable, f32)> = None;
        for entry in &self.entries {
            if !scene.is_rendered(entry.object) {
                continue;
            }
            let Ok(pos) = scene.position(entry.object) else {
                continue;
            };
            let dist = pos.distance(from);
            if dist > range {
                continue;
            }
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((entry, dist));
            }
        }
        best.map(|(entry, _)| entry)
    }
}
