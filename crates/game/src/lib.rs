//! Roadside game logic: the scene store, player, interactables, event
//! sequencer, liminal areas, ghost face, casino games and the session loop
//! that ticks them in order.

pub mod areas;
pub mod autopilot;
pub mod casino;
pub mod config;
pub mod effects;
pub mod ghost;
pub mod interact;
pub mod liminal;
pub mod player;
pub mod scene;
pub mod sequencer;
pub mod session;
pub mod state;
