//! Core engine types and utilities for Roadside.
//!
//! This crate provides the foundational types used across all game systems:
//! - Transform and spatial components
//! - Frame time management
//! - Scene components stored in the ECS
//! - The per-frame task scheduler

pub mod components;
pub mod error;
pub mod scheduler;
pub mod time;
pub mod transform;

pub use components::*;
pub use error::*;
pub use scheduler::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Quat, Vec2, Vec3};
pub use hecs::{Entity, World};
