//! Simulation module
//!
//! All gameplay logic lives here:
//! - Entity model and per-kind velocities
//! - Rectangle collision tests
//! - Power-up lifecycle and preset spawning
//! - The frame controller and its background tasks
//!
//! Rendering, sound and storage stay behind the collaborator traits.

pub mod collision;
pub mod controller;
pub mod entities;
pub mod entity;
pub mod fps;
pub mod power_up;
pub mod preset;
pub mod scheduler;
pub mod velocity;

pub use collision::{Rect, collides};
pub use controller::{Collaborators, Lifecycle, SimulationController};
pub use entities::EntitySet;
pub use entity::{Category, Entity, EntityId, EntityKind, EntityVariant, PowerUpKind, ShipDirection};
pub use fps::FpsTracker;
pub use power_up::{ActivePowerUp, PowerUpManager, PowerUpUpgrades};
pub use preset::{Preset, PresetGenerator, PresetSpacing};
pub use scheduler::Scheduler;
pub use velocity::VelocityRegistry;
