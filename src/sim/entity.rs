//! Entity model
//!
//! Entities are a closed set of variants. Kind drives velocity and dimension
//! lookups, category drives collision handling.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::velocity::VelocityRegistry;
use crate::consts::*;
use crate::error::SimError;
use crate::visual::VisualMetadata;

/// Identifier assigned when an entity joins the live collection
pub type EntityId = u32;

/// Discrete variant tag used for velocity and dimension lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Background,
    Ship,
    Asteroid,
    Ufo,
    Coin,
    ShieldPowerUp,
    DoubleCoinsPowerUp,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Background,
        EntityKind::Ship,
        EntityKind::Asteroid,
        EntityKind::Ufo,
        EntityKind::Coin,
        EntityKind::ShieldPowerUp,
        EntityKind::DoubleCoinsPowerUp,
    ];

    pub fn category(self) -> Category {
        match self {
            EntityKind::Asteroid | EntityKind::Ufo => Category::Obstacle,
            EntityKind::Coin => Category::Coin,
            EntityKind::ShieldPowerUp | EntityKind::DoubleCoinsPowerUp => Category::PowerUp,
            EntityKind::Background | EntityKind::Ship => Category::Scenery,
        }
    }

    /// Power-up kind for the pickup variants
    pub fn power_up(self) -> Option<PowerUpKind> {
        match self {
            EntityKind::ShieldPowerUp => Some(PowerUpKind::Shield),
            EntityKind::DoubleCoinsPowerUp => Some(PowerUpKind::DoubleCoins),
            _ => None,
        }
    }
}

/// Collision handling group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Ends the run unless a shield absorbs it
    Obstacle,
    Coin,
    PowerUp,
    /// Ship and background, never collected
    Scenery,
}

/// Power-up effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    DoubleCoins,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 2] = [PowerUpKind::Shield, PowerUpKind::DoubleCoins];

    pub fn entity_kind(self) -> EntityKind {
        match self {
            PowerUpKind::Shield => EntityKind::ShieldPowerUp,
            PowerUpKind::DoubleCoins => EntityKind::DoubleCoinsPowerUp,
        }
    }
}

/// Vertical steering input for the ship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipDirection {
    Up,
    Down,
}

/// Variant payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityVariant {
    Background,
    Ship,
    Asteroid,
    /// UFO riding a sine wave; `wave_offset` shifts the phase by `2π * offset`
    Ufo { wave_offset: f64 },
    Coin,
    /// Pickups carry their active duration, fixed when constructed
    ShieldPowerUp { duration_ms: u64 },
    DoubleCoinsPowerUp { duration_ms: u64 },
}

/// A simulated entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Assigned by the live collection on insert (0 until then)
    pub id: EntityId,
    pub variant: EntityVariant,
    /// Top-left corner in scroll-space
    pos: DVec2,
}

impl Entity {
    pub fn new(variant: EntityVariant, pos: DVec2) -> Self {
        Self { id: 0, variant, pos }
    }

    pub fn ship() -> Self {
        Self::new(EntityVariant::Ship, DVec2::new(SHIP_START_X, SHIP_START_Y))
    }

    pub fn background() -> Self {
        Self::new(EntityVariant::Background, DVec2::ZERO)
    }

    pub fn asteroid(pos: DVec2) -> Self {
        Self::new(EntityVariant::Asteroid, pos)
    }

    pub fn ufo(pos: DVec2, wave_offset: f64) -> Self {
        Self::new(EntityVariant::Ufo { wave_offset }, pos)
    }

    pub fn coin(pos: DVec2) -> Self {
        Self::new(EntityVariant::Coin, pos)
    }

    /// Shield pickup with the standard duration
    pub fn shield_power_up(pos: DVec2) -> Self {
        Self::new(
            EntityVariant::ShieldPowerUp {
                duration_ms: SHIELD_DURATION_MS,
            },
            pos,
        )
    }

    /// Double-coins pickup; the shop upgrade doubles its duration
    pub fn double_coins_power_up(pos: DVec2, double_duration: bool) -> Self {
        let duration_ms = if double_duration {
            DOUBLE_COINS_DURATION_MS * 2
        } else {
            DOUBLE_COINS_DURATION_MS
        };
        Self::new(EntityVariant::DoubleCoinsPowerUp { duration_ms }, pos)
    }

    pub fn power_up(kind: PowerUpKind, pos: DVec2, double_coin_duration: bool) -> Self {
        match kind {
            PowerUpKind::Shield => Self::shield_power_up(pos),
            PowerUpKind::DoubleCoins => Self::double_coins_power_up(pos, double_coin_duration),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self.variant {
            EntityVariant::Background => EntityKind::Background,
            EntityVariant::Ship => EntityKind::Ship,
            EntityVariant::Asteroid => EntityKind::Asteroid,
            EntityVariant::Ufo { .. } => EntityKind::Ufo,
            EntityVariant::Coin => EntityKind::Coin,
            EntityVariant::ShieldPowerUp { .. } => EntityKind::ShieldPowerUp,
            EntityVariant::DoubleCoinsPowerUp { .. } => EntityKind::DoubleCoinsPowerUp,
        }
    }

    #[inline]
    pub fn category(&self) -> Category {
        self.kind().category()
    }

    #[inline]
    pub fn pos(&self) -> DVec2 {
        self.pos
    }

    /// Shift by a fixed offset (used when placing preset templates)
    pub(crate) fn translated(mut self, offset: DVec2) -> Self {
        self.pos += offset;
        self
    }

    /// Advance by `elapsed_ms` using the kind's registered velocity
    ///
    /// UFOs snap onto their sine path first and move with the finite
    /// difference between this sample and the next one.
    pub fn advance(
        &mut self,
        elapsed_ms: u64,
        velocities: &VelocityRegistry,
        visuals: &dyn VisualMetadata,
    ) -> Result<(), SimError> {
        let velocity = velocities.get(self.kind())?;
        let velocity = match self.variant {
            EntityVariant::Ufo { wave_offset } => {
                let center = ufo_wave_center(visuals);
                let current_y = ufo_wave_y(self.pos.x, wave_offset, center);
                self.pos.y = current_y;
                let next_x = self.pos.x + velocity.x;
                let next_y = ufo_wave_y(next_x, wave_offset, center);
                DVec2::new(velocity.x, next_y - current_y)
            }
            _ => velocity,
        };
        self.apply_velocity(velocity, elapsed_ms);
        Ok(())
    }

    /// Steer the ship vertically, keeping it on screen when its size is known
    pub fn steer(
        &mut self,
        direction: ShipDirection,
        elapsed_ms: u64,
        velocities: &VelocityRegistry,
        visuals: &dyn VisualMetadata,
    ) -> Result<(), SimError> {
        let speed = velocities.get(self.kind())?.y.abs();
        let dy = match direction {
            ShipDirection::Up => -speed,
            ShipDirection::Down => speed,
        };
        self.apply_velocity(DVec2::new(0.0, dy), elapsed_ms);

        if let Ok(size) = visuals.dimensions(self.kind()) {
            let max_y = (1.0 - size.y).max(0.0);
            self.pos.y = self.pos.y.clamp(0.0, max_y);
        }
        Ok(())
    }

    fn apply_velocity(&mut self, velocity: DVec2, elapsed_ms: u64) {
        self.pos += velocity * (elapsed_ms as f64 / 1000.0);
    }
}

/// Vertical center of the UFO wave, keeping the sprite centered on screen
fn ufo_wave_center(visuals: &dyn VisualMetadata) -> f64 {
    match visuals.dimensions(EntityKind::Ufo) {
        Ok(size) => 0.5 - 0.5 * size.y,
        Err(err) => {
            log::error!("{err}; centering UFO wave without its height");
            0.5
        }
    }
}

fn ufo_wave_y(x: f64, wave_offset: f64, center: f64) -> f64 {
    UFO_WAVE_AMPLITUDE
        * (x * UFO_WAVE_FREQUENCY + UFO_WAVE_PHASE + std::f64::consts::TAU * wave_offset).sin()
        + center
}
