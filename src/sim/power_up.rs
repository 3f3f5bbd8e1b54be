//! Power-up lifecycle: spawning, activation and expiry

use std::collections::BTreeMap;

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityVariant, PowerUpKind};
use crate::consts::SPAWN_LINE_X;

/// Where generated power-ups appear, just past the right screen edge
pub const POWER_UP_SPAWN_POS: DVec2 = DVec2::new(SPAWN_LINE_X, 0.45);

/// Spawn chance multiplier granted by the shop upgrade
pub const CHANCE_UPGRADE_MULTIPLIER: f64 = 2.0;

/// Shop upgrades that affect power-ups, read once per run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PowerUpUpgrades {
    /// Double-coin pickups last twice as long
    pub double_coin_duration: bool,
    /// Spawn attempts succeed more often
    pub spawn_chance_multiplier: bool,
}

/// A currently active effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub remaining_ms: u64,
    /// Coin multiplier steps for double-coins, 1 for a shield charge
    pub magnitude: u32,
}

/// Tracks active power-ups and decides when new ones spawn
#[derive(Debug, Clone)]
pub struct PowerUpManager {
    active: BTreeMap<PowerUpKind, ActivePowerUp>,
    rng: Pcg32,
    upgrades: PowerUpUpgrades,
    base_chance: f64,
    cooldown_ms: u64,
    last_spawn_ms: Option<u64>,
}

impl PowerUpManager {
    pub fn new(rng: Pcg32, upgrades: PowerUpUpgrades, base_chance: f64, cooldown_ms: u64) -> Self {
        Self {
            active: BTreeMap::new(),
            rng,
            upgrades,
            base_chance,
            cooldown_ms,
            last_spawn_ms: None,
        }
    }

    /// Probability that one spawn attempt produces a power-up
    pub fn spawn_chance(&self) -> f64 {
        let chance = if self.upgrades.spawn_chance_multiplier {
            self.base_chance * CHANCE_UPGRADE_MULTIPLIER
        } else {
            self.base_chance
        };
        chance.clamp(0.0, 1.0)
    }

    /// One spawn attempt at wall-clock `now_ms`
    ///
    /// Attempts inside the cooldown after a successful spawn never spawn.
    pub fn generate(&mut self, now_ms: u64) -> Option<Entity> {
        if let Some(last) = self.last_spawn_ms {
            if now_ms.saturating_sub(last) < self.cooldown_ms {
                return None;
            }
        }
        if !self.rng.random_bool(self.spawn_chance()) {
            return None;
        }

        let kind = PowerUpKind::ALL[self.rng.random_range(0..PowerUpKind::ALL.len())];
        self.last_spawn_ms = Some(now_ms);
        log::debug!("Spawning {kind:?} power-up");
        Some(Entity::power_up(
            kind,
            POWER_UP_SPAWN_POS,
            self.upgrades.double_coin_duration,
        ))
    }

    /// Start or restart the effect of a collected pickup
    ///
    /// Returns the activated kind, `None` if the entity is not a power-up.
    pub fn activate(&mut self, pickup: &Entity) -> Option<PowerUpKind> {
        let record = match pickup.variant {
            EntityVariant::ShieldPowerUp { duration_ms } => ActivePowerUp {
                kind: PowerUpKind::Shield,
                remaining_ms: duration_ms,
                magnitude: 1,
            },
            EntityVariant::DoubleCoinsPowerUp { duration_ms } => ActivePowerUp {
                kind: PowerUpKind::DoubleCoins,
                remaining_ms: duration_ms,
                magnitude: 1,
            },
            _ => return None,
        };
        self.active.insert(record.kind, record);
        Some(record.kind)
    }

    /// Age every active effect, dropping the ones that ran out
    pub fn tick(&mut self, elapsed_ms: u64) {
        self.active.retain(|kind, record| {
            record.remaining_ms = record.remaining_ms.saturating_sub(elapsed_ms);
            let alive = record.remaining_ms > 0;
            if !alive {
                log::debug!("{kind:?} power-up expired");
            }
            alive
        });
    }

    pub fn has_shield(&self) -> bool {
        self.active.contains_key(&PowerUpKind::Shield)
    }

    /// Use up the shield; returns whether one was active
    pub fn consume_shield(&mut self) -> bool {
        self.active.remove(&PowerUpKind::Shield).is_some()
    }

    /// Coin multiplier steps: a coin is worth `base * 2^multiplier`
    pub fn coin_multiplier(&self) -> u32 {
        self.active
            .get(&PowerUpKind::DoubleCoins)
            .map_or(0, |record| record.magnitude)
    }

    pub fn active(&self) -> Vec<ActivePowerUp> {
        self.active.values().copied().collect()
    }
}
