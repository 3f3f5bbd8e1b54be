//! Per-kind velocity registry
//!
//! Every entity of a kind shares one velocity. The table is read by every
//! move step and mutated by the difficulty ramp, so each operation runs
//! under one lock.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use glam::DVec2;

use super::entity::EntityKind;
use crate::consts::*;
use crate::error::SimError;

/// Thread-safe map from entity kind to velocity (scroll-space units/second)
#[derive(Debug, Default)]
pub struct VelocityRegistry {
    table: Mutex<HashMap<EntityKind, DVec2>>,
}

impl VelocityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<EntityKind, DVec2>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop every registered velocity
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Register the starting velocity of every kind in play
    pub fn configure_defaults(&self) {
        let defaults = [
            (EntityKind::Coin, DVec2::new(-COIN_SPEED_X, 0.0)),
            (EntityKind::Ufo, DVec2::new(-UFO_SPEED_X, 0.0)),
            (EntityKind::Ship, DVec2::new(0.0, SHIP_SPEED_Y)),
            (EntityKind::Asteroid, DVec2::new(-ASTEROID_SPEED_X, ASTEROID_SPEED_Y)),
            (EntityKind::ShieldPowerUp, DVec2::new(-POWER_UP_SPEED_X, 0.0)),
            (EntityKind::DoubleCoinsPowerUp, DVec2::new(-POWER_UP_SPEED_X, 0.0)),
            (EntityKind::Background, DVec2::new(-BACKGROUND_SPEED_X, 0.0)),
        ];
        let mut table = self.lock();
        table.clear();
        table.extend(defaults);
    }

    /// Register or overwrite the velocity of a kind
    pub fn set(&self, kind: EntityKind, vx: f64, vy: f64) -> Result<(), SimError> {
        if !vx.is_finite() || !vy.is_finite() {
            return Err(SimError::InvalidArgument(format!(
                "velocity for {kind:?} must be finite, got ({vx}, {vy})"
            )));
        }
        self.lock().insert(kind, DVec2::new(vx, vy));
        Ok(())
    }

    pub fn get(&self, kind: EntityKind) -> Result<DVec2, SimError> {
        self.lock()
            .get(&kind)
            .copied()
            .ok_or(SimError::NotConfigured {
                what: "velocity",
                kind,
            })
    }

    /// Accelerate every registered kind, leaving exactly-zero components alone
    pub fn accelerate_all(&self, dvx: f64, dvy: f64) {
        for velocity in self.lock().values_mut() {
            if velocity.x != 0.0 {
                velocity.x += dvx;
            }
            if velocity.y != 0.0 {
                velocity.y += dvy;
            }
        }
    }

    /// Accelerate one kind on both axes; unregistered kinds are ignored
    pub fn accelerate(&self, kind: EntityKind, dvx: f64, dvy: f64) {
        if let Some(velocity) = self.lock().get_mut(&kind) {
            *velocity += DVec2::new(dvx, dvy);
        }
    }

    pub fn accelerate_x(&self, kind: EntityKind, dvx: f64) {
        self.accelerate(kind, dvx, 0.0);
    }

    pub fn accelerate_y(&self, kind: EntityKind, dvy: f64) {
        self.accelerate(kind, 0.0, dvy);
    }

    pub fn is_configured(&self, kind: EntityKind) -> bool {
        self.lock().contains_key(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_unregistered_fails() {
        let registry = VelocityRegistry::new();
        assert!(matches!(
            registry.get(EntityKind::Coin),
            Err(SimError::NotConfigured {
                kind: EntityKind::Coin,
                ..
            })
        ));
    }

    #[test]
    fn test_set_overwrites() {
        let registry = VelocityRegistry::new();
        registry.set(EntityKind::Coin, -0.5, 0.0).unwrap();
        registry.set(EntityKind::Coin, -0.9, 0.1).unwrap();
        assert_eq!(registry.get(EntityKind::Coin).unwrap(), DVec2::new(-0.9, 0.1));
    }

    #[test]
    fn test_set_rejects_non_finite() {
        let registry = VelocityRegistry::new();
        assert!(matches!(
            registry.set(EntityKind::Coin, f64::NAN, 0.0),
            Err(SimError::InvalidArgument(_))
        ));
        assert!(!registry.is_configured(EntityKind::Coin));
    }

    #[test]
    fn test_accelerate_all_keeps_stationary_axes() {
        let registry = VelocityRegistry::new();
        registry.configure_defaults();
        registry.accelerate_all(-0.005, 0.005);

        let ship = registry.get(EntityKind::Ship).unwrap();
        assert_eq!(ship.x, 0.0);
        assert!((ship.y - (SHIP_SPEED_Y + 0.005)).abs() < 1e-12);

        let coin = registry.get(EntityKind::Coin).unwrap();
        assert!((coin.x - (-COIN_SPEED_X - 0.005)).abs() < 1e-12);
        assert_eq!(coin.y, 0.0);
    }

    #[test]
    fn test_targeted_acceleration() {
        let registry = VelocityRegistry::new();
        registry.set(EntityKind::Asteroid, -1.0, 0.0).unwrap();
        registry.accelerate(EntityKind::Asteroid, -0.5, 0.25);
        assert_eq!(registry.get(EntityKind::Asteroid).unwrap(), DVec2::new(-1.5, 0.25));
        registry.accelerate_x(EntityKind::Asteroid, 0.5);
        registry.accelerate_y(EntityKind::Asteroid, -0.25);
        assert_eq!(registry.get(EntityKind::Asteroid).unwrap(), DVec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_targeted_acceleration_ignores_unregistered() {
        let registry = VelocityRegistry::new();
        registry.accelerate(EntityKind::Ufo, 1.0, 1.0);
        registry.accelerate_x(EntityKind::Ufo, 1.0);
        assert!(!registry.is_configured(EntityKind::Ufo));
    }

    #[test]
    fn test_concurrent_ramp_is_atomic() {
        let registry = Arc::new(VelocityRegistry::new());
        registry.set(EntityKind::Asteroid, -1.0, 1.0).unwrap();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..250 {
                        registry.accelerate_all(-0.001, 0.001);
                        let _ = registry.get(EntityKind::Asteroid);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let v = registry.get(EntityKind::Asteroid).unwrap();
        assert!((v.x - -2.0).abs() < 1e-9);
        assert!((v.y - 2.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_accelerate_all_never_moves_zero_components(
            vx in prop_oneof![Just(0.0), -2.0f64..2.0],
            vy in prop_oneof![Just(0.0), -2.0f64..2.0],
            dvx in -1.0f64..1.0,
            dvy in -1.0f64..1.0,
        ) {
            let registry = VelocityRegistry::new();
            registry.set(EntityKind::Asteroid, vx, vy).unwrap();
            registry.accelerate_all(dvx, dvy);
            let v = registry.get(EntityKind::Asteroid).unwrap();
            if vx == 0.0 {
                prop_assert_eq!(v.x, 0.0);
            } else {
                prop_assert_eq!(v.x, vx + dvx);
            }
            if vy == 0.0 {
                prop_assert_eq!(v.y, 0.0);
            } else {
                prop_assert_eq!(v.y, vy + dvy);
            }
        }
    }
}
