//! Visual metadata contract
//!
//! The rendering side knows how large each sprite is. The simulation only
//! needs the rectangle size in scroll-space units.

use std::collections::HashMap;

use glam::DVec2;

use crate::error::SimError;
use crate::sim::EntityKind;

/// Supplies rectangle dimensions `(width, height)` per entity kind
pub trait VisualMetadata: Send + Sync {
    /// Fails with `NotConfigured` when no visual was loaded for `kind`
    fn dimensions(&self, kind: EntityKind) -> Result<DVec2, SimError>;
}

/// Fixed dimension table, used by tests and the headless driver
#[derive(Debug, Clone, Default)]
pub struct DimensionTable {
    sizes: HashMap<EntityKind, DVec2>,
}

impl DimensionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative sprite sizes of the stock asset set
    pub fn standard() -> Self {
        let mut table = Self::new();
        table
            .set(EntityKind::Background, 1.0, 1.0)
            .set(EntityKind::Ship, 0.1, 0.08)
            .set(EntityKind::Asteroid, 0.08, 0.1)
            .set(EntityKind::Ufo, 0.1, 0.06)
            .set(EntityKind::Coin, 0.04, 0.05)
            .set(EntityKind::ShieldPowerUp, 0.05, 0.06)
            .set(EntityKind::DoubleCoinsPowerUp, 0.05, 0.06);
        table
    }

    pub fn set(&mut self, kind: EntityKind, width: f64, height: f64) -> &mut Self {
        self.sizes.insert(kind, DVec2::new(width, height));
        self
    }

    pub fn remove(&mut self, kind: EntityKind) -> &mut Self {
        self.sizes.remove(&kind);
        self
    }
}

impl VisualMetadata for DimensionTable {
    fn dimensions(&self, kind: EntityKind) -> Result<DVec2, SimError> {
        self.sizes
            .get(&kind)
            .copied()
            .ok_or(SimError::NotConfigured {
                what: "visual",
                kind,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_covers_every_kind() {
        let table = DimensionTable::standard();
        for kind in EntityKind::ALL {
            let size = table.dimensions(kind).unwrap();
            assert!(size.x > 0.0 && size.y > 0.0, "{kind:?}");
        }
    }

    #[test]
    fn test_missing_kind_is_not_configured() {
        let mut table = DimensionTable::standard();
        table.remove(EntityKind::Coin);
        assert!(matches!(
            table.dimensions(EntityKind::Coin),
            Err(SimError::NotConfigured { what: "visual", .. })
        ));
    }
}
