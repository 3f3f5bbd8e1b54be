//! Hand-authored spawn bundles ("presets")
//!
//! Each preset places obstacles, coins and power-ups at fixed offsets from
//! the spawn line and says how much scroll distance must pass before the
//! next one may appear.

use glam::DVec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{Entity, PowerUpKind};
use crate::consts::SPAWN_LINE_X;

/// One piece of a preset layout
#[derive(Debug, Clone, Copy, PartialEq)]
enum Piece {
    Asteroid,
    Ufo { wave_offset: f64 },
    Coin,
    PowerUp(PowerUpKind),
}

struct Template {
    name: &'static str,
    pieces: &'static [(Piece, f64, f64)],
    /// Scroll distance before the next preset is due
    spacing: f64,
}

const CATALOGUE: &[Template] = &[
    Template {
        name: "coin_line",
        pieces: &[
            (Piece::Coin, 0.00, 0.30),
            (Piece::Coin, 0.06, 0.30),
            (Piece::Coin, 0.12, 0.30),
            (Piece::Coin, 0.18, 0.30),
            (Piece::Coin, 0.24, 0.30),
        ],
        spacing: 0.5,
    },
    Template {
        name: "asteroid_pair",
        pieces: &[(Piece::Asteroid, 0.00, 0.10), (Piece::Asteroid, 0.30, 0.60)],
        spacing: 0.6,
    },
    Template {
        name: "asteroid_wall",
        pieces: &[
            (Piece::Asteroid, 0.00, 0.00),
            (Piece::Asteroid, 0.00, 0.12),
            (Piece::Asteroid, 0.00, 0.24),
            (Piece::Coin, 0.02, 0.42),
            (Piece::Asteroid, 0.00, 0.64),
            (Piece::Asteroid, 0.00, 0.76),
            (Piece::Asteroid, 0.00, 0.88),
        ],
        spacing: 0.4,
    },
    Template {
        name: "ufo",
        pieces: &[(Piece::Ufo { wave_offset: 0.0 }, 0.00, 0.0)],
        spacing: 0.8,
    },
    Template {
        name: "ufo_pair",
        pieces: &[
            (Piece::Ufo { wave_offset: 0.0 }, 0.00, 0.0),
            (Piece::Ufo { wave_offset: 0.5 }, 0.35, 0.0),
        ],
        spacing: 0.9,
    },
    Template {
        name: "coin_arc",
        pieces: &[
            (Piece::Coin, 0.00, 0.60),
            (Piece::Coin, 0.06, 0.50),
            (Piece::Coin, 0.12, 0.45),
            (Piece::Coin, 0.18, 0.50),
            (Piece::Coin, 0.24, 0.60),
        ],
        spacing: 0.6,
    },
    Template {
        name: "guarded_shield",
        pieces: &[
            (Piece::Asteroid, 0.00, 0.25),
            (Piece::PowerUp(PowerUpKind::Shield), 0.12, 0.45),
            (Piece::Asteroid, 0.00, 0.65),
        ],
        spacing: 0.7,
    },
    Template {
        name: "coin_diagonal",
        pieces: &[
            (Piece::Coin, 0.00, 0.15),
            (Piece::Coin, 0.07, 0.25),
            (Piece::Coin, 0.14, 0.35),
            (Piece::Asteroid, 0.25, 0.70),
            (Piece::PowerUp(PowerUpKind::DoubleCoins), 0.21, 0.45),
        ],
        spacing: 0.7,
    },
];

/// A spawned bundle ready to be merged into the live collection
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub entities: Vec<Entity>,
    /// Scroll distance that must elapse before the next preset
    pub distance_until_next: f64,
}

/// Draws presets uniformly from the catalogue
#[derive(Debug, Clone)]
pub struct PresetGenerator {
    rng: Pcg32,
    double_coin_duration: bool,
}

impl PresetGenerator {
    pub fn new(rng: Pcg32, double_coin_duration: bool) -> Self {
        Self {
            rng,
            double_coin_duration,
        }
    }

    pub fn catalogue_len() -> usize {
        CATALOGUE.len()
    }

    pub fn next(&mut self) -> Preset {
        let index = self.rng.random_range(0..CATALOGUE.len());
        self.build(index)
    }

    fn build(&self, index: usize) -> Preset {
        let template = &CATALOGUE[index];
        let origin = DVec2::new(SPAWN_LINE_X, 0.0);
        let entities = template
            .pieces
            .iter()
            .map(|&(piece, dx, dy)| {
                let entity = match piece {
                    Piece::Asteroid => Entity::asteroid(DVec2::ZERO),
                    Piece::Ufo { wave_offset } => Entity::ufo(DVec2::ZERO, wave_offset),
                    Piece::Coin => Entity::coin(DVec2::ZERO),
                    Piece::PowerUp(kind) => {
                        Entity::power_up(kind, DVec2::ZERO, self.double_coin_duration)
                    }
                };
                entity.translated(origin + DVec2::new(dx, dy))
            })
            .collect();
        Preset {
            name: template.name,
            entities,
            distance_until_next: template.spacing,
        }
    }
}

/// Decides when the next preset is due
///
/// The counter drops by scroll distance every frame; a preset is drawn only
/// once it falls below `-buffer`, then resets to the new preset's spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetSpacing {
    remaining: f64,
    buffer: f64,
}

impl PresetSpacing {
    pub fn new(initial: f64, buffer: f64) -> Self {
        Self {
            remaining: initial,
            buffer,
        }
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn is_due(&self) -> bool {
        self.remaining < -self.buffer
    }

    pub fn reset(&mut self, distance: f64) {
        self.remaining = distance;
    }

    pub fn advance(&mut self, elapsed_ms: u64) {
        self.remaining -= elapsed_ms as f64 / 1000.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Category;
    use rand::SeedableRng;

    #[test]
    fn test_every_template_spawns_off_screen() {
        let generator = PresetGenerator::new(Pcg32::seed_from_u64(0), false);
        for index in 0..PresetGenerator::catalogue_len() {
            let preset = generator.build(index);
            assert!(!preset.entities.is_empty(), "{}", preset.name);
            assert!(preset.distance_until_next > 0.0);
            for entity in &preset.entities {
                assert!(entity.pos().x >= SPAWN_LINE_X, "{}", preset.name);
                assert_ne!(entity.category(), Category::Scenery);
            }
        }
    }

    #[test]
    fn test_next_draws_from_catalogue() {
        let mut generator = PresetGenerator::new(Pcg32::seed_from_u64(42), false);
        for _ in 0..20 {
            let preset = generator.next();
            assert!(CATALOGUE.iter().any(|t| t.name == preset.name));
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = PresetGenerator::new(Pcg32::seed_from_u64(9), false);
        let mut b = PresetGenerator::new(Pcg32::seed_from_u64(9), false);
        for _ in 0..10 {
            assert_eq!(a.next().name, b.next().name);
        }
    }

    #[test]
    fn test_spacing_waits_for_buffer() {
        let mut spacing = PresetSpacing::new(0.1, 0.45);
        assert!(!spacing.is_due());
        spacing.advance(500);
        assert!(!spacing.is_due());
        spacing.advance(40);
        assert!(!spacing.is_due());
        spacing.advance(20);
        assert!(spacing.is_due());
        spacing.reset(0.6);
        assert!(!spacing.is_due());
        assert_eq!(spacing.remaining(), 0.6);
    }
}
