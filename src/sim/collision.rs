//! Corner-containment collision test for axis-aligned rectangles
//!
//! Two entities collide when any corner of one rectangle lies strictly
//! inside the other. Edges crossing without a contained corner (a long thin
//! rectangle through a wide one) do not count; gameplay sizes are tuned
//! against exactly this test.

use glam::DVec2;

use super::entity::Entity;
use crate::visual::VisualMetadata;

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: DVec2,
    pub size: DVec2,
}

impl Rect {
    pub fn new(min: DVec2, size: DVec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn max(&self) -> DVec2 {
        self.min + self.size
    }

    pub fn corners(&self) -> [DVec2; 4] {
        let max = self.max();
        [
            self.min,
            DVec2::new(self.min.x, max.y),
            DVec2::new(max.x, self.min.y),
            max,
        ]
    }

    /// Strict containment: points on an edge are outside
    #[inline]
    pub fn contains_point(&self, p: DVec2) -> bool {
        let max = self.max();
        p.x > self.min.x && p.x < max.x && p.y > self.min.y && p.y < max.y
    }

    /// True if any corner of either rectangle is inside the other
    pub fn corner_overlap(&self, other: &Rect) -> bool {
        other.corners().iter().any(|&c| self.contains_point(c))
            || self.corners().iter().any(|&c| other.contains_point(c))
    }
}

/// Decide whether two entities overlap
///
/// Fails closed: if either kind has no dimensions the pair counts as
/// colliding and the anomaly is logged.
pub fn collides(a: &Entity, b: &Entity, visuals: &dyn VisualMetadata) -> bool {
    let sizes = visuals
        .dimensions(a.kind())
        .and_then(|size_a| Ok((size_a, visuals.dimensions(b.kind())?)));
    match sizes {
        Ok((size_a, size_b)) => {
            Rect::new(a.pos(), size_a).corner_overlap(&Rect::new(b.pos(), size_b))
        }
        Err(err) => {
            log::error!(
                "{err}; treating {:?} vs {:?} as a collision",
                a.kind(),
                b.kind()
            );
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::EntityKind;
    use crate::visual::DimensionTable;
    use proptest::prelude::*;

    fn table(ship: (f64, f64), asteroid: (f64, f64)) -> DimensionTable {
        let mut dims = DimensionTable::new();
        dims.set(EntityKind::Ship, ship.0, ship.1)
            .set(EntityKind::Asteroid, asteroid.0, asteroid.1);
        dims
    }

    #[test]
    fn test_corner_inside_detects_overlap() {
        let dims = table((0.1, 0.1), (0.1, 0.1));
        let ship = Entity::new(crate::sim::EntityVariant::Ship, DVec2::new(0.0, 0.0));
        let rock = Entity::asteroid(DVec2::new(0.05, 0.05));
        assert!(collides(&ship, &rock, &dims));
        assert!(collides(&rock, &ship, &dims));
    }

    #[test]
    fn test_separated_rectangles_miss() {
        let dims = table((0.1, 0.1), (0.1, 0.1));
        let ship = Entity::new(crate::sim::EntityVariant::Ship, DVec2::new(0.0, 0.0));
        let rock = Entity::asteroid(DVec2::new(0.5, 0.5));
        assert!(!collides(&ship, &rock, &dims));
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        let dims = table((0.1, 0.1), (0.1, 0.1));
        let ship = Entity::new(crate::sim::EntityVariant::Ship, DVec2::new(0.0, 0.0));
        let rock = Entity::asteroid(DVec2::new(0.1, 0.0));
        assert!(!collides(&ship, &rock, &dims));
    }

    #[test]
    fn test_crossing_without_contained_corner_is_missed() {
        // Wide short ship crossed by a tall thin asteroid: no corner of
        // either lies inside the other.
        let dims = table((0.4, 0.1), (0.05, 0.5));
        let ship = Entity::new(crate::sim::EntityVariant::Ship, DVec2::new(0.0, 0.2));
        let rock = Entity::asteroid(DVec2::new(0.1, 0.0));
        assert!(!collides(&ship, &rock, &dims));
    }

    #[test]
    fn test_missing_dimensions_fail_closed() {
        let mut dims = DimensionTable::new();
        dims.set(EntityKind::Ship, 0.1, 0.1);
        let ship = Entity::new(crate::sim::EntityVariant::Ship, DVec2::new(0.0, 0.0));
        let far_coin = Entity::coin(DVec2::new(5.0, 5.0));
        assert!(collides(&ship, &far_coin, &dims));
        assert!(collides(&far_coin, &ship, &dims));
    }

    #[test]
    fn test_rect_contains_point_is_strict() {
        let rect = Rect::new(DVec2::ZERO, DVec2::new(1.0, 1.0));
        assert!(rect.contains_point(DVec2::new(0.5, 0.5)));
        assert!(!rect.contains_point(DVec2::new(0.0, 0.5)));
        assert!(!rect.contains_point(DVec2::new(1.0, 1.0)));
    }

    proptest! {
        #[test]
        fn prop_collision_is_symmetric(
            ax in -1.0f64..2.0, ay in -1.0f64..2.0,
            bx in -1.0f64..2.0, by in -1.0f64..2.0,
            aw in 0.01f64..1.0, ah in 0.01f64..1.0,
            bw in 0.01f64..1.0, bh in 0.01f64..1.0,
        ) {
            let dims = table((aw, ah), (bw, bh));
            let a = Entity::new(crate::sim::EntityVariant::Ship, DVec2::new(ax, ay));
            let b = Entity::asteroid(DVec2::new(bx, by));
            prop_assert_eq!(collides(&a, &b, &dims), collides(&b, &a, &dims));
        }
    }
}
