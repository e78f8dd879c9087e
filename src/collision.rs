use bevy::math::Vec2;

use crate::entities::SPRITE_SIZE;

/// Axis-aligned box anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hitbox {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Hitbox {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    pub fn sprite(top_left: Vec2) -> Self {
        Self::new(top_left, Vec2::splat(SPRITE_SIZE))
    }

    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    /// Max edges are exclusive, so boxes that only share an edge don't hit.
    pub fn intersects(&self, other: &Hitbox) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.origin.x < b_max.x
            && other.origin.x < a_max.x
            && self.origin.y < b_max.y
            && other.origin.y < a_max.y
    }
}
