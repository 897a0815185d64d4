use crate::math::{UVec2, Vec2};

/// An axis-aligned rectangle in texture pixel space.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct URect {
    pub min: UVec2,
    pub max: UVec2,
}

impl URect {
    pub const ZERO: URect = URect::new(UVec2::ZERO, UVec2::ZERO);

    pub const fn new(min: UVec2, max: UVec2) -> URect {
        URect { min, max }
    }

    pub fn from_pos_size(pos: UVec2, size: UVec2) -> URect {
        URect::new(pos, pos + size)
    }

    pub fn size(&self) -> UVec2 {
        self.max - self.min
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpge(self.max).any()
    }

    /// Returns `true` if `other` lies completely inside `self`.
    pub fn contains_rect(&self, other: &URect) -> bool {
        other.min.cmpge(self.min).all() && other.max.cmple(self.max).all()
    }

    pub fn intersects(&self, other: &URect) -> bool {
        self.min.cmplt(other.max).all() && other.min.cmplt(self.max).all()
    }

    /// Maps the rectangle into normalized `0..=1` coordinates of a texture
    /// with the given size.
    pub fn normalize(&self, texture_size: UVec2) -> (Vec2, Vec2) {
        let size = texture_size.as_vec2();
        (self.min.as_vec2() / size, self.max.as_vec2() / size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_is_exclusive_at_edges() {
        let a = URect::from_pos_size(UVec2::new(0, 0), UVec2::new(32, 32));
        let b = URect::from_pos_size(UVec2::new(32, 0), UVec2::new(32, 32));
        let c = URect::from_pos_size(UVec2::new(31, 31), UVec2::new(2, 2));

        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
        assert!(b.intersects(&c));
    }

    #[test]
    fn normalize_divides_by_texture_size() {
        let rect = URect::from_pos_size(UVec2::new(32, 64), UVec2::new(32, 32));
        let (min, max) = rect.normalize(UVec2::splat(1024));

        assert_eq!(min, Vec2::new(0.03125, 0.0625));
        assert_eq!(max, Vec2::new(0.0625, 0.09375));
    }
}
