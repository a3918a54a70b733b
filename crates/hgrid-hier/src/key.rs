use std::fmt;

use hgrid_core::Point;

/// Canonical key of a cached distance: an unordered vertex pair plus level.
///
/// The smaller vertex (row-major order) is always stored first, so both
/// orderings of a pair map to the same key and a lookup needs one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    a: Point,
    b: Point,
    level: u32,
}

impl PairKey {
    pub fn new(u: Point, v: Point, level: u32) -> Self {
        let (a, b) = if u <= v { (u, v) } else { (v, u) };
        Self { a, b, level }
    }

    #[inline]
    pub fn first(&self) -> Point {
        self.a
    }

    #[inline]
    pub fn second(&self) -> Point {
        self.b
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Flat encoding used as the durable table key.
    pub(crate) fn to_tuple(self) -> (i32, i32, i32, i32, u32) {
        (self.a.x, self.a.y, self.b.x, self.b.y, self.level)
    }

    pub(crate) fn from_tuple((ax, ay, bx, by, level): (i32, i32, i32, i32, u32)) -> Self {
        Self::new(Point::new(ax, ay), Point::new(bx, by), level)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}@{}", self.a, self.b, self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orderings_share_a_key() {
        let p = Point::new(5, 1);
        let q = Point::new(0, 3);
        assert_eq!(PairKey::new(p, q, 2), PairKey::new(q, p, 2));
        assert_eq!(PairKey::new(q, p, 2).first(), p);
        assert_ne!(PairKey::new(p, q, 2), PairKey::new(p, q, 3));
    }

    #[test]
    fn test_tuple_encoding() {
        let k = PairKey::new(Point::new(4, 4), Point::new(1, 2), 7);
        assert_eq!(k.to_tuple(), (1, 2, 4, 4, 7));
        assert_eq!(PairKey::from_tuple(k.to_tuple()), k);
    }
}
