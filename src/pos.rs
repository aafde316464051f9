use std::{
    cmp::Ordering,
    ops::{Add, Sub},
};

/// A grid or display-space coordinate
///
/// Grid coordinates are always non-negative once validated by a
/// [`Topology`](crate::engine::Topology), but pixel coordinates coming from
/// pointer input may be anywhere, so the components stay signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pos2 {
    pub x: i32,
    pub y: i32,
}

impl Pos2 {
    /// Offsets of the Moore neighborhood, in the order neighbor lists are built
    pub const NEIGHBOR_OFFSETS: [Pos2; 8] = [
        Pos2::new(-1, -1),
        Pos2::new(-1, 0),
        Pos2::new(-1, 1),
        Pos2::new(0, -1),
        Pos2::new(0, 1),
        Pos2::new(1, -1),
        Pos2::new(1, 0),
        Pos2::new(1, 1),
    ];

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether this position lies in `[0, width) x [0, height)`
    #[inline]
    pub fn within(self, width: i32, height: i32) -> bool {
        (0..width).contains(&self.x) && (0..height).contains(&self.y)
    }

    /// The eight surrounding positions, unfiltered
    #[inline]
    pub fn around(self) -> impl Iterator<Item = Pos2> {
        Self::NEIGHBOR_OFFSETS.into_iter().map(move |offset| self + offset)
    }

    /// Multiplies both components, saturating instead of overflowing
    #[inline]
    pub fn scale(self, factor: i32) -> Self {
        Self {
            x: self.x.saturating_mul(factor),
            y: self.y.saturating_mul(factor),
        }
    }
}

impl PartialOrd for Pos2 {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Pos2 {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        // row-major: rows first, then columns within a row
        Ord::cmp(&self.y, &other.y).then(Ord::cmp(&self.x, &other.x))
    }
}
impl Add for Pos2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}
impl Sub for Pos2 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_row_major() {
        let mut positions = vec![Pos2::new(2, 1), Pos2::new(0, 2), Pos2::new(1, 1), Pos2::new(5, 0)];
        positions.sort();

        assert_eq!(
            positions,
            vec![Pos2::new(5, 0), Pos2::new(1, 1), Pos2::new(2, 1), Pos2::new(0, 2)]
        );
    }

    #[test]
    fn around_excludes_center() {
        let center = Pos2::new(4, 4);
        let around: Vec<_> = center.around().collect();

        assert_eq!(around.len(), 8);
        assert!(!around.contains(&center));
        assert!(around.iter().all(|p| (p.x - 4).abs() <= 1 && (p.y - 4).abs() <= 1));
    }

    #[test]
    fn within_is_half_open() {
        assert!(Pos2::new(0, 0).within(3, 2));
        assert!(Pos2::new(2, 1).within(3, 2));
        assert!(!Pos2::new(3, 1).within(3, 2));
        assert!(!Pos2::new(0, 2).within(3, 2));
        assert!(!Pos2::new(-1, 0).within(3, 2));
    }
}
