//! Pixel sizes and floating-point rectangles in the shared global frame.

use glam::DVec2;

/// Pixel dimensions of a plane or image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    #[inline]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub const fn area(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn as_dvec2(self) -> DVec2 {
        DVec2::new(self.width as f64, self.height as f64)
    }

    /// Rounds a floating-point extent to whole pixels, clamping negatives to 0.
    #[inline]
    pub fn from_dvec2_round(v: DVec2) -> Self {
        let v = v.round().max(DVec2::ZERO);
        Self::new(v.x as usize, v.y as usize)
    }

    /// Rounds a floating-point extent up to whole pixels.
    #[inline]
    pub fn from_dvec2_ceil(v: DVec2) -> Self {
        let v = v.ceil().max(DVec2::ZERO);
        Self::new(v.x as usize, v.y as usize)
    }

    /// `self * factor`, rounded to whole pixels.
    #[inline]
    pub fn scaled(self, factor: DVec2) -> Self {
        Self::from_dvec2_round(self.as_dvec2() * factor)
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.width.max(other.width), self.height.max(other.height))
    }

    #[inline]
    pub fn as_tuple(self) -> (usize, usize) {
        (self.width, self.height)
    }
}

impl From<(usize, usize)> for Size {
    #[inline]
    fn from((width, height): (usize, usize)) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle with a floating-point origin and extent.
///
/// The rectangle covers `[pos, pos + size)` on both axes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub pos: DVec2,
    pub size: DVec2,
}

impl Rect {
    #[inline]
    pub const fn new(pos: DVec2, size: DVec2) -> Self {
        Self { pos, size }
    }

    pub fn from_min_max(min: DVec2, max: DVec2) -> Self {
        Self {
            pos: min,
            size: (max - min).max(DVec2::ZERO),
        }
    }

    #[inline]
    pub fn min(&self) -> DVec2 {
        self.pos
    }

    #[inline]
    pub fn max(&self) -> DVec2 {
        self.pos + self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// True if the two rectangles share a region of non-zero area.
    pub fn intersects(&self, other: &Rect) -> bool {
        let min = self.min().max(other.min());
        let max = self.max().min(other.max());
        min.x < max.x && min.y < max.y
    }

    /// Overlapping region, or `None` if the rectangles only touch or are apart.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect::from_min_max(
            self.min().max(other.min()),
            self.max().min(other.max()),
        ))
    }

    #[inline]
    pub fn contains(&self, point: DVec2) -> bool {
        let max = self.max();
        point.x >= self.pos.x && point.y >= self.pos.y && point.x < max.x && point.y < max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_scaled_rounds() {
        let size = Size::new(5, 3);
        assert_eq!(size.scaled(DVec2::new(0.5, 0.5)), Size::new(3, 2));
        assert_eq!(size.scaled(DVec2::ONE), size);
    }

    #[test]
    fn test_size_from_negative_clamps_to_zero() {
        assert_eq!(Size::from_dvec2_round(DVec2::new(-3.0, 2.2)), Size::new(0, 2));
        assert!(Size::new(0, 4).is_empty());
    }

    #[test]
    fn test_size_ceil() {
        assert_eq!(Size::from_dvec2_ceil(DVec2::new(2.1, 3.0)), Size::new(3, 3));
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(DVec2::ZERO, DVec2::new(4.0, 4.0));
        let b = Rect::new(DVec2::new(2.0, 1.0), DVec2::new(4.0, 2.0));
        let i = a.intersection(&b).unwrap();
        assert_eq!(i.pos, DVec2::new(2.0, 1.0));
        assert_eq!(i.size, DVec2::new(2.0, 2.0));
    }

    #[test]
    fn test_touching_rects_do_not_intersect() {
        let a = Rect::new(DVec2::ZERO, DVec2::new(2.0, 2.0));
        let b = Rect::new(DVec2::new(2.0, 0.0), DVec2::new(2.0, 2.0));
        assert!(!a.intersects(&b));
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let r = Rect::new(DVec2::new(1.0, 1.0), DVec2::new(2.0, 2.0));
        assert!(r.contains(DVec2::new(1.0, 1.0)));
        assert!(r.contains(DVec2::new(2.9, 2.9)));
        assert!(!r.contains(DVec2::new(3.0, 2.0)));
    }
}
