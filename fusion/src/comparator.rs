//! Offset measurement between two planes.
//!
//! The similarity search itself lives outside this crate; the aligner and the
//! containers only see the [`Comparator`] trait.

use glam::DVec2;

use crate::plane::Plane;

/// Result of comparing two images: where the second one sits relative to
/// the first, and how well they matched there.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImageOffset {
    /// Displacement of the second image relative to the first.
    pub distance: DVec2,
    /// Comparator-specific mismatch score, lower is better.
    pub error: f64,
}

impl ImageOffset {
    #[inline]
    pub fn new(distance: DVec2, error: f64) -> Self {
        Self { distance, error }
    }

    /// Offset of the first image relative to the second.
    #[inline]
    pub fn reversed(self) -> Self {
        Self {
            distance: -self.distance,
            error: self.error,
        }
    }
}

/// Measures the offset between two planes.
///
/// Implementations must be deterministic for identical inputs. `None` alpha
/// means fully opaque.
pub trait Comparator {
    fn find_offset(
        &self,
        first: &Plane,
        second: &Plane,
        first_alpha: Option<&Plane>,
        second_alpha: Option<&Plane>,
    ) -> ImageOffset;
}

impl<C: Comparator + ?Sized> Comparator for &C {
    fn find_offset(
        &self,
        first: &Plane,
        second: &Plane,
        first_alpha: Option<&Plane>,
        second_alpha: Option<&Plane>,
    ) -> ImageOffset {
        (**self).find_offset(first, second, first_alpha, second_alpha)
    }
}
