//! Single-channel sample buffers.
//!
//! Samples are normalized `f32` values where [`color::BLACK`] is `0.0` and
//! [`color::WHITE`] is `1.0`. A zero-area plane is the "empty" value used
//! wherever an image has been reduced to nothing usable.

mod scaling;

#[cfg(test)]
mod tests;

use std::ops::{Index, IndexMut};

use common::Buffer2;
use glam::DVec2;

use crate::geometry::Size;

pub use scaling::{ScalingFunction, catmull_rom, cubic, spline};

/// Reference sample values.
pub mod color {
    pub const BLACK: f32 = 0.0;
    pub const WHITE: f32 = 1.0;

    /// Clamps an accumulated value into the valid sample range.
    #[inline]
    pub fn truncate(value: f64) -> f32 {
        value.clamp(BLACK as f64, WHITE as f64) as f32
    }

    /// Alpha sample as a weight in `[0, 1]`.
    #[inline]
    pub fn as_weight(value: f32) -> f64 {
        (value / WHITE) as f64
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plane {
    data: Buffer2<f32>,
}

impl Plane {
    /// Black plane of the given size.
    pub fn new(size: Size) -> Self {
        Self::filled(size, color::BLACK)
    }

    pub fn filled(size: Size, value: f32) -> Self {
        Self {
            data: Buffer2::new_filled(size.width, size.height, value),
        }
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<f32>) -> Self {
        Self {
            data: Buffer2::new(width, height, pixels),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.data.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.data.height()
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// True for the zero-area placeholder.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    #[inline]
    pub fn pixels(&self) -> &[f32] {
        self.data.pixels()
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [f32] {
        self.data.pixels_mut()
    }

    #[inline]
    pub fn buffer(&self) -> &Buffer2<f32> {
        &self.data
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[f32] {
        self.data.row(y)
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [f32] {
        self.data.row_mut(y)
    }

    #[inline]
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Sample at `(x, y)` or `None` when outside the plane.
    #[inline]
    pub fn sample(&self, x: isize, y: isize) -> Option<f32> {
        if x < 0 || y < 0 || x as usize >= self.width() || y as usize >= self.height() {
            None
        } else {
            Some(self.data[(x as usize, y as usize)])
        }
    }

    /// Block of `size` starting at `offset`, clipped to the plane bounds.
    pub fn crop(&self, offset: (usize, usize), size: Size) -> Plane {
        let x = offset.0.min(self.width());
        let y = offset.1.min(self.height());
        let width = size.width.min(self.width() - x);
        let height = size.height.min(self.height() - y);
        Self {
            data: self.data.crop((x, y), (width, height)),
        }
    }

    /// Copies a block of `src` into this plane. Both regions must be in bounds.
    pub fn copy_region(
        &mut self,
        src: &Plane,
        src_pos: (usize, usize),
        size: Size,
        dst_pos: (usize, usize),
    ) {
        self.data.copy_region(&src.data, src_pos, size.as_tuple(), dst_pos);
    }

    /// Resamples to exactly `size`.
    pub fn scale(&self, size: Size, function: ScalingFunction) -> Plane {
        scaling::resample(self, size, function)
    }

    /// Resamples by `factor`, rounding the target size to whole pixels.
    pub fn scale_factor(&self, factor: DVec2, function: ScalingFunction) -> Plane {
        assert!(
            factor.x > 0.0 && factor.y > 0.0,
            "scale factor must be positive"
        );
        self.scale(self.size().scaled(factor), function)
    }
}

impl Index<(usize, usize)> for Plane {
    type Output = f32;

    #[inline]
    fn index(&self, xy: (usize, usize)) -> &Self::Output {
        &self.data[xy]
    }
}

impl IndexMut<(usize, usize)> for Plane {
    #[inline]
    fn index_mut(&mut self, xy: (usize, usize)) -> &mut Self::Output {
        &mut self.data[xy]
    }
}

impl From<Buffer2<f32>> for Plane {
    fn from(data: Buffer2<f32>) -> Self {
        Self { data }
    }
}
