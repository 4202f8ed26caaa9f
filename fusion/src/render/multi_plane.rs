//! Per-pixel iteration over several planes placed at integer offsets.

use glam::IVec2;
use rayon::prelude::*;

use crate::geometry::Size;
use crate::plane::{Plane, color};

/// Samples of every source plane at one output pixel.
#[derive(Debug, Default)]
pub struct PixelStack {
    values: Vec<Option<f32>>,
}

impl PixelStack {
    /// Number of source planes, covering this pixel or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether source `index` covers this pixel.
    #[inline]
    pub fn valid(&self, index: usize) -> bool {
        self.values[index].is_some()
    }

    /// Sample of source `index`, black where it does not cover the pixel.
    #[inline]
    pub fn value(&self, index: usize) -> f32 {
        self.values[index].unwrap_or(color::BLACK)
    }

    /// Samples of the covering sources, in source order.
    pub fn valid_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().flatten().copied()
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// Output of [`MultiPlaneIterator::reduce`].
#[derive(Debug, Clone)]
pub struct Reduced {
    pub plane: Plane,
    /// White where the reducer produced a value, black elsewhere.
    pub coverage: Plane,
}

/// Walks an output rectangle and hands every pixel's [`PixelStack`] to a
/// reducer. Source planes sit at integer offsets in the same coordinate
/// frame as the output origin.
#[derive(Debug)]
pub struct MultiPlaneIterator<'a> {
    origin: IVec2,
    size: Size,
    sources: Vec<(&'a Plane, IVec2)>,
}

impl<'a> MultiPlaneIterator<'a> {
    pub fn new(origin: IVec2, size: Size) -> Self {
        Self {
            origin,
            size,
            sources: Vec::new(),
        }
    }

    pub fn add(&mut self, plane: &'a Plane, offset: IVec2) {
        self.sources.push((plane, offset));
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Fills an output plane with `reducer` applied to every pixel. A `None`
    /// from the reducer leaves the pixel black and uncovered.
    pub fn reduce<F>(&self, reducer: F) -> Reduced
    where
        F: Fn(&PixelStack) -> Option<f32> + Sync,
    {
        let mut plane = Plane::new(self.size);
        let mut coverage = Plane::new(self.size);
        if plane.is_empty() {
            return Reduced { plane, coverage };
        }

        let width = self.size.width;
        plane
            .pixels_mut()
            .par_chunks_mut(width)
            .zip(coverage.pixels_mut().par_chunks_mut(width))
            .enumerate()
            .for_each(|(y, (out, covered))| {
                let mut stack = PixelStack {
                    values: vec![None; self.sources.len()],
                };
                let gy = self.origin.y as isize + y as isize;
                for (x, (out, covered)) in out.iter_mut().zip(covered.iter_mut()).enumerate() {
                    let gx = self.origin.x as isize + x as isize;
                    for (slot, (source, offset)) in stack.values.iter_mut().zip(&self.sources) {
                        *slot = source.sample(gx - offset.x as isize, gy - offset.y as isize);
                    }
                    if let Some(value) = reducer(&stack) {
                        *out = value;
                        *covered = color::WHITE;
                    }
                }
            });

        Reduced { plane, coverage }
    }
}
