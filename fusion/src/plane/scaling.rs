//! Separable resampling of planes.

use rayon::prelude::*;
use strum_macros::Display;

use super::{color, Plane};
use crate::geometry::Size;

/// Rows per parallel chunk when resampling.
const ROWS_PER_CHUNK: usize = 16;

/// Reconstruction kernel used when a plane is resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ScalingFunction {
    /// Box filter, picks the closest source sample.
    Nearest,
    /// Tent filter.
    Linear,
    /// Catmull-Rom cubic convolution.
    #[default]
    Cubic,
    /// Cubic B-spline (`b = 1, c = 0`), smooth and never negative.
    Spline,
}

impl ScalingFunction {
    /// Kernel support radius in source pixels at 1:1 scale.
    #[inline]
    pub fn radius(self) -> f64 {
        match self {
            ScalingFunction::Nearest => 0.5,
            ScalingFunction::Linear => 1.0,
            ScalingFunction::Cubic | ScalingFunction::Spline => 2.0,
        }
    }

    #[inline]
    pub fn weight(self, x: f64) -> f64 {
        match self {
            ScalingFunction::Nearest => {
                if (-0.5..0.5).contains(&x) {
                    1.0
                } else {
                    0.0
                }
            }
            ScalingFunction::Linear => (1.0 - x.abs()).max(0.0),
            ScalingFunction::Cubic => catmull_rom(x),
            ScalingFunction::Spline => spline(x),
        }
    }
}

/// Mitchell-Netravali cubic with parameters `b` and `c`.
///
/// Piecewise cubic on `|x| < 1` and `1 <= |x| < 2`, zero beyond.
pub fn cubic(b: f64, c: f64, x: f64) -> f64 {
    let x = x.abs();
    if x < 1.0 {
        (12.0 - 9.0 * b - 6.0 * c) / 6.0 * x * x * x
            + (-18.0 + 12.0 * b + 6.0 * c) / 6.0 * x * x
            + (6.0 - 2.0 * b) / 6.0
    } else if x < 2.0 {
        (-b - 6.0 * c) / 6.0 * x * x * x
            + (6.0 * b + 30.0 * c) / 6.0 * x * x
            + (-12.0 * b - 48.0 * c) / 6.0 * x
            + (8.0 * b + 24.0 * c) / 6.0
    } else {
        0.0
    }
}

/// Cubic B-spline, `cubic(1, 0, x)`.
#[inline]
pub fn spline(x: f64) -> f64 {
    cubic(1.0, 0.0, x)
}

/// Catmull-Rom spline (`a = -0.5`).
#[inline]
pub fn catmull_rom(x: f64) -> f64 {
    const A: f64 = -0.5;

    let abs_x = x.abs();
    if abs_x <= 1.0 {
        ((A + 2.0) * abs_x - (A + 3.0)) * abs_x * abs_x + 1.0
    } else if abs_x < 2.0 {
        ((A * abs_x - 5.0 * A) * abs_x + 8.0 * A) * abs_x - 4.0 * A
    } else {
        0.0
    }
}

/// Source taps contributing to one destination sample along one axis.
#[derive(Debug, Clone)]
struct Taps {
    start: usize,
    weights: Vec<f64>,
}

impl Taps {
    #[inline]
    fn apply(&self, mut read: impl FnMut(usize) -> f32) -> f64 {
        self.weights
            .iter()
            .enumerate()
            .map(|(i, w)| w * read(self.start + i) as f64)
            .sum()
    }
}

fn compute_taps(src: usize, dst: usize, function: ScalingFunction) -> Vec<Taps> {
    let ratio = src as f64 / dst as f64;
    // Widen the kernel when shrinking so every source sample contributes.
    let support = ratio.max(1.0);
    let radius = function.radius() * support;
    let last = src as isize - 1;

    (0..dst)
        .map(|i| {
            let center = (i as f64 + 0.5) * ratio - 0.5;
            let first = ((center - radius).ceil() as isize).clamp(0, last);
            let end = ((center + radius).floor() as isize).clamp(0, last);

            let mut weights: Vec<f64> = (first..=end)
                .map(|j| function.weight((j as f64 - center) / support))
                .collect();
            let total: f64 = weights.iter().sum();

            if total.abs() < f64::EPSILON {
                let nearest = (center.round() as isize).clamp(0, last) as usize;
                return Taps {
                    start: nearest,
                    weights: vec![1.0],
                };
            }
            weights.iter_mut().for_each(|w| *w /= total);
            Taps {
                start: first as usize,
                weights,
            }
        })
        .collect()
}

/// Resizes `plane` to `size`, horizontal pass first.
pub(super) fn resample(plane: &Plane, size: Size, function: ScalingFunction) -> Plane {
    if plane.size() == size {
        return plane.clone();
    }
    if plane.is_empty() || size.is_empty() {
        return Plane::new(size);
    }

    let columns = compute_taps(plane.width(), size.width, function);
    let mut horizontal = Plane::new(Size::new(size.width, plane.height()));
    horizontal
        .pixels_mut()
        .par_chunks_mut(size.width * ROWS_PER_CHUNK)
        .enumerate()
        .for_each(|(chunk_idx, chunk)| {
            for (row_idx, out) in chunk.chunks_mut(size.width).enumerate() {
                let src = plane.row(chunk_idx * ROWS_PER_CHUNK + row_idx);
                for (x, value) in out.iter_mut().enumerate() {
                    *value = color::truncate(columns[x].apply(|i| src[i]));
                }
            }
        });

    let rows = compute_taps(plane.height(), size.height, function);
    let mut out = Plane::new(size);
    out.pixels_mut()
        .par_chunks_mut(size.width)
        .enumerate()
        .for_each(|(y, out_row)| {
            let taps = &rows[y];
            for (x, value) in out_row.iter_mut().enumerate() {
                *value = color::truncate(taps.apply(|i| horizontal[(x, i)]));
            }
        });
    out
}
