//! Per-pixel reductions over a [`PixelStack`].

use super::multi_plane::PixelStack;
use crate::plane::color;

/// Exponent applied to the mean absolute deviation so that small
/// misalignments remain visible.
pub const DIFFERENCE_GAMMA: f64 = 0.3;

/// Reduces the samples covering one output pixel to a single value.
/// `None` marks a pixel no source covers.
pub trait PixelFilter: Sync {
    fn reduce(&self, stack: &PixelStack) -> Option<f32>;
}

impl<F> PixelFilter for F
where
    F: Fn(&PixelStack) -> Option<f32> + Sync,
{
    fn reduce(&self, stack: &PixelStack) -> Option<f32> {
        self(stack)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AverageFilter;

impl PixelFilter for AverageFilter {
    fn reduce(&self, stack: &PixelStack) -> Option<f32> {
        mean(stack).map(color::truncate)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DifferenceFilter;

impl PixelFilter for DifferenceFilter {
    fn reduce(&self, stack: &PixelStack) -> Option<f32> {
        let avg = mean(stack)?;
        let count = stack.valid_count() as f64;
        let deviation: f64 = stack
            .valid_values()
            .map(|v| (avg - v as f64).abs())
            .sum::<f64>()
            / count;
        Some(color::truncate(deviation.powf(DIFFERENCE_GAMMA)))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DarkSelectFilter;

impl PixelFilter for DarkSelectFilter {
    fn reduce(&self, stack: &PixelStack) -> Option<f32> {
        stack.valid_values().reduce(f32::min)
    }
}

fn mean(stack: &PixelStack) -> Option<f64> {
    let (sum, count) = stack
        .valid_values()
        .fold((0.0f64, 0usize), |(sum, count), v| (sum + v as f64, count + 1));
    (count > 0).then(|| sum / count as f64)
}
