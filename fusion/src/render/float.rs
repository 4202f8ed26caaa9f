//! Sub-pixel point renderer.
//!
//! Every output pixel is reconstructed directly from the source pixels of
//! all images that fall within a small window around it, so the output can
//! be rendered at any magnification. The window traversal is shared; how
//! the gathered samples are combined is a [`PointReducer`].

use std::time::Instant;

use glam::DVec2;
use rayon::prelude::*;

use super::config::{FloatRenderConfig, PointPolicy};
use crate::container::Container;
use crate::error::{Error, Result};
use crate::geometry::{Rect, Size};
use crate::image::ImageEx;
use crate::plane::{Plane, color, spline};
use crate::progress::Progress;

/// Half-width of the gather window, in source pixels. Matches the support
/// of [`spline`].
pub const SUPPORT_RADIUS: f64 = 2.0;

/// Samples the weighted policy keeps per output pixel.
pub const MAX_WEIGHTED_POINTS: usize = 16;

/// A source pixel near an output pixel. `distance` is measured in source
/// pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub distance: f64,
    pub value: f32,
}

/// Reduction policy for the samples gathered around one output pixel.
pub trait PointReducer: Default {
    /// Forgets all samples, ready for the next output pixel.
    fn reset(&mut self);
    fn add_sample(&mut self, sample: Sample);
    fn value(&mut self) -> f32;
}

/// Spline-weighted mean of the nearest [`MAX_WEIGHTED_POINTS`] samples.
#[derive(Debug, Default)]
pub struct WeightedPoints {
    points: Vec<Sample>,
}

impl PointReducer for WeightedPoints {
    fn reset(&mut self) {
        self.points.clear();
    }

    fn add_sample(&mut self, sample: Sample) {
        self.points.push(sample);
    }

    fn value(&mut self) -> f32 {
        self.points.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        let (sum, weight) = self
            .points
            .iter()
            .take(MAX_WEIGHTED_POINTS)
            .fold((0.0, 0.0), |(sum, weight), p| {
                let w = spline(p.distance);
                (sum + p.value as f64 * w, weight + w)
            });
        if weight != 0.0 {
            color::truncate(sum / weight)
        } else {
            color::BLACK
        }
    }
}

/// Spline-weighted mean of every sample, without storing them.
#[derive(Debug, Default)]
pub struct StreamingPoints {
    sum: f64,
    weight: f64,
}

impl PointReducer for StreamingPoints {
    fn reset(&mut self) {
        self.sum = 0.0;
        self.weight = 0.0;
    }

    fn add_sample(&mut self, sample: Sample) {
        let w = spline(sample.distance);
        self.sum += sample.value as f64 * w;
        self.weight += w;
    }

    fn value(&mut self) -> f32 {
        if self.weight != 0.0 {
            color::truncate(self.sum / self.weight)
        } else {
            color::BLACK
        }
    }
}

/// Value of the closest sample; equal distances prefer the lower value.
#[derive(Debug)]
pub struct NearestPoint {
    best: Sample,
}

impl NearestPoint {
    const NONE: Sample = Sample {
        distance: 99999.0,
        value: color::BLACK,
    };
}

impl Default for NearestPoint {
    fn default() -> Self {
        Self { best: Self::NONE }
    }
}

impl PointReducer for NearestPoint {
    fn reset(&mut self) {
        self.best = Self::NONE;
    }

    fn add_sample(&mut self, sample: Sample) {
        let closer = sample.distance < self.best.distance
            || (sample.distance == self.best.distance && sample.value < self.best.value);
        if closer {
            self.best = sample;
        }
    }

    fn value(&mut self) -> f32 {
        self.best.value
    }
}

/// Feeds `reducer` every pixel of `plane` inside the support window around
/// `target`. `offset` is the plane's anchor and `scale` the size of one
/// plane pixel, both in output space. Returns the number of samples added.
pub fn add_points<R: PointReducer>(
    reducer: &mut R,
    target: DVec2,
    plane: &Plane,
    offset: DVec2,
    scale: f64,
) -> usize {
    let bounds = Rect::new(offset, plane.size().as_dvec2() * scale);
    let window = Rect::new(
        target - DVec2::splat(SUPPORT_RADIUS * scale),
        DVec2::splat(2.0 * SUPPORT_RADIUS * scale),
    );
    let Some(usable) = window.intersection(&bounds) else {
        return 0;
    };

    // Both window edges are inclusive; the last pixel is `size - 1`.
    let start = ((usable.min() - offset) / scale).ceil().max(DVec2::ZERO);
    let last = plane.size().as_dvec2() - DVec2::ONE;
    let end = ((usable.max() - offset) / scale).floor().min(last);
    if end.x < start.x || end.y < start.y {
        return 0;
    }

    let mut added = 0;
    for iy in start.y as usize..=end.y as usize {
        for ix in start.x as usize..=end.x as usize {
            let pixel = DVec2::new(ix as f64, iy as f64);
            let distance = (pixel * scale + offset - target) / scale;
            reducer.add_sample(Sample {
                distance: distance.length(),
                value: plane[(ix, iy)],
            });
            added += 1;
        }
    }
    added
}

/// Renders a container at an arbitrary magnification by point sampling.
#[derive(Debug, Clone, Default)]
pub struct FloatRender {
    config: FloatRenderConfig,
}

impl FloatRender {
    pub fn new(config: FloatRenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FloatRenderConfig {
        &self.config
    }

    /// Renders every channel of the first `max_count` images at
    /// `ceil(size * scale)`. The alpha plane marks output pixels that
    /// received at least one sample.
    pub fn render(&self, container: &dyn Container, progress: Progress) -> Result<ImageEx> {
        let count = super::image_limit(container, self.config.max_count);
        if count == 0 {
            return Err(Error::NoImages {
                operation: "render",
            });
        }

        let start = Instant::now();
        let scale = self.config.scale;
        let full = container.size();
        let out_size = Size::from_dvec2_ceil(full.size * scale);
        let origin = full.pos * scale;
        let first = container.image(0);
        let planes_amount = first.plane_count();

        tracing::debug!(
            count,
            scale,
            policy = %self.config.policy,
            width = out_size.width,
            height = out_size.height,
            "Float render"
        );
        progress.set_total(planes_amount);

        let mut image = ImageEx::new(first.system());
        for channel in 0..planes_amount {
            let sources: Vec<(&Plane, DVec2, f64)> = (0..count)
                .filter_map(|j| {
                    let image = container.image(j);
                    let plane = image.plane(channel)?;
                    let reference = image.plane(0)?;
                    let plane_scale = reference.width() as f64 / plane.width() as f64 * scale;
                    Some((plane, container.pos(j) * scale, plane_scale))
                })
                .collect();

            let (plane, coverage) = match self.config.policy {
                PointPolicy::Weighted => {
                    render_channel::<WeightedPoints>(&sources, origin, out_size)
                }
                PointPolicy::Streaming => {
                    render_channel::<StreamingPoints>(&sources, origin, out_size)
                }
                PointPolicy::Nearest => render_channel::<NearestPoint>(&sources, origin, out_size),
            };

            image.push_plane(plane);
            if channel == 0 {
                image.set_alpha_plane(Some(coverage));
            }
            progress.add(1);
        }

        tracing::debug!(elapsed = ?start.elapsed(), "Float render done");
        Ok(image)
    }
}

fn render_channel<R: PointReducer>(
    sources: &[(&Plane, DVec2, f64)],
    origin: DVec2,
    size: Size,
) -> (Plane, Plane) {
    let mut plane = Plane::new(size);
    let mut coverage = Plane::new(size);
    if plane.is_empty() {
        return (plane, coverage);
    }

    let width = size.width;
    plane
        .pixels_mut()
        .par_chunks_mut(width)
        .zip(coverage.pixels_mut().par_chunks_mut(width))
        .enumerate()
        .for_each(|(y, (out, covered))| {
            let mut reducer = R::default();
            for (x, (out, covered)) in out.iter_mut().zip(covered.iter_mut()).enumerate() {
                let target = origin + DVec2::new(x as f64, y as f64);
                reducer.reset();
                let added: usize = sources
                    .iter()
                    .map(|&(source, offset, scale)| {
                        add_points(&mut reducer, target, source, offset, scale)
                    })
                    .sum();
                *out = reducer.value();
                if added > 0 {
                    *covered = color::WHITE;
                }
            }
        });

    (plane, coverage)
}
