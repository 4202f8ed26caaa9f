use std::time::Instant;

use glam::IVec2;

use super::config::{Filter, SimpleRenderConfig};
use super::filters::{AverageFilter, DarkSelectFilter, DifferenceFilter, PixelFilter};
use super::multi_plane::MultiPlaneIterator;
use crate::container::Container;
use crate::error::{Error, Result};
use crate::geometry::Size;
use crate::image::{ColorSystem, ImageEx};
use crate::plane::{Plane, ScalingFunction, color};
use crate::progress::Progress;

/// Per-pixel reduction over images placed at rounded positions.
///
/// Subsampled channels are reduced at their native resolution and upscaled
/// afterwards, unless `upscale_chroma` is set, in which case the source
/// planes are upscaled before the reduction.
#[derive(Debug, Clone, Default)]
pub struct SimpleRender {
    config: SimpleRenderConfig,
}

impl SimpleRender {
    pub fn new(config: SimpleRenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimpleRenderConfig {
        &self.config
    }

    pub fn render(&self, container: &dyn Container, progress: Progress) -> Result<ImageEx> {
        let count = super::image_limit(container, self.config.max_count);
        if count == 0 {
            return Err(Error::NoImages {
                operation: "render",
            });
        }

        let start = Instant::now();
        let first = container.image(0);
        let planes_amount = match self.config.filter {
            Filter::Difference => 1,
            _ => first.plane_count(),
        };
        let system = if planes_amount == 1 {
            ColorSystem::Gray
        } else {
            first.system()
        };
        tracing::debug!(count, filter = %self.config.filter, "Simple render");
        progress.set_total(planes_amount);

        let full = container.size();
        let full_origin = full.pos.round().as_ivec2();
        let full_size = Size::from_dvec2_round(full.size);

        let mut image = ImageEx::new(system);
        let mut alpha = Plane::filled(full_size, color::WHITE);

        for channel in 0..planes_amount {
            let scale = super::channel_scale(first, channel, false);
            let local_origin = (full.pos * scale).round().as_ivec2();
            let local_size = Size::from_dvec2_round(full.size * scale);
            let (origin, size) = if self.config.upscale_chroma {
                (full_origin, full_size)
            } else {
                (local_origin, local_size)
            };
            let native = origin == local_origin && size == local_size;

            // Upscaled planes live only for this channel.
            let mut upscaled = Vec::new();
            let mut placements: Vec<(usize, IVec2)> = Vec::with_capacity(count);
            for j in 0..count {
                let source = container.image(j);
                let Some(plane) = source.plane(channel) else {
                    continue;
                };
                if native {
                    placements.push((j, (container.pos(j) * scale).round().as_ivec2()));
                } else {
                    upscaled.push(plane.scale(source.size(), ScalingFunction::Cubic));
                    placements.push((j, container.pos(j).round().as_ivec2()));
                }
            }

            let mut it = MultiPlaneIterator::new(origin, size);
            for (k, &(j, offset)) in placements.iter().enumerate() {
                let plane = if native {
                    &container.image(j)[channel]
                } else {
                    &upscaled[k]
                };
                it.add(plane, offset);
            }

            let filter: &dyn PixelFilter = match self.config.filter {
                Filter::Difference => &DifferenceFilter,
                Filter::DarkSelect if channel == 0 => &DarkSelectFilter,
                _ => &AverageFilter,
            };
            let reduced = it.reduce(|stack| filter.reduce(stack));

            if size == full_size && origin == full_origin {
                for (a, &covered) in alpha.pixels_mut().iter_mut().zip(reduced.coverage.pixels()) {
                    if covered == color::BLACK {
                        *a = color::BLACK;
                    }
                }
            }

            let plane = if size == full_size {
                reduced.plane
            } else {
                reduced.plane.scale(full_size, ScalingFunction::Cubic)
            };
            image.push_plane(plane);
            progress.add(1);
        }

        image.set_alpha_plane(Some(alpha));
        tracing::debug!(elapsed = ?start.elapsed(), "Simple render done");
        Ok(image)
    }
}

/// Single-plane render of the first channel with a caller-supplied filter.
/// Produces a Gray image covering the whole container.
#[derive(Debug, Clone)]
pub struct PlaneRender<F> {
    filter: F,
    max_count: Option<usize>,
}

impl<F: PixelFilter> PlaneRender<F> {
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            max_count: None,
        }
    }

    pub fn with_max_count(mut self, max_count: usize) -> Self {
        assert!(max_count > 0, "max_count must be at least 1");
        self.max_count = Some(max_count);
        self
    }

    pub fn render(&self, container: &dyn Container, progress: Progress) -> Result<ImageEx> {
        let count = super::image_limit(container, self.max_count);
        if count == 0 {
            return Err(Error::NoImages {
                operation: "render",
            });
        }
        tracing::debug!(count, "Plane render");
        progress.set_total(1);

        let full = container.size();
        let mut it = MultiPlaneIterator::new(
            full.pos.round().as_ivec2(),
            Size::from_dvec2_round(full.size),
        );
        for j in 0..count {
            it.add(container.plane(j)?, container.pos(j).round().as_ivec2());
        }

        let reduced = it.reduce(|stack| self.filter.reduce(stack));
        progress.add(1);
        Ok(ImageEx::from_plane(reduced.plane))
    }
}

impl PlaneRender<AverageFilter> {
    pub fn average() -> Self {
        Self::new(AverageFilter)
    }
}
