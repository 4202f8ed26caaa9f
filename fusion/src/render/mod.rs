//! Compositing of positioned images into one fused image.
//!
//! - [`AverageRender`]: alpha-aware weighted average into a growable
//!   [`SumPlane`].
//! - [`SimpleRender`] / [`PlaneRender`]: per-pixel reductions over images at
//!   rounded positions, driven by a [`PixelFilter`].
//! - [`FloatRender`]: sub-pixel point reconstruction at any magnification.

mod average;
mod config;
mod filters;
mod float;
mod multi_plane;
mod simple;
mod sum_plane;


use glam::DVec2;

use crate::container::Container;
use crate::image::ImageEx;

pub use average::AverageRender;
pub use config::{AverageRenderConfig, Filter, FloatRenderConfig, PointPolicy, SimpleRenderConfig};
pub use filters::{
    AverageFilter, DIFFERENCE_GAMMA, DarkSelectFilter, DifferenceFilter, PixelFilter,
};
pub use float::{
    FloatRender, MAX_WEIGHTED_POINTS, NearestPoint, PointReducer, SUPPORT_RADIUS, Sample,
    StreamingPoints, WeightedPoints, add_points,
};
pub use multi_plane::{MultiPlaneIterator, PixelStack, Reduced};
pub use simple::{PlaneRender, SimpleRender};
pub use sum_plane::SumPlane;

/// Resolution of `channel` relative to the first plane of `image`, or
/// `(1, 1)` when every channel renders at full resolution.
fn channel_scale(image: &ImageEx, channel: usize, upscale_chroma: bool) -> DVec2 {
    if upscale_chroma {
        return DVec2::ONE;
    }
    match (image.plane(channel), image.plane(0)) {
        (Some(plane), Some(reference)) if !reference.is_empty() => {
            plane.size().as_dvec2() / reference.size().as_dvec2()
        }
        _ => DVec2::ONE,
    }
}

/// Number of leading images a render pass consumes.
fn image_limit(container: &dyn Container, max_count: Option<usize>) -> usize {
    let count = container.count();
    max_count.map_or(count, |max| max.min(count))
}
