use std::borrow::Cow;
use std::time::Instant;

use glam::DVec2;

use super::config::AverageRenderConfig;
use super::sum_plane::SumPlane;
use crate::container::Container;
use crate::error::{Error, Result};
use crate::geometry::Size;
use crate::image::{ColorSystem, ImageEx};
use crate::plane::{Plane, ScalingFunction};
use crate::progress::Progress;

/// Shared masks resampled once per channel resolution.
struct AlphaScales {
    channels: Vec<Vec<Plane>>,
}

impl AlphaScales {
    fn new(container: &dyn Container, scales: &[DVec2]) -> Result<Self> {
        let mut channels = Vec::with_capacity(scales.len());
        for &scale in scales {
            let mut masks = Vec::with_capacity(container.mask_count());
            for i in 0..container.mask_count() {
                let mask = container.mask(i)?;
                let size = mask.size().scaled(scale);
                masks.push(if size == mask.size() {
                    mask.clone()
                } else {
                    mask.scale(size, ScalingFunction::Cubic)
                });
            }
            channels.push(masks);
        }
        Ok(Self { channels })
    }

    /// The scaled shared mask when the image uses one, its own alpha otherwise.
    fn alpha<'a>(
        &'a self,
        channel: usize,
        mask: Option<usize>,
        fallback: Option<&'a Plane>,
    ) -> Option<&'a Plane> {
        match mask {
            Some(mask) => Some(&self.channels[channel][mask]),
            None => fallback,
        }
    }
}

/// Weighted average of every image at its position.
///
/// Alpha weighting is switched on when any image carries alpha or a shared
/// mask, or when images move along both axes. Movement along one axis only
/// leaves no uncovered corners, so the unweighted sum suffices there.
#[derive(Debug, Clone, Default)]
pub struct AverageRender {
    config: AverageRenderConfig,
}

impl AverageRender {
    pub fn new(config: AverageRenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AverageRenderConfig {
        &self.config
    }

    pub fn render(&self, container: &dyn Container, progress: Progress) -> Result<ImageEx> {
        let count = container.count();
        if count == 0 {
            return Err(Error::NoImages {
                operation: "render",
            });
        }

        let start = Instant::now();
        let first = container.image(0);
        let planes_amount = if self.config.for_merging {
            1
        } else {
            first.plane_count()
        };
        progress.set_total(count * planes_amount);

        let use_alpha = self.needs_alpha(container);
        tracing::debug!(count, planes_amount, use_alpha, "Average render");

        let scales: Vec<DVec2> = (0..planes_amount)
            .map(|c| super::channel_scale(first, c, self.config.upscale_chroma))
            .collect();
        let masks = AlphaScales::new(container, &scales)?;

        let system = if self.config.for_merging {
            ColorSystem::Gray
        } else {
            first.system()
        };
        let mut image = ImageEx::new(system);

        let min_point = container.min_point();
        let full = container.size().size;
        for (channel, &scale) in scales.iter().enumerate() {
            let mut sum = SumPlane::new(Size::from_dvec2_ceil(scale * full));

            for j in 0..count {
                let source = container.image(j);
                let Some(plane) = source.plane(channel) else {
                    tracing::warn!(index = j, channel, "Image is missing a channel");
                    progress.add(1);
                    continue;
                };

                let pos = (scale * (container.pos(j) - min_point)).round().as_ivec2();
                let target = source.size().scaled(scale);
                let plane = if plane.size() == target {
                    Cow::Borrowed(plane)
                } else {
                    Cow::Owned(plane.scale(target, ScalingFunction::Cubic))
                };

                let alpha = masks.alpha(channel, container.image_mask(j), container.alpha(j));
                match alpha {
                    Some(alpha) if use_alpha => sum.add_alpha_plane(&plane, alpha, pos),
                    _ => sum.add_plane(&plane, pos),
                }
                progress.add(1);
            }

            image.push_plane(sum.average());
            if channel == 0 && use_alpha {
                image.set_alpha_plane(Some(sum.alpha()));
            }
        }

        tracing::debug!(elapsed = ?start.elapsed(), "Average render done");
        Ok(image)
    }

    fn needs_alpha(&self, container: &dyn Container) -> bool {
        let has_alpha = (0..container.count())
            .any(|i| container.alpha(i).is_some() || container.image_mask(i).is_some());
        let (moves_x, moves_y) = container.has_movement();
        has_alpha || (moves_x && moves_y)
    }
}
