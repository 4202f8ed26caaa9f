//! Ordered collections of positioned images.
//!
//! [`Container`] is the contract every backend implements: per-image
//! geometry, optional shared masks and an optional pairwise offset cache.
//! The geometric helpers built on top of it (bounds, movement detection,
//! cropping, scaling, cached offset lookup) are provided methods, so
//! backends only supply storage.

mod image_container;


use glam::DVec2;

use crate::comparator::{Comparator, ImageOffset};
use crate::error::{Error, Result};
use crate::geometry::{Rect, Size};
use crate::image::ImageEx;
use crate::plane::{Plane, ScalingFunction};

pub use image_container::{ImageContainer, ImageGroup, ImageItem};

/// Frame tag of an image that belongs to no animation frame.
pub const UNGROUPED: i32 = -1;

pub trait Container {
    fn count(&self) -> usize;
    fn image(&self, index: usize) -> &ImageEx;
    fn image_mut(&mut self, index: usize) -> &mut ImageEx;

    /// Top-left anchor of the image in the shared global frame.
    fn pos(&self, index: usize) -> DVec2;
    fn set_pos(&mut self, index: usize, pos: DVec2);

    fn frame(&self, _index: usize) -> i32 {
        UNGROUPED
    }

    fn set_frame(&mut self, _index: usize, _frame: i32) {
        tracing::debug!("Frame tags are not stored by this container type");
    }

    /// Effective alpha of the image; `None` means fully opaque.
    fn alpha(&self, index: usize) -> Option<&Plane> {
        self.image(index).alpha_plane()
    }

    /// Index of the shared mask used by the image, if any.
    fn image_mask(&self, _index: usize) -> Option<usize> {
        None
    }

    fn mask_count(&self) -> usize {
        0
    }

    fn mask(&self, _index: usize) -> Result<&Plane> {
        Err(Error::Unsupported {
            operation: "mask lookup",
        })
    }

    fn has_cached_offset(&self, _first: usize, _second: usize) -> bool {
        false
    }

    fn cached_offset(&self, _first: usize, _second: usize) -> Result<ImageOffset> {
        Err(Error::Unsupported {
            operation: "offset cache lookup",
        })
    }

    fn set_cached_offset(&mut self, _first: usize, _second: usize, _offset: ImageOffset) {
        tracing::debug!("No caching of alignment offsets implemented in this container");
    }

    /// Plane used for alignment: the first plane of the image.
    ///
    /// For RGB images this is red rather than the more representative green.
    fn plane(&self, index: usize) -> Result<&Plane> {
        self.image(index).plane(0).ok_or(Error::NoPlanes { index })
    }

    /// Component-wise minimum of all anchors, `(0, 0)` when empty.
    fn min_point(&self) -> DVec2 {
        (0..self.count())
            .map(|i| self.pos(i))
            .reduce(DVec2::min)
            .unwrap_or(DVec2::ZERO)
    }

    /// Component-wise maximum of all anchors, `(0, 0)` when empty.
    fn max_point(&self) -> DVec2 {
        (0..self.count())
            .map(|i| self.pos(i))
            .reduce(DVec2::max)
            .unwrap_or(DVec2::ZERO)
    }

    /// Smallest rectangle containing every image at its position.
    fn size(&self) -> Rect {
        if self.count() == 0 {
            return Rect::default();
        }
        let min = self.min_point();
        let max = (0..self.count())
            .map(|i| self.pos(i) + self.image(i).size().as_dvec2())
            .fold(min, DVec2::max);
        Rect::from_min_max(min, max)
    }

    /// Whether any image is displaced from image 0 along x and along y.
    fn has_movement(&self) -> (bool, bool) {
        let mut movement = (false, false);
        if self.count() == 0 {
            return movement;
        }

        let fixed = self.pos(0);
        for i in 1..self.count() {
            let current = self.pos(i);
            movement.0 |= current.x != fixed.x;
            movement.1 |= current.y != fixed.y;
            if movement.0 && movement.1 {
                break;
            }
        }
        movement
    }

    /// Distinct non-negative frame tags in order of appearance, or
    /// `[UNGROUPED]` when no image carries one.
    fn frames(&self) -> Vec<i32> {
        let mut frames = Vec::new();
        for i in 0..self.count() {
            let frame = self.frame(i);
            if frame >= 0 && !frames.contains(&frame) {
                frames.push(frame);
            }
        }
        if frames.is_empty() {
            frames.push(UNGROUPED);
        }
        frames
    }

    /// Shrinks the image to the whole pixels inside `area` and moves its
    /// anchor along. An image left without pixels becomes an empty
    /// placeholder.
    fn crop_image(&mut self, index: usize, area: Rect) {
        let pos = self.pos(index);
        let size = self.image(index).size().as_dvec2();

        let kept = area.intersection(&Rect::new(pos, size)).and_then(|inter| {
            let start = (inter.min() - pos).ceil().max(DVec2::ZERO);
            let end = (inter.max() - pos).floor().min(size);
            (end.x > start.x && end.y > start.y).then_some((start, end))
        });

        match kept {
            Some((start, end)) => {
                let image = self.image_mut(index);
                image.crop(
                    (start.x as usize, start.y as usize),
                    Size::from_dvec2_round(end - start),
                );
                self.set_pos(index, pos + start);
            }
            None => {
                tracing::warn!(index, "Crop left no pixels, replacing image with placeholder");
                let system = self.image(index).system();
                *self.image_mut(index) = ImageEx::new(system);
            }
        }
    }

    /// Removes pixel margins from each side of the image.
    fn crop_image_edges(
        &mut self,
        index: usize,
        left: usize,
        top: usize,
        right: usize,
        bottom: usize,
    ) {
        let size = self.image(index).size();
        let kept = Size::new(
            size.width.saturating_sub(left + right),
            size.height.saturating_sub(top + bottom),
        );
        if kept.is_empty() {
            tracing::warn!(index, "Edge crop left no pixels, replacing image with placeholder");
            let system = self.image(index).system();
            *self.image_mut(index) = ImageEx::new(system);
            return;
        }

        self.image_mut(index).crop((left, top), kept);
        let pos = self.pos(index);
        self.set_pos(index, pos + DVec2::new(left as f64, top as f64));
    }

    /// Scales the anchor and the pixels by `scale`. Pixel data is left alone
    /// when the rounded target size equals the current size.
    fn scale_image(&mut self, index: usize, scale: DVec2, function: ScalingFunction) {
        let pos = self.pos(index);
        self.set_pos(index, pos * scale);

        let image = self.image_mut(index);
        if image.size() == image.size().scaled(scale) {
            return;
        }
        image.scale_factor(scale, function);
    }

    /// Offset of image `second` relative to image `first`, computed with
    /// `comparator` on a cache miss and cached afterwards.
    fn find_offset(
        &mut self,
        first: usize,
        second: usize,
        comparator: &dyn Comparator,
    ) -> Result<ImageOffset> {
        if self.has_cached_offset(first, second) {
            tracing::trace!(first, second, "Offset cache hit");
            return self.cached_offset(first, second);
        }

        let offset = comparator.find_offset(
            self.plane(first)?,
            self.plane(second)?,
            self.alpha(first),
            self.alpha(second),
        );
        self.set_cached_offset(first, second, offset);
        Ok(offset)
    }
}
