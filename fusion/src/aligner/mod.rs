//! Divide-and-conquer alignment of a container.
//!
//! Each half of an index range is aligned on its own, which yields relative
//! positions inside the half plus one merged representative image. The two
//! representatives are compared once and the right half is translated into
//! the left half's frame. Only the base cases talk to the comparator about
//! individual images.


use std::ops::Range;
use std::time::Instant;

use glam::DVec2;

use crate::comparator::Comparator;
use crate::container::{Container, ImageContainer};
use crate::error::{Error, Result};
use crate::geometry::Size;
use crate::image::ImageEx;
use crate::plane::Plane;
use crate::progress::Progress;
use crate::render::{AverageRender, AverageRenderConfig};

/// Aligns every image of a container by recursive pairwise merging.
#[derive(Debug, Clone)]
pub struct RecursiveAligner<C> {
    comparator: C,
}

impl<C: Comparator> RecursiveAligner<C> {
    pub fn new(comparator: C) -> Self {
        Self { comparator }
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Aligns the whole container, committing positions through
    /// [`Container::set_pos`]. Returns the merged image of all inputs.
    ///
    /// Progress runs from 0 to `count()`.
    pub fn align(&self, container: &mut dyn Container, progress: Progress) -> Result<ImageEx> {
        let count = container.count();
        if count == 0 {
            return Err(Error::NoImages {
                operation: "align",
            });
        }

        let start = Instant::now();
        progress.set_total(count);
        let merged = self.align_range(container, 0..count, progress)?;
        tracing::debug!(count, elapsed = ?start.elapsed(), "Recursive alignment done");
        Ok(merged)
    }

    /// Aligns `range` in the container's frame anchored at its first image.
    /// Positions outside `range` are left alone.
    pub fn align_range(
        &self,
        container: &mut dyn Container,
        range: Range<usize>,
        progress: Progress,
    ) -> Result<ImageEx> {
        assert!(
            range.end <= container.count(),
            "range {range:?} exceeds {} images",
            container.count()
        );
        let Range { start: begin, end } = range;

        match end.saturating_sub(begin) {
            0 => Err(Error::NoImages {
                operation: "align",
            }),
            1 => {
                progress.add(1);
                representative(container, begin)
            }
            2 => {
                let first = representative(container, begin)?;
                let second = representative(container, begin + 1)?;
                let (merged, offset) = self.combine(&first, &second)?;
                let pos = container.pos(begin) + offset;
                container.set_pos(begin + 1, pos);
                progress.add(2);
                Ok(merged)
            }
            amount => {
                let middle = begin + amount / 2;
                let left = self.align_range(container, begin..middle, progress)?;
                let right = self.align_range(container, middle..end, progress)?;
                let (merged, offset) = self.combine(&left, &right)?;

                let corner1 = top_left(container, begin..middle);
                let corner2 = top_left(container, middle..end);
                let shift = corner1 + offset - corner2;
                tracing::trace!(begin, middle, end, ?shift, "Joining aligned halves");
                for i in middle..end {
                    let pos = container.pos(i) + shift;
                    container.set_pos(i, pos);
                }
                Ok(merged)
            }
        }
    }

    /// Merges two images after measuring where `second` sits relative to
    /// `first`. Returns the merged image and that offset.
    ///
    /// Alpha-free images of equal width that are only offset vertically are
    /// merged line by line; everything else goes through a merging
    /// [`AverageRender`].
    pub fn combine(&self, first: &ImageEx, second: &ImageEx) -> Result<(ImageEx, DVec2)> {
        let empty = Plane::default();
        let first_plane = first.plane(0).unwrap_or(&empty);
        let second_plane = second.plane(0).unwrap_or(&empty);
        let offset = self
            .comparator
            .find_offset(first_plane, second_plane, first.alpha_plane(), second.alpha_plane())
            .distance;

        let vertical_only = offset.x == 0.0
            && first.alpha_plane().is_none()
            && second.alpha_plane().is_none()
            && first_plane.width() == second_plane.width();
        if vertical_only {
            let merged = merge_vertical(first_plane, second_plane, offset.y as i64);
            return Ok((ImageEx::from_plane(merged), offset));
        }

        let mut container = ImageContainer::new();
        container.add_image(first.clone());
        container.add_image(second.clone());
        container.set_pos(1, offset);
        let merged = AverageRender::new(AverageRenderConfig::for_merging())
            .render(&container, Progress::none())?;
        Ok((merged, offset))
    }
}

/// Stacks two planes of equal width that are `offset` rows apart (`second`
/// below `first` when positive). Overlapping rows are averaged, the rest is
/// copied from whichever plane covers them. Rows covered by neither are
/// black.
///
/// # Panics
/// When the widths differ.
pub fn merge_vertical(first: &Plane, second: &Plane, offset: i64) -> Plane {
    assert_eq!(
        first.width(),
        second.width(),
        "vertically merged planes must share a width"
    );
    let (top, bottom) = if offset < 0 {
        (second, first)
    } else {
        (first, second)
    };
    let offset = offset.unsigned_abs() as usize;
    let height = top.height().max(bottom.height() + offset);
    let mut out = Plane::new(Size::new(first.width(), height));

    for y in 0..offset.min(top.height()) {
        out.row_mut(y).copy_from_slice(top.row(y));
    }

    let shared = top.height().saturating_sub(offset).min(bottom.height());
    for y in 0..shared {
        let merged = out.row_mut(y + offset);
        for ((out, &a), &b) in merged.iter_mut().zip(top.row(y + offset)).zip(bottom.row(y)) {
            *out = (a + b) / 2.0;
        }
    }

    if top.height() > bottom.height() + offset {
        for y in offset + shared..height {
            out.row_mut(y).copy_from_slice(top.row(y));
        }
    } else {
        for y in shared..bottom.height() {
            out.row_mut(y + offset).copy_from_slice(bottom.row(y));
        }
    }
    out
}

/// Alignment view of one image: its first plane and effective alpha.
fn representative(container: &dyn Container, index: usize) -> Result<ImageEx> {
    let plane = container.plane(index)?.clone();
    Ok(ImageEx::from_plane(plane).with_alpha(container.alpha(index).cloned()))
}

fn top_left(container: &dyn Container, range: Range<usize>) -> DVec2 {
    range
        .map(|i| container.pos(i))
        .fold(DVec2::splat(f64::MAX), DVec2::min)
}
