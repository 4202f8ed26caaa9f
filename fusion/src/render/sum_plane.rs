//! Growable weighted accumulator used by the average renderer.

use common::Buffer2;
use glam::IVec2;
use rayon::prelude::*;

use crate::geometry::Size;
use crate::plane::{Plane, ScalingFunction, color};

/// Running per-pixel sum of weighted samples together with the total weight.
///
/// Both buffers always share one size. They only grow, and existing content
/// is moved along when a contribution lands at a negative position.
#[derive(Debug, Clone, Default)]
pub struct SumPlane {
    sum: Buffer2<f64>,
    amount: Buffer2<f64>,
}

impl SumPlane {
    pub fn new(size: Size) -> Self {
        Self {
            sum: Buffer2::new_default(size.width, size.height),
            amount: Buffer2::new_default(size.width, size.height),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.sum.width(), self.sum.height())
    }

    /// Grows the buffers so a `size` block at `pos` fits and returns `pos`
    /// translated into the (possibly re-anchored) buffer coordinates.
    ///
    /// Every later write in the same pass must use the returned position;
    /// positions handed out earlier are shifted by the same delta.
    pub fn resize_to_fit(&mut self, pos: IVec2, size: Size) -> IVec2 {
        let current = IVec2::new(self.sum.width() as i32, self.sum.height() as i32);
        let offset = pos.min(IVec2::ZERO);
        let pos = pos - offset;
        let extent = IVec2::new(size.width as i32, size.height as i32);
        let new_size = (current - offset).max(pos + extent);

        if new_size != current {
            let new_size = (new_size.x as usize, new_size.y as usize);
            let shift = ((-offset.x) as usize, (-offset.y) as usize);
            tracing::trace!(?new_size, ?shift, "Growing sum plane");
            self.sum = self.sum.grown(new_size, shift, 0.0);
            self.amount = self.amount.grown(new_size, shift, 0.0);
        }
        pos
    }

    /// Adds every pixel of `plane` at `pos` with full weight.
    pub fn add_plane(&mut self, plane: &Plane, pos: IVec2) {
        let pos = self.resize_to_fit(pos, plane.size());
        let (x, y) = (pos.x as usize, pos.y as usize);
        let width = plane.width();

        for iy in 0..plane.height() {
            let sums = &mut self.sum.row_mut(y + iy)[x..x + width];
            for (sum, &value) in sums.iter_mut().zip(plane.row(iy)) {
                *sum += value as f64;
            }
            let amounts = &mut self.amount.row_mut(y + iy)[x..x + width];
            for amount in amounts {
                *amount += color::as_weight(color::WHITE);
            }
        }
    }

    /// Adds `plane` at `pos`, weighting each pixel by `alpha`. The alpha
    /// plane is resampled to the plane's size first when they differ, and an
    /// empty alpha falls back to [`add_plane`](Self::add_plane).
    pub fn add_alpha_plane(&mut self, plane: &Plane, alpha: &Plane, pos: IVec2) {
        if alpha.is_empty() {
            self.add_plane(plane, pos);
            return;
        }

        let scaled;
        let alpha = if alpha.size() == plane.size() {
            alpha
        } else {
            scaled = alpha.scale(plane.size(), ScalingFunction::Cubic);
            &scaled
        };

        let pos = self.resize_to_fit(pos, plane.size());
        let (x, y) = (pos.x as usize, pos.y as usize);
        let width = plane.width();

        for iy in 0..plane.height() {
            let weights = alpha.row(iy);
            let sums = &mut self.sum.row_mut(y + iy)[x..x + width];
            for ((sum, &value), &a) in sums.iter_mut().zip(plane.row(iy)).zip(weights) {
                *sum += value as f64 * color::as_weight(a);
            }
            let amounts = &mut self.amount.row_mut(y + iy)[x..x + width];
            for (amount, &a) in amounts.iter_mut().zip(weights) {
                *amount += color::as_weight(a);
            }
        }
    }

    /// Weighted mean per pixel, black where nothing was added.
    pub fn average(&self) -> Plane {
        self.per_pixel(|sum, amount| {
            if amount != 0.0 {
                color::truncate(sum / amount)
            } else {
                color::BLACK
            }
        })
    }

    /// Coverage mask: opaque where anything was added, transparent elsewhere.
    pub fn alpha(&self) -> Plane {
        self.per_pixel(|_, amount| {
            if amount != 0.0 {
                color::WHITE
            } else {
                color::BLACK
            }
        })
    }

    fn per_pixel<F>(&self, f: F) -> Plane
    where
        F: Fn(f64, f64) -> f32 + Sync,
    {
        let mut out = Plane::new(self.size());
        if out.is_empty() {
            return out;
        }

        let width = out.width();
        out.pixels_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                let sums = self.sum.row(y);
                let amounts = self.amount.row(y);
                for ((out, &sum), &amount) in row.iter_mut().zip(sums).zip(amounts) {
                    *out = f(sum, amount);
                }
            });
        out
    }
}
