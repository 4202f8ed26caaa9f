//! Multi-plane images: up to three color planes plus an optional alpha plane.

use std::ops::Index;

use glam::DVec2;
use strum_macros::Display;

use crate::geometry::Size;
use crate::plane::{Plane, ScalingFunction};

/// Maximum number of planes, alpha included.
pub const MAX_PLANES: usize = 4;

/// How the color planes of an image are to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ColorSystem {
    Gray,
    #[default]
    Rgb,
    /// Luma first, chroma planes possibly subsampled.
    Yuv,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageEx {
    planes: Vec<Plane>,
    alpha: Option<Plane>,
    system: ColorSystem,
}

impl ImageEx {
    pub fn new(system: ColorSystem) -> Self {
        Self {
            planes: Vec::new(),
            alpha: None,
            system,
        }
    }

    /// Grayscale image holding `plane`. An empty plane gives an image
    /// without planes.
    pub fn from_plane(plane: Plane) -> Self {
        let mut image = Self::new(ColorSystem::Gray);
        if !plane.is_empty() {
            image.planes.push(plane);
        }
        image
    }

    /// Builder variant of [`ImageEx::set_alpha_plane`].
    pub fn with_alpha(mut self, alpha: Option<Plane>) -> Self {
        self.set_alpha_plane(alpha);
        self
    }

    pub fn push_plane(&mut self, plane: Plane) {
        assert!(
            self.planes.len() < MAX_PLANES - 1,
            "an image holds at most {} color planes",
            MAX_PLANES - 1
        );
        self.planes.push(plane);
    }

    #[inline]
    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    #[inline]
    pub fn plane(&self, index: usize) -> Option<&Plane> {
        self.planes.get(index)
    }

    #[inline]
    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    #[inline]
    pub fn alpha_plane(&self) -> Option<&Plane> {
        self.alpha.as_ref()
    }

    /// Replaces the alpha plane; an empty plane counts as no alpha.
    pub fn set_alpha_plane(&mut self, alpha: Option<Plane>) {
        self.alpha = alpha.filter(|a| !a.is_empty());
    }

    pub fn take_alpha(&mut self) -> Option<Plane> {
        self.alpha.take()
    }

    #[inline]
    pub fn system(&self) -> ColorSystem {
        self.system
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.planes.is_empty()
    }

    /// Widest plane width (the luma plane for subsampled images).
    pub fn width(&self) -> usize {
        self.planes.iter().map(Plane::width).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.planes.iter().map(Plane::height).max().unwrap_or(0)
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Crops every plane to the region `offset`..`offset + size` given in
    /// full-resolution pixels. Subsampled planes crop the matching region at
    /// their own resolution.
    pub fn crop(&mut self, offset: (usize, usize), size: Size) {
        if !self.is_valid() {
            return;
        }
        let full = self.size().as_dvec2();
        let crop_plane = |plane: &Plane| {
            let ratio = plane.size().as_dvec2() / full;
            let start = (DVec2::new(offset.0 as f64, offset.1 as f64) * ratio).round();
            plane.crop(
                (start.x as usize, start.y as usize),
                size.scaled(ratio),
            )
        };

        self.planes = self.planes.iter().map(crop_plane).collect();
        self.alpha = self.alpha.as_ref().map(crop_plane);
    }

    /// Resizes the image so its full-resolution size becomes `size`. Every
    /// plane keeps its ratio to the full resolution.
    pub fn scale(&mut self, size: Size, function: ScalingFunction) {
        let factor = size.as_dvec2() / self.size().as_dvec2();
        let scale_plane = |plane: &Plane| {
            let target = if plane.size() == self.size() {
                size
            } else {
                plane.size().scaled(factor)
            };
            plane.scale(target, function)
        };

        let planes = self.planes.iter().map(scale_plane).collect();
        let alpha = self.alpha.as_ref().map(scale_plane);
        self.planes = planes;
        self.alpha = alpha;
    }

    /// Resizes by `factor`, rounding the target size to whole pixels.
    pub fn scale_factor(&mut self, factor: DVec2, function: ScalingFunction) {
        assert!(
            factor.x > 0.0 && factor.y > 0.0,
            "scale factor must be positive"
        );
        if !self.is_valid() {
            return;
        }
        self.scale(self.size().scaled(factor), function);
    }
}

impl Index<usize> for ImageEx {
    type Output = Plane;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.planes[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::color;

    fn yuv420(width: usize, height: usize) -> ImageEx {
        let mut image = ImageEx::new(ColorSystem::Yuv);
        image.push_plane(Plane::filled(Size::new(width, height), 0.5));
        image.push_plane(Plane::filled(Size::new(width / 2, height / 2), 0.25));
        image.push_plane(Plane::filled(Size::new(width / 2, height / 2), 0.75));
        image
    }

    #[test]
    fn test_from_empty_plane_has_no_planes() {
        let image = ImageEx::from_plane(Plane::default());
        assert!(!image.is_valid());
        assert_eq!(image.size(), Size::ZERO);
    }

    #[test]
    fn test_size_is_largest_plane() {
        let image = yuv420(8, 6);
        assert_eq!(image.size(), Size::new(8, 6));
        assert_eq!(image.plane_count(), 3);
        assert_eq!(image[1].size(), Size::new(4, 3));
    }

    #[test]
    fn test_empty_alpha_is_no_alpha() {
        let image =
            ImageEx::from_plane(Plane::new(Size::new(2, 2))).with_alpha(Some(Plane::default()));
        assert!(image.alpha_plane().is_none());
    }

    #[test]
    fn test_crop_keeps_subsampling() {
        let alpha = Plane::filled(Size::new(8, 8), color::WHITE);
        let mut image = yuv420(8, 8).with_alpha(Some(alpha));
        image.crop((2, 2), Size::new(4, 4));
        assert_eq!(image[0].size(), Size::new(4, 4));
        assert_eq!(image[1].size(), Size::new(2, 2));
        assert_eq!(image.alpha_plane().unwrap().size(), Size::new(4, 4));
    }

    #[test]
    fn test_scale_factor_keeps_subsampling() {
        let mut image = yuv420(8, 4);
        image.scale_factor(DVec2::new(2.0, 2.0), ScalingFunction::Linear);
        assert_eq!(image.size(), Size::new(16, 8));
        assert_eq!(image[1].size(), Size::new(8, 4));
        assert!((image[2][(3, 3)] - 0.75).abs() < 1e-5);
    }

    #[test]
    #[should_panic(expected = "at most 3 color planes")]
    fn test_push_plane_limit() {
        let mut image = yuv420(2, 2);
        image.push_plane(Plane::new(Size::new(2, 2)));
    }

    #[test]
    fn test_system_display() {
        assert_eq!(ColorSystem::Yuv.to_string(), "yuv");
    }
}
