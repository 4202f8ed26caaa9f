use std::ops::{Index, IndexMut};

/// Row-major 2D buffer.
///
/// A zero-area buffer is valid and serves as the placeholder for planes that
/// were cropped or scaled down to nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Buffer2<T> {
    width: usize,
    height: usize,
    pixels: Vec<T>,
}

impl<T> Buffer2<T> {
    pub fn new(width: usize, height: usize, pixels: Vec<T>) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "buffer of {width}x{height} needs {} pixels",
            width * height
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [T] {
        &mut self.pixels
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        let start = self.index_of(0, y);
        &self.pixels[start..start + self.width]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = self.index_of(0, y);
        &mut self.pixels[start..start + self.width]
    }

    #[inline]
    fn index_of(&self, x: usize, y: usize) -> usize {
        debug_assert!(x <= self.width && y < self.height);
        y * self.width + x
    }
}

impl<T: Default + Clone> Buffer2<T> {
    pub fn new_default(width: usize, height: usize) -> Self {
        Self::new_filled(width, height, T::default())
    }
}

impl<T: Clone> Buffer2<T> {
    pub fn new_filled(width: usize, height: usize, value: T) -> Self {
        Self::new(width, height, vec![value; width * height])
    }

    #[inline]
    pub fn fill(&mut self, value: T) {
        self.pixels.fill(value);
    }
}

impl<T: Copy> Buffer2<T> {
    /// Copies the `size` block at `from` in `src` to `to` in `self`.
    ///
    /// # Panics
    /// When either block leaves its buffer.
    pub fn copy_region(
        &mut self,
        src: &Self,
        from: (usize, usize),
        size: (usize, usize),
        to: (usize, usize),
    ) {
        let (width, height) = size;
        assert!(
            from.0 + width <= src.width && from.1 + height <= src.height,
            "source region out of bounds"
        );
        assert!(
            to.0 + width <= self.width && to.1 + height <= self.height,
            "destination region out of bounds"
        );
        if width == 0 {
            return;
        }
        for y in 0..height {
            let s = src.index_of(from.0, from.1 + y);
            let d = self.index_of(to.0, to.1 + y);
            self.pixels[d..d + width].copy_from_slice(&src.pixels[s..s + width]);
        }
    }

    /// The `size` block starting at `origin`.
    pub fn crop(&self, origin: (usize, usize), size: (usize, usize)) -> Self {
        assert!(
            origin.0 + size.0 <= self.width && origin.1 + size.1 <= self.height,
            "crop region out of bounds"
        );
        let mut pixels = Vec::with_capacity(size.0 * size.1);
        for y in origin.1..origin.1 + size.1 {
            let start = y * self.width + origin.0;
            pixels.extend_from_slice(&self.pixels[start..start + size.0]);
        }
        Self::new(size.0, size.1, pixels)
    }

    /// A `size` buffer of `fill` with the current content placed at `at`.
    /// Used to grow accumulators in any direction.
    pub fn grown(&self, size: (usize, usize), at: (usize, usize), fill: T) -> Self {
        let mut out = Self::new_filled(size.0, size.1, fill);
        out.copy_region(self, (0, 0), (self.width, self.height), at);
        out
    }
}

impl<T> Index<(usize, usize)> for Buffer2<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &T {
        assert!(x < self.width, "x {x} outside width {}", self.width);
        &self.pixels[self.index_of(x, y)]
    }
}

impl<T> IndexMut<(usize, usize)> for Buffer2<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        assert!(x < self.width, "x {x} outside width {}", self.width);
        let index = self.index_of(x, y);
        &mut self.pixels[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> Buffer2<i32> {
        Buffer2::new(width, height, (0..(width * height) as i32).collect())
    }

    #[test]
    fn test_layout_is_row_major() {
        let buf = ramp(3, 2);
        assert_eq!(buf.row(0), &[0, 1, 2]);
        assert_eq!(buf.row(1), &[3, 4, 5]);
        assert_eq!(buf[(2, 1)], 5);
    }

    #[test]
    #[should_panic(expected = "buffer of 3x2 needs 6 pixels")]
    fn test_new_rejects_wrong_length() {
        Buffer2::new(3, 2, vec![1, 2, 3]);
    }

    #[test]
    fn test_default_has_no_pixels() {
        let buf: Buffer2<f32> = Buffer2::default();
        assert!(buf.pixels().is_empty());
        assert_eq!((buf.width(), buf.height()), (0, 0));
    }

    #[test]
    fn test_index_mut() {
        let mut buf = ramp(3, 2);
        buf[(0, 1)] = 77;
        assert_eq!(buf.row(1), &[77, 4, 5]);
    }

    #[test]
    #[should_panic(expected = "x 3 outside width 3")]
    fn test_index_rejects_x_past_row_end() {
        let buf = ramp(3, 2);
        let _ = buf[(3, 0)];
    }

    #[test]
    fn test_crop() {
        let cropped = ramp(4, 3).crop((1, 1), (2, 2));
        assert_eq!(cropped.pixels(), &[5, 6, 9, 10]);
        assert_eq!(cropped.width(), 2);
    }

    #[test]
    fn test_crop_to_nothing() {
        let cropped = ramp(4, 3).crop((4, 0), (0, 3));
        assert!(cropped.pixels().is_empty());
        assert_eq!(cropped.height(), 3);
    }

    #[test]
    fn test_copy_region() {
        let mut dst = Buffer2::new_filled(4, 3, -1);
        dst.copy_region(&ramp(2, 2), (0, 0), (2, 2), (1, 1));
        assert_eq!(dst.row(0), &[-1, -1, -1, -1]);
        assert_eq!(dst.row(1), &[-1, 0, 1, -1]);
        assert_eq!(dst.row(2), &[-1, 2, 3, -1]);
    }

    #[test]
    #[should_panic(expected = "destination region out of bounds")]
    fn test_copy_region_rejects_overflow() {
        let mut dst = Buffer2::new_filled(2, 2, 0);
        dst.copy_region(&ramp(2, 2), (0, 0), (2, 2), (1, 0));
    }

    #[test]
    fn test_grown_places_content() {
        let grown = ramp(2, 1).grown((3, 2), (1, 1), 9);
        assert_eq!(grown.row(0), &[9, 9, 9]);
        assert_eq!(grown.row(1), &[9, 0, 1]);
    }

    #[test]
    fn test_grown_from_empty() {
        let grown = Buffer2::<f64>::default().grown((2, 2), (0, 0), 0.0);
        assert_eq!(grown.pixels(), &[0.0; 4]);
    }
}
