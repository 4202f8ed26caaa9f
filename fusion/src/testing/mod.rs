//! Testing utilities for fusion.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use glam::{DVec2, IVec2};
use hashbrown::HashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::comparator::{Comparator, ImageOffset};
use crate::container::Container;
use crate::geometry::Size;
use crate::image::ImageEx;
use crate::plane::Plane;

/// Initialize tracing subscriber for tests.
/// Safe to call multiple times - will only initialize once.
/// Respects RUST_LOG env var, defaults to "info".
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Horizontal ramp from black to white.
pub fn gradient(width: usize, height: usize) -> Plane {
    let mut plane = Plane::new(Size::new(width, height));
    let step = 1.0 / width.max(2).saturating_sub(1) as f32;
    for y in 0..height {
        for (x, value) in plane.row_mut(y).iter_mut().enumerate() {
            *value = (x as f32 * step).min(1.0);
        }
    }
    plane
}

/// Alternating black and white pixels, white at (0, 0).
pub fn checkerboard(width: usize, height: usize) -> Plane {
    let mut plane = Plane::new(Size::new(width, height));
    for y in 0..height {
        for (x, value) in plane.row_mut(y).iter_mut().enumerate() {
            *value = if (x + y) % 2 == 0 { 1.0 } else { 0.0 };
        }
    }
    plane
}

/// Uniform noise in `[0, 1)`.
pub fn noise(rng: &mut StdRng, size: Size) -> Plane {
    let pixels = (0..size.area()).map(|_| rng.random::<f32>()).collect();
    Plane::from_pixels(size.width, size.height, pixels)
}

/// `frame`-sized crops of a random scene at `offsets`, each with a little
/// independent noise added. Offsets must keep the crop inside the scene.
pub fn shifted_frames(seed: u64, scene: Size, frame: Size, offsets: &[IVec2]) -> Vec<ImageEx> {
    let mut rng = StdRng::seed_from_u64(seed);
    let scene = noise(&mut rng, scene);
    offsets
        .iter()
        .map(|offset| {
            let mut crop = scene.crop((offset.x as usize, offset.y as usize), frame);
            for value in crop.pixels_mut() {
                *value = (*value + rng.random_range(-0.02..0.02)).clamp(0.0, 1.0);
            }
            ImageEx::from_plane(crop)
        })
        .collect()
}

/// Always reports the same offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedComparator(pub DVec2);

impl Comparator for FixedComparator {
    fn find_offset(
        &self,
        _: &Plane,
        _: &Plane,
        _: Option<&Plane>,
        _: Option<&Plane>,
    ) -> ImageOffset {
        ImageOffset::new(self.0, 0.0)
    }
}

/// Looks offsets up by the first sample of each plane; unknown pairs give
/// `(0, 0)`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedComparator {
    offsets: HashMap<(u32, u32), DVec2>,
}

impl ScriptedComparator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, first: f32, second: f32, offset: DVec2) -> Self {
        self.offsets.insert((first.to_bits(), second.to_bits()), offset);
        self
    }
}

impl Comparator for ScriptedComparator {
    fn find_offset(
        &self,
        first: &Plane,
        second: &Plane,
        _: Option<&Plane>,
        _: Option<&Plane>,
    ) -> ImageOffset {
        let key = |plane: &Plane| plane.pixels().first().copied().unwrap_or(0.0).to_bits();
        let distance = self
            .offsets
            .get(&(key(first), key(second)))
            .copied()
            .unwrap_or(DVec2::ZERO);
        ImageOffset::new(distance, 0.0)
    }
}

/// Counts how often the wrapped comparator runs.
#[derive(Debug, Default)]
pub struct CountingComparator<C> {
    inner: C,
    calls: AtomicUsize,
}

impl<C> CountingComparator<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl<C: Comparator> Comparator for CountingComparator<C> {
    fn find_offset(
        &self,
        first: &Plane,
        second: &Plane,
        first_alpha: Option<&Plane>,
        second_alpha: Option<&Plane>,
    ) -> ImageOffset {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.find_offset(first, second, first_alpha, second_alpha)
    }
}

/// Exhaustive integer-offset search minimizing the mean absolute difference
/// over the opaque overlap.
#[derive(Debug, Clone, Copy)]
pub struct BruteForceComparator {
    pub max_offset: i32,
    /// Smallest overlap, as a fraction of the smaller plane, worth scoring.
    pub min_overlap: f64,
}

impl Default for BruteForceComparator {
    fn default() -> Self {
        Self {
            max_offset: 10,
            min_overlap: 0.3,
        }
    }
}

impl Comparator for BruteForceComparator {
    fn find_offset(
        &self,
        first: &Plane,
        second: &Plane,
        first_alpha: Option<&Plane>,
        second_alpha: Option<&Plane>,
    ) -> ImageOffset {
        let opaque =
            |alpha: Option<&Plane>, x: usize, y: usize| alpha.is_none_or(|a| a[(x, y)] >= 0.5);
        let smaller = first.size().area().min(second.size().area());
        let min_area = (smaller as f64 * self.min_overlap) as usize;
        let mut best = ImageOffset::new(DVec2::ZERO, f64::MAX);

        for dy in -self.max_offset..=self.max_offset {
            for dx in -self.max_offset..=self.max_offset {
                let mut sum = 0.0;
                let mut count = 0usize;
                for y in 0..second.height() {
                    let fy = y as i64 + dy as i64;
                    if fy < 0 || fy >= first.height() as i64 {
                        continue;
                    }
                    for x in 0..second.width() {
                        let fx = x as i64 + dx as i64;
                        if fx < 0 || fx >= first.width() as i64 {
                            continue;
                        }
                        let (fx, fy) = (fx as usize, fy as usize);
                        if !opaque(first_alpha, fx, fy) || !opaque(second_alpha, x, y) {
                            continue;
                        }
                        sum += (first[(fx, fy)] - second[(x, y)]).abs() as f64;
                        count += 1;
                    }
                }
                if count == 0 || count < min_area {
                    continue;
                }
                let error = sum / count as f64;
                if error < best.error {
                    best = ImageOffset::new(DVec2::new(dx as f64, dy as f64), error);
                }
            }
        }
        best
    }
}

/// Container with only the required methods, so every provided method runs
/// its default body.
#[derive(Debug, Clone, Default)]
pub struct FlatContainer {
    pub items: Vec<(ImageEx, DVec2)>,
}

impl FlatContainer {
    pub fn new(items: Vec<(ImageEx, DVec2)>) -> Self {
        Self { items }
    }
}

impl Container for FlatContainer {
    fn count(&self) -> usize {
        self.items.len()
    }

    fn image(&self, index: usize) -> &ImageEx {
        &self.items[index].0
    }

    fn image_mut(&mut self, index: usize) -> &mut ImageEx {
        &mut self.items[index].0
    }

    fn pos(&self, index: usize) -> DVec2 {
        self.items[index].1
    }

    fn set_pos(&mut self, index: usize, pos: DVec2) {
        self.items[index].1 = pos;
    }
}
