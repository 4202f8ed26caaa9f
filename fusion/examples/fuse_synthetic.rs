//! Aligns and fuses noisy shifted crops of a synthetic scene.
//!
//! Run with `cargo run -p fusion --example fuse_synthetic`.

use anyhow::Result;
use common::log_setup::{LogConfig, setup_logging};
use fusion::{
    AverageRender, Comparator, Container, Filter, FloatRender, FloatRenderConfig, ImageContainer,
    ImageEx, ImageOffset, Plane, PlaneRender, Progress, ProgressCounter, RecursiveAligner,
    SimpleRender, SimpleRenderConfig, Size,
};
use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SCENE: Size = Size::new(96, 72);
const FRAME: Size = Size::new(64, 48);
const NOISE: f32 = 0.08;

/// Exhaustive integer search for the offset with the lowest mean absolute
/// difference over the overlap.
struct SearchComparator {
    radius: i32,
}

impl Comparator for SearchComparator {
    fn find_offset(
        &self,
        first: &Plane,
        second: &Plane,
        first_alpha: Option<&Plane>,
        second_alpha: Option<&Plane>,
    ) -> ImageOffset {
        let opaque =
            |alpha: Option<&Plane>, x: usize, y: usize| alpha.is_none_or(|a| a[(x, y)] > 0.5);
        let mut best = ImageOffset::new(DVec2::ZERO, f64::MAX);

        for dy in -self.radius..=self.radius {
            for dx in -self.radius..=self.radius {
                let (mut sum, mut count) = (0.0f64, 0usize);
                for y in 0..second.height() {
                    let Ok(fy) = usize::try_from(y as i64 + dy as i64) else {
                        continue;
                    };
                    if fy >= first.height() {
                        continue;
                    }
                    for x in 0..second.width() {
                        let Ok(fx) = usize::try_from(x as i64 + dx as i64) else {
                            continue;
                        };
                        if fx >= first.width() {
                            continue;
                        }
                        if !opaque(first_alpha, fx, fy) || !opaque(second_alpha, x, y) {
                            continue;
                        }
                        sum += (first[(fx, fy)] - second[(x, y)]).abs() as f64;
                        count += 1;
                    }
                }
                if count < second.size().area() / 4 {
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

fn scene(rng: &mut StdRng) -> Plane {
    let mut plane = Plane::new(SCENE);
    let blobs: Vec<(DVec2, f64)> = (0..24)
        .map(|_| {
            let center = DVec2::new(
                rng.random_range(0.0..SCENE.width as f64),
                rng.random_range(0.0..SCENE.height as f64),
            );
            (center, rng.random_range(2.0..9.0))
        })
        .collect();

    for y in 0..SCENE.height {
        for (x, value) in plane.row_mut(y).iter_mut().enumerate() {
            let p = DVec2::new(x as f64, y as f64);
            let intensity: f64 = blobs
                .iter()
                .map(|(center, radius)| (-(p - *center).length_squared() / (radius * radius)).exp())
                .sum();
            *value = intensity.min(1.0) as f32;
        }
    }
    plane
}

fn frames(rng: &mut StdRng, scene: &Plane, offsets: &[(usize, usize)]) -> Vec<ImageEx> {
    offsets
        .iter()
        .map(|&offset| {
            let mut crop = scene.crop(offset, FRAME);
            for value in crop.pixels_mut() {
                *value = (*value + rng.random_range(-NOISE..NOISE)).clamp(0.0, 1.0);
            }
            ImageEx::from_plane(crop)
        })
        .collect()
}

fn mean_error(image: &ImageEx, scene: &Plane, origin: (usize, usize)) -> f64 {
    let plane = &image[0];
    let reference = scene.crop(origin, plane.size());
    let total: f64 = plane
        .pixels()
        .iter()
        .zip(reference.pixels())
        .map(|(a, b)| (a - b).abs() as f64)
        .sum();
    total / plane.pixels().len().max(1) as f64
}

fn main() -> Result<()> {
    setup_logging(&LogConfig::new("fuse_synthetic").with_filter("info,fusion=debug"))?;

    let mut rng = StdRng::seed_from_u64(0x5eed);
    let scene = scene(&mut rng);
    let offsets = [(0, 0), (6, 2), (11, 9), (3, 14), (17, 5), (9, 20), (25, 12), (20, 22)];

    let mut container = ImageContainer::new();
    for frame in frames(&mut rng, &scene, &offsets) {
        container.add_image(frame);
    }

    let counter = ProgressCounter::new();
    let aligner = RecursiveAligner::new(SearchComparator { radius: 20 });
    aligner.align(&mut container, Progress::new(Some(&counter)))?;
    tracing::info!(progress = counter.fraction(), "Alignment finished");

    let origin = container.min_point();
    for (i, expected) in offsets.iter().enumerate() {
        let found = container.pos(i) - origin;
        tracing::info!(image = i, ?expected, found = ?found, "Recovered position");
    }

    let single_error = mean_error(container.image(0), &scene, offsets[0]);
    tracing::info!(error = single_error, "Single frame error");

    let average = AverageRender::default().render(&container, Progress::none())?;
    tracing::info!(
        width = average.width(),
        height = average.height(),
        error = mean_error(&average, &scene, (0, 0)),
        "Average render"
    );

    for filter in [Filter::Average, Filter::Difference, Filter::DarkSelect] {
        let image = SimpleRender::new(SimpleRenderConfig::new(filter))
            .render(&container, Progress::none())?;
        tracing::info!(%filter, width = image.width(), height = image.height(), "Simple render");
    }

    let median_like = PlaneRender::new(|stack: &fusion::render::PixelStack| {
        let mut values: Vec<f32> = stack.valid_values().collect();
        values.sort_by(f32::total_cmp);
        values.get(values.len() / 2).copied()
    })
    .render(&container, Progress::none())?;
    tracing::info!(
        error = mean_error(&median_like, &scene, (0, 0)),
        "Median plane render"
    );

    let float = FloatRender::new(FloatRenderConfig::x2()).render(&container, Progress::none())?;
    tracing::info!(
        width = float.width(),
        height = float.height(),
        "Float render"
    );

    Ok(())
}
