use super::*;

fn gradient(width: usize, height: usize) -> Plane {
    let pixels = (0..width * height)
        .map(|i| (i % width) as f32 / width as f32)
        .collect();
    Plane::from_pixels(width, height, pixels)
}

#[test]
fn test_new_plane_is_black() {
    let plane = Plane::new(Size::new(3, 2));
    assert_eq!(plane.size(), Size::new(3, 2));
    assert!(plane.pixels().iter().all(|&v| v == color::BLACK));
}

#[test]
fn test_default_plane_is_empty_placeholder() {
    assert!(Plane::default().is_empty());
    assert!(!Plane::new(Size::new(1, 1)).is_empty());
}

#[test]
fn test_sample_outside_is_none() {
    let plane = Plane::filled(Size::new(2, 2), 0.5);
    assert_eq!(plane.sample(1, 1), Some(0.5));
    assert_eq!(plane.sample(-1, 0), None);
    assert_eq!(plane.sample(0, 2), None);
}

#[test]
fn test_crop_is_clipped_to_bounds() {
    let plane = gradient(4, 4);
    let cropped = plane.crop((2, 3), Size::new(5, 5));
    assert_eq!(cropped.size(), Size::new(2, 1));
    assert_eq!(cropped[(0, 0)], plane[(2, 3)]);
}

#[test]
fn test_scale_to_same_size_is_identity() {
    let plane = gradient(5, 3);
    assert_eq!(plane.scale(plane.size(), ScalingFunction::Cubic), plane);
}

#[test]
fn test_scale_constant_plane_stays_constant() {
    let plane = Plane::filled(Size::new(4, 3), 0.25);
    for function in [
        ScalingFunction::Nearest,
        ScalingFunction::Linear,
        ScalingFunction::Cubic,
        ScalingFunction::Spline,
    ] {
        let up = plane.scale(Size::new(9, 7), function);
        assert_eq!(up.size(), Size::new(9, 7));
        assert!(
            up.pixels().iter().all(|&v| (v - 0.25).abs() < 1e-5),
            "{function} changed a constant plane"
        );
        let down = plane.scale(Size::new(2, 1), function);
        assert!(down.pixels().iter().all(|&v| (v - 0.25).abs() < 1e-5));
    }
}

#[test]
fn test_nearest_upscale_duplicates_samples() {
    let plane = Plane::from_pixels(2, 1, vec![0.0, 1.0]);
    let up = plane.scale(Size::new(4, 1), ScalingFunction::Nearest);
    assert_eq!(up.pixels(), &[0.0, 0.0, 1.0, 1.0]);
}

#[test]
fn test_scale_factor_rounds_target_size() {
    let plane = gradient(5, 5);
    let half = plane.scale_factor(DVec2::splat(0.5), ScalingFunction::Linear);
    assert_eq!(half.size(), Size::new(3, 3));
}

#[test]
#[should_panic(expected = "scale factor must be positive")]
fn test_scale_factor_rejects_zero() {
    gradient(2, 2).scale_factor(DVec2::new(0.0, 1.0), ScalingFunction::Cubic);
}

#[test]
fn test_scaled_values_stay_in_range() {
    let plane = Plane::from_pixels(4, 1, vec![0.0, 1.0, 0.0, 1.0]);
    let up = plane.scale(Size::new(16, 1), ScalingFunction::Cubic);
    assert!(up.pixels().iter().all(|&v| (0.0..=1.0).contains(&v)));
}

#[test]
fn test_spline_kernel_shape() {
    assert!((spline(0.0) - 2.0 / 3.0).abs() < 1e-12);
    assert!((spline(1.0) - 1.0 / 6.0).abs() < 1e-12);
    assert_eq!(spline(2.0), 0.0);
    assert_eq!(spline(-2.5), 0.0);

    // Continuous and non-negative on [0, 2)
    let mut previous = spline(0.0);
    for i in 1..200 {
        let x = i as f64 * 0.01;
        let value = spline(x);
        assert!(value >= 0.0, "negative weight at {x}");
        assert!((value - previous).abs() < 0.02, "jump at {x}");
        previous = value;
    }
    assert!((spline(1.0 - 1e-9) - spline(1.0)).abs() < 1e-6);
    assert!(spline(2.0 - 1e-9).abs() < 1e-6);
}

#[test]
fn test_catmull_rom_interpolates() {
    assert!((catmull_rom(0.0) - 1.0).abs() < 1e-12);
    assert!(catmull_rom(1.0).abs() < 1e-12);
    assert!(catmull_rom(1.5) < 0.0);
    assert_eq!(catmull_rom(2.0), 0.0);
}

#[test]
fn test_copy_region_into_larger_plane() {
    let src = Plane::filled(Size::new(2, 2), 1.0);
    let mut dst = Plane::new(Size::new(3, 3));
    dst.copy_region(&src, (0, 0), Size::new(2, 2), (1, 0));
    assert_eq!(dst.row(0), &[0.0, 1.0, 1.0]);
    assert_eq!(dst.row(2), &[0.0, 0.0, 0.0]);
}
