//! Pure dimension arithmetic, testable without any I/O.

/// Fit `(width, height)` so the longest side is at most `max_dimension`,
/// keeping the aspect ratio. Never enlarges.
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_dimension || longest == 0 {
        return (width, height);
    }
    let ratio = max_dimension as f64 / longest as f64;
    (scale_side(width, ratio), scale_side(height, ratio))
}

/// Dimensions that bring `width * height` down to at most `max_pixels`,
/// or `None` if the image is already within the ceiling.
///
/// Uses the uniform factor `sqrt(max_pixels / pixels)`. Rounding can push
/// the product over the ceiling, so the larger side is cut to the most that
/// fits beside the other one.
pub fn cap_dimensions(width: u32, height: u32, max_pixels: u64) -> Option<(u32, u32)> {
    let pixels = width as u64 * height as u64;
    if max_pixels == 0 || pixels <= max_pixels {
        return None;
    }

    let scale = (max_pixels as f64 / pixels as f64).sqrt();
    let (mut w, mut h) = (scale_side(width, scale), scale_side(height, scale));

    // Two passes: a side clamped to 1 can leave the other one still too long.
    for _ in 0..2 {
        if w as u64 * h as u64 <= max_pixels {
            break;
        }
        if w >= h {
            w = side_fitting(max_pixels, h);
        } else {
            h = side_fitting(max_pixels, w);
        }
    }
    Some((w, h))
}

fn scale_side(side: u32, factor: f64) -> u32 {
    ((side as f64 * factor).round() as u32).max(1)
}

/// Longest side that keeps `side * other <= max_pixels`, at least 1.
fn side_fitting(max_pixels: u64, other: u32) -> u32 {
    (max_pixels / other as u64).clamp(1, u32::MAX as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // fit_within
    // =========================================================================

    #[test]
    fn fit_landscape() {
        assert_eq!(fit_within(6000, 4000, 2000), (2000, 1333));
    }

    #[test]
    fn fit_portrait() {
        assert_eq!(fit_within(4000, 6000, 400), (267, 400));
    }

    #[test]
    fn fit_square() {
        assert_eq!(fit_within(3000, 3000, 400), (400, 400));
    }

    #[test]
    fn fit_never_upscales() {
        assert_eq!(fit_within(320, 240, 400), (320, 240));
        assert_eq!(fit_within(400, 100, 400), (400, 100));
    }

    #[test]
    fn fit_extreme_aspect_keeps_one_pixel() {
        assert_eq!(fit_within(10_000, 2, 400), (400, 1));
    }

    #[test]
    fn fit_zero_size_unchanged() {
        assert_eq!(fit_within(0, 0, 400), (0, 0));
    }

    // =========================================================================
    // cap_dimensions
    // =========================================================================

    #[test]
    fn cap_within_ceiling_is_none() {
        assert_eq!(cap_dimensions(4000, 2500, 10_000_000), None);
    }

    #[test]
    fn cap_exactly_at_ceiling_is_none() {
        assert_eq!(cap_dimensions(10, 10, 100), None);
        assert_eq!(cap_dimensions(5000, 2000, 10_000_000), None);
    }

    #[test]
    fn cap_one_over_ceiling_fits() {
        let (w, h) = cap_dimensions(101, 1, 100).unwrap();
        assert!(w as u64 * h as u64 <= 100);

        let (w, h) = cap_dimensions(10_000_001, 1, 10_000_000).unwrap();
        assert!(w as u64 * h as u64 <= 10_000_000);
    }

    #[test]
    fn cap_24mp_to_10mp() {
        // Rounds to 3873x2582 (10_000_086 px); the wider side is trimmed once.
        let (w, h) = cap_dimensions(6000, 4000, 10_000_000).unwrap();
        assert_eq!((w, h), (3872, 2582));
        assert!(w as u64 * h as u64 <= 10_000_000);
    }

    #[test]
    fn cap_preserves_aspect_ratio() {
        let (w, h) = cap_dimensions(8000, 2000, 1_000_000).unwrap();
        let ratio = w as f64 / h as f64;
        assert!((ratio - 4.0).abs() < 0.01, "ratio drifted: {ratio}");
    }

    #[test]
    fn cap_rounding_overshoot_trimmed() {
        // sqrt(100 / 110) * 11 = 10.49 -> 10 and * 10 = 9.53 -> 10; product 100.
        let (w, h) = cap_dimensions(11, 10, 100).unwrap();
        assert!(w as u64 * h as u64 <= 100);
    }

    #[test]
    fn cap_extreme_strip_trimmed_in_one_step() {
        assert_eq!(
            cap_dimensions(u32::MAX, 1, 10_000_000),
            Some((10_000_000, 1))
        );
        assert_eq!(
            cap_dimensions(1, u32::MAX, 10_000_000),
            Some((1, 10_000_000))
        );
    }

    #[test]
    fn cap_disabled_with_zero_ceiling() {
        assert_eq!(cap_dimensions(100, 100, 0), None);
    }
}
