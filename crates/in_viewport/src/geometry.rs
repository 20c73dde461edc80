//! Bounding-box viewport test.

use crate::options::Tolerance;
use common::Rect;

/// Whether `bounding_box` overlaps the viewport grown by `tolerance`.
///
/// The accepted region is `[-left, width + right] x [-top, height + bottom]`,
/// edges included. A box with a non-finite coordinate or negative extent is
/// never intersecting.
pub fn is_intersecting(bounding_box: &Rect, viewport_height: f64, viewport_width: f64, tolerance: &Tolerance) -> bool {
    if !bounding_box.is_well_formed() {
        return false;
    }

    bounding_box.bottom() >= -tolerance.top
        && bounding_box.right() >= -tolerance.left
        && bounding_box.top() <= viewport_height + tolerance.bottom
        && bounding_box.left() <= viewport_width + tolerance.right
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: f64 = 800.0;
    const H: f64 = 600.0;

    fn boxed(top: f64, right: f64, bottom: f64, left: f64) -> Rect {
        Rect::from_edges(top, right, bottom, left)
    }

    #[test]
    fn test_inside_is_intersecting() {
        let zero = Tolerance::ZERO;
        for rect in [
            boxed(0.0, W, H, 0.0),
            boxed(10.0, 110.0, 60.0, 10.0),
            boxed(H, W, H, W),
            boxed(0.0, 0.0, 0.0, 0.0),
        ] {
            assert!(is_intersecting(&rect, H, W, &zero), "{rect:?}");
        }
    }

    #[test]
    fn test_outside_is_not_intersecting() {
        let tolerance = Tolerance::all(20.0);
        for rect in [
            boxed(-100.0, 100.0, -21.0, 0.0),
            boxed(H + 21.0, 100.0, H + 100.0, 0.0),
            boxed(0.0, -21.0, 100.0, -100.0),
            boxed(0.0, W + 100.0, 100.0, W + 21.0),
        ] {
            assert!(!is_intersecting(&rect, H, W, &tolerance), "{rect:?}");
        }
    }

    #[test]
    fn test_partial_overlap() {
        assert!(is_intersecting(&boxed(-50.0, 100.0, 10.0, 0.0), H, W, &Tolerance::ZERO));
        assert!(is_intersecting(&boxed(590.0, 100.0, 700.0, 0.0), H, W, &Tolerance::ZERO));
    }

    #[test]
    fn test_tolerance_is_monotonic() {
        let rects = [
            boxed(-40.0, 100.0, -10.0, 0.0),
            boxed(610.0, 100.0, 650.0, 0.0),
            boxed(0.0, -5.0, 10.0, -50.0),
            boxed(0.0, 900.0, 10.0, 805.0),
            boxed(100.0, 200.0, 200.0, 100.0),
        ];

        for rect in rects {
            let mut previous = false;
            for step in 0..=10 {
                let now = is_intersecting(&rect, H, W, &Tolerance::all(step as f64 * 5.0));
                assert!(!(previous && !now), "{rect:?} lost visibility at step {step}");
                previous = now;
            }
        }
    }

    #[test]
    fn test_negative_tolerance_shrinks() {
        let rect = boxed(590.0, 100.0, 650.0, 0.0);
        assert!(is_intersecting(&rect, H, W, &Tolerance::ZERO));
        assert!(!is_intersecting(&rect, H, W, &Tolerance::new(0.0, 0.0, -20.0, 0.0)));
    }

    #[test]
    fn test_malformed_box() {
        assert!(!is_intersecting(&Rect::new(f64::NAN, 0.0, 10.0, 10.0), H, W, &Tolerance::ZERO));
        assert!(!is_intersecting(&boxed(50.0, 10.0, 40.0, 0.0), H, W, &Tolerance::ZERO));
    }
}
