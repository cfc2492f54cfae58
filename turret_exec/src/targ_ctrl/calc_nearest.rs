//! Selection of the detection nearest to the current aim point

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::PixelPoint;
use eqpt_if::vis::Detection;
use util::maths::norm;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Pick the detection whose centre is nearest to the given point.
///
/// Distances are euclidian distances in pixel space. When two detections are equally near the
/// earlier one in the sequence wins, keeping the choice stable for detectors with a
/// deterministic ordering. Returns `None` if the sequence is empty.
pub fn nearest_detection(detections: &[Detection], point: PixelPoint) -> Option<PixelPoint> {
    let point_coords = [point.x_px as f64, point.y_px as f64];

    let mut nearest_px: Option<PixelPoint> = None;
    let mut min_dist: Option<f64> = None;

    for detection in detections {
        let (centre_x, centre_y) = detection.centre();

        // Points are both two dimentional so norm cannot fail
        let dist = match norm(&point_coords, &[centre_x as f64, centre_y as f64]) {
            Some(d) => d,
            None => continue,
        };

        // Strictly nearer only, so the first of two equally near detections is kept
        if min_dist.map_or(true, |min| min > dist) {
            min_dist = Some(dist);
            nearest_px = Some(PixelPoint {
                x_px: centre_x,
                y_px: centre_y,
            });
        }
    }

    nearest_px
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn detection_with_centre(x_px: u32, y_px: u32) -> Detection {
        Detection {
            x: x_px.saturating_sub(5),
            y: y_px.saturating_sub(5),
            width: if x_px < 5 { 2 * x_px } else { 10 },
            height: if y_px < 5 { 2 * y_px } else { 10 },
        }
    }

    #[test]
    fn test_empty_scene() {
        assert_eq!(
            nearest_detection(&[], PixelPoint { x_px: 320, y_px: 240 }),
            None
        );
    }

    #[test]
    fn test_single_detection() {
        let detections = vec![detection_with_centre(100, 200)];

        assert_eq!(
            nearest_detection(&detections, PixelPoint { x_px: 0, y_px: 0 }),
            Some(PixelPoint { x_px: 100, y_px: 200 })
        );
    }

    #[test]
    fn test_nearest_wins() {
        let detections = vec![
            detection_with_centre(10, 10),
            detection_with_centre(50, 50),
            detection_with_centre(12, 12),
        ];

        assert_eq!(
            nearest_detection(&detections, PixelPoint { x_px: 0, y_px: 0 }),
            Some(PixelPoint { x_px: 10, y_px: 10 })
        );

        // Moving the aim point moves the selection
        assert_eq!(
            nearest_detection(&detections, PixelPoint { x_px: 60, y_px: 60 }),
            Some(PixelPoint { x_px: 50, y_px: 50 })
        );
    }

    #[test]
    fn test_equal_distance_keeps_first() {
        let detections = vec![
            detection_with_centre(10, 0),
            detection_with_centre(0, 10),
        ];

        assert_eq!(
            nearest_detection(&detections, PixelPoint { x_px: 0, y_px: 0 }),
            Some(PixelPoint { x_px: 10, y_px: 0 })
        );
    }
}
