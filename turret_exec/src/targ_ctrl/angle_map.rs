//! Mapping between frame pixel coordinates and mechanical axis angles

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::{Deserialize, Serialize};

// Internal
use super::TargCtrlError;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An aim attitude as a pair of axis angles.
///
/// Angles are measured from the camera boresight, so `(0, 0)` aims at the centre of the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AimAngles {
    /// Rotation about the pan axis, positive towards the right of the frame.
    ///
    /// Units: degrees
    pub x_deg: f64,

    /// Rotation about the tilt axis, positive towards the bottom of the frame.
    ///
    /// Units: degrees
    pub y_deg: f64,
}

/// A point in frame pixel coordinates, origin at the top left of the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x_px: u32,

    pub y_px: u32,
}

/// Mapping data for a single axis.
///
/// Couples the angular extent the camera sees about the axis with the angle range the mechanics
/// can actually reach, which is usually wider.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct AxisConfig {
    /// Angular extent of the camera's view about this axis.
    ///
    /// Units: degrees
    fov_deg: f64,

    /// Lowest angle the mechanics can reach on this axis.
    ///
    /// Units: degrees
    min_angle_deg: f64,

    /// Highest angle the mechanics can reach on this axis.
    ///
    /// Units: degrees
    max_angle_deg: f64,

    /// Number of pixels the frame spans on this axis.
    resolution_px: u32,
}

/// Bidirectional mapping between pixel and angle space for both axes of the frame.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct AngleMap {
    x: AxisConfig,

    y: AxisConfig,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The two aimable axes of the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal axis.
    X,

    /// Vertical axis.
    Y,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AxisConfig {
    /// Create a new axis configuration.
    ///
    /// The field of view must be positive and the mechanical angle range non-empty. A zero pixel
    /// resolution is accepted but degrades [`AngleMap::px_to_angle`], see there.
    pub fn new(
        axis: Axis,
        fov_deg: f64,
        min_angle_deg: f64,
        max_angle_deg: f64,
        resolution_px: u32,
    ) -> Result<Self, TargCtrlError> {
        if fov_deg <= 0.0 {
            return Err(TargCtrlError::InvalidFov(axis));
        }

        if min_angle_deg >= max_angle_deg {
            return Err(TargCtrlError::InvalidAngleRange(axis));
        }

        if resolution_px == 0 {
            warn!(
                "{:?} axis has a zero pixel resolution, pixel to angle conversions on it will \
                always produce the capped range span",
                axis
            );
        }

        Ok(Self {
            fov_deg,
            min_angle_deg,
            max_angle_deg,
            resolution_px,
        })
    }
}

impl AngleMap {
    /// Create a new mapping from the two axis configurations.
    pub fn new(x: AxisConfig, y: AxisConfig) -> Self {
        Self { x, y }
    }

    fn config(&self, axis: Axis) -> &AxisConfig {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    /// Convert a mechanical angle into the frame pixel coordinate a target at that angle would
    /// appear at.
    ///
    /// Angles outside the camera's view are clamped to the nearest frame edge, so the result is
    /// always within `0..=resolution_px`.
    pub fn angle_to_px(&self, axis: Axis, angle_deg: f64) -> u32 {
        let config = self.config(axis);

        let max_cam_deg = config.fov_deg / 2.0;
        let min_cam_deg = -max_cam_deg;

        let angle_deg = clamp(&angle_deg, &min_cam_deg, &max_cam_deg);

        let ratio = (angle_deg - min_cam_deg) / config.fov_deg;

        (ratio * (config.resolution_px as f64)) as u32
    }

    /// Convert a frame pixel coordinate into the mechanical angle which aims at it.
    ///
    /// The coordinate need not lie within the frame. The result is always capped to the axis's
    /// mechanical angle range.
    pub fn px_to_angle(&self, axis: Axis, px: u32) -> f64 {
        self.px_to_angle_limited(axis, px).0
    }

    /// As [`AngleMap::px_to_angle`], also returning true if the angle had to be capped to the
    /// mechanical range.
    pub fn px_to_angle_limited(&self, axis: Axis, px: u32) -> (f64, bool) {
        let config = self.config(axis);

        let angle_deg = if config.resolution_px > 0 {
            let ratio = (px as f64) / (config.resolution_px as f64);
            -config.fov_deg / 2.0 + ratio * config.fov_deg
        } else {
            // Degenerate frame, produce the range span and let the cap below reduce it to the
            // maximum reachable angle
            config.max_angle_deg - config.min_angle_deg
        };

        let capped_deg = clamp(&angle_deg, &config.min_angle_deg, &config.max_angle_deg);

        (capped_deg, capped_deg != angle_deg)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn test_map() -> AngleMap {
        AngleMap::new(
            AxisConfig::new(Axis::X, 60.0, -90.0, 90.0, 640).unwrap(),
            AxisConfig::new(Axis::Y, 40.0, -90.0, 90.0, 480).unwrap(),
        )
    }

    #[test]
    fn test_angle_to_px() {
        let map = test_map();

        // Boresight maps to the frame centre
        assert_eq!(map.angle_to_px(Axis::X, 0.0), 320);
        assert_eq!(map.angle_to_px(Axis::Y, 0.0), 240);

        // View edges map to the frame edges
        assert_eq!(map.angle_to_px(Axis::X, -30.0), 0);
        assert_eq!(map.angle_to_px(Axis::X, 30.0), 640);

        // Angles beyond the view are clamped to the frame edges
        assert_eq!(map.angle_to_px(Axis::X, -90.0), 0);
        assert_eq!(map.angle_to_px(Axis::X, 90.0), 640);

        // Fractional pixels are floored
        assert_eq!(map.angle_to_px(Axis::X, 0.01), 320);
    }

    #[test]
    fn test_px_to_angle() {
        let map = test_map();

        assert_eq!(map.px_to_angle(Axis::X, 320), 0.0);
        assert_eq!(map.px_to_angle(Axis::X, 0), -30.0);
        assert_eq!(map.px_to_angle(Axis::X, 640), 30.0);

        // Coordinates are not required to lie within the frame
        assert_eq!(map.px_to_angle_limited(Axis::X, 2000), (90.0, true));
    }

    #[test]
    fn test_axes_use_own_fov() {
        let map = test_map();

        // The same relative frame position gives a different angle on each axis as the fields of
        // view differ
        assert_eq!(map.px_to_angle(Axis::X, 480), 15.0);
        assert_eq!(map.px_to_angle(Axis::Y, 360), 10.0);
    }

    #[test]
    fn test_angle_to_px_monotonic() {
        let map = test_map();

        let mut prev_px = map.angle_to_px(Axis::X, -40.0);

        // Sweep well past both view edges, the pixel coordinate must never step backwards
        let mut angle_deg = -40.0;
        while angle_deg <= 40.0 {
            let px = map.angle_to_px(Axis::X, angle_deg);
            assert!(
                px >= prev_px,
                "pixel went backwards at {} deg: {} -> {}",
                angle_deg,
                prev_px,
                px
            );

            prev_px = px;
            angle_deg += 0.13;
        }
    }

    #[test]
    fn test_round_trip() {
        let map = test_map();

        // One pixel's angular width
        let max_err_deg = 60.0 / 640.0;

        let mut angle_deg = -30.0;
        while angle_deg <= 30.0 {
            let round_trip_deg = map.px_to_angle(Axis::X, map.angle_to_px(Axis::X, angle_deg));
            assert!(
                (round_trip_deg - angle_deg).abs() <= max_err_deg + 1e-9,
                "{} deg round tripped to {} deg",
                angle_deg,
                round_trip_deg
            );

            angle_deg += 0.37;
        }
    }

    #[test]
    fn test_demand_capped_to_mech_range() {
        let map = AngleMap::new(
            AxisConfig::new(Axis::X, 60.0, -5.0, 5.0, 640).unwrap(),
            AxisConfig::new(Axis::Y, 40.0, -5.0, 5.0, 480).unwrap(),
        );

        assert_eq!(map.px_to_angle_limited(Axis::X, 640), (5.0, true));
        assert_eq!(map.px_to_angle_limited(Axis::X, 0), (-5.0, true));
        assert_eq!(map.px_to_angle_limited(Axis::X, 320), (0.0, false));
    }

    #[test]
    fn test_degenerate_resolution() {
        let map = AngleMap::new(
            AxisConfig::new(Axis::X, 60.0, -90.0, 90.0, 0).unwrap(),
            AxisConfig::new(Axis::Y, 40.0, -45.0, 45.0, 0).unwrap(),
        );

        // All angles collapse onto pixel zero
        assert_eq!(map.angle_to_px(Axis::X, 15.0), 0);

        // Pixel to angle produces the range span, capped to the reachable maximum
        assert_eq!(map.px_to_angle_limited(Axis::X, 320), (90.0, true));
        assert_eq!(map.px_to_angle_limited(Axis::Y, 240), (45.0, true));
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            AxisConfig::new(Axis::X, 0.0, -90.0, 90.0, 640),
            Err(TargCtrlError::InvalidFov(Axis::X))
        ));
        assert!(matches!(
            AxisConfig::new(Axis::Y, -10.0, -90.0, 90.0, 640),
            Err(TargCtrlError::InvalidFov(Axis::Y))
        ));
        assert!(matches!(
            AxisConfig::new(Axis::X, 60.0, 90.0, -90.0, 640),
            Err(TargCtrlError::InvalidAngleRange(Axis::X))
        ));
        assert!(matches!(
            AxisConfig::new(Axis::X, 60.0, 45.0, 45.0, 640),
            Err(TargCtrlError::InvalidAngleRange(Axis::X))
        ));
    }
}
