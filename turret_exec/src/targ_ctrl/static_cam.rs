//! Implementations for the static camera targeting system

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

// Internal
use super::{
    nearest_detection, AimAngles, AngleMap, Axis, AxisConfig, Params, PixelPoint, TargCtrlError,
    TargetingSystem,
};
use eqpt_if::cam::{CamImage, FrameSource};
use eqpt_if::vis::Detector;
use util::{
    archive::{Archived, Archiver},
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Radius of the mark drawn over the target in saved snapshots.
const SNAPSHOT_MARK_RADIUS_PX: i32 = 10;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Targeting system which aims at faces found in frames from a camera fixed to the body, not to
/// the aimable mechanics.
///
/// Because the camera does not move with the mechanics the whole search happens in a single
/// frame: the current aim pose is projected into the frame, the detection nearest to it is
/// chosen, and the chosen pixel is converted back into the pose which aims at it.
pub struct StaticCamTargeting<C, D>
where
    C: FrameSource,
    D: Detector,
{
    params: Params,

    camera: C,

    detector: D,

    angle_map: AngleMap,

    report: TargetReport,
    arch_report: Archiver,

    /// Directory snapshots are saved into, or `None` if snapshots are disabled.
    snapshot_dir: Option<PathBuf>,
}

/// Status report for a single target search.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct TargetReport {
    /// Number of detections in the frame.
    num_detections: usize,

    /// Frame pixel the mechanics were aiming at when the frame was taken.
    current_x_px: u32,
    current_y_px: u32,

    /// True if a target was chosen this search.
    target_found: bool,

    /// Frame pixel of the chosen target. Zero when no target was found.
    target_x_px: u32,
    target_y_px: u32,

    /// Angles which aim at the chosen target. Zero when no target was found.
    ///
    /// Units: degrees
    target_x_angle_deg: f64,
    target_y_angle_deg: f64,

    /// True if the angle demand had to be capped to the mechanical range of the axis.
    x_angle_limited: bool,
    y_angle_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<C, D> StaticCamTargeting<C, D>
where
    C: FrameSource,
    D: Detector,
{
    /// Create a new targeting system from already loaded parameters.
    ///
    /// The camera's frame dimensions and the reachable angle range of each axis fix the pixel to
    /// angle mapping. No archiving or snapshot saving is set up, see
    /// [`StaticCamTargeting::init`].
    pub fn new(
        params: Params,
        camera: C,
        detector: D,
        x_angle_range_deg: (f64, f64),
        y_angle_range_deg: (f64, f64),
    ) -> Result<Self, TargCtrlError> {
        let (x_res_px, y_res_px) = camera.resolution();

        let angle_map = AngleMap::new(
            AxisConfig::new(
                Axis::X,
                params.fov_deg[0],
                x_angle_range_deg.0,
                x_angle_range_deg.1,
                x_res_px,
            )?,
            AxisConfig::new(
                Axis::Y,
                params.fov_deg[1],
                y_angle_range_deg.0,
                y_angle_range_deg.1,
                y_res_px,
            )?,
        );

        Ok(Self {
            params,
            camera,
            detector,
            angle_map,
            report: TargetReport::default(),
            arch_report: Archiver::default(),
            snapshot_dir: None,
        })
    }

    /// Initialise the targeting system.
    ///
    /// Loads the parameter file and attaches the session archives, including the snapshot
    /// directory if snapshot saving is enabled.
    pub fn init(
        param_file: &str,
        session: &Session,
        camera: C,
        detector: D,
        x_angle_range_deg: (f64, f64),
        y_angle_range_deg: (f64, f64),
    ) -> Result<Self, TargCtrlError> {
        let params: Params = params::load(param_file)?;

        let mut targeting = Self::new(
            params,
            camera,
            detector,
            x_angle_range_deg,
            y_angle_range_deg,
        )?;

        // Create the arch folder for targ_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("targ_ctrl");
        std::fs::create_dir_all(&arch_path).unwrap();

        // Initialise the archiver
        targeting.arch_report = Archiver::from_path(session, "targ_ctrl/target_report.csv").unwrap();

        if targeting.params.save_snapshot {
            targeting.snapshot_dir = Some(arch_path);
        }

        Ok(targeting)
    }
}

impl<C, D> TargetingSystem for StaticCamTargeting<C, D>
where
    C: FrameSource,
    D: Detector,
{
    /// Search the current frame for a target.
    fn search_for_target(
        &mut self,
        current: AimAngles,
    ) -> Result<Option<AimAngles>, TargCtrlError> {
        // Clear the status report
        self.report = TargetReport::default();

        // A failed capture must propagate, an equipment fault is not an empty scene
        let frame = self.camera.capture_frame()?;

        let detections = self.detector.detect(&frame);
        self.report.num_detections = detections.len();

        // Project the current aim pose into the frame
        let current_px = PixelPoint {
            x_px: self.angle_map.angle_to_px(Axis::X, current.x_deg),
            y_px: self.angle_map.angle_to_px(Axis::Y, current.y_deg),
        };
        self.report.current_x_px = current_px.x_px;
        self.report.current_y_px = current_px.y_px;

        let target_px = match nearest_detection(&detections, current_px) {
            Some(px) => px,
            None => {
                trace!("No targets found");
                return Ok(None);
            }
        };

        // Convert the chosen pixel back into the pose which aims at it, each axis using its own
        // field of view and mechanical range
        let (x_deg, x_limited) = self.angle_map.px_to_angle_limited(Axis::X, target_px.x_px);
        let (y_deg, y_limited) = self.angle_map.px_to_angle_limited(Axis::Y, target_px.y_px);

        if x_limited || y_limited {
            warn!(
                "Target at ({}, {}) px is outside the mechanical range, demand capped",
                target_px.x_px, target_px.y_px
            );
        }

        self.report.target_found = true;
        self.report.target_x_px = target_px.x_px;
        self.report.target_y_px = target_px.y_px;
        self.report.target_x_angle_deg = x_deg;
        self.report.target_y_angle_deg = y_deg;
        self.report.x_angle_limited = x_limited;
        self.report.y_angle_limited = y_limited;

        if let Some(dir) = &self.snapshot_dir {
            if let Err(e) = save_snapshot(dir, &frame, target_px) {
                warn!("Could not save the target snapshot: {}", e);
            }
        }

        debug!(
            "Found target at: coords ({}, {}) px, angle ({:.2}, {:.2}) deg",
            target_px.x_px, target_px.y_px, x_deg, y_deg
        );

        Ok(Some(AimAngles { x_deg, y_deg }))
    }

    fn next_idle_angle(&self) -> AimAngles {
        AimAngles {
            x_deg: self.params.idle_angle_deg[0],
            y_deg: self.params.idle_angle_deg[1],
        }
    }
}

impl<C, D> Archived for StaticCamTargeting<C, D>
where
    C: FrameSource,
    D: Detector,
{
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report)?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Save the frame to disk as a greyscale image with the chosen target marked.
fn save_snapshot(
    dir: &Path,
    frame: &CamImage,
    target_px: PixelPoint,
) -> Result<(), image::ImageError> {
    let mut snapshot = frame.image.to_luma8();
    let (width, height) = snapshot.dimensions();

    // Filled circle over the target, clipped to the frame
    for row in -SNAPSHOT_MARK_RADIUS_PX..=SNAPSHOT_MARK_RADIUS_PX {
        for col in -SNAPSHOT_MARK_RADIUS_PX..=SNAPSHOT_MARK_RADIUS_PX {
            if row * row + col * col > SNAPSHOT_MARK_RADIUS_PX * SNAPSHOT_MARK_RADIUS_PX {
                continue;
            }

            let x = target_px.x_px as i64 + col as i64;
            let y = target_px.y_px as i64 + row as i64;

            if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                snapshot.put_pixel(x as u32, y as u32, image::Luma([255u8]));
            }
        }
    }

    snapshot.save(dir.join("target.jpeg"))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;
    use eqpt_if::cam::CaptureError;
    use eqpt_if::vis::Detection;
    use image::DynamicImage;

    struct TestCamera {
        resolution_px: (u32, u32),
        fail: bool,
    }

    impl FrameSource for TestCamera {
        fn resolution(&self) -> (u32, u32) {
            self.resolution_px
        }

        fn capture_frame(&mut self) -> Result<CamImage, CaptureError> {
            if self.fail {
                return Err(CaptureError::DeviceError("no frames".into()));
            }

            Ok(CamImage {
                timestamp: Utc::now(),
                image: DynamicImage::new_luma8(self.resolution_px.0, self.resolution_px.1),
            })
        }
    }

    struct TestDetector {
        detections: Vec<Detection>,
    }

    impl Detector for TestDetector {
        fn detect(&mut self, _image: &CamImage) -> Vec<Detection> {
            self.detections.clone()
        }
    }

    fn test_params() -> Params {
        Params {
            fov_deg: [60.0, 40.0],
            idle_angle_deg: [10.0, -5.0],
            save_snapshot: false,
        }
    }

    fn test_targeting(
        detections: Vec<Detection>,
        angle_range_deg: (f64, f64),
    ) -> StaticCamTargeting<TestCamera, TestDetector> {
        StaticCamTargeting::new(
            test_params(),
            TestCamera {
                resolution_px: (640, 480),
                fail: false,
            },
            TestDetector { detections },
            angle_range_deg,
            angle_range_deg,
        )
        .unwrap()
    }

    #[test]
    fn test_search_selects_nearest() {
        // Centres at (330, 240) and (600, 100)
        let mut targeting = test_targeting(
            vec![
                Detection {
                    x: 320,
                    y: 230,
                    width: 20,
                    height: 20,
                },
                Detection {
                    x: 590,
                    y: 90,
                    width: 20,
                    height: 20,
                },
            ],
            (-90.0, 90.0),
        );

        let target = targeting
            .search_for_target(AimAngles::default())
            .unwrap()
            .unwrap();

        // (330, 240) px maps to 0.9375 deg about x, boresight about y
        assert!((target.x_deg - 0.9375).abs() < 1e-9);
        assert!(target.y_deg.abs() < 1e-9);

        assert_eq!(targeting.report.num_detections, 2);
        assert_eq!(targeting.report.current_x_px, 320);
        assert_eq!(targeting.report.current_y_px, 240);
        assert!(targeting.report.target_found);
        assert_eq!(targeting.report.target_x_px, 330);
        assert!(!targeting.report.x_angle_limited);
    }

    #[test]
    fn test_empty_scene_gives_none() {
        let mut targeting = test_targeting(vec![], (-90.0, 90.0));

        assert_eq!(targeting.search_for_target(AimAngles::default()).unwrap(), None);
        assert!(!targeting.report.target_found);
        assert_eq!(targeting.report.num_detections, 0);

        // The idle pose comes from the parameters and does not change between calls
        let idle = targeting.next_idle_angle();
        assert_eq!(idle, AimAngles { x_deg: 10.0, y_deg: -5.0 });
        assert_eq!(targeting.next_idle_angle(), idle);
    }

    #[test]
    fn test_capture_failure_is_an_error() {
        let mut targeting = StaticCamTargeting::new(
            test_params(),
            TestCamera {
                resolution_px: (640, 480),
                fail: true,
            },
            TestDetector { detections: vec![] },
            (-90.0, 90.0),
            (-90.0, 90.0),
        )
        .unwrap();

        // An equipment fault must not be reported as an empty scene
        assert!(matches!(
            targeting.search_for_target(AimAngles::default()),
            Err(TargCtrlError::CaptureFailed(_))
        ));
    }

    #[test]
    fn test_demand_capped_to_narrow_range() {
        // Mechanics which can only reach (-5, 5) deg, face at the right edge of the frame
        let mut targeting = test_targeting(
            vec![Detection {
                x: 630,
                y: 235,
                width: 10,
                height: 10,
            }],
            (-5.0, 5.0),
        );

        let target = targeting
            .search_for_target(AimAngles::default())
            .unwrap()
            .unwrap();

        assert_eq!(target.x_deg, 5.0);
        assert!(targeting.report.x_angle_limited);
        assert!(!targeting.report.y_angle_limited);
    }

    #[test]
    fn test_each_axis_converts_with_own_fov() {
        // Centre at (480, 360), three quarters along each axis
        let mut targeting = test_targeting(
            vec![Detection {
                x: 475,
                y: 355,
                width: 10,
                height: 10,
            }],
            (-90.0, 90.0),
        );

        let target = targeting
            .search_for_target(AimAngles::default())
            .unwrap()
            .unwrap();

        // x uses the 60 deg view, y must use the 40 deg one
        assert!((target.x_deg - 15.0).abs() < 1e-9);
        assert!((target.y_deg - 10.0).abs() < 1e-9);
    }
}
