//! # Turret Executable Parameters
//!
//! This module provides the parameters for the turret executable itself. Parameters for the
//! control modules live in their own files.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Turret executable parameters.
#[derive(Clone, Serialize, Deserialize)]
pub struct TurretExecParams {
    /// Path to the V4L2 device to capture frames from, for example `/dev/video0`.
    pub video_device: String,

    /// Resolution to request from the camera as `[width, height]` in pixels.
    pub camera_resolution_px: [u32; 2],

    /// Frame interval to request from the camera as a fraction of a second, for example `[1, 30]`
    /// for 30 frames per second.
    pub camera_frame_interval: [u32; 2],

    /// Path to the face detection model file.
    pub detector_model_path: String,

    /// Minimum face size (in pixels) the detector will report.
    pub detector_min_face_size_px: u32,

    /// Minimum detector confidence score for a detection to be kept.
    pub detector_score_thresh: f64,

    /// Scale factor between levels of the detector's image pyramid, in (0, 1).
    pub detector_pyramid_scale_factor: f32,

    /// Detector sliding window step in `[x, y]` pixels.
    pub detector_slide_window_step_px: [u32; 2],

    /// Source of the trigger which fires targeting cycles.
    pub trigger_mode: TriggerMode,

    /// GPIO pin the trigger button is wired to. Only used when `trigger_mode` is `"Button"`.
    pub button_pin: u8,

    /// True if the pan demand must be sign-inverted to match the servo mounting.
    pub invert_pan: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible sources of the trigger which fires targeting cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerMode {
    /// Fire a targeting cycle on every cycle of the main loop.
    Periodic,

    /// Fire a targeting cycle on each press of the trigger button.
    Button,
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    use eqpt_if::mech::ActId;

    /// Every parameter file shipped in `params/` must deserialise into its structure.
    #[test]
    fn test_load_shipped_param_files() {
        // The loader resolves files relative to the software root, point it at the repository
        std::env::set_var(
            util::host::SW_ROOT_ENV_VAR,
            concat!(env!("CARGO_MANIFEST_DIR"), "/.."),
        );

        let exec_params: TurretExecParams = util::params::load("turret_exec.toml").unwrap();
        assert_eq!(exec_params.trigger_mode, TriggerMode::Periodic);
        assert_eq!(exec_params.camera_resolution_px, [640, 480]);

        let servo_params: crate::servo_ctrl::Params =
            util::params::load("servo_ctrl.toml").unwrap();
        assert_eq!(servo_params.servos.len(), 2);
        assert!(servo_params
            .servos
            .iter()
            .any(|servo| servo.act_id == ActId::Pan && servo.channel == 0));
        assert!(servo_params
            .servos
            .iter()
            .any(|servo| servo.act_id == ActId::Tilt && servo.channel == 1));

        let targ_params: crate::targ_ctrl::Params = util::params::load("targ_ctrl.toml").unwrap();
        assert_eq!(targ_params.idle_angle_deg, [0.0, 0.0]);
        assert!(targ_params.fov_deg[0] > 0.0 && targ_params.fov_deg[1] > 0.0);
    }
}
