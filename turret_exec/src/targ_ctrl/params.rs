//! Parameters structure for TargCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for targeting control.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Field of view of the camera about each frame axis, as `[x, y]`.
    ///
    /// Units: degrees
    pub fov_deg: [f64; 2],

    /// Pose to adopt when there is no target, as `[x, y]` angles.
    ///
    /// Units: degrees
    pub idle_angle_deg: [f64; 2],

    /// True if each frame a target is found in should be saved to the session archive with the
    /// target marked.
    pub save_snapshot: bool,
}
