//! Targeting control module
//!
//! Converts camera frames into aim angle demands. A [`TargetingSystem`] searches the scene for a
//! target and produces the pair of axis angles which would aim at it, or `None` when there is
//! nothing to aim at.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod angle_map;
mod calc_nearest;
mod params;
mod static_cam;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use angle_map::*;
pub use calc_nearest::*;
pub use params::*;
pub use static_cam::*;

use eqpt_if::cam::CaptureError;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Trait for systems which can produce an aim angle demand from the scene in front of them.
pub trait TargetingSystem {
    /// Search the scene for a target and return the angles which would aim at it.
    ///
    /// `current` is the pose the mechanics are currently aiming at, used to prefer targets near
    /// the current aim point.
    ///
    /// Returns `Ok(None)` when the scene holds no target. Equipment faults are returned as
    /// errors, never as an empty scene.
    fn search_for_target(
        &mut self,
        current: AimAngles,
    ) -> Result<Option<AimAngles>, TargCtrlError>;

    /// Get the pose to adopt when there is no target.
    ///
    /// Repeated calls with no targeting activity in between return the same pose.
    fn next_idle_angle(&self) -> AimAngles;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during TargCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum TargCtrlError {
    #[error("Could not capture a frame: {0}")]
    CaptureFailed(#[from] CaptureError),

    #[error("{0:?} axis field of view must be positive")]
    InvalidFov(Axis),

    #[error("{0:?} axis angle range is empty, the minimum must be below the maximum")]
    InvalidAngleRange(Axis),

    #[error("Could not load parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),
}
