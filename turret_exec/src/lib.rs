//! # Turret library.
//!
//! This library allows other crates in the workspace to access items defined inside the turret
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Camera wrapper - captures frames from a V4L2 USB camera
pub mod camera;

/// Face detector - finds face-like regions in camera frames
pub mod detector;

/// Executable parameters - settings for the turret executable itself
pub mod params;

/// Servo control module - converts angle demands into PWM duty cycles
pub mod servo_ctrl;

/// Targeting control module - converts camera frames into aim angle demands
pub mod targ_ctrl;

/// Turret controller - owns the equipment and runs targeting cycles
pub mod turret;
