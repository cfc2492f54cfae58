//! # Equipment interface crate.
//!
//! Provides the common equipment interfaces for the turret software. Device
//! wrappers (cameras, detectors, servo drivers) implement the capability
//! traits defined here, and control modules are written against those traits
//! rather than against any particular device.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Camera image and frame source definitions
pub mod cam;

/// Mechanisms (actuator) demand definitions
pub mod mech;

/// Visual detection definitions
pub mod vis;
