//! Parameters structure for servo control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::mech::ActId;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for servo control.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// PWM frequency the driver board is run at.
    ///
    /// Units: hertz
    pub pwm_freq_hz: f64,

    /// Configuration of each servo in the bank, one entry per actuator.
    ///
    /// An array of tables rather than a table keyed by actuator: TOML table keys are strings,
    /// so the actuator must be named in value position.
    pub servos: Vec<ServoConfig>,
}

/// Configuration of a single positional servo.
#[derive(Debug, Clone, Deserialize)]
pub struct ServoConfig {
    /// Actuator this servo drives.
    pub act_id: ActId,

    /// Index of the driver board channel the servo is wired to.
    pub channel: u8,

    /// Lowest angle the servo may be demanded to.
    ///
    /// Units: degrees
    pub min_angle_deg: f64,

    /// Highest angle the servo may be demanded to.
    ///
    /// Units: degrees
    pub max_angle_deg: f64,

    /// Pulse width which produces `min_angle_deg`.
    ///
    /// Units: seconds
    pub min_pulse_width_s: f64,

    /// Pulse width which produces `max_angle_deg`.
    ///
    /// Units: seconds
    pub max_pulse_width_s: f64,
}
