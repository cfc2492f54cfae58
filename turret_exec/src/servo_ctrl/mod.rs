//! # Servo Controller Module
//!
//! This module provides a unified servo control interface which can abstract over different types
//! of servo driver boards. Angle demands in degrees are mapped onto each servo's pulse width
//! range and converted into PWM duty cycles at the bank's drive frequency.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// [`ServoDriver`] implementation for the Adafruit PCA9685 16 channel servo driver board.
pub mod pca9685;

/// [`ServoDriver`] implementation which accepts and discards demands.
pub mod noop;

mod params;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use noop::NoopDriver;
pub use params::{Params, ServoConfig};

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::collections::HashMap;

// Internal
use eqpt_if::mech::{ActId, MechDems};
use util::maths::{clamp, lin_map};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for accessing servo driver boards.
pub trait ServoDriver {
    /// The type that the underlying driver uses for channel identification
    type Channel;

    /// Set the duty cycle of a channel.
    ///
    /// ## Arguments
    /// - `channel` - The channel to set the duty cycle for
    /// - `duty_cycle` - The duty cycle to set. Must be a value between 0.0 and 1.0. Values outside
    ///   this range will be rejected.
    fn set_duty_cycle(&mut self, channel: Self::Channel, duty_cycle: f64)
        -> Result<(), ServoError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A bank of positional servos attached to a single driver board.
pub struct ServoBank<D: ServoDriver> {
    driver: D,

    pwm_freq_hz: f64,

    servo_map: HashMap<ActId, Servo<D::Channel>>,
}

/// A single configured servo channel.
struct Servo<C> {
    channel: C,

    config: ServoConfig,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum ServoError {
    #[error("An I2C error occured")]
    I2c,

    #[error("Duty cycle must be between 0.0 and 1.0")]
    InvalidDutyCycle,

    #[error("No servo is configured for actuator {0:?}")]
    UnknownActuator(ActId),

    #[error("Channel index {0} is not valid for the servo driver")]
    InvalidChannel(u8),

    #[error("{0:?} servo angle range is empty, min_angle_deg must be below max_angle_deg")]
    InvalidAngleRange(ActId),

    #[error("Actuator {0:?} is configured more than once")]
    DuplicateActuator(ActId),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<D> ServoBank<D>
where
    D: ServoDriver,
    D::Channel: Copy,
{
    /// Create a new servo bank.
    ///
    /// ## Arguments
    /// - `driver` - An initialised [`ServoDriver`] board
    /// - `params` - A configuration for the servos managed by this bank, one entry per actuator
    /// - `channel_of` - Converts a channel index from the parameter file into the driver's own
    ///   channel type, `None` meaning the driver has no such channel.
    pub fn new<F>(driver: D, params: Params, channel_of: F) -> Result<Self, ServoError>
    where
        F: Fn(u8) -> Option<D::Channel>,
    {
        let mut servo_map = HashMap::new();

        for config in params.servos {
            if config.min_angle_deg >= config.max_angle_deg {
                return Err(ServoError::InvalidAngleRange(config.act_id));
            }

            let channel =
                channel_of(config.channel).ok_or(ServoError::InvalidChannel(config.channel))?;

            let act_id = config.act_id;

            if servo_map.insert(act_id, Servo { channel, config }).is_some() {
                return Err(ServoError::DuplicateActuator(act_id));
            }
        }

        Ok(Self {
            driver,
            pwm_freq_hz: params.pwm_freq_hz,
            servo_map,
        })
    }

    /// Get the angle range of the servo driving the given actuator, or `None` if no servo is
    /// configured for it.
    pub fn angle_range_deg(&self, act_id: ActId) -> Option<(f64, f64)> {
        self.servo_map
            .get(&act_id)
            .map(|servo| (servo.config.min_angle_deg, servo.config.max_angle_deg))
    }

    /// Set the angle of a single actuator.
    ///
    /// Demands outside the servo's angle range are capped to the range limits.
    pub fn set_angle(&mut self, act_id: ActId, angle_deg: f64) -> Result<(), ServoError> {
        let servo = self
            .servo_map
            .get(&act_id)
            .ok_or(ServoError::UnknownActuator(act_id))?;

        let angle_deg = clamp(
            &angle_deg,
            &servo.config.min_angle_deg,
            &servo.config.max_angle_deg,
        );

        // Map the angle onto the servo's pulse width range, then convert the pulse width into a
        // duty cycle at the bank's PWM frequency.
        let pulse_width_s = lin_map(
            (servo.config.min_angle_deg, servo.config.max_angle_deg),
            (servo.config.min_pulse_width_s, servo.config.max_pulse_width_s),
            angle_deg,
        );

        let duty_cycle = pulse_width_s * self.pwm_freq_hz;

        self.driver.set_duty_cycle(servo.channel, duty_cycle)
    }

    /// Actuate a full set of mechanisms demands.
    ///
    /// Demands for actuators with no configured servo are rejected before any channel is driven.
    pub fn set_dems(&mut self, dems: &MechDems) -> Result<(), ServoError> {
        for act_id in dems.pos_deg.keys() {
            if !self.servo_map.contains_key(act_id) {
                return Err(ServoError::UnknownActuator(*act_id));
            }
        }

        for (act_id, angle_deg) in &dems.pos_deg {
            self.set_angle(*act_id, *angle_deg)?;
        }

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
