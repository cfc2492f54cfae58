//! [`ServoDriver`] implementation which accepts and discards demands
//!
//! Used in place of the real driver board when the servo hardware stack is not available, so that
//! the rest of the software can run unchanged on a desk.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;

use super::{ServoDriver, ServoError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Driver which performs no hardware access.
///
/// Demands are validated exactly as a real driver would validate them, then dropped.
#[derive(Default)]
pub struct NoopDriver;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ServoDriver for NoopDriver {
    type Channel = u8;

    fn set_duty_cycle(
        &mut self,
        channel: Self::Channel,
        duty_cycle: f64,
    ) -> Result<(), ServoError> {
        if duty_cycle < 0.0 || duty_cycle > 1.0 {
            return Err(ServoError::InvalidDutyCycle);
        }

        trace!("Channel {} duty cycle set to {:.4}", channel, duty_cycle);

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_duty_cycle_range() {
        let mut driver = NoopDriver::default();

        assert!(driver.set_duty_cycle(0, 0.0).is_ok());
        assert!(driver.set_duty_cycle(0, 1.0).is_ok());
        assert!(matches!(
            driver.set_duty_cycle(0, 1.5),
            Err(ServoError::InvalidDutyCycle)
        ));
        assert!(matches!(
            driver.set_duty_cycle(0, -0.1),
            Err(ServoError::InvalidDutyCycle)
        ));
    }
}
