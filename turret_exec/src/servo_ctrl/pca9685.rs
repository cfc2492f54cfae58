//! [`ServoDriver`] implementation for the PCA9685 driver

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use embedded_hal::blocking::i2c::{Write, WriteRead};
use pwm_pca9685::{Channel, Pca9685};

use super::{ServoDriver, ServoError};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of ticks in one PWM frame.
const MAX_PWM: u16 = 4096;

/// Frequency of the PCA9685's internal oscillator.
const OSC_CLOCK_HZ: f64 = 25_000_000.0;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Get the prescale register value which produces the given PWM frequency.
pub fn prescale_for_freq(pwm_freq_hz: f64) -> u8 {
    ((OSC_CLOCK_HZ / (MAX_PWM as f64 * pwm_freq_hz)) - 1.0).round() as u8
}

/// Convert a channel index from a parameter file into a PCA9685 channel.
pub fn channel_from_index(index: u8) -> Option<Channel> {
    match index {
        0 => Some(Channel::C0),
        1 => Some(Channel::C1),
        2 => Some(Channel::C2),
        3 => Some(Channel::C3),
        4 => Some(Channel::C4),
        5 => Some(Channel::C5),
        6 => Some(Channel::C6),
        7 => Some(Channel::C7),
        8 => Some(Channel::C8),
        9 => Some(Channel::C9),
        10 => Some(Channel::C10),
        11 => Some(Channel::C11),
        12 => Some(Channel::C12),
        13 => Some(Channel::C13),
        14 => Some(Channel::C14),
        15 => Some(Channel::C15),
        _ => None,
    }
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<I2C, E> ServoDriver for Pca9685<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    type Channel = Channel;

    fn set_duty_cycle(
        &mut self,
        channel: Self::Channel,
        duty_cycle: f64,
    ) -> Result<(), ServoError> {
        // If the duty cycle is out of range return an error
        if duty_cycle < 0.0 || duty_cycle > 1.0 {
            return Err(ServoError::InvalidDutyCycle);
        }

        let off_time = (duty_cycle * (MAX_PWM as f64)) as u16;

        // The pulse goes high at the start of the frame and low after the duty time
        match self
            .set_channel_on(channel, 0)
            .and_then(|_| self.set_channel_off(channel, off_time))
        {
            Ok(_) => Ok(()),
            Err(pwm_pca9685::Error::I2C(_)) => Err(ServoError::I2c),
            Err(pwm_pca9685::Error::InvalidInputData) => Err(ServoError::InvalidDutyCycle),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_prescale_for_freq() {
        // Standard 50 Hz servo frame
        assert_eq!(prescale_for_freq(50.0), 121);

        // Datasheet example of 200 Hz
        assert_eq!(prescale_for_freq(200.0), 30);
    }

    #[test]
    fn test_channel_from_index() {
        assert_eq!(channel_from_index(0), Some(Channel::C0));
        assert_eq!(channel_from_index(15), Some(Channel::C15));
        assert_eq!(channel_from_index(16), None);
    }
}
