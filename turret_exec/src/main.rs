//! Main turret executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all equipment and modules
//!     - Main loop:
//!         - Trigger processing
//!         - Targeting processing:
//!             - Frame capture
//!             - Face detection and target selection
//!             - Servo actuation
//!         - Cycle management
//!
//! The loop runs at a fixed period. Whether a given cycle actually performs a target search is
//! decided by the trigger source, either every cycle or on presses of the trigger button.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

#[cfg(all(feature = "mech", target_arch = "arm", target_os = "linux"))]
use turret_lib::servo_ctrl::pca9685;
#[cfg(not(all(feature = "mech", target_arch = "arm", target_os = "linux")))]
use turret_lib::servo_ctrl::NoopDriver;
use turret_lib::{
    camera::UsbCamera,
    detector::FaceDetector,
    params::{TriggerMode, TurretExecParams},
    servo_ctrl::{self, ServoBank},
    targ_ctrl::StaticCamTargeting,
    turret::Turret,
};

use eqpt_if::mech::ActId;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, warn};
#[cfg(all(feature = "mech", target_arch = "arm", target_os = "linux"))]
use pwm_pca9685::{Pca9685, SlaveAddr};
#[cfg(all(feature = "mech", target_arch = "arm", target_os = "linux"))]
use rppal::i2c::I2c;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.10;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("turret_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Turret Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: TurretExecParams = util::params::load("turret_exec.toml")
        .wrap_err("Could not load turret_exec params")?;

    let servo_params: servo_ctrl::Params = util::params::load("servo_ctrl.toml")
        .wrap_err("Could not load servo_ctrl params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE TRIGGER SOURCE ----

    let mut trigger_source = match exec_params.trigger_mode {
        TriggerMode::Periodic => {
            info!("Targeting will fire on every cycle\n");
            TriggerSource::Periodic
        }
        #[cfg(all(target_arch = "arm", target_os = "linux"))]
        TriggerMode::Button => {
            let button = ButtonInput::new(exec_params.button_pin)
                .wrap_err("Failed to initialise the trigger button")?;
            info!(
                "Targeting will fire on presses of the button on GPIO {}\n",
                exec_params.button_pin
            );
            TriggerSource::Button(button)
        }
        #[cfg(not(all(target_arch = "arm", target_os = "linux")))]
        TriggerMode::Button => {
            warn!("Button triggering is not available on this target, firing on every cycle\n");
            TriggerSource::Periodic
        }
    };

    // ---- INITIALISE SERVO BANK ----

    #[cfg(all(feature = "mech", target_arch = "arm", target_os = "linux"))]
    let servo_bank = {
        let i2c = I2c::new().wrap_err("Failed to open the I2C bus")?;

        let mut driver = Pca9685::new(i2c, SlaveAddr::default());

        driver
            .set_prescale(pca9685::prescale_for_freq(servo_params.pwm_freq_hz))
            .map_err(|e| eyre!("Failed to set the PWM prescale: {:?}", e))?;
        driver
            .enable()
            .map_err(|e| eyre!("Failed to enable the servo driver: {:?}", e))?;

        let b = ServoBank::new(driver, servo_params, pca9685::channel_from_index)
            .wrap_err("Failed to initialise the servo bank")?;
        info!("ServoBank initialised on the PCA9685");
        b
    };

    #[cfg(not(all(feature = "mech", target_arch = "arm", target_os = "linux")))]
    let servo_bank = {
        warn!("Servo hardware stack not available, demands will not be actuated");

        let b = ServoBank::new(NoopDriver::default(), servo_params, |index| Some(index))
            .wrap_err("Failed to initialise the servo bank")?;
        info!("ServoBank initialised on the noop driver");
        b
    };

    // Reachable angle ranges come from the servo configs, targeting may not demand beyond them
    let x_angle_range_deg = servo_bank
        .angle_range_deg(ActId::Pan)
        .ok_or(eyre!("No servo is configured for the Pan actuator"))?;
    let y_angle_range_deg = servo_bank
        .angle_range_deg(ActId::Tilt)
        .ok_or(eyre!("No servo is configured for the Tilt actuator"))?;

    // ---- INITIALISE CAMERA & DETECTOR ----

    let camera = UsbCamera::init(&exec_params).wrap_err("Failed to initialise the camera")?;
    info!("Camera initialised on {}", exec_params.video_device);

    let detector =
        FaceDetector::init(&exec_params).wrap_err("Failed to initialise the face detector")?;
    info!("FaceDetector initialised");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let targeting = StaticCamTargeting::init(
        "targ_ctrl.toml",
        &session,
        camera,
        detector,
        x_angle_range_deg,
        y_angle_range_deg,
    )
    .wrap_err("Failed to initialise TargCtrl")?;
    info!("TargCtrl init complete");

    let mut turret = Turret::new(servo_bank, targeting, exec_params.invert_pan)
        .wrap_err("Failed to initialise the turret")?;
    info!("Turret init complete, holding the idle pose");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut num_consec_cycle_overruns: u64 = 0;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- TRIGGER PROCESSING ----

        let fire = should_fire(&mut trigger_source);

        // ---- TARGETING PROCESSING ----

        if fire {
            match turret.proc() {
                Ok(_) => (),
                Err(e) => {
                    // Equipment faults leave the pose as it was, warn and wait for the next
                    // trigger
                    warn!("Error during targeting cycle: {}", e)
                }
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                num_consec_cycle_overruns += 1;
                warn!(
                    "Cycle overran by {:.06} s ({} consecutive overruns)",
                    cycle_dur.as_secs_f64()
                        - Duration::from_secs_f64(CYCLE_PERIOD_S).as_secs_f64(),
                    num_consec_cycle_overruns
                );
            }
        }
    }
}

/// Decide whether a targeting cycle should fire this cycle.
fn should_fire(trigger_source: &mut TriggerSource) -> bool {
    match trigger_source {
        TriggerSource::Periodic => true,

        #[cfg(all(target_arch = "arm", target_os = "linux"))]
        TriggerSource::Button(button) => button.rising_edge(),
    }
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Various sources for the trigger which fires targeting cycles.
enum TriggerSource {
    Periodic,
    #[cfg(all(target_arch = "arm", target_os = "linux"))]
    Button(ButtonInput),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Edge detecting input for the trigger button.
#[cfg(all(target_arch = "arm", target_os = "linux"))]
struct ButtonInput {
    pin: rppal::gpio::InputPin,

    was_pressed: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

#[cfg(all(target_arch = "arm", target_os = "linux"))]
impl ButtonInput {
    /// Open the button's GPIO pin as a pulled up input.
    fn new(gpio_pin: u8) -> Result<Self, rppal::gpio::Error> {
        let pin = rppal::gpio::Gpio::new()?
            .get(gpio_pin)?
            .into_input_pullup();

        Ok(Self {
            pin,
            was_pressed: false,
        })
    }

    /// True exactly once per press of the button.
    ///
    /// The button shorts the pin to ground when pressed.
    fn rising_edge(&mut self) -> bool {
        let pressed = self.pin.is_low();
        let edge = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        edge
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_periodic_trigger_fires_every_cycle() {
        let mut source = TriggerSource::Periodic;

        assert!(should_fire(&mut source));
        assert!(should_fire(&mut source));
    }
}
