//! # Turret controller
//!
//! Owns the targeting system and the servo bank and runs targeting cycles: search for a target,
//! then point at it, or at the idle pose when the scene is empty.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use std::collections::HashMap;

// Internal
use crate::servo_ctrl::{ServoBank, ServoDriver, ServoError};
use crate::targ_ctrl::{AimAngles, TargCtrlError, TargetingSystem};
use eqpt_if::mech::{ActId, MechDems};
use util::archive::Archived;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The turret itself, a targeting system plus the mechanics to point it.
pub struct Turret<D, T>
where
    D: ServoDriver,
    T: TargetingSystem + Archived,
{
    servo_bank: ServoBank<D>,

    targeting: T,

    invert_pan: bool,

    /// Pose the turret is aiming at, in targeting space before any pan inversion.
    current_angles: AimAngles,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during turret operation.
#[derive(Debug, thiserror::Error)]
pub enum TurretError {
    #[error("Targeting failed: {0}")]
    Targeting(#[from] TargCtrlError),

    #[error("Could not actuate the servos: {0}")]
    Actuation(#[from] ServoError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<D, T> Turret<D, T>
where
    D: ServoDriver,
    D::Channel: Copy,
    T: TargetingSystem + Archived,
{
    /// Create a new turret and move it to the idle pose, so that it starts each session from a
    /// known attitude.
    pub fn new(
        servo_bank: ServoBank<D>,
        targeting: T,
        invert_pan: bool,
    ) -> Result<Self, TurretError> {
        let mut turret = Self {
            servo_bank,
            targeting,
            invert_pan,
            current_angles: AimAngles::default(),
        };

        let idle = turret.targeting.next_idle_angle();
        turret.point_to(idle)?;

        Ok(turret)
    }

    /// Get the pose the turret is currently aiming at.
    pub fn current_angles(&self) -> AimAngles {
        self.current_angles
    }

    /// Run one targeting cycle.
    ///
    /// Searches for a target and points at it, or at the idle pose when there is none. If the
    /// search or the actuation fails the stored pose is left untouched.
    pub fn proc(&mut self) -> Result<(), TurretError> {
        let search_result = self.targeting.search_for_target(self.current_angles);

        // Archive the search whatever its outcome
        if let Err(e) = self.targeting.write() {
            warn!("Could not write the targeting archives: {}", e);
        }

        match search_result? {
            Some(angles) => {
                debug!(
                    "Targeting angle: ({:.2}, {:.2}) deg",
                    angles.x_deg, angles.y_deg
                );
                self.point_to(angles)?;
            }
            None => {
                let idle = self.targeting.next_idle_angle();
                debug!(
                    "No target found, moving to idle angle ({:.2}, {:.2}) deg",
                    idle.x_deg, idle.y_deg
                );
                self.point_to(idle)?;
            }
        }

        Ok(())
    }

    /// Point the mechanics at the given pose.
    ///
    /// The pan demand is sign-inverted here when the servo mounting requires it. The stored pose
    /// stays in targeting space so that searches always see uninverted angles.
    fn point_to(&mut self, angles: AimAngles) -> Result<(), TurretError> {
        let pan_deg = if self.invert_pan {
            -angles.x_deg
        } else {
            angles.x_deg
        };

        let mut dems = MechDems {
            pos_deg: HashMap::new(),
        };
        dems.pos_deg.insert(ActId::Pan, pan_deg);
        dems.pos_deg.insert(ActId::Tilt, angles.y_deg);

        self.servo_bank.set_dems(&dems)?;

        self.current_angles = angles;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::servo_ctrl::{Params, ServoConfig};
    use eqpt_if::cam::CaptureError;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    /// Driver which records duty cycle demands into a shared list.
    struct SharedRecordingDriver {
        duties: Rc<RefCell<Vec<(u8, f64)>>>,
    }

    impl ServoDriver for SharedRecordingDriver {
        type Channel = u8;

        fn set_duty_cycle(&mut self, channel: u8, duty_cycle: f64) -> Result<(), ServoError> {
            self.duties.borrow_mut().push((channel, duty_cycle));
            Ok(())
        }
    }

    struct ScriptedTargeting {
        results: VecDeque<Result<Option<AimAngles>, TargCtrlError>>,
        idle: AimAngles,
    }

    impl TargetingSystem for ScriptedTargeting {
        fn search_for_target(
            &mut self,
            _current: AimAngles,
        ) -> Result<Option<AimAngles>, TargCtrlError> {
            self.results.pop_front().unwrap_or(Ok(None))
        }

        fn next_idle_angle(&self) -> AimAngles {
            self.idle
        }
    }

    impl Archived for ScriptedTargeting {
        fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
    }

    fn test_bank(
        duties: &Rc<RefCell<Vec<(u8, f64)>>>,
    ) -> ServoBank<SharedRecordingDriver> {
        let mut servos = Vec::new();

        for (act_id, channel) in [(ActId::Pan, 0u8), (ActId::Tilt, 1u8)].iter() {
            servos.push(ServoConfig {
                act_id: *act_id,
                channel: *channel,
                min_angle_deg: -90.0,
                max_angle_deg: 90.0,
                min_pulse_width_s: 0.0005,
                max_pulse_width_s: 0.0025,
            });
        }

        ServoBank::new(
            SharedRecordingDriver {
                duties: Rc::clone(duties),
            },
            Params {
                pwm_freq_hz: 50.0,
                servos,
            },
            |index| Some(index),
        )
        .unwrap()
    }

    /// Duty cycle the test bank produces for an angle.
    fn duty_for(angle_deg: f64) -> f64 {
        (0.0005 + ((angle_deg + 90.0) / 180.0) * 0.002) * 50.0
    }

    fn last_duty_for_channel(duties: &Rc<RefCell<Vec<(u8, f64)>>>, channel: u8) -> f64 {
        duties
            .borrow()
            .iter()
            .rev()
            .find(|(c, _)| *c == channel)
            .unwrap()
            .1
    }

    #[test]
    fn test_new_adopts_idle_pose() {
        let duties = Rc::new(RefCell::new(Vec::new()));

        let turret = Turret::new(
            test_bank(&duties),
            ScriptedTargeting {
                results: VecDeque::new(),
                idle: AimAngles::default(),
            },
            false,
        )
        .unwrap();

        assert_eq!(turret.current_angles(), AimAngles::default());
        assert_eq!(duties.borrow().len(), 2);
        assert!((last_duty_for_channel(&duties, 0) - duty_for(0.0)).abs() < 1e-9);
        assert!((last_duty_for_channel(&duties, 1) - duty_for(0.0)).abs() < 1e-9);
    }

    #[test]
    fn test_proc_points_at_target() {
        let duties = Rc::new(RefCell::new(Vec::new()));

        let mut results = VecDeque::new();
        results.push_back(Ok(Some(AimAngles {
            x_deg: 30.0,
            y_deg: 10.0,
        })));

        let mut turret = Turret::new(
            test_bank(&duties),
            ScriptedTargeting {
                results,
                idle: AimAngles::default(),
            },
            true,
        )
        .unwrap();

        turret.proc().unwrap();

        // The stored pose stays in targeting space
        assert_eq!(
            turret.current_angles(),
            AimAngles {
                x_deg: 30.0,
                y_deg: 10.0
            }
        );

        // The pan servo sees the inverted demand, the tilt servo the plain one
        assert!((last_duty_for_channel(&duties, 0) - duty_for(-30.0)).abs() < 1e-9);
        assert!((last_duty_for_channel(&duties, 1) - duty_for(10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_proc_idles_when_no_target() {
        let duties = Rc::new(RefCell::new(Vec::new()));

        let mut results = VecDeque::new();
        results.push_back(Ok(None));

        let idle = AimAngles {
            x_deg: 5.0,
            y_deg: -5.0,
        };

        let mut turret = Turret::new(
            test_bank(&duties),
            ScriptedTargeting { results, idle },
            false,
        )
        .unwrap();

        turret.proc().unwrap();

        assert_eq!(turret.current_angles(), idle);
        assert!((last_duty_for_channel(&duties, 0) - duty_for(5.0)).abs() < 1e-9);
        assert!((last_duty_for_channel(&duties, 1) - duty_for(-5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_proc_error_holds_pose() {
        let duties = Rc::new(RefCell::new(Vec::new()));

        let mut results = VecDeque::new();
        results.push_back(Err(TargCtrlError::CaptureFailed(
            CaptureError::DeviceError("no frames".into()),
        )));

        let mut turret = Turret::new(
            test_bank(&duties),
            ScriptedTargeting {
                results,
                idle: AimAngles::default(),
            },
            false,
        )
        .unwrap();

        let demands_after_init = duties.borrow().len();

        assert!(turret.proc().is_err());

        // The pose and the servos are left exactly as they were
        assert_eq!(turret.current_angles(), AimAngles::default());
        assert_eq!(duties.borrow().len(), demands_after_init);
    }
}
