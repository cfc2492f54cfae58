//! # Mechanisms Equipment Demands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Position demands to be actuated by the servo controller
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MechDems {
    /// The demanded position of an actuator in degrees.
    pub pos_deg: HashMap<ActId, f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of all actuators available to the turret
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum ActId {
    /// Pan (horizontal) rotation axis
    Pan,

    /// Tilt (vertical) rotation axis
    Tilt,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl Default for MechDems {
    fn default() -> Self {
        let mut pos_deg = HashMap::new();

        pos_deg.insert(ActId::Pan, 0.0);
        pos_deg.insert(ActId::Tilt, 0.0);

        Self { pos_deg }
    }
}
