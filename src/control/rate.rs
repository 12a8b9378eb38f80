use super::{AngularVelocityPid, PidController};
use crate::config::PidGains;
use crate::{Axis, Demands, VehicleState};

/// Rate-mode controller for roll and pitch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RatePid {
    pub roll: AngularVelocityPid,
    pub pitch: AngularVelocityPid,
}

impl Default for RatePid {
    fn default() -> Self {
        Self::new(PidGains::rate())
    }
}

impl RatePid {
    pub fn new(gains: PidGains) -> Self {
        Self {
            roll: AngularVelocityPid::new(gains),
            pitch: AngularVelocityPid::new(gains),
        }
    }
}

impl PidController for RatePid {
    fn modify_demands(&mut self, state: &VehicleState, demands: &mut Demands) {
        // Roll angle and roll demand are both positive for starboard down
        demands.roll = self.roll.compute(demands.roll, state.get(Axis::DPhi));

        // Pitch demand is positive for stick forward but pitch angle is positive nose up
        demands.pitch = self.pitch.compute(demands.pitch, -state.get(Axis::DTheta));
    }

    fn reset_on_inactivity(&mut self, inactive: bool) {
        self.roll.notify_inactive(inactive);
        self.pitch.notify_inactive(inactive);
    }
}
