//! Closed-loop controllers correcting pilot demands with the measured angular rates.

use crate::{Demands, VehicleState};

mod pid;
pub use pid::AngularVelocityPid;

mod rate;
pub use rate::RatePid;

mod yaw;
pub use yaw::YawPid;

/// A controller that modifies demands in place once per control cycle.
pub trait PidController {
    fn modify_demands(&mut self, state: &VehicleState, demands: &mut Demands);

    /// Called every cycle with the receiver's throttle-down condition.
    fn reset_on_inactivity(&mut self, inactive: bool);
}

impl<T: PidController + ?Sized> PidController for &mut T {
    fn modify_demands(&mut self, state: &VehicleState, demands: &mut Demands) {
        (**self).modify_demands(state, demands)
    }

    fn reset_on_inactivity(&mut self, inactive: bool) {
        (**self).reset_on_inactivity(inactive)
    }
}
