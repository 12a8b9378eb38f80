use super::{AngularVelocityPid, PidController};
use crate::config::{PidGains, BIG_YAW_DEMAND};
use crate::filter::constrain_abs;
use crate::{Axis, Demands, VehicleState};
use num_traits::Float;

/// Rate-mode controller for yaw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct YawPid {
    pub pid: AngularVelocityPid,
}

impl Default for YawPid {
    fn default() -> Self {
        Self::new(PidGains::yaw())
    }
}

impl YawPid {
    /// Create a yaw controller. Yaw runs without a derivative term.
    pub fn new(gains: PidGains) -> Self {
        Self {
            pid: AngularVelocityPid::new(PidGains { kd: 0., ..gains }),
        }
    }
}

impl PidController for YawPid {
    fn modify_demands(&mut self, state: &VehicleState, demands: &mut Demands) {
        let demand = demands.yaw;
        let corrected = self.pid.compute(-demand, -state.get(Axis::DPsi));

        // Prevent yaw jump during correction
        demands.yaw = constrain_abs(corrected, 0.1 + demand.abs());

        if demands.yaw.abs() > BIG_YAW_DEMAND {
            self.pid.reset();
        }
    }

    fn reset_on_inactivity(&mut self, inactive: bool) {
        self.pid.notify_inactive(inactive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn derivative_is_disabled() {
        let yaw = YawPid::new(PidGains::new(1., 1., 5.));
        assert_eq!(yaw.pid.gains.kd, 0.);
    }

    #[test]
    fn correction_is_limited_near_demand() {
        let mut yaw = YawPid::new(PidGains::new(10., 0., 0.));
        let mut state = VehicleState::default();
        state.set(Axis::DPsi, 0.05);

        let mut demands = Demands::new(0., 0., 0., 0.02);
        yaw.modify_demands(&state, &mut demands);

        // 10 * (-0.02 + 0.05) = 0.3, limited to 0.1 + 0.02
        assert_abs_diff_eq!(demands.yaw, 0.12, epsilon = 1e-6);
    }

    #[test]
    fn large_corrected_yaw_resets_integral() {
        let mut yaw = YawPid::new(PidGains::new(0., 0.01, 0.));
        let state = VehicleState::default();

        let mut demands = Demands::new(0., 0., 0., 0.5);
        yaw.modify_demands(&state, &mut demands);
        // Small correction keeps the integral
        assert_abs_diff_eq!(yaw.pid.integral(), -0.5);

        let mut yaw = YawPid::new(PidGains::new(1., 0.01, 0.));
        let mut demands = Demands::new(0., 0., 0., 0.5);
        yaw.modify_demands(&state, &mut demands);
        assert!(demands.yaw.abs() > BIG_YAW_DEMAND);
        assert_eq!(yaw.pid.integral(), 0.);
    }

    #[test]
    fn small_corrected_yaw_keeps_integral() {
        let mut yaw = YawPid::new(PidGains::new(0.1, 0.01, 0.));
        let state = VehicleState::default();
        let mut demands = Demands::new(0., 0., 0., 0.05);
        yaw.modify_demands(&state, &mut demands);
        assert!(demands.yaw.abs() <= BIG_YAW_DEMAND);
        assert_abs_diff_eq!(yaw.pid.integral(), -0.05);
    }
}
