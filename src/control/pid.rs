use crate::config::{PidGains, BIG_DEGREES_PER_SECOND, WINDUP_MAX};
use crate::filter::constrain_abs;
use num_traits::Float;

/// PID controller on one angular-velocity axis.
///
/// The derivative acts on the measured rate rather than the error,
/// so steps in the demand do not kick the output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngularVelocityPid {
    pub gains: PidGains,
    windup_max: f32,
    /// Angular rate (in radians/second) above which the integral is dropped.
    big_angular_velocity: f32,
    integral: f32,
    last_measured: f32,
}

impl AngularVelocityPid {
    pub fn new(gains: PidGains) -> Self {
        Self::with_windup(gains, WINDUP_MAX)
    }

    pub fn with_windup(gains: PidGains, windup_max: f32) -> Self {
        Self {
            gains,
            windup_max,
            big_angular_velocity: BIG_DEGREES_PER_SECOND.to_radians(),
            integral: 0.,
            last_measured: 0.,
        }
    }

    /// Correct `demand` using the `measured` angular rate (in radians/second).
    pub fn compute(&mut self, demand: f32, measured: f32) -> f32 {
        // Don't accumulate through fast maneuvers or upset recovery
        if measured.abs() > self.big_angular_velocity {
            self.reset();
        }

        let error = demand - measured;
        self.integral = constrain_abs(self.integral + error, self.windup_max);

        let derivative = self.last_measured - measured;
        self.last_measured = measured;

        self.gains.kp * error + self.gains.ki * self.integral + self.gains.kd * derivative
    }

    /// Drop the integral while the vehicle is inactive (e.g. throttle down).
    pub fn notify_inactive(&mut self, inactive: bool) {
        if inactive {
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.integral = 0.;
    }

    pub fn integral(&self) -> f32 {
        self.integral
    }

    pub fn windup_max(&self) -> f32 {
        self.windup_max
    }
}
