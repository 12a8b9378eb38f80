//! Build-time configuration.
//!
//! Everything here is fixed once the vehicle is built; the control cycle
//! never mutates it.

/// Roll and pitch must both be within this many degrees of level to arm.
pub const MAX_ARMING_ANGLE_DEGREES: f32 = 25.;

/// Angular rate (degrees/second) above which a rate PID drops its integral.
pub const BIG_DEGREES_PER_SECOND: f32 = 40.;

/// Maximum magnitude of a rate PID integral accumulator.
pub const WINDUP_MAX: f32 = 6.;

/// Corrected yaw demand above which the yaw integral is reset.
pub const BIG_YAW_DEMAND: f32 = 0.1;

/// Maximum number of motors a mixer table may describe.
pub const MAX_MOTORS: usize = 20;

/// Number of receiver channels read by the stick curve.
pub const RC_CHANNELS: usize = 6;

/// Stick centre pulse width (microseconds).
pub const MID_RC: u16 = 1490;

/// Lowest and highest pulse widths (microseconds) mapped by the throttle curve.
pub const MIN_PULSE: u16 = 1000;
pub const MAX_PULSE: u16 = 2000;

/// Below this pulse width a stick is considered low (throttle down).
pub const MIN_CHECK: u16 = 1100;

/// Above this pulse width a stick is considered high.
pub const MAX_CHECK: u16 = 1900;

/// Aux1 pulse width above which the arming switch is in the armed position.
pub const ARMING_SWITCH_PULSE: u16 = 1500;

/// Aux2 thresholds splitting the three-position mode switch.
pub const AUX_LOW_PULSE: u16 = 1300;
pub const AUX_HIGH_PULSE: u16 = 1700;

/// Change (microseconds) between cycles that counts as stick movement.
pub const STICK_NOISE: u16 = 3;

/// Cycles a stick combination must be held before it fires.
pub const COMBO_HOLD_CYCLES: u8 = 20;

/// Rate (in hz) of the ground-station serial task.
pub const SERIAL_TASK_HZ: f32 = 66.;

/// Standard gravity in m/s^2.
pub const GRAVITY: f32 = 9.80665;

/// Gain triple for one PID axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl PidGains {
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self { kp, ki, kd }
    }

    /// Default gains for the roll and pitch rate controllers.
    pub const fn rate() -> Self {
        Self::new(0.225, 0.001875, 0.375)
    }

    /// Default gains for the yaw rate controller.
    pub const fn yaw() -> Self {
        Self::new(2.0, 0.1, 0.)
    }
}

/// Stick shaping factors, all in unit range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StickConfig {
    /// Nonlinearity near centre stick for roll, pitch and yaw.
    pub expo: f32,
    /// Overall roll, pitch and yaw gain at full deflection.
    pub rate: f32,
    /// Throttle value at mid stick.
    pub throttle_mid: f32,
    /// Throttle nonlinearity around `throttle_mid`.
    pub throttle_expo: f32,
}

impl Default for StickConfig {
    fn default() -> Self {
        Self {
            expo: 0.65,
            rate: 0.90,
            throttle_mid: 0.50,
            throttle_expo: 0.,
        }
    }
}

/// Vertical motion estimator tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EstimatorConfig {
    /// Cutoff frequency (in hz) of the vertical acceleration low-pass filter.
    pub lpf_cutoff: f32,
    /// Complementary filter factor applied to raw accelerometer samples.
    pub lpf_factor: f32,
    /// Vertical acceleration (in g) treated as zero when integrating.
    pub deadband: f32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            lpf_cutoff: 5.,
            lpf_factor: 0.25,
            deadband: 0.02,
        }
    }
}
