//! Distribution of demands across the motors.

use crate::config::MAX_MOTORS;
use crate::hal::Motors;
use crate::Demands;
use nalgebra::Vector4;

mod quad;
pub use quad::QUAD_X_MW;

/// Per-motor weights for the throttle, roll, pitch and yaw demands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorMix {
    pub throttle: i8,
    pub roll: i8,
    pub pitch: i8,
    pub yaw: i8,
}

impl MotorMix {
    pub const fn new(throttle: i8, roll: i8, pitch: i8, yaw: i8) -> Self {
        Self {
            throttle,
            roll,
            pitch,
            yaw,
        }
    }

    pub fn factor(&self) -> Vector4<f32> {
        Vector4::new(
            self.throttle as f32,
            self.roll as f32,
            self.pitch as f32,
            self.yaw as f32,
        )
    }
}

/// Maps demands to `N` motors through a fixed [`MotorMix`] table.
pub struct Mixer<M, const N: usize> {
    motors: M,
    table: [MotorMix; N],
    /// Last value written to each motor
    previous: [f32; N],
    /// Bench-test values written while disarmed
    disarmed: [f32; N],
}

impl<M, const N: usize> Mixer<M, N>
where
    M: Motors,
{
    const VALID_MOTOR_COUNT: () = assert!(N > 0 && N <= MAX_MOTORS, "unsupported motor count");

    pub fn new(motors: M, table: [MotorMix; N]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_MOTOR_COUNT;

        Self {
            motors,
            table,
            previous: [0.; N],
            disarmed: [0.; N],
        }
    }

    pub fn begin(&mut self) {
        self.motors.begin();
    }

    /// Mix `demands` and write the resulting motor values, returned in motor order.
    ///
    /// If any motor would exceed full output every motor is lowered by the same
    /// amount, keeping the differences that carry the attitude correction.
    pub fn run(&mut self, demands: Demands) -> [f32; N] {
        // Map throttle demand from [-1, 1] to [0, 1]
        let demands = Demands {
            throttle: (demands.throttle + 1.) / 2.,
            ..demands
        };
        let demands: Vector4<f32> = demands.into();

        let mut values = self.table.map(|mix| mix.factor().dot(&demands));

        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if max > 1. {
            for value in &mut values {
                *value -= max - 1.;
            }
        }

        for (index, value) in values.iter_mut().enumerate() {
            *value = self.motors.constrain(index, *value);
        }

        for (index, value) in values.iter().enumerate() {
            self.safe_write(index, *value);
        }

        values
    }

    /// Stop every motor immediately.
    ///
    /// The write cache is left as is, so a following [`run`](Self::run) skips
    /// any motor whose mixed value matches the one written before the cut.
    pub fn cut(&mut self) {
        for index in 0..N {
            self.motors.write(index, 0.);
        }
    }

    /// Write the bench-test values. Only used while disarmed.
    pub fn run_disarmed(&mut self) {
        for index in 0..N {
            self.safe_write(index, self.disarmed[index]);
        }
    }

    /// Set the bench-test value of motor `index`. Unknown motors are ignored.
    pub fn set_motor_disarmed(&mut self, index: usize, value: f32) {
        if let Some(disarmed) = self.disarmed.get_mut(index) {
            *disarmed = value;
        }
    }

    pub fn motor_disarmed(&self, index: usize) -> Option<f32> {
        self.disarmed.get(index).copied()
    }

    /// Last value written (or skipped as unchanged) for each motor.
    pub fn previous(&self) -> &[f32; N] {
        &self.previous
    }

    pub fn table(&self) -> &[MotorMix; N] {
        &self.table
    }

    pub fn motors(&self) -> &M {
        &self.motors
    }

    pub fn motors_mut(&mut self) -> &mut M {
        &mut self.motors
    }

    // Avoid sending the motor the same value over and over
    fn safe_write(&mut self, index: usize, value: f32) {
        if self.previous[index] != value {
            self.motors.write(index, value);
        }
        self.previous[index] = value;
    }
}
