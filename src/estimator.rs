//! Vertical velocity from accelerometer integration.

use crate::config::{EstimatorConfig, GRAVITY};
use crate::filter::{complementary, deadband, LowPassFilter};
use nalgebra::Vector3;
use num_traits::Float;

/// Estimates vertical velocity by integrating earth-frame vertical acceleration.
///
/// While disarmed the vehicle is assumed to be at rest, so the measured vertical
/// acceleration is continuously captured as the rest offset. Arming freezes it.
/// Drift is left for an external reference to correct; there is no reset.
#[derive(Clone, Copy, Debug)]
pub struct VerticalEstimator {
    config: EstimatorConfig,
    /// Smoothed body-frame acceleration in g
    smoothed: Vector3<f32>,
    /// Zero-referenced vertical acceleration in g
    acc_z: LowPassFilter,
    z_offset: f32,
    previous_time_us: u32,
    vertical_velocity: f32,
}

impl Default for VerticalEstimator {
    fn default() -> Self {
        Self::new(EstimatorConfig::default())
    }
}

impl VerticalEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            config,
            smoothed: Vector3::zeros(),
            acc_z: LowPassFilter::with_cutoff(config.lpf_cutoff),
            z_offset: 0.,
            previous_time_us: 0,
            vertical_velocity: 0.,
        }
    }

    /// Feed one accelerometer sample (in g) taken at `now_us` with the current
    /// roll, pitch and yaw `attitude` (in radians).
    pub fn update(
        &mut self,
        attitude: &Vector3<f32>,
        accel: &Vector3<f32>,
        now_us: u32,
        armed: bool,
    ) {
        let dt_us = now_us.wrapping_sub(self.previous_time_us);
        self.previous_time_us = now_us;

        let factor = self.config.lpf_factor;
        if factor > 0. {
            self.smoothed = self
                .smoothed
                .zip_map(accel, |filtered, sample| complementary(sample, filtered, factor));
        } else {
            self.smoothed = *accel;
        }

        let mut rotated = earth_vertical(&self.smoothed, attitude);

        if !armed {
            self.z_offset = rotated;
        }
        rotated -= self.z_offset;

        self.acc_z.apply(rotated, dt_us as f32 * 1e-6);
    }

    /// Integrate the current vertical acceleration over `dt_us` microseconds
    /// and return the vertical velocity in meters/second.
    pub fn vertical_velocity(&mut self, dt_us: u32) -> f32 {
        let acc_z = deadband(self.acc_z.output(), self.config.deadband);
        self.vertical_velocity += acc_z * GRAVITY * dt_us as f32 / 1e6;
        self.vertical_velocity
    }

    /// Smoothed vertical acceleration relative to rest, in g.
    pub fn vertical_acceleration(&self) -> f32 {
        self.acc_z.output()
    }

    pub fn rest_offset(&self) -> f32 {
        self.z_offset
    }
}

/// Vertical (earth frame) component of the body-frame vector `v`.
///
/// Only roll and pitch matter for the vertical axis.
fn earth_vertical(v: &Vector3<f32>, attitude: &Vector3<f32>) -> f32 {
    let (sinx, cosx) = (-attitude.x).sin_cos();
    let (siny, cosy) = (-attitude.y).sin_cos();

    v.x * siny + v.y * (-sinx * cosy) + v.z * (cosy * cosx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f32::consts::FRAC_PI_2;

    fn level() -> Vector3<f32> {
        Vector3::zeros()
    }

    fn run(
        estimator: &mut VerticalEstimator,
        now_us: &mut u32,
        accel: Vector3<f32>,
        armed: bool,
        cycles: usize,
    ) {
        for _ in 0..cycles {
            *now_us += 1_000;
            estimator.update(&level(), &accel, *now_us, armed);
        }
    }

    #[test]
    fn level_vehicle_sees_z_axis() {
        let accel = Vector3::new(0.3, -0.2, 1.);
        assert_abs_diff_eq!(earth_vertical(&accel, &level()), 1.);
    }

    #[test]
    fn rolled_vehicle_sees_y_axis() {
        let accel = Vector3::new(0., 1., 0.);
        let rolled = Vector3::new(FRAC_PI_2, 0., 0.);
        assert_abs_diff_eq!(earth_vertical(&accel, &rolled), 1., epsilon = 1e-6);
    }

    #[test]
    fn pitched_vehicle_sees_x_axis() {
        let accel = Vector3::new(-1., 0., 0.);
        let pitched = Vector3::new(0., FRAC_PI_2, 0.);
        assert_abs_diff_eq!(earth_vertical(&accel, &pitched), 1., epsilon = 1e-6);
    }

    #[test]
    fn yaw_is_ignored() {
        let accel = Vector3::new(0.2, 0.1, 0.9);
        let yawed = Vector3::new(0.1, 0.2, 2.);
        let unyawed = Vector3::new(0.1, 0.2, 0.);
        assert_abs_diff_eq!(
            earth_vertical(&accel, &yawed),
            earth_vertical(&accel, &unyawed)
        );
    }

    #[test]
    fn rest_offset_tracks_while_disarmed() {
        let mut estimator = VerticalEstimator::default();
        let mut now_us = 0;

        run(&mut estimator, &mut now_us, Vector3::new(0., 0., 1.), false, 200);
        assert_abs_diff_eq!(estimator.rest_offset(), 1., epsilon = 1e-4);
        assert_abs_diff_eq!(estimator.vertical_acceleration(), 0.);

        // Frozen once armed
        run(&mut estimator, &mut now_us, Vector3::new(0., 0., 2.), true, 10);
        assert_abs_diff_eq!(estimator.rest_offset(), 1., epsilon = 1e-4);
        assert!(estimator.vertical_acceleration() > 0.);
    }

    #[test]
    fn small_accelerations_do_not_integrate() {
        let mut estimator = VerticalEstimator::default();
        let mut now_us = 0;

        run(&mut estimator, &mut now_us, Vector3::new(0., 0., 1.), false, 200);
        for i in 0..500 {
            let wobble = if i % 2 == 0 { 1.015 } else { 0.99 };
            now_us += 1_000;
            estimator.update(&level(), &Vector3::new(0., 0., wobble), now_us, true);
            assert!(estimator.vertical_acceleration().abs() < 0.02);
            assert_eq!(estimator.vertical_velocity(1_000), 0.);
        }
    }

    #[test]
    fn sustained_climb_integrates() {
        let mut estimator = VerticalEstimator::default();
        let mut now_us = 0;

        run(&mut estimator, &mut now_us, Vector3::new(0., 0., 1.), false, 200);
        run(&mut estimator, &mut now_us, Vector3::new(0., 0., 2.), true, 2_000);
        assert_abs_diff_eq!(estimator.vertical_acceleration(), 1., epsilon = 1e-3);

        // One second at (1 - deadband) g
        let velocity = estimator.vertical_velocity(1_000_000);
        assert_abs_diff_eq!(velocity, 0.98 * GRAVITY, epsilon = 1e-2);

        // Accumulates across calls
        let velocity = estimator.vertical_velocity(1_000_000);
        assert_abs_diff_eq!(velocity, 2. * 0.98 * GRAVITY, epsilon = 2e-2);
    }

    #[test]
    fn timestamp_wraparound_keeps_filter_stable() {
        let mut estimator = VerticalEstimator::default();
        let mut now_us = u32::MAX - 5_000;
        estimator.update(&level(), &Vector3::new(0., 0., 1.), now_us, false);

        run(&mut estimator, &mut now_us, Vector3::new(0., 0., 1.), false, 1);
        now_us = now_us.wrapping_add(10_000);
        estimator.update(&level(), &Vector3::new(0., 0., 1.5), now_us, true);

        // 10ms step, not a full filter pass
        let acc = estimator.vertical_acceleration();
        assert!(acc > 0. && acc < 0.1);
    }
}
