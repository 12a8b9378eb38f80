use crate::config::MAX_ARMING_ANGLE_DEGREES;
use nalgebra::Vector3;
use num_traits::Float;

/// Index of a channel in [`VehicleState::x`] (see Bouabdallah et al. 2004).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    DX,
    Y,
    DY,
    Z,
    DZ,
    /// Roll angle
    Phi,
    /// Roll rate
    DPhi,
    /// Pitch angle
    Theta,
    /// Pitch rate
    DTheta,
    /// Yaw angle
    Psi,
    /// Yaw rate
    DPsi,
}

impl Axis {
    pub const COUNT: usize = 12;
}

/// Fused vehicle state shared by the control cycle.
///
/// Angles are in radians and rates in radians/second.
/// The linear channels are reserved for outer loops and unused by this crate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VehicleState {
    pub x: [f32; Axis::COUNT],
    pub armed: bool,
    pub failsafe: bool,
}

impl VehicleState {
    pub fn get(&self, axis: Axis) -> f32 {
        self.x[axis as usize]
    }

    pub fn set(&mut self, axis: Axis, value: f32) {
        self.x[axis as usize] = value;
    }

    /// Roll, pitch and yaw angles.
    pub fn attitude(&self) -> Vector3<f32> {
        Vector3::new(self.get(Axis::Phi), self.get(Axis::Theta), self.get(Axis::Psi))
    }

    /// Roll, pitch and yaw rates.
    pub fn angular_rate(&self) -> Vector3<f32> {
        Vector3::new(
            self.get(Axis::DPhi),
            self.get(Axis::DTheta),
            self.get(Axis::DPsi),
        )
    }

    pub fn set_attitude(&mut self, attitude: Vector3<f32>) {
        self.set(Axis::Phi, attitude.x);
        self.set(Axis::Theta, attitude.y);
        self.set(Axis::Psi, attitude.z);
    }

    pub fn set_angular_rate(&mut self, rate: Vector3<f32>) {
        self.set(Axis::DPhi, rate.x);
        self.set(Axis::DTheta, rate.y);
        self.set(Axis::DPsi, rate.z);
    }

    pub fn safe_angle(&self, axis: Axis) -> bool {
        self.get(axis).abs() < MAX_ARMING_ANGLE_DEGREES.to_radians()
    }

    /// Returns `true` if roll and pitch are close enough to level to arm.
    pub fn safe_to_arm(&self) -> bool {
        self.safe_angle(Axis::Phi) && self.safe_angle(Axis::Theta)
    }
}
