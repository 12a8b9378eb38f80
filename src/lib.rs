//! # hackflight-core
//! A `#![no_std]` flight-controller core for multi-rotors.
//!
//! Each control cycle turns raw receiver pulses into [`Demands`] with the
//! [`rc`] stick curves, gates them through the [`arming`] state machine,
//! corrects them with the rate PIDs in [`control`] and distributes them to
//! the motors with the [`Mixer`]. The [`estimator`] tracks vertical velocity
//! from the accelerometer alongside.
//!
//! [`Vehicle`] owns all of these and runs one cycle per call to
//! [`Vehicle::update`]; [`scheduler`] can drive it together with the
//! ground-station task at fixed rates.
//!
//! Hardware is reached only through the traits in [`hal`].

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod arming;
pub use arming::{Arming, ArmingStatus};

pub mod config;

pub mod control;
pub use control::{AngularVelocityPid, PidController, RatePid, YawPid};

pub mod estimator;
pub use estimator::VerticalEstimator;

pub mod filter;

pub mod ground;
pub use ground::{GroundCommand, GroundStation, Telemetry};

pub mod hal;
pub use hal::{Motors, Receiver, Sensors, StatusIndicator};

pub mod mixer;
pub use mixer::{Mixer, MotorMix, QUAD_X_MW};

pub mod rc;
pub use rc::Rc;

pub mod scheduler;
pub use scheduler::Scheduler;

pub mod state;
pub use state::{Axis, VehicleState};

pub mod vehicle;
pub use vehicle::Vehicle;

use nalgebra::Vector4;

/// Normalized pilot/controller intent for one control cycle.
///
/// Throttle is in [-1, 1] until the mixer maps it to [0, 1];
/// roll, pitch and yaw are approximately in [-1, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Demands {
    pub throttle: f32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl Demands {
    pub fn new(throttle: f32, roll: f32, pitch: f32, yaw: f32) -> Self {
        Self {
            throttle,
            roll,
            pitch,
            yaw,
        }
    }
}

impl From<Demands> for Vector4<f32> {
    fn from(demands: Demands) -> Self {
        Vector4::new(demands.throttle, demands.roll, demands.pitch, demands.yaw)
    }
}

impl From<Vector4<f32>> for Demands {
    fn from(v: Vector4<f32>) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}
