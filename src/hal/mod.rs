//! Hardware abstraction consumed by the control core.
//!
//! Boards implement these traits for their receiver, sensor fusion, motor driver and
//! status LED. [`PwmEsc`]/[`EscBank`] and [`Led`] cover the common `embedded-hal` cases.

use crate::config::{ARMING_SWITCH_PULSE, MIN_CHECK};
use nalgebra::Vector3;

pub mod esc;
pub use esc::{Builder, EscBank, PwmEsc};

mod led;
pub use led::Led;

/// Receiver channel, in the order the receiver reports them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Throttle,
    Roll,
    Pitch,
    Yaw,
    /// Arming switch
    Aux1,
    /// Mode switch
    Aux2,
}

impl Channel {
    pub const ALL: [Channel; 6] = [
        Channel::Throttle,
        Channel::Roll,
        Channel::Pitch,
        Channel::Yaw,
        Channel::Aux1,
        Channel::Aux2,
    ];

    pub const STICKS: [Channel; 4] = [
        Channel::Throttle,
        Channel::Roll,
        Channel::Pitch,
        Channel::Yaw,
    ];
}

/// Radio receiver.
pub trait Receiver {
    /// Returns `true` while the receiver has lost the transmitter signal.
    fn lost_signal(&mut self) -> bool;

    /// Returns `true` if fresh channel data arrived since the last cycle.
    fn ready(&mut self) -> bool;

    /// Raw pulse width of `channel` in microseconds.
    fn raw(&self, channel: Channel) -> u16;

    /// Returns `true` if the arming switch is in the armed position.
    fn in_armed_state(&self) -> bool {
        self.raw(Channel::Aux1) > ARMING_SWITCH_PULSE
    }

    /// Returns `true` if the throttle stick is down.
    fn inactive(&self) -> bool {
        self.raw(Channel::Throttle) < MIN_CHECK
    }
}

/// Sensor fusion output.
pub trait Sensors {
    /// Roll, pitch and yaw angles in radians.
    fn attitude(&mut self) -> Vector3<f32>;

    /// Roll, pitch and yaw rates in radians/second.
    fn gyro(&mut self) -> Vector3<f32>;

    /// Body-frame acceleration in g.
    fn accel(&mut self) -> Vector3<f32>;
}

/// Motor driver. The mixer is its only writer.
pub trait Motors {
    fn begin(&mut self);

    /// Output a normalized value to motor `index`.
    fn write(&mut self, index: usize, value: f32);

    /// Constrain a mixed value before it is written to motor `index`.
    ///
    /// Motors run in [0, 1]; servos may override this with their own range.
    fn constrain(&self, index: usize, value: f32) -> f32 {
        let _ = index;
        value.max(0.).min(1.)
    }
}

impl<T: Motors + ?Sized> Motors for &mut T {
    fn begin(&mut self) {
        (**self).begin()
    }

    fn write(&mut self, index: usize, value: f32) {
        (**self).write(index, value)
    }

    fn constrain(&self, index: usize, value: f32) -> f32 {
        (**self).constrain(index, value)
    }
}

/// Single boolean sink showing whether the vehicle is armed.
pub trait StatusIndicator {
    fn show_armed_status(&mut self, armed: bool);
}

impl<T: StatusIndicator + ?Sized> StatusIndicator for &mut T {
    fn show_armed_status(&mut self, armed: bool) {
        (**self).show_armed_status(armed)
    }
}
