//! Stick processing: expo/rate curves, stick movement and stick-combo detection.

use crate::config::{
    StickConfig, AUX_HIGH_PULSE, AUX_LOW_PULSE, COMBO_HOLD_CYCLES, MAX_CHECK, MIN_CHECK,
    RC_CHANNELS, STICK_NOISE,
};
use crate::hal::{Channel, Receiver};
use crate::Demands;

mod curve;
pub use curve::{Curves, Lookup};

/// Number of samples in each channel's moving average.
const AVERAGE_SAMPLES: usize = 4;

/// Saturation value of the command-delay counter.
const MAX_COMMAND_DELAY: u8 = 250;

/// Stick position patterns for [`Rc::combo`], two bits per stick.
/// Combine one position per stick with `|`.
pub mod sticks {
    pub const THR_LO: u8 = 1 << 0;
    pub const THR_CE: u8 = 3 << 0;
    pub const THR_HI: u8 = 2 << 0;
    pub const ROL_LO: u8 = 1 << 2;
    pub const ROL_CE: u8 = 3 << 2;
    pub const ROL_HI: u8 = 2 << 2;
    pub const PIT_LO: u8 = 1 << 4;
    pub const PIT_CE: u8 = 3 << 4;
    pub const PIT_HI: u8 = 2 << 4;
    pub const YAW_LO: u8 = 1 << 6;
    pub const YAW_CE: u8 = 3 << 6;
    pub const YAW_HI: u8 = 2 << 6;
}

/// Shapes raw receiver pulses into [`Demands`] and tracks stick activity.
#[derive(Clone, Debug)]
pub struct Rc {
    curves: Curves,
    history: [[u16; AVERAGE_SAMPLES]; RC_CHANNELS],
    average_index: usize,
    primed: bool,
    data: [u16; RC_CHANNELS],
    previous: [u16; RC_CHANNELS],
    /// Cycles since the sticks last moved.
    command_delay: u8,
    sticks: u8,
}

impl Default for Rc {
    fn default() -> Self {
        Self::new(&StickConfig::default())
    }
}

impl Rc {
    pub fn new(config: &StickConfig) -> Self {
        Self {
            curves: Curves::new(config),
            history: [[0; AVERAGE_SAMPLES]; RC_CHANNELS],
            average_index: 0,
            primed: false,
            data: [0; RC_CHANNELS],
            previous: [0; RC_CHANNELS],
            command_delay: 0,
            sticks: 0,
        }
    }

    /// Read and average the receiver's channels, then update stick movement tracking.
    pub fn update<R>(&mut self, receiver: &R)
    where
        R: Receiver + ?Sized,
    {
        for (idx, channel) in Channel::ALL.iter().enumerate() {
            let raw = receiver.raw(*channel);
            let history = &mut self.history[idx];
            if self.primed {
                history[self.average_index] = raw;
            } else {
                *history = [raw; AVERAGE_SAMPLES];
            }

            let sum: u32 = history.iter().map(|&sample| sample as u32).sum();
            self.data[idx] = (sum / AVERAGE_SAMPLES as u32) as u16;
        }
        self.primed = true;
        self.average_index = (self.average_index + 1) % AVERAGE_SAMPLES;

        let moved = self
            .data
            .iter()
            .zip(self.previous.iter())
            .any(|(current, previous)| current.abs_diff(*previous) > STICK_NOISE);
        self.previous = self.data;

        let sticks = self.stick_positions();
        if moved || sticks != self.sticks {
            self.command_delay = 0;
        } else if self.command_delay < MAX_COMMAND_DELAY {
            self.command_delay += 1;
        }
        self.sticks = sticks;
    }

    fn stick_positions(&self) -> u8 {
        Channel::STICKS
            .iter()
            .enumerate()
            .fold(0, |pattern, (idx, channel)| {
                let pulse = self.data(*channel);
                let mut position = 0;
                if pulse > MIN_CHECK {
                    position |= 0b10;
                }
                if pulse < MAX_CHECK {
                    position |= 0b01;
                }
                pattern | position << (2 * idx)
            })
    }

    /// Averaged pulse width of `channel`.
    pub fn data(&self, channel: Channel) -> u16 {
        self.data[channel as usize]
    }

    /// Shaped demands for the current stick positions.
    pub fn demands(&self) -> Demands {
        Demands {
            throttle: self.curves.throttle(self.data(Channel::Throttle)),
            roll: self.curves.cyclic(self.data(Channel::Roll)),
            pitch: self.curves.cyclic(self.data(Channel::Pitch)),
            yaw: self.curves.cyclic(self.data(Channel::Yaw)),
        }
    }

    /// Cycles since the sticks last moved, saturating at 250.
    pub fn command_delay(&self) -> u8 {
        self.command_delay
    }

    /// Current stick position pattern (see [`sticks`]).
    pub fn sticks(&self) -> u8 {
        self.sticks
    }

    /// Returns `true` on the single cycle where `pattern` has been held
    /// still for [`COMBO_HOLD_CYCLES`].
    pub fn combo(&self, pattern: u8) -> bool {
        self.sticks == pattern && self.command_delay == COMBO_HOLD_CYCLES
    }

    /// Position (0, 1 or 2) of the three-position mode switch.
    pub fn aux_state(&self) -> u8 {
        let pulse = self.data(Channel::Aux2);
        if pulse < AUX_LOW_PULSE {
            0
        } else if pulse < AUX_HIGH_PULSE {
            1
        } else {
            2
        }
    }
}
