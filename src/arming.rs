//! Arming, disarming and failsafe.

use crate::hal::{Motors, Receiver, StatusIndicator};
use crate::{Mixer, VehicleState};

/// Arming status derived from [`VehicleState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArmingStatus {
    Disarmed,
    Armed,
    /// Receiver signal was lost while armed. Lasts until the vehicle is rebuilt.
    Failsafe,
}

impl ArmingStatus {
    pub fn of(state: &VehicleState) -> Self {
        if state.failsafe {
            Self::Failsafe
        } else if state.armed {
            Self::Armed
        } else {
            Self::Disarmed
        }
    }
}

/// Gates the motors on receiver, switch and attitude checks.
#[derive(Clone, Copy, Debug, Default)]
pub struct Arming {
    /// Set once the arming switch has been seen in the disarmed position.
    safe_to_arm: bool,
}

impl Arming {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn safe_to_arm(&self) -> bool {
        self.safe_to_arm
    }

    /// Run the arming checks for one control cycle.
    pub fn check_receiver<R, M, L, const N: usize>(
        &mut self,
        state: &mut VehicleState,
        receiver: &mut R,
        mixer: &mut Mixer<M, N>,
        indicator: &mut L,
    ) -> ArmingStatus
    where
        R: Receiver + ?Sized,
        M: Motors,
        L: StatusIndicator + ?Sized,
    {
        if receiver.lost_signal() && state.armed {
            mixer.cut();
            state.armed = false;
            state.failsafe = true;
            indicator.show_armed_status(false);
            warn!("receiver signal lost, entering failsafe");
            return ArmingStatus::Failsafe;
        }

        if !receiver.ready() {
            return ArmingStatus::of(state);
        }

        let switch_armed = receiver.in_armed_state();

        if state.armed && !switch_armed {
            state.armed = false;
            info!("disarmed");
        }

        // Refuse to arm when the switch was already on at startup
        if !self.safe_to_arm {
            self.safe_to_arm = !switch_armed;
        }

        let inactive = receiver.inactive();
        if self.safe_to_arm
            && !state.armed
            && inactive
            && switch_armed
            && !state.failsafe
            && state.safe_to_arm()
        {
            state.armed = true;
            info!("armed");
        }

        // Keep motors off at throttle down
        if state.armed && inactive {
            mixer.cut();
        }

        indicator.show_armed_status(state.armed);

        ArmingStatus::of(state)
    }
}
