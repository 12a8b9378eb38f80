//! Ground-station side of the serial task.
//!
//! The byte protocol lives outside this crate. Decoded requests are queued as
//! [`GroundCommand`]s and applied by [`GroundStation::run`] on the control thread,
//! which also produces the [`Telemetry`] the protocol layer reports back.

use crate::hal::{Channel, Motors, Receiver};
use crate::{ArmingStatus, Mixer, VehicleState};
use heapless::Deque;
use nalgebra::Vector3;

/// Maximum number of commands waiting for the next serial task.
pub const COMMAND_QUEUE_LEN: usize = 8;

/// Request from the ground station.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GroundCommand {
    /// Set the bench-test value of one motor.
    SetMotorDisarmed { index: usize, value: f32 },
    /// Set the bench-test values of the first four motors.
    SetMotors([f32; 4]),
}

/// Snapshot reported to the ground station.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Telemetry<const N: usize> {
    /// Raw receiver pulse widths in [`Channel::ALL`] order.
    pub channels: [u16; 6],
    /// Roll, pitch and yaw in radians.
    pub attitude: Vector3<f32>,
    pub status: ArmingStatus,
    /// Last values written to the motors.
    pub motors: [f32; N],
}

/// Queue of pending ground-station commands.
pub struct GroundStation {
    commands: Deque<GroundCommand, COMMAND_QUEUE_LEN>,
}

impl Default for GroundStation {
    fn default() -> Self {
        Self::new()
    }
}

impl GroundStation {
    pub const fn new() -> Self {
        Self {
            commands: Deque::new(),
        }
    }

    /// Queue `command` for the next serial task, handing it back if the queue is full.
    pub fn submit(&mut self, command: GroundCommand) -> Result<(), GroundCommand> {
        self.commands.push_back(command).map_err(|command| {
            warn!("ground command queue full");
            command
        })
    }

    pub fn pending(&self) -> usize {
        self.commands.len()
    }

    /// Apply queued commands, run the motor bench test while disarmed and report telemetry.
    pub fn run<R, M, const N: usize>(
        &mut self,
        state: &VehicleState,
        receiver: &R,
        mixer: &mut Mixer<M, N>,
    ) -> Telemetry<N>
    where
        R: Receiver + ?Sized,
        M: Motors,
    {
        while let Some(command) = self.commands.pop_front() {
            debug!("ground command {}", command);
            match command {
                GroundCommand::SetMotorDisarmed { index, value } => {
                    mixer.set_motor_disarmed(index, value)
                }
                GroundCommand::SetMotors(values) => {
                    for (index, value) in values.into_iter().enumerate() {
                        mixer.set_motor_disarmed(index, value);
                    }
                }
            }
        }

        // Failsafe keeps the motors off for the rest of the session
        if ArmingStatus::of(state) == ArmingStatus::Disarmed {
            mixer.run_disarmed();
        }

        Telemetry {
            channels: Channel::ALL.map(|channel| receiver.raw(channel)),
            attitude: state.attitude(),
            status: ArmingStatus::of(state),
            motors: *mixer.previous(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MotorMix;

    struct Radio;

    impl Receiver for Radio {
        fn lost_signal(&mut self) -> bool {
            false
        }

        fn ready(&mut self) -> bool {
            true
        }

        fn raw(&self, channel: Channel) -> u16 {
            1000 + 100 * channel as u16
        }
    }

    #[derive(Default)]
    struct Motor {
        values: [f32; 2],
        writes: usize,
    }

    impl Motors for Motor {
        fn begin(&mut self) {}

        fn write(&mut self, index: usize, value: f32) {
            self.values[index] = value;
            self.writes += 1;
        }
    }

    fn mixer() -> Mixer<Motor, 2> {
        Mixer::new(
            Motor::default(),
            [MotorMix::new(1, 1, 0, 0), MotorMix::new(1, -1, 0, 0)],
        )
    }

    #[test]
    fn bench_test_runs_while_disarmed() {
        let mut ground = GroundStation::new();
        let mut mixer = mixer();
        let state = VehicleState::default();

        ground
            .submit(GroundCommand::SetMotorDisarmed {
                index: 1,
                value: 0.2,
            })
            .unwrap();
        assert_eq!(ground.pending(), 1);

        let telemetry = ground.run(&state, &Radio, &mut mixer);
        assert_eq!(ground.pending(), 0);
        assert_eq!(mixer.motors().values, [0., 0.2]);
        assert_eq!(telemetry.motors, [0., 0.2]);
        assert_eq!(telemetry.status, ArmingStatus::Disarmed);
    }

    #[test]
    fn bench_test_is_skipped_while_armed() {
        let mut ground = GroundStation::new();
        let mut mixer = mixer();
        let state = VehicleState {
            armed: true,
            ..Default::default()
        };

        ground.submit(GroundCommand::SetMotors([0.3; 4])).unwrap();
        let telemetry = ground.run(&state, &Radio, &mut mixer);

        assert_eq!(mixer.motor_disarmed(0), Some(0.3));
        assert_eq!(mixer.motor_disarmed(1), Some(0.3));
        assert_eq!(mixer.motors().writes, 0);
        assert_eq!(telemetry.status, ArmingStatus::Armed);
    }

    #[test]
    fn bench_test_is_skipped_in_failsafe() {
        let mut ground = GroundStation::new();
        let mut mixer = mixer();
        let state = VehicleState {
            failsafe: true,
            ..Default::default()
        };

        ground
            .submit(GroundCommand::SetMotorDisarmed {
                index: 0,
                value: 0.25,
            })
            .unwrap();
        let telemetry = ground.run(&state, &Radio, &mut mixer);

        assert_eq!(mixer.motor_disarmed(0), Some(0.25));
        assert_eq!(mixer.motors().writes, 0);
        assert_eq!(mixer.motors().values, [0.; 2]);
        assert_eq!(telemetry.status, ArmingStatus::Failsafe);
    }

    #[test]
    fn full_queue_rejects_command() {
        let mut ground = GroundStation::new();
        let command = GroundCommand::SetMotorDisarmed {
            index: 0,
            value: 0.1,
        };
        for _ in 0..COMMAND_QUEUE_LEN {
            assert!(ground.submit(command).is_ok());
        }
        assert_eq!(ground.submit(command), Err(command));
    }

    #[test]
    fn telemetry_reports_channels_and_attitude() {
        let mut ground = GroundStation::new();
        let mut mixer = mixer();
        let mut state = VehicleState::default();
        state.set_attitude(Vector3::new(0.1, -0.2, 0.3));

        let telemetry = ground.run(&state, &Radio, &mut mixer);
        assert_eq!(telemetry.channels, [1000, 1100, 1200, 1300, 1400, 1500]);
        assert_eq!(telemetry.attitude, Vector3::new(0.1, -0.2, 0.3));
    }
}
