//! The vehicle: owns every part of the control core and runs one cycle per call.

use crate::config::{EstimatorConfig, PidGains, StickConfig, SERIAL_TASK_HZ};
use crate::ground::{GroundCommand, GroundStation, Telemetry};
use crate::hal::{Motors, Receiver, Sensors, StatusIndicator};
use crate::scheduler::{Error, Event, Task};
use crate::{
    Arming, ArmingStatus, Axis, Demands, Mixer, PidController, RatePid, Rc, VehicleState,
    VerticalEstimator, YawPid,
};

/// A multirotor built from its sensors, receiver, mixer and status indicator.
///
/// ```ignore
/// let mut vehicle = Vehicle::builder(imu, radio, Mixer::new(escs, QUAD_X_MW), led)
///     .rate_gains(PidGains::new(0.2, 0.002, 0.3))
///     .build();
/// vehicle.begin();
///
/// let mut tasks = Vehicle::tasks();
/// let mut scheduler = Scheduler::new(&mut tasks, clock, 400);
/// loop {
///     scheduler.run(&mut vehicle)?;
/// }
/// ```
pub struct Vehicle<S, R, M, L, const N: usize> {
    sensors: S,
    receiver: R,
    mixer: Mixer<M, N>,
    indicator: L,
    state: VehicleState,
    rc: Rc,
    arming: Arming,
    rate: RatePid,
    yaw: YawPid,
    estimator: VerticalEstimator,
    ground: GroundStation,
    demands: Demands,
    last_update_us: Option<u32>,
    telemetry: Option<Telemetry<N>>,
}

impl<S, R, M, L, const N: usize> Vehicle<S, R, M, L, N>
where
    S: Sensors,
    R: Receiver,
    M: Motors,
    L: StatusIndicator,
{
    pub fn builder(
        sensors: S,
        receiver: R,
        mixer: Mixer<M, N>,
        indicator: L,
    ) -> Builder<S, R, M, L, N> {
        Builder::new(sensors, receiver, mixer, indicator)
    }

    /// Scheduler tasks: the control cycle every tick and the ground-station task at 66hz.
    pub fn tasks() -> [Task<Self>; 2] {
        [
            Task::high_priority(Self::control_task),
            Task::new(Self::serial_event).with_hz(SERIAL_TASK_HZ),
        ]
    }

    /// Start the motors.
    pub fn begin(&mut self) {
        self.mixer.begin();
        self.indicator.show_armed_status(false);
    }

    /// Run one control cycle at `now_us` (in microseconds).
    pub fn update(&mut self, now_us: u32) -> ArmingStatus {
        let attitude = self.sensors.attitude();
        self.state.set_attitude(attitude);
        self.state.set_angular_rate(self.sensors.gyro());

        let accel = self.sensors.accel();
        self.estimator.update(&attitude, &accel, now_us, self.state.armed);
        let dt_us = self
            .last_update_us
            .map_or(0, |last| now_us.wrapping_sub(last));
        self.last_update_us = Some(now_us);
        let vertical_velocity = self.estimator.vertical_velocity(dt_us);
        self.state.set(Axis::DZ, vertical_velocity);

        let status = self.arming.check_receiver(
            &mut self.state,
            &mut self.receiver,
            &mut self.mixer,
            &mut self.indicator,
        );
        if status == ArmingStatus::Failsafe {
            self.demands = Demands::default();
            return status;
        }

        self.rc.update(&self.receiver);
        let mut demands = self.rc.demands();

        let inactive = self.receiver.inactive();
        self.rate.reset_on_inactivity(inactive);
        self.yaw.reset_on_inactivity(inactive);
        self.rate.modify_demands(&self.state, &mut demands);
        self.yaw.modify_demands(&self.state, &mut demands);
        self.demands = demands;

        // Throttle down was already cut by the arming checks
        if !self.state.armed {
            self.mixer.run_disarmed();
        } else if !inactive {
            self.mixer.run(demands);
        }

        status
    }

    /// Queue a ground-station command for the next serial task.
    pub fn submit(&mut self, command: GroundCommand) -> Result<(), GroundCommand> {
        self.ground.submit(command)
    }

    /// Run the ground-station task: apply queued commands and report telemetry.
    pub fn serial_task(&mut self) -> Telemetry<N> {
        let telemetry = self.ground.run(&self.state, &self.receiver, &mut self.mixer);
        self.telemetry = Some(telemetry);
        telemetry
    }

    /// Telemetry from the last serial task.
    pub fn telemetry(&self) -> Option<&Telemetry<N>> {
        self.telemetry.as_ref()
    }

    pub fn status(&self) -> ArmingStatus {
        ArmingStatus::of(&self.state)
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    /// Demands sent to the mixer on the last cycle.
    pub fn demands(&self) -> Demands {
        self.demands
    }

    pub fn vertical_velocity(&self) -> f32 {
        self.state.get(Axis::DZ)
    }

    pub fn rc(&self) -> &Rc {
        &self.rc
    }

    pub fn mixer(&self) -> &Mixer<M, N> {
        &self.mixer
    }

    pub fn mixer_mut(&mut self) -> &mut Mixer<M, N> {
        &mut self.mixer
    }

    pub fn receiver_mut(&mut self) -> &mut R {
        &mut self.receiver
    }

    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }

    pub fn indicator(&self) -> &L {
        &self.indicator
    }

    fn control_task(event: Event<'_, Self>) -> Result<(), Error> {
        event.state.update(event.now.0);
        Ok(())
    }

    fn serial_event(event: Event<'_, Self>) -> Result<(), Error> {
        event.state.serial_task();
        Ok(())
    }
}

/// Configures a [`Vehicle`] before it is built.
pub struct Builder<S, R, M, L, const N: usize> {
    sensors: S,
    receiver: R,
    mixer: Mixer<M, N>,
    indicator: L,
    rate_gains: PidGains,
    yaw_gains: PidGains,
    sticks: StickConfig,
    estimator: EstimatorConfig,
}

impl<S, R, M, L, const N: usize> Builder<S, R, M, L, N>
where
    S: Sensors,
    R: Receiver,
    M: Motors,
    L: StatusIndicator,
{
    pub fn new(sensors: S, receiver: R, mixer: Mixer<M, N>, indicator: L) -> Self {
        Self {
            sensors,
            receiver,
            mixer,
            indicator,
            rate_gains: PidGains::rate(),
            yaw_gains: PidGains::yaw(),
            sticks: StickConfig::default(),
            estimator: EstimatorConfig::default(),
        }
    }

    /// Gains for the roll and pitch rate controllers.
    pub fn rate_gains(mut self, gains: PidGains) -> Self {
        self.rate_gains = gains;
        self
    }

    pub fn yaw_gains(mut self, gains: PidGains) -> Self {
        self.yaw_gains = gains;
        self
    }

    pub fn sticks(mut self, sticks: StickConfig) -> Self {
        self.sticks = sticks;
        self
    }

    pub fn estimator(mut self, estimator: EstimatorConfig) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn build(self) -> Vehicle<S, R, M, L, N> {
        Vehicle {
            sensors: self.sensors,
            receiver: self.receiver,
            mixer: self.mixer,
            indicator: self.indicator,
            state: VehicleState::default(),
            rc: Rc::new(&self.sticks),
            arming: Arming::new(),
            rate: RatePid::new(self.rate_gains),
            yaw: YawPid::new(self.yaw_gains),
            estimator: VerticalEstimator::new(self.estimator),
            ground: GroundStation::new(),
            demands: Demands::default(),
            last_update_us: None,
            telemetry: None,
        }
    }
}
