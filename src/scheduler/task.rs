use super::Error;
use embedded_time::duration::Microseconds;

/// Passed to a task each time it runs.
pub struct Event<'a, T> {
    /// The system driven by the scheduler.
    pub state: &'a mut T,

    /// Time the scheduler sampled for this tick.
    pub now: Microseconds<u32>,

    /// Time left in this tick's budget.
    pub available: Microseconds<u32>,
}

type TaskFn<T, E> = fn(Event<'_, T>) -> Result<(), E>;

/// A function run by the [`Scheduler`](super::Scheduler) at a fixed rate.
pub struct Task<T, E = Error> {
    f: TaskFn<T, E>,
    hz: f32,
    max_time_us: u32,
    high_priority: bool,
    last_run: u16,
}

impl<T, E> Task<T, E> {
    /// A task run every tick, time permitting.
    pub fn new(f: TaskFn<T, E>) -> Self {
        Self {
            f,
            hz: 0.,
            max_time_us: 0,
            high_priority: false,
            last_run: 0,
        }
    }

    /// A task run every tick regardless of the time budget.
    pub fn high_priority(f: TaskFn<T, E>) -> Self {
        Self {
            high_priority: true,
            ..Self::new(f)
        }
    }

    pub fn with_hz(mut self, hz: f32) -> Self {
        self.hz = hz;
        self
    }

    /// Time (in microseconds) this task needs; it is skipped on ticks with less available.
    pub fn with_max_time(mut self, micros: u32) -> Self {
        self.max_time_us = micros;
        self
    }

    pub fn hz(&self) -> f32 {
        self.hz
    }

    pub fn max_time_us(&self) -> u32 {
        self.max_time_us
    }

    pub fn is_high_priority(&self) -> bool {
        self.high_priority
    }

    pub fn last_run(&self) -> u16 {
        self.last_run
    }

    /// Scheduler ticks between runs at `loop_rate_hz`.
    pub fn interval_ticks(&self, loop_rate_hz: u16) -> u16 {
        if self.hz <= 0. {
            return 1;
        }
        ((loop_rate_hz as f32 / self.hz) as u16).max(1)
    }

    /// Ticks elapsed since the last run if at least `interval` have passed.
    pub fn due(&self, tick: u16, interval: u16) -> Option<u16> {
        let elapsed = tick.wrapping_sub(self.last_run);
        (elapsed >= interval).then_some(elapsed)
    }

    pub(super) fn run(&mut self, event: Event<'_, T>, tick: u16) -> Result<(), E> {
        (self.f)(event)?;
        self.last_run = tick;
        Ok(())
    }
}
