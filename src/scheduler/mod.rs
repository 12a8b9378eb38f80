//! Time-triggered cooperative task scheduler.

use embedded_time::{clock, duration::Microseconds, Clock, ConversionError};

mod task;
pub use task::{Event, Task};

/// Extra time (in microseconds) added to the budget each tick a task falls behind.
const EXTRA_LOOP_STEP_US: u32 = 100;
const EXTRA_LOOP_MAX_US: u32 = 5_000;
const EXTRA_LOOP_DECAY_US: u32 = 50;

/// Ticks without a late task before the extra time starts to decay.
const ALL_ACHIEVED_TICKS: u32 = 50;

/// How many intervals a task may fall behind before the budget is raised.
const MAX_TASK_SLOWDOWN: u16 = 4;

/// A scheduler error caused by clock timing
#[derive(Debug)]
pub enum Error {
    Clock(clock::Error),
    Time(ConversionError),
}

impl From<clock::Error> for Error {
    fn from(clock_error: clock::Error) -> Self {
        Error::Clock(clock_error)
    }
}

impl From<ConversionError> for Error {
    fn from(time_error: ConversionError) -> Self {
        Error::Time(time_error)
    }
}

/// Runs high priority tasks every tick and the rest at their own rate, as time allows.
pub struct Scheduler<'a, C, T, E = Error> {
    tasks: &'a mut [Task<T, E>],
    clock: C,
    tick: u16,
    loop_rate_hz: u16,
    loop_period_us: u32,
    // Budget raised while tasks fall behind and slowly lowered once they catch up
    extra_loop_us: u32,
    tasks_not_achieved: u32,
    ticks_all_achieved: u32,
    loop_start_us: Option<u32>,
    last_loop_time_s: f32,
}

impl<'a, C, T, E> Scheduler<'a, C, T, E>
where
    C: Clock<T = u32>,
    E: From<Error>,
{
    pub fn new(tasks: &'a mut [Task<T, E>], clock: C, loop_rate_hz: u16) -> Self {
        let loop_rate_hz = loop_rate_hz.max(1);
        Self {
            tasks,
            clock,
            tick: 0,
            loop_rate_hz,
            loop_period_us: 1_000_000 / loop_rate_hz as u32,
            extra_loop_us: 0,
            tasks_not_achieved: 0,
            ticks_all_achieved: 0,
            loop_start_us: None,
            last_loop_time_s: 1. / loop_rate_hz as f32,
        }
    }

    /// Run one scheduler tick.
    pub fn run(&mut self, system: &mut T) -> Result<(), E> {
        let sample_time_us = self.micros_since_epoch()?.0;

        if let Some(start) = self.loop_start_us {
            self.last_loop_time_s = sample_time_us.wrapping_sub(start) as f32 * 1e-6;
        }

        self.tick = self.tick.wrapping_add(1);

        let now = self.micros_since_epoch()?;
        let elapsed_us = now.0.wrapping_sub(sample_time_us);
        let time_available = self.loop_period_us.saturating_sub(elapsed_us) + self.extra_loop_us;

        self.run_tasks(system, now, time_available)?;

        if self.tasks_not_achieved > 0 {
            self.extra_loop_us = (self.extra_loop_us + EXTRA_LOOP_STEP_US).min(EXTRA_LOOP_MAX_US);
            self.tasks_not_achieved = 0;
            self.ticks_all_achieved = 0;
        } else if self.extra_loop_us > 0 {
            self.ticks_all_achieved += 1;
            if self.ticks_all_achieved > ALL_ACHIEVED_TICKS {
                self.ticks_all_achieved = 0;
                self.extra_loop_us = self.extra_loop_us.saturating_sub(EXTRA_LOOP_DECAY_US);
            }
        }

        self.loop_start_us = Some(sample_time_us);

        Ok(())
    }

    /// Run the due tasks now with an explicit time budget (in microseconds).
    pub fn run_with_time_available(
        &mut self,
        system: &mut T,
        time_available: u32,
    ) -> Result<(), E> {
        let now = self.micros_since_epoch()?;
        self.run_tasks(system, now, time_available)
    }

    pub fn tick(&self) -> u16 {
        self.tick
    }

    /// Time (in seconds) between the starts of the last two ticks.
    pub fn last_loop_time(&self) -> f32 {
        self.last_loop_time_s
    }

    pub fn extra_loop_us(&self) -> u32 {
        self.extra_loop_us
    }

    pub fn tasks(&self) -> &[Task<T, E>] {
        self.tasks
    }

    fn run_tasks(
        &mut self,
        system: &mut T,
        now: Microseconds<u32>,
        time_available: u32,
    ) -> Result<(), E> {
        for task in self.tasks.iter_mut() {
            if !task.is_high_priority() {
                let interval = task.interval_ticks(self.loop_rate_hz);
                let Some(elapsed) = task.due(self.tick, interval) else {
                    continue;
                };

                if elapsed >= interval.saturating_mul(MAX_TASK_SLOWDOWN) {
                    self.tasks_not_achieved += 1;
                }

                if task.max_time_us() > time_available {
                    trace!("task skipped, {} us available", time_available);
                    continue;
                }
            }

            let event = Event {
                state: &mut *system,
                now,
                available: Microseconds::new(time_available),
            };
            task.run(event, self.tick)?;
        }

        Ok(())
    }

    fn micros_since_epoch(&mut self) -> Result<Microseconds<u32>, Error> {
        let instant = self.clock.try_now()?;
        Microseconds::try_from(instant.duration_since_epoch()).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use embedded_time::{fraction::Fraction, Instant};

    /// Advances by a fixed step every time it is read.
    struct SteppingClock {
        now: Cell<u32>,
        step: u32,
        fail: bool,
    }

    impl SteppingClock {
        fn new(step: u32) -> Self {
            Self {
                now: Cell::new(0),
                step,
                fail: false,
            }
        }
    }

    impl Clock for SteppingClock {
        type T = u32;

        const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);

        fn try_now(&self) -> Result<Instant<Self>, clock::Error> {
            if self.fail {
                return Err(clock::Error::NotRunning);
            }
            let now = self.now.get();
            self.now.set(now.wrapping_add(self.step));
            Ok(Instant::new(now))
        }
    }

    #[derive(Default)]
    struct Counts {
        fast: u32,
        slow: u32,
        heavy: u32,
        last_available: u32,
    }

    fn fast(event: Event<'_, Counts>) -> Result<(), Error> {
        event.state.fast += 1;
        Ok(())
    }

    fn slow(event: Event<'_, Counts>) -> Result<(), Error> {
        event.state.slow += 1;
        event.state.last_available = event.available.0;
        Ok(())
    }

    fn heavy(event: Event<'_, Counts>) -> Result<(), Error> {
        event.state.heavy += 1;
        Ok(())
    }

    #[test]
    fn tasks_run_at_their_rates() {
        let mut tasks = [
            Task::high_priority(fast),
            Task::new(slow).with_hz(100.).with_max_time(100),
        ];
        let mut scheduler = Scheduler::new(&mut tasks, SteppingClock::new(10), 400);
        let mut counts = Counts::default();

        for _ in 0..40 {
            scheduler.run(&mut counts).unwrap();
        }

        assert_eq!(counts.fast, 40);
        assert_eq!(counts.slow, 10);
        assert_eq!(counts.last_available, 2_500 - 10);
        assert_eq!(scheduler.tick(), 40);
        assert_eq!(scheduler.tasks()[1].last_run(), 40);
    }

    #[test]
    fn loop_time_tracks_clock() {
        let mut tasks: [Task<Counts>; 0] = [];
        let mut scheduler = Scheduler::new(&mut tasks, SteppingClock::new(1_000), 400);
        let mut counts = Counts::default();

        assert_eq!(scheduler.last_loop_time(), 1. / 400.);
        scheduler.run(&mut counts).unwrap();
        scheduler.run(&mut counts).unwrap();

        // Two clock reads per tick
        assert!((scheduler.last_loop_time() - 0.002).abs() < 1e-6);
    }

    #[test]
    fn late_task_raises_budget_until_it_fits() {
        let mut tasks = [Task::new(heavy).with_hz(100.).with_max_time(5_000)];
        let mut scheduler = Scheduler::new(&mut tasks, SteppingClock::new(10), 400);
        let mut counts = Counts::default();

        for _ in 0..20 {
            scheduler.run(&mut counts).unwrap();
        }
        assert_eq!(counts.heavy, 0);
        assert!(scheduler.extra_loop_us() > 0);

        for _ in 0..40 {
            scheduler.run(&mut counts).unwrap();
        }
        assert!(counts.heavy > 0);
    }

    #[test]
    fn budget_decays_once_tasks_catch_up() {
        let mut tasks = [Task::new(heavy).with_hz(100.).with_max_time(5_000)];
        let mut scheduler = Scheduler::new(&mut tasks, SteppingClock::new(10), 400);
        let mut counts = Counts::default();

        while counts.heavy == 0 {
            scheduler.run(&mut counts).unwrap();
        }
        let raised = scheduler.extra_loop_us();

        for _ in 0..200 {
            scheduler.run(&mut counts).unwrap();
        }
        assert!(scheduler.extra_loop_us() < raised);
    }

    #[test]
    fn explicit_budget_gates_heavy_task() {
        let mut tasks = [Task::new(heavy).with_max_time(5_000)];
        let mut scheduler = Scheduler::new(&mut tasks, SteppingClock::new(10), 400);
        let mut counts = Counts::default();

        scheduler.run(&mut counts).unwrap();
        assert_eq!(counts.heavy, 0);

        scheduler.run_with_time_available(&mut counts, 1_000).unwrap();
        assert_eq!(counts.heavy, 0);

        scheduler.run_with_time_available(&mut counts, 6_000).unwrap();
        assert_eq!(counts.heavy, 1);
    }

    #[test]
    fn clock_errors_propagate() {
        let mut tasks = [Task::high_priority(fast)];
        let mut clock = SteppingClock::new(10);
        clock.fail = true;
        let mut scheduler = Scheduler::new(&mut tasks, clock, 400);
        let mut counts = Counts::default();

        let result = scheduler.run(&mut counts);
        assert!(matches!(result, Err(Error::Clock(clock::Error::NotRunning))));
        assert_eq!(counts.fast, 0);
    }
}
