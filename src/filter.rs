use core::f32::consts::PI;
use num_traits::Float;

/// First-order low-pass filter whose gain adapts to the elapsed time between samples.
#[derive(Clone, Copy, Debug, Default)]
pub struct LowPassFilter {
    output: f32,
    rc: f32,
}

impl LowPassFilter {
    pub fn with_cutoff(cutoff_freq: f32) -> Self {
        Self {
            output: 0.,
            rc: time_constant(cutoff_freq),
        }
    }

    pub fn output(&self) -> f32 {
        self.output
    }

    /// Filter `sample` taken `dt` seconds after the previous one.
    pub fn apply(&mut self, sample: f32, dt: f32) -> f32 {
        self.output += alpha(dt, self.rc) * (sample - self.output);
        self.output
    }

    pub fn reset(&mut self, value: f32) {
        self.output = value;
    }
}

/// RC time constant (in seconds) of a first-order filter with the given cutoff (in hz).
pub fn time_constant(cutoff_freq: f32) -> f32 {
    0.5 / (PI * cutoff_freq)
}

fn alpha(dt: f32, rc: f32) -> f32 {
    if dt <= 0. {
        return 0.;
    }
    dt / (rc + dt)
}

/// Blend a new sample into the filtered history.
pub fn complementary(sample: f32, filtered: f32, factor: f32) -> f32 {
    sample * factor + filtered * (1. - factor)
}

/// Zero values smaller than `deadband` and shift the rest towards zero by it.
pub fn deadband(value: f32, deadband: f32) -> f32 {
    if value.abs() < deadband {
        0.
    } else if value > 0. {
        value - deadband
    } else {
        value + deadband
    }
}

/// Constrain `value` to `[-limit, limit]`.
pub fn constrain_abs(value: f32, limit: f32) -> f32 {
    value.max(-limit).min(limit)
}
