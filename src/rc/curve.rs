use crate::config::{StickConfig, MAX_PULSE, MID_RC, MIN_PULSE};

/// Lookup table sampled every 100 input units, linearly interpolated in between.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lookup<const N: usize> {
    table: [f32; N],
}

impl<const N: usize> Lookup<N> {
    const VALID_LEN: () = assert!(N >= 2, "lookup table needs at least two entries");

    pub fn new(table: [f32; N]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_LEN;

        Self { table }
    }

    pub fn table(&self) -> &[f32; N] {
        &self.table
    }

    /// Interpolate at `x`, clamped to the table's domain `[0, (N - 1) * 100]`.
    pub fn interpolate(&self, x: u16) -> f32 {
        let x = (x as usize).min((N - 1) * 100);
        let idx = (x / 100).min(N - 2);
        let frac = (x - idx * 100) as f32 / 100.;

        self.table[idx] + frac * (self.table[idx + 1] - self.table[idx])
    }
}

/// Expo and rate curves mapping stick pulses to demands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Curves {
    cyclic: Lookup<7>,
    throttle: Lookup<12>,
}

impl Default for Curves {
    fn default() -> Self {
        Self::new(&StickConfig::default())
    }
}

impl Curves {
    pub fn new(config: &StickConfig) -> Self {
        let mut cyclic = [0.; 7];
        for (i, entry) in cyclic.iter_mut().enumerate() {
            let i = i as f32;
            *entry = (1. + config.expo * (i * i - 25.) / 25.) * i * config.rate / 5.;
        }

        let mid = config.throttle_mid;
        let expo = config.throttle_expo;
        let mut throttle = [0.; 12];
        for (i, entry) in throttle.iter_mut().enumerate() {
            let t = i as f32 / 10. - mid;
            let y = if t > 0. {
                1. - mid
            } else if t < 0. {
                mid
            } else {
                1.
            };
            *entry = mid + t * (1. - expo + expo * (t * t) / (y * y));
        }

        Self {
            cyclic: Lookup::new(cyclic),
            throttle: Lookup::new(throttle),
        }
    }

    /// Roll, pitch or yaw demand for a pulse width, symmetric around centre stick.
    pub fn cyclic(&self, pulse: u16) -> f32 {
        let deflection = pulse.abs_diff(MID_RC).min(500);
        let demand = self.cyclic.interpolate(deflection);

        if pulse < MID_RC {
            -demand
        } else {
            demand
        }
    }

    /// Throttle demand in [-1, 1] for a pulse width.
    pub fn throttle(&self, pulse: u16) -> f32 {
        let pulse = pulse.max(MIN_PULSE).min(MAX_PULSE);
        let x = (pulse - MIN_PULSE) as u32 * 1000 / (MAX_PULSE - MIN_PULSE) as u32;
        let throttle = self.throttle.interpolate(x as u16);

        throttle * 2. - 1.
    }
}
