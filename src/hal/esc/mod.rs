mod builder;
pub use builder::Builder;

use super::Motors;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::PwmPin;
use num_traits::NumCast;

/// Electronic speed controller driven by a PWM pin.
pub struct PwmEsc<P: PwmPin> {
    min: P::Duty,
    max: P::Duty,
    pin: P,
}

impl<P> PwmEsc<P>
where
    P: PwmPin,
    P::Duty: NumCast + Copy,
{
    pub fn new(min: P::Duty, max: P::Duty, pin: P) -> Self {
        Self { min, max, pin }
    }

    pub fn builder() -> Builder<P::Duty>
    where
        P::Duty: Default,
    {
        Builder::default()
    }

    /// Teach the ESC its throttle range by holding full then zero output.
    pub fn calibrate<D>(&mut self, delay: &mut D)
    where
        D: DelayMs<u16>,
    {
        self.pin.set_duty(self.max);
        delay.delay_ms(2000);

        self.pin.set_duty(self.min);
        delay.delay_ms(2000);
    }

    pub fn enable(&mut self) {
        self.pin.enable();
        self.pin.set_duty(self.min);
    }

    /// Output a value in [0, 1] scaled to the duty cycle range.
    pub fn output(&mut self, value: f32) {
        let min: f32 = NumCast::from(self.min).unwrap_or(0.);
        let max: f32 = NumCast::from(self.max).unwrap_or(min);

        let duty = min + value.max(0.).min(1.) * (max - min);
        if let Some(duty) = NumCast::from(duty) {
            self.pin.set_duty(duty);
        }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

/// A fixed set of ESCs addressed by motor index.
pub struct EscBank<P: PwmPin, const N: usize> {
    escs: [PwmEsc<P>; N],
}

impl<P, const N: usize> EscBank<P, N>
where
    P: PwmPin,
    P::Duty: NumCast + Copy,
{
    pub fn new(escs: [PwmEsc<P>; N]) -> Self {
        Self { escs }
    }

    pub fn calibrate<D>(&mut self, delay: &mut D)
    where
        D: DelayMs<u16>,
    {
        for esc in &mut self.escs {
            esc.calibrate(delay);
        }
    }

    pub fn escs(&self) -> &[PwmEsc<P>; N] {
        &self.escs
    }
}

impl<P, const N: usize> Motors for EscBank<P, N>
where
    P: PwmPin,
    P::Duty: NumCast + Copy,
{
    fn begin(&mut self) {
        for esc in &mut self.escs {
            esc.enable();
        }
    }

    fn write(&mut self, index: usize, value: f32) {
        if let Some(esc) = self.escs.get_mut(index) {
            esc.output(value);
        }
    }
}
