use embedded_hal::PwmPin;

use super::PwmEsc;

pub struct Builder<T> {
    min: T,
    max: Option<T>,
}

impl<T: Default> Default for Builder<T> {
    fn default() -> Self {
        Self {
            min: T::default(),
            max: None,
        }
    }
}

impl<T> Builder<T> {
    /// Duty cycle for a stopped motor.
    pub fn min(mut self, min: T) -> Self {
        self.min = min;
        self
    }

    /// Duty cycle for full output. Defaults to the pin's maximum duty.
    pub fn max(mut self, max: T) -> Self {
        self.max = Some(max);
        self
    }

    pub fn build<P>(self, pin: P) -> PwmEsc<P>
    where
        P: PwmPin<Duty = T>,
    {
        PwmEsc {
            min: self.min,
            max: self.max.unwrap_or_else(|| pin.get_max_duty()),
            pin,
        }
    }
}
