use super::StatusIndicator;
use embedded_hal::digital::v2::OutputPin;

/// Armed-status LED on a GPIO pin.
pub struct Led<P> {
    pin: P,
    active_low: bool,
}

impl<P: OutputPin> Led<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
        }
    }

    /// Create an LED that lights when its pin is driven low.
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
        }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> StatusIndicator for Led<P> {
    fn show_armed_status(&mut self, armed: bool) {
        // A failed GPIO write must not stop the control cycle
        let _ = if armed != self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
    }
}
