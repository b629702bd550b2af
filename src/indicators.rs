//! The five indicator LEDs, one above each button.

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;

use crate::{
    keypad::BUTTON_COUNT,
    shift_register::drive,
};

/// Controls the indicator LEDs.
pub struct Indicators<P> {
    leds: [P; BUTTON_COUNT],
}

impl<P: OutputPin<Error = Infallible>> Indicators<P> {
    /// Takes the LED lines and switches them all off.
    pub fn new(leds: [P; BUTTON_COUNT]) -> Self {
        let mut indicators = Self { leds };
        indicators.all_off();
        indicators
    }

    /// Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, on: bool) {
        if let Some(led) = self.leds.get_mut(index) {
            drive(led, on);
        }
    }

    pub fn on(&mut self, index: usize) {
        self.set(index, true);
    }

    pub fn off(&mut self, index: usize) {
        self.set(index, false);
    }

    pub fn all_off(&mut self) {
        for led in &mut self.leds {
            drive(led, false);
        }
    }
}
