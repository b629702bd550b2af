//! Five momentary buttons with polled debouncing.
//!
//! Buttons pull their line low when pressed (inputs use the internal
//! pull-ups). Only one press is handled at a time: when several buttons are
//! held, the lowest index wins.

use core::convert::Infallible;

use embedded_hal::digital::InputPin;
use embedded_hal_async::delay::DelayNs;

use crate::config::Timing;

/// Number of buttons (and matching LEDs).
pub const BUTTON_COUNT: usize = 5;

/// The five game buttons, in priority order.
pub struct Keypad<I> {
    buttons: [I; BUTTON_COUNT],
}

impl<I: InputPin<Error = Infallible>> Keypad<I> {
    pub const fn new(buttons: [I; BUTTON_COUNT]) -> Self {
        Self { buttons }
    }

    /// Index of the first pressed button, if any. Never waits.
    pub fn poll_pressed(&mut self) -> Option<usize> {
        self.buttons.iter_mut().position(|button| {
            let Ok(low) = button.is_low();
            low
        })
    }

    pub fn is_pressed(&mut self, index: usize) -> bool {
        self.buttons.get_mut(index).is_some_and(|button| {
            let Ok(low) = button.is_low();
            low
        })
    }

    /// Wait for a debounced press and return which button it was.
    ///
    /// A press that is gone again after the settle delay was a bounce and is
    /// ignored.
    pub async fn wait_press(&mut self, delay: &mut impl DelayNs, timing: &Timing) -> usize {
        loop {
            while self.poll_pressed().is_none() {
                delay.delay_ms(timing.poll_ms).await;
            }
            delay.delay_ms(timing.settle_ms).await;
            if let Some(index) = self.poll_pressed() {
                trace!("button {} pressed", index);
                return index;
            }
        }
    }

    /// Wait until every button is released.
    pub async fn wait_release(&mut self, delay: &mut impl DelayNs, timing: &Timing) {
        while self.poll_pressed().is_some() {
            delay.delay_ms(timing.poll_ms).await;
        }
    }
}
