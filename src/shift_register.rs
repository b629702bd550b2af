//! Bit-banged 74HC595-style serial-in/parallel-out shift register.
//!
//! Three lines drive the chip: serial data (DS), shift clock (SHCP) and
//! store/latch clock (STCP). A byte is shifted in one bit at a time and only
//! appears on the parallel outputs after the latch pulse.

use core::convert::Infallible;

use embedded_hal::{
    delay::DelayNs,
    digital::{
        OutputPin,
        PinState,
    },
};

/// Minimum hold time for every clock level.
const HOLD_US: u32 = 1;

/// Order in which the eight bits of a byte leave the data line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Bit 7 first. After a full byte, bit 7 sits on Q7 and bit 0 on Q0.
    #[default]
    MsbFirst,
    /// Bit 0 first.
    LsbFirst,
}

impl BitOrder {
    /// The eight bits of `byte` in transmission order.
    pub fn bits(self, byte: u8) -> impl Iterator<Item = bool> {
        (0..8u8).map(move |i| {
            let shift = match self {
                Self::MsbFirst => 7 - i,
                Self::LsbFirst => i,
            };
            (byte >> shift) & 1 != 0
        })
    }
}

/// Drive an infallible output line.
pub(crate) fn drive<P: OutputPin<Error = Infallible>>(pin: &mut P, high: bool) {
    let Ok(()) = pin.set_state(PinState::from(high));
}

/// Bit-bang driver for one shift register chip.
pub struct ShiftRegister<P, D> {
    data: P,
    shift_clock: P,
    store_clock: P,
    delay: D,
    order: BitOrder,
}

impl<P, D> ShiftRegister<P, D>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    /// The three lines must already be configured as outputs.
    pub fn new(data: P, shift_clock: P, store_clock: P, delay: D, order: BitOrder) -> Self {
        Self {
            data,
            shift_clock,
            store_clock,
            delay,
            order,
        }
    }

    /// Shift `bits` into the register and latch it onto the outputs.
    pub fn push(&mut self, bits: u8) {
        for bit in self.order.bits(bits) {
            drive(&mut self.data, bit);
            self.pulse_shift();
        }
        self.pulse_store();
    }

    fn pulse_shift(&mut self) {
        drive(&mut self.shift_clock, true);
        self.delay.delay_us(HOLD_US);
        drive(&mut self.shift_clock, false);
        self.delay.delay_us(HOLD_US);
    }

    fn pulse_store(&mut self) {
        drive(&mut self.store_clock, true);
        self.delay.delay_us(HOLD_US);
        drive(&mut self.store_clock, false);
    }
}
