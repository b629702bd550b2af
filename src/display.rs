//! Two-digit multiplexed 7-segment display.
//!
//! Both digits share the segment lines coming out of the shift register; each
//! digit has its own common line (active low). Lighting digit A, holding,
//! then lighting digit B and holding again, fast enough, makes both look lit.

use core::{
    cell::RefCell,
    convert::Infallible,
};

use embassy_sync::blocking_mutex::{
    Mutex,
    raw::RawMutex,
};
use embedded_hal::{
    delay::DelayNs,
    digital::OutputPin,
};
use embedded_hal_async::delay::DelayNs as AsyncDelayNs;

use crate::{
    config::Timing,
    glyph::{
        self,
        Glyph,
        ScoreDigits,
    },
    shared::{
        DisplayMode,
        SharedState,
    },
    shift_register::{
        ShiftRegister,
        drive,
    },
};

/// Shift register plus the two digit commons.
pub struct SegmentDisplay<P, D> {
    register: ShiftRegister<P, D>,
    digit_a: P,
    digit_b: P,
}

impl<P, D> SegmentDisplay<P, D>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    pub fn new(register: ShiftRegister<P, D>, digit_a: P, digit_b: P) -> Self {
        Self {
            register,
            digit_a,
            digit_b,
        }
    }

    pub fn show_digit_a(&mut self, glyph: Glyph) {
        self.register.push(glyph.bits());
        self.select(true, false);
    }

    pub fn show_digit_b(&mut self, glyph: Glyph) {
        self.register.push(glyph.bits());
        self.select(false, true);
    }

    pub fn show_both(&mut self, glyph: Glyph) {
        self.register.push(glyph.bits());
        self.select(true, true);
    }

    /// Commons off first so the old pattern never ghosts onto a digit.
    pub fn clear(&mut self) {
        self.select(false, false);
        self.register.push(Glyph::BLANK.bits());
    }

    fn select(&mut self, a: bool, b: bool) {
        drive(&mut self.digit_a, !a);
        drive(&mut self.digit_b, !b);
    }
}

/// The display hardware, shared by the display task and the game task.
///
/// Access is synchronous and never spans an `.await`. Which task may write at
/// a given moment is decided by the hand-off in [`crate::shared`], not by this
/// mutex: it only keeps each single write whole.
pub struct DisplayBus<M: RawMutex, P, D> {
    display: Mutex<M, RefCell<SegmentDisplay<P, D>>>,
}

impl<M, P, D> DisplayBus<M, P, D>
where
    M: RawMutex,
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    pub fn new(display: SegmentDisplay<P, D>) -> Self {
        Self {
            display: Mutex::new(RefCell::new(display)),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut SegmentDisplay<P, D>) -> R) -> R {
        self.display.lock(|display| f(&mut display.borrow_mut()))
    }

    /// One multiplexed frame: digit A for `hold_ms`, then digit B for `hold_ms`.
    pub async fn render_frame(&self, delay: &mut impl AsyncDelayNs, a: Glyph, b: Glyph, hold_ms: u32) {
        self.with(|display| display.show_digit_a(a));
        delay.delay_ms(hold_ms).await;
        self.with(|display| display.show_digit_b(b));
        delay.delay_ms(hold_ms).await;
    }
}

/// Background task that keeps the score (or the failure glyph) on the display.
pub struct DisplayTask<'a, M: RawMutex, P, D, T> {
    bus: &'a DisplayBus<M, P, D>,
    shared: &'a SharedState<M>,
    delay: T,
    timing: Timing,
    /// Last score drawn in single-digit mode; `None` forces a redraw.
    rendered: Option<u32>,
}

impl<'a, M, P, D, T> DisplayTask<'a, M, P, D, T>
where
    M: RawMutex,
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
    T: AsyncDelayNs,
{
    pub fn new(bus: &'a DisplayBus<M, P, D>, shared: &'a SharedState<M>, delay: T, timing: Timing) -> Self {
        Self {
            bus,
            shared,
            delay,
            timing,
            rendered: None,
        }
    }

    pub async fn run(&mut self) -> ! {
        info!("display task started");
        loop {
            self.step().await;
        }
    }

    /// One pass of the refresh loop; always ends at a suspension point.
    pub async fn step(&mut self) {
        match self.shared.claim() {
            DisplayMode::Blank => {
                if self.rendered.take().is_some() {
                    trace!("display vacated");
                }
                self.delay.delay_ms(self.timing.poll_ms).await;
            }
            DisplayMode::ShowFailureGlyph => {
                self.rendered = None;
                let (a, b) = glyph::NO;
                self.bus
                    .render_frame(&mut self.delay, a, b, self.timing.frame_hold_ms)
                    .await;
            }
            DisplayMode::ShowScore => {
                let score = self.shared.score();
                match ScoreDigits::of(score) {
                    ScoreDigits::Single(units) => {
                        if self.rendered != Some(score) {
                            self.rendered = Some(score);
                            self.bus.with(|display| display.show_digit_b(units));
                        }
                        self.delay.delay_ms(self.timing.poll_ms).await;
                    }
                    ScoreDigits::Pair(tens, units) => {
                        self.rendered = Some(score);
                        self.bus
                            .render_frame(&mut self.delay, tens, units, self.timing.frame_hold_ms)
                            .await;
                    }
                }
            }
        }
    }
}
