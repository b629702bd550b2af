//! Simulated board for host tests.
//!
//! Output pins append every level change to a shared [`Wire`] log, buttons
//! read a shared [`Panel`] bitmask, and every async pause advances a virtual
//! clock and yields exactly once, so joined futures interleave the way tasks
//! do on the cooperative executor.

#![allow(dead_code)]

use std::{
    cell::{
        Cell,
        RefCell,
    },
    convert::Infallible,
    rc::Rc,
};

use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embedded_hal::digital::{
    ErrorType,
    InputPin,
    OutputPin,
};
use rand::{
    SeedableRng,
    rngs::SmallRng,
};
use segment_simon::{
    BUTTON_COUNT,
    BitOrder,
    DisplayBus,
    DisplayTask,
    Effect,
    Game,
    Indicators,
    Keypad,
    Phase,
    Playback,
    SegmentDisplay,
    SharedState,
    ShiftRegister,
    Sound,
    Timing,
};

// ── Output lines ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    Data,
    ShiftClock,
    StoreClock,
    DigitA,
    DigitB,
    Led(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub line: Line,
    pub high: bool,
}

/// What the two digits show right after a digit-select.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shown {
    pub bits: u8,
    pub digit_a: bool,
    pub digit_b: bool,
}

#[derive(Clone, Default)]
pub struct Wire(Rc<RefCell<Vec<Edge>>>);

impl Wire {
    pub fn pin(&self, line: Line) -> SimPin {
        SimPin {
            line,
            wire: self.clone(),
        }
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Bytes presented on the register outputs, one per store-clock pulse,
    /// replaying the edges through a 74HC595 model.
    pub fn latched(&self) -> Vec<u8> {
        let mut data = false;
        let mut shift = 0u8;
        let mut latched = Vec::new();
        for edge in self.edges() {
            match edge.line {
                Line::Data => data = edge.high,
                Line::ShiftClock if edge.high => shift = (shift << 1) | u8::from(data),
                Line::StoreClock if edge.high => latched.push(shift),
                _ => {}
            }
        }
        latched
    }

    /// Display state sampled after each digit select (commons are active low;
    /// the driver always writes digit A then digit B).
    pub fn shown(&self) -> Vec<Shown> {
        let mut data = false;
        let mut shift = 0u8;
        let mut outputs = 0u8;
        let mut digit_a_low = false;
        let mut shown = Vec::new();
        for edge in self.edges() {
            match edge.line {
                Line::Data => data = edge.high,
                Line::ShiftClock if edge.high => shift = (shift << 1) | u8::from(data),
                Line::StoreClock if edge.high => outputs = shift,
                Line::DigitA => digit_a_low = !edge.high,
                Line::DigitB => shown.push(Shown {
                    bits: outputs,
                    digit_a: digit_a_low,
                    digit_b: !edge.high,
                }),
                _ => {}
            }
        }
        shown
    }

    /// Indices of LEDs in the order they were switched on.
    pub fn leds_lit(&self) -> Vec<usize> {
        self.edges()
            .into_iter()
            .filter_map(|edge| match edge.line {
                Line::Led(index) if edge.high => Some(index),
                _ => None,
            })
            .collect()
    }
}

pub struct SimPin {
    line: Line,
    wire: Wire,
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.wire.0.borrow_mut().push(Edge {
            line: self.line,
            high: false,
        });
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.wire.0.borrow_mut().push(Edge {
            line: self.line,
            high: true,
        });
        Ok(())
    }
}

// ── Buttons ─────────────────────────────────────────────────────────────────

/// Held buttons as a bitmask.
#[derive(Clone, Default)]
pub struct Panel(Rc<Cell<u8>>);

/// Yields a tap keeps a button down, and waits after letting go.
pub const TAP_YIELDS: usize = 20;

impl Panel {
    pub fn button(&self, index: usize) -> SimButton {
        SimButton {
            index,
            panel: self.clone(),
        }
    }

    pub fn press(&self, index: usize) {
        self.0.set(self.0.get() | (1 << index));
    }

    pub fn release(&self, index: usize) {
        self.0.set(self.0.get() & !(1 << index));
    }

    pub async fn tap(&self, index: usize) {
        self.press(index);
        yields(TAP_YIELDS).await;
        self.release(index);
        yields(TAP_YIELDS).await;
    }
}

pub struct SimButton {
    index: usize,
    panel: Panel,
}

impl ErrorType for SimButton {
    type Error = Infallible;
}

impl InputPin for SimButton {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.panel.0.get() & (1 << self.index) == 0)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.panel.0.get() & (1 << self.index) != 0)
    }
}

// ── Time ────────────────────────────────────────────────────────────────────

/// Virtual time spent in delays, plus the length of every async pause.
#[derive(Clone, Default)]
pub struct Clock {
    ns: Rc<Cell<u64>>,
    pauses: Rc<RefCell<Vec<u32>>>,
}

impl Clock {
    pub fn ns(&self) -> u64 {
        self.ns.get()
    }

    pub fn ms(&self) -> u64 {
        self.ns.get() / 1_000_000
    }

    /// Async pauses in ms, oldest first.
    pub fn pauses_ms(&self) -> Vec<u32> {
        self.pauses.borrow().iter().map(|ns| ns / 1_000_000).collect()
    }

    fn advance(&self, ns: u32) {
        self.ns.set(self.ns.get() + u64::from(ns));
    }

    pub fn delay(&self) -> SimDelay {
        SimDelay {
            clock: Some(self.clone()),
        }
    }
}

/// Blocking waits return at once; async waits yield once. Both advance the
/// clock, if there is one.
#[derive(Default)]
pub struct SimDelay {
    clock: Option<Clock>,
}

impl embedded_hal::delay::DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        if let Some(clock) = &self.clock {
            clock.advance(ns);
        }
    }
}

impl embedded_hal_async::delay::DelayNs for SimDelay {
    async fn delay_ns(&mut self, ns: u32) {
        if let Some(clock) = &self.clock {
            clock.advance(ns);
            clock.pauses.borrow_mut().push(ns);
        }
        yield_now().await;
    }
}

pub async fn yields(count: usize) {
    for _ in 0..count {
        yield_now().await;
    }
}

pub async fn until(mut done: impl FnMut() -> bool) {
    while !done() {
        yield_now().await;
    }
}

// ── Sound ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundEvent {
    Play(Effect, Playback),
    Stop,
    Volume(u8),
}

#[derive(Clone, Default)]
pub struct SoundLog(Rc<RefCell<Vec<SoundEvent>>>);

impl SoundLog {
    pub fn events(&self) -> Vec<SoundEvent> {
        self.0.borrow().clone()
    }
}

pub struct SimSound(SoundLog);

impl Sound for SimSound {
    async fn play(&mut self, effect: Effect, playback: Playback) {
        self.0.0.borrow_mut().push(SoundEvent::Play(effect, playback));
        yield_now().await;
    }

    fn stop_all(&mut self) {
        self.0.0.borrow_mut().push(SoundEvent::Stop);
    }

    fn set_volume(&mut self, volume: u8) {
        self.0.0.borrow_mut().push(SoundEvent::Volume(volume));
    }
}

// ── Whole board ─────────────────────────────────────────────────────────────

pub type SimShared = SharedState<NoopRawMutex>;
pub type SimBus = DisplayBus<NoopRawMutex, SimPin, SimDelay>;
pub type SimGame<'a> = Game<'a, NoopRawMutex, SimPin, SimDelay, SimButton, SimSound, SmallRng, SimDelay>;
pub type SimDisplayTask<'a> = DisplayTask<'a, NoopRawMutex, SimPin, SimDelay, SimDelay>;

pub struct Rig {
    pub shared: SimShared,
    pub bus: SimBus,
    pub wire: Wire,
    pub panel: Panel,
    /// Time the game task spends paused.
    pub clock: Clock,
    /// Time the display task spends paused.
    pub display_clock: Clock,
    /// Busy-wait time inside shift-register pushes.
    pub hold_clock: Clock,
    pub sounds: SoundLog,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_order(BitOrder::MsbFirst)
    }

    pub fn with_order(order: BitOrder) -> Self {
        let wire = Wire::default();
        let hold_clock = Clock::default();
        let register = ShiftRegister::new(
            wire.pin(Line::Data),
            wire.pin(Line::ShiftClock),
            wire.pin(Line::StoreClock),
            hold_clock.delay(),
            order,
        );
        let display = SegmentDisplay::new(register, wire.pin(Line::DigitA), wire.pin(Line::DigitB));
        Self {
            shared: SharedState::new(),
            bus: DisplayBus::new(display),
            wire,
            panel: Panel::default(),
            clock: Clock::default(),
            display_clock: Clock::default(),
            hold_clock,
            sounds: SoundLog::default(),
        }
    }

    pub fn keypad(&self) -> Keypad<SimButton> {
        Keypad::new(core::array::from_fn(|index| self.panel.button(index)))
    }

    pub fn game(&self, seed: u64) -> SimGame<'_> {
        let leds: [SimPin; BUTTON_COUNT] = core::array::from_fn(|index| self.wire.pin(Line::Led(index)));
        Game::new(
            &self.shared,
            &self.bus,
            Indicators::new(leds),
            self.keypad(),
            SimSound(self.sounds.clone()),
            SmallRng::seed_from_u64(seed),
            self.clock.delay(),
        )
    }

    pub fn display_task(&self) -> SimDisplayTask<'_> {
        DisplayTask::new(&self.bus, &self.shared, self.display_clock.delay(), Timing::default())
    }
}

// ── Scripted player ─────────────────────────────────────────────────────────

/// Repeat the presented pattern, then press to continue; `rounds` times.
pub async fn answer_rounds(shared: &SimShared, panel: &Panel, rounds: usize) {
    for _ in 0..rounds {
        until(|| shared.phase() == Phase::AwaitingInput).await;
        for position in 0..shared.pattern_len() {
            let step = shared.step(position).expect("pattern step");
            panel.tap(usize::from(step)).await;
        }
        until(|| shared.phase() == Phase::RoundAdvance).await;
        panel.tap(0).await;
    }
}

/// Answer correctly up to `position` of the next round, then press a wrong button.
pub async fn answer_wrong_at(shared: &SimShared, panel: &Panel, position: usize) {
    until(|| shared.phase() == Phase::AwaitingInput).await;
    for current in 0..shared.pattern_len() {
        let step = usize::from(shared.step(current).expect("pattern step"));
        if current == position {
            panel.tap((step + 1) % BUTTON_COUNT).await;
            return;
        }
        panel.tap(step).await;
    }
}
