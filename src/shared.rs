//! State shared between the game task and the display task.
//!
//! The game is the only writer. The display task only reads the score and the
//! mode, and reports back whether it has let go of the display hardware.
//!
//! # Display hand-off
//!
//! No lock guards the shift register and digit lines across a whole sequence;
//! ownership moves by protocol:
//!
//! 1. the game sets [`DisplayMode::Blank`];
//! 2. the display task observes `Blank` in [`SharedState::claim`] and, in the
//!    same step, marks the hardware as vacated;
//! 3. the game waits for [`SharedState::is_vacated`] before its first write;
//! 4. the game hands the hardware back by setting any other mode.
//!
//! The display task must observe `Blank` before (never after) the game writes.

use alloc::vec::Vec;
use core::cell::RefCell;

use embassy_sync::blocking_mutex::{
    Mutex,
    raw::RawMutex,
};

/// What the display task should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    ShowScore,
    ShowFailureGlyph,
    /// Hardware belongs to the game task.
    Blank,
}

/// Where the game state machine currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Idle,
    Presenting,
    AwaitingInput,
    RoundAdvance,
    Failure,
}

struct State {
    score: u32,
    mode: DisplayMode,
    vacated: bool,
    phase: Phase,
    pattern: Vec<u8>,
}

/// Score, pattern, phase and display mode, behind one blocking mutex.
pub struct SharedState<M: RawMutex> {
    state: Mutex<M, RefCell<State>>,
}

impl<M: RawMutex> SharedState<M> {
    /// State at power-on: display blanked so the boot sequence owns the hardware.
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(State {
                score: 0,
                mode: DisplayMode::Blank,
                vacated: true,
                phase: Phase::Idle,
                pattern: Vec::new(),
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        self.state.lock(|state| f(&mut state.borrow_mut()))
    }

    /// Start a new game: score 0, empty pattern, score on the display.
    pub fn reset(&self) {
        self.with(|state| {
            state.score = 0;
            state.pattern.clear();
            state.phase = Phase::Idle;
            state.mode = DisplayMode::ShowScore;
        });
    }

    pub fn score(&self) -> u32 {
        self.with(|state| state.score)
    }

    /// Add one successful round; returns the new score.
    pub fn increment_score(&self) -> u32 {
        self.with(|state| {
            state.score += 1;
            state.score
        })
    }

    pub fn mode(&self) -> DisplayMode {
        self.with(|state| state.mode)
    }

    pub fn set_mode(&self, mode: DisplayMode) {
        self.with(|state| state.mode = mode);
    }

    /// Display side of the hand-off: read the mode and record whether the
    /// hardware is free, as one step.
    pub fn claim(&self) -> DisplayMode {
        self.with(|state| {
            state.vacated = state.mode == DisplayMode::Blank;
            state.mode
        })
    }

    /// `true` once the display task has seen `Blank` and stopped writing.
    pub fn is_vacated(&self) -> bool {
        self.with(|state| state.mode == DisplayMode::Blank && state.vacated)
    }

    pub fn phase(&self) -> Phase {
        self.with(|state| state.phase)
    }

    pub fn set_phase(&self, phase: Phase) {
        self.with(|state| state.phase = phase);
    }

    pub fn push_step(&self, index: u8) {
        self.with(|state| state.pattern.push(index));
    }

    pub fn pattern_len(&self) -> usize {
        self.with(|state| state.pattern.len())
    }

    pub fn step(&self, position: usize) -> Option<u8> {
        self.with(|state| state.pattern.get(position).copied())
    }

    pub fn pattern(&self) -> Vec<u8> {
        self.with(|state| state.pattern.clone())
    }
}

impl<M: RawMutex> Default for SharedState<M> {
    fn default() -> Self {
        Self::new()
    }
}
