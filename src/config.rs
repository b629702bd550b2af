//! Game-balance and timing parameters.

use crate::shift_register::BitOrder;

/// Pause/poll cadence shared by the keypad, the display task and the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Interval between two reads of a blocking poll loop.
    pub poll_ms: u32,
    /// Time a press must survive before it is accepted.
    pub settle_ms: u32,
    /// How long each digit stays lit within one multiplexed frame.
    pub frame_hold_ms: u32,
}

impl Timing {
    pub const fn new() -> Self {
        Self {
            poll_ms: 10,
            settle_ms: 20,
            frame_hold_ms: 5,
        }
    }

    #[must_use]
    pub const fn with_poll_ms(mut self, poll_ms: u32) -> Self {
        self.poll_ms = poll_ms;
        self
    }

    #[must_use]
    pub const fn with_settle_ms(mut self, settle_ms: u32) -> Self {
        self.settle_ms = settle_ms;
        self
    }

    #[must_use]
    pub const fn with_frame_hold_ms(mut self, frame_hold_ms: u32) -> Self {
        self.frame_hold_ms = frame_hold_ms;
        self
    }

    /// Length of one two-digit frame.
    pub const fn frame_ms(&self) -> u32 {
        self.frame_hold_ms * 2
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::new()
    }
}

/// Tunables of the game itself.
///
/// The defaults are the values the game shipped with: 60 bpm at the start,
/// one extra bpm every second successful round, capped at 80 bpm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GameConfig {
    pub start_tempo: u16,
    pub tempo_ceiling: u16,
    /// Tempo goes up when the score is a multiple of this.
    pub tempo_step_every: u32,
    pub timing: Timing,
    pub bit_order: BitOrder,
}

impl GameConfig {
    pub const fn new() -> Self {
        Self {
            start_tempo: 60,
            tempo_ceiling: 80,
            tempo_step_every: 2,
            timing: Timing::new(),
            bit_order: BitOrder::MsbFirst,
        }
    }

    #[must_use]
    pub const fn with_start_tempo(mut self, bpm: u16) -> Self {
        self.start_tempo = bpm;
        self
    }

    #[must_use]
    pub const fn with_tempo_ceiling(mut self, bpm: u16) -> Self {
        self.tempo_ceiling = bpm;
        self
    }

    #[must_use]
    pub const fn with_tempo_step_every(mut self, rounds: u32) -> Self {
        self.tempo_step_every = rounds;
        self
    }

    #[must_use]
    pub const fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub const fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    /// Tempo after `score` successful rounds, given the tempo before the round.
    ///
    /// A zero `tempo_step_every` disables the speed-up.
    pub const fn next_tempo(&self, score: u32, tempo: u16) -> u16 {
        if self.tempo_step_every != 0
            && score % self.tempo_step_every == 0
            && tempo < self.tempo_ceiling
        {
            tempo + 1
        } else {
            tempo
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
