//! Sound effects and the playback service the game talks to.
//!
//! Synthesis lives behind [`Sound`]; the board implements it with a buzzer
//! task, tests with a recorder.

/// Notes the game uses. Buttons 0-4 map to C, D, E, F, G.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Note {
    C4,
    D4,
    E4,
    F4,
    G4,
    A4,
    C5,
    E5,
    G5,
}

impl Note {
    pub const BUTTONS: [Self; 5] = [Self::C4, Self::D4, Self::E4, Self::F4, Self::G4];

    pub const fn frequency_hz(self) -> u32 {
        match self {
            Self::C4 => 262,
            Self::D4 => 294,
            Self::E4 => 330,
            Self::F4 => 349,
            Self::G4 => 392,
            Self::A4 => 440,
            Self::C5 => 523,
            Self::E5 => 659,
            Self::G5 => 784,
        }
    }

    /// Note played for a button; `None` for an index without a button.
    pub fn for_button(index: usize) -> Option<Self> {
        Self::BUTTONS.get(index).copied()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    Tone { note: Note, duration_ms: u32 },
    /// Sounds until stopped or replaced.
    Ring(Note),
    /// Square-wave sweep from 1600 Hz down to 1 Hz.
    Laser,
    PowerUp,
}

impl Effect {
    pub const LASER_FROM_HZ: u32 = 1600;
    pub const LASER_TO_HZ: u32 = 1;
    pub const LASER_MS: u32 = 300;

    /// Half-periods of the laser sweep in µs. The last one is cut short so
    /// the sweep lasts exactly [`Self::LASER_MS`].
    pub fn laser_half_periods() -> impl Iterator<Item = u64> {
        let total_us = u64::from(Self::LASER_MS) * 1000;
        let span = u64::from(Self::LASER_FROM_HZ - Self::LASER_TO_HZ);
        let mut elapsed_us = 0;
        core::iter::from_fn(move || {
            if elapsed_us >= total_us {
                return None;
            }
            let hz = u64::from(Self::LASER_FROM_HZ) - span * elapsed_us / total_us;
            let half_us = (500_000 / hz.max(1)).min(total_us - elapsed_us);
            elapsed_us += half_us;
            Some(half_us)
        })
    }
}

/// Power-up jingle as (note, length in sixteenth notes at 120 bpm).
pub const POWER_UP: [(Note, u32); 6] = [
    (Note::G4, 1),
    (Note::C5, 1),
    (Note::E5, 1),
    (Note::G5, 2),
    (Note::E5, 1),
    (Note::G5, 3),
];

/// Milliseconds of one sixteenth note in [`POWER_UP`].
pub const POWER_UP_TICK_MS: u32 = 125;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Playback {
    /// Return once the effect has finished.
    UntilDone,
    /// Start the effect and return immediately.
    Background,
}

/// Tone playback service.
#[allow(async_fn_in_trait)]
pub trait Sound {
    async fn play(&mut self, effect: Effect, playback: Playback);

    /// Silence whatever is playing.
    fn stop_all(&mut self);

    /// 0 mutes, 255 is full volume.
    fn set_volume(&mut self, volume: u8);
}

/// Game speed in beats per minute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tempo(pub u16);

impl Tempo {
    pub const fn bpm(self) -> u16 {
        self.0
    }

    pub const fn beat_ms(self) -> u32 {
        if self.0 == 0 { 0 } else { 60_000 / self.0 as u32 }
    }

    /// Length of a tone and of the rest between two presented steps.
    pub const fn quarter_ms(self) -> u32 {
        self.beat_ms() / 4
    }
}
