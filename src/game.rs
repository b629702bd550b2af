//! The Simon game state machine.
//!
//! ```text
//! Idle -> Presenting -> AwaitingInput -+-> RoundAdvance -> Presenting ...
//!                                      +-> Failure -> Idle (restart)
//! ```
//!
//! A wrong button is an ordinary transition into `Failure`, not an error.
//! Every pause and poll is an `.await`, which is where the display task gets
//! to run.

use core::convert::Infallible;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::{
    delay::DelayNs,
    digital::{
        InputPin,
        OutputPin,
    },
};
use embedded_hal_async::delay::DelayNs as AsyncDelayNs;
use rand::{
    Rng,
    RngCore,
};

use crate::{
    config::GameConfig,
    display::DisplayBus,
    glyph::{
        self,
        Glyph,
    },
    indicators::Indicators,
    keypad::{
        BUTTON_COUNT,
        Keypad,
    },
    shared::{
        DisplayMode,
        Phase,
        SharedState,
    },
    sound::{
        Effect,
        Note,
        Playback,
        Sound,
        Tempo,
    },
};

/// Holding this button during boot mutes the game.
pub const MUTE_BUTTON: usize = 4;

const BOOT_BLINK_MS: u32 = 125;
const GREETING_MS: u32 = 1000;
const AFTER_GREETING_MS: u32 = 500;
const CONTINUE_PAUSE_MS: u32 = 500;
const FAILURE_RING_MS: u32 = 1000;
const FAILURE_SFX_MS: u32 = 1000;
const REVEAL_PAUSE_MS: u32 = 200;
const DOUBLE_DOT_MS: u32 = 750;
const RESTART_PAUSE_MS: u32 = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RoundOutcome {
    /// Whole pattern repeated; score went up.
    Advanced,
    /// Wrong button; the failure sequence has played and the game must restart.
    Failed,
}

/// The game task: owns the LEDs, buttons and sound, and borrows the display.
pub struct Game<'a, M: RawMutex, P, D, I, S, R, T> {
    shared: &'a SharedState<M>,
    display: &'a DisplayBus<M, P, D>,
    indicators: Indicators<P>,
    keypad: Keypad<I>,
    sound: S,
    rng: R,
    delay: T,
    config: GameConfig,
    tempo: Tempo,
}

impl<'a, M, P, D, I, S, R, T> Game<'a, M, P, D, I, S, R, T>
where
    M: RawMutex,
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
    I: InputPin<Error = Infallible>,
    S: Sound,
    R: RngCore,
    T: AsyncDelayNs,
{
    pub fn new(
        shared: &'a SharedState<M>,
        display: &'a DisplayBus<M, P, D>,
        indicators: Indicators<P>,
        keypad: Keypad<I>,
        sound: S,
        rng: R,
        delay: T,
    ) -> Self {
        let config = GameConfig::default();
        Self {
            shared,
            display,
            indicators,
            keypad,
            sound,
            rng,
            delay,
            tempo: Tempo(config.start_tempo),
            config,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.tempo = Tempo(config.start_tempo);
        self.config = config;
        self
    }

    pub const fn tempo(&self) -> Tempo {
        self.tempo
    }

    /// Boot, then play game after game forever.
    pub async fn run(&mut self) -> ! {
        self.boot().await;
        loop {
            self.initialize();
            while self.play_round().await == RoundOutcome::Advanced {}
            info!("game over, restarting");
        }
    }

    /// Power-on show: LED chase, display flash and the "hi" greeting.
    ///
    /// Expects the display to still be blank, as it is at power-on.
    pub async fn boot(&mut self) {
        info!("booting");
        if self.keypad.is_pressed(MUTE_BUTTON) {
            info!("button {} held at boot, muting", MUTE_BUTTON);
            self.sound.set_volume(0);
        }
        self.sound.play(Effect::PowerUp, Playback::Background).await;

        self.take_display().await;
        for _ in 0..2 {
            self.display.with(|display| display.show_both(Glyph::ALL));
        }

        for _ in 0..2 {
            for led in 0..BUTTON_COUNT - 1 {
                self.indicators.on(led);
                self.pause(BOOT_BLINK_MS).await;
                self.indicators.off(led);
            }
        }
        self.pause(BOOT_BLINK_MS).await;
        for _ in 0..3 {
            self.indicators.on(BUTTON_COUNT - 1);
            self.pause(BOOT_BLINK_MS).await;
            self.indicators.off(BUTTON_COUNT - 1);
            self.pause(BOOT_BLINK_MS).await;
        }

        let (h, i) = glyph::HI;
        let hold_ms = self.config.timing.frame_hold_ms;
        for _ in 0..GREETING_MS / self.config.timing.frame_ms().max(1) {
            self.display.render_frame(&mut self.delay, h, i, hold_ms).await;
        }
        self.display.with(|display| display.clear());
        self.pause(AFTER_GREETING_MS).await;
    }

    /// Fresh game: score 0, empty pattern, start tempo, score on the display.
    pub fn initialize(&mut self) {
        self.tempo = Tempo(self.config.start_tempo);
        self.shared.reset();
        info!("new game at {} bpm", self.tempo.bpm());
    }

    /// Present a pattern one step longer, then take the player's answer.
    pub async fn play_round(&mut self) -> RoundOutcome {
        self.shared.set_phase(Phase::Presenting);
        self.present(true).await;
        if self.await_input().await {
            self.advance().await;
            RoundOutcome::Advanced
        } else {
            self.fail().await;
            RoundOutcome::Failed
        }
    }

    /// Play the pattern back, optionally growing it by one random step first.
    async fn present(&mut self, extend: bool) {
        if extend {
            let step = self.rng.gen_range(0..BUTTON_COUNT as u8);
            self.shared.push_step(step);
        }
        debug!("presenting {} steps", self.shared.pattern_len());

        let rest_ms = self.tempo.quarter_ms();
        for position in 0..self.shared.pattern_len() {
            let Some(step) = self.shared.step(position) else {
                break;
            };
            self.pulse(usize::from(step)).await;
            self.pause(rest_ms).await;
        }
        self.laser().await;
    }

    /// `false` as soon as a wrong button is pressed.
    async fn await_input(&mut self) -> bool {
        self.shared.set_phase(Phase::AwaitingInput);
        let timing = self.config.timing;
        for position in 0..self.shared.pattern_len() {
            let Some(expected) = self.shared.step(position) else {
                break;
            };
            let pressed = self.keypad.wait_press(&mut self.delay, &timing).await;
            if pressed != usize::from(expected) {
                warn!("step {}: expected {} got {}", position, expected, pressed);
                return false;
            }
            self.pulse(pressed).await;
            self.keypad.wait_release(&mut self.delay, &timing).await;
        }
        true
    }

    async fn advance(&mut self) {
        self.shared.set_phase(Phase::RoundAdvance);
        let score = self.shared.increment_score();
        info!("round cleared, score {}", score);

        let bpm = self.config.next_tempo(score, self.tempo.bpm());
        if bpm != self.tempo.bpm() {
            debug!("tempo {} -> {} bpm", self.tempo.bpm(), bpm);
            self.tempo = Tempo(bpm);
        }

        let timing = self.config.timing;
        self.keypad.wait_press(&mut self.delay, &timing).await;
        self.laser().await;
        self.keypad.wait_release(&mut self.delay, &timing).await;
        self.pause(CONTINUE_PAUSE_MS).await;
    }

    async fn fail(&mut self) {
        self.shared.set_phase(Phase::Failure);
        self.shared.set_mode(DisplayMode::ShowFailureGlyph);
        self.sound.stop_all();
        self.sound.play(Effect::Ring(Note::A4), Playback::Background).await;
        self.pause(FAILURE_RING_MS).await;

        self.take_display().await;
        self.display.with(|display| display.clear());
        self.laser().await;
        self.pause(FAILURE_SFX_MS).await;

        // Show the score again while the correct pattern is revealed.
        self.shared.set_mode(DisplayMode::ShowScore);
        self.present(false).await;
        self.pause(REVEAL_PAUSE_MS).await;

        self.take_display().await;
        self.display.with(|display| display.show_both(Glyph::DOUBLE_DOT));
        self.pause(DOUBLE_DOT_MS).await;
        self.display.with(|display| display.clear());
        self.pause(RESTART_PAUSE_MS).await;
        self.shared.set_phase(Phase::Idle);
    }

    /// Light an indicator for a quarter beat while its note plays.
    async fn pulse(&mut self, index: usize) {
        self.sound.stop_all();
        self.indicators.on(index);
        if let Some(note) = Note::for_button(index) {
            let duration_ms = self.tempo.quarter_ms();
            self.sound
                .play(Effect::Tone { note, duration_ms }, Playback::UntilDone)
                .await;
        }
        self.indicators.off(index);
    }

    async fn laser(&mut self) {
        self.sound.stop_all();
        self.sound.play(Effect::Laser, Playback::UntilDone).await;
    }

    /// Blank the display and wait until the display task has let go of it.
    async fn take_display(&mut self) {
        self.shared.set_mode(DisplayMode::Blank);
        while !self.shared.is_vacated() {
            self.delay.delay_ms(self.config.timing.poll_ms).await;
        }
        trace!("display taken over by game");
    }

    async fn pause(&mut self, ms: u32) {
        self.delay.delay_ms(ms).await;
    }
}
