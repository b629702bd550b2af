//! Piezo buzzer driven by a bit-banged square wave.
//!
//! [`Buzzer`] is the game's [`Sound`] handle. It only posts commands; the
//! [`run`] loop owns the pin and renders them. A new command cuts off
//! whatever is playing.

use core::sync::atomic::{
    AtomicU8,
    AtomicU32,
    Ordering,
};

use embassy_futures::select::{
    Either,
    select,
};
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    signal::Signal,
};
use embassy_time::{
    Duration,
    Timer,
};
use esp_hal::gpio::Output;

use crate::sound::{
    Effect,
    POWER_UP,
    POWER_UP_TICK_MS,
    Playback,
    Sound,
};

#[derive(Clone, Copy)]
enum Command {
    Play { effect: Effect, id: u32 },
    Stop,
}

/// Mailbox between [`Buzzer`] handles and the [`run`] loop.
pub struct BuzzerChannel {
    commands: Signal<CriticalSectionRawMutex, Command>,
    /// Id of the last play command that finished or was cut off.
    done: Signal<CriticalSectionRawMutex, u32>,
    next_id: AtomicU32,
    volume: AtomicU8,
}

impl BuzzerChannel {
    pub const fn new() -> Self {
        Self {
            commands: Signal::new(),
            done: Signal::new(),
            next_id: AtomicU32::new(0),
            volume: AtomicU8::new(u8::MAX),
        }
    }

    fn muted(&self) -> bool {
        self.volume.load(Ordering::Relaxed) == 0
    }
}

impl Default for BuzzerChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// [`Sound`] handle that forwards to the buzzer task.
pub struct Buzzer {
    channel: &'static BuzzerChannel,
}

impl Buzzer {
    pub const fn new(channel: &'static BuzzerChannel) -> Self {
        Self { channel }
    }
}

impl Sound for Buzzer {
    async fn play(&mut self, effect: Effect, playback: Playback) {
        let id = self.channel.next_id.fetch_add(1, Ordering::Relaxed);
        self.channel.commands.signal(Command::Play { effect, id });
        if playback == Playback::UntilDone {
            while self.channel.done.wait().await != id {}
        }
    }

    fn stop_all(&mut self) {
        self.channel.commands.signal(Command::Stop);
    }

    /// A plain buzzer has no amplitude control: any non-zero volume is "on".
    fn set_volume(&mut self, volume: u8) {
        self.channel.volume.store(volume, Ordering::Relaxed);
    }
}

/// Render commands forever.
pub async fn run(mut pin: Output<'static>, channel: &'static BuzzerChannel) -> ! {
    info!("buzzer task started");
    let mut next = channel.commands.wait().await;
    loop {
        let mut interrupted = None;
        if let Command::Play { effect, id } = next {
            match select(render(&mut pin, channel, effect), channel.commands.wait()).await {
                Either::First(()) => {}
                Either::Second(command) => interrupted = Some(command),
            }
            pin.set_low();
            channel.done.signal(id);
        }
        next = match interrupted {
            Some(command) => command,
            None => channel.commands.wait().await,
        };
    }
}

async fn render(pin: &mut Output<'static>, channel: &BuzzerChannel, effect: Effect) {
    match effect {
        Effect::Tone { note, duration_ms } => {
            square(pin, channel, note.frequency_hz(), u64::from(duration_ms) * 1000).await;
        }
        Effect::Ring(note) => loop {
            square(pin, channel, note.frequency_hz(), 1_000_000).await;
        },
        Effect::Laser => {
            for half_us in Effect::laser_half_periods() {
                toggle_half(pin, channel, half_us).await;
            }
        }
        Effect::PowerUp => {
            for (note, ticks) in POWER_UP {
                let duration_us = u64::from(ticks * POWER_UP_TICK_MS) * 1000;
                square(pin, channel, note.frequency_hz(), duration_us).await;
            }
        }
    }
}

async fn square(pin: &mut Output<'static>, channel: &BuzzerChannel, hz: u32, duration_us: u64) {
    if hz == 0 || channel.muted() {
        pin.set_low();
        Timer::after(Duration::from_micros(duration_us)).await;
        return;
    }
    let half_us = 500_000 / u64::from(hz);
    for _ in 0..duration_us / (2 * half_us) {
        toggle_half(pin, channel, half_us).await;
        toggle_half(pin, channel, half_us).await;
    }
}

async fn toggle_half(pin: &mut Output<'static>, channel: &BuzzerChannel, half_us: u64) {
    if channel.muted() {
        pin.set_low();
    } else {
        pin.toggle();
    }
    Timer::after(Duration::from_micros(half_us)).await;
}
