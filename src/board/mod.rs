//! ESP32-S3 wiring for the game.
//!
//! Binds the hardware-independent game to `esp-hal` GPIOs, the blocking
//! `esp_hal::delay::Delay` for shift-register clock holds and
//! `embassy_time::Delay` for every cooperative pause.

pub mod buzzer;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use esp_hal::{
    assign_resources,
    clock::CpuClock,
    delay::Delay,
    gpio::{
        Input,
        InputConfig,
        Level,
        Output,
        OutputConfig,
        Pull,
    },
};
use rand::rngs::SmallRng;

pub use self::buzzer::{
    Buzzer,
    BuzzerChannel,
};
use crate::{
    BitOrder,
    DisplayBus,
    DisplayTask,
    Game,
    Indicators,
    Keypad,
    SegmentDisplay,
    SharedState,
    ShiftRegister,
};

// ── Pin / peripheral assignments ────────────────────────────────────────────

assign_resources! {
    pub Resources<'d> {
        leds: LedResources<'d> {
            led0: GPIO4,
            led1: GPIO5,
            led2: GPIO6,
            led3: GPIO7,
            led4: GPIO15,
        },
        buttons: ButtonResources<'d> {
            button0: GPIO16,
            button1: GPIO17,
            button2: GPIO18,
            button3: GPIO8,
            button4: GPIO9,
        },
        display: DisplayResources<'d> {
            data: GPIO10,
            shift_clock: GPIO11,
            store_clock: GPIO12,
            digit_a: GPIO13,
            digit_b: GPIO14,
        },
        buzzer: BuzzerResources<'d> {
            pin: GPIO21,
        },
    }
}

// ── Concrete task types ─────────────────────────────────────────────────────

pub type BoardShared = SharedState<CriticalSectionRawMutex>;
pub type BoardSegmentDisplay = SegmentDisplay<Output<'static>, Delay>;
pub type BoardDisplayBus = DisplayBus<CriticalSectionRawMutex, Output<'static>, Delay>;
pub type BoardDisplayTask =
    DisplayTask<'static, CriticalSectionRawMutex, Output<'static>, Delay, embassy_time::Delay>;
pub type BoardKeypad = Keypad<Input<'static>>;
pub type BoardIndicators = Indicators<Output<'static>>;
pub type BoardGame = Game<
    'static,
    CriticalSectionRawMutex,
    Output<'static>,
    Delay,
    Input<'static>,
    Buzzer,
    SmallRng,
    embassy_time::Delay,
>;

// ── Board initialisation ────────────────────────────────────────────────────

/// Initialise the chip and return the raw peripheral set.
///
/// Call this once at the top of `main`, then break the peripherals into
/// resource groups with [`split_resources!`](crate::split_resources).
#[must_use]
pub fn init() -> esp_hal::peripherals::Peripherals {
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    esp_hal::init(config)
}

// ── Resource → driver conversions ───────────────────────────────────────────

impl From<ButtonResources<'static>> for BoardKeypad {
    fn from(res: ButtonResources<'static>) -> Self {
        let pull_up = InputConfig::default().with_pull(Pull::Up);
        Keypad::new([
            Input::new(res.button0, pull_up),
            Input::new(res.button1, pull_up),
            Input::new(res.button2, pull_up),
            Input::new(res.button3, pull_up),
            Input::new(res.button4, pull_up),
        ])
    }
}

impl From<LedResources<'static>> for BoardIndicators {
    fn from(res: LedResources<'static>) -> Self {
        let config = OutputConfig::default();
        Indicators::new([
            Output::new(res.led0, Level::Low, config),
            Output::new(res.led1, Level::Low, config),
            Output::new(res.led2, Level::Low, config),
            Output::new(res.led3, Level::Low, config),
            Output::new(res.led4, Level::Low, config),
        ])
    }
}

/// Build the display driver with an explicit shift-out order.
pub fn segment_display(res: DisplayResources<'static>, order: BitOrder) -> BoardSegmentDisplay {
    let register = ShiftRegister::new(
        Output::new(res.data, Level::Low, OutputConfig::default()),
        Output::new(res.shift_clock, Level::Low, OutputConfig::default()),
        Output::new(res.store_clock, Level::Low, OutputConfig::default()),
        Delay::new(),
        order,
    );
    // Commons are active low: start with both digits dark.
    let digit_a = Output::new(res.digit_a, Level::High, OutputConfig::default());
    let digit_b = Output::new(res.digit_b, Level::High, OutputConfig::default());
    SegmentDisplay::new(register, digit_a, digit_b)
}

impl From<BuzzerResources<'static>> for Output<'static> {
    fn from(res: BuzzerResources<'static>) -> Self {
        Output::new(res.pin, Level::Low, OutputConfig::default())
    }
}
