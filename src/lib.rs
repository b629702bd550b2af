//! # segment-simon
//!
//! Simon memory game for a small board with five LEDs, five buttons, a
//! buzzer and a two-digit 7-segment score display behind a 74HC595 shift
//! register.
//!
//! Two cooperative tasks share one executor:
//! - **Game**: presents a growing LED/tone pattern and checks the player's
//!   answer ([`Game`])
//! - **Display**: multiplexes the two digits continuously ([`DisplayTask`])
//!
//! They communicate only through [`SharedState`]. The hardware-independent
//! parts are generic over `embedded-hal` traits; [`board`] binds them to an
//! ESP32-S3 when the `board` feature is enabled.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let peripherals = segment_simon::board::init();
//! let resources = segment_simon::split_resources!(peripherals);
//!
//! let keypad: segment_simon::board::BoardKeypad = resources.buttons.into();
//! let indicators: segment_simon::board::BoardIndicators = resources.leds.into();
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod config;
pub mod display;
pub mod game;
pub mod glyph;
pub mod indicators;
pub mod keypad;
pub mod shared;
pub mod shift_register;
pub mod sound;

#[cfg(feature = "board")]
pub mod board;

pub use config::{
    GameConfig,
    Timing,
};
pub use display::{
    DisplayBus,
    DisplayTask,
    SegmentDisplay,
};
pub use game::{
    Game,
    RoundOutcome,
};
pub use glyph::Glyph;
pub use indicators::Indicators;
pub use keypad::{
    BUTTON_COUNT,
    Keypad,
};
pub use shared::{
    DisplayMode,
    Phase,
    SharedState,
};
pub use shift_register::{
    BitOrder,
    ShiftRegister,
};
pub use sound::{
    Effect,
    Note,
    Playback,
    Sound,
    Tempo,
};

/// Move a value into a `static` `StaticCell`, once, and return `&'static mut`.
#[cfg(feature = "board")]
#[macro_export]
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write($val);
        x
    }};
}
