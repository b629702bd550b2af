//! Segment patterns for the two-digit display.
//!
//! Bit 6 is the decimal point, the other seven bits are segments in the
//! order the board wires them to the shift register outputs.

/// One 8-bit segment mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Glyph(pub u8);

impl Glyph {
    pub const BLANK: Self = Self(0b0000_0000);
    pub const ALL: Self = Self(0b1111_1111);
    pub const DOUBLE_DOT: Self = Self(0b0100_0000);

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Segment pattern of a decimal digit; values above 9 wrap.
    pub const fn digit(value: u32) -> Self {
        DIGITS[(value % 10) as usize]
    }
}

pub const DIGITS: [Glyph; 10] = [
    Glyph(0b1011_0111), // 0
    Glyph(0b1000_0010), // 1
    Glyph(0b0011_1011), // 2
    Glyph(0b1001_1011), // 3
    Glyph(0b1000_1110), // 4
    Glyph(0b1001_1101), // 5
    Glyph(0b1011_1101), // 6
    Glyph(0b1000_0111), // 7
    Glyph(0b1011_1111), // 8
    Glyph(0b1001_1111), // 9
];

/// "no", shown while the player is told they failed.
pub const NO: (Glyph, Glyph) = (Glyph(0b1010_1000), Glyph(0b1011_1000));

/// "hi", the boot greeting.
pub const HI: (Glyph, Glyph) = (Glyph(0b1010_1100), Glyph(0b1000_0000));

/// How a score maps onto the two digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScoreDigits {
    /// Below ten: digit B only, digit A dark.
    Single(Glyph),
    /// Tens on digit A, units on digit B.
    Pair(Glyph, Glyph),
}

impl ScoreDigits {
    /// Right-justified readout of the last two decimal digits.
    pub const fn of(score: u32) -> Self {
        if score < 10 {
            Self::Single(Glyph::digit(score))
        } else {
            Self::Pair(Glyph::digit(score / 10), Glyph::digit(score))
        }
    }
}
