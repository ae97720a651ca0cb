//! Fixed-point packet codec.
//!
//! Wire format (one byte per packet):
//! ```text
//! ┌─────┬──────────────────────┐
//! │ tag │ magnitude            │
//! │ 2b  │ 6b (0-63)            │
//! └─────┴──────────────────────┘
//!   11  integer / primary packet
//!   10  fractional / secondary packet (first decimal digit, 0-9)
//! ```
//!
//! A setpoint is sent as an integer packet followed, after a settle delay
//! chosen by the caller, by a fractional packet.  Readings travel the other
//! way as plain bytes, one exchange per digit component, and are combined
//! as `integer + fractional / 10`.

use crate::error::LinkError;

use super::channels::PairedChannel;

/// Tag bits of an integer (primary) packet.
pub const INTEGER_TAG: u8 = 0b1100_0000;

/// Tag bits of a fractional (secondary) packet.
pub const FRACTIONAL_TAG: u8 = 0b1000_0000;

const TAG_MASK: u8 = 0b1100_0000;
const MAGNITUDE_MASK: u8 = 0b0011_1111;

/// Largest magnitude an integer packet can carry.
pub const MAX_MAGNITUDE: u8 = MAGNITUDE_MASK;

/// Width of the fractional payload a board accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FractionField {
    SixBit,
    FourBit,
}

impl FractionField {
    pub const fn mask(self) -> u8 {
        match self {
            Self::SixBit => 0b0011_1111,
            Self::FourBit => 0b0000_1111,
        }
    }
}

/// One tagged byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet {
    Integer(u8),
    Fractional(u8),
}

impl Packet {
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Integer(m) => INTEGER_TAG | (m & MAGNITUDE_MASK),
            Self::Fractional(m) => FRACTIONAL_TAG | (m & MAGNITUDE_MASK),
        }
    }

    /// Decode a tagged byte.  Bytes tagged `00` or `01` are plain command
    /// codes, not setpoint packets.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte & TAG_MASK {
            INTEGER_TAG => Some(Self::Integer(byte & MAGNITUDE_MASK)),
            FRACTIONAL_TAG => Some(Self::Fractional(byte & MAGNITUDE_MASK)),
            _ => None,
        }
    }
}

/// How a board expects a setpoint to be expressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetpointEncoding {
    /// The board multiplies the received value by this factor.
    pub scale: f32,
    pub fraction: FractionField,
    /// Integer packets above this value are capped.  `None` means the
    /// value is only masked to six bits.
    pub max_integer: Option<u8>,
}

/// Climate setpoint: degrees, one decimal, no range limit.
pub const CLIMATE_SETPOINT: SetpointEncoding = SetpointEncoding {
    scale: 1.0,
    fraction: FractionField::SixBit,
    max_integer: None,
};

/// Shade position: percent sent halved so 100 % fits in six bits.
pub const SHADE_POSITION: SetpointEncoding = SetpointEncoding {
    scale: 2.0,
    fraction: FractionField::FourBit,
    max_integer: Some(50),
};

/// An encoded setpoint, ready to be sent as two packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setpoint {
    pub integer: u8,
    pub fractional: u8,
}

impl Setpoint {
    pub const fn packets(self) -> [Packet; 2] {
        [Packet::Integer(self.integer), Packet::Fractional(self.fractional)]
    }

    pub const fn bytes(self) -> [u8; 2] {
        let [int, frac] = self.packets();
        [int.to_byte(), frac.to_byte()]
    }

    /// Drop the fractional digit.  The second packet becomes the constant
    /// `0x80` placeholder.
    pub const fn coarse(self) -> Self {
        Self {
            integer: self.integer,
            fractional: 0,
        }
    }

    /// The value the board reconstructs from this setpoint.
    pub fn value(self, encoding: &SetpointEncoding) -> f32 {
        combine(self.integer, self.fractional) * encoding.scale
    }
}

/// Encode `value` for a board using `encoding`.
pub fn encode_setpoint(value: f32, encoding: &SetpointEncoding) -> Setpoint {
    let scaled = value / encoding.scale;
    let (mut whole, mut digit) = split_decimal(scaled);

    if let Some(cap) = encoding.max_integer {
        if whole >= i64::from(cap) {
            whole = i64::from(cap);
            digit = 0;
        }
    }

    Setpoint {
        integer: (whole & i64::from(MAGNITUDE_MASK)) as u8,
        fractional: digit & encoding.fraction.mask(),
    }
}

/// Encode `value` with the integer packet only: the scaled value is
/// truncated, never rounded up into the next step.
pub fn encode_setpoint_coarse(value: f32, encoding: &SetpointEncoding) -> Setpoint {
    let mut whole = (value / encoding.scale).floor() as i64;
    if let Some(cap) = encoding.max_integer {
        whole = whole.min(i64::from(cap));
    }
    Setpoint {
        integer: (whole.max(0) & i64::from(MAGNITUDE_MASK)) as u8,
        fractional: 0,
    }
}

/// `integer + fractional / 10`.
pub fn combine(integer: u8, fractional: u8) -> f32 {
    f32::from(integer) + f32::from(fractional) / 10.0
}

/// Combine the two halves of a paired read.
///
/// Any failed half fails the whole quantity; a partial decode is never
/// returned.  The channel's offset and limits are applied afterwards.
pub fn decode_pair(
    channel: &PairedChannel,
    fractional: Result<u8, LinkError>,
    integer: Result<u8, LinkError>,
) -> Result<f32, LinkError> {
    let fractional = fractional?;
    let integer = integer?;
    let value = combine(integer, fractional) + channel.offset;
    Ok(match channel.limits {
        Some((lo, hi)) => value.clamp(lo, hi),
        None => value,
    })
}

/// Split a reading into the `(integer, fractional)` bytes a board reports.
/// Saturates outside 0-255.
pub fn split_reading(value: f32) -> (u8, u8) {
    let (whole, digit) = split_decimal(value);
    match u8::try_from(whole) {
        Ok(w) => (w, digit),
        Err(_) if whole < 0 => (0, 0),
        Err(_) => (u8::MAX, 9),
    }
}

/// Floor and first decimal digit, with a rounded-up digit carried into the
/// integer part so the digit always stays in 0-9.
fn split_decimal(value: f32) -> (i64, u8) {
    let whole = value.floor();
    let digit = ((value - whole) * 10.0).round();
    if digit >= 10.0 {
        (whole as i64 + 1, 0)
    } else {
        (whole as i64, digit as u8)
    }
}
