//! Command byte table shared by both controller boards.
//!
//! Every read channel is a fixed request code; a physical quantity is
//! usually split over two channels (first decimal digit, then integer
//! part).  Code `0x05` is overloaded: the climate board answers it with
//! the fan speed, the shading board with the pressure fraction.
//!
//! ```text
//!  code │ channel                          │ direction
//! ──────┼──────────────────────────────────┼──────────
//!  0x01 │ shade position   (fractional)    │ read
//!  0x02 │ shade position   (integer)       │ read
//!  0x03 │ temperature      (fractional)    │ read
//!  0x04 │ temperature      (integer)       │ read
//!  0x05 │ fan speed / pressure (fractional)│ read
//!  0x06 │ pressure         (integer)       │ read
//!  0x07 │ light intensity  (fractional)    │ read
//!  0x08 │ light intensity  (integer)       │ read
//!  0x09 │ hand control back to the board   │ write
//! ```

pub const SHADE_POSITION_FRAC: u8 = 0x01;
pub const SHADE_POSITION_INT: u8 = 0x02;
pub const TEMPERATURE_FRAC: u8 = 0x03;
pub const TEMPERATURE_INT: u8 = 0x04;
pub const FAN_SPEED: u8 = 0x05;
pub const PRESSURE_FRAC: u8 = 0x05;
pub const PRESSURE_INT: u8 = 0x06;
pub const LIGHT_FRAC: u8 = 0x07;
pub const LIGHT_INT: u8 = 0x08;
pub const AUTO_MODE: u8 = 0x09;

/// A quantity read as two exchanges: fractional digit first, integer second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairedChannel {
    /// Short name used in diagnostics.
    pub label: &'static str,
    pub fractional: u8,
    pub integer: u8,
    /// Added to the combined value (the pressure channel only reports the
    /// last two digits).
    pub offset: f32,
    /// Hard limits applied after combination.
    pub limits: Option<(f32, f32)>,
}

/// A quantity read as a single raw byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleChannel {
    pub label: &'static str,
    pub code: u8,
}

pub const AMBIENT_TEMPERATURE: PairedChannel = PairedChannel {
    label: "ambient_temperature",
    fractional: TEMPERATURE_FRAC,
    integer: TEMPERATURE_INT,
    offset: 0.0,
    limits: None,
};

pub const FAN: SingleChannel = SingleChannel {
    label: "fan_speed",
    code: FAN_SPEED,
};

pub const LIGHT_INTENSITY: PairedChannel = PairedChannel {
    label: "light_intensity",
    fractional: LIGHT_FRAC,
    integer: LIGHT_INT,
    offset: 0.0,
    limits: None,
};

pub const OUTDOOR_PRESSURE: PairedChannel = PairedChannel {
    label: "outdoor_pressure",
    fractional: PRESSURE_FRAC,
    integer: PRESSURE_INT,
    offset: 1000.0,
    limits: None,
};

pub const OUTDOOR_TEMPERATURE: PairedChannel = PairedChannel {
    label: "outdoor_temperature",
    fractional: TEMPERATURE_FRAC,
    integer: TEMPERATURE_INT,
    offset: 0.0,
    limits: None,
};

pub const SHADE_POSITION: PairedChannel = PairedChannel {
    label: "shade_position",
    fractional: SHADE_POSITION_FRAC,
    integer: SHADE_POSITION_INT,
    offset: 0.0,
    limits: Some((0.0, 100.0)),
};

/// Label for a setpoint or command channel in diagnostics.
pub const DESIRED_TEMPERATURE: &str = "desired_temperature";
pub const TARGET_POSITION: &str = "target_position";
pub const AUTO: &str = "auto_mode";

/// True for codes the boards answer with a response byte.
pub const fn is_read_request(code: u8) -> bool {
    matches!(code, SHADE_POSITION_FRAC..=LIGHT_INT)
}
