//! In-process firmware emulator.
//!
//! [`SimulatedBoard`] implements [`Transport`] and behaves like either
//! controller board at the byte level:
//!
//! - read codes are answered from [`Registers`] through a small response
//!   queue (the board's UART FIFO)
//! - an integer packet (`11xxxxxx`) is latched and switches the board to
//!   manual; the following fractional packet (`10xxxxxx`) completes the
//!   setpoint
//! - `0x09` hands control back to the board
//!
//! Fault injection covers the failure paths sessions must survive: muted
//! channels (request accepted, no answer), failing writes, failing opens
//! and forced raw responses.

use heapless::Deque;

use crate::error::LinkError;
use crate::link::channels::{
    AUTO_MODE, FAN_SPEED, LIGHT_FRAC, LIGHT_INT, PRESSURE_FRAC, PRESSURE_INT, SHADE_POSITION_FRAC,
    SHADE_POSITION_INT, TEMPERATURE_FRAC, TEMPERATURE_INT, is_read_request,
};
use crate::link::codec::{self, Packet, Setpoint, split_reading};
use crate::link::transport::Transport;

/// Depth of the emulated receive FIFO.
const FIFO_DEPTH: usize = 8;

/// Bytes of transmit history kept for inspection.
const RECEIVED_CAP: usize = 1024;

/// Which firmware to emulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardKind {
    Climate,
    Shading,
}

/// Who drives the board's actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardMode {
    #[default]
    Auto,
    Manual,
}

/// Physical state behind the read channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Registers {
    pub ambient_c: f32,
    pub fan_speed: u8,
    pub desired_c: f32,
    pub light_intensity: f32,
    /// Full value in hPa; the board only reports the part above 1000.
    pub outdoor_pressure: f32,
    pub outdoor_c: f32,
    /// Percent closed.
    pub position: f32,
    pub mode: BoardMode,
}

impl Default for Registers {
    fn default() -> Self {
        Self {
            ambient_c: 22.0,
            fan_speed: 1,
            desired_c: 24.0,
            light_intensity: 35.0,
            outdoor_pressure: 1013.0,
            outdoor_c: 12.5,
            position: 0.0,
            mode: BoardMode::Auto,
        }
    }
}

pub struct SimulatedBoard {
    kind: BoardKind,
    port: String,
    baud_rate: u32,
    open: bool,
    registers: Registers,
    pending: Deque<u8, FIFO_DEPTH>,
    latched: Option<u8>,
    /// Bit `n` set: code `n` is accepted but never answered.
    muted: u16,
    overrides: [Option<u8>; 16],
    fail_writes: bool,
    fail_open: bool,
    received: Vec<u8>,
}

impl SimulatedBoard {
    pub fn new(kind: BoardKind) -> Self {
        let port = match kind {
            BoardKind::Climate => "sim://climate",
            BoardKind::Shading => "sim://shading",
        };
        Self {
            kind,
            port: port.to_owned(),
            baud_rate: 9600,
            open: false,
            registers: Registers::default(),
            pending: Deque::new(),
            latched: None,
            muted: 0,
            overrides: [None; 16],
            fail_writes: false,
            fail_open: false,
            received: Vec::new(),
        }
    }

    pub fn kind(&self) -> BoardKind {
        self.kind
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    /// Every byte written by the host, oldest first.
    pub fn received(&self) -> &[u8] {
        &self.received
    }

    pub fn clear_received(&mut self) {
        self.received.clear();
    }

    /// Stop answering `code`.
    pub fn mute(&mut self, code: u8) {
        if let Some(bit) = code_bit(code) {
            self.muted |= bit;
        }
    }

    pub fn unmute(&mut self, code: u8) {
        if let Some(bit) = code_bit(code) {
            self.muted &= !bit;
        }
    }

    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn fail_open(&mut self, fail: bool) {
        self.fail_open = fail;
    }

    /// Answer `code` with `byte` regardless of the registers.
    pub fn force_response(&mut self, code: u8, byte: u8) {
        if let Some(slot) = self.overrides.get_mut(usize::from(code)) {
            *slot = Some(byte);
        }
    }

    /// Queue an unsolicited byte, as left behind by a late answer.
    pub fn inject_noise(&mut self, byte: u8) {
        self.enqueue(byte);
    }

    fn enqueue(&mut self, byte: u8) {
        if self.pending.is_full() {
            self.pending.pop_front();
        }
        // Cannot fail: a slot was freed above.
        let _ = self.pending.push_back(byte);
    }

    fn record(&mut self, byte: u8) {
        if self.received.len() >= RECEIVED_CAP {
            self.received.drain(..RECEIVED_CAP / 2);
        }
        self.received.push(byte);
    }

    fn handle(&mut self, byte: u8) {
        match Packet::from_byte(byte) {
            Some(Packet::Integer(m)) => {
                self.latched = Some(m);
                self.registers.mode = BoardMode::Manual;
            }
            Some(Packet::Fractional(f)) => {
                if let Some(integer) = self.latched.take() {
                    self.apply_setpoint(Setpoint {
                        integer,
                        fractional: f,
                    });
                }
            }
            None if byte == AUTO_MODE => {
                self.latched = None;
                self.registers.mode = BoardMode::Auto;
            }
            None if is_read_request(byte) => {
                if code_bit(byte).is_some_and(|bit| self.muted & bit != 0) {
                    return;
                }
                if let Some(answer) = self.answer(byte) {
                    self.enqueue(answer);
                }
            }
            None => {}
        }
    }

    fn apply_setpoint(&mut self, setpoint: Setpoint) {
        match self.kind {
            BoardKind::Climate => {
                self.registers.desired_c = setpoint.value(&codec::CLIMATE_SETPOINT);
            }
            BoardKind::Shading => {
                self.registers.position = setpoint.value(&codec::SHADE_POSITION).min(100.0);
            }
        }
    }

    fn answer(&self, code: u8) -> Option<u8> {
        if let Some(forced) = self.overrides.get(usize::from(code)).copied().flatten() {
            return Some(forced);
        }
        let r = &self.registers;
        let (value, integer) = match (self.kind, code) {
            (BoardKind::Climate, TEMPERATURE_FRAC) => (r.ambient_c, false),
            (BoardKind::Climate, TEMPERATURE_INT) => (r.ambient_c, true),
            (BoardKind::Climate, FAN_SPEED) => return Some(r.fan_speed),
            (BoardKind::Climate, _) => return None,
            (BoardKind::Shading, SHADE_POSITION_FRAC) => (r.position, false),
            (BoardKind::Shading, SHADE_POSITION_INT) => (r.position, true),
            (BoardKind::Shading, TEMPERATURE_FRAC) => (r.outdoor_c, false),
            (BoardKind::Shading, TEMPERATURE_INT) => (r.outdoor_c, true),
            (BoardKind::Shading, PRESSURE_FRAC) => (r.outdoor_pressure - 1000.0, false),
            (BoardKind::Shading, PRESSURE_INT) => (r.outdoor_pressure - 1000.0, true),
            (BoardKind::Shading, LIGHT_FRAC) => (r.light_intensity, false),
            (BoardKind::Shading, LIGHT_INT) => (r.light_intensity, true),
            (BoardKind::Shading, _) => return None,
        };
        let (int, frac) = split_reading(value);
        Some(if integer { int } else { frac })
    }
}

impl Transport for SimulatedBoard {
    fn configure(&mut self, port: &str, baud_rate: u32) {
        port.clone_into(&mut self.port);
        self.baud_rate = baud_rate;
    }

    fn port_name(&self) -> &str {
        &self.port
    }

    fn open(&mut self) -> Result<(), LinkError> {
        if self.open {
            return Ok(());
        }
        if self.fail_open {
            return Err(LinkError::Io(std::io::ErrorKind::NotFound));
        }
        self.pending.clear();
        self.latched = None;
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), LinkError> {
        if !self.open {
            return Err(LinkError::NotOpen);
        }
        if self.fail_writes {
            return Err(LinkError::Io(std::io::ErrorKind::BrokenPipe));
        }
        self.record(byte);
        self.handle(byte);
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, LinkError> {
        if !self.open {
            return Err(LinkError::NotOpen);
        }
        self.pending.pop_front().ok_or(LinkError::Timeout)
    }

    fn discard_input(&mut self) -> Result<(), LinkError> {
        if !self.open {
            return Err(LinkError::NotOpen);
        }
        self.pending.clear();
        Ok(())
    }
}

fn code_bit(code: u8) -> Option<u16> {
    1u16.checked_shl(u32::from(code))
}
