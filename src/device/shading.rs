//! Shading board session (curtain controller).
//!
//! Speaks protocol revision 2 of the shading firmware: every quantity,
//! including the shade position, is a fractional+integer pair, and the
//! outdoor temperature channel is polled.  Revision 1 (single-byte
//! position, no temperature) is not supported.
//!
//! Poll sequence per `update()`:
//! ```text
//!  discard stale input
//!  0x07/0x08  light intensity
//!  0x05/0x06  outdoor pressure   (+1000, board reports last digits)
//!  0x03/0x04  outdoor temperature
//!  0x01/0x02  shade position     (clamped to 0-100)
//!
//!  each request:  [gap 20 ms] → request → settle 30 ms → read
//! ```
//! The board shares its UART with the sensor bus; without the gap and
//! settle delays consecutive answers run into each other.

use core::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::app::events::LinkEvent;
use crate::app::ports::{DeviceSession, EventSink};
use crate::error::LinkError;
use crate::link::channels::{
    AUTO, AUTO_MODE, LIGHT_INTENSITY, OUTDOOR_PRESSURE, OUTDOOR_TEMPERATURE, SHADE_POSITION,
    TARGET_POSITION,
};
use crate::link::codec::{self, Setpoint, encode_setpoint, encode_setpoint_coarse};
use crate::link::transport::Transport;

use super::line::{Line, Pacing};
use super::{DeviceKind, SessionState};

/// Protocol delays for the shading board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadingTiming {
    /// Gap between the integer and fractional position packets.
    pub packet_settle: Duration,
    /// Quiet time before every read request except the first of a cycle.
    pub exchange_gap: Duration,
    /// Wait between a read request and collecting its response.
    pub response_settle: Duration,
}

impl Default for ShadingTiming {
    fn default() -> Self {
        Self {
            packet_settle: Duration::from_millis(20),
            exchange_gap: Duration::from_millis(20),
            response_settle: Duration::from_millis(30),
        }
    }
}

/// Who currently drives the shade, as far as the host knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    /// No command sent by this session yet.
    #[default]
    Unknown,
    /// The board follows its own light sensor.
    Auto,
    /// The board holds the last host position.
    Manual,
}

/// Last known shading board state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShadingSnapshot {
    pub light_intensity: f32,
    /// hPa.
    pub outdoor_pressure: f32,
    pub outdoor_c: f32,
    /// Percent closed, always within 0-100.
    pub position: f32,
    /// Last position successfully commanded, already clamped.
    pub target_position: Option<f32>,
    pub mode: ControlMode,
}

pub struct ShadingSession<T, D, S> {
    line: Line<T, D, S>,
    timing: ShadingTiming,
    snapshot: ShadingSnapshot,
}

impl<T, D, S> ShadingSession<T, D, S>
where
    T: Transport,
    D: DelayNs,
    S: EventSink,
{
    pub fn new(transport: T, delay: D, sink: S, timing: ShadingTiming) -> Self {
        Self {
            line: Line::new(DeviceKind::Shading, transport, delay, sink),
            timing,
            snapshot: ShadingSnapshot::default(),
        }
    }

    /// Move the shade to `percent` (clamped to 0-100, NaN treated as 0).
    ///
    /// Sent as half the value: integer packet (capped at 50), settle
    /// delay, then the first decimal digit of the half value.
    pub fn set_position(&mut self, percent: f32) -> Result<Setpoint, LinkError> {
        let percent = clamp_percent(percent);
        let setpoint = encode_setpoint(percent, &codec::SHADE_POSITION);
        self.send_position(percent, setpoint)
    }

    /// [`set_position`](Self::set_position) without the fractional digit:
    /// the second packet is the constant `0x80` placeholder, so the shade
    /// lands on the even percentage at or below `percent`.
    pub fn set_position_coarse(&mut self, percent: f32) -> Result<Setpoint, LinkError> {
        let setpoint = encode_setpoint_coarse(clamp_percent(percent), &codec::SHADE_POSITION);
        self.send_position(setpoint.value(&codec::SHADE_POSITION), setpoint)
    }

    /// Hand control back to the board's own light-driven loop until the
    /// next position command.  Sending it again changes nothing.
    pub fn set_auto_mode(&mut self) -> Result<(), LinkError> {
        if !self.line.is_open() {
            self.line.command_failed(AUTO, LinkError::NotOpen);
            return Err(LinkError::NotOpen);
        }
        self.line.send_command(AUTO, AUTO_MODE)?;
        self.snapshot.mode = ControlMode::Auto;
        self.snapshot.target_position = None;
        Ok(())
    }

    pub fn light_intensity(&self) -> f32 {
        self.snapshot.light_intensity
    }

    pub fn outdoor_pressure(&self) -> f32 {
        self.snapshot.outdoor_pressure
    }

    pub fn outdoor_temperature(&self) -> f32 {
        self.snapshot.outdoor_c
    }

    pub fn position(&self) -> f32 {
        self.snapshot.position
    }

    pub fn target_position(&self) -> Option<f32> {
        self.snapshot.target_position
    }

    pub fn mode(&self) -> ControlMode {
        self.snapshot.mode
    }

    pub fn snapshot(&self) -> ShadingSnapshot {
        self.snapshot
    }

    pub fn state(&self) -> SessionState {
        self.line.state()
    }

    pub fn transport(&self) -> &T {
        self.line.transport()
    }

    /// Direct access to the owned line, e.g. for fault injection.
    pub fn transport_mut(&mut self) -> &mut T {
        self.line.transport_mut()
    }

    pub fn sink(&self) -> &S {
        self.line.sink()
    }

    fn send_position(&mut self, percent: f32, setpoint: Setpoint) -> Result<Setpoint, LinkError> {
        if !self.line.is_open() {
            self.line.command_failed(TARGET_POSITION, LinkError::NotOpen);
            return Err(LinkError::NotOpen);
        }
        self.line
            .send_setpoint(TARGET_POSITION, setpoint, self.timing.packet_settle)?;
        self.snapshot.target_position = Some(percent);
        self.snapshot.mode = ControlMode::Manual;
        Ok(setpoint)
    }
}

impl<T, D, S> DeviceSession for ShadingSession<T, D, S>
where
    T: Transport,
    D: DelayNs,
    S: EventSink,
{
    fn kind(&self) -> DeviceKind {
        DeviceKind::Shading
    }

    fn open(&mut self) -> Result<(), LinkError> {
        self.line.open()
    }

    fn close(&mut self) -> Result<(), LinkError> {
        self.line.close()
    }

    fn is_open(&self) -> bool {
        self.line.is_open()
    }

    fn update(&mut self) {
        if !self.line.begin_poll() {
            return;
        }
        self.line.discard_input();

        let pacing = Pacing {
            gap: self.timing.exchange_gap,
            settle: self.timing.response_settle,
        };
        let s = &mut self.snapshot;
        let sequence = [
            (&LIGHT_INTENSITY, &mut s.light_intensity),
            (&OUTDOOR_PRESSURE, &mut s.outdoor_pressure),
            (&OUTDOOR_TEMPERATURE, &mut s.outdoor_c),
            (&SHADE_POSITION, &mut s.position),
        ];

        for (i, (channel, slot)) in sequence.into_iter().enumerate() {
            if i > 0 {
                self.line.pause(pacing.gap);
            }
            match self.line.read_pair(channel, pacing) {
                Ok(value) => *slot = value,
                Err(e) => self.line.stale(channel.label, e),
            }
        }

        let snapshot = self.snapshot;
        self.line.emit(LinkEvent::Shading(snapshot));
    }
}

fn clamp_percent(percent: f32) -> f32 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}
